//! # arbor-api
//!
//! HTTP surface for Arbor. The router is assembled through the route
//! extension points so plugins can add or wrap routes; the graph endpoint
//! resolves fields against the decorated schema with a fresh per-request
//! context.

pub mod error;
pub mod handlers;
pub mod router;
pub mod state;

pub use error::ApiError;
pub use router::build_router;
pub use state::ApiState;
