//! # arbor-core
//!
//! Core crate for Arbor. Contains the unified error system, the shared
//! result alias, and the application configuration schema.
//!
//! This crate has **no** internal dependencies on other Arbor crates.

pub mod config;
pub mod error;
pub mod result;

pub use error::AppError;
pub use result::AppResult;
