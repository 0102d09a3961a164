//! In-memory content store backing the core loaders and mutators.

use dashmap::DashMap;
use serde::{Deserialize, Serialize};

/// An author of posts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    /// Author id.
    pub id: i64,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
}

/// A published post.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    /// Post id.
    pub id: i64,
    /// The author's id.
    pub author_id: i64,
    /// Post title.
    pub title: String,
    /// Vote tally.
    pub votes: i64,
}

/// Concurrent in-memory store for the demo publishing domain.
#[derive(Debug, Default)]
pub struct ContentStore {
    authors: DashMap<i64, Author>,
    posts: DashMap<i64, Post>,
}

impl ContentStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store seeded with the sample content.
    pub fn seeded() -> Self {
        let store = Self::new();
        for (id, first_name, last_name) in [
            (1, "Tom", "Coleman"),
            (2, "Sashko", "Stubailo"),
            (3, "Mikhail", "Novikov"),
        ] {
            store.authors.insert(
                id,
                Author {
                    id,
                    first_name: first_name.to_string(),
                    last_name: last_name.to_string(),
                },
            );
        }
        for (id, author_id, title, votes) in [
            (1, 1, "Introduction to GraphQL", 2),
            (2, 2, "Welcome to Meteor", 3),
            (3, 2, "Advanced GraphQL", 1),
            (4, 3, "Launchpad is Cool", 7),
        ] {
            store.posts.insert(
                id,
                Post {
                    id,
                    author_id,
                    title: title.to_string(),
                    votes,
                },
            );
        }
        store
    }

    /// All posts, ordered by id.
    pub fn list_posts(&self) -> Vec<Post> {
        let mut posts: Vec<Post> = self.posts.iter().map(|p| p.value().clone()).collect();
        posts.sort_by_key(|p| p.id);
        posts
    }

    /// Looks up a post.
    pub fn get_post(&self, id: i64) -> Option<Post> {
        self.posts.get(&id).map(|p| p.value().clone())
    }

    /// All posts by one author, ordered by id.
    pub fn posts_by_author(&self, author_id: i64) -> Vec<Post> {
        let mut posts: Vec<Post> = self
            .posts
            .iter()
            .filter(|p| p.author_id == author_id)
            .map(|p| p.value().clone())
            .collect();
        posts.sort_by_key(|p| p.id);
        posts
    }

    /// Looks up an author.
    pub fn get_author(&self, id: i64) -> Option<Author> {
        self.authors.get(&id).map(|a| a.value().clone())
    }

    /// Increments a post's vote tally, returning the updated post.
    pub fn upvote_post(&self, id: i64) -> Option<Post> {
        self.posts.get_mut(&id).map(|mut p| {
            p.votes += 1;
            p.value().clone()
        })
    }
}
