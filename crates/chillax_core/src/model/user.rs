//! User domain model.
//!
//! # Invariants
//! - `username` is the identity; lookups are exact-match.
//! - `password` holds a salted hash, never the raw secret.

use crate::model::comment::CommentId;
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

/// Registered account that can author comments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique, case-sensitive account name.
    pub username: String,
    /// Opaque hashed credential.
    pub password: String,
    /// Ids of authored comments, in authoring order.
    pub comments: Vec<CommentId>,
}

impl User {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            comments: Vec::new(),
        }
    }

    /// Records `comment_id` as authored by this user. Repeated ids are ignored.
    pub fn add_comment(&mut self, comment_id: CommentId) {
        if !self.has_comment(comment_id) {
            self.comments.push(comment_id);
        }
    }

    pub fn has_comment(&self, comment_id: CommentId) -> bool {
        self.comments.contains(&comment_id)
    }
}

impl PartialEq for User {
    fn eq(&self, other: &Self) -> bool {
        self.username == other.username
    }
}

impl Eq for User {}

impl Hash for User {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.username.hash(state);
    }
}
