//! Article domain model.
//!
//! # Responsibility
//! - Hold catalog item metadata plus tag and comment links.
//! - Define the `(date, id)` total order used by first/last/previous/next.
//!
//! # Invariants
//! - `id` is unique within a repository and never reused.
//! - Equality and ordering only consider `(date, id)`.

use crate::model::comment::CommentId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeSet;

/// Stable article identifier, shared with the `articles.id` column.
pub type ArticleId = i64;

/// Published catalog item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    pub id: ArticleId,
    /// Publication date; primary sort key.
    pub date: NaiveDate,
    pub title: String,
    /// Summary paragraph shown in listings.
    pub first_para: String,
    pub hyperlink: String,
    pub image_hyperlink: String,
    /// Names of tags attached to this article.
    pub tags: BTreeSet<String>,
    /// Ids of comments on this article, in posting order.
    pub comments: Vec<CommentId>,
}

impl Article {
    pub fn new(
        date: NaiveDate,
        title: impl Into<String>,
        first_para: impl Into<String>,
        hyperlink: impl Into<String>,
        image_hyperlink: impl Into<String>,
        id: ArticleId,
    ) -> Self {
        Self {
            id,
            date,
            title: title.into(),
            first_para: first_para.into(),
            hyperlink: hyperlink.into(),
            image_hyperlink: image_hyperlink.into(),
            tags: BTreeSet::new(),
            comments: Vec::new(),
        }
    }

    /// Sort key for the article total order.
    pub fn sort_key(&self) -> (NaiveDate, ArticleId) {
        (self.date, self.id)
    }

    /// Returns whether a tag named `tag_name` is attached.
    pub fn is_tagged_by(&self, tag_name: &str) -> bool {
        self.tags.contains(tag_name)
    }

    pub fn is_tagged(&self) -> bool {
        !self.tags.is_empty()
    }

    /// Attaches a tag name. Only one side of the relation; see
    /// [`crate::model::make_tag_association`] for the symmetric link.
    pub fn add_tag(&mut self, tag_name: impl Into<String>) {
        self.tags.insert(tag_name.into());
    }

    /// Records `comment_id` against this article. Repeated ids are ignored.
    pub fn add_comment(&mut self, comment_id: CommentId) {
        if !self.has_comment(comment_id) {
            self.comments.push(comment_id);
        }
    }

    pub fn has_comment(&self, comment_id: CommentId) -> bool {
        self.comments.contains(&comment_id)
    }

    pub fn number_of_comments(&self) -> usize {
        self.comments.len()
    }
}

impl PartialEq for Article {
    fn eq(&self, other: &Self) -> bool {
        self.sort_key() == other.sort_key()
    }
}

impl Eq for Article {}

impl PartialOrd for Article {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Article {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}
