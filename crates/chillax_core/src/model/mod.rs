//! Catalog domain model: users, articles, tags and comments.
//!
//! # Responsibility
//! - Define entity identity, equality and ordering.
//! - Provide link helpers for the comment and tag relations.
//!
//! # Invariants
//! - Relations are stored as ids/keys on both sides, never as owning pointers.
//! - A comment listed by a user or article must name that user or article back.
//! - Articles are totally ordered by `(date, id)`.

pub mod article;
pub mod comment;
pub mod tag;
pub mod user;

pub use article::{Article, ArticleId};
pub use comment::{make_comment, Comment, CommentId};
pub use tag::{make_tag_association, Tag};
pub use user::User;
