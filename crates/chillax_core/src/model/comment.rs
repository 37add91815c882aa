//! Comment domain model.
//!
//! # Invariants
//! - `id` is generated once and stays stable for the comment lifetime.
//! - `make_comment` wires both back-links; repositories still verify them.

use crate::model::article::{Article, ArticleId};
use crate::model::user::User;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable comment identifier.
pub type CommentId = Uuid;

/// User-authored text attached to one article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    /// Author username. `None` means the comment is not attached to a user.
    pub user: Option<String>,
    /// Target article. `None` means the comment is not attached to an article.
    pub article: Option<ArticleId>,
    pub text: String,
    pub timestamp: NaiveDateTime,
}

impl Comment {
    /// Creates a comment with a generated id and no collection bookkeeping.
    pub fn new(
        user: Option<&User>,
        article: Option<&Article>,
        text: impl Into<String>,
        timestamp: NaiveDateTime,
    ) -> Self {
        Self::with_id(
            Uuid::new_v4(),
            user.map(|user| user.username.clone()),
            article.map(|article| article.id),
            text,
            timestamp,
        )
    }

    /// Creates a comment with a caller-provided id.
    pub fn with_id(
        id: CommentId,
        user: Option<String>,
        article: Option<ArticleId>,
        text: impl Into<String>,
        timestamp: NaiveDateTime,
    ) -> Self {
        Self {
            id,
            user,
            article,
            text: text.into(),
            timestamp,
        }
    }
}

/// Builds a comment and appends it to both the user's and article's
/// collections.
pub fn make_comment(
    text: impl Into<String>,
    user: &mut User,
    article: &mut Article,
    timestamp: NaiveDateTime,
) -> Comment {
    let comment = Comment::new(Some(user), Some(article), text, timestamp);
    user.add_comment(comment.id);
    article.add_comment(comment.id);
    comment
}

#[cfg(test)]
mod tests {
    use super::{make_comment, Comment};
    use crate::model::{Article, User};
    use chrono::NaiveDate;

    fn fixtures() -> (User, Article) {
        let date = NaiveDate::from_ymd_opt(2012, 6, 8).unwrap();
        (
            User::new("thorke", "hash"),
            Article::new(date, "Prometheus", "", "", "", 2),
        )
    }

    #[test]
    fn make_comment_links_user_and_article() {
        let (mut user, mut article) = fixtures();
        let now = NaiveDate::from_ymd_opt(2020, 3, 1)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap();

        let comment = make_comment("Better than Alien", &mut user, &mut article, now);

        assert_eq!(comment.user.as_deref(), Some("thorke"));
        assert_eq!(comment.article, Some(2));
        assert!(user.has_comment(comment.id));
        assert!(article.has_comment(comment.id));
    }

    #[test]
    fn plain_constructor_does_not_touch_collections() {
        let (user, article) = fixtures();
        let now = NaiveDate::from_ymd_opt(2020, 3, 1)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap();

        let comment = Comment::new(Some(&user), Some(&article), "quiet", now);

        assert!(!user.has_comment(comment.id));
        assert!(!article.has_comment(comment.id));
    }
}
