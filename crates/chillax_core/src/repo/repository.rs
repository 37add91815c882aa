//! Catalog repository contract shared by every storage backend.
//!
//! # Responsibility
//! - Declare the CRUD and query operations over users, articles, tags and
//!   comments.
//! - Own the comment link check both backends run before accepting a write.
//!
//! # Invariants
//! - Implementations return identical results for identical stored data.
//! - Articles are ordered by `(date, id)`; previous/next are positional.

use crate::db::DbError;
use crate::model::{Article, ArticleId, Comment, CommentId, Tag, User};
use chrono::NaiveDate;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for catalog persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    /// Comment is not bidirectionally linked to its user and article.
    UnlinkedComment(CommentLinkError),
    Db(DbError),
    /// Persisted state could not be mapped back into the domain model.
    InvalidData(String),
    /// Connection is missing a table the catalog schema requires.
    MissingRequiredTable(&'static str),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnlinkedComment(err) => write!(f, "comment rejected: {err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted catalog data: {message}"),
            Self::MissingRequiredTable(table) => write!(f, "missing required table `{table}`"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::UnlinkedComment(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::InvalidData(_) | Self::MissingRequiredTable(_) => None,
        }
    }
}

impl From<CommentLinkError> for RepoError {
    fn from(value: CommentLinkError) -> Self {
        Self::UnlinkedComment(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Reason a comment failed the bidirectional link check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommentLinkError {
    UserUnset(CommentId),
    /// Comment names a different user than the one supplied.
    UserMismatch { comment_user: String, user: String },
    NotInUserComments { comment: CommentId, user: String },
    ArticleUnset(CommentId),
    ArticleMismatch {
        comment_article: ArticleId,
        article: ArticleId,
    },
    NotInArticleComments {
        comment: CommentId,
        article: ArticleId,
    },
    UserNotStored(String),
    ArticleNotStored(ArticleId),
    /// Comment id is already stored under another user or article.
    OwnerChanged(CommentId),
}

impl Display for CommentLinkError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UserUnset(id) => write!(f, "comment {id} is not attached to a user"),
            Self::UserMismatch { comment_user, user } => write!(
                f,
                "comment belongs to user `{comment_user}`, not `{user}`"
            ),
            Self::NotInUserComments { comment, user } => {
                write!(f, "user `{user}` does not list comment {comment}")
            }
            Self::ArticleUnset(id) => write!(f, "comment {id} is not attached to an article"),
            Self::ArticleMismatch {
                comment_article,
                article,
            } => write!(
                f,
                "comment belongs to article {comment_article}, not {article}"
            ),
            Self::NotInArticleComments { comment, article } => {
                write!(f, "article {article} does not list comment {comment}")
            }
            Self::UserNotStored(username) => write!(f, "user `{username}` is not stored"),
            Self::ArticleNotStored(id) => write!(f, "article {id} is not stored"),
            Self::OwnerChanged(id) => {
                write!(f, "comment {id} is already stored under another user or article")
            }
        }
    }
}

impl Error for CommentLinkError {}

/// Verifies that `comment`, `user` and `article` reference each other.
///
/// Only inspects the supplied values; storage membership is checked by each
/// backend inside its write.
pub fn check_comment_links(
    comment: &Comment,
    user: &User,
    article: &Article,
) -> Result<(), CommentLinkError> {
    match comment.user.as_deref() {
        None => return Err(CommentLinkError::UserUnset(comment.id)),
        Some(name) if name != user.username => {
            return Err(CommentLinkError::UserMismatch {
                comment_user: name.to_string(),
                user: user.username.clone(),
            });
        }
        Some(_) => {}
    }
    if !user.has_comment(comment.id) {
        return Err(CommentLinkError::NotInUserComments {
            comment: comment.id,
            user: user.username.clone(),
        });
    }

    match comment.article {
        None => return Err(CommentLinkError::ArticleUnset(comment.id)),
        Some(id) if id != article.id => {
            return Err(CommentLinkError::ArticleMismatch {
                comment_article: id,
                article: article.id,
            });
        }
        Some(_) => {}
    }
    if !article.has_comment(comment.id) {
        return Err(CommentLinkError::NotInArticleComments {
            comment: comment.id,
            article: article.id,
        });
    }

    Ok(())
}

/// Storage-agnostic catalog contract.
///
/// Reads take `&self` and writes take `&mut self`, so a repository has a
/// single writer at a time. Share one across threads behind a mutex.
pub trait Repository {
    /// Stores `user`, replacing the credential of an existing username.
    fn add_user(&mut self, user: &User) -> RepoResult<()>;
    /// Returns the user named `username`, matched exactly.
    fn get_user(&self, username: &str) -> RepoResult<Option<User>>;

    /// Stores `article` and links every tag it names.
    fn add_article(&mut self, article: &Article) -> RepoResult<()>;
    fn get_article(&self, id: ArticleId) -> RepoResult<Option<Article>>;
    /// Returns the articles published on `target_date`, ordered by id.
    fn get_articles_by_date(&self, target_date: NaiveDate) -> RepoResult<Vec<Article>>;
    fn get_number_of_articles(&self) -> RepoResult<usize>;
    /// Returns the minimum article by `(date, id)`.
    fn get_first_article(&self) -> RepoResult<Option<Article>>;
    /// Returns the maximum article by `(date, id)`.
    fn get_last_article(&self) -> RepoResult<Option<Article>>;
    /// Returns the stored articles for `ids` in input order, skipping misses.
    fn get_articles_by_id(&self, ids: &[ArticleId]) -> RepoResult<Vec<Article>>;
    /// Returns ids of articles tagged `tag_name`, ascending.
    fn get_article_ids_for_tag(&self, tag_name: &str) -> RepoResult<Vec<ArticleId>>;
    /// Date of the article positioned immediately before `article`, or `None`
    /// when `article` is first. A same-date sibling counts as the neighbour.
    fn get_date_of_previous_article(&self, article: &Article) -> RepoResult<Option<NaiveDate>>;
    /// Date of the article positioned immediately after `article`, or `None`
    /// when `article` is last.
    fn get_date_of_next_article(&self, article: &Article) -> RepoResult<Option<NaiveDate>>;

    /// Stores `tag` and links it with those of its articles already stored.
    fn add_tag(&mut self, tag: &Tag) -> RepoResult<()>;
    /// Returns every tag, sorted by name.
    fn get_tags(&self) -> RepoResult<Vec<Tag>>;

    /// Stores `comment` after verifying its links to `user` and `article`.
    ///
    /// # Errors
    /// - `RepoError::UnlinkedComment` when either back-link is missing, the
    ///   user/article is not stored, or the comment id is already stored under
    ///   another user or article. Nothing is written in that case.
    ///
    /// Re-adding a stored comment with the same user and article replaces its
    /// text and timestamp.
    fn add_comment(&mut self, comment: &Comment, user: &User, article: &Article)
        -> RepoResult<()>;
    /// Returns every comment in insertion order.
    fn get_comments(&self) -> RepoResult<Vec<Comment>>;
}

macro_rules! forward_repository {
    ($($wrapper:ty),+) => {$(
        impl<R: Repository + ?Sized> Repository for $wrapper {
            fn add_user(&mut self, user: &User) -> RepoResult<()> {
                (**self).add_user(user)
            }
            fn get_user(&self, username: &str) -> RepoResult<Option<User>> {
                (**self).get_user(username)
            }
            fn add_article(&mut self, article: &Article) -> RepoResult<()> {
                (**self).add_article(article)
            }
            fn get_article(&self, id: ArticleId) -> RepoResult<Option<Article>> {
                (**self).get_article(id)
            }
            fn get_articles_by_date(&self, target_date: NaiveDate) -> RepoResult<Vec<Article>> {
                (**self).get_articles_by_date(target_date)
            }
            fn get_number_of_articles(&self) -> RepoResult<usize> {
                (**self).get_number_of_articles()
            }
            fn get_first_article(&self) -> RepoResult<Option<Article>> {
                (**self).get_first_article()
            }
            fn get_last_article(&self) -> RepoResult<Option<Article>> {
                (**self).get_last_article()
            }
            fn get_articles_by_id(&self, ids: &[ArticleId]) -> RepoResult<Vec<Article>> {
                (**self).get_articles_by_id(ids)
            }
            fn get_article_ids_for_tag(&self, tag_name: &str) -> RepoResult<Vec<ArticleId>> {
                (**self).get_article_ids_for_tag(tag_name)
            }
            fn get_date_of_previous_article(
                &self,
                article: &Article,
            ) -> RepoResult<Option<NaiveDate>> {
                (**self).get_date_of_previous_article(article)
            }
            fn get_date_of_next_article(&self, article: &Article) -> RepoResult<Option<NaiveDate>> {
                (**self).get_date_of_next_article(article)
            }
            fn add_tag(&mut self, tag: &Tag) -> RepoResult<()> {
                (**self).add_tag(tag)
            }
            fn get_tags(&self) -> RepoResult<Vec<Tag>> {
                (**self).get_tags()
            }
            fn add_comment(
                &mut self,
                comment: &Comment,
                user: &User,
                article: &Article,
            ) -> RepoResult<()> {
                (**self).add_comment(comment, user, article)
            }
            fn get_comments(&self) -> RepoResult<Vec<Comment>> {
                (**self).get_comments()
            }
        }
    )+};
}

forward_repository!(&mut R, Box<R>);
