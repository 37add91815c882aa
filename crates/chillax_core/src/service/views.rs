//! Plain data views handed to the presentation boundary.

use crate::model::{Article, ArticleId, Comment, CommentId, Tag, User};
use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserView {
    pub username: String,
    /// Stored hash, never the raw password.
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommentView {
    pub username: String,
    pub article_id: ArticleId,
    pub comment_text: String,
    pub timestamp: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagView {
    pub name: String,
    pub tagged_articles: Vec<ArticleId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArticleView {
    pub id: ArticleId,
    pub date: NaiveDate,
    pub title: String,
    pub first_para: String,
    pub hyperlink: String,
    pub image_hyperlink: String,
    pub comments: Vec<CommentView>,
    pub tags: Vec<TagView>,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            username: user.username.clone(),
            password: user.password.clone(),
        }
    }
}

impl From<&Tag> for TagView {
    fn from(tag: &Tag) -> Self {
        Self {
            name: tag.name.clone(),
            tagged_articles: tag.articles.iter().copied().collect(),
        }
    }
}

/// Builds a comment view. Comments missing a user or article have no view.
pub fn comment_view(comment: &Comment) -> Option<CommentView> {
    Some(CommentView {
        username: comment.user.clone()?,
        article_id: comment.article?,
        comment_text: comment.text.clone(),
        timestamp: comment.timestamp,
    })
}

/// Lookup tables used to expand article relations into views.
#[derive(Debug, Default)]
pub struct ViewContext {
    comments: HashMap<CommentId, Comment>,
    tags: HashMap<String, Tag>,
}

impl ViewContext {
    pub fn new(comments: Vec<Comment>, tags: Vec<Tag>) -> Self {
        Self {
            comments: comments
                .into_iter()
                .map(|comment| (comment.id, comment))
                .collect(),
            tags: tags.into_iter().map(|tag| (tag.name.clone(), tag)).collect(),
        }
    }

    pub fn article_view(&self, article: &Article) -> ArticleView {
        ArticleView {
            id: article.id,
            date: article.date,
            title: article.title.clone(),
            first_para: article.first_para.clone(),
            hyperlink: article.hyperlink.clone(),
            image_hyperlink: article.image_hyperlink.clone(),
            comments: self.comment_views(article),
            tags: article
                .tags
                .iter()
                .map(|name| {
                    self.tags.get(name).map_or_else(
                        || TagView {
                            name: name.clone(),
                            tagged_articles: vec![article.id],
                        },
                        TagView::from,
                    )
                })
                .collect(),
        }
    }

    /// Comment views for `article`, in posting order.
    pub fn comment_views(&self, article: &Article) -> Vec<CommentView> {
        article
            .comments
            .iter()
            .filter_map(|id| self.comments.get(id))
            .filter_map(comment_view)
            .collect()
    }
}
