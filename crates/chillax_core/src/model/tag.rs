//! Tag domain model and the article/tag association helper.

use crate::model::article::{Article, ArticleId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Named category attachable to many articles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tag {
    /// Unique tag name, compared exactly.
    pub name: String,
    /// Ids of tagged articles.
    pub articles: BTreeSet<ArticleId>,
}

impl Tag {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            articles: BTreeSet::new(),
        }
    }

    pub fn add_article(&mut self, article_id: ArticleId) {
        self.articles.insert(article_id);
    }

    pub fn tags_article(&self, article_id: ArticleId) -> bool {
        self.articles.contains(&article_id)
    }

    pub fn number_of_tagged_articles(&self) -> usize {
        self.articles.len()
    }
}

impl PartialEq for Tag {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Tag {}

/// Links `article` and `tag` on both sides of the many-to-many relation.
pub fn make_tag_association(article: &mut Article, tag: &mut Tag) {
    article.add_tag(tag.name.clone());
    tag.add_article(article.id);
}
