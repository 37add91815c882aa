//! Article browsing and commenting use-cases.
//!
//! # Responsibility
//! - Resolve article/user targets and wire new comments before storing them.
//! - Expand articles into views with their comments and tags.
//! - Provide date navigation and home-page selection helpers.

use crate::model::{make_comment, Article, ArticleId};
use crate::repo::{RepoError, Repository};
use crate::service::views::{comment_view, ArticleView, CommentView, ViewContext};
use chrono::{NaiveDate, Utc};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum NewsServiceError {
    NonExistentArticle(ArticleId),
    UnknownUser(String),
    Repo(RepoError),
}

impl Display for NewsServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NonExistentArticle(id) => write!(f, "article {id} does not exist"),
            Self::UnknownUser(username) => write!(f, "unknown user `{username}`"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for NewsServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for NewsServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Articles published on one date plus navigation to neighbouring dates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticlesOnDate {
    pub articles: Vec<ArticleView>,
    /// Date of the article before the first one listed.
    pub previous_date: Option<NaiveDate>,
    /// Date of the article after the last one listed.
    pub next_date: Option<NaiveDate>,
}

/// News facade over a repository implementation.
pub struct NewsService<R: Repository> {
    repo: R,
}

impl<R: Repository> NewsService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Posts `comment_text` by `username` on article `article_id`.
    pub fn add_comment(
        &mut self,
        article_id: ArticleId,
        comment_text: &str,
        username: &str,
    ) -> Result<CommentView, NewsServiceError> {
        let mut article = self
            .repo
            .get_article(article_id)?
            .ok_or(NewsServiceError::NonExistentArticle(article_id))?;
        let mut user = self
            .repo
            .get_user(username)?
            .ok_or_else(|| NewsServiceError::UnknownUser(username.to_string()))?;

        let comment = make_comment(comment_text, &mut user, &mut article, Utc::now().naive_utc());
        self.repo.add_comment(&comment, &user, &article)?;
        info!("event=comment_post module=service status=ok article_id={article_id}");

        Ok(CommentView {
            username: user.username,
            article_id,
            comment_text: comment.text,
            timestamp: comment.timestamp,
        })
    }

    pub fn get_article(&self, article_id: ArticleId) -> Result<ArticleView, NewsServiceError> {
        let article = self
            .repo
            .get_article(article_id)?
            .ok_or(NewsServiceError::NonExistentArticle(article_id))?;
        Ok(self.view_context()?.article_view(&article))
    }

    pub fn get_first_article(&self) -> Result<Option<ArticleView>, NewsServiceError> {
        let first = self.repo.get_first_article()?;
        self.optional_view(first)
    }

    pub fn get_last_article(&self) -> Result<Option<ArticleView>, NewsServiceError> {
        let last = self.repo.get_last_article()?;
        self.optional_view(last)
    }

    /// Lists articles on `target_date` with the dates to browse to next.
    ///
    /// Both navigation dates are `None` when nothing was published that day.
    pub fn get_articles_by_date(
        &self,
        target_date: NaiveDate,
    ) -> Result<ArticlesOnDate, NewsServiceError> {
        let articles = self.repo.get_articles_by_date(target_date)?;
        let (Some(first), Some(last)) = (articles.first(), articles.last()) else {
            return Ok(ArticlesOnDate {
                articles: Vec::new(),
                previous_date: None,
                next_date: None,
            });
        };

        let previous_date = self.repo.get_date_of_previous_article(first)?;
        let next_date = self.repo.get_date_of_next_article(last)?;
        Ok(ArticlesOnDate {
            articles: self.views(&articles)?,
            previous_date,
            next_date,
        })
    }

    pub fn get_article_ids_for_tag(&self, tag_name: &str) -> Result<Vec<ArticleId>, NewsServiceError> {
        Ok(self.repo.get_article_ids_for_tag(tag_name)?)
    }

    pub fn get_articles_by_id(&self, ids: &[ArticleId]) -> Result<Vec<ArticleView>, NewsServiceError> {
        let articles = self.repo.get_articles_by_id(ids)?;
        self.views(&articles)
    }

    pub fn get_comments_for_article(
        &self,
        article_id: ArticleId,
    ) -> Result<Vec<CommentView>, NewsServiceError> {
        if self.repo.get_article(article_id)?.is_none() {
            return Err(NewsServiceError::NonExistentArticle(article_id));
        }
        Ok(self
            .repo
            .get_comments()?
            .iter()
            .filter(|comment| comment.article == Some(article_id))
            .filter_map(comment_view)
            .collect())
    }

    /// Names of every tag, sorted.
    pub fn get_tag_names(&self) -> Result<Vec<String>, NewsServiceError> {
        Ok(self
            .repo
            .get_tags()?
            .into_iter()
            .map(|tag| tag.name)
            .collect())
    }

    /// Picks up to `quantity` distinct articles for the home page.
    ///
    /// Samples ids from `1..=count`; ids that are not stored are skipped, so
    /// catalogs with gaps may return fewer articles.
    pub fn get_random_articles(&self, quantity: usize) -> Result<Vec<ArticleView>, NewsServiceError> {
        let count = self.repo.get_number_of_articles()?;
        let amount = quantity.min(count);
        let ids: Vec<ArticleId> = rand::seq::index::sample(&mut rand::thread_rng(), count, amount)
            .into_iter()
            .filter_map(|index| ArticleId::try_from(index + 1).ok())
            .collect();
        self.get_articles_by_id(&ids)
    }

    fn view_context(&self) -> Result<ViewContext, NewsServiceError> {
        Ok(ViewContext::new(self.repo.get_comments()?, self.repo.get_tags()?))
    }

    fn views(&self, articles: &[Article]) -> Result<Vec<ArticleView>, NewsServiceError> {
        if articles.is_empty() {
            return Ok(Vec::new());
        }
        let context = self.view_context()?;
        Ok(articles
            .iter()
            .map(|article| context.article_view(article))
            .collect())
    }

    fn optional_view(&self, article: Option<Article>) -> Result<Option<ArticleView>, NewsServiceError> {
        match article {
            Some(article) => Ok(Some(self.view_context()?.article_view(&article))),
            None => Ok(None),
        }
    }
}
