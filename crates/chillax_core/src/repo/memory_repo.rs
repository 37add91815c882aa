//! In-memory catalog repository.
//!
//! # Responsibility
//! - Keep articles in a `(date, id)`-sorted vector for ordered queries.
//! - Index users by username, tags by name and comments by id.
//!
//! # Invariants
//! - `articles` stays sorted after every insert; lookups use binary search.
//! - `article_dates` holds exactly one entry per stored article.
//! - Stored comment collections only grow through `add_comment`.
//! - `comment_index` maps every stored comment id to its slot in `comments`.
//! - A stored comment keeps the user and article it was first stored with.
//!
//! Not synchronized: one writer at a time, guarded externally when shared.

use crate::model::{Article, ArticleId, Comment, CommentId, Tag, User};
use crate::repo::repository::{
    check_comment_links, CommentLinkError, RepoResult, Repository,
};
use chrono::NaiveDate;
use log::{debug, warn};
use std::collections::{BTreeMap, HashMap};

/// Catalog repository backed by sorted vectors and maps.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    articles: Vec<Article>,
    article_dates: HashMap<ArticleId, NaiveDate>,
    users: HashMap<String, User>,
    tags: BTreeMap<String, Tag>,
    comments: Vec<Comment>,
    comment_index: HashMap<CommentId, usize>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn position_of(&self, id: ArticleId) -> Option<usize> {
        let date = *self.article_dates.get(&id)?;
        self.articles
            .binary_search_by_key(&(date, id), Article::sort_key)
            .ok()
    }

    fn stored_article_mut(&mut self, id: ArticleId) -> Option<&mut Article> {
        let position = self.position_of(id)?;
        self.articles.get_mut(position)
    }

    fn unlink_article_tags(&mut self, article: &Article) {
        for name in &article.tags {
            if let Some(tag) = self.tags.get_mut(name) {
                tag.articles.remove(&article.id);
            }
        }
    }
}

impl Repository for MemoryRepository {
    fn add_user(&mut self, user: &User) -> RepoResult<()> {
        let mut stored = user.clone();
        stored.comments = self
            .users
            .get(&user.username)
            .map(|previous| previous.comments.clone())
            .unwrap_or_default();
        self.users.insert(stored.username.clone(), stored);
        debug!("event=user_add module=repo backend=memory status=ok");
        Ok(())
    }

    fn get_user(&self, username: &str) -> RepoResult<Option<User>> {
        Ok(self.users.get(username).cloned())
    }

    fn add_article(&mut self, article: &Article) -> RepoResult<()> {
        let mut stored = article.clone();
        stored.comments.clear();

        if let Some(position) = self.position_of(article.id) {
            let previous = self.articles.remove(position);
            self.unlink_article_tags(&previous);
            stored.comments = previous.comments;
        }

        for name in &stored.tags {
            self.tags
                .entry(name.clone())
                .or_insert_with(|| Tag::new(name.clone()))
                .add_article(stored.id);
        }

        let key = stored.sort_key();
        let position = self
            .articles
            .partition_point(|existing| existing.sort_key() < key);
        self.article_dates.insert(stored.id, stored.date);
        self.articles.insert(position, stored);
        debug!(
            "event=article_add module=repo backend=memory status=ok article_id={}",
            article.id
        );
        Ok(())
    }

    fn get_article(&self, id: ArticleId) -> RepoResult<Option<Article>> {
        Ok(self
            .position_of(id)
            .and_then(|position| self.articles.get(position))
            .cloned())
    }

    fn get_articles_by_date(&self, target_date: NaiveDate) -> RepoResult<Vec<Article>> {
        let start = self
            .articles
            .partition_point(|article| article.date < target_date);
        let end = self
            .articles
            .partition_point(|article| article.date <= target_date);
        Ok(self
            .articles
            .get(start..end)
            .map(<[Article]>::to_vec)
            .unwrap_or_default())
    }

    fn get_number_of_articles(&self) -> RepoResult<usize> {
        Ok(self.articles.len())
    }

    fn get_first_article(&self) -> RepoResult<Option<Article>> {
        Ok(self.articles.first().cloned())
    }

    fn get_last_article(&self) -> RepoResult<Option<Article>> {
        Ok(self.articles.last().cloned())
    }

    fn get_articles_by_id(&self, ids: &[ArticleId]) -> RepoResult<Vec<Article>> {
        Ok(ids
            .iter()
            .filter_map(|id| self.position_of(*id))
            .filter_map(|position| self.articles.get(position))
            .cloned()
            .collect())
    }

    fn get_article_ids_for_tag(&self, tag_name: &str) -> RepoResult<Vec<ArticleId>> {
        Ok(self
            .tags
            .get(tag_name)
            .map(|tag| tag.articles.iter().copied().collect())
            .unwrap_or_default())
    }

    fn get_date_of_previous_article(&self, article: &Article) -> RepoResult<Option<NaiveDate>> {
        let key = article.sort_key();
        let position = self
            .articles
            .partition_point(|existing| existing.sort_key() < key);
        Ok(position
            .checked_sub(1)
            .and_then(|previous| self.articles.get(previous))
            .map(|previous| previous.date))
    }

    fn get_date_of_next_article(&self, article: &Article) -> RepoResult<Option<NaiveDate>> {
        let key = article.sort_key();
        let position = self
            .articles
            .partition_point(|existing| existing.sort_key() <= key);
        Ok(self.articles.get(position).map(|next| next.date))
    }

    fn add_tag(&mut self, tag: &Tag) -> RepoResult<()> {
        let mut linked = Vec::new();
        for id in &tag.articles {
            if let Some(article) = self.stored_article_mut(*id) {
                article.add_tag(tag.name.clone());
                linked.push(*id);
            }
        }

        let stored = self
            .tags
            .entry(tag.name.clone())
            .or_insert_with(|| Tag::new(tag.name.clone()));
        stored.articles.extend(linked);
        debug!("event=tag_add module=repo backend=memory status=ok");
        Ok(())
    }

    fn get_tags(&self) -> RepoResult<Vec<Tag>> {
        Ok(self.tags.values().cloned().collect())
    }

    fn add_comment(
        &mut self,
        comment: &Comment,
        user: &User,
        article: &Article,
    ) -> RepoResult<()> {
        if let Err(err) = check_comment_links(comment, user, article) {
            warn!("event=comment_add module=repo backend=memory status=rejected reason={err}");
            return Err(err.into());
        }
        if !self.users.contains_key(&user.username) {
            return Err(CommentLinkError::UserNotStored(user.username.clone()).into());
        }
        if self.position_of(article.id).is_none() {
            return Err(CommentLinkError::ArticleNotStored(article.id).into());
        }
        let slot = self.comment_index.get(&comment.id).copied();
        if let Some(existing) = slot.and_then(|slot| self.comments.get(slot)) {
            if existing.user != comment.user || existing.article != comment.article {
                warn!("event=comment_add module=repo backend=memory status=rejected reason=owner_changed");
                return Err(CommentLinkError::OwnerChanged(comment.id).into());
            }
        }

        if let Some(stored) = self.users.get_mut(&user.username) {
            stored.add_comment(comment.id);
        }
        if let Some(stored) = self.stored_article_mut(article.id) {
            stored.add_comment(comment.id);
        }
        match slot.and_then(|slot| self.comments.get_mut(slot)) {
            Some(existing) => *existing = comment.clone(),
            None => {
                self.comment_index.insert(comment.id, self.comments.len());
                self.comments.push(comment.clone());
            }
        }

        debug!(
            "event=comment_add module=repo backend=memory status=ok article_id={}",
            article.id
        );
        Ok(())
    }

    fn get_comments(&self) -> RepoResult<Vec<Comment>> {
        Ok(self.comments.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::MemoryRepository;
    use crate::model::{make_comment, Article, Tag, User};
    use crate::repo::Repository;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn movie(id: i64, day: NaiveDate, tags: &[&str]) -> Article {
        let mut article = Article::new(day, format!("movie {id}"), "", "", "", id);
        for tag in tags {
            article.add_tag(*tag);
        }
        article
    }

    #[test]
    fn articles_stay_sorted_regardless_of_insert_order() {
        let mut repo = MemoryRepository::new();
        repo.add_article(&movie(3, date(2017, 1, 20), &[])).unwrap();
        repo.add_article(&movie(2, date(2012, 6, 8), &[])).unwrap();
        repo.add_article(&movie(1, date(2014, 8, 1), &[])).unwrap();

        let ids: Vec<i64> = repo.articles.iter().map(|article| article.id).collect();
        assert_eq!(ids, vec![2, 1, 3]);
    }

    #[test]
    fn re_adding_an_article_moves_it_and_relinks_tags() {
        let mut repo = MemoryRepository::new();
        repo.add_article(&movie(1, date(2014, 8, 1), &["Action"])).unwrap();
        repo.add_article(&movie(2, date(2015, 1, 1), &[])).unwrap();

        repo.add_article(&movie(1, date(2016, 1, 1), &["Comedy"])).unwrap();

        assert_eq!(repo.get_number_of_articles().unwrap(), 2);
        assert_eq!(repo.get_last_article().unwrap().unwrap().id, 1);
        assert!(repo.get_article_ids_for_tag("Action").unwrap().is_empty());
        assert_eq!(repo.get_article_ids_for_tag("Comedy").unwrap(), vec![1]);
    }

    #[test]
    fn add_tag_drops_unknown_articles() {
        let mut repo = MemoryRepository::new();
        repo.add_article(&movie(5, date(2016, 8, 5), &[])).unwrap();
        let mut tag = Tag::new("Fantasy");
        tag.add_article(5);
        tag.add_article(99);

        repo.add_tag(&tag).unwrap();

        assert_eq!(repo.get_article_ids_for_tag("Fantasy").unwrap(), vec![5]);
        assert!(repo.get_article(5).unwrap().unwrap().is_tagged_by("Fantasy"));
    }

    #[test]
    fn comment_index_tracks_insertion_slots() {
        let mut repo = MemoryRepository::new();
        let mut user = User::new("thorke", "hash");
        let mut article = movie(1, date(2014, 8, 1), &[]);
        repo.add_user(&user).unwrap();
        repo.add_article(&article).unwrap();
        let at = date(2020, 2, 28).and_hms_opt(14, 31, 26).unwrap();

        let first = make_comment("one", &mut user, &mut article, at);
        repo.add_comment(&first, &user, &article).unwrap();
        let mut second = make_comment("two", &mut user, &mut article, at);
        repo.add_comment(&second, &user, &article).unwrap();
        second.text = "two, edited".to_string();
        repo.add_comment(&second, &user, &article).unwrap();

        assert_eq!(repo.comments.len(), 2);
        assert_eq!(repo.comment_index.get(&first.id), Some(&0));
        assert_eq!(repo.comment_index.get(&second.id), Some(&1));
        assert_eq!(repo.comments[1].text, "two, edited");
    }
}
