//! SQLite catalog repository.
//!
//! # Responsibility
//! - Persist the catalog in the five-table relational schema.
//! - Map rows back into the same domain objects the in-memory backend returns.
//!
//! # Invariants
//! - Every write runs in one immediate transaction; a failed check rolls back.
//! - Relation collections are derived from `article_tags` and `comments`.
//! - A stored comment row never changes its `user_id` or `article_id`.
//! - Query ordering matches `MemoryRepository` exactly.

use crate::db::migrations::missing_catalog_table;
use crate::model::{Article, ArticleId, Comment, CommentId, Tag, User};
use crate::repo::repository::{
    check_comment_links, CommentLinkError, RepoError, RepoResult, Repository,
};
use chrono::NaiveDate;
use log::{debug, warn};
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};
use std::collections::BTreeSet;
use uuid::Uuid;

const ARTICLE_SELECT_SQL: &str = "SELECT
    id,
    date,
    title,
    first_para,
    hyperlink,
    image_hyperlink
FROM articles";

/// SQLite-backed catalog repository owning its connection.
pub struct SqliteRepository {
    conn: Connection,
}

impl SqliteRepository {
    /// Wraps a migrated connection, refusing one that lacks catalog tables.
    pub fn try_new(conn: Connection) -> RepoResult<Self> {
        if let Some(table) = missing_catalog_table(&conn)? {
            return Err(RepoError::MissingRequiredTable(table));
        }
        Ok(Self { conn })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn into_connection(self) -> Connection {
        self.conn
    }

    fn load_article(&self, row: &Row<'_>) -> RepoResult<Article> {
        let mut article = Article::new(
            row.get("date")?,
            row.get::<_, String>("title")?,
            row.get::<_, String>("first_para")?,
            row.get::<_, String>("hyperlink")?,
            row.get::<_, String>("image_hyperlink")?,
            row.get("id")?,
        );
        article.tags = self.load_tag_names(article.id)?;
        article.comments = self.load_comment_ids(
            "SELECT id FROM comments WHERE article_id = ?1 ORDER BY rowid;",
            article.id,
        )?;
        Ok(article)
    }

    fn query_articles(
        &self,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> RepoResult<Vec<Article>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(params)?;
        let mut articles = Vec::new();
        while let Some(row) = rows.next()? {
            articles.push(self.load_article(row)?);
        }
        Ok(articles)
    }

    fn query_article(
        &self,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> RepoResult<Option<Article>> {
        Ok(self.query_articles(sql, params)?.into_iter().next())
    }

    fn query_date(&self, sql: &str, article: &Article) -> RepoResult<Option<NaiveDate>> {
        let date = self
            .conn
            .query_row(sql, params![article.date, article.id], |row| row.get(0))
            .optional()?;
        Ok(date)
    }

    fn load_tag_names(&self, article_id: ArticleId) -> RepoResult<BTreeSet<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT t.name
             FROM article_tags at
             INNER JOIN tags t ON t.id = at.tag_id
             WHERE at.article_id = ?1;",
        )?;
        let names = stmt
            .query_map([article_id], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<BTreeSet<_>>>()?;
        Ok(names)
    }

    fn load_comment_ids(&self, sql: &str, owner_id: i64) -> RepoResult<Vec<CommentId>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query([owner_id])?;
        let mut ids = Vec::new();
        while let Some(row) = rows.next()? {
            let text: String = row.get(0)?;
            ids.push(parse_comment_id(&text)?);
        }
        Ok(ids)
    }
}

impl Repository for SqliteRepository {
    fn add_user(&mut self, user: &User) -> RepoResult<()> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        tx.execute(
            "INSERT INTO users (username, password) VALUES (?1, ?2)
             ON CONFLICT (username) DO UPDATE SET password = excluded.password;",
            params![user.username, user.password],
        )?;
        tx.commit()?;
        debug!("event=user_add module=repo backend=sqlite status=ok");
        Ok(())
    }

    fn get_user(&self, username: &str) -> RepoResult<Option<User>> {
        let row = self
            .conn
            .query_row(
                "SELECT id, username, password FROM users WHERE username = ?1;",
                [username],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                    ))
                },
            )
            .optional()?;

        let Some((user_id, username, password)) = row else {
            return Ok(None);
        };
        let mut user = User::new(username, password);
        user.comments = self.load_comment_ids(
            "SELECT id FROM comments WHERE user_id = ?1 ORDER BY rowid;",
            user_id,
        )?;
        Ok(Some(user))
    }

    fn add_article(&mut self, article: &Article) -> RepoResult<()> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        tx.execute(
            "INSERT INTO articles (id, date, title, first_para, hyperlink, image_hyperlink)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT (id) DO UPDATE SET
                date = excluded.date,
                title = excluded.title,
                first_para = excluded.first_para,
                hyperlink = excluded.hyperlink,
                image_hyperlink = excluded.image_hyperlink;",
            params![
                article.id,
                article.date,
                article.title,
                article.first_para,
                article.hyperlink,
                article.image_hyperlink,
            ],
        )?;
        tx.execute(
            "DELETE FROM article_tags WHERE article_id = ?1;",
            [article.id],
        )?;
        for name in &article.tags {
            tx.execute("INSERT OR IGNORE INTO tags (name) VALUES (?1);", [name])?;
            tx.execute(
                "INSERT OR IGNORE INTO article_tags (article_id, tag_id)
                 SELECT ?1, id FROM tags WHERE name = ?2;",
                params![article.id, name],
            )?;
        }
        tx.commit()?;
        debug!(
            "event=article_add module=repo backend=sqlite status=ok article_id={}",
            article.id
        );
        Ok(())
    }

    fn get_article(&self, id: ArticleId) -> RepoResult<Option<Article>> {
        self.query_article(&format!("{ARTICLE_SELECT_SQL} WHERE id = ?1;"), [id])
    }

    fn get_articles_by_date(&self, target_date: NaiveDate) -> RepoResult<Vec<Article>> {
        self.query_articles(
            &format!("{ARTICLE_SELECT_SQL} WHERE date = ?1 ORDER BY id ASC;"),
            [target_date],
        )
    }

    fn get_number_of_articles(&self) -> RepoResult<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM articles;", [], |row| row.get(0))?;
        usize::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("negative article count `{count}`")))
    }

    fn get_first_article(&self) -> RepoResult<Option<Article>> {
        self.query_article(
            &format!("{ARTICLE_SELECT_SQL} ORDER BY date ASC, id ASC LIMIT 1;"),
            [],
        )
    }

    fn get_last_article(&self) -> RepoResult<Option<Article>> {
        self.query_article(
            &format!("{ARTICLE_SELECT_SQL} ORDER BY date DESC, id DESC LIMIT 1;"),
            [],
        )
    }

    fn get_articles_by_id(&self, ids: &[ArticleId]) -> RepoResult<Vec<Article>> {
        let mut articles = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(article) = self.get_article(*id)? {
                articles.push(article);
            }
        }
        Ok(articles)
    }

    fn get_article_ids_for_tag(&self, tag_name: &str) -> RepoResult<Vec<ArticleId>> {
        let mut stmt = self.conn.prepare(
            "SELECT at.article_id
             FROM article_tags at
             INNER JOIN tags t ON t.id = at.tag_id
             WHERE t.name = ?1
             ORDER BY at.article_id ASC;",
        )?;
        let ids = stmt
            .query_map([tag_name], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<ArticleId>>>()?;
        Ok(ids)
    }

    fn get_date_of_previous_article(&self, article: &Article) -> RepoResult<Option<NaiveDate>> {
        self.query_date(
            "SELECT date FROM articles
             WHERE date < ?1 OR (date = ?1 AND id < ?2)
             ORDER BY date DESC, id DESC
             LIMIT 1;",
            article,
        )
    }

    fn get_date_of_next_article(&self, article: &Article) -> RepoResult<Option<NaiveDate>> {
        self.query_date(
            "SELECT date FROM articles
             WHERE date > ?1 OR (date = ?1 AND id > ?2)
             ORDER BY date ASC, id ASC
             LIMIT 1;",
            article,
        )
    }

    fn add_tag(&mut self, tag: &Tag) -> RepoResult<()> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        tx.execute("INSERT OR IGNORE INTO tags (name) VALUES (?1);", [&tag.name])?;
        for article_id in &tag.articles {
            tx.execute(
                "INSERT OR IGNORE INTO article_tags (article_id, tag_id)
                 SELECT a.id, t.id
                 FROM articles a, tags t
                 WHERE a.id = ?1 AND t.name = ?2;",
                params![article_id, tag.name],
            )?;
        }
        tx.commit()?;
        debug!("event=tag_add module=repo backend=sqlite status=ok");
        Ok(())
    }

    fn get_tags(&self) -> RepoResult<Vec<Tag>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name FROM tags ORDER BY name ASC;")?;
        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut article_stmt = self
            .conn
            .prepare("SELECT article_id FROM article_tags WHERE tag_id = ?1;")?;
        let mut tags = Vec::with_capacity(rows.len());
        for (tag_id, name) in rows {
            let mut tag = Tag::new(name);
            tag.articles = article_stmt
                .query_map([tag_id], |row| row.get(0))?
                .collect::<rusqlite::Result<BTreeSet<ArticleId>>>()?;
            tags.push(tag);
        }
        Ok(tags)
    }

    fn add_comment(
        &mut self,
        comment: &Comment,
        user: &User,
        article: &Article,
    ) -> RepoResult<()> {
        if let Err(err) = check_comment_links(comment, user, article) {
            warn!("event=comment_add module=repo backend=sqlite status=rejected reason={err}");
            return Err(err.into());
        }

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let user_id: Option<i64> = tx
            .query_row(
                "SELECT id FROM users WHERE username = ?1;",
                [&user.username],
                |row| row.get(0),
            )
            .optional()?;
        let Some(user_id) = user_id else {
            return Err(CommentLinkError::UserNotStored(user.username.clone()).into());
        };
        let article_stored: bool = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM articles WHERE id = ?1);",
            [article.id],
            |row| row.get(0),
        )?;
        if !article_stored {
            return Err(CommentLinkError::ArticleNotStored(article.id).into());
        }
        let owner: Option<(i64, ArticleId)> = tx
            .query_row(
                "SELECT user_id, article_id FROM comments WHERE id = ?1;",
                [comment.id.to_string()],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;
        if owner.is_some_and(|owner| owner != (user_id, article.id)) {
            warn!("event=comment_add module=repo backend=sqlite status=rejected reason=owner_changed");
            return Err(CommentLinkError::OwnerChanged(comment.id).into());
        }

        tx.execute(
            "INSERT INTO comments (id, user_id, article_id, comment, timestamp)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT (id) DO UPDATE SET
                comment = excluded.comment,
                timestamp = excluded.timestamp;",
            params![
                comment.id.to_string(),
                user_id,
                article.id,
                comment.text,
                comment.timestamp,
            ],
        )?;
        tx.commit()?;
        debug!(
            "event=comment_add module=repo backend=sqlite status=ok article_id={}",
            article.id
        );
        Ok(())
    }

    fn get_comments(&self) -> RepoResult<Vec<Comment>> {
        let mut stmt = self.conn.prepare(
            "SELECT c.id, u.username, c.article_id, c.comment, c.timestamp
             FROM comments c
             INNER JOIN users u ON u.id = c.user_id
             ORDER BY c.rowid;",
        )?;
        let mut rows = stmt.query([])?;
        let mut comments = Vec::new();
        while let Some(row) = rows.next()? {
            let id_text: String = row.get(0)?;
            comments.push(Comment::with_id(
                parse_comment_id(&id_text)?,
                Some(row.get(1)?),
                Some(row.get(2)?),
                row.get::<_, String>(3)?,
                row.get(4)?,
            ));
        }
        Ok(comments)
    }
}

fn parse_comment_id(value: &str) -> RepoResult<CommentId> {
    Uuid::parse_str(value).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{value}` in comments.id"))
    })
}
