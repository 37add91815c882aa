//! Catalog data-file loader.
//!
//! # Responsibility
//! - Read `movies.csv`, `users.csv` and `comments.csv` from a data directory.
//! - Reject the whole load before writing when any row is malformed.
//! - Feed them into any `Repository` through its public contract.
//!
//! # Invariants
//! - Raw passwords from `users.csv` are hashed before `add_user`.
//! - Comments are wired with `make_comment` and go through `add_comment`, so
//!   loaded data satisfies the same link checks as live writes.

use crate::model::{make_comment, make_tag_association, Article, ArticleId, Tag, User};
use crate::password::PasswordHasher;
use crate::repo::repository::{RepoError, Repository};
use chrono::{NaiveDate, NaiveDateTime};
use log::info;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub const MOVIES_FILE: &str = "movies.csv";
pub const USERS_FILE: &str = "users.csv";
pub const COMMENTS_FILE: &str = "comments.csv";

#[derive(Debug)]
pub enum PopulateError {
    /// A data file could not be opened or one of its rows failed to parse.
    Csv { file: PathBuf, source: csv::Error },
    UnknownUserReference { user_id: i64 },
    UnknownArticleReference { article_id: ArticleId },
    Repo(RepoError),
}

impl Display for PopulateError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Csv { file, source } => write!(f, "failed to read `{}`: {source}", file.display()),
            Self::UnknownUserReference { user_id } => {
                write!(f, "comment references unknown user id {user_id}")
            }
            Self::UnknownArticleReference { article_id } => {
                write!(f, "comment references unknown article id {article_id}")
            }
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for PopulateError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Csv { source, .. } => Some(source),
            Self::Repo(err) => Some(err),
            Self::UnknownUserReference { .. } | Self::UnknownArticleReference { .. } => None,
        }
    }
}

impl From<RepoError> for PopulateError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Counts of entities loaded by [`populate`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PopulateSummary {
    pub articles: usize,
    pub tags: usize,
    pub users: usize,
    pub comments: usize,
}

#[derive(Debug, Deserialize)]
struct MovieRecord {
    id: ArticleId,
    date: NaiveDate,
    title: String,
    first_para: String,
    hyperlink: String,
    image_hyperlink: String,
    /// Comma-separated genre names.
    tags: String,
}

#[derive(Debug, Deserialize)]
struct UserRecord {
    id: i64,
    username: String,
    password: String,
}

#[derive(Debug, Deserialize)]
struct CommentRecord {
    user_id: i64,
    article_id: ArticleId,
    comment: String,
    timestamp: NaiveDateTime,
}

/// Parsed and cross-checked contents of a data directory.
struct Catalog {
    articles: Vec<Article>,
    tags: BTreeMap<String, Tag>,
    users: Vec<User>,
    comments: Vec<PendingComment>,
}

struct PendingComment {
    username: String,
    article_id: ArticleId,
    text: String,
    timestamp: NaiveDateTime,
}

/// Loads every catalog data file under `data_dir` into `repo`.
///
/// All three files are parsed and every comment reference is resolved before
/// the first write, so malformed data leaves `repo` untouched.
pub fn populate<R: Repository + ?Sized>(
    repo: &mut R,
    data_dir: &Path,
    hasher: &PasswordHasher,
) -> Result<PopulateSummary, PopulateError> {
    let catalog = read_catalog(&*repo, data_dir, hasher)?;
    let summary = PopulateSummary {
        articles: catalog.articles.len(),
        tags: catalog.tags.len(),
        users: catalog.users.len(),
        comments: catalog.comments.len(),
    };

    write_catalog(repo, catalog)?;
    info!(
        "event=populate module=repo status=ok articles={} tags={} users={} comments={}",
        summary.articles, summary.tags, summary.users, summary.comments
    );
    Ok(summary)
}

fn read_catalog<R: Repository + ?Sized>(
    repo: &R,
    data_dir: &Path,
    hasher: &PasswordHasher,
) -> Result<Catalog, PopulateError> {
    let (articles, tags) = read_articles(&data_dir.join(MOVIES_FILE))?;

    let mut usernames = HashMap::new();
    let mut users = Vec::new();
    for record in read_records::<UserRecord>(&data_dir.join(USERS_FILE))? {
        usernames.insert(record.id, record.username.clone());
        users.push(User::new(record.username, hasher.hash(&record.password)));
    }

    let article_ids: HashSet<ArticleId> = articles.iter().map(|article| article.id).collect();
    let mut comments = Vec::new();
    for record in read_records::<CommentRecord>(&data_dir.join(COMMENTS_FILE))? {
        let username = usernames
            .get(&record.user_id)
            .ok_or(PopulateError::UnknownUserReference {
                user_id: record.user_id,
            })?;
        if !article_ids.contains(&record.article_id)
            && repo.get_article(record.article_id)?.is_none()
        {
            return Err(PopulateError::UnknownArticleReference {
                article_id: record.article_id,
            });
        }
        comments.push(PendingComment {
            username: username.clone(),
            article_id: record.article_id,
            text: record.comment,
            timestamp: record.timestamp,
        });
    }

    Ok(Catalog {
        articles,
        tags,
        users,
        comments,
    })
}

fn read_articles(path: &Path) -> Result<(Vec<Article>, BTreeMap<String, Tag>), PopulateError> {
    let mut tags: BTreeMap<String, Tag> = BTreeMap::new();
    let mut articles = Vec::new();

    for record in read_records::<MovieRecord>(path)? {
        let mut article = Article::new(
            record.date,
            record.title,
            record.first_para,
            record.hyperlink,
            record.image_hyperlink,
            record.id,
        );
        for name in record.tags.split(',').map(str::trim).filter(|name| !name.is_empty()) {
            let tag = tags
                .entry(name.to_string())
                .or_insert_with(|| Tag::new(name));
            make_tag_association(&mut article, tag);
        }
        articles.push(article);
    }
    Ok((articles, tags))
}

fn write_catalog<R: Repository + ?Sized>(
    repo: &mut R,
    catalog: Catalog,
) -> Result<(), PopulateError> {
    for article in &catalog.articles {
        repo.add_article(article)?;
    }
    for tag in catalog.tags.values() {
        repo.add_tag(tag)?;
    }
    for user in &catalog.users {
        repo.add_user(user)?;
    }

    for pending in catalog.comments {
        let mut user = repo.get_user(&pending.username)?.ok_or_else(|| {
            RepoError::InvalidData(format!("user `{}` missing after load", pending.username))
        })?;
        let mut article = repo
            .get_article(pending.article_id)?
            .ok_or(PopulateError::UnknownArticleReference {
                article_id: pending.article_id,
            })?;

        let comment = make_comment(pending.text, &mut user, &mut article, pending.timestamp);
        repo.add_comment(&comment, &user, &article)?;
    }
    Ok(())
}

fn read_records<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Vec<T>, PopulateError> {
    let to_error = |source| PopulateError::Csv {
        file: path.to_path_buf(),
        source,
    };
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(to_error)?;
    reader
        .deserialize()
        .collect::<Result<Vec<T>, csv::Error>>()
        .map_err(to_error)
}
