//! Application bootstrap: config to a ready repository handle.
//!
//! # Responsibility
//! - Start logging when a log directory is configured.
//! - Build the configured repository backend and load catalog data.
//!
//! The returned handle is passed explicitly to services; there is no global
//! repository instance.

use crate::config::{AppConfig, RepositoryKind};
use crate::db::{open_db, DbError};
use crate::logging::{init_logging, LoggingError};
use crate::password::PasswordHasher;
use crate::repo::populate::{populate, PopulateError};
use crate::repo::{MemoryRepository, RepoError, Repository, SqliteRepository};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum AppError {
    Logging(LoggingError),
    Db(DbError),
    Repo(RepoError),
    Populate(PopulateError),
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Logging(err) => write!(f, "logging setup failed: {err}"),
            Self::Db(err) => write!(f, "database setup failed: {err}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::Populate(err) => write!(f, "catalog load failed: {err}"),
        }
    }
}

impl Error for AppError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Logging(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::Populate(err) => Some(err),
        }
    }
}

impl From<LoggingError> for AppError {
    fn from(value: LoggingError) -> Self {
        Self::Logging(value)
    }
}

impl From<DbError> for AppError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<RepoError> for AppError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<PopulateError> for AppError {
    fn from(value: PopulateError) -> Self {
        Self::Populate(value)
    }
}

/// Starts file logging if `config.log_dir` is set.
pub fn init_from_config(config: &AppConfig) -> Result<(), AppError> {
    if let Some(log_dir) = config.log_dir.as_deref() {
        init_logging(config.log_level, log_dir)?;
    }
    Ok(())
}

/// Builds the configured repository.
///
/// - `Memory`: always populated from `config.data_dir`.
/// - `Database`: opened at `config.database_path`, populated only when it
///   holds no articles.
pub fn open_repository(config: &AppConfig) -> Result<Box<dyn Repository>, AppError> {
    let hasher = PasswordHasher::new(config.password_hash_iterations);

    match config.repository {
        RepositoryKind::Memory => {
            let mut repo = MemoryRepository::new();
            populate(&mut repo, &config.data_dir, &hasher)?;
            info!("event=repo_open module=app status=ok backend=memory");
            Ok(Box::new(repo))
        }
        RepositoryKind::Database => {
            let mut repo = SqliteRepository::try_new(open_db(&config.database_path)?)?;
            if repo.get_number_of_articles()? == 0 {
                populate(&mut repo, &config.data_dir, &hasher)?;
            }
            info!("event=repo_open module=app status=ok backend=sqlite");
            Ok(Box::new(repo))
        }
    }
}
