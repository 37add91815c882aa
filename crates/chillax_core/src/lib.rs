//! Core of the Chillax movie catalog.
//!
//! Holds the domain model, the storage-agnostic repository contract with its
//! in-memory and SQLite backends, and the authentication/news services that
//! sit on top of it.

pub mod app;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod password;
pub mod repo;
pub mod service;

pub use app::{init_from_config, open_repository, AppError};
pub use config::{AppConfig, ConfigError, RepositoryKind};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::{
    make_comment, make_tag_association, Article, ArticleId, Comment, CommentId, Tag, User,
};
pub use password::PasswordHasher;
pub use repo::populate::{populate, PopulateError, PopulateSummary};
pub use repo::{
    CommentLinkError, MemoryRepository, RepoError, RepoResult, Repository, SqliteRepository,
};
pub use service::auth_service::{AuthService, AuthServiceError};
pub use service::news_service::{ArticlesOnDate, NewsService, NewsServiceError};
pub use service::views::{ArticleView, CommentView, TagView, UserView};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
