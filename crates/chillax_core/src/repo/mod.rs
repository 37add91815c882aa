//! Repository layer: the storage-agnostic catalog contract and its backends.
//!
//! # Responsibility
//! - Define the `Repository` trait every backend satisfies identically.
//! - Provide the in-memory and SQLite implementations.
//! - Load catalog data files into any backend.
//!
//! # Invariants
//! - Lookup misses are `Ok(None)` or empty collections, never errors.
//! - `add_comment` only verifies links; it never builds them.
//! - A rejected write leaves the repository unchanged.

pub mod memory_repo;
pub mod populate;
pub mod repository;
pub mod sqlite_repo;

pub use memory_repo::MemoryRepository;
pub use repository::{check_comment_links, CommentLinkError, RepoError, RepoResult, Repository};
pub use sqlite_repo::SqliteRepository;
