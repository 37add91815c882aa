#![allow(dead_code)]

use chillax_core::db::open_db_in_memory;
use chillax_core::{populate, MemoryRepository, PasswordHasher, Repository, SqliteRepository};
use chrono::{NaiveDate, NaiveDateTime};
use std::path::PathBuf;

pub fn data_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data")
}

/// Cheap work factor so hashing does not dominate test time.
pub fn test_hasher() -> PasswordHasher {
    PasswordHasher::new(1_000)
}

pub fn populated_memory_repo() -> MemoryRepository {
    let mut repo = MemoryRepository::new();
    populate(&mut repo, &data_dir(), &test_hasher()).unwrap();
    repo
}

pub fn populated_sqlite_repo() -> SqliteRepository {
    let mut repo = SqliteRepository::try_new(open_db_in_memory().unwrap()).unwrap();
    populate(&mut repo, &data_dir(), &test_hasher()).unwrap();
    repo
}

pub fn date(value: &str) -> NaiveDate {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").unwrap()
}

pub fn timestamp(value: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S").unwrap()
}

/// Both populated backends, labelled for assertion messages.
pub fn populated_backends() -> Vec<(&'static str, Box<dyn Repository>)> {
    let memory: Box<dyn Repository> = Box::new(populated_memory_repo());
    let sqlite: Box<dyn Repository> = Box::new(populated_sqlite_repo());
    vec![("memory", memory), ("sqlite", sqlite)]
}

/// Both backends with nothing stored.
pub fn empty_backends() -> Vec<(&'static str, Box<dyn Repository>)> {
    let memory: Box<dyn Repository> = Box::new(MemoryRepository::new());
    let sqlite: Box<dyn Repository> =
        Box::new(SqliteRepository::try_new(open_db_in_memory().unwrap()).unwrap());
    vec![("memory", memory), ("sqlite", sqlite)]
}
