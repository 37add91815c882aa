//! Registration and authentication use-cases.
//!
//! # Invariants
//! - Usernames are unique; registration never overwrites an account.
//! - Passwords are stored only as salted hashes and never logged.

use crate::model::User;
use crate::password::PasswordHasher;
use crate::repo::{RepoError, Repository};
use crate::service::views::UserView;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum AuthServiceError {
    /// Registration attempted with a username that already exists.
    NameNotUnique(String),
    UnknownUser(String),
    /// Username/password pair did not match a stored account.
    InvalidCredentials,
    Repo(RepoError),
}

impl Display for AuthServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NameNotUnique(username) => write!(f, "username `{username}` is already taken"),
            Self::UnknownUser(username) => write!(f, "unknown user `{username}`"),
            Self::InvalidCredentials => write!(f, "invalid username or password"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for AuthServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for AuthServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Authentication facade over a repository implementation.
pub struct AuthService<R: Repository> {
    repo: R,
    hasher: PasswordHasher,
}

impl<R: Repository> AuthService<R> {
    pub fn new(repo: R) -> Self {
        Self::with_hasher(repo, PasswordHasher::default())
    }

    pub fn with_hasher(repo: R, hasher: PasswordHasher) -> Self {
        Self { repo, hasher }
    }

    /// Registers a new account with a hashed password.
    pub fn add_user(&mut self, username: &str, password: &str) -> Result<(), AuthServiceError> {
        if self.repo.get_user(username)?.is_some() {
            warn!("event=user_register module=service status=rejected reason=name_not_unique");
            return Err(AuthServiceError::NameNotUnique(username.to_string()));
        }

        let user = User::new(username, self.hasher.hash(password));
        self.repo.add_user(&user)?;
        info!("event=user_register module=service status=ok");
        Ok(())
    }

    pub fn get_user(&self, username: &str) -> Result<UserView, AuthServiceError> {
        self.repo
            .get_user(username)?
            .map(|user| UserView::from(&user))
            .ok_or_else(|| AuthServiceError::UnknownUser(username.to_string()))
    }

    /// Checks `password` against the stored hash for `username`.
    ///
    /// Unknown users and wrong passwords both report `InvalidCredentials`.
    pub fn authenticate_user(&self, username: &str, password: &str) -> Result<(), AuthServiceError> {
        let authenticated = self
            .repo
            .get_user(username)?
            .is_some_and(|user| self.hasher.verify(&user.password, password));

        if authenticated {
            info!("event=user_login module=service status=ok");
            Ok(())
        } else {
            warn!("event=user_login module=service status=rejected reason=invalid_credentials");
            Err(AuthServiceError::InvalidCredentials)
        }
    }
}
