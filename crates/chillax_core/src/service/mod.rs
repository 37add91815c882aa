//! Use-case services over the catalog repository.
//!
//! # Responsibility
//! - Translate request-level inputs into repository calls.
//! - Convert domain objects into plain views for the presentation boundary.
//! - Raise named errors for registration, authentication and comment targets.

pub mod auth_service;
pub mod news_service;
pub mod views;
