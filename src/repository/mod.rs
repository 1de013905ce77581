// src/repository/mod.rs

pub mod memory;
pub mod postgres;

use std::fmt;

use async_trait::async_trait;

use crate::{
    models::comment::Comment,
    services::pagination::{SortKey, SortOrder},
};

pub use memory::InMemoryCommentRepository;
pub use postgres::PgCommentRepository;

/// Storage failure. `NotFound` is an expected outcome and is kept apart from
/// infrastructure errors so callers can classify it.
#[derive(Debug)]
pub enum RepoError {
    NotFound,
    Database(sqlx::Error),
}

impl fmt::Display for RepoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RepoError::NotFound => write!(f, "specified comment doesn't exist"),
            RepoError::Database(err) => write!(f, "database error: {}", err),
        }
    }
}

impl std::error::Error for RepoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RepoError::NotFound => None,
            RepoError::Database(err) => Some(err),
        }
    }
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => RepoError::NotFound,
            other => RepoError::Database(other),
        }
    }
}

/// Operations the comment service needs from storage.
#[async_trait]
pub trait CommentRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Comment, RepoError>;

    async fn insert(
        &self,
        parent_id: Option<i64>,
        content: &str,
        author: &str,
    ) -> Result<Comment, RepoError>;

    /// One page of root comments.
    async fn list_roots(
        &self,
        limit: i64,
        offset: i64,
        sort: SortKey,
        order: SortOrder,
    ) -> Result<Vec<Comment>, RepoError>;

    /// The comment itself plus every descendant, soft-deleted ones included.
    async fn fetch_subtree(&self, id: i64) -> Result<Vec<Comment>, RepoError>;

    /// Removes the comment and all of its descendants.
    async fn delete_subtree(&self, id: i64) -> Result<(), RepoError>;

    /// Sets `deleted_at` on this comment only.
    async fn mark_deleted(&self, id: i64) -> Result<(), RepoError>;

    /// Ranked full-text search over comments that are not deleted.
    async fn search(&self, query: &str) -> Result<Vec<Comment>, RepoError>;
}
