//! Persistence for posts.
//!
//! Every operation maps onto a single document-store call. A missing post,
//! including one addressed by an id that cannot exist, is `Ok(None)` /
//! `Ok(false)`; errors are reserved for the store itself failing.

mod memory;
mod mongo;

use std::sync::Arc;

use async_trait::async_trait;
use inkwell_http::AppError;
use thiserror::Error;

use super::models::{Post, PostCreate, PostPatch};

pub use memory::MemoryPostRepository;
pub use mongo::MongoPostRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("document store error: {0}")]
    Store(#[from] mongodb::error::Error),

    #[error("stored post {id} is malformed: {reason}")]
    Corrupt { id: String, reason: String },
}

impl From<RepositoryError> for AppError {
    fn from(error: RepositoryError) -> Self {
        AppError::internal(error)
    }
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Shared handle passed to the HTTP handlers as router state.
pub type SharedPostRepository = Arc<dyn PostRepository>;

#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Store a new post and return it with its assigned id and timestamp.
    async fn create(&self, input: PostCreate) -> RepositoryResult<Post>;

    async fn get(&self, id: &str) -> RepositoryResult<Option<Post>>;

    /// All posts, oldest first.
    async fn list(&self) -> RepositoryResult<Vec<Post>>;

    /// Posts whose title contains `fragment`, ignoring case, oldest first.
    async fn search_by_title(&self, fragment: &str) -> RepositoryResult<Vec<Post>>;

    /// Overwrite the editable fields of an existing post.
    async fn replace(&self, id: &str, input: PostCreate) -> RepositoryResult<Option<Post>> {
        self.patch(id, input.into()).await
    }

    /// Overwrite only the fields present in `patch`.
    async fn patch(&self, id: &str, patch: PostPatch) -> RepositoryResult<Option<Post>>;

    /// Returns whether a post was removed.
    async fn delete(&self, id: &str) -> RepositoryResult<bool>;
}
