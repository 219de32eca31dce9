//! Storage abstractions for service layer
//!
//! The user collection is persisted as a single unit: callers load the whole
//! collection, mutate it in memory and save it back.

pub mod json_file_store;

use async_trait::async_trait;

use crate::errors::ServiceError;

pub use json_file_store::JsonFileStore;

/// Whole-collection persistence.
#[async_trait]
pub trait CollectionStore<T: Send + Sync>: Send + Sync {
    /// Current collection; empty when nothing has been persisted yet.
    async fn load(&self) -> Result<Vec<T>, ServiceError>;
    /// Replace the persisted collection. Readers never see a partial write.
    async fn save(&self, items: &[T]) -> Result<(), ServiceError>;
}
