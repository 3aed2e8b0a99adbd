//! Persistence interface consumed by the cascade engine and entity services
//!
//! The core only ever talks to storage through a [`Transaction`]: rows are
//! loaded by id or by foreign key, mutations are staged, and the whole unit
//! is either committed or rolled back. Dropping a transaction without
//! calling [`Transaction::commit`] must discard every staged mutation.

use async_trait::async_trait;

use crate::core::entity::{EntityKind, Relation};
use crate::core::error::StorageError;
use crate::entities::Record;

/// Store of metadata rows
#[async_trait]
pub trait MetadataStore: Send + Sync {
    /// Short backend name used in logs and errors
    fn backend(&self) -> &'static str;

    /// Open a transaction
    async fn begin(&self) -> Result<Box<dyn Transaction>, StorageError>;
}

/// A unit of work against a [`MetadataStore`]
///
/// Reads observe the transaction's own staged writes.
#[async_trait]
pub trait Transaction: Send {
    /// Load a row by kind and id, regardless of its deletion flag
    async fn load(&mut self, kind: EntityKind, id: &str) -> Result<Option<Record>, StorageError>;

    /// Load every row whose foreign key for `relation` equals `parent_id`,
    /// regardless of deletion flag. Order is not significant.
    async fn load_children(
        &mut self,
        relation: Relation,
        parent_id: &str,
    ) -> Result<Vec<Record>, StorageError>;

    /// All rows of a kind in insertion order, regardless of deletion flag
    async fn list(&mut self, kind: EntityKind) -> Result<Vec<Record>, StorageError>;

    /// Stage a new row; fails if the id is already taken
    async fn insert(&mut self, record: Record) -> Result<(), StorageError>;

    /// Stage a replacement of an existing row; fails if the row is missing
    async fn save(&mut self, record: Record) -> Result<(), StorageError>;

    /// Stage the permanent removal of a row, returning it if it existed
    async fn remove(&mut self, kind: EntityKind, id: &str)
    -> Result<Option<Record>, StorageError>;

    /// Make every staged mutation durable
    async fn commit(self: Box<Self>) -> Result<(), StorageError>;
}
