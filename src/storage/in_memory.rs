//! In-memory implementation of MetadataStore for testing and development

use crate::core::entity::{EntityKind, Relation};
use crate::core::error::StorageError;
use crate::core::store::{MetadataStore, Transaction};
use crate::entities::Record;
use async_trait::async_trait;
use indexmap::{IndexMap, IndexSet};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

const BACKEND: &str = "in-memory";

/// Rows of every kind plus a foreign-key index for child lookups
#[derive(Debug, Default)]
struct Arena {
    tables: HashMap<EntityKind, IndexMap<String, Record>>,
    children: HashMap<(Relation, String), IndexSet<String>>,
}

impl Arena {
    fn get(&self, kind: EntityKind, id: &str) -> Option<&Record> {
        self.tables.get(&kind)?.get(id)
    }

    /// Insert or replace a row in place, returning the previous version
    fn put(&mut self, record: Record) -> Option<Record> {
        let previous = self
            .tables
            .entry(record.kind())
            .or_default()
            .insert(record.id().to_string(), record.clone());
        if let Some(old) = &previous {
            self.unindex(old);
        }
        self.index(&record);
        previous
    }

    /// Remove a row, returning its position so it can be put back
    fn take(&mut self, kind: EntityKind, id: &str) -> Option<(usize, Record)> {
        let (index, _, record) = self.tables.get_mut(&kind)?.shift_remove_full(id)?;
        self.unindex(&record);
        Some((index, record))
    }

    fn put_back(&mut self, index: usize, record: Record) {
        self.index(&record);
        let table = self.tables.entry(record.kind()).or_default();
        let index = index.min(table.len());
        table.shift_insert(index, record.id().to_string(), record);
    }

    fn index(&mut self, record: &Record) {
        for relation in record.kind().parent_relations() {
            if let Some(parent_id) = record.parent_id(relation) {
                self.children
                    .entry((relation, parent_id.to_string()))
                    .or_default()
                    .insert(record.id().to_string());
            }
        }
    }

    fn unindex(&mut self, record: &Record) {
        for relation in record.kind().parent_relations() {
            let Some(parent_id) = record.parent_id(relation) else {
                continue;
            };
            let key = (relation, parent_id.to_string());
            if let Some(ids) = self.children.get_mut(&key) {
                ids.shift_remove(record.id());
                if ids.is_empty() {
                    self.children.remove(&key);
                }
            }
        }
    }
}

/// In-memory metadata store
///
/// Useful for testing and development. Transactions hold the arena lock for
/// their whole lifetime, so they are fully serialized.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    arena: Arc<Mutex<Arena>>,
}

impl InMemoryStore {
    /// Create an empty in-memory store
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MetadataStore for InMemoryStore {
    fn backend(&self) -> &'static str {
        BACKEND
    }

    async fn begin(&self) -> Result<Box<dyn Transaction>, StorageError> {
        let arena = self.arena.clone().lock_owned().await;
        Ok(Box::new(InMemoryTransaction {
            arena,
            undo: Vec::new(),
            committed: false,
        }))
    }
}

enum Undo {
    Inserted { kind: EntityKind, id: String },
    Replaced { record: Record },
    Removed { index: usize, record: Record },
}

/// Writes go straight to the arena; the undo log reverts them on drop
/// unless the transaction was committed.
pub struct InMemoryTransaction {
    arena: OwnedMutexGuard<Arena>,
    undo: Vec<Undo>,
    committed: bool,
}

impl InMemoryTransaction {
    fn rollback(&mut self) {
        while let Some(step) = self.undo.pop() {
            match step {
                Undo::Inserted { kind, id } => {
                    self.arena.take(kind, &id);
                }
                Undo::Replaced { record } => {
                    self.arena.put(record);
                }
                Undo::Removed { index, record } => self.arena.put_back(index, record),
            }
        }
    }
}

impl Drop for InMemoryTransaction {
    fn drop(&mut self) {
        if !self.committed && !self.undo.is_empty() {
            tracing::debug!(steps = self.undo.len(), "rolling back in-memory transaction");
            self.rollback();
        }
    }
}

#[async_trait]
impl Transaction for InMemoryTransaction {
    async fn load(&mut self, kind: EntityKind, id: &str) -> Result<Option<Record>, StorageError> {
        Ok(self.arena.get(kind, id).cloned())
    }

    async fn load_children(
        &mut self,
        relation: Relation,
        parent_id: &str,
    ) -> Result<Vec<Record>, StorageError> {
        let Some(ids) = self.arena.children.get(&(relation, parent_id.to_string())) else {
            return Ok(Vec::new());
        };
        Ok(ids
            .iter()
            .filter_map(|id| self.arena.get(relation.child(), id).cloned())
            .collect())
    }

    async fn list(&mut self, kind: EntityKind) -> Result<Vec<Record>, StorageError> {
        Ok(self
            .arena
            .tables
            .get(&kind)
            .map(|table| table.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn insert(&mut self, record: Record) -> Result<(), StorageError> {
        let (kind, id) = (record.kind(), record.id().to_string());
        if self.arena.get(kind, &id).is_some() {
            return Err(StorageError::IntegrityError {
                message: format!("duplicate {} id '{}'", kind, id),
            });
        }
        self.arena.put(record);
        self.undo.push(Undo::Inserted { kind, id });
        Ok(())
    }

    async fn save(&mut self, record: Record) -> Result<(), StorageError> {
        if self.arena.get(record.kind(), record.id()).is_none() {
            return Err(StorageError::IntegrityError {
                message: format!("{} '{}' does not exist", record.kind(), record.id()),
            });
        }
        if let Some(previous) = self.arena.put(record) {
            self.undo.push(Undo::Replaced { record: previous });
        }
        Ok(())
    }

    async fn remove(
        &mut self,
        kind: EntityKind,
        id: &str,
    ) -> Result<Option<Record>, StorageError> {
        let Some((index, record)) = self.arena.take(kind, id) else {
            return Ok(None);
        };
        self.undo.push(Undo::Removed {
            index,
            record: record.clone(),
        });
        Ok(Some(record))
    }

    async fn commit(mut self: Box<Self>) -> Result<(), StorageError> {
        self.committed = true;
        self.undo.clear();
        Ok(())
    }
}
