//! Macro-generated contract suite for `MetadataStore` implementations.
//!
//! # Usage
//!
//! ```rust,ignore
//! #[macro_use]
//! mod store_harness;
//!
//! use store_harness::*;
//! use pagemeta::storage::InMemoryStore;
//!
//! metadata_store_tests!(InMemoryStore::new());
//! ```
//!
//! # Generated Tests
//!
//! ## Reads and writes
//! - `test_insert_and_load`: a committed insert is visible to a new transaction
//! - `test_load_missing`: unknown id loads as None
//! - `test_insert_duplicate_id_fails`
//! - `test_save_replaces_row`
//! - `test_save_missing_row_fails`
//! - `test_remove_returns_row`
//! - `test_list_keeps_insertion_order`
//! - `test_load_children_by_relation`
//!
//! ## Atomicity
//! - `test_drop_discards_staged_writes`
//! - `test_reads_see_own_writes`
//! - `test_concurrent_transactions_all_commit`

/// Generate the transaction contract suite.
///
/// `$factory` must evaluate to a fresh `MetadataStore + 'static`; it is
/// re-evaluated for each test.
#[macro_export]
macro_rules! metadata_store_tests {
    ($factory:expr) => {
        mod metadata_store_contract_tests {
            use super::*;
            use pagemeta::core::entity::{DeletionFlag, EntityKind, Relation};
            use pagemeta::core::error::StorageError;
            use pagemeta::core::store::MetadataStore;
            use std::sync::Arc;

            fn store() -> Arc<dyn MetadataStore> {
                Arc::new($factory)
            }

            // ==================================================================
            // Reads and writes
            // ==================================================================

            #[tokio::test]
            async fn test_insert_and_load() {
                let store = store();
                let row = object("invoice");
                let id = row.id.clone();

                let mut tx = store.begin().await.unwrap();
                tx.insert(row.clone().into()).await.unwrap();
                tx.commit().await.unwrap();

                let mut tx = store.begin().await.unwrap();
                let loaded = tx.load(EntityKind::Object, &id).await.unwrap();
                assert_eq!(loaded, Some(row.into()));
            }

            #[tokio::test]
            async fn test_load_missing() {
                let store = store();
                let mut tx = store.begin().await.unwrap();
                assert!(tx.load(EntityKind::Object, "nope").await.unwrap().is_none());
            }

            #[tokio::test]
            async fn test_insert_duplicate_id_fails() {
                let store = store();
                let row = object("invoice");

                let mut tx = store.begin().await.unwrap();
                tx.insert(row.clone().into()).await.unwrap();
                let err = tx.insert(row.into()).await.unwrap_err();
                assert!(matches!(err, StorageError::IntegrityError { .. }));
            }

            #[tokio::test]
            async fn test_save_replaces_row() {
                let store = store();
                let mut row = object("invoice");

                let mut tx = store.begin().await.unwrap();
                tx.insert(row.clone().into()).await.unwrap();
                tx.commit().await.unwrap();

                row.deleted = DeletionFlag::Deleted;
                let mut tx = store.begin().await.unwrap();
                tx.save(row.clone().into()).await.unwrap();
                tx.commit().await.unwrap();

                let mut tx = store.begin().await.unwrap();
                let loaded = tx.load(EntityKind::Object, &row.id).await.unwrap().unwrap();
                assert_eq!(loaded.flag(), DeletionFlag::Deleted);
            }

            #[tokio::test]
            async fn test_save_missing_row_fails() {
                let store = store();
                let mut tx = store.begin().await.unwrap();
                let err = tx.save(object("ghost").into()).await.unwrap_err();
                assert!(matches!(err, StorageError::IntegrityError { .. }));
            }

            #[tokio::test]
            async fn test_remove_returns_row() {
                let store = store();
                let row = page_list("orders");

                let mut tx = store.begin().await.unwrap();
                tx.insert(row.clone().into()).await.unwrap();
                let removed = tx.remove(EntityKind::PageList, &row.id).await.unwrap();
                assert_eq!(removed, Some(row.clone().into()));
                assert!(tx.remove(EntityKind::PageList, &row.id).await.unwrap().is_none());
                tx.commit().await.unwrap();

                let mut tx = store.begin().await.unwrap();
                assert!(tx.load(EntityKind::PageList, &row.id).await.unwrap().is_none());
            }

            #[tokio::test]
            async fn test_list_keeps_insertion_order() {
                let store = store();
                let names = ["a", "b", "c", "d"];

                let mut tx = store.begin().await.unwrap();
                for name in names {
                    tx.insert(object(name).into()).await.unwrap();
                }
                tx.commit().await.unwrap();

                let mut tx = store.begin().await.unwrap();
                let listed: Vec<String> = tx
                    .list(EntityKind::Object)
                    .await
                    .unwrap()
                    .iter()
                    .filter_map(|r| r.name().map(str::to_string))
                    .collect();
                assert_eq!(listed, names);
            }

            #[tokio::test]
            async fn test_load_children_by_relation() {
                let store = store();
                let (tree, records) = Tree::records();

                let mut tx = store.begin().await.unwrap();
                for record in records {
                    tx.insert(record).await.unwrap();
                }
                tx.commit().await.unwrap();

                let mut tx = store.begin().await.unwrap();
                let fields = tx
                    .load_children(Relation::ObjectFields, &tree.object)
                    .await
                    .unwrap();
                assert_eq!(fields.len(), 2);

                let list_fields = tx
                    .load_children(Relation::ObjectFieldListFields, &tree.field_a)
                    .await
                    .unwrap();
                assert_eq!(list_fields.len(), 1);
                assert_eq!(list_fields[0].id(), tree.list_field_a);

                let none = tx
                    .load_children(Relation::ObjectFieldListFields, &tree.field_b)
                    .await
                    .unwrap();
                assert!(none.is_empty());
            }

            // ==================================================================
            // Atomicity
            // ==================================================================

            #[tokio::test]
            async fn test_drop_discards_staged_writes() {
                let store = store();
                let kept = object("kept");

                let mut tx = store.begin().await.unwrap();
                tx.insert(kept.clone().into()).await.unwrap();
                tx.commit().await.unwrap();

                let mut changed = kept.clone();
                changed.deleted = DeletionFlag::Deleted;
                let added = object("added");

                let mut tx = store.begin().await.unwrap();
                tx.save(changed.into()).await.unwrap();
                tx.insert(added.clone().into()).await.unwrap();
                tx.remove(EntityKind::Object, &kept.id).await.unwrap();
                drop(tx);

                let mut tx = store.begin().await.unwrap();
                let rows = tx.list(EntityKind::Object).await.unwrap();
                assert_eq!(rows, vec![kept.into()]);
                assert!(tx.load(EntityKind::Object, &added.id).await.unwrap().is_none());
            }

            #[tokio::test]
            async fn test_reads_see_own_writes() {
                let store = store();
                let parent = object("owner");
                let child = object_field(&parent.id, "email");

                let mut tx = store.begin().await.unwrap();
                tx.insert(parent.clone().into()).await.unwrap();
                tx.insert(child.clone().into()).await.unwrap();

                let children = tx
                    .load_children(Relation::ObjectFields, &parent.id)
                    .await
                    .unwrap();
                assert_eq!(children, vec![child.into()]);
            }

            #[tokio::test]
            async fn test_concurrent_transactions_all_commit() {
                let store = store();
                let mut handles = Vec::new();
                for i in 0..10 {
                    let store = store.clone();
                    handles.push(tokio::spawn(async move {
                        let mut tx = store.begin().await.unwrap();
                        tx.insert(object(&format!("obj{i}")).into()).await.unwrap();
                        tx.commit().await.unwrap();
                    }));
                }
                for handle in handles {
                    handle.await.unwrap();
                }

                let mut tx = store.begin().await.unwrap();
                assert_eq!(tx.list(EntityKind::Object).await.unwrap().len(), 10);
            }
        }
    };
}
