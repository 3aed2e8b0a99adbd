//! State-gated operations over one metadata kind
//!
//! Every operation opens its own transaction. Mutations commit at the end
//! and any early return drops the transaction, which discards whatever was
//! staged. Reads only ever see ACTIVE rows; soft delete and restore look a
//! row up in the state they require and cascade through
//! [`transition`](crate::core::cascade::transition).

use std::marker::PhantomData;
use std::sync::Arc;

use validator::Validate;

use crate::config::PaginationConfig;
use crate::core::cascade::{self, CascadeReport};
use crate::core::entity::{DeletionFlag, Entity, EntityKind, MetaEntity};
use crate::core::error::{EntityError, MetaResult, StorageError, ValidationError};
use crate::core::query::{Page, PageRequest, SearchCriteria, name_matches};
use crate::core::store::{MetadataStore, Transaction};
use crate::entities::{
    Object, ObjectField, PageLayout, PageLayoutField, PageList, PageListField, Record,
};

/// CRUD, soft delete and restore for rows of kind `T`
pub struct EntityService<T: MetaEntity> {
    store: Arc<dyn MetadataStore>,
    pagination: PaginationConfig,
    _kind: PhantomData<fn() -> T>,
}

impl<T: MetaEntity> Clone for EntityService<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            pagination: self.pagination,
            _kind: PhantomData,
        }
    }
}

impl<T: MetaEntity> EntityService<T> {
    pub fn new(store: Arc<dyn MetadataStore>, pagination: PaginationConfig) -> Self {
        Self {
            store,
            pagination,
            _kind: PhantomData,
        }
    }

    pub fn kind(&self) -> EntityKind {
        T::KIND
    }

    pub fn store(&self) -> &Arc<dyn MetadataStore> {
        &self.store
    }

    pub fn pagination(&self) -> &PaginationConfig {
        &self.pagination
    }

    /// Validate a draft and persist it as a new ACTIVE row
    pub async fn create(&self, draft: T::Draft) -> MetaResult<T> {
        draft.validate()?;
        let entity = T::from_draft(draft);

        let mut tx = self.store.begin().await?;
        tx.insert(entity.clone().into_record()).await?;
        tx.commit().await?;

        tracing::info!(kind = %T::KIND, id = %entity.id(), "created");
        Ok(entity)
    }

    /// Apply the supplied fields of `patch` to an ACTIVE row
    pub async fn update(&self, id: &str, patch: T::Patch) -> MetaResult<T> {
        patch.validate()?;

        let mut tx = self.store.begin().await?;
        let mut entity = self
            .load_in_state(tx.as_mut(), id, DeletionFlag::Active, || not_found::<T>(id))
            .await?;

        if entity.apply_patch(patch) {
            entity.touch();
            tx.save(entity.clone().into_record()).await?;
            tx.commit().await?;
            tracing::info!(kind = %T::KIND, id, "updated");
        }
        Ok(entity)
    }

    /// Mark an ACTIVE row and everything it owns as DELETED
    pub async fn soft_delete(&self, id: &str) -> MetaResult<CascadeReport> {
        let mut tx = self.store.begin().await?;
        let entity = self
            .load_in_state(tx.as_mut(), id, DeletionFlag::Active, || {
                EntityError::AlreadyDeleted {
                    kind: T::KIND,
                    id: id.to_string(),
                }
            })
            .await?;

        let report = cascade::transition(tx.as_mut(), entity.into_record(), DeletionFlag::Deleted)
            .await?;
        tx.commit().await?;

        tracing::info!(kind = %T::KIND, id, affected = report.affected(), "soft deleted");
        tracing::debug!(descendants = ?report.descendants, "cascade report");
        Ok(report)
    }

    /// Bring a DELETED row back, together with the rows its deletion took down
    pub async fn restore(&self, id: &str) -> MetaResult<CascadeReport> {
        let mut tx = self.store.begin().await?;
        let entity = self
            .load_in_state(tx.as_mut(), id, DeletionFlag::Deleted, || {
                EntityError::NotDeleted {
                    kind: T::KIND,
                    id: id.to_string(),
                }
            })
            .await?;

        let report = cascade::transition(tx.as_mut(), entity.into_record(), DeletionFlag::Active)
            .await?;
        tx.commit().await?;

        tracing::info!(kind = %T::KIND, id, affected = report.affected(), "restored");
        tracing::debug!(
            descendants = ?report.descendants,
            held = ?report.held,
            "cascade report"
        );
        Ok(report)
    }

    /// Remove a row for good, whatever its flag. Owned rows are left in place.
    pub async fn hard_delete(&self, id: &str) -> MetaResult<T> {
        let mut tx = self.store.begin().await?;
        let record = tx
            .remove(T::KIND, id)
            .await?
            .ok_or_else(|| not_found::<T>(id))?;
        let entity = decode::<T>(record)?;
        tx.commit().await?;

        tracing::info!(kind = %T::KIND, id, "permanently deleted");
        Ok(entity)
    }

    pub async fn get(&self, id: &str) -> MetaResult<T> {
        let mut tx = self.store.begin().await?;
        self.load_in_state(tx.as_mut(), id, DeletionFlag::Active, || not_found::<T>(id))
            .await
    }

    pub async fn list(&self, page: PageRequest) -> MetaResult<Page<T>> {
        Ok(page.slice(self.list_all().await?))
    }

    /// Every ACTIVE row, in creation order
    pub async fn list_all(&self) -> MetaResult<Vec<T>> {
        let mut tx = self.store.begin().await?;
        let records = tx.list(T::KIND).await?;
        active_rows(records)
    }

    /// ACTIVE rows owned by `parent_id` through the kind's search scope
    pub async fn list_by_parent(&self, parent_id: &str, page: PageRequest) -> MetaResult<Page<T>> {
        let scope = T::search_scope().ok_or_else(|| ValidationError::FieldError {
            field: "parent".into(),
            message: format!("{} has no owning parent to list by", T::KIND),
        })?;

        let mut tx = self.store.begin().await?;
        let records = tx.load_children(scope.relation, parent_id).await?;
        Ok(page.slice(active_rows(records)?))
    }

    /// Search ACTIVE rows.
    ///
    /// Root kinds: an exact `id` wins over a `name` substring. Child kinds:
    /// a `name` substring, narrowed to one parent when a parent id is given,
    /// or every row of that parent.
    pub async fn search(&self, criteria: SearchCriteria, page: PageRequest) -> MetaResult<Page<T>> {
        let scope = T::search_scope();
        criteria.ensure_present(scope)?;

        let mut tx = self.store.begin().await?;
        let candidates = match (scope, criteria.id.as_deref(), criteria.parent_id.as_deref()) {
            (None, Some(id), _) => tx.load(T::KIND, id).await?.into_iter().collect(),
            (Some(scope), _, Some(parent_id)) => {
                tx.load_children(scope.relation, parent_id).await?
            }
            _ => tx.list(T::KIND).await?,
        };
        drop(tx);

        let mut rows = active_rows::<T>(candidates)?;
        if scope.is_some() || criteria.id.is_none() {
            if let Some(needle) = &criteria.name {
                rows.retain(|row| name_matches(row.name(), needle));
            }
        }
        Ok(page.slice(rows))
    }

    /// Load a row that must exist and carry `flag`; `mismatch` builds the
    /// error for a row found in the other state
    async fn load_in_state(
        &self,
        tx: &mut dyn Transaction,
        id: &str,
        flag: DeletionFlag,
        mismatch: impl FnOnce() -> EntityError + Send,
    ) -> MetaResult<T> {
        let record = tx
            .load(T::KIND, id)
            .await?
            .ok_or_else(|| not_found::<T>(id))?;
        if record.flag() != flag {
            return Err(mismatch().into());
        }
        Ok(decode::<T>(record)?)
    }
}

fn not_found<T: MetaEntity>(id: &str) -> EntityError {
    EntityError::NotFound {
        kind: T::KIND,
        id: id.to_string(),
    }
}

fn decode<T: MetaEntity>(record: Record) -> Result<T, StorageError> {
    let found = record.kind();
    T::from_record(record).ok_or_else(|| StorageError::IntegrityError {
        message: format!("expected a {} row, found {}", T::KIND, found),
    })
}

fn active_rows<T: MetaEntity>(records: Vec<Record>) -> MetaResult<Vec<T>> {
    records
        .into_iter()
        .filter(|record| record.flag().is_active())
        .map(|record| decode::<T>(record).map_err(Into::into))
        .collect()
}

/// One service per metadata kind, all sharing a single store
#[derive(Clone)]
pub struct MetadataCatalog {
    pub objects: EntityService<Object>,
    pub object_fields: EntityService<ObjectField>,
    pub page_lists: EntityService<PageList>,
    pub page_list_fields: EntityService<PageListField>,
    pub page_layouts: EntityService<PageLayout>,
    pub page_layout_fields: EntityService<PageLayoutField>,
}

impl MetadataCatalog {
    pub fn new(store: Arc<dyn MetadataStore>, pagination: PaginationConfig) -> Self {
        Self {
            objects: EntityService::new(store.clone(), pagination),
            object_fields: EntityService::new(store.clone(), pagination),
            page_lists: EntityService::new(store.clone(), pagination),
            page_list_fields: EntityService::new(store.clone(), pagination),
            page_layouts: EntityService::new(store.clone(), pagination),
            page_layout_fields: EntityService::new(store, pagination),
        }
    }
}
