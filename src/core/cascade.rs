//! Cascading soft-delete / restore over the ownership graph
//!
//! A flag change on an owning row is pushed down to every row reachable
//! through ownership edges ([`Relation`]). The walk is an explicit worklist
//! over rows fetched by foreign key, so it never holds references between
//! rows and never recurses.
//!
//! A child that already carries the target flag is skipped and not
//! descended into. This is what makes a repeated cascade a no-op, and what
//! keeps dual-parent leaves (PageListField, PageLayoutField) from being
//! processed twice when both of their parents cascade.
//!
//! Every row flipped to deleted remembers the root of the soft delete that
//! flipped it (`DELETED_BY`). A restore only revives rows carrying the same
//! cause as its root, so rows deleted on their own before the cascade stay
//! deleted. A revived row whose other parent is still deleted is left
//! deleted and re-attributed to that parent's cause instead.
//!
//! The engine only stages writes on the caller's [`Transaction`]; it never
//! commits. Its only failure mode is a storage error, after which the
//! caller drops the transaction and nothing is persisted.

use serde::Serialize;

use crate::core::entity::{DeletionFlag, EntityKind, Relation};
use crate::core::error::StorageError;
use crate::core::store::Transaction;
use crate::entities::Record;

/// Identity of a row touched by a cascade
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct RowRef {
    pub kind: EntityKind,
    pub id: String,
}

impl RowRef {
    pub fn new(kind: EntityKind, id: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
        }
    }
}

/// Outcome of a flag transition on one root row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CascadeReport {
    pub root: RowRef,
    pub target: DeletionFlag,
    /// Descendants whose flag was flipped, in visiting order
    pub descendants: Vec<RowRef>,
    /// Rows a restore left deleted because another parent is still deleted
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub held: Vec<RowRef>,
}

impl CascadeReport {
    /// Rows changed, the root included
    pub fn affected(&self) -> usize {
        self.descendants.len() + 1
    }

    pub fn touched(&self, kind: EntityKind, id: &str) -> bool {
        self.descendants
            .iter()
            .any(|row| row.kind == kind && row.id == id)
    }
}

struct Walk {
    target: DeletionFlag,
    cause: Option<String>,
    pending: Vec<RowRef>,
    flipped: Vec<RowRef>,
    held: Vec<RowRef>,
}

/// Set `root`'s flag to `target`, stage it, and cascade into its subtree.
///
/// The root is written first so the walk below it always observes the
/// parent in its final state.
pub async fn transition(
    tx: &mut dyn Transaction,
    mut root: Record,
    target: DeletionFlag,
) -> Result<CascadeReport, StorageError> {
    let root_ref = RowRef::new(root.kind(), root.id());
    let cause = match target {
        DeletionFlag::Deleted => Some(root_ref.id.clone()),
        DeletionFlag::Active => root.deletion_cause().map(str::to_string),
    };

    root.set_flag(target);
    root.set_deletion_cause(if target.is_deleted() { cause.clone() } else { None });
    root.touch();
    tx.save(root).await?;

    let walk = walk(tx, root_ref.clone(), target, cause).await?;

    Ok(CascadeReport {
        root: root_ref,
        target,
        descendants: walk.flipped,
        held: walk.held,
    })
}

/// Propagate `target` to every descendant of the row `(kind, id)`.
///
/// Precondition: the row itself already carries `target`. For a restore,
/// `cause` is the deletion cause the root carried before it was revived.
/// Returns the descendants that were flipped.
pub async fn cascade(
    tx: &mut dyn Transaction,
    kind: EntityKind,
    id: &str,
    target: DeletionFlag,
    cause: Option<&str>,
) -> Result<Vec<RowRef>, StorageError> {
    let walk = walk(tx, RowRef::new(kind, id), target, cause.map(str::to_string)).await?;
    Ok(walk.flipped)
}

async fn walk(
    tx: &mut dyn Transaction,
    root: RowRef,
    target: DeletionFlag,
    cause: Option<String>,
) -> Result<Walk, StorageError> {
    let mut walk = Walk {
        target,
        cause,
        pending: vec![root],
        flipped: Vec::new(),
        held: Vec::new(),
    };

    while let Some(parent) = walk.pending.pop() {
        for relation in parent.kind.owned_relations() {
            flip_children(tx, *relation, &parent.id, &mut walk).await?;
        }
    }

    Ok(walk)
}

async fn flip_children(
    tx: &mut dyn Transaction,
    relation: Relation,
    parent_id: &str,
    walk: &mut Walk,
) -> Result<(), StorageError> {
    for mut child in tx.load_children(relation, parent_id).await? {
        if child.flag() == walk.target {
            continue;
        }

        let row = RowRef::new(child.kind(), child.id());

        if walk.target.is_active() {
            if child.deletion_cause() != walk.cause.as_deref() {
                continue;
            }
            if let Some(holder) = deleted_co_parent(tx, &child, relation).await? {
                child.set_deletion_cause(holder.deletion_cause().map(str::to_string));
                tx.save(child).await?;
                tracing::debug!(
                    child = %row.id,
                    holder = %holder.id(),
                    "restore held back by deleted parent"
                );
                walk.held.push(row);
                continue;
            }
            child.set_deletion_cause(None);
        } else {
            child.set_deletion_cause(walk.cause.clone());
        }

        child.set_flag(walk.target);
        child.touch();
        tx.save(child).await?;

        tracing::trace!(
            relation = ?relation,
            parent_id,
            child = %row.id,
            flag = %walk.target,
            "cascaded flag"
        );

        if !row.kind.is_leaf() {
            walk.pending.push(row.clone());
        }
        walk.flipped.push(row);
    }
    Ok(())
}

/// A deleted parent of `child` other than the one reached through `via`
async fn deleted_co_parent(
    tx: &mut dyn Transaction,
    child: &Record,
    via: Relation,
) -> Result<Option<Record>, StorageError> {
    for relation in child.kind().parent_relations() {
        if relation == via {
            continue;
        }
        let Some(parent_id) = child.parent_id(relation) else {
            continue;
        };
        if let Some(parent) = tx.load(relation.parent(), parent_id).await? {
            if parent.flag().is_deleted() {
                return Ok(Some(parent));
            }
        }
    }
    Ok(None)
}
