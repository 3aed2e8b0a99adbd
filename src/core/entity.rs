//! Entity traits and the ownership graph shared by every metadata kind

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use validator::Validate;

use crate::entities::Record;

/// Soft-deletion state of a row.
///
/// The canonical storage literals are `"0"` (active) and `"1"` (deleted).
/// Older snapshots of the schema used `"N"` / `"Y"`; those are accepted when
/// reading but never written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DeletionFlag {
    #[default]
    Active,
    Deleted,
}

impl DeletionFlag {
    /// Canonical storage literal
    pub const fn code(self) -> &'static str {
        match self {
            DeletionFlag::Active => "0",
            DeletionFlag::Deleted => "1",
        }
    }

    /// Parse a storage literal, including the legacy `N`/`Y` pair
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "0" | "N" | "n" => Some(DeletionFlag::Active),
            "1" | "Y" | "y" => Some(DeletionFlag::Deleted),
            _ => None,
        }
    }

    pub fn is_deleted(self) -> bool {
        self == DeletionFlag::Deleted
    }

    pub fn is_active(self) -> bool {
        self == DeletionFlag::Active
    }
}

impl fmt::Display for DeletionFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for DeletionFlag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_code(s).ok_or_else(|| format!("unknown deletion flag literal '{}'", s))
    }
}

impl Serialize for DeletionFlag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code())
    }
}

impl<'de> Deserialize<'de> for DeletionFlag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// The six metadata kinds managed by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Object,
    ObjectField,
    PageList,
    PageListField,
    PageLayout,
    PageLayoutField,
}

impl EntityKind {
    pub const ALL: [EntityKind; 6] = [
        EntityKind::Object,
        EntityKind::ObjectField,
        EntityKind::PageList,
        EntityKind::PageListField,
        EntityKind::PageLayout,
        EntityKind::PageLayoutField,
    ];

    /// Display label used in messages (e.g. "PageListField")
    pub const fn label(self) -> &'static str {
        match self {
            EntityKind::Object => "Object",
            EntityKind::ObjectField => "ObjectField",
            EntityKind::PageList => "PageList",
            EntityKind::PageListField => "PageListField",
            EntityKind::PageLayout => "PageLayout",
            EntityKind::PageLayoutField => "PageLayoutField",
        }
    }

    /// Singular route segment (e.g. "page_list_field")
    pub const fn singular(self) -> &'static str {
        match self {
            EntityKind::Object => "object",
            EntityKind::ObjectField => "object_field",
            EntityKind::PageList => "page_list",
            EntityKind::PageListField => "page_list_field",
            EntityKind::PageLayout => "page_layout",
            EntityKind::PageLayoutField => "page_layout_field",
        }
    }

    /// Plural route segment (e.g. "page_list_fields")
    pub const fn plural(self) -> &'static str {
        match self {
            EntityKind::Object => "objects",
            EntityKind::ObjectField => "object_fields",
            EntityKind::PageList => "page_lists",
            EntityKind::PageListField => "page_list_fields",
            EntityKind::PageLayout => "page_layouts",
            EntityKind::PageLayoutField => "page_layout_fields",
        }
    }

    /// Ownership edges leaving this kind, in cascade order
    pub const fn owned_relations(self) -> &'static [Relation] {
        match self {
            EntityKind::Object => &[Relation::ObjectFields],
            EntityKind::ObjectField => &[
                Relation::ObjectFieldListFields,
                Relation::ObjectFieldLayoutFields,
            ],
            EntityKind::PageList => &[Relation::PageListFields, Relation::PageListLayouts],
            EntityKind::PageLayout => &[Relation::PageLayoutFields],
            EntityKind::PageListField | EntityKind::PageLayoutField => &[],
        }
    }

    /// Ownership edges arriving at this kind (one per required foreign key)
    pub fn parent_relations(self) -> impl Iterator<Item = Relation> {
        Relation::ALL
            .into_iter()
            .filter(move |relation| relation.child() == self)
    }

    pub fn is_leaf(self) -> bool {
        self.owned_relations().is_empty()
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A one-to-many ownership edge, resolved through the child's foreign key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Relation {
    /// Object → ObjectField via `OBJECT_ID`
    ObjectFields,
    /// ObjectField → PageListField via `OBJECT_FIELD_ID`
    ObjectFieldListFields,
    /// ObjectField → PageLayoutField via `OBJECT_FIELD_ID`
    ObjectFieldLayoutFields,
    /// PageList → PageListField via `PAGE_LIST_ID`
    PageListFields,
    /// PageList → PageLayout via `PAGE_LIST_ID`
    PageListLayouts,
    /// PageLayout → PageLayoutField via `PAGE_LAYOUT_ID`
    PageLayoutFields,
}

impl Relation {
    pub const ALL: [Relation; 6] = [
        Relation::ObjectFields,
        Relation::ObjectFieldListFields,
        Relation::ObjectFieldLayoutFields,
        Relation::PageListFields,
        Relation::PageListLayouts,
        Relation::PageLayoutFields,
    ];

    pub const fn parent(self) -> EntityKind {
        match self {
            Relation::ObjectFields => EntityKind::Object,
            Relation::ObjectFieldListFields | Relation::ObjectFieldLayoutFields => {
                EntityKind::ObjectField
            }
            Relation::PageListFields | Relation::PageListLayouts => EntityKind::PageList,
            Relation::PageLayoutFields => EntityKind::PageLayout,
        }
    }

    pub const fn child(self) -> EntityKind {
        match self {
            Relation::ObjectFields => EntityKind::ObjectField,
            Relation::ObjectFieldListFields | Relation::PageListFields => {
                EntityKind::PageListField
            }
            Relation::ObjectFieldLayoutFields | Relation::PageLayoutFields => {
                EntityKind::PageLayoutField
            }
            Relation::PageListLayouts => EntityKind::PageLayout,
        }
    }

    /// Column on the child holding the parent's id
    pub const fn foreign_key(self) -> &'static str {
        match self {
            Relation::ObjectFields => "OBJECT_ID",
            Relation::ObjectFieldListFields | Relation::ObjectFieldLayoutFields => {
                "OBJECT_FIELD_ID"
            }
            Relation::PageListFields | Relation::PageListLayouts => "PAGE_LIST_ID",
            Relation::PageLayoutFields => "PAGE_LAYOUT_ID",
        }
    }
}

/// Base trait for every metadata row.
///
/// All rows have:
/// - an opaque string id, generated at creation and never reused
/// - a [`DeletionFlag`]
/// - an optional `NAME`
/// - creation / modification timestamps
pub trait Entity: Clone + fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static {
    const KIND: EntityKind;

    fn id(&self) -> &str;

    fn name(&self) -> Option<&str>;

    fn flag(&self) -> DeletionFlag;

    fn set_flag(&mut self, flag: DeletionFlag);

    /// Id of the row whose soft delete flipped this one; `None` while active
    fn deletion_cause(&self) -> Option<&str>;

    fn set_deletion_cause(&mut self, cause: Option<String>);

    /// Bump `updated_at` to now
    fn touch(&mut self);

    /// The parent id held for `relation`, if this kind is its child side
    fn parent_id(&self, relation: Relation) -> Option<&str>;

    fn into_record(self) -> Record;

    fn from_record(record: Record) -> Option<Self>;

    fn is_deleted(&self) -> bool {
        self.flag().is_deleted()
    }
}

/// Where a child kind's search and `by_*` routes are scoped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchScope {
    /// Query-string key carrying the parent id (e.g. `obj_id`)
    pub query_key: &'static str,
    /// Ownership edge the parent id is resolved through
    pub relation: Relation,
    /// Extra list route under the plural segment (e.g. `by_objid`)
    pub route: &'static str,
}

/// Request-facing contract of a metadata kind: how it is created from a
/// draft, patched, and searched.
pub trait MetaEntity: Entity {
    /// Creation payload
    type Draft: DeserializeOwned + Validate + Send + Sync + 'static;

    /// Partial update payload; `None` fields leave the row unchanged
    type Patch: DeserializeOwned + Validate + Default + Send + Sync + 'static;

    /// Columns written by CSV export, in order
    const CSV_COLUMNS: &'static [&'static str];

    /// Build a new active row with a fresh id
    fn from_draft(draft: Self::Draft) -> Self;

    /// Merge a patch into this row, returning whether anything changed
    fn apply_patch(&mut self, patch: Self::Patch) -> bool;

    /// Parent-scoped search, or `None` when the kind is searched by id/name
    fn search_scope() -> Option<SearchScope> {
        None
    }
}

/// Fresh opaque identifier: 32 lowercase hex characters
pub fn new_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_codes() {
        assert_eq!(DeletionFlag::Active.code(), "0");
        assert_eq!(DeletionFlag::Deleted.code(), "1");
        assert_eq!(DeletionFlag::from_code("0"), Some(DeletionFlag::Active));
        assert_eq!(DeletionFlag::from_code("1"), Some(DeletionFlag::Deleted));
        assert_eq!(DeletionFlag::from_code("x"), None);
    }

    #[test]
    fn test_legacy_flag_codes_are_read_but_not_written() {
        let flag: DeletionFlag = serde_json::from_str("\"Y\"").unwrap();
        assert_eq!(flag, DeletionFlag::Deleted);
        assert_eq!(serde_json::to_string(&flag).unwrap(), "\"1\"");

        let flag: DeletionFlag = "N".parse().unwrap();
        assert_eq!(flag, DeletionFlag::Active);
        assert_eq!(flag.to_string(), "0");
    }

    #[test]
    fn test_unknown_flag_literal_is_rejected() {
        assert!(serde_json::from_str::<DeletionFlag>("\"2\"").is_err());
    }

    #[test]
    fn test_relations_point_downward() {
        for relation in Relation::ALL {
            assert!(relation.parent().owned_relations().contains(&relation));
            assert_ne!(relation.parent(), relation.child());
        }
    }

    #[test]
    fn test_leaves_and_dual_parents() {
        assert!(EntityKind::PageListField.is_leaf());
        assert!(EntityKind::PageLayoutField.is_leaf());
        assert!(!EntityKind::ObjectField.is_leaf());

        assert_eq!(EntityKind::PageListField.parent_relations().count(), 2);
        assert_eq!(EntityKind::PageLayoutField.parent_relations().count(), 2);
        assert_eq!(EntityKind::PageLayout.parent_relations().count(), 1);
        assert_eq!(EntityKind::Object.parent_relations().count(), 0);
        assert_eq!(EntityKind::PageList.parent_relations().count(), 0);
    }

    #[test]
    fn test_route_segments() {
        assert_eq!(EntityKind::PageLayoutField.singular(), "page_layout_field");
        assert_eq!(EntityKind::PageLayoutField.plural(), "page_layout_fields");
        assert_eq!(EntityKind::Object.label(), "Object");
    }

    #[test]
    fn test_new_id_shape() {
        let id = new_id();
        assert_eq!(id.len(), 32);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(id, new_id());
    }
}
