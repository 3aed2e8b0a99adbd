//! The six metadata row types and the [`Record`] union the store keeps them in

#[macro_use]
pub mod macros;

pub mod object;
pub mod object_field;
pub mod page_layout;
pub mod page_layout_field;
pub mod page_list;
pub mod page_list_field;

pub use object::{Object, ObjectDraft, ObjectPatch};
pub use object_field::{ObjectField, ObjectFieldDraft, ObjectFieldPatch};
pub use page_layout::{PageLayout, PageLayoutDraft, PageLayoutPatch};
pub use page_layout_field::{PageLayoutField, PageLayoutFieldDraft, PageLayoutFieldPatch};
pub use page_list::{PageList, PageListDraft, PageListPatch};
pub use page_list_field::{PageListField, PageListFieldDraft, PageListFieldPatch};

use crate::core::entity::{DeletionFlag, Entity, EntityKind, Relation};
use serde::Serialize;

/// A row of any kind, as held by a [`MetadataStore`](crate::core::store::MetadataStore)
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Record {
    Object(Object),
    ObjectField(ObjectField),
    PageList(PageList),
    PageListField(PageListField),
    PageLayout(PageLayout),
    PageLayoutField(PageLayoutField),
}

macro_rules! dispatch {
    ($record:expr, $row:ident => $body:expr) => {
        match $record {
            Record::Object($row) => $body,
            Record::ObjectField($row) => $body,
            Record::PageList($row) => $body,
            Record::PageListField($row) => $body,
            Record::PageLayout($row) => $body,
            Record::PageLayoutField($row) => $body,
        }
    };
}

impl Record {
    pub fn kind(&self) -> EntityKind {
        match self {
            Record::Object(_) => EntityKind::Object,
            Record::ObjectField(_) => EntityKind::ObjectField,
            Record::PageList(_) => EntityKind::PageList,
            Record::PageListField(_) => EntityKind::PageListField,
            Record::PageLayout(_) => EntityKind::PageLayout,
            Record::PageLayoutField(_) => EntityKind::PageLayoutField,
        }
    }

    pub fn id(&self) -> &str {
        dispatch!(self, row => row.id())
    }

    pub fn name(&self) -> Option<&str> {
        dispatch!(self, row => row.name())
    }

    pub fn flag(&self) -> DeletionFlag {
        dispatch!(self, row => row.flag())
    }

    pub fn set_flag(&mut self, flag: DeletionFlag) {
        dispatch!(self, row => row.set_flag(flag))
    }

    pub fn deletion_cause(&self) -> Option<&str> {
        dispatch!(self, row => row.deletion_cause())
    }

    pub fn set_deletion_cause(&mut self, cause: Option<String>) {
        dispatch!(self, row => row.set_deletion_cause(cause))
    }

    pub fn touch(&mut self) {
        dispatch!(self, row => row.touch())
    }

    pub fn parent_id(&self, relation: Relation) -> Option<&str> {
        dispatch!(self, row => row.parent_id(relation))
    }

    /// Serialize the inner row to its wire JSON
    pub fn to_json(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }
}

/// Overwrite `slot` when a value was supplied
pub(crate) fn merge(slot: &mut Option<String>, value: Option<String>) -> bool {
    match value {
        Some(value) if slot.as_deref() != Some(value.as_str()) => {
            *slot = Some(value);
            true
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_dispatch() {
        let field = ObjectField::new("obj-1", Some("amount".into()), None, Some("decimal".into()));
        let id = field.id.clone();
        let mut record: Record = field.into();

        assert_eq!(record.kind(), EntityKind::ObjectField);
        assert_eq!(record.id(), id);
        assert_eq!(record.name(), Some("amount"));
        assert_eq!(record.parent_id(Relation::ObjectFields), Some("obj-1"));
        assert_eq!(record.parent_id(Relation::PageListFields), None);

        record.set_flag(DeletionFlag::Deleted);
        assert_eq!(record.flag(), DeletionFlag::Deleted);
    }

    #[test]
    fn test_record_round_trips_through_entity() {
        let layout = PageLayout::new("list-1", Some("Detail".into()));
        let record = layout.clone().into_record();
        assert_eq!(PageLayout::from_record(record.clone()), Some(layout));
        assert_eq!(Object::from_record(record), None);
    }

    #[test]
    fn test_wire_shape_uses_column_names() {
        let list_field = PageListField::new(
            "field-1",
            "list-1",
            Some("Amount".into()),
            Some("0".into()),
            Some("number".into()),
        );
        let json = Record::from(list_field).to_json().unwrap();
        assert_eq!(json["OBJECT_FIELD_ID"], "field-1");
        assert_eq!(json["PAGE_LIST_ID"], "list-1");
        assert_eq!(json["HIDDEN"], "0");
        assert_eq!(json["DELETED"], "0");
        assert!(json["ID"].as_str().is_some());
    }

    #[test]
    fn test_merge_only_overwrites_supplied_values() {
        let mut slot = Some("old".to_string());
        assert!(!merge(&mut slot, None));
        assert_eq!(slot.as_deref(), Some("old"));
        assert!(!merge(&mut slot, Some("old".into())));
        assert!(merge(&mut slot, Some("new".into())));
        assert_eq!(slot.as_deref(), Some("new"));
    }
}
