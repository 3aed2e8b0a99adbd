//! Object: a logical data object backed by a physical table

use regex::Regex;
use serde::Deserialize;
use std::sync::LazyLock;
use validator::Validate;

use super::merge;
use crate::core::entity::MetaEntity;

static TABLE_NAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("table name pattern is a valid regex")
});

impl_meta_entity!(
    Object,
    Object,
    foreign_keys: {},
    columns: {
        label: "LABEL",
        table_name: "TABLE_NAME",
    }
);

/// Creation payload for [`Object`]; also used as its patch
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ObjectDraft {
    #[serde(rename = "NAME", default)]
    #[validate(length(max = 255))]
    pub name: Option<String>,

    #[serde(rename = "LABEL", default)]
    #[validate(length(max = 255))]
    pub label: Option<String>,

    #[serde(rename = "TABLE_NAME", default)]
    #[validate(
        length(max = 255),
        regex(path = *TABLE_NAME_PATTERN, message = "must be a valid SQL identifier")
    )]
    pub table_name: Option<String>,
}

pub type ObjectPatch = ObjectDraft;

impl MetaEntity for Object {
    type Draft = ObjectDraft;
    type Patch = ObjectPatch;

    const CSV_COLUMNS: &'static [&'static str] = &["ID", "NAME", "LABEL", "TABLE_NAME"];

    fn from_draft(draft: ObjectDraft) -> Self {
        Object::new(draft.name, draft.label, draft.table_name)
    }

    fn apply_patch(&mut self, patch: ObjectPatch) -> bool {
        let name = merge(&mut self.name, patch.name);
        let label = merge(&mut self.label, patch.label);
        let table_name = merge(&mut self.table_name, patch.table_name);
        name || label || table_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::entity::{DeletionFlag, Entity};

    #[test]
    fn test_from_draft_is_active() {
        let object = Object::from_draft(ObjectDraft {
            name: Some("customer".into()),
            label: Some("Customer".into()),
            table_name: Some("t_customer".into()),
        });
        assert_eq!(object.flag(), DeletionFlag::Active);
        assert_eq!(object.name(), Some("customer"));
        assert_eq!(object.table_name.as_deref(), Some("t_customer"));
    }

    #[test]
    fn test_table_name_must_be_identifier() {
        let draft = ObjectDraft {
            table_name: Some("drop table;".into()),
            ..Default::default()
        };
        assert!(draft.validate().is_err());

        let draft = ObjectDraft {
            table_name: Some("t_order_2".into()),
            ..Default::default()
        };
        assert!(draft.validate().is_ok());
    }

    #[test]
    fn test_patch_merges_supplied_fields_only() {
        let mut object = Object::new(Some("a".into()), Some("A".into()), Some("t_a".into()));
        let changed = object.apply_patch(ObjectPatch {
            label: Some("Alpha".into()),
            ..Default::default()
        });
        assert!(changed);
        assert_eq!(object.name.as_deref(), Some("a"));
        assert_eq!(object.label.as_deref(), Some("Alpha"));
        assert_eq!(object.table_name.as_deref(), Some("t_a"));
    }
}
