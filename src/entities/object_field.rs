//! ObjectField: a field definition owned by an [`Object`](super::Object)

use serde::Deserialize;
use validator::Validate;

use super::merge;
use crate::core::entity::{MetaEntity, Relation, SearchScope};

impl_meta_entity!(
    ObjectField,
    ObjectField,
    foreign_keys: { object_id: "OBJECT_ID" => ObjectFields },
    columns: {
        label: "LABEL",
        field_type: "TYPE",
    }
);

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ObjectFieldDraft {
    #[serde(rename = "OBJECT_ID", default)]
    #[validate(length(min = 1, max = 32, message = "OBJECT_ID is required"))]
    pub object_id: String,

    #[serde(rename = "NAME", default)]
    #[validate(length(max = 255))]
    pub name: Option<String>,

    #[serde(rename = "LABEL", default)]
    #[validate(length(max = 255))]
    pub label: Option<String>,

    #[serde(rename = "TYPE", default)]
    #[validate(length(max = 255))]
    pub field_type: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ObjectFieldPatch {
    #[serde(rename = "NAME", default)]
    #[validate(length(max = 255))]
    pub name: Option<String>,

    #[serde(rename = "LABEL", default)]
    #[validate(length(max = 255))]
    pub label: Option<String>,

    #[serde(rename = "TYPE", default)]
    #[validate(length(max = 255))]
    pub field_type: Option<String>,
}

impl MetaEntity for ObjectField {
    type Draft = ObjectFieldDraft;
    type Patch = ObjectFieldPatch;

    const CSV_COLUMNS: &'static [&'static str] = &["ID", "OBJECT_ID", "NAME", "LABEL", "TYPE"];

    fn from_draft(draft: ObjectFieldDraft) -> Self {
        ObjectField::new(draft.object_id, draft.name, draft.label, draft.field_type)
    }

    fn apply_patch(&mut self, patch: ObjectFieldPatch) -> bool {
        let name = merge(&mut self.name, patch.name);
        let label = merge(&mut self.label, patch.label);
        let field_type = merge(&mut self.field_type, patch.field_type);
        name || label || field_type
    }

    fn search_scope() -> Option<SearchScope> {
        Some(SearchScope {
            query_key: "obj_id",
            relation: Relation::ObjectFields,
            route: "by_objid",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_object_id_fails_validation() {
        let draft: ObjectFieldDraft = serde_json::from_value(serde_json::json!({
            "NAME": "amount"
        }))
        .unwrap();
        let errors = draft.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("object_id"));
    }

    #[test]
    fn test_patch_leaves_foreign_key_untouched() {
        let mut field = ObjectField::new("obj-1", Some("amount".into()), None, None);
        field.apply_patch(ObjectFieldPatch {
            field_type: Some("decimal".into()),
            ..Default::default()
        });
        assert_eq!(field.object_id, "obj-1");
        assert_eq!(field.field_type.as_deref(), Some("decimal"));
        assert_eq!(field.name.as_deref(), Some("amount"));
    }
}
