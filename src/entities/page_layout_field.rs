//! PageLayoutField: a form field, owned both by a [`PageLayout`](super::PageLayout)
//! and by the [`ObjectField`](super::ObjectField) it edits

use serde::Deserialize;
use validator::Validate;

use super::merge;
use crate::core::entity::{MetaEntity, Relation, SearchScope};

impl_meta_entity!(
    PageLayoutField,
    PageLayoutField,
    foreign_keys: {
        page_layout_id: "PAGE_LAYOUT_ID" => PageLayoutFields,
        object_field_id: "OBJECT_FIELD_ID" => ObjectFieldLayoutFields,
    },
    columns: {
        label: "LABEL",
        field_type: "TYPE",
    }
);

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct PageLayoutFieldDraft {
    #[serde(rename = "PAGE_LAYOUT_ID", default)]
    #[validate(length(min = 1, max = 32, message = "PAGE_LAYOUT_ID is required"))]
    pub page_layout_id: String,

    #[serde(rename = "OBJECT_FIELD_ID", default)]
    #[validate(length(min = 1, max = 32, message = "OBJECT_FIELD_ID is required"))]
    pub object_field_id: String,

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
pub struct PageLayoutFieldPatch {
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

impl MetaEntity for PageLayoutField {
    type Draft = PageLayoutFieldDraft;
    type Patch = PageLayoutFieldPatch;

    const CSV_COLUMNS: &'static [&'static str] = &[
        "ID",
        "PAGE_LAYOUT_ID",
        "OBJECT_FIELD_ID",
        "NAME",
        "LABEL",
        "TYPE",
    ];

    fn from_draft(draft: PageLayoutFieldDraft) -> Self {
        PageLayoutField::new(
            draft.page_layout_id,
            draft.object_field_id,
            draft.name,
            draft.label,
            draft.field_type,
        )
    }

    fn apply_patch(&mut self, patch: PageLayoutFieldPatch) -> bool {
        let name = merge(&mut self.name, patch.name);
        let label = merge(&mut self.label, patch.label);
        let field_type = merge(&mut self.field_type, patch.field_type);
        name || label || field_type
    }

    fn search_scope() -> Option<SearchScope> {
        Some(SearchScope {
            query_key: "pagelayout_id",
            relation: Relation::PageLayoutFields,
            route: "by_pagelayout",
        })
    }
}
