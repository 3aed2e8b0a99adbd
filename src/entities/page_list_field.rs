//! PageListField: a list column, owned both by a [`PageList`](super::PageList)
//! and by the [`ObjectField`](super::ObjectField) it displays

use serde::Deserialize;
use validator::Validate;

use super::merge;
use crate::core::entity::{MetaEntity, Relation, SearchScope};

impl_meta_entity!(
    PageListField,
    PageListField,
    foreign_keys: {
        object_field_id: "OBJECT_FIELD_ID" => ObjectFieldListFields,
        page_list_id: "PAGE_LIST_ID" => PageListFields,
    },
    columns: {
        hidden: "HIDDEN",
        field_type: "TYPE",
    }
);

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct PageListFieldDraft {
    #[serde(rename = "OBJECT_FIELD_ID", default)]
    #[validate(length(min = 1, max = 32, message = "OBJECT_FIELD_ID is required"))]
    pub object_field_id: String,

    #[serde(rename = "PAGE_LIST_ID", default)]
    #[validate(length(min = 1, max = 32, message = "PAGE_LIST_ID is required"))]
    pub page_list_id: String,

    #[serde(rename = "NAME", default)]
    #[validate(length(max = 255))]
    pub name: Option<String>,

    #[serde(rename = "HIDDEN", default)]
    #[validate(length(max = 1))]
    pub hidden: Option<String>,

    #[serde(rename = "TYPE", default)]
    #[validate(length(max = 255))]
    pub field_type: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct PageListFieldPatch {
    #[serde(rename = "NAME", default)]
    #[validate(length(max = 255))]
    pub name: Option<String>,

    #[serde(rename = "HIDDEN", default)]
    #[validate(length(max = 1))]
    pub hidden: Option<String>,

    #[serde(rename = "TYPE", default)]
    #[validate(length(max = 255))]
    pub field_type: Option<String>,
}

impl MetaEntity for PageListField {
    type Draft = PageListFieldDraft;
    type Patch = PageListFieldPatch;

    const CSV_COLUMNS: &'static [&'static str] = &[
        "ID",
        "OBJECT_FIELD_ID",
        "PAGE_LIST_ID",
        "NAME",
        "HIDDEN",
        "TYPE",
    ];

    fn from_draft(draft: PageListFieldDraft) -> Self {
        PageListField::new(
            draft.object_field_id,
            draft.page_list_id,
            draft.name,
            draft.hidden,
            draft.field_type,
        )
    }

    fn apply_patch(&mut self, patch: PageListFieldPatch) -> bool {
        let name = merge(&mut self.name, patch.name);
        let hidden = merge(&mut self.hidden, patch.hidden);
        let field_type = merge(&mut self.field_type, patch.field_type);
        name || hidden || field_type
    }

    fn search_scope() -> Option<SearchScope> {
        Some(SearchScope {
            query_key: "pagelist_id",
            relation: Relation::PageListFields,
            route: "by_pagelist",
        })
    }
}
