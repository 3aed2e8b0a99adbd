//! PageLayout: a layout page owned by a [`PageList`](super::PageList)

use serde::Deserialize;
use validator::Validate;

use super::merge;
use crate::core::entity::{MetaEntity, Relation, SearchScope};

impl_meta_entity!(
    PageLayout,
    PageLayout,
    foreign_keys: { page_list_id: "PAGE_LIST_ID" => PageListLayouts },
    columns: {}
);

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct PageLayoutDraft {
    #[serde(rename = "PAGE_LIST_ID", default)]
    #[validate(length(min = 1, max = 32, message = "PAGE_LIST_ID is required"))]
    pub page_list_id: String,

    #[serde(rename = "NAME", default)]
    #[validate(length(max = 255))]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct PageLayoutPatch {
    #[serde(rename = "NAME", default)]
    #[validate(length(max = 255))]
    pub name: Option<String>,
}

impl MetaEntity for PageLayout {
    type Draft = PageLayoutDraft;
    type Patch = PageLayoutPatch;

    const CSV_COLUMNS: &'static [&'static str] = &["ID", "PAGE_LIST_ID", "NAME"];

    fn from_draft(draft: PageLayoutDraft) -> Self {
        PageLayout::new(draft.page_list_id, draft.name)
    }

    fn apply_patch(&mut self, patch: PageLayoutPatch) -> bool {
        merge(&mut self.name, patch.name)
    }

    fn search_scope() -> Option<SearchScope> {
        Some(SearchScope {
            query_key: "pagelist_id",
            relation: Relation::PageListLayouts,
            route: "by_pagelist",
        })
    }
}
