//! PageList: a list-view page

use serde::Deserialize;
use validator::Validate;

use super::merge;
use crate::core::entity::MetaEntity;

impl_meta_entity!(
    PageList,
    PageList,
    foreign_keys: {},
    columns: {
        label: "LABEL",
    }
);

/// Creation payload for [`PageList`]; also used as its patch
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct PageListDraft {
    #[serde(rename = "NAME", default)]
    #[validate(length(max = 255))]
    pub name: Option<String>,

    #[serde(rename = "LABEL", default)]
    #[validate(length(max = 255))]
    pub label: Option<String>,
}

pub type PageListPatch = PageListDraft;

impl MetaEntity for PageList {
    type Draft = PageListDraft;
    type Patch = PageListPatch;

    const CSV_COLUMNS: &'static [&'static str] = &["ID", "NAME", "LABEL"];

    fn from_draft(draft: PageListDraft) -> Self {
        PageList::new(draft.name, draft.label)
    }

    fn apply_patch(&mut self, patch: PageListPatch) -> bool {
        let name = merge(&mut self.name, patch.name);
        let label = merge(&mut self.label, patch.label);
        name || label
    }
}
