//! Shared test harness for metadata store backends
//!
//! Provides row builders for every kind and the `metadata_store_tests!`
//! macro that checks a [`MetadataStore`] against the transaction contract.
//!
//! # Usage
//!
//! From any integration test file in `tests/`:
//! ```rust,ignore
//! #[macro_use]
//! mod store_harness;
//! use store_harness::*;
//! ```

#![allow(dead_code)]

#[macro_use]
pub mod transaction_tests;

use pagemeta::entities::{
    Object, ObjectField, PageLayout, PageLayoutField, PageList, PageListField, Record,
};

pub fn object(name: &str) -> Object {
    Object::new(Some(name.to_string()), None, Some(format!("t_{name}")))
}

pub fn object_field(object_id: &str, name: &str) -> ObjectField {
    ObjectField::new(object_id, Some(name.to_string()), None, Some("text".into()))
}

pub fn page_list(name: &str) -> PageList {
    PageList::new(Some(name.to_string()), None)
}

pub fn page_list_field(object_field_id: &str, page_list_id: &str) -> PageListField {
    PageListField::new(object_field_id, page_list_id, None, Some("N".into()), None)
}

pub fn page_layout(page_list_id: &str, name: &str) -> PageLayout {
    PageLayout::new(page_list_id, Some(name.to_string()))
}

pub fn page_layout_field(page_layout_id: &str, object_field_id: &str) -> PageLayoutField {
    PageLayoutField::new(page_layout_id, object_field_id, None, None, None)
}

/// Ids of a small application touching all six kinds:
///
/// ```text
/// object ── field_a ─┬─ list_field_a ── list
///          field_b  └─ layout_field_a ── layout ── list
/// ```
#[derive(Debug, Clone)]
pub struct Tree {
    pub object: String,
    pub field_a: String,
    pub field_b: String,
    pub list: String,
    pub list_field_a: String,
    pub layout: String,
    pub layout_field_a: String,
}

impl Tree {
    /// Build the rows without persisting them
    pub fn records() -> (Self, Vec<Record>) {
        let object = object("customer");
        let field_a = object_field(&object.id, "email");
        let field_b = object_field(&object.id, "phone");
        let list = page_list("customers");
        let list_field_a = page_list_field(&field_a.id, &list.id);
        let layout = page_layout(&list.id, "customer_form");
        let layout_field_a = page_layout_field(&layout.id, &field_a.id);

        let tree = Tree {
            object: object.id.clone(),
            field_a: field_a.id.clone(),
            field_b: field_b.id.clone(),
            list: list.id.clone(),
            list_field_a: list_field_a.id.clone(),
            layout: layout.id.clone(),
            layout_field_a: layout_field_a.id.clone(),
        };
        let records = vec![
            object.into(),
            field_a.into(),
            field_b.into(),
            list.into(),
            list_field_a.into(),
            layout.into(),
            layout_field_a.into(),
        ];
        (tree, records)
    }
}
