//! Core module containing the row model, cascade engine and services

pub mod cascade;
pub mod entity;
pub mod error;
pub mod query;
pub mod service;
pub mod store;

pub use cascade::{CascadeReport, RowRef};
pub use entity::{DeletionFlag, Entity, EntityKind, MetaEntity, Relation, SearchScope};
pub use error::{MetaError, MetaResult};
pub use query::{Page, PageRequest, QueryParams, SearchCriteria};
pub use service::{EntityService, MetadataCatalog};
pub use store::{MetadataStore, Transaction};
