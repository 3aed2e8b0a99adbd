//! # pagemeta
//!
//! Metadata backend for a schema-driven page builder.
//!
//! Six kinds of rows describe an application: objects and their fields,
//! list pages and their columns, form layouts and their fields. Every row
//! carries a deletion flag; soft deleting a row cascades to everything it
//! owns and restoring it brings back exactly what that deletion took.
//!
//! ## Features
//!
//! - **REST API**: CRUD, search and pagination for every kind
//! - **Cascading Soft Delete**: transactional, all-or-nothing, idempotent
//! - **Restore Provenance**: rows deleted on their own stay deleted
//! - **CSV Import/Export**: validated, foreign-key-checked batch import
//! - **YAML Configuration**: listener, page sizes and CORS
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use pagemeta::prelude::*;
//!
//! let app = ServerBuilder::new()
//!     .with_store(InMemoryStore::new())
//!     .with_config(AppConfig::load()?)
//!     .build()?;
//!
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:5000").await?;
//! axum::serve(listener, app).await?;
//! ```

pub mod config;
pub mod core;
pub mod csv;
pub mod entities;
pub mod server;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core ===
    pub use crate::core::{
        cascade::{CascadeReport, RowRef},
        entity::{DeletionFlag, Entity, EntityKind, MetaEntity, Relation},
        error::{EntityError, MetaError, MetaResult, StorageError, ValidationError},
        query::{Page, PageRequest, SearchCriteria},
        service::{EntityService, MetadataCatalog},
        store::{MetadataStore, Transaction},
    };

    // === Entities ===
    pub use crate::entities::{
        Object, ObjectDraft, ObjectField, ObjectFieldDraft, ObjectFieldPatch, ObjectPatch,
        PageLayout, PageLayoutDraft, PageLayoutField, PageLayoutFieldDraft, PageLayoutFieldPatch,
        PageLayoutPatch, PageList, PageListDraft, PageListField, PageListFieldDraft,
        PageListFieldPatch, PageListPatch, Record,
    };

    // === CSV ===
    pub use crate::csv::{ImportSummary, export_csv, import_csv};

    // === Storage ===
    pub use crate::storage::InMemoryStore;

    // === Config ===
    pub use crate::config::{AppConfig, CorsConfig, PaginationConfig, ServerConfig};

    // === Server ===
    pub use crate::server::{EntityDescriptor, EntityRegistry, ServerBuilder};

    // === External dependencies ===
    pub use anyhow::Result;
    pub use async_trait::async_trait;
    pub use chrono::{DateTime, Utc};
    pub use serde::{Deserialize, Serialize};
}
