//! HTTP surface of the metadata backend
//!
//! `ServerBuilder` wires a [`MetadataStore`](crate::core::store::MetadataStore)
//! into one [`EntityService`](crate::core::service::EntityService) per kind and
//! registers:
//! - CRUD, soft delete, restore, search and CSV routes for all six kinds
//! - health routes
//! - CORS, request tracing and a JSON 404 fallback

pub mod builder;
pub mod descriptor;
pub mod entity_registry;
pub mod extract;
pub mod handlers;
pub mod router;

pub use builder::ServerBuilder;
pub use descriptor::MetaDescriptor;
pub use entity_registry::{EntityDescriptor, EntityRegistry};
pub use extract::Payload;
pub use handlers::{EntityState, MutationResponse};
