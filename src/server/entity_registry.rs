//! Entity registry collecting per-kind route descriptors

use axum::Router;
use std::collections::BTreeMap;

use crate::core::entity::EntityKind;

/// Trait that describes how to build routes for one metadata kind
pub trait EntityDescriptor: Send + Sync {
    fn kind(&self) -> EntityKind;

    /// Singular route segment (e.g. "object_field")
    fn entity_type(&self) -> &'static str {
        self.kind().singular()
    }

    /// Plural route segment (e.g. "object_fields")
    fn plural(&self) -> &'static str {
        self.kind().plural()
    }

    /// Build the routes for this kind, state already applied
    fn build_routes(&self) -> Router;
}

/// Registry for all metadata kinds served by the application
#[derive(Default)]
pub struct EntityRegistry {
    descriptors: BTreeMap<EntityKind, Box<dyn EntityDescriptor>>,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a descriptor; a second one for the same kind replaces the first
    pub fn register(&mut self, descriptor: Box<dyn EntityDescriptor>) {
        if let Some(previous) = self.descriptors.insert(descriptor.kind(), descriptor) {
            tracing::warn!(kind = %previous.kind(), "entity descriptor replaced");
        }
    }

    /// Merge the routes of every registered kind
    pub fn build_routes(&self) -> Router {
        self.descriptors
            .values()
            .fold(Router::new(), |router, descriptor| {
                router.merge(descriptor.build_routes())
            })
    }

    /// Registered kinds in declaration order
    pub fn kinds(&self) -> Vec<EntityKind> {
        self.descriptors.keys().copied().collect()
    }

    pub fn entity_types(&self) -> Vec<&'static str> {
        self.descriptors.values().map(|d| d.entity_type()).collect()
    }
}
