//! Route table of one metadata kind

use axum::Router;
use axum::routing::{delete, get, post, put};

use super::entity_registry::{EntityDescriptor, EntityRegistry};
use super::handlers::{
    EntityState, create_entity, export_entities, get_entity, hard_delete_entity,
    import_entities, list_all_entities, list_by_parent, list_entities, restore_entity,
    search_entities, soft_delete_entity, update_entity,
};
use crate::core::entity::{EntityKind, MetaEntity};
use crate::core::service::{EntityService, MetadataCatalog};

/// Serves one kind under its singular and plural route segments:
///
/// - `GET /{plural}`, `GET /{plural}/all`, `GET /{plural}/export`,
///   `POST /{plural}/import`
/// - `GET /{plural}/by_*` for kinds owned by a searchable parent
/// - `POST /{singular}`, `GET /{singular}/search`
/// - `GET | PUT | DELETE /{singular}/{id}`
/// - `PUT /{singular}/restore/{id}`, `DELETE /{singular}/permanent_delete/{id}`
pub struct MetaDescriptor<T: MetaEntity> {
    service: EntityService<T>,
}

impl<T: MetaEntity> MetaDescriptor<T> {
    pub fn new(service: EntityService<T>) -> Self {
        Self { service }
    }
}

impl<T: MetaEntity> EntityDescriptor for MetaDescriptor<T> {
    fn kind(&self) -> EntityKind {
        T::KIND
    }

    fn build_routes(&self) -> Router {
        let singular = T::KIND.singular();
        let plural = T::KIND.plural();

        let mut router = Router::new()
            .route(&format!("/{plural}"), get(list_entities::<T>))
            .route(&format!("/{plural}/all"), get(list_all_entities::<T>))
            .route(&format!("/{plural}/export"), get(export_entities::<T>))
            .route(&format!("/{plural}/import"), post(import_entities::<T>))
            .route(&format!("/{singular}"), post(create_entity::<T>))
            .route(&format!("/{singular}/search"), get(search_entities::<T>))
            .route(
                &format!("/{singular}/{{id}}"),
                get(get_entity::<T>)
                    .put(update_entity::<T>)
                    .delete(soft_delete_entity::<T>),
            )
            .route(
                &format!("/{singular}/restore/{{id}}"),
                put(restore_entity::<T>),
            )
            .route(
                &format!("/{singular}/permanent_delete/{{id}}"),
                delete(hard_delete_entity::<T>),
            );

        if let Some(scope) = T::search_scope() {
            router = router.route(
                &format!("/{plural}/{}", scope.route),
                get(list_by_parent::<T>),
            );
        }

        router.with_state(EntityState::new(self.service.clone()))
    }
}

/// Register the six metadata kinds of `catalog`
pub fn register_catalog(registry: &mut EntityRegistry, catalog: &MetadataCatalog) {
    registry.register(Box::new(MetaDescriptor::new(catalog.objects.clone())));
    registry.register(Box::new(MetaDescriptor::new(catalog.object_fields.clone())));
    registry.register(Box::new(MetaDescriptor::new(catalog.page_lists.clone())));
    registry.register(Box::new(MetaDescriptor::new(catalog.page_list_fields.clone())));
    registry.register(Box::new(MetaDescriptor::new(catalog.page_layouts.clone())));
    registry.register(Box::new(MetaDescriptor::new(catalog.page_layout_fields.clone())));
}
