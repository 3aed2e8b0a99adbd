//! ServerBuilder for fluent API to build HTTP servers

use super::descriptor::register_catalog;
use super::entity_registry::EntityRegistry;
use super::router::{apply_layers, health_routes};
use crate::config::AppConfig;
use crate::core::service::MetadataCatalog;
use crate::core::store::MetadataStore;
use anyhow::Result;
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Builder for the metadata HTTP server
///
/// # Example
///
/// ```ignore
/// let app = ServerBuilder::new()
///     .with_store(InMemoryStore::new())
///     .with_config(AppConfig::load()?)
///     .build()?;
/// ```
pub struct ServerBuilder {
    store: Option<Arc<dyn MetadataStore>>,
    config: AppConfig,
    custom_routes: Vec<Router>,
}

impl ServerBuilder {
    pub fn new() -> Self {
        Self {
            store: None,
            config: AppConfig::default(),
            custom_routes: Vec::new(),
        }
    }

    /// Set the metadata store (required)
    pub fn with_store(mut self, store: impl MetadataStore + 'static) -> Self {
        self.store = Some(Arc::new(store));
        self
    }

    pub fn with_config(mut self, config: AppConfig) -> Self {
        self.config = config;
        self
    }

    /// Add routes outside the metadata CRUD surface
    pub fn with_custom_routes(mut self, routes: Router) -> Self {
        self.custom_routes.push(routes);
        self
    }

    /// Build the services of every metadata kind over the configured store
    pub fn build_catalog(&self) -> Result<MetadataCatalog> {
        let store = self
            .store
            .clone()
            .ok_or_else(|| anyhow::anyhow!("MetadataStore is required. Call .with_store()"))?;
        self.config.validate()?;
        Ok(MetadataCatalog::new(store, self.config.pagination))
    }

    /// Build the final router:
    /// - health routes
    /// - the routes of all six metadata kinds
    /// - custom routes
    /// - fallback, tracing and CORS layers
    pub fn build(self) -> Result<Router> {
        let catalog = self.build_catalog()?;

        let mut registry = EntityRegistry::new();
        register_catalog(&mut registry, &catalog);
        tracing::debug!(kinds = ?registry.entity_types(), "registered metadata routes");

        let mut app = health_routes().merge(registry.build_routes());
        for custom_router in self.custom_routes {
            app = app.merge(custom_router);
        }

        Ok(apply_layers(app, &self.config.cors)?)
    }

    /// Serve on the configured address until SIGTERM or Ctrl+C
    pub async fn serve(self) -> Result<()> {
        let addr = self.config.bind_addr();
        let backend = self.store.as_ref().map(|s| s.backend()).unwrap_or("none");
        let app = self.build()?;
        let listener = TcpListener::bind(&addr).await?;

        tracing::info!(addr = %addr, backend, "server listening");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("server shutdown complete");
        Ok(())
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Wait for SIGTERM or Ctrl+C
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("received Ctrl+C, shutting down");
        },
        _ = terminate => {
            tracing::info!("received SIGTERM, shutting down");
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PaginationConfig;
    use crate::storage::InMemoryStore;

    #[test]
    fn test_new_creates_empty_builder() {
        let builder = ServerBuilder::new();
        assert!(builder.store.is_none());
        assert!(builder.custom_routes.is_empty());
        assert_eq!(builder.config, AppConfig::default());
    }

    #[test]
    fn test_with_store_sets_store() {
        let builder = ServerBuilder::new().with_store(InMemoryStore::new());
        assert!(builder.store.is_some());
    }

    #[test]
    fn test_with_custom_routes_appends_router() {
        let builder = ServerBuilder::new()
            .with_custom_routes(Router::new())
            .with_custom_routes(Router::new());
        assert_eq!(builder.custom_routes.len(), 2);
    }

    #[test]
    fn test_build_without_store_fails() {
        let err = ServerBuilder::new().build().err().expect("should be Err");
        assert!(err.to_string().contains("MetadataStore is required"));
    }

    #[test]
    fn test_build_rejects_invalid_config() {
        let mut config = AppConfig::default();
        config.pagination = PaginationConfig {
            default_page_size: 50,
            max_page_size: 10,
        };
        let result = ServerBuilder::new()
            .with_store(InMemoryStore::new())
            .with_config(config)
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_build_produces_router() {
        let result = ServerBuilder::new()
            .with_store(InMemoryStore::new())
            .with_custom_routes(Router::new())
            .build();
        assert!(result.is_ok());
    }
}
