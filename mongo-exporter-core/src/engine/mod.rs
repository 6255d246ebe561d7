//! Export engine: connection probe, collection enumerator, and export orchestrator.
//!
//! Every operation follows the same lifecycle. Inputs are validated first and
//! a validation failure never touches the connector. Otherwise exactly one
//! session is opened, the operation body runs against it, and the session is
//! closed exactly once before the result (success or failure) is returned.
//!
//! # Module Structure
//! - `probe`: database listing with system databases removed
//! - `collections`: collection listing with isolated document counts
//! - `export`: collection set resolution and bulk retrieval

use crate::source::{Connector, Session};
use crate::{ConnectionConfig, ConnectionTarget, Result};
use std::sync::Arc;

mod collections;
mod export;
mod probe;

#[cfg(test)]
mod tests;

pub use collections::MISSING_DATABASE_MESSAGE;
pub use probe::SYSTEM_DATABASES;

/// Stateless entry point for the three engine operations.
///
/// The engine holds no connection between calls. Connection targets are
/// borrowed per call and never retained.
///
/// # Example
/// ```rust
/// use mongo_exporter_core::source::{InMemoryConnector, InMemoryDatabase};
/// use mongo_exporter_core::{ConnectionConfig, ConnectionTarget, ExportEngine};
/// use serde_json::json;
/// use std::sync::Arc;
///
/// # tokio_test_block(async {
/// let connector = InMemoryConnector::builder()
///     .database(InMemoryDatabase::new("shop").with_collection("users", vec![json!({"n": 1})]))
///     .build();
/// let engine = ExportEngine::new(Arc::new(connector), ConnectionConfig::default()).unwrap();
/// let target = ConnectionTarget::new("mongodb://localhost:27017").unwrap();
///
/// let payload = engine.export(&target, "shop", None).await.unwrap();
/// assert_eq!(payload.document_count(), 1);
/// # });
/// # fn tokio_test_block<F: std::future::Future>(f: F) -> F::Output {
/// #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
/// # }
/// ```
#[derive(Clone)]
pub struct ExportEngine {
    connector: Arc<dyn Connector>,
    config: ConnectionConfig,
}

impl std::fmt::Debug for ExportEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExportEngine")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ExportEngine {
    /// Creates an engine over `connector`.
    ///
    /// # Errors
    /// Returns `ExportError::Configuration` if `config` fails validation.
    pub fn new(connector: Arc<dyn Connector>, config: ConnectionConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { connector, config })
    }

    /// Creates an engine backed by the MongoDB driver.
    #[cfg(feature = "mongodb")]
    pub fn mongodb(config: ConnectionConfig) -> Result<Self> {
        Self::new(Arc::new(crate::source::MongoConnector::new()), config)
    }

    /// Gets the engine configuration.
    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// Opens the single session an operation runs against.
    async fn open_session(&self, target: &ConnectionTarget) -> Result<Box<dyn Session>> {
        tracing::debug!(
            "Opening session to {} (connect timeout: {:?}, server selection timeout: {:?})",
            target,
            self.config.connect_timeout,
            self.config.server_selection_timeout
        );
        self.connector.open(target, &self.config).await
    }
}
