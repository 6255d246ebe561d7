//! Document source traits and implementations.
//!
//! The engine never talks to a driver directly. It asks a [`Connector`] for a
//! [`Session`], performs its reads, and closes the session. This module
//! defines that seam and the two sources behind it.
//!
//! # Module Structure
//! - `mongodb`: MongoDB driver source (feature `mongodb`)
//! - `memory`: Deterministic in-process source with failure injection

use crate::models::CollectionKind;
use crate::{ConnectionConfig, ConnectionTarget, Result};
use async_trait::async_trait;

pub mod memory;
#[cfg(feature = "mongodb")]
pub mod mongodb;

pub use self::memory::{
    InMemoryConnector, InMemoryConnectorBuilder, InMemoryDatabase, SourceOperation,
};
#[cfg(feature = "mongodb")]
pub use self::mongodb::{MongoConnector, MongoSession};

/// Database entry as listed by a session, before system-name filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseSpec {
    /// Database name
    pub name: String,
    /// Size on disk in bytes, when the server reports it
    pub size_on_disk: Option<u64>,
    /// Whether the server reports the database as empty
    pub empty: Option<bool>,
}

/// Collection entry as listed by a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionSpec {
    /// Collection name
    pub name: String,
    /// Namespace kind as reported by the server
    pub kind: CollectionKind,
}

/// Opens transient sessions against a connection target.
///
/// # Object Safety
/// This trait is object-safe; the engine holds it as `Arc<dyn Connector>`.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Establishes a session, failing within the configured timeouts.
    ///
    /// # Security
    /// Implementations must not log the raw connection string.
    ///
    /// # Errors
    /// Returns `ExportError::Connection` if the target cannot be reached.
    async fn open(
        &self,
        target: &ConnectionTarget,
        config: &ConnectionConfig,
    ) -> Result<Box<dyn Session>>;
}

/// A live connection owned by exactly one engine call.
#[async_trait]
pub trait Session: Send + Sync {
    /// Lists every database on the server, including system databases.
    async fn list_databases(&self) -> Result<Vec<DatabaseSpec>>;

    /// Lists collections in `database` in server order.
    async fn list_collections(&self, database: &str) -> Result<Vec<CollectionSpec>>;

    /// Approximate number of documents in a collection.
    async fn estimated_document_count(&self, database: &str, collection: &str) -> Result<u64>;

    /// Every document of a collection in natural order.
    ///
    /// A collection that does not exist yields an empty sequence.
    async fn find_all(&self, database: &str, collection: &str)
    -> Result<Vec<serde_json::Value>>;

    /// Releases the connection. Called exactly once per session.
    async fn close(&self);
}
