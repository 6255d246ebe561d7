//! In-process document source.
//!
//! Holds a fixed set of databases and collections in memory. Any operation
//! can be made to fail, and every open and close is counted, which makes it
//! the test double for connection-lifecycle checks.

use super::{CollectionSpec, Connector, DatabaseSpec, Session};
use crate::error::{ExportError, SourceMessage};
use crate::models::CollectionKind;
use crate::{ConnectionConfig, ConnectionTarget, Result};
use async_trait::async_trait;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// A session operation that can be made to fail.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SourceOperation {
    /// Opening a session
    Open,
    /// Listing databases
    ListDatabases,
    /// Listing the collections of one database
    ListCollections {
        /// Database name
        database: String,
    },
    /// Counting the documents of one collection
    Count {
        /// Database name
        database: String,
        /// Collection name
        collection: String,
    },
    /// Reading every document of one collection
    Find {
        /// Database name
        database: String,
        /// Collection name
        collection: String,
    },
}

impl SourceOperation {
    /// Listing the collections of `database`.
    pub fn list_collections(database: &str) -> Self {
        Self::ListCollections {
            database: database.to_string(),
        }
    }

    /// Counting `database.collection`.
    pub fn count(database: &str, collection: &str) -> Self {
        Self::Count {
            database: database.to_string(),
            collection: collection.to_string(),
        }
    }

    /// Reading `database.collection`.
    pub fn find(database: &str, collection: &str) -> Self {
        Self::Find {
            database: database.to_string(),
            collection: collection.to_string(),
        }
    }
}

impl fmt::Display for SourceOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::ListDatabases => write!(f, "listDatabases"),
            Self::ListCollections { database } => write!(f, "listCollections on {}", database),
            Self::Count {
                database,
                collection,
            } => write!(f, "count on {}.{}", database, collection),
            Self::Find {
                database,
                collection,
            } => write!(f, "find on {}.{}", database, collection),
        }
    }
}

#[derive(Debug, Clone)]
struct InMemoryCollection {
    name: String,
    kind: CollectionKind,
    documents: Vec<serde_json::Value>,
}

/// A database held by [`InMemoryConnector`].
#[derive(Debug, Clone)]
pub struct InMemoryDatabase {
    name: String,
    size_on_disk: Option<u64>,
    empty: Option<bool>,
    collections: Vec<InMemoryCollection>,
}

impl InMemoryDatabase {
    /// Creates an empty database with no reported size.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            size_on_disk: None,
            empty: None,
            collections: Vec::new(),
        }
    }

    /// Reports a size on disk; the database then also reports whether it
    /// is empty.
    pub fn with_size(mut self, size_on_disk: u64) -> Self {
        self.size_on_disk = Some(size_on_disk);
        self.empty = Some(self.collections.is_empty());
        self
    }

    /// Adds a regular collection. Listing order follows insertion order.
    pub fn with_collection(self, name: impl Into<String>, documents: Vec<serde_json::Value>) -> Self {
        self.with_namespace(name, CollectionKind::Collection, documents)
    }

    /// Adds a view; views list like collections but hold no stored documents.
    pub fn with_view(self, name: impl Into<String>) -> Self {
        self.with_namespace(name, CollectionKind::View, Vec::new())
    }

    fn with_namespace(
        mut self,
        name: impl Into<String>,
        kind: CollectionKind,
        documents: Vec<serde_json::Value>,
    ) -> Self {
        self.collections.push(InMemoryCollection {
            name: name.into(),
            kind,
            documents,
        });
        if self.empty.is_some() {
            self.empty = Some(false);
        }
        self
    }

    fn collection(&self, name: &str) -> Option<&InMemoryCollection> {
        self.collections.iter().find(|c| c.name == name)
    }
}

#[derive(Debug, Default)]
struct Shared {
    databases: Vec<InMemoryDatabase>,
    failures: HashSet<SourceOperation>,
    opened: AtomicUsize,
    closed: AtomicUsize,
}

impl Shared {
    fn check(&self, operation: SourceOperation) -> Result<()> {
        if self.failures.contains(&operation) {
            return Err(ExportError::connection_failed(
                "In-memory source failure",
                SourceMessage(format!("{} failed", operation)),
            ));
        }
        Ok(())
    }

    fn database(&self, name: &str) -> Option<&InMemoryDatabase> {
        self.databases.iter().find(|d| d.name == name)
    }
}

/// Connector over an in-memory set of databases.
///
/// # Example
/// ```rust
/// use mongo_exporter_core::source::{InMemoryConnector, InMemoryDatabase, SourceOperation};
/// use serde_json::json;
///
/// let connector = InMemoryConnector::builder()
///     .database(InMemoryDatabase::new("shop").with_collection("users", vec![json!({"n": 1})]))
///     .fail_on(SourceOperation::count("shop", "users"))
///     .build();
///
/// assert_eq!(connector.opened(), 0);
/// ```
#[derive(Debug, Clone)]
pub struct InMemoryConnector {
    shared: Arc<Shared>,
}

/// Builder for [`InMemoryConnector`].
#[derive(Debug, Default)]
pub struct InMemoryConnectorBuilder {
    databases: Vec<InMemoryDatabase>,
    failures: HashSet<SourceOperation>,
}

impl InMemoryConnectorBuilder {
    /// Adds a database. Listing order follows insertion order.
    pub fn database(mut self, database: InMemoryDatabase) -> Self {
        self.databases.push(database);
        self
    }

    /// Makes `operation` fail every time it is attempted.
    pub fn fail_on(mut self, operation: SourceOperation) -> Self {
        self.failures.insert(operation);
        self
    }

    /// Finishes the connector.
    pub fn build(self) -> InMemoryConnector {
        InMemoryConnector {
            shared: Arc::new(Shared {
                databases: self.databases,
                failures: self.failures,
                ..Shared::default()
            }),
        }
    }
}

impl InMemoryConnector {
    /// Starts a connector with no databases.
    pub fn builder() -> InMemoryConnectorBuilder {
        InMemoryConnectorBuilder::default()
    }

    /// Number of sessions successfully opened.
    pub fn opened(&self) -> usize {
        self.shared.opened.load(Ordering::SeqCst)
    }

    /// Number of sessions closed.
    pub fn closed(&self) -> usize {
        self.shared.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Connector for InMemoryConnector {
    async fn open(
        &self,
        target: &ConnectionTarget,
        _config: &ConnectionConfig,
    ) -> Result<Box<dyn Session>> {
        self.shared.check(SourceOperation::Open)?;
        self.shared.opened.fetch_add(1, Ordering::SeqCst);
        tracing::trace!("Opened in-memory session for {}", target);

        Ok(Box::new(InMemorySession {
            shared: Arc::clone(&self.shared),
        }))
    }
}

struct InMemorySession {
    shared: Arc<Shared>,
}

#[async_trait]
impl Session for InMemorySession {
    async fn list_databases(&self) -> Result<Vec<DatabaseSpec>> {
        self.shared.check(SourceOperation::ListDatabases)?;

        Ok(self
            .shared
            .databases
            .iter()
            .map(|db| DatabaseSpec {
                name: db.name.clone(),
                size_on_disk: db.size_on_disk,
                empty: db.empty,
            })
            .collect())
    }

    async fn list_collections(&self, database: &str) -> Result<Vec<CollectionSpec>> {
        self.shared
            .check(SourceOperation::list_collections(database))?;

        Ok(self
            .shared
            .database(database)
            .map(|db| {
                db.collections
                    .iter()
                    .map(|c| CollectionSpec {
                        name: c.name.clone(),
                        kind: c.kind,
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn estimated_document_count(&self, database: &str, collection: &str) -> Result<u64> {
        self.shared
            .check(SourceOperation::count(database, collection))?;

        let count = self
            .shared
            .database(database)
            .and_then(|db| db.collection(collection))
            .map_or(0, |c| c.documents.len());
        Ok(count as u64)
    }

    async fn find_all(
        &self,
        database: &str,
        collection: &str,
    ) -> Result<Vec<serde_json::Value>> {
        self.shared
            .check(SourceOperation::find(database, collection))?;

        Ok(self
            .shared
            .database(database)
            .and_then(|db| db.collection(collection))
            .map(|c| c.documents.clone())
            .unwrap_or_default())
    }

    async fn close(&self) {
        self.shared.closed.fetch_add(1, Ordering::SeqCst);
    }
}
