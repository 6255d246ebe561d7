//! MongoDB driver source.
//!
//! # Security Features
//! - Connection string credentials are never logged
//! - Every client is built with bounded connect and server-selection timeouts
//! - Sessions are read-only: list, count, and find only

use super::{CollectionSpec, Connector, DatabaseSpec, Session};
use crate::error::ExportError;
use crate::models::CollectionKind;
use crate::{ConnectionConfig, ConnectionTarget, Result};
use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::Client;
use mongodb::bson::{Bson, Document, doc};
use mongodb::options::ClientOptions;
use mongodb::results::{CollectionSpecification, CollectionType};

/// Opens MongoDB client sessions.
#[derive(Debug, Clone, Copy, Default)]
pub struct MongoConnector;

impl MongoConnector {
    /// Creates a MongoDB connector.
    pub fn new() -> Self {
        Self
    }

    /// Creates MongoDB client options.
    ///
    /// Timeouts from the connection string win over the configured ones.
    async fn client_options(
        target: &ConnectionTarget,
        config: &ConnectionConfig,
    ) -> Result<ClientOptions> {
        let mut options = ClientOptions::parse(target.as_str()).await.map_err(|e| {
            ExportError::connection_failed("Failed to parse MongoDB connection options", e)
        })?;

        options.connect_timeout = Some(ConnectionConfig::prefer_url_timeout(
            options.connect_timeout,
            config.connect_timeout,
        ));
        options.server_selection_timeout = Some(ConnectionConfig::prefer_url_timeout(
            options.server_selection_timeout,
            config.server_selection_timeout,
        ));
        options.app_name = Some(config.app_name.clone());

        Ok(options)
    }
}

#[async_trait]
impl Connector for MongoConnector {
    async fn open(
        &self,
        target: &ConnectionTarget,
        config: &ConnectionConfig,
    ) -> Result<Box<dyn Session>> {
        let options = Self::client_options(target, config).await?;

        let client = Client::with_options(options).map_err(|e| {
            ExportError::connection_failed(
                format!("Failed to create MongoDB client for {}", target),
                e,
            )
        })?;

        // Client creation is lazy; ping forces server selection so an
        // unreachable target fails here rather than on the first read.
        if let Err(e) = client.database("admin").run_command(doc! { "ping": 1 }).await {
            tracing::debug!("Ping failed for {}: {}", target, e);
            client.shutdown().await;
            return Err(ExportError::connection_failed(
                format!("Failed to reach MongoDB at {}", target),
                e,
            ));
        }

        tracing::debug!("Connected to MongoDB at {}", target);
        Ok(Box::new(MongoSession { client }))
    }
}

/// A MongoDB client owned by one engine call.
pub struct MongoSession {
    client: Client,
}

impl MongoSession {
    /// Gets the MongoDB client reference.
    pub fn client(&self) -> &Client {
        &self.client
    }
}

fn collection_kind(specification: &CollectionSpecification) -> CollectionKind {
    match specification.collection_type {
        CollectionType::View => CollectionKind::View,
        CollectionType::Timeseries => CollectionKind::Timeseries,
        _ => CollectionKind::Collection,
    }
}

/// Converts a BSON document to relaxed Extended JSON.
fn document_to_json(document: Document) -> serde_json::Value {
    Bson::Document(document).into_relaxed_extjson()
}

#[async_trait]
impl Session for MongoSession {
    async fn list_databases(&self) -> Result<Vec<DatabaseSpec>> {
        let databases = self.client.list_databases().await.map_err(|e| {
            tracing::error!("Failed to enumerate databases: {}", e);
            ExportError::connection_failed("Failed to enumerate databases", e)
        })?;

        Ok(databases
            .into_iter()
            .map(|db| DatabaseSpec {
                name: db.name,
                size_on_disk: Some(db.size_on_disk),
                empty: Some(db.empty),
            })
            .collect())
    }

    async fn list_collections(&self, database: &str) -> Result<Vec<CollectionSpec>> {
        let cursor = self
            .client
            .database(database)
            .list_collections()
            .await
            .map_err(|e| {
                ExportError::connection_failed(
                    format!("Failed to list collections in database '{}'", database),
                    e,
                )
            })?;

        let specifications: Vec<CollectionSpecification> =
            cursor.try_collect().await.map_err(|e| {
                ExportError::connection_failed(
                    format!("Failed to iterate collections in database '{}'", database),
                    e,
                )
            })?;

        Ok(specifications
            .iter()
            .map(|spec| CollectionSpec {
                name: spec.name.clone(),
                kind: collection_kind(spec),
            })
            .collect())
    }

    async fn estimated_document_count(&self, database: &str, collection: &str) -> Result<u64> {
        self.client
            .database(database)
            .collection::<Document>(collection)
            .estimated_document_count()
            .await
            .map_err(|e| {
                ExportError::connection_failed(
                    format!("Failed to count documents in '{}.{}'", database, collection),
                    e,
                )
            })
    }

    async fn find_all(
        &self,
        database: &str,
        collection: &str,
    ) -> Result<Vec<serde_json::Value>> {
        let mut cursor = self
            .client
            .database(database)
            .collection::<Document>(collection)
            .find(doc! {})
            .await
            .map_err(|e| {
                ExportError::connection_failed(
                    format!("Failed to read documents from '{}.{}'", database, collection),
                    e,
                )
            })?;

        let mut documents = Vec::new();
        while cursor.advance().await.map_err(|e| {
            ExportError::connection_failed(
                format!("Failed to iterate cursor for '{}.{}'", database, collection),
                e,
            )
        })? {
            let document = cursor.deserialize_current().map_err(|e| {
                ExportError::connection_failed(
                    format!(
                        "Failed to deserialize document from '{}.{}'",
                        database, collection
                    ),
                    e,
                )
            })?;
            documents.push(document_to_json(document));
        }

        Ok(documents)
    }

    async fn close(&self) {
        self.client.clone().shutdown().await;
        tracing::debug!("MongoDB client shut down");
    }
}
