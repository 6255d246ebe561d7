//! Collection enumerator.

use super::ExportEngine;
use crate::error::ExportError;
use crate::models::CollectionSummary;
use crate::source::Session;
use crate::{ConnectionTarget, Result};
use futures::stream::{self, StreamExt};

/// Validation message when the database name is missing.
pub const MISSING_DATABASE_MESSAGE: &str = "MongoDB URL and database name are required";

const LIST_CONTEXT: &str = "Failed to list collections";

impl ExportEngine {
    /// Lists the collections of `database` with approximate document counts.
    ///
    /// Counts run concurrently, bounded by `count_concurrency`, and the result
    /// keeps the server's listing order. A failed count is reported as 0 and
    /// never aborts the call.
    ///
    /// # Errors
    /// - `ExportError::Validation` if `database` is empty; no connection is attempted
    /// - `ExportError::Connection` if connecting or listing fails
    pub async fn list_collections(
        &self,
        target: &ConnectionTarget,
        database: &str,
    ) -> Result<Vec<CollectionSummary>> {
        if database.trim().is_empty() {
            return Err(ExportError::validation(MISSING_DATABASE_MESSAGE));
        }

        let session = self
            .open_session(target)
            .await
            .map_err(|e| e.with_context(LIST_CONTEXT))?;

        let result = self.enumerate(session.as_ref(), database).await;
        session.close().await;

        let summaries = result.map_err(|e| {
            tracing::error!("Collection listing failed for '{}': {}", database, e);
            e.with_context(LIST_CONTEXT)
        })?;

        tracing::info!(
            "Found {} collections in database '{}'",
            summaries.len(),
            database
        );
        Ok(summaries)
    }

    async fn enumerate(
        &self,
        session: &dyn Session,
        database: &str,
    ) -> Result<Vec<CollectionSummary>> {
        let listed = session.list_collections(database).await?;

        let count_futures = listed.into_iter().map(|spec| async move {
            let document_count = count_or_default(session, database, &spec.name).await;
            CollectionSummary {
                name: spec.name,
                kind: spec.kind,
                document_count,
            }
        });

        // `buffered` keeps input order even though counts complete out of order
        let summaries = stream::iter(count_futures)
            .buffered(self.config.count_concurrency)
            .collect::<Vec<_>>()
            .await;

        Ok(summaries)
    }
}

/// Approximate document count, or 0 if counting fails.
async fn count_or_default(session: &dyn Session, database: &str, collection: &str) -> u64 {
    match session.estimated_document_count(database, collection).await {
        Ok(count) => count,
        Err(e) => {
            tracing::warn!(
                "Could not count documents in '{}.{}', reporting 0: {}",
                database,
                collection,
                e
            );
            0
        }
    }
}
