//! Export orchestrator.

use super::ExportEngine;
use super::collections::MISSING_DATABASE_MESSAGE;
use crate::error::ExportError;
use crate::models::{CollectionSelection, ExportPayload, ExportRequest};
use crate::source::Session;
use crate::{ConnectionTarget, Result};
use std::collections::BTreeMap;

const EXPORT_CONTEXT: &str = "Failed to export data";

impl ExportEngine {
    /// Exports `requested` collections of `database`, or all of them when
    /// `requested` is `None` or empty.
    pub async fn export(
        &self,
        target: &ConnectionTarget,
        database: &str,
        requested: Option<Vec<String>>,
    ) -> Result<ExportPayload> {
        self.export_collections(target, &ExportRequest::new(database, requested))
            .await
    }

    /// Retrieves every document of the effective collection set.
    ///
    /// With [`CollectionSelection::All`] the set is a fresh listing of the
    /// database taken at the moment of export. An explicit selection is used
    /// verbatim; names that do not exist export as empty sequences.
    ///
    /// Collections are read one at a time over a single session. The first
    /// retrieval failure aborts the whole call and no partial payload is
    /// returned. The whole payload is held in memory.
    ///
    /// # Errors
    /// - `ExportError::Validation` if the database name is empty; no connection is attempted
    /// - `ExportError::Connection` if connecting, listing, or any retrieval fails
    pub async fn export_collections(
        &self,
        target: &ConnectionTarget,
        request: &ExportRequest,
    ) -> Result<ExportPayload> {
        if request.database.trim().is_empty() {
            return Err(ExportError::validation(MISSING_DATABASE_MESSAGE));
        }

        let session = self
            .open_session(target)
            .await
            .map_err(|e| e.with_context(EXPORT_CONTEXT))?;

        let result = retrieve(session.as_ref(), request).await;
        session.close().await;

        let payload = result.map_err(|e| {
            tracing::error!("Export of '{}' aborted: {}", request.database, e);
            e.with_context(EXPORT_CONTEXT)
        })?;

        tracing::info!(
            "Exported {} documents from {} collections in '{}'",
            payload.document_count(),
            payload.collections.len(),
            payload.database
        );
        Ok(payload)
    }
}

/// Resolves the selection into concrete collection names.
async fn effective_set(session: &dyn Session, request: &ExportRequest) -> Result<Vec<String>> {
    match &request.selection {
        CollectionSelection::Explicit(names) if !names.is_empty() => Ok(names.clone()),
        _ => {
            let listed = session.list_collections(&request.database).await?;
            Ok(listed.into_iter().map(|spec| spec.name).collect())
        }
    }
}

async fn retrieve(session: &dyn Session, request: &ExportRequest) -> Result<ExportPayload> {
    let names = effective_set(session, request).await?;
    tracing::debug!(
        "Exporting {} collections from '{}'",
        names.len(),
        request.database
    );

    let mut collections = BTreeMap::new();
    for name in names {
        let documents = session.find_all(&request.database, &name).await?;
        tracing::debug!("Retrieved {} documents from '{}'", documents.len(), name);
        collections.insert(name, documents);
    }

    Ok(ExportPayload {
        database: request.database.clone(),
        exported_at: chrono::Utc::now(),
        collections,
    })
}
