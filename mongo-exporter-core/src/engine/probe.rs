//! Connection probe.

use super::ExportEngine;
use crate::models::DatabaseSummary;
use crate::{ConnectionTarget, Result};

/// System databases that are never reported by the probe.
pub const SYSTEM_DATABASES: &[&str] = &["admin", "config", "local"];

const PROBE_CONTEXT: &str = "Failed to connect to MongoDB";

impl ExportEngine {
    /// Lists the non-system databases of the target server.
    ///
    /// A single attempt is made; there is no retry. Any connection or
    /// listing failure is returned as `ExportError::Connection` and no
    /// partial result is produced.
    pub async fn probe(&self, target: &ConnectionTarget) -> Result<Vec<DatabaseSummary>> {
        let session = self
            .open_session(target)
            .await
            .map_err(|e| e.with_context(PROBE_CONTEXT))?;

        let listed = session.list_databases().await;
        session.close().await;

        let databases = listed.map_err(|e| {
            tracing::error!("Database listing failed for {}: {}", target, e);
            e.with_context(PROBE_CONTEXT)
        })?;

        let summaries: Vec<DatabaseSummary> = databases
            .into_iter()
            .filter(|db| {
                let is_system = SYSTEM_DATABASES.contains(&db.name.as_str());
                if is_system {
                    tracing::trace!("Skipping system database: {}", db.name);
                }
                !is_system
            })
            .map(|db| DatabaseSummary {
                name: db.name,
                size_on_disk: db.size_on_disk,
                is_empty: db.empty,
            })
            .collect();

        tracing::info!("Found {} databases on {}", summaries.len(), target);
        Ok(summaries)
    }
}
