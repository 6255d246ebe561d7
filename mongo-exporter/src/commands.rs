//! Command implementations for the binary.
//!
//! Each command prints its result to stdout and logs progress through
//! `tracing`. Engine construction is separate so tests can supply their own
//! connector.

use crate::cli::{CollectionsArgs, ExportArgs, ServeArgs, TargetArgs};
use crate::{http, output};
use mongo_exporter_core::{
    CollectionSelection, ConnectionConfig, ConnectionTarget, ExportEngine, ExportRequest, Result,
};
use std::path::PathBuf;
use tracing::info;

/// Creates the MongoDB-backed engine.
#[cfg(feature = "mongodb")]
pub fn build_engine(config: ConnectionConfig) -> Result<ExportEngine> {
    ExportEngine::mongodb(config)
}

/// Creates the MongoDB-backed engine.
#[cfg(not(feature = "mongodb"))]
pub fn build_engine(_config: ConnectionConfig) -> Result<ExportEngine> {
    Err(mongo_exporter_core::ExportError::configuration(
        "MongoDB support not available. Compile with --features mongodb",
    ))
}

/// Runs the HTTP API until interrupted.
pub async fn serve(engine: ExportEngine, args: &ServeArgs) -> Result<()> {
    info!("Starting HTTP API on {}", args.bind);
    http::serve(http::router(engine, &args.cors_origins), &args.bind).await
}

/// Prints the non-system databases with their sizes.
pub async fn list_databases(engine: &ExportEngine, args: &TargetArgs) -> Result<()> {
    let target = ConnectionTarget::new(args.mongo_url.as_str())?;
    info!("Target: {}", target);

    let databases = engine.probe(&target).await?;
    for db in &databases {
        let size = db
            .size_on_disk
            .map_or_else(|| "Size unknown".to_string(), output::format_bytes);
        println!("{}\t{}", db.name, size);
    }
    info!("Found {} databases", databases.len());

    Ok(())
}

/// Prints the collections of a database with their document counts.
pub async fn list_collections(engine: &ExportEngine, args: &CollectionsArgs) -> Result<()> {
    let target = ConnectionTarget::new(args.target.mongo_url.as_str())?;
    info!("Target: {}", target);

    let collections = engine.list_collections(&target, &args.database).await?;
    for collection in &collections {
        println!(
            "{}\t{}\t{} documents",
            collection.name, collection.kind, collection.document_count
        );
    }

    Ok(())
}

/// Exports collections to a file and returns the path written.
pub async fn export(engine: &ExportEngine, args: &ExportArgs) -> Result<PathBuf> {
    let target = ConnectionTarget::new(args.target.mongo_url.as_str())?;
    let requested = (!args.collections.is_empty()).then(|| args.collections.clone());
    let request = ExportRequest::new(args.database.as_str(), requested);

    info!("Target: {}", target);
    match &request.selection {
        CollectionSelection::All => info!("Exporting all collections of '{}'", request.database),
        CollectionSelection::Explicit(names) => info!(
            "Exporting {} collections of '{}'",
            names.len(),
            request.database
        ),
    }

    let payload = engine.export_collections(&target, &request).await?;
    let rendered = output::render_export(&payload)?;

    let output_path = args.output.clone().unwrap_or_else(|| {
        PathBuf::from(output::default_export_filename(
            &request.database,
            &request.selection,
            payload.exported_at.timestamp_millis(),
        ))
    });
    let output_path = if args.compress {
        output::compressed_path(&output_path)
    } else {
        output_path
    };

    output::save_export(&rendered, &output_path, args.compress).await?;

    info!("Export saved to {}", output_path.display());
    println!("Export completed successfully");
    println!("Output: {}", output_path.display());
    println!("Collections: {}", payload.collections.len());
    println!("Documents: {}", payload.document_count());

    Ok(output_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongo_exporter_core::source::{InMemoryConnector, InMemoryDatabase};
    use serde_json::json;
    use std::sync::Arc;

    fn engine() -> ExportEngine {
        let connector = InMemoryConnector::builder()
            .database(
                InMemoryDatabase::new("shop")
                    .with_collection("users", vec![json!({"name": "ada"})])
                    .with_collection("orders", vec![json!({"total": 3})]),
            )
            .build();
        ExportEngine::new(Arc::new(connector), ConnectionConfig::default()).unwrap()
    }

    fn export_args(collections: &[&str], output: Option<PathBuf>) -> ExportArgs {
        ExportArgs {
            target: TargetArgs {
                mongo_url: "mongodb://localhost:27017".to_string(),
            },
            database: "shop".to_string(),
            collections: collections.iter().map(ToString::to_string).collect(),
            output,
            compress: false,
        }
    }

    #[tokio::test]
    async fn test_export_to_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shop.json");

        let written = export(&engine(), &export_args(&["users"], Some(path.clone())))
            .await
            .unwrap();

        assert_eq!(written, path);
        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["success"], true);
        assert_eq!(value["data"]["users"][0]["name"], "ada");
        assert!(value["data"].get("orders").is_none());
    }

    #[cfg(feature = "compression")]
    #[tokio::test]
    async fn test_export_compressed_explicit_path_gets_zst_suffix() {
        let dir = tempfile::tempdir().unwrap();
        let mut args = export_args(&["users"], Some(dir.path().join("shop.json")));
        args.compress = true;

        let written = export(&engine(), &args).await.unwrap();

        assert_eq!(written, dir.path().join("shop.json.zst"));
        assert!(!dir.path().join("shop.json").exists());
        let bytes = zstd::decode_all(std::fs::read(&written).unwrap().as_slice()).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value["data"]["users"][0]["name"], "ada");
    }

    #[tokio::test]
    async fn test_export_rejects_empty_url() {
        let mut args = export_args(&[], None);
        args.target.mongo_url = String::new();

        let error = export(&engine(), &args).await.unwrap_err();
        assert!(error.is_validation());
    }
}
