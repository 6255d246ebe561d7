//! Export rendering and file output.
//!
//! Handles the JSON envelope shared by the HTTP response and the `export`
//! command, default file names, and writing files with optional compression.

use mongo_exporter_core::error::ExportError;
use mongo_exporter_core::{CollectionSelection, ExportPayload, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Successful export as delivered to the caller.
#[derive(Debug, Serialize)]
pub struct ExportEnvelope<'a> {
    /// Always `true`
    pub success: bool,
    /// Export content, flattened into the envelope
    #[serde(flatten)]
    pub payload: &'a ExportPayload,
}

impl<'a> ExportEnvelope<'a> {
    /// Wraps a payload.
    pub fn new(payload: &'a ExportPayload) -> Self {
        Self {
            success: true,
            payload,
        }
    }
}

/// Renders the export envelope as pretty-printed JSON.
pub fn render_export(payload: &ExportPayload) -> Result<String> {
    serde_json::to_string_pretty(&ExportEnvelope::new(payload)).map_err(|e| {
        ExportError::Serialization {
            context: format!("Failed to render export of '{}'", payload.database),
            source: e,
        }
    })
}

/// File name offered for download by the HTTP boundary.
pub fn attachment_filename(database: &str) -> String {
    format!("{}_export.json", database)
}

/// Default output file name for the `export` command.
///
/// One collection: `<db>_<collection>_<millis>.json`; several:
/// `<db>_selected_<millis>.json`; everything: `<db>_complete_<millis>.json`.
pub fn default_export_filename(
    database: &str,
    selection: &CollectionSelection,
    timestamp_millis: i64,
) -> String {
    match selection {
        CollectionSelection::Explicit(names) if names.len() == 1 => {
            format!("{}_{}_{}.json", database, names[0], timestamp_millis)
        }
        CollectionSelection::Explicit(names) if !names.is_empty() => {
            format!("{}_selected_{}.json", database, timestamp_millis)
        }
        _ => format!("{}_complete_{}.json", database, timestamp_millis),
    }
}

/// Appends `.zst` to a file name unless it already carries it.
pub fn compressed_path(path: &Path) -> PathBuf {
    if path.extension().is_some_and(|ext| ext == "zst") {
        return path.to_path_buf();
    }
    let mut name = path.as_os_str().to_os_string();
    name.push(".zst");
    PathBuf::from(name)
}

/// Formats a byte count for display, base 1024, up to GB.
///
/// # Example
/// ```rust
/// use mongo_exporter::output::format_bytes;
///
/// assert_eq!(format_bytes(0), "0 Bytes");
/// assert_eq!(format_bytes(1536), "1.5 KB");
/// ```
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rounded = format!("{:.2}", value);
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", trimmed, UNITS[unit])
}

/// Saves JSON data to file.
pub async fn save_json(json_data: &str, output_path: &Path) -> Result<()> {
    tokio::fs::write(output_path, json_data)
        .await
        .map_err(|e| ExportError::Io {
            context: format!("Failed to write to {}", output_path.display()),
            source: e,
        })?;
    Ok(())
}

/// Saves compressed JSON data.
#[cfg(feature = "compression")]
pub async fn save_compressed(json_data: &str, output_path: &Path) -> Result<()> {
    let compressed_data = zstd::encode_all(json_data.as_bytes(), 3).map_err(|e| {
        ExportError::Io {
            context: "Compression failed".to_string(),
            source: e,
        }
    })?;

    tokio::fs::write(output_path, compressed_data)
        .await
        .map_err(|e| ExportError::Io {
            context: format!(
                "Failed to write compressed file to {}",
                output_path.display()
            ),
            source: e,
        })?;

    Ok(())
}

/// Saves an export, compressed when requested.
pub async fn save_export(json_data: &str, output_path: &Path, compress: bool) -> Result<()> {
    if compress {
        #[cfg(feature = "compression")]
        {
            save_compressed(json_data, output_path).await
        }
        #[cfg(not(feature = "compression"))]
        {
            Err(ExportError::configuration(
                "Compression not available. Compile with --features compression",
            ))
        }
    } else {
        save_json(json_data, output_path).await
    }
}
