//! Data structures produced by the export engine.
//!
//! Every value here is created fresh per call and handed to the caller;
//! nothing is cached between calls. Serialized field names match the JSON
//! wire format of the HTTP boundary.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;

/// A non-system database reported by the connection probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseSummary {
    /// Database name
    pub name: String,
    /// Approximate size in bytes, when the server reports it
    #[serde(rename = "sizeOnDisk", skip_serializing_if = "Option::is_none", default)]
    pub size_on_disk: Option<u64>,
    /// Whether the server reports the database as empty
    #[serde(rename = "empty", skip_serializing_if = "Option::is_none", default)]
    pub is_empty: Option<bool>,
}

/// What kind of namespace a collection entry is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollectionKind {
    /// Regular collection
    Collection,
    /// Read-only view over another collection
    View,
    /// Time-series collection
    Timeseries,
}

impl std::fmt::Display for CollectionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Collection => write!(f, "collection"),
            Self::View => write!(f, "view"),
            Self::Timeseries => write!(f, "timeseries"),
        }
    }
}

/// A collection with its approximate document count.
///
/// `document_count` is 0 when counting failed for this collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionSummary {
    /// Collection name
    pub name: String,
    /// Namespace kind
    #[serde(rename = "type")]
    pub kind: CollectionKind,
    /// Estimated number of documents
    #[serde(rename = "documentCount")]
    pub document_count: u64,
}

/// Which collections an export call processes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectionSelection {
    /// Every collection listed in the database at the moment of export
    All,
    /// Exactly these names, unresolved against the live listing
    Explicit(Vec<String>),
}

impl CollectionSelection {
    /// Collapses an optional caller list into a selection.
    ///
    /// `None` and an empty list both mean [`CollectionSelection::All`].
    /// Duplicate names are dropped, keeping the first occurrence.
    pub fn from_requested(requested: Option<Vec<String>>) -> Self {
        let names = requested.unwrap_or_default();
        if names.is_empty() {
            return Self::All;
        }

        let mut unique: Vec<String> = Vec::with_capacity(names.len());
        for name in names {
            if !unique.contains(&name) {
                unique.push(name);
            }
        }
        Self::Explicit(unique)
    }

    /// True when every listed collection is exported.
    pub fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }
}

/// Immutable description of one export call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRequest {
    /// Database to export from
    pub database: String,
    /// Collections to export
    pub selection: CollectionSelection,
}

impl ExportRequest {
    /// Builds a request from a database name and an optional list of collections.
    ///
    /// # Example
    /// ```rust
    /// use mongo_exporter_core::{CollectionSelection, ExportRequest};
    ///
    /// let request = ExportRequest::new("shop", Some(vec!["orders".into(), "orders".into()]));
    /// assert_eq!(request.selection, CollectionSelection::Explicit(vec!["orders".into()]));
    ///
    /// let request = ExportRequest::new("shop", Some(vec![]));
    /// assert!(request.selection.is_all());
    /// ```
    pub fn new(database: impl Into<String>, requested: Option<Vec<String>>) -> Self {
        Self {
            database: database.into(),
            selection: CollectionSelection::from_requested(requested),
        }
    }
}

/// Result of one export call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportPayload {
    /// Database the documents came from
    pub database: String,
    /// Captured once, after every retrieval completed
    #[serde(serialize_with = "serialize_millis")]
    pub exported_at: DateTime<Utc>,
    /// Documents per collection, in retrieval order
    #[serde(rename = "data")]
    pub collections: BTreeMap<String, Vec<serde_json::Value>>,
}

impl ExportPayload {
    /// Total number of documents across all collections.
    pub fn document_count(&self) -> usize {
        self.collections.values().map(Vec::len).sum()
    }

    /// `exportedAt` as rendered on the wire.
    pub fn exported_at_iso(&self) -> String {
        self.exported_at.to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

fn serialize_millis<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
}
