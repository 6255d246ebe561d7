//! Core export engine for mongo-exporter.
//!
//! This crate lists the databases and collections of a MongoDB server and
//! exports whole collections as one JSON payload. It is shared by the
//! command line front end and the HTTP service.
//!
//! # Security Guarantees
//! - Connection strings are zeroized on drop and never logged
//! - All database operations are read-only
//! - Each operation opens its own connection and always closes it
//!
//! # Architecture
//! - `source`: connector/session traits with MongoDB and in-memory implementations
//! - `engine`: the probe, enumerator, and export operations over a connector
//! - `models`: per-call results serialized in the HTTP wire format

pub mod config;
pub mod engine;
pub mod error;
pub mod logging;
pub mod models;
pub mod source;
pub mod target;

// Re-export commonly used types
pub use config::ConnectionConfig;
pub use engine::{ExportEngine, MISSING_DATABASE_MESSAGE, SYSTEM_DATABASES};
pub use error::{ExportError, Result};
pub use models::{
    CollectionKind, CollectionSelection, CollectionSummary, DatabaseSummary, ExportPayload,
    ExportRequest,
};
pub use source::{Connector, Session};
pub use target::{ConnectionTarget, MISSING_URL_MESSAGE};
