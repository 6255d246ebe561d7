//! Library module for mongo-exporter.
//!
//! Exposes the command line model, the HTTP API, and export output helpers
//! so they can be exercised by tests. The binary entry point is in main.rs.

pub mod cli;
pub mod commands;
pub mod http;
pub mod output;
