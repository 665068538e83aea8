//! # Evolarium IO
//!
//! Persistence layer for the Evolarium simulation.
//!
//! This crate provides:
//! - The snapshot document schema
//! - Export and validated import of whole simulations
//! - JSON and gzip-compressed JSON file helpers
//! - Structured error handling with custom error types

/// On-disk snapshot schema
pub mod document;
/// Error types and result aliases for I/O operations
pub mod error;
/// Export, validated import, and file save/load of simulations
pub mod persistence;
/// Validated JSON and gzip serialization helpers
pub mod serialization;

pub use document::{SnapshotDocument, DOCUMENT_VERSION};
pub use error::{IoError, Result};
pub use persistence::{export, import, load_from_file, save_to_file, validate, ImportSummary};
pub use serialization::{
    from_gzip_json, from_json, read_file, to_gzip_json, to_json, to_json_pretty, write_file,
};
