//! Normalizes line-delimited JSON sales records into a fixed, ordered table.
//!
//! Records are flattened to dot-joined key paths, each path is resolved to a
//! canonical column (exact lookup first, then fuzzy matching), and the mapped
//! rows are assembled into a table convertible to a polars `DataFrame`.

pub mod config;
pub mod error;
pub mod ingest;
pub mod models;
pub mod processor;
pub mod report;
pub mod storage;

pub use error::{NormalizeError, NormalizeResult};
