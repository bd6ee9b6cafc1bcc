//! # stash-core
//!
//! Core types and pure logic for formstash.
//!
//! This crate provides the foundational pieces shared across all formstash crates:
//! - Entry and property value types (the tagged union stored per submission)
//! - Calendar-aware retention intervals (`P1Y2M3D`)
//! - PHP-style date format translation for stored date descriptors
//! - Value normalization into export-safe text
//! - Content-dimension combinations and best-effort form schema resolution
//! - Field label collection across schema-drifted entries
//! - Export format registry and the built-in tabular sinks
//! - Cross-cutting error types

pub mod dimensions;
pub mod entities;
pub mod errors;
pub mod export;
pub mod fields;
pub mod interval;
pub mod normalize;
pub mod php_date;
pub mod schema;

/// Bucket assigned to submissions that arrive without an identifier.
pub const UNDEFINED_BUCKET: &str = "__undefined__";

/// Maximum length of a bucket identifier.
pub const MAX_BUCKET_LEN: usize = 256;
