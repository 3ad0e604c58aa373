// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Source map decoding.
//!
//! This crate provides functionality for:
//! - Decoding Base64 VLQ runs into signed integers
//! - Streaming the `mappings` string of a source map as position entries
//! - Loading the source map JSON document
//!
//! # Example
//!
//! ```
//! use smap_decode::SourceMapDocument;
//!
//! let json = r#"{
//!     "version": 3,
//!     "sources": ["src/app.ts"],
//!     "names": ["main"],
//!     "mappings": "AAAAA;EACA"
//! }"#;
//! let doc: SourceMapDocument = json.parse().unwrap();
//!
//! for entry in doc.mappings() {
//!     let entry = entry.unwrap();
//!     println!("{entry}");
//! }
//! ```

pub mod document;
pub mod error;
pub mod mappings;
pub mod vlq;

// Re-export main types
pub use document::SourceMapDocument;
pub use error::{IndexKind, Result, SmapError, VlqError};
pub use mappings::{
	decode_mappings, parse_mappings, MappingEntry, MappingParser, OriginalLocation, ParseOptions,
};
pub use vlq::decode_segment;
