//! Canonical JSON rendering of a document.
//!
//! The JSON form is the lossless reference representation: sections in the
//! fixed order `files, commands, metadata, variables`, object keys in
//! insertion order, entries with only their present fields, values
//! type-preserved. Everything follows from the serde derives on
//! [`Document`] plus `serde_json`'s `preserve_order` feature.

use crate::document::Document;
use crate::error::{Error, Result};

/// Renders the document as compact JSON.
pub fn encode(document: &Document) -> Result<String> {
    serde_json::to_string(document).map_err(|e| Error::custom(e.to_string()))
}
