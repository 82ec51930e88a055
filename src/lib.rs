//! # context_pack
//!
//! Collects project context (file contents, command output, metadata and
//! variables) into a single structured document and renders it as JSON or
//! TOON (Token-Oriented Object Notation).
//!
//! ## What for?
//!
//! Feeding a project's relevant state to a Large Language Model means
//! gathering scattered sources into one payload. `context_pack` does the
//! gathering declaratively: a specification names the files to read, the
//! commands to run and the metadata to attach, and the builder executes it
//! tolerantly: a missing file or a failing command degrades to a warning
//! instead of aborting the whole collection.
//!
//! ## Key Features
//!
//! - **Declarative specifications**: a flat [`Directive`] list, built
//!   programmatically or parsed from a plain-text context script
//! - **Tolerant collection**: unavailable resources are reported and
//!   skipped; the document is still produced
//! - **Two output formats**: canonical JSON and compact TOON, rendered at
//!   most once per format through a small cache
//! - **Deterministic output**: identical inputs yield byte-identical JSON
//!   and TOON
//! - **No Unsafe Code**: written entirely in safe Rust
//!
//! ## Quick Start
//!
//! ```rust
//! use context_pack::{Builder, Directive, Format, Rendered, Reporter, ValueSource, Value};
//!
//! let directives = vec![
//!     Directive::Meta(vec![(
//!         "version".to_string(),
//!         ValueSource::Literal(Value::from("1.0")),
//!     )]),
//!     Directive::Variable(vec![(
//!         "foo".to_string(),
//!         ValueSource::Literal(Value::from("bar")),
//!     )]),
//! ];
//!
//! let mut reporter = Reporter::quiet();
//! let document = Builder::new(&mut reporter).build(&directives).unwrap();
//!
//! let mut rendered = Rendered::new(&document);
//! assert_eq!(
//!     rendered.text(Format::Toon).unwrap(),
//!     "files:\ncommands:\nmetadata:\n  version: \"1.0\"\nvariables:\n  foo: bar\n"
//! );
//! ```
//!
//! ## Context Scripts
//!
//! The same specification can live in a file:
//!
//! ```text
//! meta version: "1.0"
//! variable foo: "bar"
//! file "src/lib.rs" tags: lib
//! command "git log -1" tags: vcs
//! ```
//!
//! [`generate_context`] parses and executes a script in one call; see the
//! `demos/` directory for runnable programs.

pub mod builder;
pub mod de;
pub mod document;
pub mod error;
pub mod json;
pub mod map;
pub mod report;
pub mod script;
pub mod ser;
pub mod system;
pub mod value;

pub use builder::{Builder, Directive, ValueSource};
pub use document::{CommandEntry, Document, FileEntry};
pub use error::{Error, Result};
pub use map::Map;
pub use report::{format_size, Format, Rendered, Reporter};
pub use value::{Number, Value};

use std::fs;

/// Renders a document as TOON text.
///
/// # Examples
///
/// ```rust
/// use context_pack::{encode_toon, Document};
///
/// let toon = encode_toon(&Document::default());
/// assert_eq!(toon, "files:\ncommands:\nmetadata:\nvariables:\n");
/// ```
#[must_use]
pub fn encode_toon(document: &Document) -> String {
    ser::encode(&document.to_value())
}

/// Parses TOON text into a generic [`Value`] tree.
///
/// # Errors
///
/// Returns an error with line information when the text violates the TOON
/// grammar, including `key[N]` count mismatches.
pub fn decode_toon(input: &str) -> Result<Value> {
    de::decode(input)
}

/// Renders a document as compact JSON.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn encode_json(document: &Document) -> Result<String> {
    json::encode(document)
}

/// Reads a context script from `path`, parses it and executes it with the
/// OS-backed collaborators.
///
/// # Errors
///
/// Returns an I/O error when the script file itself cannot be read and a
/// script error when it does not match the grammar. Resource failures during
/// execution degrade to warnings on the reporter.
pub fn generate_context(path: &str, reporter: &mut Reporter) -> Result<Document> {
    let source = fs::read_to_string(path).map_err(|e| Error::io(&e.to_string()))?;
    let directives = script::parse(&source)?;
    Builder::new(reporter).build(&directives)
}
