//! Diagnostics and the per-format render cache.
//!
//! [`Reporter`] writes human-readable progress and warning lines to a
//! caller-supplied diagnostic stream. Progress lines are gated by the
//! verbosity flag; warnings are always written. None of this output is part
//! of the document.
//!
//! [`Rendered`] caches the serialized text per output format so the size
//! summary and the final output never render the same document twice.

use crate::document::Document;
use crate::error::{Error, Result};
use crate::{json, ser};
use std::io::{self, Write};

/// Output format selection for rendering and size reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Toon,
}

impl Format {
    /// The name used in human-facing summary lines.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Format::Json => "JSON",
            Format::Toon => "TOON",
        }
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Verbosity-gated diagnostic sink.
///
/// Failures to write diagnostics are swallowed: reporting is never fatal to
/// producing the document.
pub struct Reporter {
    sink: Box<dyn Write>,
    verbose: bool,
}

impl Reporter {
    /// Creates a reporter writing to the given sink.
    pub fn new(sink: Box<dyn Write>, verbose: bool) -> Self {
        Reporter { sink, verbose }
    }

    /// Creates a reporter writing to standard error.
    pub fn stderr(verbose: bool) -> Self {
        Reporter::new(Box::new(io::stderr()), verbose)
    }

    /// Creates a reporter that discards everything.
    pub fn quiet() -> Self {
        Reporter::new(Box::new(io::sink()), false)
    }

    /// Writes a progress line, only when verbose.
    pub fn info(&mut self, message: impl AsRef<str>) {
        if self.verbose {
            let _ = writeln!(self.sink, "{}", message.as_ref());
        }
    }

    /// Writes a warning line, regardless of verbosity.
    pub fn warn(&mut self, message: impl AsRef<str>) {
        let _ = writeln!(self.sink, "{}", message.as_ref());
    }

    /// Writes the human-facing size summary for a finished build.
    pub fn built(&mut self, size: usize, format: Format) {
        let formatted = format_size(size);
        self.info(format!("Built {formatted} of {format} context in total."));
    }
}

/// Formats a byte count with binary units and two decimals, e.g. `1.95 KiB`.
#[must_use]
pub fn format_size(bytes: usize) -> String {
    const UNITS: [&str; 5] = ["KiB", "MiB", "GiB", "TiB", "PiB"];
    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let mut size = bytes as f64 / 1024.0;
    let mut unit = UNITS[0];
    for next in &UNITS[1..] {
        if size < 1024.0 {
            break;
        }
        size /= 1024.0;
        unit = next;
    }
    format!("{size:.2} {unit}")
}

/// Render cache keyed by [`Format`]: each Document/format pair is serialized
/// at most once, and sizes come from the cached text.
pub struct Rendered<'a> {
    document: &'a Document,
    json: Option<String>,
    toon: Option<String>,
}

impl<'a> Rendered<'a> {
    /// Wraps a fully populated document for rendering. The document is
    /// treated as read-only from here on.
    #[must_use]
    pub fn new(document: &'a Document) -> Self {
        Rendered {
            document,
            json: None,
            toon: None,
        }
    }

    /// Returns the rendered text in the requested format, rendering on first
    /// use and serving the cache afterwards.
    pub fn text(&mut self, format: Format) -> Result<&str> {
        let document = self.document;
        let slot = match format {
            Format::Json => &mut self.json,
            Format::Toon => &mut self.toon,
        };
        if slot.is_none() {
            let rendered = match format {
                Format::Json => json::encode(document)?,
                Format::Toon => ser::encode(&document.to_value()),
            };
            *slot = Some(rendered);
        }
        Ok(slot.as_deref().unwrap_or_default())
    }

    /// Returns the exact byte length of the rendered output.
    pub fn size(&mut self, format: Format) -> Result<usize> {
        Ok(self.text(format)?.len())
    }

    /// Writes the rendered output to the given sink.
    pub fn write_to(&mut self, format: Format, out: &mut dyn Write) -> Result<()> {
        let text = self.text(format)?;
        out.write_all(text.as_bytes())
            .map_err(|e| Error::io(&e.to_string()))
    }
}
