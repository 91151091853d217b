//! Writes matches and per-package messages to the output stream.
//!
//! Messages and matches share one stream, in the order they occur.

use std::io::{self, Write};

use findunexp_core::ReportFormat;
use serde::Serialize;

use crate::matcher::EmbeddingMatch;
use crate::printer::render;

/// Streams report output to a writer.
pub struct Reporter<W: Write> {
    out: W,
    format: ReportFormat,
    render_failures: usize,
}

#[derive(Serialize)]
struct JsonRecord<'a> {
    file: String,
    line: usize,
    column: usize,
    type_name: Option<&'a str>,
    embedded: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<W: Write> Reporter<W> {
    /// Creates a reporter writing `format` to `out`.
    pub fn new(out: W, format: ReportFormat) -> Self {
        Self {
            out,
            format,
            render_failures: 0,
        }
    }

    /// Number of matches whose source could not be reconstructed.
    #[must_use]
    pub fn render_failures(&self) -> usize {
        self.render_failures
    }

    /// Consumes the reporter, returning the writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    /// Writes one match.
    ///
    /// A reconstruction failure is written as a message in place of the
    /// source text; it does not fail the call.
    ///
    /// # Errors
    ///
    /// Returns an error only if writing to the output fails.
    pub fn report(&mut self, m: &EmbeddingMatch) -> io::Result<()> {
        match self.format {
            ReportFormat::Text => self.report_text(m),
            ReportFormat::Compact => self.report_compact(m),
            ReportFormat::Json => self.report_json(m),
        }
    }

    /// Writes a message line (skipped package, parse failure).
    ///
    /// # Errors
    ///
    /// Returns an error if writing to the output fails.
    pub fn message(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.out, "{text}")
    }

    fn report_text(&mut self, m: &EmbeddingMatch) -> io::Result<()> {
        writeln!(self.out, "{}:", m.position)?;
        match render(m) {
            Ok(source) => writeln!(self.out, "{source}")?,
            Err(e) => {
                self.render_failures += 1;
                writeln!(self.out, "{}: {e}", m.position.file.display())?;
            }
        }
        writeln!(self.out)
    }

    fn report_compact(&mut self, m: &EmbeddingMatch) -> io::Result<()> {
        writeln!(
            self.out,
            "{}: struct {} embeds unexported pointer *{}",
            m.position,
            m.type_name().unwrap_or("(anonymous)"),
            m.embedded,
        )
    }

    fn report_json(&mut self, m: &EmbeddingMatch) -> io::Result<()> {
        let (source, error) = match render(m) {
            Ok(s) => (Some(s), None),
            Err(e) => {
                self.render_failures += 1;
                (None, Some(e.to_string()))
            }
        };
        let record = JsonRecord {
            file: m.position.file.display().to_string(),
            line: m.position.line,
            column: m.position.column,
            type_name: m.type_name(),
            embedded: &m.embedded,
            source,
            error,
        };
        serde_json::to_writer(&mut self.out, &record)?;
        writeln!(self.out)
    }
}
