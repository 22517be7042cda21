//! Console and JSON output for the `mesh-manifold` binary.
//!
//! Text mode prints merged counts, one `======` block per non-manifold
//! occurrence and a closing total. JSON mode prints a single summary object.

use std::io::{self, Write};

use colored::Colorize;
use serde::Serialize;

use mesh_manifold::{DiagnosticSink, MeshTopology, NonManifoldOccurrence};

use crate::OutputFormat;

/// Print a run summary as pretty JSON. Text mode prints as it goes instead.
pub fn print<T: Serialize>(value: &T, format: OutputFormat, quiet: bool) {
    if quiet || format != OutputFormat::Json {
        return;
    }
    if let Ok(json) = serde_json::to_string_pretty(value) {
        println!("{}", json);
    }
}

/// Print a success message.
pub fn success(msg: &str, format: OutputFormat, quiet: bool) {
    if quiet || format == OutputFormat::Json {
        return;
    }
    println!("{} {}", "✓".green().bold(), msg);
}

/// Print a fatal error and its causes to stderr.
pub fn error(err: &anyhow::Error) {
    eprintln!("{} {}", "✗".red().bold(), err);
    for cause in err.chain().skip(1) {
        eprintln!("  caused by: {}", cause);
    }
}

/// Print merged vertex, edge and triangle counts.
pub fn counts(topology: &MeshTopology, quiet: bool) {
    if quiet {
        return;
    }
    println!("verticesCount: {}", topology.vertex_count());
    println!("edgesCount: {}", topology.edge_count());
    println!("trianglesCount: {}", topology.triangle_count());
}

/// Writes one block per non-manifold occurrence and the final total.
///
/// The first write error stops further output and is returned by
/// [`ConsoleSink::finish`].
pub struct ConsoleSink<W: Write> {
    writer: W,
    quiet: bool,
    error: Option<io::Error>,
}

impl ConsoleSink<io::Stdout> {
    /// Sink writing to standard output.
    pub fn stdout(quiet: bool) -> Self {
        Self::new(io::stdout(), quiet)
    }
}

impl<W: Write> ConsoleSink<W> {
    pub fn new(writer: W, quiet: bool) -> Self {
        Self {
            writer,
            quiet,
            error: None,
        }
    }

    /// Flush and hand back the writer, or the first write error.
    pub fn finish(mut self) -> io::Result<W> {
        if let Some(e) = self.error.take() {
            return Err(e);
        }
        self.writer.flush()?;
        Ok(self.writer)
    }

    fn emit(&mut self, write: impl FnOnce(&mut W) -> io::Result<()>) {
        if self.quiet || self.error.is_some() {
            return;
        }
        if let Err(e) = write(&mut self.writer) {
            self.error = Some(e);
        }
    }
}

impl<W: Write> DiagnosticSink for ConsoleSink<W> {
    fn non_manifold(&mut self, occurrence: &NonManifoldOccurrence) {
        self.emit(|w| {
            writeln!(w, "======")?;
            writeln!(w, "{}", occurrence)
        });
    }

    fn finished(&mut self, total: usize) {
        self.emit(|w| {
            writeln!(w, "======")?;
            let line = format!("NonManifold count: {}", total);
            if total == 0 {
                writeln!(w, "{}", line)
            } else {
                writeln!(w, "{} {}", "⚠".yellow().bold(), line.yellow())
            }
        });
    }
}
