//! Translation unit synthesis and the parser seam.
//!
//! All discovered headers are parsed together as one synthetic source file that defines the
//! generation marker macro and includes every header by absolute path. Headers can test the marker
//! to hide code that should not be visible to extraction.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use cppir_ir::{DiagnosticSeverity, GraphBuilder, Message};
use thiserror::Error;
use tracing::{debug, error, warn};

use super::ast::{AstSnapshot, SourceLocation};
use crate::lower::scope::normalize_location;

/// Macro defined at the top of the synthetic unit.
pub const GENERATION_MARKER: &str = "CPPIR_GEN";

/// File name of the synthetic unit inside the output directory.
pub const UNIT_FILE_NAME: &str = "cppir_unit.cpp";

/// Name given to every diagnostic Message node.
pub const DIAGNOSTIC_NODE_NAME: &str = "Diagnostic";

/// The synthetic translation unit handed to the parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitSource {
    /// Path the unit is reported under
    pub path: PathBuf,
    pub contents: String,
    /// Arguments forwarded verbatim to the parser
    pub arguments: Vec<String>,
}

impl UnitSource {
    /// Build the unit that includes `headers` in order.
    pub fn synthesize(headers: &[PathBuf], unit_dir: &Path, arguments: &[String]) -> Self {
        let mut contents = format!("#define {GENERATION_MARKER}\n");
        for header in headers {
            // Forward slashes keep the include valid on every host.
            let include = header.to_string_lossy().replace('\\', "/");
            let _ = writeln!(contents, "#include \"{include}\"");
        }
        Self {
            path: unit_dir.join(UNIT_FILE_NAME),
            contents,
            arguments: arguments.to_vec(),
        }
    }
}

/// Parser-native diagnostic severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DiagnosticLevel {
    Ignored,
    Note,
    Warning,
    Error,
    Fatal,
}

impl From<DiagnosticLevel> for DiagnosticSeverity {
    fn from(level: DiagnosticLevel) -> Self {
        match level {
            DiagnosticLevel::Ignored => DiagnosticSeverity::Ignored,
            DiagnosticLevel::Note => DiagnosticSeverity::Note,
            DiagnosticLevel::Warning => DiagnosticSeverity::Warning,
            DiagnosticLevel::Error => DiagnosticSeverity::Error,
            DiagnosticLevel::Fatal => DiagnosticSeverity::Fatal,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserDiagnostic {
    pub location: SourceLocation,
    /// Formatted diagnostic text
    pub text: String,
    pub category: String,
    pub level: DiagnosticLevel,
}

/// Result of parsing a [`UnitSource`].
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedUnit {
    pub snapshot: AstSnapshot,
    pub diagnostics: Vec<ParserDiagnostic>,
}

impl ParsedUnit {
    pub fn new(snapshot: AstSnapshot) -> Self {
        Self {
            snapshot,
            diagnostics: Vec::new(),
        }
    }

    pub fn with_diagnostic(mut self, diagnostic: ParserDiagnostic) -> Self {
        self.diagnostics.push(diagnostic);
        self
    }
}

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("C++ parser is unavailable: {0}")]
    Unavailable(String),

    #[error("no translation unit produced for '{}': {reason}", path.display())]
    NoTranslationUnit { path: PathBuf, reason: String },
}

/// A C++ parser that turns a synthetic unit into an owned snapshot.
///
/// Diagnostics, even fatal ones, are data. An `Err` means the parser produced no translation unit at
/// all.
pub trait AstParser {
    fn parse(&self, unit: &UnitSource) -> Result<ParsedUnit, ParseError>;
}

impl<F> AstParser for F
where
    F: Fn(&UnitSource) -> Result<ParsedUnit, ParseError>,
{
    fn parse(&self, unit: &UnitSource) -> Result<ParsedUnit, ParseError> {
        self(unit)
    }
}

/// Append one Message node per diagnostic, in parser order.
pub fn record_diagnostics(graph: &mut GraphBuilder, diagnostics: &[ParserDiagnostic]) {
    for diagnostic in diagnostics {
        match diagnostic.level {
            DiagnosticLevel::Error | DiagnosticLevel::Fatal => {
                error!(location = %diagnostic.location, "{}", diagnostic.text)
            }
            DiagnosticLevel::Warning => warn!(location = %diagnostic.location, "{}", diagnostic.text),
            DiagnosticLevel::Note | DiagnosticLevel::Ignored => {
                debug!(location = %diagnostic.location, "{}", diagnostic.text)
            }
        }
        graph.push_message(
            DIAGNOSTIC_NODE_NAME,
            normalize_location(&diagnostic.location),
            Message {
                message: diagnostic.text.clone(),
                category: diagnostic.category.clone(),
                severity: diagnostic.level.into(),
            },
        );
    }
}
