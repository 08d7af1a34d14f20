//! Extraction facade: headers in, IR graph out.
//!
//! Pipeline:
//!
//! 1. Collect headers under the configured roots
//! 2. Synthesize one translation unit including all of them
//! 3. Parse it (the only step that can abort the run)
//! 4. Record every parser diagnostic as a Message node
//! 5. Walk and lower user-scope declarations
//!
//! # Usage
//!
//! ```rust,ignore
//! use cppir::{ExtractConfig, Extractor};
//!
//! let config = ExtractConfig::new().with_root("include").with_compiler_args(["-std=c++17"]);
//! let graph = Extractor::new(config, parser).run(Path::new("out"))?;
//! ```

use std::path::{Path, PathBuf};

use cppir_ir::{Graph, GraphBuilder};
use miette::Diagnostic;
use thiserror::Error;
use tracing::info;

use crate::config::ExtractConfig;
use crate::frontend::headers::collect_headers;
use crate::frontend::unit::{AstParser, ParseError, ParsedUnit, UnitSource, record_diagnostics};
use crate::lower::{CppLowering, UserScope};

#[derive(Debug, Error, Diagnostic)]
pub enum ExtractError {
    #[error("no root directories configured")]
    #[diagnostic(code(cppir::no_roots), help("pass at least one header directory with --directory"))]
    NoRoots,

    #[error("failed to create a translation unit")]
    #[diagnostic(
        code(cppir::translation_unit),
        help("check the compiler arguments passed after `--` and that libclang can be loaded")
    )]
    TranslationUnit(#[source] ParseError),
}

/// Runs the extraction pipeline with a given parser.
pub struct Extractor<P> {
    config: ExtractConfig,
    parser: P,
}

impl<P: AstParser> Extractor<P> {
    pub fn new(config: ExtractConfig, parser: P) -> Self {
        Self { config, parser }
    }

    pub fn config(&self) -> &ExtractConfig {
        &self.config
    }

    /// Discover headers under the configured roots and extract them.
    ///
    /// `unit_dir` is where the synthetic translation unit is reported to live.
    #[tracing::instrument(skip_all, fields(roots = self.config.roots.len()))]
    pub fn run(&self, unit_dir: &Path) -> Result<Graph, ExtractError> {
        if self.config.roots.is_empty() {
            return Err(ExtractError::NoRoots);
        }
        let headers = collect_headers(&self.config);
        self.extract(&headers, unit_dir)
    }

    /// Extract an explicit, ordered list of headers.
    #[tracing::instrument(skip_all, fields(headers = headers.len()))]
    pub fn extract(&self, headers: &[PathBuf], unit_dir: &Path) -> Result<Graph, ExtractError> {
        let unit = UnitSource::synthesize(headers, unit_dir, &self.config.compiler_args);
        let parsed = self.parser.parse(&unit).map_err(ExtractError::TranslationUnit)?;
        let graph = lower_parsed_unit(&parsed, &self.config);
        info!(
            nodes = graph.len(),
            diagnostics = parsed.diagnostics.len(),
            "extraction finished"
        );
        Ok(graph)
    }
}

/// Turn an already-parsed unit into a graph: diagnostics first, then declarations.
pub fn lower_parsed_unit(parsed: &ParsedUnit, config: &ExtractConfig) -> Graph {
    let scope = UserScope::new(&config.roots);
    let mut graph = GraphBuilder::new();
    record_diagnostics(&mut graph, &parsed.diagnostics);
    let mut lowering = CppLowering::new(&parsed.snapshot, &scope, graph);
    lowering.lower_translation_unit();
    lowering.finish()
}
