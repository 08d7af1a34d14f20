//! CLI command implementations
//!
//! All command functions return `CliResult<ExitCode>` instead of calling
//! `process::exit`. Error handling and exits happen in the top-level `run()`.

use std::fs;
use std::path::{Path, PathBuf};

use cppir_ir::{Graph, codec};
use cppir_plugin::{GeneratorControl, LanguageRegistry, TypeGeneratorRegistry};

use super::{CliError, CliResult, ExitCode};
use crate::config::ExtractConfig;

/// File name of the graph artifact written by `genjson`.
pub const RESULT_FILE_NAME: &str = "result.json";

// ============================================================================
// genjson
// ============================================================================

/// Extract every header under `directories` and write the graph to `<outpath>/result.json`.
pub fn genjson(directories: &[PathBuf], outpath: &Path, compiler_args: &[String]) -> CliResult<ExitCode> {
    fs::create_dir_all(outpath)
        .map_err(|e| CliError::failure(format!("Error creating output directory {}: {}", outpath.display(), e)))?;

    let config = ExtractConfig::new()
        .with_roots(directories.iter().cloned())
        .with_compiler_args(compiler_args.iter().cloned());
    let graph = run_extraction(config, outpath)?;

    let out_file = outpath.join(RESULT_FILE_NAME);
    codec::write_file(&out_file, &graph).map_err(|e| CliError::failure(format!("Error: {}", e)))?;

    let messages = graph.messages().count();
    println!(
        "Wrote {} nodes ({} diagnostics) to {}",
        graph.len(),
        messages,
        out_file.display()
    );
    Ok(ExitCode::SUCCESS)
}

#[cfg(feature = "libclang")]
fn run_extraction(config: ExtractConfig, unit_dir: &Path) -> CliResult<Graph> {
    use crate::extract::Extractor;
    use crate::frontend::libclang::LibclangParser;

    Extractor::new(config, LibclangParser::new())
        .run(unit_dir)
        .map_err(|e| CliError::failure(format!("{:?}", miette::Report::new(e))))
}

#[cfg(not(feature = "libclang"))]
fn run_extraction(config: ExtractConfig, _unit_dir: &Path) -> CliResult<Graph> {
    tracing::debug!(roots = config.roots.len(), "no parser backend compiled in");
    Err(CliError::failure(
        "Error: cppir was built without a C++ parser; rebuild with `--features libclang`",
    ))
}

// ============================================================================
// gencode
// ============================================================================

/// Load a graph and run the generators for the requested languages.
///
/// No language generators ship with this crate, so with the default registry every request fails
/// with a message naming the missing language.
pub fn gencode(
    input: &Path,
    server_language: &str,
    client_languages: &[String],
    outpath: &Path,
) -> CliResult<ExitCode> {
    let graph = codec::read_file(input).map_err(|e| CliError::failure(format!("Error: {}", e)))?;
    let mut languages = LanguageRegistry::new();
    run_generators(&graph, &mut languages, server_language, client_languages, outpath)
}

/// Configure and run one language generator per requested language, server first.
///
/// Every requested language is checked against `languages` before anything is written. Each
/// generator writes below `<outpath>/<language>`.
pub fn run_generators(
    graph: &Graph,
    languages: &mut LanguageRegistry,
    server_language: &str,
    client_languages: &[String],
    outpath: &Path,
) -> CliResult<ExitCode> {
    let mut requested: Vec<&str> = vec![server_language];
    for language in client_languages {
        if !requested.iter().any(|r| r.eq_ignore_ascii_case(language)) {
            requested.push(language);
        }
    }

    for language in &requested {
        if languages.get_mut(language).is_none() {
            let available: Vec<&str> = languages.names().collect();
            let available = if available.is_empty() {
                "none".to_string()
            } else {
                available.join(", ")
            };
            return Err(CliError::failure(format!(
                "Error: no code generator registered for language '{}' (available: {})",
                language, available
            )));
        }
    }

    let accessor = GeneratorControl::new(graph, TypeGeneratorRegistry::with_builtins());
    for language in requested {
        let Some(generator) = languages.get_mut(language) else {
            continue;
        };
        let output = outpath.join(generator.language_name());
        fs::create_dir_all(&output)
            .map_err(|e| CliError::failure(format!("Error creating output directory {}: {}", output.display(), e)))?;

        generator
            .configure(&accessor, &output)
            .map_err(|e| CliError::failure(format!("Error configuring {} generator: {}", language, e)))?;
        generator
            .generate_code(&accessor, &output)
            .map_err(|e| CliError::failure(format!("Error generating {} code: {}", language, e)))?;
        println!("Generated {} code in {}", generator.language_name(), output.display());
    }
    Ok(ExitCode::SUCCESS)
}
