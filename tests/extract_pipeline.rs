//! Extraction pipeline tests with stand-in parsers.

use std::cell::RefCell;
use std::fs;

use cppir::frontend::ast::{AstSnapshot, SourceLocation, TypeKind};
use cppir::frontend::unit::{DiagnosticLevel, ParserDiagnostic};
use cppir::{ExtractConfig, ExtractError, Extractor, ParseError, ParsedUnit, UnitSource};
use cppir_ir::{DiagnosticSeverity, codec};
use miette::Diagnostic;

fn unreachable_parser(_: &UnitSource) -> Result<ParsedUnit, ParseError> {
    panic!("parser must not run");
}

#[test]
fn discovered_headers_are_parsed_as_one_unit() {
    let dir = tempfile::tempdir().unwrap();
    let include = dir.path().join("include");
    fs::create_dir_all(include.join("geo")).unwrap();
    fs::create_dir_all(include.join(".cache")).unwrap();
    fs::write(include.join("geo").join("point.h"), "struct Point {};\n").unwrap();
    fs::write(include.join("api.hpp"), "void Foo();\n").unwrap();
    fs::write(include.join("notes.txt"), "not a header\n").unwrap();
    fs::write(include.join(".cache").join("stale.h"), "\n").unwrap();
    let api = include.join("api.hpp").to_string_lossy().into_owned();

    let seen = RefCell::new(None);
    let parser = |unit: &UnitSource| -> Result<ParsedUnit, ParseError> {
        *seen.borrow_mut() = Some(unit.clone());
        let mut snapshot = AstSnapshot::new(unit.path.to_string_lossy());
        let root = snapshot.root();
        let void = snapshot.builtin(TypeKind::Void, "void");
        snapshot.add_function(root, "Foo", void, &[], SourceLocation::new(api.clone(), 1, 6));
        Ok(ParsedUnit::new(snapshot))
    };

    let config = ExtractConfig::new()
        .with_root(&include)
        .with_compiler_args(["-x", "c++", "-std=c++20"]);
    let graph = Extractor::new(config, parser).run(dir.path()).unwrap();
    assert_eq!(graph.len(), 3);
    assert!(graph.find_function("Foo").is_some());

    let unit = seen.borrow().clone().unwrap();
    assert_eq!(unit.path, dir.path().join("cppir_unit.cpp"));
    assert_eq!(unit.arguments, vec!["-x", "c++", "-std=c++20"]);

    let lines: Vec<&str> = unit.contents.lines().collect();
    assert_eq!(lines[0], "#define CPPIR_GEN");
    assert_eq!(lines.len(), 3);
    assert!(lines[1].starts_with("#include \"") && lines[1].ends_with("api.hpp\""));
    assert!(lines[2].ends_with("geo/point.h\""));
}

#[test]
fn parser_diagnostics_do_not_stop_extraction() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("broken.h"), "int Foo(\n").unwrap();
    let broken = dir.path().join("broken.h").to_string_lossy().into_owned();

    let parser = |unit: &UnitSource| -> Result<ParsedUnit, ParseError> {
        Ok(ParsedUnit::new(AstSnapshot::new(unit.path.to_string_lossy())).with_diagnostic(ParserDiagnostic {
            location: SourceLocation::new(broken.clone(), 1, 9),
            text: format!("{broken}:1:9: error: expected ')'"),
            category: "Parse Issue".to_string(),
            level: DiagnosticLevel::Error,
        }))
    };

    let graph = Extractor::new(ExtractConfig::new().with_root(dir.path()), parser)
        .run(dir.path())
        .unwrap();
    let messages: Vec<_> = graph.messages().collect();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].1.severity, DiagnosticSeverity::Error);
    assert_eq!(messages[0].0.location.line, 1);
}

#[test]
fn missing_translation_unit_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let parser = |unit: &UnitSource| -> Result<ParsedUnit, ParseError> {
        Err(ParseError::NoTranslationUnit {
            path: unit.path.clone(),
            reason: "invalid compiler argument".to_string(),
        })
    };

    let err = Extractor::new(ExtractConfig::new().with_root(dir.path()), parser)
        .run(dir.path())
        .unwrap_err();
    assert!(matches!(
        err,
        ExtractError::TranslationUnit(ParseError::NoTranslationUnit { .. })
    ));
    assert_eq!(err.code().unwrap().to_string(), "cppir::translation_unit");
}

#[test]
fn extraction_without_roots_is_rejected_before_parsing() {
    let dir = tempfile::tempdir().unwrap();
    let err = Extractor::new(ExtractConfig::new(), unreachable_parser)
        .run(dir.path())
        .unwrap_err();
    assert!(matches!(err, ExtractError::NoRoots));
    assert_eq!(err.code().unwrap().to_string(), "cppir::no_roots");
    assert!(err.help().is_some());
}

#[test]
fn extracted_graph_survives_the_artifact_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let header = dir.path().join("shapes.h");
    fs::write(&header, "struct Shape { int sides; };\n").unwrap();
    let header = header.to_string_lossy().into_owned();

    let parser = |unit: &UnitSource| -> Result<ParsedUnit, ParseError> {
        let mut snapshot = AstSnapshot::new(unit.path.to_string_lossy());
        let root = snapshot.root();
        let int = snapshot.builtin(TypeKind::Int, "int");
        let (shape, _) = snapshot.add_record(
            root,
            cppir::frontend::ast::CursorKind::StructDecl,
            "Shape",
            SourceLocation::new(header.clone(), 1, 8),
        );
        snapshot.add_field(shape, "sides", int, 0, cppir::frontend::ast::AccessSpecifier::Public);
        Ok(ParsedUnit::new(snapshot))
    };

    let graph = Extractor::new(ExtractConfig::new().with_root(dir.path()), parser)
        .run(dir.path())
        .unwrap();
    let artifact = dir.path().join("result.json");
    codec::write_file(&artifact, &graph).unwrap();
    assert_eq!(codec::read_file(&artifact).unwrap(), graph);
}
