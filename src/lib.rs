#![forbid(unsafe_code)]
//! cppir: C++ headers to a language-neutral IR graph
//!
//! This crate provides the extraction pipeline: header discovery, the synthetic translation unit,
//! the parser seam (with a libclang backend behind the `libclang` feature), and the lowering pass
//! that produces a [`cppir_ir::Graph`]. Code generators consume the graph through `cppir_plugin`.
//!
//! ## Panic Policy
//!
//! This codebase follows explicit error handling:
//!
//! - **Production code**: Use `Result` or `Option` with `?` / `ok_or` / `map_err`. The `cli` module enforces
//!   `#![deny(clippy::unwrap_used)]`.
//!
//! - **Lowering**: never fails. Declarations it cannot represent degrade to `Unknown`/`Unsupported` nodes.
//!
//! - **Test code**: `.unwrap()` and `.expect()` are acceptable in tests.

pub mod cli;
pub mod config;
pub mod extract;
pub mod frontend;
pub mod lower;

pub use config::{ExtractConfig, HeaderOrder};
pub use extract::{ExtractError, Extractor, lower_parsed_unit};
pub use frontend::unit::{AstParser, ParseError, ParsedUnit, UnitSource};
