//! cppir frontend
//!
//! Everything between header directories on disk and an owned AST the lowering pass can walk:
//! - `headers`: header discovery under the configured roots
//! - `unit`: synthetic translation unit, parser seam, diagnostics
//! - `ast`: owned snapshot of the parser's cursors and types
//! - `build`: helpers for assembling snapshots by hand
//! - `libclang`: the libclang-backed parser (feature `libclang`)

pub mod ast;
pub mod build;
pub mod headers;
pub mod unit;

#[cfg(feature = "libclang")]
pub mod libclang;
