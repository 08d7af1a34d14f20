//! AST snapshot to IR graph lowering.
//!
//! # Architecture
//!
//! - `scope` - user scope, path normalization, fully-qualified names
//! - `walker` - declaration walking: records, free functions, aliases, methods
//! - `types` - qualifier peeling and data type lowering
//!
//! The lowering context owns the [`GraphBuilder`] for the whole pass. Every node is created through
//! the builder's find/reserve/intern operations, so lowering the same entity twice returns the index
//! created the first time. Records and composite data types reserve their index before their children
//! are lowered, which is what makes self-referential and mutually referential types terminate.
//!
//! Lowering never fails. Anything it cannot represent degrades to `Unknown`/`Unsupported` nodes or is
//! left out of the graph.
//!
//! # Usage
//!
//! ```rust,ignore
//! use cppir::lower::{CppLowering, UserScope};
//!
//! let scope = UserScope::new(&config.roots);
//! let mut lowering = CppLowering::new(&parsed.snapshot, &scope, GraphBuilder::new());
//! lowering.lower_translation_unit();
//! let graph = lowering.finish();
//! ```

pub mod scope;
mod types;
mod walker;

use cppir_ir::{Graph, GraphBuilder, Location};

use crate::frontend::ast::{AstSnapshot, SourceLocation};

pub use scope::{UserScope, fully_qualified_name, normalize_path};
pub use types::builtin_kind;
pub use walker::{method_modifiers, parse_annotation, split_comment};

/// Lowering context for one translation unit.
pub struct CppLowering<'a> {
    pub(super) snapshot: &'a AstSnapshot,
    pub(super) scope: &'a UserScope,
    pub(super) graph: GraphBuilder,
}

impl<'a> CppLowering<'a> {
    /// Create a lowering context that appends to `graph`.
    ///
    /// The builder usually already holds the parser's diagnostic messages.
    pub fn new(snapshot: &'a AstSnapshot, scope: &'a UserScope, graph: GraphBuilder) -> Self {
        Self { snapshot, scope, graph }
    }

    pub fn graph(&self) -> &GraphBuilder {
        &self.graph
    }

    pub fn finish(self) -> Graph {
        self.graph.finish()
    }

    fn location_of(&self, location: &SourceLocation) -> Location {
        scope::normalize_location(location)
    }
}
