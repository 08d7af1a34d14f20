//! Language-neutral IR for C++ header extraction.
//!
//! The IR is a flat, append-only list of [`Node`]s. Every node carries its own position in the list
//! (`index`), and the index is the only way nodes refer to each other. A reference that has no target
//! (an external record, an unresolved base class) is `None` in Rust and `-1` on the wire.
//!
//! ## Layers
//!
//! - [`node`] - the closed set of node kinds and their payloads
//! - [`builder`] - [`GraphBuilder`], the single-writer construction side with per-kind dedup maps
//! - [`graph`] - [`Graph`], the immutable artifact handed to later phases
//! - [`codec`] - JSON reading and writing of a [`Graph`]
//!
//! ## Examples
//!
//! ```rust
//! use cppir_ir::{BuiltinKind, DataType, GraphBuilder, Location, QualifiedType};
//!
//! let mut builder = GraphBuilder::new();
//! let void = builder.reserve_data_type("void", Location::default());
//! builder.complete_data_type(void, DataType::Builtin { kind: BuiltinKind::Void });
//! let qt = builder.intern_qualified_type("void", Location::default(), QualifiedType::new(void));
//! let again = builder.intern_qualified_type("void", Location::default(), QualifiedType::new(void));
//! assert_eq!(qt, again);
//!
//! let graph = builder.finish();
//! assert_eq!(graph.len(), 2);
//! ```

pub mod builder;
pub mod codec;
pub mod graph;
pub mod node;

pub use builder::GraphBuilder;
pub use codec::CodecError;
pub use graph::{Graph, GraphError};
pub use node::{
    Access, Annotation, BuiltinKind, DataType, DiagnosticSeverity, Enumerator, Field, Function, Location, Message,
    Modifier, Node, NodeId, NodeKind, Parameter, QualifiedType, Qualifier, Record, RecordBase, TemplateArgument,
    Variable,
};
