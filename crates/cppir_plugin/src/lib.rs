//! Plugin dispatch contract for the code-generation phase.
//!
//! A later, independent process loads the IR graph and hands it to a [`GraphAccessor`]. Language
//! back ends ([`LanguageGenerator`]) walk the graph through the accessor and ask it for type
//! representations; the accessor asks every registered [`TypeGenerator`] for a priority and delegates
//! to the winner.
//!
//! ## Selection
//!
//! - The generator with the strictly highest priority wins.
//! - Among equal priorities the first registered generator wins.
//! - A generator returning `None` from `priority` does not take part.
//!
//! ## Wrapping
//!
//! There is no hidden override mechanism. A generator that wants to extend another one owns it,
//! reports a higher priority, calls it directly and decorates the returned [`TypeHolder`]:
//!
//! ```rust
//! use cppir_ir::{Annotation, Node};
//! use cppir_plugin::{
//!     BuiltinTypeGenerator, DispatchError, GraphAccessor, LanguageType, TypeGenerator, TypeHolder, languages,
//! };
//!
//! struct ProtoWrapper(BuiltinTypeGenerator);
//!
//! impl TypeGenerator for ProtoWrapper {
//!     fn priority(&self, accessor: &dyn GraphAccessor, node: &Node, annotations: &[Annotation]) -> Option<i32> {
//!         self.0.priority(accessor, node, annotations).map(|p| p + 1)
//!     }
//!
//!     fn generate_type(
//!         &self,
//!         accessor: &dyn GraphAccessor,
//!         node: &Node,
//!         annotations: &[Annotation],
//!     ) -> Result<TypeHolder, DispatchError> {
//!         let holder = self.0.generate_type(accessor, node, annotations)?;
//!         Ok(holder.with_language(languages::PROTO, LanguageType::native("bytes")))
//!     }
//! }
//! ```

pub mod accessor;
pub mod builtin;
pub mod code_tree;
pub mod errors;
pub mod generator;
pub mod holder;
pub mod language;

pub use accessor::{GeneratorControl, GraphAccessor};
pub use builtin::BuiltinTypeGenerator;
pub use code_tree::{ClassNode, CodeParameter, FunctionNode, FunctionOverload, NamespaceNode, ParameterQualifiers};
pub use errors::DispatchError;
pub use generator::{FnTypeGenerator, TypeGenerator, TypeGeneratorRegistry};
pub use holder::{LanguageType, TypeHolder, TypeWriter};
pub use language::{LanguageGenerator, LanguageRegistry, languages};
