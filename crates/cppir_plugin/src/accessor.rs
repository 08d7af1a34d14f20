//! Read access to the graph for language generators.

use std::cell::OnceCell;

use cppir_ir::{Annotation, Graph, Node, NodeId};
use tracing::trace;

use crate::code_tree::{self, NamespaceNode};
use crate::errors::DispatchError;
use crate::generator::TypeGeneratorRegistry;
use crate::holder::TypeHolder;

/// What a language or type generator may ask of the host.
pub trait GraphAccessor {
    fn graph(&self) -> &Graph;

    fn node(&self, id: NodeId) -> Option<&Node> {
        self.graph().get(id)
    }

    /// Dispatch `node` to the highest-priority type generator.
    fn generate_type(&self, node: &Node, annotations: &[Annotation]) -> Result<TypeHolder, DispatchError>;

    /// Namespace/class/function tree of the graph.
    fn code_tree(&self) -> Result<&NamespaceNode, DispatchError>;
}

/// Default [`GraphAccessor`] over a loaded graph.
#[derive(Debug)]
pub struct GeneratorControl<'g> {
    graph: &'g Graph,
    registry: TypeGeneratorRegistry,
    code_tree: OnceCell<NamespaceNode>,
}

impl<'g> GeneratorControl<'g> {
    pub fn new(graph: &'g Graph, registry: TypeGeneratorRegistry) -> Self {
        Self {
            graph,
            registry,
            code_tree: OnceCell::new(),
        }
    }

    pub fn registry(&self) -> &TypeGeneratorRegistry {
        &self.registry
    }

    /// Convenience lookup that turns a dangling index into an error.
    pub fn require_node(&self, id: NodeId) -> Result<&Node, DispatchError> {
        self.graph.get(id).ok_or(DispatchError::UnknownNode(id))
    }
}

impl GraphAccessor for GeneratorControl<'_> {
    fn graph(&self) -> &Graph {
        self.graph
    }

    fn generate_type(&self, node: &Node, annotations: &[Annotation]) -> Result<TypeHolder, DispatchError> {
        let generator =
            self.registry
                .select(self, node, annotations)
                .ok_or_else(|| DispatchError::NoTypeGenerator {
                    node: node.index,
                    kind: node.kind_name(),
                })?;
        trace!(node = %node.index, generator = generator.name(), "dispatching type");
        generator.generate_type(self, node, annotations)
    }

    fn code_tree(&self) -> Result<&NamespaceNode, DispatchError> {
        if let Some(tree) = self.code_tree.get() {
            return Ok(tree);
        }
        let tree = code_tree::build(self)?;
        Ok(self.code_tree.get_or_init(|| tree))
    }
}
