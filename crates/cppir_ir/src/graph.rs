//! The immutable IR graph.

use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;

use crate::node::{DataType, Function, Message, Node, NodeId, QualifiedType, Record};

/// Errors raised when assembling a graph from an external node list.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GraphError {
    #[error("node at position {position} carries index {found}")]
    IndexMismatch { position: usize, found: usize },
}

/// Indexed node list produced by one extraction run.
///
/// A `Graph` is read-only; it is produced by [`GraphBuilder::finish`](crate::GraphBuilder::finish) or
/// by decoding an artifact. Every node's `index` equals its position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "Vec<Node>")]
pub struct Graph {
    nodes: Vec<Node>,
}

impl Graph {
    /// Build a graph from nodes that already carry their indices.
    pub fn from_nodes(nodes: Vec<Node>) -> Result<Self, GraphError> {
        for (position, node) in nodes.iter().enumerate() {
            if node.index.index() != position {
                return Err(GraphError::IndexMismatch {
                    position,
                    found: node.index.index(),
                });
            }
        }
        Ok(Self { nodes })
    }

    /// Wrap nodes whose indices were assigned by the builder.
    pub(crate) fn from_builder(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Node> {
        self.nodes.iter()
    }

    pub fn messages(&self) -> impl Iterator<Item = (&Node, &Message)> {
        self.nodes.iter().filter_map(|n| n.as_message().map(|m| (n, m)))
    }

    pub fn records(&self) -> impl Iterator<Item = (&Node, &Record)> {
        self.nodes.iter().filter_map(|n| n.as_record().map(|r| (n, r)))
    }

    pub fn functions(&self) -> impl Iterator<Item = (&Node, &Function)> {
        self.nodes.iter().filter_map(|n| n.as_function().map(|f| (n, f)))
    }

    pub fn data_types(&self) -> impl Iterator<Item = (&Node, &DataType)> {
        self.nodes.iter().filter_map(|n| n.as_data_type().map(|d| (n, d)))
    }

    pub fn qualified_types(&self) -> impl Iterator<Item = (&Node, &QualifiedType)> {
        self.nodes.iter().filter_map(|n| n.as_qualified_type().map(|q| (n, q)))
    }

    /// First record with the given fully-qualified name.
    pub fn find_record(&self, name: &str) -> Option<(&Node, &Record)> {
        self.records().find(|(n, _)| n.name == name)
    }

    /// First function with the given fully-qualified name.
    pub fn find_function(&self, name: &str) -> Option<(&Node, &Function)> {
        self.functions().find(|(n, _)| n.name == name)
    }

    /// Data type with the given canonical spelling.
    pub fn find_data_type(&self, name: &str) -> Option<(&Node, &DataType)> {
        self.data_types().find(|(n, _)| n.name == name)
    }

    /// Follow a QualifiedType index to its DataType.
    pub fn resolve_data_type(&self, qualified: NodeId) -> Option<(&Node, &DataType)> {
        let qt = self.get(qualified)?.as_qualified_type()?;
        let node = self.get(qt.data_type)?;
        node.as_data_type().map(|d| (node, d))
    }
}

impl TryFrom<Vec<Node>> for Graph {
    type Error = GraphError;

    fn try_from(nodes: Vec<Node>) -> Result<Self, Self::Error> {
        Graph::from_nodes(nodes)
    }
}

impl Serialize for Graph {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.nodes.serialize(serializer)
    }
}

impl<'a> IntoIterator for &'a Graph {
    type Item = &'a Node;
    type IntoIter = std::slice::Iter<'a, Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.iter()
    }
}
