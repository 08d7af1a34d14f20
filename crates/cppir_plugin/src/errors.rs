//! Errors raised while dispatching graph nodes to generators.

use cppir_ir::NodeId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("no type generator accepts {kind} node {node}")]
    NoTypeGenerator { node: NodeId, kind: &'static str },

    #[error("node {0} does not exist in the graph")]
    UnknownNode(NodeId),

    #[error("{kind} node {node} cannot be represented: {reason}")]
    Unsupported {
        node: NodeId,
        kind: &'static str,
        reason: String,
    },

    #[error("generator '{generator}' failed: {message}")]
    Generator { generator: String, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
