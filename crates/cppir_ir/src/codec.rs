//! JSON encoding of the IR graph.
//!
//! The artifact is a JSON array of node objects. Decoding validates that each node's `index` matches its
//! position, so a decoded [`Graph`] upholds the same invariant as one produced by the builder.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::graph::Graph;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("cannot access '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid IR artifact: {0}")]
    Json(#[from] serde_json::Error),
}

/// Encode a graph as pretty-printed JSON.
pub fn to_string(graph: &Graph) -> Result<String, CodecError> {
    Ok(serde_json::to_string_pretty(graph)?)
}

/// Decode a graph from JSON text.
pub fn from_str(json: &str) -> Result<Graph, CodecError> {
    Ok(serde_json::from_str(json)?)
}

/// Write a graph to `path`, replacing any existing file.
pub fn write_file(path: &Path, graph: &Graph) -> Result<(), CodecError> {
    let json = to_string(graph)?;
    fs::write(path, json).map_err(|source| CodecError::Io {
        path: path.to_path_buf(),
        source,
    })
}

pub fn read_file(path: &Path) -> Result<Graph, CodecError> {
    let json = fs::read_to_string(path).map_err(|source| CodecError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    from_str(&json)
}
