//! Extraction configuration.

use std::path::PathBuf;

/// Settings for one extraction run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractConfig {
    /// Directories holding the user's headers. They also define user scope.
    pub roots: Vec<PathBuf>,
    /// Arguments forwarded verbatim to the C++ parser
    pub compiler_args: Vec<String>,
    /// File extensions treated as headers, without the leading dot
    pub header_extensions: Vec<String>,
    pub header_order: HeaderOrder,
}

/// Order in which discovered headers are included in the synthetic unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderOrder {
    /// Sorted by path, duplicates removed
    Sorted,
    /// Directory enumeration order, as the filesystem reports it
    Discovery,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            roots: Vec::new(),
            compiler_args: Vec::new(),
            header_extensions: vec!["h".to_string(), "hpp".to_string()],
            header_order: HeaderOrder::Sorted,
        }
    }
}

impl ExtractConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.roots.push(root.into());
        self
    }

    pub fn with_roots<I, P>(mut self, roots: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.roots.extend(roots.into_iter().map(Into::into));
        self
    }

    pub fn with_compiler_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.compiler_args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Replace the header extensions
    pub fn with_header_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.header_extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_header_order(mut self, order: HeaderOrder) -> Self {
        self.header_order = order;
        self
    }
}
