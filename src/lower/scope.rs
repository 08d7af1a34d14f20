//! User scope, path normalization and fully-qualified names.

use std::path::{Component, Path, PathBuf};

use cppir_ir::Location;

use crate::frontend::ast::{AstSnapshot, CursorData, CursorId, CursorKind, SourceLocation};

/// Absolute, lexically normalized form of `file`. Empty input stays empty.
///
/// Symlinks are not resolved; `.` and `..` components are folded.
pub fn normalize_path(file: &str) -> String {
    if file.is_empty() {
        return String::new();
    }
    let path = Path::new(file);
    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    let mut normalized = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized.to_string_lossy().into_owned()
}

pub fn normalize_location(location: &SourceLocation) -> Location {
    Location::new(normalize_path(&location.file), location.line, location.column)
}

/// The set of root directories whose declarations become first-class nodes.
#[derive(Debug, Clone, Default)]
pub struct UserScope {
    /// Normalized, lowercased roots without trailing separators
    roots: Vec<String>,
}

impl UserScope {
    pub fn new(roots: &[PathBuf]) -> Self {
        let roots = roots
            .iter()
            .map(|root| normalize_path(&root.to_string_lossy()))
            .filter(|root| !root.is_empty())
            .map(|root| root.trim_end_matches(['/', '\\']).to_lowercase())
            .collect();
        Self { roots }
    }

    /// Case-insensitive string-prefix test on a normalized file path.
    ///
    /// The prefix is textual: a root `/src/inc` also claims `/src/include`.
    pub fn contains(&self, file: &str) -> bool {
        if file.is_empty() {
            return false;
        }
        let file = file.to_lowercase();
        self.roots.iter().any(|root| file.starts_with(root.as_str()))
    }
}

/// `::`-joined name of `cursor` and its semantic parents up to the translation unit.
///
/// Unnamed scopes are skipped, anonymous records get a name derived from their location, and
/// class template specializations use their display name (`Box<int>`).
pub fn fully_qualified_name(snapshot: &AstSnapshot, cursor: CursorId) -> String {
    let mut parts = Vec::new();
    let mut current = Some(cursor);
    while let Some(id) = current {
        let data = snapshot.cursor(id);
        if data.kind == CursorKind::TranslationUnit {
            break;
        }
        if let Some(part) = name_component(data) {
            parts.push(part);
        }
        current = data.semantic_parent;
    }
    parts.reverse();
    parts.join("::")
}

fn name_component(data: &CursorData) -> Option<String> {
    if data.kind.is_record() && (data.is_anonymous || data.spelling.is_empty()) {
        return Some(format!(
            "(anonymous {} at {}:{}:{})",
            data.kind.keyword(),
            normalize_path(&data.location.file),
            data.location.line,
            data.location.column
        ));
    }
    if data.spelling.is_empty() || (data.kind == CursorKind::Namespace && data.is_anonymous) {
        return None;
    }
    if !data.template_arguments.is_empty() && !data.display_name.is_empty() {
        return Some(data.display_name.clone());
    }
    Some(data.spelling.clone())
}
