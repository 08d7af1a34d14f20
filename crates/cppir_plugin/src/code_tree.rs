//! Namespace → class → function → overload view of a graph.
//!
//! Language generators usually emit code per namespace and per class, while the graph is a flat list
//! keyed by fully-qualified names. The tree regroups records and free functions by scope and groups
//! methods and functions sharing a name into overload sets.

use std::collections::HashSet;

use bitflags::bitflags;
use cppir_ir::{Access, Annotation, Function, Modifier, Node, NodeId, Qualifier, Record};
use tracing::trace;

use crate::accessor::GraphAccessor;
use crate::errors::DispatchError;
use crate::holder::TypeHolder;

bitflags! {
    /// How a parameter is passed, as far as generated bindings care.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ParameterQualifiers: u8 {
        const CONST = 1 << 0;
        const REFERENCE = 1 << 1;
        const OUTPUT = 1 << 2;
    }
}

impl ParameterQualifiers {
    pub fn from_qualifiers(qualifiers: &[Qualifier]) -> Self {
        let mut flags = Self::empty();
        for qualifier in qualifiers {
            match qualifier {
                Qualifier::Const => flags |= Self::CONST,
                Qualifier::Reference => flags |= Self::REFERENCE,
                Qualifier::Output => flags |= Self::OUTPUT,
                Qualifier::Pointer => {}
            }
        }
        flags
    }
}

#[derive(Debug, Default)]
pub struct NamespaceNode {
    pub name: String,
    pub namespaces: Vec<NamespaceNode>,
    pub classes: Vec<ClassNode>,
    pub functions: Vec<FunctionNode>,
}

#[derive(Debug)]
pub struct ClassNode {
    pub name: String,
    pub qualified_name: String,
    pub record: NodeId,
    pub methods: Vec<FunctionNode>,
    pub annotations: Vec<Annotation>,
    pub comments: Vec<String>,
}

/// All overloads sharing one name within a scope.
#[derive(Debug)]
pub struct FunctionNode {
    pub name: String,
    pub overloads: Vec<FunctionOverload>,
}

#[derive(Debug)]
pub struct FunctionOverload {
    pub function: NodeId,
    pub qualified_name: String,
    pub access: Access,
    pub is_const: bool,
    pub is_static: bool,
    pub is_virtual: bool,
    pub parameters: Vec<CodeParameter>,
    pub return_value: CodeParameter,
    pub annotations: Vec<Annotation>,
}

#[derive(Debug)]
pub struct CodeParameter {
    pub name: String,
    pub qualified_type: NodeId,
    pub qualifiers: ParameterQualifiers,
    /// `None` when no registered generator handles the type
    pub type_holder: Option<TypeHolder>,
}

/// Build the code tree for everything reachable through `accessor`.
pub fn build(accessor: &dyn GraphAccessor) -> Result<NamespaceNode, DispatchError> {
    let graph = accessor.graph();
    let mut root = NamespaceNode::default();
    let mut methods = HashSet::new();

    for (node, record) in graph.records() {
        methods.extend(record.functions.iter().copied());
        let (scope, _) = split_scope(&node.name);
        let class = ClassNode::build(accessor, node, record)?;
        root.namespace_mut(&scope).classes.push(class);
    }

    for (node, function) in graph.functions() {
        if methods.contains(&node.index) {
            continue;
        }
        let (scope, name) = split_scope(&node.name);
        let overload = FunctionOverload::build(accessor, node, function)?;
        root.namespace_mut(&scope).function_mut(name).overloads.push(overload);
    }

    Ok(root)
}

impl NamespaceNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Find or create the nested namespace at `path`.
    pub fn namespace_mut(&mut self, path: &[&str]) -> &mut NamespaceNode {
        let Some((first, rest)) = path.split_first() else {
            return self;
        };
        let index = match self.namespaces.iter().position(|ns| ns.name == *first) {
            Some(index) => index,
            None => {
                self.namespaces.push(NamespaceNode::new(*first));
                self.namespaces.len() - 1
            }
        };
        self.namespaces[index].namespace_mut(rest)
    }

    pub fn namespace(&self, name: &str) -> Option<&NamespaceNode> {
        self.namespaces.iter().find(|ns| ns.name == name)
    }

    pub fn class(&self, name: &str) -> Option<&ClassNode> {
        self.classes.iter().find(|c| c.name == name)
    }

    pub fn function(&self, name: &str) -> Option<&FunctionNode> {
        self.functions.iter().find(|f| f.name == name)
    }

    fn function_mut(&mut self, name: &str) -> &mut FunctionNode {
        function_entry(&mut self.functions, name)
    }
}

impl ClassNode {
    fn build(accessor: &dyn GraphAccessor, node: &Node, record: &Record) -> Result<Self, DispatchError> {
        let (_, name) = split_scope(&node.name);
        let mut methods = Vec::new();
        for &id in &record.functions {
            let method = accessor.node(id).ok_or(DispatchError::UnknownNode(id))?;
            let Some(function) = method.as_function() else {
                return Err(DispatchError::Unsupported {
                    node: id,
                    kind: method.kind_name(),
                    reason: format!("listed as a method of '{}'", node.name),
                });
            };
            let (_, method_name) = split_scope(&method.name);
            let overload = FunctionOverload::build(accessor, method, function)?;
            function_entry(&mut methods, method_name).overloads.push(overload);
        }
        Ok(Self {
            name: name.to_string(),
            qualified_name: node.name.clone(),
            record: node.index,
            methods,
            annotations: record.annotations.clone(),
            comments: record.comments.clone(),
        })
    }

    pub fn method(&self, name: &str) -> Option<&FunctionNode> {
        self.methods.iter().find(|m| m.name == name)
    }
}

impl FunctionOverload {
    fn build(accessor: &dyn GraphAccessor, node: &Node, function: &Function) -> Result<Self, DispatchError> {
        let parameters = function
            .parameters
            .iter()
            .map(|p| CodeParameter::build(accessor, &p.name, p.qualified_type))
            .collect::<Result<Vec<_>, _>>()?;
        let return_value = CodeParameter::build(accessor, "", function.return_qualified_type)?;
        Ok(Self {
            function: node.index,
            qualified_name: node.name.clone(),
            access: function.access,
            is_const: function.has_modifier(Modifier::Const),
            is_static: function.has_modifier(Modifier::Static),
            is_virtual: function.has_modifier(Modifier::Virtual) || function.has_modifier(Modifier::PureVirtual),
            parameters,
            return_value,
            annotations: function.annotations.clone(),
        })
    }
}

impl CodeParameter {
    fn build(accessor: &dyn GraphAccessor, name: &str, id: NodeId) -> Result<Self, DispatchError> {
        let node = accessor.node(id).ok_or(DispatchError::UnknownNode(id))?;
        let Some(qualified) = node.as_qualified_type() else {
            return Err(DispatchError::Unsupported {
                node: id,
                kind: node.kind_name(),
                reason: "parameters must refer to a QualifiedType".to_string(),
            });
        };
        let type_holder = match accessor.generate_type(node, &qualified.annotations) {
            Ok(holder) => Some(holder),
            Err(DispatchError::NoTypeGenerator { .. }) => {
                trace!(node = %id, "no type generator for parameter type");
                None
            }
            Err(err) => return Err(err),
        };
        Ok(Self {
            name: name.to_string(),
            qualified_type: id,
            qualifiers: ParameterQualifiers::from_qualifiers(&qualified.qualifiers),
            type_holder,
        })
    }
}

fn function_entry<'a>(functions: &'a mut Vec<FunctionNode>, name: &str) -> &'a mut FunctionNode {
    let index = match functions.iter().position(|f| f.name == name) {
        Some(index) => index,
        None => {
            functions.push(FunctionNode {
                name: name.to_string(),
                overloads: Vec::new(),
            });
            functions.len() - 1
        }
    };
    &mut functions[index]
}

/// Split a fully-qualified name into its scope components and final name.
///
/// `::` inside template arguments or parentheses does not split.
pub fn split_scope(name: &str) -> (Vec<&str>, &str) {
    let bytes = name.as_bytes();
    let mut scope = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'<' | b'(' => depth += 1,
            b'>' | b')' => depth = depth.saturating_sub(1),
            b':' if depth == 0 && bytes.get(i + 1) == Some(&b':') => {
                scope.push(&name[start..i]);
                i += 2;
                start = i;
                continue;
            }
            _ => {}
        }
        i += 1;
    }
    (scope, &name[start..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_scope_ignores_template_arguments() {
        assert_eq!(split_scope("ns::Box<std::string>::get"), (vec!["ns", "Box<std::string>"], "get"));
        assert_eq!(split_scope("free"), (vec![], "free"));
    }

    #[test]
    fn test_parameter_qualifiers_skip_pointer() {
        let flags = ParameterQualifiers::from_qualifiers(&[Qualifier::Pointer, Qualifier::Const]);
        assert_eq!(flags, ParameterQualifiers::CONST);
    }
}
