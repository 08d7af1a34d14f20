//! Single-writer graph construction with per-kind deduplication.
//!
//! The builder owns the node list and every identity map used for interning:
//!
//! | Kind             | Identity key                                         |
//! |------------------|------------------------------------------------------|
//! | Record           | fully-qualified name                                 |
//! | free Function    | fully-qualified name                                 |
//! | DataType         | canonical spelling                                   |
//! | QualifiedType    | spelling + data type + qualifiers + annotations      |
//!
//! Records and data types are inserted in two steps (`reserve_*` then `complete_*`) so that their index
//! exists before their children are lowered. A child that refers back to its parent finds the reserved
//! index instead of recursing.

use std::collections::HashMap;

use crate::graph::Graph;
use crate::node::{DataType, Function, Location, Message, Node, NodeId, NodeKind, QualifiedType, Record};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct QualifiedTypeKey {
    spelling: String,
    qualified: QualifiedType,
}

#[derive(Debug, Default)]
pub struct GraphBuilder {
    nodes: Vec<Node>,
    records: HashMap<String, NodeId>,
    free_functions: HashMap<String, NodeId>,
    data_types: HashMap<String, NodeId>,
    qualified_types: HashMap<QualifiedTypeKey, NodeId>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
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

    fn push(&mut self, name: String, location: Location, kind: NodeKind) -> NodeId {
        let index = NodeId::new(self.nodes.len());
        self.nodes.push(Node {
            index,
            name,
            location,
            kind,
        });
        index
    }

    fn replace_kind(&mut self, id: NodeId, kind: NodeKind) {
        match self.nodes.get_mut(id.index()) {
            Some(node) => node.kind = kind,
            None => debug_assert!(false, "completing unknown node {id}"),
        }
    }

    pub fn push_message(&mut self, name: impl Into<String>, location: Location, message: Message) -> NodeId {
        self.push(name.into(), location, NodeKind::Message(message))
    }

    pub fn find_record(&self, name: &str) -> Option<NodeId> {
        self.records.get(name).copied()
    }

    /// Insert an empty record and register its name.
    pub fn reserve_record(&mut self, name: impl Into<String>, location: Location) -> NodeId {
        let name = name.into();
        let id = self.push(name.clone(), location, NodeKind::Record(Record::default()));
        self.records.insert(name, id);
        id
    }

    /// Fill in a record reserved with [`reserve_record`](Self::reserve_record).
    pub fn complete_record(&mut self, id: NodeId, record: Record) {
        self.replace_kind(id, NodeKind::Record(record));
    }

    pub fn find_free_function(&self, name: &str) -> Option<NodeId> {
        self.free_functions.get(name).copied()
    }

    /// Append a free function and register its name for duplicate collapsing.
    pub fn push_free_function(&mut self, name: impl Into<String>, location: Location, function: Function) -> NodeId {
        let name = name.into();
        let id = self.push(name.clone(), location, NodeKind::Function(function));
        self.free_functions.entry(name).or_insert(id);
        id
    }

    /// Append a method. Methods are owned by their record and are not interned by name.
    pub fn push_method(&mut self, name: impl Into<String>, location: Location, function: Function) -> NodeId {
        self.push(name.into(), location, NodeKind::Function(function))
    }

    pub fn find_data_type(&self, name: &str) -> Option<NodeId> {
        self.data_types.get(name).copied()
    }

    /// Insert an `Unknown` placeholder under the canonical name.
    pub fn reserve_data_type(&mut self, name: impl Into<String>, location: Location) -> NodeId {
        let name = name.into();
        let id = self.push(name.clone(), location, NodeKind::DataType(DataType::Unknown));
        self.data_types.insert(name, id);
        id
    }

    pub fn complete_data_type(&mut self, id: NodeId, data_type: DataType) {
        self.replace_kind(id, NodeKind::DataType(data_type));
    }

    /// Return the existing node for a structurally identical qualified type, or append a new one.
    pub fn intern_qualified_type(
        &mut self,
        spelling: impl Into<String>,
        location: Location,
        qualified: QualifiedType,
    ) -> NodeId {
        let key = QualifiedTypeKey {
            spelling: spelling.into(),
            qualified,
        };
        if let Some(id) = self.qualified_types.get(&key) {
            return *id;
        }
        let id = self.push(key.spelling.clone(), location, NodeKind::QualifiedType(key.qualified.clone()));
        self.qualified_types.insert(key, id);
        id
    }

    /// Freeze the node list.
    pub fn finish(self) -> Graph {
        Graph::from_builder(self.nodes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{Annotation, BuiltinKind, Qualifier};

    fn builtin(builder: &mut GraphBuilder, name: &str, kind: BuiltinKind) -> NodeId {
        if let Some(id) = builder.find_data_type(name) {
            return id;
        }
        let id = builder.reserve_data_type(name, Location::default());
        builder.complete_data_type(id, DataType::Builtin { kind });
        id
    }

    #[test]
    fn test_qualified_types_are_interned_structurally() {
        let mut builder = GraphBuilder::new();
        let int = builtin(&mut builder, "int", BuiltinKind::Int32);

        let a = builder.intern_qualified_type("int", Location::new("a.h", 1, 1), QualifiedType::new(int));
        let b = builder.intern_qualified_type("int", Location::new("b.h", 9, 3), QualifiedType::new(int));
        assert_eq!(a, b, "location must not take part in identity");

        let ptr = builder.intern_qualified_type(
            "int *",
            Location::default(),
            QualifiedType::new(int).with_qualifiers(vec![Qualifier::Pointer]),
        );
        assert_ne!(a, ptr);

        let mut annotated = QualifiedType::new(int);
        annotated.annotations.push(Annotation::new("out"));
        let c = builder.intern_qualified_type("int", Location::default(), annotated);
        assert_ne!(a, c);

        assert_eq!(builder.len(), 4);
    }

    #[test]
    fn test_reserved_record_is_visible_before_completion() {
        let mut builder = GraphBuilder::new();
        let id = builder.reserve_record("ns::Node", Location::default());
        assert_eq!(builder.find_record("ns::Node"), Some(id));

        let record = Record {
            is_anonymous: true,
            ..Record::default()
        };
        builder.complete_record(id, record);
        let graph = builder.finish();
        let (node, record) = graph.find_record("ns::Node").unwrap();
        assert_eq!(node.index, id);
        assert!(record.is_anonymous);
    }

    #[test]
    fn test_free_function_keeps_first_registration() {
        let mut builder = GraphBuilder::new();
        let int = builtin(&mut builder, "int", BuiltinKind::Int32);
        let ret = builder.intern_qualified_type("int", Location::default(), QualifiedType::new(int));
        let function = Function {
            return_qualified_type: ret,
            access: Default::default(),
            parameters: Vec::new(),
            modifiers: Default::default(),
            annotations: Vec::new(),
            comments: Vec::new(),
        };
        let first = builder.push_free_function("f", Location::default(), function.clone());
        builder.push_free_function("f", Location::default(), function);
        assert_eq!(builder.find_free_function("f"), Some(first));
    }
}
