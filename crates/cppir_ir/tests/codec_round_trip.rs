//! Round-trip tests for the JSON artifact.

use std::collections::BTreeSet;

use cppir_ir::codec;
use cppir_ir::node::Enumerator;
use cppir_ir::{
    Access, Annotation, BuiltinKind, DataType, DiagnosticSeverity, Field, Function, Graph, Location, Message,
    Modifier, Node, NodeId, NodeKind, Parameter, QualifiedType, Qualifier, Record, RecordBase, TemplateArgument,
    Variable,
};

fn node(index: usize, name: &str, kind: NodeKind) -> Node {
    Node {
        index: NodeId::new(index),
        name: name.to_string(),
        location: Location::new("/src/include/shapes.h", index as u32 + 1, 5),
        kind,
    }
}

/// A graph touching every node kind and every optional encoding.
fn sample_graph() -> Graph {
    let nodes = vec![
        node(
            0,
            "Diagnostic",
            NodeKind::Message(Message {
                message: "shapes.h:3:1: warning: unused".to_string(),
                category: "Semantic Issue".to_string(),
                severity: DiagnosticSeverity::Warning,
            }),
        ),
        node(
            1,
            "int",
            NodeKind::DataType(DataType::Builtin {
                kind: BuiltinKind::Int32,
            }),
        ),
        node(
            2,
            "int",
            NodeKind::QualifiedType(QualifiedType {
                data_type: NodeId::new(1),
                qualifiers: vec![],
                annotations: vec![],
            }),
        ),
        node(
            3,
            "shapes::Shape",
            NodeKind::Record(Record {
                fields: vec![Field {
                    name: "sides".to_string(),
                    qualified_type: NodeId::new(2),
                    offset: 8,
                    access: Access::Private,
                }],
                functions: vec![NodeId::new(7)],
                bases: vec![RecordBase {
                    base_record: None,
                    is_virtual: true,
                    access: Access::Protected,
                }],
                is_anonymous: false,
                annotations: vec![Annotation::new("serializable").with_attribute("json")],
                comments: vec!["A polygon.".to_string()],
            }),
        ),
        node(
            4,
            "shapes::Color",
            NodeKind::DataType(DataType::Enum {
                underlying_type: NodeId::new(1),
                enumerators: vec![
                    Enumerator {
                        name: "Red".to_string(),
                        value: 0,
                    },
                    Enumerator {
                        name: "Far".to_string(),
                        value: i64::MIN,
                    },
                ],
            }),
        ),
        node(
            5,
            "std::array<int, 3>",
            NodeKind::DataType(DataType::Record {
                record_type: None,
                template_args: vec![
                    TemplateArgument::Type(NodeId::new(1)),
                    TemplateArgument::Integral(3),
                    TemplateArgument::Unknown,
                ],
            }),
        ),
        node(
            6,
            "int (int, ...)",
            NodeKind::DataType(DataType::Function {
                return_type: NodeId::new(1),
                argument_types: vec![NodeId::new(1)],
                is_variadic: true,
            }),
        ),
        node(
            7,
            "shapes::Shape::Area",
            NodeKind::Function(Function {
                return_qualified_type: NodeId::new(2),
                access: Access::Public,
                parameters: vec![Parameter {
                    name: "scale".to_string(),
                    qualified_type: NodeId::new(8),
                }],
                modifiers: BTreeSet::from([Modifier::Const, Modifier::PureVirtual]),
                annotations: vec![],
                comments: vec![],
            }),
        ),
        node(
            8,
            "const int &",
            NodeKind::QualifiedType(QualifiedType {
                data_type: NodeId::new(1),
                qualifiers: vec![Qualifier::Reference, Qualifier::Const],
                annotations: vec![Annotation::new("in")],
            }),
        ),
        node(
            9,
            "shapes::kMaxSides",
            NodeKind::Variable(Variable {
                value: "64".to_string(),
                qualified_type: NodeId::new(2),
                access: Access::Public,
                comments: vec![],
            }),
        ),
    ];
    Graph::from_nodes(nodes).expect("sample indices are sequential")
}

#[test]
fn round_trip_through_string_is_identical() {
    let graph = sample_graph();
    let json = codec::to_string(&graph).unwrap();
    let decoded = codec::from_str(&json).unwrap();
    assert_eq!(decoded, graph);
}

#[test]
fn round_trip_through_file_is_identical() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("result.json");

    let graph = sample_graph();
    codec::write_file(&path, &graph).unwrap();
    let decoded = codec::read_file(&path).unwrap();

    assert_eq!(decoded.len(), graph.len());
    for (a, b) in decoded.iter().zip(graph.iter()) {
        assert_eq!(a, b, "node {} differs after round trip", b.index);
    }
}

#[test]
fn external_references_are_encoded_as_minus_one() {
    let json = codec::to_string(&sample_graph()).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value[3]["bases"][0]["baseRecord"], -1);
    assert_eq!(value[5]["recordType"], -1);
    assert_eq!(value[5]["templateArgs"][2]["value"], -1);
}

#[test]
fn reading_a_missing_file_reports_the_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.json");
    let err = codec::read_file(&path).unwrap_err();
    assert!(err.to_string().contains("missing.json"));
}
