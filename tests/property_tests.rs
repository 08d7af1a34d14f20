//! Property-based tests for the lowering engine
//!
//! These tests use proptest to verify invariants across many randomly
//! generated declarations, catching edge cases that hand-written tests might miss.

use std::collections::HashSet;

use cppir::frontend::ast::{AstSnapshot, SourceLocation, TypeId, TypeKind};
use cppir::frontend::unit::ParsedUnit;
use cppir::{ExtractConfig, lower_parsed_unit};
use cppir_ir::{BuiltinKind, DataType, Graph, Qualifier};
use proptest::prelude::*;

const ROOT: &str = "/proj/include";

fn lower(snapshot: AstSnapshot) -> Graph {
    lower_parsed_unit(&ParsedUnit::new(snapshot), &ExtractConfig::new().with_root(ROOT))
}

fn at(line: u32) -> SourceLocation {
    SourceLocation::new("/proj/include/api.h", line, 1)
}

/// How a parameter type is spelled around an `int`.
#[derive(Debug, Clone, Copy)]
struct Shape {
    const_int: bool,
    indirection: Indirection,
    const_pointer: bool,
}

#[derive(Debug, Clone, Copy)]
enum Indirection {
    None,
    Pointer,
    LValueReference,
    RValueReference,
}

fn shape_strategy() -> impl Strategy<Value = Shape> {
    (
        any::<bool>(),
        prop_oneof![
            Just(Indirection::None),
            Just(Indirection::Pointer),
            Just(Indirection::LValueReference),
            Just(Indirection::RValueReference),
        ],
        any::<bool>(),
    )
        .prop_map(|(const_int, indirection, const_pointer)| Shape {
            const_int,
            indirection,
            const_pointer,
        })
}

fn build(snapshot: &mut AstSnapshot, int: TypeId, shape: Shape) -> TypeId {
    let base = if shape.const_int { snapshot.const_of(int) } else { int };
    match shape.indirection {
        Indirection::None => base,
        Indirection::Pointer => {
            let pointer = snapshot.pointer_to(base);
            if shape.const_pointer {
                snapshot.const_of(pointer)
            } else {
                pointer
            }
        }
        Indirection::LValueReference => snapshot.lvalue_reference_to(base),
        Indirection::RValueReference => snapshot.rvalue_reference_to(base),
    }
}

fn expected_qualifiers(shape: Shape) -> Vec<Qualifier> {
    let mut expected = Vec::new();
    let mut is_const = shape.const_int;
    match shape.indirection {
        Indirection::None => {}
        Indirection::Pointer => {
            expected.push(Qualifier::Pointer);
            is_const |= shape.const_pointer;
        }
        Indirection::LValueReference | Indirection::RValueReference => expected.push(Qualifier::Reference),
    }
    if is_const {
        expected.push(Qualifier::Const);
    }
    expected
}

// =============================================================================
// Qualifier Properties
// =============================================================================

proptest! {
    /// Property: qualifiers come out as [Pointer?, Reference?, Const?] over the bare builtin
    #[test]
    fn qualifiers_follow_peel_order(shape in shape_strategy()) {
        let mut snapshot = AstSnapshot::default();
        let root = snapshot.root();
        let int = snapshot.builtin(TypeKind::Int, "int");
        let void = snapshot.builtin(TypeKind::Void, "void");
        let param = build(&mut snapshot, int, shape);
        snapshot.add_function(root, "Take", void, &[("value", param)], at(1));

        let graph = lower(snapshot);
        let (_, function) = graph.find_function("Take").unwrap();
        let qt = function.parameters[0].qualified_type;
        let qualified = graph.get(qt).and_then(|n| n.as_qualified_type()).unwrap();

        prop_assert_eq!(&qualified.qualifiers, &expected_qualifiers(shape));
        let (_, data_type) = graph.resolve_data_type(qt).unwrap();
        prop_assert_eq!(data_type, &DataType::Builtin { kind: BuiltinKind::Int32 });
    }
}

// =============================================================================
// Deduplication Properties
// =============================================================================

proptest! {
    /// Property: no two DataTypes share a name and no two QualifiedTypes share a key
    #[test]
    fn interning_never_duplicates(shapes in prop::collection::vec(shape_strategy(), 1..12)) {
        let mut snapshot = AstSnapshot::default();
        let root = snapshot.root();
        let int = snapshot.builtin(TypeKind::Int, "int");
        let void = snapshot.builtin(TypeKind::Void, "void");
        for (i, shape) in shapes.iter().enumerate() {
            let param = build(&mut snapshot, int, *shape);
            snapshot.add_function(root, &format!("Take{i}"), void, &[("value", param)], at(i as u32 + 1));
        }

        let graph = lower(snapshot);
        let mut data_types = HashSet::new();
        for (node, _) in graph.data_types() {
            prop_assert!(data_types.insert(node.name.clone()), "duplicate data type {}", node.name);
        }
        prop_assert_eq!(data_types.len(), 2);

        let mut qualified_types = HashSet::new();
        for (node, qt) in graph.qualified_types() {
            prop_assert!(qualified_types.insert((node.name.clone(), qt.clone())), "duplicate qualified type {}", node.name);
        }
        prop_assert_eq!(graph.functions().count(), shapes.len());
    }

    /// Property: lowering the same declarations twice gives the same graph
    #[test]
    fn lowering_is_idempotent(shapes in prop::collection::vec(shape_strategy(), 0..8)) {
        let mut snapshot = AstSnapshot::default();
        let root = snapshot.root();
        let int = snapshot.builtin(TypeKind::Int, "int");
        for (i, shape) in shapes.iter().enumerate() {
            let result = build(&mut snapshot, int, *shape);
            snapshot.add_function(root, &format!("Make{i}"), result, &[], at(i as u32 + 1));
        }
        prop_assert_eq!(lower(snapshot.clone()), lower(snapshot));
    }
}
