//! Type lowering: canonicalize, peel qualifiers, lower the unqualified remainder.

use cppir_ir::{BuiltinKind, DataType, Enumerator, Location, NodeId, QualifiedType, Qualifier, TemplateArgument};
use tracing::{trace, warn};

use super::CppLowering;
use crate::frontend::ast::{AstSnapshot, CursorId, CursorKind, TemplateArgumentData, TypeId, TypeKind};

/// DataType name used when the parser reported no type at all.
const MISSING_TYPE_NAME: &str = "<unknown>";

/// Map a parser builtin kind onto the IR's fixed builtin enumeration.
///
/// Character types map to the integer of the same width and signedness. Anything without a portable
/// counterpart becomes `Unsupported`.
pub fn builtin_kind(kind: TypeKind) -> BuiltinKind {
    match kind {
        TypeKind::Void => BuiltinKind::Void,
        TypeKind::Bool => BuiltinKind::Bool,
        TypeKind::CharU | TypeKind::UChar => BuiltinKind::UInt8,
        TypeKind::CharS | TypeKind::SChar => BuiltinKind::Int8,
        TypeKind::UShort => BuiltinKind::UInt16,
        TypeKind::Short | TypeKind::Char16 | TypeKind::WChar => BuiltinKind::Int16,
        TypeKind::UInt => BuiltinKind::UInt32,
        TypeKind::Int | TypeKind::Char32 => BuiltinKind::Int32,
        TypeKind::ULong | TypeKind::ULongLong => BuiltinKind::UInt64,
        TypeKind::Long | TypeKind::LongLong => BuiltinKind::Int64,
        TypeKind::UInt128 => BuiltinKind::UInt128,
        TypeKind::Int128 => BuiltinKind::Int128,
        TypeKind::Float16 => BuiltinKind::Float16,
        TypeKind::BFloat16 => BuiltinKind::BFloat16,
        TypeKind::Float => BuiltinKind::Float,
        TypeKind::Double => BuiltinKind::Double,
        TypeKind::LongDouble => BuiltinKind::LongDouble,
        TypeKind::Float128 => BuiltinKind::Float128,
        TypeKind::Nullptr => BuiltinKind::Nullptr,
        _ => BuiltinKind::Unsupported,
    }
}

/// Peel pointer, then reference, then const off a canonical type.
///
/// Const is recorded once whether it sat on the pointer or on the pointee; `int *const` and
/// `const int *` produce the same sequence.
pub(crate) fn peel_qualifiers(snapshot: &AstSnapshot, ty: TypeId) -> (Vec<Qualifier>, TypeId) {
    let mut qualifiers = Vec::new();
    let mut current = ty;
    let mut is_const = false;

    let data = snapshot.ty(current);
    if let (TypeKind::Pointer, Some(pointee)) = (data.kind, data.pointee) {
        qualifiers.push(Qualifier::Pointer);
        is_const |= data.is_const;
        current = pointee;
    }

    let data = snapshot.ty(current);
    if let (true, Some(referenced)) = (data.kind.is_reference(), data.pointee) {
        qualifiers.push(Qualifier::Reference);
        current = referenced;
    }

    let data = snapshot.ty(current);
    if data.is_const {
        is_const = true;
        if let Some(unqualified) = data.unqualified {
            current = unqualified;
        }
    }
    if is_const {
        qualifiers.push(Qualifier::Const);
    }
    (qualifiers, current)
}

impl CppLowering<'_> {
    /// Lower a type reference into a QualifiedType node.
    ///
    /// The node is keyed by the type's spelling as written plus its canonical structure, so
    /// `count_t` and `int` get separate QualifiedType nodes over the same DataType.
    pub(super) fn lower_type(&mut self, ty: TypeId, location: &Location) -> NodeId {
        let snapshot = self.snapshot;
        let spelling = snapshot.ty(ty).spelling.clone();
        let (qualifiers, inner) = peel_qualifiers(snapshot, snapshot.canonical(ty));
        let data_type = self.lower_unqualified_type(inner, location);
        self.graph.intern_qualified_type(
            spelling,
            location.clone(),
            QualifiedType::new(data_type).with_qualifiers(qualifiers),
        )
    }

    /// QualifiedType over an `Unknown` DataType, for declarations the parser gave no type.
    pub(super) fn lower_missing_type(&mut self, location: &Location) -> NodeId {
        let data_type = match self.graph.find_data_type(MISSING_TYPE_NAME) {
            Some(id) => id,
            None => self.graph.reserve_data_type(MISSING_TYPE_NAME, Location::default()),
        };
        self.graph
            .intern_qualified_type(MISSING_TYPE_NAME, location.clone(), QualifiedType::new(data_type))
    }

    /// Lower an unqualified, canonical type into a DataType node, deduplicated by spelling.
    ///
    /// The node is reserved before recursing, so a record or function type that reaches itself again
    /// through its children finds the reserved index.
    pub(super) fn lower_unqualified_type(&mut self, ty: TypeId, location: &Location) -> NodeId {
        let snapshot = self.snapshot;
        let data = snapshot.ty(ty);
        if let Some(existing) = self.graph.find_data_type(&data.spelling) {
            return existing;
        }

        let declaration_location = data
            .declaration
            .map(|decl| self.location_of(&snapshot.cursor(decl).location))
            .unwrap_or_default();
        let id = self.graph.reserve_data_type(data.spelling.as_str(), declaration_location);

        let data_type = match data.kind {
            kind if kind.is_builtin() => DataType::Builtin {
                kind: builtin_kind(kind),
            },
            TypeKind::Record => self.lower_record_type(ty, location),
            TypeKind::Enum => self.lower_enum_type(ty, location),
            TypeKind::FunctionProto | TypeKind::FunctionNoProto => self.lower_function_type(ty, location),
            _ => {
                trace!(spelling = %data.spelling, kind = ?data.kind, "lowering as unknown type");
                DataType::Unknown
            }
        };
        self.graph.complete_data_type(id, data_type);
        id
    }

    fn lower_record_type(&mut self, ty: TypeId, location: &Location) -> DataType {
        let snapshot = self.snapshot;
        let Some(declaration) = snapshot.ty(ty).declaration else {
            return DataType::Record {
                record_type: None,
                template_args: Vec::new(),
            };
        };
        let template_args = self.lower_template_arguments(declaration, location);
        DataType::Record {
            record_type: self.lower_record_declaration(declaration),
            template_args,
        }
    }

    fn lower_template_arguments(&mut self, declaration: CursorId, location: &Location) -> Vec<TemplateArgument> {
        let snapshot = self.snapshot;
        let cursor = snapshot.cursor(declaration);
        let arguments = match cursor.definition {
            Some(definition) if cursor.template_arguments.is_empty() => {
                &snapshot.cursor(definition).template_arguments
            }
            _ => &cursor.template_arguments,
        };

        arguments
            .iter()
            .map(|argument| match *argument {
                TemplateArgumentData::Type(ty) => {
                    TemplateArgument::Type(self.lower_unqualified_type(snapshot.canonical(ty), location))
                }
                TemplateArgumentData::Integral(value) => TemplateArgument::Integral(value),
                TemplateArgumentData::Pack => {
                    warn!(
                        record = %snapshot.cursor(declaration).display_name,
                        "template argument packs are not supported"
                    );
                    TemplateArgument::Unknown
                }
                TemplateArgumentData::Other => TemplateArgument::Unknown,
            })
            .collect()
    }

    fn lower_enum_type(&mut self, ty: TypeId, location: &Location) -> DataType {
        let snapshot = self.snapshot;
        let declaration = snapshot.ty(ty).declaration.map(|decl| snapshot.cursor(decl).definition.unwrap_or(decl));

        let underlying = declaration.and_then(|decl| snapshot.cursor(decl).enum_integer_type);
        let underlying_type = match underlying {
            Some(int) => self.lower_unqualified_type(snapshot.canonical(int), location),
            None => self.lower_missing_data_type(),
        };

        let enumerators: Vec<Enumerator> = declaration
            .map(|decl| {
                snapshot
                    .children(decl)
                    .filter(|(_, c)| c.kind == CursorKind::EnumConstantDecl)
                    .map(|(_, c)| Enumerator {
                        name: c.spelling.clone(),
                        value: c.enum_value.unwrap_or_default(),
                    })
                    .collect()
            })
            .unwrap_or_default();

        DataType::Enum {
            underlying_type,
            enumerators,
        }
    }

    fn lower_function_type(&mut self, ty: TypeId, location: &Location) -> DataType {
        let snapshot = self.snapshot;
        let data = snapshot.ty(ty);
        let return_type = match data.result {
            Some(result) => self.lower_unqualified_type(snapshot.canonical(result), location),
            None => self.lower_missing_data_type(),
        };
        let argument_types: Vec<NodeId> = data
            .arguments
            .iter()
            .map(|&arg| self.lower_unqualified_type(snapshot.canonical(arg), location))
            .collect();
        DataType::Function {
            return_type,
            argument_types,
            is_variadic: data.is_variadic,
        }
    }

    fn lower_missing_data_type(&mut self) -> NodeId {
        match self.graph.find_data_type(MISSING_TYPE_NAME) {
            Some(id) => id,
            None => self.graph.reserve_data_type(MISSING_TYPE_NAME, Location::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_kind_mapping() {
        assert_eq!(builtin_kind(TypeKind::Void), BuiltinKind::Void);
        assert_eq!(builtin_kind(TypeKind::CharS), BuiltinKind::Int8);
        assert_eq!(builtin_kind(TypeKind::UChar), BuiltinKind::UInt8);
        assert_eq!(builtin_kind(TypeKind::WChar), BuiltinKind::Int16);
        assert_eq!(builtin_kind(TypeKind::Char32), BuiltinKind::Int32);
        assert_eq!(builtin_kind(TypeKind::ULong), BuiltinKind::UInt64);
        assert_eq!(builtin_kind(TypeKind::LongLong), BuiltinKind::Int64);
        assert_eq!(builtin_kind(TypeKind::Float128), BuiltinKind::Float128);
        assert_eq!(builtin_kind(TypeKind::Nullptr), BuiltinKind::Nullptr);
        assert_eq!(builtin_kind(TypeKind::Half), BuiltinKind::Unsupported);
        assert_eq!(builtin_kind(TypeKind::OtherBuiltin), BuiltinKind::Unsupported);
    }

    #[test]
    fn test_peel_order_is_pointer_reference_const() {
        let mut snapshot = AstSnapshot::default();
        let int = snapshot.builtin(TypeKind::Int, "int");
        let const_int = snapshot.const_of(int);
        let ptr = snapshot.pointer_to(const_int);
        let const_ptr = snapshot.const_of(ptr);
        let reference = snapshot.lvalue_reference_to(const_int);

        assert_eq!(
            peel_qualifiers(&snapshot, ptr),
            (vec![Qualifier::Pointer, Qualifier::Const], int)
        );
        assert_eq!(
            peel_qualifiers(&snapshot, const_ptr).0,
            vec![Qualifier::Pointer, Qualifier::Const]
        );
        assert_eq!(
            peel_qualifiers(&snapshot, reference),
            (vec![Qualifier::Reference, Qualifier::Const], int)
        );
        assert_eq!(peel_qualifiers(&snapshot, int), (vec![], int));
    }

    #[test]
    fn test_only_one_level_of_indirection_is_peeled() {
        let mut snapshot = AstSnapshot::default();
        let int = snapshot.builtin(TypeKind::Int, "int");
        let ptr = snapshot.pointer_to(int);
        let ptr_ptr = snapshot.pointer_to(ptr);
        assert_eq!(peel_qualifiers(&snapshot, ptr_ptr), (vec![Qualifier::Pointer], ptr));
    }
}
