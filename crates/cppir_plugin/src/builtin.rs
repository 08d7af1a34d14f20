//! Fallback generator for builtin scalar types.

use cppir_ir::{Annotation, BuiltinKind, DataType, Node, NodeKind, Qualifier, QualifiedType};

use crate::accessor::GraphAccessor;
use crate::errors::DispatchError;
use crate::generator::TypeGenerator;
use crate::holder::{LanguageType, TypeHolder};
use crate::language::languages;

/// Maps builtin data types (and qualified uses of them) to native names in every known language.
///
/// Registered at priority 0 so any user generator with a positive priority replaces it.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinTypeGenerator;

impl BuiltinTypeGenerator {
    pub const PRIORITY: i32 = 0;
}

fn builtin_of<'a>(accessor: &'a dyn GraphAccessor, node: &'a Node) -> Option<(BuiltinKind, Option<&'a QualifiedType>)> {
    match &node.kind {
        NodeKind::DataType(DataType::Builtin { kind }) => Some((*kind, None)),
        NodeKind::QualifiedType(qualified) => match accessor.node(qualified.data_type)?.as_data_type()? {
            DataType::Builtin { kind } => Some((*kind, Some(qualified))),
            _ => None,
        },
        _ => None,
    }
}

fn native_name(kind: BuiltinKind, language: &str) -> Option<&'static str> {
    use BuiltinKind::*;
    let name = match language {
        languages::CPP => match kind {
            Void => "void",
            Nullptr => "std::nullptr_t",
            Bool => "bool",
            Int8 => "std::int8_t",
            UInt8 => "std::uint8_t",
            Int16 => "std::int16_t",
            UInt16 => "std::uint16_t",
            Int32 => "std::int32_t",
            UInt32 => "std::uint32_t",
            Int64 => "std::int64_t",
            UInt64 => "std::uint64_t",
            Int128 => "__int128",
            UInt128 => "unsigned __int128",
            Float => "float",
            Float16 => "_Float16",
            BFloat16 => "__bf16",
            Double => "double",
            LongDouble => "long double",
            Float128 => "__float128",
            Unsupported => return None,
        },
        languages::CSHARP => match kind {
            Void => "void",
            Nullptr => "object",
            Bool => "bool",
            Int8 => "sbyte",
            UInt8 => "byte",
            Int16 => "short",
            UInt16 => "ushort",
            Int32 => "int",
            UInt32 => "uint",
            Int64 => "long",
            UInt64 => "ulong",
            Int128 => "System.Int128",
            UInt128 => "System.UInt128",
            Float => "float",
            Float16 => "System.Half",
            Double | LongDouble => "double",
            BFloat16 | Float128 | Unsupported => return None,
        },
        languages::PYTHON => match kind {
            Void | Nullptr => "None",
            Bool => "bool",
            Int8 | UInt8 | Int16 | UInt16 | Int32 | UInt32 | Int64 | UInt64 | Int128 | UInt128 => "int",
            Float | Float16 | BFloat16 | Double | LongDouble | Float128 => "float",
            Unsupported => return None,
        },
        languages::PROTO => match kind {
            Void => "google.protobuf.Empty",
            Bool => "bool",
            Int8 | Int16 | Int32 => "int32",
            UInt8 | UInt16 | UInt32 => "uint32",
            Int64 => "int64",
            UInt64 => "uint64",
            Int128 | UInt128 => "bytes",
            Float | Float16 | BFloat16 => "float",
            Double | LongDouble | Float128 => "double",
            Nullptr | Unsupported => return None,
        },
        _ => return None,
    };
    Some(name)
}

/// Spell a qualified C++ use of `base`, const binding to the pointee.
fn cpp_qualified(base: &str, qualifiers: &[Qualifier]) -> String {
    let mut name = base.to_string();
    if qualifiers.contains(&Qualifier::Const) {
        name = format!("const {name}");
    }
    if qualifiers.contains(&Qualifier::Pointer) {
        name.push('*');
    }
    if qualifiers.contains(&Qualifier::Reference) {
        name.push('&');
    }
    name
}

impl TypeGenerator for BuiltinTypeGenerator {
    fn name(&self) -> &str {
        "builtin"
    }

    fn priority(&self, accessor: &dyn GraphAccessor, node: &Node, _annotations: &[Annotation]) -> Option<i32> {
        builtin_of(accessor, node).map(|_| Self::PRIORITY)
    }

    fn generate_type(
        &self,
        accessor: &dyn GraphAccessor,
        node: &Node,
        _annotations: &[Annotation],
    ) -> Result<TypeHolder, DispatchError> {
        let Some((kind, qualified)) = builtin_of(accessor, node) else {
            return Err(DispatchError::Unsupported {
                node: node.index,
                kind: node.kind_name(),
                reason: "not a builtin type".to_string(),
            });
        };
        if kind == BuiltinKind::Unsupported {
            return Err(DispatchError::Unsupported {
                node: node.index,
                kind: node.kind_name(),
                reason: format!("'{}' has no portable representation", node.name),
            });
        }

        let mut holder = TypeHolder::new();
        for language in languages::ALL {
            let Some(base) = native_name(kind, language) else {
                continue;
            };
            let name = match (language, qualified) {
                (languages::CPP, Some(q)) => cpp_qualified(base, &q.qualifiers),
                _ => base.to_string(),
            };
            holder.set_language(language, LanguageType::native(name));
        }
        Ok(holder)
    }
}
