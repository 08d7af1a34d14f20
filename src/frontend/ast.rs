//! Owned snapshot of a parsed translation unit.
//!
//! The C++ parser hands back cursors and types whose lifetime is tied to the parser instance. The
//! lowering pass never sees those; it walks this arena instead. Cursors and types are addressed by
//! small index newtypes, children are stored in source order, and every cross reference (semantic
//! parent, definition, pointee, canonical type) is just another index into the same snapshot.
//!
//! Snapshots are produced by a parser adapter, or assembled directly with the helpers in
//! [`build`](super::build) when testing the lowering pass.

use std::fmt;

/// Index of a cursor in an [`AstSnapshot`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CursorId(u32);

/// Index of a type in an [`AstSnapshot`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(u32);

impl CursorId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

impl TypeId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// Declaration kinds the walker distinguishes. Everything else collapses into `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CursorKind {
    TranslationUnit,
    Namespace,
    ClassDecl,
    StructDecl,
    UnionDecl,
    EnumDecl,
    EnumConstantDecl,
    FieldDecl,
    Method,
    Constructor,
    Destructor,
    FunctionDecl,
    ParmDecl,
    BaseSpecifier,
    TypedefDecl,
    TypeAliasDecl,
    UsingDeclaration,
    AnnotateAttr,
    Other,
}

impl CursorKind {
    pub fn is_record(self) -> bool {
        matches!(self, CursorKind::ClassDecl | CursorKind::StructDecl | CursorKind::UnionDecl)
    }

    /// Keyword used when synthesizing a name for an anonymous declaration.
    pub fn keyword(self) -> &'static str {
        match self {
            CursorKind::ClassDecl => "class",
            CursorKind::StructDecl => "struct",
            CursorKind::UnionDecl => "union",
            CursorKind::EnumDecl => "enum",
            CursorKind::Namespace => "namespace",
            _ => "declaration",
        }
    }
}

/// Type kinds as reported by the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Void,
    Bool,
    CharU,
    UChar,
    Char16,
    Char32,
    UShort,
    UInt,
    ULong,
    ULongLong,
    UInt128,
    CharS,
    SChar,
    WChar,
    Short,
    Int,
    Long,
    LongLong,
    Int128,
    Half,
    Float16,
    BFloat16,
    Float,
    Double,
    LongDouble,
    Float128,
    Nullptr,
    /// A builtin the IR has no name for (`__ibm128`, `char8_t`, vector types, ...)
    OtherBuiltin,
    Pointer,
    LValueReference,
    RValueReference,
    Record,
    Enum,
    FunctionProto,
    FunctionNoProto,
    Typedef,
    Elaborated,
    Other,
}

impl TypeKind {
    pub fn is_builtin(self) -> bool {
        use TypeKind::*;
        matches!(
            self,
            Void | Bool
                | CharU
                | UChar
                | Char16
                | Char32
                | UShort
                | UInt
                | ULong
                | ULongLong
                | UInt128
                | CharS
                | SChar
                | WChar
                | Short
                | Int
                | Long
                | LongLong
                | Int128
                | Half
                | Float16
                | BFloat16
                | Float
                | Double
                | LongDouble
                | Float128
                | Nullptr
                | OtherBuiltin
        )
    }

    pub fn is_reference(self) -> bool {
        matches!(self, TypeKind::LValueReference | TypeKind::RValueReference)
    }
}

/// Member access as written in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessSpecifier {
    Public,
    Protected,
    Private,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct SourceLocation {
    /// File path as reported by the parser; empty for builtin locations
    pub file: String,
    pub line: u32,
    pub column: u32,
}

impl SourceLocation {
    pub fn new(file: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            file: file.into(),
            line,
            column,
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

/// Template argument of a class template specialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateArgumentData {
    Type(TypeId),
    Integral(i64),
    Pack,
    Other,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CursorData {
    pub kind: CursorKind,
    /// Bare name (`Foo`, `method`), or the annotation text for `AnnotateAttr`
    pub spelling: String,
    /// Name including template arguments (`Box<int>`)
    pub display_name: String,
    pub location: SourceLocation,
    pub semantic_parent: Option<CursorId>,
    pub children: Vec<CursorId>,
    /// Declared type: record type, field type, parameter type, typedef type, ...
    pub ty: Option<TypeId>,
    /// Return type of functions and methods
    pub result_type: Option<TypeId>,
    pub access: Option<AccessSpecifier>,
    pub is_anonymous: bool,
    pub is_virtual_base: bool,
    /// Declaration referenced by a base specifier or using-declaration
    pub referenced: Option<CursorId>,
    /// Definition of a forward declaration
    pub definition: Option<CursorId>,
    pub field_offset_bits: Option<u64>,
    pub enum_value: Option<i64>,
    pub enum_integer_type: Option<TypeId>,
    pub template_arguments: Vec<TemplateArgumentData>,
    /// Source tokens of the declaration joined by single spaces
    pub declaration_text: String,
    /// Raw documentation comment attached to the declaration
    pub comment: Option<String>,
}

impl CursorData {
    pub fn new(kind: CursorKind, spelling: impl Into<String>, location: SourceLocation) -> Self {
        let spelling = spelling.into();
        Self {
            kind,
            display_name: spelling.clone(),
            spelling,
            location,
            semantic_parent: None,
            children: Vec::new(),
            ty: None,
            result_type: None,
            access: None,
            is_anonymous: false,
            is_virtual_base: false,
            referenced: None,
            definition: None,
            field_offset_bits: None,
            enum_value: None,
            enum_integer_type: None,
            template_arguments: Vec::new(),
            declaration_text: String::new(),
            comment: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeData {
    pub kind: TypeKind,
    /// Spelling including qualifiers (`const int &`)
    pub spelling: String,
    pub is_const: bool,
    /// `None` when the type is its own canonical form
    pub canonical: Option<TypeId>,
    /// Target of pointer and reference types
    pub pointee: Option<TypeId>,
    /// Same type with top-level const removed, for const types
    pub unqualified: Option<TypeId>,
    pub declaration: Option<CursorId>,
    pub result: Option<TypeId>,
    pub arguments: Vec<TypeId>,
    pub is_variadic: bool,
}

impl TypeData {
    pub fn new(kind: TypeKind, spelling: impl Into<String>) -> Self {
        Self {
            kind,
            spelling: spelling.into(),
            is_const: false,
            canonical: None,
            pointee: None,
            unqualified: None,
            declaration: None,
            result: None,
            arguments: Vec::new(),
            is_variadic: false,
        }
    }
}

/// Arena of cursors and types rooted at a translation unit cursor.
#[derive(Debug, Clone, PartialEq)]
pub struct AstSnapshot {
    cursors: Vec<CursorData>,
    types: Vec<TypeData>,
}

impl Default for AstSnapshot {
    fn default() -> Self {
        Self::new("")
    }
}

impl AstSnapshot {
    /// Create a snapshot holding only the translation unit cursor.
    pub fn new(unit_path: impl Into<String>) -> Self {
        let root = CursorData::new(CursorKind::TranslationUnit, unit_path, SourceLocation::default());
        Self {
            cursors: vec![root],
            types: Vec::new(),
        }
    }

    pub fn root(&self) -> CursorId {
        CursorId(0)
    }

    pub fn cursor(&self, id: CursorId) -> &CursorData {
        &self.cursors[id.index()]
    }

    pub fn cursor_mut(&mut self, id: CursorId) -> &mut CursorData {
        &mut self.cursors[id.index()]
    }

    pub fn ty(&self, id: TypeId) -> &TypeData {
        &self.types[id.index()]
    }

    pub fn ty_mut(&mut self, id: TypeId) -> &mut TypeData {
        &mut self.types[id.index()]
    }

    pub fn cursor_count(&self) -> usize {
        self.cursors.len()
    }

    pub fn type_count(&self) -> usize {
        self.types.len()
    }

    /// Append a cursor under `parent`, making `parent` its semantic parent unless one is already set.
    pub fn add_cursor(&mut self, parent: CursorId, mut data: CursorData) -> CursorId {
        let id = CursorId(self.cursors.len() as u32);
        data.semantic_parent.get_or_insert(parent);
        self.cursors.push(data);
        self.cursors[parent.index()].children.push(id);
        id
    }

    /// Append a cursor that is not a child of any other cursor.
    pub fn add_detached_cursor(&mut self, data: CursorData) -> CursorId {
        let id = CursorId(self.cursors.len() as u32);
        self.cursors.push(data);
        id
    }

    pub fn add_type(&mut self, data: TypeData) -> TypeId {
        let id = TypeId(self.types.len() as u32);
        self.types.push(data);
        id
    }

    pub fn children(&self, id: CursorId) -> impl Iterator<Item = (CursorId, &CursorData)> {
        self.cursor(id).children.iter().map(|&child| (child, self.cursor(child)))
    }

    /// Canonical form of `id`, following typedefs and elaborations.
    pub fn canonical(&self, id: TypeId) -> TypeId {
        self.ty(id).canonical.unwrap_or(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_cursor_links_parent_and_child() {
        let mut snapshot = AstSnapshot::new("unit.cpp");
        let root = snapshot.root();
        let ns = snapshot.add_cursor(root, CursorData::new(CursorKind::Namespace, "geo", SourceLocation::default()));
        assert_eq!(snapshot.cursor(ns).semantic_parent, Some(root));
        assert_eq!(snapshot.children(root).map(|(id, _)| id).collect::<Vec<_>>(), vec![ns]);
    }

    #[test]
    fn test_canonical_defaults_to_self() {
        let mut snapshot = AstSnapshot::default();
        let int = snapshot.add_type(TypeData::new(TypeKind::Int, "int"));
        let mut alias = TypeData::new(TypeKind::Typedef, "count_t");
        alias.canonical = Some(int);
        let alias = snapshot.add_type(alias);
        assert_eq!(snapshot.canonical(int), int);
        assert_eq!(snapshot.canonical(alias), int);
    }
}
