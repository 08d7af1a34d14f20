//! [`AstParser`] backed by libclang.
//!
//! libclang cursors and types borrow the translation unit, which borrows the index, which borrows the
//! process-wide `Clang` instance. Everything is converted into an [`AstSnapshot`] before `parse`
//! returns, so none of those lifetimes leak into lowering.
//!
//! Only one `Clang` instance may exist per process at a time; concurrent calls to
//! [`LibclangParser::parse`] fail with [`ParseError::Unavailable`].

use std::collections::{HashMap, HashSet};

use clang::diagnostic::{Diagnostic, Severity};
use clang::{Accessibility, Clang, Entity, EntityKind, Index, Type, Unsaved};
use tracing::{debug, instrument};

use super::ast::{
    AccessSpecifier, AstSnapshot, CursorData, CursorId, CursorKind, SourceLocation, TemplateArgumentData, TypeData,
    TypeId, TypeKind,
};
use super::unit::{AstParser, DiagnosticLevel, ParseError, ParsedUnit, ParserDiagnostic, UnitSource};

#[derive(Debug, Clone, Copy)]
pub struct LibclangParser {
    skip_function_bodies: bool,
}

impl Default for LibclangParser {
    fn default() -> Self {
        Self {
            skip_function_bodies: true,
        }
    }
}

impl LibclangParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_function_bodies(mut self, parse_bodies: bool) -> Self {
        self.skip_function_bodies = !parse_bodies;
        self
    }
}

impl AstParser for LibclangParser {
    #[instrument(skip_all, fields(unit = %unit.path.display(), args = unit.arguments.len()))]
    fn parse(&self, unit: &UnitSource) -> Result<ParsedUnit, ParseError> {
        let clang = Clang::new().map_err(ParseError::Unavailable)?;
        let index = Index::new(&clang, false, false);
        let unsaved = [Unsaved::new(&unit.path, &unit.contents)];
        let tu = index
            .parser(unit.path.clone())
            .arguments(&unit.arguments)
            .unsaved(&unsaved)
            .skip_function_bodies(self.skip_function_bodies)
            .parse()
            .map_err(|e| ParseError::NoTranslationUnit {
                path: unit.path.clone(),
                reason: e.to_string(),
            })?;

        let diagnostics: Vec<ParserDiagnostic> = tu.get_diagnostics().iter().map(convert_diagnostic).collect();

        let mut converter = Converter::new(&unit.path.to_string_lossy());
        converter.convert_unit(tu.get_entity());
        debug!(
            cursors = converter.snapshot.cursor_count(),
            types = converter.snapshot.type_count(),
            "converted translation unit"
        );
        Ok(ParsedUnit {
            snapshot: converter.snapshot,
            diagnostics,
        })
    }
}

fn convert_diagnostic(diagnostic: &Diagnostic<'_>) -> ParserDiagnostic {
    let location = diagnostic.get_location().get_spelling_location();
    ParserDiagnostic {
        location: SourceLocation::new(
            location
                .file
                .map(|f| f.get_path().to_string_lossy().into_owned())
                .unwrap_or_default(),
            location.line,
            location.column,
        ),
        text: diagnostic.formatter().format(),
        category: diagnostic_category(diagnostic),
        level: match diagnostic.get_severity() {
            Severity::Ignored => DiagnosticLevel::Ignored,
            Severity::Note => DiagnosticLevel::Note,
            Severity::Warning => DiagnosticLevel::Warning,
            Severity::Error => DiagnosticLevel::Error,
            Severity::Fatal => DiagnosticLevel::Fatal,
        },
    }
}

/// Category name, read from the bracketed suffix of a category-only rendering.
fn diagnostic_category(diagnostic: &Diagnostic<'_>) -> String {
    let rendered = diagnostic
        .formatter()
        .source_location(false)
        .option(false)
        .category_name(true)
        .format();
    rendered
        .strip_suffix(']')
        .and_then(|s| s.rsplit_once('['))
        .map(|(_, category)| category.trim().to_string())
        .unwrap_or_default()
}

fn cursor_kind(kind: EntityKind) -> CursorKind {
    match kind {
        EntityKind::TranslationUnit => CursorKind::TranslationUnit,
        EntityKind::Namespace => CursorKind::Namespace,
        EntityKind::ClassDecl => CursorKind::ClassDecl,
        EntityKind::StructDecl => CursorKind::StructDecl,
        EntityKind::UnionDecl => CursorKind::UnionDecl,
        EntityKind::EnumDecl => CursorKind::EnumDecl,
        EntityKind::EnumConstantDecl => CursorKind::EnumConstantDecl,
        EntityKind::FieldDecl => CursorKind::FieldDecl,
        EntityKind::Method => CursorKind::Method,
        EntityKind::Constructor => CursorKind::Constructor,
        EntityKind::Destructor => CursorKind::Destructor,
        EntityKind::FunctionDecl => CursorKind::FunctionDecl,
        EntityKind::ParmDecl => CursorKind::ParmDecl,
        EntityKind::BaseSpecifier => CursorKind::BaseSpecifier,
        EntityKind::TypedefDecl => CursorKind::TypedefDecl,
        EntityKind::TypeAliasDecl => CursorKind::TypeAliasDecl,
        EntityKind::UsingDeclaration => CursorKind::UsingDeclaration,
        EntityKind::AnnotateAttr => CursorKind::AnnotateAttr,
        _ => CursorKind::Other,
    }
}

fn type_kind(kind: clang::TypeKind) -> TypeKind {
    use clang::TypeKind as K;
    match kind {
        K::Void => TypeKind::Void,
        K::Bool => TypeKind::Bool,
        K::CharU => TypeKind::CharU,
        K::UChar => TypeKind::UChar,
        K::Char16 => TypeKind::Char16,
        K::Char32 => TypeKind::Char32,
        K::UShort => TypeKind::UShort,
        K::UInt => TypeKind::UInt,
        K::ULong => TypeKind::ULong,
        K::ULongLong => TypeKind::ULongLong,
        K::UInt128 => TypeKind::UInt128,
        K::CharS => TypeKind::CharS,
        K::SChar => TypeKind::SChar,
        K::WChar => TypeKind::WChar,
        K::Short => TypeKind::Short,
        K::Int => TypeKind::Int,
        K::Long => TypeKind::Long,
        K::LongLong => TypeKind::LongLong,
        K::Int128 => TypeKind::Int128,
        K::Half => TypeKind::Half,
        K::Float16 => TypeKind::Float16,
        K::Float => TypeKind::Float,
        K::Double => TypeKind::Double,
        K::LongDouble => TypeKind::LongDouble,
        K::Float128 => TypeKind::Float128,
        K::Nullptr => TypeKind::Nullptr,
        K::Pointer => TypeKind::Pointer,
        K::LValueReference => TypeKind::LValueReference,
        K::RValueReference => TypeKind::RValueReference,
        K::Record => TypeKind::Record,
        K::Enum => TypeKind::Enum,
        K::FunctionPrototype => TypeKind::FunctionProto,
        K::FunctionNoPrototype => TypeKind::FunctionNoProto,
        K::Typedef => TypeKind::Typedef,
        K::Elaborated => TypeKind::Elaborated,
        _ => TypeKind::Other,
    }
}

fn access_specifier(access: Accessibility) -> AccessSpecifier {
    match access {
        Accessibility::Public => AccessSpecifier::Public,
        Accessibility::Protected => AccessSpecifier::Protected,
        Accessibility::Private => AccessSpecifier::Private,
    }
}

fn source_location(entity: Entity<'_>) -> SourceLocation {
    let Some(location) = entity.get_location() else {
        return SourceLocation::default();
    };
    let location = location.get_spelling_location();
    SourceLocation::new(
        location
            .file
            .map(|f| f.get_path().to_string_lossy().into_owned())
            .unwrap_or_default(),
        location.line,
        location.column,
    )
}

/// Declaration source tokens up to (not including) a body.
fn declaration_text(entity: Entity<'_>) -> String {
    let Some(range) = entity.get_range() else {
        return String::new();
    };
    let tokens: Vec<String> = range
        .tokenize()
        .iter()
        .map(|t| t.get_spelling())
        .take_while(|t| t != "{" && t != ";")
        .collect();
    tokens.join(" ")
}

/// Spelling of a const-qualified type with the qualifier removed.
fn strip_const(spelling: &str) -> String {
    let spelling = spelling.trim();
    if let Some(rest) = spelling.strip_prefix("const ") {
        return rest.trim().to_string();
    }
    if let Some(rest) = spelling.strip_suffix("const") {
        return rest.trim_end().to_string();
    }
    spelling.to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct TypeKey {
    kind: TypeKind,
    spelling: String,
    is_const: bool,
    declaration: Option<CursorId>,
}

/// Converts libclang entities and types into snapshot entries, memoized per entity and type.
struct Converter<'tu> {
    snapshot: AstSnapshot,
    cursors: HashMap<Entity<'tu>, CursorId>,
    types: HashMap<TypeKey, TypeId>,
    attached: HashSet<CursorId>,
    /// Converted cursors whose children are still to be converted
    pending: Vec<(Entity<'tu>, CursorId)>,
}

impl<'tu> Converter<'tu> {
    fn new(unit_path: &str) -> Self {
        Self {
            snapshot: AstSnapshot::new(unit_path),
            cursors: HashMap::new(),
            types: HashMap::new(),
            attached: HashSet::new(),
            pending: Vec::new(),
        }
    }

    fn convert_unit(&mut self, unit: Entity<'tu>) {
        let root = self.snapshot.root();
        self.cursors.insert(unit, root);
        self.pending.push((unit, root));
        while let Some((entity, id)) = self.pending.pop() {
            self.convert_children(entity, id);
        }
    }

    /// Attach converted children of `entity` to `parent`. `extern "C"` blocks are transparent.
    fn convert_children(&mut self, entity: Entity<'tu>, parent: CursorId) {
        for child in entity.get_children() {
            if child.get_kind() == EntityKind::LinkageSpec {
                self.convert_children(child, parent);
                continue;
            }
            if cursor_kind(child.get_kind()) == CursorKind::Other {
                continue;
            }
            let id = self.cursor_for(child);
            if self.attached.insert(id) {
                self.snapshot.cursor_mut(parent).children.push(id);
            }
        }
    }

    fn cursor_for(&mut self, entity: Entity<'tu>) -> CursorId {
        if let Some(&id) = self.cursors.get(&entity) {
            return id;
        }

        let semantic_parent = entity.get_semantic_parent().map(|parent| self.cursor_for(parent));
        let kind = cursor_kind(entity.get_kind());
        let mut data = CursorData::new(kind, entity.get_name().unwrap_or_default(), source_location(entity));
        data.display_name = entity.get_display_name().unwrap_or_default();
        data.semantic_parent = semantic_parent.or(Some(self.snapshot.root()));
        data.access = entity.get_accessibility().map(access_specifier);
        data.is_anonymous = matches!(
            kind,
            CursorKind::ClassDecl | CursorKind::StructDecl | CursorKind::UnionDecl | CursorKind::Namespace
        ) && entity.is_anonymous();
        data.is_virtual_base = kind == CursorKind::BaseSpecifier && entity.is_virtual_base();
        data.comment = entity.get_comment();
        if kind == CursorKind::FieldDecl {
            data.field_offset_bits = entity.get_offset_of_field().ok().map(|bits| bits as u64);
        }
        if kind == CursorKind::EnumConstantDecl {
            data.enum_value = entity.get_enum_constant_value().map(|(signed, _)| signed);
        }
        if kind == CursorKind::Method {
            data.declaration_text = declaration_text(entity);
        }

        let id = self.snapshot.add_detached_cursor(data);
        self.cursors.insert(entity, id);

        // Everything below may reach back to this entity through types; the memo entry above stops that.
        let ty = entity.get_type().map(|ty| self.type_for(ty));
        let result_type = entity.get_result_type().map(|ty| self.type_for(ty));
        let enum_integer_type = match kind {
            CursorKind::EnumDecl => entity.get_enum_underlying_type().map(|ty| self.type_for(ty)),
            _ => None,
        };
        let referenced = match kind {
            CursorKind::BaseSpecifier | CursorKind::UsingDeclaration => {
                entity.get_reference().map(|target| self.cursor_for(target))
            }
            _ => None,
        };
        let definition = entity
            .get_definition()
            .filter(|definition| *definition != entity)
            .map(|definition| self.cursor_for(definition));
        let template_arguments = self.template_arguments(entity);

        let data = self.snapshot.cursor_mut(id);
        data.ty = ty;
        data.result_type = result_type;
        data.enum_integer_type = enum_integer_type;
        data.referenced = referenced;
        data.definition = definition;
        data.template_arguments = template_arguments;

        if kind != CursorKind::Other {
            self.pending.push((entity, id));
        }
        id
    }

    fn template_arguments(&mut self, entity: Entity<'tu>) -> Vec<TemplateArgumentData> {
        if let Some(arguments) = entity.get_template_arguments() {
            return arguments
                .into_iter()
                .map(|argument| match argument {
                    clang::TemplateArgument::Type(ty) => TemplateArgumentData::Type(self.type_for(ty)),
                    clang::TemplateArgument::Integral(signed, _) => TemplateArgumentData::Integral(signed),
                    clang::TemplateArgument::Pack => TemplateArgumentData::Pack,
                    _ => TemplateArgumentData::Other,
                })
                .collect();
        }
        // Implicit instantiations only expose their arguments through the type.
        if !cursor_kind(entity.get_kind()).is_record() {
            return Vec::new();
        }
        let Some(types) = entity.get_type().and_then(|ty| ty.get_template_argument_types()) else {
            return Vec::new();
        };
        types
            .into_iter()
            .map(|ty| match ty {
                Some(ty) => TemplateArgumentData::Type(self.type_for(ty)),
                None => TemplateArgumentData::Other,
            })
            .collect()
    }

    fn type_for(&mut self, ty: Type<'tu>) -> TypeId {
        let kind = type_kind(ty.get_kind());
        let declaration = ty.get_declaration().map(|decl| self.cursor_for(decl));
        let key = TypeKey {
            kind,
            spelling: ty.get_display_name(),
            is_const: ty.is_const_qualified(),
            declaration,
        };
        if let Some(&id) = self.types.get(&key) {
            return id;
        }

        let mut data = TypeData::new(kind, key.spelling.clone());
        data.is_const = key.is_const;
        data.declaration = declaration;
        let id = self.snapshot.add_type(data);
        self.types.insert(key, id);

        let canonical_type = ty.get_canonical_type();
        let canonical = if canonical_type == ty {
            None
        } else {
            Some(self.type_for(canonical_type)).filter(|&canonical| canonical != id)
        };
        let pointee = match kind {
            TypeKind::Pointer | TypeKind::LValueReference | TypeKind::RValueReference => {
                ty.get_pointee_type().map(|pointee| self.type_for(pointee))
            }
            _ => None,
        };
        let (result, arguments, is_variadic) = match kind {
            TypeKind::FunctionProto | TypeKind::FunctionNoProto => (
                ty.get_result_type().map(|result| self.type_for(result)),
                ty.get_argument_types()
                    .unwrap_or_default()
                    .into_iter()
                    .map(|arg| self.type_for(arg))
                    .collect(),
                ty.is_variadic(),
            ),
            _ => (None, Vec::new(), false),
        };

        let data = self.snapshot.ty_mut(id);
        data.canonical = canonical;
        data.pointee = pointee;
        data.result = result;
        data.arguments = arguments;
        data.is_variadic = is_variadic;

        if data.is_const && canonical.is_none() {
            let unqualified = self.unqualified_of(id);
            self.snapshot.ty_mut(id).unqualified = Some(unqualified);
        }
        id
    }

    /// libclang cannot hand out the unqualified version of a type, so derive it from the const one.
    fn unqualified_of(&mut self, id: TypeId) -> TypeId {
        let source = self.snapshot.ty(id);
        let key = TypeKey {
            kind: source.kind,
            spelling: strip_const(&source.spelling),
            is_const: false,
            declaration: source.declaration,
        };
        if let Some(&existing) = self.types.get(&key) {
            return existing;
        }
        let data = TypeData {
            spelling: key.spelling.clone(),
            is_const: false,
            canonical: None,
            unqualified: None,
            ..source.clone()
        };
        let unqualified = self.snapshot.add_type(data);
        self.types.insert(key, unqualified);
        unqualified
    }
}
