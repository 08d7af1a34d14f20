//! Declaration walking and record/function lowering.

use std::collections::BTreeSet;

use cppir_ir::{Access, Annotation, Field, Function, Modifier, NodeId, Parameter, Record, RecordBase};
use tracing::{debug, trace};

use super::CppLowering;
use super::scope::fully_qualified_name;
use crate::frontend::ast::{AccessSpecifier, AstSnapshot, CursorData, CursorId, CursorKind, TypeKind};

/// Top-level declarations grouped by how they are lowered.
#[derive(Debug, Default)]
struct Declarations {
    records: Vec<CursorId>,
    functions: Vec<CursorId>,
    aliases: Vec<CursorId>,
}

/// Visit the direct children of `parent`, recursing into namespaces only.
fn collect_declarations(snapshot: &AstSnapshot, parent: CursorId, out: &mut Declarations) {
    for (id, child) in snapshot.children(parent) {
        match child.kind {
            CursorKind::Namespace => collect_declarations(snapshot, id, out),
            CursorKind::ClassDecl | CursorKind::StructDecl => out.records.push(id),
            CursorKind::FunctionDecl => out.functions.push(id),
            CursorKind::TypedefDecl | CursorKind::TypeAliasDecl | CursorKind::UsingDeclaration => {
                out.aliases.push(id)
            }
            _ => {}
        }
    }
}

impl CppLowering<'_> {
    /// Lower every user-scope declaration of the translation unit.
    ///
    /// Records first, then free functions, then aliases.
    #[tracing::instrument(skip_all, fields(cursors = self.snapshot.cursor_count()))]
    pub fn lower_translation_unit(&mut self) {
        let snapshot = self.snapshot;
        let mut declarations = Declarations::default();
        collect_declarations(snapshot, snapshot.root(), &mut declarations);
        debug!(
            records = declarations.records.len(),
            functions = declarations.functions.len(),
            aliases = declarations.aliases.len(),
            "collected declarations"
        );

        for record in declarations.records {
            self.lower_record_declaration(record);
        }
        for function in declarations.functions {
            self.lower_function_declaration(function, false);
        }
        for alias in declarations.aliases {
            self.lower_alias_declaration(alias);
        }
    }

    /// Lower a class or struct declaration into a Record node.
    ///
    /// Returns `None` when the record is outside user scope. Forward declarations resolve to their
    /// definition first, so the node describes the complete type.
    pub(super) fn lower_record_declaration(&mut self, cursor: CursorId) -> Option<NodeId> {
        let snapshot = self.snapshot;
        let cursor = snapshot.cursor(cursor).definition.unwrap_or(cursor);
        let data = snapshot.cursor(cursor);
        let location = self.location_of(&data.location);
        if !self.scope.contains(&location.file) {
            trace!(name = %data.spelling, file = %location.file, "record outside user scope");
            return None;
        }

        let name = fully_qualified_name(snapshot, cursor);
        if let Some(existing) = self.graph.find_record(&name) {
            return Some(existing);
        }
        let id = self.graph.reserve_record(name.as_str(), location);
        debug!(record = %name, index = %id, "lowering record");

        let mut record = Record {
            is_anonymous: data.is_anonymous,
            annotations: annotations_of(snapshot, cursor),
            comments: data.comment.as_deref().map(split_comment).unwrap_or_default(),
            ..Record::default()
        };

        // Bases, then fields, then methods, each in declaration order.
        for (_, base) in snapshot.children(cursor).filter(|(_, c)| c.kind == CursorKind::BaseSpecifier) {
            record.bases.push(self.lower_base(base));
        }
        for (_, field) in snapshot.children(cursor).filter(|(_, c)| c.kind == CursorKind::FieldDecl) {
            let Some(ty) = field.ty else {
                continue;
            };
            let field_location = self.location_of(&field.location);
            record.fields.push(Field {
                name: field.spelling.clone(),
                qualified_type: self.lower_type(ty, &field_location),
                offset: field.field_offset_bits.map_or(0, |bits| bits / 8),
                access: access_of(field),
            });
        }
        for (method, _) in snapshot.children(cursor).filter(|(_, c)| c.kind == CursorKind::Method) {
            if let Some(function) = self.lower_function_declaration(method, true) {
                record.functions.push(function);
            }
        }

        self.graph.complete_record(id, record);
        Some(id)
    }

    fn lower_base(&mut self, base: &CursorData) -> RecordBase {
        let snapshot = self.snapshot;
        let target = base.referenced.or_else(|| {
            base.ty
                .map(|ty| snapshot.canonical(ty))
                .and_then(|ty| snapshot.ty(ty).declaration)
        });
        RecordBase {
            base_record: target.and_then(|target| self.lower_record_declaration(target)),
            is_virtual: base.is_virtual_base,
            access: access_of(base),
        }
    }

    /// Lower a free function (`is_method == false`) or a method into a Function node.
    ///
    /// Free functions outside user scope, or whose qualified name was already lowered, yield `None`.
    /// Methods are always lowered.
    pub(super) fn lower_function_declaration(&mut self, cursor: CursorId, is_method: bool) -> Option<NodeId> {
        let snapshot = self.snapshot;
        let data = snapshot.cursor(cursor);
        let location = self.location_of(&data.location);
        let name = fully_qualified_name(snapshot, cursor);

        if !is_method {
            if !self.scope.contains(&location.file) {
                trace!(function = %name, file = %location.file, "function outside user scope");
                return None;
            }
            if self.graph.find_free_function(&name).is_some() {
                debug!(function = %name, "collapsing duplicate free function");
                return None;
            }
        }

        let return_qualified_type = match data.result_type {
            Some(ty) => self.lower_type(ty, &location),
            None => self.lower_missing_type(&location),
        };
        let mut parameters = Vec::new();
        for (_, param) in snapshot.children(cursor).filter(|(_, c)| c.kind == CursorKind::ParmDecl) {
            let param_location = self.location_of(&param.location);
            let qualified_type = match param.ty {
                Some(ty) => self.lower_type(ty, &param_location),
                None => self.lower_missing_type(&param_location),
            };
            parameters.push(Parameter {
                name: param.spelling.clone(),
                qualified_type,
            });
        }

        let (access, modifiers) = if is_method {
            (access_of(data), method_modifiers(&data.spelling, &data.declaration_text))
        } else {
            (Access::Public, BTreeSet::new())
        };
        let function = Function {
            return_qualified_type,
            access,
            parameters,
            modifiers,
            annotations: annotations_of(snapshot, cursor),
            comments: data.comment.as_deref().map(split_comment).unwrap_or_default(),
        };

        let id = if is_method {
            self.graph.push_method(name, location, function)
        } else {
            self.graph.push_free_function(name, location, function)
        };
        Some(id)
    }

    /// Aliases emit no node of their own. A user-scope record reached through one is lowered so it
    /// is present even when nothing else names it.
    fn lower_alias_declaration(&mut self, cursor: CursorId) {
        let snapshot = self.snapshot;
        let data = snapshot.cursor(cursor);
        let target = match data.kind {
            CursorKind::UsingDeclaration => data.referenced,
            _ => data.ty.and_then(|ty| {
                let canonical = snapshot.ty(snapshot.canonical(ty));
                (canonical.kind == TypeKind::Record)
                    .then_some(canonical.declaration)
                    .flatten()
            }),
        };
        let Some(target) = target else {
            return;
        };
        if snapshot.cursor(target).kind.is_record() {
            self.lower_record_declaration(target);
        }
    }
}

fn access_of(data: &CursorData) -> Access {
    match data.access {
        Some(AccessSpecifier::Protected) => Access::Protected,
        Some(AccessSpecifier::Private) => Access::Private,
        Some(AccessSpecifier::Public) | None => Access::Public,
    }
}

fn annotations_of(snapshot: &AstSnapshot, cursor: CursorId) -> Vec<Annotation> {
    snapshot
        .children(cursor)
        .filter(|(_, c)| c.kind == CursorKind::AnnotateAttr)
        .map(|(_, c)| parse_annotation(&c.spelling))
        .collect()
}

/// Derive method modifiers from the declaration's source text.
///
/// Recognizes `static` or `virtual` before the parameter list, `const`/`volatile` after it, and a
/// `= 0` pure-virtual suffix. Static methods carry no other modifier. The parameter list is the `(`
/// right after `name`; attribute groups (`__attribute__((..))`, `[[..]]`, `alignas(..)`,
/// `__declspec(..)`) are ignored.
pub fn method_modifiers(name: &str, declaration: &str) -> BTreeSet<Modifier> {
    let tokens = strip_attributes(tokenize(declaration));
    let open = parameter_list_start(&tokens, &tokenize(name));
    let close = matching_paren(&tokens, open);
    let leading = &tokens[..open];
    let trailing = close.map_or(&tokens[tokens.len()..], |close| &tokens[close + 1..]);

    let mut modifiers = BTreeSet::new();
    if leading.iter().any(|t| t == "static") {
        modifiers.insert(Modifier::Static);
        return modifiers;
    }
    if trailing.iter().any(|t| t == "const") {
        modifiers.insert(Modifier::Const);
    }
    if trailing.iter().any(|t| t == "volatile") {
        modifiers.insert(Modifier::Volatile);
    }
    if trailing.windows(2).any(|w| w[0] == "=" && w[1] == "0") {
        modifiers.insert(Modifier::PureVirtual);
    } else if leading.iter().any(|t| t == "virtual") {
        modifiers.insert(Modifier::Virtual);
    }
    modifiers
}

/// Index of the `(` following the `name` tokens, else the first `(`, else the end.
fn parameter_list_start(tokens: &[String], name: &[String]) -> usize {
    if !name.is_empty() {
        let anchored = tokens
            .windows(name.len() + 1)
            .position(|w| w[..name.len()] == *name && w[name.len()] == "(");
        if let Some(start) = anchored {
            return start + name.len();
        }
    }
    tokens.iter().position(|t| t == "(").unwrap_or(tokens.len())
}

/// Drop `__attribute__((..))`, `alignas(..)`, `__declspec(..)` and `[[..]]` groups.
fn strip_attributes(tokens: Vec<String>) -> Vec<String> {
    let mut kept = Vec::with_capacity(tokens.len());
    let mut index = 0;
    while index < tokens.len() {
        let token = tokens[index].as_str();
        let next = tokens.get(index + 1).map(String::as_str);
        match (token, next) {
            ("__attribute__" | "alignas" | "__declspec", Some("(")) => {
                index = matching_paren(&tokens, index + 1).map_or(tokens.len(), |close| close + 1);
            }
            ("[", Some("[")) => {
                index = matching_bracket(&tokens, index).map_or(tokens.len(), |close| close + 1);
            }
            _ => {
                kept.push(tokens[index].clone());
                index += 1;
            }
        }
    }
    kept
}

/// Index of the `]` closing the `[` at `open`.
fn matching_bracket(tokens: &[String], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (index, token) in tokens.iter().enumerate().skip(open) {
        match token.as_str() {
            "[" => depth += 1,
            "]" => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(index);
                }
            }
            _ => {}
        }
    }
    None
}

/// Index of the `)` closing the `(` at `open`.
fn matching_paren(tokens: &[String], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (index, token) in tokens.iter().enumerate().skip(open) {
        match token.as_str() {
            "(" => depth += 1,
            ")" => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(index);
                }
            }
            _ => {}
        }
    }
    None
}

/// Split source text into identifier/number tokens and single punctuation characters.
fn tokenize(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    for ch in text.chars() {
        if ch.is_alphanumeric() || ch == '_' {
            current.push(ch);
            continue;
        }
        if !current.is_empty() {
            tokens.push(std::mem::take(&mut current));
        }
        if !ch.is_whitespace() {
            tokens.push(ch.to_string());
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

/// Parse `name` or `name(attr, attr)` annotation text.
pub fn parse_annotation(text: &str) -> Annotation {
    let text = text.trim();
    let Some((name, rest)) = text.split_once('(') else {
        return Annotation::new(text);
    };
    let inner = rest.strip_suffix(')').unwrap_or(rest);
    let mut annotation = Annotation::new(name.trim());
    for attribute in inner.split(',').map(str::trim).filter(|a| !a.is_empty()) {
        annotation = annotation.with_attribute(attribute);
    }
    annotation
}

/// Split a raw documentation comment into content lines, stripping comment markers.
pub fn split_comment(raw: &str) -> Vec<String> {
    raw.lines()
        .map(|line| {
            let line = line.trim();
            let line = line
                .strip_prefix("///<")
                .or_else(|| line.strip_prefix("///"))
                .or_else(|| line.strip_prefix("//!"))
                .or_else(|| line.strip_prefix("//"))
                .or_else(|| line.strip_prefix("/**"))
                .or_else(|| line.strip_prefix("/*!"))
                .or_else(|| line.strip_prefix("/*"))
                .unwrap_or(line);
            let line = line.strip_suffix("*/").unwrap_or(line).trim();
            line.strip_prefix('*').unwrap_or(line).trim().to_string()
        })
        .filter(|line| !line.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_modifiers() {
        let cases: &[(&str, &str, &[Modifier])] = &[
            ("Method", "void Method ( )", &[]),
            ("ConstMethod", "void ConstMethod ( ) const", &[Modifier::Const]),
            ("StaticMethod", "static void StaticMethod ( )", &[Modifier::Static]),
            ("VirtualMethod", "virtual void VirtualMethod ( )", &[Modifier::Virtual]),
            ("PureVirtualMethod", "virtual void PureVirtualMethod ( ) = 0", &[Modifier::PureVirtual]),
            (
                "ConstPureVirtualMethod",
                "virtual void ConstPureVirtualMethod ( ) const = 0",
                &[Modifier::Const, Modifier::PureVirtual],
            ),
            ("Get", "const int * Get ( const int * p )", &[]),
            ("Read", "int Read ( ) const volatile", &[Modifier::Const, Modifier::Volatile]),
            ("Size", "virtual int Size()const=0;", &[Modifier::Const, Modifier::PureVirtual]),
            ("Reset", "void Reset(int value = 0)", &[]),
            ("Count", "int Count() const noexcept(true)", &[Modifier::Const]),
        ];
        for (name, text, expected) in cases {
            let expected: BTreeSet<Modifier> = expected.iter().copied().collect();
            assert_eq!(method_modifiers(name, text), expected, "{text}");
        }
    }

    #[test]
    fn test_method_modifiers_ignore_attribute_groups() {
        let cases: &[(&str, &str, &[Modifier])] = &[
            ("Ping", "__attribute__((annotate(\"rpc\"))) static void Ping()", &[Modifier::Static]),
            ("Get", "__attribute__((annotate(\"rpc\"))) const int & Get()", &[]),
            (
                "Area",
                "__attribute__((annotate(\"rpc(async)\"))) virtual double Area() const = 0",
                &[Modifier::Const, Modifier::PureVirtual],
            ),
            ("Load", "[[nodiscard]] virtual bool Load(int id)", &[Modifier::Virtual]),
            ("Data", "[[deprecated(\"use View\")]] const char * Data() const", &[Modifier::Const]),
            ("Buffer", "alignas(16) static float * Buffer()", &[Modifier::Static]),
        ];
        for (name, text, expected) in cases {
            let expected: BTreeSet<Modifier> = expected.iter().copied().collect();
            assert_eq!(method_modifiers(name, text), expected, "{text}");
        }
    }

    #[test]
    fn test_method_modifiers_anchor_on_the_method_name() {
        assert_eq!(
            method_modifiers("operator==", "bool operator==(const Point & other) const"),
            BTreeSet::from([Modifier::Const])
        );
        assert_eq!(method_modifiers("~Widget", "virtual ~Widget()"), BTreeSet::from([Modifier::Virtual]));
        // Unknown name falls back to the first parenthesis.
        assert_eq!(method_modifiers("", "void Reset() volatile"), BTreeSet::from([Modifier::Volatile]));
    }

    #[test]
    fn test_parse_annotation() {
        assert_eq!(parse_annotation("export"), Annotation::new("export"));
        assert_eq!(
            parse_annotation("rpc(async, timeout=5)"),
            Annotation::new("rpc").with_attribute("async").with_attribute("timeout=5")
        );
        assert_eq!(parse_annotation("flag()"), Annotation::new("flag"));
    }

    #[test]
    fn test_split_comment() {
        assert_eq!(split_comment("/// A point.\n/// In 2D."), vec!["A point.", "In 2D."]);
        assert_eq!(
            split_comment("/**\n * Multi\n * line\n */"),
            vec!["Multi".to_string(), "line".to_string()]
        );
    }
}
