//! Convenience constructors for assembling snapshots by hand.
//!
//! These mirror how a parser reports declarations: types are spelled the way clang spells them
//! (`const int &`, `geo::Point *`), sugar types point at their canonical form, and record types
//! carry their fully-qualified name.

use super::ast::{
    AccessSpecifier, AstSnapshot, CursorData, CursorId, CursorKind, SourceLocation, TypeData, TypeId, TypeKind,
};

impl AstSnapshot {
    pub fn builtin(&mut self, kind: TypeKind, spelling: &str) -> TypeId {
        self.add_type(TypeData::new(kind, spelling))
    }

    pub fn pointer_to(&mut self, pointee: TypeId) -> TypeId {
        self.indirection(TypeKind::Pointer, pointee, "*")
    }

    pub fn lvalue_reference_to(&mut self, pointee: TypeId) -> TypeId {
        self.indirection(TypeKind::LValueReference, pointee, "&")
    }

    pub fn rvalue_reference_to(&mut self, pointee: TypeId) -> TypeId {
        self.indirection(TypeKind::RValueReference, pointee, "&&")
    }

    fn indirection(&mut self, kind: TypeKind, pointee: TypeId, sigil: &str) -> TypeId {
        let canonical_pointee = self.canonical(pointee);
        let canonical = (canonical_pointee != pointee).then(|| self.indirection(kind, canonical_pointee, sigil));
        let mut data = TypeData::new(kind, format!("{} {sigil}", self.ty(pointee).spelling));
        data.pointee = Some(pointee);
        data.canonical = canonical;
        self.add_type(data)
    }

    /// Top-level const version of `ty`.
    pub fn const_of(&mut self, ty: TypeId) -> TypeId {
        let canonical_base = self.canonical(ty);
        let canonical = (canonical_base != ty).then(|| self.const_of(canonical_base));
        let base = self.ty(ty);
        let spelling = if base.kind == TypeKind::Pointer {
            format!("{}const", base.spelling)
        } else {
            format!("const {}", base.spelling)
        };
        let mut data = TypeData {
            is_const: true,
            unqualified: Some(ty),
            canonical,
            ..base.clone()
        };
        data.spelling = spelling;
        self.add_type(data)
    }

    /// Sugar type named `name` whose canonical form is that of `target`.
    pub fn typedef_of(&mut self, name: &str, target: TypeId) -> TypeId {
        let mut data = TypeData::new(TypeKind::Typedef, name);
        data.canonical = Some(self.canonical(target));
        self.add_type(data)
    }

    pub fn function_type(&mut self, result: TypeId, arguments: &[TypeId], is_variadic: bool) -> TypeId {
        let canonical_result = self.canonical(result);
        let canonical_arguments: Vec<TypeId> = arguments.iter().map(|&a| self.canonical(a)).collect();
        let canonical = (canonical_result != result || canonical_arguments != arguments)
            .then(|| self.function_type(canonical_result, &canonical_arguments, is_variadic));

        let mut spelled: Vec<&str> = arguments.iter().map(|&a| self.ty(a).spelling.as_str()).collect();
        if is_variadic {
            spelled.push("...");
        }
        let mut data = TypeData::new(
            TypeKind::FunctionProto,
            format!("{} ({})", self.ty(result).spelling, spelled.join(", ")),
        );
        data.result = Some(result);
        data.arguments = arguments.to_vec();
        data.is_variadic = is_variadic;
        data.canonical = canonical;
        self.add_type(data)
    }

    /// Qualified spelling of a declaration as clang prints it in type names.
    fn scoped_spelling(&self, parent: CursorId, name: &str) -> String {
        let mut parts = vec![name.to_string()];
        let mut current = Some(parent);
        while let Some(id) = current {
            let cursor = self.cursor(id);
            if cursor.kind == CursorKind::TranslationUnit {
                break;
            }
            if !cursor.spelling.is_empty() {
                parts.push(cursor.spelling.clone());
            }
            current = cursor.semantic_parent;
        }
        parts.reverse();
        parts.join("::")
    }

    pub fn add_namespace(&mut self, parent: CursorId, name: &str, location: SourceLocation) -> CursorId {
        self.add_cursor(parent, CursorData::new(CursorKind::Namespace, name, location))
    }

    /// Add a class, struct or union definition and its type. An empty `name` makes it anonymous.
    pub fn add_record(
        &mut self,
        parent: CursorId,
        kind: CursorKind,
        name: &str,
        location: SourceLocation,
    ) -> (CursorId, TypeId) {
        let type_name = if name.is_empty() {
            format!("(anonymous {} at {location})", kind.keyword())
        } else {
            name.to_string()
        };
        let spelling = self.scoped_spelling(parent, &type_name);
        let mut data = CursorData::new(kind, name, location);
        data.is_anonymous = name.is_empty();
        let cursor = self.add_cursor(parent, data);
        let mut ty = TypeData::new(TypeKind::Record, spelling);
        ty.declaration = Some(cursor);
        let ty = self.add_type(ty);
        self.cursor_mut(cursor).ty = Some(ty);
        (cursor, ty)
    }

    pub fn add_field(
        &mut self,
        record: CursorId,
        name: &str,
        ty: TypeId,
        offset_bits: u64,
        access: AccessSpecifier,
    ) -> CursorId {
        let location = self.cursor(record).location.clone();
        let mut data = CursorData::new(CursorKind::FieldDecl, name, location);
        data.ty = Some(ty);
        data.field_offset_bits = Some(offset_bits);
        data.access = Some(access);
        self.add_cursor(record, data)
    }

    /// Add a public method. `declaration_text` is the declaration as source tokens, e.g.
    /// `virtual void Draw ( ) const = 0`.
    pub fn add_method(
        &mut self,
        record: CursorId,
        name: &str,
        result: TypeId,
        parameters: &[(&str, TypeId)],
        declaration_text: &str,
    ) -> CursorId {
        let location = self.cursor(record).location.clone();
        let mut data = CursorData::new(CursorKind::Method, name, location);
        data.access = Some(AccessSpecifier::Public);
        data.declaration_text = declaration_text.to_string();
        self.add_callable(record, data, result, parameters)
    }

    pub fn add_function(
        &mut self,
        parent: CursorId,
        name: &str,
        result: TypeId,
        parameters: &[(&str, TypeId)],
        location: SourceLocation,
    ) -> CursorId {
        let data = CursorData::new(CursorKind::FunctionDecl, name, location);
        self.add_callable(parent, data, result, parameters)
    }

    fn add_callable(
        &mut self,
        parent: CursorId,
        mut data: CursorData,
        result: TypeId,
        parameters: &[(&str, TypeId)],
    ) -> CursorId {
        let arguments: Vec<TypeId> = parameters.iter().map(|&(_, ty)| ty).collect();
        data.ty = Some(self.function_type(result, &arguments, false));
        data.result_type = Some(result);
        let location = data.location.clone();
        let callable = self.add_cursor(parent, data);
        for &(name, ty) in parameters {
            let mut param = CursorData::new(CursorKind::ParmDecl, name, location.clone());
            param.ty = Some(ty);
            self.add_cursor(callable, param);
        }
        callable
    }

    pub fn add_base(
        &mut self,
        record: CursorId,
        base: CursorId,
        access: AccessSpecifier,
        is_virtual: bool,
    ) -> CursorId {
        let base_cursor = self.cursor(base);
        let mut data = CursorData::new(
            CursorKind::BaseSpecifier,
            base_cursor.spelling.clone(),
            self.cursor(record).location.clone(),
        );
        data.ty = base_cursor.ty;
        data.referenced = Some(base);
        data.access = Some(access);
        data.is_virtual_base = is_virtual;
        self.add_cursor(record, data)
    }

    pub fn add_enum(
        &mut self,
        parent: CursorId,
        name: &str,
        integer_type: TypeId,
        enumerators: &[(&str, i64)],
        location: SourceLocation,
    ) -> (CursorId, TypeId) {
        let spelling = self.scoped_spelling(parent, name);
        let mut data = CursorData::new(CursorKind::EnumDecl, name, location.clone());
        data.enum_integer_type = Some(integer_type);
        let cursor = self.add_cursor(parent, data);
        for &(constant, value) in enumerators {
            let mut data = CursorData::new(CursorKind::EnumConstantDecl, constant, location.clone());
            data.enum_value = Some(value);
            self.add_cursor(cursor, data);
        }
        let mut ty = TypeData::new(TypeKind::Enum, spelling);
        ty.declaration = Some(cursor);
        let ty = self.add_type(ty);
        self.cursor_mut(cursor).ty = Some(ty);
        (cursor, ty)
    }

    /// Add `typedef <target> name;` and return the declaration and its sugar type.
    pub fn add_typedef(
        &mut self,
        parent: CursorId,
        name: &str,
        target: TypeId,
        location: SourceLocation,
    ) -> (CursorId, TypeId) {
        let sugar = self.typedef_of(name, target);
        let mut data = CursorData::new(CursorKind::TypedefDecl, name, location);
        data.ty = Some(sugar);
        let cursor = self.add_cursor(parent, data);
        self.ty_mut(sugar).declaration = Some(cursor);
        (cursor, sugar)
    }

    /// Attach an `annotate("...")` attribute to a declaration.
    pub fn add_annotation(&mut self, declaration: CursorId, text: &str) -> CursorId {
        let location = self.cursor(declaration).location.clone();
        self.add_cursor(declaration, CursorData::new(CursorKind::AnnotateAttr, text, location))
    }
}
