//! The AST builder: sole allocator and linker of AST nodes.
//!
//! Every node the parser or resolver needs goes through here. Beyond
//! allocation the builder synthesises the pieces the language defines
//! implicitly: the hidden error-handler parameter of every function, the
//! default constructor of every class, dense module ids, and the
//! pre-allocated primitive type descriptors.

use crate::arena::Arena;
use crate::ast::decl::{
    Class, ClassKind, Def, Enum, Function, FunctionKind, ScopeSet, Var, VarKind,
};
use crate::ast::expr::{
    BinaryOp, Call, Expr, ExprKind, Path, PathSeg, UnaryOp, Value, VarRef,
};
use crate::ast::module::{Definition, Identity, Import, Module};
use crate::ast::stmt::{
    AssignStmt, Block, Elsif, FailStmt, HandleStmt, IfStmt, LoopStmt, Stmt, StmtKind, SwitchCase,
    SwitchStmt,
};
use crate::ast::types::{FloatKind, IntKind, Type, TypeRef, TypeRefKind};
use crate::intern::Symbol;
use crate::source::{FileId, Span};
use std::cell::Cell;

pub struct AstBuilder<'a> {
    arena: &'a Arena,
    next_module_id: u64,
    next_class_id: u32,
    next_enum_id: u32,
    ty_bool: &'a Type<'a>,
    ty_char: &'a Type<'a>,
    ty_string: &'a Type<'a>,
    ty_void: &'a Type<'a>,
    ty_error: &'a Type<'a>,
    ty_null: &'a Type<'a>,
    ty_ints: [&'a Type<'a>; 7],
    ty_floats: [&'a Type<'a>; 2],
}

fn int_index(kind: IntKind) -> usize {
    match kind {
        IntKind::Byte => 0,
        IntKind::Short => 1,
        IntKind::Ushort => 2,
        IntKind::Int => 3,
        IntKind::Uint => 4,
        IntKind::Long => 5,
        IntKind::Ulong => 6,
    }
}

impl<'a> AstBuilder<'a> {
    pub fn new(arena: &'a Arena) -> Self {
        let ty_ints = [
            &*arena.alloc(Type::Int(IntKind::Byte)),
            &*arena.alloc(Type::Int(IntKind::Short)),
            &*arena.alloc(Type::Int(IntKind::Ushort)),
            &*arena.alloc(Type::Int(IntKind::Int)),
            &*arena.alloc(Type::Int(IntKind::Uint)),
            &*arena.alloc(Type::Int(IntKind::Long)),
            &*arena.alloc(Type::Int(IntKind::Ulong)),
        ];
        let ty_floats = [
            &*arena.alloc(Type::Float(FloatKind::Float)),
            &*arena.alloc(Type::Float(FloatKind::Double)),
        ];
        AstBuilder {
            arena,
            next_module_id: 0,
            next_class_id: 0,
            next_enum_id: 0,
            ty_bool: arena.alloc(Type::Bool),
            ty_char: arena.alloc(Type::Char),
            ty_string: arena.alloc(Type::String),
            ty_void: arena.alloc(Type::Void),
            ty_error: arena.alloc(Type::Error),
            ty_null: arena.alloc(Type::Null),
            ty_ints,
            ty_floats,
        }
    }

    /// Name of the implicit namespace for modules without a header.
    pub fn default_namespace(&self) -> Symbol {
        Symbol::DEFAULT_NS
    }

    /// The name `error`, shared by every synthesised handler.
    pub fn error_symbol(&self) -> Symbol {
        Symbol::ERROR
    }

    // ----- type descriptors -------------------------------------------------

    pub fn bool_type(&self) -> &'a Type<'a> {
        self.ty_bool
    }

    pub fn char_type(&self) -> &'a Type<'a> {
        self.ty_char
    }

    pub fn string_type(&self) -> &'a Type<'a> {
        self.ty_string
    }

    pub fn void_type(&self) -> &'a Type<'a> {
        self.ty_void
    }

    pub fn error_type(&self) -> &'a Type<'a> {
        self.ty_error
    }

    pub fn null_type(&self) -> &'a Type<'a> {
        self.ty_null
    }

    pub fn int_type(&self, kind: IntKind) -> &'a Type<'a> {
        self.ty_ints[int_index(kind)]
    }

    pub fn float_type(&self, kind: FloatKind) -> &'a Type<'a> {
        match kind {
            FloatKind::Float => self.ty_floats[0],
            FloatKind::Double => self.ty_floats[1],
        }
    }

    pub fn array_type(&self, elem: &'a Type<'a>, size: u64) -> &'a Type<'a> {
        self.arena.alloc(Type::Array { elem, size })
    }

    pub fn class_type(&self, class: &'a Class<'a>) -> &'a Type<'a> {
        self.arena.alloc(Type::Class(class))
    }

    pub fn enum_type(&self, enm: &'a Enum<'a>) -> &'a Type<'a> {
        self.arena.alloc(Type::Enum(enm))
    }

    // ----- type references --------------------------------------------------

    pub fn type_ref(&self, span: Span, kind: TypeRefKind<'a>) -> &'a TypeRef<'a> {
        self.arena.alloc(TypeRef {
            span,
            kind,
            resolved: Cell::new(None),
        })
    }

    fn error_type_ref(&self, span: Span) -> &'a TypeRef<'a> {
        let tr = self.type_ref(span, TypeRefKind::Error);
        tr.resolved.set(Some(self.ty_error));
        tr
    }

    // ----- paths and expressions -------------------------------------------

    pub fn path(&self, span: Span, segments: Vec<PathSeg>) -> Path<'a> {
        assert!(!segments.is_empty(), "identifier path must not be empty");
        Path {
            segments: self.arena.alloc_slice(segments),
            span,
        }
    }

    pub fn single_path(&self, name: Symbol, span: Span) -> Path<'a> {
        self.path(span, vec![PathSeg { name, span }])
    }

    fn expr(&self, span: Span, kind: ExprKind<'a>) -> &'a Expr<'a> {
        self.arena.alloc(Expr {
            span,
            kind,
            ty: Cell::new(None),
        })
    }

    pub fn value_expr(&self, span: Span, value: Value) -> &'a Expr<'a> {
        self.expr(span, ExprKind::Value(value))
    }

    pub fn var_ref(&self, path: Path<'a>) -> &'a VarRef<'a> {
        self.arena.alloc(VarRef {
            path,
            def: Cell::new(None),
        })
    }

    pub fn var_ref_expr(&self, span: Span, var_ref: &'a VarRef<'a>) -> &'a Expr<'a> {
        self.expr(span, ExprKind::VarRef(var_ref))
    }

    pub fn call(
        &self,
        path: Path<'a>,
        args: Vec<&'a Expr<'a>>,
        constructor: bool,
    ) -> &'a Call<'a> {
        self.arena.alloc(Call {
            path,
            args: self.arena.alloc_slice(args),
            constructor,
            target: Cell::new(None),
            receiver: Cell::new(None),
            error_handler: Cell::new(None),
        })
    }

    pub fn call_expr(&self, span: Span, call: &'a Call<'a>) -> &'a Expr<'a> {
        self.expr(span, ExprKind::Call(call))
    }

    pub fn unary_expr(&self, span: Span, op: UnaryOp, operand: &'a Expr<'a>) -> &'a Expr<'a> {
        self.expr(span, ExprKind::Unary { op, operand })
    }

    pub fn binary_expr(
        &self,
        span: Span,
        op: BinaryOp,
        left: &'a Expr<'a>,
        right: &'a Expr<'a>,
    ) -> &'a Expr<'a> {
        self.expr(span, ExprKind::Binary { op, left, right })
    }

    pub fn ternary_expr(
        &self,
        span: Span,
        cond: &'a Expr<'a>,
        then_expr: &'a Expr<'a>,
        else_expr: &'a Expr<'a>,
    ) -> &'a Expr<'a> {
        self.expr(
            span,
            ExprKind::Ternary {
                cond,
                then_expr,
                else_expr,
            },
        )
    }

    pub fn index_expr(
        &self,
        span: Span,
        base: &'a Expr<'a>,
        index: &'a Expr<'a>,
    ) -> &'a Expr<'a> {
        self.expr(span, ExprKind::Index { base, index })
    }

    // ----- statements -------------------------------------------------------

    fn stmt(&self, span: Span, kind: StmtKind<'a>) -> &'a Stmt<'a> {
        self.arena.alloc(Stmt {
            span,
            kind,
            parent: Cell::new(None),
        })
    }

    /// Builds a block and links every child statement back to it.
    pub fn block(&self, span: Span, stmts: Vec<&'a Stmt<'a>>) -> &'a Block<'a> {
        let block = self.arena.alloc(Block {
            span,
            stmts: self.arena.alloc_slice(stmts),
        });
        for stmt in block.stmts {
            stmt.parent.set(Some(block));
        }
        block
    }

    pub fn var_decl_stmt(&self, span: Span, var: &'a Var<'a>) -> &'a Stmt<'a> {
        self.stmt(span, StmtKind::VarDecl(var))
    }

    pub fn assign_stmt(
        &self,
        span: Span,
        target: &'a VarRef<'a>,
        value: &'a Expr<'a>,
    ) -> &'a Stmt<'a> {
        let assign = self.arena.alloc(AssignStmt { target, value });
        self.stmt(span, StmtKind::Assign(assign))
    }

    pub fn expr_stmt(&self, span: Span, expr: &'a Expr<'a>) -> &'a Stmt<'a> {
        self.stmt(span, StmtKind::Expr(expr))
    }

    pub fn return_stmt(&self, span: Span, value: Option<&'a Expr<'a>>) -> &'a Stmt<'a> {
        self.stmt(span, StmtKind::Return(value))
    }

    pub fn fail_stmt(&self, span: Span, payload: Option<&'a Expr<'a>>) -> &'a Stmt<'a> {
        let fail = self.arena.alloc(FailStmt {
            payload,
            handler: Cell::new(None),
        });
        self.stmt(span, StmtKind::Fail(fail))
    }

    pub fn break_stmt(&self, span: Span) -> &'a Stmt<'a> {
        self.stmt(span, StmtKind::Break)
    }

    pub fn continue_stmt(&self, span: Span) -> &'a Stmt<'a> {
        self.stmt(span, StmtKind::Continue)
    }

    pub fn delete_stmt(&self, span: Span, target: &'a VarRef<'a>) -> &'a Stmt<'a> {
        self.stmt(span, StmtKind::Delete(target))
    }

    pub fn block_stmt(&self, block: &'a Block<'a>) -> &'a Stmt<'a> {
        self.stmt(block.span, StmtKind::Block(block))
    }

    pub fn if_stmt(
        &self,
        span: Span,
        cond: &'a Expr<'a>,
        then_stmt: &'a Stmt<'a>,
        elsifs: Vec<Elsif<'a>>,
        else_stmt: Option<&'a Stmt<'a>>,
    ) -> &'a Stmt<'a> {
        let node = self.arena.alloc(IfStmt {
            cond,
            then_stmt,
            elsifs: self.arena.alloc_slice(elsifs),
            else_stmt,
        });
        self.stmt(span, StmtKind::If(node))
    }

    pub fn switch_stmt(
        &self,
        span: Span,
        scrutinee: &'a Expr<'a>,
        cases: Vec<SwitchCase<'a>>,
        default: Option<&'a Block<'a>>,
    ) -> &'a Stmt<'a> {
        let node = self.arena.alloc(SwitchStmt {
            scrutinee,
            cases: self.arena.alloc_slice(cases),
            default,
        });
        self.stmt(span, StmtKind::Switch(node))
    }

    pub fn loop_stmt(
        &self,
        span: Span,
        init: Option<&'a Block<'a>>,
        cond: Option<&'a Expr<'a>>,
        post: Option<&'a Block<'a>>,
        body: &'a Stmt<'a>,
    ) -> &'a Stmt<'a> {
        let node = self.arena.alloc(LoopStmt {
            init,
            cond,
            post,
            body,
        });
        self.stmt(span, StmtKind::Loop(node))
    }

    pub fn handle_stmt(
        &self,
        span: Span,
        error_var: &'a Var<'a>,
        block: &'a Block<'a>,
    ) -> &'a Stmt<'a> {
        let node = self.arena.alloc(HandleStmt { error_var, block });
        self.stmt(span, StmtKind::Handle(node))
    }

    // ----- variables --------------------------------------------------------

    fn var(
        &self,
        span: Span,
        name: Symbol,
        ty: &'a TypeRef<'a>,
        scopes: ScopeSet,
        kind: VarKind,
        init: Option<&'a Expr<'a>>,
        index: u32,
        comment: Option<Symbol>,
    ) -> &'a Var<'a> {
        assert!(name != Symbol::EMPTY, "variable name must not be empty");
        self.arena.alloc(Var {
            span,
            name,
            ty,
            scopes,
            kind,
            init,
            index,
            comment,
            owner_class: Cell::new(None),
            owner_enum: Cell::new(None),
            module_id: Cell::new(0),
        })
    }

    pub fn create_global_var(
        &self,
        span: Span,
        ty: &'a TypeRef<'a>,
        name: Symbol,
        scopes: ScopeSet,
        init: Option<&'a Expr<'a>>,
        comment: Option<Symbol>,
    ) -> &'a Var<'a> {
        self.var(span, name, ty, scopes, VarKind::Global, init, 0, comment)
    }

    pub fn create_attribute(
        &self,
        span: Span,
        ty: &'a TypeRef<'a>,
        name: Symbol,
        scopes: ScopeSet,
        init: Option<&'a Expr<'a>>,
        comment: Option<Symbol>,
    ) -> &'a Var<'a> {
        self.var(span, name, ty, scopes, VarKind::Attribute, init, 0, comment)
    }

    pub fn create_param(
        &self,
        span: Span,
        ty: &'a TypeRef<'a>,
        name: Symbol,
        scopes: ScopeSet,
        index: u32,
    ) -> &'a Var<'a> {
        self.var(span, name, ty, scopes, VarKind::Param, None, index, None)
    }

    pub fn create_local(
        &self,
        span: Span,
        ty: &'a TypeRef<'a>,
        name: Symbol,
        scopes: ScopeSet,
        init: Option<&'a Expr<'a>>,
    ) -> &'a Var<'a> {
        self.var(span, name, ty, scopes, VarKind::Local, init, 0, None)
    }

    /// The hidden `error error` parameter every function receives.
    pub fn create_error_handler(&self, span: Span) -> &'a Var<'a> {
        self.var(
            span,
            Symbol::ERROR,
            self.error_type_ref(span),
            ScopeSet::default(),
            VarKind::ErrorHandler,
            None,
            0,
            None,
        )
    }

    /// The fresh error variable of a `handle` block. A bound form
    /// (`error e = handle { .. }`) names it; the bare form reuses `error`,
    /// shadowing the enclosing handler.
    pub fn create_handle_error_var(&self, span: Span, name: Option<Symbol>) -> &'a Var<'a> {
        self.var(
            span,
            name.unwrap_or(Symbol::ERROR),
            self.error_type_ref(span),
            ScopeSet::default(),
            VarKind::ErrorHandler,
            None,
            0,
            None,
        )
    }

    // ----- functions --------------------------------------------------------

    pub fn create_function(
        &self,
        span: Span,
        return_type: &'a TypeRef<'a>,
        name: Symbol,
        scopes: ScopeSet,
        params: Vec<&'a Var<'a>>,
        kind: FunctionKind,
        comment: Option<Symbol>,
    ) -> &'a Function<'a> {
        assert!(name != Symbol::EMPTY, "function name must not be empty");
        self.arena.alloc(Function {
            span,
            name,
            return_type,
            params: self.arena.alloc_slice(params),
            error_handler: self.create_error_handler(span),
            scopes,
            kind,
            body: Cell::new(None),
            locals: Cell::new(self.arena.alloc_slice(Vec::<&'a Var<'a>>::new())),
            class: Cell::new(None),
            module_id: Cell::new(0),
            comment,
        })
    }

    /// Attaches the parsed body and the flat locals vector.
    pub fn seal_function(
        &self,
        function: &'a Function<'a>,
        body: &'a Block<'a>,
        locals: Vec<&'a Var<'a>>,
    ) {
        function.body.set(Some(body));
        function.locals.set(self.arena.alloc_slice(locals));
    }

    // ----- classes and enums ------------------------------------------------

    #[allow(clippy::too_many_arguments)]
    pub fn create_class(
        &mut self,
        span: Span,
        kind: ClassKind,
        name: Symbol,
        scopes: ScopeSet,
        super_types: Vec<&'a TypeRef<'a>>,
        attributes: Vec<&'a Var<'a>>,
        methods: Vec<&'a Function<'a>>,
        constructors: Vec<&'a Function<'a>>,
        comment: Option<Symbol>,
    ) -> &'a Class<'a> {
        assert!(name != Symbol::EMPTY, "class name must not be empty");

        // The synthesised zero-argument constructor; dropped as soon as the
        // user declares one of their own.
        let default_constructor = if constructors.is_empty() && kind != ClassKind::Interface {
            let ctor = self.create_function(
                span,
                self.type_ref(span, TypeRefKind::Void),
                name,
                ScopeSet::public(),
                Vec::new(),
                FunctionKind::Constructor,
                None,
            );
            self.seal_function(ctor, self.block(span, Vec::new()), Vec::new());
            Some(ctor)
        } else {
            None
        };

        let id = self.next_class_id;
        self.next_class_id += 1;

        let class = self.arena.alloc(Class {
            span,
            name,
            kind,
            scopes,
            id,
            super_types: self.arena.alloc_slice(super_types),
            attributes: self.arena.alloc_slice(attributes),
            methods: self.arena.alloc_slice(methods),
            constructors: self.arena.alloc_slice(constructors),
            default_constructor,
            module_id: Cell::new(0),
            comment,
        });

        for attr in class.attributes {
            attr.owner_class.set(Some(class));
        }
        for method in class.methods {
            method.class.set(Some(class));
        }
        for ctor in class.constructors {
            ctor.class.set(Some(class));
        }
        if let Some(ctor) = class.default_constructor {
            ctor.class.set(Some(class));
        }
        class
    }

    pub fn create_enum(
        &mut self,
        span: Span,
        name: Symbol,
        scopes: ScopeSet,
        super_types: Vec<&'a TypeRef<'a>>,
        entries: Vec<(Symbol, Span, Option<Symbol>)>,
        comment: Option<Symbol>,
    ) -> &'a Enum<'a> {
        assert!(name != Symbol::EMPTY, "enum name must not be empty");

        let entry_vars: Vec<&'a Var<'a>> = entries
            .into_iter()
            .enumerate()
            .map(|(i, (entry_name, entry_span, entry_comment))| {
                let ty = self.type_ref(
                    entry_span,
                    TypeRefKind::Identity(self.single_path(name, span)),
                );
                self.var(
                    entry_span,
                    entry_name,
                    ty,
                    ScopeSet::public(),
                    VarKind::EnumEntry,
                    None,
                    i as u32 + 1,
                    entry_comment,
                )
            })
            .collect();

        let id = self.next_enum_id;
        self.next_enum_id += 1;

        let enm = self.arena.alloc(Enum {
            span,
            name,
            scopes,
            id,
            super_types: self.arena.alloc_slice(super_types),
            entries: self.arena.alloc_slice(entry_vars),
            module_id: Cell::new(0),
            comment,
        });
        for entry in enm.entries {
            entry.owner_enum.set(Some(enm));
        }
        enm
    }

    // ----- modules ----------------------------------------------------------

    pub fn create_module(&mut self, file: FileId, name: &str) -> Module<'a> {
        let id = self.next_module_id;
        self.next_module_id += 1;
        Module {
            id,
            file,
            name: name.to_string(),
            namespace: Symbol::DEFAULT_NS,
            definitions: Vec::new(),
            imports: Vec::new(),
            alias_imports: Vec::new(),
            global_vars: Vec::new(),
            functions: Vec::new(),
            identities: Vec::new(),
        }
    }

    pub fn create_import(
        &self,
        span: Span,
        name: Symbol,
        name_span: Span,
        alias: Option<Symbol>,
        alias_span: Option<Span>,
        comment: Option<Symbol>,
    ) -> &'a Import {
        assert!(name != Symbol::EMPTY, "import name must not be empty");
        self.arena.alloc(Import {
            span,
            name,
            name_span,
            alias,
            alias_span,
            comment,
            target_namespace: Cell::new(None),
        })
    }

    pub fn add_comment(&self, module: &mut Module<'a>, text: Symbol, span: Span) {
        module.definitions.push(Definition::Comment { text, span });
    }

    pub fn add_import(&self, module: &mut Module<'a>, import: &'a Import) {
        module.definitions.push(Definition::Import(import));
        module.imports.push(import);
        if import.alias.is_some() {
            module.alias_imports.push(import);
        }
    }

    pub fn add_global_var(&self, module: &mut Module<'a>, var: &'a Var<'a>) {
        var.module_id.set(module.id);
        module.definitions.push(Definition::GlobalVar(var));
        module.global_vars.push(var);
    }

    pub fn add_function(&self, module: &mut Module<'a>, function: &'a Function<'a>) {
        function.module_id.set(module.id);
        module.definitions.push(Definition::Function(function));
        module.functions.push(function);
    }

    pub fn add_class(&self, module: &mut Module<'a>, class: &'a Class<'a>) {
        class.module_id.set(module.id);
        for method in class.methods.iter().chain(class.constructors) {
            method.module_id.set(module.id);
        }
        module.definitions.push(Definition::Class(class));
        module.identities.push(Identity::Class(class));
    }

    pub fn add_enum(&self, module: &mut Module<'a>, enm: &'a Enum<'a>) {
        enm.module_id.set(module.id);
        module.definitions.push(Definition::Enum(enm));
        module.identities.push(Identity::Enum(enm));
    }

    /// Resolution targets for an identity, shared by resolver passes.
    pub fn identity_def(&self, identity: Identity<'a>) -> Def<'a> {
        match identity {
            Identity::Class(c) => Def::Class(c),
            Identity::Enum(e) => Def::Enum(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intern::Interner;

    #[test]
    fn module_ids_are_dense_and_monotonic() {
        let arena = Arena::new();
        let mut builder = AstBuilder::new(&arena);
        let a = builder.create_module(crate::source::FileId::default(), "a.vela");
        let b = builder.create_module(crate::source::FileId::default(), "b.vela");
        assert_eq!(a.id, 0);
        assert_eq!(b.id, 1);
    }

    #[test]
    fn primitive_types_are_shared() {
        let arena = Arena::new();
        let builder = AstBuilder::new(&arena);
        assert!(std::ptr::eq(
            builder.int_type(IntKind::Int),
            builder.int_type(IntKind::Int)
        ));
        assert!(!std::ptr::eq(
            builder.int_type(IntKind::Int),
            builder.int_type(IntKind::Long)
        ));
    }

    #[test]
    fn functions_get_a_hidden_error_handler() {
        let arena = Arena::new();
        let mut interner = Interner::new();
        let builder = AstBuilder::new(&arena);
        let name = interner.intern("f");
        let ret = builder.type_ref(Span::default(), TypeRefKind::Void);
        let f = builder.create_function(
            Span::default(),
            ret,
            name,
            ScopeSet::default(),
            Vec::new(),
            FunctionKind::Free,
            None,
        );
        assert_eq!(f.error_handler.name, builder.error_symbol());
        assert_eq!(f.error_handler.kind, VarKind::ErrorHandler);
        assert_eq!(f.error_handler.ty.ty(), Some(builder.error_type()));
    }

    #[test]
    fn class_without_constructor_gets_default() {
        let arena = Arena::new();
        let mut interner = Interner::new();
        let mut builder = AstBuilder::new(&arena);
        let name = interner.intern("Point");
        let class = builder.create_class(
            Span::default(),
            ClassKind::Class,
            name,
            ScopeSet::default(),
            Vec::new(),
            Vec::new(),
            Vec::new(),
            Vec::new(),
            None,
        );
        let ctor = class.default_constructor.expect("default constructor");
        assert_eq!(ctor.name, name);
        assert_eq!(ctor.kind, FunctionKind::Constructor);
        assert_eq!(ctor.arity(), 0);
        assert!(std::ptr::eq(ctor.class.get().unwrap(), class));
    }

    #[test]
    fn user_constructor_removes_default() {
        let arena = Arena::new();
        let mut interner = Interner::new();
        let mut builder = AstBuilder::new(&arena);
        let name = interner.intern("Point");
        let ret = builder.type_ref(Span::default(), TypeRefKind::Void);
        let ctor = builder.create_function(
            Span::default(),
            ret,
            name,
            ScopeSet::public(),
            Vec::new(),
            FunctionKind::Constructor,
            None,
        );
        let class = builder.create_class(
            Span::default(),
            ClassKind::Class,
            name,
            ScopeSet::default(),
            Vec::new(),
            Vec::new(),
            Vec::new(),
            vec![ctor],
            None,
        );
        assert!(class.default_constructor.is_none());
        assert_eq!(class.constructors.len(), 1);
    }

    #[test]
    fn interfaces_get_no_default_constructor() {
        let arena = Arena::new();
        let mut interner = Interner::new();
        let mut builder = AstBuilder::new(&arena);
        let name = interner.intern("Shape");
        let class = builder.create_class(
            Span::default(),
            ClassKind::Interface,
            name,
            ScopeSet::default(),
            Vec::new(),
            Vec::new(),
            Vec::new(),
            Vec::new(),
            None,
        );
        assert!(class.default_constructor.is_none());
    }

    #[test]
    fn enum_entries_are_one_based() {
        let arena = Arena::new();
        let mut interner = Interner::new();
        let mut builder = AstBuilder::new(&arena);
        let name = interner.intern("Color");
        let red = interner.intern("RED");
        let green = interner.intern("GREEN");
        let enm = builder.create_enum(
            Span::default(),
            name,
            ScopeSet::default(),
            Vec::new(),
            vec![(red, Span::default(), None), (green, Span::default(), None)],
            None,
        );
        assert_eq!(enm.entries.len(), 2);
        assert_eq!(enm.entries[0].index, 1);
        assert_eq!(enm.entries[1].index, 2);
        assert_eq!(enm.entry(green).unwrap().index, 2);
        assert!(std::ptr::eq(
            enm.entries[0].owner_enum.get().unwrap(),
            enm
        ));
    }

    #[test]
    fn block_links_children_to_parent() {
        let arena = Arena::new();
        let builder = AstBuilder::new(&arena);
        let s1 = builder.break_stmt(Span::default());
        let s2 = builder.continue_stmt(Span::default());
        let block = builder.block(Span::default(), vec![s1, s2]);
        assert!(std::ptr::eq(s1.parent.get().unwrap(), block));
        assert!(std::ptr::eq(s2.parent.get().unwrap(), block));
    }
}
