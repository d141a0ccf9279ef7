//! Name resolution.
//!
//! Runs after every module of the working set is parsed, in module-id
//! order. Assembles namespaces, resolves imports and identity types, links
//! inheritance (copying members down), resolves every function body over a
//! scope stack, selects overloads, and wires the hidden error-handler
//! parameter into every call.
//!
//! The resolver writes only through the annotation cells the AST provides
//! and through the symbol-table insertion API.

use crate::ast::builder::AstBuilder;
use crate::ast::decl::{Class, ClassKind, Def, Function, Var, VarKind};
use crate::ast::expr::{Call, Expr, ExprKind, Path, PathSeg, VarRef};
use crate::ast::module::{Identity, Module, ModuleSet, Namespace};
use crate::ast::stmt::{Block, Stmt, StmtKind};
use crate::ast::types::{Type, TypeRef, TypeRefKind};
use crate::diag::{DiagKind, Diags};
use crate::intern::{Interner, Symbol};
use crate::sema::convert;
use crate::sema::scope::ScopeStack;
use crate::sema::symbols::SymbolTable;
use indexmap::IndexMap;

/// Entry point: resolve the whole module set and return the populated
/// symbol table.
pub fn resolve<'a>(
    set: &mut ModuleSet<'a>,
    builder: &AstBuilder<'a>,
    interner: &Interner,
    diags: &mut Diags<'_>,
) -> SymbolTable<'a> {
    assemble_namespaces(set);
    let mut resolver = Resolver {
        builder,
        interner,
        diags,
        symbols: SymbolTable::new(),
        link_state: IndexMap::new(),
    };
    resolver.run(set);
    resolver.symbols
}

/// Attach every module to its namespace, creating namespaces on first use.
fn assemble_namespaces(set: &mut ModuleSet<'_>) {
    for i in 0..set.modules.len() {
        let (id, ns_name) = (set.modules[i].id, set.modules[i].namespace);
        set.namespaces
            .entry(ns_name)
            .or_insert_with(|| Namespace {
                name: ns_name,
                modules: Vec::new(),
            })
            .modules
            .push(id);
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum LinkState {
    Visiting,
    Done,
}

struct Resolver<'a, 'b, 'd> {
    builder: &'b AstBuilder<'a>,
    interner: &'b Interner,
    diags: &'b mut Diags<'d>,
    symbols: SymbolTable<'a>,
    link_state: IndexMap<u32, LinkState>,
}

/// Per-body resolution context: the lexical environment of the statement
/// being resolved.
struct BodyCx<'a, 'm> {
    module: &'m Module<'a>,
    class: Option<&'a Class<'a>>,
    scopes: ScopeStack<'a>,
    /// Innermost error variable last; index 0 is the function's hidden
    /// parameter.
    handlers: Vec<&'a Var<'a>>,
}

impl<'a, 'm> BodyCx<'a, 'm> {
    fn current_handler(&self) -> Option<&'a Var<'a>> {
        self.handlers.last().copied()
    }
}

impl<'a, 'b, 'd> Resolver<'a, 'b, 'd> {
    fn run(&mut self, set: &ModuleSet<'a>) {
        self.register_symbols(set);
        self.resolve_imports(set);
        self.resolve_signatures(set);
        self.link_inheritance(set);
        self.resolve_bodies(set);
    }

    fn name(&self, sym: Symbol) -> String {
        self.interner.resolve(sym).to_string()
    }

    fn path_name(&self, path: &Path<'a>) -> String {
        path.segments
            .iter()
            .map(|seg| self.interner.resolve(seg.name))
            .collect::<Vec<_>>()
            .join(".")
    }

    // ----- phase 1: symbol registration -------------------------------------

    fn register_symbols(&mut self, set: &ModuleSet<'a>) {
        for module in set.iter() {
            for &var in &module.global_vars {
                if self
                    .symbols
                    .namespace_mut(module.namespace)
                    .insert_global(var)
                    .is_err()
                {
                    self.diags.report(
                        var.span,
                        DiagKind::DuplicateDecl {
                            name: self.interner.resolve(var.name).to_string(),
                        },
                    );
                }
            }
            for &function in &module.functions {
                if self
                    .symbols
                    .namespace_mut(module.namespace)
                    .insert_function(function)
                    .is_err()
                {
                    self.diags.report(
                        function.span,
                        DiagKind::DuplicateDecl {
                            name: self.interner.resolve(function.name).to_string(),
                        },
                    );
                }
            }
            for &identity in &module.identities {
                if self
                    .symbols
                    .namespace_mut(module.namespace)
                    .insert_identity(identity)
                    .is_err()
                {
                    self.diags.report(
                        identity.span(),
                        DiagKind::DuplicateDecl {
                            name: self.interner.resolve(identity.name()).to_string(),
                        },
                    );
                }
                if let Identity::Class(class) = identity {
                    self.register_class_members(class);
                }
            }
            for &import in &module.imports {
                if self
                    .symbols
                    .module_mut(module.id)
                    .insert_import(import)
                    .is_err()
                {
                    self.diags.report(
                        import.span,
                        DiagKind::DuplicateDecl {
                            name: self.interner.resolve(import.local_name()).to_string(),
                        },
                    );
                }
            }
        }
    }

    fn register_class_members(&mut self, class: &'a Class<'a>) {
        for &attr in class.attributes {
            if self
                .symbols
                .class_mut(class.id)
                .insert_attribute(attr)
                .is_err()
            {
                self.diags.report(
                    attr.span,
                    DiagKind::DuplicateDecl {
                        name: self.interner.resolve(attr.name).to_string(),
                    },
                );
            }
        }
        for &method in class.methods {
            if self
                .symbols
                .class_mut(class.id)
                .insert_method(method)
                .is_err()
            {
                self.diags.report(
                    method.span,
                    DiagKind::DuplicateDecl {
                        name: self.interner.resolve(method.name).to_string(),
                    },
                );
            }
        }
        for &ctor in class.constructors {
            self.symbols.class_mut(class.id).insert_constructor(ctor);
        }
        if let Some(ctor) = class.default_constructor {
            self.symbols.class_mut(class.id).insert_constructor(ctor);
        }
    }

    // ----- phase 2: imports -------------------------------------------------

    fn resolve_imports(&mut self, set: &ModuleSet<'a>) {
        for module in set.iter() {
            for &import in &module.imports {
                if set.namespaces.contains_key(&import.name) {
                    import.target_namespace.set(Some(import.name));
                } else {
                    self.diags.report(
                        import.name_span,
                        DiagKind::UnresolvedRef {
                            name: self.interner.resolve(import.name).to_string(),
                        },
                    );
                }
            }
        }
    }

    // ----- phase 3: identity resolution over signatures ---------------------

    fn resolve_signatures(&mut self, set: &ModuleSet<'a>) {
        for module in set.iter() {
            for &var in &module.global_vars {
                self.resolve_type_ref(module, var.ty);
            }
            for &function in &module.functions {
                self.resolve_function_signature(module, function);
            }
            for &identity in &module.identities {
                match identity {
                    Identity::Class(class) => {
                        for &sup in class.super_types {
                            self.resolve_type_ref(module, sup);
                        }
                        for &attr in class.attributes {
                            self.resolve_type_ref(module, attr.ty);
                        }
                        for &method in class.methods {
                            self.resolve_function_signature(module, method);
                        }
                        for &ctor in class.constructors {
                            self.resolve_function_signature(module, ctor);
                        }
                        if let Some(ctor) = class.default_constructor {
                            self.resolve_function_signature(module, ctor);
                        }
                    }
                    Identity::Enum(enm) => {
                        for &sup in enm.super_types {
                            self.resolve_type_ref(module, sup);
                        }
                        for &entry in enm.entries {
                            self.resolve_type_ref(module, entry.ty);
                        }
                    }
                }
            }
        }
    }

    fn resolve_function_signature(&mut self, module: &Module<'a>, function: &'a Function<'a>) {
        self.resolve_type_ref(module, function.return_type);
        for &param in function.params {
            self.resolve_type_ref(module, param.ty);
        }
    }

    fn resolve_type_ref(
        &mut self,
        module: &Module<'a>,
        type_ref: &'a TypeRef<'a>,
    ) -> Option<&'a Type<'a>> {
        if let Some(ty) = type_ref.resolved.get() {
            return Some(ty);
        }
        let ty = match &type_ref.kind {
            TypeRefKind::Bool => self.builder.bool_type(),
            TypeRefKind::Char => self.builder.char_type(),
            TypeRefKind::String => self.builder.string_type(),
            TypeRefKind::Void => self.builder.void_type(),
            TypeRefKind::Error => self.builder.error_type(),
            TypeRefKind::Int(kind) => self.builder.int_type(*kind),
            TypeRefKind::Float(kind) => self.builder.float_type(*kind),
            TypeRefKind::Array { elem, size } => {
                let elem_ty = self.resolve_type_ref(module, elem)?;
                let size = match size {
                    None => 0,
                    Some(expr) => self.const_array_size(module, expr),
                };
                self.builder.array_type(elem_ty, size)
            }
            TypeRefKind::Identity(path) => {
                let identity = self.resolve_identity_path(module, path)?;
                match identity {
                    Identity::Class(c) => self.builder.class_type(c),
                    Identity::Enum(e) => self.builder.enum_type(e),
                }
            }
        };
        type_ref.resolved.set(Some(ty));
        Some(ty)
    }

    /// Array sizes are integer literals or references to constant globals
    /// with literal initializers.
    fn const_array_size(&mut self, module: &Module<'a>, expr: &'a Expr<'a>) -> u64 {
        if let Some(value) = self.try_const_size(module, expr) {
            return value;
        }
        self.diags.report(
            expr.span,
            DiagKind::TypeMismatch {
                expected: "constant array size".to_string(),
                found: "non-constant expression".to_string(),
            },
        );
        0
    }

    fn try_const_size(&mut self, module: &Module<'a>, expr: &'a Expr<'a>) -> Option<u64> {
        match &expr.kind {
            ExprKind::Value(crate::ast::expr::Value::Int { value, .. }) => Some(*value),
            ExprKind::VarRef(var_ref) => {
                let name = var_ref.path.single()?;
                let var = self.symbols.namespace(module.namespace)?.global(name)?;
                if !var.is_constant() {
                    return None;
                }
                var_ref.def.set(Some(Def::Var(var)));
                let init = var.init?;
                self.try_const_size(module, init)
            }
            _ => None,
        }
    }

    /// Identity lookup: current namespace first, then each imported
    /// namespace in import order; a leading alias or import name
    /// dereferences locally to a namespace.
    fn resolve_identity_path(
        &mut self,
        module: &Module<'a>,
        path: &Path<'a>,
    ) -> Option<Identity<'a>> {
        let found = match path.segments {
            [single] => self.lookup_identity(module, single.name),
            [qualifier, name] => self
                .imported_namespace(module, qualifier.name)
                .and_then(|ns_name| {
                    self.symbols
                        .namespace(ns_name)
                        .and_then(|ns| ns.identity(name.name))
                }),
            _ => None,
        };
        if found.is_none() {
            self.diags.report(
                path.span,
                DiagKind::UnresolvedRef {
                    name: self.path_name(path),
                },
            );
        }
        found
    }

    fn lookup_identity(&self, module: &Module<'a>, name: Symbol) -> Option<Identity<'a>> {
        if let Some(identity) = self
            .symbols
            .namespace(module.namespace)
            .and_then(|ns| ns.identity(name))
        {
            return Some(identity);
        }
        for &import in &module.imports {
            let Some(target) = import.target_namespace.get() else {
                continue;
            };
            if let Some(identity) = self
                .symbols
                .namespace(target)
                .and_then(|ns| ns.identity(name))
            {
                return Some(identity);
            }
        }
        None
    }

    /// The namespace an import (by declared name or alias) makes reachable
    /// in this module.
    fn imported_namespace(&self, module: &Module<'a>, local_name: Symbol) -> Option<Symbol> {
        self.symbols
            .module(module.id)
            .and_then(|m| m.import(local_name))
            .and_then(|import| import.target_namespace.get())
    }

    // ----- phase 4: inheritance linking -------------------------------------

    fn link_inheritance(&mut self, set: &ModuleSet<'a>) {
        for module in set.iter() {
            for &identity in &module.identities {
                if let Identity::Class(class) = identity {
                    self.link_class(class);
                }
            }
        }
    }

    fn link_class(&mut self, class: &'a Class<'a>) {
        if self.link_state.get(&class.id) == Some(&LinkState::Done) {
            return;
        }
        self.link_state.insert(class.id, LinkState::Visiting);

        let mut chain: Vec<&'a Class<'a>> = vec![class];
        for &sup_ref in class.super_types {
            let Some(Type::Class(sup)) = sup_ref.resolved.get() else {
                continue;
            };
            match self.link_state.get(&sup.id) {
                Some(LinkState::Visiting) => {
                    // Back edge: report on both ends of the cycle and stop
                    // descending so a two-module cycle cannot overflow.
                    self.diags.report(
                        sup_ref.span,
                        DiagKind::InheritanceCycle {
                            class: self.name(class.name),
                        },
                    );
                    self.diags.report(
                        sup.span,
                        DiagKind::InheritanceCycle {
                            class: self.name(sup.name),
                        },
                    );
                    continue;
                }
                Some(LinkState::Done) => {}
                None => self.link_class(sup),
            }
            for &inherited in self.symbols.hierarchy(sup.id) {
                if !chain.iter().any(|c| std::ptr::eq(*c, inherited)) {
                    chain.push(inherited);
                }
            }
        }

        self.link_state.insert(class.id, LinkState::Done);
        self.copy_inherited_members(class, &chain);
        self.symbols.set_hierarchy(class.id, chain);
    }

    /// Copy-down: attributes (and concrete methods) from struct and class
    /// supers, virtual method signatures from interfaces. Name conflicts
    /// are flagged; an interface signature the class implements itself is
    /// not copied.
    fn copy_inherited_members(&mut self, class: &'a Class<'a>, chain: &[&'a Class<'a>]) {
        for &sup in &chain[1..] {
            match sup.kind {
                ClassKind::Struct | ClassKind::Class => {
                    for &attr in sup.attributes {
                        if self
                            .symbols
                            .class_mut(class.id)
                            .insert_attribute(attr)
                            .is_err()
                        {
                            self.diags.report(
                                class.span,
                                DiagKind::DuplicateDecl {
                                    name: self.interner.resolve(attr.name).to_string(),
                                },
                            );
                        }
                    }
                    for &method in sup.methods {
                        if !class_implements(class, method) {
                            let _ = self.symbols.class_mut(class.id).insert_method(method);
                        }
                    }
                }
                ClassKind::Interface => {
                    for &method in sup.methods {
                        if !class_implements(class, method) {
                            let _ = self.symbols.class_mut(class.id).insert_method(method);
                        }
                    }
                }
            }
        }
    }

    // ----- phase 5: bodies --------------------------------------------------

    fn resolve_bodies(&mut self, set: &ModuleSet<'a>) {
        for module in set.iter() {
            for &var in &module.global_vars {
                if let Some(init) = var.init {
                    let mut cx = BodyCx {
                        module,
                        class: None,
                        scopes: ScopeStack::new(),
                        handlers: Vec::new(),
                    };
                    self.resolve_expr(&mut cx, init);
                }
            }
            for &function in &module.functions {
                self.resolve_function_body(module, function, None);
            }
            for &identity in &module.identities {
                if let Identity::Class(class) = identity {
                    for &attr in class.attributes {
                        if let Some(init) = attr.init {
                            let mut cx = BodyCx {
                                module,
                                class: Some(class),
                                scopes: ScopeStack::new(),
                                handlers: Vec::new(),
                            };
                            self.resolve_expr(&mut cx, init);
                        }
                    }
                    for &ctor in class.constructors {
                        self.resolve_function_body(module, ctor, Some(class));
                    }
                    for &method in class.methods {
                        self.resolve_function_body(module, method, Some(class));
                    }
                }
            }
        }
    }

    fn resolve_function_body(
        &mut self,
        module: &Module<'a>,
        function: &'a Function<'a>,
        class: Option<&'a Class<'a>>,
    ) {
        let Some(body) = function.body.get() else {
            return;
        };
        let mut cx = BodyCx {
            module,
            class,
            scopes: ScopeStack::new(),
            handlers: vec![function.error_handler],
        };
        cx.scopes.push();
        for &param in function.params {
            if cx.scopes.lookup(param.name).is_some() {
                self.diags.report(
                    param.span,
                    DiagKind::DuplicateDecl {
                        name: self.interner.resolve(param.name).to_string(),
                    },
                );
            }
            cx.scopes.declare(param.name, param);
        }
        cx.scopes
            .declare(function.error_handler.name, function.error_handler);
        self.resolve_block(&mut cx, body);
        cx.scopes.pop();
    }

    fn resolve_block(&mut self, cx: &mut BodyCx<'a, '_>, block: &'a Block<'a>) {
        cx.scopes.push();
        for stmt in block.iter() {
            self.resolve_stmt(cx, stmt);
        }
        cx.scopes.pop();
    }

    fn resolve_stmt(&mut self, cx: &mut BodyCx<'a, '_>, stmt: &'a Stmt<'a>) {
        match &stmt.kind {
            StmtKind::VarDecl(var) => {
                self.resolve_type_ref(cx.module, var.ty);
                if let Some(init) = var.init {
                    self.resolve_expr(cx, init);
                }
                // Locals are unique along the chain up to the function
                // scope; the hidden error variables may shadow each other.
                if var.kind != VarKind::ErrorHandler && cx.scopes.lookup(var.name).is_some() {
                    self.diags.report(
                        var.span,
                        DiagKind::DuplicateDecl {
                            name: self.interner.resolve(var.name).to_string(),
                        },
                    );
                }
                cx.scopes.declare(var.name, var);
            }
            StmtKind::Assign(assign) => {
                self.resolve_var_ref(cx, assign.target);
                self.resolve_expr(cx, assign.value);
            }
            StmtKind::Expr(expr) => {
                self.resolve_expr(cx, expr);
            }
            StmtKind::Return(value) => {
                if let Some(expr) = value {
                    self.resolve_expr(cx, expr);
                }
            }
            StmtKind::Fail(fail) => {
                if let Some(payload) = fail.payload {
                    self.resolve_expr(cx, payload);
                }
                fail.handler.set(cx.current_handler());
            }
            StmtKind::Break | StmtKind::Continue => {}
            StmtKind::Delete(target) => {
                self.resolve_var_ref(cx, target);
            }
            StmtKind::Block(block) => {
                self.resolve_block(cx, block);
            }
            StmtKind::If(if_stmt) => {
                self.resolve_expr(cx, if_stmt.cond);
                cx.scopes.push();
                self.resolve_stmt(cx, if_stmt.then_stmt);
                cx.scopes.pop();
                for elsif in if_stmt.elsifs {
                    self.resolve_expr(cx, elsif.cond);
                    cx.scopes.push();
                    self.resolve_stmt(cx, elsif.stmt);
                    cx.scopes.pop();
                }
                if let Some(else_stmt) = if_stmt.else_stmt {
                    cx.scopes.push();
                    self.resolve_stmt(cx, else_stmt);
                    cx.scopes.pop();
                }
            }
            StmtKind::Switch(switch) => {
                self.resolve_expr(cx, switch.scrutinee);
                for case in switch.cases {
                    self.resolve_expr(cx, case.value);
                    self.resolve_block(cx, case.block);
                }
                if let Some(default) = switch.default {
                    self.resolve_block(cx, default);
                }
            }
            StmtKind::Loop(loop_stmt) => {
                // Init declarations are visible in the condition, post
                // step, and body.
                cx.scopes.push();
                if let Some(init) = loop_stmt.init {
                    for init_stmt in init.iter() {
                        self.resolve_stmt(cx, init_stmt);
                    }
                }
                if let Some(cond) = loop_stmt.cond {
                    self.resolve_expr(cx, cond);
                }
                if let Some(post) = loop_stmt.post {
                    for post_stmt in post.iter() {
                        self.resolve_stmt(cx, post_stmt);
                    }
                }
                self.resolve_stmt(cx, loop_stmt.body);
                cx.scopes.pop();
            }
            StmtKind::Handle(handle) => {
                // The fresh error variable lives in the enclosing scope so
                // the binding form can be inspected after the block.
                cx.scopes.declare(handle.error_var.name, handle.error_var);
                cx.handlers.push(handle.error_var);
                self.resolve_block(cx, handle.block);
                cx.handlers.pop();
            }
        }
    }

    fn resolve_expr(&mut self, cx: &mut BodyCx<'a, '_>, expr: &'a Expr<'a>) -> Option<&'a Type<'a>> {
        let ty = match &expr.kind {
            ExprKind::Value(value) => Some(self.value_type(value)),
            ExprKind::VarRef(var_ref) => self
                .resolve_var_ref(cx, var_ref)
                .and_then(|def| def.as_var())
                .and_then(|var| var.ty.ty()),
            ExprKind::Call(call) => self.resolve_call(cx, call),
            ExprKind::Unary { op, operand } => {
                let operand_ty = self.resolve_expr(cx, operand);
                match op {
                    crate::ast::expr::UnaryOp::Not => Some(self.builder.bool_type()),
                    _ => operand_ty,
                }
            }
            ExprKind::Binary { op, left, right } => {
                let left_ty = self.resolve_expr(cx, left);
                let right_ty = self.resolve_expr(cx, right);
                self.binary_result(*op, left_ty, right_ty)
            }
            ExprKind::Ternary {
                cond,
                then_expr,
                else_expr,
            } => {
                self.resolve_expr(cx, cond);
                let then_ty = self.resolve_expr(cx, then_expr);
                self.resolve_expr(cx, else_expr);
                then_ty
            }
            ExprKind::Index { base, index } => {
                let base_ty = self.resolve_expr(cx, base);
                self.resolve_expr(cx, index);
                match base_ty {
                    Some(Type::Array { elem, .. }) => Some(*elem),
                    _ => None,
                }
            }
        };
        expr.ty.set(ty);
        ty
    }

    fn value_type(&self, value: &crate::ast::expr::Value) -> &'a Type<'a> {
        use crate::ast::expr::Value;
        use crate::ast::types::{FloatKind, IntKind};
        match value {
            Value::Bool(_) => self.builder.bool_type(),
            Value::Char(_) => self.builder.char_type(),
            Value::Str(_) => self.builder.string_type(),
            Value::Null => self.builder.null_type(),
            Value::Float(_) => self.builder.float_type(FloatKind::Double),
            Value::Int { value, unsigned } => {
                if *unsigned {
                    if *value <= u32::MAX as u64 {
                        self.builder.int_type(IntKind::Uint)
                    } else {
                        self.builder.int_type(IntKind::Ulong)
                    }
                } else if *value <= i32::MAX as u64 {
                    self.builder.int_type(IntKind::Int)
                } else if *value <= i64::MAX as u64 {
                    self.builder.int_type(IntKind::Long)
                } else {
                    self.builder.int_type(IntKind::Ulong)
                }
            }
        }
    }

    fn binary_result(
        &self,
        op: crate::ast::expr::BinaryOp,
        left: Option<&'a Type<'a>>,
        right: Option<&'a Type<'a>>,
    ) -> Option<&'a Type<'a>> {
        use crate::ast::expr::BinaryOp;
        match op {
            op if op.is_logical() || op.is_comparison() || op.is_equality() => {
                Some(self.builder.bool_type())
            }
            BinaryOp::Shl | BinaryOp::Shr => left,
            op if op.is_arithmetic() => convert::wider_numeric(left?, right?).or(left),
            _ => {
                // Remaining bitwise ops take the wider integer operand.
                convert::wider_numeric(left?, right?).or(left)
            }
        }
    }

    // ----- references -------------------------------------------------------

    fn resolve_var_ref(&mut self, cx: &mut BodyCx<'a, '_>, var_ref: &'a VarRef<'a>) -> Option<Def<'a>> {
        if let Some(def) = var_ref.def.get() {
            return Some(def);
        }
        let def = self.resolve_segments(cx, var_ref.path.segments);
        var_ref.def.set(def);
        def
    }

    /// Resolve a dotted path: head innermost-first, then each further
    /// segment against the member table of what came before.
    fn resolve_segments(&mut self, cx: &mut BodyCx<'a, '_>, segments: &[PathSeg]) -> Option<Def<'a>> {
        let (mut def, consumed) = self.resolve_head(cx, segments)?;
        for seg in &segments[consumed..] {
            def = self.member_of(def, *seg)?;
        }
        Some(def)
    }

    /// Resolve the head of a path: block chain, enclosing class members,
    /// namespace globals, identities, then imports as qualifiers.
    fn resolve_head(
        &mut self,
        cx: &mut BodyCx<'a, '_>,
        segments: &[PathSeg],
    ) -> Option<(Def<'a>, usize)> {
        let head = segments[0];

        if let Some(var) = cx.scopes.lookup(head.name) {
            return Some((Def::Var(var), 1));
        }
        if let Some(class) = cx.class {
            if let Some(attr) = self
                .symbols
                .class(class.id)
                .and_then(|c| c.attribute(head.name))
            {
                return Some((Def::Var(attr), 1));
            }
        }
        if let Some(var) = self
            .symbols
            .namespace(cx.module.namespace)
            .and_then(|ns| ns.global(head.name))
        {
            return Some((Def::Var(var), 1));
        }
        if let Some(identity) = self.lookup_identity(cx.module, head.name) {
            return Some((self.builder.identity_def(identity), 1));
        }
        if let Some(ns_name) = self.imported_namespace(cx.module, head.name) {
            if segments.len() < 2 {
                self.report_unresolved(head);
                return None;
            }
            let next = segments[1];
            let ns = self.symbols.namespace(ns_name);
            if let Some(var) = ns.and_then(|ns| ns.global(next.name)) {
                return Some((Def::Var(var), 2));
            }
            if let Some(identity) = ns.and_then(|ns| ns.identity(next.name)) {
                return Some((self.builder.identity_def(identity), 2));
            }
            self.report_unresolved(next);
            return None;
        }

        self.report_unresolved(head);
        None
    }

    /// One `.segment` step on an already-resolved prefix.
    fn member_of(&mut self, def: Def<'a>, seg: PathSeg) -> Option<Def<'a>> {
        let next = match def {
            Def::Var(var) => match var.ty.ty() {
                Some(Type::Class(class)) => self
                    .symbols
                    .class(class.id)
                    .and_then(|c| c.attribute(seg.name))
                    .map(Def::Var),
                _ => None,
            },
            Def::Class(class) => self
                .symbols
                .class(class.id)
                .and_then(|c| c.attribute(seg.name))
                .map(Def::Var),
            Def::Enum(enm) => enm.entry(seg.name).map(Def::Var),
            Def::Function(_) => None,
        };
        if next.is_none() {
            self.report_unresolved(seg);
        }
        next
    }

    fn report_unresolved(&mut self, seg: PathSeg) {
        self.diags.report(
            seg.span,
            DiagKind::UnresolvedRef {
                name: self.interner.resolve(seg.name).to_string(),
            },
        );
    }

    // ----- calls ------------------------------------------------------------

    fn resolve_call(&mut self, cx: &mut BodyCx<'a, '_>, call: &'a Call<'a>) -> Option<&'a Type<'a>> {
        let arg_types: Vec<Option<&'a Type<'a>>> = call
            .args
            .iter()
            .map(|arg| self.resolve_expr(cx, arg))
            .collect();

        // Every call reads the enclosing error variable and passes it as
        // the implicit first argument.
        call.error_handler.set(cx.current_handler());

        if call.constructor {
            return self.resolve_constructor_call(cx, call, &arg_types);
        }

        let segments = call.path.segments;
        let callee = *segments.last().expect("call path is non-empty");

        if segments.len() == 1 {
            // Methods of the enclosing class shadow namespace functions.
            if let Some(class) = cx.class {
                let candidates: Vec<&'a Function<'a>> = self
                    .symbols
                    .class(class.id)
                    .and_then(|c| c.methods(callee.name))
                    .map(|set| set.with_arity(call.arity()).collect())
                    .unwrap_or_default();
                if !candidates.is_empty()
                    || self
                        .symbols
                        .class(class.id)
                        .and_then(|c| c.methods(callee.name))
                        .is_some()
                {
                    let target = self.select_overload(callee, &candidates, &arg_types)?;
                    call.target.set(Some(target));
                    return target.return_type.ty();
                }
            }
            let candidates = self.function_candidates(cx.module, callee.name, call.arity());
            let target = self.select_overload(callee, &candidates, &arg_types)?;
            call.target.set(Some(target));
            return target.return_type.ty();
        }

        // Namespace-qualified free function: `ns.f(..)`.
        if segments.len() == 2 {
            if let Some(ns_name) = self.imported_namespace(cx.module, segments[0].name) {
                let candidates: Vec<&'a Function<'a>> = self
                    .symbols
                    .namespace(ns_name)
                    .and_then(|ns| ns.functions(callee.name))
                    .map(|set| set.with_arity(call.arity()).collect())
                    .unwrap_or_default();
                let target = self.select_overload(callee, &candidates, &arg_types)?;
                call.target.set(Some(target));
                return target.return_type.ty();
            }
        }

        // Method call through a receiver chain: `obj.m(..)`, `a.b.m(..)`.
        let receiver = self.resolve_segments(cx, &segments[..segments.len() - 1])?;
        let receiver_class = match receiver {
            Def::Var(var) => match var.ty.ty() {
                Some(Type::Class(class)) => Some(*class),
                _ => None,
            },
            _ => None,
        };
        let Some(class) = receiver_class else {
            self.report_unresolved(callee);
            return None;
        };
        call.receiver.set(Some(receiver));
        let candidates: Vec<&'a Function<'a>> = self
            .symbols
            .class(class.id)
            .and_then(|c| c.methods(callee.name))
            .map(|set| set.with_arity(call.arity()).collect())
            .unwrap_or_default();
        let target = self.select_overload(callee, &candidates, &arg_types)?;
        call.target.set(Some(target));
        target.return_type.ty()
    }

    fn resolve_constructor_call(
        &mut self,
        cx: &mut BodyCx<'a, '_>,
        call: &'a Call<'a>,
        arg_types: &[Option<&'a Type<'a>>],
    ) -> Option<&'a Type<'a>> {
        let identity = self.resolve_identity_path(cx.module, &call.path)?;
        let class = match identity {
            Identity::Class(class) => class,
            Identity::Enum(enm) => {
                self.diags.report(
                    call.path.span,
                    DiagKind::TypeMismatch {
                        expected: "class".to_string(),
                        found: format!("enum {}", self.name(enm.name)),
                    },
                );
                return None;
            }
        };
        let callee = call.path.last();
        let candidates: Vec<&'a Function<'a>> = self
            .symbols
            .class(class.id)
            .map(|c| c.constructors().with_arity(call.arity()).collect())
            .unwrap_or_default();
        let target = self.select_overload(callee, &candidates, arg_types)?;
        call.target.set(Some(target));
        Some(self.builder.class_type(class))
    }

    /// Namespace function candidates: the current namespace first, then
    /// imported namespaces in import order; the first set that knows the
    /// name wins.
    fn function_candidates(
        &self,
        module: &Module<'a>,
        name: Symbol,
        arity: usize,
    ) -> Vec<&'a Function<'a>> {
        if let Some(set) = self
            .symbols
            .namespace(module.namespace)
            .and_then(|ns| ns.functions(name))
        {
            return set.with_arity(arity).collect();
        }
        for &import in &module.imports {
            let Some(target) = import.target_namespace.get() else {
                continue;
            };
            if let Some(set) = self
                .symbols
                .namespace(target)
                .and_then(|ns| ns.functions(name))
            {
                return set.with_arity(arity).collect();
            }
        }
        Vec::new()
    }

    /// Pick the candidate whose parameter list is compatible with the
    /// argument types at the lowest total conversion cost. A cost tie
    /// between two candidates is a hard ambiguity error.
    fn select_overload(
        &mut self,
        callee: PathSeg,
        candidates: &[&'a Function<'a>],
        arg_types: &[Option<&'a Type<'a>>],
    ) -> Option<&'a Function<'a>> {
        let mut best: Option<(&'a Function<'a>, u32)> = None;
        let mut ambiguous = false;

        'candidates: for &candidate in candidates {
            let mut total = 0u32;
            for (param, arg_ty) in candidate.params.iter().zip(arg_types) {
                let Some(arg_ty) = arg_ty else {
                    // The argument already failed to type; accept so one
                    // error does not cascade.
                    continue;
                };
                let Some(param_ty) = param.ty.ty() else {
                    continue;
                };
                match convert::conversion(arg_ty, param_ty) {
                    Some((cost, _)) => total += cost,
                    None => continue 'candidates,
                }
            }
            match best {
                None => best = Some((candidate, total)),
                Some((_, best_cost)) if total < best_cost => {
                    best = Some((candidate, total));
                    ambiguous = false;
                }
                Some((_, best_cost)) if total == best_cost => ambiguous = true,
                Some(_) => {}
            }
        }

        if ambiguous {
            self.diags.report(
                callee.span,
                DiagKind::OverloadAmbiguity {
                    name: self.interner.resolve(callee.name).to_string(),
                },
            );
            return None;
        }
        match best {
            Some((target, _)) => Some(target),
            None => {
                self.report_unresolved(callee);
                None
            }
        }
    }
}

/// Does the class declare its own method with this signature?
fn class_implements<'a>(class: &'a Class<'a>, signature: &'a Function<'a>) -> bool {
    class.methods.iter().any(|m| signatures_match(m, signature))
}

fn signatures_match<'a>(a: &'a Function<'a>, b: &'a Function<'a>) -> bool {
    a.name == b.name
        && a.arity() == b.arity()
        && a.params
            .iter()
            .zip(b.params)
            .all(|(pa, pb)| match (pa.ty.ty(), pb.ty.ty()) {
                (Some(ta), Some(tb)) => ta == tb,
                _ => true,
            })
}
