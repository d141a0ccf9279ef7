//! Semantic validation and type checking.
//!
//! Runs on the fully-linked AST the resolver produced. Enforces the typing
//! rules, control-flow well-formedness, visibility, constness, overload
//! uniqueness, and class contracts, and leaves every expression annotated
//! with its final type. The only AST mutation is through the `ty` cells.

use crate::ast::builder::AstBuilder;
use crate::ast::decl::{Class, ClassKind, Def, Function, FunctionKind, Var, VarKind, Visibility};
use crate::ast::expr::{BinaryOp, Expr, ExprKind, UnaryOp, VarRef};
use crate::ast::module::{Identity, Module, ModuleSet};
use crate::ast::stmt::{Block, Stmt, StmtKind};
use crate::ast::types::Type;
use crate::diag::{DiagKind, Diags};
use crate::intern::{Interner, Symbol};
use crate::sema::convert;
use crate::sema::symbols::SymbolTable;
use crate::source::Span;
use std::collections::HashSet;

/// Entry point: validate the resolved module set.
pub fn validate<'a>(
    set: &ModuleSet<'a>,
    symbols: &SymbolTable<'a>,
    builder: &AstBuilder<'a>,
    interner: &Interner,
    diags: &mut Diags<'_>,
) {
    let mut validator = Validator {
        set,
        symbols,
        builder,
        interner,
        diags,
    };
    validator.run();
}

struct Validator<'a, 'b, 'm, 'd> {
    set: &'m ModuleSet<'a>,
    symbols: &'b SymbolTable<'a>,
    builder: &'b AstBuilder<'a>,
    interner: &'b Interner,
    diags: &'b mut Diags<'d>,
}

/// Context of the code being checked: a function body, or an initializer
/// expression with no enclosing function.
struct FnCx<'a, 'm> {
    module: &'m Module<'a>,
    function: Option<&'a Function<'a>>,
    class: Option<&'a Class<'a>>,
    loop_depth: u32,
    switch_depth: u32,
}

impl<'a, 'b, 'm, 'd> Validator<'a, 'b, 'm, 'd> {
    fn run(&mut self) {
        for module in self.set.iter() {
            for &var in &module.global_vars {
                self.check_declared_type(var);
                self.check_initializer(module, None, var);
            }
            for &function in &module.functions {
                self.check_function(module, function, None);
            }
            for &identity in &module.identities {
                match identity {
                    Identity::Class(class) => self.check_class(module, class),
                    Identity::Enum(enm) => self.check_enum(enm),
                }
            }
        }
        self.check_overload_uniqueness();
    }

    fn name(&self, sym: Symbol) -> String {
        self.interner.resolve(sym).to_string()
    }

    fn describe(&self, ty: Option<&Type<'a>>) -> String {
        match ty {
            Some(ty) => ty.describe(self.interner),
            None => "unknown".to_string(),
        }
    }

    fn mismatch(&mut self, span: Span, expected: &str, found: &str) {
        self.diags.report(
            span,
            DiagKind::TypeMismatch {
                expected: expected.to_string(),
                found: found.to_string(),
            },
        );
    }

    // ----- declarations -----------------------------------------------------

    fn check_declared_type(&mut self, var: &'a Var<'a>) {
        if let Some(ty) = var.ty.ty() {
            if ty.is_void() {
                self.mismatch(var.span, "value type", "void");
            }
        }
    }

    /// Initializer compatibility, shared by globals, attributes, and
    /// locals.
    fn check_initializer(
        &mut self,
        module: &'m Module<'a>,
        class: Option<&'a Class<'a>>,
        var: &'a Var<'a>,
    ) {
        let Some(init) = var.init else {
            return;
        };
        let mut cx = FnCx {
            module,
            function: None,
            class,
            loop_depth: 0,
            switch_depth: 0,
        };
        let found = self.check_expr(&mut cx, init);
        self.check_assignable(var.ty.ty(), found, init);
    }

    /// Is the expression usable where `expected` is required? A constant
    /// integer expression additionally fits any integer type whose range
    /// holds its value.
    fn check_assignable(
        &mut self,
        expected: Option<&'a Type<'a>>,
        found: Option<&'a Type<'a>>,
        expr: &'a Expr<'a>,
    ) {
        let (Some(expected), Some(found)) = (expected, found) else {
            return;
        };
        match convert::assignable(found, expected) {
            None => {
                if let Type::Int(kind) = expected {
                    if found.is_integer() {
                        if let Some(value) = convert::const_int_value(expr) {
                            if convert::int_fits(value, *kind) {
                                return;
                            }
                        }
                    }
                }
                let expected = expected.describe(self.interner);
                let found = found.describe(self.interner);
                self.mismatch(expr.span, &expected, &found);
            }
            Some(true) => {
                self.diags.report(
                    expr.span,
                    DiagKind::ImplicitFloatWidening {
                        from: found.describe(self.interner),
                        to: expected.describe(self.interner),
                    },
                );
            }
            Some(false) => {}
        }
    }

    // ----- classes and enums ------------------------------------------------

    fn check_class(&mut self, module: &'m Module<'a>, class: &'a Class<'a>) {
        match class.kind {
            ClassKind::Interface => {
                for &attr in class.attributes {
                    self.diags.report(
                        attr.span,
                        DiagKind::Syntax {
                            expected: "interface without attributes".to_string(),
                            found: format!("attribute `{}`", self.name(attr.name)),
                        },
                    );
                }
                for &method in class.methods {
                    if method.body.get().is_some() {
                        self.diags.report(
                            method.span,
                            DiagKind::Syntax {
                                expected: "virtual method signature".to_string(),
                                found: format!("method `{}` with a body", self.name(method.name)),
                            },
                        );
                    }
                }
                for &ctor in class.constructors {
                    self.diags.report(
                        ctor.span,
                        DiagKind::Syntax {
                            expected: "interface without constructors".to_string(),
                            found: format!("constructor `{}`", self.name(ctor.name)),
                        },
                    );
                }
            }
            ClassKind::Struct => {
                for &method in class.methods {
                    self.diags.report(
                        method.span,
                        DiagKind::Syntax {
                            expected: "struct without methods".to_string(),
                            found: format!("method `{}`", self.name(method.name)),
                        },
                    );
                }
            }
            ClassKind::Class => {
                self.check_virtual_implementations(class);
            }
        }

        for &attr in class.attributes {
            self.check_declared_type(attr);
            self.check_initializer(module, Some(class), attr);
        }
        self.check_const_attributes(class);

        for &ctor in class.constructors {
            self.check_function(module, ctor, Some(class));
        }
        for &method in class.methods {
            self.check_function(module, method, Some(class));
        }
    }

    /// A class extending an interface must implement every virtual method.
    fn check_virtual_implementations(&mut self, class: &'a Class<'a>) {
        for &sup in self.symbols.hierarchy(class.id).iter().skip(1) {
            if sup.kind != ClassKind::Interface {
                continue;
            }
            for &virtual_method in sup.methods {
                let implemented = class.methods.iter().any(|m| {
                    m.kind != FunctionKind::Virtual
                        && m.name == virtual_method.name
                        && m.arity() == virtual_method.arity()
                        && params_match(m, virtual_method)
                });
                if !implemented {
                    self.diags.report(
                        class.span,
                        DiagKind::UnresolvedRef {
                            name: self.name(virtual_method.name),
                        },
                    );
                }
            }
        }
    }

    /// Constructors of const attributes initialise them exactly once; a
    /// const attribute with an initializer must not be re-assigned.
    fn check_const_attributes(&mut self, class: &'a Class<'a>) {
        for &attr in class.attributes {
            if !attr.is_constant() {
                continue;
            }
            if attr.init.is_some() {
                continue; // constructor writes are flagged as const violations
            }
            if class.constructors.is_empty() {
                // Only the synthesised constructor exists; the const
                // attribute can never be initialised.
                self.diags.report(
                    attr.span,
                    DiagKind::ConstViolation {
                        name: self.name(attr.name),
                    },
                );
                continue;
            }
            for &ctor in class.constructors {
                let Some(body) = ctor.body.get() else {
                    continue;
                };
                let count = count_assignments(body, attr);
                if count != 1 {
                    self.diags.report(
                        ctor.span,
                        DiagKind::ConstViolation {
                            name: self.name(attr.name),
                        },
                    );
                }
            }
        }
    }

    fn check_enum(&mut self, enm: &'a crate::ast::decl::Enum<'a>) {
        let mut seen = HashSet::new();
        for &entry in enm.entries {
            if !seen.insert(entry.name) {
                self.diags.report(
                    entry.span,
                    DiagKind::DuplicateDecl {
                        name: self.name(entry.name),
                    },
                );
            }
        }
    }

    // ----- functions --------------------------------------------------------

    fn check_function(
        &mut self,
        module: &'m Module<'a>,
        function: &'a Function<'a>,
        class: Option<&'a Class<'a>>,
    ) {
        for &param in function.params {
            self.check_declared_type(param);
        }

        let Some(body) = function.body.get() else {
            return;
        };
        let mut cx = FnCx {
            module,
            function: Some(function),
            class,
            loop_depth: 0,
            switch_depth: 0,
        };
        self.check_block(&mut cx, body);

        let returns_value = function
            .return_type
            .ty()
            .map(|ty| !ty.is_void())
            .unwrap_or(false);
        if returns_value && !block_exits(body, false) {
            self.diags.report(
                function.span,
                DiagKind::MissingReturn {
                    function: self.name(function.name),
                },
            );
        }
    }

    fn check_block(&mut self, cx: &mut FnCx<'a, 'm>, block: &'a Block<'a>) {
        for stmt in block.iter() {
            self.check_stmt(cx, stmt);
        }
    }

    fn check_stmt(&mut self, cx: &mut FnCx<'a, 'm>, stmt: &'a Stmt<'a>) {
        match &stmt.kind {
            StmtKind::VarDecl(var) => {
                self.check_declared_type(var);
                if let Some(init) = var.init {
                    let found = self.check_expr(cx, init);
                    self.check_assignable(var.ty.ty(), found, init);
                }
            }
            StmtKind::Assign(assign) => {
                self.check_assign_target(cx, assign.target, stmt.span);
                let found = self.check_expr(cx, assign.value);
                let expected = assign
                    .target
                    .target()
                    .and_then(|def| def.as_var())
                    .and_then(|var| var.ty.ty());
                self.check_assignable(expected, found, assign.value);
            }
            StmtKind::Expr(expr) => {
                self.check_expr(cx, expr);
            }
            StmtKind::Return(value) => self.check_return(cx, stmt.span, *value),
            StmtKind::Fail(fail) => {
                if let Some(payload) = fail.payload {
                    let ty = self.check_expr(cx, payload);
                    let supported = matches!(
                        ty,
                        Some(Type::Bool)
                            | Some(Type::Int(_))
                            | Some(Type::String)
                            | Some(Type::Class(_))
                            | Some(Type::Enum(_))
                    );
                    if !supported {
                        self.diags.report(
                            payload.span,
                            DiagKind::UnsupportedFailPayload {
                                ty: self.describe(ty),
                            },
                        );
                    }
                }
            }
            StmtKind::Break => {
                if cx.loop_depth == 0 && cx.switch_depth == 0 {
                    self.diags.report(
                        stmt.span,
                        DiagKind::Syntax {
                            expected: "enclosing loop or switch".to_string(),
                            found: "`break`".to_string(),
                        },
                    );
                }
            }
            StmtKind::Continue => {
                if cx.loop_depth == 0 {
                    self.diags.report(
                        stmt.span,
                        DiagKind::Syntax {
                            expected: "enclosing loop".to_string(),
                            found: "`continue`".to_string(),
                        },
                    );
                }
            }
            StmtKind::Delete(target) => {
                let ty = target
                    .target()
                    .and_then(|def| def.as_var())
                    .and_then(|var| var.ty.ty());
                if let Some(ty) = ty {
                    if !ty.is_identity() {
                        let found = ty.describe(self.interner);
                        self.mismatch(stmt.span, "identity type", &found);
                    }
                }
            }
            StmtKind::Block(block) => self.check_block(cx, block),
            StmtKind::If(if_stmt) => {
                self.check_bool_cond(cx, if_stmt.cond);
                self.check_stmt(cx, if_stmt.then_stmt);
                for elsif in if_stmt.elsifs {
                    self.check_bool_cond(cx, elsif.cond);
                    self.check_stmt(cx, elsif.stmt);
                }
                if let Some(else_stmt) = if_stmt.else_stmt {
                    self.check_stmt(cx, else_stmt);
                }
            }
            StmtKind::Switch(switch) => self.check_switch(cx, switch),
            StmtKind::Loop(loop_stmt) => {
                if let Some(init) = loop_stmt.init {
                    self.check_block(cx, init);
                }
                if let Some(cond) = loop_stmt.cond {
                    self.check_bool_cond(cx, cond);
                }
                if let Some(post) = loop_stmt.post {
                    self.check_block(cx, post);
                }
                cx.loop_depth += 1;
                self.check_stmt(cx, loop_stmt.body);
                cx.loop_depth -= 1;
            }
            StmtKind::Handle(handle) => {
                self.check_block(cx, handle.block);
            }
        }
    }

    fn check_return(&mut self, cx: &mut FnCx<'a, 'm>, span: Span, value: Option<&'a Expr<'a>>) {
        let Some(function) = cx.function else {
            return;
        };
        let return_ty = function.return_type.ty();
        let is_void = return_ty.map(|ty| ty.is_void()).unwrap_or(true);
        match value {
            None => {
                if !is_void {
                    let expected = self.describe(return_ty);
                    self.mismatch(span, &expected, "no return value");
                }
            }
            Some(expr) => {
                let found = self.check_expr(cx, expr);
                if is_void {
                    let found = self.describe(found);
                    self.mismatch(expr.span, "no return value", &found);
                } else {
                    self.check_assignable(return_ty, found, expr);
                }
            }
        }
    }

    fn check_switch(&mut self, cx: &mut FnCx<'a, 'm>, switch: &'a crate::ast::stmt::SwitchStmt<'a>) {
        let scrutinee_ty = self.check_expr(cx, switch.scrutinee);
        let scrutinee_ok = matches!(scrutinee_ty, Some(Type::Int(_)) | Some(Type::Enum(_)));
        if let Some(ty) = scrutinee_ty {
            if !scrutinee_ok {
                let found = ty.describe(self.interner);
                self.mismatch(switch.scrutinee.span, "integer or enum", &found);
            }
        }

        let mut seen = HashSet::new();
        for case in switch.cases {
            let case_ty = self.check_expr(cx, case.value);
            match convert::const_int_value(case.value) {
                None => {
                    self.mismatch(case.value.span, "constant case label", "expression");
                }
                Some(value) => {
                    if !seen.insert(value) {
                        self.diags.report(
                            case.value.span,
                            DiagKind::DuplicateDecl {
                                name: format!("case {value}"),
                            },
                        );
                    }
                }
            }
            if scrutinee_ok {
                self.check_assignable(scrutinee_ty, case_ty, case.value);
            }

            cx.switch_depth += 1;
            self.check_block(cx, case.block);
            cx.switch_depth -= 1;

            // Only an empty body falls through; anything else must leave
            // the switch explicitly.
            if !case.block.is_empty() && !case_body_exits(case.block) {
                self.diags.report(
                    case.span,
                    DiagKind::Syntax {
                        expected: "`break` at the end of the case body".to_string(),
                        found: "fall-through into the next case".to_string(),
                    },
                );
            }
        }
        if let Some(default) = switch.default {
            cx.switch_depth += 1;
            self.check_block(cx, default);
            cx.switch_depth -= 1;
        }
    }

    fn check_bool_cond(&mut self, cx: &mut FnCx<'a, 'm>, cond: &'a Expr<'a>) {
        let ty = self.check_expr(cx, cond);
        if let Some(ty) = ty {
            if !ty.is_bool() {
                let found = ty.describe(self.interner);
                self.mismatch(cond.span, "bool", &found);
            }
        }
    }

    fn check_assign_target(&mut self, cx: &mut FnCx<'a, 'm>, target: &'a VarRef<'a>, span: Span) {
        let Some(def) = target.target() else {
            return;
        };
        self.check_visibility(cx, def, span);
        let Def::Var(var) = def else {
            self.mismatch(span, "assignable variable", "non-variable");
            return;
        };
        if var.kind == VarKind::EnumEntry {
            self.diags.report(
                span,
                DiagKind::ConstViolation {
                    name: self.name(var.name),
                },
            );
            return;
        }
        if var.is_constant() && !self.is_ctor_const_init(cx, var) {
            self.diags.report(
                span,
                DiagKind::ConstViolation {
                    name: self.name(var.name),
                },
            );
        }
    }

    /// A constructor may write a const attribute of its own class when that
    /// attribute has no initializer; the exactly-once rule is enforced per
    /// constructor separately.
    fn is_ctor_const_init(&self, cx: &FnCx<'a, 'm>, var: &'a Var<'a>) -> bool {
        cx.function.map(|f| f.kind) == Some(FunctionKind::Constructor)
            && var.kind == VarKind::Attribute
            && var.init.is_none()
            && match (cx.class, var.owner_class.get()) {
                (Some(a), Some(b)) => std::ptr::eq(a, b),
                _ => false,
            }
    }

    // ----- expressions ------------------------------------------------------

    fn check_expr(&mut self, cx: &mut FnCx<'a, 'm>, expr: &'a Expr<'a>) -> Option<&'a Type<'a>> {
        let ty = match &expr.kind {
            ExprKind::Value(_) => expr.type_of(),
            ExprKind::VarRef(var_ref) => {
                if let Some(def) = var_ref.target() {
                    self.check_visibility(cx, def, expr.span);
                    def.as_var().and_then(|var| var.ty.ty())
                } else {
                    None
                }
            }
            ExprKind::Call(call) => {
                let Some(target) = call.target.get() else {
                    // Unresolved: arguments were still typed by the
                    // resolver; nothing further to check.
                    for arg in call.args {
                        self.check_expr(cx, arg);
                    }
                    return None;
                };
                self.check_visibility(cx, Def::Function(target), expr.span);
                for (arg, &param) in call.args.iter().zip(target.params) {
                    let found = self.check_expr(cx, arg);
                    self.check_assignable(param.ty.ty(), found, arg);
                }
                if call.constructor {
                    expr.type_of()
                } else {
                    target.return_type.ty()
                }
            }
            ExprKind::Unary { op, operand } => self.check_unary(cx, *op, operand, expr.span),
            ExprKind::Binary { op, left, right } => {
                self.check_binary(cx, *op, left, right, expr.span)
            }
            ExprKind::Ternary {
                cond,
                then_expr,
                else_expr,
            } => {
                self.check_bool_cond(cx, cond);
                let then_ty = self.check_expr(cx, then_expr);
                let else_ty = self.check_expr(cx, else_expr);
                self.common_type(then_ty, else_ty, expr.span)
            }
            ExprKind::Index { base, index } => {
                let base_ty = self.check_expr(cx, base);
                let index_ty = self.check_expr(cx, index);
                if let Some(ty) = index_ty {
                    if !ty.is_integer() {
                        let found = ty.describe(self.interner);
                        self.mismatch(index.span, "integer index", &found);
                    }
                }
                match base_ty {
                    Some(Type::Array { elem, .. }) => Some(*elem),
                    Some(other) => {
                        let found = other.describe(self.interner);
                        self.mismatch(base.span, "array", &found);
                        None
                    }
                    None => None,
                }
            }
        };
        expr.ty.set(ty);
        ty
    }

    fn check_unary(
        &mut self,
        cx: &mut FnCx<'a, 'm>,
        op: UnaryOp,
        operand: &'a Expr<'a>,
        span: Span,
    ) -> Option<&'a Type<'a>> {
        let operand_ty = self.check_expr(cx, operand);
        match op {
            UnaryOp::Not => {
                if let Some(ty) = operand_ty {
                    if !ty.is_bool() {
                        let found = ty.describe(self.interner);
                        self.mismatch(operand.span, "bool", &found);
                    }
                }
                Some(self.builder.bool_type())
            }
            UnaryOp::Neg => {
                if let Some(ty) = operand_ty {
                    if !ty.is_numeric() {
                        let found = ty.describe(self.interner);
                        self.mismatch(operand.span, "numeric operand", &found);
                    }
                }
                operand_ty
            }
            UnaryOp::PreInc | UnaryOp::PreDec | UnaryOp::PostInc | UnaryOp::PostDec => {
                match operand.kind {
                    ExprKind::VarRef(var_ref) => {
                        if let Some(Def::Var(var)) = var_ref.target() {
                            if var.is_constant() || var.kind == VarKind::EnumEntry {
                                self.diags.report(
                                    span,
                                    DiagKind::ConstViolation {
                                        name: self.name(var.name),
                                    },
                                );
                            }
                        }
                    }
                    // Array elements are assignable places.
                    ExprKind::Index { .. } => {}
                    _ => {
                        self.mismatch(operand.span, "assignable variable", "expression");
                    }
                }
                if let Some(ty) = operand_ty {
                    if !ty.is_numeric() {
                        let found = ty.describe(self.interner);
                        self.mismatch(operand.span, "integer or floating operand", &found);
                    }
                }
                operand_ty
            }
        }
    }

    fn check_binary(
        &mut self,
        cx: &mut FnCx<'a, 'm>,
        op: BinaryOp,
        left: &'a Expr<'a>,
        right: &'a Expr<'a>,
        span: Span,
    ) -> Option<&'a Type<'a>> {
        let left_ty = self.check_expr(cx, left);
        let right_ty = self.check_expr(cx, right);
        let (Some(lt), Some(rt)) = (left_ty, right_ty) else {
            return None;
        };

        if op.is_arithmetic() {
            if !lt.is_numeric() || !rt.is_numeric() {
                let found = format!(
                    "{} {} {}",
                    lt.describe(self.interner),
                    op.text(),
                    rt.describe(self.interner)
                );
                self.mismatch(span, "numeric operands", &found);
                return None;
            }
            return convert::wider_numeric(lt, rt);
        }
        if op.is_bitwise() {
            if !lt.is_integer() || !rt.is_integer() {
                let found = format!(
                    "{} {} {}",
                    lt.describe(self.interner),
                    op.text(),
                    rt.describe(self.interner)
                );
                self.mismatch(span, "integer operands", &found);
                return None;
            }
            return match op {
                BinaryOp::Shl | BinaryOp::Shr => left_ty,
                _ => convert::wider_numeric(lt, rt),
            };
        }
        if op.is_logical() {
            if !lt.is_bool() || !rt.is_bool() {
                let found = format!(
                    "{} {} {}",
                    lt.describe(self.interner),
                    op.text(),
                    rt.describe(self.interner)
                );
                self.mismatch(span, "bool operands", &found);
            }
            return Some(self.builder.bool_type());
        }
        if op.is_comparison() {
            let comparable = (lt.is_numeric() && rt.is_numeric())
                || matches!((lt, rt), (Type::Char, Type::Char) | (Type::String, Type::String));
            if !comparable {
                let found = format!(
                    "{} {} {}",
                    lt.describe(self.interner),
                    op.text(),
                    rt.describe(self.interner)
                );
                self.mismatch(span, "comparable operands", &found);
            }
            return Some(self.builder.bool_type());
        }
        // Equality: numeric pairs, same primitive, reference equality on
        // identity types, and null against identities.
        let comparable = (lt.is_numeric() && rt.is_numeric())
            || lt == rt
            || (lt.is_null() && rt.is_identity())
            || (lt.is_identity() && rt.is_null())
            || (lt.is_error() && rt.is_error());
        if !comparable {
            let found = format!(
                "{} {} {}",
                lt.describe(self.interner),
                op.text(),
                rt.describe(self.interner)
            );
            self.mismatch(span, "matching operand types", &found);
        }
        Some(self.builder.bool_type())
    }

    fn common_type(
        &mut self,
        then_ty: Option<&'a Type<'a>>,
        else_ty: Option<&'a Type<'a>>,
        span: Span,
    ) -> Option<&'a Type<'a>> {
        let (Some(a), Some(b)) = (then_ty, else_ty) else {
            return then_ty.or(else_ty);
        };
        if a == b {
            return Some(a);
        }
        if convert::assignable(b, a).is_some() {
            return Some(a);
        }
        if convert::assignable(a, b).is_some() {
            return Some(b);
        }
        let found = format!(
            "{} and {}",
            a.describe(self.interner),
            b.describe(self.interner)
        );
        self.mismatch(span, "matching branch types", &found);
        None
    }

    // ----- visibility -------------------------------------------------------

    fn check_visibility(&mut self, cx: &FnCx<'a, 'm>, def: Def<'a>, span: Span) {
        let (visibility, owner_class, owner_module) = match def {
            Def::Var(var) => match var.kind {
                VarKind::Attribute => (
                    var.scopes.visibility,
                    var.owner_class.get(),
                    var.owner_class.get().map(|c| c.module_id.get()),
                ),
                VarKind::Global => (var.scopes.visibility, None, Some(var.module_id.get())),
                _ => return,
            },
            Def::Function(function) => (
                function.scopes.visibility,
                function.class.get(),
                Some(function.module_id.get()),
            ),
            Def::Class(class) => (class.scopes.visibility, None, Some(class.module_id.get())),
            Def::Enum(enm) => (enm.scopes.visibility, None, Some(enm.module_id.get())),
        };

        let allowed = match visibility {
            Visibility::Public => true,
            Visibility::Default => {
                // Namespace-visible: any module of the declaring namespace.
                owner_module
                    .map(|id| self.set.module(id).namespace == cx.module.namespace)
                    .unwrap_or(true)
            }
            Visibility::Protected => match owner_class {
                Some(owner) => cx
                    .class
                    .map(|current| self.symbols.same_hierarchy(current.id, owner.id))
                    .unwrap_or(false),
                None => owner_module
                    .map(|id| self.set.module(id).namespace == cx.module.namespace)
                    .unwrap_or(true),
            },
            Visibility::Private => match owner_class {
                // Private members: only the declaring class.
                Some(owner) => cx
                    .class
                    .map(|current| std::ptr::eq(current, owner))
                    .unwrap_or(false),
                // Private top-level declarations: only the declaring module.
                None => owner_module
                    .map(|id| id == cx.module.id)
                    .unwrap_or(true),
            },
        };

        if !allowed {
            self.diags.report(
                span,
                DiagKind::VisibilityViolation {
                    name: self.name(def.name()),
                },
            );
        }
    }

    // ----- overload uniqueness ----------------------------------------------

    /// No two callables in one scope may share name, arity, and parameter
    /// type vector. A bodyless declaration paired with a defining one is
    /// the header/source split and is allowed.
    fn check_overload_uniqueness(&mut self) {
        let mut pending = Vec::new();
        for (_, ns) in self.symbols.namespaces() {
            for (_, set) in ns.function_sets() {
                collect_signature_clashes(set.iter().collect(), &mut pending);
            }
        }
        for module in self.set.iter() {
            for &identity in &module.identities {
                let Identity::Class(class) = identity else {
                    continue;
                };
                if let Some(class_symbols) = self.symbols.class(class.id) {
                    for (_, set) in class_symbols.method_sets() {
                        collect_signature_clashes(set.iter().collect(), &mut pending);
                    }
                    collect_signature_clashes(
                        class_symbols.constructors().iter().collect(),
                        &mut pending,
                    );
                }
            }
        }
        for (span, name) in pending {
            self.diags.report(
                span,
                DiagKind::DuplicateDecl {
                    name: self.name(name),
                },
            );
        }
    }
}

fn params_match<'a>(a: &'a Function<'a>, b: &'a Function<'a>) -> bool {
    a.params
        .iter()
        .zip(b.params)
        .all(|(pa, pb)| match (pa.ty.ty(), pb.ty.ty()) {
            (Some(ta), Some(tb)) => ta == tb,
            _ => true,
        })
}

fn collect_signature_clashes<'a>(
    funcs: Vec<&'a Function<'a>>,
    out: &mut Vec<(Span, Symbol)>,
) {
    for (i, &a) in funcs.iter().enumerate() {
        for &b in &funcs[i + 1..] {
            if a.arity() != b.arity() || !params_match(a, b) {
                continue;
            }
            // Virtual signature against its implementation, or a bodyless
            // header declaration against its definition, reconcile.
            let virtual_pair = (a.kind == FunctionKind::Virtual) != (b.kind == FunctionKind::Virtual);
            let header_pair = a.body.get().is_some() != b.body.get().is_some();
            if virtual_pair || header_pair {
                continue;
            }
            out.push((b.span, b.name));
        }
    }
}

/// Does the case body end in a statement that leaves the switch? An
/// explicit `break` is the usual one; `return`, `fail`, and `continue`
/// leave it too.
fn case_body_exits(block: &Block<'_>) -> bool {
    match block.stmts.last() {
        Some(stmt) => case_stmt_exits(stmt),
        None => true,
    }
}

fn case_stmt_exits(stmt: &Stmt<'_>) -> bool {
    match &stmt.kind {
        StmtKind::Break | StmtKind::Continue | StmtKind::Return(_) | StmtKind::Fail(_) => true,
        StmtKind::Block(block) => case_body_exits(block),
        StmtKind::If(if_stmt) => match if_stmt.else_stmt {
            Some(else_stmt) => {
                case_stmt_exits(if_stmt.then_stmt)
                    && if_stmt
                        .elsifs
                        .iter()
                        .all(|elsif| case_stmt_exits(elsif.stmt))
                    && case_stmt_exits(else_stmt)
            }
            None => false,
        },
        _ => false,
    }
}

/// Syntactic count of assignments to one attribute inside a block.
fn count_assignments<'a>(block: &Block<'a>, attr: &'a Var<'a>) -> u32 {
    block
        .stmts
        .iter()
        .map(|stmt| stmt_assignments(stmt, attr))
        .sum()
}

fn stmt_assignments<'a>(stmt: &Stmt<'a>, attr: &'a Var<'a>) -> u32 {
    match &stmt.kind {
        StmtKind::Assign(assign) => match assign.target.target() {
            Some(Def::Var(var)) => std::ptr::eq(var, attr) as u32,
            _ => 0,
        },
        StmtKind::Block(block) => count_assignments(block, attr),
        StmtKind::If(if_stmt) => {
            stmt_assignments(if_stmt.then_stmt, attr)
                + if_stmt
                    .elsifs
                    .iter()
                    .map(|elsif| stmt_assignments(elsif.stmt, attr))
                    .sum::<u32>()
                + if_stmt
                    .else_stmt
                    .map(|else_stmt| stmt_assignments(else_stmt, attr))
                    .unwrap_or(0)
        }
        StmtKind::Switch(switch) => {
            switch
                .cases
                .iter()
                .map(|case| count_assignments(case.block, attr))
                .sum::<u32>()
                + switch
                    .default
                    .map(|default| count_assignments(default, attr))
                    .unwrap_or(0)
        }
        StmtKind::Loop(loop_stmt) => {
            loop_stmt
                .init
                .map(|init| count_assignments(init, attr))
                .unwrap_or(0)
                + loop_stmt
                    .post
                    .map(|post| count_assignments(post, attr))
                    .unwrap_or(0)
                + stmt_assignments(loop_stmt.body, attr)
        }
        StmtKind::Handle(handle) => count_assignments(handle.block, attr),
        _ => 0,
    }
}

/// Does every path through the block reach a `return` (or a `fail`, when
/// not inside a handle block, since those leave the function too)?
fn block_exits(block: &Block<'_>, in_handle: bool) -> bool {
    block.stmts.iter().any(|stmt| stmt_exits(stmt, in_handle))
}

fn stmt_exits(stmt: &Stmt<'_>, in_handle: bool) -> bool {
    match &stmt.kind {
        StmtKind::Return(_) => true,
        // A fail inside a handle block writes the handle's error variable
        // and falls through after the block; only outside one does it
        // leave the function.
        StmtKind::Fail(_) => !in_handle,
        StmtKind::Block(block) => block_exits(block, in_handle),
        StmtKind::If(if_stmt) => {
            let else_exits = match if_stmt.else_stmt {
                Some(else_stmt) => stmt_exits(else_stmt, in_handle),
                None => return false,
            };
            else_exits
                && stmt_exits(if_stmt.then_stmt, in_handle)
                && if_stmt
                    .elsifs
                    .iter()
                    .all(|elsif| stmt_exits(elsif.stmt, in_handle))
        }
        StmtKind::Switch(switch) => {
            let default_exits = match switch.default {
                Some(default) => block_exits(default, in_handle),
                None => return false,
            };
            default_exits
                && switch
                    .cases
                    .iter()
                    .filter(|case| !case.block.is_empty())
                    .all(|case| block_exits(case.block, in_handle))
        }
        // A loop with no condition never falls through.
        StmtKind::Loop(loop_stmt) => loop_stmt.cond.is_none(),
        StmtKind::Handle(handle) => block_exits(handle.block, true),
        _ => false,
    }
}
