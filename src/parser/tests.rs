use super::Parser;
use crate::arena::Arena;
use crate::ast::builder::AstBuilder;
use crate::ast::decl::{ClassKind, FunctionKind, VarKind, Visibility};
use crate::ast::expr::{BinaryOp, ExprKind, UnaryOp, Value};
use crate::ast::module::{Definition, Module};
use crate::ast::stmt::StmtKind;
use crate::ast::types::TypeRefKind;
use crate::debug::dump_module;
use crate::diag::{CollectSink, Diagnostic, Diags};
use crate::intern::Interner;
use crate::lexer::Lexer;
use crate::source::FileId;

fn parse<'a>(arena: &'a Arena, source: &str) -> (Module<'a>, Vec<Diagnostic>, Interner) {
    let mut interner = Interner::new();
    let mut sink = CollectSink::new();
    let module = {
        let mut diags = Diags::new(&mut sink);
        let mut builder = AstBuilder::new(arena);
        let tokens = {
            let mut lexer = Lexer::new(FileId::default(), source, &mut interner);
            lexer.tokenize(&mut diags)
        };
        let module = builder.create_module(FileId::default(), "test.vela");
        Parser::new(tokens, &mut builder, &interner, &mut diags, module).parse_module()
    };
    (module, sink.diags, interner)
}

fn parse_clean<'a>(arena: &'a Arena, source: &str) -> (Module<'a>, Interner) {
    let (module, diags, interner) = parse(arena, source);
    let errors: Vec<_> = diags
        .iter()
        .filter(|d| d.severity() == crate::diag::Severity::Error)
        .collect();
    assert!(errors.is_empty(), "unexpected errors: {errors:?}");
    (module, interner)
}

#[test]
fn namespace_header() {
    let arena = Arena::new();
    let (module, interner) = parse_clean(&arena, "namespace std\nint x");
    assert_eq!(interner.resolve(module.namespace), "std");
}

#[test]
fn missing_namespace_defaults() {
    let arena = Arena::new();
    let (module, interner) = parse_clean(&arena, "int x");
    assert_eq!(interner.resolve(module.namespace), "default");
}

#[test]
fn namespace_default_keyword() {
    let arena = Arena::new();
    let (module, interner) = parse_clean(&arena, "namespace default\nint x");
    assert_eq!(interner.resolve(module.namespace), "default");
}

#[test]
fn empty_module_with_namespace_is_accepted() {
    let arena = Arena::new();
    let (module, diags, _) = parse(&arena, "namespace std");
    assert!(module.definitions.is_empty());
    // Accepted with a warning, not an error.
    assert!(diags.iter().all(|d| d.severity() == crate::diag::Severity::Warning));
}

#[test]
fn imports_single_and_aliased() {
    let arena = Arena::new();
    let (module, interner) =
        parse_clean(&arena, "import \"std\"\nimport \"math\" as \"m\"\nint x");
    assert_eq!(module.imports.len(), 2);
    assert_eq!(module.alias_imports.len(), 1);
    assert_eq!(interner.resolve(module.imports[0].name), "std");
    let aliased = module.alias_imports[0];
    assert_eq!(interner.resolve(aliased.name), "math");
    assert_eq!(interner.resolve(aliased.alias.unwrap()), "m");
}

#[test]
fn import_list_form() {
    let arena = Arena::new();
    let (module, _) = parse_clean(&arena, "import (\"std\", \"math\" as \"m\")\nint x");
    assert_eq!(module.imports.len(), 2);
    assert_eq!(module.alias_imports.len(), 1);
}

#[test]
fn global_var_initializer_precedence() {
    let arena = Arena::new();
    let (module, _) = parse_clean(&arena, "int x = 1 + 2 * 3");
    let var = module.global_vars[0];
    let init = var.init.expect("initializer");
    // 1 + (2 * 3): multiplication binds tighter.
    let ExprKind::Binary { op, left, right } = &init.kind else {
        panic!("expected binary initializer");
    };
    assert_eq!(*op, BinaryOp::Add);
    assert!(matches!(
        left.kind,
        ExprKind::Value(Value::Int { value: 1, .. })
    ));
    let ExprKind::Binary { op: inner, left: l, right: r } = &right.kind else {
        panic!("expected nested multiplication");
    };
    assert_eq!(*inner, BinaryOp::Mul);
    assert!(matches!(l.kind, ExprKind::Value(Value::Int { value: 2, .. })));
    assert!(matches!(r.kind, ExprKind::Value(Value::Int { value: 3, .. })));
}

#[test]
fn scopes_prefix() {
    let arena = Arena::new();
    let (module, _) = parse_clean(&arena, "public const int limit = 10");
    let var = module.global_vars[0];
    assert_eq!(var.scopes.visibility, Visibility::Public);
    assert!(var.scopes.constant);
}

#[test]
fn double_visibility_is_an_error() {
    let arena = Arena::new();
    let (_, diags, _) = parse(&arena, "public private int x");
    assert!(diags.iter().any(|d| d.kind.code() == "E0002"));
}

#[test]
fn function_with_params_and_hidden_error_handler() {
    let arena = Arena::new();
    let (module, interner) = parse_clean(&arena, "int add(int a, int b) { return a + b }");
    let function = module.functions[0];
    assert_eq!(function.arity(), 2);
    assert_eq!(function.params[0].index, 0);
    assert_eq!(function.params[1].index, 1);
    assert_eq!(interner.resolve(function.error_handler.name), "error");
    assert_eq!(function.error_handler.kind, VarKind::ErrorHandler);
    let body = function.body.get().expect("body");
    assert_eq!(body.stmts.len(), 1);
    assert!(matches!(body.stmts[0].kind, StmtKind::Return(Some(_))));
}

#[test]
fn function_without_body_is_a_declaration() {
    let arena = Arena::new();
    let (module, _) = parse_clean(&arena, "int add(int a, int b)");
    assert!(module.functions[0].body.get().is_none());
}

#[test]
fn elsif_chain() {
    let arena = Arena::new();
    let (module, _) = parse_clean(
        &arena,
        "void f(int a) { if (a == 1) return elsif a == 2 a = 1 else a = 2 }",
    );
    let function = module.functions[0];
    let body = function.body.get().unwrap();
    assert_eq!(body.stmts.len(), 1);
    let StmtKind::If(if_stmt) = &body.stmts[0].kind else {
        panic!("expected if statement");
    };
    assert!(matches!(if_stmt.then_stmt.kind, StmtKind::Return(None)));
    assert_eq!(if_stmt.elsifs.len(), 1);
    let StmtKind::Assign(elsif_assign) = &if_stmt.elsifs[0].stmt.kind else {
        panic!("expected assignment in elsif");
    };
    assert!(matches!(
        elsif_assign.value.kind,
        ExprKind::Value(Value::Int { value: 1, .. })
    ));
    let else_stmt = if_stmt.else_stmt.expect("else branch");
    let StmtKind::Assign(else_assign) = &else_stmt.kind else {
        panic!("expected assignment in else");
    };
    assert!(matches!(
        else_assign.value.kind,
        ExprKind::Value(Value::Int { value: 2, .. })
    ));
}

#[test]
fn for_loop_shape() {
    let arena = Arena::new();
    let (module, _) = parse_clean(&arena, "void f() { for int i = 1; i <= 3; ++i { } }");
    let body = module.functions[0].body.get().unwrap();
    let StmtKind::Loop(loop_stmt) = &body.stmts[0].kind else {
        panic!("expected loop");
    };
    let init = loop_stmt.init.expect("init block");
    assert_eq!(init.stmts.len(), 1);
    assert!(matches!(init.stmts[0].kind, StmtKind::VarDecl(_)));
    let cond = loop_stmt.cond.expect("condition");
    assert!(matches!(
        cond.kind,
        ExprKind::Binary { op: BinaryOp::LtEq, .. }
    ));
    let post = loop_stmt.post.expect("post block");
    assert_eq!(post.stmts.len(), 1);
    let StmtKind::Expr(post_expr) = &post.stmts[0].kind else {
        panic!("expected expression statement in post block");
    };
    assert!(matches!(
        post_expr.kind,
        ExprKind::Unary { op: UnaryOp::PreInc, .. }
    ));
}

#[test]
fn while_is_a_loop_without_init_or_post() {
    let arena = Arena::new();
    let (module, _) = parse_clean(&arena, "void f(bool go) { while go { break } }");
    let body = module.functions[0].body.get().unwrap();
    let StmtKind::Loop(loop_stmt) = &body.stmts[0].kind else {
        panic!("expected loop");
    };
    assert!(loop_stmt.init.is_none());
    assert!(loop_stmt.post.is_none());
    assert!(loop_stmt.cond.is_some());
}

#[test]
fn empty_for_init_and_post() {
    let arena = Arena::new();
    let (module, _) = parse_clean(&arena, "void f(bool go) { for ; go ; { } }");
    let body = module.functions[0].body.get().unwrap();
    let StmtKind::Loop(loop_stmt) = &body.stmts[0].kind else {
        panic!("expected loop");
    };
    assert!(loop_stmt.init.unwrap().is_empty());
    assert!(loop_stmt.post.unwrap().is_empty());
}

#[test]
fn compound_assignment_desugars() {
    let arena = Arena::new();
    let (module, _) = parse_clean(&arena, "void f(int a) { a += 2 }");
    let body = module.functions[0].body.get().unwrap();
    let StmtKind::Assign(assign) = &body.stmts[0].kind else {
        panic!("expected assignment");
    };
    let ExprKind::Binary { op, left, .. } = &assign.value.kind else {
        panic!("expected desugared binary value");
    };
    assert_eq!(*op, BinaryOp::Add);
    assert!(matches!(left.kind, ExprKind::VarRef(_)));
}

#[test]
fn class_members_and_default_constructor() {
    let arena = Arena::new();
    let (module, interner) = parse_clean(
        &arena,
        "class Point { private int x\n private int y\n int sum() { return x + y } }",
    );
    let Definition::Class(class) = module.definitions[0] else {
        panic!("expected class definition");
    };
    assert_eq!(class.kind, ClassKind::Class);
    assert_eq!(class.attributes.len(), 2);
    assert_eq!(class.attributes[0].scopes.visibility, Visibility::Private);
    assert_eq!(class.methods.len(), 1);
    assert_eq!(class.methods[0].kind, FunctionKind::Method);
    let ctor = class.default_constructor.expect("synthesised constructor");
    assert_eq!(interner.resolve(ctor.name), "Point");
    assert!(std::ptr::eq(
        class.attributes[0].owner_class.get().unwrap(),
        class
    ));
}

#[test]
fn user_constructor_suppresses_default() {
    let arena = Arena::new();
    let (module, _) = parse_clean(
        &arena,
        "class Point { int x\n Point(int start) { x = start } }",
    );
    let Definition::Class(class) = module.definitions[0] else {
        panic!("expected class definition");
    };
    assert!(class.default_constructor.is_none());
    assert_eq!(class.constructors.len(), 1);
    assert_eq!(class.constructors[0].kind, FunctionKind::Constructor);
    assert_eq!(class.constructors[0].arity(), 1);
}

#[test]
fn interface_methods_are_virtual() {
    let arena = Arena::new();
    let (module, _) = parse_clean(&arena, "interface Shape { double area() }");
    let Definition::Class(class) = module.definitions[0] else {
        panic!("expected interface definition");
    };
    assert_eq!(class.kind, ClassKind::Interface);
    assert_eq!(class.methods[0].kind, FunctionKind::Virtual);
    assert!(class.methods[0].body.get().is_none());
    assert!(class.default_constructor.is_none());
}

#[test]
fn class_super_list() {
    let arena = Arena::new();
    let (module, _) = parse_clean(&arena, "class Circle : Shape, Solid { int r }");
    let Definition::Class(class) = module.definitions[0] else {
        panic!("expected class definition");
    };
    assert_eq!(class.super_types.len(), 2);
    assert!(matches!(
        class.super_types[0].kind,
        TypeRefKind::Identity(_)
    ));
}

#[test]
fn enum_entries_in_order() {
    let arena = Arena::new();
    let (module, interner) = parse_clean(&arena, "enum Color { RED GREEN BLUE }");
    let Definition::Enum(enm) = module.definitions[0] else {
        panic!("expected enum definition");
    };
    let names: Vec<_> = enm
        .entries
        .iter()
        .map(|e| interner.resolve(e.name))
        .collect();
    assert_eq!(names, vec!["RED", "GREEN", "BLUE"]);
    assert_eq!(enm.entries[2].index, 3);
}

#[test]
fn switch_cases_and_fallthrough() {
    let arena = Arena::new();
    let (module, _) = parse_clean(
        &arena,
        "void f(int a) { switch a { case 1: case 2: a = 0 break default: a = 9 } }",
    );
    let body = module.functions[0].body.get().unwrap();
    let StmtKind::Switch(switch) = &body.stmts[0].kind else {
        panic!("expected switch");
    };
    assert_eq!(switch.cases.len(), 2);
    // First case is empty: fall-through.
    assert!(switch.cases[0].block.is_empty());
    assert_eq!(switch.cases[1].block.stmts.len(), 2);
    assert!(switch.default.is_some());
}

#[test]
fn handle_statement_and_binding_form() {
    let arena = Arena::new();
    let (module, interner) = parse_clean(
        &arena,
        "void f() { handle { g() } error e = handle { g() } }\nvoid g() { }",
    );
    let body = module.functions[0].body.get().unwrap();
    assert_eq!(body.stmts.len(), 2);
    let StmtKind::Handle(bare) = &body.stmts[0].kind else {
        panic!("expected handle statement");
    };
    assert_eq!(interner.resolve(bare.error_var.name), "error");
    let StmtKind::Handle(bound) = &body.stmts[1].kind else {
        panic!("expected bound handle statement");
    };
    assert_eq!(interner.resolve(bound.error_var.name), "e");
    assert_eq!(bound.error_var.kind, VarKind::ErrorHandler);
}

#[test]
fn fail_with_and_without_payload() {
    let arena = Arena::new();
    let (module, _) = parse_clean(&arena, "void f(int a) { if a == 1 fail else fail 404 }");
    let body = module.functions[0].body.get().unwrap();
    let StmtKind::If(if_stmt) = &body.stmts[0].kind else {
        panic!("expected if");
    };
    let StmtKind::Fail(bare) = &if_stmt.then_stmt.kind else {
        panic!("expected fail");
    };
    assert!(bare.payload.is_none());
    let StmtKind::Fail(with_payload) = &if_stmt.else_stmt.unwrap().kind else {
        panic!("expected fail with payload");
    };
    assert!(with_payload.payload.is_some());
}

#[test]
fn delete_and_new() {
    let arena = Arena::new();
    let (module, _) = parse_clean(
        &arena,
        "class C { }\nvoid f() { C c = new C() delete c }",
    );
    let body = module.functions[0].body.get().unwrap();
    assert_eq!(body.stmts.len(), 2);
    let StmtKind::VarDecl(var) = &body.stmts[0].kind else {
        panic!("expected declaration");
    };
    let init = var.init.expect("constructor call");
    let ExprKind::Call(call) = &init.kind else {
        panic!("expected call");
    };
    assert!(call.constructor);
    assert!(matches!(body.stmts[1].kind, StmtKind::Delete(_)));
}

#[test]
fn declaration_vs_statement_lookahead() {
    let arena = Arena::new();
    let (module, _) = parse_clean(
        &arena,
        "class Point { }\nvoid f() { Point p = null\n p = null\n int[3] xs\n xs[0]++ }",
    );
    let body = module.functions[0].body.get().unwrap();
    assert!(matches!(body.stmts[0].kind, StmtKind::VarDecl(_)));
    assert!(matches!(body.stmts[1].kind, StmtKind::Assign(_)));
    let StmtKind::VarDecl(xs) = &body.stmts[2].kind else {
        panic!("expected array declaration");
    };
    assert!(matches!(xs.ty.kind, TypeRefKind::Array { .. }));
    assert!(matches!(body.stmts[3].kind, StmtKind::Expr(_)));
}

#[test]
fn dotted_paths_parse_whole() {
    let arena = Arena::new();
    let (module, _) = parse_clean(&arena, "void f(Point p) { use(p.pos.x) }\nvoid use(int v) { }");
    let body = module.functions[0].body.get().unwrap();
    let StmtKind::Expr(expr) = &body.stmts[0].kind else {
        panic!("expected call statement");
    };
    let ExprKind::Call(call) = &expr.kind else {
        panic!("expected call");
    };
    let ExprKind::VarRef(arg) = &call.args[0].kind else {
        panic!("expected var-ref argument");
    };
    assert_eq!(arg.path.segments.len(), 3);
}

#[test]
fn locals_vector_is_flat_and_ordered() {
    let arena = Arena::new();
    let (module, interner) = parse_clean(
        &arena,
        "void f() { int a { int b } for int i = 0; ; { } }",
    );
    let locals = module.functions[0].locals.get();
    let names: Vec<_> = locals.iter().map(|v| interner.resolve(v.name)).collect();
    assert_eq!(names, vec!["a", "b", "i"]);
}

#[test]
fn comment_attaches_to_declaration() {
    let arena = Arena::new();
    let (module, interner) = parse_clean(&arena, "// the answer\nint x = 42");
    let var = module.global_vars[0];
    assert_eq!(interner.resolve(var.comment.unwrap()), "the answer");
}

#[test]
fn trailing_comment_is_free_standing() {
    let arena = Arena::new();
    let (module, _) = parse_clean(&arena, "int x\n// dangling");
    assert!(matches!(
        module.definitions.last(),
        Some(Definition::Comment { .. })
    ));
}

#[test]
fn syntax_error_recovers_and_keeps_parsing() {
    let arena = Arena::new();
    let (module, diags, _) = parse(&arena, "int x = \nint y = 2");
    // The first initializer is broken; the parser reports, skips, and
    // still delivers the second global.
    assert!(diags.iter().any(|d| d.kind.code() == "E0002"));
    assert!(!module.global_vars.is_empty());
}

#[test]
fn parsing_is_idempotent() {
    let source = "namespace demo\nimport \"std\"\n// doc\nclass Point : Base { int x\n int len() { return x } }\nenum Color { RED GREEN }\nint limit = 3 + 4\nvoid f(int a) { for int i = 0; i < a; ++i { f(i) } }";
    let arena_a = Arena::new();
    let arena_b = Arena::new();
    let (module_a, interner_a) = parse_clean(&arena_a, source);
    let (module_b, interner_b) = parse_clean(&arena_b, source);
    assert_eq!(
        dump_module(&module_a, &interner_a),
        dump_module(&module_b, &interner_b)
    );
}

#[test]
fn ternary_expression() {
    let arena = Arena::new();
    let (module, _) = parse_clean(&arena, "void f(int a) { a = a > 0 ? a : -a }");
    let body = module.functions[0].body.get().unwrap();
    let StmtKind::Assign(assign) = &body.stmts[0].kind else {
        panic!("expected assignment");
    };
    assert!(matches!(assign.value.kind, ExprKind::Ternary { .. }));
}

#[test]
fn return_before_assignment_statement_takes_no_value() {
    let arena = Arena::new();
    let (module, _) = parse_clean(&arena, "void f(int a) { if a == 1 return a = 2 }");
    let body = module.functions[0].body.get().unwrap();
    let StmtKind::If(if_stmt) = &body.stmts[0].kind else {
        panic!("expected if");
    };
    assert!(matches!(if_stmt.then_stmt.kind, StmtKind::Return(None)));
    assert!(matches!(body.stmts[1].kind, StmtKind::Assign(_)));
}
