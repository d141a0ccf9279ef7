//! The error-handling contract end to end: hidden parameters, handle
//! nesting, payload routing, and rendered diagnostics.

mod common;

use common::{assert_clean, with_checked_source};
use vela::ast::stmt::StmtKind;
use vela::diag::render;

#[test]
fn every_function_kind_gets_an_error_handler() {
    with_checked_source(
        "void free_fn() { }\nclass C { C() { }\n void method() { } }\ninterface I { void virt() }",
        |result, sink, interner| {
            assert_clean(result, sink);
            let module = result.modules.module(0);
            assert_eq!(
                interner.resolve(module.functions[0].error_handler.name),
                "error"
            );
            for identity in &module.identities {
                let vela::ast::module::Identity::Class(class) = identity else {
                    continue;
                };
                for ctor in class.constructors {
                    assert_eq!(interner.resolve(ctor.error_handler.name), "error");
                }
                for method in class.methods {
                    assert_eq!(interner.resolve(method.error_handler.name), "error");
                }
            }
        },
    );
}

#[test]
fn nested_handles_route_to_the_innermost() {
    with_checked_source(
        "void g() { fail }\nvoid f() { handle { handle { g() } g() } }",
        |result, sink, _| {
            assert_clean(result, sink);
            let f = result.modules.module(0).functions[1];
            let body = f.body.get().unwrap();
            let StmtKind::Handle(outer) = &body.stmts[0].kind else {
                panic!("expected outer handle");
            };
            let StmtKind::Handle(inner) = &outer.block.stmts[0].kind else {
                panic!("expected inner handle");
            };

            let StmtKind::Expr(inner_expr) = &inner.block.stmts[0].kind else {
                panic!("expected inner call");
            };
            let inner_call = inner_expr.as_call().unwrap();
            assert!(std::ptr::eq(
                inner_call.error_handler.get().unwrap(),
                inner.error_var
            ));

            let StmtKind::Expr(outer_expr) = &outer.block.stmts[1].kind else {
                panic!("expected outer call");
            };
            let outer_call = outer_expr.as_call().unwrap();
            assert!(std::ptr::eq(
                outer_call.error_handler.get().unwrap(),
                outer.error_var
            ));
            assert!(!std::ptr::eq(inner.error_var, outer.error_var));
        },
    );
}

#[test]
fn method_calls_thread_the_enclosing_methods_handler() {
    with_checked_source(
        "class Worker { void step() { fail }\n void run() { step() } }",
        |result, sink, interner| {
            assert_clean(result, sink);
            let module = result.modules.module(0);
            let vela::ast::module::Identity::Class(class) = module.identities[0] else {
                panic!("expected class");
            };
            let run = class
                .methods
                .iter()
                .find(|m| interner.resolve(m.name) == "run")
                .copied()
                .expect("run method");
            let body = run.body.get().unwrap();
            let StmtKind::Expr(expr) = &body.stmts[0].kind else {
                panic!("expected call");
            };
            let call = expr.as_call().unwrap();
            assert!(std::ptr::eq(
                call.error_handler.get().unwrap(),
                run.error_handler
            ));
        },
    );
}

#[test]
fn handle_variable_has_error_type() {
    with_checked_source(
        "void g() { fail 404 }\nvoid f() { error e = handle { g() } }",
        |result, sink, _| {
            assert_clean(result, sink);
            let f = result.modules.module(0).functions[1];
            let body = f.body.get().unwrap();
            let StmtKind::Handle(handle) = &body.stmts[0].kind else {
                panic!("expected handle");
            };
            let ty = handle.error_var.ty.ty().expect("resolved error type");
            assert!(ty.is_error());
        },
    );
}

#[test]
fn fail_payload_expression_is_resolved() {
    with_checked_source(
        "const int NOT_FOUND = 404\nvoid f() { fail NOT_FOUND }",
        |result, sink, _| {
            assert_clean(result, sink);
            let f = result.modules.module(0).functions[0];
            let body = f.body.get().unwrap();
            let StmtKind::Fail(fail) = &body.stmts[0].kind else {
                panic!("expected fail");
            };
            let payload = fail.payload.expect("payload");
            assert!(payload.type_of().is_some());
        },
    );
}

#[test]
fn rendered_diagnostic_points_at_source() {
    with_checked_source("int x = \"text\"", |result, sink, _| {
        assert!(result.errors_occurred);
        let diag = sink.errors().next().expect("an error");
        let text = render(diag, &result.sources);
        assert!(text.contains("E0005"), "rendered: {text}");
        assert!(text.contains("main.vela:1:"), "rendered: {text}");
        assert!(text.contains("int x = \"text\""), "rendered: {text}");
        assert!(text.contains('^'), "rendered: {text}");
    });
}

#[test]
fn job_flag_reflects_only_errors() {
    with_checked_source("double d = 1", |result, sink, _| {
        assert!(!result.errors_occurred);
        assert_eq!(sink.warnings().count(), 1);
        assert_eq!(sink.errors().count(), 0);
    });
}
