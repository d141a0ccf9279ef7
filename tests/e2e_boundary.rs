//! Boundary behaviours: lexical failure positions, empty inputs, cyclic
//! inheritance across modules, and overload precedence.

mod common;

use common::{assert_clean, with_checked, with_checked_source};
use vela::ast::types::{IntKind, Type};
use vela::ast::stmt::StmtKind;
use vela::ast::expr::ExprKind;

#[test]
fn unterminated_string_reports_lexical_error_at_quote() {
    with_checked_source("int x = \"oops", |result, sink, _| {
        assert!(result.errors_occurred);
        let lexical: Vec<_> = sink
            .diags
            .iter()
            .filter(|d| d.kind.code() == "E0001")
            .collect();
        assert_eq!(lexical.len(), 1);
        assert_eq!(lexical[0].span.start, 8);
    });
}

#[test]
fn unterminated_block_comment_reports_at_opening() {
    with_checked_source("int x /* dangling", |result, sink, _| {
        assert!(result.errors_occurred);
        let lexical: Vec<_> = sink
            .diags
            .iter()
            .filter(|d| d.kind.code() == "E0001")
            .collect();
        assert_eq!(lexical.len(), 1);
        assert_eq!(lexical[0].span.start, 6);
    });
}

#[test]
fn namespace_only_module_is_accepted_and_empty() {
    with_checked_source("namespace std", |result, sink, interner| {
        assert!(!result.errors_occurred);
        let module = result.modules.module(0);
        assert!(module.definitions.is_empty());
        assert_eq!(interner.resolve(module.namespace), "std");
        // The namespace still exists in the set.
        let ns = interner.lookup("std").expect("interned");
        assert!(result.modules.namespace(ns).is_some());
        // Reported as a warning only.
        assert!(sink.has_code("W0002"));
    });
}

#[test]
fn cyclic_inheritance_across_modules_reports_both_without_overflow() {
    with_checked(
        &[
            ("a.vela", "class A : B { }"),
            ("b.vela", "class B : A { }"),
        ],
        |result, sink, _| {
            assert!(result.errors_occurred);
            let cycles: Vec<_> = sink
                .diags
                .iter()
                .filter(|d| d.kind.code() == "E0010")
                .collect();
            // One report per class on the cycle.
            assert!(cycles.len() >= 2, "diagnostics: {:?}", sink.diags);
        },
    );
}

#[test]
fn overload_prefers_narrower_widening() {
    with_checked_source(
        "void f(int a) { }\nvoid f(long a) { }\nvoid g(short s) { f(s) }",
        |result, sink, _| {
            assert_clean(result, sink);
            let module = result.modules.module(0);
            let g = module.functions[2];
            let body = g.body.get().unwrap();
            let StmtKind::Expr(expr) = &body.stmts[0].kind else {
                panic!("expected call statement");
            };
            let ExprKind::Call(call) = &expr.kind else {
                panic!("expected call");
            };
            let target = call.target.get().expect("resolved overload");
            // short -> int is the cheaper widening; f(int) wins.
            assert_eq!(target.params[0].ty.ty(), Some(&Type::Int(IntKind::Int)));
        },
    );
}

#[test]
fn empty_input_set_checks_clean() {
    with_checked(&[], |result, sink, _| {
        assert_clean(result, sink);
        assert!(result.modules.is_empty());
    });
}

#[test]
fn broken_module_still_reports_later_errors() {
    // The first module has a syntax error; the second still resolves and
    // its type error still surfaces.
    with_checked(
        &[
            ("broken.vela", "int x = = 2"),
            ("typed.vela", "int y = \"text\""),
        ],
        |result, sink, _| {
            assert!(result.errors_occurred);
            assert!(sink.has_code("E0002"));
            assert!(sink.has_code("E0005"));
        },
    );
}
