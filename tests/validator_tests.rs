//! Typing, control-flow, constness, visibility, and class-contract rules.

mod common;

use common::{assert_clean, with_checked_source};

fn expect_code(source: &str, code: &str) {
    with_checked_source(source, |result, sink, _| {
        assert!(
            sink.has_code(code),
            "expected {code}, got: {:?}",
            sink.diags
        );
        assert!(result.errors_occurred);
    });
}

fn expect_clean(source: &str) {
    with_checked_source(source, |result, sink, _| {
        assert_clean(result, sink);
    });
}

// ----- assignment and conversions -------------------------------------------

#[test]
fn string_does_not_assign_to_int() {
    expect_code("int x = \"text\"", "E0005");
}

#[test]
fn floating_never_narrows_to_integer() {
    expect_code("int x = 1.5", "E0005");
}

#[test]
fn narrower_integer_widens() {
    expect_clean("short s = 1\nvoid f() { long big = s }");
}

#[test]
fn sign_change_is_rejected() {
    expect_code("void f(int a) { uint u = a }", "E0005");
}

#[test]
fn bool_and_integer_interchange() {
    expect_clean("void f(bool b) { int x = b\n bool back = x }");
}

#[test]
fn integer_to_floating_warns_but_passes() {
    with_checked_source("double d = 1", |result, sink, _| {
        assert!(!result.errors_occurred);
        assert!(sink.has_code("W0001"), "diagnostics: {:?}", sink.diags);
    });
}

#[test]
fn null_assigns_to_identity_only() {
    expect_clean("class C { }\nvoid f() { C c = null }");
    expect_code("void f() { int x = null }", "E0005");
}

// ----- operators ------------------------------------------------------------

#[test]
fn arithmetic_requires_numeric_operands() {
    expect_code("void f(bool b) { int x = b + 1 }", "E0005");
}

#[test]
fn arithmetic_yields_wider_operand_type() {
    expect_clean("void f(int a, long b) { long r = a + b }");
    expect_code("void f(int a, long b) { int r = a + b }", "E0005");
}

#[test]
fn bitwise_requires_integers() {
    expect_code("void f(double d) { double r = d & d }", "E0005");
}

#[test]
fn logical_requires_bools() {
    expect_code("void f(int a) { bool r = a && a }", "E0005");
}

#[test]
fn comparison_yields_bool() {
    expect_clean("void f(int a, long b) { bool r = a < b }");
}

#[test]
fn equality_on_identities_is_reference_equality() {
    expect_clean("class C { }\nvoid f(C a, C b) { bool same = a == b\n bool n = a == null }");
    expect_code(
        "class C { }\nclass D { }\nvoid f(C c, D d) { bool same = c == d }",
        "E0005",
    );
}

#[test]
fn not_requires_bool() {
    expect_code("void f(int a) { bool r = !a }", "E0005");
}

#[test]
fn increment_requires_assignable_numeric() {
    expect_clean("void f(int a) { ++a\n a-- }");
    expect_code("void f(bool b) { ++b }", "E0005");
}

#[test]
fn ternary_branches_must_agree() {
    expect_clean("void f(bool c) { int x = c ? 1 : 2 }");
    expect_code("void f(bool c) { int x = c ? 1 : null }", "E0005");
}

#[test]
fn index_requires_array_base_and_integer_index() {
    expect_clean("void f(int[3] xs, int i) { int v = xs[i] }");
    expect_code("void f(int a) { int v = a[0] }", "E0005");
}

// ----- control flow ---------------------------------------------------------

#[test]
fn break_outside_loop_or_switch() {
    expect_code("void f() { break }", "E0002");
}

#[test]
fn continue_requires_a_loop_even_in_switch() {
    expect_code("void f(int a) { switch a { case 1: continue } }", "E0002");
}

#[test]
fn break_inside_loop_is_fine() {
    expect_clean("void f(bool go) { while go { break\n continue } }");
}

#[test]
fn non_void_function_must_return_on_every_path() {
    expect_code("int f(bool c) { if c return 1 }", "E0009");
    expect_clean("int f(bool c) { if c return 1 else return 2 }");
}

#[test]
fn fail_counts_as_function_exit() {
    expect_clean("int f(bool c) { if c return 1 else fail }");
}

#[test]
fn fail_inside_handle_does_not_exit() {
    expect_code("int f() { handle { fail } }", "E0009");
}

#[test]
fn infinite_loop_counts_as_exit() {
    expect_clean("int f() { for ; ; { } }");
}

#[test]
fn void_function_rejects_return_value() {
    expect_code("void f() { return 1 }", "E0005");
}

#[test]
fn non_void_return_requires_value() {
    expect_code("int f() { return }", "E0005");
}

// ----- switch ---------------------------------------------------------------

#[test]
fn switch_scrutinee_must_be_integer_or_enum() {
    expect_code("void f(string s) { switch s { case 1: break } }", "E0005");
    expect_clean("enum E { A B }\nvoid f(E e) { switch e { case E.A: break } }");
}

#[test]
fn case_labels_must_be_constant() {
    expect_code(
        "void f(int a, int b) { switch a { case b: break } }",
        "E0005",
    );
}

#[test]
fn const_global_is_a_valid_case_label() {
    expect_clean("const int LIMIT = 3\nvoid f(int a) { switch a { case LIMIT: break } }");
}

#[test]
fn duplicate_case_labels_are_rejected() {
    expect_code(
        "void f(int a) { switch a { case 1: break case 1: break } }",
        "E0003",
    );
}

#[test]
fn non_empty_case_requires_an_explicit_break() {
    expect_code(
        "void f(int a) { switch a { case 1: a = 2 case 2: break } }",
        "E0002",
    );
}

#[test]
fn empty_case_bodies_fall_through() {
    expect_clean("void f(int a) { switch a { case 1: case 2: break } }");
}

#[test]
fn case_may_leave_the_switch_with_return_or_fail() {
    expect_clean(
        "int f(int a) { switch a { case 1: return 1 case 2: fail default: return 0 } }",
    );
}

// ----- constness ------------------------------------------------------------

#[test]
fn writing_a_const_global_is_rejected() {
    expect_code("const int k = 1\nvoid f() { k = 2 }", "E0007");
}

#[test]
fn incrementing_a_const_is_rejected() {
    expect_code("const int k = 1\nvoid f() { ++k }", "E0007");
}

#[test]
fn enum_entries_are_not_assignable() {
    expect_code(
        "enum E { A }\nvoid f() { E.A = null }",
        "E0007",
    );
}

#[test]
fn constructor_initialises_const_attribute_exactly_once() {
    expect_clean("class C { const int k\n C(int v) { k = v } }");
}

#[test]
fn constructor_missing_const_init_is_rejected() {
    expect_code("class C { const int k\n C() { } }", "E0007");
}

#[test]
fn constructor_double_const_init_is_rejected() {
    expect_code("class C { const int k\n C(int v) { k = v\n k = v } }", "E0007");
}

#[test]
fn const_attribute_without_any_constructor_is_rejected() {
    expect_code("class C { const int k }", "E0007");
}

// ----- visibility -----------------------------------------------------------

#[test]
fn public_is_visible_across_namespaces() {
    common::with_checked(
        &[
            ("lib.vela", "namespace lib\npublic int shared = 1"),
            ("app.vela", "import \"lib\"\nint x = lib.shared"),
        ],
        |result, sink, _| {
            assert_clean(result, sink);
        },
    );
}

#[test]
fn default_visibility_stops_at_namespace_boundary() {
    common::with_checked(
        &[
            ("lib.vela", "namespace lib\nint hidden = 1"),
            ("app.vela", "import \"lib\"\nint x = lib.hidden"),
        ],
        |result, sink, _| {
            assert!(result.errors_occurred);
            assert!(sink.has_code("E0006"), "diagnostics: {:?}", sink.diags);
        },
    );
}

#[test]
fn protected_member_is_visible_in_subclass_only() {
    expect_clean(
        "class Base { protected int x }\nclass D : Base { int get() { return x } }",
    );
    expect_code(
        "class Base { protected int x }\nvoid f(Base b) { int y = b.x }",
        "E0006",
    );
}

#[test]
fn private_member_is_class_only() {
    expect_clean("class C { private int x\n int get() { return x } }");
    expect_code(
        "class C { private int x }\nvoid f(C c) { int y = c.x }",
        "E0006",
    );
}

#[test]
fn private_global_is_module_only() {
    common::with_checked(
        &[
            ("a.vela", "private int secret = 1"),
            ("b.vela", "int x = secret"),
        ],
        |result, sink, _| {
            assert!(result.errors_occurred);
            assert!(sink.has_code("E0006"), "diagnostics: {:?}", sink.diags);
        },
    );
}

// ----- error-handling contracts ----------------------------------------------

#[test]
fn fail_payload_shapes() {
    expect_clean("void a() { fail }");
    expect_clean("void b() { fail 404 }");
    expect_clean("void c() { fail \"broken\" }");
    expect_clean("void d() { fail true }");
    expect_clean("class Oops { }\nvoid e(Oops o) { fail o }");
    expect_code("void f(char c) { fail c }", "E0011");
    expect_code("void g(double d) { fail d }", "E0011");
}

// ----- class contracts -------------------------------------------------------

#[test]
fn interface_may_not_declare_attributes() {
    expect_code("interface I { int x }", "E0002");
}

#[test]
fn interface_methods_must_be_bodiless() {
    expect_code("interface I { int f() { return 1 } }", "E0002");
}

#[test]
fn struct_may_not_declare_methods() {
    expect_code("struct S { int x\n int get() { return x } }", "E0002");
}

#[test]
fn class_must_implement_interface_methods() {
    expect_code("interface I { int area() }\nclass C : I { }", "E0004");
    expect_clean(
        "interface I { int area() }\nclass C : I { int area() { return 1 } }",
    );
}

// ----- overloads -------------------------------------------------------------

#[test]
fn identical_signatures_are_duplicates() {
    expect_code("void f(int a) { }\nvoid f(int b) { }", "E0003");
}

#[test]
fn header_declaration_reconciles_with_definition() {
    expect_clean("void f(int a)\nvoid f(int a) { }");
}

#[test]
fn ambiguous_call_is_a_hard_error() {
    expect_code(
        "void f(int a) { }\nvoid f(uint a) { }\nvoid g(bool b) { f(b) }",
        "E0008",
    );
}

#[test]
fn overloads_disambiguate_by_arity() {
    expect_clean("int f() { return 0 }\nint f(int a) { return a }\nvoid g() { f(f()) }");
}

// ----- delete ----------------------------------------------------------------

#[test]
fn delete_requires_an_identity() {
    expect_clean("class C { }\nvoid f(C c) { delete c }");
    expect_code("void f(int a) { delete a }", "E0005");
}
