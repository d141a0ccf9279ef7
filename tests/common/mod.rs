//! Shared harness for the integration suites.
//!
//! Runs the full pipeline over in-memory sources and hands the result to
//! the test body together with the collected diagnostics and the interner.

use vela::{check, Arena, CheckResult, CollectSink, Interner, SourceFile};

/// Run the pipeline over `(file name, source)` pairs and call `body` with
/// the outcome. The arena lives in this frame, so the result can only be
/// inspected inside the closure.
pub fn with_checked<F>(sources: &[(&str, &str)], body: F)
where
    F: FnOnce(&CheckResult<'_>, &CollectSink, &Interner),
{
    let arena = Arena::new();
    let mut interner = Interner::new();
    let mut sink = CollectSink::new();
    let inputs: Vec<SourceFile> = sources
        .iter()
        .map(|(name, text)| SourceFile::new(*name, *text))
        .collect();
    let result = check(&arena, &mut interner, &inputs, &mut sink);
    body(&result, &sink, &interner);
}

/// Single-module convenience wrapper.
pub fn with_checked_source<F>(source: &str, body: F)
where
    F: FnOnce(&CheckResult<'_>, &CollectSink, &Interner),
{
    with_checked(&[("main.vela", source)], body);
}

/// Diagnostic codes in report order.
#[allow(dead_code)]
pub fn codes(sink: &CollectSink) -> Vec<&'static str> {
    sink.diags.iter().map(|d| d.kind.code()).collect()
}

/// Assert the pipeline finished without errors (warnings are fine).
#[allow(dead_code)]
pub fn assert_clean(result: &CheckResult<'_>, sink: &CollectSink) {
    let errors: Vec<_> = sink.errors().collect();
    assert!(
        errors.is_empty(),
        "expected a clean run, got errors: {errors:?}"
    );
    assert!(!result.errors_occurred);
}
