// crates/policy-wrapper-cli/src/tests/mod.rs
// ============================================================================
// Module: CLI Unit Tests
// Description: Unit test modules for CLI library internals.
// Purpose: Group crate-private tests.
// Dependencies: policy-wrapper-cli
// ============================================================================

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

mod i18n;
