// crates/policy-wrapper-cli/src/lib.rs
// ============================================================================
// Module: Policy Wrapper CLI Library
// Description: Process harness pieces shared by the binary and its tests.
// Purpose: Frame pipeline input, log engine events, and localize messages.
// Dependencies: policy-wrapper-core, serde, serde_json, serde_yaml, thiserror
// ============================================================================

//! ## Overview
//! The `policy-wrapper` binary is a thin shell over this library: framing
//! and invocation live in [`resource_list`], the JSON-lines event sink in
//! [`log`], and the message catalog in [`i18n`].

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod i18n;
pub mod log;
pub mod resource_list;

#[cfg(test)]
mod tests;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use log::JsonLogTelemetry;
pub use resource_list::FunctionError;
pub use resource_list::MAX_INPUT_BYTES;
pub use resource_list::ResourceList;
pub use resource_list::run_function;
pub use resource_list::write_stream;
