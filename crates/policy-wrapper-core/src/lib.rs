// crates/policy-wrapper-core/src/lib.rs
// ============================================================================
// Module: Policy Wrapper Core
// Description: Manifest-to-policy wrapping and placement synthesis engine.
// Purpose: Rewrite resource batches into governance policies and bindings.
// Dependencies: serde, serde_yaml, thiserror
// ============================================================================

//! ## Overview
//! `policy-wrapper-core` consumes an ordered batch of resource documents and
//! rewrites it into governance policy wrappers, plus the placements and
//! placement bindings that target them. A transformer config selects one of
//! two dialects:
//! - `ConfigurationPolicyWrapper`: wraps every document into
//!   `ConfigurationPolicy` resources.
//! - `PolicyWrapper`: wraps documents into `Policy` resources and synthesizes
//!   placements and bindings.
//!
//! The engine is a pure, synchronous, single-pass transformation. It holds
//! no state between calls and performs no I/O apart from
//! [`TransformerConfig::load`].
//!
//! Invariants:
//! - Every synthesized document has a non-empty name.
//! - Any error aborts the whole call; there is no partial output.
//!
//! Security posture: documents and configs are untrusted pipeline input.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod classify;
pub mod config;
pub mod configuration_policy;
pub mod document;
pub mod policy;
pub mod sanitize;
pub mod selector;
pub mod signatures;
pub mod telemetry;
pub mod transformer;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use classify::Classification;
pub use classify::classify;
pub use config::ConfigError;
pub use config::ConfigurationPolicyOptions;
pub use config::Dialect;
pub use config::NonPolicyHandling;
pub use config::PlacementOptions;
pub use config::PolicyOptions;
pub use config::TransformerConfig;
pub use config::WrapperConfig;
pub use configuration_policy::ConfigurationPolicyWrapper;
pub use document::Document;
pub use document::DocumentError;
pub use document::FieldKind;
pub use policy::PolicyWrapper;
pub use sanitize::Sanitized;
pub use sanitize::sanitize;
pub use selector::MatchExpression;
pub use selector::MatchOperator;
pub use selector::build_match_expressions;
pub use signatures::PlacementFamily;
pub use telemetry::NoopTelemetry;
pub use telemetry::WrapEvent;
pub use telemetry::WrapTelemetry;
pub use transformer::PolicyTransformer;
pub use transformer::WrapError;
pub use transformer::Wrapper;
pub use transformer::transform;
