// crates/policy-wrapper-core/tests/common/mod.rs
// ============================================================================
// Module: Common Test Utilities
// Description: Shared document and config builders for wrapper tests.
// Purpose: Keep integration tests focused on behavior instead of fixtures.
// Dependencies: policy-wrapper-core, serde_yaml
// ============================================================================

//! ## Overview
//! Provides fixture documents, transformer config builders, and small
//! assertion helpers shared across integration tests.

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
#![allow(dead_code, reason = "Shared test helpers may be unused in some cases.")]

use std::sync::Mutex;

use policy_wrapper_core::Document;
use policy_wrapper_core::TransformerConfig;
use policy_wrapper_core::WrapEvent;
use policy_wrapper_core::WrapTelemetry;
use serde_yaml::Value;

/// Result type used by integration tests.
pub type TestResult = Result<(), String>;

/// Fails with `message` unless `condition` holds.
pub fn ensure(condition: bool, message: impl Into<String>) -> TestResult {
    if condition { Ok(()) } else { Err(message.into()) }
}

/// Parses a document fixture.
pub fn doc(text: &str) -> Document {
    Document::parse(text).expect("fixture document should parse")
}

/// Builds a `ConfigMap` carrying pipeline bookkeeping annotations.
pub fn config_map(name: &str) -> Document {
    doc(&format!(
        "apiVersion: v1\nkind: ConfigMap\nmetadata:\n  name: {name}\n  annotations:\n    \
         config.kubernetes.io/index: '0'\n    internal.config.kubernetes.io/path: cm.yaml\n    \
         team: platform\ndata:\n  key: value\n"
    ))
}

/// Builds a plain `Deployment`.
pub fn deployment(name: &str) -> Document {
    doc(&format!(
        "apiVersion: apps/v1\nkind: Deployment\nmetadata:\n  name: {name}\nspec:\n  replicas: 1\n"
    ))
}

/// Builds an existing governance `ConfigurationPolicy`.
pub fn configuration_policy(name: &str) -> Document {
    doc(&format!(
        "apiVersion: policy.open-cluster-management.io/v1\nkind: ConfigurationPolicy\nmetadata:\n  \
         name: {name}\nspec:\n  remediationAction: inform\n"
    ))
}

/// Builds an existing label-selector `Placement`.
pub fn placement(name: &str) -> Document {
    doc(&format!(
        "apiVersion: cluster.open-cluster-management.io/v1beta1\nkind: Placement\nmetadata:\n  \
         name: {name}\n  annotations:\n    config.kubernetes.io/path: placement.yaml\nspec:\n  \
         predicates: []\n"
    ))
}

/// Builds an existing name-selector `PlacementRule`.
pub fn placement_rule(name: &str) -> Document {
    doc(&format!(
        "apiVersion: apps.open-cluster-management.io/v1\nkind: PlacementRule\nmetadata:\n  name: \
         {name}\nspec:\n  clusterSelector:\n    matchExpressions: []\n"
    ))
}

/// Builds a transformer config with an inline YAML spec.
pub fn transformer_config(kind: &str, name: &str, spec: &str) -> TransformerConfig {
    let spec_value: Option<Value> =
        if spec.trim().is_empty() { None } else { Some(serde_yaml::from_str(spec).unwrap()) };
    TransformerConfig {
        api_version: "policy.open-cluster-management.io/v1".to_string(),
        kind: kind.to_string(),
        metadata: policy_wrapper_core::config::ConfigMetadata {
            name: name.to_string(),
        },
        spec: spec_value,
    }
}

/// Returns `(kind, name)` pairs for a batch.
pub fn kinds_and_names(batch: &[Document]) -> Vec<(String, String)> {
    batch.iter().map(|doc| (doc.kind().to_string(), doc.name().to_string())).collect()
}

/// Reads a string field from a document.
pub fn field_str<'a>(doc: &'a Document, path: &[&str]) -> Option<&'a str> {
    doc.get(path).and_then(Value::as_str)
}

/// Returns the template list stored at `spec.<field>`.
pub fn templates<'a>(doc: &'a Document, field: &str) -> &'a [Value] {
    doc.get(&["spec", field]).and_then(Value::as_sequence).map(Vec::as_slice).unwrap_or_default()
}

/// Returns the `objectDefinition` of a template entry as a document.
pub fn object_definition(template: &Value) -> Document {
    let value = template.get("objectDefinition").cloned().expect("template has objectDefinition");
    Document::try_from(value).expect("objectDefinition is a mapping")
}

/// Returns the subject names of a binding.
pub fn subject_names(binding: &Document) -> Vec<String> {
    binding
        .get(&["subjects"])
        .and_then(Value::as_sequence)
        .map(|subjects| {
            subjects
                .iter()
                .filter_map(|subject| subject.get("name").and_then(Value::as_str))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Telemetry sink that records event labels.
#[derive(Default)]
pub struct RecordingTelemetry {
    /// Recorded events.
    pub events: Mutex<Vec<WrapEvent>>,
}

impl RecordingTelemetry {
    /// Returns recorded event labels in order.
    pub fn labels(&self) -> Vec<&'static str> {
        self.events.lock().unwrap().iter().map(WrapEvent::as_str).collect()
    }
}

impl WrapTelemetry for RecordingTelemetry {
    fn record(&self, event: &WrapEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}
