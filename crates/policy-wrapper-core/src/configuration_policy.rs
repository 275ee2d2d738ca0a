// crates/policy-wrapper-core/src/configuration_policy.rs
// ============================================================================
// Module: Configuration Policy Wrapper
// Description: Wraps every input document into configuration policies.
// Purpose: Implement the minimal configuration-policy dialect.
// Dependencies: crate::config, crate::document, crate::sanitize
// ============================================================================

//! ## Overview
//! The configuration-policy dialect wraps every input document as an
//! `object-templates` entry. In consolidated mode one policy named after the
//! base name carries every entry; in split mode each document gets its own
//! policy named `<base>-<index>`. Nothing is passed through.
//! Invariants:
//! - Every input document yields exactly one template entry, in input order.
//! - Optional spec fields are only written when configured non-empty.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use serde_yaml::Mapping;
use serde_yaml::Value;

use crate::config::ConfigurationPolicyOptions;
use crate::config::Dialect;
use crate::document::Document;
use crate::document::DocumentError;
use crate::document::string_list_value;
use crate::document::string_map_value;
use crate::document::string_value;
use crate::sanitize::sanitize;
use crate::signatures::CONFIGURATION_POLICY;
use crate::telemetry::NoopTelemetry;
use crate::telemetry::WrapEvent;
use crate::telemetry::WrapTelemetry;
use crate::transformer::WrapError;
use crate::transformer::Wrapper;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Field holding wrapped object templates.
pub const OBJECT_TEMPLATES_FIELD: &str = "object-templates";

// ============================================================================
// SECTION: Wrapper
// ============================================================================

/// Configuration-policy dialect wrapper.
pub struct ConfigurationPolicyWrapper {
    /// Resolved dialect options.
    options: ConfigurationPolicyOptions,
    /// Progress sink.
    telemetry: Arc<dyn WrapTelemetry>,
}

impl ConfigurationPolicyWrapper {
    /// Creates a wrapper with the no-op telemetry sink.
    #[must_use]
    pub fn new(options: ConfigurationPolicyOptions) -> Self {
        Self {
            options,
            telemetry: Arc::new(NoopTelemetry),
        }
    }

    /// Replaces the telemetry sink.
    #[must_use]
    pub fn with_telemetry(mut self, telemetry: Arc<dyn WrapTelemetry>) -> Self {
        self.telemetry = telemetry;
        self
    }

    /// Returns the resolved options.
    #[must_use]
    pub const fn options(&self) -> &ConfigurationPolicyOptions {
        &self.options
    }

    /// Builds the template entry wrapping `resource`.
    #[must_use]
    pub fn wrap_resource(&self, resource: Document) -> Value {
        let mut entry = Mapping::new();
        entry.insert(string_value("objectDefinition"), resource.into_value());
        if !self.options.compliance_type.is_empty() {
            entry.insert(
                string_value("complianceType"),
                string_value(&self.options.compliance_type),
            );
        }
        if !self.options.metadata_compliance_type.is_empty() {
            entry.insert(
                string_value("metadataComplianceType"),
                string_value(&self.options.metadata_compliance_type),
            );
        }
        Value::Mapping(entry)
    }

    /// Builds an empty configuration policy named `name`.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError`] when a spec field cannot be written.
    pub fn new_policy(&self, name: &str) -> Result<Document, DocumentError> {
        let options = &self.options;
        let mut policy = CONFIGURATION_POLICY.new_document();
        policy.set_name(name)?;

        if !options.annotations.is_empty() {
            policy.set_annotations(&options.annotations)?;
        }

        let interval = &options.evaluation_interval;
        if !interval.compliant.is_empty() {
            policy.set_field(
                &["spec", "evaluationInterval", "compliant"],
                string_value(&interval.compliant),
            )?;
        }
        if !interval.non_compliant.is_empty() {
            policy.set_field(
                &["spec", "evaluationInterval", "noncompliant"],
                string_value(&interval.non_compliant),
            )?;
        }

        let selector = &options.namespace_selector;
        if !selector.include.is_empty() {
            policy.set_field(
                &["spec", "namespaceSelector", "include"],
                string_list_value(&selector.include),
            )?;
        }
        if !selector.exclude.is_empty() {
            policy.set_field(
                &["spec", "namespaceSelector", "exclude"],
                string_list_value(&selector.exclude),
            )?;
        }
        if !selector.match_labels.is_empty() {
            policy.set_field(
                &["spec", "namespaceSelector", "matchLabels"],
                string_map_value(&selector.match_labels),
            )?;
        }
        for expression in &selector.match_expressions {
            policy.append(
                &["spec", "namespaceSelector", "matchExpressions"],
                Value::Mapping(expression.clone()),
            )?;
        }

        if !options.prune_object_behavior.is_empty() {
            policy.set_field(
                &["spec", "pruneObjectBehavior"],
                string_value(&options.prune_object_behavior),
            )?;
        }
        if !options.remediation_action.is_empty() {
            policy.set_field(
                &["spec", "remediationAction"],
                string_value(&options.remediation_action),
            )?;
        }
        if !options.severity.is_empty() {
            policy.set_field(&["spec", "severity"], string_value(&options.severity))?;
        }

        Ok(policy)
    }

    /// Appends one wrapped template to `policy`.
    fn append_template(&self, policy: &mut Document, resource: Document) -> Result<(), WrapError> {
        policy.append(&["spec", OBJECT_TEMPLATES_FIELD], self.wrap_resource(resource))?;
        Ok(())
    }

    /// Reports a synthesized policy.
    fn record_policy(&self, name: &str, templates: usize) {
        self.telemetry.record(&WrapEvent::PolicySynthesized {
            name: name.to_string(),
            templates,
        });
    }
}

impl Wrapper for ConfigurationPolicyWrapper {
    fn wrap(&self, batch: Vec<Document>) -> Result<Vec<Document>, WrapError> {
        let documents = batch.len();
        let sanitized = sanitize(batch)?;
        self.telemetry.record(&WrapEvent::Sanitized {
            documents,
            removed: sanitized.removed,
        });

        let base = self.options.policy_name.as_str();
        let out = if self.options.consolidate_manifests {
            let mut policy = self.new_policy(base)?;
            for resource in sanitized.documents {
                self.append_template(&mut policy, resource)?;
            }
            self.record_policy(base, documents);
            vec![policy]
        } else {
            let mut out = Vec::with_capacity(documents);
            for (index, resource) in sanitized.documents.into_iter().enumerate() {
                let name = format!("{base}-{index}");
                let mut policy = self.new_policy(&name)?;
                self.append_template(&mut policy, resource)?;
                self.record_policy(&name, 1);
                out.push(policy);
            }
            out
        };

        self.telemetry.record(&WrapEvent::Completed {
            dialect: Dialect::ConfigurationPolicy,
            emitted: out.len(),
        });
        Ok(out)
    }
}
