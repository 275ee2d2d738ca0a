// crates/policy-wrapper-core/src/policy.rs
// ============================================================================
// Module: Policy Wrapper
// Description: Policy, placement, and binding synthesis for the policy dialect.
// Purpose: Wrap manifests into governance policies bound to cluster placements.
// Dependencies: crate::classify, crate::config, crate::document, crate::selector
// ============================================================================

//! ## Overview
//! The policy dialect wraps documents into `Policy` resources and binds them
//! to a placement through a `PlacementBinding`. The run is driven by three
//! flags:
//! - `consolidateManifests`: one policy for the whole batch, or one policy
//!   named `<base>-<index>` per document.
//! - `consolidatePlacements` (split mode only): one placement and binding per
//!   policy, or a single placement and binding shared by every policy.
//! - `placement.ignoreExisting`: whether a placement already present in the
//!   input is reused instead of synthesizing `placement-<base>`.
//!
//! Output order is policies, placements, bindings, then pass-through
//! documents.
//!
//! Invariants:
//! - A binding always references `placement-<base>`, even when it points at a
//!   reused placement with a different actual name.
//! - Split-mode policy names are unique within a batch.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_yaml::Mapping;
use serde_yaml::Value;

use crate::classify::classify;
use crate::config::Dialect;
use crate::config::NonPolicyHandling;
use crate::config::PolicyOptions;
use crate::document::Document;
use crate::document::DocumentError;
use crate::document::string_value;
use crate::sanitize::sanitize;
use crate::selector::match_expressions_value;
use crate::signatures::PLACEMENT_BINDING;
use crate::signatures::POLICY;
use crate::signatures::POLICY_API_GROUP;
use crate::signatures::PlacementFamily;
use crate::signatures::is_policy;
use crate::telemetry::NoopTelemetry;
use crate::telemetry::WrapEvent;
use crate::telemetry::WrapTelemetry;
use crate::transformer::WrapError;
use crate::transformer::Wrapper;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Field holding wrapped policy templates.
pub const POLICY_TEMPLATES_FIELD: &str = "policy-templates";
/// Category annotation key.
pub const CATEGORIES_ANNOTATION: &str = "policy.open-cluster-management.io/categories";
/// Control annotation key.
pub const CONTROLS_ANNOTATION: &str = "policy.open-cluster-management.io/controls";
/// Standard annotation key.
pub const STANDARDS_ANNOTATION: &str = "policy.open-cluster-management.io/standards";
/// Name prefix of synthesized placements.
pub const PLACEMENT_PREFIX: &str = "placement-";
/// Name prefix of synthesized bindings.
pub const BINDING_PREFIX: &str = "binding-";

// ============================================================================
// SECTION: Naming
// ============================================================================

/// Returns the placement name for a base name.
#[must_use]
pub fn placement_name(base: &str) -> String {
    format!("{PLACEMENT_PREFIX}{base}")
}

/// Returns the binding name for a base name.
#[must_use]
pub fn binding_name(base: &str) -> String {
    format!("{BINDING_PREFIX}{base}")
}

// ============================================================================
// SECTION: Run Output
// ============================================================================

/// Output slots assembled during one run.
#[derive(Default)]
struct RunOutput {
    /// Synthesized policies.
    policies: Vec<Document>,
    /// Synthesized or reused placements.
    placements: Vec<Document>,
    /// Synthesized bindings.
    bindings: Vec<Document>,
    /// Documents emitted unchanged.
    pass_through: Vec<Document>,
}

impl RunOutput {
    /// Concatenates the slots in output order.
    fn into_batch(self) -> Vec<Document> {
        let mut out = self.policies;
        out.extend(self.placements);
        out.extend(self.bindings);
        out.extend(self.pass_through);
        out
    }
}

// ============================================================================
// SECTION: Wrapper
// ============================================================================

/// Policy dialect wrapper.
pub struct PolicyWrapper {
    /// Resolved dialect options.
    options: PolicyOptions,
    /// Progress sink.
    telemetry: Arc<dyn WrapTelemetry>,
}

impl PolicyWrapper {
    /// Creates a wrapper with the no-op telemetry sink.
    #[must_use]
    pub fn new(options: PolicyOptions) -> Self {
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
    pub const fn options(&self) -> &PolicyOptions {
        &self.options
    }

    // ------------------------------------------------------------------------
    // Synthesis
    // ------------------------------------------------------------------------

    /// Builds the template entry wrapping `resource`.
    #[must_use]
    pub fn wrap_resource(resource: Document) -> Value {
        let mut entry = Mapping::new();
        entry.insert(string_value("objectDefinition"), resource.into_value());
        Value::Mapping(entry)
    }

    /// Builds an empty policy named `name`.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError`] when a field cannot be written.
    pub fn new_policy(&self, name: &str) -> Result<Document, DocumentError> {
        let options = &self.options;
        let mut policy = POLICY.new_document();
        policy.set_name(name)?;

        let annotations: BTreeMap<String, String> = [
            (CATEGORIES_ANNOTATION, &options.categories),
            (CONTROLS_ANNOTATION, &options.controls),
            (STANDARDS_ANNOTATION, &options.standards),
        ]
        .into_iter()
        .map(|(key, values)| (key.to_string(), values.join(",")))
        .collect();
        policy.set_annotations(&annotations)?;

        if options.disabled {
            policy.set_field(&["spec", "disabled"], Value::Bool(true))?;
        }
        if !options.remediation_action.is_empty() {
            policy.set_field(
                &["spec", "remediationAction"],
                string_value(&options.remediation_action),
            )?;
        }
        Ok(policy)
    }

    /// Builds the placement `placement-<base>`.
    ///
    /// Cluster-name selectors produce a `PlacementRule`; otherwise a
    /// `Placement` with a single label-selector predicate is produced.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError`] when a field cannot be written.
    pub fn new_placement(&self, base: &str) -> Result<Document, DocumentError> {
        let placement_options = &self.options.placement;
        let family = placement_options.family();
        let mut placement = family.signature().new_document();
        match family {
            PlacementFamily::NameSelector => {
                placement.set_field(
                    &["spec", "clusterSelector", "matchExpressions"],
                    match_expressions_value(&placement_options.cluster_selectors),
                )?;
            }
            PlacementFamily::LabelSelector => {
                let mut predicate = Document::default();
                predicate.set_field(
                    &["requiredClusterSelector", "labelSelector", "matchExpressions"],
                    match_expressions_value(&placement_options.label_selector),
                )?;
                placement.append(&["spec", "predicates"], predicate.into_value())?;
            }
        }
        placement.set_name(&placement_name(base))?;
        Ok(placement)
    }

    /// Builds the binding `binding-<base>`.
    ///
    /// With `existing` set, the placement reference takes that document's
    /// kind and API group; otherwise it targets the family
    /// [`PolicyWrapper::new_placement`] would synthesize. The reference name
    /// is `placement-<base>` either way.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError`] when a field cannot be written.
    pub fn new_placement_binding(
        &self,
        base: &str,
        policies: &[String],
        existing: Option<&Document>,
    ) -> Result<Document, DocumentError> {
        let (kind, api_group) = match existing {
            Some(placement) => (placement.kind().to_string(), placement.api_group().to_string()),
            None => {
                let signature = self.options.placement.family().signature();
                (signature.kind.to_string(), signature.api_group.to_string())
            }
        };

        let mut binding = PLACEMENT_BINDING.new_document();
        binding.set_field(&["placementRef", "name"], string_value(&placement_name(base)))?;
        binding.set_field(&["placementRef", "kind"], string_value(&kind))?;
        binding.set_field(&["placementRef", "apiGroup"], string_value(&api_group))?;

        for policy in policies {
            let mut subject = Mapping::new();
            subject.insert(string_value("name"), string_value(policy));
            subject.insert(string_value("kind"), string_value(POLICY.kind));
            subject.insert(string_value("apiGroup"), string_value(POLICY_API_GROUP));
            binding.append(&["subjects"], Value::Mapping(subject))?;
        }

        binding.set_name(&binding_name(base))?;
        Ok(binding)
    }

    // ------------------------------------------------------------------------
    // Orchestration helpers
    // ------------------------------------------------------------------------

    /// Emits a synthesized placement for `base`.
    fn push_placement(&self, out: &mut RunOutput, base: &str) -> Result<(), WrapError> {
        let placement = self.new_placement(base)?;
        self.telemetry.record(&WrapEvent::PlacementSynthesized {
            name: placement.name().to_string(),
            family: self.options.placement.family(),
        });
        out.placements.push(placement);
        Ok(())
    }

    /// Emits a binding for `base` over `policies`.
    fn push_binding(
        &self,
        out: &mut RunOutput,
        base: &str,
        policies: &[String],
        existing: Option<&Document>,
    ) -> Result<(), WrapError> {
        let binding = self.new_placement_binding(base, policies, existing)?;
        self.telemetry.record(&WrapEvent::BindingSynthesized {
            name: binding.name().to_string(),
            subjects: policies.len(),
        });
        out.bindings.push(binding);
        Ok(())
    }

    /// Emits the shared placement (or reuses `existing`) and its binding.
    ///
    /// Returns whether the existing placement was reused.
    fn push_shared_placement(
        &self,
        out: &mut RunOutput,
        policies: &[String],
        existing: Option<&Document>,
    ) -> Result<bool, WrapError> {
        let base = self.options.policy_name.as_str();
        let reused = if self.options.placement.ignore_existing { None } else { existing };
        match reused {
            Some(placement) => self.telemetry.record(&WrapEvent::PlacementReused {
                kind: placement.kind().to_string(),
                api_group: placement.api_group().to_string(),
            }),
            None => self.push_placement(out, base)?,
        }
        self.push_binding(out, base, policies, reused)?;
        Ok(reused.is_some())
    }
}

impl Wrapper for PolicyWrapper {
    fn wrap(&self, batch: Vec<Document>) -> Result<Vec<Document>, WrapError> {
        let existing = {
            let classification = classify(&batch);
            self.telemetry.record(&WrapEvent::Classified {
                policies: classification.policies.len(),
                other: classification.other.len(),
                placement_found: classification.placement.is_some(),
            });
            classification.placement.cloned()
        };

        let handling = self.options.non_policy_handling();
        let (in_scope, other) = match handling {
            NonPolicyHandling::Wrap => (batch, Vec::new()),
            NonPolicyHandling::PassThrough | NonPolicyHandling::Drop => {
                batch.into_iter().partition(is_policy)
            }
        };

        let documents = in_scope.len() + other.len();
        let in_scope = sanitize(in_scope)?;
        let other = sanitize(other)?;
        self.telemetry.record(&WrapEvent::Sanitized {
            documents,
            removed: in_scope.removed + other.removed,
        });

        let base = self.options.policy_name.as_str();
        let mut out = RunOutput::default();
        let mut reused = false;

        if self.options.consolidate_manifests {
            let mut policy = self.new_policy(base)?;
            let templates = in_scope.documents.len();
            for resource in in_scope.documents {
                policy.append(&["spec", POLICY_TEMPLATES_FIELD], Self::wrap_resource(resource))?;
            }
            self.telemetry.record(&WrapEvent::PolicySynthesized {
                name: base.to_string(),
                templates,
            });
            out.policies.push(policy);
            let subjects = [base.to_string()];
            reused = self.push_shared_placement(&mut out, &subjects, existing.as_ref())?;
        } else {
            let mut policy_names = Vec::with_capacity(in_scope.documents.len());
            for (index, resource) in in_scope.documents.into_iter().enumerate() {
                let name = format!("{base}-{index}");
                let mut policy = self.new_policy(&name)?;
                policy.append(&["spec", POLICY_TEMPLATES_FIELD], Self::wrap_resource(resource))?;
                self.telemetry.record(&WrapEvent::PolicySynthesized {
                    name: name.clone(),
                    templates: 1,
                });
                out.policies.push(policy);

                if !self.options.consolidate_placements {
                    self.push_placement(&mut out, &name)?;
                    self.push_binding(&mut out, &name, std::slice::from_ref(&name), None)?;
                }
                policy_names.push(name);
            }
            if self.options.consolidate_placements {
                reused = self.push_shared_placement(&mut out, &policy_names, existing.as_ref())?;
            }
        }

        match handling {
            NonPolicyHandling::Wrap => {}
            NonPolicyHandling::PassThrough => out.pass_through = other.documents,
            NonPolicyHandling::Drop => {
                if reused {
                    out.placements.extend(
                        other
                            .documents
                            .into_iter()
                            .find(|document| PlacementFamily::recognize(document).is_some()),
                    );
                }
            }
        }

        let out = out.into_batch();
        self.telemetry.record(&WrapEvent::Completed {
            dialect: Dialect::Policy,
            emitted: out.len(),
        });
        Ok(out)
    }
}
