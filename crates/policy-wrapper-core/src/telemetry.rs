// crates/policy-wrapper-core/src/telemetry.rs
// ============================================================================
// Module: Wrapper Telemetry
// Description: Observability hooks for classification and synthesis steps.
// Purpose: Report engine progress without binding to a logging backend.
// Dependencies: crate::config, crate::signatures, serde
// ============================================================================

//! ## Overview
//! The engine reports what it classified, cleaned, and synthesized through a
//! [`WrapTelemetry`] sink. The default sink discards events; harnesses plug
//! in a log writer or metrics exporter without touching synthesis code.
//! Events carry names and counts only, never wrapped document bodies.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Serialize;

use crate::config::Dialect;
use crate::signatures::PlacementFamily;

// ============================================================================
// SECTION: Events
// ============================================================================

/// Engine progress event.
///
/// # Invariants
/// - Variant labels are stable for log and metric consumers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum WrapEvent {
    /// The input batch was partitioned.
    Classified {
        /// Number of policy documents.
        policies: usize,
        /// Number of other documents.
        other: usize,
        /// Whether an existing placement was found.
        placement_found: bool,
    },
    /// Internal annotations were cleared.
    Sanitized {
        /// Documents inspected.
        documents: usize,
        /// Annotations removed.
        removed: usize,
    },
    /// A policy wrapper was synthesized.
    PolicySynthesized {
        /// Policy name.
        name: String,
        /// Number of wrapped templates.
        templates: usize,
    },
    /// A placement was synthesized.
    PlacementSynthesized {
        /// Placement name.
        name: String,
        /// Placement family.
        family: PlacementFamily,
    },
    /// An existing placement was reused.
    PlacementReused {
        /// Kind of the reused placement.
        kind: String,
        /// API group of the reused placement.
        api_group: String,
    },
    /// A binding was synthesized.
    BindingSynthesized {
        /// Binding name.
        name: String,
        /// Number of bound policies.
        subjects: usize,
    },
    /// The batch was fully transformed.
    Completed {
        /// Dialect that handled the batch.
        dialect: Dialect,
        /// Number of emitted documents.
        emitted: usize,
    },
}

impl WrapEvent {
    /// Returns a stable label for the event.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Classified {
                ..
            } => "classified",
            Self::Sanitized {
                ..
            } => "sanitized",
            Self::PolicySynthesized {
                ..
            } => "policy_synthesized",
            Self::PlacementSynthesized {
                ..
            } => "placement_synthesized",
            Self::PlacementReused {
                ..
            } => "placement_reused",
            Self::BindingSynthesized {
                ..
            } => "binding_synthesized",
            Self::Completed {
                ..
            } => "completed",
        }
    }
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Sink for engine progress events.
pub trait WrapTelemetry: Send + Sync {
    /// Records one event.
    fn record(&self, event: &WrapEvent);
}

/// No-op telemetry sink.
///
/// # Invariants
/// - Events are intentionally discarded.
pub struct NoopTelemetry;

impl WrapTelemetry for NoopTelemetry {
    fn record(&self, _event: &WrapEvent) {}
}
