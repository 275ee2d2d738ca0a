// crates/policy-wrapper-core/src/signatures.rs
// ============================================================================
// Module: Resource Signatures
// Description: Closed table of governance and placement API groups and kinds.
// Purpose: Keep every recognized (group, version, kind) in one place.
// Dependencies: crate::document, serde
// ============================================================================

//! ## Overview
//! The engine recognizes and synthesizes a fixed set of resource kinds. They
//! are compile-time constants; nothing here is configurable.
//! Invariants:
//! - A document is a policy iff its `apiVersion` equals
//!   [`POLICY_API_VERSION`] and its kind ends with [`POLICY_KIND_SUFFIX`].
//! - Placement recognition is limited to the two [`PlacementFamily`] members.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Serialize;

use crate::document::Document;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// API group of governance policy resources.
pub const POLICY_API_GROUP: &str = "policy.open-cluster-management.io";
/// Full `apiVersion` of governance policy resources.
pub const POLICY_API_VERSION: &str = "policy.open-cluster-management.io/v1";
/// Kind suffix shared by every governance policy kind.
pub const POLICY_KIND_SUFFIX: &str = "Policy";

// ============================================================================
// SECTION: Signatures
// ============================================================================

/// A fixed (group, version, kind) triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceSignature {
    /// API group.
    pub api_group: &'static str,
    /// Full `apiVersion` string.
    pub api_version: &'static str,
    /// Resource kind.
    pub kind: &'static str,
}

impl ResourceSignature {
    /// Returns a fresh document carrying this signature's version and kind.
    #[must_use]
    pub fn new_document(self) -> Document {
        Document::new(self.api_version, self.kind)
    }
}

/// Governance policy wrapper.
pub const POLICY: ResourceSignature = ResourceSignature {
    api_group: POLICY_API_GROUP,
    api_version: POLICY_API_VERSION,
    kind: "Policy",
};

/// Configuration policy wrapper.
pub const CONFIGURATION_POLICY: ResourceSignature = ResourceSignature {
    api_group: POLICY_API_GROUP,
    api_version: POLICY_API_VERSION,
    kind: "ConfigurationPolicy",
};

/// Placement-to-policy binding.
pub const PLACEMENT_BINDING: ResourceSignature = ResourceSignature {
    api_group: POLICY_API_GROUP,
    api_version: POLICY_API_VERSION,
    kind: "PlacementBinding",
};

/// Label-selector placement.
pub const PLACEMENT: ResourceSignature = ResourceSignature {
    api_group: "cluster.open-cluster-management.io",
    api_version: "cluster.open-cluster-management.io/v1beta1",
    kind: "Placement",
};

/// Name-selector placement rule.
pub const PLACEMENT_RULE: ResourceSignature = ResourceSignature {
    api_group: "apps.open-cluster-management.io",
    api_version: "apps.open-cluster-management.io/v1",
    kind: "PlacementRule",
};

// ============================================================================
// SECTION: Placement Families
// ============================================================================

/// Family of placement resources.
///
/// # Invariants
/// - Each family maps to exactly one [`ResourceSignature`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlacementFamily {
    /// Cluster-name selector placement (`PlacementRule`).
    NameSelector,
    /// Label selector placement (`Placement`).
    LabelSelector,
}

/// Placement families in recognition order.
pub const PLACEMENT_FAMILIES: &[PlacementFamily] =
    &[PlacementFamily::LabelSelector, PlacementFamily::NameSelector];

impl PlacementFamily {
    /// Returns the signature synthesized for this family.
    #[must_use]
    pub const fn signature(self) -> ResourceSignature {
        match self {
            Self::NameSelector => PLACEMENT_RULE,
            Self::LabelSelector => PLACEMENT,
        }
    }

    /// Returns a stable label for the family.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NameSelector => "name_selector",
            Self::LabelSelector => "label_selector",
        }
    }

    /// Returns true when `document` belongs to this family.
    ///
    /// Label-selector placements match on group so any served version is
    /// accepted; placement rules only exist at one version.
    #[must_use]
    pub fn matches(self, document: &Document) -> bool {
        let signature = self.signature();
        if document.kind() != signature.kind {
            return false;
        }
        match self {
            Self::LabelSelector => document.api_group() == signature.api_group,
            Self::NameSelector => document.api_version() == signature.api_version,
        }
    }

    /// Returns the family of `document`, if it is a recognized placement.
    #[must_use]
    pub fn recognize(document: &Document) -> Option<Self> {
        PLACEMENT_FAMILIES.iter().copied().find(|family| family.matches(document))
    }
}

/// Returns true when `document` is a governance policy.
#[must_use]
pub fn is_policy(document: &Document) -> bool {
    document.api_version() == POLICY_API_VERSION && document.kind().ends_with(POLICY_KIND_SUFFIX)
}
