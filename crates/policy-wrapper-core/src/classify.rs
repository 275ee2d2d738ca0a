// crates/policy-wrapper-core/src/classify.rs
// ============================================================================
// Module: Resource Classifier
// Description: Partition of an input batch into policies and other documents.
// Purpose: Locate wrapped policies and any existing placement in the input.
// Dependencies: crate::document, crate::signatures
// ============================================================================

//! ## Overview
//! Classification is a structural filter over a borrowed batch: it never
//! copies, drops, or reorders documents within a partition.
//! Invariants:
//! - `policies` and `other` together hold every input document exactly once.
//! - `placement` is the first document of `other` in a recognized
//!   [`PlacementFamily`], or `None`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::document::Document;
use crate::signatures::PlacementFamily;
use crate::signatures::is_policy;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Result of classifying one input batch.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Classification<'a> {
    /// Governance policy documents in input order.
    pub policies: Vec<&'a Document>,
    /// Every other document in input order.
    pub other: Vec<&'a Document>,
    /// First recognized placement among `other`.
    pub placement: Option<&'a Document>,
}

impl Classification<'_> {
    /// Returns the family of the identified placement, if any.
    #[must_use]
    pub fn placement_family(&self) -> Option<PlacementFamily> {
        self.placement.and_then(PlacementFamily::recognize)
    }
}

// ============================================================================
// SECTION: Classification
// ============================================================================

/// Splits `batch` into policies, other documents, and an existing placement.
#[must_use]
pub fn classify(batch: &[Document]) -> Classification<'_> {
    let (policies, other): (Vec<&Document>, Vec<&Document>) =
        batch.iter().partition(|document| is_policy(document));
    let placement =
        other.iter().copied().find(|document| PlacementFamily::recognize(document).is_some());
    Classification {
        policies,
        other,
        placement,
    }
}
