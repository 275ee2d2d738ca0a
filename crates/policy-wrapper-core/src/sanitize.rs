// crates/policy-wrapper-core/src/sanitize.rs
// ============================================================================
// Module: Annotation Sanitizer
// Description: Removal of pipeline-internal annotations from documents.
// Purpose: Keep transient bookkeeping keys out of wrapped and emitted output.
// Dependencies: crate::document
// ============================================================================

//! ## Overview
//! Manifest pipelines attach bookkeeping annotations (source path, index,
//! resource ids) to every document they stream. They must not leak into the
//! wrapped objects, so the sanitizer clears them in an explicit pass that
//! takes ownership of the batch and hands it back.
//! Invariants:
//! - Sanitizing is idempotent.
//! - Non-internal annotations are left untouched.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::document::Document;
use crate::document::DocumentError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Prefix shared by pipeline-internal annotations.
pub const INTERNAL_ANNOTATION_PREFIX: &str = "internal.config.kubernetes.io/";

/// Legacy internal annotations that predate the prefix.
pub const LEGACY_INTERNAL_ANNOTATIONS: &[&str] =
    &["config.kubernetes.io/path", "config.kubernetes.io/index", "config.k8s.io/id"];

/// Cross-tool resource identifier annotation.
pub const RESOURCE_ID_ANNOTATION: &str = "kustomize.config.k8s.io/id";

// ============================================================================
// SECTION: Types
// ============================================================================

/// A sanitized batch.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Sanitized {
    /// Documents with internal annotations cleared, in input order.
    pub documents: Vec<Document>,
    /// Number of annotations removed across the batch.
    pub removed: usize,
}

// ============================================================================
// SECTION: Sanitizer
// ============================================================================

/// Returns true when `key` is a pipeline-internal annotation.
#[must_use]
pub fn is_internal_annotation(key: &str) -> bool {
    key.starts_with(INTERNAL_ANNOTATION_PREFIX)
        || LEGACY_INTERNAL_ANNOTATIONS.contains(&key)
        || key == RESOURCE_ID_ANNOTATION
}

/// Clears internal annotations from one document.
///
/// # Errors
///
/// Returns [`DocumentError::NotAMapping`] when `metadata` or
/// `metadata.annotations` is present but not a mapping.
pub fn sanitize_document(document: &mut Document) -> Result<usize, DocumentError> {
    let mut removed = usize::from(document.clear_annotation(RESOURCE_ID_ANNOTATION)?);
    for key in document.annotation_keys() {
        if is_internal_annotation(&key) && document.clear_annotation(&key)? {
            removed += 1;
        }
    }
    Ok(removed)
}

/// Clears internal annotations from every document in `batch`.
///
/// # Errors
///
/// Returns the first [`DocumentError`]; the whole batch is abandoned.
pub fn sanitize(batch: Vec<Document>) -> Result<Sanitized, DocumentError> {
    let mut sanitized = Sanitized {
        documents: Vec::with_capacity(batch.len()),
        removed: 0,
    };
    for mut document in batch {
        sanitized.removed += sanitize_document(&mut document)?;
        sanitized.documents.push(document);
    }
    Ok(sanitized)
}
