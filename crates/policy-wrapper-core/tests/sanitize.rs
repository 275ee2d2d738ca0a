// crates/policy-wrapper-core/tests/sanitize.rs
// ============================================================================
// Module: Sanitizer Tests
// Description: Removal of pipeline-internal annotations.
// Purpose: Validate which keys are removed and that cleaning is idempotent.
// Dependencies: policy-wrapper-core, proptest
// ============================================================================

//! ## Overview
//! Checks internal-annotation detection and the effect of sanitizing a batch.

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

mod common;

use std::collections::BTreeMap;

use common::TestResult;
use common::config_map;
use common::deployment;
use common::doc;
use common::ensure;
use policy_wrapper_core::Document;
use policy_wrapper_core::DocumentError;
use policy_wrapper_core::sanitize;
use policy_wrapper_core::sanitize::is_internal_annotation;
use proptest::prelude::*;

#[test]
fn internal_keys_are_recognized() -> TestResult {
    for key in [
        "internal.config.kubernetes.io/path",
        "internal.config.kubernetes.io/annotations-migration-resource-id",
        "config.kubernetes.io/path",
        "config.kubernetes.io/index",
        "config.k8s.io/id",
        "kustomize.config.k8s.io/id",
    ] {
        ensure(is_internal_annotation(key), format!("{key} should be internal"))?;
    }
    for key in ["team", "config.kubernetes.io/local-config", "kustomize.config.k8s.io/behavior"] {
        ensure(!is_internal_annotation(key), format!("{key} should be kept"))?;
    }
    Ok(())
}

#[test]
fn sanitize_keeps_user_annotations_and_order() -> TestResult {
    let result = sanitize(vec![config_map("a"), deployment("b"), config_map("c")])
        .map_err(|err| err.to_string())?;
    ensure(result.removed == 4, format!("expected four removals, got {}", result.removed))?;
    let names: Vec<&str> = result.documents.iter().map(Document::name).collect();
    ensure(names == vec!["a", "b", "c"], "order preserved")?;
    for document in &result.documents {
        let annotations = document.annotations();
        ensure(
            annotations.keys().all(|key| !is_internal_annotation(key)),
            "no internal keys left",
        )?;
    }
    ensure(
        result.documents[0].annotations().get("team").map(String::as_str) == Some("platform"),
        "user annotation kept",
    )?;
    Ok(())
}

#[test]
fn emptied_annotation_map_is_removed() -> TestResult {
    let mut document = deployment("web");
    document
        .set_annotations(&BTreeMap::from([(
            "config.k8s.io/id".to_string(),
            "1".to_string(),
        )]))
        .map_err(|err| err.to_string())?;
    let result = sanitize(vec![document]).map_err(|err| err.to_string())?;
    ensure(result.removed == 1, "one removal")?;
    ensure(result.documents[0].get(&["metadata", "annotations"]).is_none(), "map removed")?;
    Ok(())
}

#[test]
fn sequence_annotations_are_rejected() -> TestResult {
    let odd = doc(
        "apiVersion: v1\nkind: ConfigMap\nmetadata:\n  name: odd\n  annotations:\n    - \
         kustomize.config.k8s.io/id\n",
    );
    let err = sanitize(vec![deployment("web"), odd]).err();
    ensure(
        err == Some(DocumentError::NotAMapping {
            path: "metadata.annotations".to_string(),
        }),
        format!("unexpected result {err:?}"),
    )?;
    Ok(())
}

#[test]
fn scalar_metadata_is_rejected() -> TestResult {
    let odd = doc("apiVersion: v1\nkind: ConfigMap\nmetadata: odd\n");
    let err = sanitize(vec![odd]).err();
    ensure(
        err == Some(DocumentError::NotAMapping {
            path: "metadata".to_string(),
        }),
        format!("unexpected result {err:?}"),
    )?;
    Ok(())
}

proptest! {
    #[test]
    fn sanitizing_twice_changes_nothing(
        annotations in prop::collection::btree_map(
            prop_oneof![
                Just("internal.config.kubernetes.io/path".to_string()),
                Just("config.kubernetes.io/index".to_string()),
                Just("kustomize.config.k8s.io/id".to_string()),
                "[a-z]{1,6}(/[a-z]{1,6})?",
            ],
            "[a-z]{0,6}",
            0 .. 8,
        ),
    ) {
        let mut document = deployment("web");
        document.set_annotations(&annotations).unwrap();
        let once = sanitize(vec![document]).unwrap();
        let twice = sanitize(once.documents.clone()).unwrap();
        prop_assert_eq!(twice.removed, 0);
        prop_assert_eq!(&twice.documents, &once.documents);
        let expected: BTreeMap<String, String> = annotations
            .into_iter()
            .filter(|(key, _)| !is_internal_annotation(key))
            .collect();
        prop_assert_eq!(once.documents[0].annotations(), expected);
    }
}
