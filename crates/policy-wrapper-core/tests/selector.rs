// crates/policy-wrapper-core/tests/selector.rs
// ============================================================================
// Module: Selector Translation Tests
// Description: Label selector to match-expression translation.
// Purpose: Validate operator choice, ordering, and emitted shape.
// Dependencies: policy-wrapper-core, proptest, serde_yaml
// ============================================================================

//! ## Overview
//! Covers the `In`/`Exists` translation rule and the YAML shape of emitted
//! match expressions.

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
use common::ensure;
use policy_wrapper_core::MatchExpression;
use policy_wrapper_core::MatchOperator;
use policy_wrapper_core::build_match_expressions;
use proptest::prelude::*;
use serde_yaml::Value;

#[test]
fn values_select_in_and_blanks_select_exists() -> TestResult {
    let selector = BTreeMap::from([
        ("zone".to_string(), "a".to_string()),
        ("gpu".to_string(), String::new()),
    ]);
    let expressions = build_match_expressions(&selector);
    let expected = vec![
        MatchExpression {
            key: "gpu".to_string(),
            operator: MatchOperator::Exists,
            values: Vec::new(),
        },
        MatchExpression {
            key: "zone".to_string(),
            operator: MatchOperator::In,
            values: vec!["a".to_string()],
        },
    ];
    ensure(expressions == expected, format!("unexpected expressions {expressions:?}"))?;
    Ok(())
}

#[test]
fn exists_expression_emits_empty_values_list() -> TestResult {
    let value = MatchExpression::from_entry("gpu", "").to_value();
    ensure(value.get("key").and_then(Value::as_str) == Some("gpu"), "key")?;
    ensure(value.get("operator").and_then(Value::as_str) == Some("Exists"), "operator")?;
    let values = value.get("values").and_then(Value::as_sequence).ok_or("values missing")?;
    ensure(values.is_empty(), "Exists carries an explicit empty list")?;
    Ok(())
}

#[test]
fn empty_selector_yields_no_expressions() -> TestResult {
    ensure(build_match_expressions(&BTreeMap::new()).is_empty(), "no expressions expected")
}

proptest! {
    #[test]
    fn one_expression_per_entry_in_key_order(
        selector in prop::collection::btree_map("[a-z]{1,8}", "[a-z0-9]{0,4}", 0 .. 10),
    ) {
        let expressions = build_match_expressions(&selector);
        prop_assert_eq!(expressions.len(), selector.len());
        for (expression, (key, value)) in expressions.iter().zip(&selector) {
            prop_assert_eq!(&expression.key, key);
            if value.is_empty() {
                prop_assert_eq!(expression.operator, MatchOperator::Exists);
                prop_assert!(expression.values.is_empty());
            } else {
                prop_assert_eq!(expression.operator, MatchOperator::In);
                prop_assert_eq!(&expression.values, &vec![value.clone()]);
            }
        }
    }
}
