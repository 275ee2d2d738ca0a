// crates/policy-wrapper-core/src/selector.rs
// ============================================================================
// Module: Match Expressions
// Description: Translation of flat selector maps into match-expression lists.
// Purpose: Build the selector clauses used by synthesized placements.
// Dependencies: crate::document, serde_yaml
// ============================================================================

//! ## Overview
//! Selector maps are `key -> value` pairs. A non-empty value becomes an `In`
//! clause with a single value; an empty value becomes an `Exists` clause
//! with an empty value list. Maps are ordered, so the produced list follows
//! sorted key order and repeated builds are identical.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde_yaml::Mapping;
use serde_yaml::Value;

use crate::document::string_list_value;
use crate::document::string_value;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Match-expression operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOperator {
    /// Key must have one of the listed values.
    In,
    /// Key must be present with any value.
    Exists,
}

impl MatchOperator {
    /// Returns the wire label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::In => "In",
            Self::Exists => "Exists",
        }
    }
}

/// One structured selector clause.
///
/// # Invariants
/// - `In` carries exactly one value; `Exists` carries none.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchExpression {
    /// Label key.
    pub key: String,
    /// Clause operator.
    pub operator: MatchOperator,
    /// Values for `In` clauses.
    pub values: Vec<String>,
}

impl MatchExpression {
    /// Translates one selector entry.
    #[must_use]
    pub fn from_entry(key: &str, value: &str) -> Self {
        if value.is_empty() {
            Self {
                key: key.to_string(),
                operator: MatchOperator::Exists,
                values: Vec::new(),
            }
        } else {
            Self {
                key: key.to_string(),
                operator: MatchOperator::In,
                values: vec![value.to_string()],
            }
        }
    }

    /// Renders the clause as a `{key, operator, values}` mapping.
    #[must_use]
    pub fn to_value(&self) -> Value {
        let mut mapping = Mapping::new();
        mapping.insert(string_value("key"), string_value(&self.key));
        mapping.insert(string_value("operator"), string_value(self.operator.as_str()));
        mapping.insert(string_value("values"), string_list_value(&self.values));
        Value::Mapping(mapping)
    }
}

// ============================================================================
// SECTION: Builders
// ============================================================================

/// Builds one match expression per selector entry.
#[must_use]
pub fn build_match_expressions(selector: &BTreeMap<String, String>) -> Vec<MatchExpression> {
    selector.iter().map(|(key, value)| MatchExpression::from_entry(key, value)).collect()
}

/// Builds the YAML sequence of match expressions for a selector.
#[must_use]
pub fn match_expressions_value(selector: &BTreeMap<String, String>) -> Value {
    Value::Sequence(
        build_match_expressions(selector).iter().map(MatchExpression::to_value).collect(),
    )
}
