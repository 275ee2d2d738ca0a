// crates/policy-wrapper-core/tests/config_load.rs
// ============================================================================
// Module: Config Loading Tests
// Description: Transformer config decoding and file loading.
// Purpose: Validate dialect dispatch, defaults, limits, and rejection paths.
// Dependencies: policy-wrapper-core, tempfile
// ============================================================================

//! ## Overview
//! Loads transformer configs from strings and temp files and checks both the
//! resolved options and every rejection category.

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

use std::fs;

use common::TestResult;
use common::ensure;
use common::transformer_config;
use policy_wrapper_core::ConfigError;
use policy_wrapper_core::Dialect;
use policy_wrapper_core::NonPolicyHandling;
use policy_wrapper_core::PlacementFamily;
use policy_wrapper_core::TransformerConfig;
use policy_wrapper_core::WrapError;
use policy_wrapper_core::WrapperConfig;
use policy_wrapper_core::config::MAX_CONFIG_FILE_SIZE;
use policy_wrapper_core::transform;

/// Resolves a transformer config from YAML text.
fn resolve(text: &str) -> Result<WrapperConfig, ConfigError> {
    WrapperConfig::from_transformer(&TransformerConfig::parse(text)?)
}

// ============================================================================
// SECTION: Decoding
// ============================================================================

#[test]
fn policy_dialect_defaults_apply_to_unset_keys() -> TestResult {
    let config = resolve(
        "apiVersion: policy.open-cluster-management.io/v1\nkind: PolicyWrapper\nmetadata:\n  name: \
         demo\nspec:\n  disabled: true\n",
    )
    .map_err(|err| err.to_string())?;
    let WrapperConfig::Policy(options) = &config else {
        return Err(format!("unexpected dialect {:?}", config.dialect()));
    };
    ensure(options.disabled, "explicit value kept")?;
    ensure(options.consolidate_manifests, "consolidateManifests defaults to true")?;
    ensure(!options.consolidate_placements, "consolidatePlacements defaults to false")?;
    ensure(options.placement.ignore_existing, "ignoreExisting defaults to true")?;
    ensure(
        options.non_policy_handling() == NonPolicyHandling::PassThrough,
        "non-policies pass through by default",
    )?;
    ensure(options.placement.family() == PlacementFamily::LabelSelector, "default family")?;
    ensure(config.base_name() == "demo", "base name from metadata")?;
    Ok(())
}

#[test]
fn configuration_policy_defaults_without_spec() -> TestResult {
    let config = resolve("kind: ConfigurationPolicyWrapper\nmetadata:\n  name: demo\n")
        .map_err(|err| err.to_string())?;
    let WrapperConfig::ConfigurationPolicy(options) = &config else {
        return Err("expected configuration-policy dialect".to_string());
    };
    ensure(options.compliance_type == "musthave", "complianceType default")?;
    ensure(options.remediation_action == "inform", "remediationAction default")?;
    ensure(options.consolidate_manifests, "consolidateManifests default")?;
    ensure(config.dialect() == Dialect::ConfigurationPolicy, "dialect")?;
    Ok(())
}

#[test]
fn metadata_name_overrides_policy_name() -> TestResult {
    let config =
        resolve("kind: PolicyWrapper\nmetadata:\n  name: outer\nspec:\n  policyName: inner\n")
            .map_err(|err| err.to_string())?;
    ensure(config.base_name() == "outer", "metadata.name wins")?;
    Ok(())
}

#[test]
fn unknown_kind_is_rejected() -> TestResult {
    let err = resolve("kind: SomethingElse\nmetadata:\n  name: demo\n").err();
    ensure(
        err == Some(ConfigError::UnknownKind("SomethingElse".to_string())),
        format!("unexpected result {err:?}"),
    )?;
    Ok(())
}

#[test]
fn unknown_kind_fails_the_whole_transform() -> TestResult {
    let config = transformer_config("Mystery", "demo", "");
    let result = transform(&config, Vec::new());
    ensure(
        matches!(result, Err(WrapError::Config(ConfigError::UnknownKind(_)))),
        "config errors surface before synthesis",
    )?;
    Ok(())
}

#[test]
fn blank_name_is_rejected() -> TestResult {
    let err = resolve("kind: PolicyWrapper\nmetadata:\n  name: '  '\n").err();
    ensure(matches!(err, Some(ConfigError::Invalid(_))), format!("unexpected result {err:?}"))?;
    Ok(())
}

#[test]
fn surrounding_whitespace_in_name_is_kept() -> TestResult {
    let config = resolve("kind: PolicyWrapper\nmetadata:\n  name: ' demo '\n")
        .map_err(|err| err.to_string())?;
    ensure(config.base_name() == " demo ", format!("unexpected name '{}'", config.base_name()))?;
    Ok(())
}

#[test]
fn misspelled_option_is_rejected() -> TestResult {
    let text =
        "kind: PolicyWrapper\nmetadata:\n  name: demo\nspec:\n  consolidatePlacement: true\n";
    let err = resolve(text).err();
    ensure(matches!(err, Some(ConfigError::Parse(_))), format!("unexpected result {err:?}"))?;
    Ok(())
}

#[test]
fn wrongly_typed_option_is_rejected() -> TestResult {
    let text = "kind: PolicyWrapper\nmetadata:\n  name: demo\nspec:\n  categories: nope\n";
    let err = resolve(text).err();
    ensure(matches!(err, Some(ConfigError::Parse(_))), format!("unexpected result {err:?}"))?;
    Ok(())
}

// ============================================================================
// SECTION: File Loading
// ============================================================================

#[test]
fn load_reads_config_file() -> TestResult {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    let path = dir.path().join("wrapper.yaml");
    fs::write(
        &path,
        "kind: PolicyWrapper\nmetadata:\n  name: from-file\nspec:\n  placement:\n    \
         clusterSelectors:\n      env: prod\n",
    )
    .map_err(|err| err.to_string())?;
    let config = TransformerConfig::load(&path).map_err(|err| err.to_string())?;
    let resolved = WrapperConfig::from_transformer(&config).map_err(|err| err.to_string())?;
    let WrapperConfig::Policy(options) = resolved else {
        return Err("expected policy dialect".to_string());
    };
    ensure(options.policy_name == "from-file", "name loaded")?;
    ensure(options.placement.family() == PlacementFamily::NameSelector, "cluster selectors")?;
    Ok(())
}

#[test]
fn load_rejects_missing_file() -> TestResult {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    let err = TransformerConfig::load(&dir.path().join("absent.yaml")).err();
    ensure(matches!(err, Some(ConfigError::Io(_))), format!("unexpected result {err:?}"))?;
    Ok(())
}

#[test]
fn load_rejects_oversized_file() -> TestResult {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    let path = dir.path().join("big.yaml");
    let mut text = String::from("kind: PolicyWrapper\nmetadata:\n  name: demo\n");
    text.push_str(&"#".repeat(MAX_CONFIG_FILE_SIZE));
    fs::write(&path, text).map_err(|err| err.to_string())?;
    let err = TransformerConfig::load(&path).err();
    ensure(matches!(err, Some(ConfigError::Invalid(_))), format!("unexpected result {err:?}"))?;
    Ok(())
}

#[test]
fn load_rejects_non_utf8() -> TestResult {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    let path = dir.path().join("binary.yaml");
    fs::write(&path, b"kind: \xff\xfe").map_err(|err| err.to_string())?;
    let err = TransformerConfig::load(&path).err();
    ensure(matches!(err, Some(ConfigError::Invalid(_))), format!("unexpected result {err:?}"))?;
    Ok(())
}

#[test]
fn load_rejects_malformed_yaml() -> TestResult {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    let path = dir.path().join("broken.yaml");
    fs::write(&path, "kind: [unterminated\n").map_err(|err| err.to_string())?;
    let err = TransformerConfig::load(&path).err();
    ensure(matches!(err, Some(ConfigError::Parse(_))), format!("unexpected result {err:?}"))?;
    Ok(())
}
