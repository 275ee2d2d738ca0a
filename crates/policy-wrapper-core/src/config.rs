// crates/policy-wrapper-core/src/config.rs
// ============================================================================
// Module: Wrapper Configuration
// Description: Transformer config document and dialect option records.
// Purpose: Decode fail-closed wrapper options with documented defaults.
// Dependencies: serde, serde_yaml, thiserror
// ============================================================================

//! ## Overview
//! A transformer config is a small resource document whose `kind` selects the
//! wrapper dialect and whose `metadata.name` is the base name of everything
//! synthesized. Its `spec` holds the dialect options.
//!
//! Option records deserialize over their `Default` impls, so a key left out
//! of the config keeps its documented default instead of a zero value, and
//! unknown keys are rejected.
//!
//! Security posture: config inputs are untrusted; loading enforces a hard
//! size limit and UTF-8 decoding.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_yaml::Mapping;
use serde_yaml::Value;
use thiserror::Error;

use crate::signatures::PlacementFamily;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum transformer config file size in bytes.
pub const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Default configuration-policy compliance type.
pub const DEFAULT_COMPLIANCE_TYPE: &str = "musthave";
/// Default configuration-policy remediation action.
pub const DEFAULT_REMEDIATION_ACTION: &str = "inform";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration decoding errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// YAML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
    /// The config kind does not name a known wrapper dialect.
    #[error("unknown PolicyTransformer kind '{0}'")]
    UnknownKind(String),
}

// ============================================================================
// SECTION: Dialects
// ============================================================================

/// Wrapper dialect selected by the transformer config `kind`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Dialect {
    /// Minimal configuration-policy wrapper.
    ConfigurationPolicy,
    /// Policy plus placement plus binding wrapper.
    Policy,
}

impl Dialect {
    /// Returns the transformer config kind for the dialect.
    #[must_use]
    pub const fn kind(self) -> &'static str {
        match self {
            Self::ConfigurationPolicy => "ConfigurationPolicyWrapper",
            Self::Policy => "PolicyWrapper",
        }
    }

    /// Resolves a transformer config kind.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownKind`] for any other kind.
    pub fn from_kind(kind: &str) -> Result<Self, ConfigError> {
        [Self::ConfigurationPolicy, Self::Policy]
            .into_iter()
            .find(|dialect| dialect.kind() == kind)
            .ok_or_else(|| ConfigError::UnknownKind(kind.to_string()))
    }
}

// ============================================================================
// SECTION: Transformer Config
// ============================================================================

/// Metadata of the transformer config document.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigMetadata {
    /// Base name for synthesized documents.
    pub name: String,
}

/// The transformer config document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformerConfig {
    /// Config API version (not interpreted).
    #[serde(default)]
    pub api_version: String,
    /// Dialect discriminator.
    pub kind: String,
    /// Config metadata.
    #[serde(default)]
    pub metadata: ConfigMetadata,
    /// Dialect options.
    #[serde(default)]
    pub spec: Option<Value>,
}

impl TransformerConfig {
    /// Parses a transformer config from YAML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] on malformed YAML.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(text).map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Decodes a transformer config from an already parsed YAML value.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the value has the wrong shape.
    pub fn from_value(value: Value) -> Result<Self, ConfigError> {
        serde_yaml::from_value(value).map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Loads a transformer config file with a hard size limit.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] when the file cannot be read,
    /// [`ConfigError::Invalid`] when it is oversized or not UTF-8, and
    /// [`ConfigError::Parse`] on malformed YAML.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let bytes = read_with_limit(path, MAX_CONFIG_FILE_SIZE)?;
        let text = String::from_utf8(bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        Self::parse(&text)
    }

    /// Resolves the dialect selected by `kind`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownKind`] for unknown kinds.
    pub fn dialect(&self) -> Result<Dialect, ConfigError> {
        Dialect::from_kind(&self.kind)
    }
}

// ============================================================================
// SECTION: Configuration Policy Options
// ============================================================================

/// Evaluation interval strings.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EvaluationInterval {
    /// Interval while compliant.
    pub compliant: String,
    /// Interval while non-compliant.
    #[serde(rename = "noncompliant")]
    pub non_compliant: String,
}

/// Namespace selector for configuration policies.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct NamespaceSelector {
    /// Included namespaces.
    pub include: Vec<String>,
    /// Excluded namespaces.
    pub exclude: Vec<String>,
    /// Label equality selector.
    pub match_labels: BTreeMap<String, String>,
    /// Raw label selector expressions, copied verbatim.
    pub match_expressions: Vec<Mapping>,
}

/// Options for the configuration-policy dialect.
///
/// # Invariants
/// - Defaults: `complianceType = musthave`, `consolidateManifests = true`,
///   `remediationAction = inform`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct ConfigurationPolicyOptions {
    /// Annotations placed on each synthesized policy.
    #[serde(rename = "configurationPolicyAnnotations")]
    pub annotations: BTreeMap<String, String>,
    /// Compliance type set on each wrapped object.
    pub compliance_type: String,
    /// Wrap every object into one policy instead of one policy per object.
    pub consolidate_manifests: bool,
    /// Evaluation interval strings.
    pub evaluation_interval: EvaluationInterval,
    /// Metadata compliance type set on each wrapped object.
    pub metadata_compliance_type: String,
    /// Namespace selector.
    pub namespace_selector: NamespaceSelector,
    /// Base name; overwritten by the transformer config name.
    pub policy_name: String,
    /// Prune-object behavior.
    pub prune_object_behavior: String,
    /// Remediation action.
    pub remediation_action: String,
    /// Severity.
    pub severity: String,
}

impl Default for ConfigurationPolicyOptions {
    fn default() -> Self {
        Self {
            annotations: BTreeMap::new(),
            compliance_type: DEFAULT_COMPLIANCE_TYPE.to_string(),
            consolidate_manifests: true,
            evaluation_interval: EvaluationInterval::default(),
            metadata_compliance_type: String::new(),
            namespace_selector: NamespaceSelector::default(),
            policy_name: String::new(),
            prune_object_behavior: String::new(),
            remediation_action: DEFAULT_REMEDIATION_ACTION.to_string(),
            severity: String::new(),
        }
    }
}

// ============================================================================
// SECTION: Policy Options
// ============================================================================

/// Placement options for the policy dialect.
///
/// # Invariants
/// - `ignoreExisting` defaults to true.
/// - A non-empty `clusterSelectors` map selects the name-selector family.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct PlacementOptions {
    /// Synthesize a placement even when the input carries one.
    pub ignore_existing: bool,
    /// Cluster-name selectors.
    pub cluster_selectors: BTreeMap<String, String>,
    /// Cluster label selector.
    pub label_selector: BTreeMap<String, String>,
}

impl Default for PlacementOptions {
    fn default() -> Self {
        Self {
            ignore_existing: true,
            cluster_selectors: BTreeMap::new(),
            label_selector: BTreeMap::new(),
        }
    }
}

impl PlacementOptions {
    /// Returns the placement family synthesized for these options.
    #[must_use]
    pub fn family(&self) -> PlacementFamily {
        if self.cluster_selectors.is_empty() {
            PlacementFamily::LabelSelector
        } else {
            PlacementFamily::NameSelector
        }
    }
}

/// How the policy dialect treats non-policy input documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NonPolicyHandling {
    /// Wrap non-policies alongside policies; nothing is passed through.
    Wrap,
    /// Leave non-policies unwrapped and emit them unchanged.
    PassThrough,
    /// Leave non-policies unwrapped and drop them, keeping a reused placement.
    Drop,
}

/// Options for the policy dialect.
///
/// # Invariants
/// - Defaults: `consolidateManifests = true`, `consolidatePlacements = false`,
///   `disabled = false`, `ignoreNonPolicies = true`, `dropNonPolicies = false`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct PolicyOptions {
    /// Category annotation values.
    pub categories: Vec<String>,
    /// Control annotation values.
    pub controls: Vec<String>,
    /// Standard annotation values.
    pub standards: Vec<String>,
    /// Wrap every object into one policy instead of one policy per object.
    pub consolidate_manifests: bool,
    /// In split mode, bind every policy through one placement.
    pub consolidate_placements: bool,
    /// Mark synthesized policies disabled.
    pub disabled: bool,
    /// Only wrap policy documents.
    pub ignore_non_policies: bool,
    /// Drop unwrapped non-policy documents instead of passing them through.
    pub drop_non_policies: bool,
    /// Placement options.
    pub placement: PlacementOptions,
    /// Base name; overwritten by the transformer config name.
    pub policy_name: String,
    /// Remediation action.
    pub remediation_action: String,
}

impl Default for PolicyOptions {
    fn default() -> Self {
        Self {
            categories: Vec::new(),
            controls: Vec::new(),
            standards: Vec::new(),
            consolidate_manifests: true,
            consolidate_placements: false,
            disabled: false,
            ignore_non_policies: true,
            drop_non_policies: false,
            placement: PlacementOptions::default(),
            policy_name: String::new(),
            remediation_action: String::new(),
        }
    }
}

impl PolicyOptions {
    /// Resolves the two non-policy flags into one handling mode.
    #[must_use]
    pub const fn non_policy_handling(&self) -> NonPolicyHandling {
        match (self.ignore_non_policies, self.drop_non_policies) {
            (false, _) => NonPolicyHandling::Wrap,
            (true, false) => NonPolicyHandling::PassThrough,
            (true, true) => NonPolicyHandling::Drop,
        }
    }
}

// ============================================================================
// SECTION: Wrapper Config
// ============================================================================

/// Fully resolved wrapper configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum WrapperConfig {
    /// Configuration-policy dialect.
    ConfigurationPolicy(ConfigurationPolicyOptions),
    /// Policy dialect.
    Policy(PolicyOptions),
}

impl WrapperConfig {
    /// Resolves the dialect options of a transformer config.
    ///
    /// The base name always comes from `metadata.name`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownKind`] for unknown kinds,
    /// [`ConfigError::Parse`] when the options do not decode, and
    /// [`ConfigError::Invalid`] when the base name is empty.
    pub fn from_transformer(config: &TransformerConfig) -> Result<Self, ConfigError> {
        let dialect = config.dialect()?;
        let name = config.metadata.name.as_str();
        if name.trim().is_empty() {
            return Err(ConfigError::Invalid(format!(
                "{} requires a non-empty metadata.name",
                dialect.kind()
            )));
        }
        match dialect {
            Dialect::ConfigurationPolicy => {
                let mut options: ConfigurationPolicyOptions =
                    decode_options(dialect, config.spec.as_ref())?;
                options.policy_name = name.to_string();
                Ok(Self::ConfigurationPolicy(options))
            }
            Dialect::Policy => {
                let mut options: PolicyOptions = decode_options(dialect, config.spec.as_ref())?;
                options.policy_name = name.to_string();
                Ok(Self::Policy(options))
            }
        }
    }

    /// Returns the dialect of this configuration.
    #[must_use]
    pub const fn dialect(&self) -> Dialect {
        match self {
            Self::ConfigurationPolicy(_) => Dialect::ConfigurationPolicy,
            Self::Policy(_) => Dialect::Policy,
        }
    }

    /// Returns the configured base name.
    #[must_use]
    pub fn base_name(&self) -> &str {
        match self {
            Self::ConfigurationPolicy(options) => &options.policy_name,
            Self::Policy(options) => &options.policy_name,
        }
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Decodes dialect options, treating a missing or `null` spec as defaults.
fn decode_options<T: DeserializeOwned + Default>(
    dialect: Dialect,
    spec: Option<&Value>,
) -> Result<T, ConfigError> {
    match spec {
        None | Some(Value::Null) => Ok(T::default()),
        Some(value) => serde_yaml::from_value(value.clone())
            .map_err(|err| ConfigError::Parse(format!("{} spec: {err}", dialect.kind()))),
    }
}

/// Reads at most `max_bytes` from `path`, failing when the file is larger.
fn read_with_limit(path: &Path, max_bytes: usize) -> Result<Vec<u8>, ConfigError> {
    let file = File::open(path).map_err(|err| ConfigError::Io(err.to_string()))?;
    let size = file.metadata().map_err(|err| ConfigError::Io(err.to_string()))?.len();
    let limit = u64::try_from(max_bytes)
        .map_err(|_| ConfigError::Invalid("config size limit out of range".to_string()))?;
    if size > limit {
        return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
    }
    let mut bytes = Vec::new();
    file.take(limit.saturating_add(1))
        .read_to_end(&mut bytes)
        .map_err(|err| ConfigError::Io(err.to_string()))?;
    if bytes.len() > max_bytes {
        return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
    }
    Ok(bytes)
}
