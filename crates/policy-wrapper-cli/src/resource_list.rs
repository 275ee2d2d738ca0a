// crates/policy-wrapper-cli/src/resource_list.rs
// ============================================================================
// Module: Resource List Framing
// Description: KRM function input and output framing around the wrapper engine.
// Purpose: Decode pipeline input, run the transformer, and encode the result.
// Dependencies: policy-wrapper-core, serde, serde_yaml, thiserror
// ============================================================================

//! ## Overview
//! Pipeline stages hand the wrapper either a `ResourceList` carrying both the
//! items and the transformer config, or a plain `---` separated document
//! stream when the config is supplied separately. The output mirrors the
//! input framing.
//!
//! Security posture: input bytes are untrusted; the size cap is enforced
//! before any parsing.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use policy_wrapper_core::ConfigError;
use policy_wrapper_core::Document;
use policy_wrapper_core::DocumentError;
use policy_wrapper_core::PolicyTransformer;
use policy_wrapper_core::TransformerConfig;
use policy_wrapper_core::WrapError;
use policy_wrapper_core::WrapTelemetry;
use serde::Deserialize;
use serde::Serialize;
use serde_yaml::Value;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// API version of the `ResourceList` envelope.
pub const RESOURCE_LIST_API_VERSION: &str = "config.kubernetes.io/v1";
/// Kind of the `ResourceList` envelope.
pub const RESOURCE_LIST_KIND: &str = "ResourceList";
/// Maximum accepted input size in bytes.
pub const MAX_INPUT_BYTES: usize = 16 * 1024 * 1024;
/// Separator written between documents of a stream.
const STREAM_SEPARATOR: &str = "---\n";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while framing or running one function invocation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FunctionError {
    /// Input exceeded [`MAX_INPUT_BYTES`].
    #[error("input is {size} bytes (limit {limit})")]
    TooLarge {
        /// Actual input size.
        size: usize,
        /// Allowed size.
        limit: usize,
    },
    /// Input was not valid UTF-8.
    #[error("input must be utf-8")]
    NotUtf8,
    /// The envelope was malformed.
    #[error("invalid ResourceList: {0}")]
    Envelope(String),
    /// The envelope carried no function config and none was supplied.
    #[error("ResourceList has no functionConfig")]
    MissingConfig,
    /// The transformer config did not resolve.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// A document could not be parsed or written.
    #[error(transparent)]
    Document(#[from] DocumentError),
    /// The engine rejected the batch.
    #[error(transparent)]
    Wrap(#[from] WrapError),
}

// ============================================================================
// SECTION: Envelope
// ============================================================================

/// KRM function `ResourceList` envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceList {
    /// Envelope API version.
    pub api_version: String,
    /// Envelope kind.
    pub kind: String,
    /// Resources flowing through the pipeline.
    #[serde(default)]
    pub items: Vec<Document>,
    /// Function config echoed back on output.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_config: Option<Value>,
}

impl ResourceList {
    /// Wraps `items` in a fresh envelope.
    #[must_use]
    pub fn new(items: Vec<Document>, function_config: Option<Value>) -> Self {
        Self {
            api_version: RESOURCE_LIST_API_VERSION.to_string(),
            kind: RESOURCE_LIST_KIND.to_string(),
            items,
            function_config,
        }
    }

    /// Parses an envelope from YAML text.
    ///
    /// # Errors
    ///
    /// Returns [`FunctionError::Envelope`] when the text is not a
    /// `ResourceList` or an item is not a mapping.
    pub fn parse(text: &str) -> Result<Self, FunctionError> {
        let list: Self =
            serde_yaml::from_str(text).map_err(|err| FunctionError::Envelope(err.to_string()))?;
        if list.kind != RESOURCE_LIST_KIND {
            return Err(FunctionError::Envelope(format!(
                "expected kind {RESOURCE_LIST_KIND}, found '{}'",
                list.kind
            )));
        }
        Ok(list)
    }

    /// Encodes the envelope as YAML.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::Serialize`] when encoding fails.
    pub fn to_yaml(&self) -> Result<String, DocumentError> {
        serde_yaml::to_string(self).map_err(|err| DocumentError::Serialize(err.to_string()))
    }

    /// Decodes the embedded transformer config.
    ///
    /// # Errors
    ///
    /// Returns [`FunctionError::MissingConfig`] when absent and
    /// [`FunctionError::Config`] when it does not decode.
    pub fn transformer_config(&self) -> Result<TransformerConfig, FunctionError> {
        match &self.function_config {
            None | Some(Value::Null) => Err(FunctionError::MissingConfig),
            Some(value) => Ok(TransformerConfig::from_value(value.clone())?),
        }
    }
}

// ============================================================================
// SECTION: Streams
// ============================================================================

/// Encodes documents as a `---` separated stream.
///
/// # Errors
///
/// Returns [`DocumentError::Serialize`] when a document fails to encode.
pub fn write_stream(documents: &[Document]) -> Result<String, DocumentError> {
    let mut out = String::new();
    for (index, document) in documents.iter().enumerate() {
        if index > 0 {
            out.push_str(STREAM_SEPARATOR);
        }
        out.push_str(&document.to_yaml()?);
    }
    Ok(out)
}

// ============================================================================
// SECTION: Invocation
// ============================================================================

/// Runs one function invocation over raw input bytes.
///
/// With `config` set the input is a document stream and the output is a
/// stream; otherwise the input must be a `ResourceList` carrying its own
/// `functionConfig`, and the output is a `ResourceList` with the transformed
/// items.
///
/// # Errors
///
/// Returns [`FunctionError`] on oversized or malformed input, an unusable
/// config, or an engine failure. No output is produced on error.
pub fn run_function(
    input: &[u8],
    config: Option<&TransformerConfig>,
    telemetry: Arc<dyn WrapTelemetry>,
) -> Result<String, FunctionError> {
    if input.len() > MAX_INPUT_BYTES {
        return Err(FunctionError::TooLarge {
            size: input.len(),
            limit: MAX_INPUT_BYTES,
        });
    }
    let text = std::str::from_utf8(input).map_err(|_| FunctionError::NotUtf8)?;

    if let Some(config) = config {
        let batch = Document::parse_stream(text)?;
        let transformer = PolicyTransformer::from_config(config)?.with_telemetry(telemetry);
        let out = transformer.transform(batch)?;
        return Ok(write_stream(&out)?);
    }

    let list = ResourceList::parse(text)?;
    let config = list.transformer_config()?;
    let transformer = PolicyTransformer::from_config(&config)?.with_telemetry(telemetry);
    let items = transformer.transform(list.items)?;
    Ok(ResourceList::new(items, list.function_config).to_yaml()?)
}
