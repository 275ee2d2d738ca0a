// crates/policy-wrapper-core/src/transformer.rs
// ============================================================================
// Module: Policy Transformer
// Description: Dialect dispatch over a shared wrap-a-batch contract.
// Purpose: Resolve a transformer config once and run the selected wrapper.
// Dependencies: crate::config, crate::configuration_policy, crate::policy
// ============================================================================

//! ## Overview
//! Both dialects implement [`Wrapper`]. [`PolicyTransformer`] decodes the
//! transformer config into a [`WrapperConfig`] up front, so unknown kinds and
//! malformed options fail before any document is touched, then hands the
//! batch to the matching wrapper.
//! Invariants:
//! - A failed call returns an error and no partial output.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use thiserror::Error;

use crate::config::ConfigError;
use crate::config::TransformerConfig;
use crate::config::WrapperConfig;
use crate::configuration_policy::ConfigurationPolicyWrapper;
use crate::document::Document;
use crate::document::DocumentError;
use crate::policy::PolicyWrapper;
use crate::telemetry::NoopTelemetry;
use crate::telemetry::WrapTelemetry;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors surfaced by a transform call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WrapError {
    /// The transformer config could not be resolved.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// A document could not be built or modified.
    #[error(transparent)]
    Document(#[from] DocumentError),
}

// ============================================================================
// SECTION: Wrapper Contract
// ============================================================================

/// Transforms one input batch into one output batch.
pub trait Wrapper {
    /// Wraps `batch`, consuming it.
    ///
    /// # Errors
    ///
    /// Returns [`WrapError`] when any synthesis step fails; the batch is
    /// abandoned.
    fn wrap(&self, batch: Vec<Document>) -> Result<Vec<Document>, WrapError>;
}

// ============================================================================
// SECTION: Transformer
// ============================================================================

/// Dispatches batches to the configured wrapper dialect.
pub struct PolicyTransformer {
    /// Resolved wrapper configuration.
    config: WrapperConfig,
    /// Progress sink handed to the wrapper.
    telemetry: Arc<dyn WrapTelemetry>,
}

impl PolicyTransformer {
    /// Creates a transformer for a resolved configuration.
    #[must_use]
    pub fn new(config: WrapperConfig) -> Self {
        Self {
            config,
            telemetry: Arc::new(NoopTelemetry),
        }
    }

    /// Resolves a transformer config document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for unknown kinds, malformed options, or a
    /// missing base name.
    pub fn from_config(config: &TransformerConfig) -> Result<Self, ConfigError> {
        WrapperConfig::from_transformer(config).map(Self::new)
    }

    /// Replaces the telemetry sink.
    #[must_use]
    pub fn with_telemetry(mut self, telemetry: Arc<dyn WrapTelemetry>) -> Self {
        self.telemetry = telemetry;
        self
    }

    /// Returns the resolved configuration.
    #[must_use]
    pub const fn config(&self) -> &WrapperConfig {
        &self.config
    }

    /// Transforms `batch` with the configured dialect.
    ///
    /// # Errors
    ///
    /// Returns [`WrapError`] when synthesis fails.
    pub fn transform(&self, batch: Vec<Document>) -> Result<Vec<Document>, WrapError> {
        let telemetry = Arc::clone(&self.telemetry);
        match &self.config {
            WrapperConfig::ConfigurationPolicy(options) => {
                ConfigurationPolicyWrapper::new(options.clone())
                    .with_telemetry(telemetry)
                    .wrap(batch)
            }
            WrapperConfig::Policy(options) => {
                PolicyWrapper::new(options.clone()).with_telemetry(telemetry).wrap(batch)
            }
        }
    }
}

/// Resolves `config` and transforms `batch` in one call.
///
/// # Errors
///
/// Returns [`WrapError::Config`] before any synthesis when the config does
/// not resolve, and [`WrapError::Document`] when synthesis fails.
pub fn transform(
    config: &TransformerConfig,
    batch: Vec<Document>,
) -> Result<Vec<Document>, WrapError> {
    PolicyTransformer::from_config(config)?.transform(batch)
}
