use config::{Config, ConfigError, Environment, File};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;
use std::collections::HashMap;
use std::env;
use std::path::Path;
use thiserror::Error;
use tracing::info;
use validator::{Validate, ValidationError};

use crate::errors::EngineError;
use crate::models::request::{Department, Priority};
use crate::services::approval_policy::ApprovalPolicy;
use crate::services::sla::SlaPolicy;

/// Default values for configuration
const DEFAULT_ENV: &str = "development";
const CONFIG_DIR: &str = "config";
const ENV_PREFIX: &str = "PROCUREMENT";

/// Policy configuration loaded at startup and turned into the immutable
/// value objects the engine consumes.
///
/// Monetary ceilings are written as strings in the config files
/// (e.g. `management_ceiling = "5000.00"`) so they parse as exact
/// fixed-point values.
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
#[validate(schema(function = "validate_ceiling_order"))]
pub struct PolicySettings {
    /// SLA target in business days per priority.
    #[serde(default = "default_sla_days")]
    pub sla_days: HashMap<Priority, i64>,

    /// Per-department overrides; when present they win over the priority
    /// mapping.
    #[serde(default)]
    pub department_sla_days: HashMap<Department, i64>,

    /// Values up to this ceiling are approved by management.
    #[serde(default = "default_management_ceiling")]
    pub management_ceiling: Decimal,

    /// Values up to this ceiling (and above the management one) are
    /// approved by the executive tier; anything higher needs special
    /// approval.
    #[serde(default = "default_executive_ceiling")]
    pub executive_ceiling: Decimal,
}

fn default_sla_days() -> HashMap<Priority, i64> {
    crate::services::sla::standard_priority_days()
}

fn default_management_ceiling() -> Decimal {
    dec!(5000.00)
}

fn default_executive_ceiling() -> Decimal {
    dec!(15000.00)
}

fn validate_ceiling_order(settings: &PolicySettings) -> Result<(), ValidationError> {
    if settings.management_ceiling >= settings.executive_ceiling {
        return Err(ValidationError::new("ceiling_order"));
    }
    Ok(())
}

impl Default for PolicySettings {
    fn default() -> Self {
        Self {
            sla_days: default_sla_days(),
            department_sla_days: HashMap::new(),
            management_ceiling: default_management_ceiling(),
            executive_ceiling: default_executive_ceiling(),
        }
    }
}

impl PolicySettings {
    /// Loads settings from layered sources: `config/default.toml`, then
    /// `config/{RUN_ENV}.toml`, then `PROCUREMENT__`-prefixed environment
    /// variables. Missing files fall back to the built-in defaults.
    pub fn load() -> Result<Self, SettingsError> {
        let run_env = env::var("RUN_ENV").unwrap_or_else(|_| DEFAULT_ENV.to_string());
        info!("loading policy settings for environment '{}'", run_env);

        let settings: Self = Config::builder()
            .add_source(File::with_name(&format!("{}/default", CONFIG_DIR)).required(false))
            .add_source(File::with_name(&format!("{}/{}", CONFIG_DIR, run_env)).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?
            .try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Loads settings from a single file, bypassing the layered lookup.
    pub fn from_file(path: &Path) -> Result<Self, SettingsError> {
        let settings: Self = Config::builder()
            .add_source(File::from(path))
            .build()?
            .try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// The immutable SLA policy snapshot for engine calls.
    pub fn sla_policy(&self) -> SlaPolicy {
        SlaPolicy::new(self.sla_days.clone(), self.department_sla_days.clone())
    }

    /// The immutable approval policy snapshot for engine calls.
    pub fn approval_policy(&self) -> Result<ApprovalPolicy, EngineError> {
        ApprovalPolicy::new(self.management_ceiling, self.executive_ceiling)
    }
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to load policy settings: {0}")]
    Load(#[from] ConfigError),

    #[error("invalid policy settings: {0}")]
    Invalid(#[from] validator::ValidationErrors),
}
