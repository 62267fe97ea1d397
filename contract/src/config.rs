//! Ledger configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use nmr_types::ProtocolParams;

use crate::error::ContractError;

/// Configuration for a Numeraire ledger host.
///
/// Can be loaded from a TOML file via [`NumeraireConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumeraireConfig {
    /// Path of the persisted state file.
    #[serde(default = "default_state_path")]
    pub state_path: PathBuf,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Identities, disbursement policy, supply cap and deposit slot range.
    /// Only read when a new state file is initialised.
    #[serde(default)]
    pub params: ProtocolParams,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_state_path() -> PathBuf {
    PathBuf::from("./numeraire.state")
}

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "warn".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl NumeraireConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ContractError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ContractError::Config(format!("{}: {e}", path.as_ref().display())))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ContractError> {
        let config: Self = toml::from_str(s).map_err(|e| ContractError::Config(e.to_string()))?;
        config.params.validate()?;
        Ok(config)
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, ContractError> {
        toml::to_string_pretty(self).map_err(|e| ContractError::Config(e.to_string()))
    }
}

impl Default for NumeraireConfig {
    fn default() -> Self {
        Self {
            state_path: default_state_path(),
            log_format: default_log_format(),
            log_level: default_log_level(),
            params: ProtocolParams::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nmr_types::{Address, NmrAmount};

    #[test]
    fn default_config_round_trips_through_toml() {
        let config = NumeraireConfig::default();
        let toml_str = config.to_toml_string().expect("should serialize");
        let parsed = NumeraireConfig::from_toml_str(&toml_str).expect("should parse");
        assert_eq!(parsed, config);
    }

    #[test]
    fn minimal_toml_uses_defaults() {
        let config = NumeraireConfig::from_toml_str("").expect("empty toml should use defaults");
        assert_eq!(config.state_path, PathBuf::from("./numeraire.state"));
        assert_eq!(config.log_format, "human");
        assert_eq!(config.params, ProtocolParams::default());
    }

    #[test]
    fn partial_toml_overrides() {
        let toml = r#"
            log_level = "debug"

            [params]
            operator = "0x00000000000000000000000000000000deadbeef"
            weekly_disbursement = "1000"
        "#;
        let config = NumeraireConfig::from_toml_str(toml).expect("should parse");
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.params.operator, Address::from_low_u64(0xdead_beef));
        assert_eq!(config.params.weekly_disbursement, NmrAmount::new(1000));
        assert_eq!(config.params.pool, ProtocolParams::default().pool);
        assert_eq!(config.log_format, "human"); // default
    }

    #[test]
    fn invalid_params_are_a_config_error() {
        let toml = r#"
            [params]
            disbursement_period_secs = 0
        "#;
        let err = NumeraireConfig::from_toml_str(toml).unwrap_err();
        assert!(matches!(err, ContractError::Params(_)));
    }

    #[test]
    fn uncapped_supply_round_trips_through_toml() {
        let mut config = NumeraireConfig::default();
        config.params.supply_cap = None;
        let toml_str = config.to_toml_string().expect("should serialize");
        let parsed = NumeraireConfig::from_toml_str(&toml_str).expect("should parse");
        assert_eq!(parsed.params.supply_cap, None);
        assert_eq!(parsed, config);
    }

    #[test]
    fn uncapped_supply_from_hand_written_toml() {
        let toml = r#"
            [params]
            supply_cap = "none"
        "#;
        let config = NumeraireConfig::from_toml_str(toml).expect("should parse");
        assert_eq!(config.params.supply_cap, None);
    }

    #[test]
    fn increasing_quota_is_rejected() {
        let toml = r#"
            [params]
            initial_disbursement = "1"
            weekly_disbursement = "1000000"
        "#;
        let err = NumeraireConfig::from_toml_str(toml).unwrap_err();
        assert!(matches!(err, ContractError::Params(_)));
    }

    #[test]
    fn missing_file_returns_config_error() {
        let result = NumeraireConfig::from_toml_file("/nonexistent/numeraire.toml");
        assert!(matches!(result.unwrap_err(), ContractError::Config(_)));
    }
}
