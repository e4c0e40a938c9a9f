//! # Config Loader
//!
//! Reads notifier settings (rate limit, gateway, routing, pipeline) from
//! TOML or JSON and returns a validated `NotifierBlueprint`.
//!
//! # Example
//!
//! ```no_run
//! use config_loader::ConfigLoader;
//! use std::path::Path;
//!
//! let blueprint = ConfigLoader::load_from_path(Path::new("notifier.toml")).unwrap();
//! println!("Limit: {}", blueprint.rate_limit.limit_for_period);
//! ```

mod parser;
mod validator;

pub use contracts::NotifierBlueprint;
pub use parser::ConfigFormat;

use contracts::ContractError;
use std::path::Path;

/// Entry point for reading and writing [`NotifierBlueprint`]s
pub struct ConfigLoader;

impl ConfigLoader {
    /// Read a `.toml` or `.json` file and validate it
    pub fn load_from_path(path: &Path) -> Result<NotifierBlueprint, ContractError> {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or_default();
        let format = ConfigFormat::from_extension(ext).ok_or_else(|| {
            ContractError::config_parse(format!(
                "unsupported config format for {}: expected .toml or .json",
                path.display()
            ))
        })?;
        let content = std::fs::read_to_string(path)?;
        Self::load_from_str(&content, format)
    }

    /// Parse `content` in the given format, then validate it
    pub fn load_from_str(
        content: &str,
        format: ConfigFormat,
    ) -> Result<NotifierBlueprint, ContractError> {
        let blueprint = parser::parse(content, format)?;
        validator::validate(&blueprint)?;
        Ok(blueprint)
    }

    /// Re-check a blueprint after CLI overrides were applied
    pub fn validate(blueprint: &NotifierBlueprint) -> Result<(), ContractError> {
        validator::validate(blueprint)
    }

    pub fn to_toml(blueprint: &NotifierBlueprint) -> Result<String, ContractError> {
        toml::to_string_pretty(blueprint)
            .map_err(|e| ContractError::config_parse(format!("cannot write TOML: {e}")))
    }

    pub fn to_json(blueprint: &NotifierBlueprint) -> Result<String, ContractError> {
        serde_json::to_string_pretty(blueprint)
            .map_err(|e| ContractError::config_parse(format!("cannot write JSON: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const MINIMAL_TOML: &str = r#"
[rate_limit]
limit_for_period = 18
refresh_period_ms = 1500
acquire_timeout_ms = 1500

[gateway]
name = "sms"
kind = "log"
"#;

    #[test]
    fn test_minimal_toml_keeps_default_routing() {
        let bp = ConfigLoader::load_from_str(MINIMAL_TOML, ConfigFormat::Toml).unwrap();
        assert_eq!(bp.gateway.name, "sms");
        assert!(bp.rate_limit.enabled);
        assert_eq!(bp.routing.all_failed, contracts::Route::Failure);
    }

    #[test]
    fn test_round_trip_toml() {
        let bp = ConfigLoader::load_from_str(MINIMAL_TOML, ConfigFormat::Toml).unwrap();
        let serialized = ConfigLoader::to_toml(&bp).unwrap();
        let bp2 = ConfigLoader::load_from_str(&serialized, ConfigFormat::Toml).unwrap();
        assert_eq!(bp.rate_limit.limit_for_period, bp2.rate_limit.limit_for_period);
        assert_eq!(bp.gateway.kind, bp2.gateway.kind);
    }

    #[test]
    fn test_toml_to_json() {
        let bp = ConfigLoader::load_from_str(MINIMAL_TOML, ConfigFormat::Toml).unwrap();
        let json = ConfigLoader::to_json(&bp).unwrap();
        let bp2 = ConfigLoader::load_from_str(&json, ConfigFormat::Json).unwrap();
        assert_eq!(bp.rate_limit.refresh_period_ms, bp2.rate_limit.refresh_period_ms);
    }

    #[test]
    fn test_zero_limit_fails_validation() {
        let content = "[rate_limit]\nlimit_for_period = 0\n";
        let err = ConfigLoader::load_from_str(content, ConfigFormat::Toml).unwrap_err();
        assert!(matches!(err, ContractError::ConfigValidation { .. }));
    }

    #[test]
    fn test_load_from_path_detects_format() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(MINIMAL_TOML.as_bytes()).unwrap();

        let bp = ConfigLoader::load_from_path(file.path()).unwrap();
        assert_eq!(bp.rate_limit.limit_for_period, 18);
    }

    #[test]
    fn test_load_from_path_unsupported_extension() {
        let file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        let err = ConfigLoader::load_from_path(file.path()).unwrap_err();
        assert!(err.to_string().contains("unsupported config format"));
    }
}
