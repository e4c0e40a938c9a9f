//! Configuration parsing
//!
//! TOML is the primary format, JSON is accepted as well.

use contracts::{ContractError, NotifierBlueprint};

/// Configuration file format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// TOML (recommended)
    Toml,
    /// JSON
    Json,
}

impl ConfigFormat {
    /// Infer format from a file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Parse TOML configuration
pub fn parse_toml(content: &str) -> Result<NotifierBlueprint, ContractError> {
    toml::from_str(content).map_err(|e| ContractError::ConfigParse {
        message: format!("TOML parse error: {e}"),
        source: Some(Box::new(e)),
    })
}

/// Parse JSON configuration
pub fn parse_json(content: &str) -> Result<NotifierBlueprint, ContractError> {
    serde_json::from_str(content).map_err(|e| ContractError::ConfigParse {
        message: format!("JSON parse error: {e}"),
        source: Some(Box::new(e)),
    })
}

/// Parse configuration in the given format
pub fn parse(content: &str, format: ConfigFormat) -> Result<NotifierBlueprint, ContractError> {
    match format {
        ConfigFormat::Toml => parse_toml(content),
        ConfigFormat::Json => parse_json(content),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{GatewayKind, Route};

    #[test]
    fn test_parse_toml_full() {
        let content = r#"
[rate_limit]
enabled = true
limit_for_period = 10
refresh_period_ms = 1000
acquire_timeout_ms = 250

[gateway]
name = "outbox"
kind = "file"
params = { path = "/tmp/outbox.jsonl" }

[routing]
partial_failure = "failure"

[pipeline]
workers = 4
"#;
        let bp = parse_toml(content).unwrap();
        assert_eq!(bp.rate_limit.limit_for_period, 10);
        assert_eq!(bp.rate_limit.acquire_timeout_ms, 250);
        assert_eq!(bp.gateway.kind, GatewayKind::File);
        assert_eq!(bp.gateway.params["path"], "/tmp/outbox.jsonl");
        assert_eq!(bp.routing.partial_failure, Route::Failure);
        assert_eq!(bp.routing.all_failed, Route::Failure);
        assert_eq!(bp.pipeline.workers, 4);
    }

    #[test]
    fn test_parse_toml_empty_uses_defaults() {
        let bp = parse_toml("").unwrap();
        assert_eq!(bp.rate_limit.limit_for_period, 18);
        assert_eq!(bp.gateway.kind, GatewayKind::Log);
    }

    #[test]
    fn test_parse_json_minimal() {
        let content = r#"{
            "rate_limit": { "enabled": false },
            "gateway": { "kind": "mock", "params": { "fail_recipients": "+1A" } }
        }"#;
        let bp = parse_json(content).unwrap();
        assert!(!bp.rate_limit.enabled);
        assert_eq!(bp.gateway.kind, GatewayKind::Mock);
    }

    #[test]
    fn test_parse_toml_syntax_error() {
        let err = parse_toml("invalid toml [[[").unwrap_err();
        assert!(matches!(err, ContractError::ConfigParse { .. }));
    }

    #[test]
    fn test_parse_unknown_gateway_kind() {
        let err = parse_toml("[gateway]\nkind = \"carrier-pigeon\"\n").unwrap_err();
        assert!(matches!(err, ContractError::ConfigParse { .. }));
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(ConfigFormat::from_extension("toml"), Some(ConfigFormat::Toml));
        assert_eq!(ConfigFormat::from_extension("TOML"), Some(ConfigFormat::Toml));
        assert_eq!(ConfigFormat::from_extension("json"), Some(ConfigFormat::Json));
        assert_eq!(ConfigFormat::from_extension("yaml"), None);
    }
}
