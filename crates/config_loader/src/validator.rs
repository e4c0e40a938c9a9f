//! Configuration validation
//!
//! Rules:
//! - field rules declared on the contracts types (limit_for_period > 0,
//!   refresh_period_ms > 0, workers > 0, gateway name non-empty)
//! - gateway params match the gateway kind
//! - numeric gateway params parse

use contracts::{ContractError, GatewayKind, NotifierBlueprint};
use validator::{Validate, ValidationError, ValidationErrors, ValidationErrorsKind};

/// Validate a NotifierBlueprint
///
/// Returns the first violation found, or Ok(()).
pub fn validate(blueprint: &NotifierBlueprint) -> Result<(), ContractError> {
    validate_field_rules(blueprint)?;
    validate_gateway_params(blueprint)?;
    Ok(())
}

/// Run the derived field rules and report the first violation by path
fn validate_field_rules(blueprint: &NotifierBlueprint) -> Result<(), ContractError> {
    blueprint.validate().map_err(|errors| {
        let (field, message) = first_violation(&errors, "")
            .unwrap_or_else(|| ("blueprint".to_string(), errors.to_string()));
        ContractError::config_validation(field, message)
    })
}

fn first_violation(errors: &ValidationErrors, prefix: &str) -> Option<(String, String)> {
    let mut entries: Vec<_> = errors.errors().iter().collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));

    for (key, kind) in entries {
        let path = if prefix.is_empty() {
            key.to_string()
        } else {
            format!("{prefix}.{key}")
        };
        let found = match kind {
            ValidationErrorsKind::Field(list) => {
                list.first().map(|e| (path.clone(), describe(e)))
            }
            ValidationErrorsKind::Struct(inner) => first_violation(inner, &path),
            ValidationErrorsKind::List(items) => items
                .iter()
                .find_map(|(idx, inner)| first_violation(inner, &format!("{path}[{idx}]"))),
        };
        if found.is_some() {
            return found;
        }
    }
    None
}

fn describe(error: &ValidationError) -> String {
    if let Some(message) = &error.message {
        return message.to_string();
    }
    match (error.params.get("min"), error.params.get("value")) {
        (Some(min), Some(value)) => format!("must be >= {min}, got {value}"),
        (Some(min), None) => format!("must be >= {min}"),
        _ => format!("failed '{}' check", error.code),
    }
}

/// Check that params required by the gateway kind are present and well-formed
fn validate_gateway_params(blueprint: &NotifierBlueprint) -> Result<(), ContractError> {
    let gateway = &blueprint.gateway;

    if gateway.name.trim().is_empty() {
        return Err(ContractError::config_validation(
            "gateway.name",
            "gateway name cannot be blank",
        ));
    }

    match gateway.kind {
        GatewayKind::Log => {}
        GatewayKind::File => {
            let path = gateway.params.get("path").map(|p| p.trim()).unwrap_or("");
            if path.is_empty() {
                return Err(ContractError::config_validation(
                    "gateway.params.path",
                    "file gateway requires a 'path' parameter",
                ));
            }
        }
        GatewayKind::Mock => {
            if let Some(delay) = gateway.params.get("delay_ms") {
                delay.trim().parse::<u64>().map_err(|e| {
                    ContractError::config_validation(
                        "gateway.params.delay_ms",
                        format!("invalid delay '{delay}': {e}"),
                    )
                })?;
            }
        }
    }
    Ok(())
}
