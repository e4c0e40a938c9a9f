//! NotifierBlueprint - Config Loader output
//!
//! Describes the complete engine configuration: admission control, gateway,
//! routing of classified envelopes and host pipeline sizing.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use validator::Validate;

use crate::Classification;

/// Configuration version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Complete engine configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct NotifierBlueprint {
    /// Config version
    #[serde(default)]
    pub version: ConfigVersion,

    /// Shared admission control
    #[serde(default)]
    #[validate(nested)]
    pub rate_limit: RateLimitConfig,

    /// Delivery gateway
    #[serde(default)]
    #[validate(nested)]
    pub gateway: GatewayConfig,

    /// Routing of classified envelopes
    #[serde(default)]
    pub routing: RoutingConfig,

    /// Host pipeline settings
    #[serde(default)]
    #[validate(nested)]
    pub pipeline: PipelineSettings,
}

/// Fixed-window admission control settings
///
/// Defaults track the upstream SMS quota of 20 requests per second with headroom.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RateLimitConfig {
    /// When false the dispatcher bypasses the limiter entirely
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Max permits per refresh window, must be > 0
    #[serde(default = "default_limit_for_period")]
    #[validate(range(min = 1))]
    pub limit_for_period: u32,

    /// Window duration in milliseconds, must be > 0
    #[serde(default = "default_refresh_period_ms")]
    #[validate(range(min = 1))]
    pub refresh_period_ms: u64,

    /// Max wait for a permit in milliseconds
    #[serde(default = "default_acquire_timeout_ms")]
    pub acquire_timeout_ms: u64,
}

impl RateLimitConfig {
    pub fn refresh_period(&self) -> Duration {
        Duration::from_millis(self.refresh_period_ms)
    }

    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_millis(self.acquire_timeout_ms)
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            limit_for_period: default_limit_for_period(),
            refresh_period_ms: default_refresh_period_ms(),
            acquire_timeout_ms: default_acquire_timeout_ms(),
        }
    }
}

fn default_enabled() -> bool {
    true
}

fn default_limit_for_period() -> u32 {
    18
}

fn default_refresh_period_ms() -> u64 {
    1500
}

fn default_acquire_timeout_ms() -> u64 {
    1500
}

/// Gateway output configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct GatewayConfig {
    /// Gateway name
    #[serde(default = "default_gateway_name")]
    #[validate(length(min = 1))]
    pub name: String,

    /// Gateway kind
    #[serde(default)]
    pub kind: GatewayKind,

    /// Kind-specific parameters
    #[serde(default)]
    pub params: HashMap<String, String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            name: default_gateway_name(),
            kind: GatewayKind::default(),
            params: HashMap::new(),
        }
    }
}

fn default_gateway_name() -> String {
    "sms".to_string()
}

/// Gateway kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GatewayKind {
    /// Log every message and return a synthetic id
    #[default]
    Log,
    /// Append every message to an outbox file
    File,
    /// Scripted gateway that fails for configured recipients
    Mock,
}

/// Host relationship an envelope is routed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    Success,
    Failure,
}

impl Route {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failure => "failure",
        }
    }
}

/// Where each classification is routed
///
/// `AllSucceeded` always routes to success; the other two are configurable so
/// the recipient-failure policy is explicit rather than hard-coded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingConfig {
    #[serde(default = "default_partial_route")]
    pub partial_failure: Route,

    #[serde(default = "default_all_failed_route")]
    pub all_failed: Route,
}

impl RoutingConfig {
    /// Route for a classified envelope
    pub fn route(&self, classification: Classification) -> Route {
        match classification {
            Classification::AllSucceeded => Route::Success,
            Classification::PartialFailure => self.partial_failure,
            Classification::AllFailed => self.all_failed,
        }
    }
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            partial_failure: default_partial_route(),
            all_failed: default_all_failed_route(),
        }
    }
}

fn default_partial_route() -> Route {
    Route::Success
}

fn default_all_failed_route() -> Route {
    Route::Failure
}

/// Host pipeline settings
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PipelineSettings {
    /// Envelopes dispatched concurrently, must be > 0
    #[serde(default = "default_workers")]
    #[validate(range(min = 1))]
    pub workers: usize,

    /// Capacity of the outcome writer queue
    #[serde(default = "default_queue_capacity")]
    #[validate(range(min = 1))]
    pub queue_capacity: usize,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            queue_capacity: default_queue_capacity(),
        }
    }
}

fn default_workers() -> usize {
    8
}

fn default_queue_capacity() -> usize {
    256
}
