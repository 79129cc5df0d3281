pub mod env;
pub use env::apply_env_overrides;

use crate::geo::Coordinate;
use crate::simulation::SimulationParams;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::time::Duration;
use tracing::warn;

/// Complete Nearby configuration
#[derive(Debug, Clone, Deserialize)]
pub struct NearbyConfig {
    #[serde(default)]
    pub radar: RadarConfig,
    #[serde(default)]
    pub location: LocationConfig,
    #[serde(default)]
    pub assistant: AssistantConfig,
    #[serde(default)]
    pub api: ApiConfig,
    /// Load the demo roster at startup
    #[serde(default = "default_seed_contacts")]
    pub seed_contacts: bool,
}

fn default_seed_contacts() -> bool {
    true
}

/// Simulation and proximity settings
#[derive(Debug, Clone, Deserialize)]
pub struct RadarConfig {
    /// Proximity scan radius (kilometres)
    #[serde(default = "default_radius_km")]
    pub radius_km: f64,
    /// Time between simulation ticks (milliseconds)
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
    /// Full width of the per-tick random walk (degrees)
    #[serde(default = "default_jitter_degrees")]
    pub jitter_degrees: f64,
    /// Fixed RNG seed for reproducible runs
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_radius_km() -> f64 {
    5.0
}

fn default_tick_interval_ms() -> u64 {
    2000
}

fn default_jitter_degrees() -> f64 {
    0.001
}

impl Default for RadarConfig {
    fn default() -> Self {
        Self {
            radius_km: default_radius_km(),
            tick_interval_ms: default_tick_interval_ms(),
            jitter_degrees: default_jitter_degrees(),
            seed: None,
        }
    }
}

impl RadarConfig {
    pub fn simulation_params(&self) -> SimulationParams {
        SimulationParams {
            radius_km: self.radius_km,
            jitter_degrees: self.jitter_degrees,
        }
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }

    /// Replace values the simulation cannot run with by their defaults.
    ///
    /// The radius must be finite and positive, the jitter finite and
    /// non-negative.
    pub fn sanitize(&mut self) {
        if !valid_radius_km(self.radius_km) {
            warn!(
                radius_km = self.radius_km,
                default = default_radius_km(),
                "Invalid radar radius, using default"
            );
            self.radius_km = default_radius_km();
        }
        if !(self.jitter_degrees.is_finite() && self.jitter_degrees >= 0.0) {
            warn!(
                jitter_degrees = self.jitter_degrees,
                default = default_jitter_degrees(),
                "Invalid jitter, using default"
            );
            self.jitter_degrees = default_jitter_degrees();
        }
    }
}

pub(crate) fn valid_radius_km(radius_km: f64) -> bool {
    radius_km.is_finite() && radius_km > 0.0
}

/// Position acquisition settings
#[derive(Debug, Clone, Deserialize)]
pub struct LocationConfig {
    #[serde(default = "default_fallback_latitude")]
    pub fallback_latitude: f64,
    #[serde(default = "default_fallback_longitude")]
    pub fallback_longitude: f64,
    /// Upper bound on a position request (milliseconds)
    #[serde(default = "default_location_timeout_ms")]
    pub timeout_ms: u64,
    /// Optional JSON lookup endpoint for the device position
    #[serde(default)]
    pub provider_url: Option<String>,
}

fn default_fallback_latitude() -> f64 {
    40.7128
}

fn default_fallback_longitude() -> f64 {
    -74.0060
}

fn default_location_timeout_ms() -> u64 {
    10_000
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            fallback_latitude: default_fallback_latitude(),
            fallback_longitude: default_fallback_longitude(),
            timeout_ms: default_location_timeout_ms(),
            provider_url: None,
        }
    }
}

impl LocationConfig {
    pub fn fallback(&self) -> Coordinate {
        Coordinate::new(self.fallback_latitude, self.fallback_longitude)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Text-generation service settings
#[derive(Debug, Clone, Deserialize)]
pub struct AssistantConfig {
    #[serde(default = "default_assistant_url")]
    pub api_url: String,
    #[serde(default = "default_assistant_model")]
    pub model: String,
    /// None disables the assistant
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_assistant_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_assistant_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_assistant_model() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_assistant_timeout_ms() -> u64 {
    20_000
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            api_url: default_assistant_url(),
            model: default_assistant_model(),
            api_key: None,
            timeout_ms: default_assistant_timeout_ms(),
        }
    }
}

/// HTTP API settings
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    /// Radar surface size used when a request does not specify one
    #[serde(default = "default_radar_size_px")]
    pub radar_size_px: f64,
    #[serde(default = "default_radar_padding_px")]
    pub radar_padding_px: f64,
}

fn default_port() -> u16 {
    3000
}

fn default_radar_size_px() -> f64 {
    300.0
}

fn default_radar_padding_px() -> f64 {
    10.0
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            radar_size_px: default_radar_size_px(),
            radar_padding_px: default_radar_padding_px(),
        }
    }
}

impl Default for NearbyConfig {
    fn default() -> Self {
        Self {
            radar: RadarConfig::default(),
            location: LocationConfig::default(),
            assistant: AssistantConfig::default(),
            api: ApiConfig::default(),
            seed_contacts: default_seed_contacts(),
        }
    }
}

/// Load configuration from TOML file
pub fn load_config(path: &str) -> Result<NearbyConfig> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path))?;
    let mut config: NearbyConfig =
        toml::from_str(&contents).with_context(|| format!("Failed to parse config file {}", path))?;
    config.radar.sanitize();
    Ok(config)
}
