use super::{valid_radius_km, NearbyConfig};

/// Apply `NEARBY_*` environment overrides on top of file/default config.
///
/// Unparseable or out-of-range values are ignored.
pub fn apply_env_overrides(config: &mut NearbyConfig) {
    apply_overrides(config, |key| std::env::var(key).ok());
}

fn apply_overrides(config: &mut NearbyConfig, var: impl Fn(&str) -> Option<String>) {
    if let Some(v) = var("NEARBY_PORT") {
        if let Ok(port) = v.parse::<u16>() {
            config.api.port = port;
        }
    }
    if let Some(v) = var("NEARBY_RADIUS_KM") {
        match v.parse::<f64>() {
            Ok(km) if valid_radius_km(km) => config.radar.radius_km = km,
            _ => tracing::warn!(value = %v, "Ignoring invalid NEARBY_RADIUS_KM"),
        }
    }
    if let Some(v) = var("NEARBY_TICK_INTERVAL_MS") {
        if let Ok(ms) = v.parse::<u64>() {
            config.radar.tick_interval_ms = ms;
        }
    }
    if let Some(v) = var("NEARBY_LOCATION_URL") {
        if !v.is_empty() {
            config.location.provider_url = Some(v);
        }
    }
    if let Some(v) = var("NEARBY_ASSISTANT_API_KEY") {
        if !v.is_empty() {
            config.assistant.api_key = Some(v);
        }
    }
}
