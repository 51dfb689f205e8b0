// client/src/config.rs

use crate::error::ConfigError;
use pilot_link_shared::{Position, WS_PATH};
use std::time::Duration;
use url::Url;

pub const BASE_URL_ENV: &str = "PILOT_LINK_BASE_URL";
pub const RECONNECT_MS_ENV: &str = "PILOT_LINK_RECONNECT_MS";
pub const TRAIL_CAP_ENV: &str = "PILOT_LINK_TRAIL_CAP";

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_millis(3000);
// Tokyo Station
pub const DEFAULT_CENTER: Position = Position {
    latitude: 35.681236,
    longitude: 139.767125,
};

#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// http(s)/ws(s) URL or bare host[:port] of the serving backend.
    pub base_url: String,
    pub reconnect_delay: Duration,
    /// `None` keeps the whole session's trail.
    pub trail_capacity: Option<usize>,
    /// Where the map starts before the first telemetry frame.
    pub default_center: Position,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            reconnect_delay: DEFAULT_RECONNECT_DELAY,
            trail_capacity: None,
            default_center: DEFAULT_CENTER,
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut cfg = Self::default();

        if let Some(base) = get(BASE_URL_ENV).filter(|s| !s.trim().is_empty()) {
            cfg.base_url = base;
        }

        if let Some(raw) = get(RECONNECT_MS_ENV) {
            let ms = raw
                .trim()
                .parse::<u64>()
                .map_err(|e| ConfigError::InvalidValue {
                    key: RECONNECT_MS_ENV,
                    reason: e.to_string(),
                })?;
            cfg.reconnect_delay = Duration::from_millis(ms);
        }

        if let Some(raw) = get(TRAIL_CAP_ENV) {
            let cap = raw
                .trim()
                .parse::<usize>()
                .map_err(|e| ConfigError::InvalidValue {
                    key: TRAIL_CAP_ENV,
                    reason: e.to_string(),
                })?;
            if cap == 0 {
                return Err(ConfigError::InvalidValue {
                    key: TRAIL_CAP_ENV,
                    reason: "must be greater than zero".to_string(),
                });
            }
            cfg.trail_capacity = Some(cap);
        }

        Ok(cfg)
    }

    /// Returns ws/wss scheme + host[:port] (no path).
    pub fn base_ws(&self) -> String {
        let base = normalize_base_url(self.base_url.trim().to_string());

        if base.starts_with("https://") {
            base.replacen("https://", "wss://", 1)
        } else if base.starts_with("http://") {
            base.replacen("http://", "ws://", 1)
        } else if base.starts_with("wss://") || base.starts_with("ws://") {
            base
        } else {
            format!("ws://{base}")
        }
    }

    /// The streaming endpoint, e.g. `ws://localhost:8000/ws`.
    pub fn endpoint(&self) -> Result<Url, ConfigError> {
        let raw = format!("{}{WS_PATH}", self.base_ws());
        let url = Url::parse(&raw).map_err(|_| ConfigError::InvalidBaseUrl(self.base_url.clone()))?;
        if url.host_str().is_none() {
            return Err(ConfigError::InvalidBaseUrl(self.base_url.clone()));
        }
        Ok(url)
    }
}

/// Drops any fragment and path, and the trailing slash.
fn normalize_base_url(mut url: String) -> String {
    if let Some(idx) = url.find('#') {
        url.truncate(idx);
    }
    if let Some(scheme_end) = url.find("://") {
        let rest = &url[scheme_end + 3..];
        if let Some(slash) = rest.find('/') {
            url.truncate(scheme_end + 3 + slash);
        }
    } else if let Some(slash) = url.find('/') {
        url.truncate(slash);
    }
    url.trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn cfg_for(base: &str) -> ClientConfig {
        ClientConfig {
            base_url: base.to_string(),
            ..ClientConfig::default()
        }
    }

    #[test]
    fn endpoint_follows_the_page_scheme() {
        assert_eq!(
            cfg_for("http://10.0.0.5:8000").endpoint().unwrap().as_str(),
            "ws://10.0.0.5:8000/ws"
        );
        assert_eq!(
            cfg_for("https://gcs.local/").endpoint().unwrap().as_str(),
            "wss://gcs.local/ws"
        );
        assert_eq!(
            cfg_for("localhost:8000").endpoint().unwrap().as_str(),
            "ws://localhost:8000/ws"
        );
    }

    #[test]
    fn endpoint_drops_page_path_and_fragment() {
        let cfg = cfg_for("http://localhost:8000/static/index.html#map");
        assert_eq!(cfg.endpoint().unwrap().as_str(), "ws://localhost:8000/ws");
    }

    #[test]
    fn empty_host_is_rejected() {
        assert!(matches!(
            cfg_for("http://").endpoint(),
            Err(ConfigError::InvalidBaseUrl(_))
        ));
    }

    #[test]
    fn env_overrides_are_applied() {
        let env: HashMap<&str, &str> = HashMap::from([
            (BASE_URL_ENV, "http://drone.lan:9000"),
            (RECONNECT_MS_ENV, "500"),
            (TRAIL_CAP_ENV, "1000"),
        ]);
        let cfg = ClientConfig::from_lookup(|k| env.get(k).map(|v| v.to_string())).unwrap();

        assert_eq!(cfg.base_url, "http://drone.lan:9000");
        assert_eq!(cfg.reconnect_delay, Duration::from_millis(500));
        assert_eq!(cfg.trail_capacity, Some(1000));
    }

    #[test]
    fn missing_env_keeps_reference_defaults() {
        let cfg = ClientConfig::from_lookup(|_| None).unwrap();
        assert_eq!(cfg, ClientConfig::default());
        assert_eq!(cfg.reconnect_delay, Duration::from_millis(3000));
        assert_eq!(cfg.trail_capacity, None);
    }

    #[test]
    fn bad_env_values_are_errors() {
        let err = ClientConfig::from_lookup(|k| (k == RECONNECT_MS_ENV).then(|| "soon".to_string()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: RECONNECT_MS_ENV, .. }));

        let err = ClientConfig::from_lookup(|k| (k == TRAIL_CAP_ENV).then(|| "0".to_string()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: TRAIL_CAP_ENV, .. }));
    }

    #[test]
    fn largest_trail_cap_builds_a_working_state() {
        let cfg = ClientConfig::from_lookup(|k| (k == TRAIL_CAP_ENV).then(|| usize::MAX.to_string()))
            .unwrap();
        assert_eq!(cfg.trail_capacity, Some(usize::MAX));

        let mut state = crate::telemetry_state::TelemetryState::with_capacity(cfg.trail_capacity);
        for i in 0..3 {
            state.apply_telemetry(pilot_link_shared::TelemetrySnapshot {
                armed: false,
                mode: "STABILIZE".into(),
                latitude: i as f64,
                longitude: 0.0,
                altitude: 0.0,
            });
        }
        assert_eq!(state.trail().len(), 3);
    }
}
