// client/src/render.rs
//
// Collaborators the session drives. The map widget and the status panel live
// outside this crate; the logging versions back the headless binary.

use crate::error::DispatchError;
use pilot_link_shared::{Position, TelemetrySnapshot};
use tracing::{debug, info, warn};

/// Map surface: one vehicle marker with a popup, plus the trail polyline.
pub trait Renderer {
    fn init(&mut self, default_lat: f64, default_lon: f64);
    fn set_vehicle_position(&mut self, lat: f64, lon: f64);
    fn set_popup_text(&mut self, text: &str);
    fn pan_to(&mut self, lat: f64, lon: f64);
    fn set_trail(&mut self, points: &[Position]);
}

/// Status panel.
pub trait StatusView {
    fn set_connection_status(&mut self, text: &str);
    fn show_telemetry(&mut self, readout: &TelemetryReadout);
    fn show_backend_status(&mut self, _message: &str) {}
    fn report_command_error(&mut self, _error: &DispatchError) {}
}

/// Telemetry fields formatted for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryReadout {
    pub armed: String,
    pub mode: String,
    pub latitude: String,
    pub longitude: String,
    pub altitude: String,
}

impl From<&TelemetrySnapshot> for TelemetryReadout {
    fn from(s: &TelemetrySnapshot) -> Self {
        Self {
            armed: if s.armed { "Armed" } else { "Disarmed" }.to_string(),
            mode: s.mode.clone(),
            latitude: format!("{:.6}", s.latitude),
            longitude: format!("{:.6}", s.longitude),
            altitude: format!("{:.2}", s.altitude),
        }
    }
}

pub fn popup_text(s: &TelemetrySnapshot) -> String {
    format!(
        "Vehicle Position<br>Lat: {:.6}<br>Lon: {:.6}<br>Alt: {:.2}m",
        s.latitude, s.longitude, s.altitude
    )
}

#[derive(Debug, Default)]
pub struct LogRenderer {
    trail_len: usize,
}

impl Renderer for LogRenderer {
    fn init(&mut self, default_lat: f64, default_lon: f64) {
        info!("[MAP] centered on {default_lat:.6}, {default_lon:.6}");
    }

    fn set_vehicle_position(&mut self, lat: f64, lon: f64) {
        debug!("[MAP] vehicle at {lat:.6}, {lon:.6}");
    }

    fn set_popup_text(&mut self, _text: &str) {}

    fn pan_to(&mut self, _lat: f64, _lon: f64) {}

    fn set_trail(&mut self, points: &[Position]) {
        if points.is_empty() && self.trail_len > 0 {
            info!("[MAP] trail cleared ({} points)", self.trail_len);
        }
        self.trail_len = points.len();
    }
}

#[derive(Debug, Default)]
pub struct LogStatusView;

impl StatusView for LogStatusView {
    fn set_connection_status(&mut self, text: &str) {
        info!("[STATUS] {text}");
    }

    fn show_telemetry(&mut self, r: &TelemetryReadout) {
        info!(
            "[TLM] {} mode={} lat={} lon={} alt={}m",
            r.armed, r.mode, r.latitude, r.longitude, r.altitude
        );
    }

    fn show_backend_status(&mut self, message: &str) {
        info!("[BACKEND] {message}");
    }

    fn report_command_error(&mut self, error: &DispatchError) {
        warn!("[CMD] rejected: {error}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snap() -> TelemetrySnapshot {
        TelemetrySnapshot {
            armed: false,
            mode: "GUIDED".into(),
            latitude: 35.6812361,
            longitude: 139.7671249,
            altitude: 10.456,
        }
    }

    #[test]
    fn readout_rounds_like_the_status_panel() {
        let r = TelemetryReadout::from(&snap());
        assert_eq!(r.armed, "Disarmed");
        assert_eq!(r.mode, "GUIDED");
        assert_eq!(r.latitude, "35.681236");
        assert_eq!(r.longitude, "139.767125");
        assert_eq!(r.altitude, "10.46");
    }

    #[test]
    fn popup_lists_position_and_altitude() {
        assert_eq!(
            popup_text(&snap()),
            "Vehicle Position<br>Lat: 35.681236<br>Lon: 139.767125<br>Alt: 10.46m"
        );
    }
}
