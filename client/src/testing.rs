// Test doubles for the connector and the display collaborators.

use crate::error::{DispatchError, TransportError};
use crate::render::{Renderer, StatusView, TelemetryReadout};
use crate::transport::{Connector, LinkEvents, LinkHandle};
use pilot_link_shared::Position;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use url::Url;

#[derive(Default)]
struct ConnectorLog {
    attempts: usize,
    fail_next: bool,
    links: Vec<mpsc::UnboundedReceiver<String>>,
    sent: Vec<String>,
}

/// Records every open attempt and every frame handed to any of its links.
/// Never posts events itself; tests feed them to the session directly.
#[derive(Clone, Default)]
pub struct RecordingConnector {
    log: Arc<Mutex<ConnectorLog>>,
}

impl RecordingConnector {
    pub fn open_count(&self) -> usize {
        self.log.lock().unwrap().attempts
    }

    pub fn fail_next_open(&self) {
        self.log.lock().unwrap().fail_next = true;
    }

    pub fn sent_frames(&self) -> Vec<String> {
        let mut log = self.log.lock().unwrap();
        let mut drained = Vec::new();
        for rx in log.links.iter_mut() {
            while let Ok(frame) = rx.try_recv() {
                drained.push(frame);
            }
        }
        log.sent.extend(drained);
        log.sent.clone()
    }

    pub fn clear_sent(&self) {
        self.sent_frames();
        self.log.lock().unwrap().sent.clear();
    }
}

impl Connector for RecordingConnector {
    fn open(&mut self, _endpoint: &Url, _events: LinkEvents) -> Result<LinkHandle, TransportError> {
        let mut log = self.log.lock().unwrap();
        log.attempts += 1;
        if std::mem::take(&mut log.fail_next) {
            return Err(TransportError::Endpoint("refused".into()));
        }

        let (tx, rx) = mpsc::unbounded_channel();
        log.links.push(rx);
        Ok(LinkHandle::new(tx, None))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RenderCall {
    Init(f64, f64),
    VehiclePosition(f64, f64),
    PopupText(String),
    PanTo(f64, f64),
    Trail(Vec<Position>),
}

#[derive(Default)]
pub struct RecordingRenderer {
    pub calls: Vec<RenderCall>,
}

impl RecordingRenderer {
    pub fn last_trail(&self) -> Option<&[Position]> {
        self.calls.iter().rev().find_map(|c| match c {
            RenderCall::Trail(points) => Some(points.as_slice()),
            _ => None,
        })
    }
}

impl Renderer for RecordingRenderer {
    fn init(&mut self, default_lat: f64, default_lon: f64) {
        self.calls.push(RenderCall::Init(default_lat, default_lon));
    }

    fn set_vehicle_position(&mut self, lat: f64, lon: f64) {
        self.calls.push(RenderCall::VehiclePosition(lat, lon));
    }

    fn set_popup_text(&mut self, text: &str) {
        self.calls.push(RenderCall::PopupText(text.to_string()));
    }

    fn pan_to(&mut self, lat: f64, lon: f64) {
        self.calls.push(RenderCall::PanTo(lat, lon));
    }

    fn set_trail(&mut self, points: &[Position]) {
        self.calls.push(RenderCall::Trail(points.to_vec()));
    }
}

#[derive(Default)]
pub struct RecordingView {
    pub statuses: Vec<String>,
    pub readouts: Vec<TelemetryReadout>,
    pub backend_messages: Vec<String>,
    pub command_errors: Vec<DispatchError>,
}

impl StatusView for RecordingView {
    fn set_connection_status(&mut self, text: &str) {
        self.statuses.push(text.to_string());
    }

    fn show_telemetry(&mut self, readout: &TelemetryReadout) {
        self.readouts.push(readout.clone());
    }

    fn show_backend_status(&mut self, message: &str) {
        self.backend_messages.push(message.to_string());
    }

    fn report_command_error(&mut self, error: &DispatchError) {
        self.command_errors.push(error.clone());
    }
}
