use crate::trail::FlightTrail;
use pilot_link_shared::{Position, TelemetrySnapshot};

/// Latest vehicle snapshot plus the trail of the current session.
#[derive(Debug, Default)]
pub struct TelemetryState {
    current: Option<TelemetrySnapshot>,
    trail: FlightTrail,
}

impl TelemetryState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(trail_capacity: Option<usize>) -> Self {
        Self {
            current: None,
            trail: FlightTrail::new(trail_capacity),
        }
    }

    /// Replaces the current snapshot wholesale and appends its position.
    /// Returns what the renderer needs to redraw.
    pub fn apply_telemetry(&mut self, snapshot: TelemetrySnapshot) -> (&TelemetrySnapshot, &[Position]) {
        self.trail.push(snapshot.position());
        let current = &*self.current.insert(snapshot);
        (current, self.trail.as_slice())
    }

    pub fn clear_trail(&mut self) {
        self.trail.clear();
    }

    /// New connection: empty trail, no snapshot until the first frame arrives.
    pub fn start_session(&mut self) {
        self.clear_trail();
        self.current = None;
    }

    pub fn current(&self) -> Option<&TelemetrySnapshot> {
        self.current.as_ref()
    }

    pub fn trail(&self) -> &FlightTrail {
        &self.trail
    }
}
