// client/src/session.rs
//
// The single timeline: link events, reconnect timers and operator intents are
// all applied here, one at a time, in arrival order.

use crate::config::ClientConfig;
use crate::decoder::{InboundFrame, decode};
use crate::dispatcher;
use crate::error::{ConfigError, DispatchError};
use crate::render::{Renderer, StatusView, TelemetryReadout, popup_text};
use crate::telemetry_state::TelemetryState;
use crate::transport::{
    ConnectionState, Connector, SessionEvent, SessionTransport, TransportOutcome,
};
use pilot_link_shared::{CommandIntent, TelemetrySnapshot};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

pub struct Session<R: Renderer, V: StatusView> {
    transport: SessionTransport,
    telemetry: TelemetryState,
    renderer: R,
    view: V,
    events: mpsc::UnboundedReceiver<SessionEvent>,
    shown_state: ConnectionState,
}

impl<R: Renderer, V: StatusView> Session<R, V> {
    pub fn new(
        config: &ClientConfig,
        connector: Box<dyn Connector>,
        mut renderer: R,
        mut view: V,
    ) -> Result<Self, ConfigError> {
        let endpoint = config.endpoint()?;
        let (tx, rx) = mpsc::unbounded_channel();

        let transport = SessionTransport::new(endpoint, connector, tx, config.reconnect_delay);

        renderer.init(
            config.default_center.latitude,
            config.default_center.longitude,
        );
        let shown_state = transport.state();
        view.set_connection_status(shown_state.as_str());

        Ok(Self {
            transport,
            telemetry: TelemetryState::with_capacity(config.trail_capacity),
            renderer,
            view,
            events: rx,
            shown_state,
        })
    }

    pub fn state(&self) -> ConnectionState {
        self.transport.state()
    }

    pub fn transport(&self) -> &SessionTransport {
        &self.transport
    }

    pub fn telemetry(&self) -> &TelemetryState {
        &self.telemetry
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn connect(&mut self) {
        self.transport.connect();
        self.publish_state();
    }

    pub fn dispatch(&mut self, intent: CommandIntent) -> Result<(), DispatchError> {
        let res = dispatcher::dispatch(&mut self.transport, intent);
        self.publish_state();
        res
    }

    pub async fn next_event(&mut self) -> Option<SessionEvent> {
        self.events.recv().await
    }

    pub fn handle_event(&mut self, event: SessionEvent) {
        match self.transport.handle_event(event) {
            TransportOutcome::Opened => {
                self.telemetry.start_session();
                self.renderer.set_trail(&[]);
            }
            TransportOutcome::Frame(raw) => self.handle_frame(&raw),
            TransportOutcome::Errored(_)
            | TransportOutcome::Closed { .. }
            | TransportOutcome::Reconnecting
            | TransportOutcome::Ignored => {}
        }
        self.publish_state();
    }

    fn handle_frame(&mut self, raw: &str) {
        match decode(raw) {
            Ok(InboundFrame::StatusNotice(notice)) => {
                info!("[WS] backend status: {}", notice.message);
                self.view.show_backend_status(&notice.message);
            }
            Ok(InboundFrame::TelemetryUpdate(snapshot)) => self.apply_telemetry(snapshot),
            Err(e) => {
                warn!("[WS] dropping frame: {e}");
                debug!("[WS] dropped frame: {raw}");
            }
        }
    }

    fn apply_telemetry(&mut self, snapshot: TelemetrySnapshot) {
        let (current, trail) = self.telemetry.apply_telemetry(snapshot);

        self.view.show_telemetry(&TelemetryReadout::from(current));

        self.renderer
            .set_vehicle_position(current.latitude, current.longitude);
        self.renderer.set_popup_text(&popup_text(current));
        self.renderer.pan_to(current.latitude, current.longitude);
        self.renderer.set_trail(trail);
    }

    fn publish_state(&mut self) {
        let state = self.transport.state();
        if state != self.shown_state {
            self.shown_state = state;
            self.view.set_connection_status(state.as_str());
        }
    }

    /// Processes link events and operator intents. The transport keeps the
    /// event channel alive, so this only returns when the future is dropped.
    pub async fn run(&mut self, mut intents: mpsc::Receiver<CommandIntent>) {
        let mut intents_open = true;
        loop {
            tokio::select! {
                event = self.events.recv() => match event {
                    Some(event) => self.handle_event(event),
                    None => break,
                },
                intent = intents.recv(), if intents_open => match intent {
                    Some(intent) => {
                        let kind = intent.as_str();
                        if let Err(e) = self.dispatch(intent) {
                            warn!("[CMD] {kind} rejected: {e}");
                            self.view.report_command_error(&e);
                        }
                    }
                    None => intents_open = false,
                },
            }
        }
    }
}
