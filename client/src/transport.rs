// client/src/transport.rs
//
// Owns the one streaming link and its lifecycle:
//   connect -> open -> closed/error -> (timer) -> connect
// Link tasks and the reconnect timer only post `SessionEvent`s; every state
// change happens in `SessionTransport` on the session's timeline.

use crate::error::TransportError;
use pilot_link_shared::CommandIntent;
use std::fmt;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Open,
    Closed,
    Errored,
}

impl ConnectionState {
    /// Connection-status text shown to the operator.
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionState::Disconnected => "Disconnected",
            ConnectionState::Connecting => "Connecting",
            ConnectionState::Open => "Connected",
            ConnectionState::Closed => "Disconnected",
            ConnectionState::Errored => "Error",
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the underlying link reports.
#[derive(Debug)]
pub enum LinkEvent {
    Opened,
    Message(String),
    Error(TransportError),
    Closed,
}

#[derive(Debug)]
pub enum SessionEvent {
    /// `epoch` identifies the connection attempt the event belongs to.
    Link { epoch: u64, event: LinkEvent },
    ReconnectDue { ticket: u64 },
}

pub type EventSender = mpsc::UnboundedSender<SessionEvent>;

/// Posts link events for one epoch onto the session channel.
#[derive(Clone)]
pub struct LinkEvents {
    epoch: u64,
    tx: EventSender,
}

impl LinkEvents {
    pub fn new(epoch: u64, tx: EventSender) -> Self {
        Self { epoch, tx }
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// False once the session is gone.
    pub fn post(&self, event: LinkEvent) -> bool {
        self.tx
            .send(SessionEvent::Link {
                epoch: self.epoch,
                event,
            })
            .is_ok()
    }
}

/// Outbound side of an open link plus the task driving it.
#[derive(Debug)]
pub struct LinkHandle {
    outbound: mpsc::UnboundedSender<String>,
    task: Option<JoinHandle<()>>,
}

impl LinkHandle {
    pub fn new(outbound: mpsc::UnboundedSender<String>, task: Option<JoinHandle<()>>) -> Self {
        Self { outbound, task }
    }

    fn send(&self, frame: String) -> Result<(), TransportError> {
        self.outbound
            .send(frame)
            .map_err(|_| TransportError::LinkClosed)
    }
}

impl Drop for LinkHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Opens links. The websocket implementation lives in `ws_link`; tests plug in
/// their own.
pub trait Connector: Send {
    fn open(&mut self, endpoint: &Url, events: LinkEvents) -> Result<LinkHandle, TransportError>;
}

// ---------------------------------------------------------
// Reconnect timer: at most one pending, cancelable
// ---------------------------------------------------------
pub struct ReconnectTimer {
    delay: Duration,
    next_ticket: u64,
    pending: Option<PendingReconnect>,
}

struct PendingReconnect {
    ticket: u64,
    task: JoinHandle<()>,
}

impl ReconnectTimer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            next_ticket: 0,
            pending: None,
        }
    }

    /// Returns false (and does nothing) if a reconnect is already pending.
    /// Must be called from inside a tokio runtime.
    pub fn schedule(&mut self, tx: &EventSender) -> bool {
        if self.pending.is_some() {
            return false;
        }

        self.next_ticket += 1;
        let ticket = self.next_ticket;
        let delay = self.delay;
        let tx = tx.clone();
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(SessionEvent::ReconnectDue { ticket });
        });

        self.pending = Some(PendingReconnect { ticket, task });
        true
    }

    /// Consumes the pending reconnect if `ticket` is the one outstanding.
    pub fn fire(&mut self, ticket: u64) -> bool {
        match &self.pending {
            Some(p) if p.ticket == ticket => {
                self.pending = None;
                true
            }
            _ => false,
        }
    }

    pub fn cancel(&mut self) {
        if let Some(p) = self.pending.take() {
            p.task.abort();
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn pending_ticket(&self) -> Option<u64> {
        self.pending.as_ref().map(|p| p.ticket)
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl Drop for ReconnectTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Result of feeding one event to the transport.
#[derive(Debug)]
pub enum TransportOutcome {
    /// A new session started; the trail must be cleared.
    Opened,
    /// Raw inbound frame for the decoder.
    Frame(String),
    Errored(TransportError),
    Closed { reconnect_scheduled: bool },
    /// The timer fired and a new attempt was started.
    Reconnecting,
    /// Stale epoch/ticket or an event that changes nothing.
    Ignored,
}

pub struct SessionTransport {
    endpoint: Url,
    state: ConnectionState,
    epoch: u64,
    link: Option<LinkHandle>,
    connector: Box<dyn Connector>,
    events: EventSender,
    reconnect: ReconnectTimer,
}

impl SessionTransport {
    pub fn new(
        endpoint: Url,
        connector: Box<dyn Connector>,
        events: EventSender,
        reconnect_delay: Duration,
    ) -> Self {
        Self {
            endpoint,
            state: ConnectionState::Disconnected,
            epoch: 0,
            link: None,
            connector,
            events,
            reconnect: ReconnectTimer::new(reconnect_delay),
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn is_ready(&self) -> bool {
        self.state == ConnectionState::Open
    }

    pub fn reconnect_timer(&self) -> &ReconnectTimer {
        &self.reconnect
    }

    /// Starts a new connection attempt unless one is open or in flight.
    pub fn connect(&mut self) {
        if matches!(
            self.state,
            ConnectionState::Open | ConnectionState::Connecting
        ) {
            return;
        }

        self.reconnect.cancel();
        self.link = None;
        self.epoch += 1;
        self.state = ConnectionState::Connecting;

        info!("[WS] connecting to {} (epoch={})", self.endpoint, self.epoch);

        let events = LinkEvents::new(self.epoch, self.events.clone());
        match self.connector.open(&self.endpoint, events) {
            Ok(link) => self.link = Some(link),
            Err(e) => {
                // Same path a browser takes: error, then close.
                warn!("[WS] connect failed: {e}");
                self.state = ConnectionState::Errored;
                self.on_closed();
            }
        }
    }

    /// Transmits only while open; otherwise does nothing. Returns whether the
    /// frame was handed to the link.
    pub fn send(&mut self, frame: &str) -> bool {
        if !self.is_ready() {
            debug!("[WS] dropping frame while {}: {frame}", self.state);
            return false;
        }

        let Some(link) = &self.link else {
            return false;
        };

        match link.send(frame.to_string()) {
            Ok(()) => true,
            Err(e) => {
                warn!("[WS] send failed: {e}");
                false
            }
        }
    }

    pub fn handle_event(&mut self, event: SessionEvent) -> TransportOutcome {
        match event {
            SessionEvent::Link { epoch, event } => {
                if epoch != self.epoch {
                    debug!("[WS] ignoring event from stale epoch {epoch} (current={})", self.epoch);
                    return TransportOutcome::Ignored;
                }
                self.handle_link_event(event)
            }
            SessionEvent::ReconnectDue { ticket } => {
                if !self.reconnect.fire(ticket) {
                    return TransportOutcome::Ignored;
                }
                info!("[WS] reconnecting");
                self.connect();
                TransportOutcome::Reconnecting
            }
        }
    }

    fn handle_link_event(&mut self, event: LinkEvent) -> TransportOutcome {
        match event {
            LinkEvent::Opened => {
                if self.state != ConnectionState::Connecting {
                    return TransportOutcome::Ignored;
                }
                self.state = ConnectionState::Open;
                info!("[WS] open (epoch={})", self.epoch);

                // Ask the backend to start streaming.
                match serde_json::to_string(&CommandIntent::Connect) {
                    Ok(frame) => {
                        self.send(&frame);
                    }
                    Err(e) => warn!("[WS] failed to encode connect frame: {e}"),
                }
                TransportOutcome::Opened
            }
            LinkEvent::Message(raw) => {
                if self.state != ConnectionState::Open {
                    return TransportOutcome::Ignored;
                }
                TransportOutcome::Frame(raw)
            }
            LinkEvent::Error(e) => {
                if matches!(
                    self.state,
                    ConnectionState::Closed | ConnectionState::Disconnected
                ) {
                    return TransportOutcome::Ignored;
                }
                warn!("[WS] error: {e}");
                self.state = ConnectionState::Errored;
                TransportOutcome::Errored(e)
            }
            LinkEvent::Closed => self.on_closed(),
        }
    }

    fn on_closed(&mut self) -> TransportOutcome {
        if self.state != ConnectionState::Closed {
            info!("[WS] closed (epoch={})", self.epoch);
        }
        self.state = ConnectionState::Closed;
        self.link = None;

        let reconnect_scheduled = self.reconnect.schedule(&self.events);
        if reconnect_scheduled {
            info!("[WS] reconnect in {:?}", self.reconnect.delay());
        }
        TransportOutcome::Closed { reconnect_scheduled }
    }
}
