pub mod config;
pub mod decoder;
pub mod dispatcher;
pub mod error;
pub mod render;
pub mod session;
pub mod telemetry_state;
pub mod trail;
pub mod transport;
pub mod ws_link;

#[cfg(test)]
mod testing;

pub use config::ClientConfig;
pub use decoder::{InboundFrame, decode};
pub use dispatcher::dispatch;
pub use error::{ConfigError, DecodeError, DispatchError, TransportError};
pub use render::{LogRenderer, LogStatusView, Renderer, StatusView, TelemetryReadout};
pub use session::Session;
pub use telemetry_state::TelemetryState;
pub use transport::{ConnectionState, Connector, SessionEvent, SessionTransport};
pub use ws_link::WebSocketConnector;

pub use pilot_link_shared::{CommandIntent, Position, StatusNotice, TelemetrySnapshot};
