// client/src/ws_link.rs
//
// Native websocket link. One task per connection attempt: handshake, then pump
// outbound text frames from the channel and inbound frames onto the session's
// event channel until either side goes away.

use crate::error::TransportError;
use crate::transport::{Connector, LinkEvent, LinkEvents, LinkHandle};
use futures_util::{SinkExt, StreamExt};
use std::sync::Once;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tracing::debug;
use url::Url;

static TLS_PROVIDER: Once = Once::new();

/// wss handshakes need a process-wide rustls crypto provider.
fn install_tls_provider() {
    TLS_PROVIDER.call_once(|| {
        if rustls::crypto::ring::default_provider().install_default().is_err() {
            debug!("[WS] rustls crypto provider already installed");
        }
    });
}

#[derive(Debug, Default, Clone)]
pub struct WebSocketConnector;

impl Connector for WebSocketConnector {
    fn open(&mut self, endpoint: &Url, events: LinkEvents) -> Result<LinkHandle, TransportError> {
        match endpoint.scheme() {
            "ws" => {}
            "wss" => install_tls_provider(),
            _ => return Err(TransportError::Endpoint(endpoint.to_string())),
        }

        let (tx, rx) = mpsc::unbounded_channel::<String>();
        let task = tokio::spawn(run_link(endpoint.to_string(), events, rx));
        Ok(LinkHandle::new(tx, Some(task)))
    }
}

async fn run_link(url: String, events: LinkEvents, mut outbound: mpsc::UnboundedReceiver<String>) {
    let epoch = events.epoch();

    let ws_stream = match tokio_tungstenite::connect_async(url.as_str()).await {
        Ok((ws_stream, _)) => ws_stream,
        Err(e) => {
            events.post(LinkEvent::Error(e.into()));
            events.post(LinkEvent::Closed);
            return;
        }
    };

    if !events.post(LinkEvent::Opened) {
        return;
    }

    let (mut write, mut read) = ws_stream.split();

    loop {
        tokio::select! {
            item = read.next() => {
                let Some(item) = item else { break };
                match item {
                    Ok(Message::Text(text)) => {
                        if !events.post(LinkEvent::Message(text.as_str().to_owned())) {
                            break;
                        }
                    }
                    Ok(Message::Close(frame)) => {
                        debug!("[WS] close frame (epoch={epoch}): {frame:?}");
                        break;
                    }
                    Ok(_) => {}
                    Err(e) => {
                        events.post(LinkEvent::Error(e.into()));
                        break;
                    }
                }
            }
            frame = outbound.recv() => {
                let Some(frame) = frame else {
                    // Session dropped the handle.
                    let _ = write.close().await;
                    return;
                };
                if let Err(e) = write.send(Message::Text(frame.into())).await {
                    events.post(LinkEvent::Error(e.into()));
                    break;
                }
            }
        }
    }

    events.post(LinkEvent::Closed);
}
