// main.rs
//
// Headless client: keeps the link to the backend up and logs what a map and
// status panel would show.

use pilot_link_client::{ClientConfig, LogRenderer, LogStatusView, Session, WebSocketConnector};
use tokio::sync::mpsc;
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ClientConfig::from_env()?;
    let mut session = Session::new(
        &config,
        Box::new(WebSocketConnector),
        LogRenderer::default(),
        LogStatusView,
    )?;

    // Nothing issues commands in headless mode; the sender keeps the channel open.
    let (_intent_tx, intent_rx) = mpsc::channel(32);

    session.connect();

    tokio::select! {
        _ = session.run(intent_rx) => {}
        res = tokio::signal::ctrl_c() => {
            res?;
            tracing::info!("shutting down");
        }
    }

    Ok(())
}
