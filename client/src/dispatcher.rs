use crate::error::DispatchError;
use crate::transport::SessionTransport;
use pilot_link_shared::CommandIntent;
use tracing::debug;

/// Validates, serializes and sends one intent.
///
/// `Connect` is the only intent accepted while the link is down: it starts
/// (or reuses) a connection attempt instead of sending a frame. Everything
/// else is rejected with [`DispatchError::NotConnected`] unless the link is
/// open. Nothing is retried or queued.
pub fn dispatch(transport: &mut SessionTransport, intent: CommandIntent) -> Result<(), DispatchError> {
    validate(&intent)?;

    if !transport.is_ready() {
        if intent == CommandIntent::Connect {
            transport.connect();
            return Ok(());
        }
        return Err(DispatchError::NotConnected);
    }

    let frame = serde_json::to_string(&intent)
        .map_err(|e| DispatchError::InvalidInput(e.to_string()))?;

    debug!("[CMD] {} -> {frame}", intent.as_str());
    if transport.send(&frame) {
        Ok(())
    } else {
        Err(DispatchError::NotConnected)
    }
}

pub fn validate(intent: &CommandIntent) -> Result<(), DispatchError> {
    match intent {
        CommandIntent::Takeoff { altitude } => finite("altitude", *altitude),
        CommandIntent::Goto {
            latitude,
            longitude,
            altitude,
        } => {
            finite("latitude", *latitude)?;
            finite("longitude", *longitude)?;
            finite("altitude", *altitude)
        }
        CommandIntent::SetMode { mode_name } => {
            if mode_name.trim().is_empty() {
                Err(DispatchError::InvalidInput("mode name is empty".into()))
            } else {
                Ok(())
            }
        }
        CommandIntent::Connect | CommandIntent::Arm | CommandIntent::Land => Ok(()),
    }
}

fn finite(name: &str, v: f64) -> Result<(), DispatchError> {
    if v.is_finite() {
        Ok(())
    } else {
        Err(DispatchError::InvalidInput(format!("{name} must be a finite number, got {v}")))
    }
}

// ---------------------------------------------------------
// Raw form input -> intent
// ---------------------------------------------------------

fn parse_number(name: &str, raw: &str) -> Result<f64, DispatchError> {
    let v = raw
        .trim()
        .parse::<f64>()
        .map_err(|_| DispatchError::InvalidInput(format!("{name}: '{raw}' is not a number")))?;
    finite(name, v)?;
    Ok(v)
}

pub fn parse_takeoff(altitude: &str) -> Result<CommandIntent, DispatchError> {
    Ok(CommandIntent::Takeoff {
        altitude: parse_number("altitude", altitude)?,
    })
}

pub fn parse_goto(latitude: &str, longitude: &str, altitude: &str) -> Result<CommandIntent, DispatchError> {
    Ok(CommandIntent::Goto {
        latitude: parse_number("latitude", latitude)?,
        longitude: parse_number("longitude", longitude)?,
        altitude: parse_number("altitude", altitude)?,
    })
}

pub fn parse_set_mode(mode_name: &str) -> Result<CommandIntent, DispatchError> {
    let intent = CommandIntent::SetMode {
        mode_name: mode_name.trim().to_string(),
    };
    validate(&intent)?;
    Ok(intent)
}
