//! Structural checks on inbound commands. Pure: no market, account or
//! engine state is consulted here.

use crate::{
    error::GatewayError,
    models::{lots_to_units, AddTrade, CloseTrade, OrderId, TradeCommand, UpdateTrade},
};

/// Returns the parsed command and the volume in engine units so callers
/// never re-check the code or convert lots themselves.
pub fn validate_open(cmd: &AddTrade) -> Result<(TradeCommand, i32), GatewayError> {
    // command first: an out-of-range code fails regardless of the other fields
    let command = match cmd.command {
        None => return Err(GatewayError::validation("command", "is required")),
        Some(code) => {
            TradeCommand::try_from(code).map_err(|e| GatewayError::validation("command", e))?
        }
    };

    if cmd.symbol.trim().is_empty() {
        return Err(GatewayError::validation("symbol", "is required"));
    }

    if !cmd.volume.is_finite() || cmd.volume <= 0.0 {
        return Err(GatewayError::validation("volume", "must be greater than 0"));
    }

    let units = volume_units(cmd.volume)?;
    Ok((command, units))
}

pub fn validate_update(cmd: &UpdateTrade) -> Result<OrderId, GatewayError> {
    require_ticket(cmd.ticket)
}

/// Volume 0 stays 0 (close everything); any other volume must convert to
/// at least one unit, otherwise it would reach the engine as a full close.
pub fn validate_close(cmd: &CloseTrade) -> Result<(OrderId, i32), GatewayError> {
    let ticket = require_ticket(cmd.ticket)?;

    if !cmd.volume.is_finite() || cmd.volume < 0.0 {
        return Err(GatewayError::validation("volume", "must not be negative"));
    }
    if cmd.volume == 0.0 {
        return Ok((ticket, 0));
    }

    let units = volume_units(cmd.volume)?;
    Ok((ticket, units))
}

fn volume_units(lots: f64) -> Result<i32, GatewayError> {
    match lots_to_units(lots) {
        None => Err(GatewayError::validation("volume", "out of range")),
        Some(units) if units < 1 => {
            Err(GatewayError::validation("volume", "below the 0.1 lot minimum"))
        }
        Some(units) => Ok(units),
    }
}

fn require_ticket(ticket: Option<OrderId>) -> Result<OrderId, GatewayError> {
    match ticket {
        Some(t) if t > 0 => Ok(t),
        Some(_) => Err(GatewayError::validation("ticket", "must be positive")),
        None => Err(GatewayError::validation("ticket", "is required")),
    }
}
