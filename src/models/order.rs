use serde::{Deserialize, Serialize};

use super::OrderId;

// Command fields are optional on the wire so that missing values surface as
// validation errors naming the field instead of a body rejection.

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AddTrade {
    #[serde(default)]
    pub command: Option<i32>,
    #[serde(default)]
    pub symbol: String,
    // lots
    #[serde(default)]
    pub volume: f64,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub sl: f64,
    #[serde(default)]
    pub tp: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTrade {
    #[serde(default)]
    pub ticket: Option<OrderId>,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub sl: f64,
    #[serde(default)]
    pub tp: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CloseTrade {
    #[serde(default)]
    pub ticket: Option<OrderId>,
    // lots; 0 closes the whole position
    #[serde(default)]
    pub volume: f64,
}

/// Body returned by update/close.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ack {
    pub code: u16,
    pub message: String,
}

impl Ack {
    pub fn ok(message: &str) -> Self {
        Ack {
            code: 200,
            message: message.to_string(),
        }
    }
}

/// Lots per minimum engine unit: 0.1 lot is one unit.
pub const UNITS_PER_LOT: f64 = 10.0;

/// Lots to the execution engine's integer volume, rounded to the nearest
/// unit so float noise in the product cannot drop a unit. `None` when the
/// result is not finite or does not fit the engine's volume field.
pub fn lots_to_units(lots: f64) -> Option<i32> {
    let units = (lots * UNITS_PER_LOT).round();
    if !units.is_finite() || units < i32::MIN as f64 || units > i32::MAX as f64 {
        return None;
    }
    Some(units as i32)
}
