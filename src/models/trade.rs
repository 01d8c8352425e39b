use serde::{Deserialize, Serialize};

use super::Login;

pub type OrderId = i64;

/// Snapshot of an order as held by the trading server.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub ticket: OrderId,
    pub login: Login,
    pub symbol: String,
    pub digits: i32,
    pub cmd: i32,
    // minimum units (lots * 10)
    pub volume: i32,
    pub open_time: i64,
    pub open_price: f64,
    pub close_time: i64,
    pub close_price: f64,
    pub sl: f64,
    pub tp: f64,
    pub comment: String,
    pub expiration: i64,
    pub profit: f64,
    pub magic: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub symbol: String,
    pub bid: f64,
    pub ask: f64,
}

/// Order command codes as understood by the trading server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum TradeCommand {
    Buy = 0,
    Sell = 1,
    BuyLimit = 2,
    SellLimit = 3,
    BuyStop = 4,
    SellStop = 5,
}

impl TradeCommand {
    pub fn code(self) -> i32 {
        self as i32
    }

    pub fn is_buy(self) -> bool {
        matches!(self, TradeCommand::Buy | TradeCommand::BuyLimit | TradeCommand::BuyStop)
    }

    /// Market orders fill immediately; the rest rest on the book until triggered.
    pub fn is_pending(self) -> bool {
        !matches!(self, TradeCommand::Buy | TradeCommand::Sell)
    }
}

impl TryFrom<i32> for TradeCommand {
    type Error = String;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(TradeCommand::Buy),
            1 => Ok(TradeCommand::Sell),
            2 => Ok(TradeCommand::BuyLimit),
            3 => Ok(TradeCommand::SellLimit),
            4 => Ok(TradeCommand::BuyStop),
            5 => Ok(TradeCommand::SellStop),
            other => Err(format!("value from 0 to 5, got {other}")),
        }
    }
}

impl From<TradeCommand> for i32 {
    fn from(cmd: TradeCommand) -> Self {
        cmd.code()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Open,
    Modify,
    Close,
}

/// Instruction sent to the execution engine. Volume is in minimum units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRequest {
    pub order_by: Login,
    pub kind: TransactionKind,
    // ticket of the order being modified or closed; 0 on open
    pub order: OrderId,
    pub cmd: Option<TradeCommand>,
    pub symbol: String,
    pub volume: i32,
    pub price: f64,
    pub sl: f64,
    pub tp: f64,
}
