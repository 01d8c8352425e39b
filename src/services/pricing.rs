use crate::{
    error::GatewayError,
    models::{Quote, TradeCommand},
};

/// Market buys fill at the ask, market sells at the bid. Limit and stop
/// orders rest at the client's requested level.
pub fn resolve_open_price(command: TradeCommand, quote: &Quote, requested: f64) -> f64 {
    match command {
        TradeCommand::Buy => quote.ask,
        TradeCommand::Sell => quote.bid,
        _ => requested,
    }
}

/// Closing is the inverse transaction: a buy is closed at the bid.
pub fn resolve_close_price(original: TradeCommand, quote: &Quote) -> f64 {
    if original.is_buy() { quote.bid } else { quote.ask }
}

pub fn require_quote(quote: Option<Quote>, symbol: &str) -> Result<Quote, GatewayError> {
    quote.ok_or_else(|| GatewayError::Pricing(format!("no market price for {symbol}")))
}
