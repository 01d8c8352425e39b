//! Per-request orchestration of trade commands.
//!
//! Every operation runs `validate -> authorize -> price -> submit` in that
//! order and stops at the first failure, so nothing reaches the execution
//! engine unless all earlier steps passed. Each call makes exactly one
//! engine request at most and never retries it.

use crate::{
    error::GatewayError,
    models::{
        AddTrade, CloseTrade, CurrentUser, OrderId, Trade, TradeCommand,
        TransactionKind, TransactionRequest, UpdateTrade,
    },
};

use super::{
    capabilities::{ExecutionEngine, MarketData},
    order_validator, pricing,
};

pub struct OrderGateway<'a> {
    user: CurrentUser,
    market: &'a dyn MarketData,
    engine: &'a dyn ExecutionEngine,
}

impl<'a> OrderGateway<'a> {
    pub fn new(user: CurrentUser, market: &'a dyn MarketData, engine: &'a dyn ExecutionEngine) -> Self {
        Self { user, market, engine }
    }

    /// Caller's trades in provider order.
    pub async fn list_trades(&self) -> Vec<Trade> {
        let login = self.user.login;
        let owned = move |t: &Trade| t.login == login;
        self.market.trades(&owned).await
    }

    pub async fn open_trade(&self, cmd: &AddTrade) -> Result<Trade, GatewayError> {
        let login = self.user.login;
        let (command, units) = order_validator::validate_open(cmd)?;
        let symbol = cmd.symbol.trim();

        if !self.market.is_tradable(login, symbol).await {
            tracing::debug!(login, symbol, "symbol not tradable");
            return Err(GatewayError::NotTradable(format!("invalid symbol {symbol}")));
        }

        let quote = pricing::require_quote(self.market.quote(symbol).await, symbol)?;
        let price = pricing::resolve_open_price(command, &quote, cmd.price);

        let request = TransactionRequest {
            order_by: login,
            kind: TransactionKind::Open,
            order: 0,
            cmd: Some(command),
            symbol: symbol.to_string(),
            volume: units,
            price,
            sl: cmd.sl,
            tp: cmd.tp,
        };

        let trade = self.engine.submit(&request).await.map_err(|e| {
            tracing::warn!(login, symbol, error = %e, "open rejected by engine");
            GatewayError::from(e)
        })?;

        tracing::info!(login, ticket = trade.ticket, symbol, price, volume = request.volume, "trade opened");
        Ok(trade)
    }

    pub async fn update_trade(&self, cmd: &UpdateTrade) -> Result<Trade, GatewayError> {
        let ticket = order_validator::validate_update(cmd)?;
        let trade = self.owned_trade(ticket).await?;

        let request = TransactionRequest {
            order_by: self.user.login,
            kind: TransactionKind::Modify,
            order: ticket,
            cmd: TradeCommand::try_from(trade.cmd).ok(),
            symbol: trade.symbol,
            volume: trade.volume,
            price: cmd.price,
            sl: cmd.sl,
            tp: cmd.tp,
        };

        let updated = self.engine.modify(&request).await.map_err(|e| {
            tracing::warn!(login = self.user.login, ticket, error = %e, "modify rejected by engine");
            GatewayError::from(e)
        })?;

        tracing::info!(login = self.user.login, ticket, sl = cmd.sl, tp = cmd.tp, "trade updated");
        Ok(updated)
    }

    pub async fn close_trade(&self, cmd: &CloseTrade) -> Result<Trade, GatewayError> {
        let (ticket, units) = order_validator::validate_close(cmd)?;
        let trade = self.owned_trade(ticket).await?;

        let original = TradeCommand::try_from(trade.cmd).map_err(|e| {
            GatewayError::Upstream(format!("ticket {ticket} carries unknown command: {e}"))
        })?;

        let quote = pricing::require_quote(self.market.quote(&trade.symbol).await, &trade.symbol)?;
        let price = pricing::resolve_close_price(original, &quote);

        let request = TransactionRequest {
            order_by: self.user.login,
            kind: TransactionKind::Close,
            order: ticket,
            cmd: Some(original),
            symbol: trade.symbol,
            volume: units,
            price,
            sl: 0.0,
            tp: 0.0,
        };

        let closed = self.engine.submit(&request).await.map_err(|e| {
            tracing::warn!(login = self.user.login, ticket, error = %e, "close rejected by engine");
            GatewayError::from(e)
        })?;

        tracing::info!(login = self.user.login, ticket, price, volume = request.volume, "trade closed");
        Ok(closed)
    }

    /// Absent and foreign trades are indistinguishable to the caller.
    async fn owned_trade(&self, ticket: OrderId) -> Result<Trade, GatewayError> {
        match self.market.trade(ticket).await {
            Some(trade) if trade.login == self.user.login => Ok(trade),
            _ => {
                tracing::warn!(login = self.user.login, ticket, "trade not owned by caller");
                Err(GatewayError::Authorization(format!("invalid trade {ticket}")))
            }
        }
    }
}
