//! Boundaries to the outside world: the credential store, the market-data
//! feed and the execution engine. Implementations must be safe to share
//! across concurrent requests; the gateway never locks around them.

use async_trait::async_trait;

use crate::{
    error::VenueError,
    models::{Login, OrderId, Quote, Trade, TransactionRequest},
};

#[async_trait]
pub trait CredentialVerifier: Send + Sync {
    /// `Ok(true)` iff the pair matches. `Err` only on backend failure.
    async fn check_password(&self, login: Login, password: &str) -> Result<bool, VenueError>;
}

#[async_trait]
pub trait MarketData: Send + Sync {
    /// `None` when the symbol has no active quote.
    async fn quote(&self, symbol: &str) -> Option<Quote>;

    async fn is_tradable(&self, login: Login, symbol: &str) -> bool;

    /// `None` when the ticket is unknown or already closed.
    async fn trade(&self, ticket: OrderId) -> Option<Trade>;

    async fn trades(&self, filter: &(dyn for<'t> Fn(&'t Trade) -> bool + Send + Sync)) -> Vec<Trade>;
}

#[async_trait]
pub trait ExecutionEngine: Send + Sync {
    /// Opens or closes an order.
    async fn submit(&self, request: &TransactionRequest) -> Result<Trade, VenueError>;

    /// Changes price/sl/tp of an existing order.
    async fn modify(&self, request: &TransactionRequest) -> Result<Trade, VenueError>;
}
