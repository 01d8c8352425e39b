//! In-memory trading venue used when no live trading server is attached.
//! Implements every capability the gateway needs so the binary and the
//! integration tests run against the same code path.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::Utc;
use tokio::sync::RwLock;

use crate::{
    config::Settings,
    error::VenueError,
    models::{Login, OrderId, Quote, Trade, TradeCommand, TransactionKind, TransactionRequest, UNITS_PER_LOT},
};

use super::capabilities::{CredentialVerifier, ExecutionEngine, MarketData};

const CONTRACT_SIZE: f64 = 100_000.0;
const DIGITS: i32 = 5;

#[derive(Default)]
struct Book {
    // login -> bcrypt hash
    accounts: HashMap<Login, String>,
    quotes: HashMap<String, Quote>,
    // ordered by ticket so listings come back in opening order
    trades: BTreeMap<OrderId, Trade>,
    last_ticket: OrderId,
}

impl Book {
    fn marked(&self, trade: &Trade) -> Trade {
        let mut t = trade.clone();
        if let (Some(q), Ok(cmd)) = (self.quotes.get(&t.symbol), TradeCommand::try_from(t.cmd)) {
            if !cmd.is_pending() {
                let exit = if cmd.is_buy() { q.bid } else { q.ask };
                t.profit = profit(cmd, t.open_price, exit, t.volume);
            }
        }
        t
    }
}

fn profit(cmd: TradeCommand, open: f64, exit: f64, units: i32) -> f64 {
    let diff = if cmd.is_buy() { exit - open } else { open - exit };
    let raw = diff * (units as f64 / UNITS_PER_LOT) * CONTRACT_SIZE;
    (raw * 100.0).round() / 100.0
}

pub struct PaperVenue {
    book: RwLock<Book>,
    hash_cost: u32,
}

impl Default for PaperVenue {
    fn default() -> Self {
        Self {
            book: RwLock::new(Book::default()),
            hash_cost: DEFAULT_COST,
        }
    }
}

impl PaperVenue {
    pub fn new() -> Self {
        Self::default()
    }

    /// bcrypt cost for accounts added afterwards.
    pub fn with_hash_cost(mut self, cost: u32) -> Self {
        self.hash_cost = cost;
        self
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, VenueError> {
        let mut venue = Self::new();
        for (login, password) in &settings.paper_accounts {
            venue.add_account(*login, password)?;
        }
        for quote in &settings.paper_quotes {
            venue.set_quote(quote.clone());
        }
        Ok(venue)
    }

    pub fn add_account(&mut self, login: Login, password: &str) -> Result<(), VenueError> {
        let pw_hash = hash(password, self.hash_cost)
            .map_err(|e| VenueError::new(format!("hash password for {login}: {e}")))?;
        self.book.get_mut().accounts.insert(login, pw_hash);
        Ok(())
    }

    pub fn set_quote(&mut self, quote: Quote) {
        self.book.get_mut().quotes.insert(quote.symbol.clone(), quote);
    }

    async fn open(&self, request: &TransactionRequest) -> Result<Trade, VenueError> {
        let mut book = self.book.write().await;

        if !book.accounts.contains_key(&request.order_by) {
            return Err(VenueError::new("invalid account"));
        }
        let Some(cmd) = request.cmd else {
            return Err(VenueError::new("invalid trade command"));
        };
        if request.volume <= 0 {
            return Err(VenueError::new("invalid volume"));
        }
        if !book.quotes.contains_key(&request.symbol) {
            return Err(VenueError::new("invalid symbol"));
        }

        book.last_ticket += 1;
        let trade = Trade {
            ticket: book.last_ticket,
            login: request.order_by,
            symbol: request.symbol.clone(),
            digits: DIGITS,
            cmd: cmd.code(),
            volume: request.volume,
            open_time: Utc::now().timestamp(),
            open_price: request.price,
            sl: request.sl,
            tp: request.tp,
            ..Default::default()
        };
        book.trades.insert(trade.ticket, trade.clone());
        Ok(trade)
    }

    async fn close(&self, request: &TransactionRequest) -> Result<Trade, VenueError> {
        let mut book = self.book.write().await;

        let Some(open) = book.trades.get_mut(&request.order) else {
            return Err(VenueError::new("invalid ticket"));
        };

        // 0 (or more than is open) closes everything
        let units = if request.volume <= 0 || request.volume >= open.volume {
            open.volume
        } else {
            request.volume
        };

        let mut closed = open.clone();
        closed.volume = units;
        closed.close_price = request.price;
        closed.close_time = Utc::now().timestamp();
        if let Ok(cmd) = TradeCommand::try_from(closed.cmd) {
            if !cmd.is_pending() {
                closed.profit = profit(cmd, closed.open_price, closed.close_price, units);
            }
        }

        if units == open.volume {
            book.trades.remove(&request.order);
        } else {
            open.volume -= units;
        }

        Ok(closed)
    }
}

#[async_trait]
impl CredentialVerifier for PaperVenue {
    async fn check_password(&self, login: Login, password: &str) -> Result<bool, VenueError> {
        let book = self.book.read().await;
        // unknown login reads the same as a wrong password
        Ok(book
            .accounts
            .get(&login)
            .map(|pw_hash| verify(password, pw_hash).unwrap_or(false))
            .unwrap_or(false))
    }
}

#[async_trait]
impl MarketData for PaperVenue {
    async fn quote(&self, symbol: &str) -> Option<Quote> {
        self.book.read().await.quotes.get(symbol).cloned()
    }

    async fn is_tradable(&self, login: Login, symbol: &str) -> bool {
        let book = self.book.read().await;
        book.accounts.contains_key(&login) && book.quotes.contains_key(symbol)
    }

    async fn trade(&self, ticket: OrderId) -> Option<Trade> {
        let book = self.book.read().await;
        book.trades.get(&ticket).map(|t| book.marked(t))
    }

    async fn trades(&self, filter: &(dyn for<'t> Fn(&'t Trade) -> bool + Send + Sync)) -> Vec<Trade> {
        let book = self.book.read().await;
        book.trades
            .values()
            .filter(|&t| filter(t))
            .map(|t| book.marked(t))
            .collect()
    }
}

#[async_trait]
impl ExecutionEngine for PaperVenue {
    async fn submit(&self, request: &TransactionRequest) -> Result<Trade, VenueError> {
        match request.kind {
            TransactionKind::Open => self.open(request).await,
            TransactionKind::Close => self.close(request).await,
            TransactionKind::Modify => Err(VenueError::new("modify requests go through modify")),
        }
    }

    async fn modify(&self, request: &TransactionRequest) -> Result<Trade, VenueError> {
        if request.kind != TransactionKind::Modify {
            return Err(VenueError::new("invalid transaction type"));
        }

        let mut book = self.book.write().await;
        let Some(trade) = book.trades.get_mut(&request.order) else {
            return Err(VenueError::new("invalid ticket"));
        };

        trade.sl = request.sl;
        trade.tp = request.tp;
        let pending = TradeCommand::try_from(trade.cmd).map(TradeCommand::is_pending).unwrap_or(false);
        if pending && request.price > 0.0 {
            trade.open_price = request.price;
        }

        let trade = trade.clone();
        Ok(book.marked(&trade))
    }
}
