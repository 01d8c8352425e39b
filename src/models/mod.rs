pub mod user;
pub mod trade;
pub mod order;

pub use user::{CurrentUser, Login, LoginUser, UserLoginResponse};
pub use trade::{Quote, Trade, TradeCommand, TransactionKind, TransactionRequest, OrderId};
pub use order::{lots_to_units, Ack, AddTrade, CloseTrade, UpdateTrade, UNITS_PER_LOT};
