use axum::{
    extract::{rejection::JsonRejection, Extension, State},
    Json,
};

use crate::{
    error::GatewayError,
    models::{Ack, AddTrade, CloseTrade, CurrentUser, Trade, UpdateTrade},
    services::order_gateway::OrderGateway,
    AppState,
};

// The identity is put there by `auth::require_auth`; its absence means the
// route was mounted without the middleware.
fn identity(user: Option<Extension<CurrentUser>>) -> Result<CurrentUser, GatewayError> {
    user.map(|Extension(u)| u)
        .ok_or_else(|| GatewayError::Internal("identity missing from request".to_string()))
}

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, GatewayError> {
    payload
        .map(|Json(v)| v)
        .map_err(|rejection| GatewayError::validation("body", rejection.body_text()))
}

fn gateway(state: &AppState, user: CurrentUser) -> OrderGateway<'_> {
    OrderGateway::new(user, state.market.as_ref(), state.engine.as_ref())
}

// GET /api/v1/trades/:login
// The path segment is accepted for compatibility; the session identity decides.
pub async fn list_user_trades(
    State(state): State<AppState>,
    user: Option<Extension<CurrentUser>>,
) -> Result<Json<Vec<Trade>>, GatewayError> {
    let user = identity(user)?;
    Ok(Json(gateway(&state, user).list_trades().await))
}

// POST /api/v1/trades/add
pub async fn add_trade(
    State(state): State<AppState>,
    user: Option<Extension<CurrentUser>>,
    payload: Result<Json<AddTrade>, JsonRejection>,
) -> Result<Json<Trade>, GatewayError> {
    let user = identity(user)?;
    let cmd = body(payload)?;
    let trade = gateway(&state, user).open_trade(&cmd).await?;
    Ok(Json(trade))
}

// PATCH /api/v1/trades/update
pub async fn update_trade(
    State(state): State<AppState>,
    user: Option<Extension<CurrentUser>>,
    payload: Result<Json<UpdateTrade>, JsonRejection>,
) -> Result<Json<Ack>, GatewayError> {
    let user = identity(user)?;
    let cmd = body(payload)?;
    gateway(&state, user).update_trade(&cmd).await?;
    Ok(Json(Ack::ok("updated")))
}

// PATCH /api/v1/trades/close
pub async fn close_trade(
    State(state): State<AppState>,
    user: Option<Extension<CurrentUser>>,
    payload: Result<Json<CloseTrade>, JsonRejection>,
) -> Result<Json<Ack>, GatewayError> {
    let user = identity(user)?;
    let cmd = body(payload)?;
    gateway(&state, user).close_trade(&cmd).await?;
    Ok(Json(Ack::ok("closed")))
}
