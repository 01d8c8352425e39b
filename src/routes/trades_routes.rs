use axum::{Router, routing::{get, patch, post}};

use crate::{AppState, controllers::trades_controller};

pub fn add_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route("/trades/:login", get(trades_controller::list_user_trades))
        .route("/trades/add", post(trades_controller::add_trade))
        .route("/trades/update", patch(trades_controller::update_trade))
        .route("/trades/close", patch(trades_controller::close_trade))
}
