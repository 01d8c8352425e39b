use axum::{middleware::from_fn_with_state, routing::get, Router};
use tower_http::trace::TraceLayer;

use crate::{controllers::home_controller, AppState};

pub mod auth_routes;
pub mod trades_routes;

pub fn app(state: AppState) -> Router {
    let api = Router::<AppState>::new();

    let api = auth_routes::add_routes(api);
    let api = trades_routes::add_routes(api);

    Router::<AppState>::new()
        .route("/health", get(home_controller::health))
        .nest("/api/v1", api)
        .fallback(home_controller::not_found)
        .layer(from_fn_with_state(state.clone(), crate::auth::require_auth))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
