use axum::{Router, routing::{get, post}};

use crate::{AppState, controllers::auth_controller};

pub fn add_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route("/auth/login", post(auth_controller::post_login))
        // refresh window may outlive the token itself
        .route("/auth/refresh_token", get(auth_controller::get_refresh_token))
}
