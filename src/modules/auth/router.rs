use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_governor::GovernorLayer;

use crate::state::AppState;

use super::controller::{get_current_user, login_user, logout_user, register_user};

/// Auth routes. Register and login sit behind the auth rate limiter when it is enabled.
pub fn init_auth_router(state: &AppState) -> Router<AppState> {
    let mut public = Router::new()
        .route("/register", post(register_user))
        .route("/login", post(login_user));

    if state.rate_limit_config.enabled {
        let config = Arc::new(state.rate_limit_config.auth_governor_config());
        public = public.layer(GovernorLayer::new(config));
    }

    Router::new()
        .merge(public)
        .route("/me", get(get_current_user))
        .route("/logout", post(logout_user))
}
