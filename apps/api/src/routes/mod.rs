pub mod health;

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use crate::auth::{handlers as auth, middleware::require_session};
use crate::portfolio::{handlers as portfolio, uploads};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let public = Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/catalog", get(health::catalog_handler))
        .route("/api/v1/auth/register", post(auth::handle_register))
        .route("/api/v1/auth/login", post(auth::handle_login))
        .route("/api/v1/auth/logout", post(auth::handle_logout));

    // Everything below needs a live session cookie.
    let protected = Router::new()
        .route("/api/v1/me", get(auth::handle_me))
        .route("/api/v1/portfolio", get(portfolio::handle_get_portfolio))
        .route("/api/v1/portfolio/save", post(portfolio::handle_save))
        .route("/api/v1/portfolio/revert", post(portfolio::handle_revert))
        .route(
            "/api/v1/portfolio/personal-info",
            put(portfolio::handle_put_personal_info),
        )
        .route("/api/v1/portfolio/modules", put(portfolio::handle_put_modules))
        .route(
            "/api/v1/portfolio/modules/:module",
            put(portfolio::handle_toggle_module),
        )
        .route("/api/v1/portfolio/theme", put(portfolio::handle_put_theme))
        .route(
            "/api/v1/portfolio/sections/:section",
            put(portfolio::handle_put_section_meta),
        )
        .route(
            "/api/v1/portfolio/sections/:section/items",
            post(portfolio::handle_append_item),
        )
        .route(
            "/api/v1/portfolio/sections/:section/items/:id",
            put(portfolio::handle_replace_item).delete(portfolio::handle_remove_item),
        )
        .route(
            "/api/v1/portfolio/sections/:section/items/:id/move",
            post(portfolio::handle_move_item),
        )
        .route(
            "/api/v1/portfolio/export/:format",
            get(portfolio::handle_export),
        )
        .route("/api/v1/assets/:category", post(uploads::handle_upload))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_session,
        ));

    public.merge(protected).with_state(state)
}
