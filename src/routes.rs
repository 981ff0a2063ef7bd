use std::iter;

use axum::http::header;
use axum::routing::{get, post};
use axum::{middleware, Router};
use tower_http::cors::CorsLayer;
use tower_http::sensitive_headers::SetSensitiveRequestHeadersLayer;
use tower_http::trace::{DefaultMakeSpan, TraceLayer};

use crate::handlers::auth::{login, register};
use crate::handlers::dashboard::{add_place, get_buildings, get_dashboard_stats, get_distance};
use crate::handlers::translate::translate;
use crate::handlers::user::get_user_profile;
use crate::jwt_auth::auth;
use crate::rate_limit::rate_limit;
use crate::state::AppState;


/// Bearer tokens are redacted from the header dump in request spans.
fn redact_credentials() -> SetSensitiveRequestHeadersLayer {
    SetSensitiveRequestHeadersLayer::new(iter::once(header::AUTHORIZATION))
}

/// The full HTTP surface, mounted under `/api`.
pub fn app(state: AppState) -> Router {
    let protected = Router::new()
        .route("/dashboard/add", post(add_place))
        .route("/dashboard/distance", post(get_distance))
        .route("/dashboard/stats", get(get_dashboard_stats))
        .route("/user/profile", get(get_user_profile))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth));

    let public = Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/dashboard/buildings", get(get_buildings))
        .route("/translate", post(translate));

    Router::new()
        .nest("/api", public.merge(protected))
        .layer(middleware::from_fn_with_state(state.clone(), rate_limit))
        .layer(CorsLayer::permissive())
        // logging so we can see whats going on
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::default().include_headers(true)),
        )
        .layer(redact_credentials())
        .with_state(state)
}
