//! mp-lambda
//!
//! HTTP API for the Money Personality app, served from AWS Lambda.

use axum::middleware as axum_mw;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};

pub mod config;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod routes;
pub mod state;

use state::AppState;

/// The full router with middleware and state applied.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Protected routes
    let protected = Router::new()
        .route(
            "/assessments",
            get(routes::assessments::list_assessments).post(routes::assessments::create_assessment),
        )
        .route(
            "/assessments/{id}",
            get(routes::assessments::get_assessment)
                .put(routes::assessments::update_assessment)
                .delete(routes::assessments::delete_assessment),
        )
        .route("/assessments/{id}/result", get(routes::assessments::get_result))
        .route(
            "/friend-shares",
            get(routes::friend_shares::list_friend_shares)
                .post(routes::friend_shares::create_friend_share),
        )
        .route_layer(axum_mw::from_fn_with_state(
            state.clone(),
            middleware::auth::require_auth,
        ));

    Router::new()
        // Health (no auth)
        .route("/health", get(routes::health::health_check))
        // Payments and mail
        .route("/create-checkout", post(routes::checkout::create_checkout_session))
        .route("/send-email", post(routes::email::send_email))
        .route("/stripe-webhook", post(routes::webhook::stripe_webhook))
        // Questionnaire (no auth, pure computation)
        .route("/questions", get(routes::questionnaire::get_questions))
        .route("/profile", post(routes::questionnaire::score_profile))
        .route("/compatibility", post(routes::questionnaire::compare))
        // Auth gateway
        .route("/auth/sign-in", post(routes::auth::sign_in))
        .route("/auth/refresh", post(routes::auth::refresh))
        .route("/auth/sign-up", post(routes::auth::sign_up))
        // Invitee and friend submissions
        .route(
            "/assessments/{id}/complete",
            post(routes::assessments::complete_assessment),
        )
        .route("/friend-shares/{id}", get(routes::friend_shares::get_friend_share))
        .route(
            "/friend-shares/{id}/complete",
            post(routes::friend_shares::complete_friend_share),
        )
        .route(
            "/friend-shares/{id}/compatibility",
            get(routes::friend_shares::get_compatibility),
        )
        .merge(protected)
        .layer(axum_mw::from_fn(middleware::audit::audit_log))
        .layer(cors)
        .with_state(state)
}
