//! Router construction
//!
//! Generic over the repository implementations so tests can serve the same
//! routes over in-memory storage.

use axum::{
    routing::{get, put},
    Json, Router,
};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::domain::ports::{GroupRepository, UserRepository};
use crate::handlers;
use crate::AppState;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub fn router<UR, GR>(state: AppState<UR, GR>) -> Router
where
    UR: UserRepository,
    GR: GroupRepository,
{
    Router::new()
        .route("/health", get(health))
        // Users
        .route(
            "/users",
            get(handlers::list_users::<UR, GR>).post(handlers::create_user::<UR, GR>),
        )
        .route(
            "/users/:id",
            get(handlers::get_user::<UR, GR>)
                .put(handlers::update_user::<UR, GR>)
                .delete(handlers::delete_user::<UR, GR>),
        )
        .route("/users/:id/role", put(handlers::change_role::<UR, GR>))
        .route(
            "/users/:id/groups",
            get(handlers::list_user_groups::<UR, GR>)
                .post(handlers::join_group::<UR, GR>)
                .delete(handlers::leave_group::<UR, GR>),
        )
        // Groups
        .route(
            "/groups",
            get(handlers::list_groups::<UR, GR>).post(handlers::create_group::<UR, GR>),
        )
        .route(
            "/groups/:id",
            get(handlers::get_group::<UR, GR>)
                .put(handlers::update_group::<UR, GR>)
                .delete(handlers::delete_group::<UR, GR>),
        )
        .route(
            "/groups/:id/members",
            get(handlers::list_members::<UR, GR>)
                .post(handlers::add_member::<UR, GR>)
                .delete(handlers::remove_member::<UR, GR>),
        )
        .layer(
            ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            ),
        )
        .with_state(state)
}
