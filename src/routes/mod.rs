use axum::{
    middleware,
    routing::{get, patch, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod auth;
mod health;
pub mod middleware_auth;
pub mod reports;
pub mod tasks;

use crate::state::AppState;

pub fn routes(state: AppState) -> Router {
    let task_router = Router::new()
        .route("/", get(tasks::routes::list).post(tasks::routes::create))
        .route("/range", get(tasks::routes::range))
        .route("/overdue", get(tasks::routes::overdue))
        .route("/today", get(tasks::routes::today))
        .route(
            "/{id}",
            get(tasks::routes::get)
                .put(tasks::routes::update)
                .delete(tasks::routes::delete),
        )
        .route("/{id}/toggle", patch(tasks::routes::toggle));

    let report_router = Router::new()
        .route("/", get(reports::routes::report))
        .route("/download/csv", get(reports::routes::download_csv));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health::health))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .nest(
            "/api",
            Router::new()
                .route("/me", get(auth::me))
                .nest("/tasks", task_router)
                .nest("/reports", report_router)
                .layer(middleware::from_fn_with_state(
                    state.clone(),
                    middleware_auth::require_auth,
                )),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn root() -> &'static str {
    "Task tracker API is running"
}
