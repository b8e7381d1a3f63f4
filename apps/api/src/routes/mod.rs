pub mod health;

use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::outreach::handlers as outreach;
use crate::pipeline::handlers as evaluations;
use crate::presets::handlers as presets;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Evaluation API
        .route(
            "/api/v1/evaluations",
            post(evaluations::handle_evaluate).get(evaluations::handle_list_evaluations),
        )
        .route(
            "/api/v1/evaluations/progress",
            get(evaluations::handle_progress),
        )
        .route(
            "/api/v1/evaluations/:id",
            get(evaluations::handle_get_candidate),
        )
        // Outreach API
        .route("/api/v1/outreach/draft", post(outreach::handle_draft))
        .route("/api/v1/outreach/send", post(outreach::handle_send))
        // Preset API
        .route(
            "/api/v1/presets",
            get(presets::handle_list_presets).post(presets::handle_save_preset),
        )
        .route(
            "/api/v1/presets/:name",
            delete(presets::handle_delete_preset),
        )
        .with_state(state)
}
