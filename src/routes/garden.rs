use crate::commands;
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn router() -> Router<AppState> {
    Router::new()
        // Gardens
        .route(
            "/gardens",
            get(commands::garden::list_gardens).post(commands::garden::create_garden),
        )
        .route(
            "/gardens/:id",
            get(commands::garden::get_garden)
                .put(commands::garden::update_garden)
                .delete(commands::garden::delete_garden),
        )
        // Pods, addressed by pod_number within their garden
        .route(
            "/gardens/:id/pods",
            get(commands::pod::list_pods).post(commands::pod::create_pod),
        )
        .route(
            "/gardens/:id/pods/:pod_number",
            get(commands::pod::get_pod)
                .put(commands::pod::update_pod)
                .delete(commands::pod::delete_pod),
        )
        // Environment logs
        .route(
            "/gardens/:id/environment-logs",
            get(commands::environment::list_environment_logs)
                .post(commands::environment::create_environment_log),
        )
        .route(
            "/environment-logs/:id",
            get(commands::environment::get_environment_log)
                .delete(commands::environment::delete_environment_log),
        )
}
