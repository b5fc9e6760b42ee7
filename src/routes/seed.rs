use crate::commands;
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn router() -> Router<AppState> {
    Router::new()
        // Seed varieties
        .route(
            "/seeds",
            get(commands::seed::list_seeds).post(commands::seed::create_seed),
        )
        .route(
            "/seeds/:id",
            get(commands::seed::get_seed)
                .put(commands::seed::update_seed)
                .delete(commands::seed::delete_seed),
        )
        // Batches
        .route(
            "/seed-batches",
            get(commands::seed_batch::list_batches).post(commands::seed_batch::create_batch),
        )
        .route(
            "/seed-batches/:id",
            get(commands::seed_batch::get_batch)
                .put(commands::seed_batch::update_batch)
                .delete(commands::seed_batch::delete_batch),
        )
        // Growth logs
        .route(
            "/seed-batches/:id/growth-logs",
            get(commands::growth_log::list_growth_logs)
                .post(commands::growth_log::create_growth_log),
        )
        .route(
            "/growth-logs/:id",
            get(commands::growth_log::get_growth_log)
                .delete(commands::growth_log::delete_growth_log),
        )
}
