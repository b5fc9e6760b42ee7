use crate::state::AppState;
use axum::Router;

pub mod garden;
pub mod seed;
pub mod system;
pub mod task;

pub fn create_router() -> Router<AppState> {
    Router::new()
        .merge(system::router())
        .merge(seed::router())
        .merge(garden::router())
        .merge(task::router())
}
