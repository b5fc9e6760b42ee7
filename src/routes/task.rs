use crate::commands;
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/tasks",
            get(commands::task::list_tasks).post(commands::task::create_task),
        )
        .route(
            "/tasks/:id",
            get(commands::task::get_task)
                .put(commands::task::update_task)
                .delete(commands::task::delete_task),
        )
        .route(
            "/reminders",
            get(commands::reminder::list_reminders).post(commands::reminder::create_reminder),
        )
        .route(
            "/reminders/:id",
            get(commands::reminder::get_reminder).delete(commands::reminder::delete_reminder),
        )
        .route("/reminders/:id/mark-sent", post(commands::reminder::mark_sent))
}
