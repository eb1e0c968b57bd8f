use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route(
            "/api/session",
            get(handlers::get_session)
                .post(handlers::sign_in)
                .delete(handlers::sign_out),
        )
        .route("/api/calendar", get(handlers::get_calendar))
        .route("/api/dates/:date/toggle", post(handlers::toggle_date))
        .route(
            "/api/confirmation",
            post(handlers::confirm_uncheck).delete(handlers::cancel_uncheck),
        )
        .with_state(state)
}
