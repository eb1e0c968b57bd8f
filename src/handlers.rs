use crate::calendar::{build_month_grid_now, MonthRef, WEEKDAY_LABELS};
use crate::dates::{date_key, parse_date_key};
use crate::errors::AppError;
use crate::models::{
    CalendarQuery, CalendarResponse, SessionResponse, SignInRequest, ToggleOutcome, ToggleResponse,
};
use crate::state::AppState;
use crate::ui::render_index;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Html,
    Json,
};
use serde::Serialize;
use tracing::{info, warn};

#[derive(Debug, Serialize)]
pub struct ConfirmResponse {
    pub unchecked: Option<String>,
}

pub async fn index() -> Html<String> {
    Html(render_index())
}

pub async fn get_session(State(state): State<AppState>) -> Json<SessionResponse> {
    Json(session_response(&state))
}

pub async fn sign_in(
    State(state): State<AppState>,
    Json(payload): Json<SignInRequest>,
) -> Result<Json<SessionResponse>, AppError> {
    let session = state
        .auth
        .sign_in(&payload.email, &payload.password)
        .await
        .map_err(|err| {
            warn!("sign-in rejected: {err}");
            AppError::unauthorized(err.message)
        })?;

    let user_id = session.user_id.clone();
    state.sessions.sign_in(session);
    if !state.sync.wait_ready(&user_id, state.sessions.subscribe()).await {
        return Err(AppError::unauthorized("signed out before the session finished loading"));
    }

    Ok(Json(session_response(&state)))
}

pub async fn sign_out(State(state): State<AppState>) -> StatusCode {
    if let Some(session) = state.sessions.current() {
        state.auth.sign_out(&session).await;
        info!(user_id = %session.user_id, "signing out");
    }
    state.sessions.sign_out();
    state.sync.clear_on_sign_out().await;
    StatusCode::NO_CONTENT
}

pub async fn get_calendar(
    State(state): State<AppState>,
    Query(query): Query<CalendarQuery>,
) -> Result<Json<CalendarResponse>, AppError> {
    state.require_session()?;

    let current = MonthRef::current();
    let month = MonthRef::normalized(
        query.year.unwrap_or(current.year),
        query.month.map_or(current.month0 as i32, |month| month.saturating_sub(1)),
    );

    let snapshot = state.sync.snapshot().await;
    Ok(Json(CalendarResponse {
        year: month.year,
        month: month.month(),
        title: month.title(),
        weekdays: WEEKDAY_LABELS,
        days: build_month_grid_now(month, &snapshot.checked),
        pending_confirmation: snapshot.pending,
        loading: snapshot.loading,
        notice: snapshot.last_notice,
    }))
}

pub async fn toggle_date(
    State(state): State<AppState>,
    Path(raw): Path<String>,
) -> Result<Json<ToggleResponse>, AppError> {
    let date = parse_date_key(&raw)
        .ok_or_else(|| AppError::bad_request("date must be formatted as YYYY-MM-DD"))?;
    state.require_session()?;

    match state.sync.toggle_check(date).await? {
        ToggleOutcome::Ignored => Err(AppError::unauthorized("sign in first")),
        outcome => Ok(Json(ToggleResponse {
            date: date_key(date),
            outcome,
        })),
    }
}

pub async fn confirm_uncheck(State(state): State<AppState>) -> Result<Json<ConfirmResponse>, AppError> {
    state.require_session()?;
    let unchecked = state.sync.confirm_uncheck().await?;
    Ok(Json(ConfirmResponse {
        unchecked: unchecked.map(date_key),
    }))
}

pub async fn cancel_uncheck(State(state): State<AppState>) -> StatusCode {
    state.sync.cancel_uncheck().await;
    StatusCode::NO_CONTENT
}

fn session_response(state: &AppState) -> SessionResponse {
    match state.sessions.current() {
        Some(session) => SessionResponse {
            signed_in: true,
            user_id: Some(session.user_id),
            email: session.email,
        },
        None => SessionResponse {
            signed_in: false,
            user_id: None,
            email: None,
        },
    }
}
