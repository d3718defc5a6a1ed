use axum::{
    extract::{Query, State},
    http::header,
    response::IntoResponse,
    Json,
};
use chrono::Utc;

use super::{csv, queries, ReportPeriod, ReportQuery};
use crate::error::AppError;
use crate::routes::middleware_auth::CurrentUser;
use crate::state::AppState;

/// Chart data, summary and best day for the requested period
pub async fn report(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Query(params): Query<ReportQuery>,
) -> Result<impl IntoResponse, AppError> {
    let period = ReportPeriod::parse(params.period.as_deref());
    let today = Utc::now().date_naive();

    let report = queries::build_report(&state.db, user_id, period, today).await?;

    Ok(Json(report))
}

/// Same report rendered as a CSV attachment
pub async fn download_csv(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Query(params): Query<ReportQuery>,
) -> Result<impl IntoResponse, AppError> {
    let period = ReportPeriod::parse(params.period.as_deref());
    let today = Utc::now().date_naive();

    let report = queries::build_report(&state.db, user_id, period, today).await?;

    let body = csv::render_csv(&report, today);
    let disposition = format!("attachment; filename=\"{}\"", csv::file_name(&report, today));

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    ))
}
