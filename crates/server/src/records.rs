//! Expense records API endpoints

use api_types::record::{RecordListResponse, RecordNew, RecordView};
use axum::{
    Extension, Json,
    extract::State,
    http::{StatusCode, header},
    response::IntoResponse,
};

use crate::{
    ServerError,
    server::{Actor, ServerState},
};

pub(crate) fn record_view(record: engine::ExpenseRecord) -> RecordView {
    RecordView {
        id: record.id,
        date: record.date,
        amount: record.amount,
        personnel: record.personnel,
        departments: record.departments,
        description: record.description,
        created_by: record.created_by,
        created_at: record.created_at,
        is_settled: record.is_settled,
        settlement_id: record.settlement_id,
    }
}

/// Handle requests for listing open records, newest first.
pub async fn list(
    Extension(_actor): Extension<Actor>,
    State(state): State<ServerState>,
) -> Json<RecordListResponse> {
    let records = state
        .engine
        .active_records()
        .await
        .into_iter()
        .map(record_view)
        .collect();

    Json(RecordListResponse { records })
}

/// Handle requests for logging a new expense record.
pub async fn add(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    Json(payload): Json<RecordNew>,
) -> Result<(StatusCode, Json<RecordView>), ServerError> {
    let record = state
        .engine
        .add_record(
            &payload.date,
            payload.amount,
            payload.personnel,
            payload.description,
            &actor.0,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(record_view(record))))
}

/// Handle requests for exporting the open records as a CSV file.
pub async fn export(
    Extension(_actor): Extension<Actor>,
    State(state): State<ServerState>,
) -> Result<impl IntoResponse, ServerError> {
    let records = state.engine.active_records().await;
    let roster = state.engine.roster().await;

    let bytes = engine::write_csv(&records, &roster)?;
    let disposition = format!(
        "attachment; filename=\"CloudAcc_Active_{}.csv\"",
        chrono::Utc::now().format("%Y-%m-%d")
    );

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    ))
}
