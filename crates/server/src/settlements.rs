//! Settlement API endpoints: history, close-of-books, details, export.

use api_types::record::RecordListResponse;
use api_types::settlement::{SettleResponse, SettlementListResponse, SettlementView};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use engine::SettleOutcome;
use uuid::Uuid;

use crate::{
    ServerError, records,
    server::{Actor, ServerState},
};

fn settlement_view(settlement: engine::Settlement) -> SettlementView {
    SettlementView {
        id: settlement.id,
        date: settlement.date,
        total_amount: settlement.total_amount,
        record_count: settlement.record_count,
        period_start: settlement.period_start,
        period_end: settlement.period_end,
        created_by: settlement.created_by,
        created_at: settlement.created_at,
    }
}

/// Handle requests for the settlement history, newest first.
pub async fn list(
    Extension(_actor): Extension<Actor>,
    State(state): State<ServerState>,
) -> Json<SettlementListResponse> {
    let settlements = state
        .engine
        .settlements()
        .await
        .into_iter()
        .map(settlement_view)
        .collect();

    Json(SettlementListResponse { settlements })
}

/// Handle requests for closing the books.
///
/// 201 with the new settlement, or 200 with `settled: false` when there
/// were no open records to close.
pub async fn settle(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
) -> Result<(StatusCode, Json<SettleResponse>), ServerError> {
    match state.engine.settle(&actor.0).await? {
        SettleOutcome::Settled(settlement) => Ok((
            StatusCode::CREATED,
            Json(SettleResponse {
                settled: true,
                settlement: Some(settlement_view(settlement)),
            }),
        )),
        SettleOutcome::NothingToSettle => Ok((
            StatusCode::OK,
            Json(SettleResponse {
                settled: false,
                settlement: None,
            }),
        )),
    }
}

/// Handle requests for the records a settlement closed.
pub async fn details(
    Extension(_actor): Extension<Actor>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<RecordListResponse>, ServerError> {
    // 404 on unknown ids instead of an empty listing.
    state.engine.settlement(id).await?;

    let records = state
        .engine
        .settlement_details(id)
        .await
        .into_iter()
        .map(records::record_view)
        .collect();

    Ok(Json(RecordListResponse { records }))
}

/// Handle requests for exporting a settlement as a CSV file.
pub async fn export(
    Extension(_actor): Extension<Actor>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServerError> {
    let settlement = state.engine.settlement(id).await?;
    let records = state.engine.settlement_details(id).await;
    let roster = state.engine.roster().await;

    let bytes = engine::write_csv(&records, &roster)?;
    let disposition = format!(
        "attachment; filename=\"Settlement_{}.csv\"",
        settlement.date
    );

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    ))
}
