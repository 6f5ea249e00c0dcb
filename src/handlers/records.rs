//! Record lookup and response processing

use super::{fail, ok, ApiResult, AppState};
use crate::models::{Record, RecordPatch};
use crate::tracking;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use uuid::Uuid;

/// A stored record plus the labels the tracking page shows
#[derive(Debug, Serialize)]
pub struct RecordView {
    pub record: Record,
    pub display_tracking_code: String,
    pub status_label: &'static str,
}

impl From<Record> for RecordView {
    fn from(record: Record) -> Self {
        Self {
            display_tracking_code: tracking::format_for_display(&record.tracking_code),
            status_label: record.status.display_name(),
            record,
        }
    }
}

/// Look up a record by tracking code, ignoring case and surrounding spaces
pub async fn get_record(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> ApiResult<RecordView> {
    let code = match tracking::validate(&state.tracking_prefix, &code) {
        Ok(c) => c,
        Err(e) => return fail(StatusCode::BAD_REQUEST, e.to_string()),
    };

    match state.store.find_by_tracking_code(&code).await {
        Some(record) => ok(record.into()),
        None => {
            tracing::debug!("No record for tracking code {}", code);
            fail(StatusCode::NOT_FOUND, "Manifestação não encontrada")
        }
    }
}

/// The record most recently submitted in this process, for the
/// confirmation page
pub async fn current_record(State(state): State<AppState>) -> ApiResult<RecordView> {
    match state.store.current().await {
        Some(record) => ok(record.into()),
        None => fail(StatusCode::NOT_FOUND, "Nenhuma manifestação registrada"),
    }
}

/// Update status or response text of a record
pub async fn update_record(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<RecordPatch>,
) -> ApiResult<RecordView> {
    let id = match Uuid::parse_str(&id) {
        Ok(id) => id,
        Err(_) => return fail(StatusCode::BAD_REQUEST, "Invalid record id"),
    };

    match state.store.update(id, patch).await {
        Some(record) => {
            tracing::info!(
                "Record {} updated to status {:?}",
                record.tracking_code,
                record.status
            );
            ok(record.into())
        }
        None => fail(StatusCode::NOT_FOUND, "Record not found"),
    }
}
