use crate::{
    error::PaydeskError,
    models::{ApiResponse, NewReceipt, Receipt, StudentReceiptView},
    services::ReceiptService,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Clone)]
pub struct AppState {
    pub receipts: Arc<ReceiptService>,
}

pub async fn record_receipt(
    State(state): State<AppState>,
    Json(receipt): Json<NewReceipt>,
) -> Result<(StatusCode, Json<ApiResponse<Receipt>>), PaydeskError> {
    let stored = state.receipts.record_receipt(receipt).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse {
            success: true,
            data: stored,
            timestamp: Utc::now(),
            request_id: Uuid::new_v4().to_string(),
        }),
    ))
}

pub async fn get_latest_receipt(
    State(state): State<AppState>,
    Path(student_id): Path<i64>,
) -> Result<Json<ApiResponse<StudentReceiptView>>, PaydeskError> {
    let view = state.receipts.latest_receipt(student_id).await?;

    Ok(Json(ApiResponse {
        success: true,
        data: view,
        timestamp: Utc::now(),
        request_id: Uuid::new_v4().to_string(),
    }))
}
