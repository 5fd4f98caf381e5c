//! Tracking lookup route handler.

use axum::{
    Json,
    extract::{Path, State},
};
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::services::TrackingReport;
use crate::state::AppState;

/// Look up a shipment's current status.
///
/// 400 for a blank number, 404 when the courier cannot locate it, 503 when
/// no courier is configured.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(tracking_number): Path<String>,
) -> Result<Json<TrackingReport>> {
    let service = state
        .tracking()
        .ok_or_else(|| AppError::ServiceUnavailable("courier is not configured".to_string()))?;

    let report = service.track(&tracking_number).await?;
    Ok(Json(report))
}
