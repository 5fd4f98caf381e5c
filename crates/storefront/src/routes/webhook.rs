//! Courier webhook route handler.
//!
//! The courier pushes shipment status changes here. Requests are
//! authenticated by an exact match of a shared-secret header; the body is
//! only read once that check passes.
//!
//! Verified updates are logged and published to in-process subscribers.
//! Nothing is persisted yet: order state lives with the courier and is
//! re-fetched by tracking lookups.

use axum::{
    Json,
    body::to_bytes,
    extract::{Request, State},
    http::HeaderMap,
};
use secrecy::ExposeSecret;
use serde_json::{Value, json};
use tracing::instrument;

use crate::config::WebhookConfig;
use crate::error::{self, AppError, Result};
use crate::state::{AppState, ShipmentUpdate};

/// Largest webhook body accepted.
const MAX_BODY_BYTES: usize = 64 * 1024;

/// Receive a courier status update.
#[instrument(skip_all)]
pub async fn courier_update(
    State(state): State<AppState>,
    request: Request,
) -> Result<Json<Value>> {
    if !is_authorized(request.headers(), state.webhook()) {
        tracing::warn!(
            header = %state.webhook().header_name,
            "Rejected courier webhook with invalid token"
        );
        return Err(AppError::Unauthorized("Invalid Security Token".to_string()));
    }

    let body = to_bytes(request.into_body(), MAX_BODY_BYTES)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to read webhook body: {e}")))?;
    let payload: Value = serde_json::from_slice(&body)
        .map_err(|e| AppError::Internal(format!("Invalid webhook payload: {e}")))?;
    let update = ShipmentUpdate::from_payload(&payload)
        .ok_or_else(|| AppError::Internal("Empty webhook payload".to_string()))?;

    let order_ref = update.order_ref_number.as_deref().unwrap_or_default();
    let state_name = update.state();
    tracing::info!(
        order_ref = %order_ref,
        tracking_number = update.tracking_number.as_deref().unwrap_or_default(),
        message_code = %update.message_code,
        state = ?state_name,
        "Courier update for {}: {} ({})",
        order_ref,
        update.order_status,
        update.message_code
    );
    if update.order_reference().is_none() {
        tracing::warn!(order_ref = %order_ref, "Courier update for an unrecognized order reference");
    }
    error::add_breadcrumb(
        "webhook",
        "Courier update",
        Some(&[
            ("order_ref", order_ref),
            ("message_code", update.message_code.as_str()),
        ]),
    );

    let receivers = state.publish_update(update);
    tracing::debug!(receivers, "Shipment update published");

    Ok(Json(json!({
        "success": true,
        "message": "Webhook received and verified"
    })))
}

/// Any verb other than POST on the webhook path.
pub async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}

/// Exact match of the configured header against the shared secret.
fn is_authorized(headers: &HeaderMap, webhook: &WebhookConfig) -> bool {
    headers
        .get(webhook.header_name.as_str())
        .and_then(|value| value.to_str().ok())
        .is_some_and(|token| token == webhook.secret.expose_secret())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::HeaderValue;
    use secrecy::SecretString;

    use super::*;

    fn webhook() -> WebhookConfig {
        WebhookConfig {
            header_name: "x-streetslipp-auth".to_string(),
            secret: SecretString::from("whsec_7Hq2LmX8vRk3Np9T"),
        }
    }

    #[test]
    fn test_is_authorized() {
        let mut headers = HeaderMap::new();
        assert!(!is_authorized(&headers, &webhook()));

        headers.insert("x-streetslipp-auth", HeaderValue::from_static("whsec_wrong"));
        assert!(!is_authorized(&headers, &webhook()));

        headers.insert(
            "x-streetslipp-auth",
            HeaderValue::from_static("whsec_7Hq2LmX8vRk3Np9T"),
        );
        assert!(is_authorized(&headers, &webhook()));
    }

    #[test]
    fn test_secret_compared_exactly() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-streetslipp-auth",
            HeaderValue::from_static("whsec_7Hq2LmX8vRk3Np9T "),
        );
        assert!(!is_authorized(&headers, &webhook()));
    }
}
