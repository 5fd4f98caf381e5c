//! Application state shared across handlers.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use streetslipp_core::{
    OrderReference, ShipmentState, StatusDisplay, UNKNOWN_MESSAGE_CODE, UNKNOWN_STATUS_TEXT,
};
use tokio::sync::broadcast;

use crate::config::{StorefrontConfig, WebhookConfig};
use crate::courier::{CourierError, text_field};
use crate::services::TrackingService;

/// Buffered shipment updates per subscriber before lagging.
const UPDATE_CAPACITY: usize = 64;

/// Status push received from the courier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShipmentUpdate {
    pub order_ref_number: Option<String>,
    pub tracking_number: Option<String>,
    pub message_code: String,
    pub order_status: String,
}

impl ShipmentUpdate {
    /// Read an update from a webhook body.
    ///
    /// Fields may be strings or numbers and any of them may be missing:
    /// references stay absent, the code and status text fall back to the
    /// unknown defaults. Returns `None` only for a JSON `null` body.
    #[must_use]
    pub fn from_payload(body: &Value) -> Option<Self> {
        if body.is_null() {
            return None;
        }
        Some(Self {
            order_ref_number: text_field(body, "orderRefNumber"),
            tracking_number: text_field(body, "trackingNumber"),
            message_code: text_field(body, "messageCode")
                .unwrap_or_else(|| UNKNOWN_MESSAGE_CODE.to_string()),
            order_status: text_field(body, "orderStatus")
                .unwrap_or_else(|| UNKNOWN_STATUS_TEXT.to_string()),
        })
    }

    /// The order reference, if it has the shape this shop issues.
    #[must_use]
    pub fn order_reference(&self) -> Option<OrderReference> {
        OrderReference::parse(self.order_ref_number.as_deref()?).ok()
    }

    /// Known state for this update's message code.
    #[must_use]
    pub fn state(&self) -> Option<ShipmentState> {
        ShipmentState::from_message_code(&self.message_code)
    }

    /// Presentation for this update.
    #[must_use]
    pub fn display(&self) -> StatusDisplay {
        StatusDisplay::for_code(&self.message_code, &self.order_status)
    }
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    webhook: WebhookConfig,
    tracking: Option<TrackingService>,
    updates: broadcast::Sender<ShipmentUpdate>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `webhook` - Webhook auth settings (required by the server)
    /// * `tracking` - Tracking service, if a courier is configured
    #[must_use]
    pub fn new(webhook: WebhookConfig, tracking: Option<TrackingService>) -> Self {
        let (updates, _) = broadcast::channel(UPDATE_CAPACITY);
        Self {
            inner: Arc::new(AppStateInner {
                webhook,
                tracking,
                updates,
            }),
        }
    }

    /// Build state from configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the courier client cannot be built.
    pub fn from_config(
        config: &StorefrontConfig,
        webhook: WebhookConfig,
    ) -> Result<Self, CourierError> {
        let tracking = TrackingService::from_config(config)?;
        Ok(Self::new(webhook, tracking))
    }

    /// Get a reference to the webhook auth settings.
    #[must_use]
    pub fn webhook(&self) -> &WebhookConfig {
        &self.inner.webhook
    }

    /// Get the tracking service, if a courier is configured.
    #[must_use]
    pub fn tracking(&self) -> Option<&TrackingService> {
        self.inner.tracking.as_ref()
    }

    /// Subscribe to verified shipment updates.
    #[must_use]
    pub fn subscribe_updates(&self) -> broadcast::Receiver<ShipmentUpdate> {
        self.inner.updates.subscribe()
    }

    /// Publish a verified shipment update. Returns the number of receivers.
    pub fn publish_update(&self, update: ShipmentUpdate) -> usize {
        self.inner.updates.send(update).unwrap_or(0)
    }
}
