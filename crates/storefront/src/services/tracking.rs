//! Shipment tracking lookups.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use streetslipp_core::{StatusDisplay, TrackingNumber};
use thiserror::Error;
use tracing::instrument;

use crate::config::StorefrontConfig;
use crate::courier::{CourierApi, CourierError, PostExClient, TrackingInfo};

/// Errors returned by a tracking lookup.
#[derive(Debug, Error)]
pub enum TrackingError {
    /// Input was empty or whitespace.
    #[error("Tracking number is required")]
    EmptyTrackingNumber,

    /// Any courier-side failure. Details are logged, not surfaced.
    #[error("Could not locate package")]
    NotLocated,
}

/// A tracking result ready for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackingReport {
    pub info: TrackingInfo,
    pub display: StatusDisplay,
}

/// Looks up shipment status through the courier.
///
/// Stateless: nothing is cached and every call goes to the courier.
#[derive(Clone)]
pub struct TrackingService {
    courier: Arc<dyn CourierApi>,
    call_timeout: Duration,
}

impl std::fmt::Debug for TrackingService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrackingService")
            .field("call_timeout", &self.call_timeout)
            .finish_non_exhaustive()
    }
}

impl TrackingService {
    #[must_use]
    pub fn new(courier: Arc<dyn CourierApi>, call_timeout: Duration) -> Self {
        Self {
            courier,
            call_timeout,
        }
    }

    /// Build from configuration, or `None` when no courier is configured.
    ///
    /// # Errors
    ///
    /// Returns error if the courier client cannot be built.
    pub fn from_config(config: &StorefrontConfig) -> Result<Option<Self>, CourierError> {
        config
            .courier
            .as_ref()
            .map(|courier| {
                let client = PostExClient::new(courier, config.call_timeout)?;
                Ok(Self::new(Arc::new(client), config.call_timeout))
            })
            .transpose()
    }

    /// Fetch the current status of a shipment.
    ///
    /// # Errors
    ///
    /// Returns `TrackingError::EmptyTrackingNumber` for blank input (no
    /// request is made) and `TrackingError::NotLocated` for every courier
    /// failure, including timeouts.
    #[instrument(skip(self))]
    pub async fn track(&self, tracking_number: &str) -> Result<TrackingReport, TrackingError> {
        let tracking_number = TrackingNumber::parse(tracking_number.trim())
            .map_err(|_| TrackingError::EmptyTrackingNumber)?;

        let info = match tokio::time::timeout(
            self.call_timeout,
            self.courier.track_order(&tracking_number),
        )
        .await
        {
            Ok(Ok(info)) => info,
            Ok(Err(e)) => {
                tracing::warn!(tracking_number = %tracking_number, error = %e, "Tracking lookup failed");
                return Err(TrackingError::NotLocated);
            }
            Err(_) => {
                tracing::warn!(tracking_number = %tracking_number, timeout = ?self.call_timeout, "Tracking lookup timed out");
                return Err(TrackingError::NotLocated);
            }
        };

        let shown = info.display();
        tracing::info!(
            tracking_number = %info.tracking_number,
            message_code = %info.message_code,
            state = ?shown.state,
            "Tracking status resolved"
        );
        Ok(TrackingReport {
            info,
            display: shown,
        })
    }
}
