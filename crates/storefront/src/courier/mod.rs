//! Courier integration: order booking and shipment tracking.

mod client;
mod types;

use async_trait::async_trait;
use streetslipp_core::TrackingNumber;
use thiserror::Error;

pub use client::PostExClient;
pub use types::{BookingRequest, ORDER_TYPE_NORMAL, TrackingInfo};
pub(crate) use types::text_field;

/// Errors that can occur when interacting with the courier API.
#[derive(Debug, Error)]
pub enum CourierError {
    /// HTTP request failed, including client-side timeouts.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned a non-success status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// API answered 2xx but did not accept the booking.
    #[error("Booking rejected: {0}")]
    Rejected(String),

    /// Failed to parse response.
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Booking and tracking operations offered by a courier.
#[async_trait]
pub trait CourierApi: Send + Sync {
    /// Book a shipment and return its tracking number.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the courier does not accept it.
    async fn book_order(&self, request: &BookingRequest) -> Result<TrackingNumber, CourierError>;

    /// Fetch the current status of a shipment.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the response is not an object.
    async fn track_order(&self, tracking_number: &TrackingNumber)
    -> Result<TrackingInfo, CourierError>;

    /// Printable airway-bill URL for a booked shipment, if the courier has one.
    fn invoice_url(&self, _tracking_number: &TrackingNumber) -> Option<String> {
        None
    }
}
