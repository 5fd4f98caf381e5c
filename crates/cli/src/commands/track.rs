//! Shipment tracking command.

use streetslipp_storefront::courier::CourierError;
use streetslipp_storefront::services::{TrackingError, TrackingService};
use thiserror::Error;

use super::Session;

/// Errors that can occur during a tracking lookup.
#[derive(Debug, Error)]
pub enum TrackCommandError {
    /// No courier credentials in the environment.
    #[error("Courier is not configured (set POSTEX_API_TOKEN)")]
    NotConfigured,

    /// Courier client could not be built.
    #[error("Courier client error: {0}")]
    Client(#[from] CourierError),

    /// Lookup failed.
    #[error(transparent)]
    Tracking(#[from] TrackingError),

    /// Report could not be serialized.
    #[error("Output error: {0}")]
    Output(#[from] serde_json::Error),
}

/// Look up and print a shipment's status.
///
/// # Errors
///
/// Returns error if no courier is configured or the lookup fails.
pub async fn run(
    session: &Session,
    tracking_number: &str,
    json: bool,
) -> Result<(), TrackCommandError> {
    let service =
        TrackingService::from_config(&session.config)?.ok_or(TrackCommandError::NotConfigured)?;

    let report = service.track(tracking_number).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{}", report.display.headline);
    println!("  Tracking number:    {}", report.info.tracking_number);
    if let Some(order_ref) = &report.info.order_ref_number {
        println!("  Order:              {order_ref}");
    }
    println!("  Courier status:     {}", report.info.order_status);
    println!("  Message code:       {}", report.info.message_code);
    println!("  Payment:            {}", report.info.transaction_status);
    Ok(())
}
