//! Business logic services for the storefront.
//!
//! # Services
//!
//! - `checkout` - Order submission (courier booking, confirmation email)
//! - `email` - Order confirmation emails
//! - `tracking` - Shipment status lookups

pub mod checkout;
pub mod email;
pub mod tracking;

pub use checkout::{CheckoutCoordinator, CheckoutError, CheckoutSource, PlacedOrder};
pub use email::{EmailError, EmailJsClient, OrderNotification, OrderNotifier};
pub use tracking::{TrackingError, TrackingReport, TrackingService};
