//! Shipment status codes and their presentation states.
//!
//! The courier reports progress as a four-digit message code (`0001`,
//! `0005`, ...) alongside free-form status text. The storefront maps the
//! handful of codes it knows to a closed set of [`ShipmentState`]s; anything
//! else is shown using the courier's raw text.
//!
//! The mapping is stateless. The courier is the only source of truth, so no
//! transition is ever validated locally: a parcel reported as `OnRoute` and
//! then `Booked` is rendered exactly as reported.

use serde::{Deserialize, Serialize};

/// Message code substituted when the courier omits one.
pub const UNKNOWN_MESSAGE_CODE: &str = "0000";

/// Status text substituted when the courier omits one.
pub const UNKNOWN_STATUS_TEXT: &str = "Unknown";

/// Transaction status substituted when the courier omits one.
pub const PENDING_TRANSACTION_STATUS: &str = "Pending";

/// Presentation state of a shipment.
///
/// `Booked → ProcessingAtHub → OnRoute → {Delivered | Returned}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShipmentState {
    /// At the merchant's warehouse, booked with the courier.
    Booked,
    /// Received at the courier's warehouse.
    ProcessingAtHub,
    /// Out for delivery.
    OnRoute,
    Delivered,
    /// Returned, or on its way back, to the merchant.
    Returned,
}

impl ShipmentState {
    /// Map a courier message code to a known state.
    ///
    /// Surrounding whitespace is ignored on purpose, so `" 0005"` maps like
    /// `"0005"`. Otherwise the match is exact. Returns `None` for codes
    /// outside the known set.
    #[must_use]
    pub fn from_message_code(code: &str) -> Option<Self> {
        match code.trim() {
            "0001" => Some(Self::Booked),
            "0003" => Some(Self::ProcessingAtHub),
            "0004" => Some(Self::OnRoute),
            "0005" => Some(Self::Delivered),
            "0002" | "0006" | "0007" => Some(Self::Returned),
            _ => None,
        }
    }

    /// Customer-facing headline for this state.
    #[must_use]
    pub const fn headline(&self) -> &'static str {
        match self {
            Self::Booked => "SECURED AT VAULT",
            Self::ProcessingAtHub => "PROCESSING AT HUB",
            Self::OnRoute => "EN ROUTE TO DROP",
            Self::Delivered => "OFFICIALLY COPPED",
            Self::Returned => "RETURNED TO BASE",
        }
    }
}

impl std::fmt::Display for ShipmentState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Booked => "booked",
            Self::ProcessingAtHub => "processing_at_hub",
            Self::OnRoute => "on_route",
            Self::Delivered => "delivered",
            Self::Returned => "returned",
        };
        f.write_str(name)
    }
}

/// What to show for a tracking result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusDisplay {
    /// Known state, or `None` when the code was not recognized.
    pub state: Option<ShipmentState>,
    pub headline: String,
}

impl StatusDisplay {
    /// Build the display for a message code and the courier's status text.
    ///
    /// Unrecognized codes degrade to `STATUS: <raw text>` instead of failing.
    #[must_use]
    pub fn for_code(message_code: &str, status_text: &str) -> Self {
        ShipmentState::from_message_code(message_code).map_or_else(
            || Self {
                state: None,
                headline: format!("STATUS: {status_text}"),
            },
            |state| Self {
                state: Some(state),
                headline: state.headline().to_string(),
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_whitespace_ignored() {
        assert_eq!(
            ShipmentState::from_message_code(" 0005\n"),
            Some(ShipmentState::Delivered)
        );
        assert_eq!(ShipmentState::from_message_code("5"), None);
    }

    #[test]
    fn test_known_codes() {
        assert_eq!(
            ShipmentState::from_message_code("0001"),
            Some(ShipmentState::Booked)
        );
        assert_eq!(
            ShipmentState::from_message_code("0003"),
            Some(ShipmentState::ProcessingAtHub)
        );
        assert_eq!(
            ShipmentState::from_message_code("0004"),
            Some(ShipmentState::OnRoute)
        );
        assert_eq!(
            ShipmentState::from_message_code("0005"),
            Some(ShipmentState::Delivered)
        );
        for code in ["0002", "0006", "0007"] {
            assert_eq!(
                ShipmentState::from_message_code(code),
                Some(ShipmentState::Returned)
            );
        }
    }

    #[test]
    fn test_unknown_code_uses_raw_text() {
        let display = StatusDisplay::for_code("0042", "Held at customs");
        assert_eq!(display.state, None);
        assert_eq!(display.headline, "STATUS: Held at customs");

        let display = StatusDisplay::for_code(UNKNOWN_MESSAGE_CODE, UNKNOWN_STATUS_TEXT);
        assert_eq!(display.headline, "STATUS: Unknown");
    }

    #[test]
    fn test_known_code_headline() {
        let display = StatusDisplay::for_code("0005", "Delivered");
        assert_eq!(display.state, Some(ShipmentState::Delivered));
        assert_eq!(display.headline, "OFFICIALLY COPPED");
    }
}
