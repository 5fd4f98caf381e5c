//! Courier wire types.
//!
//! Booking requests are strongly typed. Responses are read leniently from a
//! `serde_json::Value` because the courier nests fields under `dist` on some
//! endpoints and not others, and mixes string and numeric encodings.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use streetslipp_core::{
    OrderReference, PENDING_TRANSACTION_STATUS, StatusDisplay, TrackingNumber,
    UNKNOWN_MESSAGE_CODE, UNKNOWN_STATUS_TEXT,
};

/// Order type sent with every booking.
pub const ORDER_TYPE_NORMAL: &str = "Normal";

/// Body of `POST /order/v3/create-order`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    pub order_ref_number: OrderReference,
    /// Cash to collect on delivery.
    #[serde(with = "rust_decimal::serde::float")]
    pub invoice_payment: Decimal,
    pub customer_name: String,
    pub customer_phone: String,
    pub delivery_address: String,
    pub city_name: String,
    pub order_type: &'static str,
    /// Number of distinct cart lines.
    pub items: usize,
    pub pickup_address_code: String,
}

/// Current status of a shipment as reported by the courier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingInfo {
    pub tracking_number: TrackingNumber,
    /// Courier's status text.
    pub order_status: String,
    /// Four-digit status code, e.g. `0005`.
    pub message_code: String,
    pub transaction_status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_ref_number: Option<String>,
}

impl TrackingInfo {
    /// Build from a tracking response body, defaulting each missing field
    /// independently.
    #[must_use]
    pub fn from_response(requested: &TrackingNumber, body: &Value) -> Self {
        Self {
            tracking_number: text_field(body, "trackingNumber")
                .and_then(|raw| TrackingNumber::parse(&raw).ok())
                .unwrap_or_else(|| requested.clone()),
            order_status: text_field(body, "orderStatus").unwrap_or_else(default_status_text),
            message_code: text_field(body, "messageCode").unwrap_or_else(default_message_code),
            transaction_status: text_field(body, "transactionStatus")
                .unwrap_or_else(default_transaction_status),
            order_ref_number: text_field(body, "orderRefNumber"),
        }
    }

    /// Presentation for this status.
    #[must_use]
    pub fn display(&self) -> StatusDisplay {
        StatusDisplay::for_code(&self.message_code, &self.order_status)
    }
}

fn default_status_text() -> String {
    UNKNOWN_STATUS_TEXT.to_string()
}

fn default_message_code() -> String {
    UNKNOWN_MESSAGE_CODE.to_string()
}

fn default_transaction_status() -> String {
    PENDING_TRANSACTION_STATUS.to_string()
}

/// Read `key` from the top-level object, falling back to `dist.{key}`.
///
/// Strings and numbers are both accepted. Blank strings count as absent.
pub(crate) fn text_field(body: &Value, key: &str) -> Option<String> {
    body.get(key)
        .and_then(as_text)
        .or_else(|| body.get("dist").and_then(|dist| dist.get(key)).and_then(as_text))
}

fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Extract the tracking number from a booking response.
///
/// The booking counts as successful when `statusCode` is `"200"` or
/// `dist.trackingNumber` is present. The number itself is taken from
/// `dist.trackingNumber`, then the top-level `trackingNumber`.
pub(crate) fn booked_tracking_number(body: &Value) -> Option<TrackingNumber> {
    let nested = body
        .get("dist")
        .and_then(|dist| dist.get("trackingNumber"))
        .and_then(as_text);
    let accepted = nested.is_some()
        || body
            .get("statusCode")
            .and_then(as_text)
            .is_some_and(|code| code == "200");
    if !accepted {
        return None;
    }
    nested
        .or_else(|| body.get("trackingNumber").and_then(as_text))
        .and_then(|raw| TrackingNumber::parse(&raw).ok())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;
    use streetslipp_core::ShipmentState;

    fn requested() -> TrackingNumber {
        TrackingNumber::parse("CX-778812").unwrap()
    }

    #[test]
    fn test_empty_body_uses_defaults() {
        let info = TrackingInfo::from_response(&requested(), &json!({}));
        assert_eq!(info.tracking_number, requested());
        assert_eq!(info.order_status, "Unknown");
        assert_eq!(info.message_code, "0000");
        assert_eq!(info.transaction_status, "Pending");
        assert_eq!(info.order_ref_number, None);
        assert_eq!(info.display().headline, "STATUS: Unknown");
    }

    #[test]
    fn test_fields_read_from_dist() {
        let body = json!({
            "statusCode": "200",
            "dist": {
                "trackingNumber": "CX-778812",
                "orderStatus": "Delivered",
                "messageCode": "0005",
                "transactionStatus": "Settled",
                "orderRefNumber": "STSLIP-482913"
            }
        });
        let info = TrackingInfo::from_response(&requested(), &body);
        assert_eq!(info.message_code, "0005");
        assert_eq!(info.transaction_status, "Settled");
        assert_eq!(info.order_ref_number.as_deref(), Some("STSLIP-482913"));
        assert_eq!(info.display().state, Some(ShipmentState::Delivered));
    }

    #[test]
    fn test_top_level_wins_and_numbers_accepted() {
        let body = json!({
            "orderStatus": "At Hub",
            "messageCode": 3,
            "dist": { "orderStatus": "ignored" }
        });
        let info = TrackingInfo::from_response(&requested(), &body);
        assert_eq!(info.order_status, "At Hub");
        assert_eq!(info.message_code, "3");
        assert_eq!(info.display().headline, "STATUS: At Hub");
    }

    #[test]
    fn test_booking_response_shapes() {
        let nested = json!({ "dist": { "trackingNumber": "CX-1" } });
        assert_eq!(booked_tracking_number(&nested).unwrap().as_str(), "CX-1");

        let flat = json!({ "statusCode": "200", "trackingNumber": 2_417_001 });
        assert_eq!(booked_tracking_number(&flat).unwrap().as_str(), "2417001");

        let accepted_without_number = json!({ "statusCode": "200" });
        assert!(booked_tracking_number(&accepted_without_number).is_none());

        let rejected = json!({ "statusCode": "400", "trackingNumber": "CX-2" });
        assert!(booked_tracking_number(&rejected).is_none());
    }

    #[test]
    fn test_booking_request_wire_format() {
        let request = BookingRequest {
            order_ref_number: OrderReference::parse("STSLIP-482913").unwrap(),
            invoice_payment: Decimal::from(4160),
            customer_name: "Waleed Khan".to_string(),
            customer_phone: "03001234567".to_string(),
            delivery_address: "House 12, Karachi".to_string(),
            city_name: "Karachi".to_string(),
            order_type: ORDER_TYPE_NORMAL,
            items: 1,
            pickup_address_code: "default".to_string(),
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["orderRefNumber"], "STSLIP-482913");
        assert_eq!(value["invoicePayment"], json!(4160.0));
        assert_eq!(value["orderType"], "Normal");
        assert_eq!(value["items"], 1);
        assert_eq!(value["pickupAddressCode"], "default");
    }
}
