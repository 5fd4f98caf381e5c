//! Order confirmation emails via an EmailJS-style template API.
//!
//! The template is rendered by the email provider; we only send the
//! service/template identifiers and the parameter map.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde::Serialize;
use thiserror::Error;
use tracing::instrument;

use crate::config::EmailConfig;

/// Value sent as `tracking_number` when the courier booking failed.
pub const PENDING_TRACKING: &str = "PENDING";

/// Errors that can occur when sending an email.
#[derive(Debug, Error)]
pub enum EmailError {
    /// HTTP request failed, including client-side timeouts.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },
}

/// Template parameters for the order confirmation email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderNotification {
    pub order_id: String,
    /// Courier tracking number, or [`PENDING_TRACKING`].
    pub tracking_number: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_email: String,
    pub shipping_address: String,
    /// One `- {name} (EU {size}, {color}) x{qty}` line per cart line.
    pub order_items: String,
    /// `Rs. {total}`.
    pub total_price: String,
}

/// Sends order confirmation notifications.
#[async_trait]
pub trait OrderNotifier: Send + Sync {
    /// Send one notification.
    ///
    /// # Errors
    ///
    /// Returns error if the provider could not be reached or refused the send.
    async fn notify(&self, notification: &OrderNotification) -> Result<(), EmailError>;
}

#[derive(Serialize)]
struct SendRequest<'a> {
    service_id: &'a str,
    template_id: &'a str,
    user_id: &'a str,
    template_params: &'a OrderNotification,
}

/// EmailJS REST client.
#[derive(Clone)]
pub struct EmailJsClient {
    client: reqwest::Client,
    config: EmailConfig,
}

impl std::fmt::Debug for EmailJsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailJsClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl EmailJsClient {
    /// Create a new EmailJS client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &EmailConfig, timeout: Duration) -> Result<Self, EmailError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            config: config.clone(),
        })
    }
}

#[async_trait]
impl OrderNotifier for EmailJsClient {
    #[instrument(skip(self, notification), fields(order_id = %notification.order_id))]
    async fn notify(&self, notification: &OrderNotification) -> Result<(), EmailError> {
        let body = SendRequest {
            service_id: &self.config.service_id,
            template_id: &self.config.template_id,
            user_id: self.config.public_key.expose_secret(),
            template_params: notification,
        };

        let response = self
            .client
            .post(self.config.api_url.as_str())
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(EmailError::Api {
                status: status.as_u16(),
                message,
            });
        }

        tracing::info!("Order confirmation email sent");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_send_request_shape() {
        let params = OrderNotification {
            order_id: "STSLIP-482913".to_string(),
            tracking_number: PENDING_TRACKING.to_string(),
            customer_name: "Waleed Khan".to_string(),
            customer_phone: "03001234567".to_string(),
            customer_email: String::new(),
            shipping_address: "House 12, Karachi".to_string(),
            order_items: "- Apex Drift (EU 9, Stealth Red) x2".to_string(),
            total_price: "Rs. 4160".to_string(),
        };
        let body = SendRequest {
            service_id: "service_street",
            template_id: "template_order",
            user_id: "public-key",
            template_params: &params,
        };

        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["user_id"], "public-key");
        assert_eq!(value["template_params"]["tracking_number"], "PENDING");
        assert_eq!(value["template_params"]["total_price"], "Rs. 4160");
        assert_eq!(value["template_params"]["customer_email"], "");
    }
}
