//! PostEx integration API client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde_json::Value;
use streetslipp_core::TrackingNumber;
use tracing::instrument;

use super::types::{self, BookingRequest, TrackingInfo};
use super::{CourierApi, CourierError};
use crate::config::CourierConfig;

/// Header carrying the merchant API token.
const TOKEN_HEADER: &str = "token";

/// PostEx API client.
#[derive(Clone)]
pub struct PostExClient {
    client: reqwest::Client,
    base_url: String,
}

impl std::fmt::Debug for PostExClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostExClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl PostExClient {
    /// Create a new PostEx client.
    ///
    /// # Errors
    ///
    /// Returns error if the token is not a valid header value or the HTTP
    /// client fails to build.
    pub fn new(config: &CourierConfig, timeout: Duration) -> Result<Self, CourierError> {
        let mut headers = HeaderMap::new();

        let mut token = HeaderValue::from_str(config.api_token.expose_secret())
            .map_err(|e| CourierError::Parse(format!("Invalid API token format: {e}")))?;
        token.set_sensitive(true);
        headers.insert(TOKEN_HEADER, token);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.as_str().trim_end_matches('/').to_string(),
        })
    }

    async fn read_json(response: reqwest::Response) -> Result<Value, CourierError> {
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(CourierError::Api {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json()
            .await
            .map_err(|e| CourierError::Parse(e.to_string()))
    }
}

#[async_trait]
impl CourierApi for PostExClient {
    #[instrument(skip(self, request), fields(order_ref = %request.order_ref_number))]
    async fn book_order(&self, request: &BookingRequest) -> Result<TrackingNumber, CourierError> {
        let url = format!("{}/order/v3/create-order", self.base_url);

        let response = self.client.post(&url).json(request).send().await?;
        let body = Self::read_json(response).await?;

        let tracking_number = types::booked_tracking_number(&body).ok_or_else(|| {
            CourierError::Rejected(
                types::text_field(&body, "statusMessage")
                    .unwrap_or_else(|| "booking response carried no tracking number".to_string()),
            )
        })?;

        tracing::info!(tracking_number = %tracking_number, "Courier booking accepted");
        Ok(tracking_number)
    }

    #[instrument(skip(self), fields(tracking_number = %tracking_number))]
    async fn track_order(
        &self,
        tracking_number: &TrackingNumber,
    ) -> Result<TrackingInfo, CourierError> {
        let url = format!(
            "{}/order/v1/track-order/{}",
            self.base_url,
            urlencoding::encode(tracking_number.as_str())
        );

        let response = self.client.get(&url).send().await?;
        let body = Self::read_json(response).await?;
        if !body.is_object() {
            return Err(CourierError::Parse(
                "tracking response is not a JSON object".to_string(),
            ));
        }

        let info = TrackingInfo::from_response(tracking_number, &body);
        tracing::debug!(message_code = %info.message_code, "Tracking status fetched");
        Ok(info)
    }

    fn invoice_url(&self, tracking_number: &TrackingNumber) -> Option<String> {
        Some(format!(
            "{}/order/v1/get-invoice?trackingNumbers={}",
            self.base_url,
            urlencoding::encode(tracking_number.as_str())
        ))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use secrecy::SecretString;
    use url::Url;

    fn config(base: &str) -> CourierConfig {
        CourierConfig {
            base_url: Url::parse(base).unwrap(),
            api_token: SecretString::from("pk_live_9f3Kq2LmX8vR"),
            pickup_address_code: "default".to_string(),
        }
    }

    #[test]
    fn test_invoice_url() {
        let config = config("https://api.postex.pk/services/integration/api");
        let client = PostExClient::new(&config, Duration::from_secs(5)).unwrap();
        let tn = TrackingNumber::parse("CX 778812").unwrap();
        assert_eq!(
            client.invoice_url(&tn).unwrap(),
            "https://api.postex.pk/services/integration/api/order/v1/get-invoice?trackingNumbers=CX%20778812"
        );
    }

    #[test]
    fn test_host_only_base_has_no_double_slash() {
        let client =
            PostExClient::new(&config("http://127.0.0.1:9000"), Duration::from_secs(5)).unwrap();
        assert_eq!(client.base_url, "http://127.0.0.1:9000");
    }

    #[test]
    fn test_debug_hides_token() {
        let client =
            PostExClient::new(&config("http://127.0.0.1:9000"), Duration::from_secs(5)).unwrap();
        assert!(!format!("{client:?}").contains("pk_live"));
    }
}
