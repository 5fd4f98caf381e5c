//! Integration tests for StreetSlipp.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p streetslipp-integration-tests
//! ```
//!
//! No external services are needed: the courier and email provider are
//! stood up with `wiremock`, and the HTTP router is driven in-process.
//!
//! # Test Categories
//!
//! - `checkout_flow` - Cart to placed order against mocked courier and email
//! - `tracking` - Tracking lookups against a mocked courier
//! - `http_api` - Webhook receiver and tracking API routes

use std::path::Path;
use std::time::Duration;

use secrecy::SecretString;
use streetslipp_storefront::config::{
    CourierConfig, DEFAULT_WEBHOOK_HEADER, EmailConfig, StorefrontConfig, WebhookConfig,
};
use streetslipp_storefront::shipping::ShippingForm;
use url::Url;

/// Courier API token the mocked courier expects.
pub const COURIER_TOKEN: &str = "pk_test_4Gv9Lq2ZxR7mT1sW";

/// Shared webhook secret used by the test server.
pub const WEBHOOK_SECRET: &str = "whsec_7Hq2LmX8vRk3Np9T";

/// Path the mocked email provider listens on.
pub const EMAIL_SEND_PATH: &str = "/api/v1.0/email/send";

/// Configuration pointing the courier and email provider at mock servers.
///
/// `None` leaves that integration unconfigured.
///
/// # Panics
///
/// Panics if a mock server URI is not a valid URL.
#[must_use]
#[allow(clippy::unwrap_used)]
pub fn config(
    courier_uri: Option<&str>,
    email_uri: Option<&str>,
    data_dir: &Path,
    call_timeout: Duration,
) -> StorefrontConfig {
    StorefrontConfig {
        host: "127.0.0.1".parse().unwrap(),
        port: 0,
        data_dir: data_dir.to_path_buf(),
        order_prefix: "STSLIP".to_string(),
        call_timeout,
        courier: courier_uri.map(|uri| CourierConfig {
            base_url: Url::parse(uri).unwrap(),
            api_token: SecretString::from(COURIER_TOKEN),
            pickup_address_code: "LHR-WAREHOUSE".to_string(),
        }),
        email: email_uri.map(|uri| EmailConfig {
            api_url: Url::parse(&format!("{uri}{EMAIL_SEND_PATH}")).unwrap(),
            service_id: "service_street".to_string(),
            template_id: "template_order".to_string(),
            public_key: SecretString::from("pub_9sK2mQ7xL4"),
        }),
        webhook: Some(webhook_config()),
        whatsapp_number: Some("923248866737".to_string()),
        sentry_dsn: None,
        sentry_environment: None,
    }
}

/// Webhook settings with the default header and [`WEBHOOK_SECRET`].
#[must_use]
pub fn webhook_config() -> WebhookConfig {
    WebhookConfig {
        header_name: DEFAULT_WEBHOOK_HEADER.to_string(),
        secret: SecretString::from(WEBHOOK_SECRET),
    }
}

/// A complete shipping form.
#[must_use]
pub fn shipping_form() -> ShippingForm {
    ShippingForm {
        email: "waleed.khan@example.pk".to_string(),
        first_name: "Waleed".to_string(),
        last_name: "Khan".to_string(),
        phone: "03001234567".to_string(),
        address: "House 12, Street 4, DHA Phase 5".to_string(),
        city: "Karachi".to_string(),
    }
}
