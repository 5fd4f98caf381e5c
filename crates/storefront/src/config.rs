//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Server only (required by the webhook receiver)
//! - `COURIER_WEBHOOK_SECRET` - Shared secret the courier sends with every push
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `STOREFRONT_DATA_DIR` - Local snapshot directory (default: .streetslipp)
//! - `ORDER_REFERENCE_PREFIX` - Order reference prefix (default: STSLIP)
//! - `EXTERNAL_CALL_TIMEOUT_SECS` - Per-call timeout for courier/email (default: 12)
//! - `POSTEX_API_TOKEN` - Courier API token; booking and tracking are disabled without it
//! - `POSTEX_BASE_URL` - Courier API base URL
//! - `POSTEX_PICKUP_ADDRESS_CODE` - Courier pickup address code (default: default)
//! - `EMAILJS_SERVICE_ID`, `EMAILJS_TEMPLATE_ID`, `EMAILJS_PUBLIC_KEY` - Order
//!   email notification; disabled unless all three are set
//! - `EMAILJS_API_URL` - Email send endpoint
//! - `COURIER_WEBHOOK_HEADER` - Webhook auth header name (default: x-streetslipp-auth)
//! - `SHOP_WHATSAPP_NUMBER` - Number used for the manual WhatsApp order link
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

use streetslipp_core::{OrderReference, validate_prefix};

const MIN_WEBHOOK_SECRET_LENGTH: usize = 16;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.0;
const MAX_CALL_TIMEOUT_SECS: u64 = 60;

/// Default courier API base URL.
pub const DEFAULT_POSTEX_BASE_URL: &str = "https://api.postex.pk/services/integration/api";

/// Default email send endpoint.
pub const DEFAULT_EMAILJS_API_URL: &str = "https://api.emailjs.com/api/v1.0/email/send";

/// Default webhook auth header name.
pub const DEFAULT_WEBHOOK_HEADER: &str = "x-streetslipp-auth";

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Directory holding the local cart and shipping-form snapshots
    pub data_dir: PathBuf,
    /// Prefix for generated order references
    pub order_prefix: String,
    /// Upper bound for each courier or email call
    pub call_timeout: Duration,
    /// Courier API settings; `None` disables booking and tracking
    pub courier: Option<CourierConfig>,
    /// Order email settings; `None` disables notifications
    pub email: Option<EmailConfig>,
    /// Webhook auth settings; required by the server binary
    pub webhook: Option<WebhookConfig>,
    /// Shop WhatsApp number for the manual order link
    pub whatsapp_number: Option<String>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// Courier (PostEx) API configuration.
///
/// Implements `Debug` manually to redact the API token.
#[derive(Clone)]
pub struct CourierConfig {
    /// API base URL, without a trailing slash
    pub base_url: Url,
    /// API token sent in the `token` header
    pub api_token: SecretString,
    /// Pickup address code registered with the courier
    pub pickup_address_code: String,
}

impl std::fmt::Debug for CourierConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CourierConfig")
            .field("base_url", &self.base_url.as_str())
            .field("api_token", &"[REDACTED]")
            .field("pickup_address_code", &self.pickup_address_code)
            .finish()
    }
}

/// Template email service configuration.
///
/// Implements `Debug` manually to redact the public key.
#[derive(Clone)]
pub struct EmailConfig {
    /// Send endpoint
    pub api_url: Url,
    /// Service identifier
    pub service_id: String,
    /// Order confirmation template identifier
    pub template_id: String,
    /// Account public key
    pub public_key: SecretString,
}

impl std::fmt::Debug for EmailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailConfig")
            .field("api_url", &self.api_url.as_str())
            .field("service_id", &self.service_id)
            .field("template_id", &self.template_id)
            .field("public_key", &"[REDACTED]")
            .finish()
    }
}

/// Webhook authentication configuration.
///
/// Implements `Debug` manually to redact the shared secret.
#[derive(Clone)]
pub struct WebhookConfig {
    /// Header the courier sends the secret in (lowercase)
    pub header_name: String,
    /// Expected header value
    pub secret: SecretString,
}

impl std::fmt::Debug for WebhookConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookConfig")
            .field("header_name", &self.header_name)
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present. Courier,
    /// email and webhook groups are optional here; use
    /// [`StorefrontConfig::require_webhook`] in server contexts.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a present variable is invalid or if the
    /// webhook secret fails validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = get_env_or_default("STOREFRONT_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STOREFRONT_HOST".to_string(), e.to_string())
            })?;
        let port = get_env_or_default("STOREFRONT_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STOREFRONT_PORT".to_string(), e.to_string())
            })?;
        let data_dir = PathBuf::from(get_env_or_default("STOREFRONT_DATA_DIR", ".streetslipp"));

        let order_prefix =
            get_env_or_default("ORDER_REFERENCE_PREFIX", OrderReference::DEFAULT_PREFIX);
        validate_prefix(&order_prefix).map_err(|e| {
            ConfigError::InvalidEnvVar("ORDER_REFERENCE_PREFIX".to_string(), e.to_string())
        })?;

        let call_timeout = parse_timeout(&get_env_or_default("EXTERNAL_CALL_TIMEOUT_SECS", "12"))?;

        Ok(Self {
            host,
            port,
            data_dir,
            order_prefix,
            call_timeout,
            courier: CourierConfig::from_env()?,
            email: EmailConfig::from_env()?,
            webhook: WebhookConfig::from_env()?,
            whatsapp_number: get_optional_env("SHOP_WHATSAPP_NUMBER"),
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Webhook settings, failing fast when they are missing.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingEnvVar` if no webhook secret is configured.
    pub fn require_webhook(&self) -> Result<&WebhookConfig, ConfigError> {
        self.webhook
            .as_ref()
            .ok_or_else(|| ConfigError::MissingEnvVar("COURIER_WEBHOOK_SECRET".to_string()))
    }
}

impl CourierConfig {
    fn from_env() -> Result<Option<Self>, ConfigError> {
        let Some(api_token) = get_optional_env("POSTEX_API_TOKEN") else {
            return Ok(None);
        };

        Ok(Some(Self {
            base_url: parse_url(
                "POSTEX_BASE_URL",
                &get_env_or_default("POSTEX_BASE_URL", DEFAULT_POSTEX_BASE_URL),
            )?,
            api_token: SecretString::from(api_token),
            pickup_address_code: get_env_or_default("POSTEX_PICKUP_ADDRESS_CODE", "default"),
        }))
    }
}

impl EmailConfig {
    fn from_env() -> Result<Option<Self>, ConfigError> {
        let (Some(service_id), Some(template_id), Some(public_key)) = (
            get_optional_env("EMAILJS_SERVICE_ID"),
            get_optional_env("EMAILJS_TEMPLATE_ID"),
            get_optional_env("EMAILJS_PUBLIC_KEY"),
        ) else {
            return Ok(None);
        };

        Ok(Some(Self {
            api_url: parse_url(
                "EMAILJS_API_URL",
                &get_env_or_default("EMAILJS_API_URL", DEFAULT_EMAILJS_API_URL),
            )?,
            service_id,
            template_id,
            public_key: SecretString::from(public_key),
        }))
    }
}

impl WebhookConfig {
    fn from_env() -> Result<Option<Self>, ConfigError> {
        if get_optional_env("COURIER_WEBHOOK_SECRET").is_none() {
            return Ok(None);
        }
        let secret = get_validated_secret("COURIER_WEBHOOK_SECRET")?;

        Ok(Some(Self {
            header_name: get_env_or_default("COURIER_WEBHOOK_HEADER", DEFAULT_WEBHOOK_HEADER)
                .to_ascii_lowercase(),
            secret,
        }))
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable, treating blank values as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    get_optional_env(key).ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
}

fn parse_url(key: &str, value: &str) -> Result<Url, ConfigError> {
    Url::parse(value.trim_end_matches('/'))
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

fn parse_timeout(value: &str) -> Result<Duration, ConfigError> {
    let secs = value.parse::<u64>().map_err(|e| {
        ConfigError::InvalidEnvVar("EXTERNAL_CALL_TIMEOUT_SECS".to_string(), e.to_string())
    })?;
    if !(1..=MAX_CALL_TIMEOUT_SECS).contains(&secs) {
        return Err(ConfigError::InvalidEnvVar(
            "EXTERNAL_CALL_TIMEOUT_SECS".to_string(),
            format!("must be between 1 and {MAX_CALL_TIMEOUT_SECS} seconds"),
        ));
    }
    Ok(Duration::from_secs(secs))
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is long enough, not a placeholder, and has
/// sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    if secret.len() < MIN_WEBHOOK_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {MIN_WEBHOOK_SECRET_LENGTH} characters (got {})",
                secret.len()
            ),
        ));
    }

    let lower = secret.to_lowercase();
    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn config() -> StorefrontConfig {
        StorefrontConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            data_dir: PathBuf::from(".streetslipp"),
            order_prefix: "STSLIP".to_string(),
            call_timeout: Duration::from_secs(12),
            courier: None,
            email: None,
            webhook: None,
            whatsapp_number: None,
            sentry_dsn: None,
            sentry_environment: None,
        }
    }

    #[test]
    fn test_shannon_entropy_empty() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_two_chars() {
        let entropy = shannon_entropy("ab");
        assert!((entropy - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_validate_secret_strength_placeholder() {
        let result = validate_secret_strength("your-webhook-token-here", "TEST_VAR");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_too_short() {
        let result = validate_secret_strength("aB3$xY9!", "TEST_VAR");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        let result = validate_secret_strength("aaaaaaaaaaaaaaaaaaaaaaaa", "TEST_VAR");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_valid() {
        assert!(validate_secret_strength("SLIPP_SECURE_V1_9928374", "TEST_VAR").is_ok());
        assert!(validate_secret_strength("aB3$xY9!mK2@nL5#pQ7&", "TEST_VAR").is_ok());
    }

    #[test]
    fn test_parse_timeout_bounds() {
        assert_eq!(parse_timeout("12").unwrap(), Duration::from_secs(12));
        assert!(parse_timeout("0").is_err());
        assert!(parse_timeout("61").is_err());
        assert!(parse_timeout("soon").is_err());
    }

    #[test]
    fn test_parse_url_strips_trailing_slash() {
        let url = parse_url("TEST_URL", "https://api.postex.pk/services/integration/api/").unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.postex.pk/services/integration/api"
        );
    }

    #[test]
    fn test_require_webhook_fails_fast() {
        let mut config = config();
        assert!(matches!(
            config.require_webhook(),
            Err(ConfigError::MissingEnvVar(_))
        ));

        config.webhook = Some(WebhookConfig {
            header_name: DEFAULT_WEBHOOK_HEADER.to_string(),
            secret: SecretString::from("SLIPP_SECURE_V1_9928374"),
        });
        assert!(config.require_webhook().is_ok());
    }

    #[test]
    fn test_socket_addr() {
        let addr = config().socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let courier = CourierConfig {
            base_url: Url::parse(DEFAULT_POSTEX_BASE_URL).unwrap(),
            api_token: SecretString::from("super_secret_courier_token"),
            pickup_address_code: "default".to_string(),
        };
        let webhook = WebhookConfig {
            header_name: DEFAULT_WEBHOOK_HEADER.to_string(),
            secret: SecretString::from("super_secret_webhook_value"),
        };

        let debug_output = format!("{courier:?} {webhook:?}");
        assert!(debug_output.contains("api.postex.pk"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_courier_token"));
        assert!(!debug_output.contains("super_secret_webhook_value"));
    }
}
