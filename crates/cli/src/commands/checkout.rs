//! Checkout command.
//!
//! # Usage
//!
//! ```bash
//! # Order the whole bag, prefilled from the last checkout
//! streetslipp checkout --phone 03001234567
//!
//! # Buy a single pair without touching the bag
//! streetslipp checkout --buy-now onyx-prime --size 8 \
//!     --first-name Waleed --last-name Khan --phone 03001234567 \
//!     --address "House 12, Street 4, DHA Phase 5" --city Karachi
//! ```
//!
//! # Environment Variables
//!
//! - `POSTEX_API_TOKEN` - courier booking (optional, order stays pending without it)
//! - `EMAILJS_SERVICE_ID`, `EMAILJS_TEMPLATE_ID`, `EMAILJS_PUBLIC_KEY` - confirmation email
//! - `SHOP_WHATSAPP_NUMBER` - manual confirmation link on the receipt

use clap::Args;
use streetslipp_core::{Email, EmailError};
use streetslipp_storefront::cart::CartLine;
use streetslipp_storefront::services::{
    CheckoutCoordinator, CheckoutError, CheckoutSource, PlacedOrder,
};
use streetslipp_storefront::shipping::{self, ShippingForm};
use thiserror::Error;

use super::cart::{CartCommandError, resolve_variant};
use super::{Session, print_lines};

/// Errors that can occur during checkout.
#[derive(Debug, Error)]
pub enum CheckoutCommandError {
    /// Required shipping fields are blank after merging with the saved form.
    #[error("Missing shipping details: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    /// Email was given but is not a valid address.
    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// City is not one the courier serves.
    #[error("Unknown city: {0} (see `streetslipp cities`)")]
    UnknownCity(String),

    /// Buy-now variant could not be resolved.
    #[error(transparent)]
    Variant(#[from] CartCommandError),

    /// Checkout was rejected.
    #[error(transparent)]
    Checkout(#[from] CheckoutError),

    /// Receipt could not be serialized.
    #[error("Output error: {0}")]
    Output(#[from] serde_json::Error),
}

/// Shipping fields. Anything omitted is taken from the last checkout.
#[derive(Debug, Default, Args)]
pub struct ShippingArgs {
    /// Email for the confirmation (optional)
    #[arg(long)]
    pub email: Option<String>,

    #[arg(long)]
    pub first_name: Option<String>,

    #[arg(long)]
    pub last_name: Option<String>,

    /// Mobile number, `03XXXXXXXXX`
    #[arg(long)]
    pub phone: Option<String>,

    /// Street address
    #[arg(long)]
    pub address: Option<String>,

    /// Delivery city (see `streetslipp cities`)
    #[arg(long)]
    pub city: Option<String>,
}

impl ShippingArgs {
    /// Overlay the given fields on `saved`.
    #[must_use]
    pub fn merge_into(self, saved: ShippingForm) -> ShippingForm {
        ShippingForm {
            email: self.email.unwrap_or(saved.email),
            first_name: self.first_name.unwrap_or(saved.first_name),
            last_name: self.last_name.unwrap_or(saved.last_name),
            phone: self.phone.unwrap_or(saved.phone),
            address: self.address.unwrap_or(saved.address),
            city: self.city.unwrap_or(saved.city),
        }
    }
}

/// Buy a single variant instead of the bag.
#[derive(Debug, Args)]
pub struct BuyNowArgs {
    /// Product id to buy directly
    #[arg(long = "buy-now", value_name = "PRODUCT")]
    pub product: Option<String>,

    /// EU size for the buy-now product
    #[arg(long, requires = "product")]
    pub size: Option<u32>,

    /// Color hex for the buy-now product (defaults to its first color)
    #[arg(long, requires = "product")]
    pub color: Option<String>,
}

/// Validate the merged form the way the checkout page does.
///
/// # Errors
///
/// Returns error for blank required fields, a malformed email or a city the
/// courier does not serve.
pub fn validate(mut form: ShippingForm) -> Result<ShippingForm, CheckoutCommandError> {
    let missing = form.missing_fields();
    if !missing.is_empty() {
        return Err(CheckoutCommandError::MissingFields(missing));
    }

    if !form.email.trim().is_empty() {
        form.email = Email::parse(&form.email)?.as_str().to_owned();
    }

    let city = form.city.trim();
    let canonical = shipping::CITIES
        .iter()
        .find(|known| known.eq_ignore_ascii_case(city))
        .ok_or_else(|| CheckoutCommandError::UnknownCity(city.to_owned()))?;
    form.city = (*canonical).to_owned();

    Ok(form)
}

/// Place an order from the bag or a single buy-now variant.
///
/// # Errors
///
/// Returns error if the form is invalid or the order is empty.
pub async fn run(
    session: &Session,
    shipping_args: ShippingArgs,
    buy_now: BuyNowArgs,
    json: bool,
) -> Result<(), CheckoutCommandError> {
    let mut cart = session.cart();
    if buy_now.product.is_none() && cart.is_empty() {
        return Err(CheckoutError::EmptyOrder.into());
    }

    let saved = ShippingForm::load_saved(session.storage.as_ref());
    let form = validate(shipping_args.merge_into(saved))?;

    let source = match &buy_now.product {
        Some(product_id) => {
            let size = buy_now
                .size
                .ok_or_else(|| CheckoutCommandError::MissingFields(vec!["size"]))?;
            let product = resolve_variant(product_id, size)?;
            let color = buy_now.color.as_deref().unwrap_or_default();
            let line = CartLine::for_product(product, size, color)
                .ok_or_else(|| CartCommandError::NotPurchasable(product.name.clone()))?;
            CheckoutSource::BuyNow(line)
        }
        None => CheckoutSource::Cart,
    };

    let coordinator = CheckoutCoordinator::from_config(&session.config, session.storage.clone());
    let order = coordinator.place_order(&mut cart, source, form).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&order)?);
    } else {
        print_receipt(&order);
    }
    Ok(())
}

fn print_receipt(order: &PlacedOrder) {
    println!("{}", order.headline());
    println!();
    println!("  Order:     {}", order.reference);
    println!("  Placed:    {}", order.placed_at.format("%Y-%m-%d %H:%M UTC"));
    match &order.tracking_number {
        Some(tn) => println!("  Tracking:  {tn}"),
        None => println!("  Tracking:  pending, we will share it once the courier confirms"),
    }
    println!();
    print_lines(&order.lines);
    println!();
    println!(
        "  {} item(s), total {} (cash on delivery)",
        order.item_count(),
        order.total
    );
    println!(
        "  Ship to:   {}, {}",
        order.shipping.customer_name(),
        order.shipping.delivery_address()
    );

    if order.email_sent {
        println!("  Confirmation email sent.");
    }
    if let Some(url) = &order.invoice_url {
        println!("  Airway bill: {url}");
    }
    if let Some(url) = &order.whatsapp_url {
        println!("  Confirm on WhatsApp: {url}");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use streetslipp_storefront::config::StorefrontConfig;
    use streetslipp_storefront::storage::FileStore;

    use super::*;

    fn session(dir: &std::path::Path) -> Session {
        Session {
            config: StorefrontConfig {
                host: "127.0.0.1".parse().unwrap(),
                port: 3000,
                data_dir: dir.to_path_buf(),
                order_prefix: "STSLIP".to_string(),
                call_timeout: Duration::from_secs(1),
                courier: None,
                email: None,
                webhook: None,
                whatsapp_number: None,
                sentry_dsn: None,
                sentry_environment: None,
            },
            storage: Arc::new(FileStore::new(dir)),
        }
    }

    fn no_buy_now() -> BuyNowArgs {
        BuyNowArgs {
            product: None,
            size: None,
            color: None,
        }
    }

    fn complete() -> ShippingArgs {
        ShippingArgs {
            email: Some(" Waleed@Example.pk ".to_string()),
            first_name: Some("Waleed".to_string()),
            last_name: Some("Khan".to_string()),
            phone: Some("03001234567".to_string()),
            address: Some("House 12, Street 4".to_string()),
            city: Some("karachi".to_string()),
        }
    }

    #[test]
    fn test_merge_keeps_saved_fields() {
        let saved = ShippingForm {
            phone: "03111111111".to_string(),
            city: "Multan".to_string(),
            ..ShippingForm::default()
        };
        let merged = ShippingArgs {
            first_name: Some("Ayesha".to_string()),
            ..ShippingArgs::default()
        }
        .merge_into(saved);

        assert_eq!(merged.first_name, "Ayesha");
        assert_eq!(merged.phone, "03111111111");
        assert_eq!(merged.city, "Multan");
    }

    #[test]
    fn test_validate_canonicalizes_city_and_email() {
        let form = validate(complete().merge_into(ShippingForm::default())).unwrap();
        assert_eq!(form.city, "Karachi");
        assert_eq!(form.email, "Waleed@Example.pk");
    }

    #[test]
    fn test_validate_rejects_missing_and_unknown() {
        let err = validate(ShippingForm::default()).unwrap_err();
        assert!(
            matches!(err, CheckoutCommandError::MissingFields(ref f) if f.contains(&"phone"))
        );

        let args = ShippingArgs {
            city: Some("Atlantis".to_string()),
            ..complete()
        };
        assert!(matches!(
            validate(args.merge_into(ShippingForm::default())),
            Err(CheckoutCommandError::UnknownCity(_))
        ));

        let args = ShippingArgs {
            email: Some("not-an-email".to_string()),
            ..complete()
        };
        assert!(matches!(
            validate(args.merge_into(ShippingForm::default())),
            Err(CheckoutCommandError::InvalidEmail(_))
        ));
    }

    #[test]
    fn test_blank_email_is_allowed() {
        let args = ShippingArgs {
            email: None,
            ..complete()
        };
        let form = validate(args.merge_into(ShippingForm::default())).unwrap();
        assert!(form.email.is_empty());
    }

    #[tokio::test]
    async fn test_empty_bag_rejected_before_form_checks() {
        let dir = tempfile::tempdir().unwrap();
        let result = run(&session(dir.path()), ShippingArgs::default(), no_buy_now(), false).await;

        assert!(matches!(
            result,
            Err(CheckoutCommandError::Checkout(CheckoutError::EmptyOrder))
        ));
    }

    #[tokio::test]
    async fn test_buy_now_skips_empty_bag_check() {
        let dir = tempfile::tempdir().unwrap();
        let buy_now = BuyNowArgs {
            product: Some("onyx-prime".to_string()),
            ..no_buy_now()
        };
        let result = run(&session(dir.path()), ShippingArgs::default(), buy_now, false).await;

        assert!(matches!(result, Err(CheckoutCommandError::MissingFields(_))));
    }
}
