//! Order submission.
//!
//! A checkout snapshots the active lines, books the shipment with the
//! courier, sends the confirmation email and then reports the order as placed.
//! The courier and the email provider are each best-effort: a failure or
//! timeout in one is logged and never stops the other or the order itself.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use streetslipp_core::{OrderReference, Price, ReferenceError, TrackingNumber};
use thiserror::Error;
use tracing::instrument;

use crate::cart::{self, CartLine, CartStore};
use crate::config::StorefrontConfig;
use crate::courier::{BookingRequest, CourierApi, ORDER_TYPE_NORMAL, PostExClient};
use crate::services::email::{EmailJsClient, OrderNotification, OrderNotifier, PENDING_TRACKING};
use crate::shipping::ShippingForm;
use crate::storage::SnapshotStore;

/// Shown when the courier returned a tracking number.
pub const BOOKED_HEADLINE: &str = "ORDER SECURED & BOOKED";

/// Shown when the order was placed without a tracking number.
pub const PENDING_HEADLINE: &str = "ORDER PLACED (Tracking Pending)";

/// Pickup code used when none is configured.
const DEFAULT_PICKUP_ADDRESS_CODE: &str = "default";

/// Errors that reject a checkout before anything is sent.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// There are no lines to order.
    #[error("Cannot place an empty order")]
    EmptyOrder,

    /// The order reference could not be generated.
    #[error(transparent)]
    Reference(#[from] ReferenceError),
}

/// Which lines a checkout orders.
#[derive(Debug, Clone)]
pub enum CheckoutSource {
    /// Everything in the cart. The cart is cleared once the order is placed.
    Cart,
    /// A single line bought directly. The cart is left untouched.
    BuyNow(CartLine),
}

/// Receipt for a placed order.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacedOrder {
    pub reference: OrderReference,
    pub lines: Vec<CartLine>,
    pub total: Price,
    pub shipping: ShippingForm,
    pub tracking_number: Option<TrackingNumber>,
    pub email_sent: bool,
    pub placed_at: DateTime<Utc>,
    /// Printable airway bill, when booked.
    pub invoice_url: Option<String>,
    /// Prefilled WhatsApp message to the shop, when a shop number is set.
    pub whatsapp_url: Option<String>,
}

impl PlacedOrder {
    /// Outcome message for the customer.
    #[must_use]
    pub const fn headline(&self) -> &'static str {
        if self.tracking_number.is_some() {
            BOOKED_HEADLINE
        } else {
            PENDING_HEADLINE
        }
    }

    /// Total quantity across lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        cart::count_of(&self.lines)
    }
}

/// Coordinates order submission against the courier and email provider.
pub struct CheckoutCoordinator {
    storage: Arc<dyn SnapshotStore>,
    order_prefix: String,
    call_timeout: Duration,
    courier: Option<Arc<dyn CourierApi>>,
    pickup_address_code: String,
    notifier: Option<Arc<dyn OrderNotifier>>,
    whatsapp_number: Option<String>,
}

impl std::fmt::Debug for CheckoutCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckoutCoordinator")
            .field("order_prefix", &self.order_prefix)
            .field("call_timeout", &self.call_timeout)
            .field("courier", &self.courier.is_some())
            .field("notifier", &self.notifier.is_some())
            .finish_non_exhaustive()
    }
}

impl CheckoutCoordinator {
    /// Create a coordinator with no courier and no email provider.
    #[must_use]
    pub fn new(
        storage: Arc<dyn SnapshotStore>,
        order_prefix: impl Into<String>,
        call_timeout: Duration,
    ) -> Self {
        Self {
            storage,
            order_prefix: order_prefix.into(),
            call_timeout,
            courier: None,
            pickup_address_code: DEFAULT_PICKUP_ADDRESS_CODE.to_string(),
            notifier: None,
            whatsapp_number: None,
        }
    }

    /// Build from configuration.
    ///
    /// Missing or unusable courier and email settings disable that step
    /// with a warning instead of failing.
    #[must_use]
    pub fn from_config(config: &StorefrontConfig, storage: Arc<dyn SnapshotStore>) -> Self {
        let mut coordinator = Self::new(storage, &config.order_prefix, config.call_timeout);

        match &config.courier {
            Some(courier) => match PostExClient::new(courier, config.call_timeout) {
                Ok(client) => {
                    coordinator = coordinator
                        .with_courier(Arc::new(client), &courier.pickup_address_code);
                }
                Err(e) => tracing::warn!(error = %e, "Courier client unavailable, booking disabled"),
            },
            None => tracing::warn!("POSTEX_API_TOKEN not set, orders will not be booked"),
        }

        match &config.email {
            Some(email) => match EmailJsClient::new(email, config.call_timeout) {
                Ok(client) => coordinator = coordinator.with_notifier(Arc::new(client)),
                Err(e) => tracing::warn!(error = %e, "Email client unavailable, notifications disabled"),
            },
            None => tracing::warn!("EmailJS settings not set, order emails disabled"),
        }

        if let Some(number) = &config.whatsapp_number {
            coordinator = coordinator.with_whatsapp_number(number);
        }

        coordinator
    }

    /// Book shipments through `courier`.
    #[must_use]
    pub fn with_courier(
        mut self,
        courier: Arc<dyn CourierApi>,
        pickup_address_code: impl Into<String>,
    ) -> Self {
        self.courier = Some(courier);
        self.pickup_address_code = pickup_address_code.into();
        self
    }

    /// Send confirmations through `notifier`.
    #[must_use]
    pub fn with_notifier(mut self, notifier: Arc<dyn OrderNotifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Offer a WhatsApp link to this number on the receipt.
    #[must_use]
    pub fn with_whatsapp_number(mut self, number: &str) -> Self {
        let digits: String = number.chars().filter(char::is_ascii_digit).collect();
        self.whatsapp_number = (!digits.is_empty()).then_some(digits);
        self
    }

    /// Place an order.
    ///
    /// Only an empty line set is rejected. Once the reference exists the
    /// order is always placed, with or without a tracking number.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::EmptyOrder` if there is nothing to order.
    #[instrument(skip_all, fields(order_ref = tracing::field::Empty))]
    pub async fn place_order(
        &self,
        cart: &mut CartStore,
        source: CheckoutSource,
        shipping: ShippingForm,
    ) -> Result<PlacedOrder, CheckoutError> {
        let (lines, clears_cart) = match source {
            CheckoutSource::Cart => (cart.lines().to_vec(), true),
            CheckoutSource::BuyNow(line) => (vec![line], false),
        };
        if lines.is_empty() {
            return Err(CheckoutError::EmptyOrder);
        }
        let total = cart::total_of(&lines);

        let reference = OrderReference::generate(&self.order_prefix, &mut rand::rng())?;
        tracing::Span::current().record("order_ref", reference.as_str());
        tracing::info!(order_ref = %reference, total = %total, lines = lines.len(), "Placing order");

        shipping.save(self.storage.as_ref());

        let tracking_number = self.book(&reference, &lines, total, &shipping).await;
        let email_sent = self
            .send_confirmation(&reference, &lines, total, &shipping, tracking_number.as_ref())
            .await;

        if clears_cart {
            cart.clear();
        }

        let invoice_url = tracking_number
            .as_ref()
            .zip(self.courier.as_ref())
            .and_then(|(tn, courier)| courier.invoice_url(tn));
        let whatsapp_url = self
            .whatsapp_number
            .as_deref()
            .map(|number| whatsapp_link(number, &reference, &lines, total, &shipping));

        let order = PlacedOrder {
            reference,
            lines,
            total,
            shipping,
            tracking_number,
            email_sent,
            placed_at: Utc::now(),
            invoice_url,
            whatsapp_url,
        };
        tracing::info!(
            order_ref = %order.reference,
            booked = order.tracking_number.is_some(),
            email_sent,
            "{}",
            order.headline()
        );
        Ok(order)
    }

    async fn book(
        &self,
        reference: &OrderReference,
        lines: &[CartLine],
        total: Price,
        shipping: &ShippingForm,
    ) -> Option<TrackingNumber> {
        let Some(courier) = &self.courier else {
            tracing::debug!("No courier configured, skipping booking");
            return None;
        };

        let request = BookingRequest {
            order_ref_number: reference.clone(),
            invoice_payment: total.amount,
            customer_name: shipping.customer_name(),
            customer_phone: shipping.phone.trim().to_string(),
            delivery_address: shipping.delivery_address(),
            city_name: shipping.city.trim().to_string(),
            order_type: ORDER_TYPE_NORMAL,
            items: lines.len(),
            pickup_address_code: self.pickup_address_code.clone(),
        };

        match tokio::time::timeout(self.call_timeout, courier.book_order(&request)).await {
            Ok(Ok(tracking_number)) => Some(tracking_number),
            Ok(Err(e)) => {
                tracing::warn!(order_ref = %reference, error = %e, "Courier booking failed");
                None
            }
            Err(_) => {
                tracing::warn!(order_ref = %reference, timeout = ?self.call_timeout, "Courier booking timed out");
                None
            }
        }
    }

    async fn send_confirmation(
        &self,
        reference: &OrderReference,
        lines: &[CartLine],
        total: Price,
        shipping: &ShippingForm,
        tracking_number: Option<&TrackingNumber>,
    ) -> bool {
        let Some(notifier) = &self.notifier else {
            tracing::debug!("No email provider configured, skipping confirmation");
            return false;
        };

        let notification = OrderNotification {
            order_id: reference.to_string(),
            tracking_number: tracking_number
                .map_or_else(|| PENDING_TRACKING.to_string(), ToString::to_string),
            customer_name: shipping.customer_name(),
            customer_phone: shipping.phone.trim().to_string(),
            customer_email: shipping.email.trim().to_string(),
            shipping_address: shipping.delivery_address(),
            order_items: order_summary(lines),
            total_price: total.display(),
        };

        match tokio::time::timeout(self.call_timeout, notifier.notify(&notification)).await {
            Ok(Ok(())) => true,
            Ok(Err(e)) => {
                tracing::warn!(order_ref = %reference, error = %e, "Order email failed");
                false
            }
            Err(_) => {
                tracing::warn!(order_ref = %reference, timeout = ?self.call_timeout, "Order email timed out");
                false
            }
        }
    }
}

/// One summary line per cart line, newline separated.
#[must_use]
pub fn order_summary(lines: &[CartLine]) -> String {
    lines
        .iter()
        .map(CartLine::summary)
        .collect::<Vec<_>>()
        .join("\n")
}

fn whatsapp_link(
    number: &str,
    reference: &OrderReference,
    lines: &[CartLine],
    total: Price,
    shipping: &ShippingForm,
) -> String {
    let message = format!(
        "*STREETSLIPP ORDER CONFIRMATION: {reference}*\n\n\
         *Customer:* {name}\n\
         *Phone:* {phone}\n\
         *Address:* {address}\n\n\
         *Items:*\n{items}\n\n\
         *Total:* {total}\n\
         *Method:* Cash On Delivery",
        name = shipping.customer_name(),
        phone = shipping.phone.trim(),
        address = shipping.delivery_address(),
        items = order_summary(lines),
    );
    format!("https://wa.me/{number}?text={}", urlencoding::encode(&message))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::catalog::find_product;
    use crate::courier::{CourierError, TrackingInfo};
    use crate::services::email::EmailError;
    use crate::storage::{MemoryStore, SHIPPING_INFO_KEY};

    enum Booking {
        Accept(&'static str),
        Fail,
        Hang,
    }

    struct FakeCourier {
        booking: Booking,
        requests: Mutex<Vec<BookingRequest>>,
    }

    impl FakeCourier {
        fn new(booking: Booking) -> Arc<Self> {
            Arc::new(Self {
                booking,
                requests: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl CourierApi for FakeCourier {
        async fn book_order(
            &self,
            request: &BookingRequest,
        ) -> Result<TrackingNumber, CourierError> {
            self.requests.lock().unwrap().push(request.clone());
            match self.booking {
                Booking::Accept(tn) => Ok(TrackingNumber::parse(tn).unwrap()),
                Booking::Fail => Err(CourierError::Api {
                    status: 503,
                    message: "maintenance".to_string(),
                }),
                Booking::Hang => std::future::pending().await,
            }
        }

        async fn track_order(
            &self,
            _tracking_number: &TrackingNumber,
        ) -> Result<TrackingInfo, CourierError> {
            Err(CourierError::Parse("not used".to_string()))
        }

        fn invoice_url(&self, tracking_number: &TrackingNumber) -> Option<String> {
            Some(format!("https://courier.test/invoice/{tracking_number}"))
        }
    }

    #[derive(Default)]
    struct FakeNotifier {
        fail: bool,
        sent: Mutex<Vec<OrderNotification>>,
    }

    #[async_trait]
    impl OrderNotifier for FakeNotifier {
        async fn notify(&self, notification: &OrderNotification) -> Result<(), EmailError> {
            self.sent.lock().unwrap().push(notification.clone());
            if self.fail {
                Err(EmailError::Api {
                    status: 400,
                    message: "bad template".to_string(),
                })
            } else {
                Ok(())
            }
        }
    }

    fn shipping() -> ShippingForm {
        ShippingForm {
            email: "ayesha@example.pk".to_string(),
            first_name: "Ayesha".to_string(),
            last_name: "Malik".to_string(),
            phone: "03211234567".to_string(),
            address: "Flat 3, Gulberg III".to_string(),
            city: "Lahore".to_string(),
        }
    }

    fn cart_with_two_apex(storage: &Arc<MemoryStore>) -> CartStore {
        let mut cart = CartStore::load(storage.clone());
        let apex = find_product("apex-drift").unwrap();
        cart.add(apex, 9, "#FF0000").unwrap();
        cart.add(apex, 9, "#FF0000").unwrap();
        cart
    }

    fn coordinator(storage: &Arc<MemoryStore>) -> CheckoutCoordinator {
        CheckoutCoordinator::new(storage.clone(), "STSLIP", Duration::from_millis(200))
    }

    #[tokio::test]
    async fn test_booked_order() {
        let storage = Arc::new(MemoryStore::new());
        let mut cart = cart_with_two_apex(&storage);
        let courier = FakeCourier::new(Booking::Accept("CX-900100"));
        let notifier = Arc::new(FakeNotifier::default());
        let checkout = coordinator(&storage)
            .with_courier(courier.clone(), "LHR-01")
            .with_notifier(notifier.clone());

        let order = checkout
            .place_order(&mut cart, CheckoutSource::Cart, shipping())
            .await
            .unwrap();

        assert_eq!(order.headline(), BOOKED_HEADLINE);
        assert_eq!(order.total, Price::pkr(4160));
        assert_eq!(order.item_count(), 2);
        assert!(order.email_sent);
        assert_eq!(
            order.invoice_url.as_deref(),
            Some("https://courier.test/invoice/CX-900100")
        );
        assert!(cart.is_empty());

        let requests = courier.requests.lock().unwrap();
        let request = requests.first().unwrap();
        assert_eq!(request.order_ref_number, order.reference);
        assert_eq!(request.invoice_payment, rust_decimal::Decimal::from(4160));
        assert_eq!(request.customer_name, "Ayesha Malik");
        assert_eq!(request.delivery_address, "Flat 3, Gulberg III, Lahore");
        assert_eq!(request.items, 1);
        assert_eq!(request.pickup_address_code, "LHR-01");

        let sent = notifier.sent.lock().unwrap();
        let email = sent.first().unwrap();
        assert_eq!(email.tracking_number, "CX-900100");
        assert_eq!(email.total_price, "Rs. 4160");
        assert_eq!(email.order_items, "- Apex Drift (EU 9, Stealth Red) x2");
    }

    #[tokio::test]
    async fn test_failed_booking_still_places_order() {
        let storage = Arc::new(MemoryStore::new());
        let mut cart = cart_with_two_apex(&storage);
        let notifier = Arc::new(FakeNotifier::default());
        let checkout = coordinator(&storage)
            .with_courier(FakeCourier::new(Booking::Fail), "default")
            .with_notifier(notifier.clone());

        let order = checkout
            .place_order(&mut cart, CheckoutSource::Cart, shipping())
            .await
            .unwrap();

        assert_eq!(order.tracking_number, None);
        assert_eq!(order.invoice_url, None);
        assert_eq!(order.headline(), PENDING_HEADLINE);
        assert_eq!(
            notifier.sent.lock().unwrap().first().unwrap().tracking_number,
            "PENDING"
        );
        assert!(cart.is_empty());
    }

    #[tokio::test]
    async fn test_courier_and_email_both_failing_still_places_order() {
        let storage = Arc::new(MemoryStore::new());
        let mut cart = cart_with_two_apex(&storage);
        let courier = FakeCourier::new(Booking::Fail);
        let notifier = Arc::new(FakeNotifier {
            fail: true,
            ..FakeNotifier::default()
        });
        let checkout = coordinator(&storage)
            .with_courier(courier.clone(), "default")
            .with_notifier(notifier.clone());

        let order = checkout
            .place_order(&mut cart, CheckoutSource::Cart, shipping())
            .await
            .unwrap();

        assert_eq!(order.headline(), PENDING_HEADLINE);
        assert_eq!(order.tracking_number, None);
        assert!(!order.email_sent);
        assert_eq!(order.total, Price::pkr(4160));
        assert_eq!(courier.requests.lock().unwrap().len(), 1);
        assert_eq!(notifier.sent.lock().unwrap().len(), 1);
        assert!(cart.is_empty());
        assert!(CartStore::load(storage.clone()).is_empty());
    }

    #[tokio::test]
    async fn test_hanging_courier_times_out() {
        let storage = Arc::new(MemoryStore::new());
        let mut cart = cart_with_two_apex(&storage);
        let notifier = Arc::new(FakeNotifier::default());
        let checkout =
            CheckoutCoordinator::new(storage.clone(), "STSLIP", Duration::from_millis(50))
                .with_courier(FakeCourier::new(Booking::Hang), "default")
                .with_notifier(notifier.clone());

        let order = checkout
            .place_order(&mut cart, CheckoutSource::Cart, shipping())
            .await
            .unwrap();

        assert_eq!(order.tracking_number, None);
        assert!(order.email_sent);
        assert_eq!(notifier.sent.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_email_failure_does_not_block_order() {
        let storage = Arc::new(MemoryStore::new());
        let mut cart = cart_with_two_apex(&storage);
        let checkout = coordinator(&storage)
            .with_courier(FakeCourier::new(Booking::Accept("CX-1")), "default")
            .with_notifier(Arc::new(FakeNotifier {
                fail: true,
                ..FakeNotifier::default()
            }));

        let order = checkout
            .place_order(&mut cart, CheckoutSource::Cart, shipping())
            .await
            .unwrap();

        assert_eq!(order.headline(), BOOKED_HEADLINE);
        assert!(!order.email_sent);
        assert!(cart.is_empty());
    }

    #[tokio::test]
    async fn test_unconfigured_integrations_degrade() {
        let storage = Arc::new(MemoryStore::new());
        let mut cart = cart_with_two_apex(&storage);

        let order = coordinator(&storage)
            .place_order(&mut cart, CheckoutSource::Cart, shipping())
            .await
            .unwrap();

        assert_eq!(order.headline(), PENDING_HEADLINE);
        assert!(!order.email_sent);
        assert!(order.reference.as_str().starts_with("STSLIP-"));
        assert!(cart.is_empty());
    }

    #[tokio::test]
    async fn test_buy_now_leaves_cart_untouched() {
        let storage = Arc::new(MemoryStore::new());
        let mut cart = cart_with_two_apex(&storage);
        let courier = FakeCourier::new(Booking::Accept("CX-2"));
        let checkout = coordinator(&storage).with_courier(courier.clone(), "default");

        let onyx = find_product("onyx-prime").unwrap();
        let line = CartLine::for_product(onyx, 8, "#000000").unwrap();
        let order = checkout
            .place_order(&mut cart, CheckoutSource::BuyNow(line), shipping())
            .await
            .unwrap();

        assert_eq!(order.total, Price::pkr(2000));
        assert_eq!(order.lines.len(), 1);
        assert_eq!(cart.count(), 2);
        assert_eq!(cart.total(), Price::pkr(4160));
    }

    #[tokio::test]
    async fn test_empty_order_rejected_before_io() {
        let storage = Arc::new(MemoryStore::new());
        let mut cart = CartStore::load(storage.clone());
        let courier = FakeCourier::new(Booking::Accept("CX-3"));
        let checkout = coordinator(&storage).with_courier(courier.clone(), "default");

        let result = checkout
            .place_order(&mut cart, CheckoutSource::Cart, shipping())
            .await;

        assert!(matches!(result, Err(CheckoutError::EmptyOrder)));
        assert!(courier.requests.lock().unwrap().is_empty());
        assert!(storage.load(SHIPPING_INFO_KEY).is_none());
    }

    #[tokio::test]
    async fn test_invalid_prefix_rejected() {
        let storage = Arc::new(MemoryStore::new());
        let mut cart = cart_with_two_apex(&storage);
        let checkout = CheckoutCoordinator::new(storage.clone(), "st-slip", Duration::from_secs(1));

        let result = checkout
            .place_order(&mut cart, CheckoutSource::Cart, shipping())
            .await;

        assert!(matches!(
            result,
            Err(CheckoutError::Reference(ReferenceError::InvalidPrefix(_)))
        ));
        assert_eq!(cart.count(), 2);
    }

    #[tokio::test]
    async fn test_shipping_form_saved_and_whatsapp_link() {
        let storage = Arc::new(MemoryStore::new());
        let mut cart = cart_with_two_apex(&storage);
        let checkout = coordinator(&storage).with_whatsapp_number("+92 324 8866737");

        let order = checkout
            .place_order(&mut cart, CheckoutSource::Cart, shipping())
            .await
            .unwrap();

        assert_eq!(ShippingForm::load_saved(storage.as_ref()), shipping());
        let link = order.whatsapp_url.unwrap();
        assert!(link.starts_with("https://wa.me/923248866737?text="));
        assert!(link.contains(&urlencoding::encode(order.reference.as_str()).into_owned()));
        assert!(link.contains("Cash%20On%20Delivery"));
    }
}
