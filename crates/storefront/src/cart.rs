//! Session cart store.
//!
//! The cart is owned by a single session and injected into whatever needs it
//! (the CLI commands, the checkout coordinator). Every mutation rewrites the
//! local snapshot and emits a [`CartEvent`] to subscribers.
//!
//! Lines are keyed by `(product, size, color)`. Quantities never drop below
//! one through [`CartStore::update_quantity`]; removing a line is always an
//! explicit [`CartStore::remove`].

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::instrument;

use streetslipp_core::{CartLineId, CurrencyCode, Price, Product, ProductColor};

use crate::storage::{self, CART_KEY, SnapshotStore};

/// Capacity of the event channel; slow subscribers see `Lagged`.
const EVENT_CAPACITY: usize = 32;

/// A line in the cart: a product snapshot plus the chosen variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub cart_id: CartLineId,
    pub product_id: String,
    pub name: String,
    pub price: Price,
    pub image: String,
    pub selected_size: u32,
    pub selected_color: ProductColor,
    pub quantity: u32,
}

impl CartLine {
    /// Build a quantity-1 line for a product variant.
    ///
    /// The color is resolved with [`Product::color_or_default`]. Returns
    /// `None` only for a product without any color.
    #[must_use]
    pub fn for_product(product: &Product, size: u32, color_hex: &str) -> Option<Self> {
        let color = product.color_or_default(color_hex)?.clone();
        Some(Self {
            cart_id: CartLineId::compose(&product.id, size, &color.hex),
            product_id: product.id.clone(),
            name: product.name.clone(),
            price: product.price,
            image: product.primary_image().unwrap_or_default().to_string(),
            selected_size: size,
            selected_color: color,
            quantity: 1,
        })
    }

    /// Price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price.times(self.quantity)
    }

    /// One-line summary used in order notifications.
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "- {} (EU {}, {}) x{}",
            self.name, self.selected_size, self.selected_color.name, self.quantity
        )
    }
}

/// Sum of quantities.
#[must_use]
pub fn count_of(lines: &[CartLine]) -> u32 {
    lines.iter().map(|l| l.quantity).sum()
}

/// Sum of price × quantity.
#[must_use]
pub fn total_of(lines: &[CartLine]) -> Price {
    lines
        .iter()
        .map(CartLine::line_total)
        .fold(Price::zero(CurrencyCode::PKR), |acc, p| acc + p)
}

/// A transient message for the user, with an optional follow-up action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
    pub action: Option<&'static str>,
}

/// Events published by the cart store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartEvent {
    /// A product was added (new line or +1 on an existing one).
    ItemAdded { cart_id: CartLineId, notice: Notice },
    /// Lines changed; carries the recomputed derived values.
    Changed { count: u32, total: Price },
    /// All lines were removed.
    Cleared,
}

/// Session-owned cart with local persistence and change notifications.
pub struct CartStore {
    lines: Vec<CartLine>,
    storage: Arc<dyn SnapshotStore>,
    events: broadcast::Sender<CartEvent>,
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("lines", &self.lines)
            .finish_non_exhaustive()
    }
}

impl CartStore {
    /// Rehydrate the cart from local storage.
    ///
    /// Absent or corrupt snapshots yield an empty cart; this never fails.
    #[must_use]
    pub fn load(storage: Arc<dyn SnapshotStore>) -> Self {
        let lines: Vec<CartLine> = storage::load_json::<Vec<CartLine>>(storage.as_ref(), CART_KEY)
            .unwrap_or_default()
            .into_iter()
            .filter(|line| line.quantity > 0)
            .collect();
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        Self {
            lines,
            storage,
            events,
        }
    }

    /// Subscribe to cart events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<CartEvent> {
        self.events.subscribe()
    }

    /// Current lines, in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total item count (sum of quantities).
    #[must_use]
    pub fn count(&self) -> u32 {
        count_of(&self.lines)
    }

    /// Total price (sum of price × quantity).
    #[must_use]
    pub fn total(&self) -> Price {
        total_of(&self.lines)
    }

    /// Add one unit of a product variant.
    ///
    /// An unknown color hex falls back to the product's first color. Returns
    /// the key of the affected line, or `None` for a product with no colors.
    #[instrument(skip(self, product), fields(product_id = %product.id))]
    pub fn add(&mut self, product: &Product, size: u32, color_hex: &str) -> Option<CartLineId> {
        let Some(new_line) = CartLine::for_product(product, size, color_hex) else {
            tracing::warn!("Product has no colors; cannot add to cart");
            return None;
        };
        let cart_id = new_line.cart_id.clone();

        if let Some(existing) = self.lines.iter_mut().find(|l| l.cart_id == cart_id) {
            existing.quantity += 1;
        } else {
            self.lines.push(new_line);
        }

        self.publish(CartEvent::ItemAdded {
            cart_id: cart_id.clone(),
            notice: Notice {
                message: format!("Added {} to bag", product.name),
                action: Some("VIEW BAG"),
            },
        });
        self.commit();
        Some(cart_id)
    }

    /// Remove a line. Removing an absent line is a no-op.
    pub fn remove(&mut self, cart_id: &CartLineId) {
        self.lines.retain(|l| &l.cart_id != cart_id);
        self.commit();
    }

    /// Adjust a line's quantity by `delta`.
    ///
    /// If the result would be zero or negative the update is discarded and
    /// the line keeps its quantity. Returns whether the quantity changed.
    pub fn update_quantity(&mut self, cart_id: &CartLineId, delta: i64) -> bool {
        let Some(line) = self.lines.iter_mut().find(|l| &l.cart_id == cart_id) else {
            return false;
        };

        let updated = i64::from(line.quantity).saturating_add(delta);
        let applied = match u32::try_from(updated) {
            Ok(quantity) if quantity > 0 => {
                line.quantity = quantity;
                true
            }
            _ => false,
        };

        if applied {
            self.commit();
        }
        applied
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.lines.clear();
        self.publish(CartEvent::Cleared);
        self.commit();
    }

    /// Persist the snapshot and announce the new derived values.
    fn commit(&self) {
        if let Err(e) = storage::save_json(self.storage.as_ref(), CART_KEY, &self.lines) {
            tracing::warn!(error = %e, "Failed to persist cart snapshot");
        }
        self.publish(CartEvent::Changed {
            count: self.count(),
            total: self.total(),
        });
    }

    fn publish(&self, event: CartEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }
}
