//! Cart commands.
//!
//! # Usage
//!
//! ```bash
//! streetslipp cart add apex-drift --size 9 --color "#FF0000"
//! streetslipp cart qty apex-drift-9-#FF0000 -1
//! streetslipp cart show
//! ```

use streetslipp_core::{CartLineId, Product};
use streetslipp_storefront::cart::{CartEvent, CartStore};
use streetslipp_storefront::catalog;
use thiserror::Error;

use super::print_lines;

/// Errors that can occur during cart commands.
#[derive(Debug, Error)]
pub enum CartCommandError {
    /// No catalog product with this id.
    #[error("Unknown product: {0}")]
    UnknownProduct(String),

    /// Product is not stocked in this size.
    #[error("{product} is not available in EU {size} (sizes: {available})")]
    UnavailableSize {
        product: String,
        size: u32,
        available: String,
    },

    /// Product has no color variants to add.
    #[error("{0} cannot be added to the bag")]
    NotPurchasable(String),

    /// No line with this key in the cart.
    #[error("No cart line {0}")]
    UnknownLine(String),
}

/// Resolve a catalog product and check the requested size.
///
/// # Errors
///
/// Returns error if the product does not exist or lacks the size.
pub fn resolve_variant(
    product_id: &str,
    size: u32,
) -> Result<&'static Product, CartCommandError> {
    let product = catalog::find_product(product_id)
        .ok_or_else(|| CartCommandError::UnknownProduct(product_id.to_owned()))?;

    if !product.has_size(size) {
        return Err(CartCommandError::UnavailableSize {
            product: product.name.clone(),
            size,
            available: product
                .sizes
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", "),
        });
    }
    Ok(product)
}

/// Print the cart.
pub fn show(cart: &CartStore) {
    if cart.is_empty() {
        println!("Your bag is empty.");
        return;
    }
    print_lines(cart.lines());
    println!();
    println!("  {} item(s), total {}", cart.count(), cart.total());
}

/// Add one unit of a product variant.
///
/// Without a color the product's first color is used.
///
/// # Errors
///
/// Returns error if the product or size is unknown.
pub fn add(
    cart: &mut CartStore,
    product_id: &str,
    size: u32,
    color: Option<&str>,
) -> Result<(), CartCommandError> {
    let product = resolve_variant(product_id, size)?;
    let mut events = cart.subscribe();

    cart.add(product, size, color.unwrap_or_default())
        .ok_or_else(|| CartCommandError::NotPurchasable(product.name.clone()))?;

    while let Ok(event) = events.try_recv() {
        match event {
            CartEvent::ItemAdded { notice, .. } => match notice.action {
                Some(action) => println!("{}  [{action}: streetslipp cart show]", notice.message),
                None => println!("{}", notice.message),
            },
            CartEvent::Changed { count, total } => println!("Bag: {count} item(s), {total}"),
            CartEvent::Cleared => {}
        }
    }
    Ok(())
}

/// Delete a line.
pub fn remove(cart: &mut CartStore, cart_id: &str) {
    cart.remove(&CartLineId::from_raw(cart_id));
    println!("Removed {cart_id}");
}

/// Change a line's quantity by `delta`.
///
/// # Errors
///
/// Returns error if no line has this key.
pub fn update_quantity(
    cart: &mut CartStore,
    cart_id: &str,
    delta: i64,
) -> Result<(), CartCommandError> {
    let id = CartLineId::from_raw(cart_id);
    if !cart.lines().iter().any(|line| line.cart_id == id) {
        return Err(CartCommandError::UnknownLine(cart_id.to_owned()));
    }

    if cart.update_quantity(&id, delta) {
        show(cart);
    } else {
        println!("Quantity unchanged; use `streetslipp cart remove {cart_id}` to delete the line.");
    }
    Ok(())
}

/// Empty the cart.
pub fn clear(cart: &mut CartStore) {
    cart.clear();
    println!("Bag cleared.");
}
