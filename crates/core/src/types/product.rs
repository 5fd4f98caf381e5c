//! Catalog product types.

use serde::{Deserialize, Serialize};

use super::price::Price;

/// Which collection a product is listed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Men,
    Women,
}

/// A named colorway, identified by its hex code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProductColor {
    pub name: String,
    pub hex: String,
}

impl ProductColor {
    #[must_use]
    pub fn new(name: impl Into<String>, hex: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            hex: hex.into(),
        }
    }
}

/// A product in the static catalog.
///
/// Every catalog product has at least one color and one image; the cart
/// relies on that for its fallbacks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    pub price: Price,
    /// Pre-discount price shown struck through.
    pub original_price: Option<Price>,
    pub category: Category,
    pub colors: Vec<ProductColor>,
    /// EU sizes.
    pub sizes: Vec<u32>,
    pub images: Vec<String>,
    pub description: String,
    #[serde(default)]
    pub is_new: bool,
    #[serde(default)]
    pub is_hot: bool,
}

impl Product {
    /// Resolve a color by hex code, falling back to the first listed color.
    ///
    /// Hex codes match case-insensitively on purpose, so `#ff0000` selects
    /// `#FF0000`. An unknown hex is not an error: the storefront silently
    /// substitutes the default colorway. Returns `None` only for a product
    /// with no colors.
    #[must_use]
    pub fn color_or_default(&self, hex: &str) -> Option<&ProductColor> {
        self.colors
            .iter()
            .find(|c| c.hex.eq_ignore_ascii_case(hex))
            .or_else(|| self.colors.first())
    }

    /// The image used as the cart snapshot.
    #[must_use]
    pub fn primary_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }

    /// Whether the product is offered in the given EU size.
    #[must_use]
    pub fn has_size(&self, size: u32) -> bool {
        self.sizes.contains(&size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slide() -> Product {
        Product {
            id: "neon-wave".to_string(),
            name: "Neon Wave Slide".to_string(),
            price: Price::pkr(2160),
            original_price: Some(Price::pkr(2700)),
            category: Category::Men,
            colors: vec![
                ProductColor::new("Black & White", "#000000"),
                ProductColor::new("Electric Green", "#00FF00"),
            ],
            sizes: vec![7, 8, 9, 10],
            images: vec!["/images/nike-street-black.jpg".to_string()],
            description: String::new(),
            is_new: false,
            is_hot: false,
        }
    }

    #[test]
    fn test_color_lookup() {
        let product = slide();
        assert_eq!(
            product.color_or_default("#00ff00").map(|c| c.name.as_str()),
            Some("Electric Green")
        );
    }

    #[test]
    fn test_unknown_color_falls_back_to_first() {
        let product = slide();
        assert_eq!(
            product.color_or_default("#123456").map(|c| c.name.as_str()),
            Some("Black & White")
        );
    }

    #[test]
    fn test_sizes() {
        let product = slide();
        assert!(product.has_size(9));
        assert!(!product.has_size(12));
    }
}
