//! Static product catalog.
//!
//! The storefront sells a small fixed range, so the catalog is compiled in
//! rather than fetched.

use std::sync::LazyLock;

use streetslipp_core::{Category, Price, Product, ProductColor};

/// EU sizes stocked for every launch product.
const LAUNCH_SIZES: [u32; 4] = [7, 8, 9, 10];

const SLIDE_COPY: &str = "LAUNCH SPECIAL: Street-ready aesthetic with a classic vibe. Featuring a soft foam strap and responsive footbed for maximum daily comfort and drip.";

static ALL_PRODUCTS: LazyLock<Vec<Product>> = LazyLock::new(|| {
    vec![
        Product {
            is_new: true,
            ..launch_product(
                "apex-drift",
                "Apex Drift",
                (2080, 2600),
                ProductColor::new("Stealth Red", "#FF0000"),
                ["/images/fleet-red.jpg", "/images/fleet-red2.jpg"],
                "OFFICIAL DROP: The Apex Drift. Deep black core with high-visibility red 3D embossed branding. Engineered for the ultimate street flex with dual-density cloud foam technology.",
            )
        },
        Product {
            is_hot: true,
            ..launch_product(
                "vortex-shadow",
                "Vortex Shadow",
                (2250, 2800),
                ProductColor::new("Core Blue", "#0000FF"),
                ["/images/phantom-blue.jpg", "/images/phantom-blue2.jpg"],
                "ELITE DROP: The Vortex Shadow in our exclusive 'Core Blue'. A singular, deep blue core powered by 'Blue-Cloud' foam for 24/7 comfort.",
            )
        },
        launch_product(
            "neon-wave",
            "Neon Wave Slide",
            (2160, 2700),
            ProductColor::new("Black & White", "#000000"),
            [
                "/images/nike-street-black.jpg",
                "/images/nike-street-black2.jpg",
            ],
            SLIDE_COPY,
        ),
        launch_product(
            "onyx-prime",
            "Onyx Prime",
            (2000, 2500),
            ProductColor::new("Core Black", "#000000"),
            ["/images/adidas-black.jpg", "/images/adidas-black2.jpg"],
            "LAUNCH SPECIAL: The minimalist legend. Sleek, black, and purely functional.",
        ),
        launch_product(
            "neon-wave-electric",
            "Neon Wave Slide",
            (2160, 2700),
            ProductColor::new("Electric Green", "#00FF00"),
            [
                "/images/nike-street-green.jpg",
                "/images/nike-street-green2.jpg",
            ],
            SLIDE_COPY,
        ),
    ]
});

fn launch_product(
    id: &str,
    name: &str,
    (price, original): (i64, i64),
    color: ProductColor,
    images: [&str; 2],
    description: &str,
) -> Product {
    Product {
        id: id.to_string(),
        name: name.to_string(),
        price: Price::pkr(price),
        original_price: Some(Price::pkr(original)),
        category: Category::Men,
        colors: vec![color],
        sizes: LAUNCH_SIZES.to_vec(),
        images: images.iter().map(ToString::to_string).collect(),
        description: description.to_string(),
        is_new: false,
        is_hot: false,
    }
}

/// All catalog products in display order.
#[must_use]
pub fn all_products() -> &'static [Product] {
    &ALL_PRODUCTS
}

/// Look up a product by id.
#[must_use]
pub fn find_product(id: &str) -> Option<&'static Product> {
    ALL_PRODUCTS.iter().find(|p| p.id == id)
}

/// Products featured on the landing page.
pub fn trending() -> impl Iterator<Item = &'static Product> {
    ALL_PRODUCTS.iter().filter(|p| p.is_new || p.is_hot)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_invariants() {
        assert_eq!(all_products().len(), 5);
        for product in all_products() {
            assert!(!product.colors.is_empty(), "{} has no colors", product.id);
            assert!(product.primary_image().is_some(), "{} has no image", product.id);
        }
    }

    #[test]
    fn test_find_product() {
        let apex = find_product("apex-drift").expect("apex drift is listed");
        assert_eq!(apex.price, Price::pkr(2080));
        assert!(find_product("air-max").is_none());
    }

    #[test]
    fn test_trending() {
        let ids: Vec<_> = trending().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["apex-drift", "vortex-shadow"]);
    }
}
