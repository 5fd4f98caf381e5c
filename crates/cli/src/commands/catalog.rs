//! Catalog and city lookup commands.

use streetslipp_storefront::{catalog, shipping};

/// List catalog products.
pub fn products(trending_only: bool) {
    let products: Vec<_> = if trending_only {
        catalog::trending().collect()
    } else {
        catalog::all_products().iter().collect()
    };

    for product in products {
        let badge = if product.is_new {
            " [NEW]"
        } else if product.is_hot {
            " [HOT]"
        } else {
            ""
        };
        let was = product
            .original_price
            .map(|price| format!(" (was {price})"))
            .unwrap_or_default();
        let colors = product
            .colors
            .iter()
            .map(|color| format!("{} {}", color.name, color.hex))
            .collect::<Vec<_>>()
            .join(", ");
        let sizes = product
            .sizes
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("/");

        println!("{}{badge}", product.name);
        println!("  id: {}  price: {}{was}", product.id, product.price);
        println!("  colors: {colors}  sizes: EU {sizes}");
    }
}

/// List serviceable cities, optionally filtered.
pub fn cities(term: Option<&str>) {
    let matches: Vec<_> = shipping::search_cities(term.unwrap_or_default()).collect();
    if matches.is_empty() {
        println!("No matching cities. Choose \"Other\" and spell out the city in the address.");
        return;
    }
    for city in matches {
        println!("{city}");
    }
}
