//! Shipping form and serviceable cities.

use serde::{Deserialize, Serialize};

use crate::storage::{self, SHIPPING_INFO_KEY, SnapshotStore};

/// City preselected on a fresh form.
pub const DEFAULT_CITY: &str = "Lahore";

/// Cities the courier delivers to, in the order the checkout lists them.
pub const CITIES: &[&str] = &[
    "Lahore", "Karachi", "Islamabad", "Rawalpindi", "Sukkur", "Kasur", "Sheikhupura", "Peshawar",
    "Quetta", "Hyderabad", "Sahiwal", "Multan", "Sargodha", "Sialkot", "Gujranwala", "Jhelum",
    "Mirpur (AJK)", "Abbottabad", "Bahawalpur", "Faisalabad", "Dera Ismail Khan", "Gwadar",
    "Turbat", "Dera Ghazi Khan", "Hafizabad", "Mandi Bahauddin", "Phool Nagar", "Rahim Yar Khan",
    "Okara", "Sadiqabad", "Mianwali", "Layyah", "Depalpur", "Toba Tek Singh", "Vehari",
    "Lala Musa", "Kohat", "Bagh (AJK)", "Gujrat", "Kot Addu", "Hassan Abdal", "Attock",
    "Wah Cantt", "Gilgit", "Jaranwala", "Bahawalnagar", "Fort Abbas", "Mian Channu", "Gojra",
    "Gujar Khan", "Bhai Pheru", "Jhang", "Mirpur Khas", "Muridke", "Muzaffargarh", "Tank",
    "Khanewal", "Shakargarh", "Pind Dadan Khan", "Narowal", "Murree", "Pakpattan", "Bhakkar",
    "Rawalakot (AJK)", "Burewala", "Kamoke", "Hattar", "Khanpur", "Chichawatni", "Haripur",
    "Nawabshah", "Swabi", "Chakwal", "Muzaffarabad (AJK)", "Deharki", "Mardan", "Tandliawala",
    "Nowshera", "Haroonabad", "Jacobabad", "Shikarpur", "Larkana", "Kamalia", "Kharian",
    "Ghotki", "Thatta", "Bannu", "Nankana Sahib", "Khushab", "Kotli (AJK)", "Other",
];

/// Case-insensitive substring search over [`CITIES`].
pub fn search_cities(term: &str) -> impl Iterator<Item = &'static str> + '_ {
    let needle = term.trim().to_lowercase();
    CITIES
        .iter()
        .copied()
        .filter(move |city| city.to_lowercase().contains(&needle))
}

/// Contact and delivery details entered at checkout.
///
/// Saved locally after every submission so the next checkout is prefilled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShippingForm {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    /// Courier expects `03XXXXXXXXX`.
    pub phone: String,
    pub address: String,
    pub city: String,
}

impl Default for ShippingForm {
    fn default() -> Self {
        Self {
            email: String::new(),
            first_name: String::new(),
            last_name: String::new(),
            phone: String::new(),
            address: String::new(),
            city: DEFAULT_CITY.to_string(),
        }
    }
}

impl ShippingForm {
    /// The saved form, or a blank one with the default city.
    #[must_use]
    pub fn load_saved(store: &dyn SnapshotStore) -> Self {
        storage::load_json(store, SHIPPING_INFO_KEY).unwrap_or_default()
    }

    /// Save for prefill. Failures are logged and otherwise ignored.
    pub fn save(&self, store: &dyn SnapshotStore) {
        if let Err(e) = storage::save_json(store, SHIPPING_INFO_KEY, self) {
            tracing::debug!(error = %e, "Failed to save shipping form");
        }
    }

    /// `"{first} {last}"`.
    #[must_use]
    pub fn customer_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
            .trim()
            .to_string()
    }

    /// `"{address}, {city}"`.
    #[must_use]
    pub fn delivery_address(&self) -> String {
        format!("{}, {}", self.address.trim(), self.city.trim())
    }

    /// Names of required fields that are still blank.
    ///
    /// The email is optional; everything the courier needs is not.
    #[must_use]
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("first_name", &self.first_name),
            ("last_name", &self.last_name),
            ("phone", &self.phone),
            ("address", &self.address),
            ("city", &self.city),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }
}
