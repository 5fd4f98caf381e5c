//! Newtype identifiers for orders, shipments, and cart lines.
//!
//! Use the `define_string_id!` macro to create type-safe wrappers that prevent
//! accidentally passing a tracking number where an order reference is expected.

use rand::Rng;
use thiserror::Error;

/// Macro to define a type-safe string identifier.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`
/// - `as_str()`, `into_inner()`, `Display` and `AsRef<str>`
///
/// Construction is left to each type so that it can enforce its own format.
///
/// # Example
///
/// ```rust
/// # use streetslipp_core::define_string_id;
/// define_string_id!(WaybillId);
///
/// impl WaybillId {
///     pub fn new(raw: &str) -> Self {
///         Self(raw.to_owned())
///     }
/// }
///
/// assert_eq!(WaybillId::new("W-1").as_str(), "W-1");
/// ```
#[macro_export]
macro_rules! define_string_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Borrow the identifier as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the identifier and return the inner string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_string_id!(OrderReference);
define_string_id!(TrackingNumber);
define_string_id!(CartLineId);

/// Errors that can occur when parsing identifiers.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReferenceError {
    /// The order reference prefix is empty or not uppercase alphanumeric.
    #[error("order reference prefix must be non-empty uppercase alphanumerics, got {0:?}")]
    InvalidPrefix(String),

    /// The input is not `PREFIX-NNNNNN`.
    #[error("malformed order reference: {0:?}")]
    Malformed(String),

    /// The tracking number is empty or whitespace-only.
    #[error("tracking number cannot be blank")]
    BlankTrackingNumber,
}

impl OrderReference {
    /// Default prefix used when none is configured.
    pub const DEFAULT_PREFIX: &'static str = "STSLIP";

    /// Smallest random suffix (always six digits).
    const SUFFIX_MIN: u32 = 100_000;

    /// One past the largest random suffix.
    const SUFFIX_END: u32 = 1_000_000;

    /// Generate a fresh reference of the form `PREFIX-NNNNNN`.
    ///
    /// No uniqueness check is made against earlier orders.
    ///
    /// # Errors
    ///
    /// Returns `ReferenceError::InvalidPrefix` if the prefix is not a
    /// non-empty run of uppercase ASCII letters and digits.
    pub fn generate<R: Rng>(prefix: &str, rng: &mut R) -> Result<Self, ReferenceError> {
        validate_prefix(prefix)?;
        let suffix = rng.random_range(Self::SUFFIX_MIN..Self::SUFFIX_END);
        Ok(Self(format!("{prefix}-{suffix}")))
    }

    /// Parse an existing reference, such as the one echoed back in a
    /// courier status push.
    ///
    /// # Errors
    ///
    /// Returns `ReferenceError::Malformed` unless the input is an uppercase
    /// alphanumeric prefix, a dash, and exactly six digits.
    pub fn parse(s: &str) -> Result<Self, ReferenceError> {
        let malformed = || ReferenceError::Malformed(s.to_owned());
        let (prefix, suffix) = s.rsplit_once('-').ok_or_else(malformed)?;

        validate_prefix(prefix).map_err(|_| malformed())?;
        if suffix.len() != 6 || !suffix.bytes().all(|b| b.is_ascii_digit()) {
            return Err(malformed());
        }

        Ok(Self(s.to_owned()))
    }
}

/// Check that an order reference prefix is usable.
///
/// # Errors
///
/// Returns `ReferenceError::InvalidPrefix` for empty or non-uppercase input.
pub fn validate_prefix(prefix: &str) -> Result<(), ReferenceError> {
    let valid = !prefix.is_empty()
        && prefix
            .bytes()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit());
    if valid {
        Ok(())
    } else {
        Err(ReferenceError::InvalidPrefix(prefix.to_owned()))
    }
}

impl TrackingNumber {
    /// Wrap a courier-issued tracking number.
    ///
    /// The value is kept verbatim; only blank input is rejected.
    ///
    /// # Errors
    ///
    /// Returns `ReferenceError::BlankTrackingNumber` for empty or
    /// whitespace-only input.
    pub fn parse(s: &str) -> Result<Self, ReferenceError> {
        if s.trim().is_empty() {
            return Err(ReferenceError::BlankTrackingNumber);
        }
        Ok(Self(s.to_owned()))
    }
}

impl CartLineId {
    /// Build the composite cart key for a product, size, and color.
    #[must_use]
    pub fn compose(product_id: &str, size: u32, color_hex: &str) -> Self {
        Self(format!("{product_id}-{size}-{color_hex}"))
    }

    /// Wrap a key previously produced by [`CartLineId::compose`].
    #[must_use]
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }
}
