//! CLI command implementations.

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod track;

use std::sync::Arc;

use streetslipp_storefront::cart::{CartLine, CartStore};
use streetslipp_storefront::config::{ConfigError, StorefrontConfig};
use streetslipp_storefront::storage::FileStore;

/// One local storefront session: configuration plus the snapshot store
/// under `STOREFRONT_DATA_DIR`.
pub struct Session {
    pub config: StorefrontConfig,
    pub storage: Arc<FileStore>,
}

impl Session {
    /// Load configuration and open the local store.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the environment is invalid.
    pub fn open() -> Result<Self, ConfigError> {
        let config = StorefrontConfig::from_env()?;
        let storage = Arc::new(FileStore::new(&config.data_dir));
        tracing::debug!(data_dir = %storage.dir().display(), "Session opened");
        Ok(Self { config, storage })
    }

    /// Rehydrate the cart from the local snapshot.
    #[must_use]
    pub fn cart(&self) -> CartStore {
        CartStore::load(self.storage.clone())
    }
}

/// Print one row per cart line.
pub fn print_lines(lines: &[CartLine]) {
    for line in lines {
        println!(
            "  {:<28} EU {:<3} {:<16} x{:<3} {:>10}   [{}]",
            line.name,
            line.selected_size,
            line.selected_color.name,
            line.quantity,
            line.line_total().display(),
            line.cart_id,
        );
    }
}
