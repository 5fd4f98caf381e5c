//! StreetSlipp storefront library.
//!
//! Cart, checkout, courier tracking and the courier webhook receiver. The
//! `streetslipp-storefront` binary serves the HTTP side; the CLI drives the
//! cart and checkout against a local snapshot store.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod config;
pub mod courier;
pub mod error;
pub mod routes;
pub mod services;
pub mod shipping;
pub mod state;
pub mod storage;

use axum::Router;

use crate::state::AppState;

/// Build the storefront router with its state applied.
pub fn app(state: AppState) -> Router {
    routes::routes().with_state(state)
}
