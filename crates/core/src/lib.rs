//! StreetSlipp Core - Shared types library.
//!
//! This crate provides the domain types used by every StreetSlipp component:
//! - `storefront` - Cart store, checkout coordinator, tracking, webhook server
//! - `cli` - Single-user storefront session driven from the terminal
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients, no storage. This keeps it lightweight and allows it to be used
//! anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtypes for order references, tracking numbers, cart keys,
//!   prices, emails, products, and shipment states

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
