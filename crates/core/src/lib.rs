//! Cafe Core - Shared domain library.
//!
//! This crate provides the types and pure logic used across the cafe components:
//! - `web` - Public ordering site and the `/admin` back office
//! - `cli` - Command-line tools for migrations and management
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP. The session cart, checkout pricing and order drafting live
//! here so they can be tested without a running server.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for ids, emails, phones, money, roles and statuses
//! - [`cart`] - The session-held shopping cart
//! - [`pricing`] - Checkout tax and delivery fee computation
//! - [`order`] - Order line snapshots and the draft persisted at checkout

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod order;
pub mod pricing;
pub mod types;

pub use cart::{Cart, CartEntry, CartError, MAX_LINE_QUANTITY};
pub use order::{CheckoutDetails, OrderDraft, OrderDraftError, OrderLineSnapshot};
pub use pricing::{CheckoutTotals, PricingConfig};
pub use types::*;
