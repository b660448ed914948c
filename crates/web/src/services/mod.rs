//! Business logic services.
//!
//! # Services
//!
//! - `auth` - Customer registration and login, owner login and accounts
//! - `cart` - Adding catalog items to the session cart
//! - `checkout` - Checkout form validation and order placement
//! - `menu` - Back-office menu item form
//! - `orders` - Order status lifecycle
//! - `reservations` - Table booking
//! - `tokens` - Single-use form tokens
//! - `validation` - Shared field rules

pub mod auth;
pub mod cart;
pub mod checkout;
pub mod menu;
pub mod orders;
pub mod reservations;
pub mod tokens;
pub mod validation;
