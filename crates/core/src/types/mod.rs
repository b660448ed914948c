//! Core types for the cafe.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod phone;
pub mod price;
pub mod role;
pub mod status;

pub use email::{Email, EmailError};
pub use id::*;
pub use phone::{Phone, PhoneError};
pub use price::{MAX_PRICE, PriceError, format_money, parse_price, round_cents};
pub use role::{OwnerRole, has_permission};
pub use status::*;
