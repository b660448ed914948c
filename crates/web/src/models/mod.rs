//! Domain models for the cafe site.
//!
//! Row types live next to their repositories in `db`; these are the validated
//! domain objects handlers and templates work with.

pub mod customer;
pub mod menu;
pub mod order;
pub mod owner;
pub mod reservation;
pub mod session;

pub use customer::{Customer, CustomerSummary};
pub use menu::{MenuItem, MenuItemInput};
pub use order::{DashboardStats, Order, OrderItem};
pub use owner::{NewOwner, Owner};
pub use reservation::{NewReservation, Reservation};
pub use session::{CurrentCustomer, CurrentOwner, keys as session_keys};
