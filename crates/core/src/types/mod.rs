//! Core types for the ordering engine.
//!
//! Value objects the engine consumes (address, customer, payment method,
//! Triple Dippers), the static menu catalog, and the values it produces
//! (order totals, fulfilling location).

pub mod address;
pub mod catalog;
pub mod customer;
pub mod dipper;
pub mod error;
pub mod order;
pub mod payment;

pub use address::Address;
pub use catalog::{Extra, Item};
pub use customer::{Customer, is_valid_email, is_valid_phone};
pub use dipper::{Dipper, TripleDipper};
pub use error::{BadRequest, Forbidden, ForbiddenReason};
pub use order::{Location, OrderInfo, parse_amount};
pub use payment::{CardNetwork, PaymentError, PaymentMethod, format_number};
