//! Godipper Core - Shared types library.
//!
//! This crate provides the types shared by the ordering engine and its
//! callers:
//! - `ordering` - Drives the upstream restaurant site's order forms
//! - `cli` - Command-line front end for placing orders
//!
//! # Architecture
//!
//! The core crate contains only types and validation rules - no I/O, no HTTP
//! clients, no HTML parsing. Persistence layers can build these values from
//! stored rows and hand them to the engine.
//!
//! # Modules
//!
//! - [`types`] - Catalog, dippers, address, customer, payment method, order info

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
