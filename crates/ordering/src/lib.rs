//! Godipper ordering engine.
//!
//! Places Triple Dipper delivery orders on a restaurant site that has no API,
//! by driving its HTML forms the way a browser would.
//!
//! # Architecture
//!
//! - [`session`] - The protocol driver: start, set location, cart, checkout, place;
//!   plus a session-free location search
//! - [`tokens`] - Scrapes request-scoped tokens and results from pages
//! - [`forms`] - Builds the form bodies posted upstream
//! - [`html`] - Query helpers over `scraper`
//! - [`http`] - Cookie-jar scoped `reqwest` client and endpoint paths
//! - [`config`] - Base URL, timeout, and user agent, from the environment
//! - [`error`] - Error taxonomy shared by every step
//!
//! ```no_run
//! use dipper_core::{Address, Customer, PaymentMethod, TripleDipper};
//! use dipper_ordering::{OrderingConfig, Session};
//!
//! # async fn run(
//! #     address: Address,
//! #     order: TripleDipper,
//! #     customer: Customer,
//! #     mut card: PaymentMethod,
//! # ) -> Result<(), dipper_ordering::OrderingError> {
//! let config = OrderingConfig::default();
//! let mut session = Session::start(&config).await?;
//! session.set_location(&address).await?;
//! session.cart(&order).await?;
//! let info = session.checkout(&customer, &address).await?;
//! println!("total {} arriving {}", info.total(), info.delivery_time);
//! let location = session.place(&mut card).await?;
//! println!("placed with {}", location.name);
//! # Ok(())
//! # }
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod forms;
pub mod html;
pub mod http;
pub mod session;
pub mod tokens;

pub use config::{ConfigError, OrderingConfig};
pub use error::{ErrorKind, OrderingError, Result};
pub use session::{Session, SessionState, find_locations};
