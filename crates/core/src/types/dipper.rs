//! Dippers and Triple Dippers.

use serde::{Deserialize, Serialize};

use super::catalog::{Extra, Item};
use super::error::BadRequest;

/// One slot of a Triple Dipper: an item and its extras.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dipper {
    pub item: Item,
    #[serde(default)]
    pub extras: Vec<Extra>,
}

impl Dipper {
    /// Create a dipper.
    #[must_use]
    pub const fn new(item: Item, extras: Vec<Extra>) -> Self {
        Self { item, extras }
    }

    /// Returns true if every extra is permitted for the dipper's item.
    #[must_use]
    pub fn is_permitted(&self) -> bool {
        self.extras.iter().all(|extra| self.item.permits(*extra))
    }
}

/// A Triple Dipper cart entry: exactly three dippers.
///
/// Dipper `n` fills selection `n` on the upstream product page, so order
/// matters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripleDipper {
    pub dippers: [Dipper; 3],
}

impl TripleDipper {
    /// Create a Triple Dipper from its three dippers.
    #[must_use]
    pub const fn new(dippers: [Dipper; 3]) -> Self {
        Self { dippers }
    }

    /// Verify every dipper's extras against the catalog.
    ///
    /// # Errors
    ///
    /// Returns [`BadRequest`] naming the first offending slot, 1-based
    /// (e.g. `dipper 2`).
    pub fn check(&self) -> Result<(), BadRequest> {
        match self.dippers.iter().position(|d| !d.is_permitted()) {
            Some(index) => Err(BadRequest::new(format!("dipper {}", index + 1))),
            None => Ok(()),
        }
    }
}
