//! Delivery address.

use core::fmt;

use serde::{Deserialize, Serialize};

/// A United States address that can receive deliveries.
///
/// `unit` and `notes` are optional and may be empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Address {
    pub street: String,
    #[serde(default)]
    pub unit: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    #[serde(default)]
    pub notes: String,
}

impl Address {
    /// Returns the comma-joined form the upstream expects for location
    /// searches and delivery estimates (e.g. `123 Main St,Dallas,TX,75201`).
    #[must_use]
    pub fn search_query(&self) -> String {
        [
            self.street.as_str(),
            self.city.as_str(),
            self.state.as_str(),
            self.zip.as_str(),
        ]
        .join(",")
    }
}

/// Human-readable form without the unit: `street, city, state zip`.
impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}, {}, {} {}",
            self.street, self.city, self.state, self.zip
        )
    }
}
