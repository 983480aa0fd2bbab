//! Client-facing error kinds.
//!
//! [`BadRequest`] is analogous to an HTTP 400: the caller supplied input that
//! can be rejected locally. [`Forbidden`] is analogous to an HTTP 403: the
//! input was well formed but the upstream's business rules turned it down, so
//! the same input may succeed against another location or at another time.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Locally detectable invalid input.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("invalid {field}")]
pub struct BadRequest {
    /// Name of the offending field (e.g. `phone`, `dipper 2`).
    pub field: String,
}

impl BadRequest {
    /// Create an error for the given field.
    #[must_use]
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
        }
    }
}

/// Why the upstream refused a well-formed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForbiddenReason {
    /// The location search returned no results.
    NoLocationsInProximity,
    /// The nearest location has no online ordering.
    NotAcceptingOnlineOrders,
    /// The nearest location does not offer delivery.
    NoDelivery,
    /// The delivery address is outside the delivery radius.
    OutOfRange,
}

impl ForbiddenReason {
    /// Returns the human-readable reason.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NoLocationsInProximity => "no locations in proximity",
            Self::NotAcceptingOnlineOrders => "location is not accepting online orders",
            Self::NoDelivery => "location doesn't deliver",
            Self::OutOfRange => "address is out of range",
        }
    }
}

impl fmt::Display for ForbiddenReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A well-formed request rejected by upstream business rules.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[error("{reason}")]
pub struct Forbidden {
    /// Why the request was refused.
    pub reason: ForbiddenReason,
}

impl From<ForbiddenReason> for Forbidden {
    fn from(reason: ForbiddenReason) -> Self {
        Self { reason }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bad_request_display() {
        assert_eq!(BadRequest::new("phone").to_string(), "invalid phone");
        assert_eq!(BadRequest::new("dipper 2").to_string(), "invalid dipper 2");
    }

    #[test]
    fn test_forbidden_display() {
        let err = Forbidden::from(ForbiddenReason::NotAcceptingOnlineOrders);
        assert_eq!(err.to_string(), "location is not accepting online orders");
        assert_eq!(
            Forbidden::from(ForbiddenReason::OutOfRange).to_string(),
            "address is out of range"
        );
    }
}
