//! Customer contact details submitted at checkout.

use serde::{Deserialize, Serialize};

use super::error::BadRequest;

/// The person the order is delivered to.
///
/// ## Constraints
///
/// - `phone` is exactly 10 ASCII digits, no separators
/// - `email` contains at least one `@` (the upstream checks nothing more)
///
/// ## Examples
///
/// ```
/// use dipper_core::Customer;
///
/// let customer = Customer {
///     first_name: "Jane".to_string(),
///     last_name: "Doe".to_string(),
///     phone: "2145550100".to_string(),
///     email: "jane@example.com".to_string(),
/// };
/// assert!(customer.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub email: String,
}

impl Customer {
    /// Check the phone and email rules.
    ///
    /// # Errors
    ///
    /// Returns [`BadRequest`] for `phone` or `email`, phone first.
    pub fn validate(&self) -> Result<(), BadRequest> {
        if !is_valid_phone(&self.phone) {
            return Err(BadRequest::new("phone"));
        }
        if !is_valid_email(&self.email) {
            return Err(BadRequest::new("email"));
        }
        Ok(())
    }
}

/// Returns true if `phone` is exactly 10 ASCII digits.
#[must_use]
pub fn is_valid_phone(phone: &str) -> bool {
    phone.chars().count() == 10 && phone.chars().all(|c| c.is_ascii_digit())
}

/// Returns true if `email` contains an `@`.
#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    email.contains('@')
}
