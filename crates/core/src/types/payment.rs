//! Credit card payment details.
//!
//! A [`PaymentMethod`] is built from caller input and must be validated before
//! use: validation is what derives its [`CardNetwork`], and the network
//! decides how the card number is grouped on the upstream payment form.

use core::fmt;

use card_validate::{Type as CardType, Validate, ValidateError};
use chrono::{Datelike, NaiveDate, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use super::error::BadRequest;

/// Errors from validating or formatting a [`PaymentMethod`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PaymentError {
    /// A card field failed validation.
    #[error(transparent)]
    Invalid(#[from] BadRequest),
    /// `format` was called before a successful `validate`.
    #[error("invalid or unset card network")]
    NetworkUnset,
}

/// Card networks the upstream accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardNetwork {
    Visa,
    Mastercard,
    Discover,
    Amex,
}

impl CardNetwork {
    /// Detect the network from the card number's issuer prefix.
    #[must_use]
    pub fn detect(number: &str) -> Option<Self> {
        Validate::evaluate_type(number)
            .ok()
            .and_then(Self::from_card_type)
    }

    /// Map a detected card type onto an accepted network. Debit variants of
    /// an accepted brand count as that brand.
    const fn from_card_type(card_type: CardType) -> Option<Self> {
        match card_type {
            CardType::Visa | CardType::VisaElectron => Some(Self::Visa),
            CardType::MasterCard => Some(Self::Mastercard),
            CardType::Discover => Some(Self::Discover),
            CardType::Amex => Some(Self::Amex),
            _ => None,
        }
    }

    /// Returns the value the upstream expects in its `cardType` field.
    #[must_use]
    pub const fn form_value(self) -> &'static str {
        match self {
            Self::Visa => "visa",
            Self::Mastercard => "mastercard",
            Self::Discover => "discover",
            Self::Amex => "americanexpress",
        }
    }

    /// Number of CVV digits printed on cards of this network.
    #[must_use]
    pub const fn cvv_len(self) -> usize {
        match self {
            Self::Amex => 4,
            Self::Visa | Self::Mastercard | Self::Discover => 3,
        }
    }
}

impl fmt::Display for CardNetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.form_value())
    }
}

/// Credit card data needed to submit an order.
///
/// The card number and CVV are kept secret and never appear in `Debug`
/// output.
#[derive(Debug, Deserialize)]
pub struct PaymentMethod {
    pub number: SecretString,
    pub cvv: SecretString,
    pub month: String,
    pub year: String,
    pub name: String,
    pub zip: String,
    #[serde(skip)]
    network: Option<CardNetwork>,
}

impl PaymentMethod {
    /// Create an unvalidated payment method.
    #[must_use]
    pub fn new(
        number: impl Into<String>,
        cvv: impl Into<String>,
        month: impl Into<String>,
        year: impl Into<String>,
        name: impl Into<String>,
        zip: impl Into<String>,
    ) -> Self {
        Self {
            number: SecretString::from(number.into()),
            cvv: SecretString::from(cvv.into()),
            month: month.into(),
            year: year.into(),
            name: name.into(),
            zip: zip.into(),
            network: None,
        }
    }

    /// The network detected by the last successful [`validate`](Self::validate).
    #[must_use]
    pub const fn network(&self) -> Option<CardNetwork> {
        self.network
    }

    /// Validate the card against today's date and record its network.
    ///
    /// # Errors
    ///
    /// See [`validate_at`](Self::validate_at).
    pub fn validate(&mut self) -> Result<CardNetwork, PaymentError> {
        self.validate_at(Utc::now().date_naive())
    }

    /// Validate the card as of `today` and record its network.
    ///
    /// # Errors
    ///
    /// Returns [`PaymentError::Invalid`] naming the first bad field: `number`
    /// (non-digits, wrong length for its network, or fails the Luhn check),
    /// `network` (not an accepted network), `cvv`, `month`, or `year`
    /// (malformed or expired).
    pub fn validate_at(&mut self, today: NaiveDate) -> Result<CardNetwork, PaymentError> {
        self.network = None;

        let card_type = match Validate::from(self.number.expose_secret()) {
            Ok(valid) => valid.card_type,
            Err(ValidateError::UnknownType) => return Err(BadRequest::new("network").into()),
            Err(_) => return Err(BadRequest::new("number").into()),
        };
        let network =
            CardNetwork::from_card_type(card_type).ok_or_else(|| BadRequest::new("network"))?;

        let cvv = self.cvv.expose_secret();
        if cvv.len() != network.cvv_len() || !cvv.chars().all(|c| c.is_ascii_digit()) {
            return Err(BadRequest::new("cvv").into());
        }

        let month = self
            .month
            .parse::<u32>()
            .ok()
            .filter(|m| (1..=12).contains(m))
            .ok_or_else(|| BadRequest::new("month"))?;

        let year = parse_year(&self.year).ok_or_else(|| BadRequest::new("year"))?;
        if (year, month) < (today.year(), today.month()) {
            return Err(BadRequest::new("year").into());
        }

        self.network = Some(network);
        Ok(network)
    }

    /// Returns the card number grouped with dashes for the upstream form:
    /// `4-4-4-rest` for Visa, Mastercard and Discover, `4-6-rest` for Amex.
    ///
    /// # Errors
    ///
    /// Returns [`PaymentError::NetworkUnset`] unless
    /// [`validate`](Self::validate) has succeeded.
    pub fn format(&self) -> Result<String, PaymentError> {
        let network = self.network.ok_or(PaymentError::NetworkUnset)?;
        format_number(self.number.expose_secret(), network)
    }
}

/// Group `digits` for `network`.
///
/// # Errors
///
/// Returns [`PaymentError::Invalid`] for `number` if `digits` is too short to
/// hold the network's fixed groups.
pub fn format_number(digits: &str, network: CardNetwork) -> Result<String, PaymentError> {
    let offsets: &[usize] = match network {
        CardNetwork::Visa | CardNetwork::Mastercard | CardNetwork::Discover => &[4, 8, 12],
        CardNetwork::Amex => &[4, 10],
    };

    let mut groups = Vec::with_capacity(offsets.len() + 1);
    let mut start = 0;
    for &end in offsets {
        let group = digits
            .get(start..end)
            .ok_or_else(|| BadRequest::new("number"))?;
        groups.push(group);
        start = end;
    }
    let rest = digits
        .get(start..)
        .filter(|rest| !rest.is_empty())
        .ok_or_else(|| BadRequest::new("number"))?;
    groups.push(rest);

    Ok(groups.join("-"))
}

/// Accepts `YY` (20YY) or `YYYY`.
fn parse_year(year: &str) -> Option<i32> {
    if !year.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let value = year.parse::<i32>().ok()?;
    match year.len() {
        2 => Some(2000 + value),
        4 => Some(value),
        _ => None,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
    }

    fn card(number: &str, cvv: &str) -> PaymentMethod {
        PaymentMethod::new(number, cvv, "08", "2027", "Jane Doe", "75001")
    }

    #[test]
    fn test_detect_networks() {
        assert_eq!(CardNetwork::detect("4111111111111111"), Some(CardNetwork::Visa));
        assert_eq!(CardNetwork::detect("5555555555554444"), Some(CardNetwork::Mastercard));
        assert_eq!(CardNetwork::detect("2223003122003222"), Some(CardNetwork::Mastercard));
        assert_eq!(CardNetwork::detect("6011111111111117"), Some(CardNetwork::Discover));
        assert_eq!(CardNetwork::detect("378282246310005"), Some(CardNetwork::Amex));
        assert_eq!(CardNetwork::detect("3530111333300000"), None);
    }

    #[test]
    fn test_detect_folds_debit_variants() {
        assert_eq!(CardNetwork::detect("4026000000000002"), Some(CardNetwork::Visa));
        assert_eq!(CardNetwork::detect("6759649826438453"), None);
    }

    #[test]
    fn test_validate_sets_network() {
        let mut pm = card("4111111111111111", "123");
        assert!(pm.network().is_none());
        assert_eq!(pm.validate_at(today()).unwrap(), CardNetwork::Visa);
        assert_eq!(pm.network(), Some(CardNetwork::Visa));
    }

    #[test]
    fn test_validate_rejects_bad_luhn() {
        let mut pm = card("4111111111111112", "123");
        assert_eq!(
            pm.validate_at(today()),
            Err(PaymentError::Invalid(BadRequest::new("number")))
        );
        assert!(pm.network().is_none());
    }

    #[test]
    fn test_validate_rejects_malformed_numbers() {
        for number in ["", "4111-1111-1111-1111", "41111111111111111", "37828224631000"] {
            let mut pm = card(number, "123");
            assert_eq!(
                pm.validate_at(today()),
                Err(PaymentError::Invalid(BadRequest::new("number"))),
                "{number}"
            );
        }
    }

    #[test]
    fn test_validate_rejects_unknown_issuer() {
        let mut pm = card("9999999999999995", "123");
        assert_eq!(
            pm.validate_at(today()),
            Err(PaymentError::Invalid(BadRequest::new("network")))
        );
    }

    #[test]
    fn test_validate_rejects_unsupported_network() {
        // Valid Luhn JCB number
        let mut pm = card("3530111333300000", "123");
        assert_eq!(
            pm.validate_at(today()),
            Err(PaymentError::Invalid(BadRequest::new("network")))
        );
    }

    #[test]
    fn test_validate_cvv_length_per_network() {
        let mut amex = card("378282246310005", "123");
        assert_eq!(
            amex.validate_at(today()),
            Err(PaymentError::Invalid(BadRequest::new("cvv")))
        );
        let mut amex = card("378282246310005", "1234");
        assert!(amex.validate_at(today()).is_ok());
    }

    #[test]
    fn test_validate_expiry() {
        let mut pm = PaymentMethod::new("4111111111111111", "123", "13", "2027", "J", "75001");
        assert_eq!(
            pm.validate_at(today()),
            Err(PaymentError::Invalid(BadRequest::new("month")))
        );

        let mut pm = PaymentMethod::new("4111111111111111", "123", "05", "2024", "J", "75001");
        assert_eq!(
            pm.validate_at(today()),
            Err(PaymentError::Invalid(BadRequest::new("year")))
        );

        // Cards are good through the end of their expiration month
        let mut pm = PaymentMethod::new("4111111111111111", "123", "06", "24", "J", "75001");
        assert!(pm.validate_at(today()).is_ok());
    }

    #[test]
    fn test_format_before_validate_fails() {
        let pm = card("4111111111111111", "123");
        assert_eq!(pm.format(), Err(PaymentError::NetworkUnset));
    }

    #[test]
    fn test_format_groups() {
        let mut visa = card("4111111111111111", "123");
        visa.validate_at(today()).unwrap();
        assert_eq!(visa.format().unwrap(), "4111-1111-1111-1111");

        let mut amex = card("378282246310005", "1234");
        amex.validate_at(today()).unwrap();
        assert_eq!(amex.format().unwrap(), "3782-822463-10005");
    }

    #[test]
    fn test_format_number_remainder() {
        assert_eq!(
            format_number("4222222222222", CardNetwork::Visa).unwrap(),
            "4222-2222-2222-2"
        );
        assert_eq!(
            format_number("6011000990139424123", CardNetwork::Discover).unwrap(),
            "6011-0009-9013-9424123"
        );
        assert!(format_number("4111", CardNetwork::Visa).is_err());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let pm = card("4111111111111111", "123");
        let debug = format!("{pm:?}");
        assert!(!debug.contains("4111111111111111"));
    }

    #[test]
    fn test_deserialize_leaves_network_unset() {
        let json = r#"{"number":"4111111111111111","cvv":"123","month":"08",
            "year":"2027","name":"Jane Doe","zip":"75001"}"#;
        let pm: PaymentMethod = serde_json::from_str(json).unwrap();
        assert!(pm.network().is_none());
        assert_eq!(pm.format(), Err(PaymentError::NetworkUnset));
    }
}
