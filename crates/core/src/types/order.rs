//! Order totals and the fulfilling location.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Totals and delivery estimate scraped during checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderInfo {
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub delivery_fee: Decimal,
    pub service_charge: Decimal,
    /// Delivery estimate exactly as the upstream reported it.
    pub delivery_time: String,
}

impl OrderInfo {
    /// Sum of subtotal, tax, delivery fee and service charge.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.subtotal + self.tax + self.delivery_fee + self.service_charge
    }

    /// The delivery estimate as a timestamp, if it is RFC 3339.
    #[must_use]
    pub fn delivery_time_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.delivery_time)
            .ok()
            .map(|t| t.with_timezone(&Utc))
    }
}

/// Parse a displayed dollar amount such as `$1,013.19`.
#[must_use]
pub fn parse_amount(text: &str) -> Option<Decimal> {
    let cleaned: String = text
        .trim()
        .trim_start_matches('$')
        .chars()
        .filter(|c| *c != ',')
        .collect();
    Decimal::from_str(&cleaned).ok()
}

/// A restaurant location.
///
/// Only `name` is guaranteed; the other fields are filled on a best-effort
/// basis and may be empty.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub id: String,
    pub name: String,
    pub street_address: String,
    pub locality: String,
    pub region: String,
    pub postal_code: String,
    pub delivery: bool,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn info() -> OrderInfo {
        OrderInfo {
            subtotal: Decimal::new(4047, 2),
            tax: Decimal::new(243, 2),
            delivery_fee: Decimal::new(499, 2),
            service_charge: Decimal::new(150, 2),
            delivery_time: "2021-03-03T21:42:26.730000Z".to_string(),
        }
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("$13.19"), Some(Decimal::new(1319, 2)));
        assert_eq!(parse_amount("  $0.93\n"), Some(Decimal::new(93, 2)));
        assert_eq!(parse_amount("$1,013.19"), Some(Decimal::new(101319, 2)));
        assert_eq!(parse_amount("FREE"), None);
        assert_eq!(parse_amount(""), None);
    }

    #[test]
    fn test_total() {
        assert_eq!(info().total(), Decimal::new(4939, 2));
    }

    #[test]
    fn test_delivery_time_utc() {
        let t = info().delivery_time_utc().unwrap();
        assert_eq!(t.format("%Y-%m-%d %H:%M:%S").to_string(), "2021-03-03 21:42:26");

        let mut bad = info();
        bad.delivery_time = "soon".to_string();
        assert!(bad.delivery_time_utc().is_none());
    }
}
