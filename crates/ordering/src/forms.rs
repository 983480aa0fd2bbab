//! Form bodies posted to the upstream.
//!
//! Forms are ordered lists of pairs rather than maps because the cart form
//! repeats `selectedIds` once per selected option.

use dipper_core::{Address, Customer, PaymentMethod};
use secrecy::ExposeSecret;

use crate::error::Result;
use crate::tokens::Asap;

/// A url-encoded form body.
pub type Form = Vec<(String, String)>;

/// Fields the upstream requires on every checkout regardless of order.
const CHECKOUT_DEFAULTS: [(&str, &str); 10] = [
    ("inAuthData.siteKey", "48693e4afc6b92d9"),
    ("inAuthData.collectorURL", "www.cdn-net.com"),
    ("inAuthData.collectorFlags", "34549755"),
    ("inAuthData.enabled", "true"),
    ("deliveryToggle", "on"),
    ("orderMode", "delivery"),
    ("deviceType", "web"),
    ("payment", "online"),
    ("silverwareOptIn", "true"),
    ("smsOptIn", "true"),
];

fn push(form: &mut Form, key: &str, value: impl Into<String>) {
    form.push((key.to_owned(), value.into()));
}

/// Add-to-cart form: the CSRF token, then every selected option id in order.
#[must_use]
pub fn cart_form(csrf: &str, selected_ids: &[String]) -> Form {
    let mut form = Form::with_capacity(selected_ids.len() + 1);
    push(&mut form, "_csrf", csrf);
    for id in selected_ids {
        push(&mut form, "selectedIds", id.as_str());
    }
    form
}

/// Scraped tokens the checkout form needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutTokens {
    pub csrf: String,
    pub asap: Asap,
    pub transaction_id: String,
}

/// Checkout form for delivery to `address`.
///
/// The ASAP slot fills both the delivery and pickup fields; the upstream
/// rejects the form if either pair is missing, even in delivery mode.
#[must_use]
pub fn checkout_form(customer: &Customer, address: &Address, tokens: &CheckoutTokens) -> Form {
    let mut form: Form = CHECKOUT_DEFAULTS
        .iter()
        .map(|(key, value)| ((*key).to_owned(), (*value).to_owned()))
        .collect();
    push(&mut form, "deliveryAddress", address.to_string());
    push(&mut form, "deliveryAddress2", address.unit.as_str());
    push(&mut form, "deliveryInstructions", address.notes.as_str());
    push(&mut form, "firstName", customer.first_name.as_str());
    push(&mut form, "lastName", customer.last_name.as_str());
    push(&mut form, "contactPhone", customer.phone.as_str());
    push(&mut form, "email", customer.email.as_str());
    push(&mut form, "deliveryDate", tokens.asap.date.as_str());
    push(&mut form, "pickupDate", tokens.asap.date.as_str());
    push(&mut form, "deliveryTime", tokens.asap.time.as_str());
    push(&mut form, "pickupTime", tokens.asap.time.as_str());
    push(&mut form, "inAuthData.transactionId", tokens.transaction_id.as_str());
    push(&mut form, "_csrf", tokens.csrf.as_str());
    form
}

/// Delivery estimate form, sharing the checkout page's CSRF token.
#[must_use]
pub fn estimate_form(csrf: &str, address: &Address) -> Form {
    let mut form = Form::with_capacity(2);
    push(&mut form, "_csrf", csrf);
    push(&mut form, "deliveryAddress", address.search_query());
    form
}

/// Payment form for a validated card.
///
/// # Errors
///
/// Returns [`PaymentError::NetworkUnset`](dipper_core::PaymentError) if the
/// payment method has not been validated.
pub fn payment_form(payment: &PaymentMethod, csrf: &str) -> Result<Form> {
    let number = payment.format()?;
    let network = payment
        .network()
        .ok_or(dipper_core::PaymentError::NetworkUnset)?;

    let mut form = Form::with_capacity(10);
    push(&mut form, "paymentMethod", "creditcard");
    push(&mut form, "orderMode", "delivery");
    push(&mut form, "cardType", network.form_value());
    push(&mut form, "cardNumber", number);
    push(&mut form, "cvv", payment.cvv.expose_secret());
    push(&mut form, "expirationMonth", payment.month.as_str());
    push(&mut form, "expirationYear", payment.year.as_str());
    push(&mut form, "nameOnCard", payment.name.as_str());
    push(&mut form, "zipcode", payment.zip.as_str());
    push(&mut form, "_csrf", csrf);
    Ok(form)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::NaiveDate;
    use dipper_core::PaymentError;

    use super::*;
    use crate::error::OrderingError;

    fn value<'a>(form: &'a Form, key: &str) -> Vec<&'a str> {
        form.iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    fn address() -> Address {
        Address {
            street: "4021 Belt Line Rd".to_string(),
            unit: "Apt 12".to_string(),
            city: "Addison".to_string(),
            state: "TX".to_string(),
            zip: "75001".to_string(),
            notes: "Leave at door".to_string(),
        }
    }

    fn customer() -> Customer {
        Customer {
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
            phone: "2145550100".to_string(),
            email: "jane@example.com".to_string(),
        }
    }

    fn tokens() -> CheckoutTokens {
        CheckoutTokens {
            csrf: "csrf-1".to_string(),
            asap: Asap {
                date: "2021-03-03".to_string(),
                time: "ASAP".to_string(),
            },
            transaction_id: "txn-1".to_string(),
        }
    }

    #[test]
    fn test_cart_form_repeats_selected_ids() {
        let ids = vec!["1102".to_string(), "9011".to_string(), "2105".to_string()];
        let form = cart_form("csrf-1", &ids);
        assert_eq!(form.first().unwrap(), &("_csrf".to_string(), "csrf-1".to_string()));
        assert_eq!(value(&form, "selectedIds"), vec!["1102", "9011", "2105"]);
    }

    #[test]
    fn test_checkout_form() {
        let form = checkout_form(&customer(), &address(), &tokens());
        for (key, expected) in CHECKOUT_DEFAULTS {
            assert_eq!(value(&form, key), vec![expected], "{key}");
        }
        assert_eq!(
            value(&form, "deliveryAddress"),
            vec!["4021 Belt Line Rd, Addison, TX 75001"]
        );
        assert_eq!(value(&form, "deliveryAddress2"), vec!["Apt 12"]);
        assert_eq!(value(&form, "deliveryInstructions"), vec!["Leave at door"]);
        assert_eq!(value(&form, "contactPhone"), vec!["2145550100"]);
        assert_eq!(value(&form, "email"), vec!["jane@example.com"]);
        assert_eq!(value(&form, "deliveryDate"), vec!["2021-03-03"]);
        assert_eq!(value(&form, "pickupDate"), vec!["2021-03-03"]);
        assert_eq!(value(&form, "deliveryTime"), vec!["ASAP"]);
        assert_eq!(value(&form, "pickupTime"), vec!["ASAP"]);
        assert_eq!(value(&form, "inAuthData.transactionId"), vec!["txn-1"]);
        assert_eq!(value(&form, "_csrf"), vec!["csrf-1"]);
    }

    #[test]
    fn test_estimate_form_uses_search_query() {
        let form = estimate_form("csrf-1", &address());
        assert_eq!(
            form,
            vec![
                ("_csrf".to_string(), "csrf-1".to_string()),
                (
                    "deliveryAddress".to_string(),
                    "4021 Belt Line Rd,Addison,TX,75001".to_string()
                ),
            ]
        );
    }

    #[test]
    fn test_payment_form() {
        let mut payment =
            PaymentMethod::new("378282246310005", "1234", "12", "2030", "Jane Doe", "75001");
        payment
            .validate_at(NaiveDate::from_ymd_opt(2026, 1, 1).unwrap())
            .unwrap();
        let form = payment_form(&payment, "csrf-9").unwrap();
        assert_eq!(value(&form, "paymentMethod"), vec!["creditcard"]);
        assert_eq!(value(&form, "orderMode"), vec!["delivery"]);
        assert_eq!(value(&form, "cardType"), vec!["americanexpress"]);
        assert_eq!(value(&form, "cardNumber"), vec!["3782-822463-10005"]);
        assert_eq!(value(&form, "cvv"), vec!["1234"]);
        assert_eq!(value(&form, "expirationMonth"), vec!["12"]);
        assert_eq!(value(&form, "expirationYear"), vec!["2030"]);
        assert_eq!(value(&form, "nameOnCard"), vec!["Jane Doe"]);
        assert_eq!(value(&form, "zipcode"), vec!["75001"]);
        assert_eq!(value(&form, "_csrf"), vec!["csrf-9"]);
    }

    #[test]
    fn test_payment_form_requires_validation() {
        let payment =
            PaymentMethod::new("4111111111111111", "123", "12", "2030", "Jane Doe", "75001");
        assert!(matches!(
            payment_form(&payment, "csrf-9"),
            Err(OrderingError::Payment(PaymentError::NetworkUnset))
        ));
    }
}
