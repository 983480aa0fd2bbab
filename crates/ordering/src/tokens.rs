//! Token extraction from upstream pages.
//!
//! Every state-mutating POST the upstream accepts carries values scraped from
//! the page fetched immediately before it: a CSRF token, option ids for menu
//! selections, the ASAP delivery slot, a fraud-check transaction id. These are
//! request-scoped, so they are extracted from a freshly parsed document each
//! time and never cached.
//!
//! Functions taking an [`Html`] read a parsed page; functions taking `&str`
//! read a JSON response body.

use dipper_core::{Extra, ForbiddenReason, Item, Location, OrderInfo, parse_amount};
use rust_decimal::Decimal;
use scraper::{ElementRef, Html};
use serde::Deserialize;
use serde_json::Value;

use crate::error::{OrderingError, Result};
use crate::html::{
    Query, attr_of, child_elements, find_all, find_one, first_child_element, inner_text,
    optional_text, parent_element, select_attr, select_text,
};

/// The first delivery slot offered, which the upstream labels ASAP.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asap {
    pub date: String,
    pub time: String,
}

/// Amounts shown on the checkout page, before the delivery estimate is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Totals {
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub delivery_fee: Decimal,
    pub service_charge: Decimal,
}

impl Totals {
    /// Combine with the delivery estimate.
    #[must_use]
    pub fn with_delivery_time(self, delivery_time: String) -> OrderInfo {
        OrderInfo {
            subtotal: self.subtotal,
            tax: self.tax,
            delivery_fee: self.delivery_fee,
            service_charge: self.service_charge,
            delivery_time,
        }
    }
}

/// The CSRF token carried by any upstream form page.
///
/// # Errors
///
/// Returns [`OrderingError::NotFound`] if the page has no `_csrf` input.
pub fn csrf_token(doc: &Html) -> Result<String> {
    select_attr(
        doc.root_element(),
        &Query::attr("input", "name", "_csrf"),
        "value",
    )
}

/// The ASAP delivery date and time from the checkout page.
///
/// # Errors
///
/// Returns [`OrderingError::NotFound`] if the delivery time group or either
/// select is missing or empty.
pub fn asap_date_time(doc: &Html) -> Result<Asap> {
    let group = find_one(
        doc.root_element(),
        &Query::class("div", "delivery-time-group"),
    )?;
    let first_option = |id: &str| -> Result<String> {
        let select = find_one(group, &Query::attr("select", "id", id))?;
        select_attr(select, &Query::tag("option"), "value")
    };
    Ok(Asap {
        date: first_option("delivery-date")?,
        time: first_option("delivery-time")?,
    })
}

/// The fraud-check transaction id from the checkout page.
///
/// # Errors
///
/// Returns [`OrderingError::NotFound`] if the input is missing.
pub fn transaction_id(doc: &Html) -> Result<String> {
    select_attr(
        doc.root_element(),
        &Query::attr("input", "id", "transactionId"),
        "value",
    )
}

/// The option id for `item` in selection slot `index` (zero-based).
///
/// # Errors
///
/// Returns [`OrderingError::NotFound`] if the slot or the item is missing.
pub fn item_id(doc: &Html, item: Item, index: usize) -> Result<String> {
    let label = find_one(
        doc.root_element(),
        &Query::text("label", &format!("Selection {}", index + 1)),
    )?;
    let control = parent_element(label)?;
    select_attr(control, &Query::text("option", item.name()), "value")
}

/// The option id for `extra` among the groups related to `item_id`.
///
/// The first group that offers the extra wins.
///
/// # Errors
///
/// Returns [`OrderingError::NotFound`] if no related group offers it.
pub fn extra_id(doc: &Html, extra: Extra, item_id: &str) -> Result<String> {
    let groups = find_all(
        doc.root_element(),
        &Query::attr("div", "data-related", item_id),
    )?;
    let option = Query::text("option", extra.name());
    groups
        .into_iter()
        .find_map(|group| find_one(group, &option).ok())
        .map_or_else(
            || {
                Err(OrderingError::NotFound(format!(
                    "{option} related to item {item_id}"
                )))
            },
            |found| attr_of(found, "value"),
        )
}

/// The id of the nearest location on a location search page.
///
/// Only the first result is considered.
///
/// # Errors
///
/// Returns [`OrderingError::Forbidden`] when there is no result, when it does
/// not take online orders, or when it does not deliver, checked in that order.
pub fn nearest_location_id(doc: &Html) -> Result<String> {
    let nearest = find_one(
        doc.root_element(),
        &Query::class("div", "col12 location-results"),
    )
    .ok()
    .and_then(first_child_element)
    .ok_or(ForbiddenReason::NoLocationsInProximity)?;

    if find_one(nearest, &Query::text("a", "Order Now")).is_err() {
        return Err(ForbiddenReason::NotAcceptingOnlineOrders.into());
    }
    if find_one(nearest, &Query::class("span", "delivery icon-doordash")).is_err() {
        return Err(ForbiddenReason::NoDelivery.into());
    }

    let id = attr_of(nearest, "id")?;
    id.strip_prefix("location-")
        .map(str::to_owned)
        .ok_or_else(|| OrderingError::NotFound(format!("location id in {id:?}")))
}

/// Subtotal, tax, delivery fee, and service charge from the checkout page.
///
/// Read from the first four rows of the totals table, in that order.
///
/// # Errors
///
/// Returns [`OrderingError::NotFound`] if the table is short, or
/// [`OrderingError::InvalidAmount`] if a value is not a dollar amount.
pub fn order_info(doc: &Html) -> Result<Totals> {
    let table = find_one(doc.root_element(), &Query::class("table", "order-totals"))?;
    let rows = find_all(table, &Query::tag("tr"))?;
    let amount = |position: usize| -> Result<Decimal> {
        let row = rows
            .get(position - 1)
            .copied()
            .ok_or_else(|| OrderingError::NotFound(format!("//table/tr[{position}]")))?;
        let cell = find_all(row, &Query::tag("td"))?
            .get(1)
            .copied()
            .ok_or_else(|| OrderingError::NotFound(format!("//table/tr[{position}]/td[2]")))?;
        let text = inner_text(cell);
        parse_amount(&text).ok_or(OrderingError::InvalidAmount(text))
    };
    Ok(Totals {
        subtotal: amount(1)?,
        tax: amount(2)?,
        delivery_fee: amount(3)?,
        service_charge: amount(4)?,
    })
}

/// The delivery time from a delivery estimate response.
///
/// # Errors
///
/// Returns [`OrderingError::Json`] if the body is not a JSON object, or
/// [`OrderingError::Forbidden`] if it carries no `delivery_time`, which the
/// upstream uses to say the address is out of range.
pub fn delivery_estimate(body: &str) -> Result<String> {
    let estimate: Estimate = serde_json::from_str(body)?;
    estimate
        .delivery_time
        .ok_or_else(|| ForbiddenReason::OutOfRange.into())
}

/// Delivery estimate response. Other keys are ignored.
#[derive(Deserialize)]
struct Estimate {
    delivery_time: Option<String>,
}

/// Check an add-to-cart response.
///
/// # Errors
///
/// Returns [`OrderingError::Upstream`] if the body is not JSON or carries an
/// `error` key.
pub fn cart_confirmation(body: &str) -> Result<()> {
    let response: Value = serde_json::from_str(body)
        .map_err(|e| OrderingError::Upstream(format!("cart response is not JSON: {e}")))?;
    if let Some(error) = response.get("error") {
        return Err(OrderingError::Upstream(format!("cart rejected: {error}")));
    }
    Ok(())
}

/// The fulfilling location from an order confirmation page.
///
/// Only the name is required.
///
/// # Errors
///
/// Returns [`OrderingError::NotFound`] if the location block or its name is
/// missing.
pub fn placed_location(doc: &Html) -> Result<Location> {
    let block = find_one(doc.root_element(), &Query::class("div", "order-location"))?;
    location(block)
}

/// Every location on a location search page, nearest first.
///
/// Unlike [`nearest_location_id`], closed and pickup-only locations are
/// included; check [`Location::delivery`] before ordering from one. A page
/// without a results block lists nothing.
///
/// # Errors
///
/// Returns [`OrderingError::NotFound`] if a result has no name.
pub fn locations(doc: &Html) -> Result<Vec<Location>> {
    let Ok(results) = find_one(
        doc.root_element(),
        &Query::class("div", "col12 location-results"),
    ) else {
        return Ok(Vec::new());
    };
    child_elements(results).map(location).collect()
}

/// A location block: strict name, best-effort everything else.
fn location(block: ElementRef<'_>) -> Result<Location> {
    let title = Query::class("span", "location-title");
    let name = select_text(block, &title)?;
    if name.is_empty() {
        return Err(OrderingError::NotFound(title.to_string()));
    }

    let field = |class: &str| optional_text(block, &Query::class("span", class)).unwrap_or_default();
    Ok(Location {
        id: block
            .value()
            .attr("id")
            .and_then(|id| id.strip_prefix("location-"))
            .map(str::to_owned)
            .unwrap_or_default(),
        name,
        street_address: field("street-address"),
        locality: field("locality"),
        region: field("region"),
        postal_code: field("postal-code"),
        delivery: find_one(block, &Query::class("span", "delivery icon-doordash")).is_ok(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::html::parse;

    const TRIPLE_DIPPER: &str = include_str!("../testdata/triple_dipper.html");
    const PICKUP: &str = include_str!("../testdata/pickup.html");
    const PAYMENT: &str = include_str!("../testdata/payment.html");
    const CONFIRMATION: &str = include_str!("../testdata/confirmation.html");
    const LOCATIONS: &str = include_str!("../testdata/locations.html");
    const LOCATIONS_EMPTY: &str = include_str!("../testdata/locations_empty.html");
    const LOCATIONS_CLOSED: &str = include_str!("../testdata/locations_closed.html");
    const LOCATIONS_NO_DELIVERY: &str = include_str!("../testdata/locations_no_delivery.html");

    fn forbidden(result: Result<String>) -> ForbiddenReason {
        result.unwrap_err().forbidden().unwrap()
    }

    #[test]
    fn test_csrf_token() {
        assert_eq!(csrf_token(&parse(TRIPLE_DIPPER)).unwrap(), "5d1b3c1e-dipper-csrf");
        assert_eq!(csrf_token(&parse(PICKUP)).unwrap(), "8f0a77c2-checkout-csrf");
        assert_eq!(csrf_token(&parse(PAYMENT)).unwrap(), "c3e1d0b9-payment-csrf");
        assert!(matches!(
            csrf_token(&parse(CONFIRMATION)),
            Err(OrderingError::NotFound(_))
        ));
    }

    #[test]
    fn test_tokens_stable_across_parses() {
        let first = parse(PICKUP);
        let second = parse(PICKUP);
        assert_eq!(csrf_token(&first).unwrap(), csrf_token(&second).unwrap());
        assert_eq!(asap_date_time(&first).unwrap(), asap_date_time(&second).unwrap());
        assert_eq!(transaction_id(&first).unwrap(), transaction_id(&second).unwrap());

        let menu = parse(TRIPLE_DIPPER);
        let again = parse(TRIPLE_DIPPER);
        assert_eq!(csrf_token(&menu).unwrap(), csrf_token(&again).unwrap());
        assert_eq!(
            item_id(&menu, Item::FriedPickles, 1).unwrap(),
            item_id(&again, Item::FriedPickles, 1).unwrap()
        );
    }

    #[test]
    fn test_asap_date_time() {
        let asap = asap_date_time(&parse(PICKUP)).unwrap();
        assert_eq!(asap.date, "2021-03-03");
        assert_eq!(asap.time, "ASAP");
    }

    #[test]
    fn test_asap_requires_both_selects() {
        let page = r#"<html><body><div class="delivery-time-group">
            <select id="delivery-date"><option value="2021-03-03">Today</option></select>
        </div></body></html>"#;
        assert!(matches!(
            asap_date_time(&parse(page)),
            Err(OrderingError::NotFound(ref q)) if q == "//select[@id='delivery-time']"
        ));
    }

    #[test]
    fn test_transaction_id() {
        assert_eq!(transaction_id(&parse(PICKUP)).unwrap(), "txn-4f2e9a");
        assert!(transaction_id(&parse(PAYMENT)).is_err());
    }

    #[test]
    fn test_item_id_is_positional() {
        let doc = parse(TRIPLE_DIPPER);
        assert_eq!(item_id(&doc, Item::BonelessBuffaloWings, 0).unwrap(), "1102");
        assert_eq!(item_id(&doc, Item::BonelessBuffaloWings, 1).unwrap(), "2102");
        assert_eq!(item_id(&doc, Item::FriedPickles, 1).unwrap(), "2105");
        assert_eq!(item_id(&doc, Item::OriginalChickenCrispers, 2).unwrap(), "3106");
        assert_eq!(item_id(&doc, Item::BigMouthBites, 0).unwrap(), "1101");
    }

    #[test]
    fn test_item_id_missing() {
        let doc = parse(TRIPLE_DIPPER);
        // Not offered on this page
        assert!(item_id(&doc, Item::AwesomeBlossomPetals, 0).is_err());
        // No fourth selection slot
        assert!(item_id(&doc, Item::FriedPickles, 3).is_err());
    }

    #[test]
    fn test_extra_id_first_offering_group_wins() {
        let doc = parse(TRIPLE_DIPPER);
        assert_eq!(extra_id(&doc, Extra::Ranch, "1102").unwrap(), "9011");
        assert_eq!(extra_id(&doc, Extra::BleuCheese, "1102").unwrap(), "9012");
        assert_eq!(extra_id(&doc, Extra::AvocadoRanch, "2105").unwrap(), "9021");
        assert_eq!(extra_id(&doc, Extra::HoneyMustard, "3106").unwrap(), "9031");
        assert_eq!(extra_id(&doc, Extra::OriginalBbq, "3106").unwrap(), "9032");
    }

    #[test]
    fn test_extra_id_not_offered() {
        let doc = parse(TRIPLE_DIPPER);
        // Groups exist for the item, none offers the extra
        assert!(matches!(
            extra_id(&doc, Extra::HoneyMustard, "1102"),
            Err(OrderingError::NotFound(_))
        ));
        // No groups for the item at all
        assert!(matches!(
            extra_id(&doc, Extra::Ranch, "1101"),
            Err(OrderingError::NotFound(_))
        ));
    }

    #[test]
    fn test_nearest_location_id() {
        assert_eq!(nearest_location_id(&parse(LOCATIONS)).unwrap(), "1043");
    }

    #[test]
    fn test_nearest_location_precedence() {
        assert_eq!(
            forbidden(nearest_location_id(&parse(LOCATIONS_EMPTY))),
            ForbiddenReason::NoLocationsInProximity
        );
        // Only the nearest result counts, even if a later one would qualify
        assert_eq!(
            forbidden(nearest_location_id(&parse(LOCATIONS_CLOSED))),
            ForbiddenReason::NotAcceptingOnlineOrders
        );
        assert_eq!(
            forbidden(nearest_location_id(&parse(LOCATIONS_NO_DELIVERY))),
            ForbiddenReason::NoDelivery
        );
    }

    #[test]
    fn test_missing_results_block_is_no_locations() {
        assert_eq!(
            forbidden(nearest_location_id(&parse(PAYMENT))),
            ForbiddenReason::NoLocationsInProximity
        );
    }

    #[test]
    fn test_order_info() {
        let totals = order_info(&parse(PICKUP)).unwrap();
        assert_eq!(totals.subtotal, Decimal::new(4047, 2));
        assert_eq!(totals.tax, Decimal::new(243, 2));
        assert_eq!(totals.delivery_fee, Decimal::new(499, 2));
        assert_eq!(totals.service_charge, Decimal::new(150, 2));

        let info = totals.with_delivery_time("2021-03-03T21:42:26Z".to_string());
        assert_eq!(info.total(), Decimal::new(4939, 2));
    }

    #[test]
    fn test_order_info_short_table() {
        let page = r#"<html><body><table class="order-totals">
            <tr><td>Subtotal</td><td>$1.00</td></tr>
        </table></body></html>"#;
        assert!(matches!(
            order_info(&parse(page)),
            Err(OrderingError::NotFound(_))
        ));
    }

    #[test]
    fn test_order_info_bad_amount() {
        let page = r#"<html><body><table class="order-totals">
            <tr><td>Subtotal</td><td>$1.00</td></tr>
            <tr><td>Tax</td><td>$0.08</td></tr>
            <tr><td>Delivery Fee</td><td>FREE</td></tr>
            <tr><td>Service Charge</td><td>$0.00</td></tr>
        </table></body></html>"#;
        assert!(matches!(
            order_info(&parse(page)),
            Err(OrderingError::InvalidAmount(ref text)) if text == "FREE"
        ));
    }

    #[test]
    fn test_delivery_estimate() {
        let body = r#"{"delivery_time":"2021-03-03T21:42:26.730000Z","quote_id":"q-1"}"#;
        assert_eq!(
            delivery_estimate(body).unwrap(),
            "2021-03-03T21:42:26.730000Z"
        );
    }

    #[test]
    fn test_delivery_estimate_out_of_range() {
        let err = delivery_estimate(r#"{"message":"outside delivery radius"}"#).unwrap_err();
        assert_eq!(err.forbidden(), Some(ForbiddenReason::OutOfRange));
        assert_eq!(err.to_string(), "address is out of range");
    }

    #[test]
    fn test_delivery_estimate_invalid_json() {
        assert!(matches!(
            delivery_estimate("<html>gateway timeout</html>"),
            Err(OrderingError::Json(_))
        ));
    }

    #[test]
    fn test_cart_confirmation() {
        assert!(cart_confirmation(r#"{"cartCount":1}"#).is_ok());
        assert!(matches!(
            cart_confirmation(r#"{"error":"item unavailable"}"#),
            Err(OrderingError::Upstream(_))
        ));
        assert!(matches!(
            cart_confirmation("<html></html>"),
            Err(OrderingError::Upstream(_))
        ));
    }

    #[test]
    fn test_placed_location() {
        let location = placed_location(&parse(CONFIRMATION)).unwrap();
        assert_eq!(
            location,
            Location {
                id: "1043".to_string(),
                name: "Addison".to_string(),
                street_address: "4021 Belt Line Rd".to_string(),
                locality: "Addison".to_string(),
                region: "TX".to_string(),
                postal_code: "75001".to_string(),
                delivery: true,
            }
        );
    }

    #[test]
    fn test_placed_location_best_effort_fields() {
        let page = r#"<html><body><div class="order-location">
            <span class="location-title">Addison</span>
        </div></body></html>"#;
        let location = placed_location(&parse(page)).unwrap();
        assert_eq!(location.name, "Addison");
        assert!(location.id.is_empty());
        assert!(location.street_address.is_empty());
        assert!(!location.delivery);
    }

    #[test]
    fn test_locations() {
        let found = locations(&parse(LOCATIONS)).unwrap();
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].id, "1043");
        assert_eq!(found[0].name, "Addison");
        assert_eq!(found[0].street_address, "4021 Belt Line Rd");
        assert_eq!(found[0].postal_code, "75001");
        assert!(found[0].delivery);
        // Missing address parts are left empty
        assert_eq!(found[1].id, "1187");
        assert_eq!(found[1].name, "Dallas Galleria");
        assert!(found[1].locality.is_empty());
        assert!(found[1].delivery);
    }

    #[test]
    fn test_locations_include_non_delivering() {
        let closed = locations(&parse(LOCATIONS_CLOSED)).unwrap();
        let names: Vec<_> = closed.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["Plano", "Frisco"]);
        assert!(!closed[0].delivery);

        let pickup = locations(&parse(LOCATIONS_NO_DELIVERY)).unwrap();
        assert_eq!(pickup.len(), 1);
        assert!(!pickup[0].delivery);
    }

    #[test]
    fn test_locations_empty() {
        assert!(locations(&parse(LOCATIONS_EMPTY)).unwrap().is_empty());
        assert!(locations(&parse(PAYMENT)).unwrap().is_empty());
    }

    #[test]
    fn test_locations_require_names() {
        let page = r#"<html><body><div class="col12 location-results">
            <div class="location" id="location-1"><span class="location-title">Addison</span></div>
            <div class="location" id="location-2"><span class="region">TX</span></div>
        </div></body></html>"#;
        assert!(matches!(
            locations(&parse(page)),
            Err(OrderingError::NotFound(_))
        ));
    }

    #[test]
    fn test_placed_location_requires_name() {
        assert!(placed_location(&parse(PAYMENT)).is_err());
        let page = r#"<html><body><div class="order-location">
            <span class="location-title">  </span>
        </div></body></html>"#;
        assert!(placed_location(&parse(page)).is_err());
    }
}
