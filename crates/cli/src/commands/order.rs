//! Ordering commands.
//!
//! # Usage
//!
//! ```bash
//! # Check out now, pay later (possibly from another process)
//! dipper checkout --order order.yaml
//! dipper place --session <SESSION_ID> --payment card.yaml
//!
//! # Both phases in one go; the order file must include `payment`
//! dipper run --order order.yaml
//! ```
//!
//! # Environment Variables
//!
//! - `DIPPER_BASE_URL` - Upstream origin (default: `https://www.chilis.com`)
//! - `DIPPER_REQUEST_TIMEOUT_SECS` - Per-request timeout (default: 30)
//! - `DIPPER_USER_AGENT` - `User-Agent` header sent upstream

use std::path::Path;

use dipper_core::{Location, OrderInfo, PaymentMethod};
use dipper_ordering::{OrderingConfig, Session};
use tracing::info;

use super::CliError;
use super::order_file::{OrderFile, load_payment};

/// Start a session, set its location, cart every triple dipper, and check out.
///
/// Triple dippers are carted one after another on the same session.
///
/// # Errors
///
/// Returns the first failing step.
pub async fn checkout(
    config: &OrderingConfig,
    order: &OrderFile,
) -> Result<(Session, OrderInfo), CliError> {
    let mut session = Session::start(config).await?;
    info!(session = %session.id(), "Session started");

    session.set_location(&order.address).await?;
    for triple_dipper in &order.triple_dippers {
        session.cart(triple_dipper).await?;
    }
    let info = session.checkout(&order.customer, &order.address).await?;
    Ok((session, info))
}

/// Resume a checked-out session and pay for it.
///
/// # Errors
///
/// Returns the first failing step.
pub async fn place(
    config: &OrderingConfig,
    session_id: &str,
    payment: &mut PaymentMethod,
) -> Result<Location, CliError> {
    let mut session = Session::resume(config, session_id)?;
    Ok(session.place(payment).await?)
}

/// `dipper checkout`: print the session id and order totals.
///
/// # Errors
///
/// Returns an error if the order file is invalid or any step fails.
pub async fn run_checkout(order_path: &Path) -> Result<(), CliError> {
    let config = OrderingConfig::from_env()?;
    let order = OrderFile::load(order_path).await?;
    let (session, info) = checkout(&config, &order).await?;
    print_checkout(session.id(), &info);
    Ok(())
}

/// `dipper place`: print the fulfilling location.
///
/// # Errors
///
/// Returns an error if the payment file is invalid or any step fails.
pub async fn run_place(session_id: &str, payment_path: &Path) -> Result<(), CliError> {
    let config = OrderingConfig::from_env()?;
    let mut payment = load_payment(payment_path).await?;
    let location = place(&config, session_id, &mut payment).await?;
    print_placed(&location);
    Ok(())
}

/// `dipper run`: check out and pay on one session.
///
/// # Errors
///
/// Returns an error if the order file has no payment, or any step fails.
pub async fn run_all(order_path: &Path) -> Result<(), CliError> {
    let config = OrderingConfig::from_env()?;
    let mut order = OrderFile::load(order_path).await?;
    let mut payment = order.payment.take().ok_or(CliError::MissingPayment)?;

    let (mut session, info) = checkout(&config, &order).await?;
    print_checkout(session.id(), &info);
    let location = session.place(&mut payment).await?;
    print_placed(&location);
    Ok(())
}

#[allow(clippy::print_stdout)]
fn print_checkout(session_id: &str, info: &OrderInfo) {
    println!("session         {session_id}");
    println!("subtotal        ${}", info.subtotal);
    println!("tax             ${}", info.tax);
    println!("delivery fee    ${}", info.delivery_fee);
    println!("service charge  ${}", info.service_charge);
    println!("total           ${}", info.total());
    println!("delivery time   {}", info.delivery_time);
}

#[allow(clippy::print_stdout)]
fn print_placed(location: &Location) {
    println!("placed with     {}", location.name);
    if !location.street_address.is_empty() {
        println!(
            "                {}, {}, {} {}",
            location.street_address, location.locality, location.region, location.postal_code
        );
    }
}
