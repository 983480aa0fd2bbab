//! YAML order and payment files.
//!
//! ```yaml
//! address:
//!   street: 4021 Belt Line Rd
//!   unit: Apt 12
//!   city: Addison
//!   state: TX
//!   zip: "75001"
//!   notes: Leave at the door
//! customer:
//!   firstName: Jane
//!   lastName: Doe
//!   phone: "2145550100"
//!   email: jane@example.com
//! tripleDippers:
//!   - dippers:
//!       - item: boneless_buffalo_wings
//!         extras: [ranch]
//!       - item: fried_pickles
//!       - item: southwestern_eggrolls
//!         extras: [avocado_ranch]
//! payment:            # optional; required by `run`
//!   number: "4111111111111111"
//!   cvv: "123"
//!   month: "12"
//!   year: "2030"
//!   name: Jane Doe
//!   zip: "75001"
//! ```
//!
//! A payment file holds just the `payment` mapping's fields, and an address
//! file just the `address` mapping's.

use std::path::Path;

use dipper_core::{Address, Customer, PaymentMethod, TripleDipper};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use super::CliError;

/// Everything needed to check out, and optionally pay.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderFile {
    pub address: Address,
    pub customer: Customer,
    pub triple_dippers: Vec<TripleDipper>,
    #[serde(default)]
    pub payment: Option<PaymentMethod>,
}

impl OrderFile {
    /// Read and parse an order file.
    ///
    /// # Errors
    ///
    /// Returns [`CliError`] if the file cannot be read or parsed, or lists no
    /// triple dippers.
    pub async fn load(path: &Path) -> Result<Self, CliError> {
        let order: Self = load_yaml(path).await?;
        order.check()?;
        Ok(order)
    }

    fn check(&self) -> Result<(), CliError> {
        if self.triple_dippers.is_empty() {
            return Err(CliError::NothingToOrder);
        }
        Ok(())
    }
}

/// Read and parse a payment file.
///
/// # Errors
///
/// Returns [`CliError`] if the file cannot be read or parsed.
pub async fn load_payment(path: &Path) -> Result<PaymentMethod, CliError> {
    load_yaml(path).await
}

/// Read and parse an address file.
///
/// # Errors
///
/// Returns [`CliError`] if the file cannot be read or parsed.
pub async fn load_address(path: &Path) -> Result<Address, CliError> {
    load_yaml(path).await
}

async fn load_yaml<T: DeserializeOwned>(path: &Path) -> Result<T, CliError> {
    let display = path.display().to_string();
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| CliError::Read {
            path: display.clone(),
            source,
        })?;
    serde_yaml::from_str(&content).map_err(|source| CliError::Parse {
        path: display,
        source,
    })
}
