//! Find restaurants near an address.
//!
//! The address file holds the fields of an order file's `address` mapping:
//!
//! ```yaml
//! street: 4021 Belt Line Rd
//! city: Addison
//! state: TX
//! zip: "75001"
//! ```

use std::path::Path;

use dipper_core::Location;
use dipper_ordering::{OrderingConfig, find_locations};

use super::CliError;
use super::order_file::load_address;

/// Search for locations near the address in `path` and print them.
///
/// # Errors
///
/// Returns [`CliError`] if the file cannot be loaded or the search fails.
pub async fn run(path: &Path) -> Result<(), CliError> {
    let config = OrderingConfig::from_env()?;
    let address = load_address(path).await?;
    let locations = find_locations(&config, &address).await?;

    #[allow(clippy::print_stdout)]
    {
        print!("{}", render(&locations));
    }
    Ok(())
}

/// One line per location: `id  name  street, city, state zip  delivery`.
#[must_use]
pub fn render(locations: &[Location]) -> String {
    if locations.is_empty() {
        return "No locations found\n".to_owned();
    }
    let mut out = String::new();
    for location in locations {
        out.push_str(&format!(
            "{:<8} {:<28} {}, {}, {} {:<10} {}\n",
            location.id,
            location.name,
            location.street_address,
            location.locality,
            location.region,
            location.postal_code,
            if location.delivery { "delivery" } else { "pickup only" },
        ));
    }
    out
}
