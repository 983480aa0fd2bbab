//! Subcommand implementations.

pub mod catalog;
pub mod locations;
pub mod order;
pub mod order_file;

use dipper_ordering::{ConfigError, OrderingError};
use thiserror::Error;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// Order, payment or address file could not be read.
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    /// Order, payment or address file is not valid YAML for its schema.
    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: String,
        source: serde_yaml::Error,
    },

    /// The order file lists no triple dippers.
    #[error("Order file must list at least one triple dipper")]
    NothingToOrder,

    /// `run` needs a payment section in the order file.
    #[error("Order file has no payment section")]
    MissingPayment,

    /// Environment configuration is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// An ordering step failed.
    #[error(transparent)]
    Ordering(#[from] OrderingError),
}
