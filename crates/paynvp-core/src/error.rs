//! Error types for the core value types.

use thiserror::Error;

/// A currency code outside the gateway's whitelist.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CurrencyError {
    /// The code is not one the gateway settles in.
    #[error("currency {0:?} is not supported by the payment gateway")]
    Unsupported(String),
}

/// An API mode string that is neither `sandbox` nor `live`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModeError {
    #[error("invalid API mode {0:?} (expected \"sandbox\" or \"live\")")]
    Invalid(String),
}
