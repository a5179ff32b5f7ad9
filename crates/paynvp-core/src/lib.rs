//! # paynvp-core: Foundational Types for the NVP Gateway Client
//!
//! Defines the value types shared by every paynvp crate. Nothing in here
//! performs I/O; the HTTP adapter lives in `paynvp-client`.
//!
//! ## Key Types
//!
//! 1. **[`Currency`]**: the fixed whitelist of currency codes the gateway
//!    accepts. An unsupported code cannot be represented, so it is rejected
//!    at parse time, before any request is built.
//!
//! 2. **[`ApiMode`]**: `sandbox` or `live`. Unrecognised declarations fall
//!    back to `live`.
//!
//! 3. **[`NvpParams`]**: the ordered name-value-pair set sent as a
//!    form-encoded body. Re-inserting a key replaces its value in place.
//!
//! 4. **[`NvpResponse`]**: the decoded `key=value&...` reply, with helpers
//!    for the `ACK` field and indexed `L_ERRORCODEn` error entries.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `paynvp-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod currency;
pub mod error;
pub mod mode;
pub mod params;
pub mod response;

pub use currency::Currency;
pub use error::{CurrencyError, ModeError};
pub use mode::ApiMode;
pub use params::NvpParams;
pub use response::{parse_nvp, Ack, NvpError, NvpResponse};
