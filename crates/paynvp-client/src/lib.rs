//! # paynvp-client: Gateway Request Adapter
//!
//! A credential-driven client for a payment gateway's classic
//! name-value-pair (NVP) API. One [`NvpGateway`] per credential set:
//!
//! 1. **Credential resolution** picks the sandbox or live set from a
//!    [`CredentialBundle`] and derives the signature (shared secret, or the
//!    contents of a certificate file).
//! 2. **Request assembly** merges operation fields, injected credentials,
//!    and caller overrides into one ordered parameter set.
//! 3. **Dispatch** POSTs the form-encoded set to the API endpoint, or to
//!    the gateway web endpoint for IPN verification.
//! 4. **Response parsing** decodes the `key=value&...` reply.
//!
//! ```no_run
//! # async fn run() -> Result<(), paynvp_client::GatewayError> {
//! use paynvp_client::{ApiKind, ClientOptions, CredentialSource, NvpGateway};
//!
//! let mut gateway = NvpGateway::new(
//!     ApiKind::ExpressCheckout,
//!     CredentialSource::Env,
//!     ClientOptions::from_env(),
//! )?;
//! let reply = gateway.refund_transaction("8AB12345CD6789012").await?;
//! println!("ACK = {:?}", reply.ack());
//! # Ok(())
//! # }
//! ```
//!
//! ## Failure channels
//!
//! Configuration and currency errors fail before any network call. HTTP
//! error statuses surface as [`GatewayError::Transport`]; any other
//! exchange failure surfaces as [`GatewayError::Request`], which
//! [`ErrorReply`] renders as `{"type": "error", "message": ...}`.
//!
//! No retries are attempted.

pub mod config;
pub mod credentials;
pub mod error;
pub mod gateway;
pub mod kind;
pub mod operations;

pub use config::{ClientOptions, ConfigError, CredentialBundle, CredentialSource, ModeCredentials};
pub use credentials::ResolvedCredentials;
pub use error::{ErrorReply, GatewayError};
pub use gateway::{GatewayReply, NvpGateway, PreparedRequest, API_VERSION};
pub use kind::{ApiKind, ApiMethod, SigningMethod};
pub use operations::{ExpressCheckoutRequest, IpnVerdict, TransactionSearchCriteria};

pub use paynvp_core::{parse_nvp, Ack, ApiMode, Currency, NvpParams, NvpResponse};
