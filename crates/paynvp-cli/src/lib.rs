//! # paynvp-cli: Command-line access to the NVP gateway
//!
//! Provides the `paynvp` binary. Every subcommand loads a YAML credential
//! bundle, builds one [`NvpGateway`], performs at most one gateway call and
//! prints the result as JSON on stdout.
//!
//! ## Subcommands
//!
//! - `paynvp refund`: full or partial refund of a transaction.
//! - `paynvp details`: transaction details lookup.
//! - `paynvp search`: transaction search by date range and filters.
//! - `paynvp verify-ipn`: echo an IPN message back for verification.
//! - `paynvp check-config`: resolve credentials without touching the network.
//!
//! ```bash
//! paynvp --config paynvp.yaml --mode sandbox refund 8AB12345CD6789012
//! paynvp search --start 2024-01-01T00:00:00Z --status Success
//! ```
//!
//! ## Exit codes
//!
//! `0` on success, `1` when the gateway answers with a failure ack, an IPN
//! is not verified, or the command fails outright. `2` when the exchange
//! fails softly (see [`report_failure`]).

pub mod check;
pub mod ipn;
pub mod transaction;

use std::io::Write;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, ValueEnum};
use serde::Serialize;

use paynvp_client::{
    ApiKind, ApiMode, ClientOptions, CredentialBundle, CredentialSource, ErrorReply, GatewayError,
    NvpGateway, NvpResponse,
};

/// Which API family to address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KindArg {
    ExpressCheckout,
    AdaptivePayments,
}

impl From<KindArg> for ApiKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::ExpressCheckout => ApiKind::ExpressCheckout,
            KindArg::AdaptivePayments => ApiKind::AdaptivePayments,
        }
    }
}

/// Gateway options shared by every subcommand.
#[derive(Args, Debug, Clone)]
pub struct GatewayOpts {
    /// Path to the YAML credential bundle.
    #[arg(long, global = true, env = "PAYNVP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Force the API mode instead of the bundle's declared one.
    #[arg(long, global = true, env = "PAYNVP_MODE")]
    pub mode: Option<ApiMode>,

    /// API family.
    #[arg(long, global = true, value_enum, default_value = "express-checkout")]
    pub kind: KindArg,

    /// Currency code for amount-bearing operations.
    #[arg(long, global = true)]
    pub currency: Option<String>,

    /// HTTP timeout in seconds.
    #[arg(long, global = true, env = "PAYNVP_TIMEOUT_SECS", default_value_t = 30)]
    pub timeout_secs: u64,
}

impl GatewayOpts {
    /// Load the credential bundle named by `--config`.
    pub fn load_bundle(&self) -> Result<CredentialBundle> {
        let Some(path) = &self.config else {
            bail!("no credential bundle given; pass --config or set PAYNVP_CONFIG");
        };
        CredentialBundle::from_file(path)
            .with_context(|| format!("failed to load credential bundle: {}", path.display()))
    }

    /// Build a gateway with resolved credentials and the requested currency.
    pub fn build_gateway(&self) -> Result<NvpGateway> {
        let bundle = self.load_bundle()?;
        let mut gateway = NvpGateway::new(
            self.kind.into(),
            CredentialSource::None,
            ClientOptions {
                timeout_secs: self.timeout_secs,
            },
        )?;
        gateway
            .set_api_credentials(&bundle, self.mode)
            .context("failed to resolve gateway credentials")?;
        if let Some(code) = &self.currency {
            gateway.set_currency(code)?;
        }
        Ok(gateway)
    }
}

/// Parse a `KEY=VALUE` argument.
pub fn parse_field(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, _)) if key.is_empty() => Err(format!("empty field name in {raw:?}")),
        Some((key, value)) => Ok((key.to_string(), value.to_string())),
        None => Err(format!("expected KEY=VALUE, got {raw:?}")),
    }
}

/// Write `value` as pretty JSON followed by a newline.
pub fn write_json<T: Serialize>(out: &mut dyn Write, value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("failed to serialize output")?;
    writeln!(out, "{text}").context("failed to write output")?;
    Ok(())
}

/// Print a parsed reply and map its ack onto an exit code.
pub fn report_reply(out: &mut dyn Write, reply: &NvpResponse) -> Result<u8> {
    write_json(out, reply)?;
    if reply.is_success() {
        Ok(0)
    } else {
        tracing::warn!(ack = ?reply.ack(), errors = reply.errors().len(), "gateway reported failure");
        Ok(1)
    }
}

/// Soft failures are printed as `{"type": "error", ...}` and exit `2`; every
/// other error propagates.
pub fn report_failure(out: &mut dyn Write, err: GatewayError) -> Result<u8> {
    if err.is_soft() {
        write_json(out, &ErrorReply::from(&err))?;
        return Ok(2);
    }
    Err(err.into())
}
