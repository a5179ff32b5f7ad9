//! # verify-ipn Subcommand
//!
//! Echoes an IPN message back to the gateway web endpoint. The message is
//! given either as the raw form body the listener received (`--body`, or
//! `--body -` for stdin) or as individual `--field KEY=VALUE` pairs.
//!
//! Fields are echoed in the order received, but the body is re-encoded, so
//! percent-escapes may differ from the original bytes. A body with a
//! repeated or empty field name cannot be echoed faithfully and is rejected.

use std::io::{Read, Write};

use anyhow::{bail, Context, Result};
use clap::Args;
use serde::Serialize;

use paynvp_client::{IpnVerdict, NvpParams};

use crate::{parse_field, report_failure, write_json, GatewayOpts};

/// Arguments for `paynvp verify-ipn`.
#[derive(Args, Debug)]
pub struct VerifyIpnArgs {
    /// Raw form-encoded IPN body, or `-` to read it from stdin.
    #[arg(long, conflicts_with = "fields")]
    pub body: Option<String>,

    /// IPN field as KEY=VALUE. Repeatable.
    #[arg(long = "field", value_name = "KEY=VALUE", value_parser = parse_field)]
    pub fields: Vec<(String, String)>,
}

#[derive(Debug, Serialize)]
struct IpnReport {
    verdict: IpnVerdict,
    response: String,
}

impl VerifyIpnArgs {
    /// The IPN fields to echo, in the order they were received.
    pub fn posted_fields(&self) -> Result<NvpParams> {
        let params: NvpParams = match self.body.as_deref() {
            Some("-") => {
                let mut raw = String::new();
                std::io::stdin()
                    .read_to_string(&mut raw)
                    .context("failed to read IPN body from stdin")?;
                parse_ipn_body(raw.trim_end())?
            }
            Some(raw) => parse_ipn_body(raw)?,
            None => self.fields.iter().cloned().collect(),
        };
        if params.is_empty() {
            bail!("no IPN fields given; pass --body or --field");
        }
        Ok(params)
    }
}

/// Decode a received IPN body, refusing fields that would not survive the
/// echo unchanged.
pub fn parse_ipn_body(raw: &str) -> Result<NvpParams> {
    let mut params = NvpParams::new();
    for (key, value) in url::form_urlencoded::parse(raw.as_bytes()) {
        if key.is_empty() {
            bail!("IPN body has a field with an empty name");
        }
        if params.contains_key(&key) {
            bail!("IPN body repeats field {key:?}");
        }
        params.insert(key, value);
    }
    Ok(params)
}

/// Execute `paynvp verify-ipn`.
///
/// Returns `0` when the gateway answers `VERIFIED`, `1` otherwise.
pub async fn run_verify_ipn(args: &VerifyIpnArgs, opts: &GatewayOpts, out: &mut dyn Write) -> Result<u8> {
    let posted = args.posted_fields()?;
    let mut gateway = opts.build_gateway()?;
    let response = match gateway.verify_ipn(posted).await {
        Ok(body) => body,
        Err(e) => return report_failure(out, e),
    };
    let verdict = IpnVerdict::from_body(&response);
    let code = if verdict.is_verified() { 0 } else { 1 };
    write_json(out, &IpnReport { verdict, response })?;
    Ok(code)
}
