//! # check-config Subcommand
//!
//! Resolves the credential bundle exactly as a gateway call would and prints
//! the outcome. No request is sent and no secret is printed.

use std::io::Write;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use paynvp_client::SigningMethod;

use crate::{write_json, GatewayOpts};

/// Arguments for `paynvp check-config`.
#[derive(Args, Debug)]
pub struct CheckConfigArgs {
    /// Also resolve the mode the bundle does not select.
    #[arg(long)]
    pub all_modes: bool,
}

/// What resolution produced for one mode.
#[derive(Debug, Serialize)]
pub struct ConfigReport {
    pub kind: String,
    pub mode: String,
    pub username: String,
    pub signing: String,
    pub api_url: String,
    pub gateway_url: String,
    pub app_id: Option<String>,
    pub currency: String,
    pub payment_action: String,
    pub locale: String,
    pub notify_url: Option<String>,
}

fn describe_signing(signing: &SigningMethod) -> String {
    match signing {
        SigningMethod::Secret => "secret".to_string(),
        SigningMethod::Certificate(path) => format!("certificate:{}", path.display()),
    }
}

/// Resolve credentials for `opts` and describe the result.
pub fn resolve_report(opts: &GatewayOpts) -> Result<ConfigReport> {
    let gateway = opts.build_gateway()?;
    let creds = gateway
        .credentials()
        .context("credentials missing after resolution")?;
    Ok(ConfigReport {
        kind: gateway.kind().to_string(),
        mode: creds.mode.to_string(),
        username: creds.username.clone(),
        signing: describe_signing(&creds.signing),
        api_url: creds.api_url.to_string(),
        gateway_url: creds.gateway_url.to_string(),
        app_id: creds.app_id.clone(),
        currency: gateway.currency().to_string(),
        payment_action: gateway.payment_action().to_string(),
        locale: gateway.locale().to_string(),
        notify_url: gateway.notify_url().map(str::to_string),
    })
}

/// Execute `paynvp check-config`.
///
/// Any resolution failure is an error; with `--all-modes` both modes must
/// resolve.
pub fn run_check_config(args: &CheckConfigArgs, opts: &GatewayOpts, out: &mut dyn Write) -> Result<u8> {
    let primary = resolve_report(opts)?;
    if !args.all_modes {
        write_json(out, &primary)?;
        return Ok(0);
    }

    let other_mode = match primary.mode.as_str() {
        "sandbox" => paynvp_client::ApiMode::Live,
        _ => paynvp_client::ApiMode::Sandbox,
    };
    let other = resolve_report(&GatewayOpts {
        mode: Some(other_mode),
        ..opts.clone()
    })
    .with_context(|| format!("{other_mode} credentials do not resolve"))?;
    write_json(out, &[primary, other])?;
    Ok(0)
}
