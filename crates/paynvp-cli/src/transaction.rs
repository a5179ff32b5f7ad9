//! # Transaction Subcommands
//!
//! `refund`, `details` and `search`. Each performs exactly one gateway call
//! and prints the parsed reply.

use std::io::Write;

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::Args;

use paynvp_client::{NvpParams, TransactionSearchCriteria};

use crate::{parse_field, report_failure, report_reply, GatewayOpts};

/// Arguments for `paynvp refund`.
#[derive(Args, Debug)]
pub struct RefundArgs {
    /// Transaction to refund.
    #[arg(value_name = "TRANSACTION_ID")]
    pub transaction_id: String,

    /// Refund only this amount instead of the full transaction.
    #[arg(long)]
    pub amount: Option<String>,

    /// Note attached to a partial refund.
    #[arg(long, requires = "amount")]
    pub note: Option<String>,
}

/// Arguments for `paynvp details`.
#[derive(Args, Debug)]
pub struct DetailsArgs {
    #[arg(value_name = "TRANSACTION_ID")]
    pub transaction_id: String,
}

/// Arguments for `paynvp search`.
#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Earliest transaction time (RFC 3339).
    #[arg(long)]
    pub start: DateTime<Utc>,

    /// Latest transaction time (RFC 3339).
    #[arg(long)]
    pub end: Option<DateTime<Utc>>,

    #[arg(long)]
    pub transaction_id: Option<String>,

    /// Buyer email address.
    #[arg(long)]
    pub email: Option<String>,

    /// Transaction status filter, e.g. `Success` or `Pending`.
    #[arg(long)]
    pub status: Option<String>,

    #[arg(long)]
    pub amount: Option<String>,

    /// Extra search field as KEY=VALUE. Repeatable; wins over the typed flags.
    #[arg(long = "field", value_name = "KEY=VALUE", value_parser = parse_field)]
    pub fields: Vec<(String, String)>,
}

impl SearchArgs {
    /// The NVP criteria this invocation searches with.
    pub fn to_params(&self) -> NvpParams {
        let mut criteria = TransactionSearchCriteria::since(self.start);
        if let Some(end) = self.end {
            criteria = criteria.until(end);
        }
        if let Some(id) = &self.transaction_id {
            criteria = criteria.transaction_id(id.as_str());
        }
        if let Some(email) = &self.email {
            criteria = criteria.email(email.as_str());
        }
        if let Some(status) = &self.status {
            criteria = criteria.status(status.as_str());
        }
        if let Some(amount) = &self.amount {
            criteria = criteria.amount(amount.as_str());
        }
        let mut params = criteria.to_params();
        params.extend(self.fields.iter().cloned());
        params
    }
}

/// Execute `paynvp refund`.
pub async fn run_refund(args: &RefundArgs, opts: &GatewayOpts, out: &mut dyn Write) -> Result<u8> {
    let mut gateway = opts.build_gateway()?;
    let result = match &args.amount {
        Some(amount) => {
            gateway
                .refund_partial(&args.transaction_id, amount, args.note.as_deref())
                .await
        }
        None => gateway.refund_transaction(&args.transaction_id).await,
    };
    match result {
        Ok(reply) => report_reply(out, &reply),
        Err(e) => report_failure(out, e),
    }
}

/// Execute `paynvp details`.
pub async fn run_details(args: &DetailsArgs, opts: &GatewayOpts, out: &mut dyn Write) -> Result<u8> {
    let mut gateway = opts.build_gateway()?;
    match gateway.get_transaction_details(&args.transaction_id).await {
        Ok(reply) => report_reply(out, &reply),
        Err(e) => report_failure(out, e),
    }
}

/// Execute `paynvp search`.
pub async fn run_search(args: &SearchArgs, opts: &GatewayOpts, out: &mut dyn Write) -> Result<u8> {
    let mut gateway = opts.build_gateway()?;
    match gateway.search_transactions(args.to_params()).await {
        Ok(reply) => report_reply(out, &reply),
        Err(e) => report_failure(out, e),
    }
}
