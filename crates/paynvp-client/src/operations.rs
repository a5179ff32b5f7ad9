//! Per-operation helpers on [`NvpGateway`].
//!
//! Each helper seeds the pending parameters for one logical operation and
//! dispatches it with a fixed `METHOD`.

use chrono::{DateTime, Utc};
use paynvp_core::{NvpParams, NvpResponse};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::GatewayError;
use crate::gateway::NvpGateway;
use crate::kind::ApiMethod;

/// Timestamp layout the gateway expects for date fields.
const NVP_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Outcome of echoing an IPN back to the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum IpnVerdict {
    Verified,
    Invalid,
    /// Anything else, typically an HTML error page.
    Unknown(String),
}

impl IpnVerdict {
    pub fn from_body(body: &str) -> Self {
        match body.trim() {
            "VERIFIED" => Self::Verified,
            "INVALID" => Self::Invalid,
            other => Self::Unknown(other.to_string()),
        }
    }

    pub fn is_verified(&self) -> bool {
        matches!(self, Self::Verified)
    }
}

/// Typed criteria for `TransactionSearch`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionSearchCriteria {
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub transaction_id: Option<String>,
    pub email: Option<String>,
    pub status: Option<String>,
    pub amount: Option<String>,
}

impl TransactionSearchCriteria {
    pub fn since(start_date: DateTime<Utc>) -> Self {
        Self {
            start_date,
            end_date: None,
            transaction_id: None,
            email: None,
            status: None,
            amount: None,
        }
    }

    pub fn until(mut self, end_date: DateTime<Utc>) -> Self {
        self.end_date = Some(end_date);
        self
    }

    pub fn transaction_id(mut self, id: impl Into<String>) -> Self {
        self.transaction_id = Some(id.into());
        self
    }

    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn amount(mut self, amount: impl Into<String>) -> Self {
        self.amount = Some(amount.into());
        self
    }

    pub fn to_params(&self) -> NvpParams {
        let mut params = NvpParams::new();
        params.insert("STARTDATE", self.start_date.format(NVP_DATE_FORMAT).to_string());
        if let Some(end) = self.end_date {
            params.insert("ENDDATE", end.format(NVP_DATE_FORMAT).to_string());
        }
        let optional = [
            ("TRANSACTIONID", &self.transaction_id),
            ("EMAIL", &self.email),
            ("STATUS", &self.status),
            ("AMT", &self.amount),
        ];
        for (key, value) in optional {
            if let Some(v) = value {
                params.insert(key, v.as_str());
            }
        }
        params
    }
}

/// Parameters for starting an express checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpressCheckoutRequest {
    pub amount: String,
    pub return_url: String,
    pub cancel_url: String,
    pub invoice_id: Option<String>,
    pub description: Option<String>,
}

impl NvpGateway {
    /// Echo received IPN fields back to the gateway and return its raw
    /// answer (`VERIFIED` or `INVALID`).
    ///
    /// `cmd=_notify-validate` is prepended when `posted` has no `cmd`.
    pub async fn verify_ipn(&mut self, posted: NvpParams) -> Result<String, GatewayError> {
        let fields = if posted.contains_key("cmd") {
            posted
        } else {
            let mut fields = NvpParams::from([("cmd", "_notify-validate")]);
            fields.merge(&posted);
            fields
        };
        self.set_request_data(fields);
        let reply = self.dispatch(ApiMethod::VerifyIpn).await?;
        Ok(reply.into_raw().unwrap_or_default())
    }

    /// Fully refund a transaction.
    pub async fn refund_transaction(&mut self, transaction_id: &str) -> Result<NvpResponse, GatewayError> {
        self.set_request_data(NvpParams::from([("TRANSACTIONID", transaction_id)]));
        self.call(ApiMethod::RefundTransaction).await
    }

    /// Refund part of a transaction in the adapter's current currency.
    pub async fn refund_partial(
        &mut self,
        transaction_id: &str,
        amount: &str,
        note: Option<&str>,
    ) -> Result<NvpResponse, GatewayError> {
        let mut fields = NvpParams::from([
            ("TRANSACTIONID", transaction_id),
            ("REFUNDTYPE", "Partial"),
            ("AMT", amount),
            ("CURRENCYCODE", self.currency().code()),
        ]);
        if let Some(note) = note {
            fields.insert("NOTE", note);
        }
        self.set_request_data(fields);
        self.call(ApiMethod::RefundTransaction).await
    }

    /// Search transactions with caller-supplied criteria fields.
    pub async fn search_transactions(&mut self, criteria: NvpParams) -> Result<NvpResponse, GatewayError> {
        self.set_request_data(criteria);
        self.call(ApiMethod::TransactionSearch).await
    }

    /// Search transactions with typed criteria.
    pub async fn search(&mut self, criteria: &TransactionSearchCriteria) -> Result<NvpResponse, GatewayError> {
        self.search_transactions(criteria.to_params()).await
    }

    pub async fn get_transaction_details(&mut self, transaction_id: &str) -> Result<NvpResponse, GatewayError> {
        self.set_request_data(NvpParams::from([("TRANSACTIONID", transaction_id)]));
        self.call(ApiMethod::GetTransactionDetails).await
    }

    /// Void an authorization.
    pub async fn do_void(&mut self, authorization_id: &str, note: Option<&str>) -> Result<NvpResponse, GatewayError> {
        let mut fields = NvpParams::from([("AUTHORIZATIONID", authorization_id)]);
        if let Some(note) = note {
            fields.insert("NOTE", note);
        }
        self.set_request_data(fields);
        self.call(ApiMethod::DoVoid).await
    }

    /// Capture an authorization in the adapter's current currency.
    pub async fn do_capture(
        &mut self,
        authorization_id: &str,
        amount: &str,
        complete: bool,
    ) -> Result<NvpResponse, GatewayError> {
        self.set_request_data(NvpParams::from([
            ("AUTHORIZATIONID", authorization_id),
            ("AMT", amount),
            ("CURRENCYCODE", self.currency().code()),
            ("COMPLETETYPE", if complete { "Complete" } else { "NotComplete" }),
        ]));
        self.call(ApiMethod::DoCapture).await
    }

    /// Start an express checkout. The reply carries the `TOKEN` to pass to
    /// [`NvpGateway::checkout_redirect_url`].
    pub async fn set_express_checkout(
        &mut self,
        request: &ExpressCheckoutRequest,
    ) -> Result<NvpResponse, GatewayError> {
        let mut fields = NvpParams::from([
            ("PAYMENTREQUEST_0_AMT", request.amount.as_str()),
            ("PAYMENTREQUEST_0_CURRENCYCODE", self.currency().code()),
            ("PAYMENTREQUEST_0_PAYMENTACTION", self.payment_action()),
            ("LOCALECODE", self.locale()),
            ("RETURNURL", request.return_url.as_str()),
            ("CANCELURL", request.cancel_url.as_str()),
        ]);
        if let Some(notify_url) = self.notify_url() {
            fields.insert("PAYMENTREQUEST_0_NOTIFYURL", notify_url);
        }
        if let Some(invoice) = &request.invoice_id {
            fields.insert("PAYMENTREQUEST_0_INVNUM", invoice.as_str());
        }
        if let Some(desc) = &request.description {
            fields.insert("PAYMENTREQUEST_0_DESC", desc.as_str());
        }
        self.set_request_data(fields);
        self.call(ApiMethod::SetExpressCheckout).await
    }

    /// The URL to send the buyer to after `SetExpressCheckout`.
    pub fn checkout_redirect_url(&mut self, token: &str) -> Result<Url, GatewayError> {
        let mut url = self.ensure_credentials()?.webscr_url()?;
        url.query_pairs_mut()
            .append_pair("cmd", "_express-checkout")
            .append_pair("token", token);
        Ok(url)
    }

    async fn call(&mut self, method: ApiMethod) -> Result<NvpResponse, GatewayError> {
        let response = self.dispatch(method).await?.into_nvp();
        if let Some(ack) = response.ack().filter(|a| !a.is_success()) {
            tracing::debug!(ack = ?ack, errors = response.errors().len(), "gateway reported failure");
        }
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn ipn_verdicts() {
        assert_eq!(IpnVerdict::from_body("VERIFIED"), IpnVerdict::Verified);
        assert_eq!(IpnVerdict::from_body("INVALID\n"), IpnVerdict::Invalid);
        assert!(IpnVerdict::from_body(" VERIFIED ").is_verified());
        assert_eq!(
            IpnVerdict::from_body("<html>"),
            IpnVerdict::Unknown("<html>".into())
        );
    }

    #[test]
    fn search_criteria_format_dates_and_skip_absent_fields() {
        let start = Utc.with_ymd_and_hms(2024, 1, 5, 10, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();
        let params = TransactionSearchCriteria::since(start)
            .until(end)
            .email("buyer@example.com")
            .to_params();
        assert_eq!(params.get("STARTDATE"), Some("2024-01-05T10:00:00Z"));
        assert_eq!(params.get("ENDDATE"), Some("2024-02-01T00:00:00Z"));
        assert_eq!(params.get("EMAIL"), Some("buyer@example.com"));
        assert!(!params.contains_key("TRANSACTIONID"));
        assert!(!params.contains_key("STATUS"));
        assert_eq!(params.len(), 3);
    }
}
