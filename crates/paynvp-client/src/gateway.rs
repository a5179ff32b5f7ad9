//! # NVP Gateway Adapter
//!
//! [`NvpGateway`] owns the resolved credentials, the request-wide settings
//! (currency, payment action, locale, notify URL), the pending request
//! parameters, and the override set applied to every request.
//!
//! ## Dispatch
//!
//! Each operation seeds the pending parameters, then calls
//! [`NvpGateway::dispatch`], which:
//!
//! 1. Reloads credentials from the [`CredentialSource`] once if they are
//!    unset, failing with [`ConfigError::CredentialsNotFound`] otherwise.
//! 2. Merges `USER`, `PWD`, `SIGNATURE`, `VERSION` and `METHOD` into the
//!    pending parameters.
//! 3. For IPN verification, strips `METHOD` and targets
//!    `{gateway_url}/cgi-bin/webscr`; every other method targets `api_url`.
//! 4. Merges the override set last, so overrides win on collision.
//! 5. Issues exactly one form-encoded POST. No retries.
//!
//! An error status or an unreadable reply body is a
//! [`GatewayError::Transport`]; any other send failure is the soft
//! [`GatewayError::Request`].

use std::time::Duration;

use paynvp_core::{parse_nvp, ApiMode, Currency, CurrencyError, NvpParams, NvpResponse};
use url::Url;

use crate::config::{ClientOptions, ConfigError, CredentialBundle, CredentialSource};
use crate::credentials::{self, ResolvedCredentials, DEFAULT_LOCALE, DEFAULT_PAYMENT_ACTION};
use crate::error::GatewayError;
use crate::kind::{ApiKind, ApiMethod};

/// Protocol version sent as `VERSION` with every request.
pub const API_VERSION: &str = "123";

/// A fully assembled request, ready to send.
#[derive(Debug, Clone)]
pub struct PreparedRequest {
    pub method: ApiMethod,
    pub url: Url,
    pub params: NvpParams,
}

/// What a dispatch returns: the raw body for IPN verification, the parsed
/// reply for everything else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayReply {
    Raw(String),
    Nvp(NvpResponse),
}

impl GatewayReply {
    pub fn into_nvp(self) -> NvpResponse {
        match self {
            Self::Nvp(r) => r,
            Self::Raw(body) => parse_nvp(&body),
        }
    }

    pub fn into_raw(self) -> Option<String> {
        match self {
            Self::Raw(body) => Some(body),
            Self::Nvp(_) => None,
        }
    }
}

/// The gateway request adapter.
#[derive(Debug)]
pub struct NvpGateway {
    http: reqwest::Client,
    kind: ApiKind,
    source: CredentialSource,
    credentials: Option<ResolvedCredentials>,
    currency: Currency,
    payment_action: String,
    locale: String,
    notify_url: Option<String>,
    pending: NvpParams,
    options: Option<NvpParams>,
}

impl NvpGateway {
    /// Create an adapter for `kind`, loading credentials from `source` if it
    /// provides any.
    pub fn new(
        kind: ApiKind,
        source: CredentialSource,
        options: ClientOptions,
    ) -> Result<Self, GatewayError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(options.timeout_secs))
            .min_tls_version(reqwest::tls::Version::TLS_1_2)
            .build()
            .map_err(GatewayError::ClientInit)?;

        let mut gateway = Self {
            http,
            kind,
            source,
            credentials: None,
            currency: Currency::default(),
            payment_action: DEFAULT_PAYMENT_ACTION.to_string(),
            locale: DEFAULT_LOCALE.to_string(),
            notify_url: None,
            pending: NvpParams::new(),
            options: None,
        };
        gateway.reload_credentials()?;
        Ok(gateway)
    }

    /// Create an adapter with credentials supplied directly.
    pub fn with_credentials(
        kind: ApiKind,
        bundle: &CredentialBundle,
        mode: Option<ApiMode>,
    ) -> Result<Self, GatewayError> {
        let mut gateway = Self::new(kind, CredentialSource::None, ClientOptions::default())?;
        gateway.set_api_credentials(bundle, mode)?;
        Ok(gateway)
    }

    /// Resolve and install credentials from `bundle`.
    ///
    /// `mode` overrides the bundle's declared mode. On failure the adapter
    /// keeps whatever credentials it had before.
    pub fn set_api_credentials(
        &mut self,
        bundle: &CredentialBundle,
        mode: Option<ApiMode>,
    ) -> Result<(), GatewayError> {
        let resolution = credentials::resolve(bundle, mode, self.kind)?;
        tracing::info!(
            mode = %resolution.credentials.mode,
            kind = %self.kind,
            signing = ?resolution.credentials.signing,
            currency = %resolution.currency,
            "gateway credentials resolved"
        );
        self.credentials = Some(resolution.credentials);
        self.currency = resolution.currency;
        self.payment_action = resolution.payment_action;
        self.locale = resolution.locale;
        self.notify_url = Some(resolution.notify_url);
        Ok(())
    }

    /// Set the currency. Unsupported codes leave the current one in place.
    pub fn set_currency(&mut self, code: &str) -> Result<&mut Self, CurrencyError> {
        self.currency = code.parse()?;
        Ok(self)
    }

    /// Set override fields merged into every following request.
    pub fn add_options(&mut self, options: NvpParams) -> &mut Self {
        self.options = Some(options);
        self
    }

    pub fn clear_options(&mut self) -> &mut Self {
        self.options = None;
        self
    }

    /// Replace the pending request parameters with `fields`.
    pub fn set_request_data(&mut self, fields: NvpParams) -> &NvpParams {
        self.pending = fields;
        &self.pending
    }

    pub fn kind(&self) -> ApiKind {
        self.kind
    }

    pub fn credentials(&self) -> Option<&ResolvedCredentials> {
        self.credentials.as_ref()
    }

    pub fn mode(&self) -> Option<ApiMode> {
        self.credentials.as_ref().map(|c| c.mode)
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    pub fn payment_action(&self) -> &str {
        &self.payment_action
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    pub fn notify_url(&self) -> Option<&str> {
        self.notify_url.as_deref()
    }

    pub fn pending(&self) -> &NvpParams {
        &self.pending
    }

    pub fn options(&self) -> Option<&NvpParams> {
        self.options.as_ref()
    }

    fn reload_credentials(&mut self) -> Result<(), GatewayError> {
        if let Some(loaded) = self.source.load()? {
            self.set_api_credentials(&loaded.bundle, loaded.mode)?;
        }
        Ok(())
    }

    /// Credentials, reloading from the source once if they are unset.
    pub(crate) fn ensure_credentials(&mut self) -> Result<&ResolvedCredentials, GatewayError> {
        if self.credentials.is_none() {
            tracing::debug!("gateway credentials unset, reloading from source");
            self.reload_credentials()?;
        }
        self.credentials
            .as_ref()
            .ok_or(GatewayError::Config(ConfigError::CredentialsNotFound))
    }

    /// Assemble the outgoing request for `method` from the pending
    /// parameters without sending it.
    pub fn prepare(&mut self, method: ApiMethod) -> Result<PreparedRequest, GatewayError> {
        let creds = self.ensure_credentials()?;
        let injected = NvpParams::from([
            ("USER", creds.username.as_str()),
            ("PWD", creds.password.as_str()),
            ("SIGNATURE", creds.signature.as_str()),
            ("VERSION", API_VERSION),
            ("METHOD", method.wire_name()),
        ]);
        let url = if method.is_ipn() {
            creds.webscr_url()?
        } else {
            creds.api_url.clone()
        };

        self.pending.merge(&injected);
        if method.is_ipn() {
            self.pending.remove("METHOD");
        }
        if let Some(options) = &self.options {
            self.pending.merge(options);
        }

        tracing::debug!(
            method = %method,
            url = %url,
            fields = ?self.pending.keys().collect::<Vec<_>>(),
            "assembled NVP request"
        );

        Ok(PreparedRequest {
            method,
            url,
            params: self.pending.clone(),
        })
    }

    /// Assemble and send one request.
    pub async fn dispatch(&mut self, method: ApiMethod) -> Result<GatewayReply, GatewayError> {
        let request = self.prepare(method)?;
        let body = self.send(&request).await?;
        if request.method.is_ipn() {
            Ok(GatewayReply::Raw(body))
        } else {
            Ok(GatewayReply::Nvp(parse_nvp(&body)))
        }
    }

    async fn send(&self, request: &PreparedRequest) -> Result<String, GatewayError> {
        let method = request.method.wire_name().to_string();
        let url = request.url.to_string();

        let mut builder = self
            .http
            .post(request.url.clone())
            .header(reqwest::header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(request.params.to_form_body());
        if let Some(creds) = &self.credentials {
            for (name, value) in self.kind.headers(
                &creds.username,
                &creds.password,
                &creds.signature,
                creds.app_id.as_deref(),
            ) {
                builder = builder.header(name, value);
            }
        }

        let resp = builder.send().await.map_err(|e| {
            tracing::warn!(method = %method, url = %url, "gateway request failed: {e}");
            GatewayError::Request {
                method: method.clone(),
                url: url.clone(),
                message: e.to_string(),
            }
        })?;

        let status = resp.status();
        let body = match resp.text().await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!(method = %method, url = %url, status = status.as_u16(), "unreadable gateway response: {e}");
                return Err(GatewayError::Transport {
                    method,
                    url,
                    status: status.as_u16(),
                    body: format!("unreadable response body: {e}"),
                });
            }
        };

        if status.is_client_error() || status.is_server_error() {
            tracing::warn!(method = %method, url = %url, status = status.as_u16(), "gateway returned error status");
            return Err(GatewayError::Transport {
                method,
                url,
                status: status.as_u16(),
                body,
            });
        }

        tracing::debug!(method = %method, status = status.as_u16(), bytes = body.len(), "gateway replied");
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModeCredentials;

    fn bundle() -> CredentialBundle {
        CredentialBundle {
            mode: Some("sandbox".into()),
            sandbox: Some(ModeCredentials::with_secret("sb_user", "sb_pass", "sb_sig")),
            notify_url: Some("https://shop.example.com/ipn".into()),
            ..Default::default()
        }
    }

    fn gateway() -> NvpGateway {
        NvpGateway::with_credentials(ApiKind::ExpressCheckout, &bundle(), None).unwrap()
    }

    #[test]
    fn set_currency_rejects_and_keeps_previous() {
        let mut gw = gateway();
        gw.set_currency("EUR").unwrap();
        assert_eq!(gw.currency(), Currency::Eur);
        assert!(gw.set_currency("XYZ").is_err());
        assert_eq!(gw.currency(), Currency::Eur);
    }

    #[test]
    fn set_request_data_discards_previous_fields() {
        let mut gw = gateway();
        gw.set_request_data(NvpParams::from([("FIRST", "1"), ("SHARED", "a")]));
        let second = gw.set_request_data(NvpParams::from([("SECOND", "2")]));
        assert!(!second.contains_key("FIRST"));
        assert!(!second.contains_key("SHARED"));
        assert_eq!(second.get("SECOND"), Some("2"));
    }

    #[test]
    fn prepare_injects_credentials_version_and_method() {
        let mut gw = gateway();
        gw.set_request_data(NvpParams::from([("TRANSACTIONID", "T123")]));
        let req = gw.prepare(ApiMethod::RefundTransaction).unwrap();
        assert_eq!(req.params.get("TRANSACTIONID"), Some("T123"));
        assert_eq!(req.params.get("USER"), Some("sb_user"));
        assert_eq!(req.params.get("PWD"), Some("sb_pass"));
        assert_eq!(req.params.get("SIGNATURE"), Some("sb_sig"));
        assert_eq!(req.params.get("VERSION"), Some("123"));
        assert_eq!(req.params.get("METHOD"), Some("RefundTransaction"));
        assert_eq!(req.url.as_str(), "https://api-3t.sandbox.paypal.com/nvp");
    }

    #[test]
    fn prepare_ipn_strips_method_and_targets_webscr() {
        let mut gw = gateway();
        gw.set_request_data(NvpParams::from([("a", "1"), ("b", "2")]));
        let req = gw.prepare(ApiMethod::VerifyIpn).unwrap();
        assert!(!req.params.contains_key("METHOD"));
        assert_eq!(req.params.get("a"), Some("1"));
        assert_eq!(req.params.get("b"), Some("2"));
        assert_eq!(req.url.as_str(), "https://www.sandbox.paypal.com/cgi-bin/webscr");
    }

    #[test]
    fn options_override_injected_fields() {
        let mut gw = gateway();
        gw.add_options(NvpParams::from([("VERSION", "204"), ("METHOD", "Other"), ("X", "y")]));
        gw.set_request_data(NvpParams::new());
        let req = gw.prepare(ApiMethod::TransactionSearch).unwrap();
        assert_eq!(req.params.get("VERSION"), Some("204"));
        assert_eq!(req.params.get("METHOD"), Some("Other"));
        assert_eq!(req.params.get("X"), Some("y"));

        gw.clear_options();
        gw.set_request_data(NvpParams::new());
        let req = gw.prepare(ApiMethod::TransactionSearch).unwrap();
        assert_eq!(req.params.get("VERSION"), Some("123"));
        assert!(!req.params.contains_key("X"));
    }

    #[test]
    fn options_are_merged_into_ipn_requests_too() {
        let mut gw = gateway();
        gw.add_options(NvpParams::from([("METHOD", "forced")]));
        gw.set_request_data(NvpParams::from([("a", "1")]));
        let req = gw.prepare(ApiMethod::VerifyIpn).unwrap();
        assert_eq!(req.params.get("METHOD"), Some("forced"));
    }

    #[test]
    fn prepare_without_credentials_is_config_error() {
        let mut gw =
            NvpGateway::new(ApiKind::ExpressCheckout, CredentialSource::None, ClientOptions::default())
                .unwrap();
        let err = gw.prepare(ApiMethod::RefundTransaction).unwrap_err();
        assert!(matches!(err, GatewayError::Config(ConfigError::CredentialsNotFound)));
    }

    #[test]
    fn construction_loads_from_bundle_source() {
        let gw = NvpGateway::new(
            ApiKind::ExpressCheckout,
            CredentialSource::Bundle(bundle()),
            ClientOptions::default(),
        )
        .unwrap();
        assert_eq!(gw.mode(), Some(ApiMode::Sandbox));
        assert_eq!(gw.notify_url(), Some("https://shop.example.com/ipn"));
        assert_eq!(gw.payment_action(), "Sale");
        assert_eq!(gw.locale(), "en_US");
    }

    #[test]
    fn failed_credential_change_keeps_previous_credentials() {
        let mut gw = gateway();
        let mut broken = bundle();
        broken.notify_url = None;
        assert!(gw.set_api_credentials(&broken, None).is_err());
        assert_eq!(gw.credentials().unwrap().username, "sb_user");
        assert_eq!(gw.notify_url(), Some("https://shop.example.com/ipn"));
    }

    #[test]
    fn reply_conversions() {
        let raw = GatewayReply::Raw("ACK=Success".into());
        assert_eq!(raw.clone().into_raw().as_deref(), Some("ACK=Success"));
        assert_eq!(raw.into_nvp().get("ACK"), Some("Success"));
        let nvp = GatewayReply::Nvp(parse_nvp("ACK=Failure"));
        assert!(nvp.into_raw().is_none());
    }
}
