//! # API Kinds and Methods
//!
//! The gateway exposes two API families over the same NVP credentials:
//! ExpressCheckout (the classic merchant API) and AdaptivePayments. An
//! adapter is bound to one [`ApiKind`] at construction. The kind decides the
//! default endpoints for each mode and any extra identification headers.
//!
//! [`ApiMethod`] names the `METHOD` value sent with each request.

use paynvp_core::ApiMode;
use url::Url;

use crate::config::{ConfigError, ModeCredentials};

/// Public application id the gateway accepts for every sandbox
/// AdaptivePayments account.
pub const SANDBOX_APP_ID: &str = "APP-80W284485P519543T";

/// How requests are signed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SigningMethod {
    /// A shared-secret signature string.
    Secret,
    /// The contents of the certificate file at this path.
    Certificate(std::path::PathBuf),
}

/// Endpoints and identifiers resolved for one kind and mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub api_url: Url,
    pub gateway_url: Url,
    pub app_id: Option<String>,
}

/// The API family an adapter speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiKind {
    ExpressCheckout,
    AdaptivePayments,
}

impl ApiKind {
    /// Resolve endpoints for `mode`, preferring explicit overrides in `creds`.
    pub fn configure(
        &self,
        mode: ApiMode,
        creds: &ModeCredentials,
        signing: &SigningMethod,
    ) -> Result<Endpoints, ConfigError> {
        let gateway_default = if mode.is_sandbox() {
            "https://www.sandbox.paypal.com"
        } else {
            "https://www.paypal.com"
        };

        match self {
            Self::ExpressCheckout => {
                // Certificate-signed calls go to the non-3t hosts.
                let api_default = match (mode, signing) {
                    (ApiMode::Sandbox, SigningMethod::Secret) => "https://api-3t.sandbox.paypal.com/nvp",
                    (ApiMode::Sandbox, SigningMethod::Certificate(_)) => "https://api.sandbox.paypal.com/nvp",
                    (ApiMode::Live, SigningMethod::Secret) => "https://api-3t.paypal.com/nvp",
                    (ApiMode::Live, SigningMethod::Certificate(_)) => "https://api.paypal.com/nvp",
                };
                Ok(Endpoints {
                    api_url: endpoint(creds.api_url.as_ref(), api_default, "api_url")?,
                    gateway_url: endpoint(creds.gateway_url.as_ref(), gateway_default, "gateway_url")?,
                    app_id: creds.app_id.clone(),
                })
            }
            Self::AdaptivePayments => {
                // The signature travels in a header, which cannot carry PEM text.
                if let SigningMethod::Certificate(path) = signing {
                    return Err(ConfigError::CertificateSigningUnsupported {
                        kind: self.to_string(),
                        path: path.clone(),
                    });
                }
                let api_default = if mode.is_sandbox() {
                    "https://svcs.sandbox.paypal.com/AdaptivePayments"
                } else {
                    "https://svcs.paypal.com/AdaptivePayments"
                };
                let app_id = match (&creds.app_id, mode) {
                    (Some(id), _) if !id.is_empty() => id.clone(),
                    (_, ApiMode::Sandbox) => SANDBOX_APP_ID.to_string(),
                    (_, ApiMode::Live) => return Err(ConfigError::MissingAppId(mode)),
                };
                Ok(Endpoints {
                    api_url: endpoint(creds.api_url.as_ref(), api_default, "api_url")?,
                    gateway_url: endpoint(creds.gateway_url.as_ref(), gateway_default, "gateway_url")?,
                    app_id: Some(app_id),
                })
            }
        }
    }

    /// Extra HTTP headers this kind attaches to every request.
    pub fn headers(
        &self,
        username: &str,
        password: &str,
        signature: &str,
        app_id: Option<&str>,
    ) -> Vec<(&'static str, String)> {
        match self {
            Self::ExpressCheckout => Vec::new(),
            Self::AdaptivePayments => vec![
                ("X-PAYPAL-SECURITY-USERID", username.to_string()),
                ("X-PAYPAL-SECURITY-PASSWORD", password.to_string()),
                ("X-PAYPAL-SECURITY-SIGNATURE", signature.to_string()),
                ("X-PAYPAL-APPLICATION-ID", app_id.unwrap_or_default().to_string()),
                ("X-PAYPAL-REQUEST-DATA-FORMAT", "NV".to_string()),
                ("X-PAYPAL-RESPONSE-DATA-FORMAT", "NV".to_string()),
            ],
        }
    }
}

impl std::fmt::Display for ApiKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ExpressCheckout => write!(f, "ExpressCheckout"),
            Self::AdaptivePayments => write!(f, "AdaptivePayments"),
        }
    }
}

fn endpoint(explicit: Option<&Url>, default: &str, field: &str) -> Result<Url, ConfigError> {
    match explicit {
        Some(url) => Ok(url.clone()),
        None => Url::parse(default).map_err(|e| ConfigError::InvalidUrl {
            field: field.to_string(),
            reason: e.to_string(),
        }),
    }
}

/// The `METHOD` of an NVP call.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ApiMethod {
    RefundTransaction,
    TransactionSearch,
    GetTransactionDetails,
    DoVoid,
    DoCapture,
    SetExpressCheckout,
    /// Echo a received IPN back to the gateway web endpoint.
    VerifyIpn,
    /// Any other NVP method, sent verbatim.
    Custom(String),
}

impl ApiMethod {
    pub fn wire_name(&self) -> &str {
        match self {
            Self::RefundTransaction => "RefundTransaction",
            Self::TransactionSearch => "TransactionSearch",
            Self::GetTransactionDetails => "GetTransactionDetails",
            Self::DoVoid => "DoVoid",
            Self::DoCapture => "DoCapture",
            Self::SetExpressCheckout => "SetExpressCheckout",
            Self::VerifyIpn => "verifyipn",
            Self::Custom(name) => name,
        }
    }

    pub fn is_ipn(&self) -> bool {
        matches!(self, Self::VerifyIpn)
    }
}

impl std::fmt::Display for ApiMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.wire_name())
    }
}
