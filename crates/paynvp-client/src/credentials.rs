//! Credential resolution: from a [`CredentialBundle`] to the signed
//! credential set an adapter dispatches with.
//!
//! Resolution is all-or-nothing. Every fallible step (mode lookup,
//! certificate read, endpoint defaults, currency validation, notify URL)
//! runs before anything is returned, so a failed resolution never leaves an
//! adapter half-configured.

use paynvp_core::{ApiMode, Currency};
use url::Url;
use zeroize::Zeroizing;

use crate::config::{ConfigError, CredentialBundle, ModeCredentials};
use crate::error::GatewayError;
use crate::kind::{ApiKind, SigningMethod};

pub const DEFAULT_PAYMENT_ACTION: &str = "Sale";
pub const DEFAULT_LOCALE: &str = "en_US";

/// Signed credentials and endpoints for one mode and API kind.
///
/// Custom `Debug` implementation redacts `password` and `signature`.
#[derive(Clone)]
pub struct ResolvedCredentials {
    pub mode: ApiMode,
    pub kind: ApiKind,
    pub username: String,
    pub password: Zeroizing<String>,
    pub signature: Zeroizing<String>,
    pub signing: SigningMethod,
    pub api_url: Url,
    pub gateway_url: Url,
    pub app_id: Option<String>,
}

impl std::fmt::Debug for ResolvedCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedCredentials")
            .field("mode", &self.mode)
            .field("kind", &self.kind)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("signature", &"[REDACTED]")
            .field("signing", &self.signing)
            .field("api_url", &self.api_url)
            .field("gateway_url", &self.gateway_url)
            .field("app_id", &self.app_id)
            .finish()
    }
}

impl ResolvedCredentials {
    /// The IPN echo endpoint: `{gateway_url}/cgi-bin/webscr`.
    pub fn webscr_url(&self) -> Result<Url, ConfigError> {
        let raw = format!("{}/cgi-bin/webscr", self.gateway_url.as_str().trim_end_matches('/'));
        Url::parse(&raw).map_err(|e| ConfigError::InvalidUrl {
            field: "gateway_url".to_string(),
            reason: e.to_string(),
        })
    }
}

/// Everything `set_api_credentials` installs on an adapter.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub credentials: ResolvedCredentials,
    pub currency: Currency,
    pub payment_action: String,
    pub locale: String,
    pub notify_url: String,
}

/// Resolve `bundle` for `kind`, using `mode` if given and the bundle's
/// declared mode otherwise.
pub fn resolve(
    bundle: &CredentialBundle,
    mode: Option<ApiMode>,
    kind: ApiKind,
) -> Result<Resolution, GatewayError> {
    let mode = mode.unwrap_or_else(|| bundle.declared_mode());
    let creds = bundle.for_mode(mode).ok_or(ConfigError::MissingMode(mode))?;

    let (signature, signing) = derive_signature(mode, creds)?;
    let endpoints = kind.configure(mode, creds, &signing)?;

    let currency = match non_empty(&creds.currency).or(non_empty(&bundle.currency)) {
        Some(code) => code.parse::<Currency>()?,
        None => Currency::default(),
    };
    let payment_action = non_empty(&creds.payment_action)
        .or(non_empty(&bundle.payment_action))
        .unwrap_or(DEFAULT_PAYMENT_ACTION)
        .to_string();
    let locale = non_empty(&creds.locale)
        .or(non_empty(&bundle.locale))
        .unwrap_or(DEFAULT_LOCALE)
        .to_string();
    let notify_url = non_empty(&creds.notify_url)
        .or(non_empty(&bundle.notify_url))
        .ok_or(ConfigError::MissingNotifyUrl)?
        .to_string();

    Ok(Resolution {
        credentials: ResolvedCredentials {
            mode,
            kind,
            username: creds.username.clone(),
            password: creds.password.clone(),
            signature,
            signing,
            api_url: endpoints.api_url,
            gateway_url: endpoints.gateway_url,
            app_id: endpoints.app_id,
        },
        currency,
        payment_action,
        locale,
        notify_url,
    })
}

/// The shared secret if one is set, otherwise the certificate file contents.
fn derive_signature(
    mode: ApiMode,
    creds: &ModeCredentials,
) -> Result<(Zeroizing<String>, SigningMethod), ConfigError> {
    if let Some(secret) = creds.secret.as_ref().filter(|s| !s.is_empty()) {
        return Ok((secret.clone(), SigningMethod::Secret));
    }
    let path = creds
        .certificate
        .as_ref()
        .ok_or(ConfigError::MissingSignature(mode))?;
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Certificate {
        path: path.clone(),
        source: e,
    })?;
    Ok((Zeroizing::new(contents), SigningMethod::Certificate(path.clone())))
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}
