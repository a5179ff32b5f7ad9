//! Gateway credential configuration.
//!
//! A [`CredentialBundle`] holds one [`ModeCredentials`] set per API mode plus
//! bundle-wide defaults. Bundles are usually loaded from YAML:
//!
//! ```yaml
//! mode: sandbox
//! currency: EUR
//! notify_url: https://shop.example.com/ipn
//! sandbox:
//!   username: seller_api1.example.com
//!   password: "1234567890"
//!   secret: A1b2C3d4E5f6
//! live:
//!   username: seller_api1.example.com
//!   password: "..."
//!   certificate: /etc/paynvp/cert_key.pem
//! ```
//!
//! Where the bundle comes from is decided by a [`CredentialSource`] handed to
//! the adapter at construction. There is no global lookup.

use std::path::{Path, PathBuf};

use paynvp_core::ApiMode;
use serde::Deserialize;
use url::Url;
use zeroize::Zeroizing;

/// Environment variable naming the YAML bundle for [`CredentialSource::Env`].
pub const CONFIG_PATH_VAR: &str = "PAYNVP_CONFIG";
/// Environment variable forcing the API mode for [`CredentialSource::Env`].
pub const MODE_VAR: &str = "PAYNVP_MODE";
/// Environment variable overriding the HTTP timeout.
pub const TIMEOUT_VAR: &str = "PAYNVP_TIMEOUT_SECS";

/// Credentials and endpoint overrides for a single API mode.
///
/// Custom `Debug` implementation redacts `password` and `secret`.
#[derive(Clone, Deserialize)]
pub struct ModeCredentials {
    /// API username.
    pub username: String,
    /// API password.
    pub password: Zeroizing<String>,
    /// Shared-secret signature. Takes precedence over `certificate`.
    #[serde(default)]
    pub secret: Option<Zeroizing<String>>,
    /// Path to the API certificate, read when no `secret` is configured.
    #[serde(default)]
    pub certificate: Option<PathBuf>,
    /// NVP API endpoint. Defaults depend on the API kind and mode.
    #[serde(default)]
    pub api_url: Option<Url>,
    /// Web endpoint host used for IPN verification and checkout redirects.
    #[serde(default)]
    pub gateway_url: Option<Url>,
    /// Application id, required by AdaptivePayments in live mode.
    #[serde(default)]
    pub app_id: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub payment_action: Option<String>,
    #[serde(default)]
    pub locale: Option<String>,
    #[serde(default)]
    pub notify_url: Option<String>,
}

impl std::fmt::Debug for ModeCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModeCredentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("secret", &self.secret.as_ref().map(|_| "[REDACTED]"))
            .field("certificate", &self.certificate)
            .field("api_url", &self.api_url)
            .field("gateway_url", &self.gateway_url)
            .field("app_id", &self.app_id)
            .field("currency", &self.currency)
            .field("payment_action", &self.payment_action)
            .field("locale", &self.locale)
            .field("notify_url", &self.notify_url)
            .finish()
    }
}

impl ModeCredentials {
    /// Credentials signed with a shared secret and no other overrides.
    pub fn with_secret(
        username: impl Into<String>,
        password: impl Into<String>,
        secret: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password: Zeroizing::new(password.into()),
            secret: Some(Zeroizing::new(secret.into())),
            certificate: None,
            api_url: None,
            gateway_url: None,
            app_id: None,
            currency: None,
            payment_action: None,
            locale: None,
            notify_url: None,
        }
    }

    /// Credentials signed with the contents of a certificate file.
    pub fn with_certificate(
        username: impl Into<String>,
        password: impl Into<String>,
        certificate: impl Into<PathBuf>,
    ) -> Self {
        Self {
            secret: None,
            certificate: Some(certificate.into()),
            ..Self::with_secret(username, password, "")
        }
    }
}

/// A full credential bundle: per-mode credentials plus shared defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CredentialBundle {
    /// Declared mode. Anything but `sandbox`/`live` means `live`.
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub sandbox: Option<ModeCredentials>,
    #[serde(default)]
    pub live: Option<ModeCredentials>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub payment_action: Option<String>,
    #[serde(default)]
    pub locale: Option<String>,
    #[serde(default)]
    pub notify_url: Option<String>,
}

impl CredentialBundle {
    /// Parse a bundle from YAML text.
    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(content).map_err(|e| ConfigError::Parse {
            path: PathBuf::from("<inline>"),
            source: e,
        })
    }

    /// Load a bundle from a YAML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        serde_yaml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// The mode this bundle declares, resolved leniently.
    pub fn declared_mode(&self) -> ApiMode {
        ApiMode::from_declared(self.mode.as_deref())
    }

    pub fn for_mode(&self, mode: ApiMode) -> Option<&ModeCredentials> {
        match mode {
            ApiMode::Sandbox => self.sandbox.as_ref(),
            ApiMode::Live => self.live.as_ref(),
        }
    }
}

/// A bundle produced by a [`CredentialSource`], with an optional forced mode.
#[derive(Debug, Clone)]
pub struct LoadedCredentials {
    pub bundle: CredentialBundle,
    pub mode: Option<ApiMode>,
}

/// Where the adapter loads its credential bundle from.
///
/// The adapter consults its source once at construction and once more on
/// the first dispatch that finds credentials unset.
#[derive(Debug, Clone, Default)]
pub enum CredentialSource {
    /// Credentials are supplied programmatically via `set_api_credentials`.
    #[default]
    None,
    /// A YAML bundle at a fixed path.
    File(PathBuf),
    /// A YAML bundle at the path named by `PAYNVP_CONFIG`, with the mode
    /// optionally forced by `PAYNVP_MODE`. An unset `PAYNVP_CONFIG` yields
    /// no credentials rather than an error.
    Env,
    /// An in-memory bundle.
    Bundle(CredentialBundle),
}

impl CredentialSource {
    pub fn load(&self) -> Result<Option<LoadedCredentials>, ConfigError> {
        match self {
            Self::None => Ok(None),
            Self::File(path) => Ok(Some(LoadedCredentials {
                bundle: CredentialBundle::from_file(path)?,
                mode: None,
            })),
            Self::Env => {
                let Ok(path) = std::env::var(CONFIG_PATH_VAR) else {
                    return Ok(None);
                };
                let mode = match std::env::var(MODE_VAR) {
                    Ok(raw) => Some(raw.parse::<ApiMode>().map_err(|_| ConfigError::InvalidMode {
                        var: MODE_VAR.to_string(),
                        value: raw,
                    })?),
                    Err(_) => None,
                };
                Ok(Some(LoadedCredentials {
                    bundle: CredentialBundle::from_file(Path::new(&path))?,
                    mode,
                }))
            }
            Self::Bundle(bundle) => Ok(Some(LoadedCredentials {
                bundle: bundle.clone(),
                mode: None,
            })),
        }
    }
}

/// HTTP client settings.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self { timeout_secs: 30 }
    }
}

impl ClientOptions {
    /// Read `PAYNVP_TIMEOUT_SECS` (default: 30).
    pub fn from_env() -> Self {
        Self {
            timeout_secs: std::env::var(TIMEOUT_VAR)
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(30),
        }
    }
}

/// Configuration errors. All of them are fatal for the call that hit them.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("gateway API settings not found")]
    CredentialsNotFound,
    #[error("no credentials configured for {0} mode")]
    MissingMode(ApiMode),
    #[error("neither a secret nor a certificate is configured for {0} mode")]
    MissingSignature(ApiMode),
    #[error("failed to read API certificate {path}: {source}")]
    Certificate {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("notify_url is required")]
    MissingNotifyUrl,
    #[error("{kind} cannot sign with certificate {}; configure a secret", .path.display())]
    CertificateSigningUnsupported { kind: String, path: PathBuf },
    #[error("app_id is required for AdaptivePayments in {0} mode")]
    MissingAppId(ApiMode),
    #[error("invalid URL for {field}: {reason}")]
    InvalidUrl { field: String, reason: String },
    #[error("invalid value {value:?} for {var}")]
    InvalidMode { var: String, value: String },
    #[error("failed to read configuration {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse configuration {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },
}
