//! # NVP Response Codec
//!
//! Decodes the gateway's flat `key=value&key=value` reply body into an
//! [`NvpResponse`]. Decoding is permissive, the same as any query-string
//! parser: pairs without `=` decode to an empty value, empty segments are
//! skipped, and a repeated key keeps its last value. No schema is
//! enforced here; callers read the fields they need.
//!
//! The gateway reports errors as indexed groups
//! (`L_ERRORCODE0`, `L_SHORTMESSAGE0`, `L_LONGMESSAGE0`,
//! `L_SEVERITYCODE0`, then `...1`, ...). [`NvpResponse::errors`] collects
//! them in index order.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Decode a URL-encoded NVP body into an [`NvpResponse`].
pub fn parse_nvp(body: &str) -> NvpResponse {
    let mut fields = IndexMap::new();
    for (k, v) in url::form_urlencoded::parse(body.as_bytes()) {
        if k.is_empty() {
            continue;
        }
        fields.insert(k.into_owned(), v.into_owned());
    }
    NvpResponse(fields)
}

/// The `ACK` status the gateway attaches to every API reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Ack {
    Success,
    SuccessWithWarning,
    Failure,
    FailureWithWarning,
    /// A value the gateway documents for other products, or a typo.
    Unknown(String),
}

impl Ack {
    fn from_wire(s: &str) -> Self {
        match s {
            "Success" => Self::Success,
            "SuccessWithWarning" => Self::SuccessWithWarning,
            "Failure" => Self::Failure,
            "FailureWithWarning" => Self::FailureWithWarning,
            other => Self::Unknown(other.to_string()),
        }
    }

    /// True for `Success` and `SuccessWithWarning`.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success | Self::SuccessWithWarning)
    }
}

/// One indexed error group from a failed reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NvpError {
    pub code: String,
    pub short_message: Option<String>,
    pub long_message: Option<String>,
    pub severity: Option<String>,
}

/// A decoded NVP reply, in the order the gateway sent the fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NvpResponse(IndexMap<String, String>);

impl NvpResponse {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// The parsed `ACK` field, if the reply carried one.
    pub fn ack(&self) -> Option<Ack> {
        self.get("ACK").map(Ack::from_wire)
    }

    pub fn is_success(&self) -> bool {
        self.ack().is_some_and(|a| a.is_success())
    }

    /// Collect `L_ERRORCODEn` groups, stopping at the first missing index.
    pub fn errors(&self) -> Vec<NvpError> {
        let mut out = Vec::new();
        for n in 0.. {
            let Some(code) = self.get(&format!("L_ERRORCODE{n}")) else {
                break;
            };
            out.push(NvpError {
                code: code.to_string(),
                short_message: self.get(&format!("L_SHORTMESSAGE{n}")).map(str::to_string),
                long_message: self.get(&format!("L_LONGMESSAGE{n}")).map(str::to_string),
                severity: self.get(&format!("L_SEVERITYCODE{n}")).map(str::to_string),
            });
        }
        out
    }

    pub fn into_inner(self) -> IndexMap<String, String> {
        self.0
    }
}

impl FromIterator<(String, String)> for NvpResponse {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
