//! API mode selection (sandbox vs. live credentials and endpoints).

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ModeError;

/// Which credential set and endpoint family a request targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiMode {
    Sandbox,
    #[default]
    Live,
}

impl ApiMode {
    /// Resolve a declared mode leniently.
    ///
    /// Anything other than exactly `"sandbox"` or `"live"` (including an
    /// absent or empty declaration) resolves to [`ApiMode::Live`].
    pub fn from_declared(declared: Option<&str>) -> Self {
        declared
            .and_then(|s| s.parse().ok())
            .unwrap_or_default()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sandbox => "sandbox",
            Self::Live => "live",
        }
    }

    pub fn is_sandbox(&self) -> bool {
        matches!(self, Self::Sandbox)
    }
}

impl FromStr for ApiMode {
    type Err = ModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sandbox" => Ok(Self::Sandbox),
            "live" => Ok(Self::Live),
            other => Err(ModeError::Invalid(other.to_string())),
        }
    }
}

impl std::fmt::Display for ApiMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declared_sandbox_and_live_are_honoured() {
        assert_eq!(ApiMode::from_declared(Some("sandbox")), ApiMode::Sandbox);
        assert_eq!(ApiMode::from_declared(Some("live")), ApiMode::Live);
    }

    #[test]
    fn unknown_or_missing_declaration_falls_back_to_live() {
        assert_eq!(ApiMode::from_declared(None), ApiMode::Live);
        assert_eq!(ApiMode::from_declared(Some("")), ApiMode::Live);
        assert_eq!(ApiMode::from_declared(Some("staging")), ApiMode::Live);
        assert_eq!(ApiMode::from_declared(Some("Sandbox")), ApiMode::Live);
    }

    #[test]
    fn strict_parse_rejects_unknown() {
        assert!("production".parse::<ApiMode>().is_err());
    }
}
