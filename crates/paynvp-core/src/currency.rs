//! # Currency Whitelist
//!
//! Defines the [`Currency`] enum: the single definition of every currency
//! code the gateway accepts. The set is fixed; `match` on it is exhaustive,
//! so adding a code forces every consumer to handle it.
//!
//! Parsing is case-sensitive (`"usd"` is rejected), matching the gateway's
//! own validation of `CURRENCYCODE`.

use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::CurrencyError;

/// A currency code from the gateway's fixed whitelist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Currency {
    /// Australian dollar.
    Aud,
    /// Brazilian real.
    Brl,
    /// Canadian dollar.
    Cad,
    /// Czech koruna.
    Czk,
    /// Danish krone.
    Dkk,
    /// Euro.
    Eur,
    /// Hong Kong dollar.
    Hkd,
    /// Hungarian forint.
    Huf,
    /// Israeli new shekel.
    Ils,
    /// Japanese yen.
    Jpy,
    /// Malaysian ringgit.
    Myr,
    /// Mexican peso.
    Mxn,
    /// Norwegian krone.
    Nok,
    /// New Zealand dollar.
    Nzd,
    /// Philippine peso.
    Php,
    /// Polish złoty.
    Pln,
    /// Pound sterling.
    Gbp,
    /// Singapore dollar.
    Sgd,
    /// Swedish krona.
    Sek,
    /// Swiss franc.
    Chf,
    /// New Taiwan dollar.
    Twd,
    /// Thai baht.
    Thb,
    /// United States dollar.
    #[default]
    Usd,
    /// Russian ruble.
    Rub,
}

impl Currency {
    /// The total number of supported currencies.
    pub const COUNT: usize = 24;

    /// Return every supported currency, in the gateway's documented order.
    pub fn all() -> &'static [Currency] {
        &[
            Self::Aud,
            Self::Brl,
            Self::Cad,
            Self::Czk,
            Self::Dkk,
            Self::Eur,
            Self::Hkd,
            Self::Huf,
            Self::Ils,
            Self::Jpy,
            Self::Myr,
            Self::Mxn,
            Self::Nok,
            Self::Nzd,
            Self::Php,
            Self::Pln,
            Self::Gbp,
            Self::Sgd,
            Self::Sek,
            Self::Chf,
            Self::Twd,
            Self::Thb,
            Self::Usd,
            Self::Rub,
        ]
    }

    /// The ISO 4217 code sent on the wire.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Aud => "AUD",
            Self::Brl => "BRL",
            Self::Cad => "CAD",
            Self::Czk => "CZK",
            Self::Dkk => "DKK",
            Self::Eur => "EUR",
            Self::Hkd => "HKD",
            Self::Huf => "HUF",
            Self::Ils => "ILS",
            Self::Jpy => "JPY",
            Self::Myr => "MYR",
            Self::Mxn => "MXN",
            Self::Nok => "NOK",
            Self::Nzd => "NZD",
            Self::Php => "PHP",
            Self::Pln => "PLN",
            Self::Gbp => "GBP",
            Self::Sgd => "SGD",
            Self::Sek => "SEK",
            Self::Chf => "CHF",
            Self::Twd => "TWD",
            Self::Thb => "THB",
            Self::Usd => "USD",
            Self::Rub => "RUB",
        }
    }
}

impl FromStr for Currency {
    type Err = CurrencyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|c| c.code() == s)
            .ok_or_else(|| CurrencyError::Unsupported(s.to_string()))
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl Serialize for Currency {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code())
    }
}

impl<'de> Deserialize<'de> for Currency {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_has_count_entries() {
        assert_eq!(Currency::all().len(), Currency::COUNT);
    }

    #[test]
    fn every_code_parses_back() {
        for c in Currency::all() {
            assert_eq!(c.code().parse::<Currency>().unwrap(), *c);
        }
    }

    #[test]
    fn default_is_usd() {
        assert_eq!(Currency::default(), Currency::Usd);
    }

    #[test]
    fn rejects_codes_outside_whitelist() {
        for bad in ["XYZ", "INR", "usd", "", " USD"] {
            let err = bad.parse::<Currency>().unwrap_err();
            assert_eq!(err, CurrencyError::Unsupported(bad.to_string()));
        }
    }

    #[test]
    fn serde_uses_wire_code() {
        let json = serde_json::to_string(&Currency::Gbp).unwrap();
        assert_eq!(json, "\"GBP\"");
        let back: Currency = serde_json::from_str("\"JPY\"").unwrap();
        assert_eq!(back, Currency::Jpy);
        assert!(serde_json::from_str::<Currency>("\"ZZZ\"").is_err());
    }
}
