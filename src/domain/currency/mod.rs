//! Currency codes supported for subscription pricing
//!
//! Every aggregate amount in the system is expressed in the home currency
//! (TWD); prices entered in other currencies are normalized through the
//! exchange rate provider.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Currency a subscription price can be denominated in
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    /// New Taiwan dollar - the home currency
    Twd,
    Usd,
    Eur,
    Jpy,
    Gbp,
    Krw,
    Cny,
}

impl Currency {
    /// The currency all prices are normalized into
    pub const HOME: Currency = Currency::Twd;

    /// Every supported currency, home currency first
    pub const ALL: [Currency; 7] = [
        Currency::Twd,
        Currency::Usd,
        Currency::Eur,
        Currency::Jpy,
        Currency::Gbp,
        Currency::Krw,
        Currency::Cny,
    ];

    /// ISO-style three-letter code
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Twd => "TWD",
            Self::Usd => "USD",
            Self::Eur => "EUR",
            Self::Jpy => "JPY",
            Self::Gbp => "GBP",
            Self::Krw => "KRW",
            Self::Cny => "CNY",
        }
    }

    /// Human-readable name shown in currency listings
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::Twd => "新台幣",
            Self::Usd => "美元",
            Self::Eur => "歐元",
            Self::Jpy => "日圓",
            Self::Gbp => "英鎊",
            Self::Krw => "韓元",
            Self::Cny => "人民幣",
        }
    }

    /// Whether this is the home currency (no conversion needed)
    pub fn is_home(&self) -> bool {
        *self == Self::HOME
    }

    /// Parse a currency code, case-insensitively
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_uppercase().as_str() {
            "TWD" => Some(Self::Twd),
            "USD" => Some(Self::Usd),
            "EUR" => Some(Self::Eur),
            "JPY" => Some(Self::Jpy),
            "GBP" => Some(Self::Gbp),
            "KRW" => Some(Self::Krw),
            "CNY" => Some(Self::Cny),
            _ => None,
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Round a monetary amount or percentage to two decimal places
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_home_currency() {
        assert_eq!(Currency::HOME, Currency::Twd);
        assert!(Currency::Twd.is_home());
        assert!(!Currency::Usd.is_home());
    }

    #[test]
    fn test_from_code() {
        assert_eq!(Currency::from_code("USD"), Some(Currency::Usd));
        assert_eq!(Currency::from_code("usd"), Some(Currency::Usd));
        assert_eq!(Currency::from_code(" twd "), Some(Currency::Twd));
        assert_eq!(Currency::from_code("XXX"), None);
        assert_eq!(Currency::from_code(""), None);
    }

    #[test]
    fn test_code_round_trip() {
        for currency in Currency::ALL {
            assert_eq!(Currency::from_code(currency.code()), Some(currency));
        }
    }

    #[test]
    fn test_serde_uses_codes() {
        let json = serde_json::to_string(&Currency::Jpy).unwrap();
        assert_eq!(json, "\"JPY\"");

        let parsed: Currency = serde_json::from_str("\"GBP\"").unwrap();
        assert_eq!(parsed, Currency::Gbp);
    }

    #[test]
    fn test_display_names_cover_all() {
        for currency in Currency::ALL {
            assert!(!currency.display_name().is_empty());
        }
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(140.0), 140.0);
        assert_eq!(round2(33.333333), 33.33);
        assert_eq!(round2(116.66666), 116.67);
        assert_eq!(round2(120.004), 120.0);
    }
}
