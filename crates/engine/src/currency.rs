use serde::{Deserialize, Serialize};

use crate::EngineError;

/// ISO 4217-style currency code attached to a transaction.
///
/// Codes are three ASCII letters, stored upper case. The engine does not
/// convert between currencies and does not require one query window to be
/// single-currency: aggregates simply carry the tag of a representative
/// transaction (see [`crate::aggregate`]).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Currency(String);

impl Currency {
    /// Tag reported when there is no transaction to take a currency from.
    pub const DEFAULT_CODE: &'static str = "USD";

    /// Canonical currency code.
    #[must_use]
    pub fn code(&self) -> &str {
        &self.0
    }
}

impl Default for Currency {
    fn default() -> Self {
        Self(Self::DEFAULT_CODE.to_string())
    }
}

impl core::fmt::Display for Currency {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.code())
    }
}

impl TryFrom<&str> for Currency {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let code = value.trim();
        if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(EngineError::InvalidArgument(format!(
                "invalid currency code: {value}"
            )));
        }
        Ok(Currency(code.to_ascii_uppercase()))
    }
}

impl TryFrom<String> for Currency {
    type Error = EngineError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Currency::try_from(value.as_str())
    }
}

impl From<Currency> for String {
    fn from(value: Currency) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_normalised_to_upper_case() {
        assert_eq!(Currency::try_from(" inr ").unwrap().code(), "INR");
        assert_eq!(Currency::default().code(), "USD");
    }

    #[test]
    fn rejects_malformed_codes() {
        assert!(Currency::try_from("EURO").is_err());
        assert!(Currency::try_from("E1R").is_err());
        assert!(Currency::try_from("").is_err());
    }
}
