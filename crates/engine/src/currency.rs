use serde::{Deserialize, Serialize};

use crate::EngineError;

/// Three-letter currency code used as a fund's default currency.
///
/// The engine does not keep a registry of known currencies: any three ASCII
/// letters are accepted and normalized to upper case (`usd` -> `USD`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CurrencyCode([u8; 3]);

impl CurrencyCode {
    /// Canonical currency code.
    #[must_use]
    pub fn code(&self) -> &str {
        // Only ASCII letters are ever stored.
        std::str::from_utf8(&self.0).unwrap_or("???")
    }
}

impl core::fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.code())
    }
}

impl TryFrom<&str> for CurrencyCode {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let trimmed = value.trim();
        let bytes = trimmed.as_bytes();
        if bytes.len() != 3 || !bytes.iter().all(u8::is_ascii_alphabetic) {
            return Err(EngineError::InvalidCurrency(format!(
                "unsupported currency: {trimmed}"
            )));
        }
        let mut code = [0u8; 3];
        for (slot, byte) in code.iter_mut().zip(bytes) {
            *slot = byte.to_ascii_uppercase();
        }
        Ok(Self(code))
    }
}

impl TryFrom<String> for CurrencyCode {
    type Error = EngineError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::try_from(value.as_str())
    }
}

impl From<CurrencyCode> for String {
    fn from(value: CurrencyCode) -> Self {
        value.code().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_case_and_whitespace() {
        let code = CurrencyCode::try_from(" usd ").unwrap();
        assert_eq!(code.code(), "USD");
        assert_eq!(code.to_string(), "USD");
    }

    #[test]
    fn rejects_wrong_length_and_digits() {
        for raw in ["", "EU", "EURO", "U5D", "€UR"] {
            assert!(matches!(
                CurrencyCode::try_from(raw),
                Err(EngineError::InvalidCurrency(_))
            ));
        }
    }
}
