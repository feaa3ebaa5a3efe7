//! Ticker Symbols
//!
//! Symbols typed at the prompt are trimmed and uppercased before they reach a
//! provider. Stock tickers (`AAPL`, `BRK.B`) and crypto pairs (`BTC/USD`) share
//! the same alphabet.

use std::fmt;

/// Longest symbol accepted (option contracts top out at 21 characters).
pub const MAX_SYMBOL_LEN: usize = 21;

/// Symbol validation errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SymbolError {
    /// Nothing left after trimming.
    #[error("symbol cannot be empty")]
    Empty,
    /// Longer than [`MAX_SYMBOL_LEN`].
    #[error("symbol '{0}' is too long")]
    TooLong(String),
    /// Contains a character outside `A-Z`, `0-9`, `.`, `/`, `-`.
    #[error("symbol '{symbol}' contains invalid character '{found}'")]
    InvalidCharacter {
        /// Normalized symbol.
        symbol: String,
        /// First offending character.
        found: char,
    },
}

/// A normalized, uppercased ticker symbol.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol(String);

impl Symbol {
    /// Normalize and validate raw user input.
    pub fn parse(raw: &str) -> Result<Self, SymbolError> {
        let normalized = raw.trim().to_ascii_uppercase();
        if normalized.is_empty() {
            return Err(SymbolError::Empty);
        }
        if normalized.len() > MAX_SYMBOL_LEN {
            return Err(SymbolError::TooLong(normalized));
        }
        if let Some(found) = normalized
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '.' | '/' | '-')))
        {
            return Err(SymbolError::InvalidCharacter {
                symbol: normalized,
                found,
            });
        }
        Ok(Self(normalized))
    }

    /// The normalized symbol text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Symbol {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
