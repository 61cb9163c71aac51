use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::ValidationError;

const MAX_SYMBOL_LEN: usize = 15;

/// Normalized market symbol/ticker.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Symbol(String);

impl Symbol {
    /// Parse and normalize a symbol to uppercase.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptySymbol);
        }

        let normalized = trimmed.to_ascii_uppercase();
        let len = normalized.chars().count();
        if len > MAX_SYMBOL_LEN {
            return Err(ValidationError::SymbolTooLong {
                len,
                max: MAX_SYMBOL_LEN,
            });
        }

        if let Some(first) = normalized.chars().next() {
            if !first.is_ascii_alphabetic() {
                return Err(ValidationError::SymbolInvalidStart { ch: first });
            }
        }

        for (index, ch) in normalized.chars().enumerate() {
            let valid = ch.is_ascii_alphanumeric() || ch == '.' || ch == '-';
            if !valid {
                return Err(ValidationError::SymbolInvalidChar { ch, index });
            }
        }

        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Symbol {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for Symbol {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl TryFrom<&str> for Symbol {
    type Error = ValidationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<Symbol> for String {
    fn from(value: Symbol) -> Self {
        value.0
    }
}

/// One comma-separated entry of the user's ticker input.
#[derive(Debug, Clone, PartialEq)]
pub enum TickerEntry {
    Valid(Symbol),
    Rejected { raw: String, error: ValidationError },
}

impl TickerEntry {
    /// Label used when reporting this entry: the normalized symbol, or the
    /// uppercased raw text for rejected entries.
    pub fn label(&self) -> String {
        match self {
            Self::Valid(symbol) => symbol.to_string(),
            Self::Rejected { raw, .. } => raw.to_ascii_uppercase(),
        }
    }
}

/// Parsed ticker input, in input order.
///
/// Blank entries are discarded. Entries that fail [`Symbol::parse`] are kept as
/// [`TickerEntry::Rejected`] so they can be reported next to the other tickers
/// rather than failing the whole batch.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TickerList {
    entries: Vec<TickerEntry>,
}

impl TickerList {
    pub fn parse(input: &str) -> Self {
        let entries = input
            .split(',')
            .map(str::trim)
            .filter(|raw| !raw.is_empty())
            .map(|raw| match Symbol::parse(raw) {
                Ok(symbol) => TickerEntry::Valid(symbol),
                Err(error) => TickerEntry::Rejected {
                    raw: raw.to_owned(),
                    error,
                },
            })
            .collect();

        Self { entries }
    }

    pub fn from_symbols(symbols: impl IntoIterator<Item = Symbol>) -> Self {
        Self {
            entries: symbols.into_iter().map(TickerEntry::Valid).collect(),
        }
    }

    pub fn entries(&self) -> &[TickerEntry] {
        &self.entries
    }

    pub fn symbols(&self) -> Vec<&Symbol> {
        self.entries
            .iter()
            .filter_map(|entry| match entry {
                TickerEntry::Valid(symbol) => Some(symbol),
                TickerEntry::Rejected { .. } => None,
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
