use core::fmt;
use core::str::FromStr;

use thiserror::Error;

use crate::Key;

/// A single structural or scalar unit emitted by the parser.
///
/// Tokens arrive in strict document order, depth first: one `Start*` per
/// container open, one `End*` per close, one scalar token per scalar value.
/// The `key` names the token's slot in its parent container and is absent
/// only at the document root.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    StartObject { key: Option<Key> },
    EndObject { key: Option<Key> },
    StartArray { key: Option<Key> },
    EndArray { key: Option<Key> },
    String { key: Option<Key>, value: String },
    Number { key: Option<Key>, value: Number },
    Bool { key: Option<Key>, value: bool },
    Null { key: Option<Key> },
}

impl Token {
    /// The key locating this token in its parent container, if any.
    #[must_use]
    pub fn key(&self) -> Option<&Key> {
        match self {
            Self::StartObject { key }
            | Self::EndObject { key }
            | Self::StartArray { key }
            | Self::EndArray { key }
            | Self::String { key, .. }
            | Self::Number { key, .. }
            | Self::Bool { key, .. }
            | Self::Null { key } => key.as_ref(),
        }
    }
}

/// A JSON number in one of its three materializations, governed by
/// [`NumberMode`](crate::NumberMode).
#[derive(Debug, Clone, PartialEq)]
pub enum Number {
    /// An integer of at most 18 digits, exactly representable.
    Int(i64),
    /// Any other number in `IntDouble` mode. May be infinite for literals
    /// outside the `f64` range; precision beyond `f64` rounds silently.
    Double(f64),
    /// Any number in `AllDecimal` mode, lexeme-exact.
    Decimal(Decimal),
}

impl Number {
    /// The value as `i64`, when this number is an integer.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        if let Self::Int(value) = self {
            Some(*value)
        } else {
            None
        }
    }

    /// The value as `f64`. Lossy for decimals beyond `f64` precision.
    #[must_use]
    pub fn as_f64(&self) -> f64 {
        match self {
            Self::Int(value) => *value as f64,
            Self::Double(value) => *value,
            Self::Decimal(value) => value.to_f64(),
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(value) => write!(f, "{value}"),
            Self::Double(value) => write!(f, "{value}"),
            Self::Decimal(value) => f.write_str(value.as_str()),
        }
    }
}

/// An arbitrary-precision decimal number, represented by its validated
/// source lexeme.
///
/// The exact lexeme is preserved, not a normalized form, so callers can
/// re-emit the number without drift at any precision. Equality and hashing
/// are over the lexeme: `1e2` and `100` are different `Decimal`s.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Decimal {
    lexeme: Box<str>,
}

impl Decimal {
    /// The exact source text of the number.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.lexeme
    }

    /// Nearest `f64` approximation; infinite outside the `f64` range.
    #[must_use]
    pub fn to_f64(&self) -> f64 {
        self.lexeme.parse().unwrap_or(f64::NAN)
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.lexeme)
    }
}

/// Error returned when a string is not a valid JSON number literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid JSON number literal")]
pub struct InvalidDecimal;

impl FromStr for Decimal {
    type Err = InvalidDecimal;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if is_number_lexeme(s.as_bytes()) {
            Ok(Self { lexeme: s.into() })
        } else {
            Err(InvalidDecimal)
        }
    }
}

/// Strict RFC 8259 number grammar: `-? int frac? exp?` with no leading
/// zeros and `+` permitted only in the exponent.
fn is_number_lexeme(bytes: &[u8]) -> bool {
    let at = |i: usize| bytes.get(i).copied();
    let mut i = 0;

    if at(i) == Some(b'-') {
        i += 1;
    }
    match at(i) {
        Some(b'0') => i += 1,
        Some(b'1'..=b'9') => {
            while matches!(at(i), Some(b'0'..=b'9')) {
                i += 1;
            }
        }
        _ => return false,
    }
    if at(i) == Some(b'.') {
        i += 1;
        let start = i;
        while matches!(at(i), Some(b'0'..=b'9')) {
            i += 1;
        }
        if i == start {
            return false;
        }
    }
    if matches!(at(i), Some(b'e' | b'E')) {
        i += 1;
        if matches!(at(i), Some(b'+' | b'-')) {
            i += 1;
        }
        let start = i;
        while matches!(at(i), Some(b'0'..=b'9')) {
            i += 1;
        }
        if i == start {
            return false;
        }
    }
    i == bytes.len()
}
