//! Address value type for the module registry.
//!
//! Raw log addresses are variable-width (anything from 1 to 16 significant
//! hex digits, with or without a `0x` prefix), but every downstream consumer
//! (table printer, JSON document, GDB commands, fuzzer configuration) expects
//! the fixed 16-digit zero-padded form. `Address` parses the loose input
//! form once and only ever renders the canonical one.

use crate::error::{Result, TdvfError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A 64-bit guest memory address.
///
/// Immutable after construction. Serializes as its canonical `0x`-prefixed
/// 16-digit hex string so the JSON interchange document stays readable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(u64);

impl Address {
    /// Wrap a raw address value.
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// Parse a hexadecimal address string.
    ///
    /// Accepts 1 to 16 hex digits with an optional `0x`/`0X` prefix. Any
    /// other character set or length is a [`TdvfError::Format`] error.
    pub fn parse(text: &str) -> Result<Self> {
        let digits = text
            .strip_prefix("0x")
            .or_else(|| text.strip_prefix("0X"))
            .unwrap_or(text);
        if digits.is_empty()
            || digits.len() > 16
            || !digits.bytes().all(|b| b.is_ascii_hexdigit())
        {
            return Err(TdvfError::Format(text.to_string()));
        }
        // Character set and length are checked above, so this cannot fail.
        let value = u64::from_str_radix(digits, 16)
            .map_err(|_| TdvfError::Format(text.to_string()))?;
        Ok(Self(value))
    }

    /// The raw address value.
    pub fn value(&self) -> u64 {
        self.0
    }

    /// Render as exactly 16 zero-padded hex digits, with or without the
    /// `0x` prefix.
    pub fn to_hex(&self, prefix: bool) -> String {
        if prefix {
            format!("{:#018x}", self.0)
        } else {
            format!("{:016x}", self.0)
        }
    }

    /// Offset this address, failing on 64-bit wrap-around.
    pub fn checked_add(&self, offset: u64) -> Option<Address> {
        self.0.checked_add(offset).map(Address)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex(true))
    }
}

impl From<Address> for String {
    fn from(addr: Address) -> String {
        addr.to_hex(true)
    }
}

impl TryFrom<String> for Address {
    type Error = TdvfError;

    fn try_from(text: String) -> Result<Self> {
        Address::parse(&text)
    }
}
