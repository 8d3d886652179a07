//! Strongly-typed identifiers used across the fulfillment domain.
//!
//! Identifiers on the wire are plain JSON strings, so every newtype here is
//! `#[serde(transparent)]`.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Separator used when deriving an [`ItemKey`].
pub const ITEM_KEY_SEPARATOR: char = '|';

/// Globally unique purchase order identifier (immutable once created).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PoId(String);

/// Tracking identifier of a material certificate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackingId(String);

/// Cross-partition join key for a line item: `PoId|LineNumber|MaterialId`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemKey(String);

macro_rules! impl_string_newtype {
    ($t:ty) => {
        impl $t {
            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }

            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $t {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl From<$t> for String {
            fn from(value: $t) -> Self {
                value.0
            }
        }

        impl FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                <$t>::new(s)
            }
        }
    };
}

impl_string_newtype!(PoId);
impl_string_newtype!(TrackingId);
impl_string_newtype!(ItemKey);

impl PoId {
    /// Parse a purchase order id. Must be non-empty and must not contain the
    /// item-key separator, otherwise derived item keys become ambiguous.
    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(DomainError::invalid_id("PoId: must not be empty"));
        }
        if value.contains(ITEM_KEY_SEPARATOR) {
            return Err(DomainError::invalid_id(format!(
                "PoId: must not contain '{ITEM_KEY_SEPARATOR}' ({value})"
            )));
        }
        Ok(Self(value))
    }
}

impl TrackingId {
    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(DomainError::invalid_id("TrackingId: must not be empty"));
        }
        Ok(Self(value))
    }
}

impl ItemKey {
    /// Derive the join key for a line. Deterministic: the same triple always
    /// yields the same key.
    pub fn derive(po_id: &PoId, line_number: u32, material_id: &str) -> Self {
        Self(format!(
            "{po_id}{sep}{line_number}{sep}{material_id}",
            sep = ITEM_KEY_SEPARATOR
        ))
    }

    /// Accept a key produced elsewhere (e.g. echoed back by a client).
    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into();
        if value.is_empty() {
            return Err(DomainError::invalid_id("ItemKey: must not be empty"));
        }
        Ok(Self(value))
    }

    /// Split a key back into `(po_id, line_number, material_id)`.
    ///
    /// Material ids may themselves contain the separator; only the first two
    /// separators are structural.
    pub fn parts(&self) -> Result<(PoId, u32, &str), DomainError> {
        let mut it = self.0.splitn(3, ITEM_KEY_SEPARATOR);
        let (Some(po), Some(line), Some(material)) = (it.next(), it.next(), it.next()) else {
            return Err(DomainError::invalid_id(format!("ItemKey: malformed ({})", self.0)));
        };
        let line = line
            .parse::<u32>()
            .map_err(|e| DomainError::invalid_id(format!("ItemKey: line number: {e}")))?;
        Ok((PoId::new(po)?, line, material))
    }

    /// Whether this key is exactly what `derive` would produce for the triple.
    pub fn matches(&self, po_id: &PoId, line_number: u32, material_id: &str) -> bool {
        *self == Self::derive(po_id, line_number, material_id)
    }
}
