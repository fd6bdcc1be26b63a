//! Base64 payloads for tile and glyph lookups.

use serde::{Deserialize, Serialize};

/// Result of a tile or glyph lookup.
///
/// The payload travels as standard base64 text. A missing resource carries no
/// data, and the constructors make a found-without-data value unrepresentable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BinaryPayload {
    found: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    data_base64: Option<String>,
}

impl BinaryPayload {
    /// A located resource with its encoded bytes.
    #[must_use]
    pub fn found(data_base64: String) -> Self {
        Self {
            found: true,
            data_base64: Some(data_base64),
        }
    }

    /// A resource that does not exist or could not be served.
    #[must_use]
    pub const fn missing() -> Self {
        Self {
            found: false,
            data_base64: None,
        }
    }

    /// Whether the resource was located.
    #[must_use]
    pub const fn is_found(&self) -> bool {
        self.found
    }

    /// Encoded payload, present only for located resources.
    #[must_use]
    pub fn data_base64(&self) -> Option<&str> {
        self.data_base64.as_deref()
    }
}

impl Default for BinaryPayload {
    fn default() -> Self {
        Self::missing()
    }
}
