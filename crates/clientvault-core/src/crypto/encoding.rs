//! Base64 text transport for salts, IVs and ciphertext.
//!
//! Byte strings travel as standard, padded Base64 inside JSON and SQLite text
//! columns.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::error::{Result, VaultError};

/// Encode bytes as standard Base64.
pub fn encode(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Decode standard Base64 text.
///
/// # Errors
///
/// Returns `VaultError::MalformedInput` if the text is not valid Base64.
pub fn decode(text: &str) -> Result<Vec<u8>> {
    STANDARD
        .decode(text.trim())
        .map_err(|e| VaultError::MalformedInput(format!("Invalid Base64: {}", e)))
}

/// Serde adapter for `Vec<u8>` fields stored as Base64 strings.
pub mod base64_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let text = String::deserialize(deserializer)?;
        super::decode(&text).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_known_value() {
        assert_eq!(encode(b"user_key_set"), "dXNlcl9rZXlfc2V0");
    }

    #[test]
    fn test_decode_trims_whitespace() {
        assert_eq!(decode(" dXNlcl9rZXlfc2V0\n").unwrap(), b"user_key_set");
    }

    #[test]
    fn test_decode_invalid_is_malformed() {
        let err = decode("not base64!").unwrap_err();
        assert!(err.is_malformed());
    }
}
