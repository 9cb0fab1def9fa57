//! Key derivation and the XOR result envelope.
//!
//! Sifted bits are packed MSB-first into bytes; the trailing partial byte
//! is dropped. A report is sealed by serializing it to compact JSON and
//! XOR-ing the bytes with the repeating key.
//!
//! The envelope only hides the plaintext from a reader without the key.
//! It does not authenticate the ciphertext and is not a secure cipher.

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Errors from key derivation and the envelope.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum EnvelopeError {
    /// Fewer than eight bits were available.
    #[error("cannot derive a key from {bits} bits: need at least 8")]
    NoWholeByte {
        /// Number of bits supplied.
        bits: usize,
    },

    /// A bit value other than 0 or 1.
    #[error("bit {index} has value {value}, expected 0 or 1")]
    InvalidBit {
        /// Position of the offending bit.
        index: usize,
        /// The value found.
        value: u8,
    },

    /// JSON (de)serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Key bytes derived from sifted bits. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionKey(Vec<u8>);

impl SessionKey {
    /// Pack `bits` MSB-first, dropping the trailing partial byte.
    pub fn from_bits(bits: &[u8]) -> Result<Self, EnvelopeError> {
        if let Some((index, &value)) = bits.iter().enumerate().find(|(_, b)| **b > 1) {
            return Err(EnvelopeError::InvalidBit { index, value });
        }
        if bits.len() < 8 {
            return Err(EnvelopeError::NoWholeByte { bits: bits.len() });
        }

        let bytes = bits
            .chunks_exact(8)
            .map(|chunk| chunk.iter().fold(0u8, |byte, &b| (byte << 1) | b))
            .collect();
        Ok(Self(bytes))
    }

    /// Raw key bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Key length in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; a key holds at least one byte.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// XOR `data` with the repeating key. Applying it twice restores `data`.
    pub fn apply(&self, data: &[u8]) -> Vec<u8> {
        data.iter()
            .zip(self.0.iter().cycle())
            .map(|(d, k)| d ^ k)
            .collect()
    }
}

/// Serialize `value` as compact JSON and encrypt it.
pub fn seal<T: Serialize>(value: &T, key: &SessionKey) -> Result<Vec<u8>, EnvelopeError> {
    let plain = serde_json::to_vec(value)?;
    Ok(key.apply(&plain))
}

/// Decrypt to the plaintext JSON bytes.
pub fn open_raw(ciphertext: &[u8], key: &SessionKey) -> Vec<u8> {
    key.apply(ciphertext)
}

/// Decrypt and parse a sealed value.
pub fn open<T: DeserializeOwned>(ciphertext: &[u8], key: &SessionKey) -> Result<T, EnvelopeError> {
    Ok(serde_json::from_slice(&open_raw(ciphertext, key))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Sample {
        unit: String,
        values: Vec<i32>,
    }

    #[test]
    fn test_pack_msb_first() {
        let key = SessionKey::from_bits(&[1, 0, 0, 0, 0, 0, 0, 1, 1, 1]).unwrap();
        assert_eq!(key.as_bytes(), &[0x81]);
    }

    #[test]
    fn test_two_bytes() {
        let bits = [0, 0, 0, 0, 1, 1, 1, 1, 1, 0, 1, 0, 1, 0, 1, 0];
        let key = SessionKey::from_bits(&bits).unwrap();
        assert_eq!(key.as_bytes(), &[0x0F, 0xAA]);
        assert_eq!(key.len(), 2);
    }

    #[test]
    fn test_short_input_is_an_error() {
        assert!(matches!(
            SessionKey::from_bits(&[1, 0, 1]),
            Err(EnvelopeError::NoWholeByte { bits: 3 })
        ));
        assert!(SessionKey::from_bits(&[]).is_err());
    }

    #[test]
    fn test_non_binary_input_is_an_error() {
        assert!(matches!(
            SessionKey::from_bits(&[1, 0, 2, 0, 0, 0, 0, 0]),
            Err(EnvelopeError::InvalidBit { index: 2, value: 2 })
        ));
    }

    #[test]
    fn test_seal_hides_plaintext_and_opens() {
        let key = SessionKey::from_bits(&[1, 0, 1, 1, 0, 1, 0, 1]).unwrap();
        let sample = Sample {
            unit: "Hartree".into(),
            values: vec![1, -2, 3],
        };
        let sealed = seal(&sample, &key).unwrap();
        assert_ne!(sealed, serde_json::to_vec(&sample).unwrap());
        let opened: Sample = open(&sealed, &key).unwrap();
        assert_eq!(opened, sample);
    }

    #[test]
    fn test_wrong_key_does_not_open() {
        let key = SessionKey::from_bits(&[1, 1, 1, 1, 0, 0, 0, 0]).unwrap();
        let other = SessionKey::from_bits(&[0, 0, 0, 0, 1, 1, 1, 1]).unwrap();
        let sealed = seal(&vec![1, 2, 3], &key).unwrap();
        assert!(open::<Vec<i32>>(&sealed, &other).is_err());
    }
}
