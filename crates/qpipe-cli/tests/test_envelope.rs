//! Property tests for key packing and the result envelope.

use proptest::prelude::*;

use qpipe_cli::{SessionKey, open, open_raw, seal};

fn bits(min: usize, max: usize) -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(0u8..=1, min..max)
}

proptest! {
    #[test]
    fn key_length_drops_partial_byte(bits in bits(8, 400)) {
        let key = SessionKey::from_bits(&bits).unwrap();
        prop_assert_eq!(key.len(), bits.len() / 8);
        prop_assert!(!key.is_empty());
    }

    #[test]
    fn key_bits_unpack_msb_first(bits in bits(8, 64)) {
        let key = SessionKey::from_bits(&bits).unwrap();
        for (i, byte) in key.as_bytes().iter().enumerate() {
            for k in 0..8 {
                prop_assert_eq!((byte >> (7 - k)) & 1, bits[i * 8 + k]);
            }
        }
    }

    #[test]
    fn sealed_values_reopen(bits in bits(8, 256), values in prop::collection::vec(any::<i64>(), 0..32)) {
        let key = SessionKey::from_bits(&bits).unwrap();
        let sealed = seal(&values, &key).unwrap();
        prop_assert_eq!(open_raw(&sealed, &key), serde_json::to_vec(&values).unwrap());
        let reopened: Vec<i64> = open(&sealed, &key).unwrap();
        prop_assert_eq!(reopened, values);
    }

    #[test]
    fn short_input_never_yields_a_key(bits in bits(0, 8)) {
        prop_assert!(SessionKey::from_bits(&bits).is_err());
    }
}
