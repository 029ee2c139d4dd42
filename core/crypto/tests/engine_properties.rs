//! Property and scenario tests for the AES engine.

use std::sync::Arc;
use std::thread;

use proptest::prelude::*;

use symcrypt_crypto::{
    AesEngine, AesMode, AesOptions, Error, PaddingStrategy, Result, BLOCK_SIZE, GCM_NONCE_SIZE,
};

fn engine(key: &[u8], mode: AesMode) -> AesEngine {
    AesEngine::with_options(key, AesOptions::new().with_mode(mode)).unwrap()
}

fn key_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop_oneof![Just(16usize), Just(24usize), Just(32usize)]
        .prop_flat_map(|len| prop::collection::vec(any::<u8>(), len))
}

fn mode_strategy() -> impl Strategy<Value = AesMode> {
    prop_oneof![Just(AesMode::Cbc), Just(AesMode::Gcm)]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn roundtrip_any_key_size(
        key in key_strategy(),
        mode in mode_strategy(),
        plaintext in prop::collection::vec(any::<u8>(), 1..512),
    ) {
        let engine = engine(&key, mode);
        let packed = engine.encrypt(&plaintext).unwrap();
        prop_assert_eq!(engine.decrypt(&packed).unwrap(), plaintext);
    }

    #[test]
    fn base64_roundtrip_any_string(s in "\\PC{1,64}") {
        let engine = AesEngine::new(b"1234567890abcdef").unwrap();
        let encoded = engine.encrypt_base64(s.as_bytes()).unwrap();
        prop_assert_eq!(engine.decrypt_base64(&encoded).unwrap(), s);
    }

    #[test]
    fn gcm_any_single_byte_flip_is_rejected(
        plaintext in prop::collection::vec(any::<u8>(), 1..64),
        index in any::<prop::sample::Index>(),
        mask in 1u8..=255,
    ) {
        let engine = engine(&[9u8; 32], AesMode::Gcm);
        let mut packed = engine.encrypt(&plaintext).unwrap();
        let i = index.index(packed.len());
        packed[i] ^= mask;
        prop_assert!(matches!(engine.decrypt(&packed), Err(Error::Authentication)));
    }

    #[test]
    fn cbc_output_is_block_aligned(plaintext in prop::collection::vec(any::<u8>(), 1..100)) {
        let engine = AesEngine::new(&[4u8; 24]).unwrap();
        let packed = engine.encrypt(&plaintext).unwrap();
        prop_assert_eq!(packed.len() % BLOCK_SIZE, 0);
        prop_assert!(packed.len() > BLOCK_SIZE + plaintext.len());
    }
}

#[test]
fn identical_plaintexts_produce_distinct_outputs() {
    for mode in [AesMode::Cbc, AesMode::Gcm] {
        let engine = engine(b"1234567890abcdef", mode);
        let a = engine.encrypt(b"Same message for randomness test").unwrap();
        let b = engine.encrypt(b"Same message for randomness test").unwrap();
        assert_ne!(a, b);
    }
}

#[test]
fn gcm_scenario_nonce_prefix_differs_and_tamper_fails() {
    let engine = engine(b"1234567890abcdef", AesMode::Gcm);
    let plaintext = "hello aes12345678 明文".as_bytes();

    let first = engine.encrypt(plaintext).unwrap();
    let second = engine.encrypt(plaintext).unwrap();
    assert_ne!(&first[..GCM_NONCE_SIZE], &second[..GCM_NONCE_SIZE]);
    assert_eq!(engine.decrypt(&first).unwrap(), plaintext);

    let mut corrupted = second;
    let last = corrupted.len() - 1;
    corrupted[last] ^= 0xFF;
    assert!(matches!(engine.decrypt(&corrupted), Err(Error::Authentication)));
}

#[test]
fn key_length_rejection() {
    for len in [15, 17, 31, 33] {
        let result = AesEngine::new(&vec![1u8; len]);
        assert!(matches!(result, Err(Error::Configuration(_))));
    }
}

#[test]
fn cbc_bad_padding_is_padding_error() {
    struct Passthrough;

    impl PaddingStrategy for Passthrough {
        fn pad(&self, data: &[u8], _block_size: usize) -> Result<Vec<u8>> {
            Ok(data.to_vec())
        }

        fn unpad(&self, padded: Vec<u8>) -> Result<Vec<u8>> {
            Ok(padded)
        }
    }

    let key = [6u8; 16];
    let crafter =
        AesEngine::with_options(&key, AesOptions::new().with_padding_strategy(Passthrough))
            .unwrap();
    let engine = AesEngine::new(&key).unwrap();

    // 0 is never a valid pad byte; 33 exceeds the 32-byte buffer.
    for last in [0u8, 33] {
        let mut data = [2u8; 32];
        data[31] = last;
        let packed = crafter.encrypt(&data).unwrap();
        assert!(matches!(engine.decrypt(&packed), Err(Error::Padding)));
    }
}

#[test]
fn concurrent_use_of_one_engine() {
    for mode in [AesMode::Cbc, AesMode::Gcm] {
        let engine = Arc::new(engine(&[8u8; 32], mode));

        thread::scope(|s| {
            for t in 0..8u8 {
                let engine = Arc::clone(&engine);
                s.spawn(move || {
                    for i in 0..50u8 {
                        let plaintext = vec![t, i, t ^ i, 0x5A];
                        let packed = engine.encrypt(&plaintext).unwrap();
                        assert_eq!(engine.decrypt(&packed).unwrap(), plaintext);
                    }
                });
            }
        });
    }
}

#[test]
fn mode_deserializes_from_config() {
    let mode: AesMode = serde_json::from_str("\"gcm\"").unwrap();
    assert_eq!(mode, AesMode::Gcm);
    assert_eq!(serde_json::to_string(&AesMode::Cbc).unwrap(), "\"cbc\"");
    assert!(serde_json::from_str::<AesMode>("\"ecb\"").is_err());
}
