//! Property-based tests for the crypto crate.
//!
//! - Encryption is reversible with the matching key pairs
//! - Mismatched key pairs always fail, never yield other plaintext
//! - Hashing is deterministic and verification agrees with it

use dashmachine_crypto::{decrypt, encrypt, hash, verify, CryptoError, KeyPair};
use proptest::prelude::*;

fn message_strategy() -> impl Strategy<Value = String> {
    ".{0,512}"
}

mod encryption_properties {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        /// decrypt(B.priv, encrypt(A.priv, P, B.pub), A.pub) == P
        #[test]
        fn roundtrip_preserves_message(message in message_strategy()) {
            let alice = KeyPair::generate();
            let bob = KeyPair::generate();

            let payload = encrypt(
                &alice.private_key().to_base64(),
                &message,
                &bob.public_key().to_base64(),
            ).unwrap();
            let decrypted = decrypt(
                &bob.private_key().to_base64(),
                &payload,
                &alice.public_key().to_base64(),
            ).unwrap();

            prop_assert_eq!(decrypted, message);
        }

        /// A third party's private key never opens the payload.
        #[test]
        fn mismatched_pair_fails(message in message_strategy()) {
            let alice = KeyPair::generate();
            let bob = KeyPair::generate();
            let eve = KeyPair::generate();

            let payload = encrypt(
                &alice.private_key().to_base64(),
                &message,
                &bob.public_key().to_base64(),
            ).unwrap();
            let result = decrypt(
                &eve.private_key().to_base64(),
                &payload,
                &alice.public_key().to_base64(),
            );

            prop_assert!(matches!(result, Err(CryptoError::Decryption(_))));
        }
    }
}

mod hash_properties {
    use super::*;

    proptest! {
        #[test]
        fn hash_is_deterministic(message in message_strategy()) {
            prop_assert_eq!(hash(&message), hash(&message));
        }

        #[test]
        fn verify_accepts_own_digest(message in message_strategy()) {
            let digest = hash(&message);
            prop_assert!(verify(&message, digest.as_str()));
        }

        #[test]
        fn verify_rejects_other_message(a in message_strategy(), b in message_strategy()) {
            prop_assume!(a != b);
            let digest = hash(&b);
            prop_assert!(!verify(&a, digest.as_str()));
        }
    }
}
