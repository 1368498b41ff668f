//! PKCE (RFC 7636) verifier/challenge generation for the authorization flow.
//!
//! The verifier is the only secret protecting the code exchange, so randomness
//! comes from a CSPRNG and the source is injected to keep the generator
//! testable with a deterministic one.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::{CryptoRng, RngCore};
use sha2::{Digest, Sha256};
use thiserror::Error;

/// RFC 7636 bounds on the verifier length.
pub const MIN_VERIFIER_LENGTH: usize = 43;
pub const MAX_VERIFIER_LENGTH: usize = 128;

/// Verifier length used by the CLI (the RFC minimum).
pub const DEFAULT_VERIFIER_LENGTH: usize = 43;

#[derive(Error, Debug)]
pub enum PkceError {
    #[error("verifier length {requested} is outside the allowed range {MIN_VERIFIER_LENGTH}-{MAX_VERIFIER_LENGTH}")]
    InvalidLength { requested: usize },
}

/// RFC 3986 unreserved characters: ALPHA / DIGIT / "-" / "." / "_" / "~".
fn is_unreserved(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'.' | b'_' | b'~')
}

/// Generates a code verifier of exactly `length` unreserved characters.
///
/// Random bytes are rejection-filtered down to the unreserved set and more
/// are drawn until `length` survivors have been collected. Filtering happens
/// before taking the prefix, so the result never comes up short and the
/// per-character distribution stays uniform.
pub fn generate_verifier_with<R>(rng: &mut R, length: usize) -> Result<String, PkceError>
where
    R: RngCore + CryptoRng + ?Sized,
{
    if !(MIN_VERIFIER_LENGTH..=MAX_VERIFIER_LENGTH).contains(&length) {
        return Err(PkceError::InvalidLength { requested: length });
    }

    let mut verifier = String::with_capacity(length);
    let mut buf = [0u8; 64];
    while verifier.len() < length {
        rng.fill_bytes(&mut buf);
        for &byte in &buf {
            if is_unreserved(byte) {
                verifier.push(byte as char);
                if verifier.len() == length {
                    break;
                }
            }
        }
    }

    Ok(verifier)
}

/// Generates a code verifier from the thread-local CSPRNG.
pub fn generate_verifier(length: usize) -> Result<String, PkceError> {
    generate_verifier_with(&mut rand::rng(), length)
}

/// Derives the S256 code challenge: BASE64URL(SHA-256(ASCII(verifier))),
/// padding stripped. Pure function of the verifier.
pub fn derive_challenge(verifier: &str) -> String {
    let digest = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(digest)
}

/// Generates a random state token for CSRF protection on the callback.
pub fn generate_state() -> String {
    let mut bytes = [0u8; 32];
    rand::rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// A verifier/challenge pair for one authorization attempt.
///
/// The verifier is kept by the caller until the token exchange and is never
/// sent to the authorization server; only the challenge travels in the
/// authorization URL.
#[derive(Debug, Clone)]
pub struct PkcePair {
    pub verifier: String,
    pub challenge: String,
}

impl PkcePair {
    /// Generates a fresh pair at the default verifier length.
    pub fn generate() -> Result<Self, PkceError> {
        Self::with_length(DEFAULT_VERIFIER_LENGTH)
    }

    /// Generates a fresh pair with a verifier of exactly `length` characters.
    pub fn with_length(length: usize) -> Result<Self, PkceError> {
        let verifier = generate_verifier(length)?;
        let challenge = derive_challenge(&verifier);
        Ok(Self {
            verifier,
            challenge,
        })
    }

    /// The challenge method sent alongside the challenge (always S256).
    pub fn challenge_method(&self) -> &'static str {
        "S256"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    /// Cycles through a fixed byte script; lets tests force rejected bytes.
    struct ScriptedRng {
        script: Vec<u8>,
        pos: usize,
    }

    impl ScriptedRng {
        fn new(script: Vec<u8>) -> Self {
            Self { script, pos: 0 }
        }
    }

    impl RngCore for ScriptedRng {
        fn next_u32(&mut self) -> u32 {
            let mut buf = [0u8; 4];
            self.fill_bytes(&mut buf);
            u32::from_le_bytes(buf)
        }

        fn next_u64(&mut self) -> u64 {
            let mut buf = [0u8; 8];
            self.fill_bytes(&mut buf);
            u64::from_le_bytes(buf)
        }

        fn fill_bytes(&mut self, dest: &mut [u8]) {
            for byte in dest.iter_mut() {
                *byte = self.script[self.pos % self.script.len()];
                self.pos += 1;
            }
        }
    }

    impl CryptoRng for ScriptedRng {}

    #[test]
    fn test_verifier_exact_length_and_charset() {
        for length in [43, 64, 128] {
            let verifier = generate_verifier(length).unwrap();
            assert_eq!(verifier.len(), length);
            assert!(verifier.bytes().all(is_unreserved));
        }
    }

    #[test]
    fn test_verifier_rejects_out_of_range_lengths() {
        assert!(matches!(
            generate_verifier(42),
            Err(PkceError::InvalidLength { requested: 42 })
        ));
        assert!(matches!(
            generate_verifier(129),
            Err(PkceError::InvalidLength { requested: 129 })
        ));
    }

    #[test]
    fn test_verifiers_are_distinct() {
        let mut seen = HashSet::new();
        for _ in 0..1000 {
            assert!(seen.insert(generate_verifier(43).unwrap()));
        }
    }

    #[test]
    fn test_verifier_deterministic_with_seeded_source() {
        let a = generate_verifier_with(&mut StdRng::seed_from_u64(7), 43).unwrap();
        let b = generate_verifier_with(&mut StdRng::seed_from_u64(7), 43).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_rejection_filtering_keeps_full_length() {
        // 63 rejected bytes for every accepted one; the generator must keep
        // drawing until 43 survivors exist instead of truncating short.
        let mut script = vec![b'+'; 63];
        script.push(b'a');
        let verifier = generate_verifier_with(&mut ScriptedRng::new(script), 43).unwrap();
        assert_eq!(verifier.len(), 43);
        assert_eq!(verifier, "a".repeat(43));
    }

    #[test]
    fn test_challenge_matches_rfc7636_vector() {
        let challenge = derive_challenge("dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk");
        assert_eq!(challenge, "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM");
    }

    #[test]
    fn test_challenge_deterministic_and_urlsafe() {
        let verifier = generate_verifier(43).unwrap();
        let challenge = derive_challenge(&verifier);
        assert_eq!(challenge, derive_challenge(&verifier));
        assert!(!challenge.contains('+'));
        assert!(!challenge.contains('/'));
        assert!(!challenge.contains('='));
    }

    #[test]
    fn test_pair_generation() {
        let pair = PkcePair::generate().unwrap();
        assert_eq!(pair.verifier.len(), DEFAULT_VERIFIER_LENGTH);
        assert_eq!(pair.challenge, derive_challenge(&pair.verifier));
        assert_eq!(pair.challenge_method(), "S256");
    }

    #[test]
    fn test_state_tokens_are_distinct_and_urlsafe() {
        let a = generate_state();
        let b = generate_state();
        assert_ne!(a, b);
        for token in [a, b] {
            assert!(!token.contains('+'));
            assert!(!token.contains('/'));
            assert!(!token.contains('='));
        }
    }
}
