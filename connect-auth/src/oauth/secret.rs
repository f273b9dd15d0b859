//! Random secrets for the authorization code flow.
//!
//! Implements RFC 7636 (PKCE) verifier/challenge pairs and the CSRF `state` token.
//! All randomness comes from the operating system; if it is unavailable the
//! generators fail instead of falling back to a weaker source.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use rand::{rngs::OsRng, RngCore};
use sha2::{Digest, Sha256};

use crate::error::{Error, ErrorKind, OAuthErrorKind};

/// Number of random bytes behind a state token (128 bits).
pub const STATE_BYTES: usize = 16;
/// Number of random bytes behind a PKCE verifier (256 bits).
pub const VERIFIER_BYTES: usize = 32;

fn random_bytes<const N: usize>() -> Result<[u8; N], Error> {
    let mut bytes = [0u8; N];
    OsRng.try_fill_bytes(&mut bytes).map_err(|e| Error {
        source: Some(Box::new(e)),
        error_kind: ErrorKind::OAuth(OAuthErrorKind::RandomnessUnavailable),
    })?;
    Ok(bytes)
}

/// CSRF state token, hex encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateToken(String);

impl StateToken {
    /// Generate a new random state token.
    pub fn generate() -> Result<Self, Error> {
        let bytes: [u8; STATE_BYTES] = random_bytes()?;
        Ok(Self(hex::encode(bytes)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// PKCE code verifier (random string).
#[derive(Debug, Clone)]
pub struct PkceVerifier(String);

impl PkceVerifier {
    /// Generate a new random PKCE verifier.
    ///
    /// 32 random bytes encode to a 43 character base64url string, the minimum
    /// length RFC 7636 allows.
    pub fn generate() -> Result<Self, Error> {
        let bytes: [u8; VERIFIER_BYTES] = random_bytes()?;
        Ok(Self(URL_SAFE_NO_PAD.encode(bytes)))
    }

    /// Create a PKCE verifier from an existing string.
    pub fn from_string(verifier: String) -> Self {
        Self(verifier)
    }

    /// Get the verifier string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Generate the corresponding code challenge.
    pub fn challenge(&self) -> PkceChallenge {
        PkceChallenge::from_verifier(self)
    }
}

/// PKCE code challenge (SHA256 hash of verifier).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PkceChallenge(String);

impl PkceChallenge {
    /// Create a code challenge from a verifier.
    ///
    /// Uses SHA256 hashing and base64url encoding without padding as per RFC 7636.
    pub fn from_verifier(verifier: &PkceVerifier) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(verifier.as_str().as_bytes());
        let hash = hasher.finalize();
        Self(URL_SAFE_NO_PAD.encode(hash))
    }

    /// Get the challenge string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// The state/verifier pair issued for one login attempt.
///
/// Single use: it is moved into the callback validator and dropped there.
#[derive(Debug, Clone)]
pub struct PendingAuthorization {
    pub state: StateToken,
    pub code_verifier: PkceVerifier,
}

impl PendingAuthorization {
    /// Generate a fresh state token and PKCE verifier.
    pub fn generate() -> Result<Self, Error> {
        Ok(Self {
            state: StateToken::generate()?,
            code_verifier: PkceVerifier::generate()?,
        })
    }

    pub fn code_challenge(&self) -> PkceChallenge {
        self.code_verifier.challenge()
    }
}
