// SecureValues — Secret value wrapper
//
// SECURITY: the bytes returned by the native library live only inside
// `SecretValue`. The wrapper has no Clone, no Serialize, and its Debug and
// Display output is always redacted. Memory is zeroed on drop.

use std::fmt;

use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

/// Number of hex characters shown by [`SecretValue::fingerprint`].
const FINGERPRINT_HEX_LEN: usize = 12;

/// A secret returned by the native provider.
pub struct SecretValue {
    bytes: Zeroizing<Vec<u8>>,
}

impl SecretValue {
    pub(crate) fn from_bytes(bytes: Vec<u8>) -> Self {
        Self {
            bytes: Zeroizing::new(bytes),
        }
    }

    /// Access the raw secret bytes.
    /// Callers must not log or persist the returned slice.
    pub fn expose_secret(&self) -> &[u8] {
        &self.bytes
    }

    /// Access the secret as UTF-8 text. API keys are normally ASCII, but the
    /// native contract only promises bytes.
    pub fn expose_str(&self) -> Result<&str, std::str::Utf8Error> {
        std::str::from_utf8(&self.bytes)
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Always false for values produced by the provider, which rejects
    /// empty replies.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Short SHA-256 prefix, safe to print. Lets operators check that two
    /// hosts hold the same secret without revealing it.
    pub fn fingerprint(&self) -> String {
        let digest = Sha256::digest(self.bytes.as_slice());
        let hex: String = digest.iter().map(|b| format!("{:02x}", b)).collect();
        hex[..FINGERPRINT_HEX_LEN].to_string()
    }
}

impl fmt::Debug for SecretValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretValue([REDACTED])")
    }
}

impl fmt::Display for SecretValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    const SENTINEL: &str = "sk-live-0123456789abcdef";

    #[test]
    fn test_debug_and_display_never_reveal_contents() {
        let secret = SecretValue::from_bytes(SENTINEL.as_bytes().to_vec());

        let debug = format!("{:?}", secret);
        let display = format!("{}", secret);
        let pretty = format!("{:#?}", secret);

        for rendered in [debug, display, pretty] {
            assert!(
                !rendered.contains(SENTINEL),
                "rendered form leaked the secret: {}",
                rendered
            );
            assert!(rendered.contains("REDACTED"));
        }
    }

    #[test]
    fn test_explicit_access_returns_contents() {
        let secret = SecretValue::from_bytes(SENTINEL.as_bytes().to_vec());
        assert_eq!(secret.expose_secret(), SENTINEL.as_bytes());
        assert_eq!(secret.expose_str().unwrap(), SENTINEL);
        assert_eq!(secret.len(), SENTINEL.len());
        assert!(!secret.is_empty());
    }

    #[test]
    fn test_non_utf8_secret_is_reported_without_contents() {
        let secret = SecretValue::from_bytes(vec![0xff, 0xfe, 0x00]);
        let err = secret.expose_str().unwrap_err();
        assert!(!err.to_string().contains('\u{fffd}'));
        assert_eq!(secret.expose_secret(), &[0xff, 0xfe, 0x00]);
    }

    #[test]
    fn test_fingerprint_is_stable_and_short() {
        let a = SecretValue::from_bytes(SENTINEL.as_bytes().to_vec());
        let b = SecretValue::from_bytes(SENTINEL.as_bytes().to_vec());
        let c = SecretValue::from_bytes(b"other".to_vec());

        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_ne!(a.fingerprint(), c.fingerprint());
        assert_eq!(a.fingerprint().len(), FINGERPRINT_HEX_LEN);
        assert!(!SENTINEL.contains(&a.fingerprint()));
    }
}
