//! Signing handle for public-key authentication.
//!
//! The publickey method never sees private key material: it borrows a
//! [`Signer`], asks it for the algorithm name and the public-key blob to
//! offer, and hands it the exact RFC 4252 Section 7 byte string to sign.
//! Key loading, agent forwarding and algorithm negotiation all live behind
//! this trait, outside the protocol layer.

use crate::ssh::wire::WireWriter;
use ed25519_dalek::{Signer as _, SigningKey, VerifyingKey};
use skiff_platform::SkiffResult;

/// A handle capable of producing publickey-authentication signatures.
pub trait Signer: Send {
    /// The public-key algorithm name sent on the wire
    /// (e.g. "ssh-ed25519", "rsa-sha2-256").
    fn algorithm(&self) -> &str;

    /// The public key in SSH wire format
    /// (`string algorithm-name || algorithm-specific fields`).
    fn public_key_blob(&self) -> Vec<u8>;

    /// Signs `data` and returns the raw signature bytes, without the
    /// `string algorithm || string signature` wrapping (the method adds
    /// that when it builds the request).
    fn sign(&self, data: &[u8]) -> SkiffResult<Vec<u8>>;
}

/// Ed25519 signer backed by an in-memory key.
///
/// The key is zeroed on drop by `ed25519-dalek`.
pub struct Ed25519Signer {
    key: SigningKey,
}

impl Ed25519Signer {
    /// Creates a signer from the 32-byte secret seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self {
            key: SigningKey::from_bytes(seed),
        }
    }

    /// Returns the verifying half of the key.
    pub fn verifying_key(&self) -> VerifyingKey {
        self.key.verifying_key()
    }
}

impl std::fmt::Debug for Ed25519Signer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ed25519Signer")
            .field("public_key", &self.key.verifying_key())
            .finish_non_exhaustive()
    }
}

impl Signer for Ed25519Signer {
    fn algorithm(&self) -> &str {
        "ssh-ed25519"
    }

    fn public_key_blob(&self) -> Vec<u8> {
        let mut w = WireWriter::new();
        w.put_utf8("ssh-ed25519");
        w.put_string(self.key.verifying_key().as_bytes());
        w.into_bytes()
    }

    fn sign(&self, data: &[u8]) -> SkiffResult<Vec<u8>> {
        Ok(self.key.sign(data).to_bytes().to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ssh::wire::WireReader;
    use ed25519_dalek::{Signature, Verifier};

    fn test_signer() -> Ed25519Signer {
        Ed25519Signer::from_seed(&[7u8; 32])
    }

    #[test]
    fn test_public_key_blob_layout() {
        let signer = test_signer();
        let blob = signer.public_key_blob();

        let mut r = WireReader::new(&blob);
        assert_eq!(r.read_utf8().unwrap(), "ssh-ed25519");
        let key = r.read_string().unwrap();
        assert_eq!(key.len(), 32);
        assert_eq!(r.remaining(), 0);
    }

    #[test]
    fn test_signature_verifies() {
        let signer = test_signer();
        let data = b"payload to be signed";
        let raw = signer.sign(data).unwrap();

        let signature = Signature::from_slice(&raw).unwrap();
        signer.verifying_key().verify(data, &signature).unwrap();
    }

    #[test]
    fn test_signature_is_deterministic() {
        // Ed25519 signatures are deterministic; two runs over the same
        // input must agree.
        let signer = test_signer();
        let data = b"payload";
        assert_eq!(signer.sign(data).unwrap(), signer.sign(data).unwrap());
    }

    #[test]
    fn test_debug_redacts_secret() {
        let rendered = format!("{:?}", test_signer());
        assert!(rendered.contains("Ed25519Signer"));
        assert!(!rendered.contains("[7, 7"));
    }
}
