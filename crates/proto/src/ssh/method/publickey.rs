//! Public-key authentication (RFC 4252 Section 7).
//!
//! Two-phase: a probe request without a signature first asks the server
//! whether the key is acceptable at all, so that an unusable key is never
//! signed with (and an agent-held key never prompts the user for nothing).
//! Only after `SSH_MSG_USERAUTH_PK_OK` does the method compute the
//! signature over the session-bound blob and send the real request.
//!
//! The signature binds the session identifier, so it cannot be replayed on
//! another connection.

use crate::ssh::client::{AuthOutcome, Response};
use crate::ssh::message::MessageType;
use crate::ssh::method::{AuthHandle, AuthMethod};
use crate::ssh::signer::Signer;
use crate::ssh::wire::{WireReader, WireWriter};
use async_trait::async_trait;
use skiff_platform::{SkiffError, SkiffResult};

/// SSH_MSG_USERAUTH_PK_OK (RFC 4252 Section 7).
pub const SSH_MSG_USERAUTH_PK_OK: u8 = 60;

/// The `publickey` authentication method.
pub struct PublicKeyAuth {
    username: String,
    service: String,
    signer: Box<dyn Signer>,
    probe: bool,
}

impl PublicKeyAuth {
    /// Creates a publickey attempt for `username` against `service`,
    /// signing with `signer`. The probe phase is enabled by default.
    pub fn new(
        username: impl Into<String>,
        service: impl Into<String>,
        signer: Box<dyn Signer>,
    ) -> Self {
        Self {
            username: username.into(),
            service: service.into(),
            signer,
            probe: true,
        }
    }

    /// Skips the probe phase and sends the signed request immediately.
    ///
    /// Saves a round trip when the key is known to be authorized, at the
    /// cost of signing a key the server may reject.
    pub fn without_probe(mut self) -> Self {
        self.probe = false;
        self
    }

    fn probe_request(&self, algorithm: &str, key_blob: &[u8]) -> Vec<u8> {
        let mut data = WireWriter::new();
        data.put_bool(false);
        data.put_utf8(algorithm);
        data.put_string(key_blob);
        data.into_bytes()
    }

    fn signed_request(&self, algorithm: &str, key_blob: &[u8], signature: &[u8]) -> Vec<u8> {
        // The signature travels wrapped as `string algorithm || string sig`.
        let mut wrapped = WireWriter::new();
        wrapped.put_utf8(algorithm);
        wrapped.put_string(signature);

        let mut data = WireWriter::new();
        data.put_bool(true);
        data.put_utf8(algorithm);
        data.put_string(key_blob);
        data.put_string(&wrapped.into_bytes());
        data.into_bytes()
    }
}

impl std::fmt::Debug for PublicKeyAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PublicKeyAuth")
            .field("username", &self.username)
            .field("service", &self.service)
            .field("algorithm", &self.signer.algorithm())
            .field("probe", &self.probe)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl AuthMethod for PublicKeyAuth {
    fn name(&self) -> &'static str {
        "publickey"
    }

    async fn run(&mut self, handle: &mut dyn AuthHandle) -> SkiffResult<AuthOutcome> {
        let algorithm = self.signer.algorithm().to_string();
        let key_blob = self.signer.public_key_blob();

        if self.probe {
            handle
                .send_request(
                    &self.username,
                    &self.service,
                    "publickey",
                    &self.probe_request(&algorithm, &key_blob),
                )
                .await?;

            let payload = match handle.read_message().await? {
                // Probe rejected (or the server accepted outright); the
                // signer is never consulted on this path.
                Response::Outcome(outcome) => return Ok(outcome),
                Response::Payload(payload) => payload,
            };

            let pk_ok = PkOk::from_bytes(&payload)?;
            if pk_ok.algorithm() != algorithm || pk_ok.public_key() != key_blob {
                return Err(SkiffError::Protocol(
                    "PK_OK does not echo the offered key".to_string(),
                ));
            }
            tracing::debug!(algorithm = %algorithm, "server accepts key, signing");
        }

        let data = signature_data(
            handle.session_identifier(),
            &self.username,
            &self.service,
            &algorithm,
            &key_blob,
        );
        let signature = self.signer.sign(&data)?;

        handle
            .send_request(
                &self.username,
                &self.service,
                "publickey",
                &self.signed_request(&algorithm, &key_blob, &signature),
            )
            .await?;

        match handle.read_message().await? {
            Response::Outcome(outcome) => Ok(outcome),
            Response::Payload(payload) => Err(SkiffError::Protocol(format!(
                "unexpected message {} after signed publickey request",
                payload.first().copied().unwrap_or(0)
            ))),
        }
    }
}

/// Builds the byte string the publickey signature covers (RFC 4252
/// Section 7).
///
/// A pure function of its inputs:
/// ```text
/// string    session identifier
/// byte      SSH_MSG_USERAUTH_REQUEST (50)
/// string    user name
/// string    service name
/// string    "publickey"
/// boolean   TRUE
/// string    public key algorithm name
/// string    public key blob
/// ```
pub fn signature_data(
    session_id: &[u8],
    username: &str,
    service: &str,
    algorithm: &str,
    public_key_blob: &[u8],
) -> Vec<u8> {
    let mut w = WireWriter::new();
    w.put_string(session_id);
    w.put_u8(MessageType::UserauthRequest as u8);
    w.put_utf8(username);
    w.put_utf8(service);
    w.put_utf8("publickey");
    w.put_bool(true);
    w.put_utf8(algorithm);
    w.put_string(public_key_blob);
    w.into_bytes()
}

/// SSH_MSG_USERAUTH_PK_OK payload: the server echoes the key it accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PkOk {
    algorithm: String,
    public_key: Vec<u8>,
}

impl PkOk {
    /// Creates a new PK_OK message.
    pub fn new(algorithm: impl Into<String>, public_key: Vec<u8>) -> Self {
        Self {
            algorithm: algorithm.into(),
            public_key,
        }
    }

    /// The echoed algorithm name.
    pub fn algorithm(&self) -> &str {
        &self.algorithm
    }

    /// The echoed public key blob.
    pub fn public_key(&self) -> &[u8] {
        &self.public_key
    }

    /// Serializes to a payload.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut w = WireWriter::new();
        w.put_u8(SSH_MSG_USERAUTH_PK_OK);
        w.put_utf8(&self.algorithm);
        w.put_string(&self.public_key);
        w.into_bytes()
    }

    /// Parses from a payload.
    pub fn from_bytes(payload: &[u8]) -> SkiffResult<Self> {
        let mut r = WireReader::new(payload);
        let code = r.read_u8()?;
        if code != SSH_MSG_USERAUTH_PK_OK {
            return Err(SkiffError::Protocol(format!(
                "expected SSH_MSG_USERAUTH_PK_OK (60), got {}",
                code
            )));
        }
        let algorithm = r.read_utf8()?;
        let public_key = r.read_string()?.to_vec();
        Ok(Self {
            algorithm,
            public_key,
        })
    }
}
