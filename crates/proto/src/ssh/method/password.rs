//! Password authentication (RFC 4252 Section 8).
//!
//! Sends the password in a single request. The server may answer with
//! `SSH_MSG_USERAUTH_PASSWD_CHANGEREQ` when the password has expired; if a
//! replacement password was supplied up front the method answers with the
//! change-password form of the request, otherwise it cancels locally.
//!
//! Both passwords are zeroed when the method is dropped.

use crate::ssh::client::{AuthOutcome, Response};
use crate::ssh::method::{AuthHandle, AuthMethod};
use crate::ssh::wire::{WireReader, WireWriter};
use async_trait::async_trait;
use skiff_platform::{SkiffError, SkiffResult};
use zeroize::{Zeroize, Zeroizing};

/// SSH_MSG_USERAUTH_PASSWD_CHANGEREQ (RFC 4252 Section 8).
pub const SSH_MSG_USERAUTH_PASSWD_CHANGEREQ: u8 = 60;

/// The `password` authentication method.
pub struct PasswordAuth {
    username: String,
    service: String,
    password: String,
    new_password: Option<String>,
}

impl PasswordAuth {
    /// Creates a password attempt for `username` against `service`.
    pub fn new(
        username: impl Into<String>,
        service: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            service: service.into(),
            password: password.into(),
            new_password: None,
        }
    }

    /// Supplies a replacement password for the server-initiated
    /// change-password sub-dialogue. Without one, a change request from
    /// the server cancels the attempt.
    pub fn with_new_password(mut self, new_password: impl Into<String>) -> Self {
        self.new_password = Some(new_password.into());
        self
    }

    // Request buffers carry the password; zero them once sent.

    fn first_request(&self) -> Zeroizing<Vec<u8>> {
        let mut data = WireWriter::new();
        data.put_bool(false);
        data.put_utf8(&self.password);
        Zeroizing::new(data.into_bytes())
    }

    fn change_request(&self, new_password: &str) -> Zeroizing<Vec<u8>> {
        let mut data = WireWriter::new();
        data.put_bool(true);
        data.put_utf8(&self.password);
        data.put_utf8(new_password);
        Zeroizing::new(data.into_bytes())
    }
}

// Passwords are not part of the debug surface.
impl std::fmt::Debug for PasswordAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordAuth")
            .field("username", &self.username)
            .field("service", &self.service)
            .field("has_new_password", &self.new_password.is_some())
            .finish_non_exhaustive()
    }
}

impl Drop for PasswordAuth {
    fn drop(&mut self) {
        self.password.zeroize();
        if let Some(ref mut new_password) = self.new_password {
            new_password.zeroize();
        }
    }
}

#[async_trait]
impl AuthMethod for PasswordAuth {
    fn name(&self) -> &'static str {
        "password"
    }

    async fn run(&mut self, handle: &mut dyn AuthHandle) -> SkiffResult<AuthOutcome> {
        handle
            .send_request(&self.username, &self.service, "password", &self.first_request())
            .await?;

        let payload = match handle.read_message().await? {
            Response::Outcome(outcome) => return Ok(outcome),
            Response::Payload(payload) => payload,
        };

        let change = PasswdChangeReq::from_bytes(&payload)?;
        tracing::debug!(prompt = change.prompt(), "server requests password change");

        let data = match self.new_password.as_deref() {
            Some(new_password) => self.change_request(new_password),
            // No replacement available; abandon rather than loop.
            None => return Ok(AuthOutcome::Cancelled),
        };

        handle
            .send_request(&self.username, &self.service, "password", &data)
            .await?;

        match handle.read_message().await? {
            Response::Outcome(outcome) => Ok(outcome),
            Response::Payload(payload) => Err(SkiffError::Protocol(format!(
                "unexpected message {} after password change request",
                payload.first().copied().unwrap_or(0)
            ))),
        }
    }
}

/// SSH_MSG_USERAUTH_PASSWD_CHANGEREQ payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswdChangeReq {
    prompt: String,
    language: String,
}

impl PasswdChangeReq {
    /// Creates a new change request.
    pub fn new(prompt: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            language: language.into(),
        }
    }

    /// The human-readable prompt explaining why a change is needed.
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// The RFC 3066 language tag.
    pub fn language(&self) -> &str {
        &self.language
    }

    /// Serializes to a payload.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut w = WireWriter::new();
        w.put_u8(SSH_MSG_USERAUTH_PASSWD_CHANGEREQ);
        w.put_utf8(&self.prompt);
        w.put_utf8(&self.language);
        w.into_bytes()
    }

    /// Parses from a payload.
    pub fn from_bytes(payload: &[u8]) -> SkiffResult<Self> {
        let mut r = WireReader::new(payload);
        let code = r.read_u8()?;
        if code != SSH_MSG_USERAUTH_PASSWD_CHANGEREQ {
            return Err(SkiffError::Protocol(format!(
                "expected SSH_MSG_USERAUTH_PASSWD_CHANGEREQ (60), got {}",
                code
            )));
        }
        let prompt = r.read_utf8()?;
        let language = r.read_utf8()?;
        Ok(Self { prompt, language })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_request_layout() {
        let method = PasswordAuth::new("alice", "ssh-connection", "hunter2");
        let data = method.first_request();

        let mut r = WireReader::new(&data);
        assert!(!r.read_bool().unwrap());
        assert_eq!(r.read_utf8().unwrap(), "hunter2");
        assert_eq!(r.remaining(), 0);
    }

    #[test]
    fn test_change_request_layout() {
        let method = PasswordAuth::new("alice", "ssh-connection", "old");
        let data = method.change_request("new");

        let mut r = WireReader::new(&data);
        assert!(r.read_bool().unwrap());
        assert_eq!(r.read_utf8().unwrap(), "old");
        assert_eq!(r.read_utf8().unwrap(), "new");
        assert_eq!(r.remaining(), 0);
    }

    #[test]
    fn test_change_req_round_trip() {
        let msg = PasswdChangeReq::new("expired", "");
        let parsed = PasswdChangeReq::from_bytes(&msg.to_bytes()).unwrap();
        assert_eq!(parsed.prompt(), "expired");
        assert_eq!(parsed.language(), "");
    }

    #[test]
    fn test_change_req_wrong_code() {
        let err = PasswdChangeReq::from_bytes(&[52]).unwrap_err();
        assert!(matches!(err, SkiffError::Protocol(_)));
    }

    #[test]
    fn test_debug_redacts_password() {
        let method = PasswordAuth::new("alice", "ssh-connection", "hunter2");
        let rendered = format!("{:?}", method);
        assert!(rendered.contains("alice"));
        assert!(!rendered.contains("hunter2"));
    }
}
