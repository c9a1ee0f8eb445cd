//! Generic user-authentication messages (RFC 4252 Section 5).
//!
//! The four messages every method shares: the outbound request and the
//! three generic replies (`FAILURE`, `SUCCESS`, `BANNER`). Method-specific
//! messages (codes 60/61) live with their methods.
//!
//! Request data is carried opaque: each method encodes its own
//! `method_data` with the wire codec and the request appends it verbatim,
//! so this module never needs to understand a method's fields.

use crate::ssh::message::MessageType;
use crate::ssh::wire::{WireReader, WireWriter};
use skiff_platform::{SkiffError, SkiffResult};

/// SSH_MSG_USERAUTH_REQUEST (RFC 4252 Section 5).
///
/// Format:
/// ```text
/// byte      SSH_MSG_USERAUTH_REQUEST (50)
/// string    user name (UTF-8)
/// string    service name
/// string    method name
/// ....      method specific fields
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthRequest {
    username: String,
    service: String,
    method: String,
    method_data: Vec<u8>,
}

impl AuthRequest {
    /// Creates a new authentication request.
    ///
    /// `method_data` must already be encoded in the method's own layout;
    /// it is appended to the request as raw bytes.
    pub fn new(
        username: impl Into<String>,
        service: impl Into<String>,
        method: impl Into<String>,
        method_data: Vec<u8>,
    ) -> Self {
        Self {
            username: username.into(),
            service: service.into(),
            method: method.into(),
            method_data,
        }
    }

    /// Returns the user name.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Returns the service name.
    pub fn service(&self) -> &str {
        &self.service
    }

    /// Returns the method name.
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Returns the raw method-specific data.
    pub fn method_data(&self) -> &[u8] {
        &self.method_data
    }

    /// Serializes the request to a payload.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut w = WireWriter::new();
        w.put_u8(MessageType::UserauthRequest as u8);
        w.put_utf8(&self.username);
        w.put_utf8(&self.service);
        w.put_utf8(&self.method);
        let mut bytes = w.into_bytes();
        bytes.extend_from_slice(&self.method_data);
        bytes
    }

    /// Parses a request from a payload.
    ///
    /// Everything after the method name is returned as raw
    /// `method_data`.
    pub fn from_bytes(payload: &[u8]) -> SkiffResult<Self> {
        let mut r = WireReader::new(payload);
        let code = r.read_u8()?;
        if code != MessageType::UserauthRequest as u8 {
            return Err(SkiffError::Protocol(format!(
                "expected SSH_MSG_USERAUTH_REQUEST (50), got {}",
                code
            )));
        }
        let username = r.read_utf8()?;
        let service = r.read_utf8()?;
        let method = r.read_utf8()?;
        let method_data = payload[payload.len() - r.remaining()..].to_vec();
        Ok(Self {
            username,
            service,
            method,
            method_data,
        })
    }
}

/// SSH_MSG_USERAUTH_FAILURE (RFC 4252 Section 5.1).
///
/// Despite the name this is not always a dead end: when
/// `partial_success` is true the attempted method did contribute and the
/// listed methods may continue the chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthFailure {
    methods: Vec<String>,
    partial_success: bool,
}

impl AuthFailure {
    /// Creates a new failure message.
    pub fn new(methods: Vec<String>, partial_success: bool) -> Self {
        Self {
            methods,
            partial_success,
        }
    }

    /// Methods that can continue the authentication.
    pub fn methods(&self) -> &[String] {
        &self.methods
    }

    /// Consumes the message, returning the method list.
    pub fn into_methods(self) -> Vec<String> {
        self.methods
    }

    /// Whether the attempted method partially succeeded.
    pub fn partial_success(&self) -> bool {
        self.partial_success
    }

    /// Serializes to a payload.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut w = WireWriter::new();
        w.put_u8(MessageType::UserauthFailure as u8);
        w.put_name_list(&self.methods);
        w.put_bool(self.partial_success);
        w.into_bytes()
    }

    /// Parses from a payload.
    pub fn from_bytes(payload: &[u8]) -> SkiffResult<Self> {
        let mut r = WireReader::new(payload);
        let code = r.read_u8()?;
        if code != MessageType::UserauthFailure as u8 {
            return Err(SkiffError::Protocol(format!(
                "expected SSH_MSG_USERAUTH_FAILURE (51), got {}",
                code
            )));
        }
        let methods = r.read_name_list()?;
        let partial_success = r.read_bool()?;
        Ok(Self {
            methods,
            partial_success,
        })
    }
}

/// SSH_MSG_USERAUTH_SUCCESS (RFC 4252 Section 5.1). Carries no fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AuthSuccess;

impl AuthSuccess {
    /// Serializes to a payload.
    pub fn to_bytes(&self) -> Vec<u8> {
        vec![MessageType::UserauthSuccess as u8]
    }

    /// Parses from a payload.
    pub fn from_bytes(payload: &[u8]) -> SkiffResult<Self> {
        match payload.first() {
            Some(&code) if code == MessageType::UserauthSuccess as u8 => Ok(Self),
            other => Err(SkiffError::Protocol(format!(
                "expected SSH_MSG_USERAUTH_SUCCESS (52), got {:?}",
                other
            ))),
        }
    }
}

/// SSH_MSG_USERAUTH_BANNER (RFC 4252 Section 5.4).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthBanner {
    message: String,
    language: String,
}

impl AuthBanner {
    /// Creates a new banner message with an empty language tag.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            language: String::new(),
        }
    }

    /// Returns the banner text.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the RFC 3066 language tag (usually empty).
    pub fn language(&self) -> &str {
        &self.language
    }

    /// Serializes to a payload.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut w = WireWriter::new();
        w.put_u8(MessageType::UserauthBanner as u8);
        w.put_utf8(&self.message);
        w.put_utf8(&self.language);
        w.into_bytes()
    }

    /// Parses from a payload.
    pub fn from_bytes(payload: &[u8]) -> SkiffResult<Self> {
        let mut r = WireReader::new(payload);
        let code = r.read_u8()?;
        if code != MessageType::UserauthBanner as u8 {
            return Err(SkiffError::Protocol(format!(
                "expected SSH_MSG_USERAUTH_BANNER (53), got {}",
                code
            )));
        }
        let message = r.read_utf8()?;
        let language = r.read_utf8()?;
        Ok(Self { message, language })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_request_round_trip() {
        let request = AuthRequest::new("alice", "ssh-connection", "none", Vec::new());
        let parsed = AuthRequest::from_bytes(&request.to_bytes()).unwrap();
        assert_eq!(parsed, request);
        assert_eq!(parsed.username(), "alice");
        assert_eq!(parsed.service(), "ssh-connection");
        assert_eq!(parsed.method(), "none");
        assert!(parsed.method_data().is_empty());
    }

    #[test]
    fn test_auth_request_preserves_method_data() {
        let data = vec![0, 0, 0, 0, 7, 104, 117, 110, 116, 101, 114, 50];
        let request = AuthRequest::new("bob", "ssh-connection", "password", data.clone());
        let parsed = AuthRequest::from_bytes(&request.to_bytes()).unwrap();
        assert_eq!(parsed.method_data(), &data[..]);
    }

    #[test]
    fn test_auth_request_wrong_code() {
        let mut bytes = AuthRequest::new("a", "b", "c", Vec::new()).to_bytes();
        bytes[0] = 51;
        assert!(AuthRequest::from_bytes(&bytes).is_err());
    }

    #[test]
    fn test_auth_failure_round_trip() {
        let failure = AuthFailure::new(
            vec!["publickey".to_string(), "password".to_string()],
            false,
        );
        let parsed = AuthFailure::from_bytes(&failure.to_bytes()).unwrap();
        assert_eq!(parsed.methods(), ["publickey", "password"]);
        assert!(!parsed.partial_success());
    }

    #[test]
    fn test_auth_failure_partial() {
        let failure = AuthFailure::new(vec!["password".to_string()], true);
        let parsed = AuthFailure::from_bytes(&failure.to_bytes()).unwrap();
        assert!(parsed.partial_success());
        assert_eq!(parsed.into_methods(), vec!["password".to_string()]);
    }

    #[test]
    fn test_auth_failure_empty_methods() {
        let parsed = AuthFailure::from_bytes(&[51, 0, 0, 0, 0, 0]).unwrap();
        assert!(parsed.methods().is_empty());
        assert!(!parsed.partial_success());
    }

    #[test]
    fn test_auth_failure_truncated() {
        // Name-list present, partial-success flag missing.
        let err = AuthFailure::from_bytes(&[51, 0, 0, 0, 0]).unwrap_err();
        assert!(matches!(err, SkiffError::Protocol(_)));
    }

    #[test]
    fn test_auth_success() {
        let parsed = AuthSuccess::from_bytes(&AuthSuccess.to_bytes()).unwrap();
        assert_eq!(parsed, AuthSuccess);
        assert!(AuthSuccess::from_bytes(&[]).is_err());
    }

    #[test]
    fn test_auth_banner_round_trip() {
        let banner = AuthBanner::new("Welcome\n");
        let parsed = AuthBanner::from_bytes(&banner.to_bytes()).unwrap();
        assert_eq!(parsed.message(), "Welcome\n");
        assert_eq!(parsed.language(), "");
    }
}
