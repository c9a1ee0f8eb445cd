//! SSH message codes handled by the authentication layer.
//!
//! RFC 4251 Section 7 assigns the range 50-79 to the user-authentication
//! protocol; within it, 60-79 are reserved for method-specific messages and
//! are reused by every method (`PK_OK`, `PASSWD_CHANGEREQ` and
//! `INFO_REQUEST` all share code 60). Because of that reuse, only the codes
//! the driver itself dispatches on live in [`MessageType`]; the overloaded
//! method codes are plain constants inside the method modules.
//!
//! # Example
//!
//! ```rust
//! use skiff_proto::ssh::message::MessageType;
//!
//! assert_eq!(MessageType::UserauthRequest as u8, 50);
//! assert_eq!(MessageType::from_u8(52), Some(MessageType::UserauthSuccess));
//! assert_eq!(MessageType::from_u8(60), None);
//! ```

/// Message types the authentication driver dispatches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MessageType {
    /// Disconnect message - terminates the connection.
    Disconnect = 1,
    /// Service request - request a service (e.g., "ssh-userauth").
    ServiceRequest = 5,
    /// Service accept - service request accepted.
    ServiceAccept = 6,
    /// User authentication request.
    UserauthRequest = 50,
    /// User authentication failure (also carries partial-success chains).
    UserauthFailure = 51,
    /// User authentication success.
    UserauthSuccess = 52,
    /// User authentication banner.
    UserauthBanner = 53,
}

impl MessageType {
    /// Converts a byte to a message type.
    ///
    /// Returns `None` for codes this layer does not dispatch on, including
    /// the method-specific range (see [`is_method_specific`]).
    pub fn from_u8(byte: u8) -> Option<Self> {
        match byte {
            1 => Some(MessageType::Disconnect),
            5 => Some(MessageType::ServiceRequest),
            6 => Some(MessageType::ServiceAccept),
            50 => Some(MessageType::UserauthRequest),
            51 => Some(MessageType::UserauthFailure),
            52 => Some(MessageType::UserauthSuccess),
            53 => Some(MessageType::UserauthBanner),
            _ => None,
        }
    }

    /// Returns the protocol name of the message.
    pub fn name(&self) -> &'static str {
        match self {
            MessageType::Disconnect => "SSH_MSG_DISCONNECT",
            MessageType::ServiceRequest => "SSH_MSG_SERVICE_REQUEST",
            MessageType::ServiceAccept => "SSH_MSG_SERVICE_ACCEPT",
            MessageType::UserauthRequest => "SSH_MSG_USERAUTH_REQUEST",
            MessageType::UserauthFailure => "SSH_MSG_USERAUTH_FAILURE",
            MessageType::UserauthSuccess => "SSH_MSG_USERAUTH_SUCCESS",
            MessageType::UserauthBanner => "SSH_MSG_USERAUTH_BANNER",
        }
    }
}

/// Returns `true` when `code` lies in the method-specific range (60-79)
/// that RFC 4251 Section 7 reserves for the running authentication method.
pub const fn is_method_specific(code: u8) -> bool {
    code >= 60 && code <= 79
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_u8_userauth_range() {
        assert_eq!(MessageType::from_u8(50), Some(MessageType::UserauthRequest));
        assert_eq!(MessageType::from_u8(51), Some(MessageType::UserauthFailure));
        assert_eq!(MessageType::from_u8(52), Some(MessageType::UserauthSuccess));
        assert_eq!(MessageType::from_u8(53), Some(MessageType::UserauthBanner));
    }

    #[test]
    fn test_from_u8_unknown() {
        // Method-specific codes are not dispatched here.
        assert_eq!(MessageType::from_u8(60), None);
        assert_eq!(MessageType::from_u8(61), None);
        assert_eq!(MessageType::from_u8(255), None);
    }

    #[test]
    fn test_method_specific_range() {
        assert!(is_method_specific(60));
        assert!(is_method_specific(79));
        assert!(!is_method_specific(53));
        assert!(!is_method_specific(80));
    }

    #[test]
    fn test_name() {
        assert_eq!(
            MessageType::UserauthBanner.name(),
            "SSH_MSG_USERAUTH_BANNER"
        );
    }
}
