//! Transport port consumed by the authentication layer.
//!
//! The authentication protocol runs over an SSH transport (RFC 4253) that
//! has already completed version exchange and key exchange. This module
//! defines the narrow interface the driver needs from it: read the next
//! decrypted payload, send a payload, learn the session identifier, signal
//! that authentication completed, and tear the connection down.
//!
//! The trait is implemented by whatever owns the socket and the cipher
//! pipeline; the driver holds it exclusively for the duration of the
//! authentication phase and is the only consumer of inbound messages in
//! the user-auth range.

use async_trait::async_trait;
use skiff_platform::SkiffResult;

/// Disconnect reason codes from RFC 4253 Section 11.1 used by this layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum DisconnectReason {
    /// SSH_DISCONNECT_PROTOCOL_ERROR
    ProtocolError = 2,
    /// SSH_DISCONNECT_BY_APPLICATION
    ByApplication = 11,
}

impl DisconnectReason {
    /// Returns the wire code for this reason.
    pub fn code(self) -> u32 {
        self as u32
    }
}

/// Interface to an established, keyed SSH transport.
///
/// All payloads crossing this boundary are length-stripped and
/// MAC-verified application payloads: the first byte is the SSH message
/// code. Every async operation may block indefinitely on I/O; timeouts are
/// the transport's concern and surface here as
/// [`SkiffError::TransportClosed`](skiff_platform::SkiffError::TransportClosed).
#[async_trait]
pub trait Transport: Send {
    /// Requests an SSH service by name (`SSH_MSG_SERVICE_REQUEST`) and
    /// waits for `SSH_MSG_SERVICE_ACCEPT`.
    ///
    /// # Errors
    ///
    /// [`SkiffError::ServiceRejected`](skiff_platform::SkiffError::ServiceRejected)
    /// when the server refuses or answers with a different service.
    async fn start_service(&mut self, name: &str) -> SkiffResult<()>;

    /// Returns the next decrypted application payload, blocking until one
    /// arrives.
    async fn next_message(&mut self) -> SkiffResult<Vec<u8>>;

    /// Enqueues a payload for sending. `high_priority` schedules it ahead
    /// of any queued non-authentication traffic.
    async fn send_message(&mut self, payload: &[u8], high_priority: bool) -> SkiffResult<()>;

    /// Returns the exchange hash of the first key exchange.
    ///
    /// Stable for the lifetime of the connection; used as the binding
    /// nonce in publickey signatures.
    fn session_identifier(&self) -> &[u8];

    /// Signals that user authentication succeeded, allowing the transport
    /// to release buffered connection-layer messages and relax strict-kex
    /// checks.
    fn mark_authenticated(&mut self);

    /// Tears the transport down with an SSH `DISCONNECT`.
    async fn disconnect(&mut self, reason: DisconnectReason, description: &str) -> SkiffResult<()>;
}
