//! Pluggable authentication methods (RFC 4252 Sections 7, 8; RFC 4256).
//!
//! Each method is a named mechanism with its own request-data layout and
//! its own vocabulary of method-specific reply codes. A method drives its
//! sub-protocol through an [`AuthHandle`] borrowed for the duration of one
//! [`AuthMethod::run`] call: it sends one or more requests, reads the
//! replies in between, and returns an
//! [`AuthOutcome`](crate::ssh::client::AuthOutcome) once the attempt is
//! settled (or [`Ready`](crate::ssh::client::AuthOutcome::Ready) when the
//! driver should collect the final reply itself).

pub mod keyboard_interactive;
pub mod password;
pub mod publickey;

pub use keyboard_interactive::{KeyboardInteractiveAuth, Prompt, PromptResponder};
pub use password::PasswordAuth;
pub use publickey::PublicKeyAuth;

use crate::ssh::client::{AuthOutcome, Response};
use async_trait::async_trait;
use skiff_platform::SkiffResult;

/// Handle a method uses to talk to the server through the driver.
///
/// Implemented by [`AuthClient`](crate::ssh::client::AuthClient); methods
/// only ever see it as a borrowed trait object scoped to one `run` call,
/// which keeps the driver's exclusive ownership of the transport explicit.
#[async_trait]
pub trait AuthHandle: Send {
    /// Formats and sends an `SSH_MSG_USERAUTH_REQUEST` carrying
    /// `method_data` (already encoded in the method's layout).
    async fn send_request(
        &mut self,
        username: &str,
        service: &str,
        method: &str,
        method_data: &[u8],
    ) -> SkiffResult<()>;

    /// Sends a raw payload that is not a `USERAUTH_REQUEST`, such as
    /// keyboard-interactive's `SSH_MSG_USERAUTH_INFO_RESPONSE`.
    async fn send(&mut self, payload: &[u8]) -> SkiffResult<()>;

    /// Reads the next reply, absorbing banners and converting terminal
    /// messages into outcomes. A method must propagate
    /// [`Response::Outcome`] immediately: once the server has settled the
    /// attempt there is nothing left for the method to do.
    async fn read_message(&mut self) -> SkiffResult<Response>;

    /// The session identifier (first exchange hash), needed by publickey
    /// signatures.
    fn session_identifier(&self) -> &[u8];
}

/// A named authentication mechanism.
#[async_trait]
pub trait AuthMethod: Send {
    /// The method name as it appears on the wire.
    fn name(&self) -> &'static str;

    /// Runs the method's sub-protocol against the server.
    ///
    /// Returns the settled outcome, [`AuthOutcome::Cancelled`] to abandon
    /// the attempt locally (no response is read in that case), or
    /// [`AuthOutcome::Ready`] when the method sent its request but leaves
    /// reading the terminal reply to the driver.
    ///
    /// # Errors
    ///
    /// [`SkiffError::Protocol`](skiff_platform::SkiffError::Protocol) when
    /// the server answers with a code outside the method's expected set;
    /// the driver then disconnects the transport.
    async fn run(&mut self, handle: &mut dyn AuthHandle) -> SkiffResult<AuthOutcome>;
}
