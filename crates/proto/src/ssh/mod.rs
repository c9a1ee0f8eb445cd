//! SSH user-authentication protocol (client side).
//!
//! The layer is small and strictly layered:
//!
//! 1. **Wire codec** ([`wire`]) - SSH binary strings, booleans, name-lists
//! 2. **Messages** ([`message`], [`auth`]) - the `SSH_MSG_USERAUTH_*` family
//! 3. **Transport port** ([`transport`]) - the interface to the keyed transport
//! 4. **Driver** ([`client`]) - the request/response state machine
//! 5. **Methods** ([`method`]) - `password`, `publickey`, `keyboard-interactive`
//!
//! The driver is the sole consumer of inbound authentication messages: it
//! absorbs `SSH_MSG_USERAUTH_BANNER` (dispatching to an optional
//! [`banner::BannerDisplay`]), converts `SUCCESS`/`FAILURE` into
//! [`client::AuthOutcome`] values, and hands method-specific codes (60/61)
//! to whichever method is running.
//!
//! # References
//!
//! - [RFC 4252](https://datatracker.ietf.org/doc/html/rfc4252) - SSH Authentication Protocol
//! - [RFC 4256](https://datatracker.ietf.org/doc/html/rfc4256) - Keyboard-interactive authentication

pub mod auth;
pub mod banner;
pub mod client;
pub mod message;
pub mod method;
pub mod signer;
pub mod transport;
pub mod wire;

// Re-export main types
pub use auth::{AuthBanner, AuthFailure, AuthRequest, AuthSuccess};
pub use banner::BannerDisplay;
pub use client::{AuthClient, AuthOutcome, Response, SSH_CONNECTION, SSH_USERAUTH};
pub use message::MessageType;
pub use method::{
    AuthHandle, AuthMethod, KeyboardInteractiveAuth, PasswordAuth, Prompt, PromptResponder,
    PublicKeyAuth,
};
pub use signer::{Ed25519Signer, Signer};
pub use transport::{DisconnectReason, Transport};
pub use wire::{DecodeError, WireReader, WireWriter};
