//! Client-side SSH-2 user authentication (RFC 4252).
//!
//! This crate implements the authentication protocol layer an SSH client
//! runs over an already-keyed transport (RFC 4253). The transport itself —
//! version exchange, key exchange, cipher and MAC pipelines — is consumed
//! through the [`ssh::transport::Transport`] trait and implemented
//! elsewhere; everything above it lives here: the request/response driver,
//! the pluggable authentication methods (`password`, `publickey`,
//! `keyboard-interactive`), and banner dispatch.
//!
//! # Example
//!
//! ```rust,no_run
//! use skiff_proto::ssh::client::AuthClient;
//! use skiff_proto::ssh::method::PasswordAuth;
//! use skiff_proto::ssh::transport::Transport;
//!
//! async fn login<T: Transport>(transport: T) -> Result<(), Box<dyn std::error::Error>> {
//!     // Starts the ssh-userauth service on the transport.
//!     let mut auth = AuthClient::new(transport).await?;
//!
//!     // Probe with the "none" method to learn what the server offers.
//!     let methods = auth.list_methods("alice", "ssh-connection").await?;
//!     println!("server offers: {}", methods.join(","));
//!
//!     // Try password authentication.
//!     let mut password = PasswordAuth::new("alice", "ssh-connection", "secret");
//!     let outcome = auth.authenticate(&mut password).await?;
//!     println!("outcome: {:?}", outcome);
//!     Ok(())
//! }
//! ```
//!
//! # Security
//!
//! - Secrets (passwords, prompt responses) are zeroed on drop using
//!   [`zeroize`]
//! - Private key material never enters this layer; public-key signing goes
//!   through the [`ssh::signer::Signer`] handle
//! - No unsafe code
//!
//! # References
//!
//! - [RFC 4251](https://datatracker.ietf.org/doc/html/rfc4251) - SSH Protocol Architecture
//! - [RFC 4252](https://datatracker.ietf.org/doc/html/rfc4252) - SSH Authentication Protocol
//! - [RFC 4256](https://datatracker.ietf.org/doc/html/rfc4256) - Generic Message Exchange Authentication

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![forbid(unsafe_code)]

pub mod ssh;
