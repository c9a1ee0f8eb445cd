//! User-authentication driver (RFC 4252).
//!
//! [`AuthClient`] owns the transport for the duration of the
//! authentication phase and runs the request/response dialogue: it sends
//! `SSH_MSG_USERAUTH_REQUEST` messages on behalf of the active method,
//! absorbs banners, converts `SUCCESS`/`FAILURE` into [`AuthOutcome`]
//! values, and hands method-specific replies (codes 60-79) to the method
//! that is running.
//!
//! One attempt is in flight at a time; the driver never sends a new
//! request before the previous response has been consumed. The driver is
//! not internally synchronized: one logical task drives it, and callers
//! that share it across threads must serialize access themselves.
//!
//! # Example
//!
//! ```rust,no_run
//! use skiff_proto::ssh::client::{AuthClient, AuthOutcome};
//! use skiff_proto::ssh::method::PasswordAuth;
//! use skiff_proto::ssh::transport::Transport;
//!
//! # async fn example<T: Transport>(transport: T) -> Result<(), Box<dyn std::error::Error>> {
//! let mut auth = AuthClient::new(transport).await?;
//! let methods = auth.list_methods("alice", "ssh-connection").await?;
//!
//! if methods.iter().any(|m| m == "password") {
//!     let mut password = PasswordAuth::new("alice", "ssh-connection", "hunter2");
//!     match auth.authenticate(&mut password).await? {
//!         AuthOutcome::Complete => println!("authenticated"),
//!         outcome => println!("not yet: {:?}", outcome),
//!     }
//! }
//! # Ok(())
//! # }
//! ```

use crate::ssh::auth::{AuthBanner, AuthFailure, AuthRequest};
use crate::ssh::banner::BannerDisplay;
use crate::ssh::message::{is_method_specific, MessageType};
use crate::ssh::method::{AuthHandle, AuthMethod};
use crate::ssh::transport::{DisconnectReason, Transport};
use async_trait::async_trait;
use skiff_platform::{SkiffError, SkiffResult};
use tracing::{debug, trace, warn};

/// The service name of the authentication protocol itself.
pub const SSH_USERAUTH: &str = "ssh-userauth";

/// The service authentication is usually requested for.
pub const SSH_CONNECTION: &str = "ssh-connection";

/// Result of an authentication exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    /// No terminal reply observed yet; a method returns this from
    /// [`AuthMethod::run`] when it leaves reading the final reply to the
    /// driver.
    Ready,
    /// The server accepted the authentication.
    Complete,
    /// The server rejected the attempt. `methods` lists what may be tried
    /// instead.
    Failed {
        /// Methods that can continue the authentication.
        methods: Vec<String>,
        /// Always `false`; partial successes surface as
        /// [`AuthOutcome::FurtherRequired`].
        partial: bool,
    },
    /// The attempted method succeeded but the server requires more;
    /// `methods` lists what may continue the chain.
    FurtherRequired {
        /// Methods that can continue the chain.
        methods: Vec<String>,
    },
    /// The method abandoned the attempt locally (e.g. the user dismissed
    /// a prompt). Nothing was concluded with the server.
    Cancelled,
}

/// What [`AuthHandle::read_message`] produced: either a method-specific
/// payload to interpret, or a terminal outcome that short-circuits the
/// method.
#[derive(Debug)]
pub enum Response {
    /// A payload in the method-specific range (codes 60-79), with the
    /// leading message code intact.
    Payload(Vec<u8>),
    /// The server settled the attempt (or a banner settled nothing and
    /// was absorbed along the way).
    Outcome(AuthOutcome),
}

/// The authentication protocol driver.
///
/// Construction starts the `ssh-userauth` service and captures the
/// session identifier; afterwards the caller probes with
/// [`list_methods`](Self::list_methods) and runs methods through
/// [`authenticate`](Self::authenticate) until one yields
/// [`AuthOutcome::Complete`] or every offered method is exhausted.
pub struct AuthClient<T: Transport> {
    transport: T,
    banner: Option<Box<dyn BannerDisplay>>,
    state: AuthOutcome,
    session_id: Vec<u8>,
    notified: bool,
}

impl<T: Transport> AuthClient<T> {
    /// Starts the `ssh-userauth` service on `transport` and builds the
    /// driver around it.
    ///
    /// # Errors
    ///
    /// [`SkiffError::ServiceRejected`] when the server refuses the
    /// service.
    pub async fn new(mut transport: T) -> SkiffResult<Self> {
        transport.start_service(SSH_USERAUTH).await?;
        let session_id = transport.session_identifier().to_vec();
        Ok(Self {
            transport,
            banner: None,
            // Nothing attempted yet; semantically "not authenticated".
            state: AuthOutcome::Failed {
                methods: Vec::new(),
                partial: false,
            },
            session_id,
            notified: false,
        })
    }

    /// Registers a sink for server banner messages.
    ///
    /// Register before the first call to
    /// [`list_methods`](Self::list_methods): servers that have a banner
    /// usually send it ahead of the first reply. Without a sink, banner
    /// text is silently discarded.
    pub fn set_banner_display(&mut self, display: Box<dyn BannerDisplay>) {
        self.banner = Some(display);
    }

    /// Whether the server has accepted the authentication.
    pub fn is_authenticated(&self) -> bool {
        matches!(self.state, AuthOutcome::Complete)
    }

    /// The last observed outcome.
    pub fn state(&self) -> &AuthOutcome {
        &self.state
    }

    /// The session identifier captured at construction; stable for the
    /// connection's lifetime.
    pub fn session_identifier(&self) -> &[u8] {
        &self.session_id
    }

    /// Borrows the underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Consumes the driver, handing the transport back so the caller can
    /// proceed to the connection protocol.
    pub fn into_transport(self) -> T {
        self.transport
    }

    /// Enumerates the methods the server offers for `username` and
    /// `service` by probing with the `"none"` method.
    ///
    /// If the server accepts the probe outright (empty authentication is
    /// allowed), the returned list is empty and
    /// [`is_authenticated`](Self::is_authenticated) reports `true`.
    ///
    /// The probe is never retried internally; after a partial success the
    /// caller drives the next attempt.
    ///
    /// # Errors
    ///
    /// [`SkiffError::Protocol`] (after disconnecting the transport) when
    /// the server answers with anything other than
    /// `SUCCESS`/`FAILURE`/`BANNER`.
    pub async fn list_methods(
        &mut self,
        username: &str,
        service: &str,
    ) -> SkiffResult<Vec<String>> {
        if self.is_authenticated() {
            return Ok(Vec::new());
        }
        self.dispatch_request(username, service, "none", &[]).await?;
        match self.read_response().await {
            Ok(Response::Outcome(AuthOutcome::Complete)) => Ok(Vec::new()),
            Ok(Response::Outcome(AuthOutcome::Failed { methods, .. }))
            | Ok(Response::Outcome(AuthOutcome::FurtherRequired { methods })) => {
                debug!(methods = ?methods, "server offers authentication methods");
                Ok(methods)
            }
            Ok(Response::Outcome(outcome)) => {
                let description = format!("unexpected outcome {:?} from method enumeration", outcome);
                Err(self.violation(&description).await)
            }
            Ok(Response::Payload(payload)) => {
                let description = format!(
                    "unexpected message {} from method enumeration",
                    payload.first().copied().unwrap_or(0)
                );
                Err(self.violation(&description).await)
            }
            Err(err) => Err(self.escalate(err).await),
        }
    }

    /// Runs one authentication method to its outcome.
    ///
    /// Once authentication has completed this is an idempotent no-op that
    /// returns [`AuthOutcome::Complete`] without touching the transport.
    ///
    /// # Errors
    ///
    /// Any [`SkiffError::Protocol`] raised by the method or the read loop
    /// disconnects the transport with `SSH_DISCONNECT_PROTOCOL_ERROR`
    /// before it is returned.
    pub async fn authenticate(&mut self, method: &mut dyn AuthMethod) -> SkiffResult<AuthOutcome> {
        if self.is_authenticated() {
            return Ok(AuthOutcome::Complete);
        }
        debug!(method = method.name(), "starting authentication attempt");

        let outcome = match method.run(self).await {
            Ok(AuthOutcome::Ready) => {
                // The method sent its request but left the terminal reply
                // to us; the next non-banner message must settle it.
                match self.read_response().await {
                    Ok(Response::Outcome(outcome)) => outcome,
                    Ok(Response::Payload(payload)) => {
                        let description = format!(
                            "unexpected message {} while awaiting authentication result",
                            payload.first().copied().unwrap_or(0)
                        );
                        return Err(self.violation(&description).await);
                    }
                    Err(err) => return Err(self.escalate(err).await),
                }
            }
            Ok(outcome) => outcome,
            Err(err) => return Err(self.escalate(err).await),
        };

        debug!(method = method.name(), outcome = ?outcome, "attempt settled");
        Ok(self.settle(outcome))
    }

    /// Sends an `SSH_MSG_USERAUTH_REQUEST` ahead of queued non-auth
    /// traffic.
    async fn dispatch_request(
        &mut self,
        username: &str,
        service: &str,
        method: &str,
        method_data: &[u8],
    ) -> SkiffResult<()> {
        let request = AuthRequest::new(username, service, method, method_data.to_vec());
        trace!(method, "-> SSH_MSG_USERAUTH_REQUEST");
        self.transport.send_message(&request.to_bytes(), true).await
    }

    /// Reads until something other than a banner arrives.
    ///
    /// Terminal messages settle the driver state; method-specific codes
    /// are returned verbatim; anything outside the user-auth range is a
    /// protocol violation.
    async fn read_response(&mut self) -> SkiffResult<Response> {
        loop {
            let payload = self.transport.next_message().await?;
            let code = *payload
                .first()
                .ok_or_else(|| SkiffError::Protocol("empty payload from transport".to_string()))?;

            match MessageType::from_u8(code) {
                Some(MessageType::UserauthSuccess) => {
                    trace!("<- SSH_MSG_USERAUTH_SUCCESS");
                    return Ok(Response::Outcome(self.settle(AuthOutcome::Complete)));
                }
                Some(MessageType::UserauthFailure) => {
                    let failure = AuthFailure::from_bytes(&payload)?;
                    trace!(
                        partial = failure.partial_success(),
                        "<- SSH_MSG_USERAUTH_FAILURE"
                    );
                    let partial = failure.partial_success();
                    let methods = failure.into_methods();
                    let outcome = if partial {
                        AuthOutcome::FurtherRequired { methods }
                    } else {
                        AuthOutcome::Failed {
                            methods,
                            partial: false,
                        }
                    };
                    return Ok(Response::Outcome(self.settle(outcome)));
                }
                Some(MessageType::UserauthBanner) => {
                    let banner = AuthBanner::from_bytes(&payload)?;
                    trace!("<- SSH_MSG_USERAUTH_BANNER");
                    if let Some(display) = self.banner.as_mut() {
                        display.display_banner(banner.message(), banner.language());
                    }
                }
                _ if is_method_specific(code) => {
                    trace!(code, "<- method-specific message");
                    return Ok(Response::Payload(payload));
                }
                _ => {
                    return Err(SkiffError::Protocol(format!(
                        "message code {} outside the user-auth range",
                        code
                    )));
                }
            }
        }
    }

    /// Records an outcome, notifying the transport on the first
    /// `Complete`.
    fn settle(&mut self, outcome: AuthOutcome) -> AuthOutcome {
        if outcome == AuthOutcome::Complete && !self.notified {
            self.transport.mark_authenticated();
            self.notified = true;
            debug!("user authentication complete");
        }
        self.state = outcome.clone();
        outcome
    }

    /// Disconnects with `SSH_DISCONNECT_PROTOCOL_ERROR` and builds the
    /// error to return.
    async fn violation(&mut self, description: &str) -> SkiffError {
        warn!("protocol violation: {}", description);
        let _ = self
            .transport
            .disconnect(DisconnectReason::ProtocolError, description)
            .await;
        SkiffError::Protocol(description.to_string())
    }

    /// Disconnects when `err` is a protocol violation; other errors pass
    /// through untouched.
    async fn escalate(&mut self, err: SkiffError) -> SkiffError {
        if let SkiffError::Protocol(ref description) = err {
            warn!("protocol violation: {}", description);
            let _ = self
                .transport
                .disconnect(DisconnectReason::ProtocolError, description)
                .await;
        }
        err
    }
}

#[async_trait]
impl<T: Transport> AuthHandle for AuthClient<T> {
    async fn send_request(
        &mut self,
        username: &str,
        service: &str,
        method: &str,
        method_data: &[u8],
    ) -> SkiffResult<()> {
        self.dispatch_request(username, service, method, method_data)
            .await
    }

    async fn send(&mut self, payload: &[u8]) -> SkiffResult<()> {
        self.transport.send_message(payload, true).await
    }

    async fn read_message(&mut self) -> SkiffResult<Response> {
        self.read_response().await
    }

    fn session_identifier(&self) -> &[u8] {
        &self.session_id
    }
}
