//! Keyboard-interactive authentication (RFC 4256).
//!
//! A generic challenge/response exchange: the server sends
//! `SSH_MSG_USERAUTH_INFO_REQUEST` messages, each carrying zero or more
//! prompts, and the method answers every one with an
//! `SSH_MSG_USERAUTH_INFO_RESPONSE` until the server settles the attempt.
//! Prompts are put to the user through a [`PromptResponder`] supplied at
//! construction.
//!
//! Collected responses are zeroed once the reply has been sent.

use crate::ssh::client::{AuthOutcome, Response};
use crate::ssh::method::{AuthHandle, AuthMethod};
use crate::ssh::wire::{WireReader, WireWriter};
use async_trait::async_trait;
use skiff_platform::{SkiffError, SkiffResult};
use zeroize::{Zeroize, Zeroizing};

/// SSH_MSG_USERAUTH_INFO_REQUEST (RFC 4256 Section 3.2).
pub const SSH_MSG_USERAUTH_INFO_REQUEST: u8 = 60;

/// SSH_MSG_USERAUTH_INFO_RESPONSE (RFC 4256 Section 3.4).
pub const SSH_MSG_USERAUTH_INFO_RESPONSE: u8 = 61;

/// A single prompt from an info request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    /// The prompt text shown to the user.
    pub text: String,
    /// Whether the user's input should be echoed while typing.
    pub echo: bool,
}

/// Collects the user's answers to a round of prompts.
///
/// Invoked synchronously from the method; the exchange does not advance
/// until it returns. Must produce exactly one answer per prompt.
/// Returning `None` (the user dismissed the dialogue) cancels the
/// authentication attempt.
pub trait PromptResponder: Send {
    /// Answers one `INFO_REQUEST` round.
    ///
    /// `name` and `instruction` describe the exchange and may be empty;
    /// `prompts` may be empty too, in which case the returned list must
    /// also be empty.
    fn respond(&mut self, name: &str, instruction: &str, prompts: &[Prompt])
        -> Option<Vec<String>>;
}

/// The `keyboard-interactive` authentication method.
pub struct KeyboardInteractiveAuth {
    username: String,
    service: String,
    responder: Box<dyn PromptResponder>,
    submethods: String,
}

impl KeyboardInteractiveAuth {
    /// Creates a keyboard-interactive attempt for `username` against
    /// `service`, answering prompts through `responder`.
    pub fn new(
        username: impl Into<String>,
        service: impl Into<String>,
        responder: Box<dyn PromptResponder>,
    ) -> Self {
        Self {
            username: username.into(),
            service: service.into(),
            responder,
            submethods: String::new(),
        }
    }

    /// Sets the comma-separated submethods hint passed to the server
    /// (empty by default; the server chooses).
    pub fn with_submethods(mut self, submethods: impl Into<String>) -> Self {
        self.submethods = submethods.into();
        self
    }

    fn initial_request(&self) -> Vec<u8> {
        let mut data = WireWriter::new();
        // Deprecated language tag, always empty.
        data.put_utf8("");
        data.put_utf8(&self.submethods);
        data.into_bytes()
    }
}

impl std::fmt::Debug for KeyboardInteractiveAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyboardInteractiveAuth")
            .field("username", &self.username)
            .field("service", &self.service)
            .field("submethods", &self.submethods)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl AuthMethod for KeyboardInteractiveAuth {
    fn name(&self) -> &'static str {
        "keyboard-interactive"
    }

    async fn run(&mut self, handle: &mut dyn AuthHandle) -> SkiffResult<AuthOutcome> {
        handle
            .send_request(
                &self.username,
                &self.service,
                "keyboard-interactive",
                &self.initial_request(),
            )
            .await?;

        loop {
            let payload = match handle.read_message().await? {
                Response::Outcome(outcome) => return Ok(outcome),
                Response::Payload(payload) => payload,
            };

            let request = InfoRequest::from_bytes(&payload)?;
            tracing::debug!(prompts = request.prompts().len(), "info request");

            let responses = match self.responder.respond(
                request.name(),
                request.instruction(),
                request.prompts(),
            ) {
                Some(responses) => responses,
                None => return Ok(AuthOutcome::Cancelled),
            };

            // RFC 4256: num-responses must equal num-prompts.
            if responses.len() != request.prompts().len() {
                let answered = responses.len();
                for mut response in responses {
                    response.zeroize();
                }
                return Err(SkiffError::Protocol(format!(
                    "prompt responder returned {} answers for {} prompts",
                    answered,
                    request.prompts().len()
                )));
            }

            let reply = InfoResponse::new(responses);
            let payload = Zeroizing::new(reply.to_bytes());
            handle.send(&payload).await?;
        }
    }
}

/// SSH_MSG_USERAUTH_INFO_REQUEST payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfoRequest {
    name: String,
    instruction: String,
    language: String,
    prompts: Vec<Prompt>,
}

impl InfoRequest {
    /// Creates a new info request.
    pub fn new(
        name: impl Into<String>,
        instruction: impl Into<String>,
        prompts: Vec<Prompt>,
    ) -> Self {
        Self {
            name: name.into(),
            instruction: instruction.into(),
            language: String::new(),
            prompts,
        }
    }

    /// The exchange name (may be empty).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The instruction text (may be empty).
    pub fn instruction(&self) -> &str {
        &self.instruction
    }

    /// The prompts for this round; zero prompts are legal.
    pub fn prompts(&self) -> &[Prompt] {
        &self.prompts
    }

    /// Serializes to a payload.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut w = WireWriter::new();
        w.put_u8(SSH_MSG_USERAUTH_INFO_REQUEST);
        w.put_utf8(&self.name);
        w.put_utf8(&self.instruction);
        w.put_utf8(&self.language);
        w.put_u32(self.prompts.len() as u32);
        for prompt in &self.prompts {
            w.put_utf8(&prompt.text);
            w.put_bool(prompt.echo);
        }
        w.into_bytes()
    }

    /// Parses from a payload.
    pub fn from_bytes(payload: &[u8]) -> SkiffResult<Self> {
        let mut r = WireReader::new(payload);
        let code = r.read_u8()?;
        if code != SSH_MSG_USERAUTH_INFO_REQUEST {
            return Err(SkiffError::Protocol(format!(
                "expected SSH_MSG_USERAUTH_INFO_REQUEST (60), got {}",
                code
            )));
        }
        let name = r.read_utf8()?;
        let instruction = r.read_utf8()?;
        let language = r.read_utf8()?;
        let num_prompts = r.read_u32()?;
        let mut prompts = Vec::new();
        for _ in 0..num_prompts {
            let text = r.read_utf8()?;
            let echo = r.read_bool()?;
            prompts.push(Prompt { text, echo });
        }
        Ok(Self {
            name,
            instruction,
            language,
            prompts,
        })
    }
}

/// SSH_MSG_USERAUTH_INFO_RESPONSE payload. Responses are zeroed on drop.
pub struct InfoResponse {
    responses: Vec<String>,
}

impl InfoResponse {
    /// Creates a response carrying one answer per prompt.
    pub fn new(responses: Vec<String>) -> Self {
        Self { responses }
    }

    /// Serializes to a payload.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut w = WireWriter::new();
        w.put_u8(SSH_MSG_USERAUTH_INFO_RESPONSE);
        w.put_u32(self.responses.len() as u32);
        for response in &self.responses {
            w.put_utf8(response);
        }
        w.into_bytes()
    }
}

impl std::fmt::Debug for InfoResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InfoResponse")
            .field("num_responses", &self.responses.len())
            .finish_non_exhaustive()
    }
}

impl Drop for InfoResponse {
    fn drop(&mut self) {
        for response in &mut self.responses {
            response.zeroize();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Never;

    impl PromptResponder for Never {
        fn respond(&mut self, _: &str, _: &str, _: &[Prompt]) -> Option<Vec<String>> {
            None
        }
    }

    #[test]
    fn test_initial_request_layout() {
        let method = KeyboardInteractiveAuth::new("alice", "ssh-connection", Box::new(Never));
        let data = method.initial_request();

        let mut r = WireReader::new(&data);
        assert_eq!(r.read_utf8().unwrap(), "");
        assert_eq!(r.read_utf8().unwrap(), "");
        assert_eq!(r.remaining(), 0);
    }

    #[test]
    fn test_info_request_round_trip() {
        let msg = InfoRequest::new(
            "Two-factor",
            "Enter your codes",
            vec![
                Prompt {
                    text: "Password: ".to_string(),
                    echo: false,
                },
                Prompt {
                    text: "Token: ".to_string(),
                    echo: true,
                },
            ],
        );
        let parsed = InfoRequest::from_bytes(&msg.to_bytes()).unwrap();
        assert_eq!(parsed.name(), "Two-factor");
        assert_eq!(parsed.instruction(), "Enter your codes");
        assert_eq!(parsed.prompts().len(), 2);
        assert!(!parsed.prompts()[0].echo);
        assert!(parsed.prompts()[1].echo);
    }

    #[test]
    fn test_info_request_zero_prompts() {
        let msg = InfoRequest::new("", "", Vec::new());
        let parsed = InfoRequest::from_bytes(&msg.to_bytes()).unwrap();
        assert!(parsed.prompts().is_empty());
    }

    #[test]
    fn test_info_request_truncated_prompt_list() {
        let mut bytes = InfoRequest::new("", "", Vec::new()).to_bytes();
        // Claim one prompt but carry none.
        let len = bytes.len();
        bytes[len - 1] = 1;
        assert!(InfoRequest::from_bytes(&bytes).is_err());
    }

    #[test]
    fn test_info_response_layout() {
        let reply = InfoResponse::new(vec!["hunter2".to_string(), "123456".to_string()]);
        let bytes = reply.to_bytes();

        let mut r = WireReader::new(&bytes);
        assert_eq!(r.read_u8().unwrap(), SSH_MSG_USERAUTH_INFO_RESPONSE);
        assert_eq!(r.read_u32().unwrap(), 2);
        assert_eq!(r.read_utf8().unwrap(), "hunter2");
        assert_eq!(r.read_utf8().unwrap(), "123456");
        assert_eq!(r.remaining(), 0);
    }

    #[test]
    fn test_info_response_empty() {
        let reply = InfoResponse::new(Vec::new());
        assert_eq!(reply.to_bytes(), [SSH_MSG_USERAUTH_INFO_RESPONSE, 0, 0, 0, 0]);
    }
}
