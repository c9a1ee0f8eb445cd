//! Banner dispatch.
//!
//! Servers may send `SSH_MSG_USERAUTH_BANNER` at any point before
//! authentication completes, typically a legal notice the user must be
//! able to read. The driver absorbs these messages and forwards the text
//! to a registered [`BannerDisplay`]; with no display registered the text
//! is discarded. It is never written to standard output, so the library
//! stays silent by default.

/// Sink for server banner messages.
///
/// Called synchronously from the driver's read loop: the loop does not
/// advance until the call returns, which gives the user time to read the
/// banner before the next prompt appears. Implementations that pause for
/// acknowledgement should keep that in mind.
pub trait BannerDisplay: Send {
    /// Displays a banner to the user.
    ///
    /// `language` is the RFC 3066 language tag from the message, usually
    /// empty.
    fn display_banner(&mut self, message: &str, language: &str);
}

impl<F> BannerDisplay for F
where
    F: FnMut(&str, &str) + Send,
{
    fn display_banner(&mut self, message: &str, language: &str) {
        self(message, language)
    }
}
