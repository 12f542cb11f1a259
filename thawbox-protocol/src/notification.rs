//! Completion notifications
//!
//! The notification service takes a GET request with three query
//! parameters: `author`, `secretkey` and `message`. All three are
//! percent-encoded by the request builder.

use crate::request::{EncodeError, Request};

/// Maximum notification message length in bytes
pub const MAX_MESSAGE_LEN: usize = 160;

/// One notification to send
#[derive(Debug, Clone, Copy)]
pub struct Notification<'a> {
    /// Author identifier shown with the message
    pub author: &'a str,
    /// Shared secret authorizing the author
    pub secret: &'a str,
    /// Free-text message
    pub message: &'a str,
}

/// Notification service location
#[derive(Debug, Clone, Copy)]
pub struct NotificationEndpoint<'a> {
    /// Server host name
    pub host: &'a str,
    /// Script path on the server
    pub path: &'a str,
}

impl<'a> NotificationEndpoint<'a> {
    /// Build the GET request for a notification
    pub fn request(&self, notification: &Notification<'a>) -> Result<Request<'a>, EncodeError> {
        Request::get(self.host, self.path)
            .query("author", notification.author)?
            .query("secretkey", notification.secret)?
            .query("message", notification.message)?
            .header("Connection", "close")
    }
}
