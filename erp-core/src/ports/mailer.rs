/// An outgoing email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mail {
    /// Recipient address
    pub to: String,
    /// Subject line
    pub subject: String,
    /// Plain-text body
    pub body: String,
}

/// Delivers transactional mail (password resets).
pub trait Mailer: Send + Sync {
    /// The error type for delivery failures
    type Error: std::error::Error + Send + Sync + 'static;

    /// Send a message.
    fn send(&self, mail: Mail) -> impl Future<Output = Result<(), Self::Error>> + Send;
}
