use crate::{
    models::{User, UserId},
    ports::{ErpRepository, Mailer},
};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

/// The application: the set of policy decisions that sit between the
/// transport and the repository.
///
/// An implementation chooses the storage backend and mail transport, and
/// decides how credentials are hashed and how bearer tokens are issued and
/// verified.
pub trait Application: Send + Sync {
    /// The request context authentication is decided from (e.g. a bearer token)
    type Context: Send + Sync;

    /// The storage backend
    type Repository: ErpRepository;

    /// The mail transport
    type Mailer: Mailer;

    /// The error raised while hashing passwords or issuing tokens
    type Error: std::error::Error + Send + Sync + 'static;

    /// Get the repository
    fn database(&self) -> &Self::Repository;

    /// Get the mail transport
    fn mailer(&self) -> &Self::Mailer;

    /// The current time
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }

    /// The current date, used as the default report date
    fn today(&self) -> Date {
        self.now().date()
    }

    /// Generate an identifier for a new record
    fn generate_id<T: From<Uuid>>(&self) -> T {
        Uuid::new_v4().into()
    }

    /// Hash a password for storage
    fn hash_password(&self, password: &str) -> Result<String, Self::Error>;

    /// Check a password against a stored hash
    fn verify_password(&self, password: &str, hash: &str) -> bool;

    /// Issue a bearer token for the user
    fn issue_token(&self, user: &User) -> Result<String, Self::Error>;

    /// Resolve the request context to the authenticated user, if any
    fn authenticate(&self, context: &Self::Context) -> Option<UserId>;

    /// Generate a password-reset token, returning the token to send to the
    /// user and the digest to store
    fn generate_reset_token(&self) -> (String, String);

    /// The stored digest of a reset token presented by a user
    fn digest_reset_token(&self, token: &str) -> String;
}
