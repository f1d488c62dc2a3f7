use crate::models::{NewUser, SignUp, User, UserAccess, UserId};
use thiserror::Error;
use time::OffsetDateTime;

/// Failures specific to user management.
#[derive(Debug, Error)]
pub enum UserFailure {
    /// Another user already uses this email address
    #[error("email already registered")]
    EmailTaken,
    /// The user does not exist
    #[error("user not found")]
    DoesNotExist,
}

/// Repository interface for user accounts, credentials and password resets.
pub trait UserRepository: super::Repository {
    /// Store a self-registered user. The role is decided in the same atomic
    /// step as the insert: `admin` when no user exists yet, `staff` otherwise,
    /// each with the role's default menu. Emails are unique.
    fn register_user(
        &self,
        user_id: UserId,
        sign_up: SignUp,
        as_of: OffsetDateTime,
    ) -> impl Future<Output = Result<Result<User, UserFailure>, Self::Error>> + Send;

    /// Store a new user with an explicit role. Emails are unique.
    fn create_user(
        &self,
        user_id: UserId,
        user: NewUser,
        as_of: OffsetDateTime,
    ) -> impl Future<Output = Result<Result<User, UserFailure>, Self::Error>> + Send;

    /// Retrieve a user, if it exists.
    fn get_user(
        &self,
        user_id: UserId,
    ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send;

    /// Retrieve a user by (normalized) email together with its password hash.
    fn get_credentials(
        &self,
        email: &str,
    ) -> impl Future<Output = Result<Option<(User, String)>, Self::Error>> + Send;

    /// List every user, oldest first.
    fn list_users(&self) -> impl Future<Output = Result<Vec<User>, Self::Error>> + Send;

    /// Replace the role, menu permissions and active flag of a user.
    fn update_user_access(
        &self,
        user_id: UserId,
        access: UserAccess,
        as_of: OffsetDateTime,
    ) -> impl Future<Output = Result<Result<User, UserFailure>, Self::Error>> + Send;

    /// Remove a user. Company memberships go with it.
    fn delete_user(
        &self,
        user_id: UserId,
    ) -> impl Future<Output = Result<Result<(), UserFailure>, Self::Error>> + Send;

    /// Record the digest of a freshly issued password-reset token.
    fn create_reset_token(
        &self,
        user_id: UserId,
        digest: String,
        expires_at: OffsetDateTime,
        as_of: OffsetDateTime,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Atomically redeem a reset token: if `digest` matches an unused,
    /// unexpired token, set the password, consume every outstanding token of
    /// that user and return the user id.
    fn reset_password(
        &self,
        digest: String,
        password_hash: String,
        as_of: OffsetDateTime,
    ) -> impl Future<Output = Result<Option<UserId>, Self::Error>> + Send;
}
