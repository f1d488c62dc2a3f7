//! Application implementation with JWT-based authentication.
//!
//! `ErpApp` binds the SQLite backend to the HTTP layer: it hashes passwords
//! with argon2, issues and verifies HS256 bearer tokens, mints password-reset
//! tokens and delivers mail through the log.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use erp_core::{
    models::{Role, User, UserId},
    ports::{Application, Mail, Mailer},
};
use erp_sqlite::Db;
use headers::{Authorization, authorization::Bearer};
use jwt_simple::{
    claims::{Claims, JWTClaims},
    prelude::{Duration, HS256Key, MACLike},
};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::convert::Infallible;

/// Errors raised while hashing passwords or signing tokens.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// The password could not be hashed
    #[error("password hashing failed: {0}")]
    Hash(String),
    /// The token could not be signed
    #[error("token signing failed: {0}")]
    Token(String),
}

/// The server application.
#[derive(Clone)]
pub struct ErpApp {
    /// Database connection for persistent storage
    pub db: Db,
    /// HMAC key for signing and verifying bearer tokens
    pub key: HS256Key,
    /// Validity of an issued token
    pub token_lifetime: std::time::Duration,
    /// Outgoing mail transport
    pub mailer: LogMailer,
}

impl ErpApp {
    /// Extract and verify JWT claims from the authorization header.
    fn claims(&self, context: &Authorization<Bearer>) -> Option<JWTClaims<CustomJWTClaims>> {
        let token = context.0.token();
        self.key.verify_token::<CustomJWTClaims>(token, None).ok()
    }
}

impl Application for ErpApp {
    type Context = Authorization<Bearer>;
    type Repository = Db;
    type Mailer = LogMailer;
    type Error = AppError;

    fn database(&self) -> &Self::Repository {
        &self.db
    }

    fn mailer(&self) -> &Self::Mailer {
        &self.mailer
    }

    fn hash_password(&self, password: &str) -> Result<String, Self::Error> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|err| AppError::Hash(err.to_string()))
    }

    fn verify_password(&self, password: &str, hash: &str) -> bool {
        PasswordHash::new(hash)
            .map(|parsed| {
                Argon2::default()
                    .verify_password(password.as_bytes(), &parsed)
                    .is_ok()
            })
            .unwrap_or(false)
    }

    fn issue_token(&self, user: &User) -> Result<String, Self::Error> {
        let claims = Claims::with_custom_claims(
            CustomJWTClaims { role: user.role },
            Duration::from_secs(self.token_lifetime.as_secs()),
        )
        .with_subject(user.id);
        self.key
            .authenticate(claims)
            .map_err(|err| AppError::Token(err.to_string()))
    }

    fn authenticate(&self, context: &Self::Context) -> Option<UserId> {
        // The sub: claim is the user id; role and active status are always
        // re-read from the database by the caller.
        self.claims(context)?.subject?.parse().ok()
    }

    fn generate_reset_token(&self) -> (String, String) {
        let mut bytes = [0u8; 32];
        rand::rng().fill_bytes(&mut bytes);
        let token = hex::encode(bytes);
        let digest = self.digest_reset_token(&token);
        (token, digest)
    }

    fn digest_reset_token(&self, token: &str) -> String {
        hex::encode(Sha256::digest(token.as_bytes()))
    }
}

/// Custom claims structure for JWT tokens.
#[derive(Serialize, Deserialize)]
pub struct CustomJWTClaims {
    /// The role of the user at the time the token was issued.
    pub role: Role,
}

/// A mail transport that writes each message to the log.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogMailer;

impl Mailer for LogMailer {
    type Error = Infallible;

    async fn send(&self, mail: Mail) -> Result<(), Self::Error> {
        tracing::info!(to = %mail.to, subject = %mail.subject, body = %mail.body, "outgoing mail");
        Ok(())
    }
}
