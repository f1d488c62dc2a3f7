use erp_core::{
    models::{User, UserId},
    ports::{Application, Mail, Mailer},
};
use erp_sqlite::Db;
use headers::{Authorization, authorization::Bearer};
use std::{
    convert::Infallible,
    sync::{Arc, Mutex},
};
use uuid::Uuid;

// Credentials are kept in plain text and the bearer token is simply the
// user id, so tests can mint tokens without going through `/login`.
#[derive(Clone)]
pub struct TestApp {
    pub db: Db,
    pub outbox: Outbox,
}

impl Application for TestApp {
    type Context = Authorization<Bearer>;
    type Repository = Db;
    type Mailer = Outbox;
    type Error = Infallible;

    fn database(&self) -> &Self::Repository {
        &self.db
    }

    fn mailer(&self) -> &Self::Mailer {
        &self.outbox
    }

    fn hash_password(&self, password: &str) -> Result<String, Self::Error> {
        Ok(format!("plain:{password}"))
    }

    fn verify_password(&self, password: &str, hash: &str) -> bool {
        hash.strip_prefix("plain:") == Some(password)
    }

    fn issue_token(&self, user: &User) -> Result<String, Self::Error> {
        Ok(user.id.to_string())
    }

    fn authenticate(&self, context: &Self::Context) -> Option<UserId> {
        context.token().parse().ok()
    }

    fn generate_reset_token(&self) -> (String, String) {
        let token = format!("reset-{}", Uuid::new_v4().simple());
        let digest = self.digest_reset_token(&token);
        (token, digest)
    }

    fn digest_reset_token(&self, token: &str) -> String {
        format!("digest:{token}")
    }
}

/// A mailer that keeps every message in memory.
#[derive(Clone, Default)]
pub struct Outbox(Arc<Mutex<Vec<Mail>>>);

impl Outbox {
    pub fn sent(&self) -> Vec<Mail> {
        self.0.lock().unwrap().clone()
    }
}

impl Mailer for Outbox {
    type Error = Infallible;

    async fn send(&self, mail: Mail) -> Result<(), Self::Error> {
        self.0.lock().unwrap().push(mail);
        Ok(())
    }
}
