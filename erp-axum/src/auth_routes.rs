//! Registration, login and password-reset endpoints.
//!
//! These are the only routes reachable without a bearer token (apart from
//! `/me`, which reports who the token belongs to).

use crate::{
    ApiApplication,
    auth::CurrentUser,
    config::AxumConfig,
    response::{ApiError, ApiResult, Envelope, created, internal, ok},
};
use aide::axum::{
    ApiRouter,
    routing::{get, post},
};
use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
};
use erp_core::{
    models::{Registration, SignUp, User, check_password, normalize_email},
    ports::{Mail, Mailer as _, UserRepository as _},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{Level, event};

/// Creates a router with the authentication endpoints.
pub fn router<T: ApiApplication>() -> ApiRouter<T> {
    ApiRouter::new()
        .api_route_with("/register", post(register::<T>), |route| {
            route.tag("auth")
        })
        .api_route_with("/login", post(login::<T>), |route| route.tag("auth"))
        .api_route_with("/me", get(me), |route| {
            route.security_requirement("jwt").tag("auth")
        })
        .api_route_with("/forgot-password", post(forgot_password::<T>), |route| {
            route.tag("auth")
        })
        .api_route_with("/reset-password", post(reset_password::<T>), |route| {
            route.tag("auth")
        })
}

/// Credentials submitted to `/login`.
#[derive(Deserialize, JsonSchema)]
struct LoginRequest {
    email: String,
    password: String,
}

/// A bearer token and the user it was issued to.
#[derive(Serialize, JsonSchema)]
struct LoginResponse {
    token: String,
    user: User,
}

#[derive(Deserialize, JsonSchema)]
struct ForgotPasswordRequest {
    email: String,
}

#[derive(Deserialize, JsonSchema)]
struct ResetPasswordRequest {
    /// The token delivered by mail
    token: String,
    /// The new password
    password: String,
}

/// A plain confirmation.
#[derive(Serialize, JsonSchema)]
struct Message {
    message: String,
}

impl Message {
    fn new(message: &str) -> Json<Envelope<Self>> {
        ok(Self {
            message: message.to_owned(),
        })
    }
}

/// Register a new user.
///
/// The first user of the system becomes an administrator; everyone after
/// that starts as staff with the staff menu defaults.
///
/// # Returns
///
/// - `201 Created`: The new user
/// - `400 Bad Request`: Invalid input or the email is already registered
/// - `500 Internal Server Error`: Database operation failed
async fn register<T: ApiApplication>(
    State(app): State<T>,
    Json(body): Json<Registration>,
) -> ApiResult<(StatusCode, Json<Envelope<User>>)> {
    let (name, email) = body.validate()?;

    let password_hash = app
        .hash_password(&body.password)
        .map_err(internal("hash password"))?;

    let user = app
        .database()
        .register_user(
            app.generate_id(),
            SignUp {
                name,
                email,
                password_hash,
            },
            app.now(),
        )
        .await
        .map_err(internal("register user"))??;

    event!(Level::INFO, user_id = %user.id, role = %user.role, "registered user");
    Ok(created(user))
}

/// Exchange an email and password for a bearer token.
///
/// # Returns
///
/// - `200 OK`: The token and the user
/// - `401 Unauthorized`: Unknown email, wrong password or inactive account
/// - `500 Internal Server Error`: Database operation failed
async fn login<T: ApiApplication>(
    State(app): State<T>,
    Json(body): Json<LoginRequest>,
) -> ApiResult<Json<Envelope<LoginResponse>>> {
    let invalid = || ApiError::new(StatusCode::UNAUTHORIZED, "invalid credentials");

    let email = normalize_email(&body.email).map_err(|_| invalid())?;
    let (user, hash) = app
        .database()
        .get_credentials(&email)
        .await
        .map_err(internal("look up credentials"))?
        .ok_or_else(invalid)?;

    if !user.active || !app.verify_password(&body.password, &hash) {
        return Err(invalid());
    }

    let token = app.issue_token(&user).map_err(internal("issue token"))?;
    Ok(ok(LoginResponse { token, user }))
}

/// The user the bearer token belongs to.
async fn me(CurrentUser(user): CurrentUser) -> ApiResult<Json<Envelope<User>>> {
    Ok(ok(user))
}

/// Request a password-reset token by mail.
///
/// Always succeeds, so the response does not reveal whether the email is
/// registered. Only a digest of the token is stored.
async fn forgot_password<T: ApiApplication>(
    State(app): State<T>,
    Extension(config): Extension<Arc<AxumConfig>>,
    Json(body): Json<ForgotPasswordRequest>,
) -> ApiResult<Json<Envelope<Message>>> {
    let response = Message::new("if the email is registered, a reset token has been sent");

    let Ok(email) = normalize_email(&body.email) else {
        return Ok(response);
    };
    let db = app.database();
    let Some((user, _)) = db
        .get_credentials(&email)
        .await
        .map_err(internal("look up user"))?
    else {
        return Ok(response);
    };
    if !user.active {
        return Ok(response);
    }

    let (token, digest) = app.generate_reset_token();
    let as_of = app.now();
    db.create_reset_token(user.id, digest, as_of + config.reset_token_ttl, as_of)
        .await
        .map_err(internal("create reset token"))?;

    let mail = Mail {
        to: user.email,
        subject: "Password reset".to_owned(),
        body: format!(
            "Hello {},\n\nUse the token below to reset your password. It expires in {} minutes.\n\n{}\n",
            user.name,
            config.reset_token_ttl.as_secs() / 60,
            token,
        ),
    };
    if let Err(err) = app.mailer().send(mail).await {
        event!(Level::ERROR, err = err.to_string(), "failed to send reset mail");
    }

    Ok(response)
}

/// Set a new password using a reset token.
///
/// # Returns
///
/// - `200 OK`: The password was changed
/// - `400 Bad Request`: Weak password, or an unknown, used or expired token
/// - `500 Internal Server Error`: Database operation failed
async fn reset_password<T: ApiApplication>(
    State(app): State<T>,
    Json(body): Json<ResetPasswordRequest>,
) -> ApiResult<Json<Envelope<Message>>> {
    check_password(&body.password)?;
    let password_hash = app
        .hash_password(&body.password)
        .map_err(internal("hash password"))?;
    let digest = app.digest_reset_token(body.token.trim());

    let user_id = app
        .database()
        .reset_password(digest, password_hash, app.now())
        .await
        .map_err(internal("reset password"))?
        .ok_or_else(|| ApiError::bad_request("invalid or expired reset token"))?;

    event!(Level::INFO, %user_id, "password reset");
    Ok(Message::new("password has been reset"))
}
