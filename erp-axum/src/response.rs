//! The `{success, data | error}` envelopes every endpoint responds with.

use aide::OperationOutput;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use erp_core::{
    models::ValidationError,
    ports::{
        AccountFailure, CompanyFailure, FiscalYearFailure, StockItemFailure, UserFailure,
        VoucherFailure,
    },
};
use schemars::JsonSchema;
use serde::Serialize;
use std::fmt::Display;
use tracing::{Level, event};

/// A successful response.
#[derive(Debug, Serialize, JsonSchema)]
pub struct Envelope<T> {
    /// Always `true`
    pub success: bool,
    /// The payload
    pub data: T,
}

/// The body of a failed response.
#[derive(Debug, Serialize, JsonSchema)]
pub struct ErrorBody {
    /// Always `false`
    pub success: bool,
    /// A human-readable description of the failure
    pub error: String,
}

/// Wrap `data` in a `200 OK` envelope.
pub(crate) fn ok<T>(data: T) -> Json<Envelope<T>> {
    Json(Envelope {
        success: true,
        data,
    })
}

/// Wrap `data` in a `201 Created` envelope.
pub(crate) fn created<T>(data: T) -> (StatusCode, Json<Envelope<T>>) {
    (StatusCode::CREATED, ok(data))
}

/// The result type of every handler.
pub(crate) type ApiResult<T> = Result<T, ApiError>;

/// An error response: a status code and the message placed in the envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    /// An error with an arbitrary status.
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub(crate) fn bad_request(message: impl Display) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message.to_string())
    }

    pub(crate) fn unauthorized() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "not authenticated")
    }

    pub(crate) fn forbidden() -> Self {
        Self::new(StatusCode::FORBIDDEN, "not authorized")
    }

    pub(crate) fn not_found(what: &str) -> Self {
        Self::new(StatusCode::NOT_FOUND, format!("{what} not found"))
    }

    /// The HTTP status of the response
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// The message of the response
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Log a storage failure and convert it to a `500` whose message names what
/// was being attempted, e.g. `.map_err(internal("list users"))`.
pub(crate) fn internal<E: Display>(action: &'static str) -> impl FnOnce(E) -> ApiError {
    move |err| {
        event!(Level::ERROR, err = err.to_string(), action);
        ApiError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("failed to {action}"),
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorBody {
                success: false,
                error: self.message,
            }),
        )
            .into_response()
    }
}

impl OperationOutput for ApiError {
    type Inner = ErrorBody;
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self::bad_request(err)
    }
}

impl From<UserFailure> for ApiError {
    fn from(err: UserFailure) -> Self {
        match err {
            UserFailure::DoesNotExist => Self::not_found("user"),
            UserFailure::EmailTaken => Self::bad_request(err),
        }
    }
}

impl From<CompanyFailure> for ApiError {
    fn from(err: CompanyFailure) -> Self {
        match err {
            CompanyFailure::DoesNotExist => Self::not_found("company"),
            CompanyFailure::UnknownUser => Self::bad_request(err),
        }
    }
}

impl From<FiscalYearFailure> for ApiError {
    fn from(err: FiscalYearFailure) -> Self {
        match err {
            FiscalYearFailure::DoesNotExist => Self::not_found("fiscal year"),
            _ => Self::bad_request(err),
        }
    }
}

impl From<AccountFailure> for ApiError {
    fn from(err: AccountFailure) -> Self {
        match err {
            AccountFailure::DoesNotExist => Self::not_found("account"),
            _ => Self::bad_request(err),
        }
    }
}

impl From<StockItemFailure> for ApiError {
    fn from(err: StockItemFailure) -> Self {
        match err {
            StockItemFailure::DoesNotExist => Self::not_found("stock item"),
            _ => Self::bad_request(err),
        }
    }
}

impl From<VoucherFailure> for ApiError {
    fn from(err: VoucherFailure) -> Self {
        Self::bad_request(err)
    }
}
