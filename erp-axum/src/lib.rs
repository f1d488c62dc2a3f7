#![warn(missing_docs)]
// Note: this overwrites the link in the README to point to the rust docs of the erp-core crate.
//! [erp_core]: https://docs.rs/erp_core/latest/erp_core/index.html
#![doc = include_str!("../README.md")]

mod account_routes;
mod admin_routes;
mod auth_routes;
mod company_routes;
mod fiscal_year_routes;
mod report_routes;
mod stock_item_routes;
mod voucher_routes;

pub mod auth;
pub mod response;

use aide::{
    axum::{ApiRouter, routing::get},
    openapi::OpenApi,
};
use axum::{
    Extension, Json,
    http::{Method, header},
};
use erp_core::ports::Application;
use headers::{Authorization, authorization::Bearer};
use schemars::JsonSchema;
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors;

mod openapi;
use openapi::{api_docs, docs_routes};

pub mod config;
use config::AxumConfig;

/// Response for the health check endpoint
#[derive(Serialize, JsonSchema)]
#[schemars(inline)]
struct HealthResponse {
    status: String,
}

/// Simple health check endpoint
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// Construct a full API router with the given state and config, along with
/// the generated OpenAPI document.
pub fn router<T: ApiApplication>(state: T, config: AxumConfig) -> (axum::Router, OpenApi) {
    // The browser client is served from another origin and authenticates
    // with a bearer token, never with cookies.
    let policy = cors::CorsLayer::new()
        .allow_origin(cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    let mut api = OpenApi::default();
    let router = ApiRouter::new()
        .api_route("/health", get(health_check))
        .merge(auth_routes::router())
        .nest("/admin/users", admin_routes::router())
        .nest("/companies", company_routes::router())
        .nest(
            "/companies/{company_id}/fiscal-years",
            fiscal_year_routes::router(),
        )
        .nest("/companies/{company_id}/accounts", account_routes::router())
        .nest(
            "/companies/{company_id}/stock-items",
            stock_item_routes::router(),
        )
        .nest("/companies/{company_id}/vouchers", voucher_routes::router())
        .nest("/companies/{company_id}/reports", report_routes::router())
        .nest_api_service("/docs", docs_routes())
        .finish_api_with(&mut api, api_docs)
        .layer(Extension(Arc::new(api.clone()))) // Arc is very important here or you will face massive memory and performance issues
        .layer(Extension(Arc::new(config)))
        .layer(policy)
        .with_state(state);

    (router, api)
}

/// Starts the HTTP server with the provided configuration
pub async fn start_server<T: ApiApplication>(
    config: AxumConfig,
    app: T,
) -> Result<(), std::io::Error> {
    let listener = tokio::net::TcpListener::bind(config.bind_address).await?;

    tracing::info!("Listening for requests on {}", listener.local_addr()?);

    let (service, _) = router(app, config);
    axum::serve(listener, service).await
}

/// Axum imposes all sorts of constraints on what can pass for state. This
/// trait, coupled with a blanket implementation, specifies it all upfront and
/// in one place. If a function takes a generic `T: ApiApplication`, then
/// everything one might reasonably want to do should work.
pub trait ApiApplication:
    Clone
    + Send
    + Sync
    + 'static
    + Application<
        Context = Authorization<Bearer>,
        Repository: Send + Sync + 'static,
        Mailer: Send + Sync + 'static,
    >
{
}

// this is the blanket implementation
impl<T: Clone + Send + Sync + 'static> ApiApplication for T where
    T: Application<
            Context = Authorization<Bearer>,
            Repository: Send + Sync + 'static,
            Mailer: Send + Sync + 'static,
        >
{
}
