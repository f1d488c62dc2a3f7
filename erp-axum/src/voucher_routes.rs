//! REST API endpoints for vouchers.
//!
//! Each voucher type is gated by its own menu section, so a user may for
//! example record sales without being able to see purchases.

use crate::{
    ApiApplication,
    auth::{CompanyPath, CurrentUser, company_access},
    config::AxumConfig,
    response::{ApiError, ApiResult, Envelope, created, internal, ok},
};
use aide::axum::{ApiRouter, routing::get};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use erp_core::{
    models::{CompanyId, Voucher, VoucherId, VoucherInput, VoucherQuery},
    ports::VoucherRepository as _,
};
use std::sync::Arc;
use tracing::{Level, event};

/// Path parameters for voucher-specific endpoints.
#[derive(serde::Deserialize, schemars::JsonSchema)]
#[schemars(inline)]
struct Id {
    /// The unique identifier of the company
    company_id: CompanyId,
    /// The unique identifier of the voucher
    voucher_id: VoucherId,
}

/// Page size of a voucher listing.
#[derive(serde::Deserialize, schemars::JsonSchema)]
struct Page {
    /// At most this many vouchers (capped by the server's page limit)
    limit: Option<usize>,
}

/// Creates a router with voucher-related endpoints.
pub fn router<T: ApiApplication>() -> ApiRouter<T> {
    ApiRouter::new()
        .api_route_with(
            "/",
            get(list_vouchers::<T>).post(create_voucher::<T>),
            |route| route.security_requirement("jwt").tag("vouchers"),
        )
        .api_route_with(
            "/{voucher_id}",
            get(read_voucher::<T>).delete(delete_voucher::<T>),
            |route| route.security_requirement("jwt").tag("vouchers"),
        )
}

/// List vouchers in date order.
///
/// Filtering by type requires that type's menu section; without a type
/// filter, only the types the caller may see are returned.
async fn list_vouchers<T: ApiApplication>(
    State(app): State<T>,
    Extension(config): Extension<Arc<AxumConfig>>,
    CurrentUser(user): CurrentUser,
    Path(CompanyPath { company_id }): Path<CompanyPath>,
    Query(query): Query<VoucherQuery>,
    Query(page): Query<Page>,
) -> ApiResult<Json<Envelope<Vec<Voucher>>>> {
    company_access(&app, &user, company_id).await?;
    let limit = page
        .limit
        .unwrap_or(config.page_limit)
        .min(config.page_limit);
    let db = app.database();

    let vouchers = match query.voucher_type {
        Some(voucher_type) => {
            if !user.can(voucher_type.menu_section()) {
                return Err(ApiError::forbidden());
            }
            db.query_vouchers(company_id, query, Some(limit))
                .await
                .map_err(internal("list vouchers"))?
        }
        None => {
            let mut vouchers = db
                .query_vouchers(company_id, query, None)
                .await
                .map_err(internal("list vouchers"))?;
            vouchers.retain(|v| user.can(v.voucher_type.menu_section()));
            vouchers.truncate(limit);
            vouchers
        }
    };
    Ok(ok(vouchers))
}

/// Record and post a voucher.
///
/// The voucher is numbered within its fiscal year, priced, and posted to the
/// ledger and the stock register in one transaction.
///
/// # Returns
///
/// - `201 Created`: The posted voucher
/// - `400 Bad Request`: Unknown fiscal year, a date outside it, unknown
///   accounts or items, or lines/amounts that do not fit the voucher type
/// - `403 Forbidden`: Missing the voucher type's menu, or no access to the company
/// - `500 Internal Server Error`: Database operation failed
async fn create_voucher<T: ApiApplication>(
    State(app): State<T>,
    current: CurrentUser,
    Path(CompanyPath { company_id }): Path<CompanyPath>,
    Json(body): Json<VoucherInput>,
) -> ApiResult<(StatusCode, Json<Envelope<Voucher>>)> {
    let user = current.require(body.voucher_type.menu_section())?;
    company_access(&app, user, company_id).await?;

    let voucher = app
        .database()
        .create_voucher(app.generate_id(), company_id, body, user.id, app.now())
        .await
        .map_err(internal("create voucher"))??;

    event!(
        Level::INFO,
        %company_id,
        voucher_id = %voucher.id,
        number = voucher.number,
        total = voucher.totals.total.0,
        "posted voucher"
    );
    Ok(created(voucher))
}

async fn read_voucher<T: ApiApplication>(
    State(app): State<T>,
    current: CurrentUser,
    Path(Id {
        company_id,
        voucher_id,
    }): Path<Id>,
) -> ApiResult<Json<Envelope<Voucher>>> {
    company_access(&app, &current.0, company_id).await?;
    let voucher = app
        .database()
        .get_voucher(company_id, voucher_id)
        .await
        .map_err(internal("get voucher"))?
        .ok_or_else(|| ApiError::not_found("voucher"))?;

    current.require(voucher.voucher_type.menu_section())?;
    Ok(ok(voucher))
}

/// Delete a voucher along with its ledger entries and stock movements. Its
/// number is not reused.
async fn delete_voucher<T: ApiApplication>(
    State(app): State<T>,
    current: CurrentUser,
    Path(Id {
        company_id,
        voucher_id,
    }): Path<Id>,
) -> ApiResult<Json<Envelope<()>>> {
    company_access(&app, &current.0, company_id).await?;
    let db = app.database();
    let voucher = db
        .get_voucher(company_id, voucher_id)
        .await
        .map_err(internal("get voucher"))?
        .ok_or_else(|| ApiError::not_found("voucher"))?;
    let user = current.require(voucher.voucher_type.menu_section())?;

    if !db
        .delete_voucher(company_id, voucher_id)
        .await
        .map_err(internal("delete voucher"))?
    {
        return Err(ApiError::not_found("voucher"));
    }

    event!(Level::INFO, %company_id, %voucher_id, number = voucher.number, by = %user.id, "deleted voucher");
    Ok(ok(()))
}
