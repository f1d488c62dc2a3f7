//! REST API endpoints for a company's fiscal years.

use crate::{
    ApiApplication,
    auth::{CompanyPath, CurrentUser, company_access, fiscal_year},
    response::{ApiError, ApiResult, Envelope, created, internal, ok},
};
use aide::axum::{
    ApiRouter,
    routing::{get, post},
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use erp_core::{
    models::{CompanyId, FiscalYear, FiscalYearId, FiscalYearInput, MenuSection},
    ports::FiscalYearRepository as _,
};
use tracing::{Level, event};

/// Path parameters for fiscal-year-specific endpoints.
#[derive(serde::Deserialize, schemars::JsonSchema)]
#[schemars(inline)]
struct Id {
    /// The unique identifier of the company
    company_id: CompanyId,
    /// The unique identifier of the fiscal year
    fiscal_year_id: FiscalYearId,
}

/// Creates a router with fiscal-year-related endpoints.
pub fn router<T: ApiApplication>() -> ApiRouter<T> {
    ApiRouter::new()
        .api_route_with(
            "/",
            get(list_fiscal_years::<T>).post(create_fiscal_year::<T>),
            |route| route.security_requirement("jwt").tag("fiscal-years"),
        )
        .api_route_with(
            "/current",
            get(current_fiscal_year::<T>),
            |route| route.security_requirement("jwt").tag("fiscal-years"),
        )
        .api_route_with(
            "/{fiscal_year_id}",
            get(read_fiscal_year::<T>)
                .put(update_fiscal_year::<T>)
                .delete(delete_fiscal_year::<T>),
            |route| route.security_requirement("jwt").tag("fiscal-years"),
        )
        .api_route_with(
            "/{fiscal_year_id}/current",
            post(set_current_fiscal_year::<T>),
            |route| route.security_requirement("jwt").tag("fiscal-years"),
        )
}

/// List the company's fiscal years, latest first.
async fn list_fiscal_years<T: ApiApplication>(
    State(app): State<T>,
    CurrentUser(user): CurrentUser,
    Path(CompanyPath { company_id }): Path<CompanyPath>,
) -> ApiResult<Json<Envelope<Vec<FiscalYear>>>> {
    company_access(&app, &user, company_id).await?;
    let fiscal_years = app
        .database()
        .list_fiscal_years(company_id)
        .await
        .map_err(internal("list fiscal years"))?;
    Ok(ok(fiscal_years))
}

/// Create a fiscal year.
///
/// Prefixes that are not given are generated from the name (`SV-2081/82-`
/// and so on). The company's first fiscal year becomes its current one.
///
/// # Returns
///
/// - `201 Created`: The new fiscal year
/// - `400 Bad Request`: Invalid dates or prefixes, a duplicate name, or an
///   overlap with another fiscal year
/// - `403 Forbidden`: Missing the `fiscal_years` menu, or no access to the company
/// - `500 Internal Server Error`: Database operation failed
async fn create_fiscal_year<T: ApiApplication>(
    State(app): State<T>,
    current: CurrentUser,
    Path(CompanyPath { company_id }): Path<CompanyPath>,
    Json(body): Json<FiscalYearInput>,
) -> ApiResult<(StatusCode, Json<Envelope<FiscalYear>>)> {
    let user = current.require(MenuSection::FiscalYears)?;
    company_access(&app, user, company_id).await?;
    let data = body.validate()?;

    let fiscal_year = app
        .database()
        .create_fiscal_year(app.generate_id(), company_id, data, app.now())
        .await
        .map_err(internal("create fiscal year"))??;

    event!(Level::INFO, %company_id, fiscal_year_id = %fiscal_year.id, name = fiscal_year.data.name, "created fiscal year");
    Ok(created(fiscal_year))
}

/// The company's current fiscal year.
async fn current_fiscal_year<T: ApiApplication>(
    State(app): State<T>,
    CurrentUser(user): CurrentUser,
    Path(CompanyPath { company_id }): Path<CompanyPath>,
) -> ApiResult<Json<Envelope<FiscalYear>>> {
    company_access(&app, &user, company_id).await?;
    app.database()
        .list_fiscal_years(company_id)
        .await
        .map_err(internal("list fiscal years"))?
        .into_iter()
        .find(|fy| fy.is_current)
        .map(ok)
        .ok_or_else(|| ApiError::not_found("current fiscal year"))
}

async fn read_fiscal_year<T: ApiApplication>(
    State(app): State<T>,
    CurrentUser(user): CurrentUser,
    Path(Id {
        company_id,
        fiscal_year_id,
    }): Path<Id>,
) -> ApiResult<Json<Envelope<FiscalYear>>> {
    company_access(&app, &user, company_id).await?;
    Ok(ok(fiscal_year(&app, company_id, fiscal_year_id).await?))
}

/// Change a fiscal year's name, dates or prefixes.
///
/// The new range may not overlap another fiscal year, nor leave any of the
/// fiscal year's vouchers outside it.
async fn update_fiscal_year<T: ApiApplication>(
    State(app): State<T>,
    current: CurrentUser,
    Path(Id {
        company_id,
        fiscal_year_id,
    }): Path<Id>,
    Json(body): Json<FiscalYearInput>,
) -> ApiResult<Json<Envelope<FiscalYear>>> {
    let user = current.require(MenuSection::FiscalYears)?;
    company_access(&app, user, company_id).await?;
    let data = body.validate()?;

    let fiscal_year = app
        .database()
        .update_fiscal_year(company_id, fiscal_year_id, data, app.now())
        .await
        .map_err(internal("update fiscal year"))??;
    Ok(ok(fiscal_year))
}

/// Make this the company's current fiscal year.
async fn set_current_fiscal_year<T: ApiApplication>(
    State(app): State<T>,
    current: CurrentUser,
    Path(Id {
        company_id,
        fiscal_year_id,
    }): Path<Id>,
) -> ApiResult<Json<Envelope<FiscalYear>>> {
    let user = current.require(MenuSection::FiscalYears)?;
    company_access(&app, user, company_id).await?;

    let fiscal_year = app
        .database()
        .set_current_fiscal_year(company_id, fiscal_year_id, app.now())
        .await
        .map_err(internal("set current fiscal year"))??;
    Ok(ok(fiscal_year))
}

/// Delete a fiscal year that has no vouchers.
async fn delete_fiscal_year<T: ApiApplication>(
    State(app): State<T>,
    current: CurrentUser,
    Path(Id {
        company_id,
        fiscal_year_id,
    }): Path<Id>,
) -> ApiResult<Json<Envelope<()>>> {
    let user = current.require(MenuSection::FiscalYears)?;
    company_access(&app, user, company_id).await?;

    app.database()
        .delete_fiscal_year(company_id, fiscal_year_id, app.now())
        .await
        .map_err(internal("delete fiscal year"))??;
    Ok(ok(()))
}
