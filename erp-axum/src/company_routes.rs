//! REST API endpoints for companies and their members.
//!
//! A company is the unit of tenancy. Everything else under
//! `/companies/{company_id}` is only reachable by administrators and members
//! of that company.

use crate::{
    ApiApplication,
    auth::{CurrentUser, company_access},
    response::{ApiResult, Envelope, created, internal, ok},
};
use aide::axum::{
    ApiRouter,
    routing::{get, get_with},
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use erp_core::{
    models::{
        AccountId, Company, CompanyData, CompanyId, MenuSection, SystemAccount, User, UserId,
    },
    ports::CompanyRepository as _,
};
use tracing::{Level, event};

/// Path parameter for company-specific endpoints.
#[derive(serde::Deserialize, schemars::JsonSchema)]
#[schemars(inline)]
struct Id {
    /// The unique identifier of the company
    company_id: CompanyId,
}

/// The user to add to a company.
#[derive(serde::Deserialize, schemars::JsonSchema)]
struct NewMember {
    user_id: UserId,
}

/// Creates a router with company-related endpoints.
pub fn router<T: ApiApplication>() -> ApiRouter<T> {
    ApiRouter::new()
        .api_route_with(
            "/",
            get_with(list_companies::<T>, |op| {
                op.description("Companies the caller may access")
            })
            .post(create_company::<T>),
            |route| route.security_requirement("jwt").tag("companies"),
        )
        .api_route_with(
            "/{company_id}",
            get(read_company::<T>)
                .put(update_company::<T>)
                .delete(delete_company::<T>),
            |route| route.security_requirement("jwt").tag("companies"),
        )
        .api_route_with(
            "/{company_id}/members",
            get(list_members::<T>).post(add_member::<T>),
            |route| route.security_requirement("jwt").tag("companies"),
        )
}

async fn list_companies<T: ApiApplication>(
    State(app): State<T>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<Envelope<Vec<Company>>>> {
    let member = (!user.is_admin()).then_some(user.id);
    let companies = app
        .database()
        .list_companies(member)
        .await
        .map_err(internal("list companies"))?;
    Ok(ok(companies))
}

/// Create a company.
///
/// The caller becomes its first member, and the Cash, Sales, Purchase and
/// VAT system accounts are created with it.
///
/// # Returns
///
/// - `201 Created`: The new company
/// - `400 Bad Request`: Blank name or VAT rate above 100%
/// - `403 Forbidden`: Missing the `companies` menu
/// - `500 Internal Server Error`: Database operation failed
async fn create_company<T: ApiApplication>(
    State(app): State<T>,
    current: CurrentUser,
    Json(body): Json<CompanyData>,
) -> ApiResult<(StatusCode, Json<Envelope<Company>>)> {
    let user = current.require(MenuSection::Companies)?;
    let data = body.validate()?;
    let system_accounts: Vec<(AccountId, SystemAccount)> = SystemAccount::ALL
        .iter()
        .map(|role| (app.generate_id(), *role))
        .collect();

    let company = app
        .database()
        .create_company(app.generate_id(), data, user.id, system_accounts, app.now())
        .await
        .map_err(internal("create company"))?;

    event!(Level::INFO, company_id = %company.id, by = %user.id, "created company");
    Ok(created(company))
}

async fn read_company<T: ApiApplication>(
    State(app): State<T>,
    CurrentUser(user): CurrentUser,
    Path(Id { company_id }): Path<Id>,
) -> ApiResult<Json<Envelope<Company>>> {
    Ok(ok(company_access(&app, &user, company_id).await?))
}

async fn update_company<T: ApiApplication>(
    State(app): State<T>,
    current: CurrentUser,
    Path(Id { company_id }): Path<Id>,
    Json(body): Json<CompanyData>,
) -> ApiResult<Json<Envelope<Company>>> {
    let user = current.require(MenuSection::Companies)?;
    company_access(&app, user, company_id).await?;
    let data = body.validate()?;

    let company = app
        .database()
        .update_company(company_id, data, app.now())
        .await
        .map_err(internal("update company"))??;
    Ok(ok(company))
}

/// Delete a company together with everything recorded in it.
async fn delete_company<T: ApiApplication>(
    State(app): State<T>,
    current: CurrentUser,
    Path(Id { company_id }): Path<Id>,
) -> ApiResult<Json<Envelope<()>>> {
    let user = current.require(MenuSection::Companies)?;
    company_access(&app, user, company_id).await?;

    app.database()
        .delete_company(company_id)
        .await
        .map_err(internal("delete company"))??;

    event!(Level::INFO, %company_id, by = %user.id, "deleted company");
    Ok(ok(()))
}

async fn list_members<T: ApiApplication>(
    State(app): State<T>,
    CurrentUser(user): CurrentUser,
    Path(Id { company_id }): Path<Id>,
) -> ApiResult<Json<Envelope<Vec<User>>>> {
    company_access(&app, &user, company_id).await?;
    let members = app
        .database()
        .list_members(company_id)
        .await
        .map_err(internal("list members"))?;
    Ok(ok(members))
}

/// Grant a user access to the company. Adding an existing member is a no-op.
///
/// # Returns
///
/// - `200 OK`: The members of the company
/// - `400 Bad Request`: The user does not exist
/// - `403 Forbidden`: Missing the `companies` menu, or no access to the company
/// - `404 Not Found`: Company does not exist
/// - `500 Internal Server Error`: Database operation failed
async fn add_member<T: ApiApplication>(
    State(app): State<T>,
    current: CurrentUser,
    Path(Id { company_id }): Path<Id>,
    Json(NewMember { user_id }): Json<NewMember>,
) -> ApiResult<Json<Envelope<Vec<User>>>> {
    let user = current.require(MenuSection::Companies)?;
    company_access(&app, user, company_id).await?;
    let db = app.database();

    db.add_member(company_id, user_id, app.now())
        .await
        .map_err(internal("add member"))??;

    let members = db
        .list_members(company_id)
        .await
        .map_err(internal("list members"))?;
    Ok(ok(members))
}
