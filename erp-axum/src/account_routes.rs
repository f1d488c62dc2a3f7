//! REST API endpoints for the chart of accounts.

use crate::{
    ApiApplication,
    auth::{CompanyPath, CurrentUser, company_access},
    response::{ApiError, ApiResult, Envelope, created, internal, ok},
};
use aide::axum::{ApiRouter, routing::get};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use erp_core::{
    models::{Account, AccountData, AccountId, CompanyId, MenuSection},
    ports::AccountRepository as _,
};

/// Path parameters for account-specific endpoints.
#[derive(serde::Deserialize, schemars::JsonSchema)]
#[schemars(inline)]
struct Id {
    /// The unique identifier of the company
    company_id: CompanyId,
    /// The unique identifier of the account
    account_id: AccountId,
}

/// Creates a router with account-related endpoints.
pub fn router<T: ApiApplication>() -> ApiRouter<T> {
    ApiRouter::new()
        .api_route_with(
            "/",
            get(list_accounts::<T>).post(create_account::<T>),
            |route| route.security_requirement("jwt").tag("accounts"),
        )
        .api_route_with(
            "/{account_id}",
            get(read_account::<T>)
                .put(update_account::<T>)
                .delete(delete_account::<T>),
            |route| route.security_requirement("jwt").tag("accounts"),
        )
}

async fn list_accounts<T: ApiApplication>(
    State(app): State<T>,
    CurrentUser(user): CurrentUser,
    Path(CompanyPath { company_id }): Path<CompanyPath>,
) -> ApiResult<Json<Envelope<Vec<Account>>>> {
    company_access(&app, &user, company_id).await?;
    let accounts = app
        .database()
        .list_accounts(company_id)
        .await
        .map_err(internal("list accounts"))?;
    Ok(ok(accounts))
}

/// Create an account.
///
/// # Returns
///
/// - `201 Created`: The new account
/// - `400 Bad Request`: Blank or duplicate name
/// - `403 Forbidden`: Missing the `accounts` menu, or no access to the company
/// - `500 Internal Server Error`: Database operation failed
async fn create_account<T: ApiApplication>(
    State(app): State<T>,
    current: CurrentUser,
    Path(CompanyPath { company_id }): Path<CompanyPath>,
    Json(body): Json<AccountData>,
) -> ApiResult<(StatusCode, Json<Envelope<Account>>)> {
    let user = current.require(MenuSection::Accounts)?;
    company_access(&app, user, company_id).await?;
    let data = body.validate()?;

    let account = app
        .database()
        .create_account(app.generate_id(), company_id, data, app.now())
        .await
        .map_err(internal("create account"))??;
    Ok(created(account))
}

async fn read_account<T: ApiApplication>(
    State(app): State<T>,
    CurrentUser(user): CurrentUser,
    Path(Id {
        company_id,
        account_id,
    }): Path<Id>,
) -> ApiResult<Json<Envelope<Account>>> {
    company_access(&app, &user, company_id).await?;
    app.database()
        .get_account(company_id, account_id)
        .await
        .map_err(internal("get account"))?
        .map(ok)
        .ok_or_else(|| ApiError::not_found("account"))
}

/// Rename an account, change its group or its opening balance. System
/// accounts keep their group.
async fn update_account<T: ApiApplication>(
    State(app): State<T>,
    current: CurrentUser,
    Path(Id {
        company_id,
        account_id,
    }): Path<Id>,
    Json(body): Json<AccountData>,
) -> ApiResult<Json<Envelope<Account>>> {
    let user = current.require(MenuSection::Accounts)?;
    company_access(&app, user, company_id).await?;
    let data = body.validate()?;

    let account = app
        .database()
        .update_account(company_id, account_id, data)
        .await
        .map_err(internal("update account"))??;
    Ok(ok(account))
}

/// Delete an account that no voucher refers to. System accounts cannot be
/// deleted.
async fn delete_account<T: ApiApplication>(
    State(app): State<T>,
    current: CurrentUser,
    Path(Id {
        company_id,
        account_id,
    }): Path<Id>,
) -> ApiResult<Json<Envelope<()>>> {
    let user = current.require(MenuSection::Accounts)?;
    company_access(&app, user, company_id).await?;

    app.database()
        .delete_account(company_id, account_id)
        .await
        .map_err(internal("delete account"))??;
    Ok(ok(()))
}
