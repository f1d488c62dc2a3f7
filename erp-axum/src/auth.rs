//! Request authentication and the permission checks shared by the routes.

use crate::{
    ApiApplication,
    response::{ApiError, internal},
};
use aide::OperationInput;
use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::TypedHeader;
use erp_core::{
    models::{Company, CompanyId, FiscalYear, FiscalYearId, MenuSection, User},
    ports::{CompanyRepository as _, FiscalYearRepository as _, UserRepository as _},
};
use headers::{Authorization, authorization::Bearer};

/// The authenticated, active user making the request.
///
/// Extraction fails with `401` when the bearer token is missing or invalid,
/// or when it names a user that no longer exists or has been deactivated.
pub struct CurrentUser(pub User);

impl<T: ApiApplication> FromRequestParts<T> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, app: &T) -> Result<Self, Self::Rejection> {
        let TypedHeader(auth) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, app)
                .await
                .map_err(|_| ApiError::unauthorized())?;
        let user_id = app.authenticate(&auth).ok_or_else(ApiError::unauthorized)?;
        let user = app
            .database()
            .get_user(user_id)
            .await
            .map_err(internal("load the current user"))?
            .ok_or_else(ApiError::unauthorized)?;

        if user.active {
            Ok(Self(user))
        } else {
            Err(ApiError::unauthorized())
        }
    }
}

impl OperationInput for CurrentUser {}

impl CurrentUser {
    /// Require access to a menu section (`403` otherwise).
    pub fn require(&self, section: MenuSection) -> Result<&User, ApiError> {
        if self.0.can(section) {
            Ok(&self.0)
        } else {
            Err(ApiError::forbidden())
        }
    }
}

/// Load a company the user may work in: administrators see every company,
/// everyone else only the companies they are a member of.
pub(crate) async fn company_access<T: ApiApplication>(
    app: &T,
    user: &User,
    company_id: CompanyId,
) -> Result<Company, ApiError> {
    let db = app.database();
    let company = db
        .get_company(company_id)
        .await
        .map_err(internal("get company"))?
        .ok_or_else(|| ApiError::not_found("company"))?;

    if user.is_admin()
        || db
            .is_member(company_id, user.id)
            .await
            .map_err(internal("check company membership"))?
    {
        Ok(company)
    } else {
        Err(ApiError::forbidden())
    }
}

/// Load a fiscal year of a company the caller already has access to.
pub(crate) async fn fiscal_year<T: ApiApplication>(
    app: &T,
    company_id: CompanyId,
    fiscal_year_id: FiscalYearId,
) -> Result<FiscalYear, ApiError> {
    app.database()
        .get_fiscal_year(company_id, fiscal_year_id)
        .await
        .map_err(internal("get fiscal year"))?
        .ok_or_else(|| ApiError::not_found("fiscal year"))
}

/// Path parameter of the routes nested under a company.
#[derive(serde::Deserialize, schemars::JsonSchema)]
#[schemars(inline)]
pub(crate) struct CompanyPath {
    /// The unique identifier of the company
    pub company_id: CompanyId,
}
