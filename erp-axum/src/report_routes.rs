//! REST API endpoints for the reports.
//!
//! Every report is computed on request from the company's ledger entries,
//! stock movements or vouchers, scoped to one fiscal year. The report date
//! (`as_of`) defaults to today, clamped into the fiscal year, and must lie
//! within it. A period (`from`, `to`) defaults to the start of the fiscal
//! year through `as_of`.

use crate::{
    ApiApplication,
    auth::{CompanyPath, CurrentUser, company_access, fiscal_year},
    response::{ApiError, ApiResult, Envelope, internal, ok},
};
use aide::axum::{ApiRouter, routing::get};
use axum::{
    Json,
    extract::{Path, Query, State},
};
use erp_core::{
    models::{
        AccountId, CompanyId, FiscalYear, MenuSection, ReportQuery, ValidationError,
        VoucherQuery,
    },
    ports::{
        AccountRepository as _, ReportRepository as _, StockItemRepository as _,
        VoucherRepository as _,
    },
    reports::{
        AccountLedger, AgeingReport, StockReport, TrialBalance, VatReport, account_ledger,
        ageing_report, stock_report, trial_balance, vat_report,
    },
};
use time::Date;

/// Path parameters for the account ledger.
#[derive(serde::Deserialize, schemars::JsonSchema)]
#[schemars(inline)]
struct LedgerPath {
    /// The unique identifier of the company
    company_id: CompanyId,
    /// The account whose ledger is reported
    account_id: AccountId,
}

/// Creates a router with the report endpoints.
pub fn router<T: ApiApplication>() -> ApiRouter<T> {
    ApiRouter::new()
        .api_route_with("/ageing", get(ageing::<T>), |route| {
            route.security_requirement("jwt").tag("reports")
        })
        .api_route_with("/vat", get(vat::<T>), |route| {
            route.security_requirement("jwt").tag("reports")
        })
        .api_route_with("/stock", get(stock::<T>), |route| {
            route.security_requirement("jwt").tag("reports")
        })
        .api_route_with("/trial-balance", get(trial::<T>), |route| {
            route.security_requirement("jwt").tag("reports")
        })
        .api_route_with("/ledger/{account_id}", get(ledger::<T>), |route| {
            route.security_requirement("jwt").tag("reports")
        })
}

/// The dates a report covers, resolved against its fiscal year.
struct Period {
    fiscal_year: FiscalYear,
    as_of: Date,
    from: Date,
    to: Date,
}

/// Check access and resolve the fiscal year and dates of a report request.
async fn period<T: ApiApplication>(
    app: &T,
    current: &CurrentUser,
    section: MenuSection,
    company_id: CompanyId,
    query: &ReportQuery,
) -> Result<Period, ApiError> {
    let user = current.require(section)?;
    company_access(app, user, company_id).await?;
    let fiscal_year = fiscal_year(app, company_id, query.fiscal_year_id).await?;

    let as_of = query
        .as_of
        .unwrap_or_else(|| fiscal_year.default_as_of(app.today()));
    if !fiscal_year.contains(as_of) {
        return Err(ValidationError::ReportDateOutsideFiscalYear.into());
    }
    let from = query.from.unwrap_or(fiscal_year.data.start_date);
    let to = query.to.unwrap_or(as_of);
    if from > to {
        return Err(ValidationError::InvalidDateRange.into());
    }

    Ok(Period {
        fiscal_year,
        as_of,
        from,
        to,
    })
}

/// Receivable (sundry debtors) or payable (sundry creditors) ageing.
///
/// Balances are split into 0-30, 31-60, 61-90, 91-120 and 120+ day buckets
/// by the age of each entry at `as_of`. Select the side with
/// `kind=receivable|payable` (default receivable).
async fn ageing<T: ApiApplication>(
    State(app): State<T>,
    current: CurrentUser,
    Path(CompanyPath { company_id }): Path<CompanyPath>,
    Query(query): Query<ReportQuery>,
) -> ApiResult<Json<Envelope<AgeingReport>>> {
    let period = period(&app, &current, MenuSection::AgeingReport, company_id, &query).await?;
    let db = app.database();

    let accounts = db
        .list_accounts(company_id)
        .await
        .map_err(internal("list accounts"))?;
    let entries = db
        .ledger_entries(company_id, period.as_of)
        .await
        .map_err(internal("load ledger entries"))?;

    Ok(ok(ageing_report(
        query.kind.unwrap_or_default(),
        &period.fiscal_year,
        period.as_of,
        &accounts,
        &entries,
    )))
}

/// VAT summary and register for a period.
///
/// Sales are reported net of credit notes and purchases net of debit notes;
/// the net payable is output VAT less input VAT.
async fn vat<T: ApiApplication>(
    State(app): State<T>,
    current: CurrentUser,
    Path(CompanyPath { company_id }): Path<CompanyPath>,
    Query(query): Query<ReportQuery>,
) -> ApiResult<Json<Envelope<VatReport>>> {
    let period = period(&app, &current, MenuSection::VatReport, company_id, &query).await?;
    let db = app.database();

    let accounts = db
        .list_accounts(company_id)
        .await
        .map_err(internal("list accounts"))?;
    let vouchers = db
        .query_vouchers(
            company_id,
            VoucherQuery {
                fiscal_year_id: Some(period.fiscal_year.id),
                voucher_type: None,
                from: Some(period.from),
                to: Some(period.to),
            },
            None,
        )
        .await
        .map_err(internal("list vouchers"))?;

    Ok(ok(vat_report(period.from, period.to, &vouchers, &accounts)))
}

/// Opening, inward, outward and closing quantities per item, valued at
/// weighted average purchase cost.
async fn stock<T: ApiApplication>(
    State(app): State<T>,
    current: CurrentUser,
    Path(CompanyPath { company_id }): Path<CompanyPath>,
    Query(query): Query<ReportQuery>,
) -> ApiResult<Json<Envelope<StockReport>>> {
    let period = period(&app, &current, MenuSection::StockReport, company_id, &query).await?;
    let db = app.database();

    let items = db
        .list_stock_items(company_id)
        .await
        .map_err(internal("list stock items"))?;
    let movements = db
        .stock_movements(company_id, period.to)
        .await
        .map_err(internal("load stock movements"))?;

    Ok(ok(stock_report(period.from, period.to, &items, &movements)))
}

/// Debit and credit totals per account at `as_of`, openings included.
async fn trial<T: ApiApplication>(
    State(app): State<T>,
    current: CurrentUser,
    Path(CompanyPath { company_id }): Path<CompanyPath>,
    Query(query): Query<ReportQuery>,
) -> ApiResult<Json<Envelope<TrialBalance>>> {
    let period = period(&app, &current, MenuSection::LedgerReport, company_id, &query).await?;
    let db = app.database();

    let accounts = db
        .list_accounts(company_id)
        .await
        .map_err(internal("list accounts"))?;
    let entries = db
        .ledger_entries(company_id, period.as_of)
        .await
        .map_err(internal("load ledger entries"))?;

    Ok(ok(trial_balance(period.as_of, &accounts, &entries)))
}

/// The entries of one account for a period, with a running balance.
async fn ledger<T: ApiApplication>(
    State(app): State<T>,
    current: CurrentUser,
    Path(LedgerPath {
        company_id,
        account_id,
    }): Path<LedgerPath>,
    Query(query): Query<ReportQuery>,
) -> ApiResult<Json<Envelope<AccountLedger>>> {
    let period = period(&app, &current, MenuSection::LedgerReport, company_id, &query).await?;
    let db = app.database();

    let account = db
        .get_account(company_id, account_id)
        .await
        .map_err(internal("get account"))?
        .ok_or_else(|| ApiError::not_found("account"))?;
    let entries = db
        .ledger_entries(company_id, period.to)
        .await
        .map_err(internal("load ledger entries"))?;

    Ok(ok(account_ledger(
        &account,
        period.from,
        period.to,
        &entries,
    )))
}
