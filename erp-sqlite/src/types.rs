//! Row types for mapping query results onto the domain models.
//!
//! Enumerations are stored by their wire name, money as integer minor units
//! and structured values as JSON text.

use erp_core::models::{
    Account, AccountData, AccountId, Amount, Company, CompanyData, CompanyId, FiscalYear,
    FiscalYearData, FiscalYearId, LedgerEntry, MenuPermissions, StockItem, StockItemData,
    StockItemId, StockMovement, User, UserId, Voucher, VoucherId, VoucherLine, VoucherPrefixes,
    VoucherTotals,
};
use sqlx::types::Json;
use time::{Date, OffsetDateTime};

fn decode_error(err: impl std::error::Error + Send + Sync + 'static) -> sqlx::Error {
    sqlx::Error::Decode(Box::new(err))
}

#[derive(sqlx::FromRow)]
pub(crate) struct UserRow {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: String,
    pub menu: Json<MenuPermissions>,
    pub active: bool,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl TryFrom<UserRow> for User {
    type Error = sqlx::Error;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(User {
            id: row.id,
            name: row.name,
            email: row.email,
            role: row.role.parse().map_err(decode_error)?,
            menu: row.menu.0,
            active: row.active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct CredentialsRow {
    #[sqlx(flatten)]
    pub user: UserRow,
    pub password_hash: String,
}

#[derive(sqlx::FromRow)]
pub(crate) struct ResetTokenRow {
    pub user_id: UserId,
    pub expires_at: OffsetDateTime,
    pub used_at: Option<OffsetDateTime>,
}

#[derive(sqlx::FromRow)]
pub(crate) struct CompanyRow {
    pub id: CompanyId,
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub vat_number: Option<String>,
    pub vat_rate_bps: i64,
    pub created_by: UserId,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl TryFrom<CompanyRow> for Company {
    type Error = sqlx::Error;

    fn try_from(row: CompanyRow) -> Result<Self, Self::Error> {
        Ok(Company {
            id: row.id,
            data: CompanyData {
                name: row.name,
                address: row.address,
                phone: row.phone,
                email: row.email,
                vat_number: row.vat_number,
                vat_rate_bps: u32::try_from(row.vat_rate_bps).map_err(decode_error)?,
            },
            created_by: row.created_by,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct FiscalYearRow {
    pub id: FiscalYearId,
    pub company_id: CompanyId,
    pub name: String,
    pub start_date: Date,
    pub end_date: Date,
    pub prefixes: Json<VoucherPrefixes>,
    pub is_current: bool,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl From<FiscalYearRow> for FiscalYear {
    fn from(row: FiscalYearRow) -> Self {
        FiscalYear {
            id: row.id,
            company_id: row.company_id,
            data: FiscalYearData {
                name: row.name,
                start_date: row.start_date,
                end_date: row.end_date,
                prefixes: row.prefixes.0,
            },
            is_current: row.is_current,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct AccountRow {
    pub id: AccountId,
    pub company_id: CompanyId,
    pub name: String,
    pub account_group: String,
    pub opening_balance: i64,
    pub system: Option<String>,
    pub created_at: OffsetDateTime,
}

impl TryFrom<AccountRow> for Account {
    type Error = sqlx::Error;

    fn try_from(row: AccountRow) -> Result<Self, Self::Error> {
        Ok(Account {
            id: row.id,
            company_id: row.company_id,
            data: AccountData {
                name: row.name,
                group: row.account_group.parse().map_err(decode_error)?,
                opening_balance: Amount(row.opening_balance),
            },
            system: row
                .system
                .map(|s| s.parse())
                .transpose()
                .map_err(decode_error)?,
            created_at: row.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct StockItemRow {
    pub id: StockItemId,
    pub company_id: CompanyId,
    pub name: String,
    pub unit: String,
    pub vat_applicable: bool,
    pub opening_quantity: f64,
    pub opening_rate: i64,
    pub created_at: OffsetDateTime,
}

impl From<StockItemRow> for StockItem {
    fn from(row: StockItemRow) -> Self {
        StockItem {
            id: row.id,
            company_id: row.company_id,
            data: StockItemData {
                name: row.name,
                unit: row.unit,
                vat_applicable: row.vat_applicable,
                opening_quantity: row.opening_quantity,
                opening_rate: Amount(row.opening_rate),
            },
            created_at: row.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct VoucherRow {
    pub id: VoucherId,
    pub company_id: CompanyId,
    pub fiscal_year_id: FiscalYearId,
    pub voucher_type: String,
    pub number: String,
    pub date: Date,
    pub party_account_id: AccountId,
    pub cash_account_id: Option<AccountId>,
    pub lines: Json<Vec<VoucherLine>>,
    pub taxable: i64,
    pub non_vat: i64,
    pub vat: i64,
    pub total: i64,
    pub narration: Option<String>,
    pub created_by: UserId,
    pub created_at: OffsetDateTime,
}

impl TryFrom<VoucherRow> for Voucher {
    type Error = sqlx::Error;

    fn try_from(row: VoucherRow) -> Result<Self, Self::Error> {
        Ok(Voucher {
            id: row.id,
            company_id: row.company_id,
            fiscal_year_id: row.fiscal_year_id,
            voucher_type: row.voucher_type.parse().map_err(decode_error)?,
            number: row.number,
            date: row.date,
            party_account_id: row.party_account_id,
            cash_account_id: row.cash_account_id,
            lines: row.lines.0,
            totals: VoucherTotals {
                taxable: Amount(row.taxable),
                non_vat: Amount(row.non_vat),
                vat: Amount(row.vat),
                total: Amount(row.total),
            },
            narration: row.narration,
            created_by: row.created_by,
            created_at: row.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct LedgerRow {
    pub voucher_id: VoucherId,
    pub voucher_type: String,
    pub voucher_number: String,
    pub account_id: AccountId,
    pub date: Date,
    pub debit: i64,
    pub credit: i64,
}

impl TryFrom<LedgerRow> for LedgerEntry {
    type Error = sqlx::Error;

    fn try_from(row: LedgerRow) -> Result<Self, Self::Error> {
        Ok(LedgerEntry {
            voucher_id: row.voucher_id,
            voucher_type: row.voucher_type.parse().map_err(decode_error)?,
            voucher_number: row.voucher_number,
            account_id: row.account_id,
            date: row.date,
            debit: Amount(row.debit),
            credit: Amount(row.credit),
        })
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct MovementRow {
    pub voucher_id: VoucherId,
    pub voucher_type: String,
    pub item_id: StockItemId,
    pub date: Date,
    pub inward: f64,
    pub outward: f64,
    pub rate: i64,
}

impl TryFrom<MovementRow> for StockMovement {
    type Error = sqlx::Error;

    fn try_from(row: MovementRow) -> Result<Self, Self::Error> {
        Ok(StockMovement {
            voucher_id: row.voucher_id,
            voucher_type: row.voucher_type.parse().map_err(decode_error)?,
            item_id: row.item_id,
            date: row.date,
            inward: row.inward,
            outward: row.outward,
            rate: Amount(row.rate),
        })
    }
}

/// Convert every row, failing on the first undecodable one.
pub(crate) fn convert<R, T>(rows: Vec<R>) -> Result<Vec<T>, sqlx::Error>
where
    T: TryFrom<R, Error = sqlx::Error>,
{
    rows.into_iter().map(T::try_from).collect()
}
