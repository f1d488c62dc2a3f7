#![allow(dead_code)]

use erp_core::{
    models::{
        AccountData, AccountGroup, AccountId, Amount, CompanyData, CompanyId, FiscalYear,
        FiscalYearInput, NewUser, Role, StockItemData, StockItemId, SystemAccount, UserId,
    },
    ports::{
        AccountRepository as _, CompanyRepository as _, FiscalYearRepository as _,
        StockItemRepository as _, UserRepository as _,
    },
};
use erp_sqlite::{Db, config::SqliteConfig};
use time::{Date, OffsetDateTime, macros::date};

pub async fn open() -> anyhow::Result<Db> {
    Ok(Db::open(&SqliteConfig::default()).await?)
}

pub fn now() -> OffsetDateTime {
    OffsetDateTime::now_utc()
}

pub async fn user(db: &Db, email: &str, role: Role) -> anyhow::Result<UserId> {
    let user_id = UserId::new_v4();
    db.create_user(
        user_id,
        NewUser {
            name: email.split('@').next().unwrap_or(email).to_owned(),
            email: email.to_owned(),
            password_hash: "hash".to_owned(),
            role,
            menu: role.default_menu(),
        },
        now(),
    )
    .await?
    .map_err(|failure| anyhow::anyhow!("{failure}"))?;
    Ok(user_id)
}

pub async fn company(db: &Db, owner: UserId, name: &str) -> anyhow::Result<CompanyId> {
    let company_id = CompanyId::new_v4();
    db.create_company(
        company_id,
        CompanyData {
            name: name.to_owned(),
            address: None,
            phone: None,
            email: None,
            vat_number: None,
            vat_rate_bps: 1300,
        },
        owner,
        SystemAccount::ALL
            .iter()
            .map(|system| (AccountId::new_v4(), *system))
            .collect(),
        now(),
    )
    .await?;
    Ok(company_id)
}

pub async fn fiscal_year(
    db: &Db,
    company_id: CompanyId,
    name: &str,
    start: Date,
    end: Date,
) -> anyhow::Result<FiscalYear> {
    let data = FiscalYearInput {
        name: name.to_owned(),
        start_date: start,
        end_date: end,
        prefixes: Default::default(),
    }
    .validate()?;
    db.create_fiscal_year(uuid::Uuid::new_v4().into(), company_id, data, now())
        .await?
        .map_err(|failure| anyhow::anyhow!("{failure}"))
}

pub async fn fy2024(db: &Db, company_id: CompanyId) -> anyhow::Result<FiscalYear> {
    fiscal_year(db, company_id, "2024", date!(2024 - 01 - 01), date!(2024 - 12 - 31)).await
}

pub async fn account(
    db: &Db,
    company_id: CompanyId,
    name: &str,
    group: AccountGroup,
    opening: i64,
) -> anyhow::Result<AccountId> {
    let account_id = AccountId::new_v4();
    db.create_account(
        account_id,
        company_id,
        AccountData {
            name: name.to_owned(),
            group,
            opening_balance: Amount(opening),
        },
        now(),
    )
    .await?
    .map_err(|failure| anyhow::anyhow!("{failure}"))?;
    Ok(account_id)
}

pub async fn item(
    db: &Db,
    company_id: CompanyId,
    name: &str,
    vat_applicable: bool,
) -> anyhow::Result<StockItemId> {
    let item_id = StockItemId::new_v4();
    db.create_stock_item(
        item_id,
        company_id,
        StockItemData {
            name: name.to_owned(),
            unit: "pcs".to_owned(),
            vat_applicable,
            opening_quantity: 0.0,
            opening_rate: Amount::ZERO,
        },
        now(),
    )
    .await?
    .map_err(|failure| anyhow::anyhow!("{failure}"))?;
    Ok(item_id)
}

pub async fn system_account(
    db: &Db,
    company_id: CompanyId,
    system: SystemAccount,
) -> anyhow::Result<AccountId> {
    db.list_accounts(company_id)
        .await?
        .into_iter()
        .find(|a| a.system == Some(system))
        .map(|a| a.id)
        .ok_or_else(|| anyhow::anyhow!("missing {system} account"))
}
