mod common;

use erp_core::{
    models::{
        AccountData, AccountGroup, Amount, CompanyData, FiscalYearInput, Role, SystemAccount,
    },
    ports::{
        AccountFailure, AccountRepository, CompanyFailure, CompanyRepository, FiscalYearFailure,
        FiscalYearRepository,
    },
};
use time::macros::date;

#[tokio::test]
async fn companies_are_seeded_and_scoped_to_members() -> anyhow::Result<()> {
    let db = common::open().await?;
    let owner = common::user(&db, "owner@example.com", Role::Manager).await?;
    let other = common::user(&db, "other@example.com", Role::Staff).await?;

    let company_id = common::company(&db, owner, "Himalayan Traders").await?;
    common::company(&db, other, "Someone Else").await?;

    let accounts = db.list_accounts(company_id).await?;
    assert_eq!(accounts.len(), SystemAccount::ALL.len());
    for system in SystemAccount::ALL {
        let (name, group) = system.seed();
        let account = accounts
            .iter()
            .find(|a| a.system == Some(*system))
            .expect("system account seeded");
        assert_eq!(account.data.name, name);
        assert_eq!(account.data.group, group);
    }

    assert!(db.is_member(company_id, owner).await?);
    assert!(!db.is_member(company_id, other).await?);
    assert_eq!(db.list_companies(Some(owner)).await?.len(), 1);
    assert_eq!(db.list_companies(None).await?.len(), 2);

    db.add_member(company_id, other, common::now())
        .await?
        .map_err(|f| anyhow::anyhow!("{f}"))?;
    // adding twice is a no-op
    db.add_member(company_id, other, common::now())
        .await?
        .map_err(|f| anyhow::anyhow!("{f}"))?;
    assert_eq!(db.list_members(company_id).await?.len(), 2);
    assert!(matches!(
        db.add_member(company_id, uuid::Uuid::new_v4().into(), common::now())
            .await?,
        Err(CompanyFailure::UnknownUser)
    ));

    let updated = db
        .update_company(
            company_id,
            CompanyData {
                name: "Himalayan Traders Pvt. Ltd.".into(),
                address: Some("Kathmandu".into()),
                phone: None,
                email: None,
                vat_number: Some("301234567".into()),
                vat_rate_bps: 1300,
            },
            common::now(),
        )
        .await?
        .map_err(|f| anyhow::anyhow!("{f}"))?;
    assert_eq!(db.get_company(company_id).await?, Some(updated));

    db.delete_company(company_id)
        .await?
        .map_err(|f| anyhow::anyhow!("{f}"))?;
    assert!(db.list_accounts(company_id).await?.is_empty());
    assert!(matches!(
        db.delete_company(company_id).await?,
        Err(CompanyFailure::DoesNotExist)
    ));
    Ok(())
}

#[tokio::test]
async fn fiscal_year_rules() -> anyhow::Result<()> {
    let db = common::open().await?;
    let owner = common::user(&db, "owner@example.com", Role::Admin).await?;
    let company_id = common::company(&db, owner, "Acme").await?;

    let first = common::fy2024(&db, company_id).await?;
    assert!(first.is_current);
    assert_eq!(first.data.prefixes.sales, "SV-2024-");

    let input = |name: &str, start, end| {
        FiscalYearInput {
            name: name.into(),
            start_date: start,
            end_date: end,
            prefixes: Default::default(),
        }
        .validate()
    };

    let duplicate = db
        .create_fiscal_year(
            uuid::Uuid::new_v4().into(),
            company_id,
            input("2024", date!(2026 - 01 - 01), date!(2026 - 12 - 31))?,
            common::now(),
        )
        .await?;
    assert!(matches!(duplicate, Err(FiscalYearFailure::NameTaken)));

    let overlapping = db
        .create_fiscal_year(
            uuid::Uuid::new_v4().into(),
            company_id,
            input("2024/25", date!(2024 - 07 - 01), date!(2025 - 06 - 30))?,
            common::now(),
        )
        .await?;
    assert!(matches!(overlapping, Err(FiscalYearFailure::Overlaps)));

    let second = common::fiscal_year(
        &db,
        company_id,
        "2025",
        date!(2025 - 01 - 01),
        date!(2025 - 12 - 31),
    )
    .await?;
    assert!(!second.is_current);

    let second = db
        .set_current_fiscal_year(company_id, second.id, common::now())
        .await?
        .map_err(|f| anyhow::anyhow!("{f}"))?;
    assert!(second.is_current);
    let current: Vec<_> = db
        .list_fiscal_years(company_id)
        .await?
        .into_iter()
        .filter(|fy| fy.is_current)
        .collect();
    assert_eq!(current.len(), 1);
    assert_eq!(current[0].id, second.id);

    // renaming into a taken name fails, other updates go through
    let renamed = db
        .update_fiscal_year(
            company_id,
            second.id,
            input("2024", date!(2025 - 01 - 01), date!(2025 - 12 - 31))?,
            common::now(),
        )
        .await?;
    assert!(matches!(renamed, Err(FiscalYearFailure::NameTaken)));
    let renamed = db
        .update_fiscal_year(
            company_id,
            second.id,
            input("FY 2025", date!(2025 - 01 - 01), date!(2025 - 12 - 31))?,
            common::now(),
        )
        .await?
        .map_err(|f| anyhow::anyhow!("{f}"))?;
    assert_eq!(renamed.data.prefixes.receipt, "RV-FY2025-");
    assert!(renamed.is_current);

    db.delete_fiscal_year(company_id, second.id, common::now())
        .await?
        .map_err(|f| anyhow::anyhow!("{f}"))?;
    let remaining = db.get_fiscal_year(company_id, first.id).await?;
    assert!(remaining.is_some_and(|fy| fy.is_current));
    Ok(())
}

#[tokio::test]
async fn account_constraints() -> anyhow::Result<()> {
    let db = common::open().await?;
    let owner = common::user(&db, "owner@example.com", Role::Admin).await?;
    let company_id = common::company(&db, owner, "Acme").await?;

    let customer =
        common::account(&db, company_id, "Customer", AccountGroup::SundryDebtor, 500).await?;
    let duplicate = db
        .create_account(
            uuid::Uuid::new_v4().into(),
            company_id,
            AccountData {
                name: "Customer".into(),
                group: AccountGroup::SundryCreditor,
                opening_balance: Amount::ZERO,
            },
            common::now(),
        )
        .await?;
    assert!(matches!(duplicate, Err(AccountFailure::NameTaken)));

    let cash = common::system_account(&db, company_id, SystemAccount::Cash).await?;
    assert!(matches!(
        db.delete_account(company_id, cash).await?,
        Err(AccountFailure::SystemAccount)
    ));
    let regroup = db
        .update_account(
            company_id,
            cash,
            AccountData {
                name: "Cash in hand".into(),
                group: AccountGroup::Bank,
                opening_balance: Amount::ZERO,
            },
        )
        .await?;
    assert!(matches!(regroup, Err(AccountFailure::SystemAccount)));
    let renamed = db
        .update_account(
            company_id,
            cash,
            AccountData {
                name: "Cash in hand".into(),
                group: AccountGroup::Cash,
                opening_balance: Amount(10_000),
            },
        )
        .await?
        .map_err(|f| anyhow::anyhow!("{f}"))?;
    assert_eq!(renamed.system, Some(SystemAccount::Cash));

    db.delete_account(company_id, customer)
        .await?
        .map_err(|f| anyhow::anyhow!("{f}"))?;
    assert_eq!(db.get_account(company_id, customer).await?, None);
    Ok(())
}
