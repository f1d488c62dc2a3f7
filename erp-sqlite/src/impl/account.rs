use super::is_unique_violation;
use crate::{
    Db,
    types::{AccountRow, convert},
};
use erp_core::{
    models::{Account, AccountData, AccountId, CompanyId},
    ports::{AccountFailure, AccountRepository},
};
use sqlx::SqliteConnection;
use time::OffsetDateTime;

async fn fetch(
    conn: &mut SqliteConnection,
    company_id: CompanyId,
    account_id: AccountId,
) -> Result<Option<Account>, sqlx::Error> {
    sqlx::query_as::<_, AccountRow>("select * from account where id = $1 and company_id = $2")
        .bind(account_id)
        .bind(company_id)
        .fetch_optional(conn)
        .await?
        .map(Account::try_from)
        .transpose()
}

impl AccountRepository for Db {
    async fn create_account(
        &self,
        account_id: AccountId,
        company_id: CompanyId,
        data: AccountData,
        as_of: OffsetDateTime,
    ) -> Result<Result<Account, AccountFailure>, Self::Error> {
        let result = sqlx::query(
            r#"
            insert into
                account (id, company_id, name, account_group, opening_balance, created_at)
            values
                ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(account_id)
        .bind(company_id)
        .bind(&data.name)
        .bind(data.group.as_str())
        .bind(data.opening_balance.0)
        .bind(as_of)
        .execute(&self.writer)
        .await;

        match result {
            Ok(_) => Ok(Ok(Account {
                id: account_id,
                company_id,
                data,
                system: None,
                created_at: as_of,
            })),
            Err(err) if is_unique_violation(&err) => Ok(Err(AccountFailure::NameTaken)),
            Err(err) => Err(err),
        }
    }

    async fn get_account(
        &self,
        company_id: CompanyId,
        account_id: AccountId,
    ) -> Result<Option<Account>, Self::Error> {
        let mut conn = self.reader.acquire().await?;
        fetch(&mut conn, company_id, account_id).await
    }

    async fn list_accounts(&self, company_id: CompanyId) -> Result<Vec<Account>, Self::Error> {
        let rows = sqlx::query_as::<_, AccountRow>(
            "select * from account where company_id = $1 order by name",
        )
        .bind(company_id)
        .fetch_all(&self.reader)
        .await?;
        convert(rows)
    }

    async fn update_account(
        &self,
        company_id: CompanyId,
        account_id: AccountId,
        data: AccountData,
    ) -> Result<Result<Account, AccountFailure>, Self::Error> {
        let mut tx = self.writer.begin().await?;

        let Some(existing) = fetch(&mut tx, company_id, account_id).await? else {
            return Ok(Err(AccountFailure::DoesNotExist));
        };
        if existing.system.is_some() && existing.data.group != data.group {
            return Ok(Err(AccountFailure::SystemAccount));
        }

        let result = sqlx::query(
            r#"
            update
                account
            set
                name = $2,
                account_group = $3,
                opening_balance = $4
            where
                id = $1
            "#,
        )
        .bind(account_id)
        .bind(&data.name)
        .bind(data.group.as_str())
        .bind(data.opening_balance.0)
        .execute(&mut *tx)
        .await;

        match result {
            Ok(_) => {}
            Err(err) if is_unique_violation(&err) => return Ok(Err(AccountFailure::NameTaken)),
            Err(err) => return Err(err),
        }

        tx.commit().await?;
        Ok(Ok(Account { data, ..existing }))
    }

    async fn delete_account(
        &self,
        company_id: CompanyId,
        account_id: AccountId,
    ) -> Result<Result<(), AccountFailure>, Self::Error> {
        let mut tx = self.writer.begin().await?;

        let Some(existing) = fetch(&mut tx, company_id, account_id).await? else {
            return Ok(Err(AccountFailure::DoesNotExist));
        };
        if existing.system.is_some() {
            return Ok(Err(AccountFailure::SystemAccount));
        }

        let in_use: bool = sqlx::query_scalar(
            r#"
            select
                exists (select 1 from ledger_entry where account_id = $1)
            or
                exists (select 1 from voucher where party_account_id = $1 or cash_account_id = $1)
            "#,
        )
        .bind(account_id)
        .fetch_one(&mut *tx)
        .await?;
        if in_use {
            return Ok(Err(AccountFailure::InUse));
        }

        sqlx::query("delete from account where id = $1")
            .bind(account_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Ok(()))
    }
}
