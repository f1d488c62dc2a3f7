use crate::{
    Db,
    types::{CompanyRow, UserRow, convert},
};
use erp_core::{
    models::{AccountId, Company, CompanyData, CompanyId, SystemAccount, User, UserId},
    ports::{CompanyFailure, CompanyRepository},
};
use time::OffsetDateTime;

impl CompanyRepository for Db {
    async fn create_company(
        &self,
        company_id: CompanyId,
        data: CompanyData,
        created_by: UserId,
        system_accounts: Vec<(AccountId, SystemAccount)>,
        as_of: OffsetDateTime,
    ) -> Result<Company, Self::Error> {
        let mut tx = self.writer.begin().await?;

        sqlx::query(
            r#"
            insert into
                company (id, name, address, phone, email, vat_number, vat_rate_bps, created_by, created_at, updated_at)
            values
                ($1, $2, $3, $4, $5, $6, $7, $8, $9, $9)
            "#,
        )
        .bind(company_id)
        .bind(&data.name)
        .bind(&data.address)
        .bind(&data.phone)
        .bind(&data.email)
        .bind(&data.vat_number)
        .bind(data.vat_rate_bps as i64)
        .bind(created_by)
        .bind(as_of)
        .execute(&mut *tx)
        .await?;

        sqlx::query("insert into company_member (company_id, user_id, created_at) values ($1, $2, $3)")
            .bind(company_id)
            .bind(created_by)
            .bind(as_of)
            .execute(&mut *tx)
            .await?;

        for (account_id, system) in system_accounts {
            let (name, group) = system.seed();
            sqlx::query(
                r#"
                insert into
                    account (id, company_id, name, account_group, opening_balance, system, created_at)
                values
                    ($1, $2, $3, $4, 0, $5, $6)
                "#,
            )
            .bind(account_id)
            .bind(company_id)
            .bind(name)
            .bind(group.as_str())
            .bind(system.as_str())
            .bind(as_of)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(Company {
            id: company_id,
            data,
            created_by,
            created_at: as_of,
            updated_at: as_of,
        })
    }

    async fn get_company(&self, company_id: CompanyId) -> Result<Option<Company>, Self::Error> {
        sqlx::query_as::<_, CompanyRow>("select * from company where id = $1")
            .bind(company_id)
            .fetch_optional(&self.reader)
            .await?
            .map(Company::try_from)
            .transpose()
    }

    async fn list_companies(&self, member: Option<UserId>) -> Result<Vec<Company>, Self::Error> {
        let rows = match member {
            Some(user_id) => {
                sqlx::query_as::<_, CompanyRow>(
                    r#"
                    select
                        company.*
                    from
                        company
                    join
                        company_member on company_member.company_id = company.id
                    where
                        company_member.user_id = $1
                    order by
                        company.name
                    "#,
                )
                .bind(user_id)
                .fetch_all(&self.reader)
                .await?
            }
            None => {
                sqlx::query_as::<_, CompanyRow>("select * from company order by name")
                    .fetch_all(&self.reader)
                    .await?
            }
        };
        convert(rows)
    }

    async fn update_company(
        &self,
        company_id: CompanyId,
        data: CompanyData,
        as_of: OffsetDateTime,
    ) -> Result<Result<Company, CompanyFailure>, Self::Error> {
        let row = sqlx::query_as::<_, CompanyRow>(
            r#"
            update
                company
            set
                name = $2,
                address = $3,
                phone = $4,
                email = $5,
                vat_number = $6,
                vat_rate_bps = $7,
                updated_at = $8
            where
                id = $1
            returning
                *
            "#,
        )
        .bind(company_id)
        .bind(&data.name)
        .bind(&data.address)
        .bind(&data.phone)
        .bind(&data.email)
        .bind(&data.vat_number)
        .bind(data.vat_rate_bps as i64)
        .bind(as_of)
        .fetch_optional(&self.writer)
        .await?;

        match row {
            Some(row) => Ok(Ok(row.try_into()?)),
            None => Ok(Err(CompanyFailure::DoesNotExist)),
        }
    }

    async fn delete_company(
        &self,
        company_id: CompanyId,
    ) -> Result<Result<(), CompanyFailure>, Self::Error> {
        let result = sqlx::query("delete from company where id = $1")
            .bind(company_id)
            .execute(&self.writer)
            .await?;

        if result.rows_affected() == 0 {
            Ok(Err(CompanyFailure::DoesNotExist))
        } else {
            Ok(Ok(()))
        }
    }

    async fn add_member(
        &self,
        company_id: CompanyId,
        user_id: UserId,
        as_of: OffsetDateTime,
    ) -> Result<Result<(), CompanyFailure>, Self::Error> {
        let mut tx = self.writer.begin().await?;

        let (company_exists, user_exists): (bool, bool) = sqlx::query_as(
            r#"
            select
                exists (select 1 from company where id = $1),
                exists (select 1 from app_user where id = $2)
            "#,
        )
        .bind(company_id)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        if !company_exists {
            return Ok(Err(CompanyFailure::DoesNotExist));
        }
        if !user_exists {
            return Ok(Err(CompanyFailure::UnknownUser));
        }

        sqlx::query(
            r#"
            insert into
                company_member (company_id, user_id, created_at)
            values
                ($1, $2, $3)
            on conflict
                do nothing
            "#,
        )
        .bind(company_id)
        .bind(user_id)
        .bind(as_of)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Ok(()))
    }

    async fn list_members(&self, company_id: CompanyId) -> Result<Vec<User>, Self::Error> {
        let rows = sqlx::query_as::<_, UserRow>(
            r#"
            select
                app_user.id, name, email, role, menu, active, app_user.created_at, updated_at
            from
                app_user
            join
                company_member on company_member.user_id = app_user.id
            where
                company_member.company_id = $1
            order by
                name
            "#,
        )
        .bind(company_id)
        .fetch_all(&self.reader)
        .await?;
        convert(rows)
    }

    async fn is_member(&self, company_id: CompanyId, user_id: UserId) -> Result<bool, Self::Error> {
        sqlx::query_scalar(
            r#"
            select exists (
                select 1 from company_member where company_id = $1 and user_id = $2
            )
            "#,
        )
        .bind(company_id)
        .bind(user_id)
        .fetch_one(&self.reader)
        .await
    }
}
