use super::is_unique_violation;
use crate::{Db, types::FiscalYearRow};
use erp_core::{
    models::{CompanyId, FiscalYear, FiscalYearData, FiscalYearId},
    ports::{FiscalYearFailure, FiscalYearRepository},
};
use sqlx::{SqliteConnection, types::Json};
use time::OffsetDateTime;

async fn fetch(
    conn: &mut SqliteConnection,
    company_id: CompanyId,
    fiscal_year_id: FiscalYearId,
) -> Result<Option<FiscalYear>, sqlx::Error> {
    Ok(sqlx::query_as::<_, FiscalYearRow>(
        "select * from fiscal_year where id = $1 and company_id = $2",
    )
    .bind(fiscal_year_id)
    .bind(company_id)
    .fetch_optional(conn)
    .await?
    .map(Into::into))
}

/// Whether `data` intersects another fiscal year of the company.
async fn overlaps(
    conn: &mut SqliteConnection,
    company_id: CompanyId,
    except: Option<FiscalYearId>,
    data: &FiscalYearData,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar(
        r#"
        select exists (
            select
                1
            from
                fiscal_year
            where
                company_id = $1
            and
                ($2 is null or id != $2)
            and
                start_date <= $4
            and
                end_date >= $3
        )
        "#,
    )
    .bind(company_id)
    .bind(except)
    .bind(data.start_date)
    .bind(data.end_date)
    .fetch_one(conn)
    .await
}

impl FiscalYearRepository for Db {
    async fn create_fiscal_year(
        &self,
        fiscal_year_id: FiscalYearId,
        company_id: CompanyId,
        data: FiscalYearData,
        as_of: OffsetDateTime,
    ) -> Result<Result<FiscalYear, FiscalYearFailure>, Self::Error> {
        let mut tx = self.writer.begin().await?;

        if overlaps(&mut tx, company_id, None, &data).await? {
            return Ok(Err(FiscalYearFailure::Overlaps));
        }

        let is_first: bool =
            sqlx::query_scalar("select not exists (select 1 from fiscal_year where company_id = $1)")
                .bind(company_id)
                .fetch_one(&mut *tx)
                .await?;

        let result = sqlx::query(
            r#"
            insert into
                fiscal_year (id, company_id, name, start_date, end_date, prefixes, is_current, created_at, updated_at)
            values
                ($1, $2, $3, $4, $5, $6, $7, $8, $8)
            "#,
        )
        .bind(fiscal_year_id)
        .bind(company_id)
        .bind(&data.name)
        .bind(data.start_date)
        .bind(data.end_date)
        .bind(Json(&data.prefixes))
        .bind(is_first)
        .bind(as_of)
        .execute(&mut *tx)
        .await;

        match result {
            Ok(_) => {}
            Err(err) if is_unique_violation(&err) => return Ok(Err(FiscalYearFailure::NameTaken)),
            Err(err) => return Err(err),
        }

        tx.commit().await?;

        Ok(Ok(FiscalYear {
            id: fiscal_year_id,
            company_id,
            data,
            is_current: is_first,
            created_at: as_of,
            updated_at: as_of,
        }))
    }

    async fn get_fiscal_year(
        &self,
        company_id: CompanyId,
        fiscal_year_id: FiscalYearId,
    ) -> Result<Option<FiscalYear>, Self::Error> {
        let mut conn = self.reader.acquire().await?;
        fetch(&mut conn, company_id, fiscal_year_id).await
    }

    async fn list_fiscal_years(&self, company_id: CompanyId) -> Result<Vec<FiscalYear>, Self::Error> {
        let rows = sqlx::query_as::<_, FiscalYearRow>(
            "select * from fiscal_year where company_id = $1 order by start_date desc",
        )
        .bind(company_id)
        .fetch_all(&self.reader)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn update_fiscal_year(
        &self,
        company_id: CompanyId,
        fiscal_year_id: FiscalYearId,
        data: FiscalYearData,
        as_of: OffsetDateTime,
    ) -> Result<Result<FiscalYear, FiscalYearFailure>, Self::Error> {
        let mut tx = self.writer.begin().await?;

        let Some(existing) = fetch(&mut tx, company_id, fiscal_year_id).await? else {
            return Ok(Err(FiscalYearFailure::DoesNotExist));
        };

        if overlaps(&mut tx, company_id, Some(fiscal_year_id), &data).await? {
            return Ok(Err(FiscalYearFailure::Overlaps));
        }

        let stranded: bool = sqlx::query_scalar(
            r#"
            select exists (
                select 1 from voucher where fiscal_year_id = $1 and (date < $2 or date > $3)
            )
            "#,
        )
        .bind(fiscal_year_id)
        .bind(data.start_date)
        .bind(data.end_date)
        .fetch_one(&mut *tx)
        .await?;
        if stranded {
            return Ok(Err(FiscalYearFailure::VouchersOutOfRange));
        }

        let result = sqlx::query(
            r#"
            update
                fiscal_year
            set
                name = $2,
                start_date = $3,
                end_date = $4,
                prefixes = $5,
                updated_at = $6
            where
                id = $1
            "#,
        )
        .bind(fiscal_year_id)
        .bind(&data.name)
        .bind(data.start_date)
        .bind(data.end_date)
        .bind(Json(&data.prefixes))
        .bind(as_of)
        .execute(&mut *tx)
        .await;

        match result {
            Ok(_) => {}
            Err(err) if is_unique_violation(&err) => return Ok(Err(FiscalYearFailure::NameTaken)),
            Err(err) => return Err(err),
        }

        tx.commit().await?;

        Ok(Ok(FiscalYear {
            data,
            updated_at: as_of,
            ..existing
        }))
    }

    async fn set_current_fiscal_year(
        &self,
        company_id: CompanyId,
        fiscal_year_id: FiscalYearId,
        as_of: OffsetDateTime,
    ) -> Result<Result<FiscalYear, FiscalYearFailure>, Self::Error> {
        let mut tx = self.writer.begin().await?;

        let Some(existing) = fetch(&mut tx, company_id, fiscal_year_id).await? else {
            return Ok(Err(FiscalYearFailure::DoesNotExist));
        };

        sqlx::query(
            r#"
            update
                fiscal_year
            set
                is_current = (id = $2),
                updated_at = $3
            where
                company_id = $1
            and
                is_current != (id = $2)
            "#,
        )
        .bind(company_id)
        .bind(fiscal_year_id)
        .bind(as_of)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        let updated_at = if existing.is_current {
            existing.updated_at
        } else {
            as_of
        };
        Ok(Ok(FiscalYear {
            is_current: true,
            updated_at,
            ..existing
        }))
    }

    async fn delete_fiscal_year(
        &self,
        company_id: CompanyId,
        fiscal_year_id: FiscalYearId,
        as_of: OffsetDateTime,
    ) -> Result<Result<(), FiscalYearFailure>, Self::Error> {
        let mut tx = self.writer.begin().await?;

        let Some(existing) = fetch(&mut tx, company_id, fiscal_year_id).await? else {
            return Ok(Err(FiscalYearFailure::DoesNotExist));
        };

        let in_use: bool =
            sqlx::query_scalar("select exists (select 1 from voucher where fiscal_year_id = $1)")
                .bind(fiscal_year_id)
                .fetch_one(&mut *tx)
                .await?;
        if in_use {
            return Ok(Err(FiscalYearFailure::InUse));
        }

        sqlx::query("delete from fiscal_year where id = $1")
            .bind(fiscal_year_id)
            .execute(&mut *tx)
            .await?;

        if existing.is_current {
            sqlx::query(
                r#"
                update
                    fiscal_year
                set
                    is_current = 1,
                    updated_at = $2
                where
                    id = (
                        select id from fiscal_year where company_id = $1 order by start_date desc limit 1
                    )
                "#,
            )
            .bind(company_id)
            .bind(as_of)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(Ok(()))
    }
}
