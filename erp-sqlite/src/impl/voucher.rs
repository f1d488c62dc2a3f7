use crate::{
    Db,
    types::{AccountRow, FiscalYearRow, StockItemRow, VoucherRow, convert},
};
use erp_core::{
    models::{
        Account, CompanyId, FiscalYear, PostingContext, StockItem, UserId, Voucher, VoucherId,
        VoucherInput, VoucherQuery,
    },
    ports::{VoucherFailure, VoucherRepository},
};
use sqlx::types::Json;
use time::OffsetDateTime;

const VOUCHER_COLUMNS: &str = "id, company_id, fiscal_year_id, voucher_type, number, date, \
    party_account_id, cash_account_id, lines, taxable, non_vat, vat, total, narration, \
    created_by, created_at";

impl VoucherRepository for Db {
    async fn create_voucher(
        &self,
        voucher_id: VoucherId,
        company_id: CompanyId,
        input: VoucherInput,
        created_by: UserId,
        as_of: OffsetDateTime,
    ) -> Result<Result<Voucher, VoucherFailure>, Self::Error> {
        let mut tx = self.writer.begin().await?;

        let Some(fiscal_year) = sqlx::query_as::<_, FiscalYearRow>(
            "select * from fiscal_year where id = $1 and company_id = $2",
        )
        .bind(input.fiscal_year_id)
        .bind(company_id)
        .fetch_optional(&mut *tx)
        .await?
        .map(FiscalYear::from) else {
            return Ok(Err(VoucherFailure::UnknownFiscalYear));
        };

        let vat_rate_bps: i64 = sqlx::query_scalar("select vat_rate_bps from company where id = $1")
            .bind(company_id)
            .fetch_one(&mut *tx)
            .await?;

        let accounts: Vec<Account> = convert(
            sqlx::query_as::<_, AccountRow>("select * from account where company_id = $1")
                .bind(company_id)
                .fetch_all(&mut *tx)
                .await?,
        )?;
        let items: Vec<StockItem> =
            sqlx::query_as::<_, StockItemRow>("select * from stock_item where company_id = $1")
                .bind(company_id)
                .fetch_all(&mut *tx)
                .await?
                .into_iter()
                .map(Into::into)
                .collect();

        let context = PostingContext {
            fiscal_year: &fiscal_year,
            vat_rate_bps: u32::try_from(vat_rate_bps)
                .map_err(|err| sqlx::Error::Decode(Box::new(err)))?,
            accounts: &accounts,
            items: &items,
        };
        let mut posting = match input.post(&context) {
            Ok(posting) => posting,
            Err(err) => return Ok(Err(err.into())),
        };

        let sequence: i64 = sqlx::query_scalar(
            r#"
            insert into
                voucher_sequence (fiscal_year_id, voucher_type, last_value)
            values
                ($1, $2, 1)
            on conflict (fiscal_year_id, voucher_type)
                do update set last_value = last_value + 1
            returning
                last_value
            "#,
        )
        .bind(fiscal_year.id)
        .bind(input.voucher_type.as_str())
        .fetch_one(&mut *tx)
        .await?;
        let number = fiscal_year
            .data
            .prefixes
            .number(input.voucher_type, sequence);

        let entries = std::mem::take(&mut posting.entries);
        let movements = std::mem::take(&mut posting.movements);
        let voucher = posting.into_voucher(voucher_id, company_id, input, number, created_by, as_of);

        sqlx::query(
            r#"
            insert into
                voucher (id, company_id, fiscal_year_id, voucher_type, number, date,
                         party_account_id, cash_account_id, lines, taxable, non_vat, vat, total,
                         narration, created_by, created_at)
            values
                ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            "#,
        )
        .bind(voucher.id)
        .bind(voucher.company_id)
        .bind(voucher.fiscal_year_id)
        .bind(voucher.voucher_type.as_str())
        .bind(&voucher.number)
        .bind(voucher.date)
        .bind(voucher.party_account_id)
        .bind(voucher.cash_account_id)
        .bind(Json(&voucher.lines))
        .bind(voucher.totals.taxable.0)
        .bind(voucher.totals.non_vat.0)
        .bind(voucher.totals.vat.0)
        .bind(voucher.totals.total.0)
        .bind(&voucher.narration)
        .bind(voucher.created_by)
        .bind(voucher.created_at)
        .execute(&mut *tx)
        .await?;

        if !entries.is_empty() {
            let mut query_builder = sqlx::QueryBuilder::new(
                "insert into ledger_entry (voucher_id, company_id, account_id, date, debit, credit) ",
            );
            query_builder.push_values(&entries, |mut b, entry| {
                b.push_bind(voucher.id)
                    .push_bind(company_id)
                    .push_bind(entry.account_id)
                    .push_bind(voucher.date)
                    .push_bind(entry.debit.0)
                    .push_bind(entry.credit.0);
            });
            query_builder.build().execute(&mut *tx).await?;
        }

        if !movements.is_empty() {
            let mut query_builder = sqlx::QueryBuilder::new(
                "insert into stock_movement (voucher_id, company_id, item_id, date, inward, outward, rate) ",
            );
            query_builder.push_values(&movements, |mut b, movement| {
                b.push_bind(voucher.id)
                    .push_bind(company_id)
                    .push_bind(movement.item_id)
                    .push_bind(voucher.date)
                    .push_bind(movement.inward)
                    .push_bind(movement.outward)
                    .push_bind(movement.rate.0);
            });
            query_builder.build().execute(&mut *tx).await?;
        }

        tx.commit().await?;

        tracing::debug!(
            voucher_id = %voucher.id,
            number = %voucher.number,
            total = %voucher.totals.total,
            "voucher posted"
        );

        Ok(Ok(voucher))
    }

    async fn get_voucher(
        &self,
        company_id: CompanyId,
        voucher_id: VoucherId,
    ) -> Result<Option<Voucher>, Self::Error> {
        let mut query_builder = sqlx::QueryBuilder::new("select ");
        query_builder
            .push(VOUCHER_COLUMNS)
            .push(" from voucher where id = ")
            .push_bind(voucher_id)
            .push(" and company_id = ")
            .push_bind(company_id);

        query_builder
            .build_query_as::<VoucherRow>()
            .fetch_optional(&self.reader)
            .await?
            .map(Voucher::try_from)
            .transpose()
    }

    async fn query_vouchers(
        &self,
        company_id: CompanyId,
        query: VoucherQuery,
        limit: Option<usize>,
    ) -> Result<Vec<Voucher>, Self::Error> {
        let mut query_builder = sqlx::QueryBuilder::new("select ");
        query_builder
            .push(VOUCHER_COLUMNS)
            .push(" from voucher where company_id = ")
            .push_bind(company_id);

        if let Some(fiscal_year_id) = query.fiscal_year_id {
            query_builder
                .push(" and fiscal_year_id = ")
                .push_bind(fiscal_year_id);
        }
        if let Some(voucher_type) = query.voucher_type {
            query_builder
                .push(" and voucher_type = ")
                .push_bind(voucher_type.as_str());
        }
        if let Some(from) = query.from {
            query_builder.push(" and date >= ").push_bind(from);
        }
        if let Some(to) = query.to {
            query_builder.push(" and date <= ").push_bind(to);
        }

        query_builder.push(" order by date, created_at, number");
        if let Some(limit) = limit {
            query_builder.push(" limit ").push_bind(limit as i64);
        }

        let rows = query_builder
            .build_query_as::<VoucherRow>()
            .fetch_all(&self.reader)
            .await?;
        convert(rows)
    }

    async fn delete_voucher(
        &self,
        company_id: CompanyId,
        voucher_id: VoucherId,
    ) -> Result<bool, Self::Error> {
        let result = sqlx::query("delete from voucher where id = $1 and company_id = $2")
            .bind(voucher_id)
            .bind(company_id)
            .execute(&self.writer)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
