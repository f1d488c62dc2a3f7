use crate::{
    Db,
    types::{LedgerRow, MovementRow, convert},
};
use erp_core::{
    models::{CompanyId, LedgerEntry, StockMovement},
    ports::ReportRepository,
};
use time::Date;

impl ReportRepository for Db {
    async fn ledger_entries(
        &self,
        company_id: CompanyId,
        to: Date,
    ) -> Result<Vec<LedgerEntry>, Self::Error> {
        let rows = sqlx::query_as::<_, LedgerRow>(
            r#"
            select
                ledger_entry.voucher_id,
                voucher.voucher_type,
                voucher.number as voucher_number,
                ledger_entry.account_id,
                ledger_entry.date,
                ledger_entry.debit,
                ledger_entry.credit
            from
                ledger_entry
            join
                voucher on voucher.id = ledger_entry.voucher_id
            where
                ledger_entry.company_id = $1
            and
                ledger_entry.date <= $2
            order by
                ledger_entry.date, voucher.created_at, ledger_entry.id
            "#,
        )
        .bind(company_id)
        .bind(to)
        .fetch_all(&self.reader)
        .await?;
        convert(rows)
    }

    async fn stock_movements(
        &self,
        company_id: CompanyId,
        to: Date,
    ) -> Result<Vec<StockMovement>, Self::Error> {
        let rows = sqlx::query_as::<_, MovementRow>(
            r#"
            select
                stock_movement.voucher_id,
                voucher.voucher_type,
                stock_movement.item_id,
                stock_movement.date,
                stock_movement.inward,
                stock_movement.outward,
                stock_movement.rate
            from
                stock_movement
            join
                voucher on voucher.id = stock_movement.voucher_id
            where
                stock_movement.company_id = $1
            and
                stock_movement.date <= $2
            order by
                stock_movement.date, voucher.created_at, stock_movement.id
            "#,
        )
        .bind(company_id)
        .bind(to)
        .fetch_all(&self.reader)
        .await?;
        convert(rows)
    }
}
