use super::is_unique_violation;
use crate::{Db, types::StockItemRow};
use erp_core::{
    models::{CompanyId, StockItem, StockItemData, StockItemId},
    ports::{StockItemFailure, StockItemRepository},
};
use time::OffsetDateTime;

impl StockItemRepository for Db {
    async fn create_stock_item(
        &self,
        item_id: StockItemId,
        company_id: CompanyId,
        data: StockItemData,
        as_of: OffsetDateTime,
    ) -> Result<Result<StockItem, StockItemFailure>, Self::Error> {
        let result = sqlx::query(
            r#"
            insert into
                stock_item (id, company_id, name, unit, vat_applicable, opening_quantity, opening_rate, created_at)
            values
                ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(item_id)
        .bind(company_id)
        .bind(&data.name)
        .bind(&data.unit)
        .bind(data.vat_applicable)
        .bind(data.opening_quantity)
        .bind(data.opening_rate.0)
        .bind(as_of)
        .execute(&self.writer)
        .await;

        match result {
            Ok(_) => Ok(Ok(StockItem {
                id: item_id,
                company_id,
                data,
                created_at: as_of,
            })),
            Err(err) if is_unique_violation(&err) => Ok(Err(StockItemFailure::NameTaken)),
            Err(err) => Err(err),
        }
    }

    async fn get_stock_item(
        &self,
        company_id: CompanyId,
        item_id: StockItemId,
    ) -> Result<Option<StockItem>, Self::Error> {
        Ok(sqlx::query_as::<_, StockItemRow>(
            "select * from stock_item where id = $1 and company_id = $2",
        )
        .bind(item_id)
        .bind(company_id)
        .fetch_optional(&self.reader)
        .await?
        .map(Into::into))
    }

    async fn list_stock_items(&self, company_id: CompanyId) -> Result<Vec<StockItem>, Self::Error> {
        let rows = sqlx::query_as::<_, StockItemRow>(
            "select * from stock_item where company_id = $1 order by name",
        )
        .bind(company_id)
        .fetch_all(&self.reader)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn update_stock_item(
        &self,
        company_id: CompanyId,
        item_id: StockItemId,
        data: StockItemData,
    ) -> Result<Result<StockItem, StockItemFailure>, Self::Error> {
        let result = sqlx::query_as::<_, StockItemRow>(
            r#"
            update
                stock_item
            set
                name = $3,
                unit = $4,
                vat_applicable = $5,
                opening_quantity = $6,
                opening_rate = $7
            where
                id = $1
            and
                company_id = $2
            returning
                *
            "#,
        )
        .bind(item_id)
        .bind(company_id)
        .bind(&data.name)
        .bind(&data.unit)
        .bind(data.vat_applicable)
        .bind(data.opening_quantity)
        .bind(data.opening_rate.0)
        .fetch_optional(&self.writer)
        .await;

        match result {
            Ok(Some(row)) => Ok(Ok(row.into())),
            Ok(None) => Ok(Err(StockItemFailure::DoesNotExist)),
            Err(err) if is_unique_violation(&err) => Ok(Err(StockItemFailure::NameTaken)),
            Err(err) => Err(err),
        }
    }

    async fn delete_stock_item(
        &self,
        company_id: CompanyId,
        item_id: StockItemId,
    ) -> Result<Result<(), StockItemFailure>, Self::Error> {
        let mut tx = self.writer.begin().await?;

        let exists: bool = sqlx::query_scalar(
            "select exists (select 1 from stock_item where id = $1 and company_id = $2)",
        )
        .bind(item_id)
        .bind(company_id)
        .fetch_one(&mut *tx)
        .await?;
        if !exists {
            return Ok(Err(StockItemFailure::DoesNotExist));
        }

        let in_use: bool =
            sqlx::query_scalar("select exists (select 1 from stock_movement where item_id = $1)")
                .bind(item_id)
                .fetch_one(&mut *tx)
                .await?;
        if in_use {
            return Ok(Err(StockItemFailure::InUse));
        }

        sqlx::query("delete from stock_item where id = $1")
            .bind(item_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Ok(()))
    }
}
