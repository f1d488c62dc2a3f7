use crate::models::{CompanyId, StockItem, StockItemData, StockItemId};
use thiserror::Error;
use time::OffsetDateTime;

/// Failures specific to stock items.
#[derive(Debug, Error)]
pub enum StockItemFailure {
    /// The item does not exist in this company
    #[error("stock item not found")]
    DoesNotExist,
    /// Another item of the company has the same name
    #[error("stock item name already exists")]
    NameTaken,
    /// Vouchers refer to the item
    #[error("stock item is used by vouchers")]
    InUse,
}

/// Repository interface for stock items.
pub trait StockItemRepository: super::Repository {
    /// Create a stock item in the company.
    fn create_stock_item(
        &self,
        item_id: StockItemId,
        company_id: CompanyId,
        data: StockItemData,
        as_of: OffsetDateTime,
    ) -> impl Future<Output = Result<Result<StockItem, StockItemFailure>, Self::Error>> + Send;

    /// Retrieve a stock item of the company, if it exists.
    fn get_stock_item(
        &self,
        company_id: CompanyId,
        item_id: StockItemId,
    ) -> impl Future<Output = Result<Option<StockItem>, Self::Error>> + Send;

    /// List the company's stock items by name.
    fn list_stock_items(
        &self,
        company_id: CompanyId,
    ) -> impl Future<Output = Result<Vec<StockItem>, Self::Error>> + Send;

    /// Replace the editable details of a stock item.
    fn update_stock_item(
        &self,
        company_id: CompanyId,
        item_id: StockItemId,
        data: StockItemData,
    ) -> impl Future<Output = Result<Result<StockItem, StockItemFailure>, Self::Error>> + Send;

    /// Delete an unreferenced stock item.
    fn delete_stock_item(
        &self,
        company_id: CompanyId,
        item_id: StockItemId,
    ) -> impl Future<Output = Result<Result<(), StockItemFailure>, Self::Error>> + Send;
}
