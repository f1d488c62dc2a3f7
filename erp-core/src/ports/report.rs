use crate::models::{CompanyId, LedgerEntry, StockMovement};
use time::Date;

/// Repository interface for the raw postings the reports aggregate.
pub trait ReportRepository: super::Repository {
    /// Every ledger entry of the company dated on or before `to`, in date
    /// then voucher-number order.
    fn ledger_entries(
        &self,
        company_id: CompanyId,
        to: Date,
    ) -> impl Future<Output = Result<Vec<LedgerEntry>, Self::Error>> + Send;

    /// Every stock movement of the company dated on or before `to`, in date
    /// order.
    fn stock_movements(
        &self,
        company_id: CompanyId,
        to: Date,
    ) -> impl Future<Output = Result<Vec<StockMovement>, Self::Error>> + Send;
}
