use crate::models::{
    CompanyId, UserId, ValidationError, Voucher, VoucherId, VoucherInput, VoucherQuery,
};
use thiserror::Error;
use time::OffsetDateTime;

/// Failures specific to recording vouchers.
#[derive(Debug, Error)]
pub enum VoucherFailure {
    /// The fiscal year does not exist in this company
    #[error("fiscal year not found")]
    UnknownFiscalYear,
    /// The voucher was rejected by the posting rules
    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

/// Repository interface for vouchers and their postings.
pub trait VoucherRepository: super::Repository {
    /// Number, post and store a voucher in a single transaction.
    ///
    /// The repository gathers the fiscal year, VAT rate, accounts and items
    /// of the company, runs [`VoucherInput::post`], allocates the next
    /// sequence number for `(fiscal year, voucher type)` and stores the
    /// voucher with its ledger entries and stock movements.
    fn create_voucher(
        &self,
        voucher_id: VoucherId,
        company_id: CompanyId,
        input: VoucherInput,
        created_by: UserId,
        as_of: OffsetDateTime,
    ) -> impl Future<Output = Result<Result<Voucher, VoucherFailure>, Self::Error>> + Send;

    /// Retrieve a voucher of the company, if it exists.
    fn get_voucher(
        &self,
        company_id: CompanyId,
        voucher_id: VoucherId,
    ) -> impl Future<Output = Result<Option<Voucher>, Self::Error>> + Send;

    /// Vouchers matching the query, ordered by date then number.
    fn query_vouchers(
        &self,
        company_id: CompanyId,
        query: VoucherQuery,
        limit: Option<usize>,
    ) -> impl Future<Output = Result<Vec<Voucher>, Self::Error>> + Send;

    /// Delete a voucher with its ledger entries and stock movements.
    /// Returns false if it did not exist.
    fn delete_voucher(
        &self,
        company_id: CompanyId,
        voucher_id: VoucherId,
    ) -> impl Future<Output = Result<bool, Self::Error>> + Send;
}
