use crate::models::{CompanyId, FiscalYear, FiscalYearData, FiscalYearId};
use thiserror::Error;
use time::OffsetDateTime;

/// Failures specific to fiscal-year management.
#[derive(Debug, Error)]
pub enum FiscalYearFailure {
    /// The fiscal year does not exist in this company
    #[error("fiscal year not found")]
    DoesNotExist,
    /// Another fiscal year of the company has the same name
    #[error("fiscal year name already exists")]
    NameTaken,
    /// The date range intersects another fiscal year of the company
    #[error("fiscal year overlaps an existing fiscal year")]
    Overlaps,
    /// Vouchers are recorded in the fiscal year
    #[error("fiscal year has vouchers")]
    InUse,
    /// The new date range would leave recorded vouchers outside the year
    #[error("fiscal year has vouchers outside the new date range")]
    VouchersOutOfRange,
}

/// Repository interface for fiscal years.
pub trait FiscalYearRepository: super::Repository {
    /// Create a fiscal year. The first one of a company becomes current.
    fn create_fiscal_year(
        &self,
        fiscal_year_id: FiscalYearId,
        company_id: CompanyId,
        data: FiscalYearData,
        as_of: OffsetDateTime,
    ) -> impl Future<Output = Result<Result<FiscalYear, FiscalYearFailure>, Self::Error>> + Send;

    /// Retrieve a fiscal year of the company, if it exists.
    fn get_fiscal_year(
        &self,
        company_id: CompanyId,
        fiscal_year_id: FiscalYearId,
    ) -> impl Future<Output = Result<Option<FiscalYear>, Self::Error>> + Send;

    /// List the fiscal years of a company, most recent first.
    fn list_fiscal_years(
        &self,
        company_id: CompanyId,
    ) -> impl Future<Output = Result<Vec<FiscalYear>, Self::Error>> + Send;

    /// Replace the name, dates and prefixes of a fiscal year.
    fn update_fiscal_year(
        &self,
        company_id: CompanyId,
        fiscal_year_id: FiscalYearId,
        data: FiscalYearData,
        as_of: OffsetDateTime,
    ) -> impl Future<Output = Result<Result<FiscalYear, FiscalYearFailure>, Self::Error>> + Send;

    /// Make this the company's only current fiscal year.
    fn set_current_fiscal_year(
        &self,
        company_id: CompanyId,
        fiscal_year_id: FiscalYearId,
        as_of: OffsetDateTime,
    ) -> impl Future<Output = Result<Result<FiscalYear, FiscalYearFailure>, Self::Error>> + Send;

    /// Delete a fiscal year without vouchers. If it was current, the most
    /// recent remaining year becomes current.
    fn delete_fiscal_year(
        &self,
        company_id: CompanyId,
        fiscal_year_id: FiscalYearId,
        as_of: OffsetDateTime,
    ) -> impl Future<Output = Result<Result<(), FiscalYearFailure>, Self::Error>> + Send;
}
