use crate::models::{Account, AccountData, AccountId, CompanyId};
use thiserror::Error;
use time::OffsetDateTime;

/// Failures specific to the chart of accounts.
#[derive(Debug, Error)]
pub enum AccountFailure {
    /// The account does not exist in this company
    #[error("account not found")]
    DoesNotExist,
    /// Another account of the company has the same name
    #[error("account name already exists")]
    NameTaken,
    /// Vouchers refer to the account
    #[error("account is used by vouchers")]
    InUse,
    /// System accounts cannot be deleted or moved to another group
    #[error("system accounts cannot be deleted or regrouped")]
    SystemAccount,
}

/// Repository interface for ledger accounts.
pub trait AccountRepository: super::Repository {
    /// Create an account in the company.
    fn create_account(
        &self,
        account_id: AccountId,
        company_id: CompanyId,
        data: AccountData,
        as_of: OffsetDateTime,
    ) -> impl Future<Output = Result<Result<Account, AccountFailure>, Self::Error>> + Send;

    /// Retrieve an account of the company, if it exists.
    fn get_account(
        &self,
        company_id: CompanyId,
        account_id: AccountId,
    ) -> impl Future<Output = Result<Option<Account>, Self::Error>> + Send;

    /// List the company's accounts by name.
    fn list_accounts(
        &self,
        company_id: CompanyId,
    ) -> impl Future<Output = Result<Vec<Account>, Self::Error>> + Send;

    /// Replace the editable details of an account.
    fn update_account(
        &self,
        company_id: CompanyId,
        account_id: AccountId,
        data: AccountData,
    ) -> impl Future<Output = Result<Result<Account, AccountFailure>, Self::Error>> + Send;

    /// Delete an account that is neither a system account nor referenced.
    fn delete_account(
        &self,
        company_id: CompanyId,
        account_id: AccountId,
    ) -> impl Future<Output = Result<Result<(), AccountFailure>, Self::Error>> + Send;
}
