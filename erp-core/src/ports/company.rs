use crate::models::{AccountId, Company, CompanyData, CompanyId, SystemAccount, User, UserId};
use thiserror::Error;
use time::OffsetDateTime;

/// Failures specific to company management.
#[derive(Debug, Error)]
pub enum CompanyFailure {
    /// The company does not exist
    #[error("company not found")]
    DoesNotExist,
    /// The user to be added does not exist
    #[error("user not found")]
    UnknownUser,
}

/// Repository interface for companies and their memberships.
pub trait CompanyRepository: super::Repository {
    /// Create a company, make `created_by` a member and seed the system
    /// accounts with the given ids, all in one transaction.
    fn create_company(
        &self,
        company_id: CompanyId,
        data: CompanyData,
        created_by: UserId,
        system_accounts: Vec<(AccountId, SystemAccount)>,
        as_of: OffsetDateTime,
    ) -> impl Future<Output = Result<Company, Self::Error>> + Send;

    /// Retrieve a company, if it exists.
    fn get_company(
        &self,
        company_id: CompanyId,
    ) -> impl Future<Output = Result<Option<Company>, Self::Error>> + Send;

    /// List companies by name. With `member`, only those the user belongs to.
    fn list_companies(
        &self,
        member: Option<UserId>,
    ) -> impl Future<Output = Result<Vec<Company>, Self::Error>> + Send;

    /// Replace the editable details of a company.
    fn update_company(
        &self,
        company_id: CompanyId,
        data: CompanyData,
        as_of: OffsetDateTime,
    ) -> impl Future<Output = Result<Result<Company, CompanyFailure>, Self::Error>> + Send;

    /// Delete a company together with everything it owns.
    fn delete_company(
        &self,
        company_id: CompanyId,
    ) -> impl Future<Output = Result<Result<(), CompanyFailure>, Self::Error>> + Send;

    /// Grant a user access to a company. Adding an existing member is a no-op.
    fn add_member(
        &self,
        company_id: CompanyId,
        user_id: UserId,
        as_of: OffsetDateTime,
    ) -> impl Future<Output = Result<Result<(), CompanyFailure>, Self::Error>> + Send;

    /// The members of a company.
    fn list_members(
        &self,
        company_id: CompanyId,
    ) -> impl Future<Output = Result<Vec<User>, Self::Error>> + Send;

    /// Whether the user is a member of the company.
    fn is_member(
        &self,
        company_id: CompanyId,
        user_id: UserId,
    ) -> impl Future<Output = Result<bool, Self::Error>> + Send;
}
