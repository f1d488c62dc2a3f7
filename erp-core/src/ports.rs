mod account;
mod application;
mod company;
mod fiscal_year;
mod mailer;
mod report;
mod stock_item;
mod user;
mod voucher;

pub use account::{AccountFailure, AccountRepository};
pub use application::Application;
pub use company::{CompanyFailure, CompanyRepository};
pub use fiscal_year::{FiscalYearFailure, FiscalYearRepository};
pub use mailer::{Mail, Mailer};
pub use report::ReportRepository;
pub use stock_item::{StockItemFailure, StockItemRepository};
pub use user::{UserFailure, UserRepository};
pub use voucher::{VoucherFailure, VoucherRepository};

/// The base trait every repository port extends.
///
/// Storage failures are reported through `Self::Error`. Failures that are a
/// consequence of the request (a duplicate name, a missing record) are
/// returned as the inner value of a nested `Result` so callers can tell the
/// two apart.
pub trait Repository: Send + Sync {
    /// The error type for underlying storage failures
    type Error: std::error::Error + Send + Sync + 'static;
}

/// A "marker" trait implied by implementing every repository port.
pub trait ErpRepository:
    UserRepository
    + CompanyRepository
    + FiscalYearRepository
    + AccountRepository
    + StockItemRepository
    + VoucherRepository
    + ReportRepository
{
}

impl<T> ErpRepository for T where
    T: UserRepository
        + CompanyRepository
        + FiscalYearRepository
        + AccountRepository
        + StockItemRepository
        + VoucherRepository
        + ReportRepository
{
}
