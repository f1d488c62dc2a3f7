mod account;
mod amount;
mod company;
mod fiscal_year;
mod ids;
mod ledger;
mod query;
mod stock_item;
mod user;
mod validation;
mod voucher;

pub use account::{Account, AccountData, AccountGroup, SystemAccount};
pub use amount::Amount;
pub use company::{Company, CompanyData, DEFAULT_VAT_RATE_BPS};
pub use fiscal_year::{
    FiscalYear, FiscalYearData, FiscalYearInput, PREFIX_PATTERN, VoucherPrefixes,
};
pub use ids::{AccountId, CompanyId, FiscalYearId, StockItemId, UserId, VoucherId};
pub use ledger::{LedgerEntry, StockMovement};
pub use query::{AgeingKind, ReportQuery, VoucherQuery};
pub use stock_item::{StockItem, StockItemData};
pub use user::{
    MIN_PASSWORD_LENGTH, MenuPermissions, MenuSection, NewUser, Registration, Role, SignUp, User,
    UserAccess, UserAccessUpdate, check_password, normalize_email,
};
pub use validation::{ParseEnumError, ValidationError};
pub use voucher::{
    LineInput, Posting, PostingContext, PostingEntry, PostingMovement, Voucher, VoucherInput,
    VoucherLine, VoucherTotals, VoucherType,
};

/// Wraps an `IndexMap` with deterministic ordering in a newtype.
///
/// Predictable ordering keeps API responses and stored JSON stable between
/// requests. The concrete map is an implementation detail, so it is wrapped
/// in a newtype, allowing us to replace it without breaking callers.
macro_rules! map_wrapper {
    ($struct:ident, $key:ty, $value:ty, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Default, PartialEq)]
        #[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
        #[cfg_attr(
            feature = "serde",
            derive(serde::Serialize, serde::Deserialize),
            serde(transparent)
        )]
        pub struct $struct(pub indexmap::IndexMap<$key, $value, rustc_hash::FxBuildHasher>);

        impl std::ops::Deref for $struct {
            type Target = indexmap::IndexMap<$key, $value, rustc_hash::FxBuildHasher>;

            fn deref(&self) -> &Self::Target {
                &self.0
            }
        }

        impl std::ops::DerefMut for $struct {
            fn deref_mut(&mut self) -> &mut Self::Target {
                &mut self.0
            }
        }

        impl IntoIterator for $struct {
            type Item = ($key, $value);
            type IntoIter = indexmap::map::IntoIter<$key, $value>;

            fn into_iter(self) -> Self::IntoIter {
                self.0.into_iter()
            }
        }

        impl FromIterator<($key, $value)> for $struct {
            fn from_iter<I: IntoIterator<Item = ($key, $value)>>(iter: I) -> Self {
                Self(indexmap::IndexMap::from_iter(iter))
            }
        }
    };
}

pub(crate) use map_wrapper;
