use crate::models::{AccountId, StockItemId};
use thiserror::Error;

/// An enumeration of the ways submitted data may be invalid
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// A required name was blank
    #[error("{0} must not be empty")]
    Empty(&'static str),
    /// The email address is not of the form `local@domain`
    #[error("invalid email address")]
    InvalidEmail,
    /// The password is shorter than the minimum length
    #[error("password must be at least {0} characters")]
    WeakPassword(usize),
    /// A voucher-number prefix does not match the allowed pattern
    #[error("invalid voucher prefix {0:?}")]
    InvalidPrefix(String),
    /// Two voucher types share a prefix, so their numbers would collide
    #[error("voucher prefix {0:?} is used for more than one voucher type")]
    DuplicatePrefix(String),
    /// A date range ends before (or when) it starts
    #[error("start date must precede end date")]
    InvalidDateRange,
    /// A VAT rate above 100%
    #[error("vat rate must be between 0 and 10000 basis points")]
    VatRateOutOfRange,
    /// A voucher line with a non-positive or non-finite quantity
    #[error("quantity must be a positive number")]
    InvalidQuantity,
    /// A negative unit rate
    #[error("rate must not be negative")]
    NegativeRate,
    /// An amount, rate or line value too large to record
    #[error("amount is out of range")]
    AmountOutOfRange,
    /// An item voucher without lines
    #[error("voucher must have at least one line")]
    NoLines,
    /// A payment or receipt carrying item lines
    #[error("payments and receipts do not take item lines")]
    UnexpectedLines,
    /// A cash voucher with a missing or non-positive amount
    #[error("amount must be positive")]
    NonPositiveAmount,
    /// A cash voucher without a cash or bank account
    #[error("cash or bank account is required")]
    MissingCashAccount,
    /// The cash or bank account is not of group cash/bank
    #[error("account {0} is not a cash or bank account")]
    InvalidCashAccount(AccountId),
    /// The party account is not a debtor/creditor/cash/bank account
    #[error("account {0} cannot be used as a party")]
    InvalidPartyAccount(AccountId),
    /// The party and cash accounts are the same
    #[error("party and cash accounts must differ")]
    SameAccount,
    /// The voucher date falls outside its fiscal year
    #[error("date is outside the fiscal year")]
    DateOutsideFiscalYear,
    /// A report date falls outside the fiscal year being reported
    #[error("report date is outside the fiscal year")]
    ReportDateOutsideFiscalYear,
    /// A referenced account does not exist in the company
    #[error("unknown account {0}")]
    UnknownAccount(AccountId),
    /// A referenced stock item does not exist in the company
    #[error("unknown stock item {0}")]
    UnknownItem(StockItemId),
    /// The company is missing one of its system accounts
    #[error("company is missing its {0} account")]
    MissingSystemAccount(&'static str),
}

/// A string did not name any variant of an enumeration
#[derive(Debug, Clone, PartialEq, Error)]
#[error("unknown {kind} {value:?}")]
pub struct ParseEnumError {
    /// The enumeration being parsed
    pub kind: &'static str,
    /// The offending input
    pub value: String,
}

/// Require a trimmed, non-empty string.
pub(crate) fn non_empty(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        Err(ValidationError::Empty(field))
    } else {
        Ok(value.to_owned())
    }
}

/// Generates `as_str`, `Display`, `FromStr` and `ALL` for a fieldless enum whose
/// wire names are given explicitly.
macro_rules! string_enum {
    ($enum:ident, $kind:expr, { $($variant:ident => $name:expr),+ $(,)? }) => {
        impl $enum {
            /// Every variant, in declaration order
            pub const ALL: &'static [$enum] = &[$($enum::$variant),+];

            /// The stable wire/storage name of this variant
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($enum::$variant => $name),+
                }
            }
        }

        impl std::fmt::Display for $enum {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $enum {
            type Err = $crate::models::ParseEnumError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($name => Ok($enum::$variant),)+
                    _ => Err($crate::models::ParseEnumError {
                        kind: $kind,
                        value: s.to_owned(),
                    }),
                }
            }
        }
    };
}

pub(crate) use string_enum;
