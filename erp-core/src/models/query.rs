use crate::models::{FiscalYearId, VoucherType};
use time::Date;

/// Filters for listing vouchers. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VoucherQuery {
    /// Only vouchers in this fiscal year
    pub fiscal_year_id: Option<FiscalYearId>,
    /// Only vouchers of this type
    pub voucher_type: Option<VoucherType>,
    /// Only vouchers dated on or after this day
    #[cfg_attr(feature = "schemars", schemars(with = "Option<String>"))]
    pub from: Option<Date>,
    /// Only vouchers dated on or before this day
    #[cfg_attr(feature = "schemars", schemars(with = "Option<String>"))]
    pub to: Option<Date>,
}

/// Which side of the party ledger an ageing report covers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum AgeingKind {
    /// Amounts owed by sundry debtors
    #[default]
    Receivable,
    /// Amounts owed to sundry creditors
    Payable,
}

/// Parameters shared by the report endpoints.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReportQuery {
    /// The fiscal year reported on
    pub fiscal_year_id: FiscalYearId,
    /// Report date; defaults to today, clamped to the end of the fiscal year
    #[cfg_attr(feature = "serde", serde(default))]
    #[cfg_attr(feature = "schemars", schemars(with = "Option<String>"))]
    pub as_of: Option<Date>,
    /// Start of the reporting window; defaults to the fiscal year start
    #[cfg_attr(feature = "serde", serde(default))]
    #[cfg_attr(feature = "schemars", schemars(with = "Option<String>"))]
    pub from: Option<Date>,
    /// End of the reporting window; defaults to the report date
    #[cfg_attr(feature = "serde", serde(default))]
    #[cfg_attr(feature = "schemars", schemars(with = "Option<String>"))]
    pub to: Option<Date>,
    /// Ageing side (ageing report only)
    #[cfg_attr(feature = "serde", serde(default))]
    pub kind: Option<AgeingKind>,
}
