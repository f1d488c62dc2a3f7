use crate::models::{CompanyId, FiscalYearId, ValidationError, VoucherType, validation::non_empty};
use regex::Regex;
use std::{collections::BTreeMap, sync::LazyLock};
use time::{Date, OffsetDateTime};

/// The pattern every voucher-number prefix must match.
pub const PREFIX_PATTERN: &str = r"^[A-Z0-9][A-Z0-9/_-]{0,23}$";

static PREFIX_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(PREFIX_PATTERN).expect("prefix pattern is a valid regex"));

/// A company-scoped accounting period with its voucher-number prefixes.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FiscalYear {
    /// Unique identifier
    pub id: FiscalYearId,
    /// The owning company
    pub company_id: CompanyId,
    /// The validated period definition
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub data: FiscalYearData,
    /// Whether this is the company's current fiscal year
    pub is_current: bool,
    /// When the fiscal year was created
    #[cfg_attr(feature = "serde", serde(with = "time::serde::rfc3339"))]
    #[cfg_attr(feature = "schemars", schemars(with = "String"))]
    pub created_at: OffsetDateTime,
    /// When the fiscal year was last modified
    #[cfg_attr(feature = "serde", serde(with = "time::serde::rfc3339"))]
    #[cfg_attr(feature = "schemars", schemars(with = "String"))]
    pub updated_at: OffsetDateTime,
}

impl FiscalYear {
    /// Whether `date` lies within the period (both ends inclusive).
    pub fn contains(&self, date: Date) -> bool {
        self.data.start_date <= date && date <= self.data.end_date
    }

    /// The default report date: today, clamped into the period.
    pub fn default_as_of(&self, today: Date) -> Date {
        today.max(self.data.start_date).min(self.data.end_date)
    }
}

/// A validated fiscal year definition.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FiscalYearData {
    /// Name, unique within the company (e.g. `2081/82`)
    pub name: String,
    /// First day of the period
    #[cfg_attr(feature = "schemars", schemars(with = "String"))]
    pub start_date: Date,
    /// Last day of the period
    #[cfg_attr(feature = "schemars", schemars(with = "String"))]
    pub end_date: Date,
    /// The voucher-number prefix for each voucher type
    pub prefixes: VoucherPrefixes,
}

/// One voucher-number prefix per voucher type.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[allow(missing_docs)]
pub struct VoucherPrefixes {
    pub sales: String,
    pub purchase: String,
    pub payment: String,
    pub receipt: String,
    pub debit_note: String,
    pub credit_note: String,
}

impl VoucherPrefixes {
    /// Derive the prefixes from a fiscal year name, e.g. `SV-2081/82-`.
    ///
    /// The name is uppercased and reduced to `[A-Z0-9/]` and truncated so that
    /// every generated prefix still satisfies [`PREFIX_PATTERN`].
    pub fn generate(fiscal_year_name: &str) -> Self {
        let stem: String = fiscal_year_name
            .to_uppercase()
            .chars()
            .filter(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || *c == '/')
            .take(20)
            .collect();
        let prefix = |ty: VoucherType| {
            if stem.is_empty() {
                format!("{}-", ty.code())
            } else {
                format!("{}-{}-", ty.code(), stem)
            }
        };
        Self {
            sales: prefix(VoucherType::Sales),
            purchase: prefix(VoucherType::Purchase),
            payment: prefix(VoucherType::Payment),
            receipt: prefix(VoucherType::Receipt),
            debit_note: prefix(VoucherType::DebitNote),
            credit_note: prefix(VoucherType::CreditNote),
        }
    }

    /// The prefix for the given voucher type
    pub fn get(&self, voucher_type: VoucherType) -> &str {
        match voucher_type {
            VoucherType::Sales => &self.sales,
            VoucherType::Purchase => &self.purchase,
            VoucherType::Payment => &self.payment,
            VoucherType::Receipt => &self.receipt,
            VoucherType::DebitNote => &self.debit_note,
            VoucherType::CreditNote => &self.credit_note,
        }
    }

    fn get_mut(&mut self, voucher_type: VoucherType) -> &mut String {
        match voucher_type {
            VoucherType::Sales => &mut self.sales,
            VoucherType::Purchase => &mut self.purchase,
            VoucherType::Payment => &mut self.payment,
            VoucherType::Receipt => &mut self.receipt,
            VoucherType::DebitNote => &mut self.debit_note,
            VoucherType::CreditNote => &mut self.credit_note,
        }
    }

    /// Format the voucher number for the `sequence`-th voucher of a type.
    pub fn number(&self, voucher_type: VoucherType, sequence: i64) -> String {
        format!("{}{:04}", self.get(voucher_type), sequence)
    }

    /// Check every prefix against [`PREFIX_PATTERN`] and that no two voucher
    /// types share one.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (i, ty) in VoucherType::ALL.iter().enumerate() {
            let prefix = self.get(*ty);
            if !PREFIX_REGEX.is_match(prefix) {
                return Err(ValidationError::InvalidPrefix(prefix.to_owned()));
            }
            if VoucherType::ALL[..i].iter().any(|other| self.get(*other) == prefix) {
                return Err(ValidationError::DuplicatePrefix(prefix.to_owned()));
            }
        }
        Ok(())
    }
}

/// A fiscal year as submitted by a client. Omitted prefixes are generated
/// from the name.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FiscalYearInput {
    /// Name, unique within the company
    pub name: String,
    /// First day of the period
    #[cfg_attr(feature = "schemars", schemars(with = "String"))]
    pub start_date: Date,
    /// Last day of the period
    #[cfg_attr(feature = "schemars", schemars(with = "String"))]
    pub end_date: Date,
    /// Explicit prefixes, keyed by voucher type
    #[cfg_attr(feature = "serde", serde(default))]
    pub prefixes: BTreeMap<VoucherType, String>,
}

impl FiscalYearInput {
    /// Validate the input and resolve the prefixes.
    pub fn validate(self) -> Result<FiscalYearData, ValidationError> {
        let name = non_empty("name", &self.name)?;
        if self.start_date >= self.end_date {
            return Err(ValidationError::InvalidDateRange);
        }
        let mut prefixes = VoucherPrefixes::generate(&name);
        for (ty, prefix) in self.prefixes {
            *prefixes.get_mut(ty) = prefix.trim().to_uppercase();
        }
        prefixes.validate()?;
        Ok(FiscalYearData {
            name,
            start_date: self.start_date,
            end_date: self.end_date,
            prefixes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use time::macros::date;

    #[test]
    fn generated_prefixes_match_pattern() {
        let prefixes = VoucherPrefixes::generate("2081/82");
        assert_eq!(prefixes.sales, "SV-2081/82-");
        assert_eq!(prefixes.credit_note, "CN-2081/82-");
        assert!(prefixes.validate().is_ok());
        assert_eq!(prefixes.number(VoucherType::Sales, 7), "SV-2081/82-0007");

        let odd = VoucherPrefixes::generate("fy 2024–25 (main branch, very long name)");
        assert!(odd.validate().is_ok());
    }

    #[rstest]
    #[case("inv-", true)]
    #[case("INV/24-", true)]
    #[case("-INV", false)]
    #[case("INV 24", false)]
    #[case("", false)]
    #[case("PV-2024-", false)]
    fn explicit_prefixes(#[case] prefix: &str, #[case] valid: bool) {
        let input = FiscalYearInput {
            name: "2024".into(),
            start_date: date!(2024 - 01 - 01),
            end_date: date!(2024 - 12 - 31),
            prefixes: BTreeMap::from([(VoucherType::Sales, prefix.into())]),
        };
        assert_eq!(input.validate().is_ok(), valid);
    }

    #[test]
    fn dates_must_be_ordered() {
        let input = FiscalYearInput {
            name: "2024".into(),
            start_date: date!(2024 - 12 - 31),
            end_date: date!(2024 - 01 - 01),
            prefixes: BTreeMap::new(),
        };
        assert_eq!(input.validate(), Err(ValidationError::InvalidDateRange));
    }

    #[test]
    fn default_report_date_is_clamped_into_the_period() {
        let data = FiscalYearInput {
            name: "2024".into(),
            start_date: date!(2024 - 01 - 01),
            end_date: date!(2024 - 12 - 31),
            prefixes: BTreeMap::new(),
        }
        .validate()
        .unwrap();
        let now = OffsetDateTime::now_utc();
        let fiscal_year = FiscalYear {
            id: FiscalYearId::new_v4(),
            company_id: CompanyId::new_v4(),
            data,
            is_current: true,
            created_at: now,
            updated_at: now,
        };

        assert_eq!(fiscal_year.default_as_of(date!(2024 - 06 - 15)), date!(2024 - 06 - 15));
        assert_eq!(fiscal_year.default_as_of(date!(2026 - 03 - 01)), date!(2024 - 12 - 31));
        assert_eq!(fiscal_year.default_as_of(date!(2023 - 11 - 20)), date!(2024 - 01 - 01));
        assert!(!fiscal_year.contains(date!(2025 - 01 - 01)));
    }
}
