use crate::models::{CompanyId, UserId, ValidationError, validation::non_empty};
use time::OffsetDateTime;

/// The VAT rate applied when a company does not specify one (13%).
pub const DEFAULT_VAT_RATE_BPS: u32 = 1300;

/// A company is the unit of tenancy: every fiscal year, account, stock item
/// and voucher belongs to exactly one company.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Company {
    /// Unique identifier
    pub id: CompanyId,
    /// The editable company details
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub data: CompanyData,
    /// The user who created the company
    pub created_by: UserId,
    /// When the company was created
    #[cfg_attr(feature = "serde", serde(with = "time::serde::rfc3339"))]
    #[cfg_attr(feature = "schemars", schemars(with = "String"))]
    pub created_at: OffsetDateTime,
    /// When the company was last modified
    #[cfg_attr(feature = "serde", serde(with = "time::serde::rfc3339"))]
    #[cfg_attr(feature = "schemars", schemars(with = "String"))]
    pub updated_at: OffsetDateTime,
}

/// The editable details of a company.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CompanyData {
    /// Legal name
    pub name: String,
    /// Postal address
    #[cfg_attr(feature = "serde", serde(default))]
    pub address: Option<String>,
    /// Contact phone number
    #[cfg_attr(feature = "serde", serde(default))]
    pub phone: Option<String>,
    /// Contact email
    #[cfg_attr(feature = "serde", serde(default))]
    pub email: Option<String>,
    /// VAT/PAN registration number
    #[cfg_attr(feature = "serde", serde(default))]
    pub vat_number: Option<String>,
    /// VAT rate in basis points (1300 = 13%)
    #[cfg_attr(feature = "serde", serde(default = "default_vat_rate"))]
    pub vat_rate_bps: u32,
}

#[cfg(feature = "serde")]
fn default_vat_rate() -> u32 {
    DEFAULT_VAT_RATE_BPS
}

impl CompanyData {
    /// Trim the free-text fields and check the name and VAT rate.
    pub fn validate(self) -> Result<Self, ValidationError> {
        if self.vat_rate_bps > 10_000 {
            return Err(ValidationError::VatRateOutOfRange);
        }
        let trimmed = |value: Option<String>| {
            value
                .map(|v| v.trim().to_owned())
                .filter(|v| !v.is_empty())
        };
        Ok(Self {
            name: non_empty("name", &self.name)?,
            address: trimmed(self.address),
            phone: trimmed(self.phone),
            email: trimmed(self.email),
            vat_number: trimmed(self.vat_number),
            vat_rate_bps: self.vat_rate_bps,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vat_rate_defaults_to_thirteen_percent() {
        let data: CompanyData = serde_json::from_str(r#"{"name": "Acme Traders"}"#).unwrap();
        assert_eq!(data.vat_rate_bps, DEFAULT_VAT_RATE_BPS);
    }

    #[test]
    fn validation_trims_and_rejects() {
        let data = CompanyData {
            name: "  Acme ".into(),
            address: Some("   ".into()),
            phone: None,
            email: Some(" info@acme.test ".into()),
            vat_number: None,
            vat_rate_bps: 1300,
        }
        .validate()
        .unwrap();
        assert_eq!(data.name, "Acme");
        assert_eq!(data.address, None);
        assert_eq!(data.email.as_deref(), Some("info@acme.test"));

        let too_high = CompanyData {
            vat_rate_bps: 10_001,
            ..data.clone()
        };
        assert_eq!(too_high.validate(), Err(ValidationError::VatRateOutOfRange));

        let blank = CompanyData {
            name: " ".into(),
            ..data
        };
        assert_eq!(blank.validate(), Err(ValidationError::Empty("name")));
    }
}
