use crate::models::{
    AccountId, Amount, CompanyId, ValidationError, validation::non_empty, validation::string_enum,
};
use time::OffsetDateTime;

/// The chart-of-accounts group an account belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
#[allow(missing_docs)]
pub enum AccountGroup {
    Capital,
    FixedAsset,
    CurrentAsset,
    Cash,
    Bank,
    SundryDebtor,
    SundryCreditor,
    CurrentLiability,
    DutiesTaxes,
    Sales,
    Purchase,
    DirectIncome,
    IndirectIncome,
    DirectExpense,
    IndirectExpense,
}

string_enum!(AccountGroup, "account group", {
    Capital => "capital",
    FixedAsset => "fixed_asset",
    CurrentAsset => "current_asset",
    Cash => "cash",
    Bank => "bank",
    SundryDebtor => "sundry_debtor",
    SundryCreditor => "sundry_creditor",
    CurrentLiability => "current_liability",
    DutiesTaxes => "duties_taxes",
    Sales => "sales",
    Purchase => "purchase",
    DirectIncome => "direct_income",
    IndirectIncome => "indirect_income",
    DirectExpense => "direct_expense",
    IndirectExpense => "indirect_expense",
});

impl AccountGroup {
    /// Cash-in-hand and bank accounts settle payments and receipts.
    pub fn is_cash_or_bank(&self) -> bool {
        matches!(self, AccountGroup::Cash | AccountGroup::Bank)
    }

    /// Accounts that may appear as the counterparty of a voucher.
    pub fn is_party(&self) -> bool {
        matches!(
            self,
            AccountGroup::SundryDebtor
                | AccountGroup::SundryCreditor
                | AccountGroup::Cash
                | AccountGroup::Bank
        )
    }
}

/// The accounts every company is seeded with. Posting rules refer to these
/// by role rather than by id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
#[allow(missing_docs)]
pub enum SystemAccount {
    Cash,
    Sales,
    Purchase,
    Vat,
}

string_enum!(SystemAccount, "system account", {
    Cash => "cash",
    Sales => "sales",
    Purchase => "purchase",
    Vat => "vat",
});

impl SystemAccount {
    /// The name and group the seeded account is created with.
    pub fn seed(&self) -> (&'static str, AccountGroup) {
        match self {
            SystemAccount::Cash => ("Cash", AccountGroup::Cash),
            SystemAccount::Sales => ("Sales", AccountGroup::Sales),
            SystemAccount::Purchase => ("Purchase", AccountGroup::Purchase),
            SystemAccount::Vat => ("VAT", AccountGroup::DutiesTaxes),
        }
    }
}

/// A ledger account in a company's chart of accounts.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Account {
    /// Unique identifier
    pub id: AccountId,
    /// The owning company
    pub company_id: CompanyId,
    /// The editable account details
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub data: AccountData,
    /// Set for the accounts seeded with the company
    pub system: Option<SystemAccount>,
    /// When the account was created
    #[cfg_attr(feature = "serde", serde(with = "time::serde::rfc3339"))]
    #[cfg_attr(feature = "schemars", schemars(with = "String"))]
    pub created_at: OffsetDateTime,
}

/// The editable details of an account.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AccountData {
    /// Name, unique within the company
    pub name: String,
    /// The chart-of-accounts group
    pub group: AccountGroup,
    /// Balance brought into the books, positive for debit
    #[cfg_attr(feature = "serde", serde(default))]
    pub opening_balance: Amount,
}

impl AccountData {
    /// Trim and check the name and the opening balance.
    pub fn validate(self) -> Result<Self, ValidationError> {
        if !self.opening_balance.in_range() {
            return Err(ValidationError::AmountOutOfRange);
        }
        Ok(Self {
            name: non_empty("name", &self.name)?,
            ..self
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opening_balance_must_be_recordable() {
        let data = AccountData {
            name: "  Everest Stores ".into(),
            group: AccountGroup::SundryDebtor,
            opening_balance: Amount(-25_000),
        };
        assert_eq!(data.clone().validate().unwrap().name, "Everest Stores");

        let data = AccountData {
            opening_balance: Amount(i64::MIN),
            ..data
        };
        assert_eq!(data.validate(), Err(ValidationError::AmountOutOfRange));
    }
}
