use crate::models::{UserId, ValidationError, validation::non_empty, validation::string_enum};
use time::OffsetDateTime;

/// The minimum accepted password length
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// The role of a user. Roles determine the default menu permissions; admins
/// additionally bypass every menu check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum Role {
    /// Full access, including user administration
    Admin,
    /// Everything except user administration
    Manager,
    /// Bookkeeping: accounts, vouchers and reports
    Accountant,
    /// Counter staff: sales and receipts
    Staff,
}

string_enum!(Role, "role", {
    Admin => "admin",
    Manager => "manager",
    Accountant => "accountant",
    Staff => "staff",
});

/// A named section of the administrative UI. Access to each section is a
/// boolean flag in the user's [`MenuPermissions`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
#[allow(missing_docs)]
pub enum MenuSection {
    Dashboard,
    Companies,
    FiscalYears,
    Accounts,
    StockItems,
    Sales,
    Purchase,
    Payment,
    Receipt,
    DebitNote,
    CreditNote,
    AgeingReport,
    VatReport,
    StockReport,
    LedgerReport,
    Users,
}

string_enum!(MenuSection, "menu section", {
    Dashboard => "dashboard",
    Companies => "companies",
    FiscalYears => "fiscal_years",
    Accounts => "accounts",
    StockItems => "stock_items",
    Sales => "sales",
    Purchase => "purchase",
    Payment => "payment",
    Receipt => "receipt",
    DebitNote => "debit_note",
    CreditNote => "credit_note",
    AgeingReport => "ageing_report",
    VatReport => "vat_report",
    StockReport => "stock_report",
    LedgerReport => "ledger_report",
    Users => "users",
});

crate::models::map_wrapper!(
    MenuPermissions,
    MenuSection,
    bool,
    "A per-user map of UI sections to access flags. Missing sections are denied."
);

impl Role {
    /// The menu permissions a freshly created user of this role receives.
    pub fn default_menu(&self) -> MenuPermissions {
        use MenuSection::*;
        let granted: &[MenuSection] = match self {
            Role::Admin => MenuSection::ALL,
            Role::Manager => &[
                Dashboard,
                Companies,
                FiscalYears,
                Accounts,
                StockItems,
                Sales,
                Purchase,
                Payment,
                Receipt,
                DebitNote,
                CreditNote,
                AgeingReport,
                VatReport,
                StockReport,
                LedgerReport,
            ],
            Role::Accountant => &[
                Dashboard,
                Accounts,
                StockItems,
                Sales,
                Purchase,
                Payment,
                Receipt,
                DebitNote,
                CreditNote,
                AgeingReport,
                VatReport,
                StockReport,
                LedgerReport,
            ],
            Role::Staff => &[Dashboard, Sales, Receipt, StockReport],
        };
        MenuSection::ALL
            .iter()
            .map(|section| (*section, granted.contains(section)))
            .collect()
    }
}

/// A user of the system, without credentials.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct User {
    /// Unique identifier
    pub id: UserId,
    /// Display name
    pub name: String,
    /// Normalized (trimmed, lowercase) email address, unique across users
    pub email: String,
    /// The user's role
    pub role: Role,
    /// Access flags for the UI sections
    pub menu: MenuPermissions,
    /// Inactive users cannot log in or use any section
    pub active: bool,
    /// When the user registered
    #[cfg_attr(feature = "serde", serde(with = "time::serde::rfc3339"))]
    #[cfg_attr(feature = "schemars", schemars(with = "String"))]
    pub created_at: OffsetDateTime,
    /// When the user was last modified
    #[cfg_attr(feature = "serde", serde(with = "time::serde::rfc3339"))]
    #[cfg_attr(feature = "schemars", schemars(with = "String"))]
    pub updated_at: OffsetDateTime,
}

impl User {
    /// Whether this user may use the given section.
    pub fn can(&self, section: MenuSection) -> bool {
        if !self.active {
            false
        } else if self.role == Role::Admin {
            true
        } else {
            self.menu.get(&section).copied().unwrap_or(false)
        }
    }

    /// Whether this user is an active administrator
    pub fn is_admin(&self) -> bool {
        self.active && self.role == Role::Admin
    }
}

/// Everything needed to store a new user.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Display name
    pub name: String,
    /// Normalized email address
    pub email: String,
    /// The opaque password hash produced by the application
    pub password_hash: String,
    /// The initial role
    pub role: Role,
    /// The initial menu permissions
    pub menu: MenuPermissions,
}

/// A self-registered user. The repository decides the role: the first user
/// of the system becomes an administrator, everyone after that staff.
#[derive(Debug, Clone)]
pub struct SignUp {
    /// Display name
    pub name: String,
    /// Normalized email address
    pub email: String,
    /// The opaque password hash produced by the application
    pub password_hash: String,
}

/// A partial update of a user's access, as submitted by an administrator.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UserAccessUpdate {
    /// A new role. When given without `menu`, the menu resets to the role defaults.
    #[cfg_attr(feature = "serde", serde(default))]
    pub role: Option<Role>,
    /// Flags to merge over the existing menu permissions
    #[cfg_attr(feature = "serde", serde(default))]
    pub menu: Option<MenuPermissions>,
    /// Activate or deactivate the account
    #[cfg_attr(feature = "serde", serde(default))]
    pub active: Option<bool>,
}

/// The resolved access of a user after applying an update.
#[derive(Debug, Clone, PartialEq)]
pub struct UserAccess {
    /// The role
    pub role: Role,
    /// The menu permissions
    pub menu: MenuPermissions,
    /// Whether the account is active
    pub active: bool,
}

impl UserAccessUpdate {
    /// Apply this update on top of the user's current access.
    pub fn apply(self, user: &User) -> UserAccess {
        let role = self.role.unwrap_or(user.role);
        let mut menu = match (self.role, &self.menu) {
            (Some(role), None) if role != user.role => role.default_menu(),
            _ => user.menu.clone(),
        };
        if let Some(flags) = self.menu {
            for (section, allowed) in flags {
                menu.insert(section, allowed);
            }
        }
        UserAccess {
            role,
            menu,
            active: self.active.unwrap_or(user.active),
        }
    }
}

/// Normalize an email address: trimmed, lowercased, exactly one `@` with
/// non-empty local and domain parts, and a dot in the domain.
pub fn normalize_email(email: &str) -> Result<String, ValidationError> {
    let email = email.trim().to_lowercase();
    let mut parts = email.split('@');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None)
            if !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.chars().any(char::is_whitespace) =>
        {
            Ok(email)
        }
        _ => Err(ValidationError::InvalidEmail),
    }
}

/// Check a password against the minimum length.
pub fn check_password(password: &str) -> Result<(), ValidationError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        Err(ValidationError::WeakPassword(MIN_PASSWORD_LENGTH))
    } else {
        Ok(())
    }
}

/// A registration request.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Registration {
    /// Display name
    pub name: String,
    /// Email address (normalized on validation)
    pub email: String,
    /// Plain-text password, only ever held in memory
    pub password: String,
}

impl Registration {
    /// Validate the request, returning the normalized name and email.
    pub fn validate(&self) -> Result<(String, String), ValidationError> {
        let name = non_empty("name", &self.name)?;
        let email = normalize_email(&self.email)?;
        check_password(&self.password)?;
        Ok((name, email))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: Role) -> User {
        let now = OffsetDateTime::UNIX_EPOCH;
        User {
            id: UserId::new_v4(),
            name: "Test".into(),
            email: "test@example.com".into(),
            role,
            menu: role.default_menu(),
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn admin_sees_everything_and_staff_does_not() {
        let admin = user(Role::Admin);
        let staff = user(Role::Staff);
        assert!(MenuSection::ALL.iter().all(|s| admin.can(*s)));
        assert!(staff.can(MenuSection::Sales));
        assert!(!staff.can(MenuSection::Purchase));
        assert!(!staff.can(MenuSection::Users));
    }

    #[test]
    fn inactive_users_are_denied() {
        let mut admin = user(Role::Admin);
        admin.active = false;
        assert!(!admin.can(MenuSection::Dashboard));
        assert!(!admin.is_admin());
    }

    #[test]
    fn role_change_resets_menu_unless_flags_given() {
        let staff = user(Role::Staff);
        let access = UserAccessUpdate {
            role: Some(Role::Accountant),
            ..Default::default()
        }
        .apply(&staff);
        assert_eq!(access.menu, Role::Accountant.default_menu());

        let access = UserAccessUpdate {
            role: None,
            menu: Some([(MenuSection::Purchase, true)].into_iter().collect()),
            active: None,
        }
        .apply(&staff);
        assert_eq!(access.role, Role::Staff);
        assert_eq!(access.menu.get(&MenuSection::Purchase), Some(&true));
        assert_eq!(access.menu.get(&MenuSection::Sales), Some(&true));
    }

    #[test]
    fn email_normalization() {
        assert_eq!(
            normalize_email("  Jane.Doe@Example.COM ").unwrap(),
            "jane.doe@example.com"
        );
        assert!(normalize_email("no-at-sign").is_err());
        assert!(normalize_email("two@@example.com").is_err());
        assert!(normalize_email("@example.com").is_err());
        assert!(normalize_email("jane@localhost").is_err());
    }

    #[test]
    fn menu_serializes_as_object() {
        let menu = Role::Staff.default_menu();
        let json = serde_json::to_value(&menu).unwrap();
        assert_eq!(json["sales"], serde_json::json!(true));
        assert_eq!(json["users"], serde_json::json!(false));
        let back: MenuPermissions = serde_json::from_value(json).unwrap();
        assert_eq!(back, menu);
    }
}
