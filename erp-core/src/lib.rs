#![warn(missing_docs)]
// Note: this overwrites the link in the README to point to the rust docs of the erp-core crate.
//! [erp_core]: https://docs.rs/erp_core/latest/erp_core/index.html
//! [erp_sqlite]: https://docs.rs/erp_sqlite/latest/erp_sqlite/index.html
//! [erp_axum]: https://docs.rs/erp_axum/latest/erp_axum/index.html
#![doc = include_str!("../README.md")]

/// Core domain models for the ERP.
///
/// This module contains the records a tenant works with: users, companies,
/// fiscal years, accounts, stock items and vouchers, plus the money and
/// identifier newtypes they are built from.
///
/// The models are plain data with validation and the double-entry posting
/// rules. Persistence and transport live in the adapter crates.
pub mod models;

/// Interface traits for the ERP.
///
/// This module contains the "ports" in the hexagonal architecture pattern.
///
/// These traits define the contract between the domain logic and external adapters
/// (such as databases, mail relays or HTTP servers) without specifying implementation
/// details.
pub mod ports;

/// Report aggregation over fetched ledger data.
///
/// Every report is a pure function of records obtained through the ports, so
/// they are tested without a database.
pub mod reports;
