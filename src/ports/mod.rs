//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Billing Ports
//!
//! - `BillingStore` - Transactional invoice, membership, and ledger persistence
//! - `MembershipReader` - Read side for a member's current membership
//! - `PackageCatalog` - Sellable membership package lookup
//!
//! ## Notification Ports
//!
//! - `MemberDirectory` - Member contact lookup
//! - `SettlementNotifier` - Post-settlement member notification

mod billing_store;
mod member_directory;
mod membership_reader;
mod package_catalog;
mod settlement_notifier;

pub use billing_store::BillingStore;
pub use member_directory::MemberDirectory;
pub use membership_reader::MembershipReader;
pub use package_catalog::PackageCatalog;
pub use settlement_notifier::SettlementNotifier;
