//! PostgreSQL adapters.
//!
//! Each adapter owns its SQL and maps rows into domain types at the
//! boundary. Expected schema:
//!
//! - `packages(id, name, duration_months, price, active)`
//! - `memberships(id, member_id, package_id, start_date, end_date, active)`
//! - `invoices(id, member_id, membership_id, total_amount, paid, created_at)`
//! - `payment_history(id, invoice_id UNIQUE, amount, method, paid_at)`
//! - `members(id, email)`

mod billing_store;
mod member_directory;
mod membership_reader;
mod package_catalog;

pub use billing_store::PostgresBillingStore;
pub use member_directory::PostgresMemberDirectory;
pub use membership_reader::PostgresMembershipReader;
pub use package_catalog::PostgresPackageCatalog;
