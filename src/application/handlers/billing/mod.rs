//! Billing operation handlers.
//!
//! - `create_purchase` - sell a package: membership plus unpaid invoice
//! - `build_checkout_url` - signed gateway redirect for an unpaid invoice
//! - `get_invoice` - an invoice and its ledger record
//! - `settle_invoice` - direct settlement (front desk, admin)
//! - `handle_gateway_return` - browser return from the gateway
//! - `handle_gateway_notify` - server-to-server IPN confirmation
//! - `list_packages` - sellable package catalog
//! - `list_payments` - a member's payment history

mod build_checkout_url;
mod create_purchase;
mod get_invoice;
mod handle_gateway_notify;
mod handle_gateway_return;
mod list_packages;
mod list_payments;
mod settle_invoice;

pub use build_checkout_url::{BuildCheckoutUrlCommand, BuildCheckoutUrlHandler};
pub use create_purchase::{CreatePurchaseCommand, CreatePurchaseHandler, CreatePurchaseResult};
pub use get_invoice::{GetInvoiceHandler, GetInvoiceQuery, InvoiceStatus};
pub use handle_gateway_notify::{HandleGatewayNotifyCommand, HandleGatewayNotifyHandler};
pub use handle_gateway_return::{
    HandleGatewayReturnCommand, HandleGatewayReturnHandler, ReturnOutcome,
};
pub use list_packages::ListPackagesHandler;
pub use list_payments::{ListPaymentsHandler, ListPaymentsQuery};
pub use settle_invoice::{SettleInvoiceCommand, SettleInvoiceHandler};
