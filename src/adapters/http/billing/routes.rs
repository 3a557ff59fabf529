//! Axum router configuration for billing endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{
    checkout_url, create_purchase, invoice_status, list_packages, member_payments,
    settle_invoice, vnpay_ipn, vnpay_return, BillingAppState,
};

/// Create the billing API router.
///
/// # Routes
///
/// - `GET /packages` - List sellable packages
/// - `POST /purchases` - Sell a package (membership + unpaid invoice)
/// - `GET /invoices/:id` - Invoice status with its payment, if settled
/// - `GET /invoices/:id/checkout-url` - Signed gateway redirect
/// - `POST /invoices/:id/settle` - Direct settlement (front desk / admin)
/// - `GET /members/:id/payments` - A member's payment history
pub fn billing_routes() -> Router<BillingAppState> {
    Router::new()
        .route("/packages", get(list_packages))
        .route("/purchases", post(create_purchase))
        .route("/invoices/:id", get(invoice_status))
        .route("/invoices/:id/checkout-url", get(checkout_url))
        .route("/invoices/:id/settle", post(settle_invoice))
        .route("/members/:id/payments", get(member_payments))
}

/// Create the gateway callback router.
///
/// Separate from the billing routes because callbacks carry no user
/// authentication; they are verified by signature.
///
/// # Routes
///
/// - `GET /vnpay-return` - Browser redirect back from the gateway
/// - `GET /vnpay-ipn` - Server-to-server payment notification
pub fn payment_routes() -> Router<BillingAppState> {
    Router::new()
        .route("/vnpay-return", get(vnpay_return))
        .route("/vnpay-ipn", get(vnpay_ipn))
}

/// Create the complete billing module router, suitable for mounting at
/// the API root.
pub fn billing_router() -> Router<BillingAppState> {
    Router::new()
        .merge(billing_routes())
        .nest("/payment", payment_routes())
}
