//! HTTP handlers for billing endpoints.
//!
//! These handlers connect Axum routes to application layer command/query
//! handlers. The gateway callback endpoints deserve a note: the IPN always
//! answers 200 with the gateway's `{RspCode, Message}` vocabulary, because
//! the gateway treats anything else as a delivery failure and retries.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Json, Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use uuid::Uuid;

use crate::application::handlers::billing::{
    BuildCheckoutUrlCommand, BuildCheckoutUrlHandler, CreatePurchaseCommand,
    CreatePurchaseHandler, GetInvoiceHandler, GetInvoiceQuery, HandleGatewayNotifyCommand,
    HandleGatewayNotifyHandler, HandleGatewayReturnCommand, HandleGatewayReturnHandler,
    ListPackagesHandler, ListPaymentsHandler, ListPaymentsQuery, ReturnOutcome,
    SettleInvoiceCommand, SettleInvoiceHandler,
};
use crate::config::VnpayConfig;
use crate::domain::billing::{BillingError, PaymentMethod};
use crate::domain::foundation::{InvoiceId, MemberId, Money};
use crate::domain::vnpay::{ParamSet, VnpaySigner};
use crate::ports::{BillingStore, MembershipReader, PackageCatalog, SettlementNotifier};

use super::dto::{
    CheckoutResponse, ErrorResponse, InvoiceStatusResponse, PackageResponse,
    PaymentHistoryQuery, PaymentResponse, PurchaseRequest, PurchaseResponse, ReturnResponse,
    SettleRequest, SettlementResponse,
};

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared application state containing all billing dependencies.
///
/// Cloned per request; everything heavyweight is behind an `Arc`.
#[derive(Clone)]
pub struct BillingAppState {
    pub store: Arc<dyn BillingStore>,
    pub reader: Arc<dyn MembershipReader>,
    pub catalog: Arc<dyn PackageCatalog>,
    pub notifier: Arc<dyn SettlementNotifier>,
    pub signer: VnpaySigner,
    pub tmn_code: String,
    pub gateway_url: String,
    pub return_url: String,
}

impl BillingAppState {
    pub fn new(
        store: Arc<dyn BillingStore>,
        reader: Arc<dyn MembershipReader>,
        catalog: Arc<dyn PackageCatalog>,
        notifier: Arc<dyn SettlementNotifier>,
        vnpay: &VnpayConfig,
    ) -> Self {
        Self {
            store,
            reader,
            catalog,
            notifier,
            signer: VnpaySigner::new(vnpay.hash_secret()),
            tmn_code: vnpay.tmn_code.clone(),
            gateway_url: vnpay.gateway_url.clone(),
            return_url: vnpay.return_url.clone(),
        }
    }

    /// Create handlers on demand from the shared state.
    pub fn create_purchase_handler(&self) -> CreatePurchaseHandler {
        CreatePurchaseHandler::new(self.reader.clone(), self.catalog.clone(), self.store.clone())
    }

    pub fn checkout_url_handler(&self) -> BuildCheckoutUrlHandler {
        BuildCheckoutUrlHandler::new(
            self.store.clone(),
            self.signer.clone(),
            self.tmn_code.clone(),
            self.gateway_url.clone(),
            self.return_url.clone(),
        )
    }

    pub fn get_invoice_handler(&self) -> GetInvoiceHandler {
        GetInvoiceHandler::new(self.store.clone())
    }

    pub fn settle_invoice_handler(&self) -> SettleInvoiceHandler {
        SettleInvoiceHandler::new(self.store.clone(), self.notifier.clone())
    }

    pub fn gateway_return_handler(&self) -> HandleGatewayReturnHandler {
        HandleGatewayReturnHandler::new(
            self.store.clone(),
            self.signer.clone(),
            self.notifier.clone(),
        )
    }

    pub fn gateway_notify_handler(&self) -> HandleGatewayNotifyHandler {
        HandleGatewayNotifyHandler::new(
            self.store.clone(),
            self.signer.clone(),
            self.notifier.clone(),
        )
    }

    pub fn list_packages_handler(&self) -> ListPackagesHandler {
        ListPackagesHandler::new(self.catalog.clone())
    }

    pub fn list_payments_handler(&self) -> ListPaymentsHandler {
        ListPaymentsHandler::new(self.store.clone())
    }
}

fn client_ip(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|ip| ip.trim().to_string())
        .unwrap_or_else(|| "127.0.0.1".to_string())
}

// ════════════════════════════════════════════════════════════════════════════════
// Query Handlers (GET endpoints)
// ════════════════════════════════════════════════════════════════════════════════

/// GET /api/packages - List sellable packages
pub async fn list_packages(
    State(state): State<BillingAppState>,
) -> Result<impl IntoResponse, BillingApiError> {
    let packages = state.list_packages_handler().handle().await?;
    let response: Vec<PackageResponse> = packages.into_iter().map(PackageResponse::from).collect();
    Ok(Json(response))
}

/// GET /api/members/{id}/payments - A member's payment history
pub async fn member_payments(
    State(state): State<BillingAppState>,
    Path(member_id): Path<Uuid>,
    Query(query): Query<PaymentHistoryQuery>,
) -> Result<impl IntoResponse, BillingApiError> {
    let handler = state.list_payments_handler();
    let records = handler
        .handle(ListPaymentsQuery {
            member_id: MemberId::from_uuid(member_id),
            limit: query.limit,
        })
        .await?;

    let response: Vec<PaymentResponse> = records.into_iter().map(PaymentResponse::from).collect();
    Ok(Json(response))
}

/// GET /api/invoices/{id} - An invoice and its payment, if settled
pub async fn invoice_status(
    State(state): State<BillingAppState>,
    Path(invoice_id): Path<Uuid>,
) -> Result<impl IntoResponse, BillingApiError> {
    let handler = state.get_invoice_handler();
    let status = handler
        .handle(GetInvoiceQuery {
            invoice_id: InvoiceId::from_uuid(invoice_id),
        })
        .await?;

    Ok(Json(InvoiceStatusResponse {
        invoice: status.invoice.into(),
        payment: status.payment.map(PaymentResponse::from),
    }))
}

/// GET /api/invoices/{id}/checkout-url - Signed gateway redirect for an
/// unpaid invoice
pub async fn checkout_url(
    State(state): State<BillingAppState>,
    Path(invoice_id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, BillingApiError> {
    let handler = state.checkout_url_handler();
    let url = handler
        .handle(BuildCheckoutUrlCommand {
            invoice_id: InvoiceId::from_uuid(invoice_id),
            client_ip: client_ip(&headers),
            order_info: None,
        })
        .await?;

    Ok(Json(CheckoutResponse { checkout_url: url }))
}

// ════════════════════════════════════════════════════════════════════════════════
// Command Handlers (POST endpoints)
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/purchases - Sell a package: membership plus unpaid invoice
pub async fn create_purchase(
    State(state): State<BillingAppState>,
    Json(request): Json<PurchaseRequest>,
) -> Result<impl IntoResponse, BillingApiError> {
    let handler = state.create_purchase_handler();
    let result = handler
        .handle(CreatePurchaseCommand {
            member_id: request.member_id,
            package_id: request.package_id,
            start_date: request.start_date,
        })
        .await?;

    let response = PurchaseResponse {
        membership: result.membership.into(),
        invoice: result.invoice.into(),
    };
    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /api/invoices/{id}/settle - Direct settlement (front desk / admin)
pub async fn settle_invoice(
    State(state): State<BillingAppState>,
    Path(invoice_id): Path<Uuid>,
    Json(request): Json<SettleRequest>,
) -> Result<impl IntoResponse, BillingApiError> {
    let handler = state.settle_invoice_handler();
    let settlement = handler
        .handle(SettleInvoiceCommand {
            invoice_id: InvoiceId::from_uuid(invoice_id),
            amount: request.amount.map(Money::vnd),
            method: request.method.unwrap_or(PaymentMethod::Cash),
        })
        .await?;

    Ok(Json(SettlementResponse::new(
        settlement.invoice,
        settlement.outcome,
    )))
}

// ════════════════════════════════════════════════════════════════════════════════
// Gateway Callback Handlers (no auth, signature verified)
// ════════════════════════════════════════════════════════════════════════════════

/// GET /payment/vnpay-return - Browser redirect back from the gateway
pub async fn vnpay_return(
    State(state): State<BillingAppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, BillingApiError> {
    let handler = state.gateway_return_handler();
    let outcome = handler
        .handle(HandleGatewayReturnCommand {
            params: ParamSet::from_pairs(params),
        })
        .await?;

    let response = match outcome {
        ReturnOutcome::Confirmed(invoice) => ReturnResponse {
            status: "CONFIRMED",
            message: "Thanh toán thành công".to_string(),
            invoice: Some(invoice.into()),
        },
        ReturnOutcome::AlreadyConfirmed(invoice) => ReturnResponse {
            status: "ALREADY_CONFIRMED",
            message: "Hóa đơn đã được thanh toán trước đó".to_string(),
            invoice: Some(invoice.into()),
        },
        ReturnOutcome::PaymentFailed { response_code } => ReturnResponse {
            status: "PAYMENT_FAILED",
            message: format!("Thanh toán không thành công (mã {response_code})"),
            invoice: None,
        },
        ReturnOutcome::SignatureInvalid => ReturnResponse {
            status: "SIGNATURE_INVALID",
            message: "Chữ ký không hợp lệ".to_string(),
            invoice: None,
        },
        ReturnOutcome::UnknownInvoice => ReturnResponse {
            status: "UNKNOWN_INVOICE",
            message: "Không tìm thấy hóa đơn".to_string(),
            invoice: None,
        },
    };

    Ok(Json(response))
}

/// GET /payment/vnpay-ipn - Server-to-server payment notification
///
/// Always 200; the reply body carries the gateway's own result codes.
pub async fn vnpay_ipn(
    State(state): State<BillingAppState>,
    Query(params): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    let handler = state.gateway_notify_handler();
    let status = handler
        .handle(HandleGatewayNotifyCommand {
            params: ParamSet::from_pairs(params),
        })
        .await;

    Json(status.reply())
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error type that converts billing errors to HTTP responses.
pub struct BillingApiError(BillingError);

impl From<BillingError> for BillingApiError {
    fn from(err: BillingError) -> Self {
        Self(err)
    }
}

impl IntoResponse for BillingApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, code) = match &self.0 {
            BillingError::InvoiceNotFound(_) => (StatusCode::NOT_FOUND, "INVOICE_NOT_FOUND"),
            BillingError::PackageUnavailable(_) => {
                (StatusCode::NOT_FOUND, "PACKAGE_UNAVAILABLE")
            }
            BillingError::AmountMismatch { .. } => (StatusCode::CONFLICT, "AMOUNT_MISMATCH"),
            BillingError::ActiveMembershipExists { .. } => {
                (StatusCode::CONFLICT, "ACTIVE_MEMBERSHIP_EXISTS")
            }
            BillingError::SignatureInvalid => (StatusCode::UNAUTHORIZED, "SIGNATURE_INVALID"),
            BillingError::ValidationFailed(_) => (StatusCode::BAD_REQUEST, "VALIDATION_FAILED"),
            BillingError::Infrastructure(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
        };

        let body = ErrorResponse::new(code, self.0.to_string());
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_ip_prefers_first_forwarded_address() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            "203.0.113.7, 10.0.0.1".parse().unwrap(),
        );
        assert_eq!(client_ip(&headers), "203.0.113.7");
    }

    #[test]
    fn client_ip_falls_back_to_loopback() {
        assert_eq!(client_ip(&HeaderMap::new()), "127.0.0.1");
    }

    #[test]
    fn amount_mismatch_maps_to_conflict() {
        let err = BillingApiError(BillingError::AmountMismatch {
            expected: Money::vnd(500_000),
            presented: Money::vnd(490_000),
        });
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn infrastructure_maps_to_internal_error() {
        let err = BillingApiError(BillingError::infrastructure("db down"));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
