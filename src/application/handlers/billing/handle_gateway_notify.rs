//! HandleGatewayNotifyHandler - Command handler for the server-to-server
//! payment notification (IPN).
//!
//! The IPN is the channel of record: the gateway retries it until we answer
//! `00`, so every path through this handler maps to one of the gateway's
//! fixed reply codes and the handler itself never fails. Checks run in a
//! fixed order - signature, invoice existence, amount, duplicate, response
//! code - and the first failure decides the reply.

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::domain::billing::{BillingError, PaymentMethod, SettlementOutcome};
use crate::domain::vnpay::{GatewayCallback, NotifyStatus, ParamSet, VnpaySigner};
use crate::ports::{BillingStore, SettlementNotifier};

/// Command carrying the decoded IPN query parameters.
#[derive(Debug, Clone)]
pub struct HandleGatewayNotifyCommand {
    pub params: ParamSet,
}

/// Handler for the gateway IPN.
pub struct HandleGatewayNotifyHandler {
    store: Arc<dyn BillingStore>,
    signer: VnpaySigner,
    notifier: Arc<dyn SettlementNotifier>,
}

impl HandleGatewayNotifyHandler {
    pub fn new(
        store: Arc<dyn BillingStore>,
        signer: VnpaySigner,
        notifier: Arc<dyn SettlementNotifier>,
    ) -> Self {
        Self {
            store,
            signer,
            notifier,
        }
    }

    pub async fn handle(&self, cmd: HandleGatewayNotifyCommand) -> NotifyStatus {
        // 1. An empty query is not a callback at all
        if cmd.params.is_empty() {
            return NotifyStatus::InvalidRequest;
        }

        // 2. Signature before anything else
        if !self.signer.verify(&cmd.params) {
            warn!("gateway notify with invalid signature");
            return NotifyStatus::InvalidSignature;
        }

        let callback = GatewayCallback::new(cmd.params);

        // 3. The transaction reference must resolve to one of our invoices
        let invoice_id = match callback.invoice_id() {
            Some(id) => id,
            None => return NotifyStatus::OrderNotFound,
        };
        let invoice = match self.store.find_invoice(invoice_id).await {
            Ok(Some(invoice)) => invoice,
            Ok(None) => return NotifyStatus::OrderNotFound,
            Err(err) => {
                error!(invoice_id = %invoice_id, %err, "invoice lookup failed during notify");
                return NotifyStatus::InvalidRequest;
            }
        };

        // 4. The signed amount must equal the invoice total exactly
        let presented = match callback.amount() {
            Some(amount) => amount,
            None => return NotifyStatus::AmountMismatch,
        };
        if presented != invoice.total_amount {
            warn!(
                invoice_id = %invoice_id,
                expected = %invoice.total_amount,
                presented = %presented,
                "gateway notify amount mismatch"
            );
            return NotifyStatus::AmountMismatch;
        }

        // 5. Duplicate confirmation is acknowledged, not re-applied
        if invoice.paid {
            return NotifyStatus::AlreadyConfirmed;
        }

        // 6. Only a success response code settles
        if !callback.is_success() {
            info!(
                invoice_id = %invoice_id,
                code = callback.response_code().unwrap_or(""),
                "gateway notify reported failed payment"
            );
            return NotifyStatus::PaymentFailed;
        }

        // 7. Apply the settlement
        match self
            .store
            .settle_invoice(invoice_id, presented, PaymentMethod::Vnpay)
            .await
        {
            Ok(settlement) => match settlement.outcome {
                SettlementOutcome::Applied => {
                    info!(invoice_id = %invoice_id, "invoice settled via gateway notify");
                    self.notifier.settlement_confirmed(&settlement.invoice).await;
                    NotifyStatus::Confirmed
                }
                // A concurrent confirmation won the race between steps 5
                // and 7.
                SettlementOutcome::AlreadyPaid => NotifyStatus::AlreadyConfirmed,
            },
            Err(BillingError::AmountMismatch { .. }) => NotifyStatus::AmountMismatch,
            Err(BillingError::InvoiceNotFound(_)) => NotifyStatus::OrderNotFound,
            Err(err) => {
                error!(invoice_id = %invoice_id, %err, "settlement failed during notify");
                NotifyStatus::InvalidRequest
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::billing::{Invoice, PaymentRecord, Settlement};
    use crate::domain::foundation::{InvoiceId, MemberId, MembershipId, Money};
    use crate::domain::membership::Membership;
    use crate::domain::vnpay::{SECURE_HASH_PARAM, SECURE_HASH_TYPE, SECURE_HASH_TYPE_PARAM};
    use async_trait::async_trait;
    use hmac::{Hmac, Mac};
    use sha2::Sha512;
    use std::sync::Mutex;

    const TEST_SECRET: &str = "KMJYDQ929Y6E0EV5QFCCKAI35T7NI2NK";

    // ════════════════════════════════════════════════════════════════════════════
    // Mock Implementations
    // ════════════════════════════════════════════════════════════════════════════

    struct MockBillingStore {
        invoice: Mutex<Option<Invoice>>,
        ledger: Mutex<Vec<PaymentRecord>>,
    }

    impl MockBillingStore {
        fn with_invoice(invoice: Invoice) -> Self {
            Self {
                invoice: Mutex::new(Some(invoice)),
                ledger: Mutex::new(Vec::new()),
            }
        }

        fn ledger(&self) -> Vec<PaymentRecord> {
            self.ledger.lock().unwrap().clone()
        }

        fn invoice(&self) -> Option<Invoice> {
            self.invoice.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl BillingStore for MockBillingStore {
        async fn create_purchase(
            &self,
            _membership: &Membership,
            _invoice: &Invoice,
        ) -> Result<(), BillingError> {
            Ok(())
        }

        async fn find_invoice(&self, id: InvoiceId) -> Result<Option<Invoice>, BillingError> {
            Ok(self.invoice.lock().unwrap().clone().filter(|i| i.id == id))
        }

        async fn settle_invoice(
            &self,
            id: InvoiceId,
            presented: Money,
            method: PaymentMethod,
        ) -> Result<Settlement, BillingError> {
            let mut guard = self.invoice.lock().unwrap();
            let invoice = match guard.as_mut().filter(|i| i.id == id) {
                Some(invoice) => invoice,
                None => return Err(BillingError::InvoiceNotFound(id)),
            };
            let outcome = invoice.settle(presented)?;
            if outcome == SettlementOutcome::Applied {
                self.ledger
                    .lock()
                    .unwrap()
                    .push(PaymentRecord::new(id, presented, method));
            }
            Ok(Settlement {
                invoice: invoice.clone(),
                outcome,
            })
        }

        async fn payment_for_invoice(
            &self,
            invoice_id: InvoiceId,
        ) -> Result<Option<PaymentRecord>, BillingError> {
            Ok(self
                .ledger
                .lock()
                .unwrap()
                .iter()
                .find(|r| r.invoice_id == invoice_id)
                .cloned())
        }

        async fn payments_for_member(
            &self,
            _member_id: MemberId,
            _limit: Option<u32>,
        ) -> Result<Vec<PaymentRecord>, BillingError> {
            Ok(vec![])
        }
    }

    struct MockNotifier {
        notified: Mutex<Vec<InvoiceId>>,
    }

    impl MockNotifier {
        fn new() -> Self {
            Self {
                notified: Mutex::new(Vec::new()),
            }
        }

        fn notified(&self) -> Vec<InvoiceId> {
            self.notified.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl SettlementNotifier for MockNotifier {
        async fn settlement_confirmed(&self, invoice: &Invoice) {
            self.notified.lock().unwrap().push(invoice.id);
        }
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Test Helpers
    // ════════════════════════════════════════════════════════════════════════════

    fn signed_params(pairs: &[(&str, &str)]) -> ParamSet {
        let payload = ParamSet::from_pairs(pairs.iter().copied());
        let mut mac = Hmac::<Sha512>::new_from_slice(TEST_SECRET.as_bytes()).unwrap();
        mac.update(payload.canonical_query().as_bytes());
        let hash = hex::encode_upper(mac.finalize().into_bytes());

        let mut params = payload;
        params.insert(SECURE_HASH_TYPE_PARAM, SECURE_HASH_TYPE);
        params.insert(SECURE_HASH_PARAM, hash);
        params
    }

    fn unpaid_invoice() -> Invoice {
        Invoice::issue(MemberId::new(), MembershipId::new(), Money::vnd(500_000))
    }

    fn handler(
        store: Arc<MockBillingStore>,
        notifier: Arc<MockNotifier>,
    ) -> HandleGatewayNotifyHandler {
        HandleGatewayNotifyHandler::new(store, VnpaySigner::new(TEST_SECRET), notifier)
    }

    async fn notify(
        handler: &HandleGatewayNotifyHandler,
        params: ParamSet,
    ) -> NotifyStatus {
        handler
            .handle(HandleGatewayNotifyCommand { params })
            .await
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn confirms_valid_notification() {
        let invoice = unpaid_invoice();
        let store = Arc::new(MockBillingStore::with_invoice(invoice.clone()));
        let notifier = Arc::new(MockNotifier::new());
        let handler = handler(store.clone(), notifier.clone());

        let txn_ref = invoice.id.to_string();
        let status = notify(
            &handler,
            signed_params(&[
                ("vnp_Amount", "50000000"),
                ("vnp_ResponseCode", "00"),
                ("vnp_TxnRef", &txn_ref),
            ]),
        )
        .await;

        assert_eq!(status, NotifyStatus::Confirmed);
        assert_eq!(status.code(), "00");
        assert!(store.invoice().unwrap().paid);
        assert_eq!(store.ledger().len(), 1);
        assert_eq!(notifier.notified(), vec![invoice.id]);
    }

    #[tokio::test]
    async fn empty_request_replies_99() {
        let store = Arc::new(MockBillingStore::with_invoice(unpaid_invoice()));
        let notifier = Arc::new(MockNotifier::new());
        let handler = handler(store, notifier);

        let status = notify(&handler, ParamSet::new()).await;
        assert_eq!(status, NotifyStatus::InvalidRequest);
        assert_eq!(status.code(), "99");
    }

    #[tokio::test]
    async fn bad_signature_replies_97_before_any_lookup() {
        let invoice = unpaid_invoice();
        let store = Arc::new(MockBillingStore::with_invoice(invoice.clone()));
        let notifier = Arc::new(MockNotifier::new());
        let handler = handler(store.clone(), notifier);

        let txn_ref = invoice.id.to_string();
        let mut params = signed_params(&[
            ("vnp_Amount", "50000000"),
            ("vnp_ResponseCode", "00"),
            ("vnp_TxnRef", &txn_ref),
        ]);
        params.insert("vnp_Amount", "1");

        let status = notify(&handler, params).await;
        assert_eq!(status, NotifyStatus::InvalidSignature);
        assert_eq!(status.code(), "97");
        assert!(!store.invoice().unwrap().paid);
    }

    #[tokio::test]
    async fn unknown_order_replies_01() {
        let store = Arc::new(MockBillingStore::with_invoice(unpaid_invoice()));
        let notifier = Arc::new(MockNotifier::new());
        let handler = handler(store, notifier);

        let missing = InvoiceId::new().to_string();
        let status = notify(
            &handler,
            signed_params(&[
                ("vnp_Amount", "50000000"),
                ("vnp_ResponseCode", "00"),
                ("vnp_TxnRef", &missing),
            ]),
        )
        .await;

        assert_eq!(status, NotifyStatus::OrderNotFound);
        assert_eq!(status.code(), "01");
    }

    #[tokio::test]
    async fn wrong_amount_replies_04_and_settles_nothing() {
        let invoice = unpaid_invoice();
        let store = Arc::new(MockBillingStore::with_invoice(invoice.clone()));
        let notifier = Arc::new(MockNotifier::new());
        let handler = handler(store.clone(), notifier.clone());

        // Invoice total is 500_000 VND; the gateway presents 490_000.
        let txn_ref = invoice.id.to_string();
        let status = notify(
            &handler,
            signed_params(&[
                ("vnp_Amount", "49000000"),
                ("vnp_ResponseCode", "00"),
                ("vnp_TxnRef", &txn_ref),
            ]),
        )
        .await;

        assert_eq!(status, NotifyStatus::AmountMismatch);
        assert_eq!(status.code(), "04");
        assert!(!store.invoice().unwrap().paid);
        assert!(store.ledger().is_empty());
        assert!(notifier.notified().is_empty());
    }

    #[tokio::test]
    async fn duplicate_notification_replies_02_without_second_ledger_row() {
        let invoice = unpaid_invoice();
        let store = Arc::new(MockBillingStore::with_invoice(invoice.clone()));
        let notifier = Arc::new(MockNotifier::new());
        let handler = handler(store.clone(), notifier.clone());

        let txn_ref = invoice.id.to_string();
        let params = signed_params(&[
            ("vnp_Amount", "50000000"),
            ("vnp_ResponseCode", "00"),
            ("vnp_TxnRef", &txn_ref),
        ]);

        let first = notify(&handler, params.clone()).await;
        let second = notify(&handler, params).await;

        assert_eq!(first, NotifyStatus::Confirmed);
        assert_eq!(second, NotifyStatus::AlreadyConfirmed);
        assert_eq!(second.code(), "02");
        assert_eq!(store.ledger().len(), 1);
        assert_eq!(notifier.notified().len(), 1);
    }

    #[tokio::test]
    async fn failed_payment_replies_01_and_leaves_invoice_open() {
        let invoice = unpaid_invoice();
        let store = Arc::new(MockBillingStore::with_invoice(invoice.clone()));
        let notifier = Arc::new(MockNotifier::new());
        let handler = handler(store.clone(), notifier.clone());

        let txn_ref = invoice.id.to_string();
        let status = notify(
            &handler,
            signed_params(&[
                ("vnp_Amount", "50000000"),
                ("vnp_ResponseCode", "24"),
                ("vnp_TxnRef", &txn_ref),
            ]),
        )
        .await;

        assert_eq!(status, NotifyStatus::PaymentFailed);
        assert_eq!(status.code(), "01");
        // The invoice stays open so the member can retry checkout.
        assert!(!store.invoice().unwrap().paid);
        assert!(notifier.notified().is_empty());
    }

    #[tokio::test]
    async fn amount_check_runs_before_duplicate_check() {
        // A paid invoice with a wrong amount replies 04, not 02.
        let mut invoice = unpaid_invoice();
        invoice.settle(Money::vnd(500_000)).unwrap();
        let store = Arc::new(MockBillingStore::with_invoice(invoice.clone()));
        let notifier = Arc::new(MockNotifier::new());
        let handler = handler(store, notifier);

        let txn_ref = invoice.id.to_string();
        let status = notify(
            &handler,
            signed_params(&[
                ("vnp_Amount", "49000000"),
                ("vnp_ResponseCode", "00"),
                ("vnp_TxnRef", &txn_ref),
            ]),
        )
        .await;

        assert_eq!(status, NotifyStatus::AmountMismatch);
    }
}
