//! CreatePurchaseHandler - Command handler for selling a membership package.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};

use crate::domain::billing::{BillingError, Invoice};
use crate::domain::foundation::{MemberId, PackageId};
use crate::domain::membership::Membership;
use crate::ports::{BillingStore, MembershipReader, PackageCatalog};

/// Command to sell a package to a member.
#[derive(Debug, Clone)]
pub struct CreatePurchaseCommand {
    pub member_id: MemberId,
    pub package_id: PackageId,
    /// Start of the entitlement window. `None` means today; admins may set
    /// an explicit date when registering a walk-in purchase.
    pub start_date: Option<NaiveDate>,
}

/// Result of a successful purchase: the inactive membership and its unpaid
/// invoice, persisted together.
#[derive(Debug, Clone)]
pub struct CreatePurchaseResult {
    pub membership: Membership,
    pub invoice: Invoice,
}

/// Handler for creating a purchase.
///
/// The membership comes into existence inactive and the invoice unpaid;
/// settlement of the invoice is what activates the membership.
pub struct CreatePurchaseHandler {
    reader: Arc<dyn MembershipReader>,
    catalog: Arc<dyn PackageCatalog>,
    store: Arc<dyn BillingStore>,
}

impl CreatePurchaseHandler {
    pub fn new(
        reader: Arc<dyn MembershipReader>,
        catalog: Arc<dyn PackageCatalog>,
        store: Arc<dyn BillingStore>,
    ) -> Self {
        Self {
            reader,
            catalog,
            store,
        }
    }

    pub async fn handle(
        &self,
        cmd: CreatePurchaseCommand,
    ) -> Result<CreatePurchaseResult, BillingError> {
        let today = Utc::now().date_naive();
        let start_date = cmd.start_date.unwrap_or(today);

        // 1. A member with an active, unexpired membership cannot buy another
        if let Some(current) = self.reader.current_for_member(cmd.member_id, today).await? {
            return Err(BillingError::ActiveMembershipExists {
                until: current.end_date,
            });
        }

        // 2. Only active packages are sellable
        let package = self
            .catalog
            .active_package(cmd.package_id)
            .await?
            .ok_or(BillingError::PackageUnavailable(cmd.package_id))?;

        // 3. Derive the membership window and price the invoice
        let membership = Membership::for_package(cmd.member_id, &package, start_date);
        let invoice = Invoice::issue(cmd.member_id, membership.id, package.price);

        // 4. Persist both in one transaction
        self.store.create_purchase(&membership, &invoice).await?;

        Ok(CreatePurchaseResult {
            membership,
            invoice,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::billing::{PaymentMethod, PaymentRecord, Settlement};
    use crate::domain::foundation::{InvoiceId, Money};
    use crate::domain::membership::MembershipPackage;
    use async_trait::async_trait;
    use std::sync::Mutex;

    // ════════════════════════════════════════════════════════════════════════════
    // Mock Implementations
    // ════════════════════════════════════════════════════════════════════════════

    struct MockMembershipReader {
        current: Option<Membership>,
    }

    #[async_trait]
    impl MembershipReader for MockMembershipReader {
        async fn current_for_member(
            &self,
            _member_id: MemberId,
            _today: NaiveDate,
        ) -> Result<Option<Membership>, BillingError> {
            Ok(self.current.clone())
        }
    }

    struct MockPackageCatalog {
        package: Option<MembershipPackage>,
    }

    #[async_trait]
    impl PackageCatalog for MockPackageCatalog {
        async fn active_package(
            &self,
            _id: PackageId,
        ) -> Result<Option<MembershipPackage>, BillingError> {
            Ok(self.package.clone())
        }

        async fn list_active(&self) -> Result<Vec<MembershipPackage>, BillingError> {
            Ok(self.package.clone().into_iter().collect())
        }
    }

    struct MockBillingStore {
        purchases: Mutex<Vec<(Membership, Invoice)>>,
        fail_create: bool,
    }

    impl MockBillingStore {
        fn new() -> Self {
            Self {
                purchases: Mutex::new(Vec::new()),
                fail_create: false,
            }
        }

        fn failing() -> Self {
            Self {
                purchases: Mutex::new(Vec::new()),
                fail_create: true,
            }
        }

        fn purchases(&self) -> Vec<(Membership, Invoice)> {
            self.purchases.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl BillingStore for MockBillingStore {
        async fn create_purchase(
            &self,
            membership: &Membership,
            invoice: &Invoice,
        ) -> Result<(), BillingError> {
            if self.fail_create {
                return Err(BillingError::infrastructure("simulated write failure"));
            }
            self.purchases
                .lock()
                .unwrap()
                .push((membership.clone(), invoice.clone()));
            Ok(())
        }

        async fn find_invoice(&self, _id: InvoiceId) -> Result<Option<Invoice>, BillingError> {
            Ok(None)
        }

        async fn settle_invoice(
            &self,
            id: InvoiceId,
            _presented: Money,
            _method: PaymentMethod,
        ) -> Result<Settlement, BillingError> {
            Err(BillingError::InvoiceNotFound(id))
        }

        async fn payment_for_invoice(
            &self,
            _invoice_id: InvoiceId,
        ) -> Result<Option<PaymentRecord>, BillingError> {
            Ok(None)
        }

        async fn payments_for_member(
            &self,
            _member_id: MemberId,
            _limit: Option<u32>,
        ) -> Result<Vec<PaymentRecord>, BillingError> {
            Ok(vec![])
        }
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Test Helpers
    // ════════════════════════════════════════════════════════════════════════════

    fn one_month_package() -> MembershipPackage {
        MembershipPackage::new("GÓI 1 THÁNG", 1, Money::vnd(500_000))
    }

    fn handler_with(
        current: Option<Membership>,
        package: Option<MembershipPackage>,
        store: Arc<MockBillingStore>,
    ) -> CreatePurchaseHandler {
        CreatePurchaseHandler::new(
            Arc::new(MockMembershipReader { current }),
            Arc::new(MockPackageCatalog { package }),
            store,
        )
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Success Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn creates_inactive_membership_and_unpaid_invoice() {
        let store = Arc::new(MockBillingStore::new());
        let package = one_month_package();
        let handler = handler_with(None, Some(package.clone()), store.clone());

        let result = handler
            .handle(CreatePurchaseCommand {
                member_id: MemberId::new(),
                package_id: package.id,
                start_date: None,
            })
            .await
            .unwrap();

        assert!(!result.membership.active);
        assert!(!result.invoice.paid);
        assert_eq!(result.invoice.membership_id, result.membership.id);
        assert_eq!(result.invoice.total_amount, Money::vnd(500_000));
        assert_eq!(store.purchases().len(), 1);
    }

    #[tokio::test]
    async fn explicit_start_date_drives_the_window() {
        let store = Arc::new(MockBillingStore::new());
        let package = one_month_package();
        let handler = handler_with(None, Some(package.clone()), store);

        let start = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        let result = handler
            .handle(CreatePurchaseCommand {
                member_id: MemberId::new(),
                package_id: package.id,
                start_date: Some(start),
            })
            .await
            .unwrap();

        assert_eq!(result.membership.start_date, start);
        assert_eq!(
            result.membership.end_date,
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
        );
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Failure Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn rejects_member_with_active_membership() {
        let store = Arc::new(MockBillingStore::new());
        let package = one_month_package();
        let mut current = Membership::for_package(
            MemberId::new(),
            &package,
            Utc::now().date_naive(),
        );
        current.activate();
        let until = current.end_date;

        let handler = handler_with(Some(current), Some(package.clone()), store.clone());
        let result = handler
            .handle(CreatePurchaseCommand {
                member_id: MemberId::new(),
                package_id: package.id,
                start_date: None,
            })
            .await;

        assert_eq!(
            result.unwrap_err(),
            BillingError::ActiveMembershipExists { until }
        );
        assert!(store.purchases().is_empty());
    }

    #[tokio::test]
    async fn rejects_unknown_or_retired_package() {
        let store = Arc::new(MockBillingStore::new());
        let handler = handler_with(None, None, store.clone());

        let package_id = PackageId::new();
        let result = handler
            .handle(CreatePurchaseCommand {
                member_id: MemberId::new(),
                package_id,
                start_date: None,
            })
            .await;

        assert_eq!(
            result.unwrap_err(),
            BillingError::PackageUnavailable(package_id)
        );
        assert!(store.purchases().is_empty());
    }

    #[tokio::test]
    async fn propagates_store_failure() {
        let store = Arc::new(MockBillingStore::failing());
        let package = one_month_package();
        let handler = handler_with(None, Some(package.clone()), store);

        let result = handler
            .handle(CreatePurchaseCommand {
                member_id: MemberId::new(),
                package_id: package.id,
                start_date: None,
            })
            .await;

        assert!(matches!(result, Err(BillingError::Infrastructure(_))));
    }
}
