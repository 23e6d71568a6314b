use crate::domain::item::{Item, ItemId, Payment, RefundRecord, RefundStatus};
use crate::domain::money::Money;
use crate::domain::policy;
use crate::domain::ports::ItemStoreBox;
use crate::error::{RefundError, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;
use tracing::{info, warn};
use uuid::Uuid;

/// Tunables for the refund write path.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Simulated payment-gateway round-trip latency awaited before a refund
    /// is recorded.
    pub gateway_delay: Duration,
    /// When enabled, a refund attempt on an item with no payment on file
    /// backfills a simulated paid payment record instead of being rejected.
    pub allow_payment_backfill: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            gateway_delay: Duration::from_secs(1),
            allow_payment_backfill: true,
        }
    }
}

/// Wire-level view of a refund, returned to API clients.
#[derive(Debug, Serialize, PartialEq, Clone)]
pub struct RefundReceipt {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<Money>,
    pub currency: String,
    pub status: RefundStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
}

impl RefundReceipt {
    fn from_record(record: &RefundRecord) -> Self {
        Self {
            id: record.refund_id.clone(),
            amount: (record.status == RefundStatus::Processed).then_some(record.amount),
            currency: "USD".to_string(),
            status: record.status,
            processed_at: record.processed_at,
            failure_reason: record.failure_reason.clone(),
        }
    }
}

#[derive(Debug, Serialize, PartialEq, Clone)]
pub struct RefundResult {
    pub success: bool,
    pub refund: RefundReceipt,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Response of the cancellation flow.
#[derive(Debug, Serialize, PartialEq, Clone)]
pub struct CancellationOutcome {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refund: Option<RefundResult>,
}

/// Refund eligibility, amount computation and the refund write path.
///
/// All policy evaluation is pure; the only effectful operation is
/// `process_refund`, which awaits the simulated gateway and persists the
/// outcome through the item store.
pub struct RefundEngine {
    store: ItemStoreBox,
    config: EngineConfig,
}

impl RefundEngine {
    pub fn new(store: ItemStoreBox) -> Self {
        Self::with_config(store, EngineConfig::default())
    }

    pub fn with_config(store: ItemStoreBox, config: EngineConfig) -> Self {
        Self { store, config }
    }

    /// Refundable amount for `item` under the applicable policy table,
    /// evaluated at `as_of`.
    pub fn compute_refund_amount(&self, item: &Item, as_of: DateTime<Utc>) -> Money {
        policy::compute_refund_amount(item, as_of)
    }

    /// The eligibility gate callers must pass before attempting a refund.
    ///
    /// An item whose policy yields exactly 0 is not allowed, as distinct from
    /// "allowed refund of $0".
    pub fn is_refund_allowed(&self, item: &Item) -> bool {
        self.is_refund_allowed_for(item, policy::compute_refund_amount(item, Utc::now()))
    }

    /// Eligibility against an amount captured earlier, for flows that compute
    /// the amount before mutating the item's status.
    pub fn is_refund_allowed_for(&self, item: &Item, amount: Money) -> bool {
        if item.refund.status == RefundStatus::Processed {
            return false;
        }
        match &item.payment {
            None => false,
            Some(payment) if !payment.paid => false,
            Some(_) => !amount.is_zero(),
        }
    }

    /// Records a refund on `item` and persists it.
    ///
    /// Does not itself run the eligibility gate; callers check
    /// `is_refund_allowed` first. At-most-once is still guaranteed by the
    /// store's conditional commit: a call racing a committed refund returns a
    /// clean `success: false` no-op with the committed state loaded back into
    /// `item`.
    pub async fn process_refund(
        &self,
        item: &mut Item,
        reason: &str,
        explicit_amount: Option<Money>,
    ) -> Result<RefundResult> {
        if item.payment.is_none() {
            if !self.config.allow_payment_backfill {
                return Err(RefundError::NoPaymentOnFile(item.id));
            }
            item.payment = Some(Payment::simulated(item.created_at));
        }

        // A refund can never exceed the full price paid. Policy-computed
        // amounts hold this by construction; explicit amounts must not bypass it.
        if let Some(explicit) = explicit_amount
            && explicit > item.total
        {
            return Err(RefundError::ValidationError(format!(
                "Refund amount {} exceeds item total {}",
                explicit, item.total
            )));
        }
        let amount =
            explicit_amount.unwrap_or_else(|| policy::compute_refund_amount(item, Utc::now()));

        // Simulated gateway round trip. Other in-flight items are unaffected.
        tokio::time::sleep(self.config.gateway_delay).await;

        let refund_id = format!("re_{}", Uuid::new_v4().simple());
        item.refund = RefundRecord::processed(
            amount,
            refund_id,
            reason.to_string(),
            Utc::now(),
        );

        match self.store.commit_unless_refunded(item.clone()).await {
            Ok(true) => {
                info!(item = item.id, amount = %amount, "refund processed");
                Ok(RefundResult {
                    success: true,
                    refund: RefundReceipt::from_record(&item.refund),
                    error: None,
                })
            }
            Ok(false) => {
                // Lost the race against an already-committed refund.
                if let Some(committed) = self.store.load(item.id).await? {
                    *item = committed;
                }
                warn!(item = item.id, "refund skipped, already processed");
                Ok(RefundResult {
                    success: false,
                    refund: RefundReceipt::from_record(&item.refund),
                    error: Some("refund already processed".to_string()),
                })
            }
            Err(err) => self.record_failure(item, reason, err).await,
        }
    }

    /// Downgrades a storage error on the success path to a recorded failed
    /// refund. A second storage failure here leaves the refund state unknown
    /// and is surfaced as a terminal error rather than a raw storage fault.
    async fn record_failure(
        &self,
        item: &mut Item,
        reason: &str,
        err: RefundError,
    ) -> Result<RefundResult> {
        let failure = err.to_string();
        warn!(item = item.id, error = %failure, "refund persistence failed");
        item.refund = RefundRecord::failed(reason.to_string(), failure.clone(), Utc::now());

        match self.store.save(item.clone()).await {
            Ok(()) => Ok(RefundResult {
                success: false,
                refund: RefundReceipt::from_record(&item.refund),
                error: Some(failure),
            }),
            Err(second) => Err(RefundError::RefundStateUnknown {
                item: item.id,
                source_message: second.to_string(),
            }),
        }
    }

    /// The cancellation flow: transitions the item to cancelled and, when the
    /// eligibility gate passes, processes the refund.
    ///
    /// The refund amount is computed and captured under the status in force
    /// *before* the cancellation, then passed explicitly into
    /// `process_refund`. Evaluating after the mutation would send every order
    /// into the cancelled row of the policy table (0%).
    pub async fn cancel(&self, id: ItemId, reason: Option<&str>) -> Result<CancellationOutcome> {
        let mut item = self
            .store
            .load(id)
            .await?
            .ok_or(RefundError::ItemNotFound(id))?;

        let amount = policy::compute_refund_amount(&item, Utc::now());
        item.cancel()?;
        if !self.store.commit_unless_refunded(item.clone()).await? {
            // A concurrent request already committed a refund for this item;
            // writing the cancelled status now would clobber it.
            let committed = self
                .store
                .load(id)
                .await?
                .ok_or(RefundError::ItemNotFound(id))?;
            warn!(item = id, "cancellation raced an already-processed refund");
            return Ok(CancellationOutcome {
                message: "already cancelled and refunded".to_string(),
                refund: Some(RefundResult {
                    success: false,
                    refund: RefundReceipt::from_record(&committed.refund),
                    error: Some("refund already processed".to_string()),
                }),
            });
        }

        if !self.is_refund_allowed_for(&item, amount) {
            info!(item = id, "cancelled without refund");
            return Ok(CancellationOutcome {
                message: "cancelled without refund".to_string(),
                refund: None,
            });
        }

        let reason = reason.unwrap_or("requested_by_customer");
        let result = self.process_refund(&mut item, reason, Some(amount)).await?;
        let message = if result.success {
            "cancelled with refund"
        } else {
            "cancelled, refund failed"
        };
        Ok(CancellationOutcome {
            message: message.to_string(),
            refund: Some(result),
        })
    }

    /// Pure lookup of the policy table for display.
    pub fn refund_policy(&self, kind: policy::PolicyKind) -> policy::RefundPolicy {
        policy::refund_policy(kind)
    }
}
