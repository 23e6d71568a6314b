use super::money::Money;
use crate::error::RefundError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type ItemId = u64;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(Self::Pending),
            "processing" => Some(Self::Processing),
            "shipped" => Some(Self::Shipped),
            "delivered" => Some(Self::Delivered),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Confirmed,
    Cancelled,
    Expired,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Confirmed => "confirmed",
            Self::Cancelled => "cancelled",
            Self::Expired => "expired",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "confirmed" => Some(Self::Confirmed),
            "cancelled" => Some(Self::Cancelled),
            "expired" => Some(Self::Expired),
            _ => None,
        }
    }
}

/// Explicit item kind, replacing any inference from which monetary field is
/// populated. Each variant carries its own lifecycle status.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ItemKind {
    Order { status: OrderStatus },
    Booking { status: BookingStatus },
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Payment {
    pub method: String,
    pub transaction_id: String,
    pub payment_intent_id: String,
    pub paid: bool,
    pub paid_at: DateTime<Utc>,
}

impl Payment {
    /// Builds the simulated always-succeeds payment record used in place of a
    /// real gateway integration.
    pub fn simulated(paid_at: DateTime<Utc>) -> Self {
        Self {
            method: "simulated".to_string(),
            transaction_id: format!("txn_{}", Uuid::new_v4().simple()),
            payment_intent_id: format!("pi_{}", Uuid::new_v4().simple()),
            paid: true,
            paid_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Default)]
#[serde(rename_all = "lowercase")]
pub enum RefundStatus {
    #[default]
    None,
    Processed,
    Failed,
}

impl RefundStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Processed => "processed",
            Self::Failed => "failed",
        }
    }
}

/// The engine's mutation target on an item. Starts as `none`/0 and moves to a
/// terminal `processed` or `failed` value exactly once per attempt.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Default)]
pub struct RefundRecord {
    pub status: RefundStatus,
    pub amount: Money,
    pub refund_id: Option<String>,
    pub reason: Option<String>,
    pub failure_reason: Option<String>,
    pub processed_at: Option<DateTime<Utc>>,
}

impl RefundRecord {
    pub fn processed(
        amount: Money,
        refund_id: String,
        reason: String,
        processed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            status: RefundStatus::Processed,
            amount,
            refund_id: Some(refund_id),
            reason: Some(reason),
            failure_reason: None,
            processed_at: Some(processed_at),
        }
    }

    pub fn failed(reason: String, failure_reason: String, processed_at: DateTime<Utc>) -> Self {
        Self {
            status: RefundStatus::Failed,
            amount: Money::ZERO,
            refund_id: None,
            reason: Some(reason),
            failure_reason: Some(failure_reason),
            processed_at: Some(processed_at),
        }
    }
}

/// A purchasable entity, either a merchandise order or a campground booking.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Item {
    pub id: ItemId,
    pub kind: ItemKind,
    /// The full price paid for the item.
    pub total: Money,
    /// Origin of the cancellation policy's elapsed-time computation.
    pub created_at: DateTime<Utc>,
    pub payment: Option<Payment>,
    pub refund: RefundRecord,
}

impl Item {
    pub fn order(id: ItemId, total: Money, status: OrderStatus, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            kind: ItemKind::Order { status },
            total,
            created_at,
            payment: None,
            refund: RefundRecord::default(),
        }
    }

    pub fn booking(
        id: ItemId,
        total: Money,
        status: BookingStatus,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            kind: ItemKind::Booking { status },
            total,
            created_at,
            payment: None,
            refund: RefundRecord::default(),
        }
    }

    pub fn with_payment(mut self, payment: Payment) -> Self {
        self.payment = Some(payment);
        self
    }

    /// Whether the item's lifecycle has ended; terminal items reject cancellation.
    pub fn is_terminal(&self) -> bool {
        match self.kind {
            ItemKind::Order { status } => {
                matches!(status, OrderStatus::Delivered | OrderStatus::Cancelled)
            }
            ItemKind::Booking { status } => {
                matches!(status, BookingStatus::Cancelled | BookingStatus::Expired)
            }
        }
    }

    pub fn status_str(&self) -> &'static str {
        match self.kind {
            ItemKind::Order { status } => status.as_str(),
            ItemKind::Booking { status } => status.as_str(),
        }
    }

    /// Transitions the item to cancelled from any non-terminal state.
    pub fn cancel(&mut self) -> Result<(), RefundError> {
        if self.is_terminal() {
            return Err(RefundError::InvalidTransition {
                item: self.id,
                reason: format!("item is already {}", self.status_str()),
            });
        }
        match &mut self.kind {
            ItemKind::Order { status } => *status = OrderStatus::Cancelled,
            ItemKind::Booking { status } => *status = BookingStatus::Cancelled,
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn order(status: OrderStatus) -> Item {
        Item::order(1, Money::new(dec!(10.0)).unwrap(), status, Utc::now())
    }

    fn booking(status: BookingStatus) -> Item {
        Item::booking(2, Money::new(dec!(10.0)).unwrap(), status, Utc::now())
    }

    #[test]
    fn test_cancel_pending_order() {
        let mut item = order(OrderStatus::Pending);
        assert!(item.cancel().is_ok());
        assert_eq!(item.kind, ItemKind::Order { status: OrderStatus::Cancelled });
    }

    #[test]
    fn test_cancel_shipped_order() {
        let mut item = order(OrderStatus::Shipped);
        assert!(item.cancel().is_ok());
    }

    #[test]
    fn test_cancel_delivered_order_rejected() {
        let mut item = order(OrderStatus::Delivered);
        assert!(matches!(
            item.cancel(),
            Err(RefundError::InvalidTransition { .. })
        ));
        assert_eq!(item.kind, ItemKind::Order { status: OrderStatus::Delivered });
    }

    #[test]
    fn test_double_cancel_rejected() {
        let mut item = order(OrderStatus::Pending);
        item.cancel().unwrap();
        assert!(item.cancel().is_err());
    }

    #[test]
    fn test_cancel_confirmed_booking() {
        let mut item = booking(BookingStatus::Confirmed);
        assert!(item.cancel().is_ok());
        assert_eq!(item.kind, ItemKind::Booking { status: BookingStatus::Cancelled });
    }

    #[test]
    fn test_cancel_expired_booking_rejected() {
        let mut item = booking(BookingStatus::Expired);
        assert!(item.cancel().is_err());
    }

    #[test]
    fn test_simulated_payment_is_paid() {
        let payment = Payment::simulated(Utc::now());
        assert!(payment.paid);
        assert_eq!(payment.method, "simulated");
        assert!(payment.transaction_id.starts_with("txn_"));
        assert!(payment.payment_intent_id.starts_with("pi_"));
    }

    #[test]
    fn test_default_refund_record() {
        let record = RefundRecord::default();
        assert_eq!(record.status, RefundStatus::None);
        assert_eq!(record.amount, Money::ZERO);
        assert!(record.refund_id.is_none());
    }
}
