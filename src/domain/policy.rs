//! Refund policy tables for orders and bookings.
//!
//! The amount computation is a deterministic function of the item's kind,
//! its status, its creation time and the evaluation instant. Elapsed time is
//! measured as the absolute difference between the two instants.

use super::item::{Item, ItemKind, OrderStatus};
use super::money::Money;
use chrono::{DateTime, Duration, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

const ORDER_PROCESSING_MOST_HOURS: i64 = 24;
const ORDER_PROCESSING_HALF_HOURS: i64 = 72;
const BOOKING_FULL_HOURS: i64 = 24;
const BOOKING_MOST_HOURS: i64 = 168; // 7 days
const BOOKING_HALF_HOURS: i64 = 720; // 30 days

/// Which policy table applies to an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PolicyKind {
    Order,
    Booking,
}

impl From<&ItemKind> for PolicyKind {
    fn from(kind: &ItemKind) -> Self {
        match kind {
            ItemKind::Order { .. } => Self::Order,
            ItemKind::Booking { .. } => Self::Booking,
        }
    }
}

/// Percentage of the full price returned, per the applicable policy table.
pub fn refund_percent(item: &Item, as_of: DateTime<Utc>) -> u8 {
    let elapsed = as_of.signed_duration_since(item.created_at).abs();
    match item.kind {
        ItemKind::Order { status } => match status {
            OrderStatus::Pending => 100,
            OrderStatus::Processing if elapsed < Duration::hours(ORDER_PROCESSING_MOST_HOURS) => 90,
            OrderStatus::Processing if elapsed < Duration::hours(ORDER_PROCESSING_HALF_HOURS) => 50,
            // processing past 72h, shipped, delivered, cancelled
            _ => 0,
        },
        ItemKind::Booking { .. } => {
            if elapsed < Duration::hours(BOOKING_FULL_HOURS) {
                100
            } else if elapsed < Duration::hours(BOOKING_MOST_HOURS) {
                80
            } else if elapsed < Duration::hours(BOOKING_HALF_HOURS) {
                50
            } else {
                0
            }
        }
    }
}

/// Refundable amount for `item` when evaluated at `as_of`.
pub fn compute_refund_amount(item: &Item, as_of: DateTime<Utc>) -> Money {
    item.total.apply_percent(refund_percent(item, as_of))
}

/// A single row of a policy table, for display purposes.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct PolicyRule {
    /// Order status this rule applies to; `None` for time-only booking rules.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<OrderStatus>,
    pub from_hours: i64,
    /// Exclusive upper bound; `None` means unbounded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub until_hours: Option<i64>,
    pub refund_percent: u8,
}

/// Human-readable description of one policy table.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct RefundPolicy {
    pub item_type: PolicyKind,
    pub rules: Vec<PolicyRule>,
}

/// Pure lookup of the policy table for an item type. Display only.
pub fn refund_policy(kind: PolicyKind) -> RefundPolicy {
    let rule = |status, from_hours, until_hours, refund_percent| PolicyRule {
        status,
        from_hours,
        until_hours,
        refund_percent,
    };
    match kind {
        PolicyKind::Order => RefundPolicy {
            item_type: kind,
            rules: vec![
                rule(Some(OrderStatus::Pending), 0, None, 100),
                rule(
                    Some(OrderStatus::Processing),
                    0,
                    Some(ORDER_PROCESSING_MOST_HOURS),
                    90,
                ),
                rule(
                    Some(OrderStatus::Processing),
                    ORDER_PROCESSING_MOST_HOURS,
                    Some(ORDER_PROCESSING_HALF_HOURS),
                    50,
                ),
                rule(
                    Some(OrderStatus::Processing),
                    ORDER_PROCESSING_HALF_HOURS,
                    None,
                    0,
                ),
                rule(Some(OrderStatus::Shipped), 0, None, 0),
                rule(Some(OrderStatus::Delivered), 0, None, 0),
                rule(Some(OrderStatus::Cancelled), 0, None, 0),
            ],
        },
        PolicyKind::Booking => RefundPolicy {
            item_type: kind,
            rules: vec![
                rule(None, 0, Some(BOOKING_FULL_HOURS), 100),
                rule(None, BOOKING_FULL_HOURS, Some(BOOKING_MOST_HOURS), 80),
                rule(None, BOOKING_MOST_HOURS, Some(BOOKING_HALF_HOURS), 50),
                rule(None, BOOKING_HALF_HOURS, None, 0),
            ],
        },
    }
}
