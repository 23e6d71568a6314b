use crate::domain::item::{BookingStatus, Item, ItemId, OrderStatus, Payment};
use crate::domain::money::Money;
use crate::domain::policy::PolicyKind;
use crate::error::{RefundError, Result};
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Read;

/// One cancellation request row: the item as it stood at cancellation time
/// plus the caller's reason.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct CancellationRequest {
    pub kind: PolicyKind,
    pub id: ItemId,
    pub amount: Decimal,
    /// Lifecycle status prior to cancellation; defaults to pending (orders)
    /// or confirmed (bookings).
    #[serde(default)]
    pub status: Option<String>,
    /// How long ago the item was created, in hours.
    pub age_hours: f64,
    pub paid: bool,
    #[serde(default)]
    pub reason: Option<String>,
}

impl CancellationRequest {
    /// Builds the item this request describes, created `age_hours` before `now`.
    pub fn into_item(self, now: DateTime<Utc>) -> Result<Item> {
        let total = Money::try_from(self.amount)?;
        let created_at = now - Duration::milliseconds((self.age_hours * 3_600_000.0) as i64);
        let status = self.status.as_deref().filter(|s| !s.is_empty());

        let item = match self.kind {
            PolicyKind::Order => {
                let status = match status {
                    Some(raw) => OrderStatus::parse(raw).ok_or_else(|| {
                        RefundError::ValidationError(format!("Unknown order status: {raw}"))
                    })?,
                    None => OrderStatus::Pending,
                };
                Item::order(self.id, total, status, created_at)
            }
            PolicyKind::Booking => {
                let status = match status {
                    Some(raw) => BookingStatus::parse(raw).ok_or_else(|| {
                        RefundError::ValidationError(format!("Unknown booking status: {raw}"))
                    })?,
                    None => BookingStatus::Confirmed,
                };
                Item::booking(self.id, total, status, created_at)
            }
        };

        if self.paid {
            Ok(item.with_payment(Payment::simulated(created_at)))
        } else {
            Ok(item)
        }
    }

    pub fn reason(&self) -> Option<&str> {
        self.reason.as_deref().filter(|s| !s.is_empty())
    }
}

/// Reads cancellation requests from a CSV source.
///
/// This reader wraps `csv::Reader` and provides an iterator over
/// `Result<CancellationRequest>`. It handles whitespace trimming and flexible
/// record lengths automatically.
pub struct RequestReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> RequestReader<R> {
    /// Creates a new `RequestReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Returns an iterator that lazily reads and deserializes requests,
    /// allowing large files to be processed in a streaming fashion.
    pub fn requests(self) -> impl Iterator<Item = Result<CancellationRequest>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(RefundError::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::item::ItemKind;
    use rust_decimal_macros::dec;

    const HEADER: &str = "kind, id, amount, status, age_hours, paid, reason";

    #[test]
    fn test_reader_valid_stream() {
        let data = format!(
            "{HEADER}\norder, 1, 29.98, pending, 1, true, changed my mind\nbooking, 2, 135, , 100, true,"
        );
        let reader = RequestReader::new(data.as_bytes());
        let results: Vec<Result<CancellationRequest>> = reader.requests().collect();

        assert_eq!(results.len(), 2);
        let first = results[0].as_ref().unwrap();
        assert_eq!(first.kind, PolicyKind::Order);
        assert_eq!(first.amount, dec!(29.98));
        assert_eq!(first.reason(), Some("changed my mind"));

        let second = results[1].as_ref().unwrap();
        assert_eq!(second.kind, PolicyKind::Booking);
        assert_eq!(second.reason(), None);
    }

    #[test]
    fn test_reader_malformed_line() {
        let data = format!("{HEADER}\ncoupon, 1, 29.98, pending, 1, true,");
        let reader = RequestReader::new(data.as_bytes());
        let results: Vec<Result<CancellationRequest>> = reader.requests().collect();

        assert!(results[0].is_err());
    }

    #[test]
    fn test_into_item_defaults_and_payment() {
        let now = Utc::now();
        let request = CancellationRequest {
            kind: PolicyKind::Booking,
            id: 2,
            amount: dec!(135),
            status: None,
            age_hours: 100.0,
            paid: true,
            reason: None,
        };
        let item = request.into_item(now).unwrap();
        assert_eq!(item.kind, ItemKind::Booking { status: BookingStatus::Confirmed });
        assert_eq!(item.created_at, now - Duration::hours(100));
        assert!(item.payment.unwrap().paid);
    }

    #[test]
    fn test_into_item_rejects_unknown_status() {
        let request = CancellationRequest {
            kind: PolicyKind::Order,
            id: 1,
            amount: dec!(10),
            status: Some("refunded".to_string()),
            age_hours: 0.0,
            paid: true,
            reason: None,
        };
        assert!(matches!(
            request.into_item(Utc::now()),
            Err(RefundError::ValidationError(_))
        ));
    }

    #[test]
    fn test_into_item_rejects_negative_amount() {
        let request = CancellationRequest {
            kind: PolicyKind::Order,
            id: 1,
            amount: dec!(-10),
            status: None,
            age_hours: 0.0,
            paid: true,
            reason: None,
        };
        assert!(matches!(
            request.into_item(Utc::now()),
            Err(RefundError::ValidationError(_))
        ));
    }
}
