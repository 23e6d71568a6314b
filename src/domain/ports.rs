use super::item::{Item, ItemId};
use crate::error::Result;
use async_trait::async_trait;

/// Storage port for purchasable items.
///
/// `commit_unless_refunded` is the conditional write that keeps successful
/// refunds at-most-once under concurrent cancellation requests: the store
/// persists the item only when the stored refund status is not already
/// `processed`. The engine routes every write on the cancellation path through
/// it, so a racing request can never clobber a committed refund.
#[async_trait]
pub trait ItemStore: Send + Sync {
    async fn load(&self, id: ItemId) -> Result<Option<Item>>;
    async fn save(&self, item: Item) -> Result<()>;
    /// Persists `item` unless the stored copy already carries a processed
    /// refund. Returns `false`, leaving the stored item untouched, when the
    /// condition fails.
    async fn commit_unless_refunded(&self, item: Item) -> Result<bool>;
}

pub type ItemStoreBox = Box<dyn ItemStore>;
