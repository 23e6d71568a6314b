use crate::domain::item::{Item, ItemId, RefundStatus};
use crate::domain::ports::ItemStore;
use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A thread-safe in-memory store for purchasable items.
///
/// Uses `Arc<RwLock<HashMap<ItemId, Item>>>` to allow shared concurrent access.
/// Ideal for testing or batch replay where persistence is not required.
#[derive(Default, Clone)]
pub struct InMemoryItemStore {
    items: Arc<RwLock<HashMap<ItemId, Item>>>,
}

impl InMemoryItemStore {
    /// Creates a new, empty in-memory item store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ItemStore for InMemoryItemStore {
    async fn load(&self, id: ItemId) -> Result<Option<Item>> {
        let items = self.items.read().await;
        Ok(items.get(&id).cloned())
    }

    async fn save(&self, item: Item) -> Result<()> {
        let mut items = self.items.write().await;
        items.insert(item.id, item);
        Ok(())
    }

    async fn commit_unless_refunded(&self, item: Item) -> Result<bool> {
        // The status check and the write happen under one write lock, so two
        // racing commits for the same item cannot both observe a non-processed
        // stored refund.
        let mut items = self.items.write().await;
        if let Some(stored) = items.get(&item.id)
            && stored.refund.status == RefundStatus::Processed
        {
            return Ok(false);
        }
        items.insert(item.id, item);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::item::{OrderStatus, RefundRecord};
    use crate::domain::money::Money;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn item(id: ItemId) -> Item {
        Item::order(
            id,
            Money::new(dec!(100.0)).unwrap(),
            OrderStatus::Pending,
            Utc::now(),
        )
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let store = InMemoryItemStore::new();
        let stored = item(1);

        store.save(stored.clone()).await.unwrap();
        let loaded = store.load(1).await.unwrap().unwrap();
        assert_eq!(loaded, stored);

        assert!(store.load(2).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_commit_unless_refunded_succeeds_when_unrefunded() {
        let store = InMemoryItemStore::new();
        store.save(item(1)).await.unwrap();

        let mut refunded = item(1);
        refunded.refund = RefundRecord::processed(
            Money::new(dec!(100.0)).unwrap(),
            "re_1".to_string(),
            "requested_by_customer".to_string(),
            Utc::now(),
        );
        assert!(store.commit_unless_refunded(refunded.clone()).await.unwrap());
        assert_eq!(store.load(1).await.unwrap().unwrap(), refunded);
    }

    #[tokio::test]
    async fn test_commit_unless_refunded_rejects_second_processed() {
        let store = InMemoryItemStore::new();

        let mut first = item(1);
        first.refund = RefundRecord::processed(
            Money::new(dec!(100.0)).unwrap(),
            "re_1".to_string(),
            "requested_by_customer".to_string(),
            Utc::now(),
        );
        assert!(store.commit_unless_refunded(first.clone()).await.unwrap());

        let mut second = item(1);
        second.refund = RefundRecord::processed(
            Money::new(dec!(50.0)).unwrap(),
            "re_2".to_string(),
            "duplicate".to_string(),
            Utc::now(),
        );
        assert!(!store.commit_unless_refunded(second).await.unwrap());

        // The first commit remains the stored state.
        let stored = store.load(1).await.unwrap().unwrap();
        assert_eq!(stored.refund.refund_id.as_deref(), Some("re_1"));
    }

    #[tokio::test]
    async fn test_commit_unless_refunded_on_missing_item_inserts() {
        let store = InMemoryItemStore::new();
        assert!(store.commit_unless_refunded(item(7)).await.unwrap());
        assert!(store.load(7).await.unwrap().is_some());
    }
}
