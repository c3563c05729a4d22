use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use colored::Color;
use tokio::sync::mpsc;

use common::logger::Logger;
use common::types::order_status::OrderStatus;
use common::types::records::{DishRecord, LineItemRecord, OrderRecord, RestaurantRecord};

use crate::errors::StoreError;
use crate::providers::store::{FeedSubscription, OrderStore};

#[derive(Default)]
struct StoreState {
    orders: HashMap<String, OrderRecord>,
    restaurants: HashMap<String, RestaurantRecord>,
    dishes: HashMap<String, DishRecord>,
    line_items: Vec<LineItemRecord>,
    watchers: HashMap<u64, mpsc::UnboundedSender<Vec<OrderRecord>>>,
    next_watcher_id: u64,
}

impl StoreState {
    /// The claimable result set as the query would return it: status READY,
    /// creation time descending.
    fn claimable_snapshot(&self) -> Vec<OrderRecord> {
        let mut orders: Vec<OrderRecord> = self
            .orders
            .values()
            .filter(|o| o.status.is_claimable())
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        orders
    }

    /// Pushes the full current set to every live watcher; watchers whose
    /// receiver is gone are pruned.
    fn publish(&mut self) {
        let snapshot = self.claimable_snapshot();
        self.watchers
            .retain(|_, sender| sender.send(snapshot.clone()).is_ok());
    }
}

/// HashMap-backed document store with the same query/subscription surface as
/// the real backend. Used by the demo binary and the actor tests.
pub struct InMemoryStore {
    state: Arc<Mutex<StoreState>>,
    fail_next_write: AtomicBool,
    logger: Logger,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(StoreState::default())),
            fail_next_write: AtomicBool::new(false),
            logger: Logger::new("Store", Color::Magenta),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn insert_order(&self, order: OrderRecord) {
        let mut state = self.lock();
        state.orders.insert(order.id.clone(), order);
        state.publish();
    }

    pub fn insert_restaurant(&self, restaurant: RestaurantRecord) {
        self.lock()
            .restaurants
            .insert(restaurant.id.clone(), restaurant);
    }

    pub fn insert_dish(&self, dish: DishRecord) {
        self.lock().dishes.insert(dish.id.clone(), dish);
    }

    pub fn insert_line_item(&self, item: LineItemRecord) {
        self.lock().line_items.push(item);
    }

    /// Makes the next status write fail, for exercising the blocked-
    /// transition path.
    pub fn inject_write_failure(&self) {
        self.fail_next_write.store(true, Ordering::SeqCst);
    }

    pub fn watcher_count(&self) -> usize {
        self.lock().watchers.len()
    }
}

#[async_trait]
impl OrderStore for InMemoryStore {
    fn watch_claimable(&self) -> Result<FeedSubscription, StoreError> {
        let (sender, receiver) = mpsc::unbounded_channel();
        let mut state = self.lock();
        let id = state.next_watcher_id;
        state.next_watcher_id += 1;

        // The subscription fires once immediately with the current results.
        let _ = sender.send(state.claimable_snapshot());
        state.watchers.insert(id, sender);

        let shared = Arc::clone(&self.state);
        Ok(FeedSubscription::new(receiver, move || {
            let mut state = shared
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            state.watchers.remove(&id);
        }))
    }

    async fn order(&self, id: &str) -> Result<Option<OrderRecord>, StoreError> {
        Ok(self.lock().orders.get(id).cloned())
    }

    async fn restaurant(&self, id: &str) -> Result<Option<RestaurantRecord>, StoreError> {
        Ok(self.lock().restaurants.get(id).cloned())
    }

    async fn dish(&self, id: &str) -> Result<Option<DishRecord>, StoreError> {
        Ok(self.lock().dishes.get(id).cloned())
    }

    async fn line_items(&self, order_id: &str) -> Result<Vec<LineItemRecord>, StoreError> {
        Ok(self
            .lock()
            .line_items
            .iter()
            .filter(|item| item.order_id == order_id)
            .cloned()
            .collect())
    }

    async fn set_order_status(
        &self,
        order_id: &str,
        status: OrderStatus,
    ) -> Result<(), StoreError> {
        if self.fail_next_write.swap(false, Ordering::SeqCst) {
            self.logger.warn(format!(
                "injected failure: status write {status} for order {order_id} rejected"
            ));
            return Err(StoreError::WriteFailed("injected failure".into()));
        }
        let mut state = self.lock();
        let order = state
            .orders
            .get_mut(order_id)
            .ok_or_else(|| StoreError::WriteFailed(format!("no such order: {order_id}")))?;
        order.status = status;
        state.publish();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn order(id: &str, status: OrderStatus, age_mins: i64) -> OrderRecord {
        OrderRecord {
            id: id.into(),
            restaurant_id: "r1".into(),
            restaurant_name: "La Trattoria".into(),
            restaurant_address: "Av. Corrientes 1500".into(),
            user_first_name: "Ana".into(),
            user_last_name: "Suarez".into(),
            user_address: "Lavalle 750".into(),
            user_latitude: "-34.6010".into(),
            user_longitude: "-58.3840".into(),
            status,
            created_at: Utc::now() - Duration::minutes(age_mins),
        }
    }

    #[tokio::test]
    async fn subscription_fires_immediately_and_on_every_change() {
        let store = InMemoryStore::new();
        store.insert_order(order("o1", OrderStatus::Ready, 10));

        let (mut events, _cancel) = store.watch_claimable().unwrap().split();
        let first = events.recv().await.unwrap();
        assert_eq!(first.len(), 1);

        store.insert_order(order("o2", OrderStatus::Ready, 0));
        let second = events.recv().await.unwrap();
        assert_eq!(second.len(), 2);
        // Newest first.
        assert_eq!(second[0].id, "o2");

        store
            .set_order_status("o2", OrderStatus::Accepted)
            .await
            .unwrap();
        let third = events.recv().await.unwrap();
        assert_eq!(third.len(), 1);
        assert_eq!(third[0].id, "o1");
    }

    #[tokio::test]
    async fn non_claimable_orders_never_appear() {
        let store = InMemoryStore::new();
        store.insert_order(order("o1", OrderStatus::Accepted, 5));
        let (mut events, _cancel) = store.watch_claimable().unwrap().split();
        assert!(events.recv().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unsubscribe_removes_the_watcher() {
        let store = InMemoryStore::new();
        let (_events, mut cancel) = store.watch_claimable().unwrap().split();
        assert_eq!(store.watcher_count(), 1);
        cancel.unsubscribe();
        assert_eq!(store.watcher_count(), 0);
        // Second call is a no-op.
        cancel.unsubscribe();
    }

    #[tokio::test]
    async fn injected_failure_rejects_exactly_one_write() {
        let store = InMemoryStore::new();
        store.insert_order(order("o1", OrderStatus::Ready, 0));
        store.inject_write_failure();

        let err = store
            .set_order_status("o1", OrderStatus::Accepted)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::WriteFailed(_)));
        assert_eq!(
            store.order("o1").await.unwrap().unwrap().status,
            OrderStatus::Ready
        );

        store
            .set_order_status("o1", OrderStatus::Accepted)
            .await
            .unwrap();
        assert_eq!(
            store.order("o1").await.unwrap().unwrap().status,
            OrderStatus::Accepted
        );
    }
}
