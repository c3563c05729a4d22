use async_trait::async_trait;
use tokio::sync::mpsc;

use common::types::order_status::OrderStatus;
use common::types::records::{DishRecord, LineItemRecord, OrderRecord, RestaurantRecord};

use crate::errors::StoreError;

/// Explicit unsubscribe for a realtime subscription. Calling it twice is a
/// no-op, and dropping the handle releases the registration as well, so the
/// listener cannot leak across remounts.
pub struct CancelHandle {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl CancelHandle {
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    pub fn unsubscribe(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for CancelHandle {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

/// A live registration on the claimable-orders query. Every backend change
/// pushes the entire current result set, newest first; consumers replace
/// their whole view per event instead of patching.
pub struct FeedSubscription {
    events: mpsc::UnboundedReceiver<Vec<OrderRecord>>,
    cancel: CancelHandle,
}

impl FeedSubscription {
    pub fn new(
        events: mpsc::UnboundedReceiver<Vec<OrderRecord>>,
        cancel: impl FnOnce() + Send + 'static,
    ) -> Self {
        Self {
            events,
            cancel: CancelHandle::new(cancel),
        }
    }

    pub fn split(self) -> (mpsc::UnboundedReceiver<Vec<OrderRecord>>, CancelHandle) {
        (self.events, self.cancel)
    }
}

/// The shared document store, reduced to the operations this core consumes:
/// a filtered+ordered realtime query, point reads, and the partial status
/// update every transition goes through.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Subscribes to orders in the claimable state, creation time descending.
    /// The current set is delivered immediately, then again on every change.
    fn watch_claimable(&self) -> Result<FeedSubscription, StoreError>;

    async fn order(&self, id: &str) -> Result<Option<OrderRecord>, StoreError>;

    async fn restaurant(&self, id: &str) -> Result<Option<RestaurantRecord>, StoreError>;

    async fn dish(&self, id: &str) -> Result<Option<DishRecord>, StoreError>;

    /// The order's linked line-item collection.
    async fn line_items(&self, order_id: &str) -> Result<Vec<LineItemRecord>, StoreError>;

    /// Partial-field update of the status. Note: this is a plain last-write-
    /// wins update; a multi-courier deployment would need a conditional
    /// claim (compare-and-swap on status) at this seam.
    async fn set_order_status(&self, order_id: &str, status: OrderStatus)
    -> Result<(), StoreError>;
}
