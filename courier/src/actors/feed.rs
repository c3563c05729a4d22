use std::sync::Arc;

use actix::prelude::*;
use colored::Color;
use tokio::task::JoinHandle;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::UnboundedReceiverStream;

use common::logger::Logger;

use crate::messages::{FeedSnapshot, FeedUpdated, Shutdown};
use crate::providers::store::{CancelHandle, OrderStore};

/// Mirrors the store's claimable-orders query for the UI layer. Each backend
/// push is republished as the full, authoritative current set; the consumer
/// replaces its view, never diffs.
pub struct OrderFeed {
    store: Arc<dyn OrderStore>,
    consumer: Recipient<FeedUpdated>,
    cancel: Option<CancelHandle>,
    forward: Option<JoinHandle<()>>,
    logger: Logger,
}

impl OrderFeed {
    pub fn new(store: Arc<dyn OrderStore>, consumer: Recipient<FeedUpdated>) -> Self {
        Self {
            store,
            consumer,
            cancel: None,
            forward: None,
            logger: Logger::new("OrderFeed", Color::Cyan),
        }
    }
}

impl Actor for OrderFeed {
    type Context = Context<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        match self.store.watch_claimable() {
            Ok(subscription) => {
                let (receiver, cancel) = subscription.split();
                self.cancel = Some(cancel);
                let addr = ctx.address();
                self.forward = Some(tokio::spawn(async move {
                    let mut events = UnboundedReceiverStream::new(receiver);
                    while let Some(snapshot) = events.next().await {
                        addr.do_send(FeedSnapshot(snapshot));
                    }
                }));
                self.logger.info("subscribed to claimable orders");
            }
            Err(e) => {
                // Subscription drop: keep whatever view the consumer last saw.
                self.logger
                    .error(format!("claimable subscription failed: {e}"));
            }
        }
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        if let Some(mut cancel) = self.cancel.take() {
            cancel.unsubscribe();
        }
        if let Some(task) = self.forward.take() {
            task.abort();
        }
        self.logger.info("feed torn down, subscription released");
    }
}

impl Handler<FeedSnapshot> for OrderFeed {
    type Result = ();

    fn handle(&mut self, msg: FeedSnapshot, _ctx: &mut Self::Context) -> Self::Result {
        let mut orders = msg.0;
        // The store already filters and orders; restate the invariant here so
        // a misbehaving backend can never leak a claimed order into the feed.
        orders.retain(|o| o.status.is_claimable());
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        self.logger
            .info(format!("available orders: {}", orders.len()));
        self.consumer.do_send(FeedUpdated { orders });
    }
}

impl Handler<Shutdown> for OrderFeed {
    type Result = ();

    fn handle(&mut self, _msg: Shutdown, ctx: &mut Self::Context) -> Self::Result {
        ctx.stop();
    }
}
