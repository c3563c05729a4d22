pub mod feed;
pub mod session;

use std::sync::Arc;

use actix::prelude::*;

use common::types::records::OrderRecord;

use crate::errors::SessionError;
use crate::gate::RoleGate;
use crate::messages::{FeedUpdated, ViewerEvent};
use crate::providers::directions::DirectionsApi;
use crate::providers::geolocation::Locator;
use crate::providers::store::OrderStore;

pub use feed::OrderFeed;
pub use session::DeliverySession;

/// Entry point into the claimable-orders screen. Driver-only.
pub fn start_feed(
    gate: &RoleGate,
    store: Arc<dyn OrderStore>,
    consumer: Recipient<FeedUpdated>,
) -> Result<Addr<OrderFeed>, SessionError> {
    gate.require_driver()?;
    Ok(OrderFeed::new(store, consumer).start())
}

/// Entry point into the delivery screen for one selected order. Driver-only.
pub fn open_session(
    gate: &RoleGate,
    order: OrderRecord,
    store: Arc<dyn OrderStore>,
    directions: Arc<dyn DirectionsApi>,
    locator: Arc<dyn Locator>,
    viewer: Option<Recipient<ViewerEvent>>,
) -> Result<Addr<DeliverySession>, SessionError> {
    gate.require_driver()?;
    Ok(DeliverySession::new(order, store, directions, locator, viewer).start())
}
