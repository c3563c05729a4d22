use actix::prelude::*;

use common::types::geo::{GeoPoint, LivePosition};
use common::types::order_status::OrderStatus;
use common::types::records::{DishDisplay, OrderRecord};
use common::types::route::RouteQuote;

use crate::errors::{DirectionsError, SessionError};
use crate::providers::geolocation::LocationFeed;
use crate::view::PanelState;

/// A new live position from the geolocation feed. Delivered through the
/// session mailbox so no two updates are ever processed concurrently.
#[derive(Message, Debug, Clone, Copy)]
#[rtype(result = "()")]
pub struct PositionUpdate(pub LivePosition);

/// Result of the once-per-session restaurant coordinate lookup. `None` means
/// the record was missing or its coordinates unparsable; the session stays in
/// the loading state.
#[derive(Message, Debug, Clone, Copy)]
#[rtype(result = "()")]
pub struct RestaurantResolved(pub Option<GeoPoint>);

/// Resolved dish annotations for the session's order.
#[derive(Message, Debug, Clone)]
#[rtype(result = "()")]
pub struct DishesResolved(pub Vec<DishDisplay>);

/// A route quote coming back from the directions provider. `seq` identifies
/// the inputs it was requested for; anything older than the latest request is
/// stale and gets dropped.
#[derive(Message, Debug, Clone)]
#[rtype(result = "()")]
pub struct QuoteReady {
    pub seq: u64,
    pub result: Result<RouteQuote, DirectionsError>,
}

/// The geolocation feed is running; the session keeps the handle so it can
/// release the stream on teardown.
#[derive(Message)]
#[rtype(result = "()")]
pub struct LocationFeedStarted(pub LocationFeed);

/// Foreground permission was denied. One-time advisory; the session degrades
/// to a perpetual loading state.
#[derive(Message, Debug, Clone, Copy)]
#[rtype(result = "()")]
pub struct LocationDenied;

/// The single courier action driving the state machine forward.
#[derive(Message, Debug, Clone, Copy)]
#[rtype(result = "Result<AdvanceOutcome, SessionError>")]
pub struct Advance;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceOutcome {
    /// The write landed and the local status moved to the new value.
    Moved(OrderStatus),
    /// Advance at COMPLETE: the session was torn down, back to the feed.
    Closed,
}

/// Pull-style snapshot of the render state.
#[derive(Message, Debug, Clone, Copy)]
#[rtype(result = "PanelState")]
pub struct GetPanel;

/// One raw push from the store's claimable-orders subscription.
#[derive(Message, Debug, Clone)]
#[rtype(result = "()")]
pub struct FeedSnapshot(pub Vec<OrderRecord>);

/// The full, authoritative claimable set republished to the UI layer.
/// Consumers replace their entire view; an empty list is valid.
#[derive(Message, Debug, Clone)]
#[rtype(result = "()")]
pub struct FeedUpdated {
    pub orders: Vec<OrderRecord>,
}

/// Events the session pushes at its viewer.
#[derive(Message, Debug, Clone)]
#[rtype(result = "()")]
pub enum ViewerEvent {
    PanelChanged(PanelState),
    /// Emitted when the order is accepted: the map recenters on the courier.
    CameraRecenter(GeoPoint),
    SessionClosed,
}

/// Component unmount: stop the actor and release its subscriptions.
#[derive(Message, Debug, Clone, Copy)]
#[rtype(result = "()")]
pub struct Shutdown;
