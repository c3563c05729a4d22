use std::sync::Arc;

use actix::prelude::*;
use colored::Color;

use common::logger::Logger;
use common::types::geo::{GeoPoint, LivePosition};
use common::types::order_status::OrderStatus;
use common::types::records::{DishDisplay, OrderRecord};
use common::types::route::RouteQuote;
use common::utils::parse_point;

use crate::dishes::resolve_dishes;
use crate::errors::{GeoError, SessionError};
use crate::messages::{
    Advance, AdvanceOutcome, DishesResolved, GetPanel, LocationDenied, LocationFeedStarted,
    PositionUpdate, QuoteReady, RestaurantResolved, Shutdown, ViewerEvent,
};
use crate::providers::directions::DirectionsApi;
use crate::providers::geolocation::{LocationFeed, Locator};
use crate::providers::store::OrderStore;
use crate::view::{PanelState, button_label, route_summary};

/// One courier's engagement with one order: the state machine, the live map
/// inputs and the bottom panel, kept in sync with the shared store.
///
/// There is exactly one writer to the local state (this actor), so the only
/// ordering that matters is write-then-advance: the store must confirm every
/// status transition before the local status moves.
pub struct DeliverySession {
    order: OrderRecord,
    status: OrderStatus,
    store: Arc<dyn OrderStore>,
    directions: Arc<dyn DirectionsApi>,
    locator: Arc<dyn Locator>,
    viewer: Option<Recipient<ViewerEvent>>,
    position: Option<LivePosition>,
    /// Resolved once per session, immutable afterwards.
    restaurant_point: Option<GeoPoint>,
    customer_point: Option<GeoPoint>,
    route: Option<RouteQuote>,
    dishes: Vec<DishDisplay>,
    /// Sequence of the newest quote request; older responses are stale.
    quote_seq: u64,
    transition_in_flight: bool,
    location: Option<LocationFeed>,
    logger: Logger,
}

impl DeliverySession {
    pub fn new(
        order: OrderRecord,
        store: Arc<dyn OrderStore>,
        directions: Arc<dyn DirectionsApi>,
        locator: Arc<dyn Locator>,
        viewer: Option<Recipient<ViewerEvent>>,
    ) -> Self {
        let logger = Logger::new(format!("Session {}", order.id), Color::Green);
        let customer_point = parse_point(&order.user_latitude, &order.user_longitude);
        if customer_point.is_none() {
            logger.dev(format!(
                "order {} has malformed customer coordinates, rendering no data",
                order.id
            ));
        }
        Self {
            status: OrderStatus::Ready,
            order,
            store,
            directions,
            locator,
            viewer,
            position: None,
            restaurant_point: None,
            customer_point,
            route: None,
            dishes: Vec::new(),
            quote_seq: 0,
            transition_in_flight: false,
            location: None,
            logger,
        }
    }

    fn ready_to_render(&self) -> bool {
        self.position.is_some() && self.restaurant_point.is_some()
    }

    /// Destination as a pure function of status: the restaurant while the
    /// courier is heading to pick up, the customer otherwise.
    fn route_destination(&self) -> Option<GeoPoint> {
        match self.status {
            OrderStatus::Accepted => self.restaurant_point,
            _ => self.customer_point,
        }
    }

    /// The restaurant stays on the route as a stop until pickup.
    fn route_waypoints(&self) -> Vec<GeoPoint> {
        match self.status {
            OrderStatus::Ready | OrderStatus::Accepted => {
                self.restaurant_point.into_iter().collect()
            }
            OrderStatus::PickedUp | OrderStatus::Complete => Vec::new(),
        }
    }

    /// Fires a single quote attempt for the current inputs. Nothing is
    /// requested until both the live position and the restaurant coordinate
    /// exist, so a denied permission means no quote is ever issued.
    fn request_quote(&mut self, ctx: &mut Context<Self>) {
        let Some(position) = self.position else {
            return;
        };
        if self.restaurant_point.is_none() {
            return;
        }
        let Some(destination) = self.route_destination() else {
            self.logger.dev("no destination available, skipping quote");
            return;
        };
        let waypoints = self.route_waypoints();

        self.quote_seq += 1;
        let seq = self.quote_seq;
        let directions = Arc::clone(&self.directions);
        let origin = position.point;
        let addr = ctx.address();
        actix::spawn(async move {
            let result = directions.quote(origin, destination, &waypoints).await;
            addr.do_send(QuoteReady { seq, result });
        });
    }

    fn panel(&self) -> PanelState {
        PanelState {
            status: self.status,
            button_label: button_label(self.status),
            route: self.route.clone(),
            summary: self.route.as_ref().map(route_summary),
            dishes: self.dishes.clone(),
            ready_to_render: self.ready_to_render(),
        }
    }

    fn publish_panel(&self) {
        if let Some(viewer) = &self.viewer {
            viewer.do_send(ViewerEvent::PanelChanged(self.panel()));
        }
    }

    fn teardown(&mut self, ctx: &mut Context<Self>) {
        if let Some(viewer) = &self.viewer {
            viewer.do_send(ViewerEvent::SessionClosed);
        }
        ctx.stop();
    }
}

impl Actor for DeliverySession {
    type Context = Context<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        self.logger
            .info(format!("session opened for order {}", self.order.id));
        let addr = ctx.address();

        // Re-assert READY so the record reflects an open session. Idempotent;
        // a failure is logged and nothing local depends on it.
        {
            let store = Arc::clone(&self.store);
            let order_id = self.order.id.clone();
            let logger = self.logger.clone();
            actix::spawn(async move {
                if let Err(e) = store.set_order_status(&order_id, OrderStatus::Ready).await {
                    logger.warn(format!("initial READY write failed for {order_id}: {e}"));
                }
            });
        }

        // Restaurant coordinate, fetched once and immutable for the session.
        {
            let store = Arc::clone(&self.store);
            let restaurant_id = self.order.restaurant_id.clone();
            let logger = self.logger.clone();
            let addr = addr.clone();
            actix::spawn(async move {
                let point = match store.restaurant(&restaurant_id).await {
                    Ok(Some(record)) => {
                        let parsed = parse_point(
                            &record.restaurant_latitude,
                            &record.restaurant_longitude,
                        );
                        if parsed.is_none() {
                            logger.dev(format!(
                                "restaurant {restaurant_id} has malformed coordinates"
                            ));
                        }
                        parsed
                    }
                    Ok(None) => {
                        logger.warn(format!(
                            "restaurant {restaurant_id} missing, map stays loading"
                        ));
                        None
                    }
                    Err(e) => {
                        logger.warn(format!("restaurant {restaurant_id} lookup failed: {e}"));
                        None
                    }
                };
                addr.do_send(RestaurantResolved(point));
            });
        }

        // Dish annotations for the bottom panel.
        {
            let store = Arc::clone(&self.store);
            let order_id = self.order.id.clone();
            let logger = self.logger.clone();
            let addr = addr.clone();
            actix::spawn(async move {
                let dishes = resolve_dishes(store.as_ref(), &order_id, &logger).await;
                addr.do_send(DishesResolved(dishes));
            });
        }

        // Live position feed into this mailbox.
        {
            let locator = Arc::clone(&self.locator);
            let logger = self.logger.clone();
            let recipient = addr.clone().recipient();
            actix::spawn(async move {
                match LocationFeed::begin(locator, recipient, logger.clone()).await {
                    Ok(feed) => addr.do_send(LocationFeedStarted(feed)),
                    Err(GeoError::PermissionDenied) => addr.do_send(LocationDenied),
                    Err(e) => logger.warn(format!("location feed failed to start: {e}")),
                }
            });
        }
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        // Guaranteed release path for the background stream.
        if let Some(mut feed) = self.location.take() {
            feed.stop();
        }
        self.logger
            .info(format!("session closed for order {}", self.order.id));
    }
}

impl Handler<LocationFeedStarted> for DeliverySession {
    type Result = ();

    fn handle(&mut self, msg: LocationFeedStarted, _ctx: &mut Self::Context) -> Self::Result {
        self.location = Some(msg.0);
    }
}

impl Handler<LocationDenied> for DeliverySession {
    type Result = ();

    fn handle(&mut self, _msg: LocationDenied, _ctx: &mut Self::Context) -> Self::Result {
        // One-time advisory; the session stays in the loading state.
        self.logger
            .warn("location permission denied, map will keep loading");
        self.publish_panel();
    }
}

impl Handler<PositionUpdate> for DeliverySession {
    type Result = ();

    fn handle(&mut self, msg: PositionUpdate, ctx: &mut Self::Context) -> Self::Result {
        self.position = Some(msg.0);
        self.request_quote(ctx);
        self.publish_panel();
    }
}

impl Handler<RestaurantResolved> for DeliverySession {
    type Result = ();

    fn handle(&mut self, msg: RestaurantResolved, ctx: &mut Self::Context) -> Self::Result {
        self.restaurant_point = msg.0;
        self.request_quote(ctx);
        self.publish_panel();
    }
}

impl Handler<DishesResolved> for DeliverySession {
    type Result = ();

    fn handle(&mut self, msg: DishesResolved, _ctx: &mut Self::Context) -> Self::Result {
        self.dishes = msg.0;
        self.publish_panel();
    }
}

impl Handler<QuoteReady> for DeliverySession {
    type Result = ();

    fn handle(&mut self, msg: QuoteReady, _ctx: &mut Self::Context) -> Self::Result {
        if msg.seq != self.quote_seq {
            // Response for superseded inputs; the newer request wins even if
            // it completed first.
            self.logger
                .dev(format!("dropping stale quote #{}", msg.seq));
            return;
        }
        match msg.result {
            Ok(quote) => {
                self.route = Some(quote);
                self.publish_panel();
            }
            Err(e) => {
                // Keep the previous quote; a new attempt happens only when
                // the inputs next change.
                self.logger.warn(format!("route quote failed: {e}"));
            }
        }
    }
}

impl Handler<Advance> for DeliverySession {
    type Result = ResponseActFuture<Self, Result<AdvanceOutcome, SessionError>>;

    fn handle(&mut self, _msg: Advance, ctx: &mut Self::Context) -> Self::Result {
        if self.transition_in_flight {
            return Box::pin(actix::fut::ready(Err(SessionError::Busy)));
        }
        let Some(next) = self.status.next() else {
            // COMPLETE: back to the feed, the session is destroyed.
            self.teardown(ctx);
            return Box::pin(actix::fut::ready(Ok(AdvanceOutcome::Closed)));
        };

        self.transition_in_flight = true;
        let store = Arc::clone(&self.store);
        let order_id = self.order.id.clone();

        Box::pin(
            async move { store.set_order_status(&order_id, next).await }
                .into_actor(self)
                .map(move |written, act, ctx| {
                    act.transition_in_flight = false;
                    match written {
                        Ok(()) => {
                            act.status = next;
                            act.logger
                                .info(format!("order {} is now {next}", act.order.id));
                            act.request_quote(ctx);
                            if next == OrderStatus::Accepted {
                                if let (Some(viewer), Some(position)) =
                                    (&act.viewer, act.position)
                                {
                                    viewer.do_send(ViewerEvent::CameraRecenter(position.point));
                                }
                            }
                            act.publish_panel();
                            Ok(AdvanceOutcome::Moved(next))
                        }
                        Err(e) => {
                            act.logger.warn(format!(
                                "status write failed for order {}, staying at {}: {e}",
                                act.order.id, act.status
                            ));
                            Err(SessionError::StatusWrite(e))
                        }
                    }
                }),
        )
    }
}

impl Handler<GetPanel> for DeliverySession {
    type Result = MessageResult<GetPanel>;

    fn handle(&mut self, _msg: GetPanel, _ctx: &mut Self::Context) -> Self::Result {
        MessageResult(self.panel())
    }
}

impl Handler<Shutdown> for DeliverySession {
    type Result = ();

    fn handle(&mut self, _msg: Shutdown, ctx: &mut Self::Context) -> Self::Result {
        // Courier navigated away mid-delivery; release paths run in stopped().
        self.teardown(ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::sync::mpsc;
    use tokio::time::sleep;

    use common::types::records::{DishRecord, LineItemRecord, RestaurantRecord};
    use common::types::role::Role;
    use common::types::route::RouteRequest;

    use crate::actors::open_session;
    use crate::errors::{DirectionsError, StoreError};
    use crate::gate::RoleGate;
    use crate::providers::geolocation::{Permission, PositionWatch};
    use crate::providers::memory::InMemoryStore;

    const RESTAURANT: GeoPoint = GeoPoint {
        latitude: -34.6037,
        longitude: -58.3816,
    };
    const CUSTOMER: GeoPoint = GeoPoint {
        latitude: -34.6010,
        longitude: -58.3840,
    };
    const COURIER: GeoPoint = GeoPoint {
        latitude: -34.6090,
        longitude: -58.3700,
    };

    fn seeded_store() -> Arc<InMemoryStore> {
        let store = Arc::new(InMemoryStore::new());
        store.insert_restaurant(RestaurantRecord {
            id: "r1".into(),
            restaurant_name: "La Trattoria".into(),
            restaurant_address: "Av. Corrientes 1500".into(),
            restaurant_latitude: RESTAURANT.latitude.to_string(),
            restaurant_longitude: RESTAURANT.longitude.to_string(),
        });
        store.insert_dish(DishRecord {
            id: "d1".into(),
            name: "Margherita Pizza".into(),
        });
        store.insert_line_item(LineItemRecord {
            order_id: "o1".into(),
            dish_id: "d1".into(),
            quantity: 2,
        });
        store.insert_order(OrderRecord {
            id: "o1".into(),
            restaurant_id: "r1".into(),
            restaurant_name: "La Trattoria".into(),
            restaurant_address: "Av. Corrientes 1500".into(),
            user_first_name: "Ana".into(),
            user_last_name: "Suarez".into(),
            user_address: "Lavalle 750".into(),
            user_latitude: CUSTOMER.latitude.to_string(),
            user_longitude: CUSTOMER.longitude.to_string(),
            status: OrderStatus::Ready,
            created_at: Utc::now(),
        });
        store
    }

    /// Locator with a fixed one-shot position and a silent stream.
    struct StubLocator {
        permission: Permission,
        fix: Option<GeoPoint>,
    }

    #[async_trait]
    impl Locator for StubLocator {
        async fn request_foreground_permission(&self) -> Permission {
            self.permission
        }

        async fn current_position(&self) -> Result<LivePosition, GeoError> {
            self.fix
                .map(LivePosition::now)
                .ok_or_else(|| GeoError::Unavailable("no fix".into()))
        }

        fn watch(&self, _min_distance_meters: f64) -> PositionWatch {
            let (_sender, receiver) = mpsc::unbounded_channel();
            PositionWatch::new(receiver, || {})
        }
    }

    fn granted_locator() -> Arc<StubLocator> {
        Arc::new(StubLocator {
            permission: Permission::Granted,
            fix: Some(COURIER),
        })
    }

    /// Directions stub that sleeps a scripted delay per call and counts
    /// invocations; the quote echoes its inputs through `computed_for`.
    struct ScriptedDirections {
        delays: Mutex<VecDeque<Duration>>,
        calls: AtomicUsize,
    }

    impl ScriptedDirections {
        fn new(delays: Vec<Duration>) -> Arc<Self> {
            Arc::new(Self {
                delays: Mutex::new(delays.into()),
                calls: AtomicUsize::new(0),
            })
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl DirectionsApi for ScriptedDirections {
        async fn quote(
            &self,
            origin: GeoPoint,
            destination: GeoPoint,
            waypoints: &[GeoPoint],
        ) -> Result<RouteQuote, DirectionsError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let delay = self
                .delays
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Duration::ZERO);
            sleep(delay).await;
            Ok(RouteQuote {
                polyline: vec![origin, destination],
                duration_secs: 600.0,
                distance_meters: 2_000.0,
                computed_for: RouteRequest {
                    origin,
                    destination,
                    waypoints: waypoints.to_vec(),
                },
            })
        }
    }

    /// Store wrapper that slows the status write down, to overlap advances.
    struct SlowStore {
        inner: Arc<InMemoryStore>,
        write_delay: Duration,
    }

    #[async_trait]
    impl OrderStore for SlowStore {
        fn watch_claimable(
            &self,
        ) -> Result<crate::providers::store::FeedSubscription, StoreError> {
            self.inner.watch_claimable()
        }

        async fn order(&self, id: &str) -> Result<Option<OrderRecord>, StoreError> {
            self.inner.order(id).await
        }

        async fn restaurant(&self, id: &str) -> Result<Option<RestaurantRecord>, StoreError> {
            self.inner.restaurant(id).await
        }

        async fn dish(&self, id: &str) -> Result<Option<DishRecord>, StoreError> {
            self.inner.dish(id).await
        }

        async fn line_items(&self, order_id: &str) -> Result<Vec<LineItemRecord>, StoreError> {
            self.inner.line_items(order_id).await
        }

        async fn set_order_status(
            &self,
            order_id: &str,
            status: OrderStatus,
        ) -> Result<(), StoreError> {
            sleep(self.write_delay).await;
            self.inner.set_order_status(order_id, status).await
        }
    }

    struct ViewerProbe {
        events: Arc<Mutex<Vec<ViewerEvent>>>,
    }

    impl Actor for ViewerProbe {
        type Context = Context<Self>;
    }

    impl Handler<ViewerEvent> for ViewerProbe {
        type Result = ();

        fn handle(&mut self, msg: ViewerEvent, _ctx: &mut Self::Context) -> Self::Result {
            self.events.lock().unwrap().push(msg);
        }
    }

    async fn open(
        store: Arc<InMemoryStore>,
        directions: Arc<dyn DirectionsApi>,
        locator: Arc<dyn Locator>,
        viewer: Option<Recipient<ViewerEvent>>,
    ) -> Addr<DeliverySession> {
        let order = store.order("o1").await.unwrap().unwrap();
        let gate = RoleGate::new(Role::Driver);
        open_session(&gate, order, store, directions, locator, viewer).unwrap()
    }

    #[actix_rt::test]
    async fn advance_walks_the_chain_and_persists_before_moving() {
        let store = seeded_store();
        let directions = ScriptedDirections::new(vec![]);
        let session = open(store.clone(), directions, granted_locator(), None).await;
        sleep(Duration::from_millis(50)).await;

        // Opening the session re-asserted READY.
        assert_eq!(
            store.order("o1").await.unwrap().unwrap().status,
            OrderStatus::Ready
        );

        let expected = [
            (OrderStatus::Accepted, "Pick-Up Order"),
            (OrderStatus::PickedUp, "Payment Received"),
            (OrderStatus::Complete, "Complete Delivery"),
        ];
        for (next, label) in expected {
            let outcome = session.send(Advance).await.unwrap().unwrap();
            assert_eq!(outcome, AdvanceOutcome::Moved(next));
            assert_eq!(store.order("o1").await.unwrap().unwrap().status, next);
            let panel = session.send(GetPanel).await.unwrap();
            assert_eq!(panel.status, next);
            assert_eq!(panel.button_label, label);
        }

        // Advancing at COMPLETE destroys the session.
        let outcome = session.send(Advance).await.unwrap().unwrap();
        assert_eq!(outcome, AdvanceOutcome::Closed);
        sleep(Duration::from_millis(50)).await;
        assert!(!session.connected());
    }

    #[actix_rt::test]
    async fn failed_write_blocks_the_local_transition() {
        let store = seeded_store();
        let directions = ScriptedDirections::new(vec![]);
        let session = open(store.clone(), directions, granted_locator(), None).await;
        sleep(Duration::from_millis(50)).await;

        store.inject_write_failure();
        let result = session.send(Advance).await.unwrap();
        assert!(matches!(result, Err(SessionError::StatusWrite(_))));

        // Neither side moved.
        let panel = session.send(GetPanel).await.unwrap();
        assert_eq!(panel.status, OrderStatus::Ready);
        assert_eq!(
            store.order("o1").await.unwrap().unwrap().status,
            OrderStatus::Ready
        );

        // The courier can simply press advance again.
        let outcome = session.send(Advance).await.unwrap().unwrap();
        assert_eq!(outcome, AdvanceOutcome::Moved(OrderStatus::Accepted));
    }

    #[actix_rt::test]
    async fn stale_quote_for_superseded_inputs_is_discarded() {
        let store = seeded_store();
        // First request (destination customer, while READY) is slow; the
        // request issued by the transition to ACCEPTED is fast.
        let directions = ScriptedDirections::new(vec![
            Duration::from_millis(300),
            Duration::from_millis(10),
        ]);
        let session = open(store.clone(), directions.clone(), granted_locator(), None).await;
        sleep(Duration::from_millis(60)).await;

        session.send(Advance).await.unwrap().unwrap();
        // Let both responses land: the slow READY-era quote arrives last.
        sleep(Duration::from_millis(400)).await;

        let panel = session.send(GetPanel).await.unwrap();
        let quote = panel.route.expect("a quote should be displayed");
        let dest = quote.computed_for.destination;
        assert!(
            (dest.latitude - RESTAURANT.latitude).abs() < 1e-9,
            "displayed quote must target the latest destination (restaurant), got {dest:?}"
        );
        assert_eq!(directions.call_count(), 2);
    }

    #[actix_rt::test]
    async fn destination_and_waypoints_follow_the_transition_table() {
        let store = seeded_store();
        let directions = ScriptedDirections::new(vec![]);
        let session = open(store.clone(), directions, granted_locator(), None).await;
        sleep(Duration::from_millis(60)).await;

        // READY: full trip preview, customer destination via the restaurant.
        let panel = session.send(GetPanel).await.unwrap();
        let quote = panel.route.expect("ready quote");
        assert!((quote.computed_for.destination.latitude - CUSTOMER.latitude).abs() < 1e-9);
        assert_eq!(quote.computed_for.waypoints.len(), 1);

        session.send(Advance).await.unwrap().unwrap();
        sleep(Duration::from_millis(40)).await;
        let panel = session.send(GetPanel).await.unwrap();
        let quote = panel.route.expect("accepted quote");
        assert!((quote.computed_for.destination.latitude - RESTAURANT.latitude).abs() < 1e-9);
        assert_eq!(quote.computed_for.waypoints.len(), 1);

        session.send(Advance).await.unwrap().unwrap();
        sleep(Duration::from_millis(40)).await;
        let panel = session.send(GetPanel).await.unwrap();
        let quote = panel.route.expect("picked-up quote");
        assert!((quote.computed_for.destination.latitude - CUSTOMER.latitude).abs() < 1e-9);
        assert!(quote.computed_for.waypoints.is_empty());
    }

    #[actix_rt::test]
    async fn permission_denied_means_loading_forever_and_no_quotes() {
        let store = seeded_store();
        let directions = ScriptedDirections::new(vec![]);
        let locator = Arc::new(StubLocator {
            permission: Permission::Denied,
            fix: None,
        });
        let session = open(store, directions.clone(), locator, None).await;
        sleep(Duration::from_millis(150)).await;

        let panel = session.send(GetPanel).await.unwrap();
        assert!(!panel.ready_to_render);
        assert!(panel.route.is_none());
        assert_eq!(directions.call_count(), 0);
    }

    #[actix_rt::test]
    async fn overlapping_advance_is_rejected_as_busy() {
        let store = seeded_store();
        let slow = Arc::new(SlowStore {
            inner: store.clone(),
            write_delay: Duration::from_millis(120),
        });
        let order = store.order("o1").await.unwrap().unwrap();
        let gate = RoleGate::new(Role::Driver);
        let session = open_session(
            &gate,
            order,
            slow,
            ScriptedDirections::new(vec![]),
            granted_locator(),
            None,
        )
        .unwrap();
        sleep(Duration::from_millis(50)).await;

        let (first, second) = tokio::join!(session.send(Advance), session.send(Advance));
        let first = first.unwrap();
        let second = second.unwrap();
        assert_eq!(first, Ok(AdvanceOutcome::Moved(OrderStatus::Accepted)));
        assert_eq!(second, Err(SessionError::Busy));
    }

    #[actix_rt::test]
    async fn dishes_are_resolved_into_the_panel() {
        let store = seeded_store();
        let directions = ScriptedDirections::new(vec![]);
        let session = open(store, directions, granted_locator(), None).await;
        sleep(Duration::from_millis(60)).await;

        let panel = session.send(GetPanel).await.unwrap();
        assert_eq!(panel.dishes.len(), 1);
        assert_eq!(panel.dishes[0].line, "Margherita Pizza x 2");
    }

    #[actix_rt::test]
    async fn accepting_recenters_the_camera_and_completion_closes() {
        let store = seeded_store();
        let directions = ScriptedDirections::new(vec![]);
        let events = Arc::new(Mutex::new(Vec::new()));
        let viewer = ViewerProbe {
            events: Arc::clone(&events),
        }
        .start();
        let session = open(
            store,
            directions,
            granted_locator(),
            Some(viewer.recipient()),
        )
        .await;
        sleep(Duration::from_millis(60)).await;

        for _ in 0..4 {
            session.send(Advance).await.unwrap().unwrap();
        }
        sleep(Duration::from_millis(60)).await;

        let seen = events.lock().unwrap();
        assert!(
            seen.iter()
                .any(|e| matches!(e, ViewerEvent::CameraRecenter(_))),
            "camera recenter must fire when the order is accepted"
        );
        assert!(
            seen.iter().any(|e| matches!(e, ViewerEvent::SessionClosed)),
            "viewer must learn the session was destroyed"
        );
    }

    #[actix_rt::test]
    async fn restaurant_missing_keeps_the_session_loading() {
        let store = seeded_store();
        // Point the order at a restaurant that does not exist.
        let mut order = store.order("o1").await.unwrap().unwrap();
        order.restaurant_id = "ghost".into();
        let gate = RoleGate::new(Role::Driver);
        let session = open_session(
            &gate,
            order,
            store,
            ScriptedDirections::new(vec![]),
            granted_locator(),
            None,
        )
        .unwrap();
        sleep(Duration::from_millis(80)).await;

        let panel = session.send(GetPanel).await.unwrap();
        assert!(!panel.ready_to_render);
        assert!(panel.route.is_none());
    }
}
