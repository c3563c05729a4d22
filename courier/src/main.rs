use std::sync::Arc;
use std::time::Duration;

use actix::prelude::*;
use chrono::{Duration as ChronoDuration, Utc};
use colored::Color;
use rand::Rng;
use tokio::time::sleep;
use uuid::Uuid;

use common::constants::SIMULATED_TICK_MILLIS;
use common::logger::Logger;
use common::types::geo::GeoPoint;
use common::types::order_status::OrderStatus;
use common::types::records::{DishRecord, LineItemRecord, OrderRecord, RestaurantRecord};
use common::types::role::Role;

use courier::actors::{open_session, start_feed};
use courier::gate::RoleGate;
use courier::messages::{Advance, AdvanceOutcome, FeedUpdated, Shutdown, ViewerEvent};
use courier::providers::directions::StraightLineDirections;
use courier::providers::geolocation::SimulatedLocator;
use courier::providers::memory::InMemoryStore;
use courier::providers::store::OrderStore;

const RESTAURANT: GeoPoint = GeoPoint {
    latitude: -34.6037,
    longitude: -58.3816,
};
const CUSTOMER: GeoPoint = GeoPoint {
    latitude: -34.5890,
    longitude: -58.3974,
};

/// Terminal stand-in for the driver app's screens: renders feed snapshots
/// and bottom-panel updates as log lines.
struct ConsoleViewer {
    logger: Logger,
}

impl Actor for ConsoleViewer {
    type Context = Context<Self>;
}

impl Handler<FeedUpdated> for ConsoleViewer {
    type Result = ();

    fn handle(&mut self, msg: FeedUpdated, _ctx: &mut Self::Context) -> Self::Result {
        self.logger
            .info(format!("You're Online · Available Orders: {}", msg.orders.len()));
        for order in &msg.orders {
            self.logger.info(format!(
                "  {} · {} → {}",
                order.id,
                order.restaurant_name,
                order.customer_name()
            ));
        }
    }
}

impl Handler<ViewerEvent> for ConsoleViewer {
    type Result = ();

    fn handle(&mut self, msg: ViewerEvent, _ctx: &mut Self::Context) -> Self::Result {
        match msg {
            ViewerEvent::PanelChanged(panel) => {
                if !panel.ready_to_render {
                    self.logger.info("Loading map...");
                    return;
                }
                let summary = panel.summary.unwrap_or_else(|| "quoting...".into());
                self.logger.info(format!(
                    "[{}] {} · {} · {} dishes",
                    panel.status,
                    panel.button_label,
                    summary,
                    panel.dishes.len()
                ));
            }
            ViewerEvent::CameraRecenter(point) => {
                self.logger.info(format!(
                    "camera recentered on courier at ({:.4}, {:.4})",
                    point.latitude, point.longitude
                ));
            }
            ViewerEvent::SessionClosed => {
                self.logger.info("Order Delivered · back to the feed");
            }
        }
    }
}

fn seed_world(store: &InMemoryStore) -> String {
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
    store.insert_dish(DishRecord {
        id: "d2".into(),
        name: "Tiramisu".into(),
    });

    let newest = Uuid::new_v4().to_string();
    store.insert_order(OrderRecord {
        id: newest.clone(),
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
    // An older claimable order so the feed has something to sort.
    store.insert_order(OrderRecord {
        id: Uuid::new_v4().to_string(),
        restaurant_id: "r1".into(),
        restaurant_name: "La Trattoria".into(),
        restaurant_address: "Av. Corrientes 1500".into(),
        user_first_name: "Bruno".into(),
        user_last_name: "Paz".into(),
        user_address: "Florida 200".into(),
        user_latitude: (CUSTOMER.latitude + 0.01).to_string(),
        user_longitude: CUSTOMER.longitude.to_string(),
        status: OrderStatus::Ready,
        created_at: Utc::now() - ChronoDuration::minutes(12),
    });
    store.insert_line_item(LineItemRecord {
        order_id: newest.clone(),
        dish_id: "d1".into(),
        quantity: 2,
    });
    store.insert_line_item(LineItemRecord {
        order_id: newest.clone(),
        dish_id: "d2".into(),
        quantity: 1,
    });
    newest
}

/// Straight-line walk with a little jitter, used as the simulated GPS track.
fn walk(from: GeoPoint, to: GeoPoint, steps: usize) -> Vec<GeoPoint> {
    let mut rng = rand::thread_rng();
    (0..=steps)
        .map(|i| {
            let t = i as f64 / steps as f64;
            GeoPoint {
                latitude: from.latitude + (to.latitude - from.latitude) * t
                    + rng.gen_range(-0.0001..0.0001),
                longitude: from.longitude + (to.longitude - from.longitude) * t
                    + rng.gen_range(-0.0001..0.0001),
            }
        })
        .collect()
}

#[actix::main]
async fn main() {
    let logger = Logger::new("Courier", Color::Blue);
    logger.info("starting simulated courier run");

    let store = Arc::new(InMemoryStore::new());
    let order_id = seed_world(&store);

    let gate = RoleGate::new(Role::Driver);
    let viewer = ConsoleViewer {
        logger: Logger::new("Screen", Color::White),
    }
    .start();

    let feed = start_feed(&gate, store.clone(), viewer.clone().recipient())
        .expect("driver role must pass the gate");

    // Courier starts a few blocks away and rides past the restaurant to the
    // customer's door.
    let start = GeoPoint {
        latitude: RESTAURANT.latitude - 0.02,
        longitude: RESTAURANT.longitude + 0.02,
    };
    let mut track = walk(start, RESTAURANT, 12);
    track.extend(walk(RESTAURANT, CUSTOMER, 12));
    let locator = Arc::new(SimulatedLocator::granted(
        track,
        Duration::from_millis(SIMULATED_TICK_MILLIS),
    ));
    let directions = Arc::new(StraightLineDirections::default());

    let order = store
        .order(&order_id)
        .await
        .expect("in-memory read cannot fail")
        .expect("seeded order must exist");
    let session = open_session(
        &gate,
        order,
        store.clone(),
        directions,
        locator,
        Some(viewer.clone().recipient()),
    )
    .expect("driver role must pass the gate");

    sleep(Duration::from_millis(500)).await;
    loop {
        match session.send(Advance).await {
            Ok(Ok(AdvanceOutcome::Moved(status))) => {
                logger.info(format!("advanced, order is now {status}"));
            }
            Ok(Ok(AdvanceOutcome::Closed)) => break,
            Ok(Err(e)) => logger.warn(format!("advance rejected: {e}")),
            Err(e) => {
                logger.error(format!("session mailbox closed: {e}"));
                break;
            }
        }
        sleep(Duration::from_secs(1)).await;
    }

    feed.do_send(Shutdown);
    sleep(Duration::from_millis(200)).await;
    logger.info("simulated run finished");
}
