use std::sync::Arc;
use std::time::Duration;

use actix::Recipient;
use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::UnboundedReceiverStream;

use common::constants::DISTANCE_INTERVAL_METERS;
use common::logger::Logger;
use common::types::geo::{GeoPoint, LivePosition};
use common::utils::haversine_meters;

use crate::errors::GeoError;
use crate::messages::PositionUpdate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Granted,
    Denied,
}

/// Stops a running position stream. Idempotent, also released on drop.
pub struct StopHandle {
    stop: Option<Box<dyn FnOnce() + Send>>,
}

impl StopHandle {
    pub fn new(stop: impl FnOnce() + Send + 'static) -> Self {
        Self {
            stop: Some(Box::new(stop)),
        }
    }

    pub fn stop(&mut self) {
        if let Some(stop) = self.stop.take() {
            stop();
        }
    }
}

impl Drop for StopHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

/// A cancellable, non-restartable stream of position events.
pub struct PositionWatch {
    events: mpsc::UnboundedReceiver<LivePosition>,
    stop: StopHandle,
}

impl PositionWatch {
    pub fn new(
        events: mpsc::UnboundedReceiver<LivePosition>,
        stop: impl FnOnce() + Send + 'static,
    ) -> Self {
        Self {
            events,
            stop: StopHandle::new(stop),
        }
    }

    pub fn split(self) -> (mpsc::UnboundedReceiver<LivePosition>, StopHandle) {
        (self.events, self.stop)
    }
}

/// The device geolocation capability: permission grant, one-shot read, and a
/// continuous stream with a distance-interval filter.
#[async_trait]
pub trait Locator: Send + Sync {
    async fn request_foreground_permission(&self) -> Permission;

    async fn current_position(&self) -> Result<LivePosition, GeoError>;

    /// Emits the first fix immediately, then only after the device has moved
    /// at least `min_distance_meters` from the last emitted fix.
    fn watch(&self, min_distance_meters: f64) -> PositionWatch;
}

/// Walks a fixed path on a timer, honoring the distance filter. Stands in
/// for the device GPS in the demo and in tests.
pub struct SimulatedLocator {
    permission: Permission,
    path: Vec<GeoPoint>,
    tick: Duration,
}

impl SimulatedLocator {
    pub fn granted(path: Vec<GeoPoint>, tick: Duration) -> Self {
        Self {
            permission: Permission::Granted,
            path,
            tick,
        }
    }

    pub fn denied() -> Self {
        Self {
            permission: Permission::Denied,
            path: Vec::new(),
            tick: Duration::from_millis(0),
        }
    }
}

#[async_trait]
impl Locator for SimulatedLocator {
    async fn request_foreground_permission(&self) -> Permission {
        self.permission
    }

    async fn current_position(&self) -> Result<LivePosition, GeoError> {
        self.path
            .first()
            .copied()
            .map(LivePosition::now)
            .ok_or_else(|| GeoError::Unavailable("simulated path is empty".into()))
    }

    fn watch(&self, min_distance_meters: f64) -> PositionWatch {
        let (sender, receiver) = mpsc::unbounded_channel();
        let path = self.path.clone();
        let tick = self.tick;
        let task = tokio::spawn(async move {
            let mut last_emitted: Option<GeoPoint> = None;
            for point in path {
                let moved_enough = match last_emitted {
                    None => true,
                    Some(last) => haversine_meters(last, point) >= min_distance_meters,
                };
                if moved_enough {
                    if sender.send(LivePosition::now(point)).is_err() {
                        return;
                    }
                    last_emitted = Some(point);
                }
                tokio::time::sleep(tick).await;
            }
        });
        PositionWatch::new(receiver, move || task.abort())
    }
}

/// The geolocation stream adapter: owns the permission grant and the watch,
/// and marshals every position onto the consumer's mailbox so updates are
/// never handled concurrently.
pub struct LocationFeed {
    forward: Option<JoinHandle<()>>,
    watch_stop: Option<StopHandle>,
}

impl LocationFeed {
    /// Requests foreground permission and starts the stream. A one-shot read
    /// is delivered first so the map can render before the device moves.
    pub async fn begin(
        locator: Arc<dyn Locator>,
        consumer: Recipient<PositionUpdate>,
        logger: Logger,
    ) -> Result<LocationFeed, GeoError> {
        if locator.request_foreground_permission().await == Permission::Denied {
            return Err(GeoError::PermissionDenied);
        }

        match locator.current_position().await {
            Ok(position) => consumer.do_send(PositionUpdate(position)),
            Err(e) => logger.warn(format!("one-shot position read failed: {e}")),
        }

        let (receiver, stop) = locator.watch(DISTANCE_INTERVAL_METERS).split();
        let forward = tokio::spawn(async move {
            let mut events = UnboundedReceiverStream::new(receiver);
            while let Some(position) = events.next().await {
                consumer.do_send(PositionUpdate(position));
            }
        });

        Ok(Self {
            forward: Some(forward),
            watch_stop: Some(stop),
        })
    }

    /// Releases the watch and the forwarding task. Idempotent; invoked on
    /// session teardown and again on drop.
    pub fn stop(&mut self) {
        if let Some(mut stop) = self.watch_stop.take() {
            stop.stop();
        }
        if let Some(task) = self.forward.take() {
            task.abort();
        }
    }
}

impl Drop for LocationFeed {
    fn drop(&mut self) {
        self.stop();
    }
}
