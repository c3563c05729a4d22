use async_trait::async_trait;

use common::constants::AVERAGE_SPEED_MPS;
use common::types::geo::GeoPoint;
use common::types::route::{RouteQuote, RouteRequest};
use common::utils::haversine_meters;

use crate::errors::DirectionsError;

/// Remote directions/ETA capability. Stateless; one attempt per input
/// change, and a failure leaves the previous quote in place.
#[async_trait]
pub trait DirectionsApi: Send + Sync {
    async fn quote(
        &self,
        origin: GeoPoint,
        destination: GeoPoint,
        waypoints: &[GeoPoint],
    ) -> Result<RouteQuote, DirectionsError>;
}

/// Straight-line provider for the simulated world: the polyline runs
/// origin → waypoints → destination, distance is the haversine leg sum and
/// duration assumes a constant courier speed.
pub struct StraightLineDirections {
    pub speed_mps: f64,
}

impl Default for StraightLineDirections {
    fn default() -> Self {
        Self {
            speed_mps: AVERAGE_SPEED_MPS,
        }
    }
}

#[async_trait]
impl DirectionsApi for StraightLineDirections {
    async fn quote(
        &self,
        origin: GeoPoint,
        destination: GeoPoint,
        waypoints: &[GeoPoint],
    ) -> Result<RouteQuote, DirectionsError> {
        let mut polyline = Vec::with_capacity(waypoints.len() + 2);
        polyline.push(origin);
        polyline.extend_from_slice(waypoints);
        polyline.push(destination);

        let distance_meters: f64 = polyline
            .windows(2)
            .map(|leg| haversine_meters(leg[0], leg[1]))
            .sum();

        Ok(RouteQuote {
            duration_secs: distance_meters / self.speed_mps,
            distance_meters,
            polyline,
            computed_for: RouteRequest {
                origin,
                destination,
                waypoints: waypoints.to_vec(),
            },
        })
    }
}
