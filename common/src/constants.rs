/// Minimum device movement before a new live position is emitted.
/// Coarse on purpose: bounds update frequency and backend write volume.
pub const DISTANCE_INTERVAL_METERS: f64 = 100.0;

/// Mean earth radius used by the haversine distance.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Assumed courier speed for simulated route quotes (roughly 29 km/h).
pub const AVERAGE_SPEED_MPS: f64 = 8.0;

/// Tick of the simulated position walker.
pub const SIMULATED_TICK_MILLIS: u64 = 250;
