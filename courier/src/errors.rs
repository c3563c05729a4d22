use thiserror::Error;

/// Failures coming back from the shared document store.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("write rejected: {0}")]
    WriteFailed(String),
}

/// Transient failures from the directions provider. Logged, previous quote
/// retained, never retried until the inputs next change.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DirectionsError {
    #[error("directions provider failed: {0}")]
    Transient(String),
}

/// Failures from the geolocation capability.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GeoError {
    #[error("foreground location permission denied")]
    PermissionDenied,
    #[error("no position available: {0}")]
    Unavailable(String),
}

/// Failures surfaced by the delivery session to its caller.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// The persistence write did not land, so the local status was not
    /// advanced. The courier may press advance again.
    #[error("status write failed, local state unchanged: {0}")]
    StatusWrite(#[from] StoreError),
    #[error("a transition is already in flight")]
    Busy,
    #[error("access denied: the courier screens require the driver role")]
    AccessDenied,
}
