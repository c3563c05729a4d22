use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle of one order as persisted in the shared store. Transitions are
/// strictly forward, driven only by the courier's advance action.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum OrderStatus {
    /// Claimable: visible to every courier, not yet assigned.
    #[serde(rename = "READY")]
    Ready,
    /// A courier accepted the order and is heading to the restaurant.
    #[serde(rename = "DRIVERACCEPTED")]
    Accepted,
    /// The courier holds the food and is heading to the customer.
    #[serde(rename = "DRIVERPICKEDUP")]
    PickedUp,
    /// Terminal.
    #[serde(rename = "COMPLETE")]
    Complete,
}

impl OrderStatus {
    /// The only legal successor, `None` once terminal. No state is
    /// re-enterable and no step can be skipped.
    pub fn next(self) -> Option<OrderStatus> {
        match self {
            OrderStatus::Ready => Some(OrderStatus::Accepted),
            OrderStatus::Accepted => Some(OrderStatus::PickedUp),
            OrderStatus::PickedUp => Some(OrderStatus::Complete),
            OrderStatus::Complete => None,
        }
    }

    /// Wire value used by the backing store's status field.
    pub fn as_wire(self) -> &'static str {
        match self {
            OrderStatus::Ready => "READY",
            OrderStatus::Accepted => "DRIVERACCEPTED",
            OrderStatus::PickedUp => "DRIVERPICKEDUP",
            OrderStatus::Complete => "COMPLETE",
        }
    }

    pub fn is_claimable(self) -> bool {
        self == OrderStatus::Ready
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_wire())
    }
}
