use serde::{Deserialize, Serialize};
use std::fmt;

/// Account role assigned at signup by the auth collaborator. Only couriers
/// with the `Driver` role may enter the feed and delivery screens.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Customer,
    Driver,
    Restaurant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Customer => write!(f, "customer"),
            Role::Driver => write!(f, "driver"),
            Role::Restaurant => write!(f, "restaurant"),
        }
    }
}
