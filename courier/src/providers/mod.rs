pub mod directions;
pub mod geolocation;
pub mod memory;
pub mod store;
