pub mod geo;
pub mod order_status;
pub mod records;
pub mod role;
pub mod route;
