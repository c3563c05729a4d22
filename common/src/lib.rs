pub mod constants;
pub mod logger;
pub mod types;
pub mod utils;
