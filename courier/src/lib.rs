pub mod actors;
pub mod dishes;
pub mod errors;
pub mod gate;
pub mod messages;
pub mod providers;
pub mod view;
