pub mod cache;
pub mod client;
pub mod normalize;
pub mod schema;
pub mod store;
pub mod views;
