pub mod client;
pub mod endpoints;
pub mod errors;
pub mod models;
