pub mod client;
pub mod config;
pub mod counts;
pub mod models;
