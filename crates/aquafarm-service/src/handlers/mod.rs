//! HTTP request handlers.

pub mod analytics;
pub mod cart;
pub mod health;
pub mod orders;
pub mod products;
pub mod scans;
pub mod subscriptions;
