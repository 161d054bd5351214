//! HTTP API service for the aquafarm backend.
//!
//! The service exposes the storefront core (cart, checkout, orders), the
//! subscription lifecycle, and the scan analytics aggregator over a RocksDB
//! document store.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use config::ServiceConfig;
pub use error::ApiError;
pub use routes::create_router;
pub use state::AppState;
