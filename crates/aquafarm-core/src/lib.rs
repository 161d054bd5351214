//! Core types and pure logic for the aquafarm backend.
//!
//! This crate provides the foundational types used throughout the platform:
//!
//! - **Identifiers**: `UserId`, `ProductId`, `OrderId`, `PondId`, `ScanId`,
//!   `TransactionId`
//! - **Users & carts**: `User`, `Role`, `Cart`, `CartLine`
//! - **Storefront**: `Product`, `Order`, `OrderItem`, `OrderStatus`
//! - **Subscriptions**: `Subscription`, `Plan`, `PaymentRecord`, `PlanCatalog`
//! - **Scans & analytics**: `ScanResult` and the aggregation functions in
//!   [`analytics`]
//!
//! # Money
//!
//! All prices are integer cents (`i64`) to avoid floating point precision
//! issues. A completed order freezes its line prices and total at creation;
//! the cart always shows live product prices.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod analytics;
pub mod ids;
pub mod order;
pub mod plans;
pub mod product;
pub mod scan;
pub mod subscription;
pub mod user;

pub use analytics::{DailyCount, DailyHealthPoint, FrequencyReport};
pub use ids::{IdError, OrderId, PondId, ProductId, ScanId, TransactionId, UserId};
pub use order::{Order, OrderItem, OrderStatus};
pub use plans::{PlanCatalog, PlanSpec, ENTERPRISE_PLAN_PRICE_CENTS, PREMIUM_PLAN_PRICE_CENTS};
pub use product::Product;
pub use scan::ScanResult;
pub use subscription::{
    PaymentRecord, PaymentStatus, Plan, Subscription, SubscriptionStatus, BILLING_PERIOD_DAYS,
};
pub use user::{Cart, CartLine, Role, User};
