//! Customer-side booking core for the travelmore storefront: price
//! previews, phone handling, discount checks and booking submission for
//! activities, open trips, holiday packages and car rentals.

pub mod config;
pub mod models;
pub mod services;
