pub mod availability;
pub mod bookings;
pub mod discount;
pub mod orders;
pub mod service;
pub mod user;
