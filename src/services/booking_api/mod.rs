pub mod interface;
pub mod provider;

pub use interface::{ApiError, BookingApi};
pub use provider::HttpBookingApi;
