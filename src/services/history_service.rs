use chrono::{DateTime, Utc};
use log::warn;

use crate::models::{bookings::BookingRecord, orders::Order};
use crate::services::booking_api::{ApiError, BookingApi};

/// What the profile page lists: bookings and the orders paying for them.
#[derive(Debug, Clone, Default)]
pub struct BookingHistory {
    pub bookings: Vec<BookingRecord>,
    pub orders: Vec<Order>,
}

impl BookingHistory {
    /// Orders that still need payment and are not past their deadline.
    pub fn payable_orders(&self, now: DateTime<Utc>) -> Vec<&Order> {
        self.orders
            .iter()
            .filter(|order| order.awaiting_payment() && !order.is_overdue(now))
            .collect()
    }

    /// Orders newest first; orders without a timestamp go last.
    pub fn orders_newest_first(&self) -> Vec<&Order> {
        let mut orders: Vec<&Order> = self.orders.iter().collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        orders
    }
}

pub async fn load_history<A: BookingApi>(api: &A) -> Result<BookingHistory, ApiError> {
    let (bookings, orders) = futures::try_join!(api.my_bookings(), api.my_orders()).map_err(|err| {
        warn!("loading booking history failed: {}", err);
        err
    })?;
    Ok(BookingHistory { bookings, orders })
}
