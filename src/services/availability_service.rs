use chrono::NaiveDate;
use log::warn;

use crate::models::availability::AvailabilityMap;
use crate::models::service::ServiceId;
use crate::services::booking_api::BookingApi;

/// Fetches the car's calendar. A failure leaves the calendar empty, which
/// makes every day selectable; the backend re-checks on booking.
pub async fn load_availability<A: BookingApi>(api: &A, car_id: ServiceId) -> AvailabilityMap {
    match api.car_availability(car_id).await {
        Ok(availability) => availability,
        Err(err) => {
            warn!("could not load availability for car {}: {}", car_id, err);
            AvailabilityMap::new()
        }
    }
}

/// True when no day from `start` through `end` is booked or under maintenance.
pub fn range_is_bookable(availability: &AvailabilityMap, start: NaiveDate, end: NaiveDate) -> bool {
    let (from, to) = if start <= end { (start, end) } else { (end, start) };
    !availability
        .range(from..=to)
        .any(|(_, status)| status.is_blocked())
}

pub fn blocked_days(availability: &AvailabilityMap) -> Vec<NaiveDate> {
    availability
        .iter()
        .filter(|(_, status)| status.is_blocked())
        .map(|(day, _)| *day)
        .collect()
}
