use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::orders::deserialize_lenient_date;
use super::service::{deserialize_lenient_amount, Amount};

pub type OrderId = u64;

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct ActivityBookingPayload {
    pub booking_date: NaiveDate,
    pub activity_time: String,
    pub quantity: u32,
    pub participant_nationality: String,
    pub full_name: String,
    pub email: String,
    pub phone_number: String,
    pub pickup_location: String,
    pub special_request: Option<String>,
    pub selected_addons: Vec<String>,
    pub discount_code: Option<String>,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct OpenTripBookingPayload {
    pub start_date: NaiveDate,
    pub adults: u32,
    pub children: u32,
    pub full_name: String,
    pub email: String,
    pub phone_number: String,
    pub participant_nationality: String,
    /// The chosen meeting point.
    pub pickup_location: String,
    pub special_request: Option<String>,
    pub discount_code: Option<String>,
    pub selected_addons: Vec<String>,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct PackageBookingPayload {
    pub start_date: NaiveDate,
    pub adults: u32,
    pub children: u32,
    pub discount_code: Option<String>,
    pub participant_nationality: String,
    pub full_name: String,
    pub email: String,
    pub phone_number: String,
    pub pickup_location: String,
    pub flight_number: Option<String>,
    pub special_request: Option<String>,
    pub selected_addons: Vec<String>,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct CarRentalBookingPayload {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub full_name: String,
    pub email: String,
    pub phone_number: String,
    pub pickup_location: String,
    pub pickup_time: String,
    pub special_request: Option<String>,
    pub discount_code: Option<String>,
}

/// Response of a successful `POST /{service}/{id}/book`.
///
/// Flows disagree on the shape: `{ "order": { "id": .. } }`, `{ "order_id": .. }`
/// or a bare `{ "id": .. }` all occur.
#[derive(Debug, Clone, PartialEq)]
pub struct BookingCreated {
    pub order_id: OrderId,
}

impl BookingCreated {
    pub fn from_body(body: &serde_json::Value) -> Option<Self> {
        body.get("order")
            .and_then(|order| order.get("id"))
            .or_else(|| body.get("order_id"))
            .or_else(|| body.get("id"))
            .and_then(|id| match id {
                serde_json::Value::Number(n) => n.as_u64(),
                serde_json::Value::String(s) => s.parse().ok(),
                _ => None,
            })
            .map(|order_id| BookingCreated { order_id })
    }
}

/// Service family a history record belongs to, from the backend's
/// `bookable_type` class name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookableCategory {
    CarRental,
    TripPlanner,
    HolidayPackage,
    Activity,
    OpenTrip,
    Other,
}

impl BookableCategory {
    pub fn from_bookable_type(bookable_type: &str) -> Self {
        if bookable_type.contains("CarRental") {
            BookableCategory::CarRental
        } else if bookable_type.contains("TripPlanner") {
            BookableCategory::TripPlanner
        } else if bookable_type.contains("HolidayPackage") {
            BookableCategory::HolidayPackage
        } else if bookable_type.contains("Activity") {
            BookableCategory::Activity
        } else if bookable_type.contains("OpenTrip") {
            BookableCategory::OpenTrip
        } else {
            BookableCategory::Other
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            BookableCategory::CarRental => "Car Rental",
            BookableCategory::TripPlanner => "Trip Planner",
            BookableCategory::HolidayPackage => "Holiday Package",
            BookableCategory::Activity => "Activity",
            BookableCategory::OpenTrip => "Open Trip",
            BookableCategory::Other => "Service",
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Bookable {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub car_model: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct SelectedAddon {
    pub name: String,
    #[serde(deserialize_with = "deserialize_lenient_amount")]
    pub price: Amount,
}

/// Entry of `GET /my-bookings` (also embedded in orders).
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct BookingRecord {
    pub id: u64,
    #[serde(default)]
    pub bookable_type: String,
    #[serde(deserialize_with = "deserialize_lenient_date", default)]
    pub start_date: Option<NaiveDate>,
    #[serde(deserialize_with = "deserialize_lenient_date", default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub payment_status: Option<String>,
    // Free-form per service; see the accessors below for the keys we read
    #[serde(default)]
    pub details: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    pub bookable: Option<Bookable>,
}

impl BookingRecord {
    pub fn category(&self) -> BookableCategory {
        BookableCategory::from_bookable_type(&self.bookable_type)
    }

    pub fn service_name(&self) -> String {
        if let Some(name) = self.detail_str("service_name") {
            return name.to_string();
        }
        match &self.bookable {
            Some(Bookable { name: Some(name), .. }) => name.clone(),
            Some(Bookable {
                brand: Some(brand),
                car_model: Some(model),
                ..
            }) => format!("{} {}", brand, model),
            _ => "Service Booking".to_string(),
        }
    }

    pub fn is_paid(&self) -> bool {
        self.payment_status.as_deref() == Some("paid")
    }

    /// Refunds can be requested for paid bookings that have not run yet.
    pub fn can_refund(&self) -> bool {
        self.is_paid() && (self.status == "confirmed" || self.status == "pending")
    }

    /// Head count recorded with the booking, whichever key the flow used.
    pub fn total_pax(&self) -> u32 {
        if let Some(total) = self.detail_u32("total_pax") {
            return total;
        }
        let party = self.detail_u32("adults").unwrap_or(0) + self.detail_u32("children").unwrap_or(0);
        if party > 0 {
            return party;
        }
        self.detail_u32("quantity")
            .or_else(|| self.detail_u32("num_participants"))
            .unwrap_or(0)
    }

    pub fn selected_addons(&self) -> Vec<SelectedAddon> {
        self.details
            .get("selected_addons")
            .cloned()
            .and_then(|value| serde_json::from_value(value).ok())
            .unwrap_or_default()
    }

    pub fn detail_str(&self, key: &str) -> Option<&str> {
        self.details
            .get(key)
            .and_then(|value| value.as_str())
            .filter(|value| !value.is_empty())
    }

    fn detail_u32(&self, key: &str) -> Option<u32> {
        self.details.get(key).and_then(|value| match value {
            serde_json::Value::Number(n) => n.as_u64().map(|n| n as u32),
            serde_json::Value::String(s) => s.parse().ok(),
            _ => None,
        })
    }
}
