use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::bookings::BookingRecord;
use super::service::{deserialize_lenient_amount, Amount};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct OrderItem {
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub quantity: u32,
    #[serde(deserialize_with = "deserialize_lenient_amount", default)]
    pub price: Amount,
    #[serde(default)]
    pub orderable_type: String,
}

impl OrderItem {
    pub fn is_addon(&self) -> bool {
        self.name
            .as_deref()
            .map_or(false, |name| name.to_lowercase().contains("add-on"))
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Transaction {
    pub id: u64,
    #[serde(default)]
    pub transaction_code: Option<String>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub payment_type: String,
    #[serde(deserialize_with = "deserialize_lenient_amount", default)]
    pub gross_amount: Amount,
    #[serde(deserialize_with = "deserialize_lenient_datetime", default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Entry of `GET /my-orders`.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Order {
    pub id: u64,
    pub order_number: String,
    pub status: String,
    #[serde(default)]
    pub payment_status: String,
    #[serde(deserialize_with = "deserialize_lenient_amount", default)]
    pub subtotal: Amount,
    #[serde(deserialize_with = "deserialize_lenient_amount", default)]
    pub total_amount: Amount,
    #[serde(deserialize_with = "deserialize_lenient_amount", default)]
    pub discount_amount: Amount,
    #[serde(deserialize_with = "deserialize_lenient_datetime", default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(deserialize_with = "deserialize_lenient_datetime", default)]
    pub payment_deadline: Option<DateTime<Utc>>,
    #[serde(default)]
    pub order_items: Vec<OrderItem>,
    #[serde(default)]
    pub transaction: Option<Transaction>,
    #[serde(default)]
    pub booking: Option<BookingRecord>,
}

impl Order {
    /// Pending orders with a deadline still need to be paid.
    pub fn awaiting_payment(&self) -> bool {
        self.status == "pending" && self.payment_deadline.is_some()
    }

    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.awaiting_payment() && self.payment_deadline.map_or(false, |deadline| deadline < now)
    }
}

fn parse_datetime(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(parsed.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|parsed| parsed.and_utc())
}

// The backend mixes RFC 3339 and "Y-m-d H:i:s" timestamps
pub(crate) fn deserialize_lenient_datetime<'de, D>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.as_deref().and_then(parse_datetime))
}

pub(crate) fn deserialize_lenient_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value
        .as_deref()
        .and_then(parse_datetime)
        .map(|parsed| parsed.date_naive()))
}
