use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Currency amount in rupiah. Prices come from the API as numbers or
/// decimal strings ("350000.00").
pub type Amount = f64;

pub type ServiceId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceKind {
    Activity,
    OpenTrip,
    HolidayPackage,
    CarRental,
}

impl ServiceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceKind::Activity => "activity",
            ServiceKind::OpenTrip => "open_trip",
            ServiceKind::HolidayPackage => "holiday_package",
            ServiceKind::CarRental => "car_rental",
        }
    }

    /// Path segment of the service's booking endpoint.
    pub fn booking_path(&self) -> &'static str {
        match self {
            ServiceKind::Activity => "activities",
            ServiceKind::OpenTrip => "open-trips",
            ServiceKind::HolidayPackage => "packages",
            ServiceKind::CarRental => "car-rentals",
        }
    }
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct PriceTier {
    #[serde(deserialize_with = "deserialize_lenient_count")]
    pub min_pax: u32,
    // 0 and null both mean the tier has no upper bound
    #[serde(deserialize_with = "deserialize_optional_bound", default)]
    pub max_pax: Option<u32>,
    #[serde(deserialize_with = "deserialize_lenient_amount")]
    pub price: Amount,
}

impl PriceTier {
    pub fn contains(&self, pax: u32) -> bool {
        pax >= self.min_pax && self.max_pax.map_or(true, |max| pax <= max)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Addon {
    pub name: String,
    #[serde(deserialize_with = "deserialize_lenient_amount")]
    pub price: Amount,
}

/// Snapshot of a bookable offering as served by the catalogue endpoints.
///
/// Activities carry `price`, packages and open trips `starting_from_price`,
/// cars `price_per_day`.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Service {
    pub id: ServiceId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(deserialize_with = "deserialize_optional_amount", default)]
    pub price: Option<Amount>,
    #[serde(deserialize_with = "deserialize_optional_amount", default)]
    pub starting_from_price: Option<Amount>,
    #[serde(deserialize_with = "deserialize_optional_amount", default)]
    pub price_per_day: Option<Amount>,
    #[serde(default)]
    pub price_tiers: Option<Vec<PriceTier>>,
    #[serde(default)]
    pub addons: Option<Vec<Addon>>,
}

impl Service {
    /// Flat price used when no tier applies. Missing prices count as zero.
    pub fn base_price(&self) -> Amount {
        self.price
            .or(self.starting_from_price)
            .or(self.price_per_day)
            .unwrap_or(0.0)
    }

    pub fn tiers(&self) -> &[PriceTier] {
        self.price_tiers.as_deref().unwrap_or(&[])
    }

    pub fn addons(&self) -> &[Addon] {
        self.addons.as_deref().unwrap_or(&[])
    }
}

fn amount_from_value(value: &serde_json::Value) -> Option<Amount> {
    match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|amount| amount.is_finite())
}

// Non-numeric prices coerce to zero instead of failing the whole snapshot
pub(crate) fn deserialize_lenient_amount<'de, D>(deserializer: D) -> Result<Amount, D::Error>
where
    D: Deserializer<'de>,
{
    let value: serde_json::Value = serde_json::Value::deserialize(deserializer)?;
    Ok(amount_from_value(&value).unwrap_or(0.0))
}

pub(crate) fn deserialize_optional_amount<'de, D>(
    deserializer: D,
) -> Result<Option<Amount>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<serde_json::Value> = Option::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(amount_from_value))
}

fn count_from_value(value: &serde_json::Value) -> Option<u32> {
    match value {
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_u64() {
                Some(i.min(u32::MAX as u64) as u32)
            } else {
                n.as_f64().filter(|f| *f >= 0.0).map(|f| f.ceil() as u32)
            }
        }
        serde_json::Value::String(s) => s.trim().parse::<u32>().ok(),
        _ => None,
    }
}

fn deserialize_lenient_count<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value: serde_json::Value = serde_json::Value::deserialize(deserializer)?;
    Ok(count_from_value(&value).unwrap_or(0))
}

fn deserialize_optional_bound<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<serde_json::Value> = Option::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(count_from_value)
        .filter(|max| *max > 0))
}
