use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::service::{deserialize_lenient_amount, Amount, ServiceId, ServiceKind};

/// Participant parameters sent with a price check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaxParams {
    Quantity(u32),
    Party { adults: u32, children: u32 },
    /// Car rentals are priced by date range only.
    Dates { start: NaiveDate, end: NaiveDate },
}

/// Body of `POST /booking/check-price`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckPriceRequest {
    #[serde(rename = "type")]
    pub kind: ServiceKind,
    pub id: ServiceId,
    pub discount_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adults: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    pub selected_addons: Vec<String>,
}

impl CheckPriceRequest {
    pub fn new(
        kind: ServiceKind,
        id: ServiceId,
        discount_code: impl Into<String>,
        pax: PaxParams,
        selected_addons: Vec<String>,
    ) -> Self {
        let mut request = Self {
            kind,
            id,
            discount_code: discount_code.into(),
            quantity: None,
            adults: None,
            children: None,
            start_date: None,
            end_date: None,
            selected_addons,
        };
        match pax {
            PaxParams::Quantity(quantity) => request.quantity = Some(quantity),
            PaxParams::Party { adults, children } => {
                request.adults = Some(adults);
                request.children = Some(children);
            }
            PaxParams::Dates { start, end } => {
                request.start_date = Some(start);
                request.end_date = Some(end);
            }
        }
        request
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CheckPriceResponse {
    #[serde(deserialize_with = "deserialize_lenient_amount", default)]
    pub discount_amount: Amount,
    #[serde(deserialize_with = "deserialize_lenient_amount", default)]
    pub total_amount: Amount,
    #[serde(default)]
    pub message: Option<String>,
}

/// Outcome of the last discount-code check that was allowed to land.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum DiscountState {
    #[default]
    Unchecked,
    Applied { amount: Amount, code: String },
    Rejected { reason: String },
}

impl DiscountState {
    pub fn is_applied(&self) -> bool {
        matches!(self, DiscountState::Applied { .. })
    }

    /// Amount to subtract from the subtotal; zero unless applied.
    pub fn amount(&self) -> Amount {
        match self {
            DiscountState::Applied { amount, .. } => *amount,
            _ => 0.0,
        }
    }

    /// Code to send with a booking. Only an applied code is ever sent.
    pub fn applied_code(&self) -> Option<&str> {
        match self {
            DiscountState::Applied { code, .. } => Some(code),
            _ => None,
        }
    }
}
