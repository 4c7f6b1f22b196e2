use async_trait::async_trait;
use thiserror::Error;

use crate::models::{
    availability::AvailabilityMap,
    bookings::{BookingCreated, BookingRecord},
    discount::{CheckPriceRequest, CheckPriceResponse},
    orders::Order,
    service::{ServiceId, ServiceKind},
    user::{ProfileUpdate, UserProfile},
};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("server responded with status {status}")]
    Status {
        status: u16,
        /// `message` from the error body, if the server sent one.
        message: Option<String>,
        /// First entry of a 422 `errors` object.
        field_error: Option<String>,
    },
    #[error("unexpected response body: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn status(status: u16, message: Option<String>) -> Self {
        ApiError::Status {
            status,
            message,
            field_error: None,
        }
    }

    /// Text to show the user: the server's own explanation when it gave
    /// one, otherwise `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ApiError::Status {
                status: 422,
                field_error: Some(field_error),
                ..
            } => field_error.clone(),
            ApiError::Status {
                message: Some(message),
                ..
            } if !message.trim().is_empty() => message.clone(),
            _ => fallback.to_string(),
        }
    }
}

/// The remote booking backend, as far as the booking flows need it.
#[async_trait]
pub trait BookingApi: Send + Sync + 'static {
    async fn check_price(&self, request: &CheckPriceRequest) -> Result<CheckPriceResponse, ApiError>;

    async fn submit_booking(
        &self,
        kind: ServiceKind,
        service_id: ServiceId,
        payload: &serde_json::Value,
    ) -> Result<BookingCreated, ApiError>;

    async fn my_bookings(&self) -> Result<Vec<BookingRecord>, ApiError>;

    async fn my_orders(&self) -> Result<Vec<Order>, ApiError>;

    async fn my_profile(&self) -> Result<UserProfile, ApiError>;

    async fn update_profile(&self, update: &ProfileUpdate) -> Result<(), ApiError>;

    async fn car_availability(&self, car_id: ServiceId) -> Result<AvailabilityMap, ApiError>;
}
