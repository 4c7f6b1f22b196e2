use async_trait::async_trait;
use log::{debug, warn};
use reqwest::{header, Method, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize};
use url::Url;

use crate::config::ClientConfig;
use crate::models::{
    availability::AvailabilityMap,
    bookings::{BookingCreated, BookingRecord},
    discount::{CheckPriceRequest, CheckPriceResponse},
    orders::Order,
    service::{ServiceId, ServiceKind},
    user::{ProfileUpdate, UserProfile},
};

use super::interface::{ApiError, BookingApi};

#[derive(Debug, Deserialize, Default)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    errors: Option<serde_json::Value>,
}

impl ErrorBody {
    // Laravel-style `{ "errors": { "field": ["msg", ..] } }`
    fn first_field_error(&self) -> Option<String> {
        let errors = self.errors.as_ref()?.as_object()?;
        errors.values().find_map(|value| match value {
            serde_json::Value::String(message) => Some(message.clone()),
            serde_json::Value::Array(messages) => {
                messages.iter().find_map(|m| m.as_str().map(str::to_string))
            }
            _ => None,
        })
    }
}

pub fn create_http_client(config: &ClientConfig) -> Result<reqwest::Client, ApiError> {
    let mut headers = header::HeaderMap::new();
    headers.insert(header::ACCEPT, header::HeaderValue::from_static("application/json"));

    let client = reqwest::Client::builder()
        .timeout(config.http_timeout)
        .default_headers(headers)
        .build()?;
    Ok(client)
}

/// `BookingApi` over HTTP.
pub struct HttpBookingApi {
    client: reqwest::Client,
    base_url: Url,
    token: Option<String>,
}

impl HttpBookingApi {
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        Ok(Self {
            client: create_http_client(config)?,
            base_url: config.api_base_url.clone(),
            token: config.api_token.clone(),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| ApiError::Decode(format!("bad endpoint {}: {}", path, e)))
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ApiError> {
        let url = self.endpoint(path)?;
        debug!("{} {}", method, url);
        let builder = self.client.request(method, url);
        Ok(match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        })
    }

    async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        let response = Self::ensure_success(response).await?;
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn ensure_success(response: Response) -> Result<Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let parsed: ErrorBody = serde_json::from_str(&body).unwrap_or_default();
        warn!("booking API returned {}: {}", status, body);

        Err(ApiError::Status {
            status: status.as_u16(),
            field_error: parsed.first_field_error(),
            message: parsed.message,
        })
    }
}

#[async_trait]
impl BookingApi for HttpBookingApi {
    async fn check_price(&self, request: &CheckPriceRequest) -> Result<CheckPriceResponse, ApiError> {
        let response = self
            .request(Method::POST, "booking/check-price")?
            .json(request)
            .send()
            .await?;
        Self::read_json(response).await
    }

    async fn submit_booking(
        &self,
        kind: ServiceKind,
        service_id: ServiceId,
        payload: &serde_json::Value,
    ) -> Result<BookingCreated, ApiError> {
        let path = format!("{}/{}/book", kind.booking_path(), service_id);
        let response = self
            .request(Method::POST, &path)?
            .json(payload)
            .send()
            .await?;

        let response = Self::ensure_success(response).await?;
        let status = response.status();
        if status != StatusCode::CREATED && status != StatusCode::OK {
            return Err(ApiError::status(status.as_u16(), None));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))?;
        BookingCreated::from_body(&body)
            .ok_or_else(|| ApiError::Decode("booking response carried no order id".to_string()))
    }

    async fn my_bookings(&self) -> Result<Vec<BookingRecord>, ApiError> {
        let response = self.request(Method::GET, "my-bookings")?.send().await?;
        Self::read_json(response).await
    }

    async fn my_orders(&self) -> Result<Vec<Order>, ApiError> {
        let response = self.request(Method::GET, "my-orders")?.send().await?;
        Self::read_json(response).await
    }

    async fn my_profile(&self) -> Result<UserProfile, ApiError> {
        let response = self.request(Method::GET, "my-profile")?.send().await?;
        Self::read_json(response).await
    }

    async fn update_profile(&self, update: &ProfileUpdate) -> Result<(), ApiError> {
        let response = self
            .request(Method::PUT, "my-profile")?
            .json(update)
            .send()
            .await?;
        Self::ensure_success(response).await?;
        Ok(())
    }

    async fn car_availability(&self, car_id: ServiceId) -> Result<AvailabilityMap, ApiError> {
        let public_path = format!("public/car-rentals/{}/availability", car_id);
        let public: Result<AvailabilityMap, ApiError> =
            match self.request(Method::GET, &public_path)?.send().await {
                Ok(response) => Self::read_json(response).await,
                Err(err) => Err(ApiError::from(err)),
            };

        match public {
            Ok(availability) => Ok(availability),
            Err(err) => {
                warn!("public availability for car {} failed ({}), trying fallback", car_id, err);
                let path = format!("car-rentals/{}/availability", car_id);
                let response = self.request(Method::GET, &path)?.send().await?;
                Self::read_json(response).await
            }
        }
    }
}
