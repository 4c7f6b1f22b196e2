//! Discount-code verification against `POST /booking/check-price`.
//!
//! Every trigger (a manual apply, a scheduled re-check, a code edit) takes a
//! new generation number. A check only writes its result if its generation
//! is still the latest when the response arrives, which covers both the
//! debounce cancel and out-of-order responses.

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use log::{debug, info, warn};
use tokio::task::JoinHandle;

use crate::models::discount::{CheckPriceRequest, DiscountState};
use crate::services::booking_api::BookingApi;

pub const NO_DISCOUNT_MESSAGE: &str = "No discount applicable.";
pub const INVALID_CODE_MESSAGE: &str = "Invalid code.";

#[derive(Default)]
struct Shared {
    state: DiscountState,
    generation: u64,
    in_flight: Option<u64>,
    pending: Option<JoinHandle<()>>,
    closed: bool,
}

impl Shared {
    /// A verdict exists or is on its way, so price edits must re-check it.
    fn tracks_code(&self) -> bool {
        self.state.is_applied()
            || self.in_flight == Some(self.generation)
            || self.pending.as_ref().map_or(false, |pending| !pending.is_finished())
    }

    fn next_generation(&mut self) -> u64 {
        self.generation += 1;
        if let Some(pending) = self.pending.take() {
            pending.abort();
        }
        self.generation
    }
}

fn lock(shared: &Mutex<Shared>) -> MutexGuard<'_, Shared> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct DiscountValidator<A: BookingApi> {
    api: Arc<A>,
    shared: Arc<Mutex<Shared>>,
    debounce: Duration,
}

impl<A: BookingApi> Clone for DiscountValidator<A> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
            shared: Arc::clone(&self.shared),
            debounce: self.debounce,
        }
    }
}

impl<A: BookingApi> DiscountValidator<A> {
    pub fn new(api: Arc<A>, debounce: Duration) -> Self {
        Self {
            api,
            shared: Arc::new(Mutex::new(Shared::default())),
            debounce,
        }
    }

    pub fn state(&self) -> DiscountState {
        lock(&self.shared).state.clone()
    }

    /// True while the latest check is waiting on the network.
    pub fn is_checking(&self) -> bool {
        let shared = lock(&self.shared);
        shared.in_flight.is_some() && shared.in_flight == Some(shared.generation)
    }

    pub fn has_pending_revalidation(&self) -> bool {
        lock(&self.shared)
            .pending
            .as_ref()
            .map_or(false, |pending| !pending.is_finished())
    }

    /// Whether a price edit should trigger a re-check: the code is applied,
    /// being checked, or already waiting on a re-check.
    pub fn needs_revalidation(&self) -> bool {
        let shared = lock(&self.shared);
        !shared.closed && shared.tracks_code()
    }

    /// The code text changed: forget any result and ignore whatever is
    /// still in flight.
    pub fn reset(&self) {
        let mut shared = lock(&self.shared);
        shared.next_generation();
        shared.in_flight = None;
        shared.state = DiscountState::Unchecked;
    }

    /// Records a rejection decided locally, without asking the server.
    pub fn reject(&self, reason: impl Into<String>) {
        let mut shared = lock(&self.shared);
        shared.next_generation();
        shared.in_flight = None;
        shared.state = DiscountState::Rejected { reason: reason.into() };
    }

    /// Checks `request.discount_code` now.
    ///
    /// The generation is taken when this is called, not when the future is
    /// first polled, so trigger order decides which result wins. A blank
    /// code resolves to the current state without any request.
    pub fn validate(
        &self,
        request: CheckPriceRequest,
    ) -> impl Future<Output = DiscountState> + Send + 'static {
        let generation = if request.discount_code.trim().is_empty() {
            None
        } else {
            Some(lock(&self.shared).next_generation())
        };
        let this = self.clone();

        async move {
            match generation {
                Some(generation) => this.run_check(generation, request).await,
                None => this.state(),
            }
        }
    }

    /// Re-checks the code once changes have been quiet for the debounce
    /// window. Only applies while [`needs_revalidation`](Self::needs_revalidation)
    /// holds; a check still in flight is superseded. Returns whether a check
    /// was scheduled.
    pub fn schedule_revalidation(&self, request: CheckPriceRequest) -> bool {
        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(runtime) => runtime,
            Err(_) => {
                warn!("no async runtime; skipping discount re-check");
                return false;
            }
        };

        let mut shared = lock(&self.shared);
        if shared.closed || !shared.tracks_code() || request.discount_code.trim().is_empty() {
            return false;
        }

        let generation = shared.next_generation();
        let this = self.clone();
        let delay = self.debounce;
        shared.pending = Some(runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            this.run_check(generation, request).await;
        }));
        true
    }

    /// Stops all further state changes. Called when the form goes away.
    pub fn shutdown(&self) {
        let mut shared = lock(&self.shared);
        shared.closed = true;
        shared.in_flight = None;
        shared.next_generation();
    }

    async fn run_check(&self, generation: u64, request: CheckPriceRequest) -> DiscountState {
        {
            let mut shared = lock(&self.shared);
            if shared.closed || shared.generation != generation {
                return shared.state.clone();
            }
            shared.in_flight = Some(generation);
        }

        let result = self.api.check_price(&request).await;

        let mut shared = lock(&self.shared);
        if shared.in_flight == Some(generation) {
            shared.in_flight = None;
        }
        if shared.closed || shared.generation != generation {
            debug!(
                "discarding stale discount check for {:?} (generation {}, latest {})",
                request.discount_code, generation, shared.generation
            );
            return shared.state.clone();
        }

        shared.state = match result {
            Ok(response) if response.discount_amount > 0.0 => {
                info!(
                    "discount {:?} applied: {}",
                    request.discount_code, response.discount_amount
                );
                DiscountState::Applied {
                    amount: response.discount_amount,
                    code: request.discount_code.clone(),
                }
            }
            Ok(_) => DiscountState::Rejected {
                reason: NO_DISCOUNT_MESSAGE.to_string(),
            },
            Err(err) => {
                warn!("discount check for {:?} failed: {}", request.discount_code, err);
                DiscountState::Rejected {
                    reason: err.user_message(INVALID_CODE_MESSAGE),
                }
            }
        };
        shared.state.clone()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::{
        availability::AvailabilityMap,
        bookings::{BookingCreated, BookingRecord},
        discount::{CheckPriceResponse, PaxParams},
        orders::Order,
        service::{ServiceId, ServiceKind},
        user::{ProfileUpdate, UserProfile},
    };
    use crate::services::booking_api::ApiError;
    use async_trait::async_trait;
    use std::collections::HashMap;

    /// In-memory backend. Discounts and delays are keyed by code.
    #[derive(Default)]
    pub(crate) struct FakeApi {
        pub discounts: HashMap<String, f64>,
        pub delays: HashMap<String, Duration>,
        pub check_requests: Mutex<Vec<CheckPriceRequest>>,
        pub bookings: Mutex<Vec<(ServiceKind, ServiceId, serde_json::Value)>>,
        pub booking_delay: Duration,
        pub booking_error: Option<(u16, String)>,
    }

    impl FakeApi {
        pub fn with_discount(mut self, code: &str, amount: f64) -> Self {
            self.discounts.insert(code.to_string(), amount);
            self
        }

        pub fn with_delay(mut self, code: &str, delay: Duration) -> Self {
            self.delays.insert(code.to_string(), delay);
            self
        }

        pub fn checks(&self) -> Vec<CheckPriceRequest> {
            self.check_requests.lock().unwrap().clone()
        }

        pub fn submitted(&self) -> Vec<(ServiceKind, ServiceId, serde_json::Value)> {
            self.bookings.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl BookingApi for FakeApi {
        async fn check_price(
            &self,
            request: &CheckPriceRequest,
        ) -> Result<CheckPriceResponse, ApiError> {
            self.check_requests.lock().unwrap().push(request.clone());
            if let Some(delay) = self.delays.get(&request.discount_code) {
                tokio::time::sleep(*delay).await;
            }
            match self.discounts.get(&request.discount_code) {
                Some(amount) => Ok(CheckPriceResponse {
                    discount_amount: *amount,
                    total_amount: 0.0,
                    message: None,
                }),
                None => Err(ApiError::status(404, Some("Discount code not found.".into()))),
            }
        }

        async fn submit_booking(
            &self,
            kind: ServiceKind,
            service_id: ServiceId,
            payload: &serde_json::Value,
        ) -> Result<BookingCreated, ApiError> {
            self.bookings
                .lock()
                .unwrap()
                .push((kind, service_id, payload.clone()));
            tokio::time::sleep(self.booking_delay).await;
            match &self.booking_error {
                Some((status, message)) => Err(ApiError::status(*status, Some(message.clone()))),
                None => Ok(BookingCreated { order_id: 77 }),
            }
        }

        async fn my_bookings(&self) -> Result<Vec<BookingRecord>, ApiError> {
            Ok(Vec::new())
        }

        async fn my_orders(&self) -> Result<Vec<Order>, ApiError> {
            Ok(Vec::new())
        }

        async fn my_profile(&self) -> Result<UserProfile, ApiError> {
            Ok(UserProfile::default())
        }

        async fn update_profile(&self, _update: &ProfileUpdate) -> Result<(), ApiError> {
            Ok(())
        }

        async fn car_availability(&self, _car_id: ServiceId) -> Result<AvailabilityMap, ApiError> {
            Ok(AvailabilityMap::new())
        }
    }

    fn request(code: &str, quantity: u32) -> CheckPriceRequest {
        CheckPriceRequest::new(ServiceKind::Activity, 1, code, PaxParams::Quantity(quantity), Vec::new())
    }

    fn validator(api: FakeApi) -> (Arc<FakeApi>, DiscountValidator<FakeApi>) {
        let api = Arc::new(api);
        let validator = DiscountValidator::new(Arc::clone(&api), Duration::from_millis(800));
        (api, validator)
    }

    #[tokio::test]
    async fn test_applied_and_rejected_outcomes() {
        let (_, validator) = validator(FakeApi::default().with_discount("HEMAT", 50.0).with_discount("ZERO", 0.0));

        let state = validator.validate(request("HEMAT", 1)).await;
        assert_eq!(state, DiscountState::Applied { amount: 50.0, code: "HEMAT".into() });

        let state = validator.validate(request("ZERO", 1)).await;
        assert_eq!(state, DiscountState::Rejected { reason: NO_DISCOUNT_MESSAGE.into() });

        let state = validator.validate(request("NOPE", 1)).await;
        assert_eq!(state, DiscountState::Rejected { reason: "Discount code not found.".into() });
        assert!(!validator.is_checking());
    }

    #[tokio::test]
    async fn test_blank_code_is_a_no_op() {
        let (api, validator) = validator(FakeApi::default());
        let state = validator.validate(request("   ", 1)).await;

        assert_eq!(state, DiscountState::Unchecked);
        assert!(api.checks().is_empty());
    }

    #[tokio::test]
    async fn test_reset_clears_applied_discount_immediately() {
        let (_, validator) = validator(FakeApi::default().with_discount("HEMAT", 50.0));
        validator.validate(request("HEMAT", 1)).await;
        assert!(validator.state().is_applied());

        validator.reset();
        assert_eq!(validator.state(), DiscountState::Unchecked);
        assert_eq!(validator.state().amount(), 0.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_edit_during_check_discards_response() {
        let (_, validator) = validator(
            FakeApi::default()
                .with_discount("HEMAT", 50.0)
                .with_delay("HEMAT", Duration::from_millis(300)),
        );

        let check = tokio::spawn(validator.validate(request("HEMAT", 1)));
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(validator.is_checking());

        validator.reset();
        assert!(!validator.is_checking());
        check.await.unwrap();

        assert_eq!(validator.state(), DiscountState::Unchecked);
    }

    #[tokio::test(start_paused = true)]
    async fn test_latest_trigger_wins_over_late_response() {
        let (api, validator) = validator(
            FakeApi::default()
                .with_discount("A", 10.0)
                .with_discount("B", 20.0)
                .with_delay("A", Duration::from_millis(500))
                .with_delay("B", Duration::from_millis(50)),
        );

        let first = tokio::spawn(validator.validate(request("A", 1)));
        tokio::time::sleep(Duration::from_millis(10)).await;
        let second_state = validator.validate(request("B", 1)).await;
        first.await.unwrap();

        let expected = DiscountState::Applied { amount: 20.0, code: "B".into() };
        assert_eq!(second_state, expected);
        assert_eq!(validator.state(), expected);
        assert_eq!(api.checks().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_debounced_revalidation_uses_latest_request() {
        let (api, validator) = validator(FakeApi::default().with_discount("HEMAT", 50.0));
        validator.validate(request("HEMAT", 1)).await;

        assert!(validator.schedule_revalidation(request("HEMAT", 2)));
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert!(validator.schedule_revalidation(request("HEMAT", 3)));
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert!(validator.schedule_revalidation(request("HEMAT", 4)));
        assert!(validator.has_pending_revalidation());

        tokio::time::sleep(Duration::from_millis(900)).await;

        let checks = api.checks();
        assert_eq!(checks.len(), 2);
        assert_eq!(checks[1].quantity, Some(4));
        assert!(validator.state().is_applied());
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_revalidation_unless_applied() {
        let (api, validator) = validator(FakeApi::default());
        assert!(!validator.schedule_revalidation(request("HEMAT", 2)));

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(api.checks().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_revalidation_supersedes_check_in_flight() {
        let (api, validator) = validator(
            FakeApi::default()
                .with_discount("HEMAT", 50.0)
                .with_delay("HEMAT", Duration::from_millis(300)),
        );

        let first = tokio::spawn(validator.validate(request("HEMAT", 1)));
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(validator.needs_revalidation());
        assert!(validator.schedule_revalidation(request("HEMAT", 5)));

        // the first answer lands during the debounce window and is dropped
        assert_eq!(first.await.unwrap(), DiscountState::Unchecked);
        assert_eq!(validator.state(), DiscountState::Unchecked);

        // still tracked while the re-check waits
        assert!(validator.schedule_revalidation(request("HEMAT", 6)));
        tokio::time::sleep(Duration::from_secs(2)).await;

        let quantities: Vec<_> = api.checks().iter().map(|c| c.quantity).collect();
        assert_eq!(quantities, vec![Some(1), Some(6)]);
        assert!(validator.state().is_applied());
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_discards_check_in_flight() {
        let (api, validator) = validator(
            FakeApi::default()
                .with_discount("HEMAT", 50.0)
                .with_delay("HEMAT", Duration::from_millis(300)),
        );

        let check = tokio::spawn(validator.validate(request("HEMAT", 1)));
        tokio::time::sleep(Duration::from_millis(10)).await;
        validator.shutdown();
        check.await.unwrap();

        assert_eq!(api.checks().len(), 1);
        assert_eq!(validator.state(), DiscountState::Unchecked);
        assert!(!validator.is_checking());
        assert!(!validator.needs_revalidation());
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_cancels_pending_revalidation() {
        let (api, validator) = validator(FakeApi::default().with_discount("HEMAT", 50.0));
        validator.validate(request("HEMAT", 1)).await;
        validator.schedule_revalidation(request("HEMAT", 5));

        validator.shutdown();
        tokio::time::sleep(Duration::from_secs(2)).await;

        assert_eq!(api.checks().len(), 1);
        assert!(!validator.schedule_revalidation(request("HEMAT", 6)));
    }
}
