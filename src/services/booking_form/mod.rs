//! A booking form session: pricing preview, discount handling and
//! submission, shared by every bookable service through [`BookingFlow`].

mod flows;
mod form;
mod validation;

pub use flows::{ActivityFlow, BookingFlow, CarRentalFlow, OpenTripFlow, PackageFlow, SELECT_DATES_FIRST};
pub use form::BookingForm;
pub use validation::{is_valid_email, FieldErrors};

use std::marker::PhantomData;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::NaiveDate;
use log::{info, warn};
use thiserror::Error;

use crate::config::ClientConfig;
use crate::models::availability::AvailabilityMap;
use crate::models::bookings::OrderId;
use crate::models::discount::{CheckPriceRequest, DiscountState};
use crate::models::service::Service;
use crate::models::user::AuthUser;
use crate::services::availability_service;
use crate::services::booking_api::{ApiError, BookingApi};
use crate::services::discount_service::DiscountValidator;
use crate::services::notifier::Notifier;
use crate::services::phone_service::COUNTRY_CODES;
use crate::services::pricing_service::{PriceBreakdown, PricingService};

pub const BOOKINGS_PATH: &str = "/profile?tab=bookings";
pub const LOGIN_REQUIRED: &str = "Please login first.";
pub const BOOKING_FAILED: &str = "Booking failed. Please try again.";

pub type ActivityBookingForm<A> = BookingFormController<ActivityFlow, A>;
pub type OpenTripBookingForm<A> = BookingFormController<OpenTripFlow, A>;
pub type PackageBookingForm<A> = BookingFormController<PackageFlow, A>;
pub type CarRentalBookingForm<A> = BookingFormController<CarRentalFlow, A>;

#[derive(Debug, Error)]
pub enum BookingError {
    #[error("please fix the highlighted fields")]
    Validation(FieldErrors),
    #[error("not signed in")]
    NotAuthenticated,
    #[error("a booking is already being submitted")]
    SubmissionInProgress,
    #[error("booking form is closed")]
    Closed,
    #[error("could not encode booking: {0}")]
    Encode(#[from] serde_json::Error),
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// What a form needs from its surroundings.
pub struct FormContext<A: BookingApi> {
    pub api: Arc<A>,
    pub notifier: Arc<dyn Notifier>,
    pub debounce: Duration,
    /// Earliest selectable date.
    pub today: NaiveDate,
}

impl<A: BookingApi> FormContext<A> {
    pub fn new(api: Arc<A>, notifier: Arc<dyn Notifier>, config: &ClientConfig) -> Self {
        FormContext {
            api,
            notifier,
            debounce: config.discount_debounce,
            today: chrono::Local::now().date_naive(),
        }
    }

    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

struct SubmitGuard<'a>(&'a AtomicBool);

impl Drop for SubmitGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

pub struct BookingFormController<F: BookingFlow, A: BookingApi> {
    service: Arc<Service>,
    user: Option<AuthUser>,
    api: Arc<A>,
    notifier: Arc<dyn Notifier>,
    form: Mutex<BookingForm>,
    errors: Mutex<FieldErrors>,
    discount: DiscountValidator<A>,
    submitting: AtomicBool,
    closed: AtomicBool,
    today: NaiveDate,
    _flow: PhantomData<fn() -> F>,
}

impl<F: BookingFlow, A: BookingApi> BookingFormController<F, A> {
    /// Opens a fresh form for `service`, prefilled from the signed-in user.
    pub fn open(service: Arc<Service>, user: Option<AuthUser>, context: FormContext<A>) -> Self {
        let form = match &user {
            Some(user) => BookingForm::prefilled(user, F::DEFAULT_TIME, COUNTRY_CODES),
            None => BookingForm::new(F::DEFAULT_TIME, COUNTRY_CODES),
        };

        BookingFormController {
            discount: DiscountValidator::new(Arc::clone(&context.api), context.debounce),
            service,
            user,
            api: context.api,
            notifier: context.notifier,
            form: Mutex::new(form),
            errors: Mutex::new(FieldErrors::new()),
            submitting: AtomicBool::new(false),
            closed: AtomicBool::new(false),
            today: context.today,
            _flow: PhantomData,
        }
    }

    pub fn service(&self) -> &Service {
        &self.service
    }

    pub fn form(&self) -> BookingForm {
        lock(&self.form).clone()
    }

    pub fn errors(&self) -> FieldErrors {
        lock(&self.errors).clone()
    }

    pub fn discount_state(&self) -> DiscountState {
        self.discount.state()
    }

    pub fn is_checking_discount(&self) -> bool {
        self.discount.is_checking()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting.load(Ordering::SeqCst)
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn price(&self) -> PriceBreakdown {
        let form = lock(&self.form);
        PricingService::breakdown(
            &self.service,
            F::units(&form),
            &form.selected_addons,
            self.discount.state().amount(),
        )
    }

    fn edit(&self, apply: impl FnOnce(&mut BookingForm)) {
        apply(&mut *lock(&self.form));
    }

    /// Applies an edit that changes the price, then re-checks a code that is
    /// applied or still being checked.
    fn edit_priced(&self, apply: impl FnOnce(&mut BookingForm)) {
        self.edit(apply);
        if self.discount.needs_revalidation() {
            self.revalidate();
        }
    }

    fn check_request(&self) -> Result<CheckPriceRequest, &'static str> {
        let form = lock(&self.form);
        let pax = F::pax(&form)?;
        Ok(CheckPriceRequest::new(
            F::KIND,
            self.service.id,
            form.discount_code.trim(),
            pax,
            form.selected_addons.clone(),
        ))
    }

    fn revalidate(&self) {
        match self.check_request() {
            Ok(request) => {
                self.discount.schedule_revalidation(request);
            }
            Err(reason) => self.discount.reject(reason),
        }
    }

    pub fn set_quantity(&self, quantity: u32) {
        self.edit_priced(|form| form.quantity = quantity);
    }

    pub fn set_adults(&self, adults: u32) {
        self.edit_priced(|form| form.adults = adults);
    }

    pub fn set_children(&self, children: u32) {
        self.edit_priced(|form| form.children = children);
    }

    pub fn toggle_addon(&self, name: &str) {
        self.edit_priced(|form| form.toggle_addon(name));
    }

    pub fn set_dates(&self, start: Option<NaiveDate>, end: Option<NaiveDate>) {
        let apply = |form: &mut BookingForm| {
            form.start_date = start;
            form.end_date = end;
        };
        if F::DATES_AFFECT_PRICE {
            self.edit_priced(apply);
        } else {
            self.edit(apply);
        }
    }

    pub fn set_time(&self, time: &str) {
        self.edit(|form| form.time = time.to_string());
    }

    /// Any edit to the code drops the previous verdict.
    pub fn set_discount_code(&self, code: &str) {
        self.edit(|form| form.discount_code = code.to_string());
        self.discount.reset();
    }

    pub fn set_full_name(&self, name: &str) {
        self.edit(|form| form.full_name = name.to_string());
    }

    pub fn set_email(&self, email: &str) {
        self.edit(|form| form.email = email.to_string());
    }

    pub fn set_phone(&self, code: &str, local: &str) {
        self.edit(|form| {
            form.phone_code = code.to_string();
            form.local_phone = local.to_string();
        });
    }

    pub fn set_nationality(&self, nationality: &str) {
        self.edit(|form| form.nationality = nationality.to_string());
    }

    pub fn set_location(&self, location: &str) {
        self.edit(|form| form.location = location.to_string());
    }

    pub fn set_special_request(&self, request: &str) {
        self.edit(|form| form.special_request = request.to_string());
    }

    pub fn set_availability(&self, availability: AvailabilityMap) {
        self.edit(|form| form.availability = availability);
    }

    /// Loads the service's rental calendar into the form.
    pub async fn refresh_availability(&self) {
        let availability = availability_service::load_availability(&*self.api, self.service.id).await;
        self.set_availability(availability);
    }

    /// Checks the current discount code right away.
    pub async fn apply_discount_code(&self) -> DiscountState {
        if self.is_closed() || lock(&self.form).discount_code.trim().is_empty() {
            return self.discount.state();
        }

        match self.check_request() {
            Ok(request) => self.discount.validate(request).await,
            Err(reason) => {
                self.discount.reject(reason);
                self.discount.state()
            }
        }
    }

    /// Runs the flow's field checks and keeps the result for display.
    pub fn validate(&self) -> FieldErrors {
        let errors = F::validate(&lock(&self.form), self.today);
        *lock(&self.errors) = errors.clone();
        errors
    }

    pub async fn submit(&self) -> Result<OrderId, BookingError> {
        if self.submitting.swap(true, Ordering::SeqCst) {
            return Err(BookingError::SubmissionInProgress);
        }
        let _guard = SubmitGuard(&self.submitting);

        if self.is_closed() {
            return Err(BookingError::Closed);
        }

        let errors = self.validate();
        if !errors.is_empty() {
            return Err(BookingError::Validation(errors));
        }

        if self.user.is_none() {
            self.notifier.error(LOGIN_REQUIRED);
            return Err(BookingError::NotAuthenticated);
        }

        let body = {
            let form = lock(&self.form);
            let discount_code = self.discount.state().applied_code().map(str::to_string);
            let payload = F::payload(&form, form.phone_number(), discount_code).ok_or_else(|| {
                let mut errors = FieldErrors::new();
                errors.insert("start_date".to_string(), "Please select a date.".to_string());
                BookingError::Validation(errors)
            })?;
            serde_json::to_value(&payload)?
        };

        match self.api.submit_booking(F::KIND, self.service.id, &body).await {
            Ok(created) => {
                info!(
                    "{} booking for service {} created order {}",
                    F::KIND,
                    self.service.id,
                    created.order_id
                );
                self.close();
                self.notifier.success(F::SUCCESS_MESSAGE);
                self.notifier.navigate(BOOKINGS_PATH);
                Ok(created.order_id)
            }
            Err(err) => {
                warn!("{} booking for service {} failed: {}", F::KIND, self.service.id, err);
                self.notifier.error(&err.user_message(BOOKING_FAILED));
                Err(BookingError::Api(err))
            }
        }
    }

    /// Tears the form down. Late discount results are ignored from here on.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        self.discount.shutdown();
    }
}

impl<F: BookingFlow, A: BookingApi> Drop for BookingFormController<F, A> {
    fn drop(&mut self) {
        self.discount.shutdown();
    }
}
