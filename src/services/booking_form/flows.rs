//! Per-service differences between the booking forms.

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::bookings::{
    ActivityBookingPayload, CarRentalBookingPayload, OpenTripBookingPayload, PackageBookingPayload,
};
use crate::models::discount::PaxParams;
use crate::models::service::ServiceKind;
use crate::services::availability_service::range_is_bookable;
use crate::services::phone_service::digit_count;
use crate::services::pricing_service::PricingService;

use super::form::BookingForm;
use super::validation::{Checks, FieldErrors};

pub const SELECT_DATES_FIRST: &str = "Please select dates first.";

pub trait BookingFlow: Send + Sync + 'static {
    type Payload: Serialize;

    const KIND: ServiceKind;
    const DEFAULT_TIME: &'static str = "";
    const SUCCESS_MESSAGE: &'static str = "Booking successful!";
    /// Whether date edits change the price, and so need a discount re-check.
    const DATES_AFFECT_PRICE: bool = false;

    /// Quantity the unit price is multiplied by.
    fn units(form: &BookingForm) -> u32;

    /// Participant parameters for a price check, or the reason none can be
    /// made yet.
    fn pax(form: &BookingForm) -> Result<PaxParams, &'static str>;

    fn validate(form: &BookingForm, today: NaiveDate) -> FieldErrors;

    /// `None` when a required date is missing.
    fn payload(
        form: &BookingForm,
        phone_number: String,
        discount_code: Option<String>,
    ) -> Option<Self::Payload>;
}

fn contact_checks(checks: &mut Checks, form: &BookingForm) {
    checks.text("full_name", &form.full_name, "Full name is required.");
    checks.text("phone_number", &form.local_phone, "Phone number is required.");
    checks.optional_email("email", &form.email);
}

fn party_checks(checks: &mut Checks, form: &BookingForm) {
    checks.at_least_one("adults", form.adults, "At least one adult is required.");
}

pub struct ActivityFlow;

impl BookingFlow for ActivityFlow {
    type Payload = ActivityBookingPayload;
    const KIND: ServiceKind = ServiceKind::Activity;

    fn units(form: &BookingForm) -> u32 {
        form.quantity
    }

    fn pax(form: &BookingForm) -> Result<PaxParams, &'static str> {
        Ok(PaxParams::Quantity(form.quantity))
    }

    fn validate(form: &BookingForm, today: NaiveDate) -> FieldErrors {
        let mut checks = Checks::new();
        checks.date("booking_date", form.start_date, today, "Please select a booking date.");
        checks.time("activity_time", &form.time, "Please select a time slot.");
        checks.text("participant_nationality", &form.nationality, "Nationality is required.");
        checks.at_least_one("quantity", form.quantity, "At least one participant is required.");
        contact_checks(&mut checks, form);
        checks.finish()
    }

    fn payload(
        form: &BookingForm,
        phone_number: String,
        discount_code: Option<String>,
    ) -> Option<ActivityBookingPayload> {
        Some(ActivityBookingPayload {
            booking_date: form.start_date?,
            activity_time: form.time.trim().to_string(),
            quantity: form.quantity,
            participant_nationality: form.nationality.trim().to_string(),
            full_name: form.full_name.trim().to_string(),
            email: form.email.trim().to_string(),
            phone_number,
            pickup_location: form.location.trim().to_string(),
            special_request: form.special_request(),
            selected_addons: form.selected_addons.clone(),
            discount_code,
        })
    }
}

pub struct OpenTripFlow;

impl BookingFlow for OpenTripFlow {
    type Payload = OpenTripBookingPayload;
    const KIND: ServiceKind = ServiceKind::OpenTrip;

    fn units(form: &BookingForm) -> u32 {
        form.party_size()
    }

    fn pax(form: &BookingForm) -> Result<PaxParams, &'static str> {
        Ok(PaxParams::Party { adults: form.adults, children: form.children })
    }

    fn validate(form: &BookingForm, today: NaiveDate) -> FieldErrors {
        let mut checks = Checks::new();
        checks.date("start_date", form.start_date, today, "Please select a trip date.");
        checks.text("pickup_location", &form.location, "Please choose a meeting point.");
        checks.text("participant_nationality", &form.nationality, "Nationality is required.");
        party_checks(&mut checks, form);
        contact_checks(&mut checks, form);
        checks.finish()
    }

    fn payload(
        form: &BookingForm,
        phone_number: String,
        discount_code: Option<String>,
    ) -> Option<OpenTripBookingPayload> {
        Some(OpenTripBookingPayload {
            start_date: form.start_date?,
            adults: form.adults,
            children: form.children,
            full_name: form.full_name.trim().to_string(),
            email: form.email.trim().to_string(),
            phone_number,
            participant_nationality: form.nationality.trim().to_string(),
            pickup_location: form.location.trim().to_string(),
            special_request: form.special_request(),
            discount_code,
            selected_addons: form.selected_addons.clone(),
        })
    }
}

pub struct PackageFlow;

impl BookingFlow for PackageFlow {
    type Payload = PackageBookingPayload;
    const KIND: ServiceKind = ServiceKind::HolidayPackage;

    fn units(form: &BookingForm) -> u32 {
        form.party_size()
    }

    fn pax(form: &BookingForm) -> Result<PaxParams, &'static str> {
        Ok(PaxParams::Party { adults: form.adults, children: form.children })
    }

    fn validate(form: &BookingForm, today: NaiveDate) -> FieldErrors {
        let mut checks = Checks::new();
        checks.date("start_date", form.start_date, today, "Please select a start date.");
        checks.text("participant_nationality", &form.nationality, "Nationality is required.");
        checks.text("pickup_location", &form.location, "Pickup location is required.");
        party_checks(&mut checks, form);
        contact_checks(&mut checks, form);
        checks.finish()
    }

    fn payload(
        form: &BookingForm,
        phone_number: String,
        discount_code: Option<String>,
    ) -> Option<PackageBookingPayload> {
        Some(PackageBookingPayload {
            start_date: form.start_date?,
            adults: form.adults,
            children: form.children,
            discount_code,
            participant_nationality: form.nationality.trim().to_string(),
            full_name: form.full_name.trim().to_string(),
            email: form.email.trim().to_string(),
            phone_number,
            pickup_location: form.location.trim().to_string(),
            flight_number: None,
            special_request: form.special_request(),
            selected_addons: form.selected_addons.clone(),
        })
    }
}

pub struct CarRentalFlow;

const MIN_PHONE_DIGITS: usize = 9;
const MIN_LOCATION_CHARS: usize = 5;

impl BookingFlow for CarRentalFlow {
    type Payload = CarRentalBookingPayload;
    const KIND: ServiceKind = ServiceKind::CarRental;
    const DEFAULT_TIME: &'static str = "09:00";
    const SUCCESS_MESSAGE: &'static str =
        "Booking created! Please complete payment in your profile.";
    const DATES_AFFECT_PRICE: bool = true;

    fn units(form: &BookingForm) -> u32 {
        PricingService::rental_days(form.start_date, form.end_date)
    }

    fn pax(form: &BookingForm) -> Result<PaxParams, &'static str> {
        match (form.start_date, form.end_date) {
            (Some(start), Some(end)) => Ok(PaxParams::Dates { start, end }),
            _ => Err(SELECT_DATES_FIRST),
        }
    }

    fn validate(form: &BookingForm, today: NaiveDate) -> FieldErrors {
        let mut checks = Checks::new();
        checks.date("start_date", form.start_date, today, "Please select a start date.");
        checks.date("end_date", form.end_date, today, "Please select an end date.");
        if let (Some(start), Some(end)) = (form.start_date, form.end_date) {
            if end < start {
                checks.fail("end_date", "End date cannot be before the start date.");
            } else if !range_is_bookable(&form.availability, start, end) {
                checks.fail("start_date", "The car is not available for the selected dates.");
            }
        }

        checks.text("full_name", &form.full_name, "Full name is required.");
        checks.text("phone_number", &form.local_phone, "Phone number is required.");
        if digit_count(&form.phone_number()) < MIN_PHONE_DIGITS {
            checks.fail("phone_number", "Please enter a valid phone number.");
        }
        checks.optional_email("email", &form.email);
        checks.min_len(
            "pickup_location",
            &form.location,
            MIN_LOCATION_CHARS,
            "Please enter a complete pickup location.",
        );
        checks.time("pickup_time", &form.time, "Pickup time is required.");
        checks.finish()
    }

    fn payload(
        form: &BookingForm,
        phone_number: String,
        discount_code: Option<String>,
    ) -> Option<CarRentalBookingPayload> {
        Some(CarRentalBookingPayload {
            start_date: form.start_date?,
            end_date: form.end_date?,
            full_name: form.full_name.trim().to_string(),
            email: form.email.trim().to_string(),
            phone_number,
            pickup_location: form.location.trim().to_string(),
            pickup_time: form.time.trim().to_string(),
            special_request: form.special_request(),
            discount_code,
        })
    }
}
