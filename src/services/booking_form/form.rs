use chrono::NaiveDate;

use crate::models::availability::AvailabilityMap;
use crate::models::user::AuthUser;
use crate::services::phone_service::{self, CountryCode};

/// Everything the customer has typed into a booking form.
#[derive(Debug, Clone, PartialEq)]
pub struct BookingForm {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    /// Activity slot or car pickup time, `HH:MM`.
    pub time: String,
    pub quantity: u32,
    pub adults: u32,
    pub children: u32,
    pub full_name: String,
    pub email: String,
    pub phone_code: String,
    pub local_phone: String,
    pub nationality: String,
    /// Pickup address, or the chosen meeting point for open trips.
    pub location: String,
    pub special_request: String,
    pub selected_addons: Vec<String>,
    pub discount_code: String,
    pub availability: AvailabilityMap,
}

impl BookingForm {
    pub fn new(default_time: &str, table: &[CountryCode]) -> Self {
        BookingForm {
            start_date: None,
            end_date: None,
            time: default_time.to_string(),
            quantity: 1,
            adults: 1,
            children: 0,
            full_name: String::new(),
            email: String::new(),
            phone_code: phone_service::default_code(table).to_string(),
            local_phone: String::new(),
            nationality: String::new(),
            location: String::new(),
            special_request: String::new(),
            selected_addons: Vec::new(),
            discount_code: String::new(),
            availability: AvailabilityMap::new(),
        }
    }

    pub fn prefilled(user: &AuthUser, default_time: &str, table: &[CountryCode]) -> Self {
        let mut form = Self::new(default_time, table);
        form.full_name = user.display_name().to_string();
        form.email = user.email.clone();
        form.nationality = user.nationality.clone().unwrap_or_default();

        if let Some(stored) = user.phone_number.as_deref() {
            let parts = phone_service::parse(stored, table);
            form.phone_code = parts.code;
            form.local_phone = parts.local;
        }
        form
    }

    pub fn phone_number(&self) -> String {
        phone_service::compose(&self.phone_code, &self.local_phone)
    }

    /// Adds the add-on if absent, removes it otherwise. Selection order is kept.
    pub fn toggle_addon(&mut self, name: &str) {
        match self.selected_addons.iter().position(|selected| selected == name) {
            Some(index) => {
                self.selected_addons.remove(index);
            }
            None => self.selected_addons.push(name.to_string()),
        }
    }

    pub fn special_request(&self) -> Option<String> {
        let request = self.special_request.trim();
        if request.is_empty() {
            None
        } else {
            Some(request.to_string())
        }
    }

    pub fn party_size(&self) -> u32 {
        self.adults.saturating_add(self.children)
    }
}
