use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveTime};
use regex::Regex;

/// Field key to message. Keys match the booking payload's field names.
pub type FieldErrors = BTreeMap<String, String>;

pub fn is_valid_email(email: &str) -> bool {
    Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]*[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]*[a-zA-Z0-9])?)*$",
    )
    .map_or(false, |re| re.is_match(email))
}

pub fn is_valid_time(time: &str) -> bool {
    NaiveTime::parse_from_str(time.trim(), "%H:%M").is_ok()
}

/// Collects the first error reported for each field.
#[derive(Debug, Default)]
pub struct Checks {
    errors: FieldErrors,
}

impl Checks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail(&mut self, field: &str, message: &str) {
        self.errors
            .entry(field.to_string())
            .or_insert_with(|| message.to_string());
    }

    pub fn text(&mut self, field: &str, value: &str, message: &str) {
        if value.trim().is_empty() {
            self.fail(field, message);
        }
    }

    pub fn min_len(&mut self, field: &str, value: &str, min: usize, message: &str) {
        if value.trim().chars().count() < min {
            self.fail(field, message);
        }
    }

    /// Required date that may not lie before `today`.
    pub fn date(&mut self, field: &str, value: Option<NaiveDate>, today: NaiveDate, message: &str) {
        match value {
            None => self.fail(field, message),
            Some(date) if date < today => self.fail(field, "Date cannot be in the past."),
            Some(_) => {}
        }
    }

    pub fn time(&mut self, field: &str, value: &str, message: &str) {
        if value.trim().is_empty() {
            self.fail(field, message);
        } else if !is_valid_time(value) {
            self.fail(field, "Please use the HH:MM format.");
        }
    }

    pub fn at_least_one(&mut self, field: &str, value: u32, message: &str) {
        if value < 1 {
            self.fail(field, message);
        }
    }

    /// Email is optional, but must be well-formed when given.
    pub fn optional_email(&mut self, field: &str, value: &str) {
        let value = value.trim();
        if !value.is_empty() && !is_valid_email(value) {
            self.fail(field, "Please enter a valid email address.");
        }
    }

    pub fn finish(self) -> FieldErrors {
        self.errors
    }
}
