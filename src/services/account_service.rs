use log::{info, warn};

use crate::models::user::{AuthUser, ProfileUpdate, UserProfile};
use crate::services::booking_api::{ApiError, BookingApi};
use crate::services::notifier::Notifier;
use crate::services::phone_service::{self, COUNTRY_CODES};

pub const PROFILE_LOAD_FAILED: &str = "Failed to load profile.";
pub const PROFILE_SAVE_FAILED: &str = "Failed to save profile.";
pub const PROFILE_SAVED: &str = "Profile updated successfully!";

/// Editable copy of the account settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileForm {
    pub name: String,
    pub full_name: String,
    pub phone_code: String,
    pub local_phone: String,
    pub nationality: String,
}

impl ProfileForm {
    /// `fallback_name` fills in the account name when the profile has none.
    pub fn from_profile(profile: &UserProfile, fallback_name: Option<&str>) -> Self {
        let parts = phone_service::parse(profile.phone_number.as_deref().unwrap_or(""), COUNTRY_CODES);
        let name = if profile.name.trim().is_empty() {
            fallback_name.unwrap_or("").to_string()
        } else {
            profile.name.clone()
        };

        ProfileForm {
            name,
            full_name: profile.full_name.clone().unwrap_or_default(),
            phone_code: parts.code,
            local_phone: parts.local,
            nationality: profile.nationality.clone().unwrap_or_default(),
        }
    }

    pub fn to_update(&self) -> ProfileUpdate {
        ProfileUpdate {
            name: self.name.trim().to_string(),
            full_name: self.full_name.trim().to_string(),
            phone_number: phone_service::compose(&self.phone_code, &self.local_phone),
            nationality: self.nationality.clone(),
        }
    }
}

pub async fn load_profile<A: BookingApi>(
    api: &A,
    user: &AuthUser,
    notifier: &dyn Notifier,
) -> Result<ProfileForm, ApiError> {
    match api.my_profile().await {
        Ok(profile) => Ok(ProfileForm::from_profile(&profile, Some(&user.name))),
        Err(err) => {
            warn!("loading profile of user {} failed: {}", user.id, err);
            notifier.error(PROFILE_LOAD_FAILED);
            Err(err)
        }
    }
}

pub async fn save_profile<A: BookingApi>(
    api: &A,
    form: &ProfileForm,
    notifier: &dyn Notifier,
) -> Result<ProfileUpdate, ApiError> {
    let update = form.to_update();
    match api.update_profile(&update).await {
        Ok(()) => {
            info!("profile saved for {}", update.name);
            notifier.success(PROFILE_SAVED);
            Ok(update)
        }
        Err(err) => {
            warn!("saving profile failed: {}", err);
            notifier.error(&err.user_message(PROFILE_SAVE_FAILED));
            Err(err)
        }
    }
}
