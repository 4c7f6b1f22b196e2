use serde::{Deserialize, Serialize};

/// The signed-in user handed to a booking form when it opens.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AuthUser {
    pub id: u64,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub nationality: Option<String>,
}

impl AuthUser {
    /// Name to prefill: the profile's full name, else the account name.
    pub fn display_name(&self) -> &str {
        self.full_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(&self.name)
    }
}

/// `GET /my-profile`
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct UserProfile {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub nationality: Option<String>,
}

impl From<UserProfile> for AuthUser {
    fn from(profile: UserProfile) -> Self {
        AuthUser {
            id: profile.id,
            name: profile.name,
            email: profile.email,
            full_name: profile.full_name,
            phone_number: profile.phone_number,
            nationality: profile.nationality,
        }
    }
}

/// `PUT /my-profile`
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ProfileUpdate {
    pub name: String,
    pub full_name: String,
    pub phone_number: String,
    pub nationality: String,
}
