use serde::{Deserialize, Deserializer};

use super::repo::UserProfile;

/// Login body. Every field optional at the serde level so that missing
/// pieces surface as 400s with a readable message instead of a body-decode
/// rejection.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: Option<String>,
    pub name: Option<String>,
    pub provider: Option<String>,
    pub avatar: Option<String>,
}

/// Vehicle/phone bodies stay optional: an absent or null field flows through
/// to the row as NULL rather than failing the request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleUpdateRequest {
    pub vehicle_number: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhoneUpdateRequest {
    pub phone_number: Option<String>,
}

/// Status body. statusMessage distinguishes "field absent" (keep the stored
/// message) from "field present but null/empty" (overwrite), hence the double
/// Option.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdateRequest {
    pub status_key: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub status_message: Option<Option<String>>,
}

fn double_option<'de, D>(de: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(de).map(Some)
}

impl StatusUpdateRequest {
    /// Merge the request into the stored pair. The key is only replaced by a
    /// non-empty value (it can never be cleared); the message is replaced
    /// whenever the field was present, empty string and null included.
    pub fn merged(&self, current: &UserProfile) -> (String, Option<String>) {
        let status_key = match self.status_key.as_deref() {
            Some(key) if !key.is_empty() => key.to_string(),
            _ => current.status_key.clone(),
        };
        let status_message = match &self.status_message {
            Some(message) => message.clone(),
            None => current.status_message.clone(),
        };
        (status_key, status_message)
    }
}
