use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::users::repo::UserProfile;

use super::ClientError;

/// Body for POST /api/auth/login.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginPayload {
    pub email: String,
    pub name: String,
    pub provider: String,
    pub avatar: Option<String>,
}

/// Which field group a profile update touches. The caller resolves this
/// before any network call; None on vehicle/phone means clear.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileUpdate {
    Vehicle(Option<String>),
    Phone(Option<String>),
    Status {
        key: Option<String>,
        message: Option<Option<String>>,
    },
}

impl ProfileUpdate {
    pub(crate) fn method(&self) -> Method {
        match self {
            ProfileUpdate::Vehicle(None) | ProfileUpdate::Phone(None) => Method::DELETE,
            _ => Method::PUT,
        }
    }

    pub(crate) fn path(&self, email: &str) -> String {
        let field = match self {
            ProfileUpdate::Vehicle(_) => "vehicle",
            ProfileUpdate::Phone(_) => "phone",
            ProfileUpdate::Status { .. } => "status",
        };
        format!("/api/user/{email}/{field}")
    }

    pub(crate) fn body(&self) -> Option<serde_json::Value> {
        match self {
            ProfileUpdate::Vehicle(Some(value)) => Some(json!({ "vehicleNumber": value })),
            ProfileUpdate::Phone(Some(value)) => Some(json!({ "phoneNumber": value })),
            ProfileUpdate::Vehicle(None) | ProfileUpdate::Phone(None) => None,
            ProfileUpdate::Status { key, message } => {
                let mut body = serde_json::Map::new();
                if let Some(key) = key {
                    body.insert("statusKey".into(), json!(key));
                }
                if let Some(message) = message {
                    body.insert("statusMessage".into(), json!(message));
                }
                Some(serde_json::Value::Object(body))
            }
        }
    }
}

/// Thin typed wrapper over the profile API. Every success decodes to the
/// full row.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }

    pub async fn login(&self, payload: &LoginPayload) -> Result<UserProfile, ClientError> {
        let resp = self
            .http
            .post(format!("{}/api/auth/login", self.base_url))
            .json(payload)
            .send()
            .await?;
        Self::decode(resp).await
    }

    pub async fn get_user(&self, email: &str) -> Result<UserProfile, ClientError> {
        let resp = self
            .http
            .get(format!("{}/api/user/{email}", self.base_url))
            .send()
            .await?;
        Self::decode(resp).await
    }

    pub async fn update(
        &self,
        email: &str,
        update: &ProfileUpdate,
    ) -> Result<UserProfile, ClientError> {
        let url = format!("{}{}", self.base_url, update.path(email));
        let mut req = self.http.request(update.method(), url);
        if let Some(body) = update.body() {
            req = req.json(&body);
        }
        Self::decode(req.send().await?).await
    }

    async fn decode(resp: reqwest::Response) -> Result<UserProfile, ClientError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp.json::<UserProfile>().await?);
        }

        #[derive(Deserialize)]
        struct ErrorBody {
            error: String,
        }
        let message = match resp.json::<ErrorBody>().await {
            Ok(body) => body.error,
            Err(_) => status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string(),
        };
        Err(ClientError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vehicle_update_resolves_to_put() {
        let update = ProfileUpdate::Vehicle(Some("123가1234".to_string()));
        assert_eq!(update.method(), Method::PUT);
        assert_eq!(
            update.path("test@example.com"),
            "/api/user/test@example.com/vehicle"
        );
        assert_eq!(
            update.body().unwrap(),
            json!({ "vehicleNumber": "123가1234" })
        );
    }

    #[test]
    fn vehicle_clear_resolves_to_delete_without_body() {
        let update = ProfileUpdate::Vehicle(None);
        assert_eq!(update.method(), Method::DELETE);
        assert_eq!(update.path("a@b.com"), "/api/user/a@b.com/vehicle");
        assert!(update.body().is_none());
    }

    #[test]
    fn phone_update_resolves_to_put() {
        let update = ProfileUpdate::Phone(Some("010-1234-5678".to_string()));
        assert_eq!(update.method(), Method::PUT);
        assert_eq!(update.path("a@b.com"), "/api/user/a@b.com/phone");
        assert_eq!(
            update.body().unwrap(),
            json!({ "phoneNumber": "010-1234-5678" })
        );
    }

    #[test]
    fn status_update_serializes_present_fields_only() {
        let update = ProfileUpdate::Status {
            key: Some("busy".to_string()),
            message: None,
        };
        assert_eq!(update.method(), Method::PUT);
        assert_eq!(update.body().unwrap(), json!({ "statusKey": "busy" }));
    }

    #[test]
    fn status_update_keeps_empty_message_on_the_wire() {
        let update = ProfileUpdate::Status {
            key: None,
            message: Some(Some("".to_string())),
        };
        assert_eq!(update.body().unwrap(), json!({ "statusMessage": "" }));
    }

    #[test]
    fn status_update_sends_explicit_null_message() {
        let update = ProfileUpdate::Status {
            key: None,
            message: Some(None),
        };
        let body = update.body().unwrap();
        assert!(body.as_object().unwrap().contains_key("statusMessage"));
        assert_eq!(body["statusMessage"], serde_json::Value::Null);
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let client = ApiClient::new("http://localhost:3000/");
        assert_eq!(client.base_url, "http://localhost:3000");
    }
}
