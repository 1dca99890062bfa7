use std::str::FromStr;
use std::time::Duration;

use rand::Rng;
use serde::Deserialize;
use tracing::info;

use crate::users::repo::UserProfile;

use super::api::{ApiClient, LoginPayload, ProfileUpdate};
use super::session::SessionStore;
use super::ClientError;

const GOOGLE_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v3/userinfo";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Google,
    Apple,
    Naver,
    Kakao,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Google => "Google",
            Provider::Apple => "Apple",
            Provider::Naver => "Naver",
            Provider::Kakao => "Kakao",
        }
    }
}

impl FromStr for Provider {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "google" => Ok(Provider::Google),
            "apple" => Ok(Provider::Apple),
            "naver" => Ok(Provider::Naver),
            "kakao" => Ok(Provider::Kakao),
            other => Err(ClientError::UnknownProvider(other.to_string())),
        }
    }
}

/// Fixture identities standing in for the real provider handshakes.
fn mock_identity(provider: Provider) -> LoginPayload {
    let (name, email) = match provider {
        Provider::Google => ("Google User", "google@example.com"),
        Provider::Apple => ("Apple User", "user@icloud.com"),
        Provider::Naver => ("네이버 회원", "naver@example.com"),
        Provider::Kakao => ("카카오 회원", "kakao@example.com"),
    };
    LoginPayload {
        email: email.to_string(),
        name: name.to_string(),
        provider: provider.as_str().to_string(),
        avatar: None,
    }
}

/// Owns the API client and the session store; the session is only ever
/// touched through here.
pub struct AuthContext {
    api: ApiClient,
    store: Box<dyn SessionStore>,
}

impl AuthContext {
    pub fn new(api: ApiClient, store: Box<dyn SessionStore>) -> Self {
        Self { api, store }
    }

    /// Mock login: pretend the provider popup took a moment, then register
    /// the fixture identity with the backend and cache the returned row.
    pub async fn login(&self, provider: Provider) -> Result<UserProfile, ClientError> {
        info!(provider = provider.as_str(), "attempting login");

        let delay: u64 = rand::thread_rng().gen_range(500..1500);
        tokio::time::sleep(Duration::from_millis(delay)).await;

        let user = self.api.login(&mock_identity(provider)).await?;
        self.store.save(&user).map_err(ClientError::Session)?;
        info!(email = %user.email, "logged in");
        Ok(user)
    }

    /// Google variant: read the userinfo endpoint with the access token the
    /// popup produced. The token is not verified beyond this read.
    pub async fn login_with_google_token(
        &self,
        access_token: &str,
    ) -> Result<UserProfile, ClientError> {
        #[derive(Deserialize)]
        struct GoogleUserInfo {
            name: String,
            email: String,
            picture: Option<String>,
        }

        let info: GoogleUserInfo = reqwest::Client::new()
            .get(GOOGLE_USERINFO_URL)
            .bearer_auth(access_token)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let user = self
            .api
            .login(&LoginPayload {
                email: info.email,
                name: info.name,
                provider: "Google".to_string(),
                avatar: info.picture,
            })
            .await?;
        self.store.save(&user).map_err(ClientError::Session)?;
        info!(email = %user.email, "logged in via google userinfo");
        Ok(user)
    }

    pub fn current_user(&self) -> Result<Option<UserProfile>, ClientError> {
        self.store.load().map_err(ClientError::Session)
    }

    /// Push one field-group update for the cached user and replace the cache
    /// with the row the server returns.
    pub async fn update_user(&self, update: &ProfileUpdate) -> Result<UserProfile, ClientError> {
        let current = self.current_user()?.ok_or(ClientError::NotLoggedIn)?;

        let user = self.api.update(&current.email, update).await?;
        self.store.save(&user).map_err(ClientError::Session)?;
        Ok(user)
    }

    pub fn logout(&self) -> Result<(), ClientError> {
        if let Ok(Some(user)) = self.current_user() {
            info!(email = %user.email, "logging out");
        }
        self.store.clear().map_err(ClientError::Session)
    }
}
