use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;
use url::Url;

use crate::config::GithubConfig;

use super::{AuthError, HttpTransport, Transport, TransportRequest};

pub const DEFAULT_SCOPE: &str = "user";

/// GitHub endpoints used by the flow, overridable for tests.
#[derive(Debug, Clone)]
pub struct GithubEndpoints {
    pub authorize_url: Url,
    pub token_url: Url,
    pub user_url: Url,
    pub emails_url: Url,
}

impl Default for GithubEndpoints {
    fn default() -> Self {
        Self {
            authorize_url: Url::parse("https://github.com/login/oauth/authorize").unwrap(),
            token_url: Url::parse("https://github.com/login/oauth/access_token").unwrap(),
            user_url: Url::parse("https://api.github.com/user").unwrap(),
            emails_url: Url::parse("https://api.github.com/user/emails").unwrap(),
        }
    }
}

/// The user's GitHub profile exactly as `/user` returned it, plus the
/// injected `email` key.
pub type UserProfile = serde_json::Map<String, Value>;

/// Outcome of an [`GithubAuthenticator::authenticate`] call. The host decides
/// how to perform the actual redirect; the component never halts the process.
#[derive(Debug, Clone)]
pub enum AuthOutcome {
    Redirect(Url),
    Profile(UserProfile),
}

/// Runs the three-step login exchange against GitHub: authorization code to
/// access token, then profile and primary email lookups.
#[derive(Debug, Clone)]
pub struct GithubAuthenticator<T: Transport = HttpTransport> {
    config: GithubConfig,
    endpoints: GithubEndpoints,
    transport: T,
}

impl GithubAuthenticator<HttpTransport> {
    pub fn new(config: GithubConfig) -> Result<Self, AuthError> {
        let transport = HttpTransport::new(config.app_name.clone())?;
        Ok(Self::with_parts(config, GithubEndpoints::default(), transport))
    }
}

impl<T: Transport> GithubAuthenticator<T> {
    pub fn with_parts(config: GithubConfig, endpoints: GithubEndpoints, transport: T) -> Self {
        Self {
            config,
            endpoints,
            transport,
        }
    }

    pub fn config(&self) -> &GithubConfig {
        &self.config
    }

    pub fn endpoints(&self) -> &GithubEndpoints {
        &self.endpoints
    }

    /// URL the host should redirect the user to when no code is present yet.
    pub fn authorize_url(&self) -> Url {
        let mut url = self.endpoints.authorize_url.clone();
        url.query_pairs_mut()
            .append_pair("client_id", &self.config.client_id)
            .append_pair("redirect_uri", self.config.redirect_url.as_str())
            .append_pair("scope", DEFAULT_SCOPE);
        url
    }

    /// Entry point for the callback request. Without a `code` query parameter
    /// the caller is asked to redirect; with one, the code is exchanged and
    /// the profile returned with its primary email injected.
    pub async fn authenticate(
        &self,
        query_params: &HashMap<String, String>,
    ) -> Result<AuthOutcome, AuthError> {
        let Some(raw_code) = query_params.get("code") else {
            return Ok(AuthOutcome::Redirect(self.authorize_url()));
        };

        let code = sanitize_code(raw_code);
        let access_token = self.exchange_code(&code).await?;
        let mut profile = self.fetch_user(&access_token).await?;
        let email = self.fetch_primary_email(&access_token).await?;
        profile.insert("email".to_owned(), Value::String(email));
        Ok(AuthOutcome::Profile(profile))
    }

    /// Exchange the authorization code for a bearer access token.
    pub async fn exchange_code(&self, code: &str) -> Result<String, AuthError> {
        let post_data = vec![
            ("client_id", self.config.client_id.clone()),
            ("redirect_uri", self.config.redirect_url.to_string()),
            ("client_secret", self.config.client_secret.clone()),
            ("code", code.to_owned()),
        ];
        let request = TransportRequest::post(self.endpoints.token_url.clone(), post_data);
        let body = self.send_checked(request).await?;

        let payload: TokenResponse = serde_json::from_str(&body)?;
        payload
            .access_token
            .ok_or(AuthError::MissingField("access_token"))
    }

    /// Fetch the raw `/user` profile object.
    pub async fn fetch_user(&self, access_token: &str) -> Result<UserProfile, AuthError> {
        let body = self
            .send_checked(self.api_request(&self.endpoints.user_url, access_token))
            .await?;
        let profile: UserProfile = serde_json::from_str(&body)?;
        Ok(profile)
    }

    /// Fetch the first address from `/user/emails`.
    pub async fn fetch_primary_email(&self, access_token: &str) -> Result<String, AuthError> {
        let body = self
            .send_checked(self.api_request(&self.endpoints.emails_url, access_token))
            .await?;
        let mut emails: Vec<EmailRecord> = serde_json::from_str(&body)?;
        if emails.is_empty() {
            return Err(AuthError::MissingField("email"));
        }
        Ok(emails.remove(0).email)
    }

    // The token travels both as a query parameter and as a bearer header,
    // matching what GitHub's OAuth web flow historically accepted.
    fn api_request(&self, endpoint: &Url, access_token: &str) -> TransportRequest {
        let mut url = endpoint.clone();
        url.query_pairs_mut()
            .append_pair("access_token", access_token);
        TransportRequest::get(url).with_access_token(access_token)
    }

    async fn send_checked(&self, request: TransportRequest) -> Result<String, AuthError> {
        let response = self.transport.send(request).await?;
        if !response.status.is_success() {
            return Err(AuthError::Endpoint {
                status: response.status,
                body: response.body,
            });
        }
        Ok(response.body)
    }
}

/// Strip HTML tag spans and ASCII control characters from the raw `code`
/// query value before it is embedded in the token-exchange body.
fn sanitize_code(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut in_tag = false;
    for ch in raw.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            c if in_tag || c.is_control() => {}
            c => out.push(c),
        }
    }
    out
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EmailRecord {
    email: String,
}
