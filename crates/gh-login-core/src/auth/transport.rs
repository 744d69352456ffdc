use std::future::Future;

use reqwest::{Client, StatusCode};
use url::Url;

use super::AuthError;

/// A single outbound request to GitHub.
///
/// A request is a POST when `post_data` carries at least one pair and a GET
/// otherwise. When `access_token` is set the transport sends the
/// `User-Agent`, `Accept` and `Authorization: Bearer` header set; without it
/// only `Accept: application/json` goes out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportRequest {
    pub url: Url,
    pub post_data: Option<Vec<(&'static str, String)>>,
    pub access_token: Option<String>,
}

impl TransportRequest {
    pub fn get(url: Url) -> Self {
        Self {
            url,
            post_data: None,
            access_token: None,
        }
    }

    pub fn post(url: Url, post_data: Vec<(&'static str, String)>) -> Self {
        Self {
            url,
            post_data: Some(post_data),
            access_token: None,
        }
    }

    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }
}

/// Raw response body plus status; the caller is responsible for JSON parsing.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: StatusCode,
    pub body: String,
}

/// Seam between the login flow and the network, substitutable in tests.
pub trait Transport: Send + Sync {
    fn send(
        &self,
        request: TransportRequest,
    ) -> impl Future<Output = Result<TransportResponse, AuthError>> + Send;
}

/// reqwest-backed transport. The inner `Client` is cheap to clone and safe
/// to share across concurrent `authenticate` calls.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: Client,
    app_name: String,
}

impl HttpTransport {
    pub fn new(app_name: impl Into<String>) -> Result<Self, AuthError> {
        let http = Client::builder().build()?;
        Ok(Self {
            http,
            app_name: app_name.into(),
        })
    }
}

impl Transport for HttpTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, AuthError> {
        let mut builder = match &request.post_data {
            Some(form) if !form.is_empty() => self.http.post(request.url.clone()).form(form),
            _ => self.http.get(request.url.clone()),
        };

        builder = builder.header("Accept", "application/json");
        if let Some(token) = request
            .access_token
            .as_deref()
            .filter(|token| !token.is_empty())
        {
            builder = builder
                .header("User-Agent", &self.app_name)
                .header("Authorization", format!("Bearer {token}"));
        }

        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;
        Ok(TransportResponse { status, body })
    }
}
