use thiserror::Error;
use url::Url;

/// Static GitHub application settings supplied by the embedding host.
#[derive(Debug, Clone)]
pub struct GithubConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_url: Url,
    pub app_name: String,
}

impl GithubConfig {
    /// Build a validated configuration. Every field is required: an empty
    /// value would otherwise only surface later as a malformed outbound
    /// request.
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_url: &str,
        app_name: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let config = Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_url: Url::parse(redirect_url)?,
            app_name: app_name.into(),
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("client_id", &self.client_id),
            ("client_secret", &self.client_secret),
            ("app_name", &self.app_name),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::EmptyField(name));
            }
        }
        Ok(())
    }
}

/// Errors reported while assembling the GitHub application configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration value '{0}' must not be empty")]
    EmptyField(&'static str),
    #[error("invalid redirect URL: {0}")]
    InvalidRedirectUrl(#[from] url::ParseError),
}
