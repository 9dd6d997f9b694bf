//! Connection configuration for the REST table-store backend.

use super::error::{RestDaoError, RestResult};

/// Runtime configuration describing how to reach the remote table API
/// (a PostgREST-style endpoint such as a Supabase project).
#[derive(Debug, Clone)]
pub struct RestConfig {
    /// Base URL of the project, without the `/rest/v1` suffix.
    pub base_url: String,
    /// Service key sent as both `apikey` and bearer token.
    pub api_key: Option<String>,
}

impl RestConfig {
    /// Construct a configuration from an explicit base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: None,
        }
    }

    /// Attach the service key to the configuration.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Build a configuration by reading the expected environment variables.
    pub fn from_env() -> RestResult<Self> {
        let base_url =
            std::env::var("REST_BASE_URL").map_err(|_| RestDaoError::MissingEnvVar {
                var: "REST_BASE_URL",
            })?;

        let mut config = Self::new(base_url);
        if let Ok(api_key) = std::env::var("REST_SERVICE_KEY") {
            config = config.with_api_key(api_key);
        }

        Ok(config)
    }
}
