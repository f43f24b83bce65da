use crate::providers::types::ApiKey;
use reqwest_middleware::RequestBuilder;

/// How requests to a service are authenticated, plus the environment
/// variable the key came from so auth failures can point at it.
#[derive(Clone, Debug)]
pub struct AuthStrategy {
    key: Option<ApiKey>,
    key_env: String,
}

impl AuthStrategy {
    /// Bearer auth when a key is present. Local servers usually take none.
    #[must_use]
    pub fn optional_bearer(key: ApiKey) -> Self {
        Self {
            key: (!key.is_empty()).then_some(key),
            key_env: String::new(),
        }
    }

    #[must_use]
    pub fn with_key_env(mut self, var: impl Into<String>) -> Self {
        self.key_env = var.into();
        self
    }

    #[must_use]
    pub fn key_env(&self) -> &str {
        &self.key_env
    }

    #[must_use]
    pub const fn is_anonymous(&self) -> bool {
        self.key.is_none()
    }

    #[must_use]
    pub fn apply(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.key {
            Some(key) => request.bearer_auth(key.as_str()),
            None => request,
        }
    }
}
