use std::fmt;

/// Secret credential for a remote service. `Debug` never prints it whole.
#[derive(Clone, Default)]
pub struct ApiKey(String);

impl ApiKey {
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Reads `var`, treating an unset or blank variable as no key.
    #[must_use]
    pub fn from_env(var: &str) -> Option<Self> {
        std::env::var(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(Self)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.len() {
            0 => f.write_str("ApiKey(<empty>)"),
            1..=8 => f.write_str("ApiKey(***)"),
            len => write!(f, "ApiKey({}...{})", &self.0[..4], &self.0[len - 3..]),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ModelId(String);

impl ModelId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ModelId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for ModelId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// Service root such as `https://api.openai.com` or
/// `http://localhost:11434/v1`. Trailing slashes are dropped.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BaseUrl(String);

impl BaseUrl {
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        let url = url.into();
        Self(url.trim_end_matches('/').to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Appends an API path such as `/v1/chat/completions`. A root that
    /// already ends in `/v1` is not given a second one.
    #[must_use]
    pub fn join(&self, path: &str) -> String {
        match path.strip_prefix("/v1") {
            Some(rest) if self.0.ends_with("/v1") => format!("{}{rest}", self.0),
            _ => format!("{}{path}", self.0),
        }
    }
}

impl fmt::Display for BaseUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BaseUrl {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for BaseUrl {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_key_debug_is_redacted() {
        let long = format!("{:?}", ApiKey::new("sk-proj-abcdefghijklmnop"));
        assert_eq!(long, "ApiKey(sk-p...nop)");

        assert_eq!(format!("{:?}", ApiKey::new("short")), "ApiKey(***)");
        assert_eq!(format!("{:?}", ApiKey::default()), "ApiKey(<empty>)");
    }

    #[test]
    fn test_missing_env_key_is_none() {
        assert!(ApiKey::from_env("VEXA_TEST_UNSET_KEY_12345").is_none());
    }

    #[test]
    fn test_model_id_display() {
        let model: ModelId = "gpt-4o-mini".into();
        assert_eq!(model.to_string(), "gpt-4o-mini");
    }

    #[test]
    fn test_base_url_strips_trailing_slashes() {
        assert_eq!(BaseUrl::new("https://example.com///").as_str(), "https://example.com");
    }

    #[test]
    fn test_base_url_join() {
        assert_eq!(
            BaseUrl::new("https://api.openai.com/").join("/v1/audio/speech"),
            "https://api.openai.com/v1/audio/speech"
        );
        assert_eq!(
            BaseUrl::new("http://localhost:11434/v1").join("/v1/chat/completions"),
            "http://localhost:11434/v1/chat/completions"
        );
        assert_eq!(
            BaseUrl::new("http://host/v1beta").join("/v1/chat/completions"),
            "http://host/v1beta/v1/chat/completions"
        );
    }
}
