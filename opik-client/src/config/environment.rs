use std::fmt;

/// Base URL of a locally running Opik server.
pub const DEFAULT_BASE_URL: &str = "http://localhost:5173/api";

/// Base URL of Opik Cloud.
pub const CLOUD_BASE_URL: &str = "https://www.comet.com/opik/api";

/// A named Opik deployment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Environment {
    /// Local deployment at [`DEFAULT_BASE_URL`].
    #[default]
    Default,
    /// Opik Cloud at [`CLOUD_BASE_URL`].
    Cloud,
    /// Any other deployment.
    Custom(String),
}

impl Environment {
    pub fn base_url(&self) -> &str {
        match self {
            Self::Default => DEFAULT_BASE_URL,
            Self::Cloud => CLOUD_BASE_URL,
            Self::Custom(url) => url,
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.base_url())
    }
}

impl From<&str> for Environment {
    fn from(url: &str) -> Self {
        Self::Custom(url.to_string())
    }
}

impl From<String> for Environment {
    fn from(url: String) -> Self {
        Self::Custom(url)
    }
}
