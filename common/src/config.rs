use std::time::Duration;

const MOCK_BASE_URL: &str = "http://localhost:3001/api";
const DEFAULT_BASE_URL: &str = "/api";

/// Where the data service lives and how patient to be with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_ms: u64,
    /// Artificial latency added before each request. Only the mock backend uses it.
    pub request_delay_ms: u64,
    pub use_mock: bool,
}

impl ApiConfig {
    /// The local json-server used during development.
    pub fn mock() -> Self {
        Self {
            base_url: MOCK_BASE_URL.to_owned(),
            timeout_ms: 5000,
            request_delay_ms: 200,
            use_mock: true,
        }
    }

    pub fn real(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout_ms: 10_000,
            request_delay_ms: 0,
            use_mock: false,
        }
    }

    /// `use_mock` is on only for the literal `"true"`, the way the build flag is read.
    pub fn from_vars(use_mock: Option<&str>, api_url: Option<&str>) -> Self {
        if use_mock == Some("true") {
            return Self::mock();
        }
        match api_url.filter(|url| !url.trim().is_empty()) {
            Some(url) => Self::real(url.trim()),
            None => {
                tracing::warn!("API_URL is not set, falling back to {DEFAULT_BASE_URL}");
                Self::real(DEFAULT_BASE_URL)
            }
        }
    }

    /// Reads `USE_MOCK_API` and `API_URL`. The browser build bakes them in at
    /// compile time; native builds read the process environment.
    pub fn from_env() -> Self {
        #[cfg(target_arch = "wasm32")]
        {
            Self::from_vars(option_env!("USE_MOCK_API"), option_env!("API_URL"))
        }
        #[cfg(not(target_arch = "wasm32"))]
        {
            let use_mock = std::env::var("USE_MOCK_API").ok();
            let api_url = std::env::var("API_URL").ok();
            Self::from_vars(use_mock.as_deref(), api_url.as_deref())
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    pub fn with_request_delay(mut self, delay: Duration) -> Self {
        self.request_delay_ms = delay.as_millis() as u64;
        self
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::from_env()
    }
}
