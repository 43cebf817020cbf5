//! Configuration options for the catalog admin client

use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::error::{Error, Result};

/// Token handed out by the mock backend's login lookup
pub const MOCK_TOKEN: &str = "mocked-jwt-token-123";

/// Configuration options for the catalog admin client
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// The request timeout
    pub request_timeout: Option<Duration>,

    /// Page size used when a table is first shown
    pub default_page_size: u32,

    /// Page sizes offered by the table size changer
    pub page_size_options: Vec<u32>,

    /// The token stored after a successful login lookup
    pub mock_token: String,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            request_timeout: Some(Duration::from_secs(30)),
            default_page_size: 10,
            page_size_options: vec![5, 10, 20, 50],
            mock_token: MOCK_TOKEN.to_string(),
        }
    }
}

impl ClientOptions {
    /// Set the request timeout
    pub fn with_request_timeout(mut self, value: Option<Duration>) -> Self {
        self.request_timeout = value;
        self
    }

    /// Set the default page size
    pub fn with_default_page_size(mut self, value: u32) -> Self {
        self.default_page_size = value;
        self
    }

    /// Set the page sizes offered to the user
    pub fn with_page_size_options(mut self, value: Vec<u32>) -> Self {
        self.page_size_options = value;
        self
    }

    /// Set the token recorded on login
    pub fn with_mock_token(mut self, value: &str) -> Self {
        self.mock_token = value.to_string();
        self
    }
}

/// Where the backend lives and where the session is kept.
/// Usually loaded from environment variables or a `.env` file.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    pub api_url: Url,
    pub session_file: PathBuf,
    pub options: ClientOptions,
}

impl CatalogConfig {
    /// Creates a new configuration, validating the URL.
    pub fn new(api_url: &str, session_file: impl Into<PathBuf>) -> Result<Self> {
        let api_url = Url::parse(api_url)?;
        if api_url.cannot_be_a_base() {
            return Err(Error::config(format!("{} cannot be used as a base URL", api_url)));
        }
        Ok(Self {
            api_url,
            session_file: session_file.into(),
            options: ClientOptions::default(),
        })
    }

    /// Replace the client options
    pub fn with_options(mut self, options: ClientOptions) -> Self {
        self.options = options;
        self
    }

    /// Reads `CATALOG_API_URL`, `CATALOG_SESSION_FILE` and
    /// `CATALOG_REQUEST_TIMEOUT_SECS`, loading `.env` first when present.
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();

        let api_url = std::env::var("CATALOG_API_URL").map_err(|_| {
            Error::config("CATALOG_API_URL environment variable not found")
        })?;
        let session_file = std::env::var("CATALOG_SESSION_FILE")
            .unwrap_or_else(|_| ".catalog-session.json".to_string());

        let mut options = ClientOptions::default();
        if let Ok(raw) = std::env::var("CATALOG_REQUEST_TIMEOUT_SECS") {
            let secs = raw.trim().parse::<u64>().map_err(|_| {
                Error::config(format!("CATALOG_REQUEST_TIMEOUT_SECS is not a number: {}", raw))
            })?;
            let timeout = if secs == 0 { None } else { Some(Duration::from_secs(secs)) };
            options = options.with_request_timeout(timeout);
        }

        Ok(Self::new(&api_url, session_file)?.with_options(options))
    }
}
