//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Portal endpoints, markers and HTTP settings
    #[serde(default)]
    pub portal: PortalConfig,

    /// Fan-out and pagination limits
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Export defaults
    #[serde(default)]
    pub output: OutputConfig,

    /// Log filter
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.portal.user_agent.trim().is_empty() {
            return Err(AppError::validation("portal.user_agent is empty"));
        }
        if self.portal.timeout_secs == 0 {
            return Err(AppError::validation("portal.timeout_secs must be > 0"));
        }
        url::Url::parse(&self.portal.base_url)
            .map_err(|e| AppError::validation(format!("portal.base_url: {e}")))?;
        url::Url::parse(&self.portal.public_base_url)
            .map_err(|e| AppError::validation(format!("portal.public_base_url: {e}")))?;
        for (name, marker) in [
            ("portal.dashboard_marker", &self.portal.dashboard_marker),
            ("portal.login_marker", &self.portal.login_marker),
            ("portal.not_found_marker", &self.portal.not_found_marker),
        ] {
            if marker.trim().is_empty() {
                return Err(AppError::validation(format!("{name} is empty")));
            }
        }
        if self.fetch.max_concurrent == 0 {
            return Err(AppError::validation("fetch.max_concurrent must be > 0"));
        }
        if self.fetch.max_pages == 0 {
            return Err(AppError::validation("fetch.max_pages must be > 0"));
        }
        Ok(())
    }
}

/// Portal endpoints and HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortalConfig {
    /// Root of the author-verification portal (restricted sources)
    #[serde(default = "defaults::base_url")]
    pub base_url: String,

    /// Root of the public author pages (public sources)
    #[serde(default = "defaults::public_base_url")]
    pub public_base_url: String,

    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Timeout applied to every request, in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Final URL fragment that marks a successful login
    #[serde(default = "defaults::dashboard_marker")]
    pub dashboard_marker: String,

    /// Final URL fragment that marks an invalid session
    #[serde(default = "defaults::login_marker")]
    pub login_marker: String,

    /// Final URL fragment that marks an unknown author
    #[serde(default = "defaults::not_found_marker")]
    pub not_found_marker: String,
}

impl PortalConfig {
    /// Endpoint that receives the login form.
    pub fn login_url(&self) -> String {
        format!("{}/login/do_login", self.base_url.trim_end_matches('/'))
    }

    /// Restricted profile view of one author.
    pub fn author_view_url(&self, author: &str, view: &str) -> String {
        format!(
            "{}/author/profile/{}?view={}",
            self.base_url.trim_end_matches('/'),
            author,
            view
        )
    }

    /// Public profile page of one author, optionally on a given view.
    pub fn public_author_url(&self, author: &str, view: Option<&str>) -> String {
        let base = format!(
            "{}/authors/profile/{}",
            self.public_base_url.trim_end_matches('/'),
            author
        );
        match view {
            Some(view) => format!("{base}?view={view}"),
            None => base,
        }
    }
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::base_url(),
            public_base_url: defaults::public_base_url(),
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            dashboard_marker: defaults::dashboard_marker(),
            login_marker: defaults::login_marker(),
            not_found_marker: defaults::not_found_marker(),
        }
    }
}

/// Fan-out and pagination settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Maximum concurrent (author, field) fetches
    #[serde(default = "defaults::max_concurrent")]
    pub max_concurrent: usize,

    /// Pause after each completed fetch in milliseconds
    #[serde(default)]
    pub request_delay_ms: u64,

    /// Upper bound on pages read from one paginated view
    #[serde(default = "defaults::max_pages")]
    pub max_pages: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_concurrent: defaults::max_concurrent(),
            request_delay_ms: 0,
            max_pages: defaults::max_pages(),
        }
    }
}

/// Export defaults, overridable from the command line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Target directory
    #[serde(default = "defaults::output_folder")]
    pub folder: String,

    /// Prefix prepended to every file name
    #[serde(default)]
    pub prefix: String,

    /// One of csv, json, json-pretty, xlsx
    #[serde(default = "defaults::output_format")]
    pub format: String,

    /// Name files after the author's display name instead of the identifier
    #[serde(default)]
    pub use_fullname_prefix: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            folder: defaults::output_folder(),
            prefix: String::new(),
            format: defaults::output_format(),
            use_fullname_prefix: false,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default log filter when `RUST_LOG` is unset
    #[serde(default = "defaults::log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::log_level(),
        }
    }
}

mod defaults {
    // Portal defaults
    pub fn base_url() -> String {
        "https://sinta.kemdikbud.go.id/authorverification".into()
    }
    pub fn public_base_url() -> String {
        "https://sinta.kemdikbud.go.id".into()
    }
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; sintautils/0.1)".into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn dashboard_marker() -> String {
        "dashboard".into()
    }
    pub fn login_marker() -> String {
        "authorverification/login".into()
    }
    pub fn not_found_marker() -> String {
        "authorverification/author/all".into()
    }

    // Fetch defaults
    pub fn max_concurrent() -> usize {
        4
    }
    pub fn max_pages() -> usize {
        100
    }

    // Output defaults
    pub fn output_folder() -> String {
        "out".into()
    }
    pub fn output_format() -> String {
        "csv".into()
    }

    // Logging defaults
    pub fn log_level() -> String {
        "info".into()
    }
}
