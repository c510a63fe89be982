// src/utils/http.rs

//! HTTP client utilities.

use std::sync::Arc;
use std::time::Duration;

use reqwest::StatusCode;
use reqwest::cookie::Jar;

use crate::error::{AppError, Result};
use crate::models::PortalConfig;

/// A fetched page: where the request ended up and what it returned.
#[derive(Debug, Clone)]
pub struct Page {
    /// Final URL after redirects
    pub url: String,
    pub status: StatusCode,
    pub body: String,
}

impl Page {
    /// Fail unless the status is 2xx.
    pub fn ensure_success(&self) -> Result<()> {
        if self.status.is_success() {
            Ok(())
        } else {
            Err(AppError::Status {
                url: self.url.clone(),
                status: self.status.as_u16(),
            })
        }
    }
}

/// Create a configured asynchronous HTTP client for public pages.
pub fn create_async_client(portal: &PortalConfig) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(&portal.user_agent)
        .timeout(Duration::from_secs(portal.timeout_secs))
        .build()?;
    Ok(client)
}

/// Create a client that keeps portal cookies in `jar`.
pub fn create_session_client(portal: &PortalConfig, jar: Arc<Jar>) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(&portal.user_agent)
        .timeout(Duration::from_secs(portal.timeout_secs))
        .cookie_provider(jar)
        .build()?;
    Ok(client)
}

/// Fetch a page asynchronously, keeping the final URL and status.
pub async fn fetch_page_async(client: &reqwest::Client, url: &str) -> Result<Page> {
    let response = client.get(url).send().await?;
    let final_url = response.url().to_string();
    let status = response.status();
    let body = response.text().await?;
    Ok(Page {
        url: final_url,
        status,
        body,
    })
}
