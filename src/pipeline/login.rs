// src/pipeline/login.rs

//! Credential check against the portal.

use crate::error::Result;
use crate::models::{Config, Credential};
use crate::services::SessionManager;

/// Log in once and report the outcome.
pub async fn run_login(config: &Config, credential: Credential) -> Result<()> {
    let manager = SessionManager::new(config.portal.clone(), credential);
    match manager.login().await {
        Ok(session) => {
            log::info!(
                "Credentials accepted by {} (session {})",
                config.portal.base_url,
                session.generation()
            );
            Ok(())
        }
        Err(e) => {
            log::error!("Login failed: {e}");
            Err(e)
        }
    }
}
