// src/services/session.rs

//! Portal session management.
//!
//! A [`SessionManager`] logs in once with a stored [`Credential`] and hands
//! out cheap [`Session`] clones that share one cookie jar. When a fetch finds
//! the portal's login page instead of the requested page, the caller asks for
//! a renewal; renewals are serialized and generation-checked so a burst of
//! concurrent expiries triggers a single re-login.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::cookie::Jar;
use tokio::sync::Mutex;

use crate::error::{AppError, Result};
use crate::models::{Credential, PortalConfig};
use crate::utils::http::{self, Page};

/// URL fragments the portal uses to signal session state.
#[derive(Debug, Clone)]
struct PortalMarkers {
    login: String,
    not_found: String,
}

/// An authenticated handle to the portal.
///
/// Adapters only use it to issue requests; cloning shares the cookie state.
#[derive(Clone)]
pub struct Session {
    client: reqwest::Client,
    generation: u64,
    markers: Arc<PortalMarkers>,
}

impl Session {
    fn new(client: reqwest::Client, generation: u64, portal: &PortalConfig) -> Self {
        Self {
            client,
            generation,
            markers: Arc::new(PortalMarkers {
                login: portal.login_marker.clone(),
                not_found: portal.not_found_marker.clone(),
            }),
        }
    }

    /// Login generation this session belongs to.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// GET a restricted page.
    ///
    /// A redirect to the login page (or a 401) means the session is no
    /// longer valid; a redirect to the author list means the author is
    /// unknown to the portal.
    pub async fn get_page(&self, url: &str) -> Result<Page> {
        let page = http::fetch_page_async(&self.client, url).await?;
        if page.status == StatusCode::UNAUTHORIZED || page.url.contains(&self.markers.login) {
            log::debug!("Session {} rejected at {}", self.generation, url);
            return Err(AppError::SessionExpired);
        }
        if page.url.contains(&self.markers.not_found) {
            return Err(AppError::AuthorNotFound(url.to_string()));
        }
        page.ensure_success()?;
        Ok(page)
    }

    #[cfg(test)]
    pub(crate) fn detached(generation: u64) -> Self {
        let portal = PortalConfig::default();
        Self::new(reqwest::Client::new(), generation, &portal)
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}

/// Source of portal sessions for restricted fetches.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// Return the current session, logging in first if there is none.
    async fn ensure_session(&self) -> Result<Session>;

    /// Replace `stale` with a fresh session.
    ///
    /// If another caller already renewed it, the newer session is returned
    /// without logging in again.
    async fn renew(&self, stale: &Session) -> Result<Session>;
}

/// Holds the current session and serializes logins.
#[derive(Default)]
pub(crate) struct SessionSlot {
    current: Mutex<Option<Session>>,
    generation: AtomicU64,
    logins: AtomicUsize,
}

impl SessionSlot {
    /// Return the held session unless it is missing, stale or `force` is set,
    /// in which case `login` runs with the next generation number.
    ///
    /// The lock is held across `login`, so at most one login is in flight.
    pub(crate) async fn acquire<F, Fut>(
        &self,
        stale: Option<u64>,
        force: bool,
        login: F,
    ) -> Result<Session>
    where
        F: FnOnce(u64) -> Fut,
        Fut: Future<Output = Result<Session>>,
    {
        let mut current = self.current.lock().await;
        if !force {
            if let Some(session) = current.as_ref() {
                if Some(session.generation()) != stale {
                    return Ok(session.clone());
                }
            }
            // The held session is the stale one.
            current.take();
        }

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let session = login(generation).await?;
        self.logins.fetch_add(1, Ordering::SeqCst);
        *current = Some(session.clone());
        Ok(session)
    }

    pub(crate) fn logins(&self) -> usize {
        self.logins.load(Ordering::SeqCst)
    }
}

/// Owns the credential and the authenticated cookie state for one workflow.
pub struct SessionManager {
    portal: PortalConfig,
    credential: Credential,
    slot: SessionSlot,
}

impl SessionManager {
    /// Create a manager; no request is made until a session is needed.
    pub fn new(portal: PortalConfig, credential: Credential) -> Self {
        Self {
            portal,
            credential,
            slot: SessionSlot::default(),
        }
    }

    /// Perform the login handshake now, replacing any held session.
    pub async fn login(&self) -> Result<Session> {
        self.slot
            .acquire(None, true, |generation| self.authenticate(generation))
            .await
    }

    /// Number of successful logins performed by this manager.
    pub fn login_count(&self) -> usize {
        self.slot.logins()
    }

    async fn authenticate(&self, generation: u64) -> Result<Session> {
        let jar = Arc::new(Jar::default());
        let client = http::create_session_client(&self.portal, jar)?;
        let login_url = self.portal.login_url();

        log::info!("Logging in to {}", self.portal.base_url);

        let response = client
            .post(&login_url)
            .form(&[
                ("username", self.credential.username()),
                ("password", self.credential.password()),
            ])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AppError::from(e)
                } else {
                    AppError::authentication(format!("portal unreachable: {e}"))
                }
            })?;

        let landed = response.url().to_string();
        log::debug!("Login answered {} at {}", response.status(), landed);

        if !landed.contains(&self.portal.dashboard_marker) {
            return Err(AppError::authentication(
                "the portal rejected the username or password",
            ));
        }

        log::info!("Login successful (session {generation})");
        Ok(Session::new(client, generation, &self.portal))
    }
}

#[async_trait]
impl SessionProvider for SessionManager {
    async fn ensure_session(&self) -> Result<Session> {
        self.slot
            .acquire(None, false, |generation| self.authenticate(generation))
            .await
    }

    async fn renew(&self, stale: &Session) -> Result<Session> {
        log::warn!("Session {} expired, logging in again", stale.generation());
        self.slot
            .acquire(Some(stale.generation()), false, |generation| {
                self.authenticate(generation)
            })
            .await
    }
}

impl fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionManager")
            .field("base_url", &self.portal.base_url)
            .field("logins", &self.login_count())
            .finish_non_exhaustive()
    }
}
