//! Authentication session ownership.
//!
//! [`SessionStore`] is the single owner of the current [`Session`]. Readers get
//! snapshots, writers go through [`SessionStore::transition`], which updates
//! the in-memory copy, writes the on-disk cache and notifies every listener
//! before returning.

pub mod cache;
pub mod provider;
pub mod supabase;

use std::sync::{
  atomic::{AtomicU64, Ordering},
  Arc, Mutex, PoisonError, RwLock,
};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

pub use self::{
  cache::SessionCache,
  provider::{AuthError, AuthOutcome, IdentityProvider, SignUpGrant},
  supabase::SupabaseAuth,
};
use crate::{models::Credentials, secret::Secret};

/// Refresh this many seconds before the token actually expires.
pub const REFRESH_MARGIN_SECS: i64 = 30;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
  pub access_token: Secret,
  #[serde(default)]
  pub user_id: Option<String>,
  #[serde(default)]
  pub email: Option<String>,
  #[serde(default)]
  pub refresh_token: Option<Secret>,
  /// Unix seconds
  #[serde(default)]
  pub expires_at: Option<i64>,
}

impl Session {
  pub fn has_token(&self) -> bool {
    !self.access_token.expose().trim().is_empty()
  }

  pub fn needs_refresh(&self, now: i64) -> bool {
    self.expires_at.is_some_and(|expires_at| now + REFRESH_MARGIN_SECS >= expires_at)
  }

  /// Name to show in the status line
  pub fn display_name(&self) -> &str {
    self.email.as_deref().or(self.user_id.as_deref()).unwrap_or("signed in")
  }
}

/// Result of [`SessionStore::get_session`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionRead {
  pub session: Option<Session>,
  /// Set when a refresh was needed but the provider could not be reached;
  /// `session` is then the stale cached copy.
  pub transient_error: Option<String>,
}

impl SessionRead {
  fn fresh(session: Option<Session>) -> Self {
    Self { session, transient_error: None }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Box<dyn Fn(Option<&Session>) + Send + Sync>;

pub struct SessionStore {
  provider: Arc<dyn IdentityProvider>,
  cache: Option<SessionCache>,
  current: RwLock<Option<Session>>,
  listeners: Mutex<Vec<(ListenerId, Listener)>>,
  next_listener: AtomicU64,
  /// Bumped by every transition.
  generation: AtomicU64,
  refresh_lock: tokio::sync::Mutex<()>,
}

impl SessionStore {
  pub fn new(provider: Arc<dyn IdentityProvider>) -> Self {
    Self {
      provider,
      cache: None,
      current: RwLock::new(None),
      listeners: Mutex::new(Vec::new()),
      next_listener: AtomicU64::new(0),
      generation: AtomicU64::new(0),
      refresh_lock: tokio::sync::Mutex::new(()),
    }
  }

  pub fn with_cache(mut self, cache: SessionCache) -> Self {
    self.cache = Some(cache);
    self
  }

  /// Adopt whatever the on-disk cache holds. Called once at start-up.
  pub fn load(&self) -> Option<Session> {
    let cached = self.cache.as_ref().and_then(SessionCache::load);
    if cached.is_some() {
      debug!("Restored cached session");
    }
    self.transition(cached)
  }

  /// Current session without touching the provider.
  pub fn snapshot(&self) -> Option<Session> {
    self.current.read().unwrap_or_else(PoisonError::into_inner).clone()
  }

  /// Current session, refreshed first when it is about to expire.
  pub async fn get_session(&self) -> SessionRead {
    match self.snapshot() {
      Some(session) if session.needs_refresh(now()) => self.refresh(session).await,
      other => SessionRead::fresh(other),
    }
  }

  /// Register a callback run on every session transition.
  ///
  /// Listeners run while the store holds its listener lock and must not call
  /// `on_change`/`remove_listener` themselves.
  pub fn on_change<F>(&self, listener: F) -> ListenerId
  where
    F: Fn(Option<&Session>) + Send + Sync + 'static,
  {
    let id = ListenerId(self.next_listener.fetch_add(1, Ordering::Relaxed));
    self.listeners.lock().unwrap_or_else(PoisonError::into_inner).push((id, Box::new(listener)));
    id
  }

  pub fn remove_listener(&self, id: ListenerId) {
    self.listeners.lock().unwrap_or_else(PoisonError::into_inner).retain(|(listener_id, _)| *listener_id != id);
  }

  pub async fn sign_in(&self, credentials: &Credentials) -> Result<AuthOutcome, AuthError> {
    let session = self.provider.sign_in(credentials).await?;
    if self.transition(Some(session)).is_none() {
      return Err(AuthError::InvalidResponse("sign-in returned an empty access token".to_string()));
    }
    info!("Signed in as {}", credentials.email);
    Ok(AuthOutcome::SignedIn)
  }

  pub async fn sign_up(&self, credentials: &Credentials) -> Result<AuthOutcome, AuthError> {
    match self.provider.sign_up(credentials).await? {
      SignUpGrant::Session(session) => {
        if self.transition(Some(session)).is_none() {
          return Err(AuthError::InvalidResponse("sign-up returned an empty access token".to_string()));
        }
        info!("Signed up and signed in as {}", credentials.email);
        Ok(AuthOutcome::SignedIn)
      },
      SignUpGrant::ConfirmationRequired => {
        info!("Sign-up for {} awaits e-mail confirmation", credentials.email);
        Ok(AuthOutcome::ConfirmationSent)
      },
    }
  }

  /// Clear the session locally (listeners are notified before the provider is
  /// contacted), then revoke the token if the provider is reachable.
  pub async fn sign_out(&self) {
    let previous = self.snapshot();
    self.transition(None);

    if let Some(session) = previous {
      if let Err(e) = self.provider.sign_out(session.access_token.expose()).await {
        warn!("Token revocation failed, session cleared locally: {e}");
      }
    }
  }

  async fn refresh(&self, stale: Session) -> SessionRead {
    let _guard = self.refresh_lock.lock().await;

    // Someone else refreshed or signed out while we waited
    let generation = self.generation.load(Ordering::SeqCst);
    let session = match self.snapshot() {
      Some(current) if current == stale => current,
      other => return SessionRead::fresh(other),
    };

    let Some(refresh_token) = session.refresh_token.clone() else {
      debug!("Session is about to expire but carries no refresh token");
      return SessionRead::fresh(Some(session));
    };

    let outcome = self.provider.refresh(refresh_token.expose()).await;
    let next = match &outcome {
      Ok(renewed) => Some(renewed.clone()),
      Err(e) if e.is_transient() => {
        warn!("Session refresh failed, using cached session: {e}");
        if self.generation.load(Ordering::SeqCst) != generation {
          return SessionRead::fresh(self.snapshot());
        }
        return SessionRead { session: Some(session), transient_error: Some(e.to_string()) };
      },
      Err(e) => {
        warn!("Session refresh rejected, signing out: {e}");
        None
      },
    };

    match self.transition_from(generation, next) {
      Ok(current) => {
        if outcome.is_ok() {
          debug!("Session refreshed");
        }
        SessionRead::fresh(current)
      },
      Err(Superseded) => {
        debug!("Discarding refresh result, the session changed while it was in flight");
        SessionRead::fresh(self.snapshot())
      },
    }
  }

  /// Replace the session and notify listeners. Sessions with an empty token
  /// are stored as absent.
  fn transition(&self, next: Option<Session>) -> Option<Session> {
    let listeners = self.listeners.lock().unwrap_or_else(PoisonError::into_inner);
    self.commit(&listeners, next)
  }

  /// Like [`Self::transition`], unless another transition happened since
  /// `generation` was read.
  fn transition_from(&self, generation: u64, next: Option<Session>) -> Result<Option<Session>, Superseded> {
    let listeners = self.listeners.lock().unwrap_or_else(PoisonError::into_inner);
    if self.generation.load(Ordering::SeqCst) != generation {
      return Err(Superseded);
    }
    Ok(self.commit(&listeners, next))
  }

  /// Caller holds the listener lock, which orders transitions. The cache write
  /// happens under it too, so the file always holds the latest transition.
  fn commit(&self, listeners: &[(ListenerId, Listener)], next: Option<Session>) -> Option<Session> {
    let next = next.filter(|session| {
      let valid = session.has_token();
      if !valid {
        warn!("Discarding session with an empty access token");
      }
      valid
    });

    *self.current.write().unwrap_or_else(PoisonError::into_inner) = next.clone();
    self.generation.fetch_add(1, Ordering::SeqCst);

    if let Some(cache) = &self.cache {
      if let Err(e) = cache.store(next.as_ref()) {
        warn!("Failed to persist session cache: {e:?}");
      }
    }

    for (_, listener) in listeners.iter() {
      listener(next.as_ref());
    }
    next
  }
}

/// A refresh lost the race against another transition.
#[derive(Debug)]
struct Superseded;

fn now() -> i64 {
  chrono::Utc::now().timestamp()
}
