//! Session management backed by durable storage
//!
//! The session is `{user, token}`. It lives in memory behind a `watch`
//! channel so screens can subscribe to changes, and every change is written
//! through to the key-value store so it survives restarts.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use common::error::{StorageError, StorageResult};
use common::storage::KeyValueStore;
use tokio::sync::{Mutex, watch};
use tracing::{error, info, warn};

use crate::error::{ClientError, ClientResult};
use crate::models::User;

/// Storage key of the serialized user
pub const USER_KEY: &str = "@b_ticket_user";
/// Storage key of the bearer token
pub const TOKEN_KEY: &str = "@b_ticket_token";

/// Current authenticated identity
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub user: Option<User>,
    pub token: Option<String>,
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some() && self.token.is_some()
    }
}

/// Lifecycle of the session store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Constructed, storage not read yet
    Initializing,
    /// Restored and accepting mutations
    Ready,
    /// Shut down; mutations are rejected
    Disposed,
}

struct Inner {
    store: Arc<dyn KeyValueStore>,
    session: watch::Sender<Session>,
    phase: watch::Sender<SessionPhase>,
    // Bumped on every clear; in-flight updates compare against it
    generation: AtomicU64,
    // Serializes write-through so memory and storage change together
    write_lock: Mutex<()>,
}

/// Shared handle to the session
#[derive(Clone)]
pub struct SessionState {
    inner: Arc<Inner>,
}

impl SessionState {
    /// Create a session store over the given storage
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        let (session, _) = watch::channel(Session::default());
        let (phase, _) = watch::channel(SessionPhase::Initializing);

        Self {
            inner: Arc::new(Inner {
                store,
                session,
                phase,
                generation: AtomicU64::new(0),
                write_lock: Mutex::new(()),
            }),
        }
    }

    /// Storage the session writes through to
    pub fn store(&self) -> Arc<dyn KeyValueStore> {
        Arc::clone(&self.inner.store)
    }

    /// Load the persisted session
    ///
    /// Never fails. A user entry that does not parse, or a user without a
    /// token (or the reverse), is removed from storage and the store starts
    /// logged out. A storage document that cannot be read at all is reset,
    /// so later sign-ins can write to it again.
    pub async fn restore(&self) -> Session {
        info!("Restoring session from storage");
        let _guard = self.inner.write_lock.lock().await;

        let session = match (self.read_entry(USER_KEY).await, self.read_entry(TOKEN_KEY).await) {
            (Ok(stored_user), Ok(stored_token)) => self.parse_stored(stored_user, stored_token).await,
            (Err(StorageError::Corrupted(e)), _) | (_, Err(StorageError::Corrupted(e))) => {
                warn!("Session storage is corrupted, resetting it: {}", e);
                if let Err(e) = self.inner.store.reset().await {
                    error!("Failed to reset session storage: {}", e);
                }
                Session::default()
            }
            (Err(e), _) | (_, Err(e)) => {
                error!("Failed to read session from storage: {}", e);
                Session::default()
            }
        };

        self.inner.session.send_replace(session.clone());
        self.inner.phase.send_replace(SessionPhase::Ready);

        if session.is_authenticated() {
            info!("Session restored");
        } else {
            info!("No stored session, starting signed out");
        }

        session
    }

    async fn parse_stored(&self, stored_user: Option<String>, stored_token: Option<String>) -> Session {
        match (stored_user, stored_token) {
            (Some(raw_user), Some(token)) => match serde_json::from_str::<User>(&raw_user) {
                Ok(user) => Session {
                    user: Some(user),
                    token: Some(token),
                },
                Err(e) => {
                    warn!("Stored user is corrupted, discarding session: {}", e);
                    self.purge_entries().await;
                    Session::default()
                }
            },
            (None, None) => Session::default(),
            _ => {
                warn!("Stored session is incomplete, discarding it");
                self.purge_entries().await;
                Session::default()
            }
        }
    }

    /// Snapshot of the current session
    pub fn current(&self) -> Session {
        self.inner.session.borrow().clone()
    }

    /// Subscribe to session changes
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.inner.session.subscribe()
    }

    pub fn phase(&self) -> SessionPhase {
        *self.inner.phase.borrow()
    }

    pub fn token(&self) -> Option<String> {
        self.inner.session.borrow().token.clone()
    }

    pub fn user(&self) -> Option<User> {
        self.inner.session.borrow().user.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner.session.borrow().is_authenticated()
    }

    /// Generation counter, incremented on every clear
    pub fn generation(&self) -> u64 {
        self.inner.generation.load(Ordering::SeqCst)
    }

    /// Persist and publish a freshly authenticated session
    pub async fn establish(&self, user: User, token: String) -> ClientResult<Session> {
        self.ensure_open()?;
        let _guard = self.inner.write_lock.lock().await;

        let serialized =
            serde_json::to_string(&user).map_err(|e| ClientError::Decode(e.to_string()))?;
        self.inner.store.set(USER_KEY, &serialized).await?;
        if let Err(e) = self.inner.store.set(TOKEN_KEY, &token).await {
            // Leave no user entry without its token
            if let Err(cleanup) = self.inner.store.delete(USER_KEY).await {
                error!("Failed to remove user entry after token write failed: {}", cleanup);
            }
            return Err(e.into());
        }

        let session = Session {
            user: Some(user),
            token: Some(token),
        };
        self.inner.session.send_replace(session.clone());
        info!("Session established");

        Ok(session)
    }

    /// Replace the stored user, unless the session was cleared since
    /// `generation` was read
    ///
    /// Returns `false` when the update was discarded.
    pub async fn replace_user(&self, user: User, generation: u64) -> ClientResult<bool> {
        self.ensure_open()?;
        let _guard = self.inner.write_lock.lock().await;

        if self.generation() != generation || !self.is_authenticated() {
            warn!("Session changed while the user update was in flight, discarding it");
            return Ok(false);
        }

        let serialized =
            serde_json::to_string(&user).map_err(|e| ClientError::Decode(e.to_string()))?;
        self.inner.store.set(USER_KEY, &serialized).await?;

        self.inner.session.send_modify(|session| session.user = Some(user));
        Ok(true)
    }

    /// Clear the session in memory and in storage
    ///
    /// Memory is cleared first, so readers see a signed-out session even if
    /// the storage deletion then fails.
    pub async fn clear(&self) -> ClientResult<()> {
        let _guard = self.inner.write_lock.lock().await;
        self.clear_locked().await
    }

    async fn clear_locked(&self) -> ClientResult<()> {
        self.inner.generation.fetch_add(1, Ordering::SeqCst);
        self.inner.session.send_replace(Session::default());

        self.inner.store.delete(USER_KEY).await?;
        self.inner.store.delete(TOKEN_KEY).await?;
        info!("Session cleared");

        Ok(())
    }

    /// Clear the session only if `token` is still the current token
    ///
    /// Returns `false` and leaves the session alone when it was signed out
    /// or replaced since `token` was sent.
    pub async fn clear_if_token(&self, token: &str) -> ClientResult<bool> {
        if self.token().as_deref() != Some(token) {
            return Ok(false);
        }

        let _guard = self.inner.write_lock.lock().await;
        // Re-check under the lock; a sign-in may have completed meanwhile
        if self.token().as_deref() != Some(token) {
            return Ok(false);
        }
        self.clear_locked().await?;
        Ok(true)
    }

    /// Stop accepting mutations
    pub fn dispose(&self) {
        self.inner.phase.send_replace(SessionPhase::Disposed);
        info!("Session store disposed");
    }

    fn ensure_open(&self) -> ClientResult<()> {
        match self.phase() {
            SessionPhase::Disposed => Err(ClientError::Disposed),
            _ => Ok(()),
        }
    }

    async fn read_entry(&self, key: &str) -> StorageResult<Option<String>> {
        let value = self.inner.store.get(key).await?;
        Ok(value.filter(|value| !value.is_empty()))
    }

    async fn purge_entries(&self) {
        for key in [USER_KEY, TOKEN_KEY] {
            if let Err(e) = self.inner.store.delete(key).await {
                error!("Failed to remove {} from storage: {}", key, e);
            }
        }
    }
}
