//! Server state shared across request handlers.

use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use rusqlite::Connection;
use sha2::{Digest, Sha512};
use time::Duration;

use crate::{Error, auth::DEFAULT_COOKIE_DURATION, db::initialize};

/// Everything the router needs to serve a request: the cookie signing key,
/// the auth cookie lifetime, the server's timezone, and the SQLite connection
/// behind a mutex.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Signs and encrypts the private auth cookie.
    pub cookie_key: Key,
    /// How long a freshly issued auth cookie is valid for.
    pub cookie_duration: Duration,
    /// Canonical timezone name the server runs in, e.g. "Pacific/Auckland".
    pub local_timezone: String,
    /// The shared SQLite connection.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl AppState {
    /// Build the app state and create any missing database tables.
    ///
    /// # Errors
    /// Returns an error if the database schema cannot be created.
    pub fn new(
        db_connection: Connection,
        cookie_secret: &str,
        local_timezone: &str,
    ) -> Result<Self, Error> {
        initialize(&db_connection)?;

        Ok(Self {
            cookie_key: create_cookie_key(cookie_secret),
            cookie_duration: DEFAULT_COOKIE_DURATION,
            local_timezone: local_timezone.to_owned(),
            db_connection: Arc::new(Mutex::new(db_connection)),
        })
    }
}

// Lets `PrivateCookieJar` find the signing key in the router state.
impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}

/// The slice of [AppState] needed to issue, verify, and extend auth cookies.
///
/// Shared by the log-in handler, the registration handler, and the auth
/// middleware so all three agree on cookie settings.
#[derive(Clone)]
pub struct AuthSessionState {
    /// Signs and encrypts the private auth cookie.
    pub cookie_key: Key,
    /// How long a freshly issued auth cookie is valid for.
    pub cookie_duration: Duration,
    /// Canonical timezone name the server runs in, e.g. "Pacific/Auckland".
    pub local_timezone: String,
    /// The shared SQLite connection.
    pub db_connection: Arc<Mutex<Connection>>,
}

#[cfg(test)]
impl AuthSessionState {
    /// Create a standalone auth state, deriving the signing key from
    /// `cookie_secret`.
    pub fn new(
        cookie_secret: &str,
        local_timezone: &str,
        db_connection: Arc<Mutex<Connection>>,
    ) -> Self {
        Self {
            cookie_key: create_cookie_key(cookie_secret),
            cookie_duration: DEFAULT_COOKIE_DURATION,
            local_timezone: local_timezone.to_owned(),
            db_connection,
        }
    }
}

impl FromRef<AppState> for AuthSessionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

impl FromRef<AuthSessionState> for Key {
    fn from_ref(state: &AuthSessionState) -> Self {
        state.cookie_key.clone()
    }
}

/// Derive a cookie signing key by hashing `secret`.
pub fn create_cookie_key(secret: &str) -> Key {
    Key::from(&Sha512::digest(secret))
}
