// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Cached session access.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use sha1::{Digest, Sha1};
use tokio::sync::Mutex;

use crate::error::{AuthError, AuthFailure};

use super::{Credential, CredentialAcquirer, SessionStore};

/// Login identity as sent to the account service.
///
/// The account service expects the SHA-1 hex digest of the password, never
/// the password itself.
#[derive(Clone, PartialEq, Eq)]
pub struct Identity {
    username: String,
    password_hash: String,
}

impl Identity {
    /// Derives the identity for `username` and a plaintext `password`.
    ///
    /// # Examples
    ///
    /// ```
    /// use hwl_bridge::session::Identity;
    ///
    /// let identity = Identity::derive("me@example.com", "password");
    /// assert_eq!(identity.password_hash(), "5baa61e4c9b93f3f0682250b6cf8331b7ee68fd8");
    /// ```
    #[must_use]
    pub fn derive(username: &str, password: &str) -> Self {
        Self {
            username: username.to_string(),
            password_hash: hex::encode(Sha1::digest(password.as_bytes())),
        }
    }

    /// Returns the username.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Returns the hex encoded password digest.
    #[must_use]
    pub fn password_hash(&self) -> &str {
        &self.password_hash
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity")
            .field("username", &self.username)
            .field("password_hash", &"<redacted>")
            .finish()
    }
}

/// Failure of the most recent acquisition, kept for callers that waited on it.
#[derive(Debug, Clone)]
struct FailedAcquisition {
    attempts: u32,
    last: AuthFailure,
}

impl From<FailedAcquisition> for AuthError {
    fn from(failed: FailedAcquisition) -> Self {
        Self::Exhausted {
            attempts: failed.attempts,
            last: failed.last,
        }
    }
}

/// Entry point for obtaining a vendor session.
///
/// A live cached credential is returned without touching the network.
/// Otherwise one acquisition runs; callers that miss the cache while it is
/// in flight wait for it and share its outcome, success or failure, instead
/// of logging in again.
pub struct SessionProvider {
    store: Arc<SessionStore>,
    acquirer: CredentialAcquirer,
    username: String,
    password: String,
    /// Number of acquisitions finished so far.
    completed: AtomicU64,
    in_flight: Mutex<Option<FailedAcquisition>>,
}

impl SessionProvider {
    /// Creates a provider logging in as `username` with plaintext `password`.
    #[must_use]
    pub fn new(
        acquirer: CredentialAcquirer,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            store: Arc::clone(acquirer.store()),
            acquirer,
            username: username.into(),
            password: password.into(),
            completed: AtomicU64::new(0),
            in_flight: Mutex::new(None),
        }
    }

    /// Returns the underlying session store.
    #[must_use]
    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    /// Returns a live session, logging in if none is cached.
    ///
    /// # Errors
    ///
    /// Returns `AuthError` when the acquisition exhausts its retries. Callers
    /// that waited on that acquisition receive the same error.
    pub async fn session(&self) -> Result<Credential, AuthError> {
        if let Some(credential) = self.store.get() {
            tracing::debug!("Cached session found");
            return Ok(credential);
        }

        let seen = self.completed.load(Ordering::Acquire);
        let mut last_failure = self.in_flight.lock().await;

        // Another caller may have finished logging in while we waited
        if let Some(credential) = self.store.get() {
            tracing::debug!("Session obtained by concurrent login");
            return Ok(credential);
        }
        if self.completed.load(Ordering::Acquire) != seen
            && let Some(failed) = last_failure.clone()
        {
            tracing::debug!("Concurrent login failed, sharing its error");
            return Err(failed.into());
        }

        tracing::debug!(username = %self.username, "No cached session, logging in");
        let identity = Identity::derive(&self.username, &self.password);
        let result = self.acquirer.acquire(&identity).await;

        *last_failure = match &result {
            Err(AuthError::Exhausted { attempts, last }) => Some(FailedAcquisition {
                attempts: *attempts,
                last: last.clone(),
            }),
            _ => None,
        };
        self.completed.fetch_add(1, Ordering::Release);

        result
    }
}

impl fmt::Debug for SessionProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionProvider")
            .field("store", &self.store)
            .field("acquirer", &self.acquirer)
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}
