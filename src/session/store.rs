// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Single-slot session cache with TTL expiry.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use parking_lot::RwLock;

use super::Clock;

/// A vendor session token and the time it was issued.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    token: String,
    issued_at: DateTime<Utc>,
}

impl Credential {
    /// Creates a credential.
    #[must_use]
    pub fn new(token: impl Into<String>, issued_at: DateTime<Utc>) -> Self {
        Self {
            token: token.into(),
            issued_at,
        }
    }

    /// Returns the session token.
    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Returns when the token was obtained.
    #[must_use]
    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    fn is_live(&self, now: DateTime<Utc>, ttl: Option<TimeDelta>) -> bool {
        ttl.is_none_or(|ttl| now.signed_duration_since(self.issued_at) < ttl)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Only a prefix of the token, it is a bearer secret
        let prefix: String = self.token.chars().take(4).collect();
        f.debug_struct("Credential")
            .field("token", &format_args!("{prefix}..."))
            .field("issued_at", &self.issued_at)
            .finish()
    }
}

/// Holds at most one live [`Credential`].
///
/// A credential expires once the TTL has elapsed since it was issued,
/// measured on the store's [`Clock`]. A zero TTL never expires. Expired
/// credentials are simply not returned; the next [`set`](Self::set)
/// replaces them.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use std::time::Duration;
/// use hwl_bridge::session::{ManualClock, SessionStore};
///
/// let clock = Arc::new(ManualClock::new());
/// let store = SessionStore::new(Duration::from_secs(60), clock.clone());
///
/// store.set("token-1");
/// assert_eq!(store.get().unwrap().token(), "token-1");
///
/// clock.advance(Duration::from_secs(60));
/// assert!(store.get().is_none());
/// ```
#[derive(Debug)]
pub struct SessionStore {
    slot: RwLock<Option<Credential>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl SessionStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            slot: RwLock::new(None),
            ttl,
            clock,
        }
    }

    /// Returns the configured TTL.
    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the cached credential if it has not expired.
    #[must_use]
    pub fn get(&self) -> Option<Credential> {
        let now = self.clock.now();
        let ttl = self.ttl_delta();
        self.slot
            .read()
            .as_ref()
            .filter(|credential| credential.is_live(now, ttl))
            .cloned()
    }

    /// Caches `token`, issued now, replacing any previous credential.
    pub fn set(&self, token: impl Into<String>) -> Credential {
        let credential = Credential::new(token, self.clock.now());
        *self.slot.write() = Some(credential.clone());
        credential
    }

    /// Drops the cached credential.
    pub fn clear(&self) {
        *self.slot.write() = None;
    }

    fn ttl_delta(&self) -> Option<TimeDelta> {
        if self.ttl.is_zero() {
            None
        } else {
            Some(TimeDelta::from_std(self.ttl).unwrap_or(TimeDelta::MAX))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::ManualClock;

    fn store(ttl_secs: u64) -> (SessionStore, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new());
        let store = SessionStore::new(Duration::from_secs(ttl_secs), clock.clone());
        (store, clock)
    }

    #[test]
    fn empty_store_returns_none() {
        let (store, _) = store(1800);
        assert!(store.get().is_none());
    }

    #[test]
    fn set_then_get() {
        let (store, clock) = store(1800);
        let issued = store.set("abc");
        assert_eq!(issued.issued_at(), clock.now());
        assert_eq!(store.get(), Some(issued));
    }

    #[test]
    fn live_until_ttl_elapses() {
        let (store, clock) = store(1800);
        store.set("abc");

        clock.advance(Duration::from_secs(1799));
        assert!(store.get().is_some());

        clock.advance(Duration::from_secs(1));
        assert!(store.get().is_none());
    }

    #[test]
    fn ttl_counts_from_latest_set() {
        let (store, clock) = store(10);
        store.set("first");
        clock.advance(Duration::from_secs(8));
        store.set("second");
        clock.advance(Duration::from_secs(8));

        assert_eq!(store.get().unwrap().token(), "second");
    }

    #[test]
    fn zero_ttl_never_expires() {
        let (store, clock) = store(0);
        store.set("abc");
        clock.advance(Duration::from_secs(365 * 24 * 3600));
        assert!(store.get().is_some());
    }

    #[test]
    fn clear_drops_credential() {
        let (store, _) = store(1800);
        store.set("abc");
        store.clear();
        assert!(store.get().is_none());
    }

    #[test]
    fn debug_hides_token() {
        let credential = Credential::new("secret-session-token", Utc::now());
        let debug = format!("{credential:?}");
        assert!(debug.contains("secr..."));
        assert!(!debug.contains("secret-session-token"));
    }
}
