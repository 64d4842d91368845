// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Login with bounded retry and exponential backoff.

use std::sync::Arc;
use std::time::Duration;

use crate::cloud::CloudClient;
use crate::error::{AuthError, AuthFailure};

use super::{Credential, Identity, SessionStore};

/// How often and how patiently a login is retried.
///
/// After failed attempt `n` (counting from 0) the acquirer waits
/// `base_delay * 2^n` before the next one, so the delays run
/// `base, 2·base, 4·base, …`. There is no jitter.
///
/// # Examples
///
/// ```
/// use hwl_bridge::session::RetryPolicy;
/// use std::time::Duration;
///
/// let policy = RetryPolicy::new(3, Duration::from_secs(2));
/// assert_eq!(policy.delay_after(0), Duration::from_secs(2));
/// assert_eq!(policy.delay_after(1), Duration::from_secs(4));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
}

impl RetryPolicy {
    /// Default number of attempts.
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
    /// Default base delay.
    pub const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(2);

    /// Creates a policy. At least one attempt is always made.
    #[must_use]
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    /// Returns the total number of attempts.
    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Returns the delay after the first failure.
    #[must_use]
    pub fn base_delay(&self) -> Duration {
        self.base_delay
    }

    /// Returns the wait after failed attempt `attempt` (0-indexed).
    #[must_use]
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay
            .saturating_mul(2_u32.saturating_pow(attempt))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_ATTEMPTS, Self::DEFAULT_BASE_DELAY)
    }
}

/// Obtains session credentials from the account service.
///
/// Each call to [`acquire`](Self::acquire) runs its own retry loop; nothing
/// is shared between concurrent calls except the [`SessionStore`] the result
/// is written to.
#[derive(Debug, Clone)]
pub struct CredentialAcquirer {
    client: CloudClient,
    store: Arc<SessionStore>,
    policy: RetryPolicy,
}

impl CredentialAcquirer {
    /// Creates an acquirer that writes into `store`.
    #[must_use]
    pub fn new(client: CloudClient, store: Arc<SessionStore>, policy: RetryPolicy) -> Self {
        Self {
            client,
            store,
            policy,
        }
    }

    /// Returns the store credentials are written to.
    #[must_use]
    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    /// Returns the retry policy.
    #[must_use]
    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Logs in as `identity`, retrying per the policy.
    ///
    /// On success the new credential is cached before it is returned.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Exhausted` once every attempt has failed.
    pub async fn acquire(&self, identity: &Identity) -> Result<Credential, AuthError> {
        let max_attempts = self.policy.max_attempts;
        let mut attempt = 0;

        loop {
            tracing::debug!(attempt = attempt + 1, max_attempts, "Authentication attempt");

            match self
                .client
                .login(identity.username(), identity.password_hash())
                .await
            {
                Ok(token) => {
                    let credential = self.store.set(token);
                    tracing::info!(attempt = attempt + 1, "Obtained session");
                    return Ok(credential);
                }
                Err(failure) => {
                    self.log_failure(&failure, attempt + 1);

                    if attempt + 1 >= max_attempts {
                        tracing::error!(
                            max_attempts,
                            "Authentication failed after all attempts, check credentials, network connectivity and vendor API status"
                        );
                        return Err(AuthError::Exhausted {
                            attempts: max_attempts,
                            last: failure,
                        });
                    }

                    let delay = self.policy.delay_after(attempt);
                    tracing::warn!(
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        next_attempt = attempt + 2,
                        max_attempts,
                        "Retrying authentication"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }

    fn log_failure(&self, failure: &AuthFailure, attempt: u32) {
        let max_attempts = self.policy.max_attempts;
        match failure {
            AuthFailure::HttpStatus(status) => {
                tracing::error!(attempt, max_attempts, status, "Authentication attempt rejected");
            }
            AuthFailure::Timeout => {
                tracing::error!(
                    attempt,
                    max_attempts,
                    timeout_ms = u64::try_from(self.client.config().auth_timeout().as_millis())
                        .unwrap_or(u64::MAX),
                    "Authentication attempt timed out"
                );
            }
            AuthFailure::Connect(message) => {
                tracing::error!(
                    attempt,
                    max_attempts,
                    error = %message,
                    "Authentication attempt could not connect, check DNS and network connectivity"
                );
            }
            AuthFailure::MalformedResponse => {
                tracing::error!(attempt, max_attempts, "Login response carried no session token");
            }
            AuthFailure::Other(message) => {
                tracing::error!(attempt, max_attempts, error = %message, "Authentication attempt failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delays_double() {
        let policy = RetryPolicy::new(5, Duration::from_millis(100));
        let delays: Vec<_> = (0..4).map(|n| policy.delay_after(n)).collect();
        assert_eq!(
            delays,
            vec![
                Duration::from_millis(100),
                Duration::from_millis(200),
                Duration::from_millis(400),
                Duration::from_millis(800),
            ]
        );
    }

    #[test]
    fn delay_saturates_instead_of_overflowing() {
        let policy = RetryPolicy::new(3, Duration::from_secs(2));
        assert!(policy.delay_after(200) >= policy.delay_after(20));
    }

    #[test]
    fn at_least_one_attempt() {
        assert_eq!(RetryPolicy::new(0, Duration::ZERO).max_attempts(), 1);
    }

    #[test]
    fn default_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts(), 3);
        assert_eq!(policy.base_delay(), Duration::from_secs(2));
    }
}
