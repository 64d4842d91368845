// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Bridge configuration.
//!
//! Settings come from environment variables (see
//! [`BridgeConfig::from_env`]) or are set in code with the `with_*` methods.
//!
//! | Variable | Meaning | Default |
//! |----------|---------|---------|
//! | `PORT` | Listen port | `3000` |
//! | `HWL_USERNAME` | Vendor account name | empty |
//! | `HWL_PASSWORD` | Vendor account password | empty |
//! | `SMARTPLUG_ID` | Default plug group | empty |
//! | `DEVICE_ROUTES` | JSON object mapping device ids to plug groups | `{}` |
//! | `MIN_DIMMING_VALUE` | Lowest dimmer level, 0-100 | `1` |
//! | `CACHE_TTL` | Session lifetime in seconds, 0 never expires | `1800` |
//! | `AUTH_TIMEOUT` | Login timeout in ms, 5000-60000 | `15000` |
//! | `AUTH_MAX_RETRIES` | Login attempts, 1-10 | `3` |
//! | `AUTH_RETRY_DELAY` | Backoff base in ms, 1000-10000 | `2000` |
//! | `REQUEST_TIMEOUT` | Plug service timeout in ms | `10000` |
//! | `STATE_DIR` | Device state directory | `./states` |
//! | `HWL_ACCOUNT_URL` | Account service base URL | vendor host |
//! | `HWL_PLUG_URL` | Plug service base URL | vendor host |
//!
//! Out-of-range authentication settings fall back to their defaults with a
//! warning. Other malformed values are errors.

use std::collections::HashMap;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::cloud::CloudConfig;
use crate::error::ConfigError;
use crate::routing::PlugRouter;
use crate::session::RetryPolicy;

/// Complete bridge configuration.
///
/// # Examples
///
/// ```
/// use hwl_bridge::config::BridgeConfig;
/// use std::time::Duration;
///
/// let config = BridgeConfig::new("me@example.com", "secret")
///     .with_default_plug_group("b33f109e-41ae-429a-9102-a715a3e8c6bc")
///     .with_route("ad621820-e2fb-40d2-9338-3f457e940cd2", "b33f109e-41ae-429a-9102-a715a3e8c6bc")
///     .with_min_dimming(10)
///     .with_session_ttl(Duration::from_secs(600));
///
/// assert_eq!(config.min_dimming(), 10);
/// ```
#[derive(Clone)]
pub struct BridgeConfig {
    web_port: u16,
    username: String,
    password: String,
    default_plug_group: String,
    routes: HashMap<String, String>,
    min_dimming: u8,
    session_ttl: Duration,
    auth_timeout: Duration,
    max_retries: u32,
    retry_base_delay: Duration,
    request_timeout: Duration,
    state_dir: PathBuf,
    account_url: String,
    plug_url: String,
}

impl BridgeConfig {
    /// Default listen port.
    pub const DEFAULT_PORT: u16 = 3000;
    /// Default minimum dimmer level.
    pub const DEFAULT_MIN_DIMMING: u8 = 1;
    /// Default session lifetime.
    pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(1800);
    /// Default state directory.
    pub const DEFAULT_STATE_DIR: &'static str = "./states";

    const AUTH_TIMEOUT_MS: Bounded = Bounded::new(15_000, 5_000, 60_000);
    const AUTH_MAX_RETRIES: Bounded = Bounded::new(3, 1, 10);
    const AUTH_RETRY_DELAY_MS: Bounded = Bounded::new(2_000, 1_000, 10_000);

    /// Creates a configuration with defaults for everything but the identity.
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            web_port: Self::DEFAULT_PORT,
            username: username.into(),
            password: password.into(),
            default_plug_group: String::new(),
            routes: HashMap::new(),
            min_dimming: Self::DEFAULT_MIN_DIMMING,
            session_ttl: Self::DEFAULT_SESSION_TTL,
            auth_timeout: Duration::from_millis(Self::AUTH_TIMEOUT_MS.default),
            max_retries: RetryPolicy::DEFAULT_MAX_ATTEMPTS,
            retry_base_delay: RetryPolicy::DEFAULT_BASE_DELAY,
            request_timeout: CloudConfig::DEFAULT_REQUEST_TIMEOUT,
            state_dir: PathBuf::from(Self::DEFAULT_STATE_DIR),
            account_url: CloudConfig::DEFAULT_ACCOUNT_URL.to_string(),
            plug_url: CloudConfig::DEFAULT_PLUG_URL.to_string(),
        }
    }

    /// Reads the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable holds a value that cannot be used.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`, which maps a variable name
    /// to its value.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable holds a value that cannot be used.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let mut config = Self::new(
            lookup("HWL_USERNAME").unwrap_or_default(),
            lookup("HWL_PASSWORD").unwrap_or_default(),
        );

        if let Some(port) = get("PORT") {
            config.web_port = parse("PORT", &port)?;
        }
        if let Some(group) = get("SMARTPLUG_ID") {
            config.default_plug_group = group;
        }
        if let Some(routes) = get("DEVICE_ROUTES") {
            config.routes = serde_json::from_str(&routes)?;
        }
        if let Some(min) = get("MIN_DIMMING_VALUE") {
            let min: u8 = parse("MIN_DIMMING_VALUE", &min)?;
            if min > 100 {
                return Err(ConfigError::Invalid {
                    key: "MIN_DIMMING_VALUE".to_string(),
                    message: format!("must be between 0 and 100, found {min}"),
                });
            }
            config.min_dimming = min;
        }
        if let Some(ttl) = get("CACHE_TTL") {
            config.session_ttl = Duration::from_secs(parse("CACHE_TTL", &ttl)?);
        }
        if let Some(timeout) = get("REQUEST_TIMEOUT") {
            config.request_timeout = Duration::from_millis(parse("REQUEST_TIMEOUT", &timeout)?);
        }
        if let Some(dir) = get("STATE_DIR") {
            config.state_dir = PathBuf::from(dir);
        }
        if let Some(url) = get("HWL_ACCOUNT_URL") {
            config.account_url = url;
        }
        if let Some(url) = get("HWL_PLUG_URL") {
            config.plug_url = url;
        }

        config.auth_timeout =
            Duration::from_millis(Self::AUTH_TIMEOUT_MS.resolve("AUTH_TIMEOUT", get("AUTH_TIMEOUT")));
        config.max_retries = u32::try_from(
            Self::AUTH_MAX_RETRIES.resolve("AUTH_MAX_RETRIES", get("AUTH_MAX_RETRIES")),
        )
        .unwrap_or(RetryPolicy::DEFAULT_MAX_ATTEMPTS);
        config.retry_base_delay = Duration::from_millis(
            Self::AUTH_RETRY_DELAY_MS.resolve("AUTH_RETRY_DELAY", get("AUTH_RETRY_DELAY")),
        );

        Ok(config)
    }

    /// Sets the listen port.
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.web_port = port;
        self
    }

    /// Sets the plug group used for devices without an explicit route.
    #[must_use]
    pub fn with_default_plug_group(mut self, group: impl Into<String>) -> Self {
        self.default_plug_group = group.into();
        self
    }

    /// Routes `device` to plug group `group`.
    #[must_use]
    pub fn with_route(mut self, device: impl Into<String>, group: impl Into<String>) -> Self {
        self.routes.insert(device.into(), group.into());
        self
    }

    /// Sets the minimum dimmer level, clamped to 100.
    #[must_use]
    pub fn with_min_dimming(mut self, min: u8) -> Self {
        self.min_dimming = min.min(100);
        self
    }

    /// Sets the session lifetime. Zero never expires.
    #[must_use]
    pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.session_ttl = ttl;
        self
    }

    /// Sets the login timeout.
    #[must_use]
    pub fn with_auth_timeout(mut self, timeout: Duration) -> Self {
        self.auth_timeout = timeout;
        self
    }

    /// Sets the login attempt count and backoff base.
    #[must_use]
    pub fn with_retries(mut self, max_attempts: u32, base_delay: Duration) -> Self {
        self.max_retries = max_attempts;
        self.retry_base_delay = base_delay;
        self
    }

    /// Sets the plug service request timeout.
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Sets the state directory.
    #[must_use]
    pub fn with_state_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.state_dir = dir.into();
        self
    }

    /// Points the bridge at other account and plug service hosts.
    #[must_use]
    pub fn with_cloud_urls(mut self, account_url: impl Into<String>, plug_url: impl Into<String>) -> Self {
        self.account_url = account_url.into();
        self.plug_url = plug_url.into();
        self
    }

    /// Returns the listen port.
    #[must_use]
    pub fn web_port(&self) -> u16 {
        self.web_port
    }

    /// Returns the vendor account name.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Returns the plaintext vendor password.
    #[must_use]
    pub fn password(&self) -> &str {
        &self.password
    }

    /// Returns the minimum dimmer level.
    #[must_use]
    pub fn min_dimming(&self) -> u8 {
        self.min_dimming
    }

    /// Returns the session lifetime.
    #[must_use]
    pub fn session_ttl(&self) -> Duration {
        self.session_ttl
    }

    /// Returns the state directory.
    #[must_use]
    pub fn state_dir(&self) -> &PathBuf {
        &self.state_dir
    }

    /// Returns the login retry policy.
    #[must_use]
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_retries, self.retry_base_delay)
    }

    /// Returns the vendor cloud connection settings.
    #[must_use]
    pub fn cloud(&self) -> CloudConfig {
        CloudConfig::new()
            .with_account_url(self.account_url.clone())
            .with_plug_url(self.plug_url.clone())
            .with_auth_timeout(self.auth_timeout)
            .with_request_timeout(self.request_timeout)
    }

    /// Builds the device router.
    #[must_use]
    pub fn router(&self) -> PlugRouter {
        PlugRouter::new(self.default_plug_group.as_str())
            .with_routes(self.routes.iter().map(|(d, g)| (d.as_str(), g.as_str())))
    }
}

impl std::fmt::Debug for BridgeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BridgeConfig")
            .field("web_port", &self.web_port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("default_plug_group", &self.default_plug_group)
            .field("routes", &self.routes.len())
            .field("min_dimming", &self.min_dimming)
            .field("session_ttl", &self.session_ttl)
            .field("auth_timeout", &self.auth_timeout)
            .field("max_retries", &self.max_retries)
            .field("retry_base_delay", &self.retry_base_delay)
            .field("request_timeout", &self.request_timeout)
            .field("state_dir", &self.state_dir)
            .field("account_url", &self.account_url)
            .field("plug_url", &self.plug_url)
            .finish()
    }
}

/// An integer setting with a default and an accepted range.
#[derive(Debug, Clone, Copy)]
struct Bounded {
    default: u64,
    min: u64,
    max: u64,
}

impl Bounded {
    const fn new(default: u64, min: u64, max: u64) -> Self {
        Self { default, min, max }
    }

    fn resolve(self, key: &str, raw: Option<String>) -> u64 {
        let Some(raw) = raw else {
            return self.default;
        };
        match raw.trim().parse::<u64>() {
            Ok(v) if (self.min..=self.max).contains(&v) => v,
            _ => {
                tracing::warn!(
                    key,
                    value = %raw,
                    min = self.min,
                    max = self.max,
                    default = self.default,
                    "Setting out of range, using default"
                );
                self.default
            }
        }
    }
}

fn parse<T: FromStr>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        key: key.to_string(),
        message: e.to_string(),
    })
}
