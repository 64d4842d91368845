// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! HTTP client for the vendor account and plug services.

use std::time::Duration;

use reqwest::Client;

use crate::error::{AuthFailure, UpstreamError};
use crate::types::{DeviceId, PlugGroupId, UpstreamAction};

use super::{ACTION_SUCCESS, ActionReply, LoginReply, SESSION_HEADER, SmartPlug};

// ============================================================================
// CloudConfig
// ============================================================================

/// Connection settings for the vendor cloud.
///
/// # Examples
///
/// ```
/// use hwl_bridge::cloud::CloudConfig;
/// use std::time::Duration;
///
/// let config = CloudConfig::new()
///     .with_auth_timeout(Duration::from_secs(5))
///     .with_plug_url("http://127.0.0.1:9000");
///
/// assert_eq!(config.plug_url(), "http://127.0.0.1:9000");
/// assert_eq!(config.account_url(), CloudConfig::DEFAULT_ACCOUNT_URL);
/// ```
#[derive(Debug, Clone)]
pub struct CloudConfig {
    account_url: String,
    plug_url: String,
    auth_timeout: Duration,
    request_timeout: Duration,
}

impl CloudConfig {
    /// Base URL of the vendor account service.
    pub const DEFAULT_ACCOUNT_URL: &'static str = "https://cloud.homewizard.com";
    /// Base URL of the vendor plug service.
    pub const DEFAULT_PLUG_URL: &'static str = "https://plug.homewizard.com";
    /// Default timeout for a login request.
    pub const DEFAULT_AUTH_TIMEOUT: Duration = Duration::from_secs(15);
    /// Default timeout for plug service requests.
    pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

    /// Creates a configuration pointing at the vendor's hosts.
    #[must_use]
    pub fn new() -> Self {
        Self {
            account_url: Self::DEFAULT_ACCOUNT_URL.to_string(),
            plug_url: Self::DEFAULT_PLUG_URL.to_string(),
            auth_timeout: Self::DEFAULT_AUTH_TIMEOUT,
            request_timeout: Self::DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Sets the account service base URL.
    #[must_use]
    pub fn with_account_url(mut self, url: impl Into<String>) -> Self {
        self.account_url = trim_base(url.into());
        self
    }

    /// Sets the plug service base URL.
    #[must_use]
    pub fn with_plug_url(mut self, url: impl Into<String>) -> Self {
        self.plug_url = trim_base(url.into());
        self
    }

    /// Sets the login request timeout.
    #[must_use]
    pub fn with_auth_timeout(mut self, timeout: Duration) -> Self {
        self.auth_timeout = timeout;
        self
    }

    /// Sets the plug service request timeout.
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Returns the account service base URL.
    #[must_use]
    pub fn account_url(&self) -> &str {
        &self.account_url
    }

    /// Returns the plug service base URL.
    #[must_use]
    pub fn plug_url(&self) -> &str {
        &self.plug_url
    }

    /// Returns the login request timeout.
    #[must_use]
    pub fn auth_timeout(&self) -> Duration {
        self.auth_timeout
    }

    /// Returns the plug service request timeout.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// Creates a `CloudClient` from this configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be created.
    pub fn into_client(self) -> Result<CloudClient, reqwest::Error> {
        let client = Client::builder().timeout(self.request_timeout).build()?;
        Ok(CloudClient {
            client,
            config: self,
        })
    }
}

impl Default for CloudConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn trim_base(url: String) -> String {
    url.trim_end_matches('/').to_string()
}

// ============================================================================
// CloudClient
// ============================================================================

/// HTTP client for the vendor cloud.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct CloudClient {
    client: Client,
    config: CloudConfig,
}

impl CloudClient {
    /// Returns the configuration this client was built from.
    #[must_use]
    pub fn config(&self) -> &CloudConfig {
        &self.config
    }

    /// Performs a single login exchange and returns the session token.
    ///
    /// No retries happen here; see
    /// [`CredentialAcquirer`](crate::session::CredentialAcquirer).
    ///
    /// # Errors
    ///
    /// Returns the classified failure when the request fails, times out,
    /// returns a non-success status or carries no session token.
    pub async fn login(&self, username: &str, password_hash: &str) -> Result<String, AuthFailure> {
        let url = format!("{}/account/login", self.config.account_url);

        tracing::debug!(url = %url, username, "Sending login request");

        let response = self
            .client
            .get(&url)
            .basic_auth(username, Some(password_hash))
            .timeout(self.config.auth_timeout)
            .send()
            .await
            .map_err(|e| classify(&e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::debug!(status = status.as_u16(), body = %body, "Login rejected");
            return Err(AuthFailure::HttpStatus(status.as_u16()));
        }

        let reply: LoginReply = response
            .json()
            .await
            .map_err(|_| AuthFailure::MalformedResponse)?;

        match reply.session {
            Some(token) if !token.is_empty() => Ok(token),
            _ => Err(AuthFailure::MalformedResponse),
        }
    }

    /// Lists the plug groups visible to the session.
    ///
    /// # Errors
    ///
    /// Returns `UpstreamError` if the request fails, the vendor returns a
    /// non-success status or the body is not a list of plug groups.
    pub async fn list_plugs(&self, token: &str) -> Result<Vec<SmartPlug>, UpstreamError> {
        let url = format!("{}/plugs", self.config.plug_url);

        tracing::debug!(url = %url, "Listing plug groups");

        let response = self
            .client
            .get(&url)
            .header(SESSION_HEADER, token)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(UpstreamError::Status(response.status().as_u16()));
        }

        Ok(response.json().await?)
    }

    /// Posts `action` to `device` in plug group `plug`.
    ///
    /// # Errors
    ///
    /// Returns `UpstreamError` if the request fails, the vendor returns a
    /// non-success status, or the reply status is not `Success`.
    pub async fn send_action(
        &self,
        token: &str,
        plug: &PlugGroupId,
        device: &DeviceId,
        action: UpstreamAction,
    ) -> Result<(), UpstreamError> {
        let url = self.action_url(plug, device);

        tracing::debug!(url = %url, action = %action, "Sending device action");

        let response = self
            .client
            .post(&url)
            .header(SESSION_HEADER, token)
            .json(&action)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(UpstreamError::Status(response.status().as_u16()));
        }

        let reply: ActionReply = response.json().await?;

        tracing::debug!(status = ?reply.status, "Received action reply");

        match reply.status {
            Some(status) if status == ACTION_SUCCESS => Ok(()),
            Some(status) => Err(UpstreamError::Rejected(status)),
            None => Err(UpstreamError::Rejected("missing status".to_string())),
        }
    }

    fn action_url(&self, plug: &PlugGroupId, device: &DeviceId) -> String {
        format!(
            "{}/plugs/{}/devices/{}/action",
            self.config.plug_url,
            urlencoding::encode(plug.as_str()),
            urlencoding::encode(device.as_str())
        )
    }
}

fn classify(error: &reqwest::Error) -> AuthFailure {
    if error.is_timeout() {
        AuthFailure::Timeout
    } else if error.is_connect() {
        AuthFailure::Connect(error.to_string())
    } else if let Some(status) = error.status() {
        AuthFailure::HttpStatus(status.as_u16())
    } else {
        AuthFailure::Other(error.to_string())
    }
}
