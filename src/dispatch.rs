// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Command dispatch.
//!
//! [`Dispatcher`] runs a [`DeviceCommand`] through the whole pipeline:
//! obtain a session, translate the value, resolve the plug group, send the
//! action and record the resulting state.
//!
//! # Examples
//!
//! ```no_run
//! use hwl_bridge::command::{DeviceCommand, DeviceKind};
//! use hwl_bridge::config::BridgeConfig;
//! use hwl_bridge::dispatch::Dispatcher;
//!
//! # async fn example() -> hwl_bridge::Result<()> {
//! let config = BridgeConfig::from_env()?;
//! let dispatcher = Dispatcher::builder(config).build().await?;
//!
//! let command = DeviceCommand::new("lamp", DeviceKind::Dimmer, 40);
//! let is_active = dispatcher.dispatch(&command).await?;
//! println!("lamp active: {is_active}");
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::cloud::{CloudClient, SmartPlug};
use crate::command::{DeviceCommand, translate};
use crate::config::BridgeConfig;
use crate::error::{AuthError, Error, Result, ValidationError};
use crate::routing::PlugRouter;
use crate::session::{Clock, CredentialAcquirer, SessionProvider, SessionStore, SystemClock};
use crate::state::StateStore;
use crate::types::DeviceId;

/// Pipeline stage of a dispatch, reported when a dispatch fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Obtaining a vendor session.
    Authenticating,
    /// Converting the value into a vendor action.
    Translating,
    /// Resolving the plug group.
    Routing,
    /// Sending the action.
    Invoking,
    /// Writing the resulting state.
    Recording,
    /// Finished.
    Done,
}

impl Stage {
    /// Returns the stage name used in logs.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Authenticating => "authenticating",
            Self::Translating => "translating",
            Self::Routing => "routing",
            Self::Invoking => "invoking",
            Self::Recording => "recording",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Builder for [`Dispatcher`].
#[derive(Debug)]
pub struct DispatcherBuilder {
    config: BridgeConfig,
    clock: Arc<dyn Clock>,
}

impl DispatcherBuilder {
    /// Uses `clock` for session expiry instead of the system clock.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Builds the dispatcher, opening the state directory.
    ///
    /// # Errors
    ///
    /// Returns `Error::Auth` if the HTTP client cannot be created, or
    /// `Error::Store` if the state directory cannot be created.
    pub async fn build(self) -> Result<Dispatcher> {
        let cloud = self
            .config
            .cloud()
            .into_client()
            .map_err(AuthError::Client)?;

        let store = Arc::new(SessionStore::new(self.config.session_ttl(), self.clock));
        let acquirer = CredentialAcquirer::new(cloud.clone(), store, self.config.retry_policy());
        let sessions =
            SessionProvider::new(acquirer, self.config.username(), self.config.password());

        let states = StateStore::open(self.config.state_dir().clone()).await?;

        tracing::info!(
            routes = self.config.router().len(),
            state_dir = %self.config.state_dir().display(),
            "Dispatcher ready"
        );

        Ok(Dispatcher {
            sessions,
            cloud,
            router: self.config.router(),
            states,
            min_dimming: self.config.min_dimming(),
        })
    }
}

/// Runs device commands against the vendor cloud.
///
/// Shared by all request handlers; every method takes `&self`.
#[derive(Debug)]
pub struct Dispatcher {
    sessions: SessionProvider,
    cloud: CloudClient,
    router: PlugRouter,
    states: StateStore,
    min_dimming: u8,
}

impl Dispatcher {
    /// Starts building a dispatcher from `config`.
    #[must_use]
    pub fn builder(config: BridgeConfig) -> DispatcherBuilder {
        DispatcherBuilder {
            config,
            clock: Arc::new(SystemClock),
        }
    }

    /// Returns the session provider.
    #[must_use]
    pub fn sessions(&self) -> &SessionProvider {
        &self.sessions
    }

    /// Returns the state store.
    #[must_use]
    pub fn states(&self) -> &StateStore {
        &self.states
    }

    /// Executes `command` and returns whether the device is now active.
    ///
    /// Curtains have no on/off state: the action is sent but nothing is
    /// recorded, and the stored state is returned unchanged.
    ///
    /// # Errors
    ///
    /// - `Error::Auth` if no session could be obtained
    /// - `Error::Validation` if the value does not fit the device kind
    /// - `Error::Upstream` if the vendor call fails or is rejected
    /// - `Error::Store` if the new state cannot be written
    ///
    /// Nothing is sent upstream when authentication or validation fails.
    pub async fn dispatch(&self, command: &DeviceCommand) -> Result<bool> {
        self.run_logged(&command.device_id, Ok(command)).await
    }

    /// Builds a command from loosely typed request fields and executes it.
    ///
    /// The fields are only checked once a session has been obtained, so an
    /// authentication outage is reported before a malformed value.
    ///
    /// # Errors
    ///
    /// Same as [`dispatch`](Self::dispatch).
    pub async fn dispatch_request(
        &self,
        device_id: impl Into<DeviceId>,
        type_name: Option<&str>,
        value: Option<Value>,
    ) -> Result<bool> {
        let device_id = device_id.into();
        let command = DeviceCommand::from_request(device_id.clone(), type_name, value);
        self.run_logged(&device_id, command.as_ref().map_err(Clone::clone))
            .await
    }

    async fn run_logged(
        &self,
        device: &DeviceId,
        command: std::result::Result<&DeviceCommand, ValidationError>,
    ) -> Result<bool> {
        let result = self.run(command).await;
        match &result {
            Ok(is_active) => {
                tracing::debug!(device_id = %device, is_active, stage = %Stage::Done, "Dispatch complete");
            }
            Err((stage, error)) => {
                tracing::error!(device_id = %device, stage = %stage, error = %error, "Dispatch failed");
            }
        }
        result.map_err(|(_, error)| error)
    }

    async fn run(
        &self,
        command: std::result::Result<&DeviceCommand, ValidationError>,
    ) -> std::result::Result<bool, (Stage, Error)> {
        let credential = self
            .sessions
            .session()
            .await
            .map_err(|e| (Stage::Authenticating, Error::from(e)))?;

        let command = command.map_err(|e| (Stage::Translating, Error::from(e)))?;
        let device = &command.device_id;

        let action = translate(command.kind, &command.value, self.min_dimming)
            .map_err(|e| (Stage::Translating, Error::from(e)))?;

        let plug = self.router.resolve(device);
        tracing::debug!(device_id = %device, plug_group = %plug, action = %action, stage = %Stage::Routing, "Resolved plug group");

        self.cloud
            .send_action(credential.token(), plug, device, action)
            .await
            .map_err(|e| (Stage::Invoking, Error::from(e)))?;

        match command.active_state(self.min_dimming) {
            Some(is_active) => {
                self.states
                    .set_state(device, is_active)
                    .await
                    .map_err(|e| (Stage::Recording, Error::from(e)))?;
                Ok(is_active)
            }
            None => Ok(self.states.get_state(device).await),
        }
    }

    /// Returns the last recorded state of `device`, `false` if unknown.
    pub async fn plug_state(&self, device: &DeviceId) -> bool {
        self.states.get_state(device).await
    }

    /// Lists every plug group on the account.
    ///
    /// # Errors
    ///
    /// Returns `Error::Auth` if no session could be obtained, or
    /// `Error::Upstream` if the listing fails.
    pub async fn list_plugs(&self) -> Result<Vec<SmartPlug>> {
        let credential = self.sessions.session().await?;
        let plugs = self.cloud.list_plugs(credential.token()).await.inspect_err(|e| {
            tracing::error!(error = %e, "Failed to list plug groups");
        })?;
        tracing::debug!(count = plugs.len(), "Listed plug groups");
        Ok(plugs)
    }

    /// Returns the first plug group on the account, if any.
    ///
    /// # Errors
    ///
    /// Same as [`list_plugs`](Self::list_plugs).
    pub async fn smart_plug(&self) -> Result<Option<SmartPlug>> {
        Ok(self.list_plugs().await?.into_iter().next())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::DeviceKind;

    #[test]
    fn stage_names() {
        assert_eq!(Stage::Authenticating.to_string(), "authenticating");
        assert_eq!(Stage::Recording.to_string(), "recording");
        assert_eq!(Stage::Done.as_str(), "done");
    }

    #[tokio::test]
    async fn build_creates_state_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("nested").join("states");
        let config = BridgeConfig::new("u", "p").with_state_dir(&dir);

        let dispatcher = Dispatcher::builder(config).build().await.unwrap();

        assert!(dir.is_dir());
        assert!(!dispatcher.plug_state(&"lamp".into()).await);
    }

    #[tokio::test]
    async fn validation_failure_skips_upstream() {
        let tmp = tempfile::tempdir().unwrap();
        let config = BridgeConfig::new("u", "p")
            .with_state_dir(tmp.path())
            // unroutable, any request would fail with a connect error
            .with_cloud_urls("http://127.0.0.1:9", "http://127.0.0.1:9");
        let dispatcher = Dispatcher::builder(config).build().await.unwrap();
        dispatcher.sessions().store().set("token");

        let command = DeviceCommand::new("blind", DeviceKind::Curtain, "sideways");
        let err = dispatcher.dispatch(&command).await.unwrap_err();

        assert!(matches!(err, Error::Validation(_)));
    }

    #[tokio::test]
    async fn injected_clock_drives_session_expiry() {
        let tmp = tempfile::tempdir().unwrap();
        let clock = Arc::new(crate::session::ManualClock::new());
        let config = BridgeConfig::new("u", "p")
            .with_state_dir(tmp.path())
            .with_session_ttl(std::time::Duration::from_secs(60));
        let dispatcher = Dispatcher::builder(config)
            .with_clock(clock.clone())
            .build()
            .await
            .unwrap();

        dispatcher.sessions().store().set("token");
        clock.advance(std::time::Duration::from_secs(59));
        assert!(dispatcher.sessions().store().get().is_some());

        clock.advance(std::time::Duration::from_secs(2));
        assert!(dispatcher.sessions().store().get().is_none());
    }
}
