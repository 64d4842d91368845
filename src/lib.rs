// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `hwl_bridge` - A local REST bridge for HomeWizard Lite smart plugs.
//!
//! HomeWizard Lite plugs are only reachable through the vendor cloud. This
//! crate exposes them to home automation systems through a small local API:
//! a generic device command comes in, gets translated into the vendor's
//! action vocabulary and is sent to the cloud under a cached session. The
//! resulting on/off state is remembered on disk.
//!
//! # Supported Devices
//!
//! - **Switches**: `On` / `Off`
//! - **Dimmers**: level 0-100, with levels below a configurable minimum
//!   switching the device off
//! - **Curtains** (`brel_ud_curtain`): `Up` / `Down` / `Stop`
//!
//! # Quick Start
//!
//! ```no_run
//! use hwl_bridge::command::{DeviceCommand, DeviceKind};
//! use hwl_bridge::config::BridgeConfig;
//! use hwl_bridge::dispatch::Dispatcher;
//!
//! #[tokio::main]
//! async fn main() -> hwl_bridge::Result<()> {
//!     let config = BridgeConfig::new("me@example.com", "secret")
//!         .with_default_plug_group("b33f109e-41ae-429a-9102-a715a3e8c6bc");
//!     let dispatcher = Dispatcher::builder(config).build().await?;
//!
//!     let on = DeviceCommand::new("desk-lamp", DeviceKind::Switch, "On");
//!     assert!(dispatcher.dispatch(&on).await?);
//!
//!     let dim = DeviceCommand::new("ceiling", DeviceKind::Dimmer, 35);
//!     dispatcher.dispatch(&dim).await?;
//!     Ok(())
//! }
//! ```
//!
//! # Serving the REST API
//!
//! With the `server` feature (on by default), [`server::router`] builds the
//! axum router and the `hwl-bridge` binary serves it on `0.0.0.0:$PORT`.

pub mod cloud;
pub mod command;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod routing;
#[cfg(feature = "server")]
pub mod server;
pub mod session;
pub mod state;
pub mod types;

pub use command::{DeviceCommand, DeviceKind, RawValue};
pub use config::BridgeConfig;
pub use dispatch::{Dispatcher, DispatcherBuilder, Stage};
pub use error::{AuthError, ConfigError, Error, Result, StoreError, UpstreamError, ValidationError};
pub use routing::PlugRouter;
pub use types::{DeviceId, DimLevel, PlugGroupId, UpstreamAction};
