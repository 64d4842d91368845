// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Client for the vendor cloud.
//!
//! Two services are involved:
//!
//! - the account service, which exchanges basic-auth credentials for a
//!   session token (`GET /account/login`)
//! - the plug service, which lists plug groups (`GET /plugs`) and executes
//!   device actions (`POST /plugs/{plug}/devices/{device}/action`)
//!
//! Every plug service call carries the session token in the
//! [`SESSION_HEADER`] header.

mod client;

pub use client::{CloudClient, CloudConfig};

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Header carrying the session token on plug service calls.
pub const SESSION_HEADER: &str = "x-session-token";

/// Status string the plug service returns for a completed action.
pub const ACTION_SUCCESS: &str = "Success";

/// A plug group as listed by the plug service.
///
/// Every field is optional; the vendor omits fields freely and the bridge
/// only passes them through.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SmartPlug {
    /// Plug group id.
    #[serde(default)]
    pub id: Option<String>,
    /// Hardware identifier.
    #[serde(default)]
    pub identifier: Option<String>,
    /// User-assigned name.
    #[serde(default)]
    pub name: Option<String>,
    /// Configured latitude.
    #[serde(default)]
    pub latitude: Option<Value>,
    /// Configured longitude.
    #[serde(default)]
    pub longitude: Option<Value>,
    /// Whether the plug group is reachable by the cloud.
    #[serde(default)]
    pub online: Option<bool>,
    /// Devices owned by the plug group, as returned by the vendor.
    #[serde(default)]
    pub devices: Option<Value>,
    /// Configured time zone.
    #[serde(default)]
    pub time_zone: Option<String>,
    /// Whether new firmware is available.
    #[serde(default)]
    pub firmware_update_available: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct LoginReply {
    #[serde(default)]
    session: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ActionReply {
    #[serde(default)]
    status: Option<String>,
}
