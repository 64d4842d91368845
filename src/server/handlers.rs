// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Request handlers.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::cloud::SmartPlug;
use crate::types::DeviceId;

use super::AppState;
use super::error::{ApiError, malformed_body};

/// Body of `POST /plug/{device_id}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlugCommandRequest {
    /// Device kind, `dimmer`, `brel_ud_curtain` or anything else for a switch.
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    /// Requested value, a number or a string.
    #[serde(default)]
    pub value: Option<Value>,
}

/// Device state reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlugStateResponse {
    /// Whether the device is on.
    pub is_active: bool,
}

/// Plug group entry of `GET /plugs`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlugSummary {
    /// Plug group id, used in action paths.
    pub id: Option<String>,
    /// Hardware identifier of the hub.
    pub identifier: Option<String>,
    /// Name given in the vendor app.
    pub name: Option<String>,
    /// Latitude as reported by the cloud, number or string.
    pub latitude: Option<Value>,
    /// Longitude as reported by the cloud, number or string.
    pub longitude: Option<Value>,
    /// Whether the hub is connected to the cloud.
    pub online: Option<bool>,
    /// Devices paired with the hub, passed through unchanged.
    pub devices: Option<Value>,
}

impl From<SmartPlug> for PlugSummary {
    fn from(plug: SmartPlug) -> Self {
        Self {
            id: plug.id,
            identifier: plug.identifier,
            name: plug.name,
            latitude: plug.latitude,
            longitude: plug.longitude,
            online: plug.online,
            devices: plug.devices,
        }
    }
}

/// Reply of `GET /smartplug`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SmartPlugInfo {
    /// Plug group id.
    pub id: Option<String>,
    /// Name given in the vendor app.
    pub name: Option<String>,
    /// Whether the hub is connected to the cloud.
    pub online: Option<bool>,
    /// Latitude as reported by the cloud.
    pub latitude: Option<Value>,
    /// Longitude as reported by the cloud.
    pub longitude: Option<Value>,
    /// IANA time zone of the hub, e.g. `Europe/Amsterdam`.
    pub time_zone: Option<String>,
    /// Whether the vendor offers a firmware update.
    pub firmware_update_available: Option<bool>,
}

impl From<SmartPlug> for SmartPlugInfo {
    fn from(plug: SmartPlug) -> Self {
        Self {
            id: plug.id,
            name: plug.name,
            online: plug.online,
            latitude: plug.latitude,
            longitude: plug.longitude,
            time_zone: plug.time_zone,
            firmware_update_available: plug.firmware_update_available,
        }
    }
}

#[derive(Debug, Serialize)]
struct MessageResponse {
    message: &'static str,
}

/// `POST /plug/{device_id}`: runs a command and returns the new state.
pub async fn switch_plug(
    State(state): State<AppState>,
    Path(device_id): Path<String>,
    body: Result<Json<PlugCommandRequest>, JsonRejection>,
) -> Result<Json<PlugStateResponse>, ApiError> {
    let Json(request) = body.map_err(|rejection| {
        tracing::warn!(device_id = %device_id, error = %rejection, "Rejected command body");
        malformed_body(rejection.body_text())
    })?;

    let is_active = state
        .dispatcher
        .dispatch_request(DeviceId::new(device_id), request.kind.as_deref(), request.value)
        .await?;
    Ok(Json(PlugStateResponse { is_active }))
}

/// `GET /plug/{device_id}`: returns the last recorded state.
pub async fn plug_state(
    State(state): State<AppState>,
    Path(device_id): Path<String>,
) -> Json<PlugStateResponse> {
    let is_active = state.dispatcher.plug_state(&DeviceId::new(device_id)).await;
    Json(PlugStateResponse { is_active })
}

/// `GET /plugs`: lists every plug group.
pub async fn list_plugs(State(state): State<AppState>) -> Result<Json<Vec<PlugSummary>>, ApiError> {
    let plugs = state.dispatcher.list_plugs().await?;
    Ok(Json(plugs.into_iter().map(PlugSummary::from).collect()))
}

/// `GET /smartplug`: describes the first plug group.
pub async fn smart_plug(State(state): State<AppState>) -> Result<Response, ApiError> {
    let reply = match state.dispatcher.smart_plug().await? {
        Some(plug) => Json(SmartPlugInfo::from(plug)).into_response(),
        None => Json(MessageResponse {
            message: "No smartplugs found",
        })
        .into_response(),
    };
    Ok(reply)
}
