// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Vendor action vocabulary.

use std::fmt;

use serde::Serialize;

use super::DimLevel;

/// An action in the vendor's vocabulary, as posted to a device.
///
/// Serializes to the body the plug API expects: `{"action": "On"}` for plain
/// actions and `{"action": "Range", "value": 40}` for dimming. Only `Range`
/// carries a value.
///
/// # Examples
///
/// ```
/// use hwl_bridge::types::{DimLevel, UpstreamAction};
///
/// let body = serde_json::to_value(UpstreamAction::Range(DimLevel::new(40).unwrap())).unwrap();
/// assert_eq!(body, serde_json::json!({"action": "Range", "value": 40}));
///
/// let body = serde_json::to_value(UpstreamAction::Off).unwrap();
/// assert_eq!(body, serde_json::json!({"action": "Off"}));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "action", content = "value")]
pub enum UpstreamAction {
    /// Switch the device on.
    On,
    /// Switch the device off.
    Off,
    /// Dim to the given level.
    Range(DimLevel),
    /// Raise a curtain.
    Up,
    /// Lower a curtain.
    Down,
    /// Stop a moving curtain.
    Stop,
}

impl UpstreamAction {
    /// Returns the vendor name of the action.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::On => "On",
            Self::Off => "Off",
            Self::Range(_) => "Range",
            Self::Up => "Up",
            Self::Down => "Down",
            Self::Stop => "Stop",
        }
    }

    /// Returns the dimming level for `Range` actions.
    #[must_use]
    pub const fn value(&self) -> Option<DimLevel> {
        match self {
            Self::Range(level) => Some(*level),
            _ => None,
        }
    }
}

impl fmt::Display for UpstreamAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Range(level) => write!(f, "Range {}", level.value()),
            other => f.write_str(other.as_str()),
        }
    }
}
