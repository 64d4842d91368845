// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Generic device commands and their translation to vendor actions.
//!
//! Inbound requests carry a loosely typed `type` string and a `value` that
//! is either a number or a string. This module turns them into a
//! [`DeviceCommand`] with a closed [`DeviceKind`], and [`translate`] maps
//! that command onto an [`UpstreamAction`](crate::types::UpstreamAction).
//!
//! | Kind | Accepted value | Action |
//! |------|----------------|--------|
//! | [`DeviceKind::Dimmer`] | integer | `Off` below the minimum, `Range` up to 100 |
//! | [`DeviceKind::Curtain`] | `up`, `down`, `stop` | `Up`, `Down`, `Stop` |
//! | [`DeviceKind::Switch`] | any string | `On` for `on`, otherwise `Off` |
//!
//! # Examples
//!
//! ```
//! use hwl_bridge::command::{translate, DeviceKind, RawValue};
//! use hwl_bridge::types::UpstreamAction;
//!
//! let action = translate(DeviceKind::Switch, &RawValue::from("ON"), 1).unwrap();
//! assert_eq!(action, UpstreamAction::On);
//!
//! let action = translate(DeviceKind::Dimmer, &RawValue::from(0), 1).unwrap();
//! assert_eq!(action, UpstreamAction::Off);
//! ```

mod translate;

use std::fmt;

use serde_json::{Number, Value};

use crate::error::ValidationError;
use crate::types::DeviceId;

pub use translate::translate;

/// Wire name of the dimmer device type.
pub const DIMMER_TYPE: &str = "dimmer";

/// Wire name of the up/down curtain device type.
pub const CURTAIN_TYPE: &str = "brel_ud_curtain";

/// The kinds of device the bridge can drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceKind {
    /// On/off switch. Also the fallback for unknown type names.
    Switch,
    /// Dimmable light.
    Dimmer,
    /// Up/down curtain motor.
    Curtain,
}

impl DeviceKind {
    /// Resolves the `type` field of a request.
    ///
    /// Matching is case-insensitive. Unknown or absent types are switches.
    ///
    /// # Examples
    ///
    /// ```
    /// use hwl_bridge::command::DeviceKind;
    ///
    /// assert_eq!(DeviceKind::from_type(Some("Dimmer")), DeviceKind::Dimmer);
    /// assert_eq!(DeviceKind::from_type(Some("brel_ud_curtain")), DeviceKind::Curtain);
    /// assert_eq!(DeviceKind::from_type(Some("lamp")), DeviceKind::Switch);
    /// assert_eq!(DeviceKind::from_type(None), DeviceKind::Switch);
    /// ```
    #[must_use]
    pub fn from_type(type_name: Option<&str>) -> Self {
        match type_name {
            Some(t) if t.eq_ignore_ascii_case(DIMMER_TYPE) => Self::Dimmer,
            Some(t) if t.eq_ignore_ascii_case(CURTAIN_TYPE) => Self::Curtain,
            _ => Self::Switch,
        }
    }

    /// The error reported when a value of the wrong shape is given.
    #[must_use]
    pub const fn value_error(&self) -> ValidationError {
        match self {
            Self::Switch => ValidationError::SwitchValue,
            Self::Dimmer => ValidationError::DimmerValue,
            Self::Curtain => ValidationError::CurtainValue,
        }
    }
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Switch => "switch",
            Self::Dimmer => DIMMER_TYPE,
            Self::Curtain => CURTAIN_TYPE,
        };
        f.write_str(name)
    }
}

/// The raw value of a command, before it is interpreted by kind.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    /// A JSON number.
    Number(Number),
    /// A JSON string.
    Text(String),
}

impl RawValue {
    /// Converts a JSON value, keeping only numbers and strings.
    #[must_use]
    pub fn from_json(value: Value) -> Option<Self> {
        match value {
            Value::Number(n) => Some(Self::Number(n)),
            Value::String(s) => Some(Self::Text(s)),
            _ => None,
        }
    }

    /// Returns the value as an integer, if it is a whole number.
    ///
    /// Integers beyond `i64` saturate so they still fail range checks.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn as_integer(&self) -> Option<i64> {
        let Self::Number(n) = self else {
            return None;
        };
        if let Some(i) = n.as_i64() {
            return Some(i);
        }
        if let Some(u) = n.as_u64() {
            return Some(i64::try_from(u).unwrap_or(i64::MAX));
        }
        n.as_f64()
            .filter(|f| f.fract() == 0.0 && f.abs() < 1e15)
            .map(|f| f as i64)
    }

    /// Returns the value as a float, if it is a number.
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => n.as_f64(),
            Self::Text(_) => None,
        }
    }

    /// Returns the value as a string slice, if it is text.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Number(_) => None,
        }
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for RawValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for RawValue {
    fn from(value: i64) -> Self {
        Self::Number(value.into())
    }
}

/// A command addressed to one device.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceCommand {
    /// The target device.
    pub device_id: DeviceId,
    /// How the value is interpreted.
    pub kind: DeviceKind,
    /// The requested value.
    pub value: RawValue,
}

impl DeviceCommand {
    /// Creates a command.
    #[must_use]
    pub fn new(device_id: impl Into<DeviceId>, kind: DeviceKind, value: impl Into<RawValue>) -> Self {
        Self {
            device_id: device_id.into(),
            kind,
            value: value.into(),
        }
    }

    /// Builds a command from the loosely typed request fields.
    ///
    /// # Errors
    ///
    /// Returns the kind's value error when the value is absent or is neither
    /// a number nor a string.
    pub fn from_request(
        device_id: impl Into<DeviceId>,
        type_name: Option<&str>,
        value: Option<Value>,
    ) -> Result<Self, ValidationError> {
        let kind = DeviceKind::from_type(type_name);
        let value = value
            .and_then(RawValue::from_json)
            .ok_or_else(|| kind.value_error())?;
        Ok(Self {
            device_id: device_id.into(),
            kind,
            value,
        })
    }

    /// The on/off state this command leaves the device in.
    ///
    /// Dimmers are active at or above `min_dimming`, switches when the value
    /// is `on`. Curtains have no on/off state and yield `None`.
    #[must_use]
    pub fn active_state(&self, min_dimming: u8) -> Option<bool> {
        match self.kind {
            DeviceKind::Dimmer => self
                .value
                .as_number()
                .map(|level| level >= f64::from(min_dimming)),
            DeviceKind::Switch => self
                .value
                .as_text()
                .map(|text| text.eq_ignore_ascii_case("on")),
            DeviceKind::Curtain => None,
        }
    }
}
