// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Command translation rules.

use crate::error::ValidationError;
use crate::types::{DimLevel, UpstreamAction};

use super::{DeviceKind, RawValue};

/// Translates a device command into the vendor's action vocabulary.
///
/// `min_dimming` is the lowest level the installed dimmers honour; requests
/// below it switch the dimmer off.
///
/// # Errors
///
/// Returns `ValidationError` when:
/// - a dimmer value is not a number, or is at or above `min_dimming` but
///   not an integer, or is above 100
/// - a curtain value is not `up`, `down` or `stop`
/// - a switch value is not a string
pub fn translate(
    kind: DeviceKind,
    value: &RawValue,
    min_dimming: u8,
) -> Result<UpstreamAction, ValidationError> {
    match kind {
        DeviceKind::Dimmer => {
            let raw = value.as_number().ok_or(ValidationError::DimmerValue)?;
            if raw < f64::from(min_dimming) {
                return Ok(UpstreamAction::Off);
            }
            let level = value.as_integer().ok_or(ValidationError::DimmerValue)?;
            DimLevel::try_from(level).map(UpstreamAction::Range)
        }
        DeviceKind::Curtain => {
            let text = value.as_text().ok_or(ValidationError::CurtainValue)?;
            match text.to_ascii_lowercase().as_str() {
                "up" => Ok(UpstreamAction::Up),
                "down" => Ok(UpstreamAction::Down),
                "stop" => Ok(UpstreamAction::Stop),
                _ => Err(ValidationError::CurtainValue),
            }
        }
        DeviceKind::Switch => {
            let text = value.as_text().ok_or(ValidationError::SwitchValue)?;
            if text.eq_ignore_ascii_case("on") {
                Ok(UpstreamAction::On)
            } else {
                Ok(UpstreamAction::Off)
            }
        }
    }
}
