// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Dimming level carried by a `Range` action.

use std::fmt;

use serde::Serialize;

use crate::error::ValidationError;

/// Brightness level as a percentage (0-100).
///
/// The vendor plug API accepts dimmer levels up to 100. The lower bound a
/// dimmer actually honours is a per-installation setting, so it is enforced
/// by the command translator rather than by this type.
///
/// # Examples
///
/// ```
/// use hwl_bridge::types::DimLevel;
///
/// let level = DimLevel::new(75).unwrap();
/// assert_eq!(level.value(), 75);
///
/// assert!(DimLevel::new(101).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct DimLevel(u8);

impl DimLevel {
    /// Highest level the vendor accepts.
    pub const MAX: Self = Self(100);

    /// Creates a new dimming level.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::DimmerAboveMaximum` if value exceeds 100.
    pub fn new(value: u8) -> Result<Self, ValidationError> {
        if value > Self::MAX.0 {
            return Err(ValidationError::DimmerAboveMaximum(i64::from(value)));
        }
        Ok(Self(value))
    }

    /// Returns the brightness percentage value.
    #[must_use]
    pub const fn value(&self) -> u8 {
        self.0
    }
}

impl fmt::Display for DimLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

impl TryFrom<i64> for DimLevel {
    type Error = ValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        let level = u8::try_from(value).map_err(|_| ValidationError::DimmerAboveMaximum(value))?;
        Self::new(level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_levels() {
        for v in 0..=100 {
            assert_eq!(DimLevel::new(v).unwrap().value(), v);
        }
    }

    #[test]
    fn above_maximum_rejected() {
        assert_eq!(
            DimLevel::new(101),
            Err(ValidationError::DimmerAboveMaximum(101))
        );
        assert_eq!(
            DimLevel::try_from(1000_i64),
            Err(ValidationError::DimmerAboveMaximum(1000))
        );
    }

    #[test]
    fn serializes_as_bare_number() {
        let json = serde_json::to_string(&DimLevel::new(42).unwrap()).unwrap();
        assert_eq!(json, "42");
    }

    #[test]
    fn display() {
        assert_eq!(DimLevel::new(75).unwrap().to_string(), "75%");
    }
}
