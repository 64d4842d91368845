// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Identifier types for devices and plug groups.

use std::fmt;

/// Identifier of a controllable device (switch, dimmer or curtain).
///
/// The vendor hands out UUIDs, but the bridge treats the identifier as an
/// opaque string and never parses it.
///
/// # Examples
///
/// ```
/// use hwl_bridge::types::DeviceId;
///
/// let id = DeviceId::new("ad621820-e2fb-40d2-9338-3f457e940cd2");
/// assert_eq!(id.as_str(), "ad621820-e2fb-40d2-9338-3f457e940cd2");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeviceId(String);

impl DeviceId {
    /// Creates a device identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DeviceId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for DeviceId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Identifier of a plug group, the vendor's "smartplug" container.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct PlugGroupId(String);

impl PlugGroupId {
    /// Creates a plug group identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlugGroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlugGroupId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for PlugGroupId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_raw_id() {
        let id = DeviceId::new("a67d781f-7ebf-47a8-9b9c-011f7f606142");
        assert_eq!(id.to_string(), "a67d781f-7ebf-47a8-9b9c-011f7f606142");
    }

    #[test]
    fn hashable() {
        use std::collections::HashSet;

        let mut set = HashSet::new();
        set.insert(DeviceId::from("kitchen"));
        assert!(set.contains(&DeviceId::from("kitchen".to_string())));
    }

    #[test]
    fn default_plug_group_is_empty() {
        assert_eq!(PlugGroupId::default().as_str(), "");
    }
}
