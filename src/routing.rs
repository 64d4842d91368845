// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device to plug group routing.

use std::collections::HashMap;

use crate::types::{DeviceId, PlugGroupId};

/// Static table mapping devices to the plug group that owns them.
///
/// The vendor addresses a device through its plug group, so every action
/// needs both ids. Devices missing from the table belong to the default
/// group. The table is fixed once built.
///
/// # Examples
///
/// ```
/// use hwl_bridge::routing::PlugRouter;
///
/// let router = PlugRouter::new("default-plug")
///     .with_route("desk-pc", "office-plug");
///
/// assert_eq!(router.resolve(&"desk-pc".into()).as_str(), "office-plug");
/// assert_eq!(router.resolve(&"kettle".into()).as_str(), "default-plug");
/// ```
#[derive(Debug, Clone, Default)]
pub struct PlugRouter {
    routes: HashMap<DeviceId, PlugGroupId>,
    default_group: PlugGroupId,
}

impl PlugRouter {
    /// Creates a router with no explicit routes.
    #[must_use]
    pub fn new(default_group: impl Into<PlugGroupId>) -> Self {
        Self {
            routes: HashMap::new(),
            default_group: default_group.into(),
        }
    }

    /// Adds an explicit route.
    #[must_use]
    pub fn with_route(mut self, device: impl Into<DeviceId>, group: impl Into<PlugGroupId>) -> Self {
        self.routes.insert(device.into(), group.into());
        self
    }

    /// Adds every route yielded by `routes`.
    #[must_use]
    pub fn with_routes<D, G>(mut self, routes: impl IntoIterator<Item = (D, G)>) -> Self
    where
        D: Into<DeviceId>,
        G: Into<PlugGroupId>,
    {
        self.routes
            .extend(routes.into_iter().map(|(d, g)| (d.into(), g.into())));
        self
    }

    /// Returns the plug group owning `device`.
    #[must_use]
    pub fn resolve(&self, device: &DeviceId) -> &PlugGroupId {
        self.routes.get(device).unwrap_or(&self.default_group)
    }

    /// Returns the group used for unrouted devices.
    #[must_use]
    pub fn default_group(&self) -> &PlugGroupId {
        &self.default_group
    }

    /// Returns the number of explicit routes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Returns `true` if there are no explicit routes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
