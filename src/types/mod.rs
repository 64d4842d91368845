// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value types shared across the bridge.
//!
//! # Types
//!
//! - [`DeviceId`] - Opaque identifier of a controllable device
//! - [`PlugGroupId`] - Identifier of the vendor plug group owning devices
//! - [`DimLevel`] - Brightness level (0-100%)
//! - [`UpstreamAction`] - An action in the vendor vocabulary

mod action;
mod dim_level;
mod ids;

pub use action::UpstreamAction;
pub use dim_level::DimLevel;
pub use ids::{DeviceId, PlugGroupId};
