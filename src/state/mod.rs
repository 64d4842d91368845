// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Last-known device state.
//!
//! The vendor API offers no cheap way to ask whether a device is on, so the
//! bridge remembers the state it last set. [`StateStore`] keeps one record
//! per device on disk so the answer survives restarts.
//!
//! # Examples
//!
//! ```no_run
//! use hwl_bridge::state::StateStore;
//! use hwl_bridge::types::DeviceId;
//!
//! # async fn example() -> hwl_bridge::Result<()> {
//! let store = StateStore::open("./states").await?;
//! let lamp = DeviceId::new("lamp");
//!
//! store.set_state(&lamp, true).await?;
//! assert!(store.get_state(&lamp).await);
//! # Ok(())
//! # }
//! ```

mod store;

pub use store::StateStore;
