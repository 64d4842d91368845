// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Vendor session management.
//!
//! Every plug service call needs a session token obtained from the account
//! service. The pieces, leaves first:
//!
//! - [`SessionStore`]: holds at most one [`Credential`] and expires it after
//!   a TTL measured on an injected [`Clock`]
//! - [`CredentialAcquirer`]: performs the login exchange with bounded retry
//!   and exponential backoff, then fills the store
//! - [`SessionProvider`]: returns the cached credential or runs one
//!   acquisition, shared by all concurrent callers
//!
//! # Examples
//!
//! ```no_run
//! use std::sync::Arc;
//! use hwl_bridge::cloud::CloudConfig;
//! use hwl_bridge::session::{
//!     CredentialAcquirer, RetryPolicy, SessionProvider, SessionStore, SystemClock,
//! };
//!
//! # async fn example() -> hwl_bridge::Result<()> {
//! let client = CloudConfig::new().into_client().map_err(hwl_bridge::error::AuthError::Client)?;
//! let store = Arc::new(SessionStore::new(
//!     std::time::Duration::from_secs(1800),
//!     Arc::new(SystemClock),
//! ));
//! let acquirer = CredentialAcquirer::new(client, Arc::clone(&store), RetryPolicy::default());
//! let sessions = SessionProvider::new(acquirer, "user@example.com", "secret");
//!
//! let credential = sessions.session().await?;
//! println!("session issued at {}", credential.issued_at());
//! # Ok(())
//! # }
//! ```

mod acquirer;
mod clock;
mod provider;
mod store;

pub use acquirer::{CredentialAcquirer, RetryPolicy};
pub use clock::{Clock, ManualClock, SystemClock};
pub use provider::{Identity, SessionProvider};
pub use store::{Credential, SessionStore};
