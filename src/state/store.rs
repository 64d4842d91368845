// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! File-backed state store.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::error::StoreError;
use crate::types::DeviceId;

const RECORD_EXTENSION: &str = "state";

/// Durable per-device on/off records.
///
/// Each device gets one file in the store directory holding `true` or
/// `false`. A write lands in a fresh temporary file that is synced and then
/// renamed over the record, so a completed [`set_state`](Self::set_state) is
/// on disk and readers never see a partial record. Concurrent writes to the
/// same device resolve last-writer-wins.
#[derive(Debug, Clone)]
pub struct StateStore {
    dir: PathBuf,
}

impl StateStore {
    /// Opens a store rooted at `dir`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Io` if the directory cannot be created.
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).await.map_err(|source| StoreError::Io {
            path: dir.clone(),
            source,
        })?;
        Ok(Self { dir })
    }

    /// Returns the store directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Records whether `device` is active.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Io` if the record cannot be written and synced.
    pub async fn set_state(&self, device: &DeviceId, is_active: bool) -> Result<(), StoreError> {
        let target = self.record_path(device);
        let tmp = self.dir.join(format!(".{}.tmp", Uuid::new_v4()));

        let result = write_synced(&tmp, if is_active { "true" } else { "false" }).await;
        if let Err(source) = result {
            let _ = fs::remove_file(&tmp).await;
            return Err(StoreError::Io { path: tmp, source });
        }

        if let Err(source) = fs::rename(&tmp, &target).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(StoreError::Io {
                path: target,
                source,
            });
        }

        sync_dir(&self.dir).await.map_err(|source| StoreError::Io {
            path: self.dir.clone(),
            source,
        })?;

        tracing::debug!(device_id = %device, is_active, "Recorded device state");
        Ok(())
    }

    /// Returns the recorded state of `device`.
    ///
    /// Devices without a record read as inactive. Unreadable records are
    /// logged and also read as inactive.
    pub async fn get_state(&self, device: &DeviceId) -> bool {
        let path = self.record_path(device);
        match fs::read_to_string(&path).await {
            Ok(contents) => contents.trim() == "true",
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(device_id = %device, "No recorded state");
                false
            }
            Err(e) => {
                tracing::warn!(device_id = %device, path = %path.display(), error = %e, "Failed to read device state");
                false
            }
        }
    }

    fn record_path(&self, device: &DeviceId) -> PathBuf {
        let name = urlencoding::encode(device.as_str());
        self.dir.join(format!("{name}.{RECORD_EXTENSION}"))
    }
}

async fn write_synced(path: &Path, contents: &str) -> std::io::Result<()> {
    let mut file = fs::File::create(path).await?;
    file.write_all(contents.as_bytes()).await?;
    file.sync_all().await
}

#[cfg(unix)]
async fn sync_dir(dir: &Path) -> std::io::Result<()> {
    fs::File::open(dir).await?.sync_all().await
}

#[cfg(not(unix))]
#[allow(clippy::unused_async)]
async fn sync_dir(_dir: &Path) -> std::io::Result<()> {
    Ok(())
}
