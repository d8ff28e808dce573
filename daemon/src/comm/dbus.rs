// This file is part of rcfgd, a service to load full and partial FPGA bitstreams through the Linux reconfiguration interfaces.
//
// Copyright 2025 Canonical Ltd.
//
// SPDX-License-Identifier: GPL-3.0-only
//
// rcfgd is free software: you can redistribute it and/or modify it under the terms of the GNU General Public License version 3, as published by the Free Software Foundation.
//
// rcfgd is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranties of MERCHANTABILITY, SATISFACTORY QUALITY, or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with this program.  If not, see http://www.gnu.org/licenses/.

pub mod control_interface;
pub mod status_interface;

use crate::backends::ReconfigBackend;
use crate::error::RcfgError;
use crate::loader::BitstreamLoader;
use log::trace;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

/// The daemon's single loader. Holding the lock is holding the right to reconfigure.
pub type SharedLoader<B> = Arc<Mutex<BitstreamLoader<B>>>;

pub fn shared<B: ReconfigBackend>(loader: BitstreamLoader<B>) -> SharedLoader<B> {
    Arc::new(Mutex::new(loader))
}

/// Check a bitstream path received over DBus before taking the write lock for it.
///
/// The daemon's working directory has nothing to do with the caller's, so relative paths
/// are refused.
pub(crate) fn validate_bitstream_path(bitstream_path_str: &str) -> Result<PathBuf, RcfgError> {
    let path = Path::new(bitstream_path_str);
    if !path.is_absolute() {
        return Err(RcfgError::Argument(format!(
            "{bitstream_path_str:?} is not an absolute path. Bitstream paths must be absolute."
        )));
    }
    if !path.exists() || path.is_dir() {
        return Err(RcfgError::Argument(format!(
            "{bitstream_path_str} is not a valid path to a bitstream file."
        )));
    }
    Ok(path.to_path_buf())
}

/// Run a load on the blocking pool while holding the loader lock.
///
/// The lock is owned by the blocking task, so it is only given back once the backend has
/// finished, even if the DBus caller goes away.
pub async fn load_on_shared<B>(
    loader: &SharedLoader<B>,
    bitstream: PathBuf,
    is_partial: bool,
) -> Result<(), RcfgError>
where
    B: ReconfigBackend + 'static,
{
    let mut guard = Arc::clone(loader).lock_owned().await;
    trace!("Got write lock.");
    tokio::task::spawn_blocking(move || guard.load(&bitstream, is_partial))
        .await
        .map_err(|e| RcfgError::Internal(format!("Load task did not complete: {e}")))?
}

/// Current value of the backend's partial reconfiguration flag, as `"1"` or `"0"`.
pub(crate) fn partial_flag_string<B: ReconfigBackend>(
    loader: &BitstreamLoader<B>,
) -> Result<String, RcfgError> {
    let flag = loader.backend().partial_flag().ok_or_else(|| {
        RcfgError::Argument(format!(
            "The {} backend has no partial reconfiguration flag.",
            loader.kind()
        ))
    })?;
    Ok(if flag.is_enabled()? { "1" } else { "0" }.to_owned())
}
