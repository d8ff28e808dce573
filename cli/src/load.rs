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

use crate::proxies::control_proxy;
use log::debug;
use std::path::{Path, PathBuf};
use zbus::Connection;

/// Sends the dbus command to load a bitstream
async fn call_load_bitstream(file_path: &str, is_partial: bool) -> Result<String, zbus::Error> {
    let connection = Connection::system().await?;
    let proxy = control_proxy::ControlProxy::new(&connection).await?;
    proxy.load_bitstream(file_path, is_partial).await
}

/// The daemon does not share our working directory, so send it an absolute path.
fn resolve_bitstream_path(file: &Path) -> Result<PathBuf, zbus::Error> {
    std::path::absolute(file).map_err(|e| {
        zbus::Error::Failure(format!("Cannot resolve bitstream path {file:?}: {e}"))
    })
}

/// Argument parser for the load command
pub async fn load_handler(file: &Path, is_partial: bool) -> Result<String, zbus::Error> {
    let path = resolve_bitstream_path(file)?;
    let path_str = path.to_str().ok_or_else(|| {
        zbus::Error::Failure(format!("Bitstream path {path:?} is not valid UTF-8"))
    })?;
    debug!("Requesting load of {path_str} (partial: {is_partial})");
    call_load_bitstream(path_str, is_partial).await
}
