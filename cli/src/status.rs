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

use crate::proxies::status_proxy;
use zbus::Connection;

/// Sends the dbus commands for the status table and returns it as an ascii table
pub async fn status_handler() -> Result<String, zbus::Error> {
    let connection = Connection::system().await?;
    let proxy = status_proxy::StatusProxy::new(&connection).await?;
    let backend = proxy.get_backend().await?;
    let state = proxy.get_fpga_state().await?;
    // Only some backends have a partial reconfiguration flag.
    let flag = proxy
        .get_partial_flag()
        .await
        .unwrap_or_else(|_| "n/a".to_string());
    Ok(format_status(&backend, &state, &flag))
}

fn format_status(backend: &str, state: &str, flag: &str) -> String {
    format!(
        "---- FPGA ----\n\
        | backend | state | partial flag |\n\
        | {backend} | {state} | {flag} |\n"
    )
}
