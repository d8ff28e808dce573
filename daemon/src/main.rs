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

//! # rcfgd
//!
//! System service that loads FPGA bitstreams on behalf of unprivileged clients.
//!
//! - Exposes two DBus interfaces: `control` and `status`
//! - Owns the single [`BitstreamLoader`] of the system and serializes every load
//! - Runs as a system service with appropriate privileges
//!
//! # DBus Service
//!
//! - **Service Name**: `com.canonical.rcfgd`
//! - **Status Interface**: `/com/canonical/rcfgd/status` - Read-only operations
//! - **Control Interface**: `/com/canonical/rcfgd/control` - Bitstream loading
//!
//! # Environment Variables
//!
//! - `RUST_LOG` - Controls logging level (`trace`, `debug`, `info`, `warn`, `error`
//!   or `off`). Defaults to `info`

use log::info;
use rcfgd::BitstreamLoader;
use rcfgd::comm::dbus::{
    control_interface::ControlInterface, shared, status_interface::StatusInterface,
};
use std::error::Error;
use std::future::pending;
use zbus::connection;

/// Main entry point for the rcfgd daemon.
///
/// Initializes the daemon by:
/// 1. Setting up logging via `env_logger` (defaults to "info" level)
/// 2. Building the loader around the backend selected at build time
/// 3. Connecting to the system DBus and advertising the service
/// 4. Running indefinitely to serve DBus requests
///
/// # Returns: `Result<(), Box<dyn Error>>`
/// * `Ok(())` - Never returns under normal operation (runs until terminated)
/// * `Err(Box<dyn Error>)` - Initialization error (backend device missing, DBus connection
///   failed, etc.)
///
/// # Examples
///
/// ```bash
/// # Run with debug logging
/// RUST_LOG=debug rcfgd
/// ```
#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let loader = BitstreamLoader::configured()?;
    info!("Using the {} backend", loader.kind());
    let loader = shared(loader);

    let status_interface = StatusInterface::new(loader.clone());
    let control_interface = ControlInterface::new(loader);

    let _conn = connection::Builder::system()?
        .name("com.canonical.rcfgd")?
        .serve_at("/com/canonical/rcfgd/status", status_interface)?
        .serve_at("/com/canonical/rcfgd/control", control_interface)?
        .build()
        .await?;

    info!("Started com.canonical.rcfgd dbus service");
    pending::<()>().await;

    Ok(())
}
