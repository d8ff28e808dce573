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

//! DBus proxy interfaces for the rcfgd daemon.
//!
//! Generated with the `zbus` `#[proxy]` macro, one per interface the daemon serves.
//!
//! - **Service Name**: `com.canonical.rcfgd`
//! - **Control Interface**: `com.canonical.rcfgd.control` at `/com/canonical/rcfgd/control`
//! - **Status Interface**: `com.canonical.rcfgd.status` at `/com/canonical/rcfgd/status`

pub mod control_proxy;
pub mod status_proxy;
