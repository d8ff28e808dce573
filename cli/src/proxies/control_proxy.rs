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

use zbus::{Result, proxy};
#[proxy(
    default_service = "com.canonical.rcfgd",
    interface = "com.canonical.rcfgd.control",
    default_path = "/com/canonical/rcfgd/control"
)]
pub trait Control {
    async fn load_bitstream(&self, bitstream_path_str: &str, is_partial: bool) -> Result<String>;
}
