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

use crate::comm::dbus::{SharedLoader, load_on_shared, validate_bitstream_path};
use crate::loader::ConfiguredBackend;
use log::info;
use zbus::{fdo, interface};

pub struct ControlInterface {
    loader: SharedLoader<ConfiguredBackend>,
}

impl ControlInterface {
    pub fn new(loader: SharedLoader<ConfiguredBackend>) -> Self {
        ControlInterface { loader }
    }
}

#[interface(name = "com.canonical.rcfgd.control")]
impl ControlInterface {
    async fn load_bitstream(
        &self,
        bitstream_path_str: &str,
        is_partial: bool,
    ) -> Result<String, fdo::Error> {
        info!(
            "load_bitstream called with path_str: {bitstream_path_str} and is_partial: {is_partial}"
        );
        let path = validate_bitstream_path(bitstream_path_str)?;
        load_on_shared(&self.loader, path, is_partial).await?;
        let kind = if is_partial { "partial" } else { "full" };
        Ok(format!("{bitstream_path_str} loaded as a {kind} bitstream"))
    }
}
