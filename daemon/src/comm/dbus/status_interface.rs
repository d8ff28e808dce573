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

use crate::backends::ReconfigBackend;
use crate::comm::dbus::{SharedLoader, partial_flag_string};
use crate::loader::ConfiguredBackend;
use log::info;
use zbus::{fdo, interface};

/// Read-only view of the loader. Each call waits for any load in progress to finish.
pub struct StatusInterface {
    loader: SharedLoader<ConfiguredBackend>,
}

impl StatusInterface {
    pub fn new(loader: SharedLoader<ConfiguredBackend>) -> Self {
        StatusInterface { loader }
    }
}

#[interface(name = "com.canonical.rcfgd.status")]
impl StatusInterface {
    async fn get_backend(&self) -> Result<String, fdo::Error> {
        info!("get_backend called");
        Ok(self.loader.lock().await.kind().to_string())
    }

    async fn get_partial_flag(&self) -> Result<String, fdo::Error> {
        info!("get_partial_flag called");
        Ok(partial_flag_string(&*self.loader.lock().await)?)
    }

    async fn get_fpga_state(&self) -> Result<String, fdo::Error> {
        info!("get_fpga_state called");
        Ok(self.loader.lock().await.backend().fabric_state()?)
    }
}
