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

//! fpga_manager backend.
//!
//! Since xilinx-v2017.1 the Linux fpga_manager framework is the default way of programming
//! Zynq-7000 and the only one on Zynq UltraScale+ MPSoC. The framework loads bitstreams
//! through the kernel firmware loader, so the file has to be reachable from a firmware
//! search path. Rather than copying it, a temporary symlink is placed in `/lib/firmware`.
//!
//! ```text
//! /sys/class/fpga_manager/fpga0
//! ├── firmware   # write a file name relative to the firmware search path to load it
//! ├── flags      # 1 while a partial bitstream is loaded
//! ├── state      # "operating" after a successful load
//! └── ...
//! ```
//!
//! A load runs: create link, enable flag (partial only), write the link name to `firmware`,
//! disable flag (partial only), check that `state` reads `operating`, remove link.

use crate::backends::{BackendKind, ReconfigBackend};
use crate::completion::{CompletionMonitor, PollPolicy, StateAttribute};
use crate::config;
use crate::error::RcfgError;
use crate::flag::PartialReconfigFlag;
use crate::system_io::{fs_remove_link, fs_symlink, fs_write_attribute};
use log::{debug, error, info, trace};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Locations used by [`FpgaManagerBackend`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FpgaManagerConfig {
    /// Directory searched by the firmware loader, where the link is placed.
    pub firmware_dir: PathBuf,
    pub link_name: String,
    pub firmware_attr: PathBuf,
    pub flags_attr: PathBuf,
    pub state_attr: PathBuf,
    /// State the manager must report after a successful load.
    pub expected_state: String,
}

impl FpgaManagerConfig {
    /// Configuration for the manager `device_handle` (e.g. "fpga1") under
    /// `/sys/class/fpga_manager/`.
    pub fn for_device(device_handle: &str) -> Self {
        let device_dir = Path::new(config::FPGA_MANAGERS_DIR).join(device_handle);
        FpgaManagerConfig {
            firmware_dir: PathBuf::from(config::FIRMWARE_DIR),
            link_name: config::FIRMWARE_LINK_NAME.to_owned(),
            firmware_attr: device_dir.join("firmware"),
            flags_attr: device_dir.join("flags"),
            state_attr: device_dir.join("state"),
            expected_state: config::EXPECTED_FPGA_STATE.to_owned(),
        }
    }
}

impl Default for FpgaManagerConfig {
    fn default() -> Self {
        FpgaManagerConfig::for_device(config::DEFAULT_FPGA_DEVICE)
    }
}

/// Symlink exposing a bitstream to the firmware loader. Removed on release or drop.
#[derive(Debug)]
#[must_use = "dropping the link removes it immediately"]
pub struct FirmwareLink {
    link: PathBuf,
    armed: bool,
}

impl FirmwareLink {
    /// Place a symlink to `target` at `link`.
    ///
    /// A symlink left over by an interrupted load is removed first. Any other file at `link`
    /// is left alone and the link is not created.
    ///
    /// # Returns: `Result<FirmwareLink, RcfgError>`
    /// * `Ok(FirmwareLink)` - The link, removed again when released or dropped
    /// * `Err(RcfgError::Argument)` - `target` is `link` itself, or `link` is a regular file
    /// * `Err(RcfgError::IOCreate)` - The symlink could not be created
    pub fn create(target: &Path, link: PathBuf) -> Result<Self, RcfgError> {
        if same_entry(target, &link) {
            return Err(RcfgError::Argument(format!(
                "Bitstream {target:?} is stored at the firmware link location. \
                Move it out of the way before loading it."
            )));
        }
        match link.symlink_metadata() {
            Ok(m) if m.file_type().is_symlink() => fs_remove_link(&link, true)?,
            Ok(_) => {
                return Err(RcfgError::Argument(format!(
                    "{link:?} exists and is not a symlink, refusing to replace it."
                )));
            }
            Err(_) => {}
        }
        fs_symlink(target, &link)?;
        debug!("Linked {link:?} -> {target:?}");
        Ok(FirmwareLink { link, armed: true })
    }

    /// Name of the link relative to the firmware directory.
    pub fn firmware_name(&self) -> Result<&str, RcfgError> {
        self.link
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| {
                RcfgError::Argument(format!(
                    "Firmware link {:?} has no usable file name",
                    self.link
                ))
            })
    }

    pub fn remove(mut self) -> Result<(), RcfgError> {
        self.armed = false;
        fs_remove_link(&self.link, false)?;
        debug!("Removed {:?}", self.link);
        Ok(())
    }
}

/// Whether `a` and `b` name the same directory entry, once their parent directories are
/// resolved. The entries themselves are not followed.
fn same_entry(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    let locate = |path: &Path| -> Option<PathBuf> {
        let parent = path.parent()?.canonicalize().ok()?;
        Some(parent.join(path.file_name()?))
    };
    matches!((locate(a), locate(b)), (Some(a), Some(b)) if a == b)
}

impl Drop for FirmwareLink {
    fn drop(&mut self) {
        if self.armed {
            if let Err(e) = fs_remove_link(&self.link, true) {
                error!("Failed to remove firmware link after an error: {e}");
            }
        }
    }
}

#[derive(Debug)]
pub struct FpgaManagerBackend {
    config: FpgaManagerConfig,
    flag: PartialReconfigFlag,
    state: StateAttribute,
}

impl FpgaManagerBackend {
    pub fn new(config: FpgaManagerConfig) -> Self {
        trace!("creating new FpgaManagerBackend");
        let flag = PartialReconfigFlag::new(&config.flags_attr);
        let state = StateAttribute::new(&config.state_attr, config.expected_state.clone());
        FpgaManagerBackend {
            config,
            flag,
            state,
        }
    }

    /// Absolute form of `bitstream`, which must be an existing file.
    fn resolve(bitstream: &Path) -> Result<PathBuf, RcfgError> {
        match bitstream.metadata() {
            Ok(m) if m.is_dir() => {
                return Err(RcfgError::FileReadError {
                    file: bitstream.into(),
                    e: ErrorKind::IsADirectory.into(),
                });
            }
            Ok(_) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(RcfgError::FileNotFound(bitstream.into()));
            }
            Err(e) => {
                return Err(RcfgError::FileReadError {
                    file: bitstream.into(),
                    e,
                });
            }
        }
        std::path::absolute(bitstream).map_err(|e| RcfgError::FileReadError {
            file: bitstream.into(),
            e,
        })
    }
}

impl ReconfigBackend for FpgaManagerBackend {
    fn with_default_config() -> Result<Self, RcfgError> {
        Ok(FpgaManagerBackend::new(FpgaManagerConfig::default()))
    }

    fn kind(&self) -> BackendKind {
        BackendKind::FpgaManager
    }

    fn load(&mut self, bitstream: &Path, is_partial: bool) -> Result<(), RcfgError> {
        let target = Self::resolve(bitstream)?;
        let link = FirmwareLink::create(
            &target,
            self.config.firmware_dir.join(&self.config.link_name),
        )?;

        let flag_guard = self.flag.engage(is_partial)?;
        fs_write_attribute(&self.config.firmware_attr, link.firmware_name()?)?;
        debug!("Firmware written to {:?}", self.config.firmware_attr);
        if let Some(guard) = flag_guard {
            guard.release()?;
        }

        self.state.wait(&PollPolicy::default())?;
        link.remove()?;
        info!("{bitstream:?} loaded, state is '{}'", self.config.expected_state);
        Ok(())
    }

    fn partial_flag(&self) -> Option<&PartialReconfigFlag> {
        Some(&self.flag)
    }

    fn fabric_state(&self) -> Result<String, RcfgError> {
        self.state.read()
    }
}
