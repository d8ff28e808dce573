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

//! Partial reconfiguration flag handling.
//!
//! Both the xdevcfg driver (`is_partial_bitstream`) and fpga_manager (`flags`) expose a
//! kernel attribute that must hold `1` while a partial bitstream is written and `0`
//! otherwise. [`PartialReconfigFlag::engage`] sets it and hands back a [`FlagGuard`] that
//! clears it again when released or dropped, so a failing load can never leave the fabric
//! in partial mode.

use crate::error::RcfgError;
use crate::system_io::{fs_read_attribute, fs_write_attribute};
use log::{debug, error};
use std::path::{Path, PathBuf};

/// Handle on the attribute holding the partial reconfiguration flag.
#[derive(Debug, Clone)]
pub struct PartialReconfigFlag {
    path: PathBuf,
}

impl PartialReconfigFlag {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        PartialReconfigFlag { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write `1` to the attribute.
    ///
    /// # Returns: `Result<(), RcfgError>`
    /// * `Ok(())` - Partial reconfiguration enabled
    /// * `Err(RcfgError::DeviceUnavailable)` - The attribute cannot be opened
    /// * `Err(RcfgError::IOWrite)` - The driver rejected the value
    pub fn enable(&self) -> Result<(), RcfgError> {
        fs_write_attribute(&self.path, "1")?;
        debug!("DPR enabled through {:?}", self.path);
        Ok(())
    }

    /// Write `0` to the attribute. Errors as for [`enable`](Self::enable).
    pub fn disable(&self) -> Result<(), RcfgError> {
        fs_write_attribute(&self.path, "0")?;
        debug!("DPR disabled through {:?}", self.path);
        Ok(())
    }

    /// Read the flag back.
    ///
    /// xdevcfg reports `0`/`1` while fpga_manager reports hexadecimal, with or without a
    /// `0x` prefix. Any non-zero value counts as enabled.
    ///
    /// # Returns: `Result<bool, RcfgError>`
    /// * `Ok(bool)` - Whether partial reconfiguration is enabled
    /// * `Err(RcfgError::DeviceUnavailable)` - The attribute cannot be opened
    /// * `Err(RcfgError::Internal)` - The attribute holds something other than a number
    pub fn is_enabled(&self) -> Result<bool, RcfgError> {
        let contents = fs_read_attribute(&self.path)?;
        let trimmed = contents.trim().trim_end_matches('\0');
        let digits = trimmed.trim_start_matches("0x");
        u32::from_str_radix(digits, 16)
            .map(|flags| flags != 0)
            .map_err(|_| {
                RcfgError::Internal(format!(
                    "Parsing flag {trimmed:?} from {:?} failed",
                    self.path
                ))
            })
    }

    /// Enable the flag when `is_partial` is set.
    ///
    /// # Returns: `Result<Option<FlagGuard>, RcfgError>`
    /// * `Ok(Some(FlagGuard))` - Flag enabled. It is disabled when the guard is released or dropped.
    /// * `Ok(None)` - Full bitstream, the attribute was not touched
    /// * `Err(RcfgError)` - Enabling failed, nothing needs to be undone
    pub fn engage(&self, is_partial: bool) -> Result<Option<FlagGuard<'_>>, RcfgError> {
        if !is_partial {
            return Ok(None);
        }
        self.enable()?;
        Ok(Some(FlagGuard {
            flag: self,
            armed: true,
        }))
    }
}

/// Keeps the partial reconfiguration flag enabled for as long as it lives.
///
/// Call [`release`](FlagGuard::release) on the success path to observe a failing disable.
/// Dropping an unreleased guard still disables the flag and logs any failure, as the caller
/// is already returning another error.
#[derive(Debug)]
#[must_use = "dropping the guard disables the flag immediately"]
pub struct FlagGuard<'a> {
    flag: &'a PartialReconfigFlag,
    armed: bool,
}

impl FlagGuard<'_> {
    pub fn release(mut self) -> Result<(), RcfgError> {
        self.armed = false;
        self.flag.disable()
    }
}

impl Drop for FlagGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            if let Err(e) = self.flag.disable() {
                error!("Failed to disable partial reconfiguration after an error: {e}");
            }
        }
    }
}
