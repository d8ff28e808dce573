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

//! Bounded access to the HBICAP register bank.
//!
//! The XDMA driver exposes the card's AXI-Lite space as a character device (`/dev/xdma0_user`)
//! supporting positioned reads and writes. A [`RegisterWindow`] is a span of that device; every
//! access is checked against the span before it reaches the kernel. [`HbicapRegisters`] is the
//! only way in: it offers one typed accessor per register and validates its layout against the
//! window once, when it is built.

use crate::config;
use crate::error::RcfgError;
use crate::system_io::{Access, fs_open_device};
use log::trace;
use std::fs::File;
use std::os::unix::fs::FileExt;
use std::path::{Path, PathBuf};

const REGISTER_WIDTH: u64 = 4;

/// A span of 32-bit registers on a device supporting positioned I/O.
#[derive(Debug)]
pub struct RegisterWindow {
    file: File,
    device: PathBuf,
    base: u64,
    span: u64,
}

impl RegisterWindow {
    /// Open `span` bytes of `device`, starting at `base`.
    ///
    /// # Returns: `Result<RegisterWindow, RcfgError>`
    /// * `Ok(RegisterWindow)` - The window
    /// * `Err(RcfgError::DeviceUnavailable)` - The device cannot be opened
    pub fn open(device: &Path, base: u64, span: u64) -> Result<Self, RcfgError> {
        let file = fs_open_device(device, Access::ReadWrite)?;
        trace!("Opened register window {device:?} [{base:#x}, +{span:#x})");
        Ok(RegisterWindow {
            file,
            device: device.to_owned(),
            base,
            span,
        })
    }

    pub fn device(&self) -> &Path {
        &self.device
    }

    fn check(&self, offset: u64) -> Result<(), RcfgError> {
        if offset % REGISTER_WIDTH != 0 || offset + REGISTER_WIDTH > self.span {
            return Err(RcfgError::Argument(format!(
                "Register offset {offset:#x} is outside the {:#x} byte window on {:?}",
                self.span, self.device
            )));
        }
        Ok(())
    }

    fn read_u32(&self, offset: u64) -> Result<u32, RcfgError> {
        self.check(offset)?;
        let mut bytes = [0u8; REGISTER_WIDTH as usize];
        self.file
            .read_exact_at(&mut bytes, self.base + offset)
            .map_err(|e| RcfgError::IORead {
                file: self.device.clone(),
                e,
            })?;
        Ok(u32::from_le_bytes(bytes))
    }

    fn write_u32(&self, offset: u64, value: u32) -> Result<(), RcfgError> {
        self.check(offset)?;
        trace!("{:?} [{offset:#x}] <- {value:#x}", self.device);
        self.file
            .write_all_at(&value.to_le_bytes(), self.base + offset)
            .map_err(|e| RcfgError::IOWrite {
                data: format!("{value:#x} @ {offset:#x}"),
                file: self.device.clone(),
                e,
            })
    }
}

/// Byte offsets of the HBICAP registers within a [`RegisterWindow`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HbicapLayout {
    pub size: u64,
    pub control: u64,
    pub status: u64,
}

impl Default for HbicapLayout {
    fn default() -> Self {
        HbicapLayout {
            size: config::HBICAP_SIZE_OFFSET,
            control: config::HBICAP_CONTROL_OFFSET,
            status: config::HBICAP_STATUS_OFFSET,
        }
    }
}

/// Typed access to the HBICAP size, control and status registers.
#[derive(Debug)]
pub struct HbicapRegisters {
    window: RegisterWindow,
    layout: HbicapLayout,
}

impl HbicapRegisters {
    /// Bind `layout` to `window`.
    ///
    /// # Returns: `Result<HbicapRegisters, RcfgError>`
    /// * `Ok(HbicapRegisters)` - Every register of the layout lies within the window
    /// * `Err(RcfgError::Argument)` - A register is misaligned or outside the window
    pub fn new(window: RegisterWindow, layout: HbicapLayout) -> Result<Self, RcfgError> {
        for offset in [layout.size, layout.control, layout.status] {
            window.check(offset)?;
        }
        Ok(HbicapRegisters { window, layout })
    }

    pub fn device(&self) -> &Path {
        self.window.device()
    }

    pub fn read_status(&self) -> Result<u32, RcfgError> {
        self.window.read_u32(self.layout.status)
    }

    pub fn write_control(&self, code: u32) -> Result<(), RcfgError> {
        self.window.write_u32(self.layout.control, code)
    }

    /// Program the transfer length, in 32-bit words.
    pub fn write_size(&self, words: u32) -> Result<(), RcfgError> {
        self.window.write_u32(self.layout.size, words)
    }
}
