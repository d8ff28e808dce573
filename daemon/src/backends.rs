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

//! Reconfiguration backends.
//!
//! A backend drives one kernel interface through a complete load:
//!
//! - [`XdevcfgBackend`] - the legacy Zynq-7000 `/dev/xdevcfg` character device
//! - [`FpgaManagerBackend`] - the Linux fpga_manager framework, fed through `/lib/firmware`
//! - [`XdmaHbicapBackend`] - an HBICAP behind an XDMA PCIe endpoint, fed by DMA
//!
//! All of them implement [`ReconfigBackend`], so the [`BitstreamLoader`](crate::loader::BitstreamLoader)
//! can drive whichever one the build selected without knowing which it is.
//!
//! # Cleanup
//!
//! Every resource a backend acquires during a load (open device nodes, the partial
//! reconfiguration flag, the firmware symlink) is held by a value whose `Drop` releases it.
//! Whatever step fails, everything acquired before it is released before the error reaches
//! the caller.

pub mod fpga_manager;
pub mod xdevcfg;
pub mod xdma_hbicap;

pub use fpga_manager::{FpgaManagerBackend, FpgaManagerConfig};
pub use xdevcfg::{XdevcfgBackend, XdevcfgConfig};
pub use xdma_hbicap::{XdmaHbicapBackend, XdmaHbicapConfig};

use crate::config;
use crate::error::RcfgError;
use crate::flag::PartialReconfigFlag;
use crate::system_io::fs_open_bitstream;
use crate::transfer::{TransferRequest, read_to_buffer};
use log::trace;
use std::fmt;
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};

/// The kernel interface a backend drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Xdevcfg,
    FpgaManager,
    XdmaHbicap,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BackendKind::Xdevcfg => "xdevcfg",
            BackendKind::FpgaManager => "fpga_manager",
            BackendKind::XdmaHbicap => "xdma_hbicap",
        })
    }
}

/// Trait for loading bitstreams through one kernel interface.
pub trait ReconfigBackend: Send {
    /// Build the backend from the fixed locations in [`config`](crate::config).
    ///
    /// # Returns: `Result<Self, RcfgError>`
    /// * `Ok(Self)` - The backend
    /// * `Err(RcfgError::DeviceUnavailable)` - A device the backend holds open is missing
    fn with_default_config() -> Result<Self, RcfgError>
    where
        Self: Sized;

    fn kind(&self) -> BackendKind;

    /// Load a full or partial bitstream.
    ///
    /// Takes `&mut self`: the flag, control device and DMA channel behind a backend allow a
    /// single reconfiguration at a time.
    ///
    /// # Arguments
    ///
    /// * `bitstream` - Path to the bitstream file
    /// * `is_partial` - Whether the bitstream targets a reconfigurable partition
    ///
    /// # Returns: `Result<(), RcfgError>`
    /// * `Ok(())` - The fabric accepted the bitstream
    /// * `Err(RcfgError)` - The step that failed. All resources have been released.
    fn load(&mut self, bitstream: &Path, is_partial: bool) -> Result<(), RcfgError>;

    /// The partial reconfiguration flag, for backends which have one.
    fn partial_flag(&self) -> Option<&PartialReconfigFlag> {
        None
    }

    /// A short description of the fabric's current state, as the interface reports it.
    fn fabric_state(&self) -> Result<String, RcfgError>;
}

/// A bitstream file opened for one load.
#[derive(Debug)]
pub struct BitstreamFile {
    path: PathBuf,
    file: File,
    len: u64,
}

impl BitstreamFile {
    /// Open the bitstream at `path`.
    ///
    /// # Returns: `Result<BitstreamFile, RcfgError>`
    /// * `Ok(BitstreamFile)` - The open file
    /// * `Err(RcfgError::FileNotFound)` - Nothing exists at `path`
    /// * `Err(RcfgError::FileReadError)` - `path` cannot be opened or is a directory
    pub fn open(path: &Path) -> Result<Self, RcfgError> {
        let (file, len) = fs_open_bitstream(path)?;
        trace!("Opened bitstream {path:?} ({len} bytes)");
        Ok(BitstreamFile {
            path: path.to_owned(),
            file,
            len,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Fill as much of `buffer` as the file still holds.
    ///
    /// Returns less than `buffer.len()` only at the end of the file.
    pub fn read_chunk(&mut self, buffer: &mut [u8]) -> Result<usize, RcfgError> {
        let mut filled = 0;
        while filled < buffer.len() {
            match self.file.read(&mut buffer[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    return Err(RcfgError::FileReadError {
                        file: self.path.clone(),
                        e,
                    });
                }
            }
        }
        Ok(filled)
    }

    /// Read the whole file into a freshly allocated buffer.
    ///
    /// # Returns: `Result<Vec<u8>, RcfgError>`
    /// * `Ok(Vec<u8>)` - The complete contents
    /// * `Err(RcfgError::AllocationFailure)` - No buffer of the file's size could be allocated
    /// * `Err(RcfgError::IoUnderflow)` - The file ended before its reported length
    /// * `Err(RcfgError::FileReadError)` - Reading failed
    pub fn read_all(&mut self) -> Result<Vec<u8>, RcfgError> {
        let size = usize::try_from(self.len)
            .map_err(|_| RcfgError::AllocationFailure { size: self.len })?;
        let mut content = Vec::new();
        content
            .try_reserve_exact(size)
            .map_err(|_| RcfgError::AllocationFailure { size: self.len })?;
        content.resize(size, 0);

        let request = TransferRequest::new(size, 0, config::RW_MAX_SIZE);
        let read = read_to_buffer(&self.path, &mut self.file, &mut content, &request)
            .map_err(|err| match err {
                RcfgError::IOTransfer { e, .. } => RcfgError::FileReadError {
                    file: self.path.clone(),
                    e,
                },
                other => other,
            })?;
        if read != size {
            return Err(RcfgError::IoUnderflow {
                device: self.path.clone(),
                transferred: read as u64,
                expected: self.len,
            });
        }
        trace!("Buffered {read} bytes of {:?}", self.path);
        Ok(content)
    }
}
