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

//! Legacy Zynq-7000 device configuration backend.
//!
//! Kernels older than xilinx-v2017.1 program the PL through the `/dev/xdevcfg` character
//! device: the bitstream is simply written to it. Partial bitstreams additionally require
//! the `is_partial_bitstream` attribute of the devcfg platform device to be set for the
//! duration of the write.
//!
//! ```text
//! /sys/bus/platform/devices/f8007000.devcfg
//! ├── is_partial_bitstream
//! ├── prog_done
//! └── ...
//! ```
//!
//! A load runs: enable flag (partial only), open `/dev/xdevcfg`, open the bitstream, stream
//! it in 4 KiB chunks, close both, disable flag (partial only).

use crate::backends::{BackendKind, BitstreamFile, ReconfigBackend};
use crate::config;
use crate::error::RcfgError;
use crate::flag::PartialReconfigFlag;
use crate::system_io::{Access, fs_open_device, fs_read_attribute};
use crate::transfer::{TransferRequest, WORD_SIZE, write_from_buffer};
use log::{debug, info, trace};
use std::io::{Seek, Write};
use std::path::{Path, PathBuf};

/// Locations used by [`XdevcfgBackend`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XdevcfgConfig {
    pub control_device: PathBuf,
    pub partial_flag: PathBuf,
    pub prog_done: PathBuf,
    /// Words streamed to the control device per write.
    pub chunk_words: usize,
}

impl Default for XdevcfgConfig {
    fn default() -> Self {
        let sysfs = Path::new(config::XDEVCFG_SYSFS_DIR);
        XdevcfgConfig {
            control_device: PathBuf::from(config::XDEVCFG_CONTROL_DEVICE),
            partial_flag: sysfs.join("is_partial_bitstream"),
            prog_done: sysfs.join("prog_done"),
            chunk_words: config::XDEVCFG_CHUNK_WORDS,
        }
    }
}

#[derive(Debug)]
pub struct XdevcfgBackend {
    config: XdevcfgConfig,
    flag: PartialReconfigFlag,
}

impl XdevcfgBackend {
    pub fn new(config: XdevcfgConfig) -> Self {
        trace!("creating new XdevcfgBackend");
        let flag = PartialReconfigFlag::new(&config.partial_flag);
        XdevcfgBackend { config, flag }
    }

    /// Copy the bitstream to the control device one chunk at a time.
    fn stream_copy<H: Write + Seek>(
        &self,
        bitstream: &mut BitstreamFile,
        control: &mut H,
    ) -> Result<u64, RcfgError> {
        let chunk_len = self.config.chunk_words.max(1) * WORD_SIZE;
        let mut buffer = vec![0u8; chunk_len];
        let mut total = 0u64;
        loop {
            let read = bitstream.read_chunk(&mut buffer)?;
            if read == 0 {
                break;
            }
            let request = TransferRequest::new(read, 0, chunk_len);
            let written =
                write_from_buffer(&self.config.control_device, control, &buffer, &request)?;
            total += written as u64;
            if written != read {
                return Err(RcfgError::IoUnderflow {
                    device: self.config.control_device.clone(),
                    transferred: total,
                    expected: bitstream.len(),
                });
            }
        }
        Ok(total)
    }
}

impl ReconfigBackend for XdevcfgBackend {
    fn with_default_config() -> Result<Self, RcfgError> {
        Ok(XdevcfgBackend::new(XdevcfgConfig::default()))
    }

    fn kind(&self) -> BackendKind {
        BackendKind::Xdevcfg
    }

    fn load(&mut self, bitstream_path: &Path, is_partial: bool) -> Result<(), RcfgError> {
        let flag_guard = self.flag.engage(is_partial)?;

        let mut control = fs_open_device(&self.config.control_device, Access::WriteOnly)?;
        debug!("Opened control device {:?}", self.config.control_device);
        let mut bitstream = BitstreamFile::open(bitstream_path)?;
        debug!("Opened bitstream file {bitstream_path:?}");

        let written = self.stream_copy(&mut bitstream, &mut control)?;
        drop(bitstream);
        drop(control);

        if let Some(guard) = flag_guard {
            guard.release()?;
        }
        info!(
            "Wrote {written} bytes of {bitstream_path:?} to {:?}",
            self.config.control_device
        );
        Ok(())
    }

    fn partial_flag(&self) -> Option<&PartialReconfigFlag> {
        Some(&self.flag)
    }

    /// `operating` once the devcfg reports the PL as programmed, `unprogrammed` otherwise.
    fn fabric_state(&self) -> Result<String, RcfgError> {
        let prog_done = fs_read_attribute(&self.config.prog_done)?;
        Ok(match prog_done.trim() {
            "1" => config::EXPECTED_FPGA_STATE.to_owned(),
            _ => "unprogrammed".to_owned(),
        })
    }
}
