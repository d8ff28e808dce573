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

//! HBICAP over XDMA backend.
//!
//! On PCIe cards such as the Alveo U250 the bitstream is pushed into a High Bandwidth ICAP
//! (HBICAP) through a host-to-card XDMA channel. The HBICAP is told how many words to
//! expect through its control and size registers, which live in the card's AXI-Lite space
//! (the XDMA user channel), and raises the done bit of its status register once it has
//! consumed them.
//!
//! A load runs: buffer the whole bitstream, open the DMA channel, program control and size,
//! write the buffer to the HBICAP write FIFO, poll the status register, close everything.
//!
//! The register window is opened once, when the backend is built, and stays owned by it.

use crate::backends::{BackendKind, BitstreamFile, ReconfigBackend};
use crate::completion::{CompletionMonitor, PollPolicy, RegisterPoll};
use crate::config;
use crate::error::RcfgError;
use crate::registers::{HbicapLayout, HbicapRegisters, RegisterWindow};
use crate::system_io::{Access, fs_open_device};
use crate::transfer::{TransferRequest, WORD_SIZE, write_from_buffer};
use log::{debug, info, trace, warn};
use std::io::{Seek, Write};
use std::path::{Path, PathBuf};

/// Devices, addresses and limits used by [`XdmaHbicapBackend`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XdmaHbicapConfig {
    /// Host-to-card DMA channel feeding the HBICAP.
    pub dma_channel: PathBuf,
    /// Device exposing the register bank.
    pub register_device: PathBuf,
    pub register_base: u64,
    pub register_span: u64,
    pub layout: HbicapLayout,
    /// Card address of the HBICAP write FIFO.
    pub target_offset: u64,
    /// Largest single write to the DMA channel.
    pub chunk_cap: usize,
    pub control_code: u32,
    pub poll: PollPolicy,
}

impl Default for XdmaHbicapConfig {
    fn default() -> Self {
        XdmaHbicapConfig {
            dma_channel: PathBuf::from(config::XDMA_H2C_CHANNEL),
            register_device: PathBuf::from(config::XDMA_USER_DEVICE),
            register_base: config::HBICAP_REGISTER_BASE,
            register_span: config::HBICAP_REGISTER_SPAN,
            layout: HbicapLayout::default(),
            target_offset: config::HBICAP_TARGET_OFFSET,
            chunk_cap: config::RW_MAX_SIZE,
            control_code: config::HBICAP_CONTROL_CODE,
            poll: PollPolicy::default(),
        }
    }
}

#[derive(Debug)]
pub struct XdmaHbicapBackend {
    config: XdmaHbicapConfig,
    registers: HbicapRegisters,
}

impl XdmaHbicapBackend {
    /// Open the register window described by `config`.
    ///
    /// # Returns: `Result<XdmaHbicapBackend, RcfgError>`
    /// * `Ok(XdmaHbicapBackend)` - Backend holding the register window
    /// * `Err(RcfgError::DeviceUnavailable)` - The register device cannot be opened
    /// * `Err(RcfgError::Argument)` - The register layout does not fit the window
    pub fn open(config: XdmaHbicapConfig) -> Result<Self, RcfgError> {
        trace!("creating new XdmaHbicapBackend");
        let window = RegisterWindow::open(
            &config.register_device,
            config.register_base,
            config.register_span,
        )?;
        let registers = HbicapRegisters::new(window, config.layout)?;
        Ok(XdmaHbicapBackend { config, registers })
    }

    fn word_count(&self, bytes: usize) -> Result<u32, RcfgError> {
        if bytes % WORD_SIZE != 0 {
            warn!("Bitstream length {bytes} is not a whole number of words");
        }
        u32::try_from(bytes / WORD_SIZE).map_err(|_| {
            RcfgError::Argument(format!(
                "A bitstream of {bytes} bytes does not fit the HBICAP size register"
            ))
        })
    }

    /// Write `content` to the HBICAP write FIFO through `channel`.
    fn push<H: Write + Seek>(&self, channel: &mut H, content: &[u8]) -> Result<(), RcfgError> {
        let request = TransferRequest::new(
            content.len(),
            self.config.target_offset,
            self.config.chunk_cap,
        );
        debug!(
            "dev {:?}, size {:#x}, offset {:#x}",
            self.config.dma_channel, request.size, request.base_offset
        );
        let written = write_from_buffer(&self.config.dma_channel, channel, content, &request)?;
        if written != content.len() {
            return Err(RcfgError::IoUnderflow {
                device: self.config.dma_channel.clone(),
                transferred: written as u64,
                expected: content.len() as u64,
            });
        }
        Ok(())
    }
}

impl ReconfigBackend for XdmaHbicapBackend {
    fn with_default_config() -> Result<Self, RcfgError> {
        XdmaHbicapBackend::open(XdmaHbicapConfig::default())
    }

    fn kind(&self) -> BackendKind {
        BackendKind::XdmaHbicap
    }

    fn load(&mut self, bitstream_path: &Path, is_partial: bool) -> Result<(), RcfgError> {
        debug!("Loading {bitstream_path:?} through HBICAP (partial: {is_partial})");
        let mut bitstream = BitstreamFile::open(bitstream_path)?;
        let content = bitstream.read_all()?;
        debug!("Buffered {} bytes", content.len());

        let mut channel = fs_open_device(&self.config.dma_channel, Access::ReadWrite)?;

        let words = self.word_count(content.len())?;
        self.registers.write_control(self.config.control_code)?;
        self.registers.write_size(words)?;
        debug!(
            "HBICAP configured: control {}, {words} words",
            self.config.control_code
        );

        self.push(&mut channel, &content)?;

        RegisterPoll::new(&self.registers).wait(&self.config.poll)?;
        info!("HBICAP reconfiguration with {bitstream_path:?} completed");
        Ok(())
    }

    /// `operating` once the HBICAP reports done, `busy` otherwise.
    fn fabric_state(&self) -> Result<String, RcfgError> {
        let status = self.registers.read_status()?;
        Ok(if status & config::HBICAP_STATUS_DONE != 0 {
            config::EXPECTED_FPGA_STATE.to_owned()
        } else {
            "busy".to_owned()
        })
    }
}
