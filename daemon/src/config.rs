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

//! Fixed locations and hardware constants used by the reconfiguration backends.
//!
//! Every backend gathers the values it needs into its own config struct whose `Default`
//! implementation uses these constants, so that tests and integrators can point any
//! backend at a different tree.

use std::time::Duration;

/// The driver-decided location of fpga_manager objects. Typically `/sys/class/fpga_manager/`.
pub static FPGA_MANAGERS_DIR: &str = "/sys/class/fpga_manager/";

/// The fpga_manager device programmed by default.
pub static DEFAULT_FPGA_DEVICE: &str = "fpga0";

/// Directory searched by the kernel firmware loader. Bitstreams are exposed here through a
/// temporary symlink.
pub static FIRMWARE_DIR: &str = "/lib/firmware/";

/// Name of the temporary symlink created in [`FIRMWARE_DIR`] for each load.
pub static FIRMWARE_LINK_NAME: &str = "rcfgd_bitstream";

/// State reported by fpga_manager after a successful load.
pub static EXPECTED_FPGA_STATE: &str = "operating";

/// Character device of the legacy Zynq-7000 device configuration interface.
pub static XDEVCFG_CONTROL_DEVICE: &str = "/dev/xdevcfg";

/// sysfs directory of the xdevcfg platform device.
pub static XDEVCFG_SYSFS_DIR: &str = "/sys/bus/platform/devices/f8007000.devcfg/";

/// Number of 32-bit words streamed to `/dev/xdevcfg` per write.
pub const XDEVCFG_CHUNK_WORDS: usize = 1024;

/// Host-to-card XDMA channel that feeds the HBICAP.
pub static XDMA_H2C_CHANNEL: &str = "/dev/xdma0_h2c_2";

/// XDMA user channel mapping the AXI-Lite register space.
pub static XDMA_USER_DEVICE: &str = "/dev/xdma0_user";

/// Offset of the reconfiguration register bank within the user channel.
pub const HBICAP_REGISTER_BASE: u64 = 0x0;

/// Size of the register window opened on the user channel.
pub const HBICAP_REGISTER_SPAN: u64 = 0x1000;

/// Byte offset of the HBICAP transfer size register (in words).
pub const HBICAP_SIZE_OFFSET: u64 = 0x42 * 4;

/// Byte offset of the HBICAP control register.
pub const HBICAP_CONTROL_OFFSET: u64 = 0x43 * 4;

/// Byte offset of the HBICAP status register.
pub const HBICAP_STATUS_OFFSET: u64 = 0x44 * 4;

/// Control code starting a write of the configured size.
pub const HBICAP_CONTROL_CODE: u32 = 12;

/// Status bit asserted once the HBICAP has consumed the whole bitstream.
pub const HBICAP_STATUS_DONE: u32 = 0x1;

/// Address of the HBICAP write FIFO in card address space.
pub const HBICAP_TARGET_OFFSET: u64 = 0x4000_0000;

/// Largest read or write issued to a DMA channel in one call.
pub const RW_MAX_SIZE: usize = 0x7fff_f000;

/// How long a load waits for the hardware to report completion.
pub const COMPLETION_TIMEOUT: Duration = Duration::from_secs(10);

/// Delay between two reads of a completion status.
pub const COMPLETION_POLL_INTERVAL: Duration = Duration::from_millis(1);
