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

//! Temporary directories standing in for sysfs, device nodes and `/lib/firmware`.

#![allow(dead_code)]

use googletest::prelude::*;
use rcfgd::backends::{FpgaManagerConfig, XdevcfgConfig, XdmaHbicapConfig};
use rcfgd::completion::PollPolicy;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;

pub const LINK_NAME: &str = "rcfgd_bitstream";

pub fn write_bitstream(dir: &Path, name: &str, len: usize) -> (PathBuf, Vec<u8>) {
    let data: Vec<u8> = (0..len).map(|i| (i * 31 % 251) as u8).collect();
    let path = dir.join(name);
    fs::write(&path, &data).expect("write bitstream");
    (path, data)
}

/// The flag attribute must not be left enabled, whatever happened before.
pub fn assert_flag_cleared(attribute: &Path) {
    if let Ok(value) = fs::read_to_string(attribute) {
        assert_that!(value.trim(), not(eq("1")), "flag left enabled in {attribute:?}");
    }
}

/// `/sys/class/fpga_manager/fpga0` and `/lib/firmware`.
pub struct FakeManager {
    pub dir: TempDir,
}

impl FakeManager {
    pub fn new(state: &str) -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::create_dir_all(dir.path().join("fpga0")).unwrap();
        fs::create_dir_all(dir.path().join("firmware")).unwrap();
        for (attr, value) in [("firmware", ""), ("flags", "0"), ("state", state)] {
            fs::write(dir.path().join("fpga0").join(attr), value).unwrap();
        }
        FakeManager { dir }
    }

    pub fn attr(&self, name: &str) -> PathBuf {
        self.dir.path().join("fpga0").join(name)
    }

    pub fn firmware_dir(&self) -> PathBuf {
        self.dir.path().join("firmware")
    }

    pub fn link(&self) -> PathBuf {
        self.firmware_dir().join(LINK_NAME)
    }

    pub fn config(&self) -> FpgaManagerConfig {
        FpgaManagerConfig {
            firmware_dir: self.firmware_dir(),
            firmware_attr: self.attr("firmware"),
            flags_attr: self.attr("flags"),
            state_attr: self.attr("state"),
            ..Default::default()
        }
    }

    pub fn assert_clean(&self) {
        assert_flag_cleared(&self.attr("flags"));
        assert_that!(
            fs::symlink_metadata(self.link()).is_err(),
            eq(true),
            "firmware link left behind"
        );
    }
}

/// `/dev/xdevcfg` and the devcfg platform device attributes.
pub struct FakeDevcfg {
    pub dir: TempDir,
}

impl FakeDevcfg {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("xdevcfg"), "").unwrap();
        fs::write(dir.path().join("is_partial_bitstream"), "0").unwrap();
        fs::write(dir.path().join("prog_done"), "1").unwrap();
        FakeDevcfg { dir }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    pub fn config(&self) -> XdevcfgConfig {
        XdevcfgConfig {
            control_device: self.path("xdevcfg"),
            partial_flag: self.path("is_partial_bitstream"),
            prog_done: self.path("prog_done"),
            ..Default::default()
        }
    }

    pub fn assert_clean(&self) {
        assert_flag_cleared(&self.path("is_partial_bitstream"));
    }
}

/// The XDMA user register bank and host-to-card channel of a PCIe card.
pub struct FakeCard {
    pub dir: TempDir,
}

pub const STATUS_OFFSET: usize = 0x110;

impl FakeCard {
    pub fn new(status: u32) -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut registers = vec![0u8; 0x200];
        registers[STATUS_OFFSET..STATUS_OFFSET + 4].copy_from_slice(&status.to_le_bytes());
        fs::write(dir.path().join("xdma0_user"), registers).unwrap();
        fs::write(dir.path().join("xdma0_h2c_2"), "").unwrap();
        FakeCard { dir }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    pub fn register(&self, offset: usize) -> u32 {
        let bytes = fs::read(self.path("xdma0_user")).unwrap();
        u32::from_le_bytes(bytes[offset..offset + 4].try_into().unwrap())
    }

    pub fn config(&self) -> XdmaHbicapConfig {
        XdmaHbicapConfig {
            dma_channel: self.path("xdma0_h2c_2"),
            register_device: self.path("xdma0_user"),
            register_span: 0x200,
            target_offset: 0x2000,
            chunk_cap: 4096,
            poll: PollPolicy {
                interval: Duration::from_micros(100),
                timeout: Duration::from_millis(50),
            },
            ..Default::default()
        }
    }
}
