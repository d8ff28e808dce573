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

use crate::common::test_functions::{FakeCard, STATUS_OFFSET, write_bitstream};
use googletest::prelude::*;
use rcfgd::ReconfigBackend;
use rcfgd::backends::{XdmaHbicapBackend, XdmaHbicapConfig};
use rcfgd::transfer::{TransferRequest, read_to_buffer};
use rstest::*;
use std::fs::{self, File, OpenOptions};
use std::os::unix::fs::FileExt;
use std::path::Path;

#[gtest]
#[rstest]
#[case::full(false)]
#[case::partial(true)]
fn transferred_bitstream_reads_back(#[case] is_partial: bool) {
    let card = FakeCard::new(0x1);
    let (bitstream, data) = write_bitstream(card.dir.path(), "design.bin", 10_000);
    let config = card.config();
    let mut backend = XdmaHbicapBackend::open(config.clone()).unwrap();

    expect_that!(backend.load(&bitstream, is_partial), ok(eq(&())));
    expect_that!(backend.partial_flag().is_none(), eq(true));

    let mut channel = File::open(&config.dma_channel).unwrap();
    let mut readback = vec![0u8; data.len()];
    let request = TransferRequest::new(data.len(), config.target_offset, config.chunk_cap);
    expect_that!(request.chunk_count(), eq(3));
    expect_that!(
        read_to_buffer(&config.dma_channel, &mut channel, &mut readback, &request),
        ok(eq(&data.len()))
    );
    expect_that!(readback, eq(&data));
}

#[gtest]
fn status_is_polled_until_done() {
    let card = FakeCard::new(0x0);
    let (bitstream, _) = write_bitstream(card.dir.path(), "design.bin", 64);
    let mut config = card.config();
    config.poll.timeout = std::time::Duration::from_secs(5);
    let mut backend = XdmaHbicapBackend::open(config).unwrap();

    let registers = card.path("xdma0_user");
    let completer = std::thread::spawn(move || {
        std::thread::sleep(std::time::Duration::from_millis(20));
        let bank = OpenOptions::new().write(true).open(&registers).unwrap();
        bank.write_all_at(&1u32.to_le_bytes(), STATUS_OFFSET as u64).unwrap();
    });

    expect_that!(backend.load(&bitstream, false), ok(eq(&())));
    completer.join().unwrap();
    expect_that!(card.register(0x108), eq(16));
}

#[gtest]
fn unfinished_reconfiguration_times_out() {
    let card = FakeCard::new(0x0);
    let (bitstream, _) = write_bitstream(card.dir.path(), "design.bin", 64);
    let mut backend = XdmaHbicapBackend::open(card.config()).unwrap();

    let result = backend.load(&bitstream, false);

    let Err(e) = result else {
        panic!("expected a timeout");
    };
    expect_that!(e.errno(), eq(-110));
}

enum Fault {
    MissingBitstream,
    BitstreamIsDirectory,
    MissingDmaChannel,
    FullDmaChannel,
    FullRegisterDevice,
    TruncatedRegisterFile,
}

/// Break `card` or `config` the way `fault` says. Returns false if the host lacks what it needs.
fn inject(card: &FakeCard, config: &mut XdmaHbicapConfig, fault: &Fault) -> bool {
    let full = Path::new("/dev/full");
    match fault {
        Fault::MissingBitstream => fs::remove_file(card.path("design.bin")).unwrap(),
        Fault::BitstreamIsDirectory => {
            fs::remove_file(card.path("design.bin")).unwrap();
            fs::create_dir(card.path("design.bin")).unwrap();
        }
        Fault::MissingDmaChannel => fs::remove_file(card.path("xdma0_h2c_2")).unwrap(),
        Fault::FullDmaChannel if full.exists() => config.dma_channel = full.into(),
        Fault::FullRegisterDevice if full.exists() => config.register_device = full.into(),
        Fault::TruncatedRegisterFile => {
            let bank = OpenOptions::new().write(true).open(card.path("xdma0_user")).unwrap();
            bank.set_len(0).unwrap();
        }
        Fault::FullDmaChannel | Fault::FullRegisterDevice => return false,
    }
    true
}

#[gtest]
#[rstest]
#[case::missing_bitstream(Fault::MissingBitstream, "RcfgError::FileNotFound")]
#[case::bitstream_is_directory(Fault::BitstreamIsDirectory, "RcfgError::FileReadError")]
#[case::missing_dma_channel(Fault::MissingDmaChannel, "RcfgError::DeviceUnavailable")]
#[case::full_dma_channel(Fault::FullDmaChannel, "RcfgError::IOTransfer")]
#[case::full_register_device(Fault::FullRegisterDevice, "RcfgError::IOWrite")]
#[case::truncated_register_file(Fault::TruncatedRegisterFile, "RcfgError::IORead")]
fn failed_load_reports_cause(#[case] fault: Fault, #[case] message: &str) {
    let card = FakeCard::new(0x1);
    write_bitstream(card.dir.path(), "design.bin", 256);
    let mut config = card.config();
    if !inject(&card, &mut config, &fault) {
        return;
    }
    let mut backend = XdmaHbicapBackend::open(config).unwrap();

    let result = backend.load(&card.path("design.bin"), false);

    expect_that!(result, err(displays_as(contains_substring(message))));
}
