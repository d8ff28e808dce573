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

use crate::common::test_functions::{FakeManager, write_bitstream};
use googletest::prelude::*;
use rcfgd::RcfgError;
use rcfgd::ReconfigBackend;
use rcfgd::backends::FpgaManagerBackend;
use rstest::*;
use std::fs;
use std::path::PathBuf;

#[gtest]
#[rstest]
#[case::full(false)]
#[case::partial(true)]
fn successful_load_leaves_nothing_behind(#[case] is_partial: bool) {
    let fake = FakeManager::new("operating\n");
    let (bitstream, _) = write_bitstream(fake.dir.path(), "design.bin", 256);
    let mut backend = FpgaManagerBackend::new(fake.config());

    expect_that!(backend.load(&bitstream, is_partial), ok(eq(&())));

    expect_that!(
        fs::read_to_string(fake.attr("firmware")),
        ok(eq("rcfgd_bitstream"))
    );
    fake.assert_clean();
}

enum Fault {
    MissingBitstream,
    MissingFirmwareDir,
    MissingFlagsAttr,
    MissingFirmwareAttr,
    FabricError,
    MissingStateAttr,
}

fn inject(fake: &FakeManager, fault: &Fault) {
    match fault {
        Fault::MissingBitstream => fs::remove_file(fake.dir.path().join("design.bin")).unwrap(),
        Fault::MissingFirmwareDir => fs::remove_dir(fake.firmware_dir()).unwrap(),
        Fault::MissingFlagsAttr => fs::remove_file(fake.attr("flags")).unwrap(),
        Fault::MissingFirmwareAttr => fs::remove_file(fake.attr("firmware")).unwrap(),
        Fault::FabricError => fs::write(fake.attr("state"), "error").unwrap(),
        Fault::MissingStateAttr => fs::remove_file(fake.attr("state")).unwrap(),
    }
}

#[gtest]
#[rstest]
#[case::missing_bitstream(Fault::MissingBitstream, "FileNotFound")]
#[case::missing_firmware_dir(Fault::MissingFirmwareDir, "IOCreate")]
#[case::missing_flags_attr(Fault::MissingFlagsAttr, "DeviceUnavailable")]
#[case::missing_firmware_attr(Fault::MissingFirmwareAttr, "DeviceUnavailable")]
#[case::fabric_error(Fault::FabricError, "FPGA state is not as expected: 'error'")]
#[case::missing_state_attr(Fault::MissingStateAttr, "DeviceUnavailable")]
fn failed_partial_load_cleans_up(#[case] fault: Fault, #[case] message: &str) {
    let fake = FakeManager::new("operating");
    let (bitstream, _) = write_bitstream(fake.dir.path(), "design.bin", 64);
    let mut backend = FpgaManagerBackend::new(fake.config());
    inject(&fake, &fault);

    let result = backend.load(&bitstream, true);

    expect_that!(result, err(displays_as(contains_substring(message))));
    fake.assert_clean();
}

#[gtest]
fn state_failure_carries_observed_state() {
    let fake = FakeManager::new("write init error\n");
    let (bitstream, _) = write_bitstream(fake.dir.path(), "design.bin", 64);
    let mut backend = FpgaManagerBackend::new(fake.config());

    match backend.load(&bitstream, false) {
        Err(RcfgError::StateValidationFailure(state)) => {
            expect_that!(state, eq("write init error"));
        }
        other => panic!("expected a state validation failure, got {other:?}"),
    }
    fake.assert_clean();
}

#[gtest]
fn relative_bitstream_path_is_linked_absolutely() {
    let fake = FakeManager::new("operating");
    let (bitstream, _) = write_bitstream(fake.dir.path(), "design.bin", 64);
    let cwd = std::env::current_dir().unwrap();
    let relative: PathBuf = pathdiff(&bitstream, &cwd);
    let mut backend = FpgaManagerBackend::new(fake.config());

    expect_that!(backend.load(&relative, false), ok(eq(&())));
    fake.assert_clean();
}

/// `target` relative to `base`, going up as many levels as needed.
fn pathdiff(target: &std::path::Path, base: &std::path::Path) -> PathBuf {
    let common = target
        .components()
        .zip(base.components())
        .take_while(|(a, b)| a == b)
        .count();
    let mut relative = PathBuf::new();
    for _ in base.components().skip(common) {
        relative.push("..");
    }
    for part in target.components().skip(common) {
        relative.push(part);
    }
    relative
}
