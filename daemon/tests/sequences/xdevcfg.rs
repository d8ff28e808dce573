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

use crate::common::test_functions::{FakeDevcfg, write_bitstream};
use googletest::prelude::*;
use rcfgd::ReconfigBackend;
use rcfgd::backends::{XdevcfgBackend, XdevcfgConfig};
use rstest::*;
use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::thread;

#[gtest]
#[rstest]
#[case::full(false)]
#[case::partial(true)]
fn successful_load_streams_bitstream(#[case] is_partial: bool) {
    let fake = FakeDevcfg::new();
    let (bitstream, data) = write_bitstream(fake.dir.path(), "design.bin", 10_000);
    let mut backend = XdevcfgBackend::new(fake.config());

    expect_that!(backend.load(&bitstream, is_partial), ok(eq(&())));

    expect_that!(fs::read(fake.path("xdevcfg")), ok(eq(&data)));
    fake.assert_clean();
}

#[gtest]
#[rstest]
#[case::missing_bitstream("bitstream", "FileNotFound")]
#[case::missing_control("xdevcfg", "DeviceUnavailable")]
#[case::missing_flag("is_partial_bitstream", "DeviceUnavailable")]
fn failed_partial_load_clears_flag(#[case] missing: &str, #[case] message: &str) {
    let fake = FakeDevcfg::new();
    let (bitstream, _) = write_bitstream(fake.dir.path(), "bitstream", 64);
    fs::remove_file(fake.path(missing)).unwrap();
    let mut backend = XdevcfgBackend::new(fake.config());

    let result = backend.load(&bitstream, true);

    expect_that!(result, err(displays_as(contains_substring(message))));
    fake.assert_clean();
}

#[gtest]
fn failing_control_writes_clear_flag() {
    if !Path::new("/dev/full").exists() {
        return;
    }
    let fake = FakeDevcfg::new();
    let (bitstream, _) = write_bitstream(fake.dir.path(), "design.bin", 64);
    let mut backend = XdevcfgBackend::new(XdevcfgConfig {
        control_device: PathBuf::from("/dev/full"),
        ..fake.config()
    });

    let result = backend.load(&bitstream, true);

    expect_that!(result, err(displays_as(contains_substring("IOTransfer"))));
    fake.assert_clean();
}

#[derive(Debug, PartialEq)]
enum Observed {
    Flag(String),
    Data(usize),
}

fn mkfifo(path: &Path) {
    let status = Command::new("mkfifo")
        .arg(path)
        .status()
        .unwrap_or_else(|_| panic!("mkfifo: failed to execute for {path:?}"));
    assert!(status.success(), "mkfifo {path:?} exited with {status:?}");
}

fn drain(path: &Path) -> Vec<u8> {
    let mut data = Vec::new();
    File::open(path).unwrap().read_to_end(&mut data).unwrap();
    data
}

/// Both the flag attribute and the control device are FIFOs. Each open blocks until the
/// other side opens too, so the observer sees the accesses in the order they happen.
#[gtest]
fn partial_flag_brackets_the_transfer() {
    let fake = FakeDevcfg::new();
    let (bitstream, data) = write_bitstream(fake.dir.path(), "design.bin", 5000);
    let flag = fake.path("is_partial_bitstream");
    let control = fake.path("xdevcfg");
    for node in [&flag, &control] {
        fs::remove_file(node).unwrap();
        mkfifo(node);
    }

    let observer = {
        let (flag, control) = (flag.clone(), control.clone());
        thread::spawn(move || {
            let mut seen = Vec::new();
            seen.push(Observed::Flag(String::from_utf8(drain(&flag)).unwrap()));
            seen.push(Observed::Data(drain(&control).len()));
            seen.push(Observed::Flag(String::from_utf8(drain(&flag)).unwrap()));
            seen
        })
    };
    let mut backend = XdevcfgBackend::new(fake.config());

    expect_that!(backend.load(&bitstream, true), ok(eq(&())));

    let seen = observer.join().unwrap();
    expect_that!(
        seen,
        elements_are![
            eq(&Observed::Flag("1".into())),
            eq(&Observed::Data(data.len())),
            eq(&Observed::Flag("0".into())),
        ]
    );
}
