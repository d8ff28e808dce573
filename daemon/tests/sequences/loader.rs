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
use rcfgd::BitstreamLoader;
use rcfgd::backends::FpgaManagerBackend;
use std::path::Path;

#[gtest]
fn loader_drives_injected_backend() {
    let fake = FakeManager::new("operating");
    let (bitstream, _) = write_bitstream(fake.dir.path(), "design.bin", 64);
    let mut loader = BitstreamLoader::new(FpgaManagerBackend::new(fake.config()));

    expect_that!(loader.load(&bitstream, true), ok(eq(&())));
    expect_that!(loader.kind().to_string(), eq("fpga_manager"));
    fake.assert_clean();
}

#[gtest]
fn empty_path_is_rejected_before_touching_anything() {
    let fake = FakeManager::new("operating");
    let mut loader = BitstreamLoader::new(FpgaManagerBackend::new(fake.config()));

    let result = loader.load(Path::new(""), true);

    let Err(e) = result else {
        panic!("expected an argument error");
    };
    expect_that!(e.errno(), eq(-22));
    expect_that!(
        std::fs::read_to_string(fake.attr("flags")),
        ok(eq("0"))
    );
}
