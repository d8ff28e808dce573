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

//! # rcfg
//!
//! Command-line client for the rcfgd daemon.
//!
//! ```bash
//! rcfg load /lib/firmware/design.bin
//! rcfg load --partial ./design_partial.bin
//! rcfg status
//! ```

mod load;
mod proxies;
mod status;

use crate::load::load_handler;
use crate::status::status_handler;
use clap::{Parser, Subcommand};
use log::{debug, error};
use std::error::Error;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "rcfg")]
#[command(bin_name = "rcfg")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Load a bitstream into the FPGA
    Load {
        /// Path to the bitstream file
        file: PathBuf,
        #[arg(
            long = "partial",
            help = "The bitstream reconfigures a partition of a running design"
        )]
        partial: bool,
    },
    /// Show the backend, fabric state and partial reconfiguration flag
    Status,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let cli = Cli::parse();
    debug!("parsed cli command with {cli:?}");
    let result = match cli.command {
        Commands::Load { file, partial } => load_handler(&file, partial).await,
        Commands::Status => status_handler().await,
    };
    match result {
        Ok(msg) => {
            println!("{msg}");
            Ok(())
        }
        Err(e) => {
            error!("{e}");
            Err(e.into())
        }
    }
}
