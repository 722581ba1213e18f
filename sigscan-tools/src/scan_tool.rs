/* Copyright 2024-2025 Joachim Metz <joachim.metz@gmail.com>
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License. You may
 * obtain a copy of the License at https://www.apache.org/licenses/LICENSE-2.0
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS, WITHOUT
 * WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied. See the
 * License for the specific language governing permissions and limitations
 * under the License.
 */

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::{Arc, RwLock};

use clap::Parser;
use clap_num::maybe_hex;

use sigscan_core::mediator::Mediator;
use sigscan_core::{DataStreamReference, ErrorTrace};

use sigscan::{ScanState, Scanner};

mod range_stream;
mod signature_definitions;

use range_stream::FileRangeDataStream;
use signature_definitions::SignatureDefinitions;

#[derive(Parser)]
#[command(version, about = "Scans a file for binary signatures", long_about = None)]
struct CommandLineArguments {
    #[arg(long, default_value_t = false)]
    /// Enable debug output
    debug: bool,

    #[arg(short, long, default_value_t = 0, value_parser = maybe_hex::<u64>)]
    /// Offset within the source file.
    offset: u64,

    /// Path of the signature definitions file
    definitions: PathBuf,

    /// Path of the source file
    source: PathBuf,
}

/// Scans the source file for the signatures in the definitions file.
fn scan_source(arguments: &CommandLineArguments, source: &str) -> Result<ScanState, ErrorTrace> {
    let mut signature_definitions: SignatureDefinitions = SignatureDefinitions::new();
    signature_definitions.read_file(&arguments.definitions)?;

    let mut scanner: Scanner = Scanner::new();
    signature_definitions.register(&mut scanner)?;
    scanner.prepare()?;

    let mut file_range_stream: FileRangeDataStream = FileRangeDataStream::new(arguments.offset);
    file_range_stream.open(source)?;

    let data_stream: DataStreamReference = Arc::new(RwLock::new(file_range_stream));

    let mut scan_state: ScanState = ScanState::new();
    scanner.scan_data_stream(&mut scan_state, &data_stream)?;

    Ok(scan_state)
}

fn main() -> ExitCode {
    let arguments = CommandLineArguments::parse();

    Mediator {
        debug_output: arguments.debug,
    }
    .make_current();

    let source: &str = match arguments.source.to_str() {
        Some(value) => value,
        None => {
            println!("Missing source");
            return ExitCode::FAILURE;
        }
    };
    let scan_state: ScanState = match scan_source(&arguments, source) {
        Ok(scan_state) => scan_state,
        Err(error) => {
            println!("Unable to scan file with error: {}", error);
            return ExitCode::FAILURE;
        }
    };
    if scan_state.get_number_of_results() == 0 {
        println!("No known signatures found");
        return ExitCode::SUCCESS;
    }
    println!("Signature matches:");
    for scan_result in scan_state.results().iter() {
        println!(
            "    offset: {} (0x{:08x}) identifier: {}",
            scan_result.get_offset(),
            scan_result.get_offset(),
            scan_result.get_identifier()
        );
    }
    println!();

    ExitCode::SUCCESS
}
