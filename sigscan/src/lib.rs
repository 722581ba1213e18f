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

//! Scanner for literal byte patterns (signatures) that are anchored to the
//! start of the data, the end of the data or unbound.

mod constants;
mod enums;
mod scan_result;
mod scan_state;
mod scan_tree;
mod scanner;
mod signature;
mod skip_table;
mod types;

pub use constants::{MAXIMUM_PATTERN_OFFSET, MAXIMUM_PATTERN_SIZE};
pub use enums::{Codepage, PatternType};
pub use scan_result::ScanResult;
pub use scan_state::ScanState;
pub use scanner::Scanner;
pub use signature::Signature;
pub use types::SignatureReference;

/// Retrieves the version string.
pub fn get_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
