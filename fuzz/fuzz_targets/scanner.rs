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

#![no_main]

use libfuzzer_sys::fuzz_target;

use sigscan::{PatternType, ScanState, Scanner};

// Signature scanner fuzz target.
fuzz_target!(|data: &[u8]| {
    let mut scanner: Scanner = Scanner::new();
    _ = scanner.add_signature("test1", PatternType::BoundToStart, 13, "FuZzInG".as_bytes());
    _ = scanner.add_signature("test2", PatternType::BoundToEnd, -13, "OsSFuZz".as_bytes());
    _ = scanner.prepare();

    let mut scan_state: ScanState = ScanState::new();
    _ = scanner.scan_buffer(&mut scan_state, &data);
    _ = scanner.scan_finalize(&mut scan_state);

    _ = scan_state.get_number_of_results();
});
