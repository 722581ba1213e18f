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

/// Maximum supported pattern size.
pub const MAXIMUM_PATTERN_SIZE: usize = 32768;

/// Maximum supported anchor distance of a bound pattern.
pub const MAXIMUM_PATTERN_OFFSET: u64 = 16 * 1024 * 1024;

/// Buffer size used when scanning a data stream.
pub(super) const SCAN_BUFFER_SIZE: usize = 65536;
