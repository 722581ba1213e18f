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

use std::cmp::min;
use std::collections::HashMap;

use super::types::SignatureReference;

/// Skip table.
///
/// Multi-pattern Boyer-Moore-Horspool bad character table over the first
/// smallest_pattern_size bytes of every pattern. The skip value of the byte
/// value observed at the last position of the scan window is a safe number
/// of positions to advance, it never skips a position where a pattern can
/// start.
#[derive(Debug)]
pub(super) struct SkipTable {
    /// Smallest pattern size.
    pub smallest_pattern_size: usize,

    /// Skip values.
    pub skip_values: HashMap<u8, usize>,
}

impl SkipTable {
    /// Creates a new skip table.
    pub fn new() -> Self {
        Self {
            smallest_pattern_size: 0,
            skip_values: HashMap::new(),
        }
    }

    /// Fills the skip table.
    pub fn fill(&mut self, signatures: &Vec<SignatureReference>) {
        for signature in signatures.iter() {
            self.smallest_pattern_size = if self.smallest_pattern_size == 0 {
                signature.pattern_size
            } else {
                min(signature.pattern_size, self.smallest_pattern_size)
            };
        }
        for signature in signatures.iter() {
            // The skip value of a byte value is determined by its rightmost
            // occurrence in the first smallest_pattern_size - 1 bytes of any
            // pattern. The last position of the window is excluded so that
            // skip values are always at least 1.
            let fill_size: usize = self.smallest_pattern_size - 1;

            for (pattern_index, byte_value) in signature.pattern[0..fill_size].iter().enumerate() {
                let skip_value: usize = fill_size - pattern_index;

                let insert_skip_value: bool = match self.skip_values.get(byte_value) {
                    Some(skip_table_value) => skip_value < *skip_table_value,
                    None => true,
                };
                if insert_skip_value {
                    self.skip_values.insert(*byte_value, skip_value);
                }
            }
        }
    }

    /// Retrieves a skip value.
    ///
    /// Byte values that do not occur in any pattern window skip the full
    /// window.
    pub fn get_skip_value(&self, byte_value: &u8) -> usize {
        match self.skip_values.get(byte_value) {
            Some(skip_value) => *skip_value,
            None => self.smallest_pattern_size,
        }
    }
}
