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

use super::types::SignatureReference;

/// Scan result.
#[derive(Debug)]
pub struct ScanResult {
    /// Signature.
    pub signature: SignatureReference,

    /// Offset of the pattern within the data.
    pub data_offset: u64,
}

impl ScanResult {
    /// Creates a new scan result.
    pub(super) fn new(signature: SignatureReference, data_offset: u64) -> Self {
        Self {
            signature: signature,
            data_offset: data_offset,
        }
    }

    /// Retrieves the identifier of the matched signature.
    pub fn get_identifier(&self) -> &str {
        self.signature.identifier.as_str()
    }

    /// Retrieves the offset of the pattern within the data.
    pub fn get_offset(&self) -> u64 {
        self.data_offset
    }
}
