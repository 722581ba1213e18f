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

use super::enums::PatternType;

/// Signature.
///
/// The pattern offset is the normalized anchor distance, for a bound to end
/// signature it is the number of bytes before one-past-end of the data at
/// which the pattern starts.
#[derive(Debug, Eq, PartialEq)]
pub struct Signature {
    /// Identifier.
    pub identifier: String,

    /// Pattern type.
    pub pattern_type: PatternType,

    /// Pattern offset.
    pub pattern_offset: usize,

    /// Pattern.
    pub pattern: Vec<u8>,

    /// Pattern size.
    pub pattern_size: usize,
}

impl Signature {
    /// Creates a new signature.
    pub fn new(
        identifier: &str,
        pattern_type: PatternType,
        pattern_offset: usize,
        pattern: &[u8],
    ) -> Self {
        let pattern_size: usize = pattern.len();
        Self {
            identifier: identifier.to_string(),
            pattern_type: pattern_type,
            pattern_offset: pattern_offset,
            pattern: Vec::from(pattern),
            pattern_size: pattern_size,
        }
    }

    /// Scans a buffer for the signature pattern at its anchored offset.
    ///
    /// The data offset is the offset of the start of the buffer within the
    /// data. For an unbound signature the buffer offset determines the
    /// position that is checked, for a bound signature the position follows
    /// from the anchor.
    pub(super) fn scan_buffer(
        &self,
        data_offset: u64,
        data_size: u64,
        buffer: &[u8],
        buffer_offset: usize,
    ) -> bool {
        let pattern_offset: u64 = match self.pattern_type {
            PatternType::BoundToEnd => {
                if (self.pattern_offset as u64) > data_size {
                    return false;
                }
                data_size - self.pattern_offset as u64
            }
            PatternType::BoundToStart => self.pattern_offset as u64,
            PatternType::Unbound => data_offset + buffer_offset as u64,
        };
        if pattern_offset < data_offset {
            return false;
        }
        let scan_offset: usize = (pattern_offset - data_offset) as usize;
        let scan_end_offset: usize = scan_offset + self.pattern_size;

        if scan_end_offset > buffer.len() {
            return false;
        }
        if data_offset + (scan_end_offset as u64) > data_size {
            return false;
        }
        buffer[scan_offset..scan_end_offset] == self.pattern
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_buffer_with_bound_to_start_signature() {
        let signature: Signature = Signature::new(
            "qcow3",
            PatternType::BoundToStart,
            0,
            &[0x51, 0x46, 0x49, 0xfb, 0x00, 0x00, 0x00, 0x03],
        );
        let test_data: [u8; 8] = [0x51, 0x46, 0x49, 0xfb, 0x00, 0x00, 0x00, 0x03];

        // Test match at data offset 0.
        let result: bool = signature.scan_buffer(0, 64, &test_data, 0);
        assert_eq!(result, true);

        // Test match at data offset 8.
        let result: bool = signature.scan_buffer(8, 64, &test_data, 0);
        assert_eq!(result, false);

        // Test buffer too small for pattern.
        let result: bool = signature.scan_buffer(0, 64, &test_data[0..7], 0);
        assert_eq!(result, false);

        // Test data size too small for pattern.
        let result: bool = signature.scan_buffer(0, 7, &test_data, 0);
        assert_eq!(result, false);

        let test_data: [u8; 8] = [0x63, 0x6f, 0x6e, 0x65, 0x63, 0x74, 0x69, 0x78];

        // Test no match.
        let result: bool = signature.scan_buffer(0, 64, &test_data, 0);
        assert_eq!(result, false);
    }

    #[test]
    fn test_scan_buffer_with_bound_to_end_signature() {
        let signature: Signature = Signature::new(
            "vhd1",
            PatternType::BoundToEnd,
            16,
            &[0x63, 0x6f, 0x6e, 0x65, 0x63, 0x74, 0x69, 0x78],
        );
        let test_data: [u8; 16] = [
            0x63, 0x6f, 0x6e, 0x65, 0x63, 0x74, 0x69, 0x78, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            0x00, 0x00,
        ];

        // Test match with the pattern 16 bytes before the end of the data.
        let result: bool = signature.scan_buffer(0, 16, &test_data, 0);
        assert_eq!(result, true);

        // Test no match with a different data size.
        let result: bool = signature.scan_buffer(0, 24, &test_data, 0);
        assert_eq!(result, false);

        // Test anchor distance larger than the data size.
        let result: bool = signature.scan_buffer(0, 8, &test_data, 0);
        assert_eq!(result, false);
    }

    #[test]
    fn test_scan_buffer_with_unbound_signature() {
        let signature: Signature =
            Signature::new("test1", PatternType::Unbound, 0, "NEEDLE".as_bytes());
        let test_data: &[u8] = "12NEEDLE34".as_bytes();

        let result: bool = signature.scan_buffer(0, 10, &test_data, 2);
        assert_eq!(result, true);

        let result: bool = signature.scan_buffer(0, 10, &test_data, 3);
        assert_eq!(result, false);

        // Test buffer offset too close to the end of the buffer.
        let result: bool = signature.scan_buffer(0, 10, &test_data, 5);
        assert_eq!(result, false);
    }

    #[test]
    fn test_equality() {
        let first_signature: Signature =
            Signature::new("test1", PatternType::Unbound, 0, "NEEDLE".as_bytes());
        let second_signature: Signature =
            Signature::new("test2", PatternType::Unbound, 0, "NEEDLE".as_bytes());

        // Signatures with the same pattern but different identifiers are distinct.
        assert_ne!(first_signature, second_signature);
    }
}
