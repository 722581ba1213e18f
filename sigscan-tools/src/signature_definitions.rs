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

use std::fs;
use std::path::PathBuf;

use sigscan_core::{ErrorKind, ErrorTrace};

use sigscan::{PatternType, Scanner};

/// Signature definition.
pub struct SignatureDefinition {
    /// Identifier.
    pub identifier: String,

    /// Pattern type.
    pub pattern_type: PatternType,

    /// Pattern offset.
    pub pattern_offset: i64,

    /// Pattern.
    pub pattern: Vec<u8>,
}

/// Signature definitions.
///
/// Definitions are read from a plain text file with one signature per
/// non-comment line:
///
/// ```text
/// # identifier  anchor  offset  pattern
/// qcow1         start   0       514649fb00000001
/// udif1         end     -512    6b6f6c79
/// lnk1          unbound 0       4c000000
/// ```
///
/// The anchor is one of "start", "end" or "unbound" and the pattern is a
/// hexadecimal string.
pub struct SignatureDefinitions {
    /// The definitions.
    pub definitions: Vec<SignatureDefinition>,
}

impl SignatureDefinitions {
    /// Creates new signature definitions.
    pub fn new() -> Self {
        Self {
            definitions: Vec::new(),
        }
    }

    /// Reads signature definitions from a file.
    pub fn read_file(&mut self, path: &PathBuf) -> Result<(), ErrorTrace> {
        let text: String = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(error) => {
                return Err(sigscan_core::error_trace_new_with_error!(
                    ErrorKind::IoOpenFailed,
                    "Unable to read signature definitions file",
                    error
                ));
            }
        };
        if let Err(mut error) = self.read_string(&text) {
            sigscan_core::error_trace_add_frame!(
                error,
                format!("Unable to read signature definitions from: {}", path.display())
            );
            return Err(error);
        }
        Ok(())
    }

    /// Reads signature definitions from a string.
    pub fn read_string(&mut self, text: &str) -> Result<(), ErrorTrace> {
        for (line_index, line) in text.lines().enumerate() {
            let line: &str = line.trim();

            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let definition: SignatureDefinition = match Self::parse_line(line) {
                Ok(definition) => definition,
                Err(mut error) => {
                    sigscan_core::error_trace_add_frame!(
                        error,
                        format!("Invalid signature definition on line: {}", line_index + 1)
                    );
                    return Err(error);
                }
            };
            self.definitions.push(definition);
        }
        Ok(())
    }

    /// Parses a signature definition line.
    fn parse_line(line: &str) -> Result<SignatureDefinition, ErrorTrace> {
        let segments: Vec<&str> = line.split_whitespace().collect();

        if segments.len() != 4 {
            return Err(sigscan_core::error_trace_new!(
                ErrorKind::InputInvalidData,
                format!("Unsupported number of segments: {}", segments.len())
            ));
        }
        let pattern_type: PatternType = match segments[1] {
            "start" => PatternType::BoundToStart,
            "end" => PatternType::BoundToEnd,
            "unbound" => PatternType::Unbound,
            _ => {
                return Err(sigscan_core::error_trace_new!(
                    ErrorKind::InputInvalidData,
                    format!("Unsupported anchor: {}", segments[1])
                ));
            }
        };
        let pattern_offset: i64 = match segments[2].parse::<i64>() {
            Ok(pattern_offset) => pattern_offset,
            Err(error) => {
                return Err(sigscan_core::error_trace_new_with_error!(
                    ErrorKind::InputInvalidData,
                    format!("Unsupported offset: {}", segments[2]),
                    error
                ));
            }
        };
        let pattern: Vec<u8> = Self::parse_pattern(segments[3])?;

        Ok(SignatureDefinition {
            identifier: segments[0].to_string(),
            pattern_type: pattern_type,
            pattern_offset: pattern_offset,
            pattern: pattern,
        })
    }

    /// Parses a hexadecimal pattern string.
    fn parse_pattern(text: &str) -> Result<Vec<u8>, ErrorTrace> {
        if !text.is_ascii() {
            return Err(sigscan_core::error_trace_new!(
                ErrorKind::InputInvalidData,
                format!("Unsupported pattern: {} contains non-ASCII characters", text)
            ));
        }
        if text.len() % 2 != 0 {
            return Err(sigscan_core::error_trace_new!(
                ErrorKind::InputInvalidData,
                format!("Unsupported pattern: {} size not a multiple of 2", text)
            ));
        }
        let mut pattern: Vec<u8> = Vec::with_capacity(text.len() / 2);

        for byte_index in (0..text.len()).step_by(2) {
            let byte_value: u8 = match u8::from_str_radix(&text[byte_index..byte_index + 2], 16) {
                Ok(byte_value) => byte_value,
                Err(error) => {
                    return Err(sigscan_core::error_trace_new_with_error!(
                        ErrorKind::InputInvalidData,
                        format!("Unsupported pattern: {}", text),
                        error
                    ));
                }
            };
            pattern.push(byte_value);
        }
        Ok(pattern)
    }

    /// Registers the definitions on a scanner.
    pub fn register(&self, scanner: &mut Scanner) -> Result<(), ErrorTrace> {
        for definition in self.definitions.iter() {
            if let Err(mut error) = scanner.add_signature(
                definition.identifier.as_str(),
                definition.pattern_type.clone(),
                definition.pattern_offset,
                &definition.pattern,
            ) {
                sigscan_core::error_trace_add_frame!(
                    error,
                    format!("Unable to add signature: {}", definition.identifier)
                );
                return Err(error);
            }
        }
        Ok(())
    }
}
