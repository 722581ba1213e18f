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
use std::io::SeekFrom;
use std::sync::Arc;

use sigscan_core::{DataStreamReference, ErrorKind, ErrorTrace};

use super::constants::{MAXIMUM_PATTERN_OFFSET, MAXIMUM_PATTERN_SIZE, SCAN_BUFFER_SIZE};
use super::enums::{Codepage, PatternType, ScanStage};
use super::scan_state::ScanState;
use super::scan_tree::ScanTree;
use super::signature::Signature;
use super::types::SignatureReference;

/// Signature scanner.
///
/// Signatures are registered with [`Scanner::add_signature`] and compiled
/// into scan trees with [`Scanner::prepare`]. A prepared scanner is
/// immutable and can be shared between threads, each scan uses its own
/// [`ScanState`].
pub struct Scanner {
    /// Signatures in registration order.
    pub(super) signatures: Vec<SignatureReference>,

    /// Signature registration index per identifier.
    signature_identifiers: HashMap<String, usize>,

    /// Header (offset relative from start) scan tree.
    pub(super) header_scan_tree: ScanTree,

    /// Footer (offset relative from end) scan tree.
    pub(super) footer_scan_tree: ScanTree,

    /// Unbound scan tree.
    pub(super) unbound_scan_tree: ScanTree,

    /// ASCII codepage, an advisory hint about the scanned data.
    ascii_codepage: Codepage,

    /// Value to indicate the scan trees have been built.
    prepared: bool,
}

impl Scanner {
    /// Creates a new scanner.
    pub fn new() -> Self {
        Self {
            signatures: Vec::new(),
            signature_identifiers: HashMap::new(),
            header_scan_tree: ScanTree::new(PatternType::BoundToStart),
            footer_scan_tree: ScanTree::new(PatternType::BoundToEnd),
            unbound_scan_tree: ScanTree::new(PatternType::Unbound),
            ascii_codepage: Codepage::Windows1252,
            prepared: false,
        }
    }

    /// Adds a new signature.
    ///
    /// The pattern offset of a bound to start signature must not be
    /// negative, that of a bound to end signature must not be positive, it
    /// is the negated distance between the start of the pattern and
    /// one-past-end of the data. The pattern offset of an unbound signature
    /// is ignored.
    pub fn add_signature(
        &mut self,
        identifier: &str,
        pattern_type: PatternType,
        pattern_offset: i64,
        pattern: &[u8],
    ) -> Result<(), ErrorTrace> {
        if identifier.is_empty() {
            return Err(sigscan_core::error_trace_new!(
                ErrorKind::ArgumentInvalidValue,
                "Invalid identifier value empty"
            ));
        }
        if pattern.is_empty() {
            return Err(sigscan_core::error_trace_new!(
                ErrorKind::ArgumentInvalidValue,
                "Invalid pattern value empty"
            ));
        }
        if pattern.len() > MAXIMUM_PATTERN_SIZE {
            return Err(sigscan_core::error_trace_new!(
                ErrorKind::ArgumentValueExceedsMaximum,
                format!("Invalid pattern size value exceeds maximum: {}", MAXIMUM_PATTERN_SIZE)
            ));
        }
        if self.signature_identifiers.contains_key(identifier) {
            return Err(sigscan_core::error_trace_new!(
                ErrorKind::RuntimeValueAlreadySet,
                format!("Invalid identifier: {} value already set", identifier)
            ));
        }
        let normalized_pattern_offset: u64 = match pattern_type {
            PatternType::BoundToStart => {
                if pattern_offset < 0 {
                    return Err(sigscan_core::error_trace_new!(
                        ErrorKind::RuntimeUnsupportedValue,
                        "Invalid pattern offset value negative for bound to start signature"
                    ));
                }
                pattern_offset as u64
            }
            PatternType::BoundToEnd => {
                if pattern_offset > 0 {
                    return Err(sigscan_core::error_trace_new!(
                        ErrorKind::RuntimeUnsupportedValue,
                        "Invalid pattern offset value positive for bound to end signature"
                    ));
                }
                pattern_offset.unsigned_abs()
            }
            PatternType::Unbound => 0,
        };
        if normalized_pattern_offset > MAXIMUM_PATTERN_OFFSET {
            return Err(sigscan_core::error_trace_new!(
                ErrorKind::ArgumentValueExceedsMaximum,
                format!(
                    "Invalid pattern offset value exceeds maximum: {}",
                    MAXIMUM_PATTERN_OFFSET
                )
            ));
        }
        let signature: Signature = Signature::new(
            identifier,
            pattern_type,
            normalized_pattern_offset as usize,
            pattern,
        );
        self.signature_identifiers
            .insert(identifier.to_string(), self.signatures.len());
        self.signatures.push(Arc::new(signature));

        self.prepared = false;

        Ok(())
    }

    /// Retrieves the number of signatures.
    pub fn get_number_of_signatures(&self) -> usize {
        self.signatures.len()
    }

    /// Retrieves the registration index of a signature.
    pub(super) fn get_signature_index(&self, signature: &SignatureReference) -> usize {
        match self.signature_identifiers.get(&signature.identifier) {
            Some(signature_index) => *signature_index,
            None => usize::MAX,
        }
    }

    /// Prepares the scanner, building a scan tree per anchor group.
    ///
    /// Preparing an already prepared scanner has no effect.
    pub fn prepare(&mut self) -> Result<(), ErrorTrace> {
        if self.prepared {
            return Ok(());
        }
        self.header_scan_tree = ScanTree::new(PatternType::BoundToStart);
        self.footer_scan_tree = ScanTree::new(PatternType::BoundToEnd);
        self.unbound_scan_tree = ScanTree::new(PatternType::Unbound);

        self.header_scan_tree.build(&self.signatures);
        self.footer_scan_tree.build(&self.signatures);
        self.unbound_scan_tree.build(&self.signatures);

        self.prepared = true;

        Ok(())
    }

    /// Scans a buffer of data.
    ///
    /// Successive calls scan successive parts of the same data, the scan
    /// state tracks the position. [`Scanner::scan_finalize`] ends the scan
    /// and makes the results retrievable.
    pub fn scan_buffer(
        &self,
        scan_state: &mut ScanState,
        data: &[u8],
    ) -> Result<(), ErrorTrace> {
        if !self.prepared {
            return Err(sigscan_core::error_trace_new!(
                ErrorKind::RuntimeValueMissing,
                "Invalid scanner missing scan trees, prepare the scanner before scanning"
            ));
        }
        if scan_state.stage == ScanStage::Done {
            return Err(sigscan_core::error_trace_new!(
                ErrorKind::RuntimeValueAlreadySet,
                "Invalid scan state already finalized"
            ));
        }
        if scan_state.is_abort_requested() {
            scan_state.abort(self);

            return Err(sigscan_core::error_trace_new!(
                ErrorKind::RuntimeAbortRequested,
                "Abort requested"
            ));
        }
        scan_state.process_buffer(self, data);

        Ok(())
    }

    /// Finalizes a scan.
    ///
    /// The size of the data is the number of bytes scanned. The matches of
    /// signatures bound to the end of the data are determined and the
    /// results are made retrievable.
    pub fn scan_finalize(&self, scan_state: &mut ScanState) -> Result<(), ErrorTrace> {
        if !self.prepared {
            return Err(sigscan_core::error_trace_new!(
                ErrorKind::RuntimeValueMissing,
                "Invalid scanner missing scan trees, prepare the scanner before scanning"
            ));
        }
        if scan_state.stage == ScanStage::Done {
            return Err(sigscan_core::error_trace_new!(
                ErrorKind::RuntimeValueAlreadySet,
                "Invalid scan state already finalized"
            ));
        }
        if let Err(mut error) = scan_state.finalize(self) {
            sigscan_core::error_trace_add_frame!(error, "Unable to finalize scan state");
            return Err(error);
        }
        Ok(())
    }

    /// Scans a data stream.
    ///
    /// The data stream is scanned from start to end in fixed size buffers
    /// and the scan is finalized.
    pub fn scan_data_stream(
        &self,
        scan_state: &mut ScanState,
        data_stream: &DataStreamReference,
    ) -> Result<(), ErrorTrace> {
        let data_size: u64 = sigscan_core::data_stream_get_size!(data_stream);

        let mut data: Vec<u8> = vec![0; SCAN_BUFFER_SIZE];
        let mut data_offset: u64 = 0;

        while data_offset < data_size {
            let read_size: usize = min(SCAN_BUFFER_SIZE as u64, data_size - data_offset) as usize;

            sigscan_core::data_stream_read_exact_at_position!(
                data_stream,
                &mut data[0..read_size],
                SeekFrom::Start(data_offset)
            );
            self.scan_buffer(scan_state, &data[0..read_size])?;

            data_offset += read_size as u64;
        }
        self.scan_finalize(scan_state)
    }

    /// Retrieves the ASCII codepage.
    pub fn get_ascii_codepage(&self) -> Codepage {
        self.ascii_codepage
    }

    /// Sets the ASCII codepage.
    pub fn set_ascii_codepage(&mut self, codepage: Codepage) {
        self.ascii_codepage = codepage;
    }
}
