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
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use sigscan_core::{ErrorKind, ErrorTrace};

use super::enums::ScanStage;
use super::scan_result::ScanResult;
use super::scan_tree::ScanTree;
use super::scanner::Scanner;
use super::types::SignatureReference;

/// Scan state.
///
/// Tracks a single pass over a stream of data that is provided as one or
/// more successive buffers. The total size of the data does not need to be
/// known until the scan is finalized, which releases the matches of
/// signatures that are bound to the end of the data.
pub struct ScanState {
    /// Stage of the scan.
    pub(super) stage: ScanStage,

    /// Offset of the next byte of data to scan.
    data_offset: u64,

    /// Size of the data, known once the scan is finalized.
    data_size: Option<u64>,

    /// Size of the header range, the spanning range of the signatures bound
    /// to the start of the data.
    header_range_size: usize,

    /// Size of the footer range, the spanning range of the signatures bound
    /// to the end of the data.
    footer_range_size: usize,

    /// Size of the unbound range, the largest unbound pattern size.
    unbound_range_size: usize,

    /// The first header range of the data.
    header_buffer: Vec<u8>,

    /// Rolling buffer of the last footer range of the data.
    footer_buffer: Vec<u8>,

    /// Rolling tail of the data, long enough to complete an unbound match
    /// that crosses a buffer boundary.
    active_window: Vec<u8>,

    /// Matches of signatures bound to the start of the data.
    header_results: Vec<ScanResult>,

    /// Matches of unbound signatures.
    unbound_results: Vec<ScanResult>,

    /// Matches of signatures bound to the end of the data.
    footer_results: Vec<ScanResult>,

    /// Ordered results, assembled when the scan ends.
    results: Vec<ScanResult>,

    /// Abort flag, polled at buffer boundaries.
    abort_flag: Option<Arc<AtomicBool>>,
}

impl ScanState {
    /// Creates a new scan state.
    pub fn new() -> Self {
        Self {
            stage: ScanStage::Fresh,
            data_offset: 0,
            data_size: None,
            header_range_size: 0,
            footer_range_size: 0,
            unbound_range_size: 0,
            header_buffer: Vec::new(),
            footer_buffer: Vec::new(),
            active_window: Vec::new(),
            header_results: Vec::new(),
            unbound_results: Vec::new(),
            footer_results: Vec::new(),
            results: Vec::new(),
            abort_flag: None,
        }
    }

    /// Sets the abort flag.
    ///
    /// The flag is shared with the caller, setting it aborts the scan at the
    /// next buffer boundary.
    pub fn set_abort_flag(&mut self, abort_flag: &Arc<AtomicBool>) {
        self.abort_flag = Some(Arc::clone(abort_flag));
    }

    /// Retrieves the number of results.
    pub fn get_number_of_results(&self) -> usize {
        self.results.len()
    }

    /// Retrieves a specific result.
    pub fn get_result(&self, result_index: usize) -> Result<&ScanResult, ErrorTrace> {
        match self.results.get(result_index) {
            Some(scan_result) => Ok(scan_result),
            None => Err(sigscan_core::error_trace_new!(
                ErrorKind::RuntimeValueOutOfBounds,
                format!("Invalid result index: {} value out of bounds", result_index)
            )),
        }
    }

    /// Retrieves the results.
    pub fn results(&self) -> &Vec<ScanResult> {
        &self.results
    }

    /// Retrieves the size of the data, known once the scan was finalized.
    pub fn get_data_size(&self) -> Option<u64> {
        self.data_size
    }

    /// Determines if an abort was requested.
    pub(super) fn is_abort_requested(&self) -> bool {
        match &self.abort_flag {
            Some(abort_flag) => abort_flag.load(Ordering::Relaxed),
            None => false,
        }
    }

    /// Aborts the scan, the results so far remain retrievable.
    pub(super) fn abort(&mut self, scanner: &Scanner) {
        if self.stage != ScanStage::Done {
            self.assemble_results(scanner);
            self.stage = ScanStage::Done;
        }
    }

    /// Starts the scan, sizing the buffers from the prepared scan trees.
    fn start(&mut self, scanner: &Scanner) {
        let (_, header_end_offset): (usize, usize) =
            scanner.header_scan_tree.get_spanning_range();
        let (_, footer_end_offset): (usize, usize) =
            scanner.footer_scan_tree.get_spanning_range();
        let (_, unbound_end_offset): (usize, usize) =
            scanner.unbound_scan_tree.get_spanning_range();

        self.header_range_size = header_end_offset;
        self.footer_range_size = footer_end_offset;
        self.unbound_range_size = unbound_end_offset;

        self.header_buffer = Vec::with_capacity(self.header_range_size);

        self.stage = ScanStage::InHeader;
    }

    /// Processes a buffer of data.
    pub(super) fn process_buffer(&mut self, scanner: &Scanner, data: &[u8]) {
        if self.stage == ScanStage::Fresh {
            self.start(scanner);
        }
        if self.stage == ScanStage::InHeader {
            if self.header_buffer.len() < self.header_range_size {
                let read_size: usize =
                    min(self.header_range_size - self.header_buffer.len(), data.len());
                self.header_buffer.extend_from_slice(&data[0..read_size]);
            }
            if self.header_buffer.len() >= self.header_range_size {
                self.evaluate_header_scan_tree(scanner, u64::MAX);
                self.stage = ScanStage::Body;
            }
        }
        if scanner.unbound_scan_tree.has_signatures() {
            self.scan_unbound(scanner, data);
        }
        if self.footer_range_size > 0 {
            self.update_footer_buffer(data);
        }
        self.data_offset += data.len() as u64;
    }

    /// Finalizes the scan.
    ///
    /// The size of the data is the number of bytes that were provided. The
    /// end-relative scan tree is evaluated against the footer range and the
    /// results are assembled in reporting order.
    pub(super) fn finalize(&mut self, scanner: &Scanner) -> Result<(), ErrorTrace> {
        if self.stage == ScanStage::Fresh {
            self.start(scanner);
        }
        let data_size: u64 = self.data_offset;
        self.data_size = Some(data_size);

        if self.stage == ScanStage::InHeader {
            // The data is smaller than the header range, evaluate against
            // the available prefix.
            self.evaluate_header_scan_tree(scanner, data_size);
            self.stage = ScanStage::Body;
        }
        self.stage = ScanStage::InFooter;
        self.evaluate_footer_scan_tree(scanner, data_size);

        self.assemble_results(scanner);
        self.stage = ScanStage::Done;

        Ok(())
    }

    /// Evaluates the start-relative scan tree against the header buffer.
    fn evaluate_header_scan_tree(&mut self, scanner: &Scanner, data_size: u64) {
        if !scanner.header_scan_tree.has_signatures() {
            return;
        }
        let mut signatures: Vec<SignatureReference> = Vec::new();
        scanner.header_scan_tree.root_node.scan_buffer(
            0,
            data_size,
            &self.header_buffer,
            0,
            &mut signatures,
        );
        for signature in signatures.drain(..) {
            let pattern_offset: u64 = signature.pattern_offset as u64;
            self.header_results
                .push(ScanResult::new(signature, pattern_offset));
        }
    }

    /// Evaluates the end-relative scan tree against the footer buffer.
    fn evaluate_footer_scan_tree(&mut self, scanner: &Scanner, data_size: u64) {
        if !scanner.footer_scan_tree.has_signatures() {
            return;
        }
        let buffer_size: usize = self.footer_buffer.len();

        // The footer range ends at one-past-end of the data. When the data
        // is smaller than the range the window extends before the start of
        // the data and the buffer offset is negative.
        let data_offset: u64 = data_size - buffer_size as u64;
        let buffer_offset: isize = buffer_size as isize - self.footer_range_size as isize;

        let mut signatures: Vec<SignatureReference> = Vec::new();
        scanner.footer_scan_tree.root_node.scan_buffer(
            data_offset,
            data_size,
            &self.footer_buffer,
            buffer_offset,
            &mut signatures,
        );
        for signature in signatures.drain(..) {
            let pattern_offset: u64 = data_size - signature.pattern_offset as u64;
            self.footer_results
                .push(ScanResult::new(signature, pattern_offset));
        }
    }

    /// Scans a buffer of data for unbound signatures.
    ///
    /// The buffer is scanned together with the retained tail of the previous
    /// buffer so that matches crossing the buffer boundary are found.
    fn scan_unbound(&mut self, scanner: &Scanner, data: &[u8]) {
        let window_data_offset: u64 = self.data_offset - self.active_window.len() as u64;

        let mut window: Vec<u8> = Vec::with_capacity(self.active_window.len() + data.len());
        window.extend_from_slice(&self.active_window);
        window.extend_from_slice(data);

        self.scan_unbound_window(scanner, &window, window_data_offset);

        let retain_size: usize = min(self.unbound_range_size.saturating_sub(1), window.len());
        self.active_window = window[window.len() - retain_size..].to_vec();
    }

    /// Scans a window of data for unbound signatures.
    fn scan_unbound_window(&mut self, scanner: &Scanner, window: &[u8], window_data_offset: u64) {
        let scan_tree: &ScanTree = &scanner.unbound_scan_tree;

        let smallest_pattern_size: usize = scan_tree.skip_table.smallest_pattern_size;
        let buffer_size: usize = window.len();

        if smallest_pattern_size == 0 || buffer_size < smallest_pattern_size {
            return;
        }
        let mut buffer_offset: usize = 0;
        let mut signatures: Vec<SignatureReference> = Vec::new();

        while buffer_offset <= buffer_size - smallest_pattern_size {
            signatures.clear();
            scan_tree.root_node.scan_buffer(
                window_data_offset,
                u64::MAX,
                window,
                buffer_offset as isize,
                &mut signatures,
            );
            let skip_value: usize = if signatures.is_empty() {
                let byte_value: u8 = window[buffer_offset + smallest_pattern_size - 1];
                scan_tree.skip_table.get_skip_value(&byte_value)
            } else {
                for signature in signatures.drain(..) {
                    self.append_unbound_result(
                        signature,
                        window_data_offset + buffer_offset as u64,
                    );
                }
                // Advance a single position, overlapping matches are kept.
                1
            };
            buffer_offset += skip_value;
        }
    }

    /// Appends an unbound result, suppressing duplicates.
    ///
    /// Positions in the retained tail are scanned again with the next buffer,
    /// a match at such a position can be found twice.
    fn append_unbound_result(&mut self, signature: SignatureReference, data_offset: u64) {
        for scan_result in self.unbound_results.iter() {
            if scan_result.data_offset == data_offset
                && Arc::ptr_eq(&scan_result.signature, &signature)
            {
                return;
            }
        }
        self.unbound_results
            .push(ScanResult::new(signature, data_offset));
    }

    /// Updates the rolling footer buffer with a buffer of data.
    fn update_footer_buffer(&mut self, data: &[u8]) {
        if data.len() >= self.footer_range_size {
            self.footer_buffer.clear();
            self.footer_buffer
                .extend_from_slice(&data[data.len() - self.footer_range_size..]);
        } else {
            self.footer_buffer.extend_from_slice(data);

            if self.footer_buffer.len() > self.footer_range_size {
                let drain_size: usize = self.footer_buffer.len() - self.footer_range_size;
                self.footer_buffer.drain(0..drain_size);
            }
        }
    }

    /// Assembles the results in reporting order.
    ///
    /// Start-relative matches come first, then unbound matches, then
    /// end-relative matches, each group in ascending offset order with ties
    /// broken by signature registration order.
    fn assemble_results(&mut self, scanner: &Scanner) {
        self.header_results.sort_by_key(|scan_result| {
            (
                scan_result.data_offset,
                scanner.get_signature_index(&scan_result.signature),
            )
        });
        self.unbound_results.sort_by_key(|scan_result| {
            (
                scan_result.data_offset,
                scanner.get_signature_index(&scan_result.signature),
            )
        });
        self.footer_results.sort_by_key(|scan_result| {
            (
                scan_result.data_offset,
                scanner.get_signature_index(&scan_result.signature),
            )
        });
        self.results = Vec::with_capacity(
            self.header_results.len() + self.unbound_results.len() + self.footer_results.len(),
        );
        self.results.append(&mut self.header_results);
        self.results.append(&mut self.unbound_results);
        self.results.append(&mut self.footer_results);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use sigscan_core::open_fake_data_stream;

    use crate::enums::PatternType;

    /// Feeds data to a new scan state in chunks and finalizes the scan.
    fn scan_in_chunks(
        scanner: &Scanner,
        data: &[u8],
        chunk_size: usize,
    ) -> Result<Vec<(String, u64)>, ErrorTrace> {
        let mut scan_state: ScanState = ScanState::new();

        for chunk in data.chunks(chunk_size) {
            scanner.scan_buffer(&mut scan_state, chunk)?;
        }
        scanner.scan_finalize(&mut scan_state)?;

        let mut results: Vec<(String, u64)> = Vec::new();
        for scan_result in scan_state.results().iter() {
            results.push((scan_result.get_identifier().to_string(), scan_result.get_offset()));
        }
        Ok(results)
    }

    #[test]
    fn test_new() {
        let scan_state: ScanState = ScanState::new();

        assert_eq!(scan_state.stage, ScanStage::Fresh);
        assert_eq!(scan_state.get_number_of_results(), 0);
        assert_eq!(scan_state.get_data_size(), None);
    }

    #[test]
    fn test_get_result_out_of_bounds() {
        let scan_state: ScanState = ScanState::new();

        match scan_state.get_result(0) {
            Ok(_) => panic!("Expected an error"),
            Err(error) => assert_eq!(error.kind(), ErrorKind::RuntimeValueOutOfBounds),
        };
    }

    #[test]
    fn test_abort_flag() {
        let mut scan_state: ScanState = ScanState::new();

        assert_eq!(scan_state.is_abort_requested(), false);

        let abort_flag: Arc<AtomicBool> = Arc::new(AtomicBool::new(false));
        scan_state.set_abort_flag(&abort_flag);

        assert_eq!(scan_state.is_abort_requested(), false);

        abort_flag.store(true, Ordering::Relaxed);

        assert_eq!(scan_state.is_abort_requested(), true);
    }

    #[test]
    fn test_scan_with_bound_to_start_signature() -> Result<(), ErrorTrace> {
        let mut scanner: Scanner = Scanner::new();
        scanner.add_signature("test1", PatternType::BoundToStart, 5, "FuZzInG".as_bytes())?;
        scanner.prepare()?;

        let results: Vec<(String, u64)> =
            scan_in_chunks(&scanner, "AAAAAFuZzInGZZZ".as_bytes(), 1024)?;
        assert_eq!(results, vec![(String::from("test1"), 5)]);

        Ok(())
    }

    #[test]
    fn test_scan_with_bound_to_end_signature() -> Result<(), ErrorTrace> {
        let mut scanner: Scanner = Scanner::new();
        scanner.add_signature("test2", PatternType::BoundToEnd, -13, "OsSFuZz".as_bytes())?;
        scanner.prepare()?;

        // The pattern starts 13 bytes before the end of the data, at offset
        // 1 of this 14 byte stream, where the bytes do not match.
        let results: Vec<(String, u64)> =
            scan_in_chunks(&scanner, "ZZZZOsSFuZz123".as_bytes(), 1024)?;
        assert_eq!(results.len(), 0);

        let results: Vec<(String, u64)> =
            scan_in_chunks(&scanner, "ZOsSFuZz123456".as_bytes(), 1024)?;
        assert_eq!(results, vec![(String::from("test2"), 1)]);

        Ok(())
    }

    #[test]
    fn test_scan_with_relative_anchors_is_exact() -> Result<(), ErrorTrace> {
        let mut scanner: Scanner = Scanner::new();
        scanner.add_signature("test1", PatternType::BoundToStart, 5, "FuZzInG".as_bytes())?;
        scanner.add_signature("test2", PatternType::BoundToEnd, -13, "OsSFuZz".as_bytes())?;
        scanner.prepare()?;

        // Both patterns occur in the data but neither at its anchored
        // offset.
        let results: Vec<(String, u64)> =
            scan_in_chunks(&scanner, "FuZzInGOsSFuZz".as_bytes(), 1024)?;
        assert_eq!(results.len(), 0);

        Ok(())
    }

    #[test]
    fn test_scan_with_unbound_signature_chunked() -> Result<(), ErrorTrace> {
        let mut scanner: Scanner = Scanner::new();
        scanner.add_signature("needle1", PatternType::Unbound, 0, "NEEDLE".as_bytes())?;
        scanner.prepare()?;

        let mut data: Vec<u8> = vec![0; 1024];
        data[500..506].copy_from_slice("NEEDLE".as_bytes());

        for chunk_size in [1, 7, 256, 1024] {
            let results: Vec<(String, u64)> = scan_in_chunks(&scanner, &data, chunk_size)?;
            assert_eq!(results, vec![(String::from("needle1"), 500)]);
        }
        Ok(())
    }

    #[test]
    fn test_scan_with_overlapping_signatures() -> Result<(), ErrorTrace> {
        let mut scanner: Scanner = Scanner::new();
        scanner.add_signature("A", PatternType::Unbound, 0, "ABC".as_bytes())?;
        scanner.add_signature("B", PatternType::Unbound, 0, "BCD".as_bytes())?;
        scanner.prepare()?;

        let results: Vec<(String, u64)> = scan_in_chunks(&scanner, "ABCD".as_bytes(), 1024)?;
        assert_eq!(
            results,
            vec![(String::from("A"), 0), (String::from("B"), 1)]
        );

        Ok(())
    }

    #[test]
    fn test_scan_with_overlapping_matches() -> Result<(), ErrorTrace> {
        let mut scanner: Scanner = Scanner::new();
        scanner.add_signature("P", PatternType::Unbound, 0, "XY".as_bytes())?;
        scanner.prepare()?;

        let results: Vec<(String, u64)> = scan_in_chunks(&scanner, "XYXY".as_bytes(), 1024)?;
        assert_eq!(
            results,
            vec![(String::from("P"), 0), (String::from("P"), 2)]
        );

        Ok(())
    }

    #[test]
    fn test_scan_with_empty_data() -> Result<(), ErrorTrace> {
        let mut scanner: Scanner = Scanner::new();
        scanner.add_signature("test1", PatternType::Unbound, 0, "NEEDLE".as_bytes())?;
        scanner.prepare()?;

        let mut scan_state: ScanState = ScanState::new();
        scanner.scan_finalize(&mut scan_state)?;

        assert_eq!(scan_state.get_number_of_results(), 0);
        assert_eq!(scan_state.get_data_size(), Some(0));

        Ok(())
    }

    #[test]
    fn test_scan_with_pattern_equal_to_data() -> Result<(), ErrorTrace> {
        let mut scanner: Scanner = Scanner::new();
        scanner.add_signature("start1", PatternType::BoundToStart, 0, "conectix".as_bytes())?;
        scanner.add_signature("end1", PatternType::BoundToEnd, -8, "conectix".as_bytes())?;
        scanner.prepare()?;

        let results: Vec<(String, u64)> = scan_in_chunks(&scanner, "conectix".as_bytes(), 1024)?;
        assert_eq!(
            results,
            vec![(String::from("start1"), 0), (String::from("end1"), 0)]
        );

        Ok(())
    }

    #[test]
    fn test_scan_with_data_smaller_than_header_range() -> Result<(), ErrorTrace> {
        let mut scanner: Scanner = Scanner::new();
        scanner.add_signature(
            "apm1",
            PatternType::BoundToStart,
            560,
            "Apple_partition_map".as_bytes(),
        )?;
        scanner.add_signature(
            "msiecf1",
            PatternType::BoundToStart,
            0,
            "Client UrlCache MMF Ver ".as_bytes(),
        )?;
        scanner.prepare()?;

        let mut data: Vec<u8> = vec![0; 128];
        data[0..24].copy_from_slice("Client UrlCache MMF Ver ".as_bytes());

        // The data ends before the header range does, signatures within the
        // available prefix are still evaluated.
        let results: Vec<(String, u64)> = scan_in_chunks(&scanner, &data, 1024)?;
        assert_eq!(results, vec![(String::from("msiecf1"), 0)]);

        Ok(())
    }

    #[test]
    fn test_scan_with_data_smaller_than_footer_range() -> Result<(), ErrorTrace> {
        let mut scanner: Scanner = Scanner::new();
        scanner.add_signature("udif1", PatternType::BoundToEnd, -512, "koly".as_bytes())?;
        scanner.add_signature("vhd1", PatternType::BoundToEnd, -80, "conectix".as_bytes())?;
        scanner.prepare()?;

        let mut data: Vec<u8> = vec![0; 128];
        data[48..56].copy_from_slice("conectix".as_bytes());

        let results: Vec<(String, u64)> = scan_in_chunks(&scanner, &data, 1024)?;
        assert_eq!(results, vec![(String::from("vhd1"), 48)]);

        Ok(())
    }

    #[test]
    fn test_scan_with_identical_patterns() -> Result<(), ErrorTrace> {
        let mut scanner: Scanner = Scanner::new();
        scanner.add_signature("test1", PatternType::Unbound, 0, "NEEDLE".as_bytes())?;
        scanner.add_signature("test2", PatternType::Unbound, 0, "NEEDLE".as_bytes())?;
        scanner.prepare()?;

        let mut data: Vec<u8> = vec![0; 64];
        data[10..16].copy_from_slice("NEEDLE".as_bytes());
        data[40..46].copy_from_slice("NEEDLE".as_bytes());

        let results: Vec<(String, u64)> = scan_in_chunks(&scanner, &data, 1024)?;
        assert_eq!(
            results,
            vec![
                (String::from("test1"), 10),
                (String::from("test2"), 10),
                (String::from("test1"), 40),
                (String::from("test2"), 40),
            ]
        );

        Ok(())
    }

    #[test]
    fn test_scan_result_order_with_deferred_match() -> Result<(), ErrorTrace> {
        let mut scanner: Scanner = Scanner::new();
        scanner.add_signature("long1", PatternType::Unbound, 0, "ABCD".as_bytes())?;
        scanner.add_signature("short1", PatternType::Unbound, 0, "C".as_bytes())?;
        scanner.prepare()?;

        // The short match at offset 2 is confirmed before the long match at
        // offset 0 completes in the second buffer, the results are still in
        // offset order.
        let results: Vec<(String, u64)> = scan_in_chunks(&scanner, "ABCD".as_bytes(), 3)?;
        assert_eq!(
            results,
            vec![(String::from("long1"), 0), (String::from("short1"), 2)]
        );

        Ok(())
    }

    #[test]
    fn test_scan_result_order_across_anchor_groups() -> Result<(), ErrorTrace> {
        let mut scanner: Scanner = Scanner::new();
        scanner.add_signature("end1", PatternType::BoundToEnd, -4, "TAIL".as_bytes())?;
        scanner.add_signature("unbound1", PatternType::Unbound, 0, "BODY".as_bytes())?;
        scanner.add_signature("start1", PatternType::BoundToStart, 0, "HEAD".as_bytes())?;
        scanner.prepare()?;

        // Start-relative matches are reported first, end-relative matches
        // last, regardless of registration order.
        let results: Vec<(String, u64)> =
            scan_in_chunks(&scanner, "HEAD over BODY and BODY then TAIL".as_bytes(), 8)?;
        assert_eq!(
            results,
            vec![
                (String::from("start1"), 0),
                (String::from("unbound1"), 10),
                (String::from("unbound1"), 19),
                (String::from("end1"), 29),
            ]
        );

        Ok(())
    }

    #[test]
    fn test_scan_is_deterministic() -> Result<(), ErrorTrace> {
        let mut scanner: Scanner = Scanner::new();
        scanner.add_signature("qcow1", PatternType::BoundToStart, 0, &[0x51, 0x46, 0x49, 0xfb])?;
        scanner.add_signature("test1", PatternType::Unbound, 0, "NEEDLE".as_bytes())?;
        scanner.add_signature("test2", PatternType::Unbound, 0, "EDL".as_bytes())?;
        scanner.prepare()?;

        let mut data: Vec<u8> = vec![0; 512];
        data[0..4].copy_from_slice(&[0x51, 0x46, 0x49, 0xfb]);
        data[100..106].copy_from_slice("NEEDLE".as_bytes());

        let first_results: Vec<(String, u64)> = scan_in_chunks(&scanner, &data, 64)?;
        let second_results: Vec<(String, u64)> = scan_in_chunks(&scanner, &data, 64)?;

        assert_eq!(first_results, second_results);
        assert_eq!(
            first_results,
            vec![
                (String::from("qcow1"), 0),
                (String::from("test1"), 100),
                (String::from("test2"), 102),
            ]
        );

        Ok(())
    }

    #[test]
    fn test_scan_matches_naive_scan() -> Result<(), ErrorTrace> {
        let data: Vec<u8> = (0..2048)
            .map(|index: usize| ((index * 31 + 7) % 251) as u8)
            .collect();

        let first_pattern: Vec<u8> = data[100..106].to_vec();
        let second_pattern: Vec<u8> = data[500..503].to_vec();
        let third_pattern: Vec<u8> = vec![0xfb, 0xfc, 0xfd];

        let patterns: Vec<(&str, &[u8])> = vec![
            ("sig1", &first_pattern),
            ("sig2", &second_pattern),
            ("sig3", &third_pattern),
        ];
        let mut scanner: Scanner = Scanner::new();
        for (identifier, pattern) in patterns.iter() {
            scanner.add_signature(identifier, PatternType::Unbound, 0, pattern)?;
        }
        scanner.prepare()?;

        let mut expected_results: Vec<(String, u64)> = Vec::new();
        for data_offset in 0..data.len() {
            for (identifier, pattern) in patterns.iter() {
                let end_offset: usize = data_offset + pattern.len();

                if end_offset <= data.len() && &data[data_offset..end_offset] == *pattern {
                    expected_results.push((identifier.to_string(), data_offset as u64));
                }
            }
        }
        assert!(expected_results.len() > 2);

        let results: Vec<(String, u64)> = scan_in_chunks(&scanner, &data, 7)?;
        assert_eq!(results, expected_results);

        let results: Vec<(String, u64)> = scan_in_chunks(&scanner, &data, 2048)?;
        assert_eq!(results, expected_results);

        Ok(())
    }

    #[test]
    fn test_scan_after_finalize() -> Result<(), ErrorTrace> {
        let mut scanner: Scanner = Scanner::new();
        scanner.add_signature("test1", PatternType::Unbound, 0, "NEEDLE".as_bytes())?;
        scanner.prepare()?;

        let mut scan_state: ScanState = ScanState::new();
        scanner.scan_buffer(&mut scan_state, "no match here".as_bytes())?;
        scanner.scan_finalize(&mut scan_state)?;

        let result: Result<(), ErrorTrace> =
            scanner.scan_buffer(&mut scan_state, "more data".as_bytes());
        match result {
            Ok(_) => panic!("Expected an error"),
            Err(error) => assert_eq!(error.kind(), ErrorKind::RuntimeValueAlreadySet),
        };

        let result: Result<(), ErrorTrace> = scanner.scan_finalize(&mut scan_state);
        match result {
            Ok(_) => panic!("Expected an error"),
            Err(error) => assert_eq!(error.kind(), ErrorKind::RuntimeValueAlreadySet),
        };
        Ok(())
    }

    #[test]
    fn test_scan_with_abort_requested() -> Result<(), ErrorTrace> {
        let mut scanner: Scanner = Scanner::new();
        scanner.add_signature("test1", PatternType::Unbound, 0, "NEEDLE".as_bytes())?;
        scanner.prepare()?;

        let mut scan_state: ScanState = ScanState::new();

        let abort_flag: Arc<AtomicBool> = Arc::new(AtomicBool::new(false));
        scan_state.set_abort_flag(&abort_flag);

        scanner.scan_buffer(&mut scan_state, "NEEDLE".as_bytes())?;

        abort_flag.store(true, Ordering::Relaxed);

        let result: Result<(), ErrorTrace> =
            scanner.scan_buffer(&mut scan_state, "NEEDLE".as_bytes());
        match result {
            Ok(_) => panic!("Expected an error"),
            Err(error) => assert_eq!(error.kind(), ErrorKind::RuntimeAbortRequested),
        };
        // The matches found before the abort remain retrievable.
        assert_eq!(scan_state.get_number_of_results(), 1);
        assert_eq!(scan_state.get_result(0)?.get_identifier(), "test1");

        let result: Result<(), ErrorTrace> =
            scanner.scan_buffer(&mut scan_state, "NEEDLE".as_bytes());
        match result {
            Ok(_) => panic!("Expected an error"),
            Err(error) => assert_eq!(error.kind(), ErrorKind::RuntimeValueAlreadySet),
        };
        Ok(())
    }

    #[test]
    fn test_scan_data_stream() -> Result<(), ErrorTrace> {
        let mut scanner: Scanner = Scanner::new();
        scanner.add_signature("start1", PatternType::BoundToStart, 0, "HEAD".as_bytes())?;
        scanner.add_signature("needle1", PatternType::Unbound, 0, "NEEDLE".as_bytes())?;
        scanner.add_signature("end1", PatternType::BoundToEnd, -8, "conectix".as_bytes())?;
        scanner.prepare()?;

        // A data stream larger than a single scan buffer, with the unbound
        // pattern crossing the buffer boundary at 65536.
        let mut data: Vec<u8> = vec![0; 200000];
        data[0..4].copy_from_slice("HEAD".as_bytes());
        data[65533..65539].copy_from_slice("NEEDLE".as_bytes());
        data[199992..200000].copy_from_slice("conectix".as_bytes());

        let data_stream = open_fake_data_stream(&data);

        let mut scan_state: ScanState = ScanState::new();
        scanner.scan_data_stream(&mut scan_state, &data_stream)?;

        assert_eq!(scan_state.get_number_of_results(), 3);
        assert_eq!(scan_state.get_result(0)?.get_identifier(), "start1");
        assert_eq!(scan_state.get_result(0)?.get_offset(), 0);
        assert_eq!(scan_state.get_result(1)?.get_identifier(), "needle1");
        assert_eq!(scan_state.get_result(1)?.get_offset(), 65533);
        assert_eq!(scan_state.get_result(2)?.get_identifier(), "end1");
        assert_eq!(scan_state.get_result(2)?.get_offset(), 199992);

        Ok(())
    }
}
