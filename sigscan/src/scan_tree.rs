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

use std::cmp::{max, min};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use sigscan_core::mediator::{Mediator, MediatorReference};

use super::enums::PatternType;
use super::skip_table::SkipTable;
use super::types::SignatureReference;

const DEFAULT_SCAN_OBJECT: i16 = -1;

/// Scan object.
///
/// A leaf holds the candidate signatures that remain once the byte values on
/// the path no longer distinguish them. Every candidate is verified literally
/// before it is reported, the scan tree descent is a filter, not a proof.
#[derive(Debug)]
pub(super) enum ScanObject {
    ScanTreeNode(ScanTreeNode),
    Signatures(Vec<SignatureReference>),
}

impl ScanObject {
    /// Builds a scan object for a set of candidate signatures.
    fn build(
        signatures: &Vec<SignatureReference>,
        pattern_type: &PatternType,
        offsets_to_ignore: &BTreeSet<usize>,
        largest_pattern_offset: usize,
    ) -> Self {
        if signatures.len() > 1 {
            if let Some(scan_tree_node) = ScanTreeNode::build(
                signatures,
                pattern_type,
                offsets_to_ignore,
                largest_pattern_offset,
            ) {
                return ScanObject::ScanTreeNode(scan_tree_node);
            }
            // No remaining pattern offset splits the signatures.
        }
        let mut leaf_signatures: Vec<SignatureReference> = Vec::new();
        for signature in signatures.iter() {
            leaf_signatures.push(Arc::clone(signature));
        }
        ScanObject::Signatures(leaf_signatures)
    }

    /// Scans a buffer for matching signatures.
    fn scan_buffer(
        &self,
        data_offset: u64,
        data_size: u64,
        buffer: &[u8],
        buffer_offset: isize,
        results: &mut Vec<SignatureReference>,
    ) {
        match self {
            ScanObject::ScanTreeNode(scan_tree_node) => {
                scan_tree_node.scan_buffer(data_offset, data_size, buffer, buffer_offset, results)
            }
            ScanObject::Signatures(signatures) => {
                let verify_offset: usize = max(buffer_offset, 0) as usize;

                for signature in signatures.iter() {
                    if signature.scan_buffer(data_offset, data_size, buffer, verify_offset) {
                        results.push(Arc::clone(signature));
                    }
                }
            }
        };
    }
}

/// Scan tree node.
#[derive(Debug)]
pub(super) struct ScanTreeNode {
    /// Pattern offset.
    pub pattern_offset: usize,

    /// Scan objects per byte value, with key -1 as the slot for signatures
    /// that do not cover the pattern offset.
    pub scan_objects: HashMap<i16, ScanObject>,
}

impl ScanTreeNode {
    /// Creates a new scan tree node.
    pub fn new() -> Self {
        Self {
            pattern_offset: 0,
            scan_objects: HashMap::new(),
        }
    }

    /// Retrieves the offset of a signature pattern relative from the start
    /// of the scan window.
    ///
    /// A bound to end pattern with anchor distance d starts d bytes before
    /// one-past-end of the data, hence at offset K - d of a scan window
    /// that spans the final K bytes.
    fn get_window_offset(
        signature: &SignatureReference,
        pattern_type: &PatternType,
        largest_pattern_offset: usize,
    ) -> usize {
        match pattern_type {
            PatternType::BoundToEnd => largest_pattern_offset - signature.pattern_offset,
            PatternType::BoundToStart => signature.pattern_offset,
            PatternType::Unbound => 0,
        }
    }

    /// Partitions signatures by their byte value at a pattern offset.
    ///
    /// Signatures that do not cover the pattern offset are returned
    /// separately, they have to be checked regardless of the byte value.
    fn partition_signatures(
        signatures: &Vec<SignatureReference>,
        pattern_type: &PatternType,
        pattern_offset: usize,
        largest_pattern_offset: usize,
    ) -> (BTreeMap<u8, Vec<SignatureReference>>, Vec<SignatureReference>) {
        let mut byte_value_groups: BTreeMap<u8, Vec<SignatureReference>> = BTreeMap::new();
        let mut remaining_signatures: Vec<SignatureReference> = Vec::new();

        for signature in signatures.iter() {
            let window_offset: usize =
                Self::get_window_offset(signature, pattern_type, largest_pattern_offset);

            if pattern_offset < window_offset
                || pattern_offset >= window_offset + signature.pattern_size
            {
                remaining_signatures.push(Arc::clone(signature));
                continue;
            }
            let byte_value: u8 = signature.pattern[pattern_offset - window_offset];

            match byte_value_groups.get_mut(&byte_value) {
                Some(group_signatures) => group_signatures.push(Arc::clone(signature)),
                None => {
                    byte_value_groups.insert(byte_value, vec![Arc::clone(signature)]);
                }
            };
        }
        (byte_value_groups, remaining_signatures)
    }

    /// Selects the pattern offset that best splits a set of signatures.
    ///
    /// The offset that minimizes the largest resulting candidate set wins,
    /// ties are broken by the smallest number of resulting sets and then by
    /// the lowest offset. Returns None when no offset splits the signatures
    /// into smaller sets.
    fn select_pattern_offset(
        signatures: &Vec<SignatureReference>,
        pattern_type: &PatternType,
        offsets_to_ignore: &BTreeSet<usize>,
        largest_pattern_offset: usize,
    ) -> Option<usize> {
        let number_of_signatures: usize = signatures.len();

        let mut candidate_offsets: BTreeSet<usize> = BTreeSet::new();
        for signature in signatures.iter() {
            let window_offset: usize =
                Self::get_window_offset(signature, pattern_type, largest_pattern_offset);

            for pattern_offset in window_offset..window_offset + signature.pattern_size {
                if !offsets_to_ignore.contains(&pattern_offset) {
                    candidate_offsets.insert(pattern_offset);
                }
            }
        }
        let mut best_offset: Option<usize> = None;
        let mut best_largest_group_size: usize = number_of_signatures;
        let mut best_number_of_groups: usize = 0;

        for pattern_offset in candidate_offsets.iter() {
            let (byte_value_groups, remaining_signatures) = Self::partition_signatures(
                signatures,
                pattern_type,
                *pattern_offset,
                largest_pattern_offset,
            );
            let mut largest_group_size: usize = remaining_signatures.len();
            for (_, group_signatures) in byte_value_groups.iter() {
                largest_group_size = max(group_signatures.len(), largest_group_size);
            }
            // An offset where one set holds every signature does not split
            // them.
            if largest_group_size >= number_of_signatures {
                continue;
            }
            let mut number_of_groups: usize = byte_value_groups.len();
            if !remaining_signatures.is_empty() {
                number_of_groups += 1;
            }
            let is_better: bool = match best_offset {
                Some(_) => {
                    largest_group_size < best_largest_group_size
                        || (largest_group_size == best_largest_group_size
                            && number_of_groups < best_number_of_groups)
                }
                None => true,
            };
            if is_better {
                best_offset = Some(*pattern_offset);
                best_largest_group_size = largest_group_size;
                best_number_of_groups = number_of_groups;
            }
            if best_largest_group_size == 1 {
                break;
            }
        }
        best_offset
    }

    /// Builds a scan tree node for a set of signatures.
    ///
    /// Returns None when no pattern offset splits the signatures into
    /// smaller candidate sets.
    fn build(
        signatures: &Vec<SignatureReference>,
        pattern_type: &PatternType,
        offsets_to_ignore: &BTreeSet<usize>,
        largest_pattern_offset: usize,
    ) -> Option<ScanTreeNode> {
        let pattern_offset: usize = Self::select_pattern_offset(
            signatures,
            pattern_type,
            offsets_to_ignore,
            largest_pattern_offset,
        )?;
        let mediator: MediatorReference = Mediator::current();
        if mediator.debug_output {
            mediator.debug_print(&format!(
                "ScanTreeNode::build: selected pattern offset: {} for {} signatures\n",
                pattern_offset,
                signatures.len()
            ));
        }
        let (byte_value_groups, remaining_signatures) = Self::partition_signatures(
            signatures,
            pattern_type,
            pattern_offset,
            largest_pattern_offset,
        );
        let mut sub_offsets_to_ignore: BTreeSet<usize> = offsets_to_ignore.clone();
        sub_offsets_to_ignore.insert(pattern_offset);

        let mut scan_objects: HashMap<i16, ScanObject> = HashMap::new();

        for (byte_value, group_signatures) in byte_value_groups.iter() {
            let scan_object: ScanObject = ScanObject::build(
                group_signatures,
                pattern_type,
                &sub_offsets_to_ignore,
                largest_pattern_offset,
            );
            scan_objects.insert(*byte_value as i16, scan_object);
        }
        // Signatures that do not cover the pattern offset are checked
        // regardless of the byte value.
        if !remaining_signatures.is_empty() {
            let scan_object: ScanObject = ScanObject::build(
                &remaining_signatures,
                pattern_type,
                &sub_offsets_to_ignore,
                largest_pattern_offset,
            );
            scan_objects.insert(DEFAULT_SCAN_OBJECT, scan_object);
        }
        Some(ScanTreeNode {
            pattern_offset: pattern_offset,
            scan_objects: scan_objects,
        })
    }

    /// Builds a scan tree node for signatures that no pattern offset splits.
    ///
    /// Such signatures occupy the same window range with the same byte
    /// values, a single decision node with one leaf verifies all of them.
    fn build_leaf_node(
        signatures: &Vec<SignatureReference>,
        pattern_type: &PatternType,
        largest_pattern_offset: usize,
    ) -> ScanTreeNode {
        let mut pattern_offset: usize = usize::MAX;
        for signature in signatures.iter() {
            let window_offset: usize =
                Self::get_window_offset(signature, pattern_type, largest_pattern_offset);
            pattern_offset = min(window_offset, pattern_offset);
        }
        let (byte_value_groups, remaining_signatures) = Self::partition_signatures(
            signatures,
            pattern_type,
            pattern_offset,
            largest_pattern_offset,
        );
        let mut scan_objects: HashMap<i16, ScanObject> = HashMap::new();

        for (byte_value, group_signatures) in byte_value_groups.iter() {
            let mut leaf_signatures: Vec<SignatureReference> = Vec::new();
            for signature in group_signatures.iter() {
                leaf_signatures.push(Arc::clone(signature));
            }
            scan_objects.insert(*byte_value as i16, ScanObject::Signatures(leaf_signatures));
        }
        if !remaining_signatures.is_empty() {
            scan_objects.insert(
                DEFAULT_SCAN_OBJECT,
                ScanObject::Signatures(remaining_signatures),
            );
        }
        ScanTreeNode {
            pattern_offset: pattern_offset,
            scan_objects: scan_objects,
        }
    }

    /// Scans a buffer for matching signatures.
    ///
    /// The buffer offset is the position of the scan window within the
    /// buffer. It is negative when the window extends before the start of
    /// the data, positions before the buffer read as no byte and only the
    /// default scan object applies to them.
    pub(super) fn scan_buffer(
        &self,
        data_offset: u64,
        data_size: u64,
        buffer: &[u8],
        buffer_offset: isize,
        results: &mut Vec<SignatureReference>,
    ) {
        let scan_offset: isize = buffer_offset + self.pattern_offset as isize;

        if scan_offset >= 0 && (scan_offset as usize) < buffer.len() {
            let byte_value: u8 = buffer[scan_offset as usize];

            let mediator: MediatorReference = Mediator::current();
            if mediator.debug_output {
                mediator.debug_print(&format!(
                    "ScanTreeNode::scan_buffer: scanning at offset: {} for byte value: 0x{:02x}\n",
                    data_offset as i64 + scan_offset as i64,
                    byte_value
                ));
            }
            if let Some(scan_object) = self.scan_objects.get(&(byte_value as i16)) {
                scan_object.scan_buffer(data_offset, data_size, buffer, buffer_offset, results);
            }
        }
        if let Some(scan_object) = self.scan_objects.get(&DEFAULT_SCAN_OBJECT) {
            scan_object.scan_buffer(data_offset, data_size, buffer, buffer_offset, results);
        }
    }
}

/// Scan tree.
#[derive(Debug)]
pub(super) struct ScanTree {
    /// Pattern type.
    pub pattern_type: PatternType,

    /// Pattern range start offset.
    range_start_offset: usize,

    /// Pattern range end offset.
    range_end_offset: usize,

    /// Root node.
    pub root_node: ScanTreeNode,

    /// Skip table.
    pub skip_table: SkipTable,
}

impl ScanTree {
    /// Creates a new scan tree.
    pub fn new(pattern_type: PatternType) -> Self {
        Self {
            pattern_type: pattern_type,
            range_start_offset: 0,
            range_end_offset: 0,
            root_node: ScanTreeNode::new(),
            skip_table: SkipTable::new(),
        }
    }

    /// Builds the scan tree from the signatures that match its pattern type.
    pub fn build(&mut self, signatures: &Vec<SignatureReference>) {
        let mut tree_signatures: Vec<SignatureReference> = Vec::new();

        for signature in signatures.iter() {
            if signature.pattern_type != self.pattern_type {
                continue;
            }
            self.range_start_offset = min(signature.pattern_offset, self.range_start_offset);
            let pattern_end_offset: usize = signature.pattern_offset + signature.pattern_size;
            self.range_end_offset = max(pattern_end_offset, self.range_end_offset);

            tree_signatures.push(Arc::clone(signature));
        }
        if !tree_signatures.is_empty() {
            let offsets_to_ignore: BTreeSet<usize> = BTreeSet::new();

            self.root_node = match ScanTreeNode::build(
                &tree_signatures,
                &self.pattern_type,
                &offsets_to_ignore,
                self.range_end_offset,
            ) {
                Some(root_node) => root_node,
                None => ScanTreeNode::build_leaf_node(
                    &tree_signatures,
                    &self.pattern_type,
                    self.range_end_offset,
                ),
            };
            self.skip_table.fill(&tree_signatures);
        }
    }

    /// Determines if the scan tree has signatures.
    pub fn has_signatures(&self) -> bool {
        !self.root_node.scan_objects.is_empty()
    }

    /// Retrieves the spanning range.
    pub fn get_spanning_range(&self) -> (usize, usize) {
        (self.range_start_offset, self.range_end_offset)
    }
}
