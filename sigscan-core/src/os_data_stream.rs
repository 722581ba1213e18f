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

use std::fs::{File, Metadata};
use std::io::{Read, Seek, SeekFrom};
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use super::data_stream::{DataStream, DataStreamReference};
use super::errors::{ErrorKind, ErrorTrace};

impl DataStream for File {
    /// Retrieves the size of the data.
    fn get_size(&mut self) -> Result<u64, ErrorTrace> {
        let metadata: Metadata = match self.metadata() {
            Ok(metadata) => metadata,
            Err(error) => {
                return Err(ErrorTrace::new(
                    ErrorKind::IoReadFailed,
                    format!(
                        "{}: Unable to retrieve file metadata with error: {}",
                        crate::error_trace_function!(),
                        error.to_string(),
                    ),
                ));
            }
        };
        Ok(metadata.len())
    }

    /// Reads data at the current position.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, ErrorTrace> {
        match Read::read(self, buf) {
            Ok(read_count) => Ok(read_count),
            Err(error) => Err(ErrorTrace::new(
                ErrorKind::IoReadFailed,
                format!(
                    "{}: Unable to read data with error: {}",
                    crate::error_trace_function!(),
                    error.to_string(),
                ),
            )),
        }
    }

    /// Sets the current position of the data.
    fn seek(&mut self, pos: SeekFrom) -> Result<u64, ErrorTrace> {
        match Seek::seek(self, pos) {
            Ok(offset) => Ok(offset),
            Err(error) => Err(ErrorTrace::new(
                ErrorKind::IoSeekFailed,
                format!(
                    "{}: Unable to seek position with error: {}",
                    crate::error_trace_function!(),
                    error.to_string(),
                ),
            )),
        }
    }
}

/// Opens a new operating system data stream.
pub fn open_os_data_stream(path: &PathBuf) -> Result<DataStreamReference, ErrorTrace> {
    let file: File = match File::open(path) {
        Ok(file) => file,
        Err(error) => {
            return Err(ErrorTrace::new(
                ErrorKind::IoOpenFailed,
                format!(
                    "{}: Unable to open file with error: {}",
                    crate::error_trace_function!(),
                    error.to_string(),
                ),
            ));
        }
    };
    Ok(Arc::new(RwLock::new(file)))
}
