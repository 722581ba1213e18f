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
use std::io::SeekFrom;
use std::sync::{Arc, RwLock};

use super::data_stream::{DataStream, DataStreamReference};
use super::errors::ErrorTrace;

/// Fake (or virtual) data stream.
pub struct FakeDataStream {
    /// The data.
    data: Vec<u8>,

    /// The data size.
    data_size: usize,

    /// The current offset.
    current_offset: u64,

    /// The size.
    pub size: u64,
}

impl FakeDataStream {
    /// Creates a new data stream.
    pub fn new(data: &[u8], size: u64) -> Self {
        Self {
            data: data.to_vec(),
            data_size: data.len(),
            current_offset: 0,
            size: size,
        }
    }
}

impl DataStream for FakeDataStream {
    /// Retrieves the size of the data.
    fn get_size(&mut self) -> Result<u64, ErrorTrace> {
        Ok(self.size)
    }

    /// Reads data at the current position.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, ErrorTrace> {
        if self.current_offset >= self.size {
            return Ok(0);
        }
        let remaining_size: u64 = self.size - self.current_offset;
        let mut read_size: usize = buf.len();

        if (read_size as u64) > remaining_size {
            read_size = remaining_size as usize;
        }
        let mut buf_offset: usize = 0;

        while buf_offset < read_size {
            let read_remainder_size: usize = read_size - buf_offset;

            let read_count: usize = if self.current_offset < self.data_size as u64 {
                let data_offset: usize = self.current_offset as usize;

                let data_remainder_size: usize =
                    min(read_remainder_size, self.data_size - data_offset);

                let data_end_offset: usize = data_offset + data_remainder_size;
                let buf_end_offset: usize = buf_offset + data_remainder_size;

                buf[buf_offset..buf_end_offset]
                    .copy_from_slice(&self.data[data_offset..data_end_offset]);

                data_remainder_size
            } else {
                let buf_end_offset: usize = buf_offset + read_remainder_size;

                buf[buf_offset..buf_end_offset].fill(0);

                read_remainder_size
            };
            buf_offset += read_count;
        }
        self.current_offset += buf_offset as u64;

        Ok(buf_offset)
    }

    /// Sets the current position of the data.
    fn seek(&mut self, pos: SeekFrom) -> Result<u64, ErrorTrace> {
        self.current_offset = match pos {
            SeekFrom::Current(relative_offset) => {
                let mut current_offset: i64 = self.current_offset as i64;
                current_offset += relative_offset;
                current_offset as u64
            }
            SeekFrom::End(relative_offset) => {
                let mut end_offset: i64 = self.size as i64;
                end_offset += relative_offset;
                end_offset as u64
            }
            SeekFrom::Start(offset) => offset,
        };
        Ok(self.current_offset)
    }
}

/// Opens a new fake data stream.
pub fn open_fake_data_stream(data: &[u8]) -> DataStreamReference {
    let data_size: u64 = data.len() as u64;
    let fake_data_stream: FakeDataStream = FakeDataStream::new(data, data_size);
    Arc::new(RwLock::new(fake_data_stream))
}
