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

use std::error::Error;
use std::fmt;

/// Error domains.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorDomain {
    Arguments,
    Runtime,
    Memory,
    Io,
    Input,
}

/// Error kinds (domain and code).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    ArgumentInvalidValue,
    ArgumentValueLessThanZero,
    ArgumentValueZeroOrLess,
    ArgumentValueExceedsMaximum,
    ArgumentValueTooSmall,
    ArgumentValueTooLarge,
    ArgumentValueOutOfBounds,
    ArgumentUnsupportedValue,
    ArgumentConflictingValue,
    RuntimeValueMissing,
    RuntimeValueAlreadySet,
    RuntimeInitializeFailed,
    RuntimeResizeFailed,
    RuntimeFinalizeFailed,
    RuntimeGetFailed,
    RuntimeSetFailed,
    RuntimeAppendFailed,
    RuntimeValueOutOfBounds,
    RuntimeUnsupportedValue,
    RuntimeAbortRequested,
    MemoryInsufficient,
    MemoryCopyFailed,
    MemorySetFailed,
    IoOpenFailed,
    IoCloseFailed,
    IoSeekFailed,
    IoReadFailed,
    InputInvalidData,
}

impl ErrorKind {
    /// Retrieves the domain of the error kind.
    pub fn domain(&self) -> ErrorDomain {
        match self {
            ErrorKind::ArgumentInvalidValue
            | ErrorKind::ArgumentValueLessThanZero
            | ErrorKind::ArgumentValueZeroOrLess
            | ErrorKind::ArgumentValueExceedsMaximum
            | ErrorKind::ArgumentValueTooSmall
            | ErrorKind::ArgumentValueTooLarge
            | ErrorKind::ArgumentValueOutOfBounds
            | ErrorKind::ArgumentUnsupportedValue
            | ErrorKind::ArgumentConflictingValue => ErrorDomain::Arguments,
            ErrorKind::RuntimeValueMissing
            | ErrorKind::RuntimeValueAlreadySet
            | ErrorKind::RuntimeInitializeFailed
            | ErrorKind::RuntimeResizeFailed
            | ErrorKind::RuntimeFinalizeFailed
            | ErrorKind::RuntimeGetFailed
            | ErrorKind::RuntimeSetFailed
            | ErrorKind::RuntimeAppendFailed
            | ErrorKind::RuntimeValueOutOfBounds
            | ErrorKind::RuntimeUnsupportedValue
            | ErrorKind::RuntimeAbortRequested => ErrorDomain::Runtime,
            ErrorKind::MemoryInsufficient
            | ErrorKind::MemoryCopyFailed
            | ErrorKind::MemorySetFailed => ErrorDomain::Memory,
            ErrorKind::IoOpenFailed
            | ErrorKind::IoCloseFailed
            | ErrorKind::IoSeekFailed
            | ErrorKind::IoReadFailed => ErrorDomain::Io,
            ErrorKind::InputInvalidData => ErrorDomain::Input,
        }
    }
}

/// Error with a kind and traceback information.
#[derive(Debug)]
pub struct ErrorTrace {
    /// The error kind.
    kind: ErrorKind,

    /// The error messages.
    messages: Vec<String>,
}

impl ErrorTrace {
    /// Creates a new error.
    pub fn new(kind: ErrorKind, message_string: String) -> Self {
        Self {
            kind: kind,
            messages: vec![message_string],
        }
    }

    /// Retrieves the kind of the error.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Adds an additional message to the trace.
    pub fn add_frame(&mut self, message_string: String) {
        self.messages.push(message_string);
    }

    /// Retrieves a string representation of the error.
    pub fn to_string(&self) -> String {
        self.messages.join("\n")
    }
}

impl Error for ErrorTrace {}

impl fmt::Display for ErrorTrace {
    /// Formats the error as a string.
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        write!(
            formatter,
            "{}",
            self.messages
                .iter()
                .enumerate()
                .map(|(frame_index, message_string)| format!("#{} {}", frame_index, message_string))
                .collect::<Vec<String>>()
                .join("\n")
        )
    }
}
