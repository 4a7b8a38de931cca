// SPDX-License-Identifier: Apache-2.0

use std::path::PathBuf;

/// Errors signaled by [`crate::Scanner`] operations.
///
/// Neither is fatal: a scanner that reported `EndOfInput` keeps reporting it
/// on every further consuming call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanError {
    /// No byte left at the cursor (or at the look-ahead position).
    EndOfInput,
    /// `prev()` was called before anything was consumed.
    NoPrevious,
}

impl core::fmt::Display for ScanError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ScanError::EndOfInput => write!(f, "end of input"),
            ScanError::NoPrevious => write!(f, "no previous character"),
        }
    }
}

impl std::error::Error for ScanError {}

/// Errors from reading or writing whole files.
#[derive(Debug)]
pub enum FileError {
    /// The file could not be opened for reading.
    OpenRead {
        path: PathBuf,
        source: std::io::Error,
    },
    /// The file could not be opened (or created) for writing.
    OpenWrite {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Reading failed after the file was opened.
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Writing failed after the file was opened.
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    /// The file accepted fewer bytes than requested.
    ShortWrite {
        path: PathBuf,
        written: usize,
        expected: usize,
    },
}

impl FileError {
    /// Path of the file the failed operation targeted.
    pub fn path(&self) -> &std::path::Path {
        match self {
            FileError::OpenRead { path, .. }
            | FileError::OpenWrite { path, .. }
            | FileError::Read { path, .. }
            | FileError::Write { path, .. }
            | FileError::ShortWrite { path, .. } => path,
        }
    }
}

impl core::fmt::Display for FileError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            FileError::OpenRead { path, source } => {
                write!(f, "Failed to open file for read: {} ({source})", path.display())
            }
            FileError::OpenWrite { path, source } => {
                write!(f, "Failed to open file for write: {} ({source})", path.display())
            }
            FileError::Read { path, source } => {
                write!(f, "Failed to read file: {} ({source})", path.display())
            }
            FileError::Write { path, source } => {
                write!(f, "Failed to write file: {} ({source})", path.display())
            }
            FileError::ShortWrite {
                path,
                written,
                expected,
            } => write!(
                f,
                "Only wrote [{written}] bytes ( of [{expected}] ) to file: {}",
                path.display()
            ),
        }
    }
}

impl std::error::Error for FileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FileError::OpenRead { source, .. }
            | FileError::OpenWrite { source, .. }
            | FileError::Read { source, .. }
            | FileError::Write { source, .. } => Some(source),
            FileError::ShortWrite { .. } => None,
        }
    }
}
