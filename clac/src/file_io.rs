// SPDX-License-Identifier: Apache-2.0

//! Whole-file reads and writes for arena strings.

use std::fs::File;
use std::io::{ErrorKind, Read, Write};
use std::path::Path;

use log::{debug, info};

use crate::{Arena, FileError, StringValue};

/// Reads the whole file at `path` into the arena.
///
/// The file's reported size is used to read straight into arena memory; a file
/// that turns out longer than reported is still read to the end.
pub fn read_all<'a, P: AsRef<Path>>(
    arena: &'a Arena,
    path: P,
) -> Result<StringValue<'a>, FileError> {
    let path = path.as_ref();
    let mut file = File::open(path).map_err(|source| FileError::OpenRead {
        path: path.to_path_buf(),
        source,
    })?;
    let size_hint = file
        .metadata()
        .ok()
        .and_then(|meta| usize::try_from(meta.len()).ok())
        .unwrap_or(0);
    let contents = read_sized(arena, &mut file, size_hint).map_err(|source| FileError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    info!("read {} bytes from {}", contents.len(), path.display());
    Ok(contents)
}

/// Reads `reader` to the end, filling a `size_hint` byte arena range first and
/// collecting anything beyond it on the heap.
fn read_sized<'a, R: Read>(
    arena: &'a Arena,
    reader: &mut R,
    size_hint: usize,
) -> std::io::Result<StringValue<'a>> {
    let dest = arena.allocate(size_hint);
    let mut filled = 0;
    while let Some(rest) = dest.get_mut(filled..).filter(|rest| !rest.is_empty()) {
        match reader.read(rest) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    let dest: &'a [u8] = dest;
    let head = StringValue::from_arena(dest.get(..filled).unwrap_or_default());

    let mut tail = Vec::new();
    reader.read_to_end(&mut tail)?;
    if !tail.is_empty() {
        debug!("read {} bytes past the reported size", tail.len());
    }
    Ok(head.concat(arena, StringValue::from_bytes(arena, &tail)))
}

/// Writes `contents` to `path`, creating or truncating the file, and returns
/// the number of bytes written.
///
/// A file that stops accepting bytes before everything is written is reported
/// as [`FileError::ShortWrite`].
pub fn write_all<P: AsRef<Path>>(path: P, contents: StringValue<'_>) -> Result<usize, FileError> {
    let path = path.as_ref();
    let mut file = File::create(path).map_err(|source| FileError::OpenWrite {
        path: path.to_path_buf(),
        source,
    })?;
    let written = write_to(&mut file, path, contents)?;
    info!("wrote {} bytes to {}", written, path.display());
    Ok(written)
}

/// Writes and flushes `contents`, reporting failures against `path`.
fn write_to<W: Write>(
    out: &mut W,
    path: &Path,
    contents: StringValue<'_>,
) -> Result<usize, FileError> {
    let written = write_counted(out, contents.as_bytes()).map_err(|source| FileError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    if written < contents.len() {
        return Err(FileError::ShortWrite {
            path: path.to_path_buf(),
            written,
            expected: contents.len(),
        });
    }
    out.flush().map_err(|source| FileError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(written)
}

/// Like `Write::write_all`, but stops at the first zero-length write and
/// reports how far it got instead of failing.
fn write_counted<W: Write>(out: &mut W, mut bytes: &[u8]) -> std::io::Result<usize> {
    let mut written = 0;
    while !bytes.is_empty() {
        match out.write(bytes) {
            Ok(0) => break,
            Ok(n) => {
                written += n;
                bytes = bytes.get(n..).unwrap_or_default();
            }
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    /// Accepts at most `limit` bytes in total.
    struct LimitedWriter {
        data: Vec<u8>,
        limit: usize,
    }

    impl Write for LimitedWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            let room = self.limit - self.data.len();
            let n = room.min(buf.len()).min(3);
            self.data.extend_from_slice(&buf[..n]);
            Ok(n)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_write_counted_handles_partial_writes() {
        let mut out = LimitedWriter {
            data: Vec::new(),
            limit: 100,
        };
        assert_eq!(write_counted(&mut out, b"hello world").unwrap(), 11);
        assert_eq!(out.data, b"hello world");
    }

    #[test]
    fn test_write_counted_stops_when_sink_is_full() {
        let mut out = LimitedWriter {
            data: Vec::new(),
            limit: 5,
        };
        assert_eq!(write_counted(&mut out, b"hello world").unwrap(), 5);
        assert_eq!(out.data, b"hello");
    }

    #[test]
    fn test_full_sink_is_reported_as_short_write() {
        let arena = Arena::new();
        let contents = StringValue::from_text(&arena, "0123456789");
        let mut out = LimitedWriter {
            data: Vec::new(),
            limit: 3,
        };
        match write_to(&mut out, Path::new("out.c"), contents) {
            Err(err @ FileError::ShortWrite { written: 3, expected: 10, .. }) => {
                assert_eq!(err.to_string(), "Only wrote [3] bytes ( of [10] ) to file: out.c");
            }
            other => panic!("Expected ShortWrite error, got: {:?}", other),
        }
    }

    #[test]
    fn test_exact_size_hint_reads_without_copying() {
        let arena = Arena::with_block_capacity(64);
        let mut reader = Cursor::new(b"let x = 1;".to_vec());
        let value = read_sized(&arena, &mut reader, 10).unwrap();
        assert_eq!(value, "let x = 1;");
        assert_eq!(arena.bytes_allocated(), 10);
    }

    #[test]
    fn test_size_hint_too_small_reads_the_rest() {
        let arena = Arena::with_block_capacity(64);
        let mut reader = Cursor::new(b"let x = 1;".to_vec());
        let value = read_sized(&arena, &mut reader, 4).unwrap();
        assert_eq!(value, "let x = 1;");
        // Head and tail were adjacent, so they were joined in place
        assert_eq!(arena.bytes_allocated(), 10);
    }

    #[test]
    fn test_size_hint_too_large_or_missing() {
        let arena = Arena::with_block_capacity(64);
        let mut reader = Cursor::new(b"short".to_vec());
        assert_eq!(read_sized(&arena, &mut reader, 32).unwrap(), "short");

        let mut reader = Cursor::new(b"no hint".to_vec());
        assert_eq!(read_sized(&arena, &mut reader, 0).unwrap(), "no hint");

        let mut reader = Cursor::new(Vec::new());
        assert!(read_sized(&arena, &mut reader, 0).unwrap().is_empty());
    }
}
