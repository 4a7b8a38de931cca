// SPDX-License-Identifier: Apache-2.0

use std::io::Write;

use crate::number_format::{format_float, format_int};
use crate::Arena;

/// An immutable byte string living in an [`Arena`].
///
/// A `StringValue` is a borrowed view (pointer and length) and never owns its
/// bytes. Views are `Copy`, may alias one another, and compare by content.
///
/// Operations that need new bytes take the arena explicitly. Everything else,
/// including forward slicing, is zero-copy.
#[derive(Clone, Copy, Default)]
pub struct StringValue<'a> {
    bytes: &'a [u8],
}

impl<'a> StringValue<'a> {
    /// The canonical empty string. Never allocates.
    pub const fn empty() -> Self {
        Self { bytes: &[] }
    }

    /// Wraps bytes that already live in arena memory.
    pub(crate) fn from_arena(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }

    /// Copies `bytes` into the arena.
    pub fn from_bytes(arena: &'a Arena, bytes: &[u8]) -> Self {
        if bytes.is_empty() {
            return Self::empty();
        }
        let dest = arena.allocate(bytes.len());
        dest.copy_from_slice(bytes);
        Self { bytes: dest }
    }

    /// Allocates `len` bytes, lets `fill` write them, and returns the result.
    ///
    /// The mutable range is only reachable inside `fill`; afterwards the bytes
    /// are as immutable as any other arena string.
    ///
    /// ```
    /// use clac::{Arena, StringValue};
    ///
    /// let arena = Arena::new();
    /// let dashes = StringValue::from_fn(&arena, 3, |buf| buf.fill(b'-'));
    /// assert_eq!(dashes, "---");
    /// ```
    pub fn from_fn<F: FnOnce(&mut [u8])>(arena: &'a Arena, len: usize, fill: F) -> Self {
        if len == 0 {
            return Self::empty();
        }
        let dest = arena.allocate(len);
        fill(&mut *dest);
        Self { bytes: dest }
    }

    /// Copies the UTF-8 text `text` into the arena.
    pub fn from_text(arena: &'a Arena, text: &str) -> Self {
        Self::from_bytes(arena, text.as_bytes())
    }

    /// A one-byte string.
    pub fn from_char(arena: &'a Arena, c: u8) -> Self {
        Self::from_bytes(arena, &[c])
    }

    /// Copies at most `n` bytes of `bytes`, stopping early at the first NUL.
    pub fn sized_from(arena: &'a Arena, bytes: &[u8], n: usize) -> Self {
        let limit = n.min(bytes.len());
        let prefix = bytes.get(..limit).unwrap_or_default();
        let len = prefix.iter().position(|&b| b == 0).unwrap_or(limit);
        Self::from_bytes(arena, prefix.get(..len).unwrap_or_default())
    }

    /// A fresh copy that shares no memory with `self`.
    ///
    /// Only needed when independence matters; assigning a `StringValue` already
    /// shares it for free.
    pub fn copy(self, arena: &'a Arena) -> Self {
        Self::from_bytes(arena, self.bytes)
    }

    /// The underlying bytes, borrowed for the arena's lifetime.
    pub fn as_bytes(self) -> &'a [u8] {
        self.bytes
    }

    /// The bytes as text, when they are valid UTF-8.
    pub fn as_str(self) -> Result<&'a str, core::str::Utf8Error> {
        core::str::from_utf8(self.bytes)
    }

    /// Length in bytes.
    pub fn len(self) -> usize {
        self.bytes.len()
    }

    /// Whether the string has no bytes.
    pub fn is_empty(self) -> bool {
        self.bytes.is_empty()
    }

    /// Byte at `index`, if in range.
    pub fn get(self, index: usize) -> Option<u8> {
        self.bytes.get(index).copied()
    }

    /// Content equality, same as `==`.
    pub fn equals(self, other: StringValue<'_>) -> bool {
        self.bytes == other.bytes
    }

    /// Zero-copy view of `[start, end)`.
    ///
    /// Anything other than a non-empty forward range inside the string yields
    /// the empty string.
    pub fn forward_slice(self, start: usize, end: usize) -> Self {
        if start >= end {
            return Self::empty();
        }
        match self.bytes.get(start..end) {
            Some(bytes) => Self { bytes },
            None => Self::empty(),
        }
    }

    /// Slices from `start` (inclusive) towards `end` (exclusive).
    ///
    /// * `start == end`, `start >= len` or `end > len`: the empty string.
    /// * `start < end`: a zero-copy view aliasing `self`.
    /// * `start > end`: a new string holding `self[start]`, `self[start - 1]`, ...
    ///   `self[end + 1]`, in that order. Reversed bytes cannot alias the source, so
    ///   this is the one slicing case that allocates.
    pub fn slice(self, arena: &'a Arena, start: usize, end: usize) -> Self {
        if start >= self.len() || end > self.len() || start == end {
            return Self::empty();
        }
        if start < end {
            return self.forward_slice(start, end);
        }
        let reversed = match self.bytes.get(end + 1..=start) {
            Some(span) => span,
            None => return Self::empty(),
        };
        let dest = arena.allocate(reversed.len());
        for (slot, &byte) in dest.iter_mut().zip(reversed.iter().rev()) {
            *slot = byte;
        }
        Self { bytes: dest }
    }

    /// `self` followed by `other`.
    ///
    /// When `self` and `other` are the arena's two most recent allocations and
    /// sit back to back, the result is a view spanning both and nothing is
    /// copied. Otherwise a new string is allocated. The content is the same
    /// either way. An empty operand returns the other one unchanged.
    pub fn concat(self, arena: &'a Arena, other: StringValue<'a>) -> Self {
        if other.is_empty() {
            return self;
        }
        if self.is_empty() {
            return other;
        }
        if let Some(bytes) = arena.coalesce(self.bytes, other.bytes) {
            return Self { bytes };
        }
        let dest = arena.allocate(self.len() + other.len());
        let (head, tail) = dest.split_at_mut(self.len());
        head.copy_from_slice(self.bytes);
        tail.copy_from_slice(other.bytes);
        Self { bytes: dest }
    }

    /// Appends a literal. If `self` was the latest allocation and the literal
    /// lands right behind it, no copy of `self` is made.
    pub fn concat_str(self, arena: &'a Arena, text: &str) -> Self {
        let tail = Self::from_text(arena, text);
        self.concat(arena, tail)
    }

    /// Appends `value` in decimal.
    pub fn concat_int(self, arena: &'a Arena, value: i64) -> Self {
        let digits = format_int(arena, value);
        self.concat(arena, digits)
    }

    /// Appends `value` in fixed-point decimal with `frac_digits` digits after the
    /// point.
    pub fn concat_float(self, arena: &'a Arena, value: f64, frac_digits: usize) -> Self {
        let digits = format_float(arena, value, frac_digits);
        self.concat(arena, digits)
    }

    /// Index of the first occurrence of `needle`, if any. The empty needle is
    /// found at 0.
    pub fn find<N: AsRef<[u8]>>(self, needle: N) -> Option<usize> {
        let needle = needle.as_ref();
        if needle.is_empty() {
            return Some(0);
        }
        self.bytes
            .windows(needle.len())
            .position(|window| window == needle)
    }

    /// Whether `needle` occurs anywhere; same as `find(needle).is_some()`.
    pub fn contains<N: AsRef<[u8]>>(self, needle: N) -> bool {
        self.find(needle).is_some()
    }

    /// Whether `byte` occurs anywhere in the string.
    pub fn contains_byte(self, byte: u8) -> bool {
        self.bytes.contains(&byte)
    }

    /// Writes the raw bytes to stdout.
    pub fn print(self) -> std::io::Result<()> {
        let mut out = std::io::stdout().lock();
        out.write_all(self.bytes)?;
        out.flush()
    }

    /// Writes the raw bytes and a newline to stdout.
    pub fn println(self) -> std::io::Result<()> {
        let mut out = std::io::stdout().lock();
        out.write_all(self.bytes)?;
        out.write_all(b"\n")?;
        out.flush()
    }
}

impl AsRef<[u8]> for StringValue<'_> {
    fn as_ref(&self) -> &[u8] {
        self.bytes
    }
}

impl PartialEq for StringValue<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.bytes == other.bytes
    }
}

impl Eq for StringValue<'_> {}

impl PartialEq<[u8]> for StringValue<'_> {
    fn eq(&self, other: &[u8]) -> bool {
        self.bytes == other
    }
}

impl PartialEq<&[u8]> for StringValue<'_> {
    fn eq(&self, other: &&[u8]) -> bool {
        self.bytes == *other
    }
}

impl<const N: usize> PartialEq<&[u8; N]> for StringValue<'_> {
    fn eq(&self, other: &&[u8; N]) -> bool {
        self.bytes == other.as_slice()
    }
}

impl PartialEq<str> for StringValue<'_> {
    fn eq(&self, other: &str) -> bool {
        self.bytes == other.as_bytes()
    }
}

impl PartialEq<&str> for StringValue<'_> {
    fn eq(&self, other: &&str) -> bool {
        self.bytes == other.as_bytes()
    }
}

impl core::hash::Hash for StringValue<'_> {
    fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
        self.bytes.hash(state);
    }
}

impl core::fmt::Display for StringValue<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(self.bytes))
    }
}

impl core::fmt::Debug for StringValue<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "\"{}\"", self.bytes.escape_ascii())
    }
}
