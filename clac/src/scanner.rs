// SPDX-License-Identifier: Apache-2.0

use log::trace;

use crate::{ScanError, StringValue};

/// A cursor over a [`StringValue`].
///
/// `position` is the next byte to be consumed; `peek_offset` is how far
/// look-ahead has run past it. Every consuming call resets the look-ahead.
/// Substrings handed back are forward slices of the source, so scanning never
/// allocates.
#[derive(Debug, Clone)]
pub struct Scanner<'a> {
    source: StringValue<'a>,
    position: usize,
    peek_offset: usize,
}

impl<'a> Scanner<'a> {
    /// A scanner at the start of `source`.
    pub fn new(source: StringValue<'a>) -> Self {
        Self {
            source,
            position: 0,
            peek_offset: 0,
        }
    }

    /// The string being scanned.
    pub fn source(&self) -> StringValue<'a> {
        self.source
    }

    /// Index of the next byte to be consumed.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.source.len().saturating_sub(self.position)
    }

    /// Whether `next()` would return a byte.
    pub fn has_next(&self) -> bool {
        self.position < self.source.len()
    }

    /// Whether `peek()` would return a byte.
    pub fn can_peek(&self) -> bool {
        self.position + self.peek_offset < self.source.len()
    }

    /// Whether anything has been consumed yet.
    pub fn has_prev(&self) -> bool {
        self.position > 0
    }

    /// Rewinds look-ahead to the cursor.
    pub fn reset_peek(&mut self) {
        self.peek_offset = 0;
    }

    fn advance_to(&mut self, position: usize) {
        self.position = position.min(self.source.len());
        self.peek_offset = 0;
    }

    /// Consumes and returns one byte.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Result<u8, ScanError> {
        match self.source.get(self.position) {
            Some(byte) => {
                self.advance_to(self.position + 1);
                Ok(byte)
            }
            None => {
                self.peek_offset = 0;
                trace!("scanner: next() at end of input ({})", self.position);
                Err(ScanError::EndOfInput)
            }
        }
    }

    /// Returns the byte at the look-ahead position and moves look-ahead one
    /// further, leaving the cursor where it is. Repeated calls walk ahead.
    pub fn peek(&mut self) -> Result<u8, ScanError> {
        let at = self.position + self.peek_offset;
        let byte = self.source.get(at).ok_or(ScanError::EndOfInput)?;
        self.peek_offset += 1;
        Ok(byte)
    }

    /// Consumes up to `n` bytes, fewer if the input runs out first.
    pub fn next_n(&mut self, n: usize) -> StringValue<'a> {
        let start = self.position;
        let end = start.saturating_add(n).min(self.source.len());
        self.advance_to(end);
        self.source.forward_slice(start, end)
    }

    /// Looks at up to `n` bytes past the current look-ahead position and moves
    /// look-ahead past them.
    pub fn peek_n(&mut self, n: usize) -> StringValue<'a> {
        let start = self.position + self.peek_offset;
        let end = start.saturating_add(n).min(self.source.len());
        self.peek_offset = end - self.position;
        self.source.forward_slice(start, end)
    }

    /// The byte just before the cursor.
    pub fn prev(&self) -> Result<u8, ScanError> {
        match self.position.checked_sub(1) {
            Some(index) => self.source.get(index).ok_or(ScanError::NoPrevious),
            None => Err(ScanError::NoPrevious),
        }
    }

    /// Consumes every leading byte that is a member of `set`.
    pub fn skip<S: AsRef<[u8]>>(&mut self, set: S) {
        let set = set.as_ref();
        let skipped = self
            .source
            .as_bytes()
            .get(self.position..)
            .unwrap_or_default()
            .iter()
            .take_while(|&&byte| set.contains(&byte))
            .count();
        if skipped > 0 {
            self.advance_to(self.position + skipped);
        }
    }

    /// Consumes up to and including the first byte that is a member of `set`,
    /// returning what came before it. Without a delimiter the rest of the input
    /// is returned and the cursor ends up at the end.
    pub fn scan_until<S: AsRef<[u8]>>(
        &mut self,
        set: S,
    ) -> Result<StringValue<'a>, ScanError> {
        if !self.has_next() {
            self.peek_offset = 0;
            return Err(ScanError::EndOfInput);
        }
        let set = set.as_ref();
        let start = self.position;
        let rest = self.source.as_bytes().get(start..).unwrap_or_default();
        let (end, resume) = match rest.iter().position(|byte| set.contains(byte)) {
            Some(offset) => (start + offset, start + offset + 1),
            None => (self.source.len(), self.source.len()),
        };
        self.advance_to(resume);
        Ok(self.source.forward_slice(start, end))
    }

    /// Consumes through the first occurrence of `sequence` in the unconsumed
    /// input, returning what came before it. Without a match the rest of the
    /// input is returned and the cursor ends up at the end.
    pub fn scan_match<S: AsRef<[u8]>>(
        &mut self,
        sequence: S,
    ) -> Result<StringValue<'a>, ScanError> {
        if !self.has_next() {
            self.peek_offset = 0;
            return Err(ScanError::EndOfInput);
        }
        let sequence = sequence.as_ref();
        let start = self.position;
        let rest = self.source.forward_slice(start, self.source.len());
        let (end, resume) = match rest.find(sequence) {
            Some(offset) => (start + offset, start + offset + sequence.len()),
            None => (self.source.len(), self.source.len()),
        };
        self.advance_to(resume);
        Ok(self.source.forward_slice(start, end))
    }
}
