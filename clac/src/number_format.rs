// SPDX-License-Identifier: Apache-2.0

//! Decimal formatting straight into arena memory.
//!
//! Numbers are rendered twice with the same `fmt::Arguments`: once into a
//! counter to learn the exact length, then into a slice of precisely that size
//! allocated from the arena. No intermediate heap string is built.

use core::fmt::{self, Write};

use log::warn;

use crate::{Arena, StringValue};

/// Counts bytes without storing them.
struct LengthCounter(usize);

impl Write for LengthCounter {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.0 = self.0.saturating_add(s.len());
        Ok(())
    }
}

/// Writes into a fixed slice, failing instead of truncating on overflow.
struct SliceWriter<'b> {
    buffer: &'b mut [u8],
    pos: usize,
}

impl Write for SliceWriter<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let end = self.pos.checked_add(s.len()).ok_or(fmt::Error)?;
        let dest = self.buffer.get_mut(self.pos..end).ok_or(fmt::Error)?;
        dest.copy_from_slice(s.as_bytes());
        self.pos = end;
        Ok(())
    }
}

/// Renders `args` into a freshly allocated arena string.
pub(crate) fn format_into<'a>(arena: &'a Arena, args: fmt::Arguments<'_>) -> StringValue<'a> {
    let mut counter = LengthCounter(0);
    if counter.write_fmt(args).is_err() {
        return StringValue::empty();
    }
    let dest = arena.allocate(counter.0);
    let mut writer = SliceWriter {
        buffer: &mut *dest,
        pos: 0,
    };
    // A second rendering that does not fit the measured length is discarded.
    if writer.write_fmt(args).is_err() || writer.pos != counter.0 {
        warn!(
            "format: rendered {} bytes into a {} byte slot",
            writer.pos, counter.0
        );
        return StringValue::empty();
    }
    let dest: &'a [u8] = dest;
    StringValue::from_arena(dest)
}

/// Formats `value` in decimal, with a leading `-` when negative.
pub(crate) fn format_int(arena: &Arena, value: i64) -> StringValue<'_> {
    format_into(arena, format_args!("{}", value))
}

/// Fixed-point decimal with exactly `frac_digits` digits after the point.
pub(crate) fn format_float(arena: &Arena, value: f64, frac_digits: usize) -> StringValue<'_> {
    format_into(arena, format_args!("{:.*}", frac_digits, value))
}
