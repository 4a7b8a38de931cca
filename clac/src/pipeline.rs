// SPDX-License-Identifier: Apache-2.0

//! Entry point the command line drives.
//!
//! There are no compilation stages yet: the output is the input. The listing
//! switches are accepted so the command line is stable; raw lexemes are the
//! only listing with anything to show.

use std::io::Write;

use log::info;

use crate::{Scanner, StringValue};

/// Bytes treated as separators between raw lexemes.
pub const WHITESPACE: &[u8] = b" \t\r\n\x0b\x0c";

/// Switches read from the command line.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Options {
    /// Stop after generating intermediate code and keep temporary files.
    pub partial: bool,
    /// Emit all output into a single file.
    pub mono: bool,
    /// Report progress while running.
    pub loud: bool,
    pub list_parse: bool,
    pub list_tokens: bool,
    pub list_types: bool,
    pub list_funcs: bool,
    pub list_mods: bool,
    pub list_full: bool,
}

/// Whitespace-separated runs of bytes, in order.
pub struct Lexemes<'a> {
    scanner: Scanner<'a>,
}

impl<'a> Lexemes<'a> {
    pub fn new(source: StringValue<'a>) -> Self {
        Self {
            scanner: Scanner::new(source),
        }
    }
}

impl<'a> Iterator for Lexemes<'a> {
    type Item = StringValue<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        self.scanner.skip(WHITESPACE);
        self.scanner.scan_until(WHITESPACE).ok()
    }
}

/// Runs the pipeline over `input` and returns the output text. Listings
/// requested by `options` are written to `listing`.
pub fn run<'a, W: Write>(
    input: StringValue<'a>,
    options: &Options,
    listing: &mut W,
) -> std::io::Result<StringValue<'a>> {
    if options.loud {
        info!("processing {} bytes", input.len());
    }
    if options.list_tokens {
        for lexeme in Lexemes::new(input) {
            listing.write_all(lexeme.as_bytes())?;
            listing.write_all(b"\n")?;
        }
    }
    let empty_listings = [
        (options.list_parse, "parse"),
        (options.list_types, "types"),
        (options.list_funcs, "funcs"),
        (options.list_mods, "mods"),
        (options.list_full, "full"),
    ];
    for (_, name) in empty_listings.iter().filter(|(requested, _)| *requested) {
        writeln!(listing, "{name}: nothing to list")?;
    }
    Ok(input)
}
