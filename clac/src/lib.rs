// SPDX-License-Identifier: Apache-2.0

//! Arena-backed strings and a text scanner.
//!
//! All string data lives in an [`Arena`]: large blocks handed out by bumping a
//! cursor. A [`StringValue`] is a cheap immutable view into those blocks, and a
//! [`Scanner`] walks a `StringValue` handing back more views.
//!
//! Arena bytes are only ever reachable mutably while they are being filled
//! (see [`StringValue::from_fn`]); every value handed out is read-only.
//!
//! ```
//! use clac::{Arena, Scanner, StringValue};
//!
//! let arena = Arena::new();
//! let text = StringValue::from_text(&arena, "name = clac");
//! let mut scanner = Scanner::new(text);
//! let key = scanner.scan_match(" = ").unwrap();
//! let value = scanner.next_n(usize::MAX);
//! assert_eq!(key, "name");
//! assert_eq!(value, "clac");
//! ```

mod arena;
pub use arena::{Arena, ArenaStats, BlockStats, DEFAULT_BLOCK_CAPACITY};

mod error;
pub use error::{FileError, ScanError};

mod file_io;
pub use file_io::{read_all, write_all};

mod number_format;

pub mod pipeline;

mod scanner;
pub use scanner::Scanner;

mod string_value;
pub use string_value::StringValue;
