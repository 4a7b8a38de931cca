// Example walking a small config file with the scanner

use clac::{Arena, ScanError, Scanner, StringValue};

fn main() -> Result<(), ScanError> {
    let arena = Arena::with_block_capacity(256);
    let text = StringValue::from_text(
        &arena,
        "# build settings\nname = clac\nopt-level = 2\n\ntarget = c99\n",
    );
    println!("Input: {:?}", text);

    let mut scanner = Scanner::new(text);
    while scanner.has_next() {
        scanner.skip(" \t\n");
        if scanner.peek() == Ok(b'#') {
            let comment = scanner.scan_until("\n")?;
            println!("Comment: '{}'", comment);
            continue;
        }
        scanner.reset_peek();
        let key = match scanner.scan_match(" = ") {
            Ok(key) => key,
            Err(ScanError::EndOfInput) => break,
            Err(e) => return Err(e),
        };
        let value = scanner.scan_until("\n")?;
        let line = StringValue::from_text(&arena, "  ")
            .concat(&arena, key)
            .concat_str(&arena, " -> ")
            .concat(&arena, value);
        println!("{}", line);
    }

    let summary = StringValue::from_text(&arena, "Arena bytes used: ")
        .concat_int(&arena, arena.bytes_allocated() as i64);
    println!();
    println!("{}", summary);
    print!("{}", arena.stats());
    Ok(())
}
