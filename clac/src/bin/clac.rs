// SPDX-License-Identifier: Apache-2.0

use std::path::PathBuf;
use std::process;

use clap::Parser;
use log::{error, info};

use clac::pipeline::{self, Options};
use clac::{read_all, write_all, Arena, FileError};

/// Compiler for clara.
#[derive(Parser, Debug)]
#[command(name = "clac", version, about)]
struct Cli {
    /// Partial compilation: compile to C code, keep temporary files
    #[arg(short = 'p', long = "part")]
    partial: bool,
    /// Unary compilation: compile all source code to a single file
    #[arg(short = 'm', long = "mono")]
    mono: bool,
    /// Loud compilation: progress printouts, list generated files
    #[arg(short = 'l', long = "loud")]
    loud: bool,
    /// List parsing step results
    #[arg(long = "parse")]
    list_parse: bool,
    /// List tokenization step results
    #[arg(long = "tokens")]
    list_tokens: bool,
    /// List all user types
    #[arg(long = "types")]
    list_types: bool,
    /// List all user functions
    #[arg(long = "funcs")]
    list_funcs: bool,
    /// List all user modules and namespaces
    #[arg(long = "mods")]
    list_mods: bool,
    /// List complete user types, functions, modules and namespaces
    #[arg(long = "full")]
    list_full: bool,
    /// Source file
    infile: PathBuf,
    /// Output file
    outfile: PathBuf,
}

impl Cli {
    fn options(&self) -> Options {
        Options {
            partial: self.partial,
            mono: self.mono,
            loud: self.loud,
            list_parse: self.list_parse,
            list_tokens: self.list_tokens,
            list_types: self.list_types,
            list_funcs: self.list_funcs,
            list_mods: self.list_mods,
            list_full: self.list_full,
        }
    }
}

fn fatal(err: &FileError) -> ! {
    error!("{err}");
    eprintln!("Error: {err}");
    process::exit(1);
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.loud { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let arena = Arena::new();
    let input = match read_all(&arena, &cli.infile) {
        Ok(input) => input,
        Err(e) => fatal(&e),
    };

    let mut stdout = std::io::stdout().lock();
    let output = match pipeline::run(input, &cli.options(), &mut stdout) {
        Ok(output) => output,
        Err(e) => {
            eprintln!("Error: unable to write listing: {e}");
            process::exit(1);
        }
    };

    if let Err(e) = write_all(&cli.outfile, output) {
        fatal(&e);
    }

    if cli.loud {
        info!("arena: {}", arena.stats());
    }
}
