// SPDX-License-Identifier: Apache-2.0

// Exit codes and output of the `clac` binary

#![cfg(feature = "cli")]

use std::path::PathBuf;
use std::process::{Command, Output};

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("clac-cli-{}-{}", std::process::id(), name))
}

fn clac(args: &[&std::ffi::OsStr]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_clac"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to spawn clac")
}

#[test]
fn test_help_exits_zero() {
    let output = clac(&["--help".as_ref()]);
    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Usage"), "unexpected help text: {stdout}");
    assert!(stdout.contains("--tokens"));
}

#[test]
fn test_copy_round_trip_exits_zero() {
    let input = temp_path("copy_in.cl");
    let output_path = temp_path("copy_out.c");
    std::fs::write(&input, "fn main() {\n\tret 0;\n}\n").unwrap();

    let output = clac(&[input.as_os_str(), output_path.as_os_str()]);
    assert_eq!(output.status.code(), Some(0), "stderr: {:?}", output.stderr);
    assert!(output.stderr.is_empty());
    assert_eq!(
        std::fs::read(&output_path).unwrap(),
        b"fn main() {\n\tret 0;\n}\n"
    );

    std::fs::remove_file(&input).unwrap();
    std::fs::remove_file(&output_path).unwrap();
}

#[test]
fn test_tokens_listing_goes_to_stdout() {
    let input = temp_path("tokens_in.cl");
    let output_path = temp_path("tokens_out.c");
    std::fs::write(&input, "let x = 1;").unwrap();

    let output = clac(&[
        "--tokens".as_ref(),
        input.as_os_str(),
        output_path.as_os_str(),
    ]);
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(output.stdout, b"let\nx\n=\n1;\n");

    std::fs::remove_file(&input).unwrap();
    std::fs::remove_file(&output_path).unwrap();
}

#[test]
fn test_missing_input_exits_one_with_message() {
    let input = temp_path("missing_in.cl");
    let output_path = temp_path("missing_out.c");

    let output = clac(&[input.as_os_str(), output_path.as_os_str()]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Failed to open file for read"),
        "unexpected stderr: {stderr}"
    );
    assert!(!output_path.exists());
}

#[test]
fn test_unwritable_output_exits_one() {
    let input = temp_path("unwritable_in.cl");
    std::fs::write(&input, "x").unwrap();
    let output_path = temp_path("no_such_dir").join("out.c");

    let output = clac(&[input.as_os_str(), output_path.as_os_str()]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Failed to open file for write"));

    std::fs::remove_file(&input).unwrap();
}

#[test]
fn test_missing_arguments_is_a_usage_error() {
    let output = clac(&[]);
    assert_eq!(output.status.code(), Some(2));
}
