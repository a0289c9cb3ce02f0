use regex_for_range::{parse_integer, BigInt, Error, IntegerType, RangeRegex};

use std::io::{self, Write};
use std::process;

fn print_usage() {
    eprintln!(
        "\
Usage: rfr [OPTIONS] <COMMAND>

Commands:
  regex <start> <end>              Print the regex matching every integer in the range
  type  <name> [<range>]           Print the regex for an integer type (int8 .. uint64),
                                   optionally restricted by a range such as 1..100
  hir   <start> <end>              Print the parsed HIR of the anchored regex
  match <start> <end> <input>...   Match inputs against the regex for the range

Options:
  --verbose   Print every compilation stage to stderr
  -h, --help  Print this help message"
    );
}

enum Command {
    Regex { start: BigInt, end: BigInt },
    Type { ty: IntegerType, range: Option<String> },
    Hir { start: BigInt, end: BigInt },
    Match { start: BigInt, end: BigInt, inputs: Vec<String> },
}

fn fail(err: impl std::fmt::Display) -> ! {
    eprintln!("error: {err}");
    process::exit(1);
}

fn integer(text: &str) -> BigInt {
    parse_integer(text).unwrap_or_else(|e| fail(e))
}

/// Negative numbers are positional arguments, not options.
fn is_option(arg: &str) -> bool {
    arg.starts_with('-') && !arg[1..].starts_with(|c: char| c.is_ascii_digit())
}

fn parse_args() -> (Command, bool) {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.is_empty() {
        print_usage();
        process::exit(1);
    }

    let mut verbose = false;
    let mut positional = Vec::new();

    for arg in &args {
        match arg.as_str() {
            "-h" | "--help" => {
                print_usage();
                process::exit(0);
            }
            "--verbose" => {
                verbose = true;
            }
            other if is_option(other) => {
                eprintln!("error: unknown option: {other}");
                print_usage();
                process::exit(1);
            }
            _ => {
                positional.push(arg.clone());
            }
        }
    }

    if positional.is_empty() {
        print_usage();
        process::exit(1);
    }

    let command = match positional[0].as_str() {
        "regex" | "hir" => {
            if positional.len() != 3 {
                fail(format!(
                    "'{}' command takes exactly two arguments: <start> <end>",
                    positional[0]
                ));
            }
            let start = integer(&positional[1]);
            let end = integer(&positional[2]);
            if positional[0] == "regex" {
                Command::Regex { start, end }
            } else {
                Command::Hir { start, end }
            }
        }
        "type" => {
            if !(2..=3).contains(&positional.len()) {
                fail("'type' command takes a type name and an optional range");
            }
            Command::Type {
                ty: positional[1].parse().unwrap_or_else(|e: Error| fail(e)),
                range: positional.get(2).cloned(),
            }
        }
        "match" => {
            if positional.len() < 4 {
                fail("'match' command requires a start, an end and at least one input");
            }
            Command::Match {
                start: integer(&positional[1]),
                end: integer(&positional[2]),
                inputs: positional[3..].to_vec(),
            }
        }
        other => {
            eprintln!("error: unknown command: {other}");
            print_usage();
            process::exit(1);
        }
    };
    (command, verbose)
}

fn compile(start: BigInt, end: BigInt, verbose: bool) -> RangeRegex {
    if verbose {
        let stderr = io::stderr();
        RangeRegex::with_trace(start, end, stderr.lock()).unwrap_or_else(|e| fail(e))
    } else {
        RangeRegex::new(start, end)
    }
}

fn print_line(line: impl std::fmt::Display) {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    writeln!(out, "{line}")
        .and_then(|()| out.flush())
        .unwrap_or_else(|e| fail(e));
}

fn run_match(range: &RangeRegex, inputs: &[String]) {
    let regex = range.matcher().unwrap_or_else(|e| fail(e));

    eprintln!("range: {}..{}", range.start(), range.end());
    eprintln!("pattern: {range}");
    eprintln!();

    let mut any_failed = false;
    for input in inputs {
        if regex.is_match(input) {
            println!("  \x1b[32mMATCH\x1b[0m  {:?}", input);
        } else {
            println!("  \x1b[31mNO MATCH\x1b[0m  {:?}", input);
            any_failed = true;
        }
    }

    if any_failed {
        process::exit(1);
    }
}

fn main() {
    let (command, verbose) = parse_args();
    match command {
        Command::Regex { start, end } => print_line(compile(start, end, verbose)),
        Command::Type { ty, range } => {
            let (start, end) = ty.range(range.as_deref()).unwrap_or_else(|e| fail(e));
            print_line(compile(start, end, verbose));
        }
        Command::Hir { start, end } => {
            let range = compile(start, end, verbose);
            let hir = range.hir().unwrap_or_else(|e| fail(e));
            print_line(format_args!("{hir:#?}"));
        }
        Command::Match { start, end, inputs } => {
            run_match(&compile(start, end, verbose), &inputs)
        }
    }
}
