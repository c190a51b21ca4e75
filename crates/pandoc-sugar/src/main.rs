/*
 * main.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Pandoc JSON filter entry point.
//!
//! Speaks pandoc's filter convention: the document arrives as JSON on
//! stdin, the target format name as the first positional argument, and
//! the rewritten document leaves on stdout. Diagnostics go to stderr and
//! never fail the run; only a malformed document or an unknown filter
//! name exits non-zero.

use clap::Parser;
use std::io::{self, Read, Write};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pandoc_sugar::diagnostics::Diagnostic;
use pandoc_sugar::format::TargetFormat;
use pandoc_sugar::{pipeline, readers, writers};

#[derive(Parser, Debug)]
#[command(name = "pandoc-sugar")]
#[command(about = "Pandoc JSON filter for admonitions, columns, environments, and reference links")]
struct Args {
    /// Target format name, as pandoc passes it to its filters
    #[arg(default_value = "")]
    format: String,

    #[arg(short = 'i', long = "input", default_value = "-")]
    input: String,

    #[arg(short = 'o', long = "output")]
    output: Option<String>,

    /// Run only the named built-in filters, in order (can be specified
    /// multiple times; the default is all of them)
    #[arg(short = 'F', long = "filter", action = clap::ArgAction::Append)]
    filters: Vec<String>,

    #[arg(long = "json-errors")]
    json_errors: bool,

    #[arg(short = 'v', long = "verbose")]
    verbose: bool,
}

fn report(diagnostics: &[Diagnostic], json_errors: bool) {
    for diagnostic in diagnostics {
        if json_errors {
            eprintln!("{}", diagnostic.to_json());
        } else {
            eprintln!("{}", diagnostic.to_text());
        }
    }
}

fn main() {
    let args = Args::parse();

    let default_directive = if args.verbose {
        "pandoc_sugar=debug"
    } else {
        "pandoc_sugar=info"
    };
    // stdout carries the rewritten document, so logging goes to stderr
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_directive.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let mut input = String::new();
    if args.input == "-" {
        if let Err(e) = io::stdin().read_to_string(&mut input) {
            eprintln!("Failed to read from stdin: {}", e);
            std::process::exit(1);
        }
    } else if let Err(e) =
        std::fs::File::open(&args.input).and_then(|mut file| file.read_to_string(&mut input))
    {
        eprintln!("Failed to read input file {}: {}", args.input, e);
        std::process::exit(1);
    }

    let doc = match readers::json::read(&mut input.as_bytes()) {
        Ok(doc) => doc,
        Err(e) => {
            eprintln!("Error reading JSON: {}", e);
            std::process::exit(1);
        }
    };

    let format = TargetFormat::new(args.format);
    let (doc, diagnostics) = match pipeline::apply(doc, format, &args.filters) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("Filter error: {}", e);
            std::process::exit(1);
        }
    };
    report(&diagnostics, args.json_errors);

    let mut buf = Vec::new();
    if let Err(e) = writers::json::write(&doc, &mut buf) {
        eprintln!("Error writing JSON: {}", e);
        std::process::exit(1);
    }

    if let Some(output_path) = args.output {
        if let Err(e) = std::fs::write(&output_path, &buf) {
            eprintln!("Failed to write output to file {}: {}", output_path, e);
            std::process::exit(1);
        }
    } else if let Err(e) = io::stdout().write_all(&buf) {
        eprintln!("Failed to write to stdout: {}", e);
        std::process::exit(1);
    }
}
