//! Running a context script from the command line.
//!
//! Run with: cargo run --example script -- <script-file> [--toon|--json] [-v]

use context_pack::{generate_context, Format, Rendered, Reporter};
use std::error::Error;
use std::io::{self, Write};

fn main() -> Result<(), Box<dyn Error>> {
    let mut path = None;
    let mut format = Format::Json;
    let mut verbose = false;

    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--toon" => format = Format::Toon,
            "--json" => format = Format::Json,
            "-v" | "--verbose" => verbose = true,
            other => path = Some(other.to_string()),
        }
    }
    let Some(path) = path else {
        eprintln!("usage: script <script-file> [--toon|--json] [-v]");
        std::process::exit(2);
    };

    let mut reporter = Reporter::stderr(verbose);
    let document = generate_context(&path, &mut reporter)?;

    let mut rendered = Rendered::new(&document);
    rendered.write_to(format, &mut io::stdout())?;
    io::stdout().flush()?;
    reporter.built(rendered.size(format)?, format);
    Ok(())
}
