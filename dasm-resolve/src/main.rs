use std::fs;
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;

use dasm_resolve::{resolve, transform, Options};

/// Resolve symbolic addresses in assembly source, producing the fully
/// specified text the second phase encodes into machine words.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Assembly source file; stdin when omitted.
    source: Option<PathBuf>,
    /// Resolved output file; stdout when omitted.
    output: Option<PathBuf>,
}

fn main() -> ExitCode {
    let args = Args::parse();
    let src = match read_source(args.source.as_deref()) {
        Ok(src) => src,
        Err(e) => {
            eprintln!("failed to read input: {e}");
            return ExitCode::FAILURE;
        }
    };

    let opts = Options::default();
    let symtab = resolve(&src, &opts.dialect);
    let transformed = match transform(&src, &symtab, &opts, &mut io::stderr()) {
        Ok(t) => t,
        Err(abandoned) => {
            eprintln!("{abandoned}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = write_output(args.output.as_deref(), &transformed.lines) {
        eprintln!("failed to write output: {e}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

fn read_source(path: Option<&Path>) -> io::Result<String> {
    match path {
        Some(path) => fs::read_to_string(path),
        None => {
            let mut out = String::new();
            io::stdin().read_to_string(&mut out)?;
            Ok(out)
        }
    }
}

fn write_output(path: Option<&Path>, lines: &[String]) -> io::Result<()> {
    match path {
        Some(path) => {
            let mut file = BufWriter::new(fs::File::create(path)?);
            for line in lines {
                writeln!(file, "{line}")?;
            }
            file.flush()
        }
        None => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            for line in lines {
                writeln!(out, "{line}")?;
            }
            Ok(())
        }
    }
}
