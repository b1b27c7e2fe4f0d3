//! Show directory layout of a previous run.

use std::path::{Path, PathBuf};
use colored::Colorize;
use crate::{
    err::{Error, validate_param},
    ext::fmt as fmt_ext,
    files::{
        names, probe, RunLayout,
        runlog::{self, LogRecord},
    },
};

#[derive(Default)]
struct Args {
    dir: Option<PathBuf>,
}

impl Args {
    fn validate(self) -> Result<Self, Error> {
        validate_param!(self.dir.is_some(), "Directory is not provided");
        Ok(self)
    }
}

fn print_help() {
    const KEY: usize = 12;
    const VAL: usize = 4;

    println!("{}", "Show directory layout of a previous run.".yellow());
    println!("\n{} {} detect DIR", "Usage:".bold(), super::PKG_NAME);
    println!("\n{}", "Other parameters:".bold());
    println!("    {:KEY$} {:VAL$}  Show this help message.", "-h, --help".green(), super::flag());
    println!("    {:KEY$} {:VAL$}  Show version.", "-V, --version".green(), super::flag());
}

fn parse_args(argv: &[String]) -> Result<Args, lexopt::Error> {
    use lexopt::prelude::*;
    let mut args = Args::default();
    let mut parser = lexopt::Parser::from_args(argv);

    while let Some(arg) = parser.next()? {
        match arg {
            Value(val) if args.dir.is_none() => args.dir = Some(val.into()),
            Short('V') | Long("version") => {
                super::print_version();
                std::process::exit(0);
            }
            Short('h') | Long("help") => {
                print_help();
                std::process::exit(0);
            }
            _ => Err(arg.unexpected())?,
        }
    }
    Ok(args)
}

/// Describes the directory: recorded directories for the new layout, working directory candidates for the old one.
fn describe(dir: &Path) -> Result<Vec<(String, String)>, Error> {
    let layout = RunLayout::detect(dir)?;
    let mut lines = vec![("Layout".to_owned(), layout.to_string())];
    match layout {
        RunLayout::NewStyle => {
            let record = LogRecord::load(&dir.join(names::LOG))?;
            lines.push(("Log entries".to_owned(), record.len().to_string()));
            for key in [runlog::WD_BASE, runlog::WD_OGS, runlog::WD_TREES, runlog::ORTHOGROUPS] {
                if let Some(value) = record.get(key) {
                    lines.push((key.to_owned(), value.to_owned()));
                }
            }
        }
        RunLayout::OldStyle => {
            for candidate in [dir.to_owned(), dir.join(names::WORKING_DIR)] {
                if probe::is_working_dir(&candidate)? {
                    lines.push(("Working directory".to_owned(), fmt_ext::path(&candidate)));
                }
            }
        }
    }
    Ok(lines)
}

pub(super) fn run(argv: &[String]) -> Result<(), Error> {
    let args = parse_args(argv)?.validate()?;
    let dir = args.dir.as_ref().unwrap();
    for (key, value) in describe(dir)? {
        println!("{:>20}  {}", key.bold(), value.cyan());
    }
    Ok(())
}
