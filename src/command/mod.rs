mod common;
mod prepare;
mod detect;

use colored::Colorize;

use crate::{
    Error,
    err::error,
};
use common::print_version;

const PKG_NAME: &'static str = env!("CARGO_PKG_NAME");

/// Placeholder for flags without values in the help message.
fn flag() -> colored::ColoredString {
    "".normal()
}

fn print_help() {
    print_version();
    println!("\n{} {} command [arguments]",
        "Usage:".bold(), PKG_NAME);

    println!("\n{}", "[ Directories ]".bold());
    println!("    {:<7}  Locate previous run and allocate directories for the new run.", "prepare".red());
    println!("    {:<7}  Show directory layout of a previous run.", "detect".red());

    println!("\n{}", "[ General help ]".bold());
    println!("    {:<7}  Show this help message.", "help".red());
    println!("    {:<7}  Show version.", "version".red());
}

pub fn run(argv: &[String]) -> Result<(), Error> {
    if argv.len() <= 1 {
        print_help();
        std::process::exit(1);
    }
    match &argv[1] as &str {
        "prepare" => prepare::run(&argv[2..])?,
        "detect" => detect::run(&argv[2..])?,
        "help" | "h" | "--help" | "-h" => print_help(),
        "version" | "--version" | "-V" => print_version(),
        cmd => return Err(error!(InvalidInput, "Unknown command {} (see {} help)", cmd, PKG_NAME)),
    }
    Ok(())
}
