//! Locate a previous run and allocate directories for the new run.

use std::path::PathBuf;
use colored::Colorize;
use const_format::str_repeat;
use crate::{
    err::{Error, validate_param},
    ext::fmt as fmt_ext,
    files::{
        Stage, InitToken, PathRegistry,
        bootstrap::{self, Request},
    },
};

struct Args {
    /// Start stage and its input, one per flag. Exactly one is allowed.
    inputs: Vec<(Stage, PathBuf)>,
    output: Option<PathBuf>,
    name: String,
    species_tree: Option<PathBuf>,
    pickle: Option<PathBuf>,
}

impl Default for Args {
    fn default() -> Self {
        Self {
            inputs: Vec::new(),
            output: None,
            name: String::new(),
            species_tree: None,
            pickle: None,
        }
    }
}

impl Args {
    /// Validate arguments, modifying some, if needed.
    fn validate(mut self) -> Result<Self, Error> {
        validate_param!(!self.inputs.is_empty(),
            "Input is not provided (see -f/--fasta, -b/--blast, --fg/--from-groups, --ft/--from-trees)");
        validate_param!(self.inputs.len() == 1, "Only one of -f, -b, --fg and --ft can be provided");
        self.name = self.name.trim().to_owned();
        validate_param!(!self.name.contains(std::path::is_separator),
            "Run name ({}) cannot contain path separators", self.name);
        if self.species_tree.is_some() && self.inputs[0].0 != Stage::Trees {
            log::warn!("Species tree (-s) is only used together with --ft");
        }
        Ok(self)
    }

    fn into_request(mut self) -> Request {
        let (stage, input) = self.inputs.swap_remove(0);
        Request {
            stage, input,
            results_dir: self.output,
            name: self.name,
            species_tree: self.species_tree,
            pickle_dir: self.pickle,
            command_line: super::common::command_line(),
        }
    }
}

fn print_help() {
    const KEY: usize = 18;
    const VAL: usize = 4;
    const EMPTY: &'static str = str_repeat!(" ", KEY + VAL + 5);

    println!("{}", "Locate previous run and allocate directories for the new run.".yellow());

    println!("\n{} {} prepare (-f | -b | --fg | --ft) DIR [arguments]",
        "Usage:".bold(), super::PKG_NAME);

    println!("\n{}", "Start stage (exactly one):".bold());
    println!("    {:KEY$} {:VAL$}  Start from FASTA files in this directory.",
        "-f, --fasta".green(), "DIR".yellow());
    println!("    {:KEY$} {:VAL$}  Start from pairwise comparisons of a previous run.",
        "-b, --blast".green(), "DIR".yellow());
    println!("    {:KEY$} {:VAL$}  Start from orthogroups of a previous run.\n\
        {EMPTY}  Alternatively, the clusters file ({}).",
        "    --fg".green(), "DIR".yellow(), "*_id_pairs.txt".underline());
    println!("    {:KEY$} {:VAL$}  Start from gene and species trees of a previous run.",
        "    --ft".green(), "DIR".yellow());

    println!("\n{}", "Optional parameters:".bold());
    println!("    {:KEY$} {:VAL$}  Create results in this directory instead of the default location.",
        "-o, --output".green(), "DIR".yellow());
    println!("    {:KEY$} {:VAL$}  Append name to the new directories.",
        "-n, --name".green(), "STR".yellow());
    println!("    {:KEY$} {:VAL$}  Rooted species tree, overrides the tree of the previous run.",
        "-s, --species-tree".green(), "FILE".yellow());
    println!("    {:KEY$} {:VAL$}  Directory for intermediate pickle files.",
        "-p, --pickle".green(), "DIR".yellow());

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
            Short('f') | Long("fasta") => args.inputs.push((Stage::Fasta, parser.value()?.parse()?)),
            Short('b') | Long("blast") => args.inputs.push((Stage::Comparisons, parser.value()?.parse()?)),
            Long("fg") | Long("from-groups") => args.inputs.push((Stage::Groups, parser.value()?.parse()?)),
            Long("ft") | Long("from-trees") => args.inputs.push((Stage::Trees, parser.value()?.parse()?)),

            Short('o') | Long("output") => args.output = Some(parser.value()?.parse()?),
            Short('n') | Long("name") => args.name = parser.value()?.parse()?,
            Short('s') | Long("species-tree") => args.species_tree = Some(parser.value()?.parse()?),
            Short('p') | Long("pickle") => args.pickle = Some(parser.value()?.parse()?),

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

/// Counts species FASTA files in the base working directory.
fn count_species(registry: &PathRegistry) -> Result<usize, Error> {
    let n = registry.sorted_species_fasta()?.len();
    log::info!("Found {} species in {}", n, fmt_ext::path(registry.working_base()?));
    Ok(n)
}

fn report(registry: &PathRegistry) {
    const KEY: usize = 26;
    println!("{}", "Directories:".bold());
    for (role, dir) in registry.dirs().roles() {
        match dir {
            Some(dir) => println!("    {:KEY$}  {}", role, fmt_ext::path(dir).cyan()),
            None => println!("    {:KEY$}  {}", role, "-".dimmed()),
        }
    }
    if let Ok(clusters) = registry.clusters() {
        println!("    {:KEY$}  {}", "Clusters", fmt_ext::path(clusters.base()).cyan());
    }
    if let Ok(tree) = registry.species_tree_rooted() {
        println!("    {:KEY$}  {}", "Rooted species tree", fmt_ext::path(tree).cyan());
    }
}

pub(super) fn run(argv: &[String]) -> Result<(), Error> {
    let args = parse_args(argv)?.validate()?;
    let token = InitToken::acquire()?;
    let registry = bootstrap::initialise(token, args.into_request())?;
    count_species(&registry)?;
    report(&registry);
    log::info!("Success!");
    Ok(())
}
