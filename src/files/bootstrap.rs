//! Initialises the path registry for the requested start stage.

use std::path::{Path, PathBuf};
use crate::{
    Error,
    err::error,
    ext,
};
use super::{
    legacy, modern, names, PriorRun,
    layout::Stage,
    registry::{InitToken, PathRegistry, StartPoint},
};

/// Everything needed to initialise the registry.
#[derive(Clone, Debug)]
pub struct Request {
    pub stage: Stage,
    /// Directory with input FASTA files (`Fasta` stage), or the continuation directory.
    /// For the `Groups` stage, this can also be a cluster pairs file.
    pub input: PathBuf,
    /// Directory in which new results are created, overrides the default location.
    pub results_dir: Option<PathBuf>,
    /// Optional name, appended to the new directories.
    pub name: String,
    /// Rooted species tree, overrides the species tree of the previous run.
    pub species_tree: Option<PathBuf>,
    pub pickle_dir: Option<PathBuf>,
    /// Written to the run log.
    pub command_line: String,
}

/// Locates files of a previous run: uses the run log if possible, otherwise searches for the files.
pub fn locate_prior(dir: &Path, stage: Stage, user_tree: Option<&Path>) -> crate::Result<PriorRun> {
    match modern::locate(dir, stage, user_tree) {
        Err(Error::Unprocessable(_)) => {
            log::debug!("{} has no run log, searching for files of the previous run", ext::fmt::path(dir));
            legacy::locate(dir, stage, user_tree)
        }
        res => res,
    }
}

/// Converts files of the previous run into the registry protocol for the stage.
fn start_point(prior: PriorRun, stage: Stage) -> Result<StartPoint, Error> {
    let PriorRun { working_base, trees_root, clusters, species_tree, .. } = prior;
    let absent = |what: &str| error!(InvalidState, "previous run was located without {}", what);
    Ok(match stage {
        Stage::Fasta => StartPoint::Fresh,
        Stage::Comparisons => StartPoint::Comparisons { working_base },
        Stage::Groups => StartPoint::Groups {
            working_base,
            clusters: clusters.ok_or_else(|| absent("clusters"))?,
        },
        Stage::Trees => StartPoint::Trees {
            working_base,
            trees_root: trees_root.ok_or_else(|| absent("trees working directory"))?,
            clusters: clusters.ok_or_else(|| absent("clusters"))?,
            species_tree: species_tree.ok_or_else(|| absent("species tree"))?,
        },
    })
}

/// Finds the previous run (if needed), creates the base directory and the new paired directories.
pub fn initialise(token: InitToken, request: Request) -> crate::Result<PathRegistry> {
    let input = ext::sys::absolute(&request.input)?;
    if !ext::sys::exists(&input)? {
        return Err(Error::missing("input does not exist", vec![input]));
    }
    let results_dir = request.results_dir.as_deref().map(ext::sys::absolute).transpose()?;
    let species_tree = request.species_tree.as_deref().map(ext::sys::absolute).transpose()?;

    let (base, start) = match request.stage {
        Stage::Fasta => (results_dir.unwrap_or_else(|| input.join(names::LEGACY_HOME)), StartPoint::Fresh),
        stage => {
            let prior = locate_prior(&input, stage, species_tree.as_deref())?;
            log::info!("Continuing from {} in {}", stage, ext::fmt::path(&prior.working_base));
            let base = results_dir.unwrap_or_else(|| prior.home_for_results.clone());
            (base, start_point(prior, stage)?)
        }
    };
    ext::sys::mkdir(&base)?;
    let mut registry = PathRegistry::new(token, &base, &request.name, start, request.command_line)?;
    if let Some(dir) = request.pickle_dir {
        registry.set_pickle_dir(ext::sys::absolute(&dir)?);
    }
    Ok(registry)
}
