//! Location of all input and output files of a run.
//!
//! A run either starts from scratch, or continues a previous run. In the latter case, a locator
//! (`modern` for directories with a log file, `legacy` otherwise) finds the files of the previous run,
//! and the `registry` allocates new directories for the current run.

pub mod names;
pub mod probe;
pub mod runlog;
pub mod layout;
pub mod modern;
pub mod legacy;
pub mod registry;
pub mod bootstrap;

use std::{
    fmt,
    path::{Path, PathBuf},
};
use crate::{Error, ext};

pub use layout::{RunLayout, Stage};
pub use registry::{PathRegistry, InitToken, StartPoint};

/// Identifies one clustering result by its base filename (without the `_id_pairs.txt` suffix).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClusterIdentity {
    base: PathBuf,
}

impl ClusterIdentity {
    pub fn new(base: PathBuf) -> Self {
        Self { base }
    }

    /// Creates identity from a `..._id_pairs.txt` filename.
    pub fn from_pairs_file(path: &Path) -> Result<Self, Error> {
        let s = path.to_str().ok_or_else(|| Error::InvalidInput(
            format!("Clusters filename {:?} is not a valid UTF-8", path)))?;
        match s.strip_suffix(names::ID_PAIRS_SUFFIX) {
            Some(base) if !base.is_empty() => Ok(Self::new(PathBuf::from(base))),
            _ => Err(Error::InvalidInput(format!("Clusters file {} does not end with {}",
                ext::fmt::path(path), names::ID_PAIRS_SUFFIX))),
        }
    }

    /// Clusters filename (e.g. `clusters_OrthoFinder_I1.5.txt`).
    pub fn base(&self) -> &Path {
        &self.base
    }

    /// Clusters filename, followed by `_id_pairs.txt`.
    pub fn pairs_file(&self) -> PathBuf {
        ext::sys::append_path(&self.base, names::ID_PAIRS_SUFFIX)
    }
}

impl fmt::Display for ClusterIdentity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.base.to_string_lossy())
    }
}

/// Files and directories of a previous run, found by one of the locators.
#[derive(Clone, Debug)]
pub struct PriorRun {
    /// Working directory with species, sequence IDs and pairwise comparisons.
    pub working_base: PathBuf,
    /// Working directory with trees (only when continuing from trees).
    pub trees_root: Option<PathBuf>,
    /// Clustering result (when continuing from orthogroups or trees).
    pub clusters: Option<ClusterIdentity>,
    /// Rooted species tree (when continuing from trees).
    pub species_tree: Option<PathBuf>,
    /// Directory, where the results of the current run are placed by default.
    pub home_for_results: PathBuf,
}
