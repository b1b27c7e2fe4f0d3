//! Paths to all files and directories of the current run.
//!
//! The registry is created once per process (see `InitToken`), allocates new paired results/working
//! directories and then answers every path request of the later stages.
//! Methods, returning directories, create them if needed; methods, returning files, only compute paths.

use std::{
    fs, io,
    sync::atomic::{AtomicBool, Ordering},
    path::{Path, PathBuf},
};
use crate::{
    Error,
    err::{add_path, error},
    ext,
};
use super::{
    names, ClusterIdentity,
    probe::Probe,
    runlog::{self, RunLog},
};

static INIT_TAKEN: AtomicBool = AtomicBool::new(false);

/// One-shot permission to construct a `PathRegistry`. Only one token is issued per process.
pub struct InitToken(());

impl InitToken {
    pub fn acquire() -> Result<Self, Error> {
        if INIT_TAKEN.swap(true, Ordering::SeqCst) {
            Err(error!(InvalidState, "path registry is already initialised, base working directory cannot be set twice"))
        } else {
            Ok(Self(()))
        }
    }

    /// Token that does not consume the process-wide permission.
    #[cfg(test)]
    pub(crate) fn unchecked() -> Self {
        Self(())
    }
}

/// Files of a previous run, from which the current run continues.
#[derive(Clone, Debug)]
pub enum StartPoint {
    /// Nothing to continue: base working directory is the new working directory.
    Fresh,
    /// Continue from pairwise comparisons, stored in `working_base`.
    Comparisons { working_base: PathBuf },
    /// Continue from orthogroups.
    Groups { working_base: PathBuf, clusters: ClusterIdentity },
    /// Continue from gene and species trees.
    Trees { working_base: PathBuf, trees_root: PathBuf, clusters: ClusterIdentity, species_tree: PathBuf },
}

/// How gene trees are inferred; defines which orthologue directories are needed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TreeMethod {
    Msa,
    Dendroblast,
}

/// Last step of the `Msa` tree method.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopAfter {
    Sequences,
    Alignments,
}

/// All root directories of the run.
#[derive(Default, Clone, Debug)]
pub struct DirectorySet {
    /// Species, sequence IDs and pairwise comparisons. Only read from.
    pub working_base: Option<PathBuf>,
    /// New intermediate files of this run.
    pub working_current: Option<PathBuf>,
    /// Gene and species trees.
    pub trees_root: Option<PathBuf>,
    /// Orthogroup results.
    pub results_primary: Option<PathBuf>,
    /// Orthologue results.
    pub results_secondary: Option<PathBuf>,
}

impl DirectorySet {
    /// Pairs (role, directory).
    pub fn roles(&self) -> [(&'static str, Option<&Path>); 5] {
        [
            ("Base working directory", self.working_base.as_deref()),
            ("Current working directory", self.working_current.as_deref()),
            ("Trees working directory", self.trees_root.as_deref()),
            ("Orthogroups results", self.results_primary.as_deref()),
            ("Orthologues results", self.results_secondary.as_deref()),
        ]
    }
}

fn root<'a>(dir: &'a Option<PathBuf>, role: &str) -> Result<&'a Path, Error> {
    dir.as_deref().ok_or_else(|| error!(InvalidState, "{} directory has not been set", role))
}

/// Creates directory if needed, and returns it.
fn ensure(dir: PathBuf) -> Result<PathBuf, Error> {
    ext::sys::mkdir(&dir)?;
    Ok(dir)
}

/// Finds the lowest version `v`, such that `dir/stem[_v]extension` does not exist (version 0 has no suffix).
pub fn allocate_result_name(dir: &Path, stem: &str, extension: &str) -> Result<(PathBuf, usize), Error> {
    let mut version = 0;
    loop {
        let path = dir.join(names::versioned(stem, version, extension));
        if !ext::sys::exists(&path)? {
            return Ok((path, version));
        }
        version += 1;
    }
}

/// Creates new directory, returns false if it already exists.
fn create_new_dir(path: &Path) -> Result<bool, Error> {
    match fs::create_dir(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Ok(false),
        Err(e) => Err(Error::Io(e, vec![path.to_owned()])),
    }
}

/// Creates `base/Results_[name_]<date>[_v]` and `base/WorkingDirectory_[name_]<date>[_v]`
/// with the lowest version `v`, for which neither directory exists yet.
/// Both directories receive an empty log file.
pub fn create_paired_dirs(base: &Path, name: &str) -> Result<(PathBuf, PathBuf), Error> {
    let date = chrono::Local::now().format("%b%d");
    let stem = if name.is_empty() { date.to_string() } else { format!("{}_{}", name, date) };
    let mut version = 0;
    loop {
        let suffix = names::versioned(&stem, version, "");
        let results = base.join(format!("{}{}", names::RESULTS_PREFIX, suffix));
        let working = base.join(format!("{}{}", names::WORKING_PREFIX, suffix));
        version += 1;
        if ext::sys::exists(&results)? || ext::sys::exists(&working)? {
            continue;
        }
        if create_new_dir(&results)? && create_new_dir(&working)? {
            for dir in [&results, &working] {
                ext::sys::create_file(&dir.join(names::LOG))?;
            }
            log::info!("Results directory: {}", ext::fmt::path(&results));
            return Ok((results, working));
        }
    }
}

/// Paths to all files of the current run.
#[derive(Debug)]
pub struct PathRegistry {
    dirs: DirectorySet,
    clusters: Option<ClusterIdentity>,
    /// Version of the orthogroups results, allocated together with the clusters file.
    results_version: Option<usize>,
    species_tree_rooted: Option<PathBuf>,
    pickle_dir: Option<PathBuf>,
    command_line: String,
}

impl PathRegistry {
    fn empty(command_line: String) -> Self {
        Self {
            dirs: DirectorySet::default(),
            clusters: None,
            results_version: None,
            species_tree_rooted: None,
            pickle_dir: None,
            command_line,
        }
    }

    /// Allocates new directories under `base` and initialises the registry according to the start point.
    /// Writes the beginning of the run log.
    pub fn new(
        _token: InitToken,
        base: &Path,
        name: &str,
        start: StartPoint,
        command_line: String,
    ) -> Result<Self, Error>
    {
        let mut reg = Self::empty(command_line);
        let (results, working) = create_paired_dirs(base, name)?;
        reg.dirs.results_primary = Some(results.clone());
        reg.dirs.working_current = Some(working.clone());
        match start {
            StartPoint::Fresh => {
                reg.set_working_base(working.clone())?;
                reg.dirs.trees_root = Some(working);
            }
            StartPoint::Comparisons { working_base } => {
                reg.set_working_base(working_base)?;
                reg.dirs.trees_root = Some(working);
            }
            StartPoint::Groups { working_base, clusters } => {
                reg.set_working_base(working_base)?;
                reg.dirs.trees_root = Some(working);
                reg.clusters = Some(clusters);
            }
            StartPoint::Trees { working_base, trees_root, clusters, species_tree } => {
                reg.set_working_base(working_base)?;
                reg.dirs.trees_root = Some(trees_root);
                reg.dirs.results_secondary = Some(results);
                reg.clusters = Some(clusters);
                reg.species_tree_rooted = Some(species_tree);
            }
        }
        reg.start_log()?;
        Ok(reg)
    }

    fn set_working_base(&mut self, dir: PathBuf) -> Result<(), Error> {
        if let Some(old) = &self.dirs.working_base {
            return Err(error!(InvalidState, "base working directory is already set to {}", ext::fmt::path(old)));
        }
        log::debug!("Base working directory: {}", ext::fmt::path(&dir));
        self.dirs.working_base = Some(dir);
        Ok(())
    }

    fn start_log(&self) -> Result<(), Error> {
        self.write_to_log(&format!("Started {} version {}\n", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
            true)?;
        let mut text = runlog::entry(runlog::COMMAND_LINE, &self.command_line);
        text.push('\n');
        text.push_str(&runlog::dir_entry(runlog::WD_BASE, self.working_base()?));
        if let Some(clusters) = &self.clusters {
            text.push_str(&runlog::entry(runlog::ORTHOGROUPS, &clusters.to_string()));
        }
        if let Some(tree) = &self.species_tree_rooted {
            text.push_str(&runlog::entry(runlog::SPECIES_TREE, &tree.to_string_lossy()));
        }
        self.write_to_log(&text, false)
    }

    pub fn dirs(&self) -> &DirectorySet {
        &self.dirs
    }

    // ========== Root directories ==========

    pub fn working_base(&self) -> Result<&Path, Error> {
        root(&self.dirs.working_base, "Base working")
    }

    pub fn working_current(&self) -> Result<&Path, Error> {
        root(&self.dirs.working_current, "Current working")
    }

    pub fn trees_root(&self) -> Result<&Path, Error> {
        root(&self.dirs.trees_root, "Trees working")
    }

    pub fn results_primary(&self) -> Result<&Path, Error> {
        root(&self.dirs.results_primary, "Orthogroups results")
    }

    pub fn results_secondary(&self) -> Result<&Path, Error> {
        root(&self.dirs.results_secondary, "Orthologues results")
    }

    // ========== Run log ==========

    fn log(&self) -> Result<RunLog, Error> {
        Ok(RunLog::new(self.results_primary()?.join(names::LOG)))
    }

    pub fn log_path(&self) -> Result<PathBuf, Error> {
        Ok(self.log()?.path().to_owned())
    }

    pub fn write_to_log(&self, text: &str, with_time: bool) -> Result<(), Error> {
        self.log()?.write(text, with_time)
    }

    /// Copies species IDs into the log.
    pub fn log_species(&self) -> Result<(), Error> {
        let filename = self.species_ids()?;
        let ids = fs::read_to_string(&filename).map_err(add_path!(filename))?;
        self.write_to_log(&format!("Species used: \n{}\n", ids), false)
    }

    /// Records the directory with orthogroups: the current working directory if clustering was done in this run,
    /// base working directory otherwise.
    pub fn log_working_dir_ogs(&self, created_this_run: bool) -> Result<(), Error> {
        let dir = if created_this_run { self.working_current()? } else { self.working_base()? };
        self.write_to_log(&runlog::dir_entry(runlog::WD_OGS, dir), false)
    }

    pub fn log_working_dir_trees(&self) -> Result<(), Error> {
        self.write_to_log(&runlog::dir_entry(runlog::WD_TREES, self.trees_root()?), false)
    }

    // ========== Species and pairwise comparisons ==========

    pub fn species_ids(&self) -> Result<PathBuf, Error> {
        Ok(self.working_base()?.join(names::SPECIES_IDS))
    }

    pub fn sequence_ids(&self) -> Result<PathBuf, Error> {
        Ok(self.working_base()?.join(names::SEQUENCE_IDS))
    }

    pub fn species_fasta(&self, species: usize) -> Result<PathBuf, Error> {
        Ok(self.working_base()?.join(names::species_fasta(species)))
    }

    /// All `Species<N>.fa` files in the base working directory, sorted by species index.
    pub fn sorted_species_fasta(&self) -> Result<Vec<(usize, PathBuf)>, Error> {
        let mut res: Vec<_> = Probe::Glob(names::SPECIES_FASTA_GLOB).matches(self.working_base()?)?
            .into_iter()
            .filter_map(|path| names::species_index(&path).map(|i| (i, path)))
            .collect();
        res.sort_unstable();
        Ok(res)
    }

    /// Sequence database for a species, `program` defines the prefix (for example, `Blast` or `Diamond`).
    pub fn species_db(&self, species: usize, program: &str) -> Result<PathBuf, Error> {
        Ok(self.working_base()?.join(names::species_db(program, species)))
    }

    /// Results of the `query` species search against the `db` species database.
    pub fn comparison_results(&self, query: usize, db: usize) -> Result<PathBuf, Error> {
        Ok(self.working_base()?.join(names::comparison(query, db)))
    }

    // ========== Orthogroups ==========

    pub fn graph_file(&self) -> Result<PathBuf, Error> {
        Ok(self.working_current()?.join(names::graph()))
    }

    /// Allocates a new unused clusters file for the MCL inflation parameter, and selects it.
    /// Fails if clusters were already selected.
    pub fn allocate_clusters(&mut self, inflation: f64) -> Result<&ClusterIdentity, Error> {
        if let Some(clusters) = &self.clusters {
            return Err(error!(InvalidState, "clusters {} are already selected, select new clusters explicitly",
                clusters));
        }
        let (path, version) = allocate_result_name(self.working_current()?, &names::clusters_stem(inflation), ".txt")?;
        log::debug!("Allocated clusters file {} (results version {})", ext::fmt::path(&path), version);
        self.results_version = Some(version);
        Ok(&*self.clusters.insert(ClusterIdentity::new(path)))
    }

    /// Explicitly switches to other clusters, given by their pairs file.
    pub fn select_clusters(&mut self, pairs_file: &Path) -> Result<(), Error> {
        let clusters = ClusterIdentity::from_pairs_file(pairs_file)?;
        self.write_to_log(&format!("{}\n", runlog::entry(runlog::ORTHOGROUPS_USED, &clusters.to_string())), false)?;
        self.clusters = Some(clusters);
        Ok(())
    }

    pub fn clusters(&self) -> Result<&ClusterIdentity, Error> {
        self.clusters.as_ref().ok_or_else(|| error!(InvalidState, "clusters have not been selected"))
    }

    pub fn clusters_file(&self) -> Result<PathBuf, Error> {
        Ok(self.clusters()?.pairs_file())
    }

    pub fn results_version(&self) -> Option<usize> {
        self.results_version
    }

    pub fn orthogroups_dir(&self) -> Result<PathBuf, Error> {
        ensure(self.results_primary()?.join(names::ORTHOGROUPS_DIR))
    }

    /// Prefix of the orthogroup results files: `Orthogroups/Orthogroups[_v]`.
    pub fn results_base(&self) -> Result<PathBuf, Error> {
        let version = self.results_version
            .ok_or_else(|| error!(InvalidState, "base results identifier has not been allocated"))?;
        Ok(self.orthogroups_dir()?.join(names::versioned(names::ORTHOGROUPS_DIR, version, "")))
    }

    pub fn og_stats_dir(&self) -> Result<PathBuf, Error> {
        ensure(self.results_primary()?.join(names::STATS_DIR))
    }

    pub fn duplications_dir(&self) -> Result<PathBuf, Error> {
        ensure(self.results_primary()?.join(names::DUPLICATIONS_DIR))
    }

    pub fn duplications_file(&self) -> Result<PathBuf, Error> {
        Ok(self.duplications_dir()?.join(names::DUPLICATIONS))
    }

    // ========== Orthologues ==========

    /// Creates orthologue results directories, needed by the tree inference method.
    /// New gene and species trees are written to the current working directory from now on.
    pub fn make_orthologues_dirs(&mut self, method: TreeMethod, stop_after: Option<StopAfter>) -> Result<(), Error> {
        let results = self.results_primary()?.to_owned();
        let working = self.working_current()?.to_owned();
        ext::sys::mkdir(results.join(names::ORTHOLOGUES_DIR))?;
        let dirs = match method {
            TreeMethod::Msa => {
                let n = match stop_after {
                    Some(StopAfter::Sequences) => 2,
                    Some(StopAfter::Alignments) => 4,
                    None => 6,
                };
                let all = [
                    results.join(names::SEQS_DIR), working.join(names::SEQS_IDS_DIR),
                    results.join(names::ALIGN_DIR), working.join(names::ALIGN_IDS_DIR),
                    results.join(names::GENE_TREES_DIR), working.join(names::TREES_IDS_DIR),
                ];
                all[..n].to_vec()
            }
            TreeMethod::Dendroblast => vec![
                working.join(names::DISTANCES_DIR), results.join(names::GENE_TREES_DIR),
                working.join(names::TREES_IDS_DIR),
            ],
        };
        for dir in dirs {
            ext::sys::mkdir(dir)?;
        }
        self.dirs.results_secondary = Some(results);
        self.dirs.trees_root = Some(working);
        Ok(())
    }

    /// Directory with species-pair orthologues.
    pub fn orthologues_dir(&self) -> Result<PathBuf, Error> {
        ensure(self.results_secondary()?.join(names::ORTHOLOGUES_DIR))
    }

    fn og_file(&self, results: bool, results_subdir: &str, working_subdir: &str, filename: String)
        -> Result<PathBuf, Error>
    {
        let mut path = if results {
            self.results_secondary()?.join(results_subdir)
        } else {
            self.working_current()?.join(working_subdir)
        };
        path.push(filename);
        Ok(path)
    }

    /// Orthogroup sequences, either with original accessions (results) or with IDs (working copy).
    pub fn og_sequences(&self, og: usize, results: bool) -> Result<PathBuf, Error> {
        self.og_file(results, names::SEQS_DIR, names::SEQS_IDS_DIR, format!("{}.fa", names::og(og)))
    }

    pub fn og_alignment(&self, og: usize, results: bool) -> Result<PathBuf, Error> {
        self.og_file(results, names::ALIGN_DIR, names::ALIGN_IDS_DIR, format!("{}.fa", names::og(og)))
    }

    pub fn og_tree(&self, og: usize, results: bool) -> Result<PathBuf, Error> {
        if results {
            self.og_file(true, names::GENE_TREES_DIR, "", format!("{}_tree.txt", names::og(og)))
        } else {
            self.og_file(false, "", names::TREES_IDS_DIR, format!("{}_tree_id.txt", names::og(og)))
        }
    }

    /// Directory with gene trees: `Gene_Trees` in the results, or `Trees_ids` in the trees working directory.
    pub fn og_trees_dir(&self, results: bool) -> Result<PathBuf, Error> {
        if results {
            ensure(self.results_secondary()?.join(names::GENE_TREES_DIR))
        } else {
            ensure(self.trees_root()?.join(names::TREES_IDS_DIR))
        }
    }

    pub fn og_distance_matrix(&self, og: usize) -> Result<PathBuf, Error> {
        Ok(self.working_current()?.join(names::DISTANCES_DIR).join(format!("{}.phy", names::og(og))))
    }

    pub fn resolved_trees_dir(&self) -> Result<PathBuf, Error> {
        ensure(self.results_secondary()?.join(names::RESOLVED_TREES_DIR))
    }

    pub fn resolved_tree(&self, og: usize) -> Result<PathBuf, Error> {
        Ok(self.results_secondary()?.join(names::RESOLVED_TREES_DIR).join(format!("{}_tree.txt", names::og(og))))
    }

    pub fn phyldog_dir(&self) -> Result<PathBuf, Error> {
        ensure(self.working_current()?.join(names::PHYLDOG_DIR))
    }

    pub fn phyldog_tree(&self, og: usize) -> Result<PathBuf, Error> {
        Ok(self.working_current()?.join(names::PHYLDOG_DIR).join(format!("{}.ReconciledTree.txt", names::og(og))))
    }

    pub fn misplaced_genes_dir(&self) -> Result<PathBuf, Error> {
        ensure(self.results_secondary()?.join(names::MISPLACED_GENES_DIR))
    }

    // ========== Species tree ==========

    pub fn species_tree_alignment(&self, results: bool) -> Result<PathBuf, Error> {
        self.og_file(results, names::ALIGN_DIR, names::ALIGN_IDS_DIR, names::SPECIES_TREE_ALIGNMENT.to_owned())
    }

    pub fn species_matrix(&self, in_working_dir: bool) -> Result<PathBuf, Error> {
        let working = self.working_current()?;
        Ok(if in_working_dir {
            working.join(names::SPECIES_MATRIX)
        } else {
            working.join(names::DISTANCES_DIR).join(names::SPECIES_MATRIX)
        })
    }

    /// Unrooted species tree, with accessions or with IDs.
    pub fn species_tree_unrooted(&self, accessions: bool) -> Result<PathBuf, Error> {
        let trees = self.trees_root()?;
        Ok(if accessions {
            trees.join(names::SPECIES_TREE_UNROOTED)
        } else {
            trees.join(names::TREES_IDS_DIR).join(names::SPECIES_TREE_UNROOTED_IDS)
        })
    }

    pub fn set_species_tree_rooted(&mut self, path: PathBuf) {
        self.species_tree_rooted = Some(path);
    }

    pub fn species_tree_rooted(&self) -> Result<&Path, Error> {
        self.species_tree_rooted.as_deref().ok_or_else(|| error!(InvalidState, "rooted species tree has not been set"))
    }

    pub fn species_tree_user_ids(&self) -> Result<PathBuf, Error> {
        Ok(self.working_current()?.join(names::SPECIES_TREE_USER_IDS))
    }

    pub fn species_tree_dir(&self) -> Result<PathBuf, Error> {
        ensure(self.results_secondary()?.join(names::SPECIES_TREE_DIR))
    }

    pub fn potential_rooted_trees_dir(&self) -> Result<PathBuf, Error> {
        ensure(self.species_tree_dir()?.join(names::POTENTIAL_ROOTS_DIR))
    }

    /// Rooted species tree with accessions. If the root is unique, `i` is ignored,
    /// otherwise the tree is one of several candidates, rooted at different outgroups.
    pub fn species_tree_results(&self, i: usize, unique: bool) -> Result<PathBuf, Error> {
        if unique {
            Ok(self.species_tree_dir()?.join(names::SPECIES_TREE_ROOTED))
        } else {
            Ok(self.potential_rooted_trees_dir()?.join(names::rooted_at_outgroup(i)))
        }
    }

    // ========== Miscellaneous ==========

    pub fn set_pickle_dir(&mut self, dir: PathBuf) {
        self.pickle_dir = Some(dir);
    }

    pub fn pickle_dir(&self) -> Result<PathBuf, Error> {
        match &self.pickle_dir {
            Some(dir) => ensure(dir.clone()),
            None => ensure(self.working_current()?.join(names::PICKLE_DIR)),
        }
    }

    /// Removes large intermediate files from the current working directory.
    pub fn clean_working_dir2(&self) -> Result<(), Error> {
        let dir = self.working_current()?.join(names::DISTANCES_DIR);
        match fs::remove_dir_all(&dir) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(Error::Io(e, vec![dir])),
            _ => Ok(()),
        }
    }
}
