//! Finds files of a previous run with the old directory layout (no run log).
//! All files are found by searching a fixed sequence of candidate directories.

use std::path::{Path, PathBuf};
use crate::{
    Error,
    ext,
};
use super::{
    names, ClusterIdentity, PriorRun,
    layout::Stage,
    probe::{self, Probe},
};

/// Working directory and the orthogroups found in it.
#[derive(Debug)]
struct FoundOrthogroups {
    working_dir: PathBuf,
    /// Orthogroup listing file, absent if the clusters file was specified directly.
    listing: Option<PathBuf>,
    clusters: ClusterIdentity,
}

/// Finds the working directory: either `dir` itself or `dir/WorkingDirectory`.
fn find_working_dir(dir: &Path) -> Result<Option<PathBuf>, Error> {
    if probe::is_working_dir(dir)? {
        return Ok(Some(dir.to_owned()));
    }
    let nested = dir.join(names::WORKING_DIR);
    Ok(if probe::is_working_dir(&nested)? { Some(nested) } else { None })
}

/// Cluster pairs file, specified directly by the user.
fn orthogroups_from_file(pairs: &Path) -> Result<FoundOrthogroups, Error> {
    let filename = pairs.file_name().map(|s| s.to_string_lossy()).unwrap_or_default();
    if !names::CLUSTERS_PAIRS_MARKERS.iter().all(|marker| filename.contains(marker)) {
        return Err(Error::InvalidInput(format!("{} is neither a directory nor a {} file",
            ext::fmt::path(pairs), names::CLUSTERS_PAIRS_GLOB)));
    }
    let working_dir = pairs.parent().map(Path::to_path_buf).unwrap_or_default();
    if !probe::is_working_dir(&working_dir)? {
        return Err(Error::missing("cannot find files from the previous run", vec![working_dir]));
    }
    log::info!("Using orthogroups in file {}", ext::fmt::path(pairs));
    Ok(FoundOrthogroups {
        clusters: ClusterIdentity::from_pairs_file(pairs)?,
        listing: None,
        working_dir,
    })
}

/// Searches `dir` (and directories around it) for a unique orthogroups listing and a unique cluster pairs file.
fn orthogroups_from_dir(dir: &Path) -> Result<FoundOrthogroups, Error> {
    let working_dir = find_working_dir(dir)?.ok_or_else(|| Error::missing(
        "cannot find files from the previous run in either directory",
        vec![dir.to_owned(), dir.join(names::WORKING_DIR)]))?;

    let listing_probes = names::ORTHOGROUPS_GLOBS.map(Probe::Glob);
    let clusters_candidates = Probe::Glob(names::CLUSTERS_PAIRS_GLOB).matches(&working_dir)?;
    // Working directory was specified, results may be one level above.
    let parent = dir.join("..");
    let mut searched = vec![working_dir.as_path()];
    if working_dir != dir {
        searched.push(dir);
    }
    let mut listing_candidates = probe::collect(&searched, &listing_probes)?;
    if listing_candidates.len() < clusters_candidates.len() {
        searched.push(&parent);
        for path in probe::collect(&[&parent], &listing_probes)? {
            if !listing_candidates.contains(&path) {
                listing_candidates.push(path);
            }
        }
    }
    listing_candidates.sort();

    let listing = probe::exactly_one("orthogroups file (Orthogroups*.txt or OrthologousGroups*.txt)",
        &searched, listing_candidates)?;
    let pairs = probe::exactly_one(names::CLUSTERS_PAIRS_GLOB, &[&working_dir], clusters_candidates)?;
    log::info!("Using orthogroups in file {}", ext::fmt::path(&listing));
    log::info!("    and corresponding clusters file {}", ext::fmt::path(&pairs));
    Ok(FoundOrthogroups {
        clusters: ClusterIdentity::from_pairs_file(&pairs)?,
        listing: Some(listing),
        working_dir,
    })
}

/// Finds orthogroups, given either a cluster pairs file or a directory.
fn find_orthogroups(arg: &Path) -> Result<FoundOrthogroups, Error> {
    if arg.is_file() {
        orthogroups_from_file(arg)
    } else {
        orthogroups_from_dir(arg)
    }
}

/// Working directory with pairwise comparisons: continuation directory, or its `WorkingDirectory`.
/// If neither contains the files, returns the continuation directory to fail later with a more specific error.
fn find_comparisons(continuation_dir: &Path) -> Result<PathBuf, Error> {
    match find_working_dir(continuation_dir)? {
        Some(dir) => Ok(dir),
        None => {
            log::warn!("Could not find previous run files in {}, trying to use it anyway",
                ext::fmt::path(continuation_dir));
            Ok(continuation_dir.to_owned())
        }
    }
}

/// Locates files of a previous run in `continuation_dir`, which has the old layout.
/// When continuing from trees, `continuation_dir` is the orthologues directory inside the orthogroups results.
/// When continuing from groups, it can also be a cluster pairs file; results are then placed next to it.
pub fn locate(continuation_dir: &Path, stage: Stage, user_tree: Option<&Path>) -> Result<PriorRun, Error> {
    let home_for_results = match continuation_dir.parent() {
        Some(parent) if continuation_dir.is_file() => parent.join(names::LEGACY_HOME),
        _ => continuation_dir.join(names::LEGACY_HOME),
    };
    match stage {
        Stage::Fasta | Stage::Comparisons => Ok(PriorRun {
            working_base: find_comparisons(continuation_dir)?,
            trees_root: None,
            clusters: None,
            species_tree: None,
            home_for_results,
        }),
        Stage::Groups => {
            let found = find_orthogroups(continuation_dir)?;
            log::debug!("Previous working directory {}, orthogroups {:?}",
                ext::fmt::path(&found.working_dir), found.listing);
            Ok(PriorRun {
                working_base: found.working_dir,
                trees_root: None,
                clusters: Some(found.clusters),
                species_tree: None,
                home_for_results,
            })
        }
        Stage::Trees => {
            let found = find_orthogroups(&continuation_dir.join(".."))?;
            let trees_root = continuation_dir.join(names::WORKING_DIR);
            let species_tree = probe::rooted_species_tree(&trees_root, user_tree)?;
            Ok(PriorRun {
                working_base: found.working_dir,
                trees_root: Some(trees_root),
                clusters: Some(found.clusters),
                species_tree: Some(species_tree),
                home_for_results,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const PAIRS: &'static str = "clusters_OrthoFinder_I1.5.txt_id_pairs.txt";

    /// Old results directory: `Orthogroups.txt` in `dir`, working files in `dir/WorkingDirectory`.
    fn old_results(dir: &Path) -> PathBuf {
        let wd = dir.join("WorkingDirectory");
        fs::create_dir_all(&wd).unwrap();
        fs::write(wd.join("Species0.fa"), "").unwrap();
        fs::write(wd.join("Species1.fa"), "").unwrap();
        fs::write(wd.join(PAIRS), "").unwrap();
        fs::write(dir.join("Orthogroups.txt"), "").unwrap();
        wd
    }

    #[test]
    fn comparisons_search_order() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        // Nothing found: best guess.
        assert_eq!(locate(root, Stage::Comparisons, None).unwrap().working_base, root);

        let wd = old_results(root);
        let prior = locate(root, Stage::Comparisons, None).unwrap();
        assert_eq!(prior.working_base, wd);
        assert_eq!(prior.home_for_results, root.join("OrthoFinder"));

        // Continuation directory itself is a working directory.
        assert_eq!(locate(&wd, Stage::Comparisons, None).unwrap().working_base, wd);
    }

    #[test]
    fn groups_from_results_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let wd = old_results(tmp.path());
        let prior = locate(tmp.path(), Stage::Groups, None).unwrap();
        assert_eq!(prior.working_base, wd);
        assert_eq!(prior.clusters.unwrap().pairs_file(), wd.join(PAIRS));
    }

    #[test]
    fn groups_from_working_dir_look_one_level_up() {
        let tmp = tempfile::tempdir().unwrap();
        let wd = old_results(tmp.path());
        let prior = locate(&wd, Stage::Groups, None).unwrap();
        assert_eq!(prior.working_base, wd);
    }

    #[test]
    fn groups_from_pairs_file() {
        let tmp = tempfile::tempdir().unwrap();
        let wd = old_results(tmp.path());
        // Second listing file does not matter when the clusters file is explicit.
        fs::write(tmp.path().join("Orthogroups_1.txt"), "").unwrap();
        let prior = locate(&wd.join(PAIRS), Stage::Groups, None).unwrap();
        assert_eq!(prior.working_base, wd);
        assert_eq!(prior.clusters.unwrap().base(), wd.join("clusters_OrthoFinder_I1.5.txt"));
        assert_eq!(prior.home_for_results, wd.join("OrthoFinder"));

        fs::write(wd.join("Species0.txt"), "").unwrap();
        assert!(matches!(locate(&wd.join("Species0.txt"), Stage::Groups, None), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn two_listing_files_are_ambiguous() {
        let tmp = tempfile::tempdir().unwrap();
        old_results(tmp.path());
        let second = tmp.path().join("Orthogroups_1.txt");
        fs::write(&second, "").unwrap();
        match locate(tmp.path(), Stage::Groups, None) {
            Err(Error::AmbiguousArtifact(_, candidates)) => {
                assert_eq!(candidates, vec![tmp.path().join("Orthogroups.txt"), second]);
            }
            r => panic!("expected ambiguity, got {:?}", r),
        }
    }

    #[test]
    fn missing_results() {
        let tmp = tempfile::tempdir().unwrap();
        match locate(tmp.path(), Stage::Groups, None) {
            Err(Error::MissingArtifact(_, paths)) => assert_eq!(paths.len(), 2),
            r => panic!("expected missing artifact, got {:?}", r),
        }
        let wd = old_results(tmp.path());
        fs::remove_file(tmp.path().join("Orthogroups.txt")).unwrap();
        assert!(matches!(locate(&wd, Stage::Groups, None), Err(Error::MissingArtifact(..))));
    }

    #[test]
    fn trees_need_unique_species_tree() {
        let tmp = tempfile::tempdir().unwrap();
        let wd = old_results(tmp.path());
        let orthologues = tmp.path().join("Orthologues_Jan01");
        let trees_wd = orthologues.join("WorkingDirectory");
        fs::create_dir_all(trees_wd.join("Trees_ids")).unwrap();
        assert!(matches!(locate(&orthologues, Stage::Trees, None), Err(Error::MissingArtifact(..))));

        let tree = trees_wd.join("SpeciesTree_ids_0_rooted.txt");
        fs::write(&tree, "").unwrap();
        let prior = locate(&orthologues, Stage::Trees, None).unwrap();
        assert_eq!(prior.species_tree.as_ref(), Some(&tree));
        assert_eq!(prior.trees_root.as_ref(), Some(&trees_wd));
        assert_eq!(fs::canonicalize(&prior.working_base).unwrap(), fs::canonicalize(&wd).unwrap());

        let second = trees_wd.join("Trees_ids").join("STAG_SpeciesTree_ids_0_rooted.txt");
        fs::write(&second, "").unwrap();
        match locate(&orthologues, Stage::Trees, None) {
            Err(Error::AmbiguousArtifact(_, candidates)) => assert_eq!(candidates, vec![tree.clone(), second]),
            r => panic!("expected ambiguity, got {:?}", r),
        }
        let prior = locate(&orthologues, Stage::Trees, Some(&tree)).unwrap();
        assert_eq!(prior.species_tree, Some(tree));
    }
}
