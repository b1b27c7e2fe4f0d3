//! Finds files of a previous run with the new directory layout,
//! where all relevant directories are recorded in the run log.

use std::path::{Path, PathBuf};
use crate::{
    Error,
    ext,
};
use super::{
    names, probe, ClusterIdentity, PriorRun,
    layout::{RunLayout, Stage},
    runlog::{self, LogRecord},
};

/// Returns the recorded directory if it exists.
/// Otherwise, assumes that the whole directory tree was moved, and looks for a directory with the same name
/// next to the directory with the log file.
pub fn recover_dir(recorded: &Path, log_path: &Path) -> Result<PathBuf, Error> {
    if ext::sys::exists(recorded)? {
        return Ok(recorded.to_owned());
    }
    let mut searched = vec![recorded.to_owned()];
    if let (Some(name), Some(log_dir)) = (recorded.file_name(), log_path.parent()) {
        let relocated = log_dir.join("..").join(name);
        if ext::sys::exists(&relocated)? {
            log::warn!("Directory {} does not exist, using relocated directory {}",
                ext::fmt::path(recorded), ext::fmt::path(&relocated));
            return Ok(relocated);
        }
        searched.push(relocated);
    }
    Err(Error::missing("directory, recorded in the run log, no longer exists", searched))
}

/// Extracts a directory, recorded under `key`, and recovers it if needed.
fn recorded_dir(record: &LogRecord, key: &str, log_path: &Path) -> Result<PathBuf, Error> {
    match record.get_path(key) {
        Some(recorded) => recover_dir(&recorded, log_path),
        None => Err(Error::missing(format!("run log contains no {} entry", key), vec![log_path.to_owned()])),
    }
}

/// Finds the unique cluster pairs file in the working directory.
fn find_clusters(working_dir: &Path) -> Result<ClusterIdentity, Error> {
    let candidates = probe::Probe::Glob(names::CLUSTERS_PAIRS_GLOB).matches(working_dir)?;
    let pairs = probe::exactly_one(names::CLUSTERS_PAIRS_GLOB, &[working_dir], candidates)?;
    ClusterIdentity::from_pairs_file(&pairs)
}

/// Locates files of a previous run in `continuation_dir`.
/// Returns `Error::Unprocessable` if the directory does not follow the new layout.
pub fn locate(continuation_dir: &Path, stage: Stage, user_tree: Option<&Path>) -> Result<PriorRun, Error> {
    if !continuation_dir.is_dir() || RunLayout::detect(continuation_dir)? != RunLayout::NewStyle {
        return Err(Error::Unprocessable(continuation_dir.to_owned()));
    }
    let log_path = continuation_dir.join(names::LOG);
    log::debug!("Reading previous run log {}", ext::fmt::path(&log_path));
    let record = LogRecord::load(&log_path)?;

    let working_base = recorded_dir(&record, runlog::WD_OGS, &log_path)?;
    let (clusters, trees_root, species_tree) = match stage {
        Stage::Fasta | Stage::Comparisons => (None, None, None),
        Stage::Groups => (Some(find_clusters(&working_base)?), None, None),
        Stage::Trees => {
            let clusters = find_clusters(&working_base)?;
            let trees_root = recorded_dir(&record, runlog::WD_TREES, &log_path)?;
            let species_tree = probe::rooted_species_tree(&trees_root, user_tree)?;
            (Some(clusters), Some(trees_root), Some(species_tree))
        }
    };
    Ok(PriorRun {
        working_base, trees_root, clusters, species_tree,
        home_for_results: continuation_dir.join(".."),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_log(dir: &Path, lines: &[(&str, &Path)]) {
        let mut text = String::from("Started\nCommand Line: orthofinder -b x\n\n");
        for (key, path) in lines {
            text.push_str(&runlog::dir_entry(key, path));
        }
        fs::write(dir.join(names::LOG), text).unwrap();
    }

    #[test]
    fn recorded_directory_exists() {
        let tmp = tempfile::tempdir().unwrap();
        let results = tmp.path().join("Results_Jan01");
        let working = tmp.path().join("WorkingDirectory_Jan01");
        fs::create_dir(&results).unwrap();
        fs::create_dir(&working).unwrap();
        write_log(&results, &[(runlog::WD_OGS, &working)]);

        let prior = locate(&results, Stage::Comparisons, None).unwrap();
        assert_eq!(prior.working_base, working);
        assert!(prior.clusters.is_none());
        assert_eq!(fs::canonicalize(&prior.home_for_results).unwrap(), fs::canonicalize(tmp.path()).unwrap());
    }

    #[test]
    fn moved_directory_is_recovered() {
        let tmp = tempfile::tempdir().unwrap();
        let results = tmp.path().join("Results_Jan01");
        let working = tmp.path().join("c");
        fs::create_dir(&results).unwrap();
        fs::create_dir(&working).unwrap();
        write_log(&results, &[(runlog::WD_OGS, Path::new("/nonexistent/a/b/c/"))]);

        let prior = locate(&results, Stage::Comparisons, None).unwrap();
        assert_eq!(fs::canonicalize(&prior.working_base).unwrap(), fs::canonicalize(&working).unwrap());
    }

    #[test]
    fn missing_directory_is_reported() {
        let tmp = tempfile::tempdir().unwrap();
        let results = tmp.path().join("Results_Jan01");
        fs::create_dir(&results).unwrap();
        let recorded = Path::new("/nonexistent/a/b/c/");
        write_log(&results, &[(runlog::WD_OGS, recorded)]);

        match locate(&results, Stage::Comparisons, None) {
            Err(Error::MissingArtifact(_, paths)) => assert_eq!(paths[0], recorded),
            r => panic!("expected missing artifact, got {:?}", r),
        }
    }

    #[test]
    fn old_layout_is_unprocessable() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(matches!(locate(tmp.path(), Stage::Groups, None), Err(Error::Unprocessable(_))));
        let pairs = tmp.path().join("clusters_OrthoFinder_I1.5.txt_id_pairs.txt");
        fs::write(&pairs, "").unwrap();
        assert!(matches!(locate(&pairs, Stage::Groups, None), Err(Error::Unprocessable(_))));
    }

    #[test]
    fn trees_need_recorded_trees_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let results = tmp.path().join("Results_Jan01");
        let working = tmp.path().join("WorkingDirectory_Jan01");
        fs::create_dir(&results).unwrap();
        fs::create_dir(&working).unwrap();
        fs::write(working.join("clusters_OrthoFinder_I1.5.txt_id_pairs.txt"), "").unwrap();
        write_log(&results, &[(runlog::WD_OGS, &working)]);

        match locate(&results, Stage::Trees, None) {
            Err(Error::MissingArtifact(desc, paths)) => {
                assert!(desc.contains(runlog::WD_TREES));
                assert_eq!(paths, vec![results.join("Log.txt")]);
            }
            r => panic!("expected missing artifact, got {:?}", r),
        }
    }

    #[test]
    fn groups_need_single_clusters_file() {
        let tmp = tempfile::tempdir().unwrap();
        let results = tmp.path().join("Results_Jan01");
        let working = tmp.path().join("WorkingDirectory_Jan01");
        fs::create_dir(&results).unwrap();
        fs::create_dir(&working).unwrap();
        write_log(&results, &[(runlog::WD_OGS, &working)]);
        assert!(matches!(locate(&results, Stage::Groups, None), Err(Error::MissingArtifact(..))));

        let pairs = working.join("clusters_OrthoFinder_I1.5.txt_id_pairs.txt");
        fs::write(&pairs, "").unwrap();
        let prior = locate(&results, Stage::Groups, None).unwrap();
        assert_eq!(prior.clusters.unwrap().pairs_file(), pairs);

        fs::write(working.join("clusters_OrthoFinder_I1.5_1.txt_id_pairs.txt"), "").unwrap();
        match locate(&results, Stage::Groups, None) {
            Err(Error::AmbiguousArtifact(_, c)) => assert_eq!(c.len(), 2),
            r => panic!("expected ambiguity, got {:?}", r),
        }
    }

    #[test]
    fn trees_directory_recovered_independently() {
        let tmp = tempfile::tempdir().unwrap();
        let results = tmp.path().join("Results_Jan01");
        let working = tmp.path().join("WorkingDirectory_Jan01");
        let trees = tmp.path().join("WorkingDirectory_Jan02");
        for dir in [&results, &working, &trees] {
            fs::create_dir(dir).unwrap();
        }
        fs::write(working.join("clusters_OrthoFinder_I1.5.txt_id_pairs.txt"), "").unwrap();
        fs::write(trees.join("SpeciesTree_ids_0_rooted.txt"), "").unwrap();
        write_log(&results, &[
            (runlog::WD_OGS, &working),
            (runlog::WD_TREES, Path::new("/moved/away/WorkingDirectory_Jan02")),
        ]);

        let prior = locate(&results, Stage::Trees, None).unwrap();
        assert_eq!(prior.working_base, working);
        let trees_root = prior.trees_root.unwrap();
        assert_eq!(fs::canonicalize(&trees_root).unwrap(), fs::canonicalize(&trees).unwrap());
        assert!(prior.species_tree.unwrap().ends_with("SpeciesTree_ids_0_rooted.txt"));
    }
}
