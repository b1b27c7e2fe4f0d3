//! Candidate probes: pure functions from a directory to zero or more existing paths,
//! and a single rule that reduces the combined candidates to exactly one.

use std::path::{Path, PathBuf};
use crate::{
    Error,
    ext,
};
use super::names;

/// How a directory is searched for candidates.
#[derive(Clone, Copy, Debug)]
pub enum Probe<'a> {
    /// All entries, matching a glob pattern (directory components are escaped).
    Glob(&'a str),
    /// An entry with exactly this name.
    File(&'a str),
}

impl<'a> Probe<'a> {
    /// Returns all matches under `dir`, sorted.
    pub fn matches(&self, dir: &Path) -> Result<Vec<PathBuf>, Error> {
        match *self {
            Probe::Glob(pattern) => {
                let escaped = glob::Pattern::escape(&dir.to_string_lossy());
                let full = Path::new(&escaped).join(pattern);
                let mut res = Vec::new();
                for entry in glob::glob(&full.to_string_lossy())? {
                    res.push(entry?);
                }
                res.sort();
                Ok(res)
            }
            Probe::File(name) => {
                let path = dir.join(name);
                Ok(if ext::sys::exists(&path)? { vec![path] } else { Vec::new() })
            }
        }
    }

    /// Human-readable form of the probe.
    pub fn name(&self) -> &'a str {
        match *self {
            Probe::Glob(s) | Probe::File(s) => s,
        }
    }
}

/// Runs every probe in every directory (directories in the outer loop), and concatenates the results
/// without repetitions, keeping the order of the first occurrence.
pub fn collect(dirs: &[&Path], probes: &[Probe]) -> Result<Vec<PathBuf>, Error> {
    let mut res: Vec<PathBuf> = Vec::new();
    for dir in dirs {
        for probe in probes {
            for path in probe.matches(dir)? {
                if !res.contains(&path) {
                    res.push(path);
                }
            }
        }
    }
    Ok(res)
}

/// Requires exactly one candidate.
/// No candidates: `MissingArtifact`, naming what was searched for;
/// several candidates: `AmbiguousArtifact`, listing all of them.
pub fn exactly_one(what: &str, searched: &[&Path], mut candidates: Vec<PathBuf>) -> Result<PathBuf, Error> {
    match candidates.len() {
        1 => Ok(candidates.pop().unwrap()),
        0 => Err(Error::missing(format!("could not find {}", what),
            searched.iter().map(|p| p.to_path_buf()).collect())),
        _ => Err(Error::ambiguous(format!("expected a single {}", what), candidates)),
    }
}

/// Working directory contains at least one cluster pairs file and at least one species FASTA file.
pub fn is_working_dir(dir: &Path) -> Result<bool, Error> {
    Ok(dir.is_dir()
        && !Probe::Glob(names::CLUSTERS_PAIRS_GLOB).matches(dir)?.is_empty()
        && !Probe::Glob(names::SPECIES_FASTA_GLOB).matches(dir)?.is_empty())
}

/// Finds the unique rooted species tree under `trees_root` or `trees_root/Trees_ids`.
/// If `user_tree` is set, it is used instead, but must exist.
pub fn rooted_species_tree(trees_root: &Path, user_tree: Option<&Path>) -> Result<PathBuf, Error> {
    if let Some(path) = user_tree {
        return if ext::sys::exists(path)? {
            Ok(path.to_owned())
        } else {
            Err(Error::missing("user-supplied species tree does not exist", vec![path.to_owned()]))
        };
    }
    let ids_dir = trees_root.join(names::TREES_IDS_DIR);
    let probes: Vec<_> = names::ROOTED_SPECIES_TREES.iter().map(|&name| Probe::File(name)).collect();
    let dirs = [trees_root, ids_dir.as_path()];
    let searched: Vec<PathBuf> = dirs.iter()
        .flat_map(|dir| probes.iter().map(move |probe| dir.join(probe.name())))
        .collect();
    let searched: Vec<&Path> = searched.iter().map(PathBuf::as_path).collect();
    exactly_one("rooted species tree (alternatively, provide the species tree explicitly)",
        &searched, collect(&dirs, &probes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn glob_escapes_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("run [1]");
        fs::create_dir(&dir).unwrap();
        fs::write(dir.join("Species0.fa"), "").unwrap();
        fs::write(dir.join("Species1.fa"), "").unwrap();
        fs::write(dir.join("Other.fa"), "").unwrap();
        let found = Probe::Glob(names::SPECIES_FASTA_GLOB).matches(&dir).unwrap();
        assert_eq!(found, vec![dir.join("Species0.fa"), dir.join("Species1.fa")]);
    }

    #[test]
    fn collect_removes_duplicates() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("Orthogroups.txt"), "").unwrap();
        let dir = tmp.path();
        let found = collect(&[dir, dir], &[Probe::Glob("Orthogroups*.txt"), Probe::File("Orthogroups.txt")]).unwrap();
        assert_eq!(found, vec![dir.join("Orthogroups.txt")]);
    }

    #[test]
    fn reduction() {
        let dir = Path::new("/nowhere");
        assert!(matches!(exactly_one("x", &[dir], vec![]), Err(Error::MissingArtifact(..))));
        assert_eq!(exactly_one("x", &[dir], vec![dir.join("a")]).unwrap(), dir.join("a"));
        match exactly_one("x", &[dir], vec![dir.join("a"), dir.join("b")]) {
            Err(Error::AmbiguousArtifact(_, c)) => assert_eq!(c.len(), 2),
            _ => panic!("expected ambiguity"),
        }
    }

    #[test]
    fn working_dir_requires_both_kinds() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path();
        assert!(!is_working_dir(dir).unwrap());
        fs::write(dir.join("Species0.fa"), "").unwrap();
        assert!(!is_working_dir(dir).unwrap());
        fs::write(dir.join("clusters_OrthoFinder_I1.5.txt_id_pairs.txt"), "").unwrap();
        assert!(is_working_dir(dir).unwrap());
        assert!(!is_working_dir(&dir.join("absent")).unwrap());
    }

    #[test]
    fn species_tree_probing() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        fs::create_dir(root.join("Trees_ids")).unwrap();
        assert!(matches!(rooted_species_tree(root, None), Err(Error::MissingArtifact(..))));

        let first = root.join("Trees_ids").join("SpeciesTree_ids_0_rooted.txt");
        fs::write(&first, "").unwrap();
        assert_eq!(rooted_species_tree(root, None).unwrap(), first);

        let second = root.join("SpeciesTree_user_ids.txt");
        fs::write(&second, "").unwrap();
        match rooted_species_tree(root, None) {
            Err(Error::AmbiguousArtifact(_, c)) => {
                assert!(c.contains(&first) && c.contains(&second));
            }
            _ => panic!("expected ambiguity"),
        }
        // Explicit tree resolves the ambiguity.
        assert_eq!(rooted_species_tree(root, Some(&second)).unwrap(), second);
        assert!(rooted_species_tree(root, Some(&root.join("absent.txt"))).is_err());
    }
}
