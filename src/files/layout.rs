use std::{
    fmt,
    path::Path,
};
use crate::{Error, ext};
use super::names;

/// Directory layout of a continuation directory.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunLayout {
    /// Log file is present, previous directories are recorded in it.
    NewStyle,
    /// No log file, previous files need to be found by searching.
    OldStyle,
}

impl RunLayout {
    /// Directory follows the new layout iff it contains `Log.txt`.
    /// Anything that is not a directory (for example, a clusters file) is old-style.
    pub fn detect(root: &Path) -> Result<Self, Error> {
        if root.is_dir() && ext::sys::exists(&root.join(names::LOG))? {
            Ok(Self::NewStyle)
        } else {
            Ok(Self::OldStyle)
        }
    }
}

impl fmt::Display for RunLayout {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            Self::NewStyle => "new",
            Self::OldStyle => "old",
        })
    }
}

/// Stage, from which the pipeline is started.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    /// From species FASTA files, nothing to resume.
    Fasta,
    /// From pairwise comparison results.
    Comparisons,
    /// From orthogroups.
    Groups,
    /// From gene and species trees.
    Trees,
}

impl Stage {
    pub fn to_str(self) -> &'static str {
        match self {
            Self::Fasta => "fasta",
            Self::Comparisons => "comparisons",
            Self::Groups => "groups",
            Self::Trees => "trees",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.to_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_file_marks_new_layout() {
        let tmp = tempfile::tempdir().unwrap();
        assert_eq!(RunLayout::detect(tmp.path()).unwrap(), RunLayout::OldStyle);
        std::fs::write(tmp.path().join("Log.txt"), "").unwrap();
        assert_eq!(RunLayout::detect(tmp.path()).unwrap(), RunLayout::NewStyle);
    }

    #[test]
    fn file_is_old_layout() {
        let tmp = tempfile::tempdir().unwrap();
        let pairs = tmp.path().join("clusters_OrthoFinder_I1.5.txt_id_pairs.txt");
        std::fs::write(&pairs, "").unwrap();
        assert_eq!(RunLayout::detect(&pairs).unwrap(), RunLayout::OldStyle);
        assert_eq!(RunLayout::detect(&tmp.path().join("absent")).unwrap(), RunLayout::OldStyle);
    }
}
