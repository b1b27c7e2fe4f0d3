//! Run log `Log.txt`: append-only writer and line-oriented key/value reader.
//! Both sides share the key constants, so the format stays a contract.

use std::{
    io::BufRead,
    path::{Path, PathBuf},
};
use crate::{
    Error,
    err::add_path,
    ext,
};

/// Working directory that holds the orthogroups of a run. Load-bearing on resume.
pub const WD_OGS: &'static str = "WorkingDirectory_OGs";
/// Working directory that holds the gene and species trees of a run. Load-bearing on resume.
pub const WD_TREES: &'static str = "WorkingDirectory_Trees";
pub const WD_BASE: &'static str = "WorkingDirectory_Base";
pub const COMMAND_LINE: &'static str = "Command Line";
pub const ORTHOGROUPS: &'static str = "Orthogroups";
pub const ORTHOGROUPS_USED: &'static str = "Orthogroups used";
pub const SPECIES_TREE: &'static str = "Species Tree";

const SEP: &'static str = ": ";

/// Formats a `key: value` line.
pub fn entry(key: &str, value: &str) -> String {
    format!("{}{}{}\n", key, SEP, value)
}

/// Formats a `key: dir/` line, the directory always ends with a path separator.
pub fn dir_entry(key: &str, dir: &Path) -> String {
    entry(key, &ext::sys::dir_string(dir))
}

/// Key/value lines of a log, in order of appearance.
/// Lines that do not look like `Key: value` are skipped.
#[derive(Default, Debug, Clone)]
pub struct LogRecord {
    entries: Vec<(String, String)>,
}

impl LogRecord {
    pub fn parse<R: BufRead>(stream: R) -> std::io::Result<Self> {
        let mut entries = Vec::new();
        for line in stream.lines() {
            let line = line?;
            let line = line.trim_end();
            if let Some((key, value)) = line.split_once(SEP) {
                if !key.is_empty() && !key.starts_with(char::is_whitespace) {
                    entries.push((key.to_owned(), value.to_owned()));
                }
            }
        }
        Ok(Self { entries })
    }

    pub fn load(path: &Path) -> Result<Self, Error> {
        Self::parse(ext::sys::open(path)?).map_err(add_path!(path))
    }

    /// Last value, recorded under `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.iter().rev().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    /// Path, recorded under `key`.
    pub fn get_path(&self, key: &str) -> Option<PathBuf> {
        self.get(key).map(PathBuf::from)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Appends text to a log file, optionally prefixed by the current time.
pub struct RunLog {
    path: PathBuf,
}

impl RunLog {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn write(&self, text: &str, with_time: bool) -> Result<(), Error> {
        if with_time {
            let prefix = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
            ext::sys::append_to_file(&self.path, &format!("{} : {}", prefix, text))
        } else {
            ext::sys::append_to_file(&self.path, text)
        }
    }
}
