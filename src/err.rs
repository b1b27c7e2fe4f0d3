use std::{
    io,
    fmt::Write,
    path::PathBuf,
};
use colored::Colorize;
use crate::ext;

/// General enum, representing possible errors.
#[derive(Debug)]
pub enum Error {
    Io(io::Error, Vec<PathBuf>),
    /// Error, produced by an argument parser.
    Lexopt(lexopt::Error),
    /// Continuation directory does not follow the new layout (no `Log.txt`).
    /// Bootstrap reacts to it by switching to the legacy locator.
    Unprocessable(PathBuf),
    /// Required file or directory is absent after all recovery attempts: `(description, paths)`.
    MissingArtifact(String, Vec<PathBuf>),
    /// Several candidates where exactly one is required: `(description, all candidates)`.
    AmbiguousArtifact(String, Vec<PathBuf>),
    /// Path requested before its root was established, or a root was set twice.
    InvalidState(String),
    InvalidInput(String),
}

impl From<lexopt::Error> for Error {
    fn from(e: lexopt::Error) -> Self {
        Self::Lexopt(e)
    }
}

impl From<glob::GlobError> for Error {
    fn from(e: glob::GlobError) -> Self {
        let path = e.path().to_owned();
        Self::Io(e.into_error(), vec![path])
    }
}

impl From<glob::PatternError> for Error {
    fn from(e: glob::PatternError) -> Self {
        Self::InvalidInput(format!("Cannot construct glob pattern: {}", e))
    }
}

fn write_paths(s: &mut String, paths: &[PathBuf]) {
    for path in paths {
        write!(s, "\n    {}", ext::fmt::path(path).cyan()).unwrap();
    }
}

impl Error {
    pub fn missing(desc: impl Into<String>, paths: Vec<PathBuf>) -> Self {
        Self::MissingArtifact(desc.into(), paths)
    }

    pub fn ambiguous(desc: impl Into<String>, candidates: Vec<PathBuf>) -> Self {
        Self::AmbiguousArtifact(desc.into(), candidates)
    }

    /// Format error message.
    pub fn display(&self) -> String {
        let mut s = String::new();
        match self {
            Self::Io(e, files) => {
                write!(s, "{} in relation to ", "Input/Output error".red()).unwrap();
                if files.is_empty() {
                    write!(s, "unnamed streams").unwrap();
                } else {
                    write!(s, "{}", files.iter().map(|f| ext::fmt::path(f).cyan().to_string())
                        .collect::<Vec<_>>().join(", ")).unwrap();
                }
                write!(s, ": {}", e.kind()).unwrap();
                if let Some(e2) = e.get_ref() {
                    write!(s, ", {}", e2).unwrap();
                }
            }
            Self::Lexopt(e) => write!(s, "{} to parse command-line arguments: {}", "Failed".red(), e).unwrap(),
            Self::Unprocessable(dir) => write!(s, "{}: {} does not follow the new directory layout",
                "Unprocessable directory".red(), ext::fmt::path(dir).cyan()).unwrap(),
            Self::MissingArtifact(desc, paths) => {
                write!(s, "{}: {}", "Missing".red(), desc).unwrap();
                write_paths(&mut s, paths);
            }
            Self::AmbiguousArtifact(desc, paths) => {
                write!(s, "{}: {}. Found {} candidates:", "Ambiguous".red(), desc, paths.len()).unwrap();
                write_paths(&mut s, paths);
                write!(s, "\nPlease keep only one set of results or specify the file explicitly").unwrap();
            }
            Self::InvalidState(e) => write!(s, "{}: {}", "Invalid state".red(), e).unwrap(),
            Self::InvalidInput(e) => write!(s, "{}: {}", "Invalid input".red(), e).unwrap(),
        };
        s
    }
}

macro_rules! validate_param {
    ($cond:expr, $($arg:expr),+) => {{
        if !($cond) {
            (
                Err($crate::Error::InvalidInput(format!($($arg),+)))
            ?)
        }
    }};
}
pub(crate) use validate_param;

macro_rules! add_path {
    (!) => {
        |e| $crate::Error::Io(e, Vec::new())
    };
    ($path:expr) => {
        |e| $crate::Error::Io(e, vec![std::convert::AsRef::<std::path::Path>::as_ref(&$path).to_owned()])
    };
    ($($path:expr),+) => {
        |e| {
            let mut v = Vec::new();
            $(
                v.push(std::convert::AsRef::<std::path::Path>::as_ref(&$path).to_owned());
            )*
            $crate::Error::Io(e, v)
        }
    };
}
pub(crate) use add_path;

macro_rules! error {
    ($var:ident, $($arg:expr),+ $(,)?) => {
        $crate::Error::$var(format!($($arg),+))
    }
}
pub(crate) use error;

/// Wrapper around the standard result.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_lists_every_candidate() {
        let e = Error::ambiguous("orthogroup listing files",
            vec![PathBuf::from("/x/Orthogroups.txt"), PathBuf::from("/x/Orthogroups_1.txt")]);
        let s = e.display();
        assert!(s.contains("/x/Orthogroups.txt"));
        assert!(s.contains("/x/Orthogroups_1.txt"));
        assert!(s.contains("2 candidates"));
    }

    #[test]
    fn add_path_attaches_paths() {
        let res: Result<()> = Err(io::Error::from(io::ErrorKind::NotFound)).map_err(add_path!("a", "b"));
        match res {
            Err(Error::Io(_, paths)) => assert_eq!(paths, vec![PathBuf::from("a"), PathBuf::from("b")]),
            _ => panic!("expected IO error"),
        }
    }
}
