use std::{
    io::{self, BufReader, Write, BufWriter},
    fs::{self, File, OpenOptions},
    path::{Path, PathBuf, MAIN_SEPARATOR},
    ffi::OsStr,
};
use crate::err::{Error, add_path};

/// Opens a buffered text file for reading.
pub fn open(filename: &Path) -> Result<BufReader<File>, Error> {
    File::open(filename).map(BufReader::new).map_err(add_path!(filename))
}

/// Creates (or truncates) a buffered file.
pub fn create_file(filename: &Path) -> Result<BufWriter<File>, Error> {
    File::create(filename).map(BufWriter::new).map_err(add_path!(filename))
}

/// Appends `text` to the end of the file, creating the file if needed.
pub fn append_to_file(filename: &Path, text: &str) -> Result<(), Error> {
    let mut file = OpenOptions::new().create(true).append(true).open(filename).map_err(add_path!(filename))?;
    file.write_all(text.as_bytes()).map_err(add_path!(filename))
}

/// Returns a path with a new suffix appended to the end.
pub fn append_path(path: &Path, suffix: impl AsRef<OsStr>) -> PathBuf {
    let mut os_string = path.as_os_str().to_owned();
    os_string.push(suffix.as_ref());
    os_string.into()
}

/// Create directory, if it does not exist yet.
/// Directory, created concurrently by someone else, is not an error.
pub fn mkdir(path: impl AsRef<Path>) -> Result<(), Error> {
    let path = path.as_ref();
    if path.is_dir() {
        return Ok(());
    }
    match fs::create_dir(path) {
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists && path.is_dir() => Ok(()),
        res => res.map_err(add_path!(path)),
    }
}

/// Checks if the path exists, propagating errors such as missing permissions.
pub fn exists(path: &Path) -> Result<bool, Error> {
    path.try_exists().map_err(add_path!(path))
}

/// Converts a relative path into an absolute one, without resolving symbolic links.
pub fn absolute(path: &Path) -> Result<PathBuf, Error> {
    if path.is_absolute() {
        Ok(path.to_owned())
    } else {
        Ok(std::env::current_dir().map_err(add_path!(!))?.join(path))
    }
}

/// Directory path as a string with exactly one trailing separator.
pub fn dir_string(path: &Path) -> String {
    let s = path.to_string_lossy();
    let trimmed = s.trim_end_matches(MAIN_SEPARATOR);
    format!("{}{}", trimmed, MAIN_SEPARATOR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mkdir_twice() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("a");
        mkdir(&dir).unwrap();
        mkdir(&dir).unwrap();
        assert!(dir.is_dir());
    }

    #[test]
    fn mkdir_over_file_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("a");
        fs::write(&file, "").unwrap();
        assert!(matches!(mkdir(&file), Err(Error::Io(..))));
    }

    #[test]
    fn trailing_separator() {
        assert_eq!(dir_string(Path::new("/a/b/c")), "/a/b/c/");
        assert_eq!(dir_string(Path::new("/a/b/c/")), "/a/b/c/");
        assert!(absolute(Path::new("a/b")).unwrap().is_absolute());
        assert_eq!(append_path(Path::new("/a/x.txt"), "_id_pairs.txt"), PathBuf::from("/a/x.txt_id_pairs.txt"));
    }
}
