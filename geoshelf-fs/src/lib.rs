//! Capability-based filesystem helpers built on `cap-std` and `camino`.
//!
//! The document store never touches `std::fs` directly. Every operation opens
//! an ambient [`fs_utf8::Dir`] for the storage directory and works relative to
//! it, so file names can never escape the directory they belong to.
#![forbid(unsafe_code)]

use camino::Utf8Path;
use cap_std::{ambient_authority, fs_utf8};
use std::io;

/// Open an existing directory using ambient authority.
pub fn open_dir(path: &Utf8Path) -> io::Result<fs_utf8::Dir> {
    fs_utf8::Dir::open_ambient_dir(path, ambient_authority())
}

/// Create `path` and any missing parents.
///
/// Succeeds when the directory already exists. Relative paths resolve against
/// the current directory and may climb out of it (`../storage`). Fails when
/// something other than a directory occupies `path`.
pub fn ensure_dir(path: &Utf8Path) -> io::Result<()> {
    match fs_utf8::Dir::create_ambient_dir_all(path, ambient_authority()) {
        Err(err) if err.kind() != io::ErrorKind::AlreadyExists => return Err(err),
        _ => {}
    }
    open_dir(path).map(drop)
}

/// Resolve the parent directory of `path` and return it with the file name.
pub fn open_dir_and_file(path: &Utf8Path) -> io::Result<(fs_utf8::Dir, String)> {
    let parent = path
        .parent()
        .filter(|parent| !parent.as_str().is_empty())
        .unwrap_or_else(|| Utf8Path::new("."));
    let file_name = path
        .file_name()
        .ok_or_else(|| io::Error::other(format!("{path} does not name a file")))?
        .to_owned();
    let dir = open_dir(parent)?;
    Ok((dir, file_name))
}

/// Read the whole file at `path` into memory.
pub fn read_file(path: &Utf8Path) -> io::Result<Vec<u8>> {
    let (dir, name) = open_dir_and_file(path)?;
    dir.read(name)
}

/// Whether `error` reports a missing file or directory.
#[must_use]
pub fn is_not_found(error: &io::Error) -> bool {
    error.kind() == io::ErrorKind::NotFound
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    #[fixture]
    fn scratch() -> (TempDir, Utf8PathBuf) {
        let dir = TempDir::new().expect("create temp dir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 temp dir");
        (dir, root)
    }

    #[rstest]
    fn ensure_dir_creates_nested_directories(scratch: (TempDir, Utf8PathBuf)) {
        let (_guard, root) = scratch;
        let target = root.join("a/b/c");
        ensure_dir(&target).expect("create nested dirs");
        assert!(target.is_dir());
    }

    #[rstest]
    fn ensure_dir_accepts_existing_directory(scratch: (TempDir, Utf8PathBuf)) {
        let (_guard, root) = scratch;
        ensure_dir(&root).expect("existing dir is fine");
        ensure_dir(&root).expect("and idempotent");
    }

    #[rstest]
    fn ensure_dir_rejects_regular_file(scratch: (TempDir, Utf8PathBuf)) {
        let (_guard, root) = scratch;
        let occupied = root.join("occupied");
        std::fs::write(&occupied, b"not a dir").expect("write file");
        let err = ensure_dir(&occupied).expect_err("file in the way");
        assert!(!is_not_found(&err));
    }

    #[rstest]
    fn read_file_returns_contents(scratch: (TempDir, Utf8PathBuf)) {
        let (_guard, root) = scratch;
        let path = root.join("doc.json");
        std::fs::write(&path, b"{}").expect("write file");
        assert_eq!(read_file(&path).expect("read file"), b"{}");
    }

    #[rstest]
    fn read_file_reports_missing(scratch: (TempDir, Utf8PathBuf)) {
        let (_guard, root) = scratch;
        let err = read_file(&root.join("missing")).expect_err("missing file");
        assert!(is_not_found(&err));
    }
}
