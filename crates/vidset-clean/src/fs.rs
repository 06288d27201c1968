//! Filesystem access capability for the cleanup engine.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use jwalk::{Parallelism, WalkDir};
use tracing::warn;

/// A file yielded by a traversal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Path of the entry.
    pub path: PathBuf,
    /// Size in bytes; `None` when the stat failed or the file vanished
    /// mid-walk.
    pub size: Option<u64>,
}

/// The list/stat/delete surface the cleanup engine needs.
///
/// Implementations must yield every regular file under a root in a
/// stable per-run order. Symlinked-in entries are whatever the
/// traversal yields; the engine does not special-case them.
pub trait FileSystem {
    /// Whether the path exists and is a directory.
    fn dir_exists(&self, path: &Path) -> bool;

    /// Every regular file under `root`, recursively.
    fn walk_files(&self, root: &Path) -> io::Result<Vec<FileEntry>>;

    /// Delete a single file.
    fn remove_file(&self, path: &Path) -> io::Result<()>;

    /// Immediate subdirectories of `dir`.
    fn subdirectories(&self, dir: &Path) -> io::Result<Vec<PathBuf>>;

    /// Whether `dir` contains no files and no subdirectories.
    fn dir_is_empty(&self, dir: &Path) -> io::Result<bool>;

    /// Remove a directory; fails if it is not empty.
    fn remove_dir(&self, dir: &Path) -> io::Result<()>;
}

/// [`FileSystem`] backed by real disk I/O.
///
/// Traversal uses a serial, sorted walk so a single run yields a
/// reproducible order.
#[derive(Debug, Clone, Copy, Default)]
pub struct RealFileSystem;

impl RealFileSystem {
    /// Create a new real filesystem handle.
    pub fn new() -> Self {
        Self
    }
}

impl FileSystem for RealFileSystem {
    fn dir_exists(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn walk_files(&self, root: &Path) -> io::Result<Vec<FileEntry>> {
        let walker = WalkDir::new(root)
            .parallelism(Parallelism::Serial)
            .sort(true)
            .skip_hidden(false)
            .follow_links(false);

        let mut files = Vec::new();
        for entry_result in walker {
            let entry = match entry_result {
                Ok(entry) => entry,
                Err(err) => {
                    warn!(error = %err, "skipping unreadable entry during walk");
                    continue;
                }
            };
            if entry.file_type().is_dir() {
                continue;
            }
            let size = entry.metadata().ok().map(|metadata| metadata.len());
            files.push(FileEntry {
                path: entry.path(),
                size,
            });
        }
        Ok(files)
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        std::fs::remove_file(path)
    }

    fn subdirectories(&self, dir: &Path) -> io::Result<Vec<PathBuf>> {
        let mut dirs = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            // entry.file_type() does not follow symlinks, so a symlink
            // to a directory is never descended into.
            if entry.file_type()?.is_dir() {
                dirs.push(entry.path());
            }
        }
        dirs.sort();
        Ok(dirs)
    }

    fn dir_is_empty(&self, dir: &Path) -> io::Result<bool> {
        Ok(std::fs::read_dir(dir)?.next().is_none())
    }

    fn remove_dir(&self, dir: &Path) -> io::Result<()> {
        std::fs::remove_dir(dir)
    }
}

/// In-memory [`FileSystem`] for tests and simulations.
///
/// Files and directories live in maps behind a [`Mutex`], so all trait
/// methods operate on `&self` without touching disk. Removal failures
/// can be injected per path to exercise the engine's partial-failure
/// paths.
#[derive(Debug, Default)]
pub struct MemoryFileSystem {
    inner: Mutex<MemInner>,
}

#[derive(Debug, Default)]
struct MemInner {
    files: BTreeMap<PathBuf, u64>,
    dirs: BTreeSet<PathBuf>,
    fail_remove: HashSet<PathBuf>,
    fail_rmdir: HashSet<PathBuf>,
}

impl MemoryFileSystem {
    /// Create an empty in-memory filesystem.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a filesystem pre-populated with files.
    ///
    /// Every ancestor directory of each file is registered implicitly.
    pub fn with_files<I, P>(files: I) -> Self
    where
        I: IntoIterator<Item = (P, u64)>,
        P: Into<PathBuf>,
    {
        let fs = Self::new();
        for (path, size) in files {
            fs.add_file(path, size);
        }
        fs
    }

    /// Add a file, registering its ancestor directories.
    pub fn add_file(&self, path: impl Into<PathBuf>, size: u64) {
        let path = path.into();
        let mut inner = self.inner.lock().unwrap();
        for ancestor in path.ancestors().skip(1) {
            if !ancestor.as_os_str().is_empty() {
                inner.dirs.insert(ancestor.to_path_buf());
            }
        }
        inner.files.insert(path, size);
    }

    /// Add an empty directory, registering its ancestors.
    pub fn add_dir(&self, path: impl Into<PathBuf>) {
        let path = path.into();
        let mut inner = self.inner.lock().unwrap();
        for ancestor in path.ancestors() {
            if !ancestor.as_os_str().is_empty() {
                inner.dirs.insert(ancestor.to_path_buf());
            }
        }
    }

    /// Make every future removal of `path` fail with `PermissionDenied`.
    pub fn fail_removal_of(&self, path: impl Into<PathBuf>) {
        self.inner.lock().unwrap().fail_remove.insert(path.into());
    }

    /// Make every future directory removal of `path` fail.
    pub fn fail_prune_of(&self, path: impl Into<PathBuf>) {
        self.inner.lock().unwrap().fail_rmdir.insert(path.into());
    }

    /// Whether a file currently exists.
    pub fn contains_file(&self, path: impl AsRef<Path>) -> bool {
        self.inner.lock().unwrap().files.contains_key(path.as_ref())
    }

    /// Whether a directory currently exists.
    pub fn contains_dir(&self, path: impl AsRef<Path>) -> bool {
        self.inner.lock().unwrap().dirs.contains(path.as_ref())
    }

    /// Current number of files.
    pub fn file_count(&self) -> usize {
        self.inner.lock().unwrap().files.len()
    }
}

impl FileSystem for MemoryFileSystem {
    fn dir_exists(&self, path: &Path) -> bool {
        self.inner.lock().unwrap().dirs.contains(path)
    }

    fn walk_files(&self, root: &Path) -> io::Result<Vec<FileEntry>> {
        let inner = self.inner.lock().unwrap();
        if !inner.dirs.contains(root) {
            return Err(io::Error::new(io::ErrorKind::NotFound, "no such directory"));
        }
        Ok(inner
            .files
            .iter()
            .filter(|(path, _)| path.starts_with(root))
            .map(|(path, size)| FileEntry {
                path: path.clone(),
                size: Some(*size),
            })
            .collect())
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_remove.contains(path) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "removal rejected",
            ));
        }
        if inner.files.remove(path).is_none() {
            return Err(io::Error::new(io::ErrorKind::NotFound, "no such file"));
        }
        Ok(())
    }

    fn subdirectories(&self, dir: &Path) -> io::Result<Vec<PathBuf>> {
        let inner = self.inner.lock().unwrap();
        if !inner.dirs.contains(dir) {
            return Err(io::Error::new(io::ErrorKind::NotFound, "no such directory"));
        }
        Ok(inner
            .dirs
            .iter()
            .filter(|candidate| candidate.parent() == Some(dir))
            .cloned()
            .collect())
    }

    fn dir_is_empty(&self, dir: &Path) -> io::Result<bool> {
        let inner = self.inner.lock().unwrap();
        if !inner.dirs.contains(dir) {
            return Err(io::Error::new(io::ErrorKind::NotFound, "no such directory"));
        }
        let has_file = inner
            .files
            .keys()
            .any(|path| path.parent() == Some(dir));
        let has_subdir = inner
            .dirs
            .iter()
            .any(|candidate| candidate.parent() == Some(dir));
        Ok(!has_file && !has_subdir)
    }

    fn remove_dir(&self, dir: &Path) -> io::Result<()> {
        if self.inner.lock().unwrap().fail_rmdir.contains(dir) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "prune rejected",
            ));
        }
        if !self.dir_is_empty(dir)? {
            return Err(io::Error::other("directory not empty"));
        }
        self.inner.lock().unwrap().dirs.remove(dir);
        Ok(())
    }
}
