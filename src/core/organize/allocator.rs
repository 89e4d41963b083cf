//! Collision-free destination names.

use std::collections::HashSet;
use std::ffi::{OsStr, OsString};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Hands out destination paths that do not exist yet.
///
/// A name is free when nothing exists at that path and it has not been handed
/// out earlier by this allocator. Collisions get `_1`, `_2`, ... before the
/// extension, counting from 1. Names are kept as raw `OsStr` bytes.
#[derive(Debug, Default)]
pub struct PathAllocator {
    reserved: HashSet<PathBuf>,
}

impl PathAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve a free path for `desired_name` inside `dir`
    pub fn allocate(&mut self, dir: &Path, desired_name: impl AsRef<OsStr>) -> PathBuf {
        let desired_name = desired_name.as_ref();
        let desired = dir.join(desired_name);
        if self.is_free(&desired) {
            self.reserved.insert(desired.clone());
            return desired;
        }

        let name = Path::new(desired_name);
        let stem = name.file_stem().unwrap_or_else(|| OsStr::new("file"));
        let ext = name.extension();

        let mut counter = 1usize;
        loop {
            let mut new_name = OsString::from(stem);
            new_name.push(format!("_{}", counter));
            if let Some(ext) = ext {
                new_name.push(".");
                new_name.push(ext);
            }
            let candidate = dir.join(new_name);
            if self.is_free(&candidate) {
                self.reserved.insert(candidate.clone());
                return candidate;
            }
            counter += 1;
        }
    }

    /// Give a path back after the transfer into it failed
    pub fn release(&mut self, path: &Path) {
        self.reserved.remove(path);
    }

    fn is_free(&self, path: &Path) -> bool {
        !self.reserved.contains(path) && fs::symlink_metadata(path).is_err()
    }
}

/// `mkdir -p`; a directory that already exists (or appears concurrently) is fine
pub fn ensure_dir(dir: &Path) -> io::Result<()> {
    match fs::create_dir_all(dir) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists && dir.is_dir() => Ok(()),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn free_name_is_used_as_is() {
        let temp = TempDir::new().unwrap();
        let mut allocator = PathAllocator::new();
        let path = allocator.allocate(temp.path(), "photo.jpg");
        assert_eq!(path, temp.path().join("photo.jpg"));
    }

    #[test]
    fn existing_files_get_numbered_suffixes() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("photo.jpg"), b"a").unwrap();
        fs::write(temp.path().join("photo_1.jpg"), b"b").unwrap();

        let mut allocator = PathAllocator::new();
        let path = allocator.allocate(temp.path(), "photo.jpg");
        assert_eq!(path, temp.path().join("photo_2.jpg"));
    }

    #[test]
    fn second_allocation_never_reuses_a_reserved_name() {
        let temp = TempDir::new().unwrap();
        let mut allocator = PathAllocator::new();

        let first = allocator.allocate(temp.path(), "IMG_1.png");
        let second = allocator.allocate(temp.path(), "IMG_1.png");
        assert_eq!(first, temp.path().join("IMG_1.png"));
        assert_eq!(second, temp.path().join("IMG_1_1.png"));
    }

    #[test]
    fn released_name_can_be_handed_out_again() {
        let temp = TempDir::new().unwrap();
        let mut allocator = PathAllocator::new();

        let first = allocator.allocate(temp.path(), "a.jpg");
        allocator.release(&first);
        assert_eq!(allocator.allocate(temp.path(), "a.jpg"), first);
    }

    #[test]
    fn names_without_extension() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("README"), b"x").unwrap();
        let mut allocator = PathAllocator::new();
        assert_eq!(
            allocator.allocate(temp.path(), "README"),
            temp.path().join("README_1")
        );
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_names_keep_their_bytes() {
        use std::os::unix::ffi::OsStrExt;

        let temp = TempDir::new().unwrap();
        let name = OsStr::from_bytes(b"caf\xe9.mov");
        let mut allocator = PathAllocator::new();

        let first = allocator.allocate(temp.path(), name);
        let second = allocator.allocate(temp.path(), name);
        assert_eq!(first, temp.path().join(name));
        assert_eq!(
            second,
            temp.path().join(OsStr::from_bytes(b"caf\xe9_1.mov"))
        );
    }

    #[test]
    fn ensure_dir_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("2024").join("08");
        ensure_dir(&dir).unwrap();
        ensure_dir(&dir).unwrap();
        assert!(dir.is_dir());
    }
}
