// Manages access to the markdown files that hold task lines.
//
// The codec never touches the filesystem itself. Every file operation goes
// through a `FileStore` handed in by the caller, so the same logic runs
// against a vault on disk or an in-memory map in tests.
use crate::error::StoreError;
use fs2::FileExt;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Whole-file read/replace capability.
///
/// Paths are vault-relative. Content is treated as `\n` separated lines; the
/// store never interprets it.
pub trait FileStore: Send + Sync {
    fn read(&self, path: &Path) -> Result<String, StoreError>;

    /// Replaces the content of an existing file.
    fn modify(&self, path: &Path, content: &str) -> Result<(), StoreError>;

    /// Creates a new file; fails if it already exists.
    fn create(&self, path: &Path, content: &str) -> Result<(), StoreError>;

    fn exists(&self, path: &Path) -> bool;
}

/// Files below a vault root on the local disk.
#[derive(Debug, Clone)]
pub struct LocalFileStore {
    root: PathBuf,
}

impl LocalFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        self.root.join(path)
    }

    fn get_lock_path(file_path: &Path) -> PathBuf {
        let name = file_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        file_path.with_file_name(format!(".{}.lock", name))
    }

    /// Runs `f` while holding an exclusive advisory lock tied to `file_path`.
    pub fn with_lock<F, T, E>(file_path: &Path, f: F) -> Result<T, E>
    where
        F: FnOnce() -> Result<T, E>,
        E: From<io::Error>,
    {
        let lock_path = Self::get_lock_path(file_path);
        let file = fs::OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)?;

        file.lock_exclusive()?;
        let result = f();
        file.unlock()?;
        result
    }

    /// Writes through a temporary sibling and renames it over `path`, so a
    /// crash never leaves a half-written file behind.
    pub fn atomic_write<P: AsRef<Path>, C: AsRef<[u8]>>(path: P, contents: C) -> io::Result<()> {
        let path = path.as_ref();
        let tmp_path = path.with_extension("tmp");
        fs::write(&tmp_path, contents)?;
        fs::rename(tmp_path, path)?;
        Ok(())
    }
}

impl FileStore for LocalFileStore {
    fn read(&self, path: &Path) -> Result<String, StoreError> {
        let full = self.resolve(path);
        if !full.is_file() {
            return Err(StoreError::NotFound(path.to_path_buf()));
        }
        // Writers rename complete files into place; reads take no lock.
        Ok(fs::read_to_string(&full)?)
    }

    fn modify(&self, path: &Path, content: &str) -> Result<(), StoreError> {
        let full = self.resolve(path);
        if !full.is_file() {
            return Err(StoreError::NotFound(path.to_path_buf()));
        }
        Self::with_lock(&full, || Self::atomic_write(&full, content))?;
        log::debug!("Wrote {} bytes to {}", content.len(), full.display());
        Ok(())
    }

    fn create(&self, path: &Path, content: &str) -> Result<(), StoreError> {
        let full = self.resolve(path);
        if full.exists() {
            return Err(StoreError::AlreadyExists(path.to_path_buf()));
        }
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent)?;
        }
        Self::with_lock(&full, || Self::atomic_write(&full, content))?;
        log::info!("Created {}", full.display());
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.resolve(path).is_file()
    }
}

/// In-process store, keyed by path. Useful for tests and previews.
#[derive(Debug, Default)]
pub struct MemoryFileStore {
    files: Mutex<HashMap<PathBuf, String>>,
}

impl MemoryFileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(self, path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        self.files
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(path.into(), content.into());
        self
    }

    fn files(&self) -> std::sync::MutexGuard<'_, HashMap<PathBuf, String>> {
        // A panic while holding the lock cannot leave the map half-updated.
        self.files.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl FileStore for MemoryFileStore {
    fn read(&self, path: &Path) -> Result<String, StoreError> {
        self.files()
            .get(path)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(path.to_path_buf()))
    }

    fn modify(&self, path: &Path, content: &str) -> Result<(), StoreError> {
        match self.files().get_mut(path) {
            Some(existing) => {
                *existing = content.to_string();
                Ok(())
            }
            None => Err(StoreError::NotFound(path.to_path_buf())),
        }
    }

    fn create(&self, path: &Path, content: &str) -> Result<(), StoreError> {
        let mut files = self.files();
        if files.contains_key(path) {
            return Err(StoreError::AlreadyExists(path.to_path_buf()));
        }
        files.insert(path.to_path_buf(), content.to_string());
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.files().contains_key(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{AppContext, TestContext};
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_atomic_write_and_read() {
        let ctx = TestContext::new();
        let store = LocalFileStore::new(ctx.data_dir().unwrap());
        let path = Path::new("Inbox/Tasks.md");

        store.create(path, "- [ ] a").unwrap();
        store.modify(path, "- [x] a\n- [ ] b").unwrap();

        assert_eq!(store.read(path).unwrap(), "- [x] a\n- [ ] b");
        assert!(!store.root().join("Inbox/Tasks.tmp").exists());
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let ctx = TestContext::new();
        let store = LocalFileStore::new(ctx.data_dir().unwrap());

        assert!(matches!(
            store.read(Path::new("nope.md")),
            Err(StoreError::NotFound(_))
        ));
        assert!(matches!(
            store.modify(Path::new("nope.md"), "x"),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn test_create_refuses_to_overwrite() {
        let store = MemoryFileStore::new().with_file("a.md", "x");
        assert!(matches!(
            store.create(Path::new("a.md"), "y"),
            Err(StoreError::AlreadyExists(_))
        ));
        assert_eq!(store.read(Path::new("a.md")).unwrap(), "x");
    }

    #[test]
    fn test_read_leaves_no_lock_file() {
        let ctx = TestContext::new();
        let root = ctx.data_dir().unwrap();
        fs::write(root.join("Tasks.md"), "- [ ] a").unwrap();
        let store = LocalFileStore::new(&root);

        assert_eq!(store.read(Path::new("Tasks.md")).unwrap(), "- [ ] a");
        assert!(!root.join(".Tasks.md.lock").exists());
    }

    #[test]
    fn test_locking_concurrency() {
        let ctx = TestContext::new();
        let root = ctx.data_dir().unwrap();
        let file_path = Arc::new(root.join("counter.txt"));
        fs::write(&*file_path, "0").unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let p = file_path.clone();
                thread::spawn(move || {
                    LocalFileStore::with_lock(&p, || -> io::Result<()> {
                        let n: u32 = fs::read_to_string(&*p)?.trim().parse().unwrap();
                        LocalFileStore::atomic_write(&*p, (n + 1).to_string())
                    })
                    .unwrap();
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(fs::read_to_string(&*file_path).unwrap(), "8");
    }
}
