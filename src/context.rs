// File: ./src/context.rs
//! Where intuitask finds `config.toml` and its fallback vault.
//!
//! A vault named in the config is used as is. Without one, tasks live in
//! `<data dir>/vault`. `--root <dir>` replaces the platform directories with
//! `<dir>/config` and `<dir>/data`, which is also how tests stay isolated.
use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILE_NAME: &str = "config.toml";
const DEFAULT_VAULT_NAME: &str = "vault";

pub trait AppContext: Send + Sync + fmt::Debug {
    /// Directory holding the config file, created on demand.
    fn config_dir(&self) -> Result<PathBuf>;

    /// Application data directory, created on demand.
    fn data_dir(&self) -> Result<PathBuf>;

    fn config_file(&self) -> Result<PathBuf> {
        Ok(self.config_dir()?.join(CONFIG_FILE_NAME))
    }

    fn default_vault_dir(&self) -> Result<PathBuf> {
        Ok(self.data_dir()?.join(DEFAULT_VAULT_NAME))
    }
}

fn ensure_dir(dir: PathBuf) -> Result<PathBuf> {
    fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create directory '{}'", dir.display()))?;
    Ok(dir)
}

/// Platform directories, or subdirectories of an explicit root.
#[derive(Clone, Debug, Default)]
pub struct StandardContext {
    root: Option<PathBuf>,
}

impl StandardContext {
    pub fn new(root: Option<PathBuf>) -> Self {
        Self { root }
    }

    fn locate(&self, under_root: &str, platform: fn(&ProjectDirs) -> &Path) -> Result<PathBuf> {
        let dir = match &self.root {
            Some(root) => root.join(under_root),
            None => ProjectDirs::from("com", "intuitask", "intuitask")
                .map(|dirs| platform(&dirs).to_path_buf())
                .ok_or_else(|| anyhow!("Cannot determine the home directory"))?,
        };
        ensure_dir(dir)
    }
}

impl AppContext for StandardContext {
    fn config_dir(&self) -> Result<PathBuf> {
        self.locate("config", ProjectDirs::config_dir)
    }

    fn data_dir(&self) -> Result<PathBuf> {
        self.locate("data", ProjectDirs::data_dir)
    }
}

/// Throwaway directory tree for tests, deleted on drop.
#[derive(Debug)]
pub struct TestContext {
    root: PathBuf,
}

impl TestContext {
    pub fn new() -> Self {
        let root = std::env::temp_dir().join(format!("intuitask_test_{}", uuid::Uuid::new_v4()));
        fs::create_dir_all(&root).expect("failed to create TestContext temp dir");
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

impl AppContext for TestContext {
    fn config_dir(&self) -> Result<PathBuf> {
        ensure_dir(self.root.join("config"))
    }

    fn data_dir(&self) -> Result<PathBuf> {
        ensure_dir(self.root.join("data"))
    }
}

impl Drop for TestContext {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.root);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_override_layout() {
        let sandbox = TestContext::new();
        let ctx = StandardContext::new(Some(sandbox.root().to_path_buf()));

        assert_eq!(
            ctx.config_file().unwrap(),
            sandbox.root().join("config").join("config.toml")
        );
        assert_eq!(
            ctx.default_vault_dir().unwrap(),
            sandbox.root().join("data").join("vault")
        );
        assert!(sandbox.root().join("config").is_dir());
    }

    #[test]
    fn test_unwritable_root_is_reported() {
        let sandbox = TestContext::new();
        let blocker = sandbox.root().join("file");
        fs::write(&blocker, "").unwrap();

        let ctx = StandardContext::new(Some(blocker));
        let err = ctx.data_dir().unwrap_err();
        assert!(err.to_string().contains("Failed to create directory"));
    }

    #[test]
    fn test_sandbox_is_removed_on_drop() {
        let root = {
            let sandbox = TestContext::new();
            sandbox.data_dir().unwrap();
            sandbox.root().to_path_buf()
        };
        assert!(!root.exists());
    }
}
