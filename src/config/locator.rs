//! Configuration file discovery
//!
//! Files are searched in an ordered list of directories and the first
//! existing match wins. The default list targets test runners that execute
//! from a nested build directory: the working directory, its grandparent
//! (the project root) and `config/` under the project root.

use crate::error::{Result, StrataError};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Subdirectory of the project root searched last
pub const CONFIG_DIR: &str = "config";

/// Ordered candidate directories for configuration files.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchPath {
    dirs: Vec<PathBuf>,
}

impl SearchPath {
    /// Search exactly the given directories, in order.
    pub fn new<I, P>(dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            dirs: dirs.into_iter().map(Into::into).collect(),
        }
    }

    /// Default search path rooted at the current working directory.
    pub fn current() -> Result<Self> {
        Ok(Self::from_dir(std::env::current_dir()?))
    }

    /// Default search path rooted at `dir`: `dir`, its grandparent, and the
    /// grandparent's `config/` directory. The last two are omitted when `dir`
    /// is too shallow to have a grandparent.
    pub fn from_dir<P: Into<PathBuf>>(dir: P) -> Self {
        let dir = dir.into();
        let mut dirs = vec![dir.clone()];

        if let Some(project_root) = dir.parent().and_then(Path::parent) {
            dirs.push(project_root.to_path_buf());
            dirs.push(project_root.join(CONFIG_DIR));
        }

        Self { dirs }
    }

    /// Append a directory to the end of the search order.
    pub fn push<P: Into<PathBuf>>(&mut self, dir: P) {
        self.dirs.push(dir.into());
    }

    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }

    /// Every path that would be checked for `name`, in order.
    pub fn candidates(&self, name: &str) -> Vec<PathBuf> {
        self.dirs.iter().map(|dir| dir.join(name)).collect()
    }

    /// Return the first candidate for `name` that is an existing file.
    pub fn locate(&self, name: &str) -> Option<PathBuf> {
        let found = self.candidates(name).into_iter().find(|path| path.is_file());

        match &found {
            Some(path) => debug!("Located {} at {}", name, path.display()),
            None => debug!("{} not found in {} search locations", name, self.dirs.len()),
        }

        found
    }

    /// Like [`locate`](Self::locate) but a miss is an error.
    pub fn require(&self, name: &str) -> Result<PathBuf> {
        self.locate(name)
            .ok_or_else(|| StrataError::file_not_found(name))
    }
}
