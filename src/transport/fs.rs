use std::fs;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

use crate::errors::LoadError;
use crate::types::ResourceName;

/// Filesystem transport that reads resources relative to a root directory.
pub struct FileStore {
    root: PathBuf,
    follow_links: bool,
}

impl FileStore {
    /// Create a store rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            follow_links: false,
        }
    }

    /// Configure symlink traversal while listing.
    pub fn with_follow_symlinks(mut self, follow_links: bool) -> Self {
        self.follow_links = follow_links;
        self
    }

    /// Root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Read the full contents of `resource`.
    pub fn read(&self, resource: &str) -> Result<Vec<u8>, LoadError> {
        let path = self.resolve(resource)?;
        fs::read(&path).map_err(|err| LoadError::Fetch {
            resource: resource.to_string(),
            reason: format!("failed reading {}: {err}", path.display()),
        })
    }

    /// Resource names (root-relative, `/`-separated) of every file under the root, sorted.
    pub fn list(&self) -> Vec<ResourceName> {
        let mut walker = WalkDir::new(&self.root);
        if self.follow_links {
            walker = walker.follow_links(true);
        }
        let mut names: Vec<ResourceName> = walker
            .into_iter()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_file())
            .filter_map(|entry| {
                entry
                    .path()
                    .strip_prefix(&self.root)
                    .ok()
                    .map(resource_name_from_path)
            })
            .collect();
        names.sort();
        names
    }

    fn resolve(&self, resource: &str) -> Result<PathBuf, LoadError> {
        let relative = Path::new(resource);
        let escapes = relative
            .components()
            .any(|component| !matches!(component, Component::Normal(_) | Component::CurDir));
        if resource.is_empty() || escapes {
            return Err(LoadError::Fetch {
                resource: resource.to_string(),
                reason: "resource name must be a relative path inside the store root".into(),
            });
        }
        Ok(self.root.join(relative))
    }
}

fn resource_name_from_path(path: &Path) -> ResourceName {
    path.components()
        .map(|component| component.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
