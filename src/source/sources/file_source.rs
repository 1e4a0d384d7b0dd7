use std::path::PathBuf;

use crate::errors::LoadError;
use crate::source::ResourceSource;
use crate::transport::fs::FileStore;
use crate::types::ResourceName;

/// Resource source reading from a local directory (for example an exported dashboard `data/` folder).
pub struct FileSource {
    id: String,
    store: FileStore,
}

impl FileSource {
    /// Create a source rooted at `root`; the id is the root path.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            id: root.display().to_string(),
            store: FileStore::new(root),
        }
    }

    /// Override whether symlinks are followed when listing.
    pub fn with_follow_links(mut self, follow_links: bool) -> Self {
        self.store = self.store.with_follow_symlinks(follow_links);
        self
    }
}

impl ResourceSource for FileSource {
    fn id(&self) -> &str {
        &self.id
    }

    fn fetch(&self, resource: &str) -> Result<Vec<u8>, LoadError> {
        self.store.read(resource)
    }

    fn list(&self) -> Result<Vec<ResourceName>, LoadError> {
        Ok(self.store.list())
    }
}
