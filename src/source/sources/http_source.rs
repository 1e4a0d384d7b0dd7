use crate::config::HttpSourceConfig;
use crate::errors::LoadError;
use crate::source::ResourceSource;
use crate::transport::http::HttpStore;

/// Resource source fetching `{base_url}/{resource}` over HTTP.
///
/// Listing is not supported; callers supply dataset ids directly.
pub struct HttpSource {
    store: HttpStore,
}

impl HttpSource {
    /// Create a source for `config`.
    pub fn new(config: HttpSourceConfig) -> Self {
        Self {
            store: HttpStore::new(config),
        }
    }
}

impl ResourceSource for HttpSource {
    fn id(&self) -> &str {
        &self.store.config().base_url
    }

    fn fetch(&self, resource: &str) -> Result<Vec<u8>, LoadError> {
        self.store.get(resource)
    }
}
