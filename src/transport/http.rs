use crate::config::HttpSourceConfig;
use crate::errors::LoadError;

/// HTTP transport issuing one blocking GET per resource.
pub struct HttpStore {
    config: HttpSourceConfig,
}

impl HttpStore {
    /// Create a transport for `config`.
    pub fn new(config: HttpSourceConfig) -> Self {
        Self { config }
    }

    /// Transport settings.
    pub fn config(&self) -> &HttpSourceConfig {
        &self.config
    }

    /// Fetch the body of `resource`. Non-2xx responses are errors.
    pub fn get(&self, resource: &str) -> Result<Vec<u8>, LoadError> {
        let url = self.config.url_for(resource);
        let response = ureq::get(&url).call().map_err(|err| LoadError::Fetch {
            resource: resource.to_string(),
            reason: format!("request to '{url}' failed: {err}"),
        })?;
        response
            .into_body()
            .with_config()
            .limit(self.config.max_body_bytes)
            .read_to_vec()
            .map_err(|err| LoadError::Fetch {
                resource: resource.to_string(),
                reason: format!("failed reading response body from '{url}': {err}"),
            })
    }
}
