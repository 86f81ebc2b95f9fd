//! Static service catalog.
//!
//! The catalog is a JSON array of `{ "name": ..., "url": ... }` records,
//! loaded once before scheduling starts and never mutated afterwards.

use std::collections::HashSet;
use std::path::Path;

use reqwest::Url;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::core::ConfigError;

/// A named remote HTTP endpoint to be polled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceDescriptor {
    /// Unique, non-empty service name.
    pub name: String,
    /// Absolute http(s) URI polled with GET.
    pub url: String,
    /// Free-form description shown by `--list`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ServiceDescriptor {
    /// Create a descriptor without a description.
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            description: None,
        }
    }
}

/// Ordered, validated set of services keyed by unique name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceCatalog {
    services: Vec<ServiceDescriptor>,
}

impl ServiceCatalog {
    /// Build a catalog, validating names and urls.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the list is empty, a name is empty or
    /// duplicated, or a url is not an absolute http(s) URI.
    pub fn new(services: Vec<ServiceDescriptor>) -> Result<Self, ConfigError> {
        if services.is_empty() {
            return Err(ConfigError::EmptyCatalog);
        }
        let mut seen = HashSet::with_capacity(services.len());
        for (idx, service) in services.iter().enumerate() {
            if service.name.trim().is_empty() {
                return Err(ConfigError::EmptyServiceName(idx));
            }
            if !seen.insert(service.name.as_str()) {
                return Err(ConfigError::DuplicateService(service.name.clone()));
            }
            validate_url(service)?;
        }
        Ok(Self { services })
    }

    /// Parse a catalog from its JSON representation.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::CatalogMalformed` for invalid JSON and the
    /// validation errors of [`ServiceCatalog::new`].
    pub fn from_json_str(input: &str) -> Result<Self, ConfigError> {
        let services: Vec<ServiceDescriptor> = serde_json::from_str(input)?;
        Self::new(services)
    }

    /// Load a catalog from a file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::CatalogUnreadable` if the file cannot be read,
    /// otherwise the errors of [`ServiceCatalog::from_json_str`].
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::CatalogUnreadable {
            path: path.to_path_buf(),
            source,
        })?;
        let catalog = Self::from_json_str(&raw)?;
        info!(path = %path.display(), services = catalog.len(), "Loaded service catalog");
        Ok(catalog)
    }

    /// All services in catalog order.
    #[must_use]
    pub fn services(&self) -> &[ServiceDescriptor] {
        &self.services
    }

    /// Number of services.
    #[must_use]
    pub fn len(&self) -> usize {
        self.services.len()
    }

    /// Whether the catalog is empty. Always false for a validated catalog.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    /// Look up a service by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ServiceDescriptor> {
        self.services.iter().find(|s| s.name == name)
    }

    /// Select services by name, preserving catalog order.
    ///
    /// An empty `names` selects everything. Unknown names are dropped with a
    /// warning.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NoServicesSelected` if nothing remains.
    pub fn select<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<ServiceDescriptor>, ConfigError> {
        if names.is_empty() {
            return Ok(self.services.clone());
        }
        let wanted: HashSet<&str> = names.iter().map(AsRef::as_ref).collect();
        for name in names.iter().map(AsRef::as_ref) {
            if self.get(name).is_none() {
                warn!(service = %name, "Unknown service requested, skipping");
            }
        }
        let selected: Vec<ServiceDescriptor> = self
            .services
            .iter()
            .filter(|s| wanted.contains(s.name.as_str()))
            .cloned()
            .collect();
        if selected.is_empty() {
            return Err(ConfigError::NoServicesSelected);
        }
        Ok(selected)
    }
}

fn validate_url(service: &ServiceDescriptor) -> Result<(), ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidUrl {
        name: service.name.clone(),
        url: service.url.clone(),
        reason,
    };
    let url = Url::parse(&service.url).map_err(|e| invalid(e.to_string()))?;
    match url.scheme() {
        "http" | "https" => {}
        other => return Err(invalid(format!("unsupported scheme `{other}`"))),
    }
    if url.host_str().is_none() {
        return Err(invalid("missing host".into()));
    }
    Ok(())
}
