//! Catalog loading service
//!
//! Reads a TOML catalog through the filesystem boundary and builds its registry.

use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::application::{ApplicationError, ApplicationResult, Catalog, IoResultExt};
use crate::config::Settings;
use crate::infrastructure::traits::FileSystem;

/// Service for loading category catalogs.
pub struct CatalogService {
    fs: Arc<dyn FileSystem>,
    settings: Arc<Settings>,
}

impl CatalogService {
    /// Create a new catalog service.
    pub fn new(fs: Arc<dyn FileSystem>, settings: Arc<Settings>) -> Self {
        Self { fs, settings }
    }

    /// Load the catalog configured in settings.
    pub fn load_default(&self) -> ApplicationResult<Catalog> {
        self.load(&self.settings.catalog)
    }

    /// Load a catalog file.
    pub fn load(&self, path: &Path) -> ApplicationResult<Catalog> {
        debug!("load: catalog={}", path.display());
        if !self.fs.exists(path) {
            return Err(ApplicationError::catalog(format!(
                "catalog file not found: {}",
                path.display()
            )));
        }
        if !self.fs.is_file(path) {
            return Err(ApplicationError::catalog(format!(
                "catalog path is not a file: {}",
                path.display()
            )));
        }
        let content = self.fs.read_to_string(path).with_path_context("read catalog", path)?;
        let catalog = Catalog::from_toml(&content, self.settings.default_related_name.as_deref())
            .map_err(|e| match e {
                ApplicationError::Catalog { message } => ApplicationError::Catalog {
                    message: format!("{}: {}", path.display(), message),
                },
                other => other,
            })?;
        debug!("load: {} categories", catalog.registry().len());
        Ok(catalog)
    }
}
