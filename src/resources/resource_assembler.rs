//! Contains methods for building resource registries from data files: the redirect name
//! correspondence table (YAML) and resource bundles (JSON lists of [`Resource`]s).

use std::path::Path;

use thiserror::Error;

use crate::resources::{
    AddResourceError, RedirectCompatibility, RedirectCompatibilityEntry, Resource,
    ResourceStorage,
};

/// Redirect correspondence table shipped with the crate.
pub const BUNDLED_REDIRECTS: &str = include_str!("../../data/redirects.yml");

#[derive(Debug, Error)]
pub enum ResourceAssemblerError {
    #[error("failed to read resource file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid redirect table: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid resource bundle: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Registry(#[from] AddResourceError),
}

/// Parses a YAML sequence of `{ adg, ubo?, abp? }` mappings.
///
/// ```yaml
/// - adg: noopjs
///   ubo: noop.js
///   abp: blank-js
/// ```
pub fn read_redirect_compatibility(
    data: &str,
) -> Result<Vec<RedirectCompatibilityEntry>, ResourceAssemblerError> {
    Ok(serde_yaml::from_str(data)?)
}

/// Parses a JSON array of serialized [`Resource`]s.
pub fn read_resources(data: &str) -> Result<Vec<Resource>, ResourceAssemblerError> {
    Ok(serde_json::from_str(data)?)
}

/// Builds the redirect correspondence tables from a YAML file on disk.
pub fn assemble_redirect_compatibility(
    path: &Path,
) -> Result<RedirectCompatibility, ResourceAssemblerError> {
    let data = std::fs::read_to_string(path)?;
    let entries = read_redirect_compatibility(&data)?;
    log::debug!("Read {} redirect entries from {:?}", entries.len(), path);
    Ok(RedirectCompatibility::from_entries(entries)?)
}

/// Builds a [`ResourceStorage`] from a JSON resource bundle on disk.
pub fn assemble_resources(path: &Path) -> Result<ResourceStorage, ResourceAssemblerError> {
    let data = std::fs::read_to_string(path)?;
    let resources = read_resources(&data)?;
    Ok(ResourceStorage::from_resources(resources)?)
}

#[cfg(test)]
#[path = "../../tests/unit/resources/resource_assembler.rs"]
mod unit_tests;
