use super::{Catalog, DeviceSummary};
use crate::error::CatalogError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fs;

/// A device served by a [`StaticCatalog`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub primary_kind: String,
    pub name: String,
    /// Class definition source.
    pub code: String,
}

/// An in-memory catalog, typically loaded from a JSON fixture of the form
/// `{ "devices": [ { "primary_kind": .., "name": .., "code": .. } ] }`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StaticCatalog {
    pub devices: Vec<CatalogEntry>,
}

impl StaticCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_device(
        mut self,
        primary_kind: impl Into<String>,
        name: impl Into<String>,
        code: impl Into<String>,
    ) -> Self {
        self.devices.push(CatalogEntry {
            primary_kind: primary_kind.into(),
            name: name.into(),
            code: code.into(),
        });
        self
    }

    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Loads a catalog fixture from a JSON file.
    pub fn from_file(path: &str) -> Result<Self, CatalogError> {
        let content = fs::read_to_string(path).map_err(|e| CatalogError::Io {
            path: path.to_string(),
            message: e.to_string(),
        })?;
        Self::from_json(&content)
    }
}

#[async_trait]
impl Catalog for StaticCatalog {
    async fn search_devices(&self, query: &str) -> Result<Vec<DeviceSummary>, CatalogError> {
        let needle = query.trim().to_lowercase();
        Ok(self
            .devices
            .iter()
            .filter(|d| {
                d.name.to_lowercase().contains(&needle)
                    || d.primary_kind.to_lowercase().contains(&needle)
            })
            .map(|d| DeviceSummary {
                primary_kind: d.primary_kind.clone(),
                name: d.name.clone(),
            })
            .collect())
    }

    async fn device_code(&self, kind: &str) -> Result<String, CatalogError> {
        self.devices
            .iter()
            .find(|d| d.primary_kind == kind)
            .map(|d| d.code.clone())
            .ok_or_else(|| CatalogError::UnknownDevice(kind.to_string()))
    }
}
