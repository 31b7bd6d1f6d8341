//! Device catalog lookups.
//!
//! A [`Catalog`] answers the two questions the builder asks while the user
//! picks a function: which devices match a search string, and what is the
//! class definition of a given device.
use crate::error::CatalogError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

mod static_catalog;
mod thingpedia;

pub use static_catalog::{CatalogEntry, StaticCatalog};
pub use thingpedia::ThingpediaClient;

/// One device returned by a search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceSummary {
    pub primary_kind: String,
    pub name: String,
}

/// Envelope of the catalog's search endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub data: Vec<DeviceSummary>,
}

#[async_trait]
pub trait Catalog: Send + Sync {
    /// Searches devices by free text. An empty result is not an error.
    async fn search_devices(&self, query: &str) -> Result<Vec<DeviceSummary>, CatalogError>;

    /// Returns the source text of the class definition of `kind`.
    async fn device_code(&self, kind: &str) -> Result<String, CatalogError>;
}

#[async_trait]
impl<C: Catalog + ?Sized> Catalog for Box<C> {
    async fn search_devices(&self, query: &str) -> Result<Vec<DeviceSummary>, CatalogError> {
        (**self).search_devices(query).await
    }

    async fn device_code(&self, kind: &str) -> Result<String, CatalogError> {
        (**self).device_code(kind).await
    }
}
