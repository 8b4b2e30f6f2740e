//! Page catalog
//!
//! Static registry of operator-defined pages: each page maps an identifier
//! to a table plus zero or more named saved filters. Loaded once at startup
//! from a JSON file and immutable at request time.

pub mod view;

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::data::duckdb::filters::FilterInput;

/// One operator-authored saved filter: a named set of filter definitions.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SavedFilter {
    pub identifier: String,
    pub display_name: String,
    pub filter_definition: BTreeMap<String, FilterInput>,
}

/// One page definition from the catalog file.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PageConfig {
    pub page_identifier: String,
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    pub table_reference: String,
    #[serde(default)]
    pub saved_filters: Vec<SavedFilter>,
}

/// The full catalog, in the file's declaration order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageCatalog {
    pub pages: Vec<PageConfig>,
}

impl PageCatalog {
    /// Load the catalog from a JSON file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read page catalog at {}", path.display()))?;
        let catalog: Self = serde_json::from_str(&raw)
            .with_context(|| format!("Invalid page catalog at {}", path.display()))?;
        tracing::info!(pages = catalog.pages.len(), "Loaded page catalog");
        Ok(catalog)
    }

    pub fn page(&self, identifier: &str) -> Option<&PageConfig> {
        self.pages.iter().find(|p| p.page_identifier == identifier)
    }
}

impl PageConfig {
    pub fn saved_filter(&self, identifier: &str) -> Option<&SavedFilter> {
        self.saved_filters.iter().find(|f| f.identifier == identifier)
    }
}
