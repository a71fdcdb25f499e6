//! `[data.*]` and `[[pages]]` sections.
//!
//! These describe the dashboard itself and are converted into spec types by
//! [`ProjectConfig::into_spec`](super::ProjectConfig::into_spec).

use super::ConfigError;
use crate::spec::{
    BlockSpec, ContentItem, DataSources, PageSpec, Placement, ShowWhen, TabPath, Table,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// `[data.<name>]` - a named table, from a JSON file or inline.
///
/// # Example
/// ```toml
/// [data.sales]
/// path = "data/sales.json"
///
/// [data.targets]
/// columns = ["region", "target"]
/// rows = [["West", 100], ["East", 80]]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DataConfig {
    /// JSON file, relative to the project root. `~` is expanded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub columns: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rows: Vec<Vec<toml::Value>>,
}

impl DataConfig {
    /// Load this table into `sources` under `name`.
    pub fn load(&self, name: &str, sources: &mut DataSources) -> Result<(), ConfigError> {
        match (&self.path, &self.columns) {
            (Some(path), None) if self.rows.is_empty() => sources.load_json(name, path),
            (None, Some(columns)) => {
                let rows = self
                    .rows
                    .iter()
                    .map(|row| {
                        row.iter()
                            .map(toml_to_json)
                            .collect::<Result<Vec<_>, _>>()
                            .map_err(|err| ConfigError::data(name, err))
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                sources.insert(
                    name,
                    Table {
                        columns: columns.clone(),
                        rows,
                    },
                )
            }
            _ => Err(ConfigError::data(
                name,
                "set either `path` or `columns` (with optional `rows`)",
            )),
        }
    }

    /// Make `path` absolute against `root`, expanding `~`.
    pub fn resolve_path(&mut self, root: &Path) {
        if let Some(path) = &self.path {
            let expanded = PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).into_owned());
            self.path = Some(if expanded.is_relative() {
                root.join(expanded)
            } else {
                expanded
            });
        }
    }
}

fn toml_to_json(value: &toml::Value) -> Result<serde_json::Value, String> {
    serde_json::to_value(value).map_err(|err| err.to_string())
}

/// `[[pages]]` - one dashboard page.
///
/// # Example
/// ```toml
/// [[pages]]
/// title = "Overview"
/// nav = "Reports"
///
/// [[pages.items]]
/// type = "chart"
/// kind = "bar"
/// data = "sales"
/// x = "month"
/// y = "revenue"
/// tabgroup = "Sales/Monthly"
/// filter_vars = ["region"]
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PageConfig {
    pub title: String,

    /// Output file stem; derived from the title when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Navbar menu path, e.g. `"Reports/Regional"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nav: Option<String>,

    /// Sidebar section path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sidebar: Option<String>,

    /// Overrides `[site].placement` for this page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placement: Option<Placement>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<ItemConfig>,
}

/// `[[pages.items]]` - one block plus its placement and bindings.
///
/// Every key not listed here is a field of the block type named by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemConfig {
    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tabgroup: Option<String>,

    /// Predicate such as `"region == 'West'"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_when: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub filter_vars: Vec<String>,

    #[serde(flatten)]
    pub options: toml::Table,
}

impl ItemConfig {
    pub fn into_item(&self) -> Result<ContentItem, ConfigError> {
        let options = match serde_json::to_value(&self.options) {
            Ok(serde_json::Value::Object(map)) => map,
            Ok(_) => serde_json::Map::new(),
            Err(err) => return Err(ConfigError::invalid_block(&self.kind, err.to_string())),
        };

        let mut item = ContentItem::new(BlockSpec::from_tagged(&self.kind, options)?)?;
        if let Some(id) = &self.id {
            item = item.id(id);
        }
        if let Some(path) = &self.tabgroup {
            item = item.tabgroup(path)?;
        }
        if let Some(expr) = &self.show_when {
            let predicate = ShowWhen::parse(expr).map_err(|err| {
                ConfigError::invalid_block(&self.kind, format!("show_when: {err}"))
            })?;
            item = item.show_when(predicate);
        }
        for var in &self.filter_vars {
            item = item.filter_by(var);
        }
        Ok(item)
    }
}

impl PageConfig {
    pub fn into_page(&self) -> Result<PageSpec, ConfigError> {
        let mut page = PageSpec::new(&self.title);
        if let Some(slug) = &self.slug {
            page = page.slug(slug);
        }
        if let Some(description) = &self.description {
            page = page.description(description);
        }
        if let Some(nav) = &self.nav {
            page = page.nav(TabPath::parse(nav)?);
        }
        if let Some(sidebar) = &self.sidebar {
            page = page.sidebar(TabPath::parse(sidebar)?);
        }
        if let Some(placement) = self.placement {
            page = page.placement(placement);
        }

        let items = self
            .items
            .iter()
            .map(ItemConfig::into_item)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(page.extend(items))
    }
}
