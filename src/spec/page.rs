//! Page specs: an ordered, append-only list of content items.

use super::{ContentItem, TabPath};
use crate::utils::slug::slugify;
use serde::{Deserialize, Serialize};

/// Where items without a `tabgroup` go relative to the grouped tabs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Placement {
    #[default]
    Before,
    After,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageSpec {
    title: String,
    slug: Option<String>,
    description: Option<String>,
    nav: Option<TabPath>,
    sidebar: Option<TabPath>,
    placement: Option<Placement>,
    items: Vec<ContentItem>,
}

impl PageSpec {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            slug: None,
            description: None,
            nav: None,
            sidebar: None,
            placement: None,
            items: Vec::new(),
        }
    }

    /// Append an item. Items are never reordered or removed.
    pub fn add(mut self, item: ContentItem) -> Self {
        self.items.push(item);
        self
    }

    pub fn extend(mut self, items: impl IntoIterator<Item = ContentItem>) -> Self {
        self.items.extend(items);
        self
    }

    pub fn slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = Some(slug.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Place the page in a navbar menu, e.g. `"Reports/Regional"`.
    pub fn nav(mut self, path: TabPath) -> Self {
        self.nav = Some(path);
        self
    }

    /// Place the page in a sidebar section.
    pub fn sidebar(mut self, path: TabPath) -> Self {
        self.sidebar = Some(path);
        self
    }

    /// Override the project's ungrouped-item placement for this page.
    pub fn placement(mut self, placement: Placement) -> Self {
        self.placement = Some(placement);
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Output file stem: the explicit slug, or one derived from the title.
    pub fn file_stem(&self) -> String {
        self.slug
            .as_deref()
            .map_or_else(|| slugify(&self.title), slugify)
    }

    pub fn page_description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn nav_path(&self) -> Option<&TabPath> {
        self.nav.as_ref()
    }

    pub fn sidebar_path(&self) -> Option<&TabPath> {
        self.sidebar.as_ref()
    }

    pub fn placement_override(&self) -> Option<Placement> {
        self.placement
    }

    pub fn items(&self) -> &[ContentItem] {
        &self.items
    }
}
