//! Project specs: pages, shared data and site-wide settings.

use super::{DataSources, PageSpec, Placement, Table};
use crate::config::ConfigError;
use serde::{Deserialize, Serialize};

/// Which site navigation the page tree feeds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NavStyle {
    #[default]
    Navbar,
    Sidebar,
    Both,
}

impl NavStyle {
    pub const fn has_navbar(self) -> bool {
        matches!(self, Self::Navbar | Self::Both)
    }

    pub const fn has_sidebar(self) -> bool {
        matches!(self, Self::Sidebar | Self::Both)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectSpec {
    pub(crate) title: String,
    pub(crate) description: Option<String>,
    pub(crate) theme: String,
    pub(crate) output_dir: String,
    pub(crate) placement: Placement,
    pub(crate) navigation: NavStyle,
    pub(crate) data: DataSources,
    pub(crate) pages: Vec<PageSpec>,
}

impl ProjectSpec {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            theme: "cosmo".to_owned(),
            output_dir: "_site".to_owned(),
            placement: Placement::default(),
            navigation: NavStyle::default(),
            data: DataSources::new(),
            pages: Vec::new(),
        }
    }

    pub fn page(mut self, page: PageSpec) -> Self {
        self.pages.push(page);
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Bootswatch theme name passed to the renderer.
    pub fn theme(mut self, theme: impl Into<String>) -> Self {
        self.theme = theme.into();
        self
    }

    /// Directory the renderer writes HTML into, relative to the project.
    pub fn output_dir(mut self, dir: impl Into<String>) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub fn placement(mut self, placement: Placement) -> Self {
        self.placement = placement;
        self
    }

    pub fn navigation(mut self, navigation: NavStyle) -> Self {
        self.navigation = navigation;
        self
    }

    /// Register a named table.
    pub fn data(mut self, name: impl Into<String>, table: Table) -> Result<Self, ConfigError> {
        self.data.insert(name, table)?;
        Ok(self)
    }

    pub fn with_data(mut self, data: DataSources) -> Self {
        self.data = data;
        self
    }

    pub fn title_text(&self) -> &str {
        &self.title
    }

    pub fn pages(&self) -> &[PageSpec] {
        &self.pages
    }

    pub fn sources(&self) -> &DataSources {
        &self.data
    }

    pub fn default_placement(&self) -> Placement {
        self.placement
    }

    pub fn nav_style(&self) -> NavStyle {
        self.navigation
    }

    pub fn site_output_dir(&self) -> &str {
        &self.output_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults() {
        let project = ProjectSpec::new("Dash");
        assert_eq!(project.theme, "cosmo");
        assert_eq!(project.output_dir, "_site");
        assert_eq!(project.nav_style(), NavStyle::Navbar);
        assert!(project.pages().is_empty());
    }

    #[test]
    fn test_data_is_validated() {
        let ragged = Table::new(["a", "b"]).row([json!(1)]);
        assert!(ProjectSpec::new("Dash").data("t", ragged).is_err());

        let ok = Table::new(["a"]).row([json!(1)]);
        let project = ProjectSpec::new("Dash").data("t", ok).unwrap();
        assert_eq!(project.sources().len(), 1);
    }

    #[test]
    fn test_nav_style_flags() {
        assert!(NavStyle::Navbar.has_navbar());
        assert!(!NavStyle::Navbar.has_sidebar());
        assert!(NavStyle::Both.has_navbar() && NavStyle::Both.has_sidebar());
    }
}
