//! `[site]` section configuration.
//!
//! Contains site-wide settings: title, theme and navigation layout.

use super::defaults;
use crate::spec::{NavStyle, Placement};
use educe::Educe;
use serde::{Deserialize, Serialize};

/// `[site]` section in vizdeck.toml - dashboard metadata.
///
/// # Example
/// ```toml
/// [site]
/// title = "Sales"
/// description = "Monthly sales dashboard"
/// theme = "flatly"
/// navigation = "both"
/// placement = "after"
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct SiteConfig {
    /// Site title shown in the navbar and browser tab.
    #[serde(default = "defaults::site::title")]
    #[educe(Default = defaults::site::title())]
    pub title: String,

    /// Site description for meta tags.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Bootswatch theme name.
    #[serde(default = "defaults::site::theme")]
    #[educe(Default = defaults::site::theme())]
    pub theme: String,

    /// Which navigation the page paths feed.
    #[serde(default)]
    pub navigation: NavStyle,

    /// Directory the renderer writes HTML into, relative to the build output.
    #[serde(default = "defaults::site::output_dir")]
    #[educe(Default = defaults::site::output_dir())]
    pub output_dir: String,

    /// Where items without a tab go relative to the tabs.
    #[serde(default)]
    pub placement: Placement,
}

#[cfg(test)]
mod tests {
    use super::super::ProjectConfig;
    use super::*;

    #[test]
    fn test_site_config_full() {
        let config = r#"
            [site]
            title = "Sales"
            description = "Monthly numbers"
            theme = "flatly"
            navigation = "both"
            output_dir = "public"
            placement = "after"
        "#;
        let config: ProjectConfig = toml::from_str(config).unwrap();

        assert_eq!(config.site.title, "Sales");
        assert_eq!(config.site.description.as_deref(), Some("Monthly numbers"));
        assert_eq!(config.site.theme, "flatly");
        assert_eq!(config.site.navigation, NavStyle::Both);
        assert_eq!(config.site.output_dir, "public");
        assert_eq!(config.site.placement, Placement::After);
    }

    #[test]
    fn test_site_config_defaults() {
        let config: ProjectConfig = toml::from_str("[site]\n").unwrap();

        assert_eq!(config.site.title, "Dashboard");
        assert!(config.site.description.is_none());
        assert_eq!(config.site.theme, "cosmo");
        assert_eq!(config.site.navigation, NavStyle::Navbar);
        assert_eq!(config.site.output_dir, "_site");
        assert_eq!(config.site.placement, Placement::Before);
    }

    #[test]
    fn test_site_config_unknown_field() {
        let config = r#"
            [site]
            title = "Sales"
            colour = "red"
        "#;
        assert!(toml::from_str::<ProjectConfig>(config).is_err());
    }

    #[test]
    fn test_invalid_navigation() {
        let config = r#"
            [site]
            navigation = "tabs"
        "#;
        assert!(toml::from_str::<ProjectConfig>(config).is_err());
    }
}
