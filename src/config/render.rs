//! `[render]` section configuration.
//!
//! The renderer turns the generated Quarto project into HTML.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};

/// What to open once rendering finished.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OpenMode {
    #[default]
    None,
    /// The rendered index page in the system browser.
    Browser,
    /// `quarto preview`, which serves and reloads the site.
    Viewer,
}

/// `[render]` section in vizdeck.toml - external renderer.
///
/// # Example
/// ```toml
/// [render]
/// enable = true
/// command = ["quarto"]
/// open = "browser"
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct RenderConfig {
    /// Run the renderer after writing the project.
    #[serde(default = "defaults::r#false")]
    #[educe(Default = false)]
    pub enable: bool,

    /// Renderer command and leading arguments.
    #[serde(default = "defaults::render::command")]
    #[educe(Default = defaults::render::command())]
    pub command: Vec<String>,

    #[serde(default)]
    pub open: OpenMode,
}

#[cfg(test)]
mod tests {
    use super::super::ProjectConfig;
    use super::*;

    #[test]
    fn test_render_config_defaults() {
        let config: ProjectConfig = toml::from_str("").unwrap();

        assert!(!config.render.enable);
        assert_eq!(config.render.command, vec!["quarto"]);
        assert_eq!(config.render.open, OpenMode::None);
    }

    #[test]
    fn test_render_config_custom() {
        let config = r#"
            [render]
            enable = true
            command = ["/opt/quarto/bin/quarto", "--quiet"]
            open = "viewer"
        "#;
        let config: ProjectConfig = toml::from_str(config).unwrap();

        assert!(config.render.enable);
        assert_eq!(config.render.command.len(), 2);
        assert_eq!(config.render.open, OpenMode::Viewer);
    }
}
