//! `[build]` section configuration.
//!
//! Controls where the Quarto project is written and how strictly it is compiled.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// `[build]` section in vizdeck.toml - compile and write settings.
///
/// # Example
/// ```toml
/// [build]
/// output = "build"    # Generated Quarto project
/// strict = true       # Unknown block types are errors
/// clean = true        # Remove the output directory first
/// progress = false
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct BuildConfig {
    /// Project root directory (set from the CLI, never read from the file).
    #[serde(skip)]
    #[educe(Default = defaults::build::root())]
    pub root: Option<PathBuf>,

    /// Directory receiving the generated Quarto project.
    #[serde(default = "defaults::build::output")]
    #[educe(Default = defaults::build::output())]
    pub output: PathBuf,

    /// Fail on unsupported block types instead of skipping them.
    #[serde(default = "defaults::r#false")]
    #[educe(Default = false)]
    pub strict: bool,

    /// Remove the output directory before writing.
    #[serde(default = "defaults::r#false")]
    #[educe(Default = false)]
    pub clean: bool,

    /// Show a progress bar while compiling pages.
    #[serde(default = "defaults::r#true")]
    #[educe(Default = true)]
    pub progress: bool,
}

#[cfg(test)]
mod tests {
    use super::super::ProjectConfig;
    use std::path::PathBuf;

    #[test]
    fn test_build_config_defaults() {
        let config: ProjectConfig = toml::from_str("").unwrap();

        assert_eq!(config.build.output, PathBuf::from("build"));
        assert!(!config.build.strict);
        assert!(!config.build.clean);
        assert!(config.build.progress);
        assert!(config.build.root.is_none());
    }

    #[test]
    fn test_build_config_custom() {
        let config = r#"
            [build]
            output = "out/dash"
            strict = true
            clean = true
            progress = false
        "#;
        let config: ProjectConfig = toml::from_str(config).unwrap();

        assert_eq!(config.build.output, PathBuf::from("out/dash"));
        assert!(config.build.strict);
        assert!(config.build.clean);
        assert!(!config.build.progress);
    }

    #[test]
    fn test_root_is_not_configurable() {
        let config = r#"
            [build]
            root = "/tmp"
        "#;
        assert!(toml::from_str::<ProjectConfig>(config).is_err());
    }
}
