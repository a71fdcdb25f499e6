//! Project configuration management for `vizdeck.toml`.
//!
//! # Sections
//!
//! | Section         | Purpose                                        |
//! |-----------------|------------------------------------------------|
//! | `[site]`        | Title, theme, navigation layout, placement     |
//! | `[build]`       | Output directory, strict mode, cleaning        |
//! | `[render]`      | External renderer and what to open afterwards  |
//! | `[data.<name>]` | Named tables (JSON file or inline rows)        |
//! | `[[pages]]`     | Pages and their `[[pages.items]]`              |
//!
//! # Example
//!
//! ```toml
//! [site]
//! title = "Sales"
//!
//! [data.sales]
//! path = "data/sales.json"
//!
//! [[pages]]
//! title = "Overview"
//!
//! [[pages.items]]
//! type = "chart"
//! kind = "bar"
//! data = "sales"
//! x = "month"
//! y = "revenue"
//! ```

mod build;
pub mod defaults;
mod error;
mod pages;
mod render;
mod site;

pub use build::BuildConfig;
pub use error::ConfigError;
pub use pages::{DataConfig, ItemConfig, PageConfig};
pub use render::{OpenMode, RenderConfig};
pub use site::SiteConfig;

use crate::{
    cli::{BuildArgs, Cli, Commands},
    spec::{DataSources, ProjectSpec},
};
use anyhow::{Context, Result, bail};
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

// ============================================================================
// Root Configuration
// ============================================================================

/// Root configuration structure representing vizdeck.toml
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    /// Absolute path to the config file (set after loading)
    #[serde(skip)]
    pub config_path: PathBuf,

    #[serde(default)]
    pub site: SiteConfig,

    #[serde(default)]
    pub build: BuildConfig,

    #[serde(default)]
    pub render: RenderConfig,

    /// Named tables
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub data: BTreeMap<String, DataConfig>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pages: Vec<PageConfig>,
}

impl ProjectConfig {
    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: ProjectConfig = toml::from_str(content).map_err(ConfigError::Toml)?;
        Ok(config)
    }

    /// Load configuration from file path
    pub fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;
        let mut config = Self::from_str(&content)
            .with_context(|| format!("Failed to parse `{}`", path.display()))?;
        config.config_path = path.to_path_buf();
        Ok(config)
    }

    /// Get the root directory path
    pub fn get_root(&self) -> &Path {
        self.build.root.as_deref().unwrap_or(Path::new("./"))
    }

    /// Set the root directory path
    pub fn set_root(&mut self, path: &Path) {
        self.build.root = Some(path.to_path_buf())
    }

    /// Update configuration with CLI arguments
    pub fn update_with_cli(&mut self, cli: &Cli) {
        // Determine the final root path based on command
        let base = cli
            .root
            .as_ref()
            .cloned()
            .unwrap_or_else(|| self.get_root().to_owned());
        let root = match &cli.command {
            Commands::Init { name: Some(name) } => base.join(name),
            _ => base,
        };
        let root = Self::normalize_path(&root);

        self.config_path = Self::normalize_path(&root.join(&cli.config));
        if let Some(args) = cli.build_args() {
            self.apply_build_args(args);
        }
        if let Commands::Check { strict: true } = cli.command {
            self.build.strict = true;
        }
        self.update_path_with_root(&root);
    }

    /// Apply `build`/`batch` flags.
    pub fn apply_build_args(&mut self, args: &BuildArgs) {
        Self::update_option(&mut self.build.output, args.output.as_ref());
        Self::update_option(&mut self.build.strict, args.strict.as_ref());
        Self::update_option(&mut self.render.enable, args.render.as_ref());
        Self::update_option(&mut self.render.open, args.open.as_ref());
        if args.clean {
            self.build.clean = true;
        }
        if args.no_progress {
            self.build.progress = false;
        }
        // opening something implies rendering it
        if self.render.open != OpenMode::None {
            self.render.enable = true;
        }
    }

    /// Update config option if CLI value is provided
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    /// Make all paths absolute: the output against `root`, data files
    /// against the config file's directory.
    pub fn update_path_with_root(&mut self, root: &Path) {
        let root = Self::normalize_path(root);
        self.set_root(&root);

        self.build.output = Self::normalize_path(&root.join(&self.build.output));
        let config_dir = self.config_dir().unwrap_or_else(|| root.clone());
        for data in self.data.values_mut() {
            data.resolve_path(&config_dir);
        }
    }

    /// Directory holding the config file, once one is known.
    fn config_dir(&self) -> Option<PathBuf> {
        if self.config_path.as_os_str().is_empty() {
            return None;
        }
        // a bare file name has an empty parent: the working directory
        let dir = self.config_path.parent().unwrap_or(Path::new(""));
        Some(Self::normalize_path(dir))
    }

    /// Normalize a path to absolute, using canonicalize if the path exists
    fn normalize_path(path: &Path) -> PathBuf {
        path.canonicalize().unwrap_or_else(|_| {
            // For non-existent paths, manually make them absolute
            if path.is_absolute() {
                path.to_path_buf()
            } else {
                std::env::current_dir()
                    .map(|cwd| cwd.join(path))
                    .unwrap_or_else(|_| path.to_path_buf())
            }
        })
    }

    /// Validate configuration before compiling
    pub fn validate(&self) -> Result<()> {
        if self.site.title.trim().is_empty() {
            bail!(ConfigError::Validation("[site.title] must not be empty".into()));
        }

        if self.site.theme.trim().is_empty() {
            bail!(ConfigError::Validation("[site.theme] must not be empty".into()));
        }

        if self.site.output_dir.trim().is_empty() {
            bail!(ConfigError::Validation(
                "[site.output_dir] must not be empty".into()
            ));
        }

        if self.pages.is_empty() {
            bail!(ConfigError::Validation(
                "at least one [[pages]] entry is required".into()
            ));
        }

        for (name, data) in &self.data {
            if let Some(path) = &data.path
                && !path.is_file()
            {
                bail!(ConfigError::Validation(format!(
                    "[data.{name}.path] `{}` not found",
                    path.display()
                )));
            }
        }

        if self.render.enable {
            Self::check_command_installed("[render.command]", &self.render.command)?;
        }

        Ok(())
    }

    /// Check if a command is installed and available
    fn check_command_installed(field: &str, command: &[String]) -> Result<()> {
        if command.is_empty() {
            bail!(ConfigError::Validation(format!(
                "{field} must have at least one element"
            )));
        }

        let cmd = &command[0];
        which::which(cmd)
            .with_context(|| format!("`{cmd}` not found. Please install it first."))?;

        Ok(())
    }

    /// Build the project spec, loading all data sources.
    pub fn into_spec(&self) -> Result<ProjectSpec, ConfigError> {
        let mut sources = DataSources::new();
        for (name, data) in &self.data {
            data.load(name, &mut sources)?;
        }

        let mut spec = ProjectSpec::new(&self.site.title)
            .theme(&self.site.theme)
            .output_dir(&self.site.output_dir)
            .placement(self.site.placement)
            .navigation(self.site.navigation)
            .with_data(sources);
        if let Some(description) = &self.site.description {
            spec = spec.description(description);
        }

        for page in &self.pages {
            spec = spec.page(page.into_page()?);
        }
        Ok(spec)
    }
}

// ============================================================================
// Tests
// ============================================================================
