//! Project building orchestration.
//!
//! # Architecture
//!
//! ```text
//! build_project()
//!     │
//!     ├── clean output (optional)
//!     │
//!     ├── compile_project_with() ──► SiteFiles   (pure, progress per page)
//!     │
//!     ├── write_files() ──► <out>/*.qmd, _quarto.yml, _vizdeck/*
//!     │
//!     └── render_project() / open_site()          (optional)
//!
//! build_batch()
//!     │
//!     └── for each ProjectSource: load config ──► build_project()
//! ```

use crate::{
    compiler::{CompileOptions, SiteFiles, Warning, compile_project, compile_project_with},
    config::{OpenMode, ProjectConfig, defaults},
    error::CompileError,
    log,
    logger::ProgressBars,
    render::{open_site, render_project},
    spec::ProjectSpec,
};
use anyhow::{Context, Result};
use std::{
    fs,
    path::{Path, PathBuf},
    process::Child,
};
use walkdir::WalkDir;

/// Config file name searched for by [`discover_projects`].
pub const CONFIG_FILE: &str = "vizdeck.toml";

// ============================================================================
// Options & Reports
// ============================================================================

/// How a project is written and what happens afterwards.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Run the renderer after writing.
    pub render: bool,
    pub open: OpenMode,
    pub show_progress: bool,
    /// Unsupported blocks are errors.
    pub strict: bool,
    /// Remove the output directory first.
    pub clean: bool,
    /// Renderer program and leading arguments.
    pub command: Vec<String>,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            render: false,
            open: OpenMode::None,
            show_progress: true,
            strict: false,
            clean: false,
            command: defaults::render::command(),
        }
    }
}

impl BuildOptions {
    /// Options as set by `[build]`, `[render]` and CLI overrides.
    pub fn from_config(config: &ProjectConfig) -> Self {
        Self {
            render: config.render.enable,
            open: config.render.open,
            show_progress: config.build.progress,
            strict: config.build.strict,
            clean: config.build.clean,
            command: config.render.command.clone(),
        }
    }
}

/// Outcome of one successful build.
#[derive(Debug)]
pub struct BuildReport {
    pub out_dir: PathBuf,
    /// Page file names in navigation order.
    pub pages: Vec<String>,
    /// Files whose content changed.
    pub written: usize,
    /// Files already up to date.
    pub unchanged: usize,
    pub warnings: Vec<Warning>,
    pub bindings: usize,
    pub rendered: bool,
    /// Running `preview` process when opened with [`OpenMode::Viewer`].
    pub viewer: Option<Child>,
}

/// Outcome of [`build_batch`].
#[derive(Debug, Default)]
pub struct BatchReport {
    pub built: Vec<(PathBuf, BuildReport)>,
    pub failed: Vec<(PathBuf, anyhow::Error)>,
}

impl BatchReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    /// Projects attempted, including failures.
    pub fn total(&self) -> usize {
        self.built.len() + self.failed.len()
    }
}

// ============================================================================
// Single Project
// ============================================================================

/// Compile `project`, write it into `out_dir` and optionally render it.
///
/// A renderer failure is returned as an error but files already written stay
/// on disk.
pub fn build_project(
    project: &ProjectSpec,
    out_dir: &Path,
    options: &BuildOptions,
) -> Result<BuildReport> {
    if options.clean && out_dir.exists() {
        fs::remove_dir_all(out_dir).with_context(|| {
            format!("Failed to clear output directory: {}", out_dir.display())
        })?;
    }

    let compile_options = CompileOptions {
        strict: options.strict,
        ..CompileOptions::default()
    };

    log!("compile"; "{}", project.title_text());
    let progress = options
        .show_progress
        .then(|| ProgressBars::new_filtered(&[("pages", project.pages().len())]))
        .flatten();
    let result = compile_project_with(project, &compile_options, |_| {
        if let Some(progress) = &progress {
            progress.inc_by_name("pages");
        }
    });
    if let Some(progress) = &progress {
        progress.finish();
    }
    let site = result.with_context(|| format!("Failed to compile `{}`", project.title_text()))?;

    for warning in &site.warnings {
        log!("warn"; "{warning}");
    }

    let (written, unchanged) = write_files(out_dir, &site)?;
    log!(
        "build";
        "{} pages, {} files written, {} unchanged",
        site.pages.len(),
        written,
        unchanged
    );

    let mut report = BuildReport {
        out_dir: out_dir.to_path_buf(),
        pages: site.pages,
        written,
        unchanged,
        warnings: site.warnings,
        bindings: site.bindings,
        rendered: false,
        viewer: None,
    };

    if options.render || options.open != OpenMode::None {
        render_project(out_dir, &options.command).map_err(CompileError::from)?;
        report.rendered = true;
        report.viewer = open_site(
            options.open,
            out_dir,
            project.site_output_dir(),
            &options.command,
        )
        .map_err(CompileError::from)?;
    }

    Ok(report)
}

/// Compile without writing anything.
pub fn check_project(project: &ProjectSpec, strict: bool) -> Result<SiteFiles> {
    let options = CompileOptions {
        strict,
        ..CompileOptions::default()
    };
    let site = compile_project(project, &options)
        .with_context(|| format!("Failed to compile `{}`", project.title_text()))?;

    for warning in &site.warnings {
        log!("warn"; "{warning}");
    }
    Ok(site)
}

/// Write every file of `site` below `out_dir`, skipping identical content.
///
/// Returns `(written, unchanged)`.
fn write_files(out_dir: &Path, site: &SiteFiles) -> Result<(usize, usize), CompileError> {
    let mut written = 0;
    let mut unchanged = 0;

    for (rel, content) in &site.files {
        let path = out_dir.join(rel);
        if fs::read_to_string(&path).is_ok_and(|old| old == *content) {
            unchanged += 1;
            continue;
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|err| CompileError::Io(parent.to_path_buf(), err))?;
        }
        fs::write(&path, content).map_err(|err| CompileError::Io(path.clone(), err))?;
        written += 1;
    }

    Ok((written, unchanged))
}

// ============================================================================
// Batch
// ============================================================================

/// A project found on disk, identified by its config file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectSource {
    pub config_path: PathBuf,
}

impl ProjectSource {
    pub fn new(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
        }
    }

    /// Project directory (the config file's parent).
    pub fn root(&self) -> &Path {
        self.config_path.parent().unwrap_or(Path::new("./"))
    }

    /// Load, validate and convert the config. Returns the [`ProjectSpec`] and the
    /// resolved output directory.
    pub fn load(&self) -> Result<(ProjectSpec, PathBuf)> {
        let mut config = ProjectConfig::from_path(&self.config_path)?;
        config.update_path_with_root(self.root());
        config.validate()?;
        let spec = config
            .into_spec()
            .with_context(|| format!("Invalid project `{}`", self.config_path.display()))?;
        Ok((spec, config.build.output))
    }
}

/// Find every `vizdeck.toml` below `dirs`, in path order.
///
/// Hidden directories are not searched.
pub fn discover_projects(dirs: &[PathBuf]) -> Result<Vec<ProjectSource>> {
    let mut sources = Vec::new();
    for dir in dirs {
        let walker = WalkDir::new(dir)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                entry.depth() == 0 || !entry.file_name().to_string_lossy().starts_with('.')
            });
        for entry in walker {
            let entry = entry.with_context(|| format!("Failed to search `{}`", dir.display()))?;
            if entry.file_type().is_file() && entry.file_name() == CONFIG_FILE {
                sources.push(ProjectSource::new(entry.into_path()));
            }
        }
    }
    Ok(sources)
}

/// Build several projects with the same options.
///
/// Each project is isolated: with `continue_on_error` every failure is
/// collected and later projects still build; otherwise the first failure
/// stops the batch.
pub fn build_batch(
    sources: &[ProjectSource],
    options: &BuildOptions,
    continue_on_error: bool,
) -> BatchReport {
    let mut report = BatchReport::default();
    let total = sources.len();

    for (i, source) in sources.iter().enumerate() {
        log!("batch"; "[{}/{}] {}", i + 1, total, source.config_path.display());

        let result = source
            .load()
            .and_then(|(spec, out_dir)| build_project(&spec, &out_dir, options));
        match result {
            Ok(built) => report.built.push((source.config_path.clone(), built)),
            Err(err) => {
                log!("error"; "{}: {:#}", source.config_path.display(), err);
                report.failed.push((source.config_path.clone(), err));
                if !continue_on_error {
                    break;
                }
            }
        }
    }

    log!(
        "batch";
        "{} built, {} failed, {} skipped",
        report.built.len(),
        report.failed.len(),
        total - report.total()
    );
    report
}

// ============================================================================
// Tests
// ============================================================================
