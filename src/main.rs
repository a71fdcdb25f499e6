//! vizdeck - compile dashboard configs into Quarto websites.

use anyhow::{Result, bail};
use clap::Parser;
use std::path::{Path, PathBuf};
use vizdeck::{
    build::{CONFIG_FILE, BuildOptions, build_batch, build_project, check_project, discover_projects},
    cli::{BuildArgs, Cli, Commands},
    config::ProjectConfig,
    init::new_project,
    log, logger,
};

fn main() -> Result<()> {
    let cli = Cli::parse();
    logger::set_quiet(cli.quiet);

    match &cli.command {
        Commands::Init { name } => new_project(&load_config(&cli)?, name.is_some()),
        Commands::Build { .. } => build(&load_config(&cli)?),
        Commands::Check { .. } => check(&load_config(&cli)?),
        Commands::Batch {
            dirs,
            continue_on_error,
            build_args,
        } => batch(&cli, dirs, *continue_on_error, build_args),
    }
}

/// Load and validate configuration from CLI arguments
fn load_config(cli: &Cli) -> Result<ProjectConfig> {
    let root = cli.root.as_deref().unwrap_or(Path::new("./"));
    let config_path = root.join(&cli.config);

    let mut config = if config_path.exists() {
        ProjectConfig::from_path(&config_path)?
    } else {
        ProjectConfig::default()
    };
    config.update_with_cli(cli);

    // Validate config state based on command
    let config_exists = config.config_path.exists();
    match (cli.is_init(), config_exists) {
        (true, true) => {
            bail!("Config file already exists. Remove it manually or init in a different path.")
        }
        (false, false) => bail!("Config file not found."),
        _ => {}
    }

    if !cli.is_init() {
        config.validate()?;
    }

    Ok(config)
}

fn build(config: &ProjectConfig) -> Result<()> {
    let project = config.into_spec()?;
    let report = build_project(&project, &config.build.output, &BuildOptions::from_config(config))?;

    if let Some(mut viewer) = report.viewer {
        log!("open"; "preview running, press Ctrl-C to stop");
        viewer.wait()?;
    }
    Ok(())
}

fn check(config: &ProjectConfig) -> Result<()> {
    let project = config.into_spec()?;
    let site = check_project(&project, config.build.strict)?;
    log!(
        "check";
        "{} pages, {} files, {} bindings, {} warnings",
        site.pages.len(),
        site.len(),
        site.bindings,
        site.warnings.len()
    );
    Ok(())
}

fn batch(cli: &Cli, dirs: &[PathBuf], continue_on_error: bool, args: &BuildArgs) -> Result<()> {
    // batch-wide options come from the flags alone; each project keeps its
    // own pages, data and output directory
    if args.output.is_some() {
        bail!("`--output` is not supported by `batch`, set `[build].output` per project instead.");
    }
    let mut defaults = ProjectConfig::default();
    defaults.apply_build_args(args);
    let options = BuildOptions::from_config(&defaults);

    let dirs: Vec<PathBuf> = match &cli.root {
        Some(root) => dirs.iter().map(|dir| root.join(dir)).collect(),
        None => dirs.to_vec(),
    };
    let sources = discover_projects(&dirs)?;
    if sources.is_empty() {
        bail!("No `{CONFIG_FILE}` found.");
    }

    let report = build_batch(&sources, &options, continue_on_error);
    if !report.is_success() {
        bail!("{} of {} projects failed", report.failed.len(), report.total());
    }
    Ok(())
}
