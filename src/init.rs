//! Project initialization module.
//!
//! Scaffolds an example dashboard: a config with two pages, a data file and
//! ignore files for the generated output.

use crate::{build::CONFIG_FILE, config::ProjectConfig};
use anyhow::{Context, Result, bail};
use std::{fs, path::Path};

/// Files to write ignore patterns to
const IGNORE_FILES: &[&str] = &[".gitignore", ".ignore"];

/// Example data file, relative to the project root.
const SALES_FILE: &str = "data/sales.json";

const SALES_JSON: &str = r#"[
  {"month": "Jan", "region": "West", "revenue": 120, "units": 12},
  {"month": "Jan", "region": "East", "revenue": 95, "units": 10},
  {"month": "Feb", "region": "West", "revenue": 135, "units": 14},
  {"month": "Feb", "region": "East", "revenue": 101, "units": 9},
  {"month": "Mar", "region": "West", "revenue": 150, "units": 16},
  {"month": "Mar", "region": "East", "revenue": 117, "units": 11}
]
"#;

const EXAMPLE_CONFIG: &str = r#"[site]
title = "Sales Dashboard"
description = "Monthly revenue by region"
navigation = "navbar"

[build]
output = "build"

[render]
enable = false
command = ["quarto"]

[data.sales]
path = "data/sales.json"

[data.targets]
columns = ["region", "target"]
rows = [["West", 400], ["East", 300]]

[[pages]]
title = "Overview"

[[pages.items]]
type = "input"
id = "region"
widget = "select"
filter_var = "region"
label = "Region"
data = "sales"

[[pages.items]]
type = "metric"
label = "Revenue"
value = { data = "sales", column = "revenue", agg = "sum" }
unit = "k$"
filter_vars = ["region"]

[[pages.items]]
type = "chart"
kind = "bar"
data = "sales"
x = "month"
y = "revenue"
tabgroup = "Revenue/Monthly"
filter_vars = ["region"]

[[pages.items]]
type = "table"
data = "sales"
tabgroup = "Revenue/Details"
filter_vars = ["region"]

[[pages.items]]
type = "text"
content = "West is our largest region."
show_when = "region == 'West'"

[[pages]]
title = "Targets"
nav = "Planning"

[[pages.items]]
type = "table"
data = "targets"
"#;

/// Create a new example project at the config's root.
pub fn new_project(config: &ProjectConfig, has_name: bool) -> Result<()> {
    let root = config.get_root();

    // Without a name the project goes into the current directory, which must
    // then be empty
    if !has_name && !is_dir_empty(root)? {
        bail!(
            "Current directory is not empty. Use `vizdeck init <NAME>` to create in a subdirectory."
        );
    }

    fs::create_dir_all(root)
        .with_context(|| format!("Failed to create {}", root.display()))?;
    init_data(root)?;
    init_default_config(root)?;

    let output = config.build.output.strip_prefix(root).unwrap_or(&config.build.output);
    init_ignored_files(root, &[output, Path::new("_site/")])?;

    Ok(())
}

/// Check if a directory is completely empty
fn is_dir_empty(path: &Path) -> Result<bool> {
    if !path.exists() {
        return Ok(true);
    }
    Ok(fs::read_dir(path)?.next().is_none())
}

/// Write the example configuration file
fn init_default_config(root: &Path) -> Result<()> {
    // the example must always be a loadable project
    ProjectConfig::from_str(EXAMPLE_CONFIG)?;
    fs::write(root.join(CONFIG_FILE), EXAMPLE_CONFIG)?;
    Ok(())
}

/// Write the example data file
fn init_data(root: &Path) -> Result<()> {
    let path = root.join(SALES_FILE);
    if path.exists() {
        bail!(
            "Path `{}` already exists. Try `vizdeck init <NAME>` instead.",
            path.display()
        );
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    fs::write(&path, SALES_JSON)?;
    Ok(())
}

/// Initialize .gitignore and .ignore files with specified paths
pub fn init_ignored_files(root: &Path, paths: &[&Path]) -> Result<()> {
    let content = paths
        .iter()
        .filter_map(|p| p.to_str())
        .collect::<Vec<_>>()
        .join("\n");

    for filename in IGNORE_FILES {
        let path = root.join(filename);
        if !path.exists() {
            fs::write(&path, &content)?;
        }
    }

    Ok(())
}
