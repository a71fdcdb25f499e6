//! `_quarto.yml` generation.
//!
//! # Layout
//!
//! ```yaml
//! project:
//!   type: website
//!   output-dir: _site
//!   render: [index.qmd, details.qmd]
//!   resources: [_vizdeck/]
//! website:
//!   title: Sales
//!   navbar:
//!     left: [...]
//! format:
//!   html:
//!     theme: cosmo
//!     include-after-body: _vizdeck/runtime.html
//! vizdeck:
//!   generator: vizdeck 0.3.2
//!   pages: 2
//!   bindings: 1
//! ```

use crate::{
    compiler::{
        ASSET_DIR,
        nav::{self, NavEntry, NavPage, SidebarEntry},
    },
    error::CompileError,
    spec::ProjectSpec,
};
use serde::Serialize;
use std::path::PathBuf;

pub const QUARTO_CONFIG: &str = "_quarto.yml";

#[derive(Serialize)]
struct QuartoConfig<'a> {
    project: Project<'a>,
    website: Website<'a>,
    format: Format,
    vizdeck: Metadata,
}

#[derive(Serialize)]
#[serde(rename_all = "kebab-case")]
struct Project<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    output_dir: &'a str,
    render: &'a [String],
    resources: Vec<String>,
}

#[derive(Serialize)]
struct Website<'a> {
    title: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    navbar: Option<Navbar>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sidebar: Option<Sidebar>,
}

#[derive(Serialize)]
struct Navbar {
    left: Vec<NavEntry>,
}

#[derive(Serialize)]
struct Sidebar {
    style: &'static str,
    contents: Vec<SidebarEntry>,
}

#[derive(Serialize)]
struct Format {
    html: Html,
}

#[derive(Serialize)]
#[serde(rename_all = "kebab-case")]
struct Html {
    theme: String,
    include_after_body: String,
}

/// Generation metadata. Contains no timestamp so output stays stable.
#[derive(Serialize)]
struct Metadata {
    generator: String,
    pages: usize,
    bindings: usize,
}

/// Render `_quarto.yml` for a compiled project.
pub fn render_site_config(
    project: &ProjectSpec,
    pages: &[NavPage<'_>],
    files: &[String],
    bindings: usize,
) -> Result<String, CompileError> {
    let style = project.nav_style();

    let config = QuartoConfig {
        project: Project {
            kind: "website",
            output_dir: &project.output_dir,
            render: files,
            resources: vec![format!("{ASSET_DIR}/")],
        },
        website: Website {
            title: project.title_text(),
            description: project.description.as_deref(),
            navbar: style.has_navbar().then(|| Navbar {
                left: nav::navbar(pages),
            }),
            sidebar: style.has_sidebar().then(|| Sidebar {
                style: "docked",
                contents: nav::sidebar(pages),
            }),
        },
        format: Format {
            html: Html {
                theme: project.theme.clone(),
                include_after_body: format!("{ASSET_DIR}/runtime.html"),
            },
        },
        vizdeck: Metadata {
            generator: format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
            pages: files.len(),
            bindings,
        },
    };

    serde_yaml::to_string(&config)
        .map_err(|err| CompileError::Generate(PathBuf::from(QUARTO_CONFIG), err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::{NavStyle, TabPath};
    use serde_yaml::Value;

    fn render(project: &ProjectSpec) -> Value {
        let reports = TabPath::parse("Reports").unwrap();
        let pages = [
            NavPage {
                title: "Home",
                href: "index.qmd".into(),
                nav: None,
                sidebar: None,
            },
            NavPage {
                title: "West",
                href: "west.qmd".into(),
                nav: Some(&reports),
                sidebar: None,
            },
        ];
        let files = ["index.qmd".to_owned(), "west.qmd".to_owned()];
        let yaml = render_site_config(project, &pages, &files, 3).unwrap();
        serde_yaml::from_str(&yaml).unwrap()
    }

    #[test]
    fn test_project_section() {
        let config = render(&ProjectSpec::new("Sales").output_dir("public"));

        assert_eq!(config["project"]["type"], "website");
        assert_eq!(config["project"]["output-dir"], "public");
        assert_eq!(config["project"]["render"][1], "west.qmd");
        assert_eq!(config["project"]["resources"][0], "_vizdeck/");
        assert_eq!(config["format"]["html"]["theme"], "cosmo");
        assert_eq!(
            config["format"]["html"]["include-after-body"],
            "_vizdeck/runtime.html"
        );
        assert_eq!(config["vizdeck"]["pages"], 2);
        assert_eq!(config["vizdeck"]["bindings"], 3);
    }

    #[test]
    fn test_navbar_only_by_default() {
        let config = render(&ProjectSpec::new("Sales"));
        let left = &config["website"]["navbar"]["left"];

        assert_eq!(left[0]["text"], "Home");
        assert_eq!(left[0]["href"], "index.qmd");
        assert_eq!(left[1]["text"], "Reports");
        assert_eq!(left[1]["menu"][0]["href"], "west.qmd");
        assert!(config["website"].get("sidebar").is_none());
        assert!(config["website"].get("description").is_none());
    }

    #[test]
    fn test_sidebar_style() {
        let config = render(&ProjectSpec::new("Sales").navigation(NavStyle::Sidebar));
        assert!(config["website"].get("navbar").is_none());
        let contents = &config["website"]["sidebar"]["contents"];
        assert_eq!(contents[1]["section"], "Reports");
    }

    #[test]
    fn test_no_timestamp() {
        let first = render(&ProjectSpec::new("Sales"));
        let second = render(&ProjectSpec::new("Sales"));
        assert_eq!(first, second);
        assert!(
            config_str(&first).starts_with("vizdeck "),
            "generator field carries the crate name"
        );
    }

    fn config_str(config: &Value) -> &str {
        config["vizdeck"]["generator"].as_str().unwrap()
    }
}
