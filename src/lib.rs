//! vizdeck - declarative dashboards compiled into Quarto websites.
//!
//! Pages of charts, tables, text, inputs and metrics are described in Rust or
//! in `vizdeck.toml`, compiled into `.qmd` pages plus a small browser runtime
//! that applies filters, and optionally rendered with `quarto`.
//!
//! ```ignore
//! use vizdeck::{build::{BuildOptions, build_project}, spec::*};
//!
//! let project = ProjectSpec::new("Sales")
//!     .data("sales", table)?
//!     .page(PageSpec::new("Overview").add(ContentItem::chart(
//!         ChartSpec::new(ChartKind::Bar).data("sales").x("month").y("revenue"),
//!     )?));
//! build_project(&project, Path::new("build"), &BuildOptions::default())?;
//! ```

pub mod build;
pub mod cli;
pub mod compiler;
pub mod config;
pub mod error;
pub mod generator;
pub mod init;
pub mod logger;
pub mod render;
pub mod spec;
pub mod utils;

pub use build::{BatchReport, BuildOptions, BuildReport, ProjectSource, build_batch, build_project};
pub use compiler::{CompileOptions, SiteFiles, compile_project};
pub use error::CompileError;
