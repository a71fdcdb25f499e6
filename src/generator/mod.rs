//! Text generation for the Quarto project files.
//!
//! - **page**: one `.qmd` per page
//! - **site_config**: `_quarto.yml`
//! - **script**: shared runtime script, its include and data files

pub mod page;
pub mod script;
pub mod site_config;
