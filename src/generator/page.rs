//! Page documents.
//!
//! ```text
//! ---
//! title: Overview
//! ---
//!
//! <fragments>
//!
//! ```{=html}
//! <script type="application/json" id="vizdeck-manifest">{...}</script>
//! ```
//! ```

use crate::{
    compiler::{CompiledPage, emit::write_fragments, registry::script_json},
    error::CompileError,
};
use serde::Serialize;
use std::path::PathBuf;

/// Element id of the embedded filter manifest.
pub const MANIFEST_ID: &str = "vizdeck-manifest";

#[derive(Serialize)]
struct FrontMatter<'a> {
    title: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
}

/// Render a compiled page as a `.qmd` document.
pub fn render_page(page: &CompiledPage) -> Result<String, CompileError> {
    let front = FrontMatter {
        title: &page.title,
        description: page.description.as_deref(),
    };
    let yaml = serde_yaml::to_string(&front)
        .map_err(|err| CompileError::Generate(PathBuf::from(page.file_name()), err))?;

    let mut out = String::with_capacity(4096);
    out.push_str("---\n");
    out.push_str(&yaml);
    out.push_str("---\n");

    let body = write_fragments(&page.fragments);
    if !body.is_empty() {
        out.push('\n');
        out.push_str(&body);
    }

    if !page.manifest.is_empty() {
        // serializing the manifest cannot fail: keys are strings
        let manifest = serde_json::to_value(&page.manifest).unwrap_or_default();
        out.push_str("\n```{=html}\n");
        out.push_str(&format!(
            "<script type=\"application/json\" id=\"{MANIFEST_ID}\">{}</script>\n",
            script_json(&manifest)
        ));
        out.push_str("```\n");
    }

    Ok(out)
}
