//! Runtime assets shared by all pages.
//!
//! `runtime.js` is static: it reads each page's manifest and chart specs and
//! does all filtering in the browser. `runtime.html` is included after the
//! body of every page and loads the chart libraries the project uses.

use crate::{compiler::ASSET_DIR, spec::Backend};
use serde_json::Value;

pub const RUNTIME_JS: &str = include_str!("../../assets/runtime.js");

const fn library_urls(backend: Backend) -> &'static [&'static str] {
    match backend {
        Backend::Plotly => &["https://cdn.plot.ly/plotly-2.35.2.min.js"],
        Backend::Echarts => &["https://cdn.jsdelivr.net/npm/echarts@5.5.1/dist/echarts.min.js"],
        Backend::Vegalite => &[
            "https://cdn.jsdelivr.net/npm/vega@5",
            "https://cdn.jsdelivr.net/npm/vega-lite@5",
            "https://cdn.jsdelivr.net/npm/vega-embed@6",
        ],
    }
}

/// HTML include loading chart libraries and the runtime.
pub fn runtime_include(backends: &[Backend]) -> String {
    let mut html = String::new();
    for backend in backends {
        for url in library_urls(*backend) {
            html.push_str("<script src=\"");
            html.push_str(url);
            html.push_str("\"></script>\n");
        }
    }
    html.push_str("<script src=\"");
    html.push_str(ASSET_DIR);
    html.push_str("/runtime.js\"></script>\n");
    html
}

/// Records as written to `_vizdeck/data/*.json`.
pub fn data_json(records: &Value) -> String {
    let mut json = serde_json::to_string_pretty(records).unwrap_or_else(|_| "[]".to_owned());
    json.push('\n');
    json
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_include_only_used_backends() {
        let html = runtime_include(&[Backend::Plotly]);
        assert!(html.contains("plotly-2.35.2.min.js"));
        assert!(!html.contains("echarts"));
        assert!(html.ends_with("<script src=\"_vizdeck/runtime.js\"></script>\n"));

        let html = runtime_include(&[]);
        assert_eq!(html.lines().count(), 1);

        let html = runtime_include(&[Backend::Vegalite, Backend::Echarts]);
        assert_eq!(html.matches("<script").count(), 5);
    }

    #[test]
    fn test_runtime_reads_manifest() {
        assert!(RUNTIME_JS.contains("vizdeck-manifest"));
        assert!(RUNTIME_JS.contains("vizdeck-spec"));
    }

    #[test]
    fn test_data_json() {
        let out = data_json(&json!([{"a": 1}]));
        assert!(out.ends_with("]\n"));
        let parsed: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed, json!([{"a": 1}]));
    }
}
