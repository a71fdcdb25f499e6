//! Project compilation: spec in, file set out.
//!
//! This module is pure. It reads a [`ProjectSpec`] and returns every file of
//! the Quarto project as text; writing and rendering live in `build`.
//!
//! - **tree**: group items (and pages) by their paths
//! - **filters**: describe input → block bindings for the runtime
//! - **registry**: render one block body per type tag
//! - **emit**: nest rendered blocks into tabsets
//! - **nav**: navbar and sidebar from page paths
//!
//! # Flow
//!
//! ```text
//! PageSpec ──► assign_ids() ──► resolve_filters() ──► FilterManifest
//!                   │
//!                   └──────────► resolve_tabs() ──► Emitter ──► Fragment[]
//!
//! CompiledPage[] ──► generator ──► SiteFiles { .qmd, _quarto.yml, _vizdeck/* }
//! ```

pub mod emit;
pub mod filters;
pub mod nav;
pub mod registry;
pub mod tree;

use crate::{
    config::ConfigError,
    error::CompileError,
    generator,
    spec::{Backend, BlockSpec, ContentItem, DataProvider, DataRef, PageSpec, ProjectSpec},
    utils::slug::{is_valid_id, slugify},
};
use serde_json::Value;
use std::{
    collections::{BTreeMap, HashSet},
    fmt,
    path::{Path, PathBuf},
};

// ============================================================================
// Public API
// ============================================================================

pub use emit::{Emitter, Fragment, Tab};
pub use filters::{Effect, FilterBinding, FilterManifest, InputControl, ValueSource, resolve_filters};
pub use nav::{NavEntry, NavPage, SidebarEntry};
pub use registry::{ASSET_DIR, BlockContext, Body, RenderFn, RendererRegistry};
pub use tree::{GroupNode, GroupTree, TabTree, resolve_tabs};

/// File stem of the first page.
pub const INDEX_STEM: &str = "index";

/// An item together with its final id.
#[derive(Debug, Clone)]
pub struct ResolvedItem<'a> {
    pub id: String,
    pub item: &'a ContentItem,
}

/// A non-fatal problem found while compiling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    pub page: String,
    pub message: String,
}

impl Warning {
    pub fn new(page: &str, message: impl Into<String>) -> Self {
        Self {
            page: page.to_owned(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.page, self.message)
    }
}

#[derive(Debug, Clone, Default)]
pub struct CompileOptions {
    /// Fail on unsupported blocks instead of skipping them.
    pub strict: bool,
    pub registry: RendererRegistry,
}

/// One page after resolution and emission.
#[derive(Debug, Clone)]
pub struct CompiledPage {
    pub title: String,
    pub description: Option<String>,
    pub stem: String,
    pub fragments: Vec<Fragment>,
    pub manifest: FilterManifest,
    /// Data files this page needs, by file stem.
    pub data: BTreeMap<String, Value>,
    pub backends: Vec<Backend>,
}

impl CompiledPage {
    pub fn file_name(&self) -> String {
        format!("{}.qmd", self.stem)
    }
}

/// Every generated file, keyed by path relative to the project directory.
#[derive(Debug, Clone, Default)]
pub struct SiteFiles {
    pub files: BTreeMap<PathBuf, String>,
    /// Not logged here; `build` reports each one once.
    pub warnings: Vec<Warning>,
    /// Page file names in navigation order.
    pub pages: Vec<String>,
    pub bindings: usize,
}

impl SiteFiles {
    pub fn get(&self, path: impl AsRef<Path>) -> Option<&str> {
        self.files.get(path.as_ref()).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

// ============================================================================
// Compilation
// ============================================================================

/// Give every item an id: the explicit one, or `<kind>-<position>`.
pub fn assign_ids<'a>(
    page: &str,
    items: &'a [ContentItem],
) -> Result<Vec<ResolvedItem<'a>>, ConfigError> {
    let mut seen = HashSet::with_capacity(items.len());

    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let id = match item.explicit_id() {
                Some(id) if !is_valid_id(id) => {
                    return Err(ConfigError::Validation(format!(
                        "invalid block id `{id}` on page `{page}`"
                    )));
                }
                Some(id) => id.to_owned(),
                None => format!("{}-{}", slugify(item.kind()), i + 1),
            };
            if !seen.insert(id.clone()) {
                return Err(ConfigError::DuplicateId {
                    page: page.to_owned(),
                    id,
                });
            }
            Ok(ResolvedItem { id, item })
        })
        .collect()
}

/// File stems of all pages; the first page becomes the index.
pub fn page_stems(pages: &[PageSpec]) -> Result<Vec<String>, ConfigError> {
    let mut stems: Vec<String> = Vec::with_capacity(pages.len());
    for (i, page) in pages.iter().enumerate() {
        let stem = if i == 0 {
            INDEX_STEM.to_owned()
        } else {
            page.file_stem()
        };
        if stems.contains(&stem) {
            return Err(ConfigError::Validation(format!(
                "page `{}` would be written to `{stem}.qmd`, which is already used",
                page.title()
            )));
        }
        stems.push(stem);
    }
    Ok(stems)
}

/// Resolve, validate and emit one page.
pub fn compile_page(
    project: &ProjectSpec,
    page: &PageSpec,
    stem: &str,
    options: &CompileOptions,
) -> Result<(CompiledPage, Vec<Warning>), CompileError> {
    let sources: &dyn DataProvider = project.sources();
    let resolved = assign_ids(page.title(), page.items())?;
    let manifest = resolve_filters(page.title(), &resolved, sources)?;

    let tree = resolve_tabs(&resolved);
    let placement = page
        .placement_override()
        .unwrap_or_else(|| project.default_placement());
    let mut emitter = Emitter::new(page.title(), stem, &options.registry, sources, options.strict);
    let fragments = emitter.emit_page(&tree, placement)?;
    let mut warnings = emitter.warnings;

    let mut data = BTreeMap::new();
    let mut backends = Vec::new();
    for resolved in &resolved {
        if let BlockSpec::Chart(chart) = resolved.item.block()
            && !backends.contains(&chart.backend)
        {
            backends.push(chart.backend);
        }

        let Some(data_ref) = resolved.item.block().data() else {
            continue;
        };
        let file = registry::data_file_stem(stem, &resolved.id, data_ref);
        match (data_ref.resolve(sources), data_ref) {
            (Some(table), _) => {
                data.entry(file).or_insert_with(|| table.to_records());
            }
            (None, DataRef::Named(name)) => {
                let message = format!(
                    "block `{}` uses unregistered data `{name}`, expected at `{ASSET_DIR}/data/{file}.json`",
                    resolved.id
                );
                warnings.push(Warning::new(page.title(), message));
            }
            (None, DataRef::Inline(_)) => {}
        }
    }

    let compiled = CompiledPage {
        title: page.title().to_owned(),
        description: page.page_description().map(str::to_owned),
        stem: stem.to_owned(),
        fragments,
        manifest,
        data,
        backends,
    };
    Ok((compiled, warnings))
}

/// Compile a whole project into its file set.
pub fn compile_project(
    project: &ProjectSpec,
    options: &CompileOptions,
) -> Result<SiteFiles, CompileError> {
    compile_project_with(project, options, |_| {})
}

/// Like [`compile_project`], calling `on_page` after each page.
pub fn compile_project_with(
    project: &ProjectSpec,
    options: &CompileOptions,
    mut on_page: impl FnMut(&CompiledPage),
) -> Result<SiteFiles, CompileError> {
    if project.pages().is_empty() {
        return Err(ConfigError::Validation(format!(
            "project `{}` has no pages",
            project.title_text()
        ))
        .into());
    }

    let stems = page_stems(project.pages())?;
    let mut site = SiteFiles::default();
    let mut compiled = Vec::with_capacity(stems.len());

    for (page, stem) in project.pages().iter().zip(&stems) {
        let (page_out, warnings) = compile_page(project, page, stem, options)?;
        on_page(&page_out);
        site.warnings.extend(warnings);
        compiled.push(page_out);
    }

    let backends: Vec<Backend> = Backend::ALL
        .into_iter()
        .filter(|b| compiled.iter().any(|p| p.backends.contains(b)))
        .collect();

    for page in &compiled {
        site.files
            .insert(PathBuf::from(page.file_name()), generator::page::render_page(page)?);
        for (file, records) in &page.data {
            site.files.insert(
                Path::new(ASSET_DIR).join("data").join(format!("{file}.json")),
                generator::script::data_json(records),
            );
        }
        site.pages.push(page.file_name());
        site.bindings += page.manifest.bindings.len();
    }

    let nav_pages: Vec<NavPage<'_>> = project
        .pages()
        .iter()
        .zip(&compiled)
        .map(|(spec, page)| NavPage {
            title: spec.title(),
            href: page.file_name(),
            nav: spec.nav_path(),
            sidebar: spec.sidebar_path(),
        })
        .collect();

    site.files.insert(
        PathBuf::from(generator::site_config::QUARTO_CONFIG),
        generator::site_config::render_site_config(project, &nav_pages, &site.pages, site.bindings)?,
    );
    site.files.insert(
        Path::new(ASSET_DIR).join("runtime.js"),
        generator::script::RUNTIME_JS.to_owned(),
    );
    site.files.insert(
        Path::new(ASSET_DIR).join("runtime.html"),
        generator::script::runtime_include(&backends),
    );

    Ok(site)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::{
        ChartKind, ChartSpec, InputSpec, Placement, Table, TextSpec, Widget,
    };
    use serde_json::{Map, json};

    fn sales() -> Table {
        Table::new(["region", "month", "revenue"])
            .row([json!("West"), json!("Jan"), json!(10)])
            .row([json!("East"), json!("Feb"), json!(7)])
    }

    fn text(content: &str) -> ContentItem {
        ContentItem::text(TextSpec::new(content)).unwrap()
    }

    fn chart(tab: &str) -> ContentItem {
        ContentItem::chart(
            ChartSpec::new(ChartKind::Bar)
                .data("sales")
                .x("month")
                .y("revenue"),
        )
        .unwrap()
        .tabgroup(tab)
        .unwrap()
    }

    fn project() -> ProjectSpec {
        ProjectSpec::new("Sales")
            .data("sales", sales())
            .unwrap()
            .page(
                PageSpec::new("Overview")
                    .add(
                        ContentItem::input(
                            InputSpec::new(Widget::Select, "region", "Region").data("sales"),
                        )
                        .unwrap(),
                    )
                    .add(chart("Sales/Q1").filter_by("region"))
                    .add(chart("Sales/Q2"))
                    .add(text("notes")),
            )
            .page(PageSpec::new("Details").add(text("more")))
    }

    #[test]
    fn test_assign_ids() {
        let items = [text("a"), text("b").id("intro"), text("c")];
        let ids: Vec<_> = assign_ids("P", &items)
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, ["text-1", "intro", "text-3"]);
    }

    #[test]
    fn test_assign_ids_duplicate() {
        let items = [text("a").id("x"), text("b").id("x")];
        let err = assign_ids("P", &items).unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateId { ref id, .. } if id == "x"));

        // an explicit id may collide with a generated one
        let items = [text("a"), text("b").id("text-1")];
        assert!(assign_ids("P", &items).is_err());
    }

    #[test]
    fn test_assign_ids_invalid() {
        let items = [text("a").id("has space")];
        assert!(matches!(
            assign_ids("P", &items).unwrap_err(),
            ConfigError::Validation(_)
        ));
    }

    #[test]
    fn test_page_stems() {
        let pages = [PageSpec::new("Home"), PageSpec::new("Sales Report")];
        assert_eq!(page_stems(&pages).unwrap(), ["index", "sales-report"]);

        let clash = [PageSpec::new("Home"), PageSpec::new("A"), PageSpec::new("a")];
        assert!(page_stems(&clash).is_err());
    }

    #[test]
    fn test_compile_project_files() {
        let site = compile_project(&project(), &CompileOptions::default()).unwrap();

        let names: Vec<_> = site.files.keys().map(|p| p.to_string_lossy().into_owned()).collect();
        assert_eq!(
            names,
            [
                "_quarto.yml",
                "_vizdeck/data/sales.json",
                "_vizdeck/runtime.html",
                "_vizdeck/runtime.js",
                "details.qmd",
                "index.qmd",
            ]
        );
        assert_eq!(site.pages, ["index.qmd", "details.qmd"]);
        assert_eq!(site.bindings, 1);
        assert!(site.warnings.is_empty());

        let index = site.get("index.qmd").unwrap();
        assert!(index.contains("title: Overview"));
        assert!(index.contains("## Sales"));
        assert!(index.contains("### Q1"));
        assert!(index.contains("vizdeck-manifest"));
    }

    #[test]
    fn test_compile_is_idempotent() {
        let options = CompileOptions::default();
        let first = compile_project(&project(), &options).unwrap();
        let second = compile_project(&project(), &options).unwrap();
        assert_eq!(first.files, second.files);
    }

    #[test]
    fn test_both_placements() {
        let build = |placement| {
            let project = ProjectSpec::new("P")
                .placement(placement)
                .page(PageSpec::new("Home").add(chart("Tab")).add(text("loose")));
            compile_project(&project, &CompileOptions::default()).unwrap()
        };

        let before = build(Placement::Before);
        let index = before.get("index.qmd").unwrap();
        assert!(index.find("loose").unwrap() < index.find("## Tab").unwrap());

        let after = build(Placement::After);
        let index = after.get("index.qmd").unwrap();
        assert!(index.find("## Tab").unwrap() < index.find("loose").unwrap());
    }

    #[test]
    fn test_page_placement_overrides_project() {
        let project = ProjectSpec::new("P").placement(Placement::After).page(
            PageSpec::new("Home")
                .placement(Placement::Before)
                .add(chart("Tab"))
                .add(text("loose")),
        );
        let site = compile_project(&project, &CompileOptions::default()).unwrap();
        let index = site.get("index.qmd").unwrap();
        assert!(index.find("loose").unwrap() < index.find("## Tab").unwrap());
    }

    fn with_unknown_block() -> ProjectSpec {
        let options: Map<_, _> = json!({"z": "v"}).as_object().cloned().unwrap();
        let heatmap = ContentItem::new(BlockSpec::from_tagged("heatmap", options).unwrap()).unwrap();
        ProjectSpec::new("P").page(PageSpec::new("Home").add(text("hi")).add(heatmap))
    }

    #[test]
    fn test_unknown_block_non_strict() {
        let site = compile_project(&with_unknown_block(), &CompileOptions::default()).unwrap();
        assert_eq!(site.warnings.len(), 1);
        assert!(site.get("index.qmd").unwrap().contains("hi"));
    }

    #[test]
    fn test_unknown_block_strict() {
        let options = CompileOptions {
            strict: true,
            ..CompileOptions::default()
        };
        let err = compile_project(&with_unknown_block(), &options).unwrap_err();
        assert!(matches!(err, CompileError::UnsupportedBlock(_)));
    }

    #[test]
    fn test_missing_named_data_warns() {
        let project = ProjectSpec::new("P").page(
            PageSpec::new("Home").add(ContentItem::table(crate::spec::TableSpec::new("later")).unwrap()),
        );
        let site = compile_project(&project, &CompileOptions::default()).unwrap();
        assert_eq!(site.warnings.len(), 1);
        assert!(site.warnings[0].message.contains("`later`"));
        assert!(site.get("_vizdeck/data/later.json").is_none());
    }

    #[test]
    fn test_inline_data_file() {
        let inline = Table::new(["x", "y"]).row([json!(1), json!(2)]);
        let project = ProjectSpec::new("P").page(
            PageSpec::new("Home").add(
                ContentItem::chart(ChartSpec::new(ChartKind::Line).data(inline).x("x").y("y"))
                    .unwrap(),
            ),
        );
        let site = compile_project(&project, &CompileOptions::default()).unwrap();
        let data = site.get("_vizdeck/data/inline/index--chart-1.json").unwrap();
        let value: Value = serde_json::from_str(data).unwrap();
        assert_eq!(value, json!([{"x": 1, "y": 2}]));
    }

    #[test]
    fn test_named_source_does_not_shadow_inline_data() {
        let inline = Table::new(["x", "y"]).row([json!(1), json!(2)]);
        let project = ProjectSpec::new("P")
            .data("index--chart-1", Table::new(["k"]).row([json!("named")]))
            .unwrap()
            .page(
                PageSpec::new("Home")
                    .add(
                        ContentItem::chart(ChartSpec::new(ChartKind::Line).data(inline).x("x").y("y"))
                            .unwrap(),
                    )
                    .add(ContentItem::table(crate::spec::TableSpec::new("index--chart-1")).unwrap()),
            );
        let site = compile_project(&project, &CompileOptions::default()).unwrap();

        let named: Value =
            serde_json::from_str(site.get("_vizdeck/data/index--chart-1.json").unwrap()).unwrap();
        assert_eq!(named, json!([{"k": "named"}]));
        let inline: Value =
            serde_json::from_str(site.get("_vizdeck/data/inline/index--chart-1.json").unwrap())
                .unwrap();
        assert_eq!(inline, json!([{"x": 1, "y": 2}]));

        let index = site.get("index.qmd").unwrap();
        assert!(index.contains("<td>named</td>"));
    }

    #[test]
    fn test_unbound_filter_fails_project() {
        let project = ProjectSpec::new("P").page(PageSpec::new("Home").add(text("x").filter_by("region")));
        let err = compile_project(&project, &CompileOptions::default()).unwrap_err();
        assert!(matches!(err, CompileError::UnboundFilter(_)));
    }

    #[test]
    fn test_empty_project() {
        let err = compile_project(&ProjectSpec::new("P"), &CompileOptions::default()).unwrap_err();
        assert!(matches!(err, CompileError::Config(ConfigError::Validation(_))));
    }

    #[test]
    fn test_on_page_callback() {
        let mut seen = Vec::new();
        compile_project_with(&project(), &CompileOptions::default(), |page| {
            seen.push(page.stem.clone());
        })
        .unwrap();
        assert_eq!(seen, ["index", "details"]);
    }
}
