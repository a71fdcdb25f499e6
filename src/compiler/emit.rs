//! Fragment emitter.
//!
//! Walks a page's tab tree and turns it into nested [`Fragment`]s, which are
//! then written out as Quarto markdown:
//!
//! ```text
//! ::: {.panel-tabset}          <- Tabset (one per tree level)
//!
//! ## Sales                     <- Tab, heading level = 2 + depth
//!
//! ::: {#chart-1 .vizdeck-block .vizdeck-chart}
//! ```{=html}                   <- Block body from the renderer registry
//! ...
//! ```
//! :::
//!
//! :::
//! ```

use super::{
    ResolvedItem, Warning,
    registry::{BlockContext, Body, RendererRegistry},
    tree::{GroupNode, TabTree},
};
use crate::{
    error::{CompileError, UnsupportedBlockError},
    spec::{DataProvider, Placement},
};
use quick_xml::escape::partial_escape;

/// Deepest heading level used for tab labels.
const MAX_HEADING: usize = 6;

/// Characters Pandoc reads as inline markup or heading attributes.
const MARKDOWN_SPECIALS: &[char] = &[
    '\\', '`', '*', '_', '{', '}', '[', ']', '#', '~', '^', '$', '|', '!', '@',
];

/// A tab label as literal heading text: no raw HTML, no markup, no
/// `{...}` attribute block.
pub fn heading_text(label: &str) -> String {
    let html = partial_escape(label);
    let mut out = String::with_capacity(html.len());
    for c in html.chars() {
        if MARKDOWN_SPECIALS.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Emitted page structure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    Block {
        id: String,
        kind: String,
        body: Body,
        /// Hidden until its `show_when` predicate holds.
        conditional: bool,
    },
    Tabset {
        level: usize,
        tabs: Vec<Tab>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tab {
    pub label: String,
    pub fragments: Vec<Fragment>,
}

impl Fragment {
    /// Append this fragment as Quarto markdown.
    pub fn write(&self, out: &mut String) {
        match self {
            Self::Block {
                id,
                kind,
                body,
                conditional,
            } => {
                out.push_str("::: {#");
                out.push_str(id);
                out.push_str(" .vizdeck-block .vizdeck-");
                out.push_str(&crate::utils::slug::slugify(kind));
                if *conditional {
                    out.push_str(" .vizdeck-conditional");
                }
                out.push_str("}\n");
                match body {
                    Body::Html(html) => {
                        out.push_str("```{=html}\n");
                        out.push_str(html);
                        out.push_str("\n```\n");
                    }
                    Body::Markdown(md) => {
                        out.push_str(md);
                        out.push('\n');
                    }
                }
                out.push_str(":::\n");
            }
            Self::Tabset { level, tabs } => {
                out.push_str("::: {.panel-tabset}\n");
                for tab in tabs {
                    out.push('\n');
                    out.push_str(&"#".repeat(*level));
                    out.push(' ');
                    out.push_str(&heading_text(&tab.label));
                    out.push('\n');
                    for fragment in &tab.fragments {
                        out.push('\n');
                        fragment.write(out);
                    }
                }
                out.push('\n');
                out.push_str(":::\n");
            }
        }
    }
}

/// Render a list of fragments separated by blank lines.
pub fn write_fragments(fragments: &[Fragment]) -> String {
    let mut out = String::new();
    for (i, fragment) in fragments.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        fragment.write(&mut out);
    }
    out
}

/// Per-page emission state.
pub struct Emitter<'a> {
    pub page: &'a str,
    pub page_stem: &'a str,
    pub registry: &'a RendererRegistry,
    pub data: &'a dyn DataProvider,
    pub strict: bool,
    /// Skipped blocks. Collected only; the caller logs them.
    pub warnings: Vec<Warning>,
}

impl<'a> Emitter<'a> {
    pub fn new(
        page: &'a str,
        page_stem: &'a str,
        registry: &'a RendererRegistry,
        data: &'a dyn DataProvider,
        strict: bool,
    ) -> Self {
        Self {
            page,
            page_stem,
            registry,
            data,
            strict,
            warnings: Vec::new(),
        }
    }

    /// Emit a whole page: ungrouped items and the top-level tabset, ordered
    /// by `placement`.
    pub fn emit_page(
        &mut self,
        tree: &TabTree<'_>,
        placement: Placement,
    ) -> Result<Vec<Fragment>, CompileError> {
        let ungrouped = self.emit_items(tree.ungrouped())?;
        let grouped = self.emit_tabset(tree.groups(), 0)?;

        let mut fragments = Vec::with_capacity(ungrouped.len() + 1);
        match placement {
            Placement::Before => {
                fragments.extend(ungrouped);
                fragments.extend(grouped);
            }
            Placement::After => {
                fragments.extend(grouped);
                fragments.extend(ungrouped);
            }
        }
        Ok(fragments)
    }

    fn emit_tabset(
        &mut self,
        nodes: &[GroupNode<&ResolvedItem<'_>>],
        depth: usize,
    ) -> Result<Option<Fragment>, CompileError> {
        if nodes.is_empty() {
            return Ok(None);
        }

        let tabs = nodes
            .iter()
            .map(|node| {
                // child tabs first, then the node's own items
                let mut fragments: Vec<Fragment> = self
                    .emit_tabset(node.children(), depth + 1)?
                    .into_iter()
                    .collect();
                fragments.extend(self.emit_items(node.items())?);
                Ok(Tab {
                    label: node.label().to_owned(),
                    fragments,
                })
            })
            .collect::<Result<Vec<_>, CompileError>>()?;

        Ok(Some(Fragment::Tabset {
            level: (2 + depth).min(MAX_HEADING),
            tabs,
        }))
    }

    fn emit_items(&mut self, items: &[&ResolvedItem<'_>]) -> Result<Vec<Fragment>, CompileError> {
        let mut fragments = Vec::with_capacity(items.len());
        for resolved in items {
            if let Some(fragment) = self.emit_item(resolved)? {
                fragments.push(fragment);
            }
        }
        Ok(fragments)
    }

    /// Render one item; `None` when it was skipped.
    fn emit_item(&mut self, resolved: &ResolvedItem<'_>) -> Result<Option<Fragment>, CompileError> {
        let kind = resolved.item.kind();
        let Some(render) = self.registry.get(kind) else {
            let err = UnsupportedBlockError {
                page: self.page.to_owned(),
                id: resolved.id.clone(),
                kind: kind.to_owned(),
            };
            if self.strict {
                return Err(err.into());
            }
            self.warnings.push(Warning::new(self.page, format!("skipped: {err}")));
            return Ok(None);
        };

        let ctx = BlockContext {
            id: &resolved.id,
            item: resolved.item,
            page_stem: self.page_stem,
            data: self.data,
        };
        let body = render(&ctx)?;

        Ok(Some(Fragment::Block {
            id: resolved.id.clone(),
            kind: kind.to_owned(),
            body,
            conditional: resolved.item.visibility().is_some(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        compiler::tree::resolve_tabs,
        spec::{BlockSpec, ContentItem, DataSources, ShowWhen, TextSpec},
    };
    use serde_json::{Map, json};

    fn text(content: &str, tab: Option<&str>) -> ContentItem {
        let item = ContentItem::text(TextSpec::new(content)).unwrap();
        match tab {
            Some(tab) => item.tabgroup(tab).unwrap(),
            None => item,
        }
    }

    fn resolved(items: &[ContentItem]) -> Vec<ResolvedItem<'_>> {
        items
            .iter()
            .enumerate()
            .map(|(i, item)| ResolvedItem {
                id: format!("{}-{}", item.kind(), i + 1),
                item,
            })
            .collect()
    }

    fn emit(items: &[ContentItem], placement: Placement, strict: bool) -> (String, Vec<Warning>) {
        let data = DataSources::new();
        let registry = RendererRegistry::with_builtins();
        let resolved = resolved(items);
        let tree = resolve_tabs(&resolved);
        let mut emitter = Emitter::new("Overview", "overview", &registry, &data, strict);
        let fragments = emitter.emit_page(&tree, placement).unwrap();
        (write_fragments(&fragments), emitter.warnings)
    }

    fn position(haystack: &str, needle: &str) -> usize {
        haystack
            .find(needle)
            .unwrap_or_else(|| panic!("`{needle}` not found in:\n{haystack}"))
    }

    #[test]
    fn test_block_wrapper() {
        let (out, _) = emit(&[text("hello", None)], Placement::Before, false);
        assert_eq!(out, "::: {#text-1 .vizdeck-block .vizdeck-text}\nhello\n:::\n");
    }

    #[test]
    fn test_html_body_is_raw_block() {
        let fragment = Fragment::Block {
            id: "m".into(),
            kind: "metric".into(),
            body: Body::Html("<div>1</div>".into()),
            conditional: true,
        };
        let mut out = String::new();
        fragment.write(&mut out);
        assert_eq!(
            out,
            "::: {#m .vizdeck-block .vizdeck-metric .vizdeck-conditional}\n```{=html}\n<div>1</div>\n```\n:::\n"
        );
    }

    #[test]
    fn test_nested_tabsets_and_levels() {
        let items = [
            text("q1", Some("Sales/Q1")),
            text("q2", Some("Sales/Q2")),
            text("notes", None),
        ];
        let (out, _) = emit(&items, Placement::Before, false);

        assert!(out.contains("\n## Sales\n"));
        assert!(out.contains("\n### Q1\n"));
        assert!(out.contains("\n### Q2\n"));
        assert_eq!(out.matches("::: {.panel-tabset}").count(), 2);
        assert!(position(&out, "notes") < position(&out, "## Sales"));
        assert!(position(&out, "### Q1") < position(&out, "### Q2"));
    }

    #[test]
    fn test_placement_after() {
        let items = [text("grouped", Some("Tab")), text("loose", None)];

        let (before, _) = emit(&items, Placement::Before, false);
        assert!(position(&before, "loose") < position(&before, "grouped"));

        let (after, _) = emit(&items, Placement::After, false);
        assert!(position(&after, "grouped") < position(&after, "loose"));
    }

    #[test]
    fn test_children_before_own_leaf() {
        let items = [
            text("b", Some("A/B")),
            text("c", Some("A/C")),
            text("leaf-of-a", Some("A")),
        ];
        let (out, _) = emit(&items, Placement::Before, false);

        assert!(position(&out, "### B") < position(&out, "### C"));
        assert!(position(&out, "### C") < position(&out, "leaf-of-a"));
        // the leaf sits after the inner tabset closes
        let inner_close = out.rfind(":::\n\n::: {#text-3").unwrap();
        assert!(inner_close < position(&out, "leaf-of-a"));
    }

    #[test]
    fn test_heading_level_is_capped() {
        let items = [text("deep", Some("a/b/c/d/e/f/g"))];
        let (out, _) = emit(&items, Placement::Before, false);
        assert!(out.contains("\n###### f\n"));
        assert!(out.contains("\n###### g\n"));
        assert!(!out.contains("#######"));
    }

    #[test]
    fn test_heading_text_escapes_markup() {
        assert_eq!(heading_text("Sales"), "Sales");
        assert_eq!(heading_text("Q1 {draft}"), "Q1 \\{draft\\}");
        assert_eq!(heading_text("a_b *c*"), "a\\_b \\*c\\*");
        assert_eq!(heading_text("R&D <b>"), "R&amp;D &lt;b&gt;");
    }

    #[test]
    fn test_tab_labels_are_literal() {
        let items = [
            text("img", Some("<img src=x onerror=alert(1)>")),
            text("draft", Some("Q1 {draft}")),
        ];
        let (out, _) = emit(&items, Placement::Before, false);

        assert!(out.contains("\n## &lt;img src=x onerror=alert(1)&gt;\n"));
        assert!(out.contains("\n## Q1 \\{draft\\}\n"));
        assert!(!out.contains("<img"));
        assert!(!out.contains("{draft}"));
    }

    #[test]
    fn test_conditional_class() {
        let item = text("west only", None)
            .show_when(ShowWhen::parse("region == 'West'").unwrap());
        let (out, _) = emit(&[item], Placement::Before, false);
        assert!(out.contains(".vizdeck-conditional"));
    }

    fn heatmap() -> ContentItem {
        let options: Map<_, _> = json!({"z": "v"}).as_object().cloned().unwrap();
        ContentItem::new(BlockSpec::from_tagged("heatmap", options).unwrap()).unwrap()
    }

    #[test]
    fn test_unsupported_block_skipped_with_warning() {
        let items = [text("kept", None), heatmap()];
        let (out, warnings) = emit(&items, Placement::Before, false);

        assert!(out.contains("kept"));
        assert!(!out.contains("heatmap"));
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].message.contains("heatmap"));
    }

    #[test]
    fn test_unsupported_block_strict() {
        let items = [heatmap()];
        let data = DataSources::new();
        let registry = RendererRegistry::with_builtins();
        let resolved = resolved(&items);
        let tree = resolve_tabs(&resolved);
        let mut emitter = Emitter::new("Overview", "overview", &registry, &data, true);

        let err = emitter.emit_page(&tree, Placement::Before).unwrap_err();
        assert!(matches!(
            err,
            CompileError::UnsupportedBlock(UnsupportedBlockError { ref kind, .. }) if kind == "heatmap"
        ));
    }

    #[test]
    fn test_custom_renderer() {
        fn heatmap_renderer(ctx: &BlockContext<'_>) -> Result<Body, crate::config::ConfigError> {
            Ok(Body::Html(format!("<div class=\"heat\" id=\"{}-inner\"></div>", ctx.id)))
        }

        let items = [heatmap()];
        let data = DataSources::new();
        let mut registry = RendererRegistry::with_builtins();
        registry.register("heatmap", heatmap_renderer);
        let resolved = resolved(&items);
        let tree = resolve_tabs(&resolved);
        let mut emitter = Emitter::new("Overview", "overview", &registry, &data, true);

        let out = write_fragments(&emitter.emit_page(&tree, Placement::Before).unwrap());
        assert!(out.contains("<div class=\"heat\" id=\"heatmap-1-inner\"></div>"));
        assert!(out.contains(".vizdeck-heatmap"));
    }
}
