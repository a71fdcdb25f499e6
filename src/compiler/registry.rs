//! Block renderers, keyed by block type tag.
//!
//! A renderer turns one resolved item into the body of its fragment. The
//! emitter wraps the body in the block's container div, so renderers only
//! produce what goes inside.

use crate::{
    config::ConfigError,
    spec::{
        Agg, Aggregate, BlockSpec, ContentItem, DataProvider, DataRef, InputSpec, MetricValue, Table,
        TextStyle, Widget,
    },
};
use quick_xml::escape::escape;
use rustc_hash::FxHashMap;
use serde_json::{Value, json};
use std::fmt::Write;

/// Directory, relative to the project, holding runtime assets.
pub const ASSET_DIR: &str = "_vizdeck";

/// Rendered block content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    /// Passed to the renderer as raw HTML.
    Html(String),
    /// Markdown, processed by the renderer.
    Markdown(String),
}

/// Everything a renderer may look at.
pub struct BlockContext<'a> {
    pub id: &'a str,
    pub item: &'a ContentItem,
    /// File stem of the page, used to name inline data files.
    pub page_stem: &'a str,
    pub data: &'a dyn DataProvider,
}

impl BlockContext<'_> {
    /// URL of the JSON file backing a data reference.
    pub fn data_url(&self, data: &DataRef) -> String {
        format!("{ASSET_DIR}/data/{}.json", data_file_stem(self.page_stem, self.id, data))
    }

    pub fn table<'t>(&'t self, data: &'t DataRef) -> Option<&'t Table> {
        data.resolve(self.data)
    }
}

/// Subfolder of `data/` holding inline tables, apart from named sources.
pub const INLINE_DATA_DIR: &str = "inline";

/// Path of the data file for `data` as used by block `id` on `page_stem`,
/// relative to `data/` and without extension.
pub fn data_file_stem(page_stem: &str, id: &str, data: &DataRef) -> String {
    match data {
        DataRef::Named(name) => name.clone(),
        DataRef::Inline(_) => format!("{INLINE_DATA_DIR}/{page_stem}--{id}"),
    }
}

pub type RenderFn = fn(&BlockContext<'_>) -> Result<Body, ConfigError>;

/// Renderers by type tag.
#[derive(Clone)]
pub struct RendererRegistry {
    renderers: FxHashMap<String, RenderFn>,
}

impl std::fmt::Debug for RendererRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut tags: Vec<_> = self.renderers.keys().collect();
        tags.sort();
        f.debug_struct("RendererRegistry").field("tags", &tags).finish()
    }
}

impl Default for RendererRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl RendererRegistry {
    /// A registry without any renderer.
    pub fn empty() -> Self {
        Self {
            renderers: FxHashMap::default(),
        }
    }

    /// Registry with chart, table, text, input and metric renderers.
    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        registry.register("chart", render_chart);
        registry.register("table", render_table);
        registry.register("text", render_text);
        registry.register("input", render_input);
        registry.register("metric", render_metric);
        registry
    }

    /// Register or replace the renderer for `tag`, returning the old one.
    pub fn register(&mut self, tag: impl Into<String>, render: RenderFn) -> Option<RenderFn> {
        self.renderers.insert(tag.into(), render)
    }

    pub fn get(&self, tag: &str) -> Option<RenderFn> {
        self.renderers.get(tag).copied()
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.renderers.contains_key(tag)
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Serialize JSON for embedding inside a `<script>` element.
pub fn script_json(value: &Value) -> String {
    // serializing a Value cannot fail
    serde_json::to_string(value)
        .unwrap_or_default()
        .replace("</", "<\\/")
}

/// Display text for a scalar cell or option.
pub fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn number_text(value: f64, precision: Option<usize>) -> String {
    match precision {
        Some(digits) => format!("{value:.digits$}"),
        None if value.fract() == 0.0 && value.abs() < 1e15 => format!("{value:.0}"),
        None => format!("{value:.2}"),
    }
}

fn unknown_column(kind: &str, column: &str) -> ConfigError {
    ConfigError::invalid_block(kind, format!("unknown column `{column}`"))
}

// ============================================================================
// Built-in renderers
// ============================================================================

fn wrong_block(ctx: &BlockContext<'_>) -> ConfigError {
    ConfigError::invalid_block(ctx.item.kind(), "renderer registered for another block type")
}

pub fn render_chart(ctx: &BlockContext<'_>) -> Result<Body, ConfigError> {
    let BlockSpec::Chart(chart) = ctx.item.block() else {
        return Err(wrong_block(ctx));
    };

    if let Some(table) = chart.data.as_ref().and_then(|d| ctx.table(d))
        && let Some(column) = chart.columns().find(|c| !table.has_column(c))
    {
        return Err(unknown_column("chart", column));
    }

    let spec = json!({
        "backend": chart.backend.name(),
        "kind": chart.kind,
        "data": chart.data.as_ref().map(|d| ctx.data_url(d)),
        "x": chart.x,
        "y": chart.y,
        "color": chart.color,
        "title": chart.title,
        "options": chart.options,
    });

    let height = chart.height.unwrap_or(400);
    Ok(Body::Html(format!(
        "<div class=\"vizdeck-chart\" data-backend=\"{}\" style=\"height: {height}px\"></div>\n\
         <script type=\"application/json\" class=\"vizdeck-spec\">{}</script>",
        chart.backend.name(),
        script_json(&spec),
    )))
}

pub fn render_table(ctx: &BlockContext<'_>) -> Result<Body, ConfigError> {
    let BlockSpec::Table(spec) = ctx.item.block() else {
        return Err(wrong_block(ctx));
    };

    let mut html = String::new();
    let _ = write!(
        html,
        "<table class=\"vizdeck-table table\" data-source=\"{}\"",
        escape(&ctx.data_url(&spec.data))
    );
    if let Some(size) = spec.page_size {
        let _ = write!(html, " data-page-size=\"{size}\"");
    }
    html.push('>');

    if let Some(title) = &spec.title {
        let _ = write!(html, "\n<caption>{}</caption>", escape(title));
    }

    if let Some(table) = ctx.table(&spec.data) {
        let columns: Vec<&str> = match &spec.columns {
            Some(columns) => columns.iter().map(String::as_str).collect(),
            None => table.columns.iter().map(String::as_str).collect(),
        };
        let indices = columns
            .iter()
            .map(|c| table.column_index(c).ok_or_else(|| unknown_column("table", c)))
            .collect::<Result<Vec<_>, _>>()?;

        html.push_str("\n<thead><tr>");
        for column in &columns {
            let _ = write!(html, "<th data-column=\"{0}\">{0}</th>", escape(*column));
        }
        html.push_str("</tr></thead>\n<tbody>");
        for (i, row) in table.rows.iter().enumerate() {
            let _ = write!(html, "\n<tr data-row=\"{i}\">");
            for &idx in &indices {
                let cell = row.get(idx).map(value_text).unwrap_or_default();
                let _ = write!(html, "<td>{}</td>", escape(&cell));
            }
            html.push_str("</tr>");
        }
        html.push_str("\n</tbody>");
    }

    html.push_str("\n</table>");
    Ok(Body::Html(html))
}

pub fn render_text(ctx: &BlockContext<'_>) -> Result<Body, ConfigError> {
    let BlockSpec::Text(text) = ctx.item.block() else {
        return Err(wrong_block(ctx));
    };

    let content = text.content.trim();
    Ok(Body::Markdown(match text.style {
        TextStyle::Body => content.to_owned(),
        TextStyle::Heading => {
            let level = usize::from(text.level.unwrap_or(2));
            format!("{} {content}", "#".repeat(level))
        }
        TextStyle::Callout => format!("::: {{.callout-note}}\n{content}\n:::"),
    }))
}

/// Choices of a choice widget: explicit options or distinct data values.
fn input_choices(ctx: &BlockContext<'_>, input: &InputSpec) -> Result<Vec<Value>, ConfigError> {
    if !input.options.is_empty() {
        return Ok(input.options.clone());
    }
    match input.data.as_ref().and_then(|d| ctx.table(d)) {
        Some(table) if !table.has_column(&input.filter_var) => {
            Err(unknown_column("input", &input.filter_var))
        }
        Some(table) => Ok(table.distinct(&input.filter_var)),
        // filled in by the runtime from `data-source`
        None => Ok(Vec::new()),
    }
}

/// Slider bounds: explicit, or the numeric extent of the data column.
fn input_bounds(ctx: &BlockContext<'_>, input: &InputSpec) -> Result<(f64, f64), ConfigError> {
    if let (Some(min), Some(max)) = (input.min, input.max) {
        return Ok((min, max));
    }
    let table = input.data.as_ref().and_then(|d| ctx.table(d));
    let values: Vec<f64> = match table {
        Some(table) => table
            .column(&input.filter_var)
            .ok_or_else(|| unknown_column("input", &input.filter_var))?
            .filter_map(Value::as_f64)
            .collect(),
        None => Vec::new(),
    };
    let min = input
        .min
        .or_else(|| values.iter().copied().reduce(f64::min))
        .unwrap_or(0.0);
    let max = input
        .max
        .or_else(|| values.iter().copied().reduce(f64::max))
        .unwrap_or(100.0);
    Ok((min, max))
}

fn is_default(input: &InputSpec, value: &Value) -> bool {
    match &input.default {
        Some(Value::Array(defaults)) => defaults.contains(value),
        Some(default) => default == value,
        None => false,
    }
}

pub fn render_input(ctx: &BlockContext<'_>) -> Result<Body, ConfigError> {
    let BlockSpec::Input(input) = ctx.item.block() else {
        return Err(wrong_block(ctx));
    };

    let id = ctx.id;
    let var = escape(&input.filter_var);
    let label = escape(&input.label);
    let source = input
        .data
        .as_ref()
        .map(|d| format!(" data-source=\"{}\"", escape(&ctx.data_url(d))))
        .unwrap_or_default();

    let mut html = String::new();
    match input.widget {
        Widget::Select | Widget::Multiselect => {
            let multiple = if input.widget == Widget::Multiselect {
                " multiple"
            } else {
                ""
            };
            let _ = write!(
                html,
                "<label for=\"{id}-control\" class=\"form-label\">{label}</label>\n\
                 <select id=\"{id}-control\" class=\"form-select vizdeck-control\" data-var=\"{var}\"{source}{multiple}>"
            );
            for choice in input_choices(ctx, input)? {
                let text = escape(&value_text(&choice)).into_owned();
                let selected = if is_default(input, &choice) { " selected" } else { "" };
                let _ = write!(html, "\n<option value=\"{text}\"{selected}>{text}</option>");
            }
            html.push_str("\n</select>");
        }
        Widget::Radio | Widget::Checkbox => {
            let kind = input.widget.name();
            let _ = write!(
                html,
                "<fieldset id=\"{id}-control\" class=\"vizdeck-control\" data-var=\"{var}\" data-widget=\"{kind}\"{source}>\n\
                 <legend>{label}</legend>"
            );
            for (n, choice) in input_choices(ctx, input)?.iter().enumerate() {
                let text = escape(&value_text(choice)).into_owned();
                let checked = if is_default(input, choice) { " checked" } else { "" };
                let _ = write!(
                    html,
                    "\n<label class=\"form-check\"><input type=\"{kind}\" class=\"form-check-input\" \
                     name=\"{id}\" id=\"{id}-{n}\" value=\"{text}\"{checked}> {text}</label>"
                );
            }
            html.push_str("\n</fieldset>");
        }
        Widget::Slider | Widget::Range => {
            let (min, max) = input_bounds(ctx, input)?;
            let step = input.step.map(|s| s.to_string()).unwrap_or_else(|| "any".into());
            let (low, high) = match &input.default {
                Some(Value::Array(bounds)) if bounds.len() == 2 => (
                    bounds[0].as_f64().unwrap_or(min),
                    bounds[1].as_f64().unwrap_or(max),
                ),
                Some(value) => (min, value.as_f64().unwrap_or(max)),
                None => (min, max),
            };
            let _ = write!(
                html,
                "<label for=\"{id}-control\" class=\"form-label\">{label}</label>\n\
                 <div id=\"{id}-control\" class=\"vizdeck-control\" data-var=\"{var}\" \
                 data-widget=\"{}\" data-min=\"{min}\" data-max=\"{max}\"{source}>",
                input.widget.name()
            );
            if input.widget == Widget::Range {
                let _ = write!(
                    html,
                    "\n<input type=\"range\" class=\"form-range\" data-bound=\"low\" min=\"{min}\" max=\"{max}\" step=\"{step}\" value=\"{low}\">"
                );
            }
            let _ = write!(
                html,
                "\n<input type=\"range\" class=\"form-range\" data-bound=\"high\" min=\"{min}\" max=\"{max}\" step=\"{step}\" value=\"{high}\">\n\
                 <output class=\"vizdeck-output\"></output>\n</div>"
            );
        }
    }

    Ok(Body::Html(html))
}

/// Compute an aggregate over a resolved table.
pub fn aggregate(table: &Table, aggregate: &Aggregate) -> Result<Option<f64>, ConfigError> {
    let Some(column) = aggregate.column.as_deref() else {
        return Ok(Some(table.rows.len() as f64));
    };

    let values: Vec<f64> = table
        .column(column)
        .ok_or_else(|| unknown_column("metric", column))?
        .filter_map(Value::as_f64)
        .collect();

    let result = match aggregate.agg {
        Agg::Count => Some(values.len() as f64),
        Agg::Sum => Some(values.iter().sum()),
        Agg::Mean if values.is_empty() => None,
        Agg::Mean => Some(values.iter().sum::<f64>() / values.len() as f64),
        Agg::Min => values.iter().copied().reduce(f64::min),
        Agg::Max => values.iter().copied().reduce(f64::max),
    };
    Ok(result)
}

pub fn render_metric(ctx: &BlockContext<'_>) -> Result<Body, ConfigError> {
    let BlockSpec::Metric(metric) = ctx.item.block() else {
        return Err(wrong_block(ctx));
    };

    let mut attrs = String::new();
    let value = match &metric.value {
        MetricValue::Literal(Value::Number(n)) => {
            n.as_f64().map_or_else(|| n.to_string(), |v| number_text(v, metric.precision))
        }
        MetricValue::Literal(other) => value_text(other),
        MetricValue::Aggregate(agg) => {
            let _ = write!(
                attrs,
                " data-source=\"{}\" data-agg=\"{}\"",
                escape(&ctx.data_url(&agg.data)),
                serde_json::to_value(agg.agg)
                    .ok()
                    .as_ref()
                    .map(value_text)
                    .unwrap_or_default()
            );
            if let Some(column) = &agg.column {
                let _ = write!(attrs, " data-column=\"{}\"", escape(column));
            }
            if let Some(precision) = metric.precision {
                let _ = write!(attrs, " data-precision=\"{precision}\"");
            }
            match ctx.table(&agg.data) {
                Some(table) => aggregate(table, agg)?
                    .map(|v| number_text(v, metric.precision))
                    .unwrap_or_else(|| "–".into()),
                None => "–".into(),
            }
        }
    };

    let unit = metric
        .unit
        .as_deref()
        .map(|u| format!(" <span class=\"vizdeck-unit\">{}</span>", escape(u)))
        .unwrap_or_default();

    let mut html = format!(
        "<div class=\"vizdeck-metric-label\">{}</div>\n\
         <div class=\"vizdeck-metric-value\"{attrs}>{}{unit}</div>",
        escape(&metric.label),
        escape(&value),
    );

    if let Some(delta) = metric.delta {
        let direction = if delta < 0.0 { "down" } else { "up" };
        let _ = write!(
            html,
            "\n<div class=\"vizdeck-metric-delta {direction}\">{delta:+.1}%</div>"
        );
    }

    Ok(Body::Html(html))
}
