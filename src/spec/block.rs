//! Content blocks and the items that carry them.
//!
//! A [`BlockSpec`] is a tagged union with one variant per built-in block
//! type, each holding only the fields valid for that type. Tags outside the
//! built-in set are kept as [`BlockSpec::Other`] and need a registered
//! renderer to compile.

use super::{DataRef, ShowWhen, TabPath};
use crate::config::ConfigError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ============================================================================
// Charts
// ============================================================================

/// Browser charting library that draws a chart.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Plotly,
    Echarts,
    #[serde(alias = "vega-lite")]
    Vegalite,
}

impl Backend {
    pub const ALL: [Self; 3] = [Self::Plotly, Self::Echarts, Self::Vegalite];

    pub const fn name(self) -> &'static str {
        match self {
            Self::Plotly => "plotly",
            Self::Echarts => "echarts",
            Self::Vegalite => "vegalite",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Bar,
    Line,
    Scatter,
    Area,
    Pie,
    Histogram,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChartSpec {
    #[serde(default)]
    pub backend: Backend,
    pub kind: ChartKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<DataRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    /// Passed to the backend untouched.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub options: Map<String, Value>,
}

impl ChartSpec {
    pub fn new(kind: ChartKind) -> Self {
        Self {
            backend: Backend::default(),
            kind,
            data: None,
            x: None,
            y: None,
            color: None,
            title: None,
            height: None,
            options: Map::new(),
        }
    }

    pub fn backend(mut self, backend: Backend) -> Self {
        self.backend = backend;
        self
    }

    pub fn data(mut self, data: impl Into<DataRef>) -> Self {
        self.data = Some(data.into());
        self
    }

    pub fn x(mut self, column: impl Into<String>) -> Self {
        self.x = Some(column.into());
        self
    }

    pub fn y(mut self, column: impl Into<String>) -> Self {
        self.y = Some(column.into());
        self
    }

    pub fn color(mut self, column: impl Into<String>) -> Self {
        self.color = Some(column.into());
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn height(mut self, px: u32) -> Self {
        self.height = Some(px);
        self
    }

    pub fn option(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let missing = |field| ConfigError::invalid_block("chart", format!("missing `{field}`"));

        if self.x.is_none() {
            return Err(missing("x"));
        }
        if self.kind != ChartKind::Histogram && self.y.is_none() {
            return Err(missing("y"));
        }
        if self.height == Some(0) {
            return Err(ConfigError::invalid_block("chart", "`height` must be positive"));
        }
        Ok(())
    }

    /// Columns the chart reads from its data.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        [&self.x, &self.y, &self.color]
            .into_iter()
            .filter_map(|c| c.as_deref())
    }
}

// ============================================================================
// Tables, text
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TableSpec {
    pub data: DataRef,
    #[serde(default)]
    pub columns: Option<Vec<String>>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub page_size: Option<usize>,
}

impl TableSpec {
    pub fn new(data: impl Into<DataRef>) -> Self {
        Self {
            data: data.into(),
            columns: None,
            title: None,
            page_size: None,
        }
    }

    pub fn columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn page_size(mut self, rows: usize) -> Self {
        self.page_size = Some(rows);
        self
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.columns.as_ref().is_some_and(Vec::is_empty) {
            return Err(ConfigError::invalid_block("table", "`columns` is empty"));
        }
        if self.page_size == Some(0) {
            return Err(ConfigError::invalid_block("table", "`page_size` must be positive"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextStyle {
    #[default]
    Body,
    Heading,
    Callout,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TextSpec {
    /// Markdown source.
    pub content: String,
    #[serde(default)]
    pub style: TextStyle,
    #[serde(default)]
    pub level: Option<u8>,
}

impl TextSpec {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            style: TextStyle::Body,
            level: None,
        }
    }

    pub fn heading(content: impl Into<String>, level: u8) -> Self {
        Self {
            content: content.into(),
            style: TextStyle::Heading,
            level: Some(level),
        }
    }

    pub fn callout(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            style: TextStyle::Callout,
            level: None,
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        match (self.style, self.level) {
            (TextStyle::Heading, Some(1..=6)) => Ok(()),
            (TextStyle::Heading, None) => Ok(()),
            (TextStyle::Heading, Some(_)) => Err(ConfigError::invalid_block(
                "text",
                "heading `level` must be between 1 and 6",
            )),
            (_, Some(_)) => Err(ConfigError::invalid_block(
                "text",
                "`level` only applies to headings",
            )),
            (_, None) => Ok(()),
        }
    }
}

// ============================================================================
// Inputs
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Widget {
    Select,
    Multiselect,
    Slider,
    Range,
    Checkbox,
    Radio,
}

impl Widget {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Select => "select",
            Self::Multiselect => "multiselect",
            Self::Slider => "slider",
            Self::Range => "range",
            Self::Checkbox => "checkbox",
            Self::Radio => "radio",
        }
    }

    /// Whether the widget picks from a list of options.
    pub const fn is_choice(self) -> bool {
        matches!(
            self,
            Self::Select | Self::Multiselect | Self::Checkbox | Self::Radio
        )
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputMode {
    /// Filter the rows of bound blocks.
    #[default]
    Filter,
    /// Replace an encoding of bound charts with the selected column.
    Override,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InputSpec {
    pub label: String,
    pub filter_var: String,
    pub widget: Widget,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<Value>,
    /// Choice options are taken from the `filter_var` column when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<DataRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(default)]
    pub mode: InputMode,
    /// Chart encoding replaced in `override` mode (`x`, `y` or `color`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoding: Option<String>,
}

impl InputSpec {
    pub fn new(widget: Widget, filter_var: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            filter_var: filter_var.into(),
            widget,
            options: Vec::new(),
            data: None,
            min: None,
            max: None,
            step: None,
            default: None,
            mode: InputMode::Filter,
            encoding: None,
        }
    }

    pub fn options<I, V>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.options = options.into_iter().map(Into::into).collect();
        self
    }

    pub fn data(mut self, data: impl Into<DataRef>) -> Self {
        self.data = Some(data.into());
        self
    }

    pub fn bounds(mut self, min: f64, max: f64) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }

    pub fn step(mut self, step: f64) -> Self {
        self.step = Some(step);
        self
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Switch to `override` mode, replacing the given chart encoding.
    pub fn overriding(mut self, encoding: impl Into<String>) -> Self {
        self.mode = InputMode::Override;
        self.encoding = Some(encoding.into());
        self
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |reason: &str| ConfigError::invalid_block("input", reason);

        if self.filter_var.trim().is_empty() || self.filter_var.contains(char::is_whitespace) {
            return Err(invalid("`filter_var` must be a non-empty name without spaces"));
        }

        if self.widget.is_choice() {
            if self.options.is_empty() && self.data.is_none() {
                return Err(invalid("choice widgets need `options` or `data`"));
            }
        } else {
            match (self.min, self.max) {
                (Some(min), Some(max)) if min < max => {}
                (Some(_), Some(_)) => return Err(invalid("`min` must be less than `max`")),
                _ if self.data.is_some() => {}
                _ => return Err(invalid("sliders need `min` and `max` or `data`")),
            }
            if self.step.is_some_and(|s| s <= 0.0) {
                return Err(invalid("`step` must be positive"));
            }
        }

        match (self.mode, self.encoding.as_deref()) {
            (InputMode::Override, Some("x" | "y" | "color")) => Ok(()),
            (InputMode::Override, _) => {
                Err(invalid("`override` mode needs `encoding` = \"x\", \"y\" or \"color\""))
            }
            (InputMode::Filter, Some(_)) => Err(invalid("`encoding` requires `mode = \"override\"`")),
            (InputMode::Filter, None) => Ok(()),
        }
    }
}

// ============================================================================
// Metrics
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Agg {
    Sum,
    Mean,
    Min,
    Max,
    Count,
}

/// A metric computed from a data column at build time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Aggregate {
    pub data: DataRef,
    #[serde(default)]
    pub column: Option<String>,
    pub agg: Agg,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricValue {
    Aggregate(Aggregate),
    Literal(Value),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetricSpec {
    pub label: String,
    pub value: MetricValue,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub delta: Option<f64>,
    #[serde(default)]
    pub precision: Option<usize>,
}

impl MetricSpec {
    pub fn new(label: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            label: label.into(),
            value: MetricValue::Literal(value.into()),
            unit: None,
            delta: None,
            precision: None,
        }
    }

    pub fn aggregate(
        label: impl Into<String>,
        data: impl Into<DataRef>,
        column: Option<&str>,
        agg: Agg,
    ) -> Self {
        Self {
            label: label.into(),
            value: MetricValue::Aggregate(Aggregate {
                data: data.into(),
                column: column.map(str::to_owned),
                agg,
            }),
            unit: None,
            delta: None,
            precision: None,
        }
    }

    pub fn unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    pub fn delta(mut self, delta: f64) -> Self {
        self.delta = Some(delta);
        self
    }

    pub fn precision(mut self, digits: usize) -> Self {
        self.precision = Some(digits);
        self
    }

    fn validate(&self) -> Result<(), ConfigError> {
        match &self.value {
            MetricValue::Aggregate(Aggregate {
                column: None,
                agg: Agg::Sum | Agg::Mean | Agg::Min | Agg::Max,
                ..
            }) => Err(ConfigError::invalid_block(
                "metric",
                "only `count` works without a `column`",
            )),
            MetricValue::Literal(Value::Array(_) | Value::Object(_)) => Err(
                ConfigError::invalid_block("metric", "`value` must be a number or a string"),
            ),
            _ => Ok(()),
        }
    }
}

// ============================================================================
// BlockSpec
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum BlockSpec {
    Chart(ChartSpec),
    Table(TableSpec),
    Text(TextSpec),
    Input(InputSpec),
    Metric(MetricSpec),
    /// A type tag outside the built-in set, with its raw options.
    Other { kind: String, options: Map<String, Value> },
}

impl BlockSpec {
    pub const BUILTIN: [&'static str; 5] = ["chart", "table", "text", "input", "metric"];

    /// The block's type tag.
    pub fn kind(&self) -> &str {
        match self {
            Self::Chart(_) => "chart",
            Self::Table(_) => "table",
            Self::Text(_) => "text",
            Self::Input(_) => "input",
            Self::Metric(_) => "metric",
            Self::Other { kind, .. } => kind,
        }
    }

    /// Build a block from its type tag and loose options.
    pub fn from_tagged(kind: &str, options: Map<String, Value>) -> Result<Self, ConfigError> {
        fn parse<T: serde::de::DeserializeOwned>(
            kind: &str,
            options: Map<String, Value>,
        ) -> Result<T, ConfigError> {
            serde_json::from_value(Value::Object(options))
                .map_err(|err| ConfigError::invalid_block(kind, err.to_string()))
        }

        let block = match kind {
            "chart" => Self::Chart(parse(kind, options)?),
            "table" => Self::Table(parse(kind, options)?),
            "text" => Self::Text(parse(kind, options)?),
            "input" => Self::Input(parse(kind, options)?),
            "metric" => Self::Metric(parse(kind, options)?),
            other if other.trim().is_empty() => {
                return Err(ConfigError::invalid_block("unnamed", "`type` is empty"));
            }
            other => Self::Other {
                kind: other.to_owned(),
                options,
            },
        };
        block.validate()?;
        Ok(block)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        match self {
            Self::Chart(chart) => chart.validate(),
            Self::Table(table) => table.validate(),
            Self::Text(text) => text.validate(),
            Self::Input(input) => input.validate(),
            Self::Metric(metric) => metric.validate(),
            Self::Other { .. } => Ok(()),
        }?;

        // named tables are checked when registered
        if let Some(DataRef::Inline(table)) = self.data() {
            table.validate(&format!("inline {}", self.kind()))?;
        }
        Ok(())
    }

    /// The data this block reads, if any.
    pub fn data(&self) -> Option<&DataRef> {
        match self {
            Self::Chart(chart) => chart.data.as_ref(),
            Self::Table(table) => Some(&table.data),
            Self::Input(input) => input.data.as_ref(),
            Self::Metric(MetricSpec {
                value: MetricValue::Aggregate(aggregate),
                ..
            }) => Some(&aggregate.data),
            _ => None,
        }
    }
}

// ============================================================================
// ContentItem
// ============================================================================

/// One authored unit of a page.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentItem {
    pub(crate) id: Option<String>,
    pub(crate) block: BlockSpec,
    pub(crate) tabgroup: Option<TabPath>,
    pub(crate) show_when: Option<ShowWhen>,
    pub(crate) filter_vars: Vec<String>,
}

impl ContentItem {
    /// Wrap a block, validating its fields.
    pub fn new(block: BlockSpec) -> Result<Self, ConfigError> {
        block.validate()?;
        Ok(Self {
            id: None,
            block,
            tabgroup: None,
            show_when: None,
            filter_vars: Vec::new(),
        })
    }

    pub fn chart(spec: ChartSpec) -> Result<Self, ConfigError> {
        Self::new(BlockSpec::Chart(spec))
    }

    pub fn table(spec: TableSpec) -> Result<Self, ConfigError> {
        Self::new(BlockSpec::Table(spec))
    }

    pub fn text(spec: TextSpec) -> Result<Self, ConfigError> {
        Self::new(BlockSpec::Text(spec))
    }

    pub fn input(spec: InputSpec) -> Result<Self, ConfigError> {
        Self::new(BlockSpec::Input(spec))
    }

    pub fn metric(spec: MetricSpec) -> Result<Self, ConfigError> {
        Self::new(BlockSpec::Metric(spec))
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Place the item under a tab path such as `"Sales/Q1"`.
    pub fn tabgroup(self, path: &str) -> Result<Self, ConfigError> {
        Ok(self.in_tab(TabPath::parse(path)?))
    }

    pub fn in_tab(mut self, path: TabPath) -> Self {
        self.tabgroup = Some(path);
        self
    }

    pub fn show_when(mut self, predicate: ShowWhen) -> Self {
        self.show_when = Some(predicate);
        self
    }

    pub fn filter_by(mut self, variable: impl Into<String>) -> Self {
        let variable = variable.into();
        if !self.filter_vars.contains(&variable) {
            self.filter_vars.push(variable);
        }
        self
    }

    pub fn explicit_id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn block(&self) -> &BlockSpec {
        &self.block
    }

    pub fn kind(&self) -> &str {
        self.block.kind()
    }

    pub fn tab_path(&self) -> Option<&TabPath> {
        self.tabgroup.as_ref()
    }

    pub fn visibility(&self) -> Option<&ShowWhen> {
        self.show_when.as_ref()
    }

    pub fn filter_vars(&self) -> &[String] {
        &self.filter_vars
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn options(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_chart_from_tagged() {
        let block = BlockSpec::from_tagged(
            "chart",
            options(json!({"kind": "bar", "x": "month", "y": "revenue", "data": "sales"})),
        )
        .unwrap();

        let BlockSpec::Chart(chart) = block else {
            panic!("expected chart");
        };
        assert_eq!(chart.backend, Backend::Plotly);
        assert_eq!(chart.data, Some(DataRef::Named("sales".into())));
        assert_eq!(chart.columns().collect::<Vec<_>>(), ["month", "revenue"]);
    }

    #[test]
    fn test_chart_requires_encodings() {
        let err = ContentItem::chart(ChartSpec::new(ChartKind::Line).x("month")).unwrap_err();
        assert!(err.to_string().contains("missing `y`"));

        // histograms only need x
        assert!(ContentItem::chart(ChartSpec::new(ChartKind::Histogram).x("price")).is_ok());
    }

    #[test]
    fn test_chart_rejects_unknown_fields() {
        let err = BlockSpec::from_tagged(
            "chart",
            options(json!({"kind": "bar", "x": "a", "y": "b", "colour": "c"})),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidBlock { .. }));
        assert!(err.to_string().contains("colour"));
    }

    #[test]
    fn test_vega_lite_alias() {
        let chart: ChartSpec =
            serde_json::from_value(json!({"kind": "bar", "x": "a", "y": "b", "backend": "vega-lite"}))
                .unwrap();
        assert_eq!(chart.backend, Backend::Vegalite);
    }

    #[test]
    fn test_unknown_tag_is_kept() {
        let block = BlockSpec::from_tagged("heatmap", options(json!({"z": "value"}))).unwrap();
        assert_eq!(block.kind(), "heatmap");
        assert!(matches!(block, BlockSpec::Other { .. }));
    }

    #[test]
    fn test_text_level_rules() {
        assert!(ContentItem::text(TextSpec::heading("Title", 2)).is_ok());
        assert!(ContentItem::text(TextSpec::heading("Title", 7)).is_err());
        let body = TextSpec {
            level: Some(2),
            ..TextSpec::new("body")
        };
        assert!(ContentItem::text(body).is_err());
    }

    #[test]
    fn test_input_validation() {
        let select = InputSpec::new(Widget::Select, "region", "Region");
        assert!(ContentItem::input(select.clone()).is_err());
        assert!(ContentItem::input(select.options(["West", "East"])).is_ok());

        let slider = InputSpec::new(Widget::Slider, "year", "Year").bounds(2024.0, 2020.0);
        assert!(ContentItem::input(slider).is_err());

        let bad_var = InputSpec::new(Widget::Radio, "two words", "x").options([1, 2]);
        assert!(ContentItem::input(bad_var).is_err());
    }

    #[test]
    fn test_override_input_needs_encoding() {
        let input = InputSpec::new(Widget::Select, "metric", "Metric").options(["a", "b"]);
        assert!(ContentItem::input(input.clone().overriding("y")).is_ok());
        assert!(ContentItem::input(input.overriding("size")).is_err());
    }

    #[test]
    fn test_metric_value_untagged() {
        let metric: MetricSpec = serde_json::from_value(json!({
            "label": "Revenue",
            "value": {"data": "sales", "column": "revenue", "agg": "sum"}
        }))
        .unwrap();
        assert!(matches!(metric.value, MetricValue::Aggregate(_)));

        let metric: MetricSpec =
            serde_json::from_value(json!({"label": "Users", "value": 42})).unwrap();
        assert_eq!(metric.value, MetricValue::Literal(json!(42)));
    }

    #[test]
    fn test_metric_sum_needs_column() {
        let metric = MetricSpec::aggregate("Total", "sales", None, Agg::Sum);
        assert!(ContentItem::metric(metric).is_err());
        let count = MetricSpec::aggregate("Rows", "sales", None, Agg::Count);
        assert!(ContentItem::metric(count).is_ok());
    }

    #[test]
    fn test_item_builder_chain() {
        let item = ContentItem::text(TextSpec::new("hello"))
            .unwrap()
            .id("intro")
            .tabgroup("Sales/Q1")
            .unwrap()
            .filter_by("region")
            .filter_by("region");

        assert_eq!(item.explicit_id(), Some("intro"));
        assert_eq!(item.tab_path().unwrap().to_string(), "Sales/Q1");
        assert_eq!(item.filter_vars(), ["region"]);
        assert_eq!(item.kind(), "text");
    }

    #[test]
    fn test_ragged_inline_table_is_rejected() {
        let ragged = crate::spec::Table::new(["x", "y"])
            .row([json!(1), json!(2)])
            .row([json!(3)]);
        let err = ContentItem::chart(ChartSpec::new(ChartKind::Bar).data(ragged).x("x").y("y"))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Data { .. }));
        assert!(err.to_string().contains("row 2 has 1 cells, expected 2"));

        let err = BlockSpec::from_tagged(
            "table",
            options(json!({"data": {"columns": ["a", "b"], "rows": [[1, 2, 3]]}})),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Data { .. }));
    }

    #[test]
    fn test_block_data() {
        let table = BlockSpec::Table(TableSpec::new("sales"));
        assert_eq!(table.data(), Some(&DataRef::Named("sales".into())));
        assert!(BlockSpec::Text(TextSpec::new("x")).data().is_none());
    }
}
