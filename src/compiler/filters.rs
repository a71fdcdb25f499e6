//! Filter and visibility metadata.
//!
//! Every input control on a page is a *source* for its `filter_var`. Items
//! naming that variable in `filter_vars` or `show_when` become *targets*. The
//! result is a [`FilterManifest`], an inert description embedded in the page
//! and interpreted by the shared browser runtime. Nothing is filtered here.
//!
//! | Widget                    | Operator   |
//! |---------------------------|------------|
//! | `select`, `radio`         | `equals`   |
//! | `multiselect`, `checkbox` | `in-set`   |
//! | `slider`, `range`         | `range`    |
//! | any, `mode = "override"`  | `override` |
//!
//! A single-value slider is sent to the runtime as `[min, value]`.

use super::ResolvedItem;
use crate::{
    error::UnboundFilterError,
    spec::{BlockSpec, DataProvider, InputMode, InputSpec, Operator, Widget},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// What a binding does to its target when the source changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Effect {
    /// Keep only matching rows of the target's data.
    Filter,
    /// Show the whole target only while the predicate holds.
    Visibility,
    /// Replace a chart encoding with the selected column.
    Override,
}

/// Where the compared value comes from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueSource {
    /// Live value of the input control with this id.
    Input(String),
    /// Fixed value from a `show_when` predicate.
    Literal(Value),
}

/// Declarative link between one input control and one target block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterBinding {
    /// Id of the input control.
    pub source: String,
    pub variable: String,
    pub operator: Operator,
    pub value: ValueSource,
    /// Id of the block being filtered or shown.
    pub target: String,
    pub effect: Effect,
    /// Chart encoding replaced by `override` bindings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoding: Option<String>,
}

/// An input control as seen by the runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputControl {
    pub id: String,
    pub variable: String,
    pub widget: Widget,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

/// All inputs and bindings of one page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterManifest {
    pub inputs: Vec<InputControl>,
    pub bindings: Vec<FilterBinding>,
}

impl FilterManifest {
    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty() && self.bindings.is_empty()
    }

    /// Bindings targeting the given block id.
    pub fn bindings_for<'a>(&'a self, target: &'a str) -> impl Iterator<Item = &'a FilterBinding> {
        self.bindings.iter().filter(move |b| b.target == target)
    }
}

/// Operator implied by an input's widget and mode.
pub fn operator_for(input: &InputSpec) -> Operator {
    match (input.mode, input.widget) {
        (InputMode::Override, _) => Operator::Override,
        (_, Widget::Select | Widget::Radio) => Operator::Equals,
        (_, Widget::Multiselect | Widget::Checkbox) => Operator::InSet,
        (_, Widget::Slider | Widget::Range) => Operator::Range,
    }
}

struct Source<'a> {
    id: &'a str,
    spec: &'a InputSpec,
}

/// Resolve all filter and visibility bindings of a page.
pub fn resolve_filters(
    page: &str,
    items: &[ResolvedItem<'_>],
    provider: &dyn DataProvider,
) -> Result<FilterManifest, UnboundFilterError> {
    let sources: Vec<Source<'_>> = items
        .iter()
        .filter_map(|resolved| match resolved.item.block() {
            BlockSpec::Input(spec) => Some(Source {
                id: &resolved.id,
                spec,
            }),
            _ => None,
        })
        .collect();

    let inputs = sources
        .iter()
        .map(|source| InputControl {
            id: source.id.to_owned(),
            variable: source.spec.filter_var.clone(),
            widget: source.spec.widget,
            default: source.spec.default.clone(),
        })
        .collect();

    let mut bindings = Vec::new();

    for resolved in items {
        let target = resolved.id.as_str();
        let block = resolved.item.block();

        for variable in resolved.item.filter_vars() {
            let matching: Vec<&Source<'_>> = sources
                .iter()
                .filter(|s| &s.spec.filter_var == variable && s.id != target)
                .collect();

            if matching.is_empty() {
                return Err(UnboundFilterError::NoSource {
                    page: page.to_owned(),
                    target: target.to_owned(),
                    variable: variable.clone(),
                });
            }

            for source in matching {
                bindings.push(bind_filter(source, variable, target, block, provider)?);
            }
        }

        if let Some(show_when) = resolved.item.visibility() {
            let matching: Vec<&Source<'_>> = sources
                .iter()
                .filter(|s| s.spec.filter_var == show_when.variable)
                .collect();

            if matching.is_empty() {
                return Err(UnboundFilterError::NoSource {
                    page: page.to_owned(),
                    target: target.to_owned(),
                    variable: show_when.variable.clone(),
                });
            }

            bindings.extend(matching.into_iter().map(|source| FilterBinding {
                source: source.id.to_owned(),
                variable: show_when.variable.clone(),
                operator: show_when.operator,
                value: ValueSource::Literal(show_when.value.clone()),
                target: target.to_owned(),
                effect: Effect::Visibility,
                encoding: None,
            }));
        }
    }

    Ok(FilterManifest { inputs, bindings })
}

/// Build one data binding, checking what can be checked statically.
fn bind_filter(
    source: &Source<'_>,
    variable: &str,
    target: &str,
    block: &BlockSpec,
    provider: &dyn DataProvider,
) -> Result<FilterBinding, UnboundFilterError> {
    let invalid_target = |reason: &str| UnboundFilterError::InvalidTarget {
        target: target.to_owned(),
        variable: variable.to_owned(),
        reason: reason.to_owned(),
    };

    let Some(data) = block.data() else {
        return Err(invalid_target("the block has no data to filter"));
    };

    let operator = operator_for(source.spec);
    let schema = data.resolve(provider);

    if operator == Operator::Override {
        if !matches!(block, BlockSpec::Chart(_)) {
            return Err(invalid_target("`override` inputs can only drive charts"));
        }
        // every choice must name a column of the chart's data
        if let Some(table) = schema
            && let Some(column) = source
                .spec
                .options
                .iter()
                .filter_map(Value::as_str)
                .find(|column| !table.has_column(column))
        {
            return Err(UnboundFilterError::UnknownColumn {
                target: target.to_owned(),
                variable: column.to_owned(),
            });
        }
    } else if schema.is_some_and(|table| !table.has_column(variable)) {
        return Err(UnboundFilterError::UnknownColumn {
            target: target.to_owned(),
            variable: variable.to_owned(),
        });
    }

    Ok(FilterBinding {
        source: source.id.to_owned(),
        variable: variable.to_owned(),
        operator,
        value: ValueSource::Input(source.id.to_owned()),
        target: target.to_owned(),
        effect: if operator == Operator::Override {
            Effect::Override
        } else {
            Effect::Filter
        },
        encoding: source.spec.encoding.clone(),
    })
}
