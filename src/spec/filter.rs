//! Visibility predicates and comparison operators.
//!
//! Nothing here is ever evaluated at build time. A parsed `show_when` becomes
//! a binding in the page's filter manifest and the browser runtime decides.

use crate::error::UnboundFilterError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{fmt, str::FromStr, sync::OnceLock};

/// Comparison semantics between a control's value and a block's data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Operator {
    /// Row value equals the selected value.
    Equals,
    /// Row value is one of the selected values.
    InSet,
    /// Row value lies within `[low, high]`, inclusive.
    Range,
    /// The selected value replaces a chart encoding instead of filtering.
    Override,
}

impl Operator {
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Equals => "equals",
            Self::InSet => "in-set",
            Self::Range => "range",
            Self::Override => "override",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

impl FromStr for Operator {
    type Err = UnboundFilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "==" | "=" | "eq" | "equals" => Ok(Self::Equals),
            "in" | "in-set" | "in_set" => Ok(Self::InSet),
            "between" | "range" => Ok(Self::Range),
            "override" => Ok(Self::Override),
            _ => Err(UnboundFilterError::UnknownOperator {
                keyword: s.trim().to_owned(),
            }),
        }
    }
}

/// `show_when` predicate: the block is visible while `variable <operator> value`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ShowWhen {
    pub variable: String,
    pub operator: Operator,
    pub value: Value,
}

/// `<variable> <op> <value>`. Symbolic operators may touch the variable,
/// keyword operators must be set off by whitespace. Comparison symbols are
/// captured too so they are reported as unknown instead of being misread.
fn predicate_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^\s*([A-Za-z_][\w.\-]*)(?:\s*(==|!=|<>|<=|>=|=|<|>|!)|\s+([A-Za-z_\-]+)\b)\s*(.+?)\s*$",
        )
        .expect("predicate regex is valid")
    })
}

impl ShowWhen {
    pub fn new(
        variable: impl Into<String>,
        operator: Operator,
        value: impl Into<Value>,
    ) -> Result<Self, UnboundFilterError> {
        let show_when = Self {
            variable: variable.into(),
            operator,
            value: value.into(),
        };
        show_when.validate()?;
        Ok(show_when)
    }

    /// Parse `"<variable> <operator> <value>"`.
    ///
    /// ```ignore
    /// ShowWhen::parse("region == 'West'")?;
    /// ShowWhen::parse("year in [2023, 2024]")?;
    /// ShowWhen::parse("price between [10, 20]")?;
    /// ```
    pub fn parse(expr: &str) -> Result<Self, UnboundFilterError> {
        let caps = predicate_regex()
            .captures(expr)
            .ok_or_else(|| UnboundFilterError::Malformed {
                expr: expr.to_owned(),
            })?;

        let keyword = caps.get(2).or_else(|| caps.get(3)).map_or("", |m| m.as_str());
        let operator: Operator = keyword.parse()?;
        Self::new(&caps[1], operator, parse_literal(&caps[4]))
    }

    fn validate(&self) -> Result<(), UnboundFilterError> {
        let invalid = |reason: &str| UnboundFilterError::InvalidValue {
            variable: self.variable.clone(),
            operator: self.operator,
            reason: reason.to_owned(),
        };

        match (self.operator, &self.value) {
            (Operator::Override, _) => Err(invalid("`override` cannot decide visibility")),
            (Operator::InSet, Value::Array(_)) => Ok(()),
            (Operator::InSet, _) => Err(invalid("expected a list of values")),
            (Operator::Range, Value::Array(bounds)) if bounds.len() == 2 => Ok(()),
            (Operator::Range, _) => Err(invalid("expected `[low, high]`")),
            (Operator::Equals, Value::Array(_) | Value::Object(_)) => {
                Err(invalid("expected a single value"))
            }
            (Operator::Equals, _) => Ok(()),
        }
    }
}

/// Interpret the right-hand side of a predicate.
///
/// JSON literals are taken as-is, single-quoted lists are accepted, and
/// anything else is a string with surrounding quotes removed.
fn parse_literal(raw: &str) -> Value {
    let raw = raw.trim();
    if let Ok(value) = serde_json::from_str::<Value>(raw) {
        return value;
    }
    if raw.starts_with('[')
        && let Ok(value) = serde_json::from_str::<Value>(&raw.replace('\'', "\""))
    {
        return value;
    }

    let unquoted = ['\'', '"']
        .iter()
        .find_map(|q| raw.strip_prefix(*q).and_then(|s| s.strip_suffix(*q)))
        .unwrap_or(raw);
    Value::String(unquoted.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_operator_keywords() {
        assert_eq!("==".parse::<Operator>().unwrap(), Operator::Equals);
        assert_eq!("IN".parse::<Operator>().unwrap(), Operator::InSet);
        assert_eq!("between".parse::<Operator>().unwrap(), Operator::Range);
        assert_eq!("override".parse::<Operator>().unwrap(), Operator::Override);
    }

    #[test]
    fn test_unknown_operator_keyword() {
        let err = "like".parse::<Operator>().unwrap_err();
        assert!(matches!(err, UnboundFilterError::UnknownOperator { ref keyword } if keyword == "like"));
    }

    #[test]
    fn test_operator_serde_kebab_case() {
        assert_eq!(serde_json::to_string(&Operator::InSet).unwrap(), r#""in-set""#);
        let op: Operator = serde_json::from_str(r#""range""#).unwrap();
        assert_eq!(op, Operator::Range);
    }

    #[test]
    fn test_parse_equals_quoted_string() {
        let sw = ShowWhen::parse("region == 'West'").unwrap();
        assert_eq!(sw.variable, "region");
        assert_eq!(sw.operator, Operator::Equals);
        assert_eq!(sw.value, json!("West"));
    }

    #[test]
    fn test_parse_without_spaces() {
        let sw = ShowWhen::parse("show_detail==true").unwrap();
        assert_eq!(sw.variable, "show_detail");
        assert_eq!(sw.value, json!(true));
    }

    #[test]
    fn test_parse_bare_string_and_number() {
        assert_eq!(ShowWhen::parse("region = West").unwrap().value, json!("West"));
        assert_eq!(ShowWhen::parse("year equals 2024").unwrap().value, json!(2024));
    }

    #[test]
    fn test_parse_in_set_single_quoted_list() {
        let sw = ShowWhen::parse("region in ['West', 'East']").unwrap();
        assert_eq!(sw.operator, Operator::InSet);
        assert_eq!(sw.value, json!(["West", "East"]));
    }

    #[test]
    fn test_parse_range() {
        let sw = ShowWhen::parse("price between [10, 20.5]").unwrap();
        assert_eq!(sw.operator, Operator::Range);
        assert_eq!(sw.value, json!([10, 20.5]));
    }

    #[test]
    fn test_parse_unknown_operator() {
        let err = ShowWhen::parse("region like 'We%'").unwrap_err();
        assert!(matches!(err, UnboundFilterError::UnknownOperator { .. }));
    }

    #[test]
    fn test_parse_comparison_symbols_are_unknown() {
        for (expr, symbol) in [
            ("region != 'West'", "!="),
            ("price>=10", ">="),
            ("price <= 10", "<="),
            ("price < 10", "<"),
        ] {
            let err = ShowWhen::parse(expr).unwrap_err();
            assert!(
                matches!(err, UnboundFilterError::UnknownOperator { ref keyword } if keyword == symbol),
                "{expr}: {err}"
            );
        }
    }

    #[test]
    fn test_keyword_operator_needs_whitespace() {
        let err = ShowWhen::parse("regionin ['West']").unwrap_err();
        assert!(matches!(err, UnboundFilterError::Malformed { .. }));
    }

    #[test]
    fn test_parse_malformed() {
        let err = ShowWhen::parse("== West").unwrap_err();
        assert!(matches!(err, UnboundFilterError::Malformed { .. }));
    }

    #[test]
    fn test_value_shape_checks() {
        assert!(matches!(
            ShowWhen::parse("region in West").unwrap_err(),
            UnboundFilterError::InvalidValue { .. }
        ));
        assert!(matches!(
            ShowWhen::parse("price range [1, 2, 3]").unwrap_err(),
            UnboundFilterError::InvalidValue { .. }
        ));
        assert!(ShowWhen::new("metric", Operator::Override, "revenue").is_err());
    }
}
