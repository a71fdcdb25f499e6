//! Tabular data referenced by blocks.
//!
//! Tables are plain column/row structures. They are loaded before compilation
//! and only read during it: the compiler uses them for schema checks, metric
//! aggregates, static table markup and the JSON files shipped to the browser.

use crate::{config::ConfigError, utils::slug::is_valid_id};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{collections::BTreeMap, fs, path::Path};

/// A column-oriented table with row-major cell storage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Table {
    pub columns: Vec<String>,
    #[serde(default)]
    pub rows: Vec<Vec<Value>>,
}

impl Table {
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Append a row. Cell count is checked by [`Table::validate`].
    pub fn row<I, V>(mut self, cells: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.rows.push(cells.into_iter().map(Into::into).collect());
        self
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// All values of one column, in row order.
    pub fn column(&self, name: &str) -> Option<impl Iterator<Item = &Value>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().filter_map(move |row| row.get(idx)))
    }

    /// Distinct values of a column in first-seen order.
    pub fn distinct(&self, name: &str) -> Vec<Value> {
        let mut seen: Vec<Value> = Vec::new();
        if let Some(values) = self.column(name) {
            for value in values {
                if !seen.contains(value) {
                    seen.push(value.clone());
                }
            }
        }
        seen
    }

    pub fn validate(&self, name: &str) -> Result<(), ConfigError> {
        if self.columns.is_empty() {
            return Err(ConfigError::data(name, "table has no columns"));
        }
        for (i, row) in self.rows.iter().enumerate() {
            if row.len() != self.columns.len() {
                return Err(ConfigError::data(
                    name,
                    format!(
                        "row {} has {} cells, expected {}",
                        i + 1,
                        row.len(),
                        self.columns.len()
                    ),
                ));
            }
        }
        Ok(())
    }

    /// Records form used by the browser runtime: `[{column: value, ...}]`.
    pub fn to_records(&self) -> Value {
        Value::Array(
            self.rows
                .iter()
                .map(|row| {
                    Value::Object(
                        self.columns
                            .iter()
                            .cloned()
                            .zip(row.iter().cloned())
                            .collect(),
                    )
                })
                .collect(),
        )
    }

    /// Build a table from a JSON array of records.
    ///
    /// Columns are taken from the first record, then extended by keys that
    /// appear later. Missing cells become `null`.
    pub fn from_records(name: &str, records: &[Value]) -> Result<Self, ConfigError> {
        let mut columns: Vec<String> = Vec::new();
        for record in records {
            let object = record
                .as_object()
                .ok_or_else(|| ConfigError::data(name, "records must be JSON objects"))?;
            for key in object.keys() {
                if !columns.contains(key) {
                    columns.push(key.clone());
                }
            }
        }

        let rows = records
            .iter()
            .filter_map(Value::as_object)
            .map(|object| {
                columns
                    .iter()
                    .map(|c| object.get(c).cloned().unwrap_or(Value::Null))
                    .collect()
            })
            .collect();

        Ok(Self { columns, rows })
    }
}

/// A block's reference to its data: a registered name or an inline table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DataRef {
    Named(String),
    Inline(Table),
}

impl From<&str> for DataRef {
    fn from(name: &str) -> Self {
        Self::Named(name.to_owned())
    }
}

impl From<Table> for DataRef {
    fn from(table: Table) -> Self {
        Self::Inline(table)
    }
}

impl DataRef {
    /// Resolve the table behind this reference, if the provider knows it.
    pub fn resolve<'a>(&'a self, provider: &'a dyn DataProvider) -> Option<&'a Table> {
        match self {
            Self::Named(name) => provider.table(name),
            Self::Inline(table) => Some(table),
        }
    }
}

/// Source of named tables.
pub trait DataProvider {
    fn table(&self, name: &str) -> Option<&Table>;
}

/// Named tables, kept in name order so generated output is stable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataSources {
    tables: BTreeMap<String, Table>,
}

impl DataSources {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `table` under `name`.
    ///
    /// The name becomes a file name under the asset folder, so it must be a
    /// valid block id (no path separators, dots or spaces).
    pub fn insert(&mut self, name: impl Into<String>, table: Table) -> Result<(), ConfigError> {
        let name = name.into();
        if !is_valid_id(&name) {
            return Err(ConfigError::data(
                &name,
                "name must start with a letter and may not contain spaces, `/`, `.` or other punctuation",
            ));
        }
        table.validate(&name)?;
        self.tables.insert(name, table);
        Ok(())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Load a JSON file holding either `[{...}, ...]` records or a
    /// `{"columns": [...], "rows": [[...]]}` table.
    pub fn load_json(&mut self, name: &str, path: &Path) -> Result<(), ConfigError> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;
        let value: Value = serde_json::from_str(&content)
            .map_err(|err| ConfigError::data(name, format!("invalid JSON: {err}")))?;

        let table = match value {
            Value::Array(records) => Table::from_records(name, &records)?,
            object @ Value::Object(_) => serde_json::from_value(object)
                .map_err(|err| ConfigError::data(name, format!("invalid table: {err}")))?,
            _ => return Err(ConfigError::data(name, "expected an array or an object")),
        };

        self.insert(name, table)
    }
}

impl DataProvider for DataSources {
    fn table(&self, name: &str) -> Option<&Table> {
        self.tables.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sales() -> Table {
        Table::new(["region", "revenue"])
            .row([json!("West"), json!(10)])
            .row([json!("East"), json!(7)])
            .row([json!("West"), json!(3)])
    }

    #[test]
    fn test_distinct_keeps_first_seen_order() {
        assert_eq!(sales().distinct("region"), [json!("West"), json!("East")]);
        assert!(sales().distinct("missing").is_empty());
    }

    #[test]
    fn test_validate_ragged_rows() {
        let table = Table::new(["a", "b"]).row([json!(1)]);
        let err = table.validate("t").unwrap_err();
        assert!(err.to_string().contains("row 1 has 1 cells, expected 2"));
    }

    #[test]
    fn test_to_records() {
        let records = sales().to_records();
        assert_eq!(records[0], json!({"region": "West", "revenue": 10}));
        assert_eq!(records.as_array().unwrap().len(), 3);
    }

    #[test]
    fn test_from_records_fills_missing_cells() {
        let table =
            Table::from_records("t", &[json!({"a": 1}), json!({"a": 2, "b": "x"})]).unwrap();
        assert_eq!(table.columns, ["a", "b"]);
        assert_eq!(table.rows[0], [json!(1), Value::Null]);
    }

    #[test]
    fn test_data_ref_untagged() {
        let named: DataRef = serde_json::from_value(json!("sales")).unwrap();
        assert_eq!(named, DataRef::Named("sales".into()));

        let inline: DataRef =
            serde_json::from_value(json!({"columns": ["x"], "rows": [[1]]})).unwrap();
        assert!(matches!(inline, DataRef::Inline(ref t) if t.has_column("x")));
    }

    #[test]
    fn test_resolve_through_provider() {
        let mut sources = DataSources::new();
        sources.insert("sales", sales()).unwrap();

        assert!(DataRef::from("sales").resolve(&sources).is_some());
        assert!(DataRef::from("nope").resolve(&sources).is_none());
    }

    #[test]
    fn test_load_json_records_and_table() {
        let dir = tempfile::tempdir().unwrap();
        let records = dir.path().join("records.json");
        fs::write(&records, r#"[{"month": "Jan", "n": 1}, {"month": "Feb", "n": 2}]"#).unwrap();
        let table = dir.path().join("table.json");
        fs::write(&table, r#"{"columns": ["k"], "rows": [["a"], ["b"]]}"#).unwrap();

        let mut sources = DataSources::new();
        sources.load_json("records", &records).unwrap();
        sources.load_json("table", &table).unwrap();

        assert_eq!(sources.table("records").unwrap().rows.len(), 2);
        assert_eq!(sources.table("table").unwrap().columns, ["k"]);
        assert_eq!(sources.names().collect::<Vec<_>>(), ["records", "table"]);
    }

    #[test]
    fn test_insert_rejects_path_like_names() {
        let mut sources = DataSources::new();
        for name in ["../../escape", "a/b", "sales.v2", "", "has space", "1st"] {
            let err = sources.insert(name, sales()).unwrap_err();
            assert!(matches!(err, ConfigError::Data { .. }), "{name}: {err}");
        }
        assert!(sources.is_empty());

        sources.insert("index--chart-1", sales()).unwrap();
        assert_eq!(sources.len(), 1);
    }

    #[test]
    fn test_load_json_missing_file() {
        let mut sources = DataSources::new();
        let err = sources
            .load_json("x", Path::new("/definitely/not/here.json"))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Io(..)));
    }
}
