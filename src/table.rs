use std::collections::HashSet;
use std::io;

use serde_json::{Map, Value};

/// A row type with a fixed, once-declared column layout.
pub trait TableRow {
    const COLUMNS: &'static [&'static str];

    fn into_cells(self) -> Vec<Value>;
}

/// Row-oriented table of JSON cells. Missing cells are `Value::Null`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    pub const fn empty() -> Self {
        Self {
            columns: Vec::new(),
            rows: Vec::new(),
        }
    }

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

    pub fn from_rows<R: TableRow>(rows: impl IntoIterator<Item = R>) -> Self {
        let mut table = Table::new(R::COLUMNS.iter().copied());
        for row in rows {
            table.push_row(row.into_cells());
        }
        table
    }

    /// Builds a table from JSON objects; columns appear in first-seen order.
    pub fn from_maps(maps: impl IntoIterator<Item = Map<String, Value>>) -> Self {
        let maps: Vec<Map<String, Value>> = maps.into_iter().collect();
        let mut columns: Vec<String> = Vec::new();
        for map in &maps {
            for key in map.keys() {
                if !columns.contains(key) {
                    columns.push(key.clone());
                }
            }
        }
        let rows = maps
            .into_iter()
            .map(|mut map| {
                columns
                    .iter()
                    .map(|column| map.remove(column).unwrap_or(Value::Null))
                    .collect()
            })
            .collect();
        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    pub fn cell(&self, row: usize, column: &str) -> Option<&Value> {
        let index = self.column_index(column)?;
        self.rows.get(row).and_then(|cells| cells.get(index))
    }

    pub fn column(&self, name: &str) -> Vec<&Value> {
        match self.column_index(name) {
            Some(index) => self.rows.iter().filter_map(|row| row.get(index)).collect(),
            None => Vec::new(),
        }
    }

    /// Appends a row, padding with nulls or truncating to the column count.
    pub fn push_row(&mut self, mut cells: Vec<Value>) {
        cells.resize(self.columns.len(), Value::Null);
        self.rows.push(cells);
    }

    /// Stacks tables vertically over the union of their columns.
    pub fn concat(tables: impl IntoIterator<Item = Table>) -> Table {
        let tables: Vec<Table> = tables.into_iter().collect();
        let mut columns: Vec<String> = Vec::new();
        for table in &tables {
            for column in &table.columns {
                if !columns.contains(column) {
                    columns.push(column.clone());
                }
            }
        }

        let mut out = Table::new(columns);
        for table in tables {
            let mapping: Vec<Option<usize>> = out
                .columns
                .iter()
                .map(|column| table.column_index(column))
                .collect();
            for row in table.rows {
                let cells = mapping
                    .iter()
                    .map(|index| {
                        index
                            .and_then(|index| row.get(index).cloned())
                            .unwrap_or(Value::Null)
                    })
                    .collect();
                out.rows.push(cells);
            }
        }
        out
    }

    /// Left join on `on`: every left row is kept and repeated once per
    /// matching right row; unmatched rows get null right-hand cells. Null keys
    /// never match. Right columns clashing with left ones get a `_right` suffix.
    pub fn left_join(&self, right: &Table, on: &str) -> Table {
        let Some(left_key) = self.column_index(on) else {
            return self.clone();
        };
        let right_key = right.column_index(on);
        let right_columns: Vec<(usize, String)> = right
            .columns
            .iter()
            .enumerate()
            .filter(|(index, _)| Some(*index) != right_key)
            .map(|(index, name)| {
                let name = if self.columns.contains(name) {
                    format!("{name}_right")
                } else {
                    name.clone()
                };
                (index, name)
            })
            .collect();

        let mut columns = self.columns.clone();
        columns.extend(right_columns.iter().map(|(_, name)| name.clone()));
        let mut out = Table::new(columns);

        for row in &self.rows {
            let key = &row[left_key];
            let matches: Vec<&Vec<Value>> = match right_key {
                Some(right_key) if !key.is_null() => right
                    .rows
                    .iter()
                    .filter(|candidate| candidate.get(right_key) == Some(key))
                    .collect(),
                _ => Vec::new(),
            };

            if matches.is_empty() {
                let mut cells = row.clone();
                cells.extend(right_columns.iter().map(|_| Value::Null));
                out.rows.push(cells);
                continue;
            }
            for matched in matches {
                let mut cells = row.clone();
                cells.extend(
                    right_columns
                        .iter()
                        .map(|(index, _)| matched.get(*index).cloned().unwrap_or(Value::Null)),
                );
                out.rows.push(cells);
            }
        }
        out
    }

    /// Removes exact duplicate rows, keeping the first occurrence.
    pub fn dedup(&mut self) {
        let mut seen = HashSet::new();
        self.rows
            .retain(|row| seen.insert(Value::Array(row.clone()).to_string()));
    }

    /// Moves the named columns, when present, to the end in the given order.
    pub fn with_trailing_columns(self, names: &[&str]) -> Table {
        let mut order: Vec<usize> = (0..self.columns.len())
            .filter(|index| !names.contains(&self.columns[*index].as_str()))
            .collect();
        order.extend(names.iter().filter_map(|name| self.column_index(name)));

        let columns = order.iter().map(|index| self.columns[*index].clone()).collect();
        let rows = self
            .rows
            .into_iter()
            .map(|row| order.iter().map(|index| row[*index].clone()).collect())
            .collect();
        Table { columns, rows }
    }

    /// Replaces a column-less table by an empty one with the given header.
    pub fn or_columns(self, columns: &[&str]) -> Table {
        if self.columns.is_empty() {
            Table::new(columns.iter().copied())
        } else {
            self
        }
    }

    pub fn write_csv<W: io::Write>(&self, writer: W) -> Result<(), csv::Error> {
        let mut writer = csv::WriterBuilder::new().from_writer(writer);
        if self.columns.is_empty() {
            writer.flush()?;
            return Ok(());
        }
        writer.write_record(&self.columns)?;
        for row in &self.rows {
            writer.write_record(row.iter().map(render_cell))?;
        }
        writer.flush()?;
        Ok(())
    }
}

/// Text form of a cell in delimited output.
pub fn render_cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        Value::Bool(flag) => flag.to_string(),
        Value::Number(number) => number.to_string(),
        Value::Array(items) if items.iter().all(is_scalar) => items
            .iter()
            .map(render_cell)
            .collect::<Vec<_>>()
            .join("; "),
        other => other.to_string(),
    }
}

fn is_scalar(value: &Value) -> bool {
    !matches!(value, Value::Array(_) | Value::Object(_))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn render_joins_scalar_lists() {
        assert_eq!(render_cell(&json!(["NRPS", "T1PKS"])), "NRPS; T1PKS");
        assert_eq!(render_cell(&Value::Null), "");
        assert_eq!(render_cell(&json!(0.5)), "0.5");
        assert_eq!(render_cell(&json!([{"a": 1}])), "[{\"a\":1}]");
    }

    #[test]
    fn push_row_pads_short_rows() {
        let mut table = Table::new(["a", "b"]);
        table.push_row(vec![json!(1)]);
        assert_eq!(table.cell(0, "b"), Some(&Value::Null));
    }
}
