//! Structural conversion between `toml::Value` and `toml_edit` items.
//!
//! Bindings work with the plain [`toml::Value`] model; the commented document
//! keeps a [`toml_edit::DocumentMut`]. Going through the structure (rather
//! than re-parsing rendered strings) keeps datetimes and key order intact.

use toml_edit::{Array, InlineTable, Item, Table};

/// Convert to a `toml_edit` value. Tables become inline tables.
pub fn to_edit_value(value: &toml::Value) -> toml_edit::Value {
    match value {
        toml::Value::String(s) => toml_edit::Value::from(s.as_str()),
        toml::Value::Integer(i) => toml_edit::Value::from(*i),
        toml::Value::Float(f) => toml_edit::Value::from(*f),
        toml::Value::Boolean(b) => toml_edit::Value::from(*b),
        toml::Value::Datetime(d) => toml_edit::Value::from(*d),
        toml::Value::Array(items) => {
            toml_edit::Value::Array(items.iter().map(to_edit_value).collect::<Array>())
        }
        toml::Value::Table(t) => toml_edit::Value::InlineTable(
            t.iter()
                .map(|(k, v)| (k.as_str(), to_edit_value(v)))
                .collect::<InlineTable>(),
        ),
    }
}

/// Convert to a standard (header-style) table; nested tables become
/// sub-tables, everything else is a plain value.
pub fn to_edit_table(table: &toml::Table) -> Table {
    let mut out = Table::new();
    for (key, value) in table {
        let item = match value {
            toml::Value::Table(t) => Item::Table(to_edit_table(t)),
            other => Item::Value(to_edit_value(other)),
        };
        out.insert(key, item);
    }
    out
}

pub fn from_edit_value(value: &toml_edit::Value) -> toml::Value {
    match value {
        toml_edit::Value::String(s) => toml::Value::String(s.value().clone()),
        toml_edit::Value::Integer(i) => toml::Value::Integer(*i.value()),
        toml_edit::Value::Float(f) => toml::Value::Float(*f.value()),
        toml_edit::Value::Boolean(b) => toml::Value::Boolean(*b.value()),
        toml_edit::Value::Datetime(d) => toml::Value::Datetime(*d.value()),
        toml_edit::Value::Array(items) => {
            toml::Value::Array(items.iter().map(from_edit_value).collect())
        }
        toml_edit::Value::InlineTable(t) => toml::Value::Table(
            t.iter()
                .map(|(k, v)| (k.to_string(), from_edit_value(v)))
                .collect(),
        ),
    }
}

pub fn from_edit_table(table: &Table) -> toml::Table {
    table
        .iter()
        .filter_map(|(k, item)| from_edit_item(item).map(|v| (k.to_string(), v)))
        .collect()
}

/// `None` for an empty slot.
pub fn from_edit_item(item: &Item) -> Option<toml::Value> {
    match item {
        Item::None => None,
        Item::Value(v) => Some(from_edit_value(v)),
        Item::Table(t) => Some(toml::Value::Table(from_edit_table(t))),
        Item::ArrayOfTables(tables) => Some(toml::Value::Array(
            tables
                .iter()
                .map(|t| toml::Value::Table(from_edit_table(t)))
                .collect(),
        )),
    }
}
