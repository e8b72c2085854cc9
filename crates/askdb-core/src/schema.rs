//! Table and column metadata fed to the language model.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One column of a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSchema {
    /// Column name.
    pub name: String,
    /// Declared type, e.g. `int` or `varchar(255)`.
    pub data_type: String,
}

/// One table and its columns in ordinal order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    /// Table name.
    pub name: String,
    /// Columns in ordinal order.
    pub columns: Vec<ColumnSchema>,
}

/// Every table of the connected database.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaMetadata {
    /// Tables in name order.
    pub tables: Vec<TableSchema>,
}

impl SchemaMetadata {
    /// Build from `(table, column, type)` triples already sorted by table.
    pub fn from_columns<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = (S, S, S)>,
        S: Into<String>,
    {
        let mut tables: Vec<TableSchema> = Vec::new();
        for (table, column, data_type) in columns {
            let table = table.into();
            let column = ColumnSchema {
                name: column.into(),
                data_type: data_type.into(),
            };
            match tables.last_mut() {
                Some(last) if last.name == table => last.columns.push(column),
                _ => tables.push(TableSchema {
                    name: table,
                    columns: vec![column],
                }),
            }
        }
        Self { tables }
    }
}

impl fmt::Display for SchemaMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for table in &self.tables {
            writeln!(f)?;
            writeln!(f, "Table: {}", table.name)?;
            for column in &table.columns {
                writeln!(f, "  - {} ({})", column.name, column.data_type)?;
            }
        }
        Ok(())
    }
}
