// birdidq-core/src/domain/table.rs

use serde::{Deserialize, Serialize};
use std::fmt;

/// Engine-independent description of a column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSchema {
    pub name: String,
    pub data_type: String,
    pub is_nullable: bool,
}

impl ColumnSchema {
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            is_nullable: true,
        }
    }
}

/// Broad type family of a declared SQL type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeFamily {
    Integer,
    Float,
    Boolean,
    Text,
}

impl TypeFamily {
    /// Maps a declared SQL type (DuckDB, PostgreSQL or Oracle spelling) to its family.
    pub fn from_sql(declared: &str) -> Self {
        let t = declared.trim().to_ascii_uppercase();
        let base = t.split(['(', ' ']).next().unwrap_or("");
        match base {
            "TINYINT" | "SMALLINT" | "INTEGER" | "INT" | "INT2" | "INT4" | "INT8" | "BIGINT"
            | "HUGEINT" | "UTINYINT" | "USMALLINT" | "UINTEGER" | "UBIGINT" | "SERIAL"
            | "BIGSERIAL" => TypeFamily::Integer,
            "DOUBLE" | "FLOAT" | "FLOAT4" | "FLOAT8" | "REAL" | "DECIMAL" | "NUMERIC"
            | "NUMBER" | "BINARY_DOUBLE" | "BINARY_FLOAT" => TypeFamily::Float,
            "BOOLEAN" | "BOOL" => TypeFamily::Boolean,
            _ => TypeFamily::Text,
        }
    }

    /// Maps a user-facing type name (`int`, `float64`, `str`, `VARCHAR`...) to its family.
    pub fn from_type_name(name: &str) -> Option<Self> {
        let n = name.trim().to_ascii_lowercase();
        match n.as_str() {
            "int" | "int8" | "int16" | "int32" | "int64" | "integer" | "bigint" | "smallint"
            | "long" => Some(TypeFamily::Integer),
            "float" | "float16" | "float32" | "float64" | "double" | "decimal" | "numeric"
            | "real" | "number" => Some(TypeFamily::Float),
            "bool" | "boolean" => Some(TypeFamily::Boolean),
            "str" | "string" | "object" | "text" | "varchar" | "char" | "varchar2" => {
                Some(TypeFamily::Text)
            }
            _ => None,
        }
    }
}

/// A single cell value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Value {
    /// Builds a typed value from its textual rendering and the column's declared type.
    /// Values that do not parse under the declared type stay as text.
    pub fn coerce(raw: Option<String>, declared_type: &str) -> Value {
        let Some(raw) = raw else {
            return Value::Null;
        };
        match TypeFamily::from_sql(declared_type) {
            TypeFamily::Integer => raw
                .trim()
                .parse::<i64>()
                .map(Value::Int)
                .or_else(|_| raw.trim().parse::<f64>().map(Value::Float))
                .unwrap_or(Value::Text(raw)),
            TypeFamily::Float => raw
                .trim()
                .parse::<f64>()
                .map(Value::Float)
                .unwrap_or(Value::Text(raw)),
            TypeFamily::Boolean => match raw.trim().to_ascii_lowercase().as_str() {
                "true" | "t" | "1" | "yes" => Value::Bool(true),
                "false" | "f" | "0" | "no" => Value::Bool(false),
                _ => Value::Text(raw),
            },
            TypeFamily::Text => Value::Text(raw),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn family(&self) -> Option<TypeFamily> {
        match self {
            Value::Null => None,
            Value::Bool(_) => Some(TypeFamily::Boolean),
            Value::Int(_) => Some(TypeFamily::Integer),
            Value::Float(_) => Some(TypeFamily::Float),
            Value::Text(_) => Some(TypeFamily::Text),
        }
    }

    /// Textual form used by regex, length and set comparisons.
    pub fn to_text(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Bool(b) => b.to_string(),
            Value::Int(i) => i.to_string(),
            Value::Float(f) => f.to_string(),
            Value::Text(s) => s.clone(),
        }
    }

    /// Canonical key for distinct/duplicate counting. `5` and `5.0` collide.
    pub fn key(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Bool(b) => format!("b:{b}"),
            Value::Int(i) => format!("n:{i}"),
            Value::Float(f) if f.fract() == 0.0 && f.abs() < 9.0e15 => format!("n:{}", *f as i64),
            Value::Float(f) => format!("n:{f}"),
            Value::Text(s) => format!("s:{s}"),
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            other => write!(f, "{}", other.to_text()),
        }
    }
}

/// In-memory snapshot of a dataset.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Table {
    pub name: String,
    pub columns: Vec<ColumnSchema>,
    pub rows: Vec<Vec<Value>>,
}

impl Table {
    pub fn new(name: impl Into<String>, columns: Vec<ColumnSchema>) -> Self {
        Self {
            name: name.into(),
            columns,
            rows: Vec::new(),
        }
    }

    pub fn with_rows(mut self, rows: Vec<Vec<Value>>) -> Self {
        self.rows = rows;
        self
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    /// Case-sensitive lookup, the way the generated statements must reference columns.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn column_values(&self, index: usize) -> impl Iterator<Item = &Value> {
        self.rows.iter().map(move |row| row.get(index).unwrap_or(&Value::Null))
    }

    /// First `limit` rows, used for previews.
    pub fn head(&self, limit: usize) -> Table {
        Table {
            name: self.name.clone(),
            columns: self.columns.clone(),
            rows: self.rows.iter().take(limit).cloned().collect(),
        }
    }
}
