// Copyright 2026 The symbology Developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Relational storage of styles.
//!
//! Simple styles are stored as rows of the component tables
//! (`graphics`, `strokes`, `fills`, `fonts`, `lineplacements`, `halos`,
//! `points`, `lines`, `polygons`, `texts`) referenced from a `styles` row.
//! Everything else is stored as the original XML in `styles.sld`.
//!
//! All statements use `$n` placeholders.

use std::convert::TryFrom;
use std::fmt;

pub use self::reader::StyleReader;
pub use self::writer::StyleWriter;

#[cfg(feature = "postgres")]
pub use self::pg::PostgresProvider;
#[cfg(feature = "sqlite")]
pub use self::sqlite::SqliteProvider;

mod reader;
mod writer;
#[cfg(feature = "postgres")]
mod pg;
#[cfg(feature = "sqlite")]
mod sqlite;

use crate::error::DbError;

/// A column type, used for typed `NULL` values.
#[derive(Clone, Copy, PartialEq, Debug)]
#[allow(missing_docs)]
pub enum SqlType {
    Int,
    Double,
    Text,
    Bool,
}

/// A statement parameter or a column value.
#[derive(Clone, PartialEq, Debug)]
#[allow(missing_docs)]
pub enum SqlValue {
    Null(SqlType),
    Int(i32),
    Double(f64),
    Text(String),
    Bool(bool),
}

impl SqlValue {
    /// Returns an integer or an integer `NULL`.
    pub fn opt_int(v: Option<i32>) -> SqlValue {
        v.map(SqlValue::Int).unwrap_or(SqlValue::Null(SqlType::Int))
    }

    /// Returns a double or a double `NULL`.
    pub fn opt_double(v: Option<f64>) -> SqlValue {
        v.map(SqlValue::Double).unwrap_or(SqlValue::Null(SqlType::Double))
    }

    /// Converts a backend integer.
    ///
    /// Values outside of the `i32` range are kept as doubles,
    /// so `Row::get_i32` rejects them.
    pub(crate) fn from_i64(v: i64) -> SqlValue {
        match i32::try_from(v) {
            Ok(v) => SqlValue::Int(v),
            Err(_) => SqlValue::Double(v as f64),
        }
    }

    /// Returns a text or a text `NULL`.
    pub fn opt_text<S: Into<String>>(v: Option<S>) -> SqlValue {
        v.map(|s| SqlValue::Text(s.into())).unwrap_or(SqlValue::Null(SqlType::Text))
    }
}

impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            SqlValue::Null(_) => write!(f, "NULL"),
            SqlValue::Int(v) => write!(f, "{}", v),
            SqlValue::Double(v) => write!(f, "{}", v),
            SqlValue::Text(ref v) => write!(f, "'{}'", v),
            SqlValue::Bool(v) => write!(f, "{}", v),
        }
    }
}


/// A result row.
///
/// Getters return `None` for absent and `NULL` columns.
#[derive(Clone, PartialEq, Debug, Default)]
pub struct Row {
    columns: Vec<(String, Option<SqlValue>)>,
}

impl Row {
    #[allow(missing_docs)]
    pub fn new() -> Self {
        Row::default()
    }

    /// Appends a column. `None` means `NULL`.
    pub fn push(&mut self, name: &str, value: Option<SqlValue>) {
        self.columns.push((name.to_string(), value));
    }

    /// Returns a column value by name.
    pub fn get(&self, name: &str) -> Option<&SqlValue> {
        self.columns
            .iter()
            .find(|c| c.0.eq_ignore_ascii_case(name))
            .and_then(|c| c.1.as_ref())
    }

    /// Returns an integer.
    ///
    /// Doubles are accepted only when they hold an exact `i32` value.
    pub fn get_i32(&self, name: &str) -> Option<i32> {
        match *self.get(name)? {
            SqlValue::Int(v) => Some(v),
            SqlValue::Double(v) => {
                if v.fract() == 0.0 && v >= f64::from(i32::MIN) && v <= f64::from(i32::MAX) {
                    Some(v as i32)
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    #[allow(missing_docs)]
    pub fn get_f64(&self, name: &str) -> Option<f64> {
        match *self.get(name)? {
            SqlValue::Double(v) => Some(v),
            SqlValue::Int(v) => Some(v as f64),
            _ => None,
        }
    }

    #[allow(missing_docs)]
    pub fn get_str(&self, name: &str) -> Option<&str> {
        match *self.get(name)? {
            SqlValue::Text(ref v) => Some(v),
            _ => None,
        }
    }

    /// Returns a boolean. Integers are treated as C booleans.
    pub fn get_bool(&self, name: &str) -> Option<bool> {
        match *self.get(name)? {
            SqlValue::Bool(v) => Some(v),
            SqlValue::Int(v) => Some(v != 0),
            _ => None,
        }
    }
}


/// A database connection.
pub trait Connection {
    /// Runs a query and returns its first row, if any.
    fn select_one(&mut self, sql: &str, params: &[SqlValue]) -> Result<Option<Row>, DbError>;

    /// Runs an `insert ... returning id` statement.
    fn insert_returning_id(&mut self, sql: &str, params: &[SqlValue]) -> Result<i32, DbError>;

    /// Runs a statement and returns the number of affected rows.
    fn execute(&mut self, sql: &str, params: &[SqlValue]) -> Result<u64, DbError>;

    /// Starts a transaction.
    fn begin(&mut self) -> Result<(), DbError>;

    /// Commits the current transaction.
    fn commit(&mut self) -> Result<(), DbError>;
}

/// Opens connections by id.
///
/// Each top level reader and writer call opens a new connection and
/// drops it before returning.
pub trait ConnectionProvider: Send + Sync {
    #[allow(missing_docs)]
    fn connection(&self, id: &str) -> Result<Box<dyn Connection>, DbError>;
}

/// Qualifies a table name with a schema.
fn table(schema: Option<&str>, name: &str) -> String {
    match schema {
        Some(schema) => format!("{}.{}", schema, name),
        None => name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_getters_1() {
        let mut row = Row::new();
        row.push("size", Some(SqlValue::Double(8.0)));
        row.push("fill_id", Some(SqlValue::Int(3)));
        row.push("bold", Some(SqlValue::Int(1)));
        row.push("color", None);

        assert_eq!(row.get_f64("size"), Some(8.0));
        assert_eq!(row.get_i32("FILL_ID"), Some(3));
        assert_eq!(row.get_bool("bold"), Some(true));
        assert_eq!(row.get_str("color"), None);
        assert_eq!(row.get_str("missing"), None);
    }

    #[test]
    fn row_getters_2() {
        let mut row = Row::new();
        row.push("a", Some(SqlValue::Double(7.0)));
        row.push("b", Some(SqlValue::Double(7.9)));
        row.push("c", Some(SqlValue::Double(1e12)));
        row.push("d", Some(SqlValue::Double(::std::f64::NAN)));
        row.push("e", Some(SqlValue::from_i64(42)));
        row.push("f", Some(SqlValue::from_i64(1 << 40)));

        assert_eq!(row.get_i32("a"), Some(7));
        assert_eq!(row.get_i32("b"), None);
        assert_eq!(row.get_i32("c"), None);
        assert_eq!(row.get_i32("d"), None);
        assert_eq!(row.get_i32("e"), Some(42));
        assert_eq!(row.get_i32("f"), None);
    }

    #[test]
    fn table_1() {
        assert_eq!(table(None, "fills"), "fills");
        assert_eq!(table(Some("styles"), "fills"), "styles.fills");
    }
}
