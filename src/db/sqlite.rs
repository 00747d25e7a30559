// Copyright 2026 The symbology Developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use log::debug;
use rusqlite::types::{ToSqlOutput, ValueRef};
use rusqlite::{params_from_iter, ToSql};

use super::{Connection, ConnectionProvider, Row, SqlValue};
use crate::error::DbError;

/// Opens SQLite databases by connection id.
#[derive(Clone, Debug, Default)]
pub struct SqliteProvider {
    paths: HashMap<String, PathBuf>,
}

impl SqliteProvider {
    #[allow(missing_docs)]
    pub fn new() -> Self {
        SqliteProvider::default()
    }

    /// Registers a database file under `id`.
    pub fn add_connection<P: AsRef<Path>>(&mut self, id: &str, path: P) {
        self.paths.insert(id.to_string(), path.as_ref().to_path_buf());
    }
}

impl ConnectionProvider for SqliteProvider {
    fn connection(&self, id: &str) -> Result<Box<dyn Connection>, DbError> {
        let path = self.paths.get(id).ok_or_else(|| DbError::UnknownConnection(id.to_string()))?;
        debug!("Opening '{}'.", path.display());
        let conn = rusqlite::Connection::open(path)?;
        Ok(Box::new(conn))
    }
}

impl ToSql for SqlValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput> {
        Ok(match *self {
            SqlValue::Null(_) => ToSqlOutput::Borrowed(ValueRef::Null),
            SqlValue::Int(v) => ToSqlOutput::from(v),
            SqlValue::Double(v) => ToSqlOutput::from(v),
            SqlValue::Text(ref v) => ToSqlOutput::Borrowed(ValueRef::Text(v.as_bytes())),
            SqlValue::Bool(v) => ToSqlOutput::from(v),
        })
    }
}

fn to_row(row: &rusqlite::Row) -> Result<Row, DbError> {
    let stmt = row.as_ref();
    let mut res = Row::new();
    for i in 0..stmt.column_count() {
        let name = stmt.column_name(i)?;
        let value = match row.get_ref(i)? {
            ValueRef::Null => None,
            ValueRef::Integer(v) => Some(SqlValue::from_i64(v)),
            ValueRef::Real(v) => Some(SqlValue::Double(v)),
            ValueRef::Text(v) | ValueRef::Blob(v) => {
                Some(SqlValue::Text(String::from_utf8_lossy(v).into_owned()))
            }
        };
        res.push(name, value);
    }

    Ok(res)
}

impl Connection for rusqlite::Connection {
    fn select_one(&mut self, sql: &str, params: &[SqlValue]) -> Result<Option<Row>, DbError> {
        debug!("Running '{}'.", sql);
        let mut stmt = self.prepare(sql)?;
        let mut rows = stmt.query(params_from_iter(params.iter()))?;
        let row = match rows.next()? {
            Some(row) => Some(to_row(row)?),
            None => None,
        };

        Ok(row)
    }

    fn insert_returning_id(&mut self, sql: &str, params: &[SqlValue]) -> Result<i32, DbError> {
        match self.select_one(sql, params)?.and_then(|r| r.get_i32("id")) {
            Some(id) => Ok(id),
            None => Err(DbError::NoRows),
        }
    }

    fn execute(&mut self, sql: &str, params: &[SqlValue]) -> Result<u64, DbError> {
        debug!("Running '{}'.", sql);
        let n = rusqlite::Connection::execute(self, sql, params_from_iter(params.iter()))?;
        Ok(n as u64)
    }

    fn begin(&mut self) -> Result<(), DbError> {
        self.execute_batch("BEGIN")?;
        Ok(())
    }

    fn commit(&mut self) -> Result<(), DbError> {
        self.execute_batch("COMMIT")?;
        Ok(())
    }
}
