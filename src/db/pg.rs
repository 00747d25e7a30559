// Copyright 2026 The symbology Developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use std::collections::HashMap;

use log::debug;
use postgres::types::{ToSql, Type};
use postgres::{Client, Config, NoTls};

use super::{Connection, ConnectionProvider, Row, SqlType, SqlValue};
use crate::error::DbError;

/// Opens PostgreSQL connections by connection id.
#[derive(Clone, Debug, Default)]
pub struct PostgresProvider {
    configs: HashMap<String, Config>,
}

impl PostgresProvider {
    #[allow(missing_docs)]
    pub fn new() -> Self {
        PostgresProvider::default()
    }

    /// Registers connection parameters under `id`.
    ///
    /// `params` is either a `key=value` string or a `postgresql://` URL.
    pub fn add_connection(&mut self, id: &str, params: &str) -> Result<(), DbError> {
        let config = params.parse::<Config>()?;
        self.configs.insert(id.to_string(), config);
        Ok(())
    }
}

impl ConnectionProvider for PostgresProvider {
    fn connection(&self, id: &str) -> Result<Box<dyn Connection>, DbError> {
        let config = self.configs.get(id).ok_or_else(|| DbError::UnknownConnection(id.to_string()))?;
        let client = config.connect(NoTls)?;
        Ok(Box::new(client))
    }
}

type Param = Box<dyn ToSql + Sync>;

fn to_param(value: &SqlValue) -> Param {
    match *value {
        SqlValue::Null(SqlType::Int) => Box::new(None::<i32>),
        SqlValue::Null(SqlType::Double) => Box::new(None::<f64>),
        SqlValue::Null(SqlType::Text) => Box::new(None::<String>),
        SqlValue::Null(SqlType::Bool) => Box::new(None::<bool>),
        SqlValue::Int(v) => Box::new(v),
        SqlValue::Double(v) => Box::new(v),
        SqlValue::Text(ref v) => Box::new(v.clone()),
        SqlValue::Bool(v) => Box::new(v),
    }
}

fn to_row(row: &postgres::Row) -> Result<Row, DbError> {
    let mut res = Row::new();
    for (i, column) in row.columns().iter().enumerate() {
        let ty = column.type_();
        let value = if *ty == Type::INT4 {
            row.try_get::<_, Option<i32>>(i)?.map(SqlValue::Int)
        } else if *ty == Type::INT2 {
            row.try_get::<_, Option<i16>>(i)?.map(|v| SqlValue::Int(i32::from(v)))
        } else if *ty == Type::INT8 {
            row.try_get::<_, Option<i64>>(i)?.map(SqlValue::from_i64)
        } else if *ty == Type::FLOAT8 {
            row.try_get::<_, Option<f64>>(i)?.map(SqlValue::Double)
        } else if *ty == Type::FLOAT4 {
            row.try_get::<_, Option<f32>>(i)?.map(|v| SqlValue::Double(f64::from(v)))
        } else if *ty == Type::BOOL {
            row.try_get::<_, Option<bool>>(i)?.map(SqlValue::Bool)
        } else {
            row.try_get::<_, Option<String>>(i)?.map(SqlValue::Text)
        };

        res.push(column.name(), value);
    }

    Ok(res)
}

impl Connection for Client {
    fn select_one(&mut self, sql: &str, params: &[SqlValue]) -> Result<Option<Row>, DbError> {
        debug!("Running '{}'.", sql);
        let params: Vec<Param> = params.iter().map(to_param).collect();
        let refs: Vec<&(dyn ToSql + Sync)> = params.iter().map(|p| &**p).collect();
        match Client::query_opt(self, sql, &refs)? {
            Some(row) => Ok(Some(to_row(&row)?)),
            None => Ok(None),
        }
    }

    fn insert_returning_id(&mut self, sql: &str, params: &[SqlValue]) -> Result<i32, DbError> {
        match self.select_one(sql, params)?.and_then(|r| r.get_i32("id")) {
            Some(id) => Ok(id),
            None => Err(DbError::NoRows),
        }
    }

    fn execute(&mut self, sql: &str, params: &[SqlValue]) -> Result<u64, DbError> {
        debug!("Running '{}'.", sql);
        let params: Vec<Param> = params.iter().map(to_param).collect();
        let refs: Vec<&(dyn ToSql + Sync)> = params.iter().map(|p| &**p).collect();
        Ok(Client::execute(self, sql, &refs)?)
    }

    fn begin(&mut self) -> Result<(), DbError> {
        self.batch_execute("BEGIN")?;
        Ok(())
    }

    fn commit(&mut self) -> Result<(), DbError> {
        self.batch_execute("COMMIT")?;
        Ok(())
    }
}
