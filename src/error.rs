// Copyright 2026 The symbology Developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use std::error;
use std::fmt;
use std::io;

use roxmltree::TextPos;

/// Symbology parsing errors.
///
/// Only document-level problems are reported this way.
/// Everything inside a document degrades to defaults and is logged instead.
#[derive(Debug)]
pub enum Error {
    /// An expression or a filter element that the decoder doesn't know.
    UnsupportedExpression(String, TextPos),

    /// An expression or a filter element with an invalid structure.
    InvalidExpression(String, TextPos),

    /// An `xlink:href` that can't be resolved to an URL.
    InvalidUrl(String),

    /// An I/O error.
    Io(io::Error),

    /// A `roxmltree` error.
    Xml(roxmltree::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::UnsupportedExpression(ref name, pos) => {
                write!(f, "unsupported expression '{}' at {}", name, pos)
            }
            Error::InvalidExpression(ref name, pos) => {
                write!(f, "invalid expression '{}' at {}", name, pos)
            }
            Error::InvalidUrl(ref url) => {
                write!(f, "invalid URL '{}'", url)
            }
            Error::Io(ref e) => {
                write!(f, "{}", e)
            }
            Error::Xml(ref e) => {
                write!(f, "{}", e)
            }
        }
    }
}

impl error::Error for Error {
    fn description(&self) -> &str {
        "a symbology parsing error"
    }
}

impl From<io::Error> for Error {
    fn from(value: io::Error) -> Self {
        Error::Io(value)
    }
}

impl From<roxmltree::Error> for Error {
    fn from(value: roxmltree::Error) -> Self {
        Error::Xml(value)
    }
}


/// Expression and filter evaluation errors.
#[derive(Clone, PartialEq, Debug)]
pub enum EvalError {
    /// An arithmetic operand is not a number.
    NotANumber(String),

    /// Property lookup failed.
    Property(String),
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            EvalError::NotANumber(ref value) => {
                write!(f, "'{}' is not a number", value)
            }
            EvalError::Property(ref msg) => {
                write!(f, "property evaluation failed: {}", msg)
            }
        }
    }
}

impl error::Error for EvalError {
    fn description(&self) -> &str {
        "an expression evaluation error"
    }
}


/// Style database errors.
#[derive(Debug)]
pub enum DbError {
    /// The connection id is not registered in the provider.
    UnknownConnection(String),

    /// A query that must return a row returned nothing.
    NoRows,

    /// A PostgreSQL error.
    #[cfg(feature = "postgres")]
    Postgres(postgres::Error),

    /// An SQLite error.
    #[cfg(feature = "sqlite")]
    Sqlite(rusqlite::Error),
}

impl fmt::Display for DbError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            DbError::UnknownConnection(ref id) => {
                write!(f, "connection '{}' is not configured", id)
            }
            DbError::NoRows => {
                write!(f, "query returned no rows")
            }
            #[cfg(feature = "postgres")]
            DbError::Postgres(ref e) => {
                write!(f, "{}", e)
            }
            #[cfg(feature = "sqlite")]
            DbError::Sqlite(ref e) => {
                write!(f, "{}", e)
            }
        }
    }
}

impl error::Error for DbError {
    fn description(&self) -> &str {
        "a style database error"
    }
}

#[cfg(feature = "postgres")]
impl From<postgres::Error> for DbError {
    fn from(value: postgres::Error) -> Self {
        DbError::Postgres(value)
    }
}

#[cfg(feature = "sqlite")]
impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        DbError::Sqlite(value)
    }
}
