// Copyright 2026 The symbology Developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Feature access, expressions and filters.
//!
//! Styles only depend on the traits from this module.
//! [`Filter110Decoder`] is a small decoder for the common OGC Filter 1.1
//! operators and can be replaced by any other [`ExpressionDecoder`].
//!
//! [`Filter110Decoder`]: struct.Filter110Decoder.html
//! [`ExpressionDecoder`]: trait.ExpressionDecoder.html

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use roxmltree::Node;

pub use self::decoder::Filter110Decoder;

mod decoder;

use crate::error::{Error, EvalError};

/// A property value.
#[derive(Clone, PartialEq, Debug)]
#[allow(missing_docs)]
pub enum Value {
    String(String),
    Number(f64),
    Boolean(bool),
}

impl Value {
    /// Returns the value as a number, parsing strings when needed.
    pub fn as_number(&self) -> Option<f64> {
        match *self {
            Value::Number(n) => Some(n),
            Value::String(ref s) => s.trim().parse().ok(),
            Value::Boolean(_) => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Value::String(ref s) => write!(f, "{}", s),
            Value::Number(n) => write!(f, "{}", n),
            Value::Boolean(b) => write!(f, "{}", b),
        }
    }
}

impl<'a> From<&'a str> for Value {
    fn from(v: &'a str) -> Self {
        Value::String(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Number(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}


/// A feature to be styled.
pub trait Feature {
    /// Returns the feature id.
    fn id(&self) -> Option<&str>;

    /// Returns all values of a property.
    fn property(&self, name: &str) -> Vec<Value>;
}

/// A map backed feature.
#[derive(Clone, PartialEq, Debug, Default)]
pub struct SimpleFeature {
    id: Option<String>,
    properties: HashMap<String, Vec<Value>>,
}

impl SimpleFeature {
    /// Constructs a new feature without properties.
    pub fn new(id: Option<&str>) -> Self {
        SimpleFeature {
            id: id.map(String::from),
            properties: HashMap::new(),
        }
    }

    /// Sets a single valued property.
    pub fn set<V: Into<Value>>(&mut self, name: &str, value: V) {
        self.properties.insert(name.to_owned(), vec![value.into()]);
    }

    /// Builder version of `set`.
    pub fn with<V: Into<Value>>(mut self, name: &str, value: V) -> Self {
        self.set(name, value);
        self
    }
}

impl Feature for SimpleFeature {
    fn id(&self) -> Option<&str> {
        self.id.as_ref().map(String::as_str)
    }

    fn property(&self, name: &str) -> Vec<Value> {
        self.properties.get(name).cloned().unwrap_or_default()
    }
}


/// Resolves property references against features.
pub trait Evaluator: Send + Sync {
    /// Returns all values selected by `path` in `feature`.
    fn evaluate(&self, feature: &dyn Feature, path: &str) -> Result<Vec<Value>, EvalError>;
}

/// Resolves the last step of a property path by its local name.
///
/// `app:road/app:name` and `@name` both select the `name` property.
#[derive(Clone, Copy, Debug, Default)]
pub struct PropertyEvaluator;

impl Evaluator for PropertyEvaluator {
    fn evaluate(&self, feature: &dyn Feature, path: &str) -> Result<Vec<Value>, EvalError> {
        let step = path.trim().rsplit('/').next().unwrap_or("");
        let step = step.trim_start_matches('@');
        let name = match step.find(':') {
            Some(idx) => &step[idx + 1..],
            None => step,
        };

        if name.is_empty() {
            return Err(EvalError::Property(format!("empty property path '{}'", path)));
        }

        Ok(feature.property(name))
    }
}


/// An expression.
pub trait Expression: fmt::Debug + Send + Sync {
    /// Evaluates the expression.
    ///
    /// An empty result is valid and means "no value".
    /// `feature` is `None` when there is no feature to evaluate against.
    fn evaluate(
        &self,
        feature: Option<&dyn Feature>,
        evaluator: &dyn Evaluator,
    ) -> Result<Vec<Value>, EvalError>;
}

/// A filter.
pub trait Filter: fmt::Debug + Send + Sync {
    /// Checks that `feature` matches the filter.
    fn evaluate(&self, feature: &dyn Feature, evaluator: &dyn Evaluator) -> Result<bool, EvalError>;
}

/// Decodes expressions and filters from XML.
pub trait ExpressionDecoder: Send + Sync {
    /// Decodes an expression element, like `ogc:PropertyName`.
    fn parse_expression(&self, node: Node) -> Result<Arc<dyn Expression>, Error>;

    /// Decodes a filter element, like `ogc:Filter`.
    fn parse_filter(&self, node: Node) -> Result<Arc<dyn Filter>, Error>;
}
