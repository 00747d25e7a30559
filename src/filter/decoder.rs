// Copyright 2026 The symbology Developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use std::cmp::Ordering;
use std::sync::Arc;

use roxmltree::Node;

use super::{
    Evaluator,
    Expression,
    ExpressionDecoder,
    Feature,
    Filter,
    Value,
};
use crate::error::{Error, EvalError};

type Result<T> = ::std::result::Result<T, Error>;

/// A decoder for the common subset of OGC Filter Encoding 1.1.
///
/// Supported expressions: `Literal`, `PropertyName`, `Add`, `Sub`, `Mul`, `Div`.
///
/// Supported filters: `PropertyIsEqualTo`, `PropertyIsNotEqualTo`,
/// `PropertyIsLessThan`, `PropertyIsGreaterThan`, `PropertyIsLessThanOrEqualTo`,
/// `PropertyIsGreaterThanOrEqualTo`, `PropertyIsNull`, `PropertyIsBetween`,
/// `PropertyIsLike`, `And`, `Or`, `Not`, `FeatureId` and `GmlObjectId`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Filter110Decoder;

impl ExpressionDecoder for Filter110Decoder {
    fn parse_expression(&self, node: Node) -> Result<Arc<dyn Expression>> {
        Ok(Arc::new(parse_expr(node)?))
    }

    fn parse_filter(&self, node: Node) -> Result<Arc<dyn Filter>> {
        let node = if node.tag_name().name() == "Filter" {
            let mut children = node.children().filter(|n| n.is_element());
            let op = children.next().ok_or_else(|| invalid(node))?;
            // Several ids are allowed inside a single filter.
            if is_id_node(op) {
                return Ok(Arc::new(parse_ids(node)));
            }
            op
        } else {
            node
        };

        Ok(Arc::new(parse_op(node)?))
    }
}

#[derive(Clone, Copy, PartialEq, Debug)]
enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
}

#[derive(Debug)]
enum Expr {
    Literal(Value),
    Property(String),
    Arith(ArithOp, Box<Expr>, Box<Expr>),
}

impl Expression for Expr {
    fn evaluate(
        &self,
        feature: Option<&dyn Feature>,
        evaluator: &dyn Evaluator,
    ) -> ::std::result::Result<Vec<Value>, EvalError> {
        match *self {
            Expr::Literal(ref v) => Ok(vec![v.clone()]),
            Expr::Property(ref path) => {
                match feature {
                    Some(f) => evaluator.evaluate(f, path),
                    None => Ok(Vec::new()),
                }
            }
            Expr::Arith(op, ref a, ref b) => {
                let a = a.evaluate(feature, evaluator)?;
                let b = b.evaluate(feature, evaluator)?;
                let (a, b) = match (a.first(), b.first()) {
                    (Some(a), Some(b)) => (number(a)?, number(b)?),
                    _ => return Ok(Vec::new()),
                };

                let n = match op {
                    ArithOp::Add => a + b,
                    ArithOp::Sub => a - b,
                    ArithOp::Mul => a * b,
                    ArithOp::Div => a / b,
                };

                Ok(vec![Value::Number(n)])
            }
        }
    }
}

fn number(v: &Value) -> ::std::result::Result<f64, EvalError> {
    v.as_number().ok_or_else(|| EvalError::NotANumber(v.to_string()))
}

#[derive(Clone, Copy, PartialEq, Debug)]
enum CmpOp {
    Equal,
    NotEqual,
    Less,
    Greater,
    LessOrEqual,
    GreaterOrEqual,
}

#[derive(Debug)]
enum Op {
    Compare(CmpOp, Expr, Expr, bool),
    IsNull(Expr),
    Between(Expr, Expr, Expr),
    Like {
        expr: Expr,
        pattern: String,
        wild_card: char,
        single_char: char,
        escape_char: char,
        match_case: bool,
    },
    And(Vec<Op>),
    Or(Vec<Op>),
    Not(Box<Op>),
    Ids(Vec<String>),
}

impl Filter for Op {
    fn evaluate(
        &self,
        feature: &dyn Feature,
        evaluator: &dyn Evaluator,
    ) -> ::std::result::Result<bool, EvalError> {
        let first = |e: &Expr| -> ::std::result::Result<Option<Value>, EvalError> {
            Ok(e.evaluate(Some(feature), evaluator)?.into_iter().next())
        };

        match *self {
            Op::Compare(op, ref a, ref b, match_case) => {
                let (a, b) = match (first(a)?, first(b)?) {
                    (Some(a), Some(b)) => (a, b),
                    _ => return Ok(false),
                };

                let ord = match compare(&a, &b, match_case) {
                    Some(ord) => ord,
                    None => return Ok(false),
                };

                Ok(match op {
                    CmpOp::Equal => ord == Ordering::Equal,
                    CmpOp::NotEqual => ord != Ordering::Equal,
                    CmpOp::Less => ord == Ordering::Less,
                    CmpOp::Greater => ord == Ordering::Greater,
                    CmpOp::LessOrEqual => ord != Ordering::Greater,
                    CmpOp::GreaterOrEqual => ord != Ordering::Less,
                })
            }
            Op::IsNull(ref e) => Ok(first(e)?.is_none()),
            Op::Between(ref e, ref lower, ref upper) => {
                match (first(e)?, first(lower)?, first(upper)?) {
                    (Some(v), Some(l), Some(u)) => {
                        Ok(compare(&v, &l, true).map_or(false, |o| o != Ordering::Less)
                           && compare(&v, &u, true).map_or(false, |o| o != Ordering::Greater))
                    }
                    _ => Ok(false),
                }
            }
            Op::Like { ref expr, ref pattern, wild_card, single_char, escape_char, match_case } => {
                let v = match first(expr)? {
                    Some(v) => v.to_string(),
                    None => return Ok(false),
                };

                let (v, pattern) = if match_case {
                    (v, pattern.clone())
                } else {
                    (v.to_lowercase(), pattern.to_lowercase())
                };

                let text: Vec<char> = v.chars().collect();
                let pattern: Vec<char> = pattern.chars().collect();
                Ok(like(&text, &pattern, wild_card, single_char, escape_char))
            }
            Op::And(ref ops) => {
                for op in ops {
                    if !op.evaluate(feature, evaluator)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            Op::Or(ref ops) => {
                for op in ops {
                    if op.evaluate(feature, evaluator)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            Op::Not(ref op) => Ok(!op.evaluate(feature, evaluator)?),
            Op::Ids(ref ids) => {
                Ok(feature.id().map_or(false, |id| ids.iter().any(|v| v == id)))
            }
        }
    }
}

fn compare(a: &Value, b: &Value, match_case: bool) -> Option<Ordering> {
    if let (Some(a), Some(b)) = (a.as_number(), b.as_number()) {
        return a.partial_cmp(&b);
    }

    let (a, b) = (a.to_string(), b.to_string());
    if match_case {
        Some(a.cmp(&b))
    } else {
        Some(a.to_lowercase().cmp(&b.to_lowercase()))
    }
}

fn like(text: &[char], pattern: &[char], wild: char, single: char, escape: char) -> bool {
    match pattern.first() {
        None => text.is_empty(),
        Some(&c) if c == escape && pattern.len() > 1 => {
            text.first() == Some(&pattern[1])
                && like(&text[1..], &pattern[2..], wild, single, escape)
        }
        Some(&c) if c == wild => {
            (0..=text.len()).any(|i| like(&text[i..], &pattern[1..], wild, single, escape))
        }
        Some(&c) if c == single => {
            !text.is_empty() && like(&text[1..], &pattern[1..], wild, single, escape)
        }
        Some(&c) => {
            text.first() == Some(&c) && like(&text[1..], &pattern[1..], wild, single, escape)
        }
    }
}

fn position(node: Node) -> roxmltree::TextPos {
    node.document().text_pos_at(node.range().start)
}

fn unsupported(node: Node) -> Error {
    Error::UnsupportedExpression(node.tag_name().name().to_string(), position(node))
}

fn invalid(node: Node) -> Error {
    Error::InvalidExpression(node.tag_name().name().to_string(), position(node))
}

fn element_children<'a, 'input: 'a>(node: Node<'a, 'input>) -> Vec<Node<'a, 'input>> {
    node.children().filter(|n| n.is_element()).collect()
}

fn text(node: Node) -> String {
    node.children()
        .filter(|n| n.is_text())
        .filter_map(|n| n.text())
        .collect::<String>()
        .trim()
        .to_string()
}

fn parse_expr(node: Node) -> Result<Expr> {
    let op = match node.tag_name().name() {
        "Literal" => return Ok(Expr::Literal(Value::String(text(node)))),
        "PropertyName" | "ValueReference" => {
            let path = text(node);
            if path.is_empty() {
                return Err(invalid(node));
            }
            return Ok(Expr::Property(path));
        }
        "Add" => ArithOp::Add,
        "Sub" => ArithOp::Sub,
        "Mul" => ArithOp::Mul,
        "Div" => ArithOp::Div,
        _ => return Err(unsupported(node)),
    };

    match element_children(node).as_slice() {
        [a, b] => Ok(Expr::Arith(op, Box::new(parse_expr(*a)?), Box::new(parse_expr(*b)?))),
        _ => Err(invalid(node)),
    }
}

fn is_id_node(node: Node) -> bool {
    match node.tag_name().name() {
        "FeatureId" | "GmlObjectId" => true,
        _ => false,
    }
}

fn parse_ids(parent: Node) -> Op {
    let ids = element_children(parent)
        .into_iter()
        .filter(|n| is_id_node(*n))
        .filter_map(|n| {
            n.attributes()
                .find(|a| a.name() == "fid" || a.name() == "id")
                .map(|a| a.value().to_string())
        })
        .collect();
    Op::Ids(ids)
}

fn parse_op(node: Node) -> Result<Op> {
    let children = element_children(node);

    let cmp = match node.tag_name().name() {
        "PropertyIsEqualTo" => Some(CmpOp::Equal),
        "PropertyIsNotEqualTo" => Some(CmpOp::NotEqual),
        "PropertyIsLessThan" => Some(CmpOp::Less),
        "PropertyIsGreaterThan" => Some(CmpOp::Greater),
        "PropertyIsLessThanOrEqualTo" => Some(CmpOp::LessOrEqual),
        "PropertyIsGreaterThanOrEqualTo" => Some(CmpOp::GreaterOrEqual),
        _ => None,
    };

    if let Some(cmp) = cmp {
        let match_case = node.attribute("matchCase").map_or(true, |v| v != "false");
        return match children.as_slice() {
            [a, b] => Ok(Op::Compare(cmp, parse_expr(*a)?, parse_expr(*b)?, match_case)),
            _ => Err(invalid(node)),
        };
    }

    match node.tag_name().name() {
        "PropertyIsNull" => {
            match children.as_slice() {
                [a] => Ok(Op::IsNull(parse_expr(*a)?)),
                _ => Err(invalid(node)),
            }
        }
        "PropertyIsBetween" => {
            match children.as_slice() {
                [e, lower, upper] => {
                    let bound = |n: Node| -> Result<Expr> {
                        let inner = element_children(n);
                        match inner.as_slice() {
                            [e] => parse_expr(*e),
                            _ => Err(invalid(n)),
                        }
                    };
                    Ok(Op::Between(parse_expr(*e)?, bound(*lower)?, bound(*upper)?))
                }
                _ => Err(invalid(node)),
            }
        }
        "PropertyIsLike" => {
            let char_attr = |name: &str, default: char| {
                node.attribute(name).and_then(|v| v.chars().next()).unwrap_or(default)
            };

            match children.as_slice() {
                [e, pattern] => {
                    Ok(Op::Like {
                        expr: parse_expr(*e)?,
                        pattern: text(*pattern),
                        wild_card: char_attr("wildCard", '*'),
                        single_char: char_attr("singleChar", '?'),
                        escape_char: char_attr("escapeChar", '\\'),
                        match_case: node.attribute("matchCase").map_or(true, |v| v != "false"),
                    })
                }
                _ => Err(invalid(node)),
            }
        }
        "And" | "Or" => {
            if children.len() < 2 {
                return Err(invalid(node));
            }

            let mut ops = Vec::with_capacity(children.len());
            for child in children {
                ops.push(parse_op(child)?);
            }

            if node.tag_name().name() == "And" {
                Ok(Op::And(ops))
            } else {
                Ok(Op::Or(ops))
            }
        }
        "Not" => {
            match children.as_slice() {
                [a] => Ok(Op::Not(Box::new(parse_op(*a)?))),
                _ => Err(invalid(node)),
            }
        }
        "FeatureId" | "GmlObjectId" => {
            match node.parent_element() {
                Some(parent) => Ok(parse_ids(parent)),
                None => Err(invalid(node)),
            }
        }
        _ => Err(unsupported(node)),
    }
}
