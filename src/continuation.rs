// Copyright 2026 The symbology Developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Deferred, per feature updates of styling values.
//!
//! Parts of a styling that depend on feature properties can't be computed
//! at parse time. Instead, the parser records a [`Continuation`]: an ordered
//! list of update steps, which is replayed on a fresh copy of the styling
//! for every feature.
//!
//! [`Continuation`]: struct.Continuation.html

use std::fmt;
use std::sync::Arc;

use log::warn;

use crate::filter::{Evaluator, Expression, Feature};

/// A typed setter that parses a string and stores it in a styling field.
///
/// Setters must not panic. Unparsable values are logged and ignored.
pub type Updater<T> = fn(&mut T, &str);

/// A part of a mixed text/expression value.
#[derive(Clone, Debug)]
pub enum Segment {
    /// A literal text.
    Text(String),
    /// An expression with its document location for diagnostics.
    Expression {
        #[allow(missing_docs)]
        expr: Arc<dyn Expression>,
        #[allow(missing_docs)]
        location: String,
    },
}

type CustomFn<T> = dyn Fn(&mut T, Option<&dyn Feature>, &dyn Evaluator) + Send + Sync;

enum Step<T> {
    Text {
        segments: Vec<Segment>,
        updater: Updater<T>,
    },
    Nested(Box<dyn NestedStep<T>>),
    Custom(Box<CustomFn<T>>),
}

trait NestedStep<T>: Send + Sync {
    fn apply(&self, base: &mut T, feature: Option<&dyn Feature>, evaluator: &dyn Evaluator);
}

struct Nested<T, U> {
    inner: Continuation<U>,
    access: fn(&mut T) -> Option<&mut U>,
}

impl<T, U> NestedStep<T> for Nested<T, U> {
    fn apply(&self, base: &mut T, feature: Option<&dyn Feature>, evaluator: &dyn Evaluator) {
        if let Some(target) = (self.access)(base) {
            self.inner.evaluate(target, feature, evaluator);
        }
    }
}

/// An ordered list of deferred updates.
///
/// Steps are applied in the order they were added, so a later step
/// overrides what an earlier one set.
pub struct Continuation<T> {
    steps: Vec<Step<T>>,
}

impl<T> Continuation<T> {
    /// Constructs an empty continuation.
    pub fn new() -> Self {
        Continuation { steps: Vec::new() }
    }

    /// Checks that the continuation has no steps.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Returns the number of steps.
    #[inline]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Returns `None` for an empty continuation.
    pub fn into_option(self) -> Option<Self> {
        if self.is_empty() { None } else { Some(self) }
    }

    /// Adds a step that concatenates `segments` and passes the result to `updater`.
    pub fn push_text(&mut self, segments: Vec<Segment>, updater: Updater<T>) {
        self.steps.push(Step::Text { segments, updater });
    }

    /// Adds a step that applies `inner` to a nested component.
    ///
    /// `access` selects the component. Nothing happens when it returns `None`.
    /// Empty continuations are not recorded.
    pub fn nest<U: 'static>(&mut self, inner: Continuation<U>, access: fn(&mut T) -> Option<&mut U>)
        where T: 'static
    {
        if inner.is_empty() {
            return;
        }

        self.steps.push(Step::Nested(Box::new(Nested { inner, access })));
    }

    /// Adds an arbitrary step.
    pub fn then<F>(&mut self, f: F)
        where F: Fn(&mut T, Option<&dyn Feature>, &dyn Evaluator) + Send + Sync + 'static
    {
        self.steps.push(Step::Custom(Box::new(f)));
    }

    /// Moves all steps of `other` to the end of this continuation.
    pub fn append(&mut self, mut other: Continuation<T>) {
        self.steps.append(&mut other.steps);
    }

    /// Applies all steps to `base`, oldest first.
    ///
    /// `base` must be a copy of a template and never the template itself.
    /// Evaluation errors are logged and skipped.
    pub fn evaluate(&self, base: &mut T, feature: Option<&dyn Feature>, evaluator: &dyn Evaluator) {
        for step in &self.steps {
            match *step {
                Step::Text { ref segments, updater } => {
                    let text = concat_segments(segments, feature, evaluator);
                    updater(base, &text);
                }
                Step::Nested(ref nested) => {
                    nested.apply(base, feature, evaluator);
                }
                Step::Custom(ref f) => {
                    f(base, feature, evaluator);
                }
            }
        }
    }
}

impl<T> Default for Continuation<T> {
    fn default() -> Self {
        Continuation::new()
    }
}

impl<T> fmt::Debug for Continuation<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Continuation({} steps)", self.steps.len())
    }
}

/// Evaluates and concatenates text segments.
///
/// An expression contributes the text of its first value.
pub fn concat_segments(
    segments: &[Segment],
    feature: Option<&dyn Feature>,
    evaluator: &dyn Evaluator,
) -> String {
    let mut text = String::new();
    for segment in segments {
        match *segment {
            Segment::Text(ref s) => text.push_str(s),
            Segment::Expression { ref expr, ref location } => {
                match expr.evaluate(feature, evaluator) {
                    Ok(values) => {
                        match values.first() {
                            Some(v) => text.push_str(&v.to_string()),
                            None => warn!("The expression at {} evaluated to null.", location),
                        }
                    }
                    Err(e) => {
                        warn!("Could not evaluate the expression at {}: {}.", location, e);
                    }
                }
            }
        }
    }

    text
}
