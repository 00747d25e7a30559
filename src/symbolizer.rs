// Copyright 2026 The symbology Developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use std::fmt;
use std::sync::Arc;

use crate::continuation::Continuation;
use crate::filter::{Evaluator, Expression, Feature};
use crate::styling::{
    LineStyling,
    PointStyling,
    PolygonStyling,
    RasterStyling,
    Styling,
    TextStyling,
};

/// A position inside a styling document.
#[derive(Clone, PartialEq, Debug, Default)]
pub struct SourceLocation {
    /// The document URL, if known.
    pub system_id: Option<String>,
    #[allow(missing_docs)]
    pub line: u32,
    #[allow(missing_docs)]
    pub column: u32,
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)?;
        if let Some(ref id) = self.system_id {
            write!(f, " in {}", id)?;
        }
        Ok(())
    }
}

/// Properties shared by symbolizers and rules.
#[derive(Clone, Debug, Default)]
pub struct Common {
    #[allow(missing_docs)]
    pub name: Option<String>,
    #[allow(missing_docs)]
    pub title: Option<String>,
    #[allow(missing_docs)]
    pub abstract_text: Option<String>,
    /// Selects the geometry to be styled.
    pub geometry: Option<Arc<dyn Expression>>,
    /// Where the element was declared.
    pub location: SourceLocation,
}

/// A parsed styling template with its deferred updates.
///
/// The template itself is never handed out mutably.
/// Use `evaluate` to get a styling for a specific feature.
#[derive(Debug)]
pub struct Symbolizer<T> {
    base: T,
    continuation: Option<Continuation<T>>,
    common: Common,
}

impl<T: Clone> Symbolizer<T> {
    /// Constructs a new symbolizer.
    ///
    /// Empty continuations are dropped.
    pub fn new(base: T, continuation: Option<Continuation<T>>, common: Common) -> Self {
        Symbolizer {
            base,
            continuation: continuation.and_then(Continuation::into_option),
            common,
        }
    }

    /// Returns the styling template.
    #[inline]
    pub fn base(&self) -> &T {
        &self.base
    }

    /// Returns the deferred updates, if any.
    #[inline]
    pub fn continuation(&self) -> Option<&Continuation<T>> {
        self.continuation.as_ref()
    }

    #[allow(missing_docs)]
    #[inline]
    pub fn geometry(&self) -> Option<&Arc<dyn Expression>> {
        self.common.geometry.as_ref()
    }

    #[allow(missing_docs)]
    #[inline]
    pub fn name(&self) -> Option<&str> {
        self.common.name.as_ref().map(String::as_str)
    }

    #[allow(missing_docs)]
    #[inline]
    pub fn common(&self) -> &Common {
        &self.common
    }

    #[allow(missing_docs)]
    #[inline]
    pub fn location(&self) -> &SourceLocation {
        &self.common.location
    }

    /// Evaluates the styling for a feature.
    ///
    /// Always works on a copy of the template.
    pub fn evaluate(&self, feature: Option<&dyn Feature>, evaluator: &dyn Evaluator) -> T {
        let mut styling = self.base.clone();
        if let Some(ref c) = self.continuation {
            c.evaluate(&mut styling, feature, evaluator);
        }
        styling
    }
}


/// A text symbolizer label.
#[derive(Debug, Default)]
pub struct Label {
    /// The label text. Empty when the label depends on feature properties.
    pub text: String,
    /// Builds the rest of the label from feature properties.
    pub continuation: Option<Continuation<String>>,
    /// The raw label XML, when collected.
    pub xml: Option<String>,
}

impl Label {
    /// Evaluates the label text for a feature.
    pub fn evaluate(&self, feature: Option<&dyn Feature>, evaluator: &dyn Evaluator) -> String {
        let mut text = self.text.clone();
        if let Some(ref c) = self.continuation {
            c.evaluate(&mut text, feature, evaluator);
        }
        text
    }
}


/// A symbolizer of any kind.
#[derive(Debug)]
#[allow(missing_docs)]
pub enum AnySymbolizer {
    Point(Symbolizer<PointStyling>),
    Line(Symbolizer<LineStyling>),
    Polygon(Symbolizer<PolygonStyling>),
    Text(Symbolizer<TextStyling>, Option<Label>),
    Raster(Symbolizer<RasterStyling>),
}

macro_rules! with_symbolizer {
    ($sym:expr, $s:ident => $e:expr) => (
        match *$sym {
            AnySymbolizer::Point(ref $s) => $e,
            AnySymbolizer::Line(ref $s) => $e,
            AnySymbolizer::Polygon(ref $s) => $e,
            AnySymbolizer::Text(ref $s, _) => $e,
            AnySymbolizer::Raster(ref $s) => $e,
        }
    )
}

impl AnySymbolizer {
    #[allow(missing_docs)]
    pub fn name(&self) -> Option<&str> {
        with_symbolizer!(self, s => s.name())
    }

    #[allow(missing_docs)]
    pub fn common(&self) -> &Common {
        with_symbolizer!(self, s => s.common())
    }

    #[allow(missing_docs)]
    pub fn geometry(&self) -> Option<&Arc<dyn Expression>> {
        with_symbolizer!(self, s => s.geometry())
    }

    /// Checks that the styling depends on feature properties.
    ///
    /// Labels are not taken into account.
    pub fn has_continuation(&self) -> bool {
        with_symbolizer!(self, s => s.continuation().is_some())
    }

    /// Returns the label of a text symbolizer.
    pub fn label(&self) -> Option<&Label> {
        match *self {
            AnySymbolizer::Text(_, ref label) => label.as_ref(),
            _ => None,
        }
    }

    /// Returns a copy of the styling template.
    pub fn base(&self) -> Styling {
        match *self {
            AnySymbolizer::Point(ref s) => Styling::Point(s.base().clone()),
            AnySymbolizer::Line(ref s) => Styling::Line(s.base().clone()),
            AnySymbolizer::Polygon(ref s) => Styling::Polygon(s.base().clone()),
            AnySymbolizer::Text(ref s, _) => Styling::Text(s.base().clone()),
            AnySymbolizer::Raster(ref s) => Styling::Raster(s.base().clone()),
        }
    }

    /// Evaluates the styling and the label for a feature.
    pub fn evaluate(
        &self,
        feature: Option<&dyn Feature>,
        evaluator: &dyn Evaluator,
    ) -> EvaluatedSymbolizer {
        let styling = match *self {
            AnySymbolizer::Point(ref s) => Styling::Point(s.evaluate(feature, evaluator)),
            AnySymbolizer::Line(ref s) => Styling::Line(s.evaluate(feature, evaluator)),
            AnySymbolizer::Polygon(ref s) => Styling::Polygon(s.evaluate(feature, evaluator)),
            AnySymbolizer::Text(ref s, _) => Styling::Text(s.evaluate(feature, evaluator)),
            AnySymbolizer::Raster(ref s) => Styling::Raster(s.evaluate(feature, evaluator)),
        };

        EvaluatedSymbolizer {
            styling,
            geometry: self.geometry().cloned(),
            label: self.label().map(|l| l.evaluate(feature, evaluator)),
        }
    }
}

/// A styling evaluated for a feature.
#[derive(Clone, Debug)]
pub struct EvaluatedSymbolizer {
    #[allow(missing_docs)]
    pub styling: Styling,
    /// Selects the geometry to be styled. The default geometry is used when `None`.
    pub geometry: Option<Arc<dyn Expression>>,
    /// The label text of a text symbolizer.
    pub label: Option<String>,
}
