// Copyright 2026 The symbology Developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use std::f64;
use std::fmt;
use std::sync::Arc;

use log::warn;

use crate::filter::{Evaluator, Feature, Filter};
use crate::styling::{Styling, TextStyling};
use crate::symbolizer::{
    AnySymbolizer,
    Common,
    EvaluatedSymbolizer,
    Label,
    Symbolizer,
};

/// A scale denominator range.
///
/// The minimum is inclusive, the maximum is exclusive.
#[derive(Clone, Copy, PartialEq, Debug)]
#[allow(missing_docs)]
pub struct ScaleRange {
    pub min: f64,
    pub max: f64,
}

impl ScaleRange {
    /// Checks that the range contains the scale denominator.
    #[inline]
    pub fn contains(&self, scale: f64) -> bool {
        self.min <= scale && scale < self.max
    }
}

impl Default for ScaleRange {
    fn default() -> ScaleRange {
        ScaleRange {
            min: f64::NEG_INFINITY,
            max: f64::INFINITY,
        }
    }
}


/// A rule selection condition.
#[derive(Clone, Debug)]
pub enum RuleFilter {
    /// The rule always applies.
    None,
    /// The rule applies when no previous rule did.
    Else,
    /// The rule applies to matching features.
    Filter(Arc<dyn Filter>),
}

/// A rule.
#[derive(Debug)]
pub struct Rule {
    #[allow(missing_docs)]
    pub filter: RuleFilter,
    #[allow(missing_docs)]
    pub symbolizers: Vec<AnySymbolizer>,
    #[allow(missing_docs)]
    pub common: Common,
    #[allow(missing_docs)]
    pub scale: ScaleRange,
}

impl Rule {
    /// Constructs a rule that always applies.
    pub fn new(symbolizers: Vec<AnySymbolizer>) -> Rule {
        Rule {
            filter: RuleFilter::None,
            symbolizers,
            common: Common::default(),
            scale: ScaleRange::default(),
        }
    }

    /// Appends the rule symbolizers to `acc` if the rule applies.
    ///
    /// A rule without a filter, or evaluated without a feature, always applies.
    /// An else rule applies only when `acc` is still empty.
    /// Filter evaluation errors are logged and treated as no match.
    pub fn evaluate<'a>(
        &'a self,
        acc: &mut Vec<&'a AnySymbolizer>,
        feature: Option<&dyn Feature>,
        evaluator: &dyn Evaluator,
    ) {
        let applies = match (&self.filter, feature) {
            (&RuleFilter::None, _) | (_, None) => true,
            (&RuleFilter::Else, Some(_)) => acc.is_empty(),
            (&RuleFilter::Filter(ref filter), Some(f)) => {
                match filter.evaluate(f, evaluator) {
                    Ok(v) => v,
                    Err(e) => {
                        warn!("Could not evaluate the rule filter at {}: {}.",
                              self.common.location, e);
                        false
                    }
                }
            }
        };

        if applies {
            acc.extend(self.symbolizers.iter());
        }
    }
}


/// A qualified name.
#[derive(Clone, PartialEq, Debug)]
pub struct QName {
    #[allow(missing_docs)]
    pub namespace: Option<String>,
    #[allow(missing_docs)]
    pub prefix: Option<String>,
    #[allow(missing_docs)]
    pub local: String,
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.prefix {
            Some(ref prefix) => write!(f, "{}:{}", prefix, self.local),
            None => write!(f, "{}", self.local),
        }
    }
}


/// A style.
///
/// A list of rules evaluated in document order.
#[derive(Debug, Default)]
pub struct Style {
    rules: Vec<Rule>,
    name: Option<String>,
    feature_type_name: Option<QName>,
    source: Option<String>,
}

impl Style {
    /// Constructs a style from rules.
    pub fn new(rules: Vec<Rule>, name: Option<String>) -> Style {
        Style {
            rules,
            name,
            feature_type_name: None,
            source: None,
        }
    }

    /// Constructs a style from a single symbolizer.
    pub fn from_symbolizer(symbolizer: AnySymbolizer, name: Option<String>) -> Style {
        Style::new(vec![Rule::new(vec![symbolizer])], name)
    }

    #[allow(missing_docs)]
    #[inline]
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Returns rules visible at the scale denominator.
    pub fn rules_for_scale<'a>(&'a self, scale: f64) -> impl Iterator<Item = &'a Rule> + 'a {
        self.rules.iter().filter(move |r| r.scale.contains(scale))
    }

    #[allow(missing_docs)]
    #[inline]
    pub fn name(&self) -> Option<&str> {
        self.name.as_ref().map(String::as_str)
    }

    #[allow(missing_docs)]
    #[inline]
    pub fn set_name(&mut self, name: Option<String>) {
        self.name = name;
    }

    /// Returns the feature type this style is meant for.
    #[inline]
    pub fn feature_type_name(&self) -> Option<&QName> {
        self.feature_type_name.as_ref()
    }

    #[allow(missing_docs)]
    #[inline]
    pub fn set_feature_type_name(&mut self, name: Option<QName>) {
        self.feature_type_name = name;
    }

    /// Returns the XML text the style was parsed from.
    #[inline]
    pub fn source(&self) -> Option<&str> {
        self.source.as_ref().map(String::as_str)
    }

    #[allow(missing_docs)]
    #[inline]
    pub fn set_source(&mut self, source: Option<String>) {
        self.source = source;
    }

    /// Returns all text symbolizers with their labels.
    pub fn labels(&self) -> impl Iterator<Item = (&Symbolizer<TextStyling>, &Label)> {
        self.rules
            .iter()
            .flat_map(|r| r.symbolizers.iter())
            .filter_map(|s| match *s {
                AnySymbolizer::Text(ref sym, Some(ref label)) => Some((sym, label)),
                _ => None,
            })
    }

    /// Returns the collected label XML snippets.
    ///
    /// Empty unless the style was parsed with snippet collection enabled.
    pub fn label_snippets(&self) -> impl Iterator<Item = (&Symbolizer<TextStyling>, &str)> {
        self.labels()
            .filter_map(|(sym, label)| label.xml.as_ref().map(|xml| (sym, xml.as_str())))
    }

    /// Evaluates the style for a feature at a scale denominator.
    ///
    /// Returns one styling per applicable symbolizer, in document order.
    pub fn evaluate(
        &self,
        feature: Option<&dyn Feature>,
        scale: f64,
        evaluator: &dyn Evaluator,
    ) -> Vec<EvaluatedSymbolizer> {
        let mut symbolizers = Vec::new();
        for rule in self.rules_for_scale(scale) {
            rule.evaluate(&mut symbolizers, feature, evaluator);
        }

        symbolizers.into_iter().map(|s| s.evaluate(feature, evaluator)).collect()
    }

    /// Checks that the style can be stored without its source document.
    ///
    /// A simple style has a single unfiltered rule without raster symbolizers
    /// and without feature dependent stylings. Labels may depend on features.
    pub fn is_simple(&self) -> bool {
        if self.rules.len() != 1 {
            return false;
        }

        let rule = &self.rules[0];
        match rule.filter {
            RuleFilter::None => {}
            _ => return false,
        }

        rule.symbolizers.iter().all(|s| {
            match *s {
                AnySymbolizer::Raster(_) => false,
                _ => !s.has_continuation(),
            }
        })
    }

    /// Returns styling templates of each rule with their scale ranges.
    pub fn bases_with_scales(&self) -> Vec<(Vec<(Styling, Option<&Label>)>, ScaleRange)> {
        self.rules
            .iter()
            .map(|r| {
                let bases = r.symbolizers.iter().map(|s| (s.base(), s.label())).collect();
                (bases, r.scale)
            })
            .collect()
    }
}
