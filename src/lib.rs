// Copyright 2026 The symbology Developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

/*!
This library parses OGC SLD 1.0 and SE 1.1 symbology documents into styles
that can be evaluated per feature, and stores them in a relational database.

Here is a simple overview of the structure:

- [`Style`]
    - [`Rule`]
        - [`RuleFilter`]
        - [`ScaleRange`]
        - [`AnySymbolizer`]
            - a styling template, like [`PointStyling`]
            - an optional [`Continuation`]

A styling template contains every value that is known at parse time.
Values that depend on feature properties are described by a [`Continuation`],
a chain of steps that is applied to a copy of the template for each feature.
Templates are never modified by evaluation, so a [`Style`] can be shared
between threads.

Invalid styling values never abort parsing. They are logged using the `log`
crate and replaced by defaults.

The [`db`] module contains [`StyleReader`] and [`StyleWriter`], which map
simple styles onto component tables and store everything else as XML.

[`AnySymbolizer`]: enum.AnySymbolizer.html
[`Continuation`]: struct.Continuation.html
[`PointStyling`]: struct.PointStyling.html
[`Rule`]: struct.Rule.html
[`RuleFilter`]: enum.RuleFilter.html
[`ScaleRange`]: struct.ScaleRange.html
[`Style`]: struct.Style.html
[`StyleReader`]: db/struct.StyleReader.html
[`StyleWriter`]: db/struct.StyleWriter.html
[`db`]: db/index.html
*/

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub use crate::continuation::{Continuation, Segment, Updater};
pub use crate::error::{DbError, Error, EvalError};
pub use crate::parser::{ParseOptions, SymbologyParser};
pub use crate::resolver::{FileResolver, ResourceResolver};
pub use crate::style::{QName, Rule, RuleFilter, ScaleRange, Style};
pub use crate::styling::*;
pub use crate::symbolizer::{
    AnySymbolizer,
    Common,
    EvaluatedSymbolizer,
    Label,
    SourceLocation,
    Symbolizer,
};
pub use crate::traits::Keyword;
pub use crate::types::{Color, NumberList};

#[macro_use]
mod traits;

mod continuation;
mod error;
mod parser;
mod resolver;
mod style;
mod styling;
mod symbolizer;

pub mod db;
pub mod filter;
pub mod types;
