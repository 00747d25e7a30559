// Copyright 2026 The symbology Developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use url::Url;

/// Options that defines symbology parsing.
#[derive(Clone, Debug)]
pub struct ParseOptions {
    /// Keep the raw XML of text symbolizer labels.
    ///
    /// Labels are stored this way in a style database.
    ///
    /// Default: false
    pub collect_xml_snippets: bool,

    /// Keep the XML of the parsed style element in the `Style`.
    ///
    /// Styles that depend on feature properties can only be stored
    /// in a style database as a whole document.
    ///
    /// Default: true
    pub keep_source: bool,

    /// The URL of the parsed document.
    ///
    /// Used to resolve relative references and in diagnostics.
    ///
    /// Default: None
    pub system_id: Option<Url>,
}

impl Default for ParseOptions {
    fn default() -> ParseOptions {
        ParseOptions {
            collect_xml_snippets: false,
            keep_source: true,
            system_id: None,
        }
    }
}
