// Copyright 2026 The symbology Developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use std::fs;
use std::path::Path;
use std::str;
use std::sync::Arc;

use log::{debug, error, warn};
use roxmltree::{Document, Node};
use url::Url;

pub use self::options::ParseOptions;
pub(crate) use self::source::{escape_text, subtree_source};

mod components;
mod options;
mod source;
mod symbolizers;

use crate::continuation::{Continuation, Segment, Updater};
use crate::error::Error;
use crate::filter::{ExpressionDecoder, Filter110Decoder};
use crate::resolver::{FileResolver, ResourceResolver};
use crate::style::{QName, Rule, RuleFilter, ScaleRange, Style};
use crate::styling::{
    LineStyling,
    PointStyling,
    PolygonStyling,
    RasterStyling,
    TextStyling,
    Uom,
};
use crate::symbolizer::{AnySymbolizer, Common, Label, SourceLocation, Symbolizer};
use crate::types::{parse_integer, parse_number, Color};

const XLINK_NS: &str = "http://www.w3.org/1999/xlink";

/// A parser for SLD 1.0 and SE 1.1 symbology documents.
///
/// Parsing never fails because of an invalid styling value:
/// such values are logged and replaced by defaults.
pub struct SymbologyParser {
    opt: ParseOptions,
    decoder: Arc<dyn ExpressionDecoder>,
    resolver: Arc<dyn ResourceResolver>,
}

impl SymbologyParser {
    /// Constructs a parser with default options.
    pub fn new() -> Self {
        SymbologyParser::with_options(ParseOptions::default())
    }

    /// Constructs a parser with specified options.
    pub fn with_options(opt: ParseOptions) -> Self {
        SymbologyParser {
            opt,
            decoder: Arc::new(Filter110Decoder),
            resolver: Arc::new(FileResolver),
        }
    }

    /// Replaces the expression and filter decoder.
    pub fn with_decoder(mut self, decoder: Arc<dyn ExpressionDecoder>) -> Self {
        self.decoder = decoder;
        self
    }

    /// Replaces the external resource resolver.
    pub fn with_resolver(mut self, resolver: Arc<dyn ResourceResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    #[allow(missing_docs)]
    pub fn options(&self) -> &ParseOptions {
        &self.opt
    }

    #[allow(missing_docs)]
    pub fn decoder(&self) -> &dyn ExpressionDecoder {
        &*self.decoder
    }

    fn context(&self) -> Context {
        Context {
            parser: self,
            base: self.opt.system_id.clone(),
        }
    }

    /// Parses a style from a text.
    ///
    /// Returns `Ok(None)` when the document doesn't contain a style.
    pub fn parse_str(&self, text: &str) -> Result<Option<Style>, Error> {
        let doc = Document::parse(text)?;
        Ok(self.parse(doc.root_element()))
    }

    /// Parses a style from a file.
    ///
    /// Relative references are resolved against the file location,
    /// unless `system_id` is set.
    pub fn parse_file<P: AsRef<Path>>(&self, path: P) -> Result<Option<Style>, Error> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let doc = Document::parse(&text)?;

        let mut ctx = self.context();
        if ctx.base.is_none() {
            let abs = fs::canonicalize(path)?;
            ctx.base = Some(Url::from_file_path(&abs).map_err(|_| {
                Error::InvalidUrl(abs.to_string_lossy().into_owned())
            })?);
        }

        Ok(ctx.parse(doc.root_element()))
    }

    /// Parses a style from a symbolizer, a feature type style or a coverage style.
    ///
    /// `StyledLayerDescriptor`, `NamedLayer`, `UserLayer` and `UserStyle`
    /// wrappers are searched for the first feature type or coverage style.
    pub fn parse(&self, node: Node) -> Option<Style> {
        self.context().parse(node)
    }

    /// Parses a `FeatureTypeStyle` or a `CoverageStyle`.
    ///
    /// An `OnlineResource` element is followed to the referenced document.
    pub fn parse_feature_type_or_coverage_style(&self, node: Node) -> Option<Style> {
        self.context().parse_feature_type_or_coverage_style(node)
    }

    /// Parses any symbolizer.
    pub fn parse_symbolizer(&self, node: Node) -> Option<AnySymbolizer> {
        self.context().parse_symbolizer(node)
    }

    #[allow(missing_docs)]
    pub fn parse_point_symbolizer(&self, node: Node, uom: Uom) -> Symbolizer<PointStyling> {
        self.context().parse_point_symbolizer(node, uom)
    }

    #[allow(missing_docs)]
    pub fn parse_line_symbolizer(&self, node: Node, uom: Uom) -> Symbolizer<LineStyling> {
        self.context().parse_line_symbolizer(node, uom)
    }

    #[allow(missing_docs)]
    pub fn parse_polygon_symbolizer(&self, node: Node, uom: Uom) -> Symbolizer<PolygonStyling> {
        self.context().parse_polygon_symbolizer(node, uom)
    }

    /// Parses a text symbolizer and its label.
    pub fn parse_text_symbolizer(
        &self,
        node: Node,
        uom: Uom,
    ) -> (Symbolizer<TextStyling>, Option<Label>) {
        self.context().parse_text_symbolizer(node, uom)
    }

    #[allow(missing_docs)]
    pub fn parse_raster_symbolizer(&self, node: Node, uom: Uom) -> Symbolizer<RasterStyling> {
        self.context().parse_raster_symbolizer(node, uom)
    }

    /// Parses a value element with mixed text and expressions.
    ///
    /// A text-only value is passed to `updater` immediately.
    /// Otherwise, a step that evaluates the value per feature is appended
    /// to `contn`.
    ///
    /// Returns the raw XML of the value when snippet collection is enabled.
    pub fn update_or_continue<T>(
        &self,
        node: Node,
        base: &mut T,
        updater: Updater<T>,
        contn: &mut Continuation<T>,
    ) -> Option<String> {
        self.context().update_or_continue(node, base, updater, contn)
    }

    /// Resolves the `xlink:href` of an `OnlineResource` element.
    pub fn parse_online_resource(&self, node: Node) -> Option<Url> {
        self.context().parse_online_resource(node)
    }
}

impl Default for SymbologyParser {
    fn default() -> Self {
        SymbologyParser::new()
    }
}


/// A parsing state bound to a single document.
pub(crate) struct Context<'p> {
    parser: &'p SymbologyParser,
    /// The document URL.
    base: Option<Url>,
}

impl<'p> Context<'p> {
    fn opt(&self) -> &ParseOptions {
        &self.parser.opt
    }

    fn decoder(&self) -> &dyn ExpressionDecoder {
        &*self.parser.decoder
    }

    fn resolver(&self) -> &Arc<dyn ResourceResolver> {
        &self.parser.resolver
    }

    fn location(&self, node: Node) -> SourceLocation {
        let pos = node.document().text_pos_at(node.range().start);
        SourceLocation {
            system_id: self.base.as_ref().map(|u| u.to_string()),
            line: pos.row,
            column: pos.col,
        }
    }

    fn skip_unknown(&self, node: Node) {
        let pos = node.document().text_pos_at(node.range().start);
        error!("Found unknown element '{}' at line {}, column {}, skipping.",
               node.tag_name().name(), pos.row, pos.col);
    }

    fn parse(&self, node: Node) -> Option<Style> {
        let name = node.tag_name().name();
        if name.ends_with("Symbolizer") {
            let sym = self.parse_symbolizer(node)?;
            let sym_name = sym.name().map(String::from);
            let mut style = Style::from_symbolizer(sym, sym_name);
            self.keep_source(&mut style, node);
            return Some(style);
        }

        match name {
            "FeatureTypeStyle" | "CoverageStyle" | "OnlineResource" => {
                self.parse_feature_type_or_coverage_style(node)
            }
            "StyledLayerDescriptor" | "NamedLayer" | "UserLayer" | "UserStyle" => {
                let inner = node.descendants().find(|n| {
                    n.has_tag_name("FeatureTypeStyle") || n.has_tag_name("CoverageStyle")
                });

                match inner {
                    Some(inner) => self.parse_feature_type_or_coverage_style(inner),
                    None => {
                        self.no_style_warning();
                        None
                    }
                }
            }
            _ => {
                self.no_style_warning();
                None
            }
        }
    }

    fn no_style_warning(&self) {
        let id = self.base.as_ref().map(|u| u.to_string()).unwrap_or_default();
        warn!("Symbology file '{}' did not contain symbolizer or feature type style.", id);
    }

    fn keep_source(&self, style: &mut Style, node: Node) {
        if self.opt().keep_source {
            style.set_source(Some(subtree_source(node)));
        }
    }

    /// Loads and parses a referenced document.
    ///
    /// `f` is called with the root element of the loaded document
    /// and a context bound to its URL.
    fn follow<T, F>(&self, node: Node, f: F) -> Result<Option<T>, Error>
        where F: FnOnce(&Context, Node) -> Option<T>
    {
        let url = match self.parse_online_resource(node) {
            Some(url) => url,
            None => return Ok(None),
        };

        debug!("Loading '{}'.", url);
        let data = self.resolver().open(&url)?;
        let text = str::from_utf8(&data)
            .map_err(|e| Error::Io(::std::io::Error::new(::std::io::ErrorKind::InvalidData, e)))?;
        let doc = Document::parse(text)?;

        let ctx = Context {
            parser: self.parser,
            base: Some(url),
        };

        Ok(f(&ctx, doc.root_element()))
    }

    fn parse_feature_type_or_coverage_style(&self, node: Node) -> Option<Style> {
        if node.tag_name().name() == "OnlineResource" {
            // TODO: detect reference cycles
            return match self.follow(node, |ctx, root| ctx.parse(root)) {
                Ok(style) => style,
                Err(e) => {
                    warn!("An URL referencing a FeatureType or CoverageStyle could not be read: {}.", e);
                    None
                }
            };
        }

        let mut common = Common::default();
        common.location = self.location(node);
        let mut feature_type_name = None;
        let mut rules = Vec::new();

        for child in elements(node) {
            if self.check_common(&mut common, child) {
                continue;
            }

            match child.tag_name().name() {
                "SemanticTypeIdentifier" | "CoverageName" => {}
                "FeatureTypeName" => {
                    feature_type_name = parse_qname(child);
                }
                "Rule" => {
                    rules.push(self.parse_rule(child));
                }
                "OnlineResource" => {
                    match self.follow(child, |ctx, root| Some(ctx.parse_rule(root))) {
                        Ok(Some(rule)) => rules.push(rule),
                        Ok(None) => {}
                        Err(e) => {
                            warn!("Error '{}' while resolving/accessing remote Rule document.", e);
                        }
                    }
                }
                _ => self.skip_unknown(child),
            }
        }

        let mut style = Style::new(rules, common.name);
        style.set_feature_type_name(feature_type_name);
        self.keep_source(&mut style, node);
        Some(style)
    }

    fn parse_rule(&self, node: Node) -> Rule {
        let mut common = Common::default();
        common.location = self.location(node);
        let mut filter = RuleFilter::None;
        let mut scale = ScaleRange::default();
        let mut symbolizers = Vec::new();

        if node.tag_name().name() != "Rule" {
            warn!("Expected a Rule element at {}, but found '{}'.",
                  common.location, node.tag_name().name());
        }

        for child in elements(node) {
            if self.check_common(&mut common, child) {
                continue;
            }

            let name = child.tag_name().name();
            match name {
                "Filter" => {
                    match self.decoder().parse_filter(child) {
                        Ok(f) => filter = RuleFilter::Filter(f),
                        Err(e) => warn!("Invalid filter at {}: {}.", self.location(child), e),
                    }
                }
                "ElseFilter" => {
                    filter = RuleFilter::Else;
                }
                "MinScaleDenominator" => {
                    if let Some(n) = number(&element_text(child)) {
                        scale.min = n;
                    }
                }
                "MaxScaleDenominator" => {
                    if let Some(n) = number(&element_text(child)) {
                        scale.max = n;
                    }
                }
                // TODO: LegendGraphic
                _ if name.ends_with("Symbolizer") => {
                    if let Some(sym) = self.parse_symbolizer(child) {
                        symbolizers.push(sym);
                    }
                }
                _ => self.skip_unknown(child),
            }
        }

        Rule {
            filter,
            symbolizers,
            common,
            scale,
        }
    }

    /// Parses properties shared by symbolizers, rules and styles.
    ///
    /// Returns `false` if the element is not a common one.
    fn check_common(&self, common: &mut Common, node: Node) -> bool {
        match node.tag_name().name() {
            "Name" => {
                common.name = Some(element_text(node));
            }
            "Geometry" => {
                let expr = match first_element(node) {
                    Some(e) => e,
                    None => {
                        warn!("Empty Geometry element at {}.", self.location(node));
                        return true;
                    }
                };

                match self.decoder().parse_expression(expr) {
                    Ok(e) => common.geometry = Some(e),
                    Err(e) => warn!("Invalid geometry expression at {}: {}.", self.location(expr), e),
                }
            }
            "Description" => {
                for child in elements(node) {
                    match child.tag_name().name() {
                        "Title" => common.title = Some(element_text(child)),
                        "Abstract" => common.abstract_text = Some(element_text(child)),
                        _ => self.skip_unknown(child),
                    }
                }
            }
            // SLD 1.0
            "Title" => common.title = Some(element_text(node)),
            "Abstract" => common.abstract_text = Some(element_text(node)),
            _ => return false,
        }

        true
    }

    fn update_or_continue<T>(
        &self,
        node: Node,
        base: &mut T,
        updater: Updater<T>,
        contn: &mut Continuation<T>,
    ) -> Option<String> {
        let collect = self.opt().collect_xml_snippets;
        let mut xml = String::new();
        let mut segments = Vec::new();
        let mut text_only = true;

        for child in node.children() {
            if child.is_element() {
                if collect {
                    xml.push_str(&subtree_source(child));
                }

                match self.decoder().parse_expression(child) {
                    Ok(expr) => {
                        segments.push(Segment::Expression {
                            expr,
                            location: self.location(child).to_string(),
                        });
                        text_only = false;
                    }
                    Err(e) => {
                        warn!("Invalid expression at {}: {}.", self.location(child), e);
                    }
                }
            } else if child.is_text() {
                let text = child.text().unwrap_or("");
                if collect {
                    xml.push_str(&escape_text(text));
                }

                // Leading text nodes are merged.
                let mut merged = false;
                if text_only {
                    if let Some(Segment::Text(prev)) = segments.last_mut() {
                        prev.push_str(text.trim());
                        merged = true;
                    }
                }

                if !merged {
                    segments.push(Segment::Text(text.trim().to_string()));
                }
            }
        }

        if text_only {
            let value = match segments.first() {
                Some(Segment::Text(s)) => s.as_str(),
                _ => {
                    warn!("Expression was empty at {}.", self.location(node));
                    ""
                }
            };
            updater(base, value);
        } else {
            contn.push_text(segments, updater);
        }

        if collect {
            Some(xml.trim().to_string())
        } else {
            None
        }
    }

    fn parse_online_resource(&self, node: Node) -> Option<Url> {
        let href = node.attribute((XLINK_NS, "href")).or_else(|| node.attribute("href"))?;
        match self.resolver().resolve(href, self.base.as_ref()) {
            Ok(url) => Some(url),
            Err(e) => {
                warn!("Could not resolve '{}' at {}: {}.", href, self.location(node), e);
                None
            }
        }
    }
}

pub(crate) fn elements<'a, 'input: 'a>(node: Node<'a, 'input>)
    -> impl Iterator<Item = Node<'a, 'input>> + 'a
{
    node.children().filter(|n| n.is_element())
}

pub(crate) fn first_element<'a, 'input: 'a>(node: Node<'a, 'input>) -> Option<Node<'a, 'input>> {
    node.children().find(|n| n.is_element())
}

/// Returns the trimmed text content of an element.
pub(crate) fn element_text(node: Node) -> String {
    node.children()
        .filter(|n| n.is_text())
        .filter_map(|n| n.text())
        .collect::<String>()
        .trim()
        .to_string()
}

/// Parses a number, logging invalid values.
pub(crate) fn number(text: &str) -> Option<f64> {
    let n = parse_number(text);
    if n.is_none() {
        warn!("Failed to parse a number from '{}'.", text);
    }
    n
}

/// Parses an integer, logging invalid values.
pub(crate) fn integer(text: &str) -> Option<i32> {
    let n = parse_integer(text);
    if n.is_none() {
        warn!("Failed to parse an integer from '{}'.", text);
    }
    n
}

/// Parses a color, logging invalid values.
pub(crate) fn color(text: &str) -> Option<Color> {
    match text.parse() {
        Ok(c) => Some(c),
        Err(_) => {
            warn!("Failed to parse a color from '{}'.", text);
            None
        }
    }
}

fn parse_qname(node: Node) -> Option<QName> {
    let text = element_text(node);
    if text.is_empty() {
        return None;
    }

    let (prefix, local) = match text.find(':') {
        Some(idx) => (Some(&text[..idx]), &text[idx + 1..]),
        None => (None, text.as_str()),
    };

    Some(QName {
        namespace: node.lookup_namespace_uri(prefix).map(String::from),
        prefix: prefix.map(String::from),
        local: local.to_string(),
    })
}
