// Copyright 2026 The symbology Developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use std::sync::Arc;

use base64::Engine;
use log::{debug, warn};
use moka::sync::Cache;
use roxmltree::Node;
use url::Url;

use super::{
    color,
    element_text,
    elements,
    first_element,
    integer,
    number,
    subtree_source,
    Context,
};
use crate::continuation::Continuation;
use crate::resolver::ResourceResolver;
use crate::styling::{
    Fill,
    Font,
    FontStyle,
    Graphic,
    GraphicImage,
    Halo,
    LineCap,
    LineJoin,
    LinePlacement,
    Mark,
    MarkSource,
    OffsetKind,
    PerpendicularOffsetType,
    SimpleMark,
    Stroke,
    Substraction,
};
use crate::traits::parse_or;
use crate::types::{parse_bool, parse_number_list};

const IMAGE_CACHE_SIZE: u64 = 256;

/// A loaded `OnlineResource` or `InlineContent`.
pub(crate) enum Resource {
    Loaded {
        data: Vec<u8>,
        url: Option<String>,
    },
    /// An URL that depends on feature properties.
    Deferred(Continuation<String>),
}

/// A parsed `ExternalGraphic`.
struct ExternalGraphic {
    image: Option<GraphicImage>,
    url: Option<String>,
    deferred: Option<Continuation<String>>,
    format: Option<String>,
}

impl<'p> Context<'p> {
    pub(crate) fn parse_fill(&self, node: Node) -> (Fill, Continuation<Fill>) {
        let mut base = Fill::default();
        let mut contn: Continuation<Fill> = Continuation::new();

        for child in elements(node) {
            let name = child.tag_name().name();
            if name == "GraphicFill" {
                match elements(child).find(|n| n.has_tag_name("Graphic")) {
                    Some(g) => {
                        let (graphic, gcontn) = self.parse_graphic(g);
                        base.graphic = Some(Arc::new(graphic));
                        contn.nest(gcontn, |f| f.graphic.as_mut().map(Arc::make_mut));
                    }
                    None => warn!("GraphicFill without a Graphic at {}.", self.location(child)),
                }
            } else if name.ends_with("Parameter") {
                match child.attribute("name").unwrap_or("") {
                    "fill" => {
                        self.update_or_continue(child, &mut base, |f, v| {
                            if let Some(c) = color(v) {
                                f.color = c.with_alpha(f.color.alpha);
                            }
                        }, &mut contn);
                    }
                    "fill-opacity" => {
                        self.update_or_continue(child, &mut base, |f, v| {
                            if let Some(n) = number(v) {
                                f.color.set_opacity(n);
                            }
                        }, &mut contn);
                    }
                    _ => self.skip_unknown(child),
                }
            } else {
                self.skip_unknown(child);
            }
        }

        (base, contn)
    }

    pub(crate) fn parse_stroke(&self, node: Node) -> (Stroke, Continuation<Stroke>) {
        let mut base = Stroke::default();
        let mut contn: Continuation<Stroke> = Continuation::new();

        for child in elements(node) {
            let name = child.tag_name().name();
            if name.ends_with("Parameter") {
                self.parse_stroke_parameter(child, &mut base, &mut contn);
            } else if name == "GraphicFill" {
                match elements(child).find(|n| n.has_tag_name("Graphic")) {
                    Some(g) => {
                        let (graphic, gcontn) = self.parse_graphic(g);
                        base.fill = Some(Arc::new(graphic));
                        contn.nest(gcontn, |s| s.fill.as_mut().map(Arc::make_mut));
                    }
                    None => warn!("GraphicFill without a Graphic at {}.", self.location(child)),
                }
            } else if name == "GraphicStroke" {
                for sub in elements(child) {
                    match sub.tag_name().name() {
                        "Graphic" => {
                            let (graphic, gcontn) = self.parse_graphic(sub);
                            base.stroke = Some(Arc::new(graphic));
                            contn.nest(gcontn, |s| s.stroke.as_mut().map(Arc::make_mut));
                        }
                        "InitialGap" => {
                            self.update_or_continue(sub, &mut base, |s, v| {
                                if let Some(n) = number(v) {
                                    s.stroke_initial_gap = n;
                                }
                            }, &mut contn);
                        }
                        "Gap" => {
                            self.update_or_continue(sub, &mut base, |s, v| {
                                if let Some(n) = number(v) {
                                    s.stroke_gap = n;
                                }
                            }, &mut contn);
                        }
                        "PositionPercentage" => {
                            self.update_or_continue(sub, &mut base, |s, v| {
                                if let Some(n) = number(v) {
                                    s.position_percentage = n;
                                }
                            }, &mut contn);
                        }
                        _ => self.skip_unknown(sub),
                    }
                }
            } else {
                self.skip_unknown(child);
            }
        }

        (base, contn)
    }

    fn parse_stroke_parameter(&self, node: Node, base: &mut Stroke, contn: &mut Continuation<Stroke>) {
        match node.attribute("name").unwrap_or("") {
            "stroke" => {
                self.update_or_continue(node, base, |s, v| {
                    if let Some(c) = color(v) {
                        s.color = c.with_alpha(s.color.alpha);
                    }
                }, contn);
            }
            "stroke-opacity" => {
                self.update_or_continue(node, base, |s, v| {
                    if let Some(n) = number(v) {
                        s.color.set_opacity(n);
                    }
                }, contn);
            }
            "stroke-width" => {
                self.update_or_continue(node, base, |s, v| {
                    if let Some(n) = number(v) {
                        s.width = n;
                    }
                }, contn);
            }
            "stroke-linejoin" => {
                self.update_or_continue(node, base, |s, v| {
                    s.line_join = parse_or(v, LineJoin::Round);
                }, contn);
            }
            "stroke-linecap" => {
                self.update_or_continue(node, base, |s, v| {
                    s.line_cap = parse_or(v, LineCap::Butt);
                }, contn);
            }
            "stroke-dasharray" => {
                self.update_or_continue(node, base, |s, v| {
                    match parse_number_list(v) {
                        Some(list) => s.dash_array = Some(list),
                        None => warn!("Failed to parse a dash array from '{}'.", v),
                    }
                }, contn);
            }
            "stroke-dashoffset" => {
                self.update_or_continue(node, base, |s, v| {
                    if let Some(n) = number(v) {
                        s.dash_offset = n;
                    }
                }, contn);
            }
            _ => self.skip_unknown(node),
        }
    }

    pub(crate) fn parse_graphic(&self, node: Node) -> (Graphic, Continuation<Graphic>) {
        let mut base = Graphic::default();
        let mut contn: Continuation<Graphic> = Continuation::new();

        for child in elements(node) {
            match child.tag_name().name() {
                "Mark" => {
                    let (mark, mcontn) = self.parse_mark(child);
                    base.mark = Some(Arc::new(mark));
                    contn.nest(mcontn, |g| g.mark.as_mut().map(Arc::make_mut));
                }
                "ExternalGraphic" => {
                    let ext = self.parse_external_graphic(child);
                    if ext.image.is_some() {
                        base.image = ext.image;
                    }
                    if ext.url.is_some() {
                        base.image_url = ext.url;
                    }
                    if let Some(url_contn) = ext.deferred {
                        self.load_deferred_image(url_contn, ext.format, &mut contn);
                    }
                }
                "Opacity" => {
                    self.update_or_continue(child, &mut base, |g, v| {
                        if let Some(n) = number(v) {
                            g.opacity = n;
                        }
                    }, &mut contn);
                }
                "Size" => {
                    self.update_or_continue(child, &mut base, |g, v| {
                        if let Some(n) = number(v) {
                            g.size = n;
                        }
                    }, &mut contn);
                }
                "Rotation" => {
                    self.update_or_continue(child, &mut base, |g, v| {
                        if let Some(n) = number(v) {
                            g.rotation = n;
                        }
                    }, &mut contn);
                }
                "AnchorPoint" => {
                    for sub in elements(child) {
                        match sub.tag_name().name() {
                            "AnchorPointX" => {
                                self.update_or_continue(sub, &mut base, |g, v| {
                                    if let Some(n) = number(v) {
                                        g.anchor_point_x = n;
                                    }
                                }, &mut contn);
                            }
                            "AnchorPointY" => {
                                self.update_or_continue(sub, &mut base, |g, v| {
                                    if let Some(n) = number(v) {
                                        g.anchor_point_y = n;
                                    }
                                }, &mut contn);
                            }
                            _ => self.skip_unknown(sub),
                        }
                    }
                }
                "Displacement" => {
                    for sub in elements(child) {
                        match sub.tag_name().name() {
                            "DisplacementX" => {
                                self.update_or_continue(sub, &mut base, |g, v| {
                                    if let Some(n) = number(v) {
                                        g.displacement_x = n;
                                    }
                                }, &mut contn);
                            }
                            "DisplacementY" => {
                                self.update_or_continue(sub, &mut base, |g, v| {
                                    if let Some(n) = number(v) {
                                        g.displacement_y = n;
                                    }
                                }, &mut contn);
                            }
                            _ => self.skip_unknown(sub),
                        }
                    }
                }
                _ => self.skip_unknown(child),
            }
        }

        (base, contn)
    }

    pub(crate) fn parse_mark(&self, node: Node) -> (Mark, Continuation<Mark>) {
        let mut base = Mark::default();
        let mut contn: Continuation<Mark> = Continuation::new();

        let mut resource = None;
        let mut format = None;

        for child in elements(node) {
            match child.tag_name().name() {
                "WellKnownName" => {
                    base.well_known = parse_or(&element_text(child), SimpleMark::Square);
                }
                "OnlineResource" | "InlineContent" => {
                    resource = self.load_resource(child);
                }
                "Format" => {
                    format = Some(element_text(child));
                }
                "MarkIndex" => {
                    if let Some(n) = integer(&element_text(child)) {
                        base.mark_index = n;
                    }
                }
                "Fill" => {
                    let (fill, fcontn) = self.parse_fill(child);
                    base.fill = Some(Arc::new(fill));
                    contn.nest(fcontn, |m| m.fill.as_mut().map(Arc::make_mut));
                }
                "Stroke" => {
                    let (stroke, scontn) = self.parse_stroke(child);
                    base.stroke = Some(Arc::new(stroke));
                    contn.nest(scontn, |m| m.stroke.as_mut().map(Arc::make_mut));
                }
                _ => self.skip_unknown(child),
            }
        }

        match resource {
            Some(Resource::Loaded { data, url }) => {
                let format = format.unwrap_or_default();
                match format.to_lowercase().as_str() {
                    "ttf" | "type1" | "svg" => {
                        base.source = Some(MarkSource { format, data, url });
                    }
                    _ => {
                        warn!("Mark was not loaded, because the format '{}' is not supported.", format);
                    }
                }
            }
            Some(Resource::Deferred(_)) => {
                warn!("Mark at {} references a feature dependent resource, which is not supported.",
                      self.location(node));
            }
            None => {}
        }

        (base, contn)
    }

    fn parse_external_graphic(&self, node: Node) -> ExternalGraphic {
        let mut resource = None;
        let mut format = None;

        for child in elements(node) {
            match child.tag_name().name() {
                "OnlineResource" | "InlineContent" => {
                    resource = self.load_resource(child);
                }
                "Format" => {
                    format = Some(element_text(child));
                }
                _ => self.skip_unknown(child),
            }
        }

        let mut ext = ExternalGraphic {
            image: None,
            url: None,
            deferred: None,
            format: format.clone(),
        };

        match resource {
            Some(Resource::Loaded { data, url }) => {
                ext.image = Some(GraphicImage { format, data: Arc::new(data) });
                ext.url = url;
            }
            Some(Resource::Deferred(c)) => {
                ext.deferred = Some(c);
            }
            None => {}
        }

        ext
    }

    /// Adds a step that loads an image from a feature dependent URL.
    fn load_deferred_image(
        &self,
        url_contn: Continuation<String>,
        format: Option<String>,
        contn: &mut Continuation<Graphic>,
    ) {
        let resolver = Arc::clone(self.resolver());
        let base_url = self.base.clone();
        let cache: Cache<String, Arc<Vec<u8>>> = Cache::new(IMAGE_CACHE_SIZE);

        contn.then(move |g, feature, evaluator| {
            let mut href = String::new();
            url_contn.evaluate(&mut href, feature, evaluator);

            let data = match cache.get(&href) {
                Some(data) => data,
                None => {
                    match load(&*resolver, &href, base_url.as_ref()) {
                        Ok(data) => {
                            let data = Arc::new(data);
                            cache.insert(href.clone(), Arc::clone(&data));
                            data
                        }
                        Err(e) => {
                            warn!("Could not load the external graphic '{}': {}.", href, e);
                            return;
                        }
                    }
                }
            };

            g.image = Some(GraphicImage { format: format.clone(), data });
            g.image_url = Some(href);
        });
    }

    /// Loads an `OnlineResource` or an `InlineContent`.
    ///
    /// Errors are logged and result in `None`.
    pub(crate) fn load_resource(&self, node: Node) -> Option<Resource> {
        if node.tag_name().name() == "InlineContent" {
            return self.load_inline_content(node);
        }

        if let Some(url) = self.parse_online_resource(node) {
            return self.open_url(url);
        }

        // An URL built from feature properties.
        let mut href = String::new();
        let mut contn: Continuation<String> = Continuation::new();
        self.update_or_continue(node, &mut href, |s, v| s.push_str(v), &mut contn);

        if !contn.is_empty() {
            return Some(Resource::Deferred(contn));
        }

        if href.is_empty() {
            return None;
        }

        match self.resolver().resolve(&href, self.base.as_ref()) {
            Ok(url) => self.open_url(url),
            Err(e) => {
                warn!("Could not resolve '{}' at {}: {}.", href, self.location(node), e);
                None
            }
        }
    }

    fn open_url(&self, url: Url) -> Option<Resource> {
        debug!("Loading '{}'.", url);
        match self.resolver().open(&url) {
            Ok(data) => Some(Resource::Loaded { data, url: Some(url.to_string()) }),
            Err(e) => {
                warn!("Could not load '{}': {}.", url, e);
                None
            }
        }
    }

    fn load_inline_content(&self, node: Node) -> Option<Resource> {
        let encoding = node.attribute("encoding").unwrap_or("xml");
        if encoding.eq_ignore_ascii_case("base64") {
            let text: String = element_text(node).split_whitespace().collect();
            match base64::engine::general_purpose::STANDARD.decode(text.as_bytes()) {
                Ok(data) => Some(Resource::Loaded { data, url: None }),
                Err(e) => {
                    warn!("Invalid base64 inline content at {}: {}.", self.location(node), e);
                    None
                }
            }
        } else {
            let data = match first_element(node) {
                Some(child) => subtree_source(child),
                None => element_text(node),
            };
            Some(Resource::Loaded { data: data.into_bytes(), url: None })
        }
    }

    pub(crate) fn parse_font(&self, node: Node) -> (Font, Continuation<Font>) {
        let mut base = Font::default();
        let mut contn: Continuation<Font> = Continuation::new();

        for child in elements(node) {
            if !child.tag_name().name().ends_with("Parameter") {
                self.skip_unknown(child);
                continue;
            }

            match child.attribute("name").unwrap_or("") {
                "font-family" => {
                    self.update_or_continue(child, &mut base, |f, v| {
                        f.font_family.push(v.to_string());
                    }, &mut contn);
                }
                "font-style" => {
                    self.update_or_continue(child, &mut base, |f, v| {
                        f.font_style = parse_or(v, FontStyle::Normal);
                    }, &mut contn);
                }
                "font-weight" => {
                    self.update_or_continue(child, &mut base, |f, v| {
                        f.bold = v.trim().eq_ignore_ascii_case("bold");
                    }, &mut contn);
                }
                "font-size" => {
                    self.update_or_continue(child, &mut base, |f, v| {
                        if let Some(n) = number(v) {
                            f.font_size = n.round() as i32;
                        }
                    }, &mut contn);
                }
                "font-color" => {
                    warn!("The non-standard font-color parameter at {} is not supported. \
                           Use a Fill element instead.", self.location(child));
                }
                name => {
                    warn!("The parameter '{}' at {} is not supported.", name, self.location(child));
                }
            }
        }

        (base, contn)
    }

    pub(crate) fn parse_halo(&self, node: Node) -> (Halo, Continuation<Halo>) {
        let mut base = Halo::default();
        let mut contn: Continuation<Halo> = Continuation::new();

        for child in elements(node) {
            match child.tag_name().name() {
                "Radius" => {
                    self.update_or_continue(child, &mut base, |h, v| {
                        if let Some(n) = number(v) {
                            h.radius = n;
                        }
                    }, &mut contn);
                }
                "Fill" => {
                    let (fill, fcontn) = self.parse_fill(child);
                    base.fill = Some(Arc::new(fill));
                    contn.nest(fcontn, |h| h.fill.as_mut().map(Arc::make_mut));
                }
                _ => self.skip_unknown(child),
            }
        }

        (base, contn)
    }

    pub(crate) fn parse_line_placement(&self, node: Node) -> (LinePlacement, Continuation<LinePlacement>) {
        let mut base = LinePlacement::default();
        let mut contn: Continuation<LinePlacement> = Continuation::new();

        for child in elements(node) {
            match child.tag_name().name() {
                "PerpendicularOffset" => {
                    base.perpendicular_offset_type = perpendicular_offset_type(child);
                    self.update_or_continue(child, &mut base, |l, v| {
                        if let Some(n) = number(v) {
                            l.perpendicular_offset = n;
                        }
                    }, &mut contn);
                }
                "InitialGap" => {
                    self.update_or_continue(child, &mut base, |l, v| {
                        if let Some(n) = number(v) {
                            l.initial_gap = n;
                        }
                    }, &mut contn);
                }
                "Gap" => {
                    self.update_or_continue(child, &mut base, |l, v| {
                        if let Some(n) = number(v) {
                            l.gap = n;
                        }
                    }, &mut contn);
                }
                "GeneralizeLine" => {
                    self.update_or_continue(child, &mut base, |l, v| {
                        l.generalize_line = parse_bool(v);
                    }, &mut contn);
                }
                "IsAligned" => {
                    self.update_or_continue(child, &mut base, |l, v| {
                        l.is_aligned = parse_bool(v);
                    }, &mut contn);
                }
                "IsRepeated" => {
                    self.update_or_continue(child, &mut base, |l, v| {
                        l.repeat = parse_bool(v);
                    }, &mut contn);
                }
                _ => self.skip_unknown(child),
            }
        }

        (base, contn)
    }
}

/// Reads the `type` and `substraction` attributes of a `PerpendicularOffset`.
pub(crate) fn perpendicular_offset_type(node: Node) -> PerpendicularOffsetType {
    let mut t = PerpendicularOffsetType::default();
    if let Some(v) = node.attribute("type") {
        t.kind = parse_or(v, OffsetKind::Standard);
    }
    if let Some(v) = node.attribute("substraction") {
        t.substraction = parse_or(v, Substraction::None);
    }
    t
}

fn load(resolver: &dyn ResourceResolver, href: &str, base: Option<&Url>) -> ::std::io::Result<Vec<u8>> {
    let url = resolver.resolve(href, base)?;
    debug!("Loading '{}'.", url);
    resolver.open(&url)
}
