// Copyright 2026 The symbology Developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use std::collections::HashMap;
use std::sync::Arc;

use log::{error, warn};
use roxmltree::Node;

use super::components::perpendicular_offset_type;
use super::{color, element_text, elements, first_element, number, Context};
use crate::continuation::Continuation;
use crate::styling::{
    ChannelSelection,
    ColorMap,
    ColorMapEntry,
    ContrastEnhancement,
    LineStyling,
    Overlap,
    PointStyling,
    PolygonStyling,
    RasterStyling,
    ShadedRelief,
    TextStyling,
    Uom,
};
use crate::symbolizer::{AnySymbolizer, Common, Label, Symbolizer};
use crate::traits::parse_or;
use crate::types::parse_bool;

const SE_NS: &str = "http://www.opengis.net/se";

impl<'p> Context<'p> {
    pub(crate) fn parse_symbolizer(&self, node: Node) -> Option<AnySymbolizer> {
        let uom = Uom::from_attribute(node.attribute("uom"));

        let sym = match node.tag_name().name() {
            "PointSymbolizer" => AnySymbolizer::Point(self.parse_point_symbolizer(node, uom)),
            "LineSymbolizer" => AnySymbolizer::Line(self.parse_line_symbolizer(node, uom)),
            "PolygonSymbolizer" => AnySymbolizer::Polygon(self.parse_polygon_symbolizer(node, uom)),
            "RasterSymbolizer" => AnySymbolizer::Raster(self.parse_raster_symbolizer(node, uom)),
            "TextSymbolizer" => {
                let (sym, label) = self.parse_text_symbolizer(node, uom);
                AnySymbolizer::Text(sym, label)
            }
            _ => {
                self.skip_unknown(node);
                return None;
            }
        };

        Some(sym)
    }

    fn new_common(&self, node: Node) -> Common {
        let mut common = Common::default();
        common.location = self.location(node);
        common
    }

    pub(crate) fn parse_point_symbolizer(&self, node: Node, uom: Uom) -> Symbolizer<PointStyling> {
        let mut common = self.new_common(node);
        let mut base = PointStyling { uom, ..PointStyling::default() };
        let mut contn: Continuation<PointStyling> = Continuation::new();

        for child in elements(node) {
            if self.check_common(&mut common, child) {
                continue;
            }

            match child.tag_name().name() {
                "Graphic" => {
                    let (graphic, gcontn) = self.parse_graphic(child);
                    base.graphic = Some(Arc::new(graphic));
                    contn.nest(gcontn, |s| s.graphic.as_mut().map(Arc::make_mut));
                }
                _ => self.skip_unknown(child),
            }
        }

        Symbolizer::new(base, Some(contn), common)
    }

    pub(crate) fn parse_line_symbolizer(&self, node: Node, uom: Uom) -> Symbolizer<LineStyling> {
        let mut common = self.new_common(node);
        let mut base = LineStyling { uom, ..LineStyling::default() };
        let mut contn: Continuation<LineStyling> = Continuation::new();

        for child in elements(node) {
            if self.check_common(&mut common, child) {
                continue;
            }

            match child.tag_name().name() {
                "Stroke" => {
                    let (stroke, scontn) = self.parse_stroke(child);
                    base.stroke = Some(Arc::new(stroke));
                    contn.nest(scontn, |s| s.stroke.as_mut().map(Arc::make_mut));
                }
                "PerpendicularOffset" => {
                    base.perpendicular_offset_type = perpendicular_offset_type(child);
                    self.update_or_continue(child, &mut base, |s, v| {
                        if let Some(n) = number(v) {
                            s.perpendicular_offset = n;
                        }
                    }, &mut contn);
                }
                _ => self.skip_unknown(child),
            }
        }

        Symbolizer::new(base, Some(contn), common)
    }

    pub(crate) fn parse_polygon_symbolizer(&self, node: Node, uom: Uom) -> Symbolizer<PolygonStyling> {
        let mut common = self.new_common(node);
        let mut base = PolygonStyling { uom, ..PolygonStyling::default() };
        let mut contn: Continuation<PolygonStyling> = Continuation::new();

        for child in elements(node) {
            if self.check_common(&mut common, child) {
                continue;
            }

            match child.tag_name().name() {
                "Fill" => {
                    let (fill, fcontn) = self.parse_fill(child);
                    base.fill = Some(Arc::new(fill));
                    contn.nest(fcontn, |s| s.fill.as_mut().map(Arc::make_mut));
                }
                "Stroke" => {
                    let (stroke, scontn) = self.parse_stroke(child);
                    base.stroke = Some(Arc::new(stroke));
                    contn.nest(scontn, |s| s.stroke.as_mut().map(Arc::make_mut));
                }
                "PerpendicularOffset" => {
                    base.perpendicular_offset_type = perpendicular_offset_type(child);
                    self.update_or_continue(child, &mut base, |s, v| {
                        if let Some(n) = number(v) {
                            s.perpendicular_offset = n;
                        }
                    }, &mut contn);
                }
                "Displacement" => {
                    for sub in elements(child) {
                        match sub.tag_name().name() {
                            "DisplacementX" => {
                                self.update_or_continue(sub, &mut base, |s, v| {
                                    if let Some(n) = number(v) {
                                        s.displacement_x = n;
                                    }
                                }, &mut contn);
                            }
                            "DisplacementY" => {
                                self.update_or_continue(sub, &mut base, |s, v| {
                                    if let Some(n) = number(v) {
                                        s.displacement_y = n;
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

        Symbolizer::new(base, Some(contn), common)
    }

    pub(crate) fn parse_text_symbolizer(
        &self,
        node: Node,
        uom: Uom,
    ) -> (Symbolizer<TextStyling>, Option<Label>) {
        let mut common = self.new_common(node);
        let mut base = TextStyling { uom, ..TextStyling::default() };
        let mut contn: Continuation<TextStyling> = Continuation::new();
        let mut label = None;

        for child in elements(node) {
            if self.check_common(&mut common, child) {
                continue;
            }

            match child.tag_name().name() {
                "Label" => {
                    let mut text = String::new();
                    let mut lcontn: Continuation<String> = Continuation::new();
                    let xml = self.update_or_continue(child, &mut text, |s, v| s.push_str(v), &mut lcontn);
                    label = Some(Label {
                        text,
                        continuation: lcontn.into_option(),
                        xml,
                    });
                }
                "LabelPlacement" => {
                    for sub in elements(child) {
                        match sub.tag_name().name() {
                            "PointPlacement" => {
                                self.parse_point_placement(sub, &mut base, &mut contn);
                            }
                            "LinePlacement" => {
                                let (placement, pcontn) = self.parse_line_placement(sub);
                                base.line_placement = Some(Arc::new(placement));
                                contn.nest(pcontn, |s| s.line_placement.as_mut().map(Arc::make_mut));
                            }
                            _ => self.skip_unknown(sub),
                        }
                    }
                }
                "Halo" => {
                    let (halo, hcontn) = self.parse_halo(child);
                    base.halo = Some(Arc::new(halo));
                    contn.nest(hcontn, |s| s.halo.as_mut().map(Arc::make_mut));
                }
                "Font" => {
                    let (font, fcontn) = self.parse_font(child);
                    base.font = Some(Arc::new(font));
                    contn.nest(fcontn, |s| s.font.as_mut().map(Arc::make_mut));
                }
                "Fill" => {
                    let (fill, fcontn) = self.parse_fill(child);
                    base.fill = Some(Arc::new(fill));
                    contn.nest(fcontn, |s| s.fill.as_mut().map(Arc::make_mut));
                }
                _ => self.skip_unknown(child),
            }
        }

        (Symbolizer::new(base, Some(contn), common), label)
    }

    fn parse_point_placement(&self, node: Node, base: &mut TextStyling, contn: &mut Continuation<TextStyling>) {
        for child in elements(node) {
            match child.tag_name().name() {
                "AnchorPoint" => {
                    for sub in elements(child) {
                        match sub.tag_name().name() {
                            "AnchorPointX" => {
                                self.update_or_continue(sub, base, |s, v| {
                                    if let Some(n) = number(v) {
                                        s.anchor_point_x = n;
                                    }
                                }, contn);
                            }
                            "AnchorPointY" => {
                                self.update_or_continue(sub, base, |s, v| {
                                    if let Some(n) = number(v) {
                                        s.anchor_point_y = n;
                                    }
                                }, contn);
                            }
                            _ => self.skip_unknown(sub),
                        }
                    }
                }
                "Displacement" => {
                    for sub in elements(child) {
                        match sub.tag_name().name() {
                            "DisplacementX" => {
                                self.update_or_continue(sub, base, |s, v| {
                                    if let Some(n) = number(v) {
                                        s.displacement_x = n;
                                    }
                                }, contn);
                            }
                            "DisplacementY" => {
                                self.update_or_continue(sub, base, |s, v| {
                                    if let Some(n) = number(v) {
                                        s.displacement_y = n;
                                    }
                                }, contn);
                            }
                            _ => self.skip_unknown(sub),
                        }
                    }
                }
                "Rotation" => {
                    self.update_or_continue(child, base, |s, v| {
                        if let Some(n) = number(v) {
                            s.rotation = n;
                        }
                    }, contn);
                }
                _ => self.skip_unknown(child),
            }
        }
    }

    pub(crate) fn parse_raster_symbolizer(&self, node: Node, uom: Uom) -> Symbolizer<RasterStyling> {
        let mut common = self.new_common(node);
        let mut base = RasterStyling { uom, ..RasterStyling::default() };
        let mut contn: Continuation<RasterStyling> = Continuation::new();

        for child in elements(node) {
            if self.check_common(&mut common, child) {
                continue;
            }

            match child.tag_name().name() {
                "Opacity" => {
                    self.update_or_continue(child, &mut base, |s, v| {
                        if let Some(n) = number(v) {
                            s.opacity = n;
                        }
                    }, &mut contn);
                }
                "ChannelSelection" => {
                    base.channel_selection = Some(self.parse_channel_selection(child));
                }
                "OverlapBehavior" => {
                    // SE keeps the value as text, SLD 1.0 as an empty child element.
                    let text = if is_se(child) {
                        element_text(child)
                    } else {
                        first_element(child)
                            .map(|n| n.tag_name().name().to_string())
                            .unwrap_or_default()
                    };
                    base.overlap = parse_or(&text, Overlap::LatestOnTop);
                }
                "ColorMap" => {
                    base.color_map = self.parse_color_map(child);
                }
                "ContrastEnhancement" => {
                    base.contrast_enhancement = Some(self.parse_contrast_enhancement(child));
                }
                "ShadedRelief" => {
                    base.shaded = Some(self.parse_shaded_relief(child));
                }
                "ImageOutline" => {
                    base.image_outline = self.parse_image_outline(child).map(Arc::new);
                }
                _ => self.skip_unknown(child),
            }
        }

        Symbolizer::new(base, Some(contn), common)
    }

    fn parse_channel_selection(&self, node: Node) -> ChannelSelection {
        let mut selection = ChannelSelection::default();
        let mut enhancements = HashMap::new();

        for child in elements(node) {
            let key = match child.tag_name().name() {
                "RedChannel" => "red",
                "GreenChannel" => "green",
                "BlueChannel" => "blue",
                "GrayChannel" => "gray",
                _ => {
                    self.skip_unknown(child);
                    continue;
                }
            };

            let mut source = None;
            for sub in elements(child) {
                match sub.tag_name().name() {
                    "SourceChannelName" => source = Some(element_text(sub)),
                    "ContrastEnhancement" => {
                        enhancements.insert(key.to_string(), self.parse_contrast_enhancement(sub));
                    }
                    _ => self.skip_unknown(sub),
                }
            }

            if source.is_none() {
                warn!("Channel without a SourceChannelName at {}.", self.location(child));
            }

            match key {
                "red" => selection.red = source,
                "green" => selection.green = source,
                "blue" => selection.blue = source,
                _ => selection.gray = source,
            }
        }

        selection.enhancements = enhancements;
        selection
    }

    fn parse_contrast_enhancement(&self, node: Node) -> ContrastEnhancement {
        let mut enh = ContrastEnhancement::default();

        for child in elements(node) {
            match child.tag_name().name() {
                "Normalize" => enh.normalize = true,
                "Histogram" => enh.histogram = true,
                "GammaValue" => {
                    if let Some(n) = number(&element_text(child)) {
                        enh.gamma = n;
                    }
                }
                _ => self.skip_unknown(child),
            }
        }

        enh
    }

    fn parse_shaded_relief(&self, node: Node) -> ShadedRelief {
        let mut shaded = ShadedRelief::default();

        for child in elements(node) {
            match child.tag_name().name() {
                "BrightnessOnly" => shaded.brightness_only = parse_bool(&element_text(child)),
                "ReliefFactor" => {
                    if let Some(n) = number(&element_text(child)) {
                        shaded.relief_factor = n;
                    }
                }
                "AzimuthAngle" => {
                    if let Some(n) = number(&element_text(child)) {
                        shaded.azimuth_angle = n;
                    }
                }
                "IlluminationAngle" => {
                    if let Some(n) = number(&element_text(child)) {
                        shaded.illumination_angle = n;
                    }
                }
                _ => self.skip_unknown(child),
            }
        }

        shaded
    }

    fn parse_color_map(&self, node: Node) -> Option<ColorMap> {
        if is_se(node) {
            let func = match first_element(node) {
                Some(n) => n,
                None => {
                    warn!("Empty ColorMap at {}.", self.location(node));
                    return None;
                }
            };

            match func.tag_name().name() {
                "Categorize" | "Interpolate" => {
                    match self.decoder().parse_expression(func) {
                        Ok(e) => Some(ColorMap::Function(e)),
                        Err(e) => {
                            warn!("Unsupported color map function at {}: {}.", self.location(func), e);
                            None
                        }
                    }
                }
                _ => {
                    self.skip_unknown(func);
                    None
                }
            }
        } else {
            let mut entries = Vec::new();
            for child in elements(node) {
                if !child.has_tag_name("ColorMapEntry") {
                    self.skip_unknown(child);
                    continue;
                }

                let mut c = match child.attribute("color").and_then(color) {
                    Some(c) => c,
                    None => {
                        warn!("ColorMapEntry without a valid color at {}, skipping.", self.location(child));
                        continue;
                    }
                };

                if let Some(n) = child.attribute("opacity").and_then(number) {
                    c.set_opacity(n);
                }

                entries.push(ColorMapEntry {
                    color: c,
                    quantity: child.attribute("quantity").and_then(number).unwrap_or(0.0),
                    label: child.attribute("label").map(String::from),
                });
            }

            Some(ColorMap::Entries(entries))
        }
    }

    fn parse_image_outline(&self, node: Node) -> Option<AnySymbolizer> {
        let child = first_element(node)?;
        let uom = Uom::from_attribute(child.attribute("uom"));
        match child.tag_name().name() {
            "LineSymbolizer" => Some(AnySymbolizer::Line(self.parse_line_symbolizer(child, uom))),
            "PolygonSymbolizer" => Some(AnySymbolizer::Polygon(self.parse_polygon_symbolizer(child, uom))),
            name => {
                error!("ImageOutline at {} must contain a line or polygon symbolizer, found '{}'.",
                       self.location(node), name);
                None
            }
        }
    }
}

fn is_se(node: Node) -> bool {
    node.tag_name().namespace() == Some(SE_NS)
}
