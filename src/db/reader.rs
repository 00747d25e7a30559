// Copyright 2026 The symbology Developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use std::collections::HashMap;
use std::sync::Arc;

use base64::Engine;
use log::{debug, info, warn};

use super::{table, Connection, ConnectionProvider, Row, SqlValue};
use crate::continuation::Continuation;
use crate::error::DbError;
use crate::parser::SymbologyParser;
use crate::style::{Rule, RuleFilter, ScaleRange, Style};
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
    LineStyling,
    Mark,
    MarkSource,
    PointStyling,
    PolygonStyling,
    SimpleMark,
    Stroke,
    TextStyling,
    Uom,
};
use crate::symbolizer::{AnySymbolizer, Common, Label, Symbolizer};
use crate::traits::Keyword;
use crate::types::{parse_number_list, Color};

/// Namespaces a stored label expression may use without declaring them.
const LABEL_NAMESPACES: &str = "xmlns:ogc=\"http://www.opengis.net/ogc\" \
                                xmlns:fes=\"http://www.opengis.net/fes/2.0\" \
                                xmlns:se=\"http://www.opengis.net/se\" \
                                xmlns:sld=\"http://www.opengis.net/sld\"";

/// Reads styles from the relational tables.
///
/// Fills, strokes, graphics, fonts, line placements and halos are pooled by
/// row id for the lifetime of the reader, so components referenced by several
/// rows are shared. Point, line, polygon and text stylings are always
/// constructed anew.
pub struct StyleReader {
    provider: Arc<dyn ConnectionProvider>,
    conn_id: String,
    schema: Option<String>,
    parser: SymbologyParser,

    fills: HashMap<i32, Arc<Fill>>,
    strokes: HashMap<i32, Arc<Stroke>>,
    graphics: HashMap<i32, Arc<Graphic>>,
    fonts: HashMap<i32, Arc<Font>>,
    line_placements: HashMap<i32, Arc<LinePlacement>>,
    halos: HashMap<i32, Arc<Halo>>,
}

impl StyleReader {
    /// Constructs a reader that uses the `conn_id` connection of `provider`.
    pub fn new(provider: Arc<dyn ConnectionProvider>, conn_id: &str) -> Self {
        StyleReader {
            provider,
            conn_id: conn_id.to_string(),
            schema: None,
            parser: SymbologyParser::new(),
            fills: HashMap::new(),
            strokes: HashMap::new(),
            graphics: HashMap::new(),
            fonts: HashMap::new(),
            line_placements: HashMap::new(),
            halos: HashMap::new(),
        }
    }

    /// Sets a schema that qualifies all table names.
    pub fn with_schema(mut self, schema: &str) -> Self {
        self.schema = Some(schema.to_string());
        self
    }

    /// Replaces the parser used for stored documents and label expressions.
    ///
    /// Set `ParseOptions::system_id` to resolve relative references
    /// inside stored documents.
    pub fn with_parser(mut self, parser: SymbologyParser) -> Self {
        self.parser = parser;
        self
    }

    /// Reads a style by its `styles.id`.
    ///
    /// Returns `None` when the row doesn't exist, has an unknown type,
    /// has neither a reference nor a document, or when any error occurs.
    /// Errors are logged.
    pub fn get_style(&mut self, id: i32) -> Option<Style> {
        match self.read_style(id) {
            Ok(style) => style,
            Err(e) => {
                info!("Unable to read style from DB: '{}'.", e);
                None
            }
        }
    }

    fn table(&self, name: &str) -> String {
        table(self.schema.as_ref().map(String::as_str), name)
    }

    fn select(&self, conn: &mut dyn Connection, columns: &str, name: &str, id: i32)
        -> Result<Option<Row>, DbError>
    {
        let sql = format!("select {} from {} where id = $1", columns, self.table(name));
        conn.select_one(&sql, &[SqlValue::Int(id)])
    }

    fn read_style(&mut self, id: i32) -> Result<Option<Style>, DbError> {
        let mut conn = self.provider.connection(&self.conn_id)?;
        let conn = &mut *conn;

        let row = match self.select(conn, "type, fk, minscale, maxscale, sld, name", "styles", id)? {
            Some(row) => row,
            None => {
                debug!("No style with id {}.", id);
                return Ok(None);
            }
        };

        let name = row.get_str("name").map(String::from).unwrap_or_else(|| id.to_string());

        if let Some(kind) = row.get_str("type") {
            let fk = row.get_i32("fk").ok_or(DbError::NoRows)?;

            let sym = match kind.to_uppercase().as_str() {
                "POINT" => {
                    let base = self.point_styling(conn, fk)?;
                    AnySymbolizer::Point(Symbolizer::new(base, None, Common::default()))
                }
                "LINE" => {
                    let base = self.line_styling(conn, fk)?;
                    AnySymbolizer::Line(Symbolizer::new(base, None, Common::default()))
                }
                "POLYGON" => {
                    let base = self.polygon_styling(conn, fk)?;
                    AnySymbolizer::Polygon(Symbolizer::new(base, None, Common::default()))
                }
                "TEXT" => {
                    let (base, label) = self.text_styling(conn, fk)?;
                    AnySymbolizer::Text(Symbolizer::new(base, None, Common::default()), label)
                }
                _ => {
                    warn!("Unknown style type '{}' for the style with id {}.", kind, id);
                    return Ok(None);
                }
            };

            let mut scale = ScaleRange::default();
            if let Some(min) = row.get_f64("minscale") {
                scale.min = min;
            }
            if let Some(max) = row.get_f64("maxscale") {
                scale.max = max;
            }

            let rule = Rule {
                filter: RuleFilter::None,
                symbolizers: vec![sym],
                common: Common::default(),
                scale,
            };

            return Ok(Some(Style::new(vec![rule], Some(name))));
        }

        if let Some(sld) = row.get_str("sld") {
            return match self.parser.parse_str(sld) {
                Ok(Some(mut style)) => {
                    if row.get_str("name").is_some() {
                        style.set_name(Some(name));
                    }
                    Ok(Some(style))
                }
                Ok(None) => Ok(None),
                Err(e) => {
                    info!("Unable to read style from DB: '{}'.", e);
                    Ok(None)
                }
            };
        }

        warn!("The style with id {} has neither a type nor a document.", id);
        Ok(None)
    }

    fn graphic(&mut self, conn: &mut dyn Connection, id: i32) -> Result<Option<Arc<Graphic>>, DbError> {
        if let Some(graphic) = self.graphics.get(&id) {
            return Ok(Some(Arc::clone(graphic)));
        }

        let columns = "size, rotation, anchorx, anchory, displacementx, displacementy, \
                       wellknownname, svg, base64raster, fill_id, stroke_id";
        let row = match self.select(conn, columns, "graphics", id)? {
            Some(row) => row,
            None => return missing("graphics", id),
        };

        let mut res = Graphic::default();
        let mut mark = Mark::default();

        if let Some(v) = row.get_f64("size") {
            res.size = v;
        }
        if let Some(v) = row.get_f64("rotation") {
            res.rotation = v;
        }
        if let Some(v) = row.get_f64("anchorx") {
            res.anchor_point_x = v;
        }
        if let Some(v) = row.get_f64("anchory") {
            res.anchor_point_y = v;
        }
        if let Some(v) = row.get_f64("displacementx") {
            res.displacement_x = v;
        }
        if let Some(v) = row.get_f64("displacementy") {
            res.displacement_y = v;
        }
        if let Some(wkn) = row.get_str("wellknownname") {
            mark.well_known = match SimpleMark::from_keyword(wkn) {
                Some(v) => v,
                None => {
                    debug!("Found unknown 'well known name' '{}' for the symbol with id '{}' \
                            in the database, using square instead.", wkn, id);
                    SimpleMark::Square
                }
            };
        }
        if let Some(svg) = row.get_str("svg") {
            mark.source = Some(MarkSource {
                format: "svg".to_string(),
                data: svg.as_bytes().to_vec(),
                url: None,
            });
        }
        if let Some(raster) = row.get_str("base64raster") {
            let text: String = raster.split_whitespace().collect();
            match base64::engine::general_purpose::STANDARD.decode(text.as_bytes()) {
                Ok(data) => res.image = Some(GraphicImage { format: None, data: Arc::new(data) }),
                Err(e) => {
                    debug!("A base64 encoded image could not be read from the database, \
                            for the symbol with id '{}', error was '{}'.", id, e);
                }
            }
        }
        if let Some(fill_id) = row.get_i32("fill_id") {
            mark.fill = self.fill(conn, fill_id)?;
        }
        if let Some(stroke_id) = row.get_i32("stroke_id") {
            mark.stroke = self.stroke(conn, stroke_id)?;
        }

        res.mark = Some(Arc::new(mark));

        let res = Arc::new(res);
        self.graphics.insert(id, Arc::clone(&res));
        Ok(Some(res))
    }

    fn stroke(&mut self, conn: &mut dyn Connection, id: i32) -> Result<Option<Arc<Stroke>>, DbError> {
        if let Some(stroke) = self.strokes.get(&id) {
            return Ok(Some(Arc::clone(stroke)));
        }

        let columns = "color, width, linejoin, linecap, dasharray, dashoffset, stroke_graphic_id, \
                       fill_graphic_id, strokegap, strokeinitialgap, positionpercentage";
        let row = match self.select(conn, columns, "strokes", id)? {
            Some(row) => row,
            None => return missing("strokes", id),
        };

        let mut res = Stroke::default();

        if let Some(c) = row.get_str("color").and_then(|s| color(s, id)) {
            res.color = c;
        }
        if let Some(v) = row.get_f64("width") {
            res.width = v;
        }
        if let Some(s) = row.get_str("linejoin") {
            match LineJoin::from_keyword(s) {
                Some(v) => res.line_join = v,
                None => debug!("The linejoin value '{}' for stroke with id '{}' could not be parsed.", s, id),
            }
        }
        if let Some(s) = row.get_str("linecap") {
            match LineCap::from_keyword(s) {
                Some(v) => res.line_cap = v,
                None => debug!("The linecap value '{}' for stroke with id '{}' could not be parsed.", s, id),
            }
        }
        if let Some(s) = row.get_str("dasharray") {
            res.dash_array = parse_number_list(s);
        }
        if let Some(v) = row.get_f64("dashoffset") {
            res.dash_offset = v;
        }
        if let Some(gid) = row.get_i32("stroke_graphic_id") {
            res.stroke = self.graphic(conn, gid)?;
        }
        if let Some(gid) = row.get_i32("fill_graphic_id") {
            res.fill = self.graphic(conn, gid)?;
        }
        if let Some(v) = row.get_f64("strokegap") {
            res.stroke_gap = v;
        }
        if let Some(v) = row.get_f64("strokeinitialgap") {
            res.stroke_initial_gap = v;
        }
        if let Some(v) = row.get_f64("positionpercentage") {
            res.position_percentage = v;
        }

        let res = Arc::new(res);
        self.strokes.insert(id, Arc::clone(&res));
        Ok(Some(res))
    }

    fn fill(&mut self, conn: &mut dyn Connection, id: i32) -> Result<Option<Arc<Fill>>, DbError> {
        if let Some(fill) = self.fills.get(&id) {
            return Ok(Some(Arc::clone(fill)));
        }

        let row = match self.select(conn, "color, graphic_id", "fills", id)? {
            Some(row) => row,
            None => return missing("fills", id),
        };

        let mut res = Fill::default();
        if let Some(c) = row.get_str("color").and_then(|s| color(s, id)) {
            res.color = c;
        }
        if let Some(gid) = row.get_i32("graphic_id") {
            res.graphic = self.graphic(conn, gid)?;
        }

        let res = Arc::new(res);
        self.fills.insert(id, Arc::clone(&res));
        Ok(Some(res))
    }

    fn font(&mut self, conn: &mut dyn Connection, id: i32) -> Result<Option<Arc<Font>>, DbError> {
        if let Some(font) = self.fonts.get(&id) {
            return Ok(Some(Arc::clone(font)));
        }

        let row = match self.select(conn, "family, style, bold, size", "fonts", id)? {
            Some(row) => row,
            None => return missing("fonts", id),
        };

        let mut res = Font::default();
        if let Some(family) = row.get_str("family") {
            res.font_family.extend(
                family.split(',').map(str::trim).filter(|s| !s.is_empty()).map(String::from)
            );
        }
        if let Some(s) = row.get_str("style") {
            match FontStyle::from_keyword(s) {
                Some(v) => res.font_style = v,
                None => debug!("Found invalid font-style parameter '{}' for font with ID {}.", s, id),
            }
        }
        if let Some(v) = row.get_bool("bold") {
            res.bold = v;
        }
        if let Some(v) = row.get_f64("size") {
            res.font_size = v.round() as i32;
        }

        let res = Arc::new(res);
        self.fonts.insert(id, Arc::clone(&res));
        Ok(Some(res))
    }

    fn line_placement(&mut self, conn: &mut dyn Connection, id: i32)
        -> Result<Option<Arc<LinePlacement>>, DbError>
    {
        if let Some(placement) = self.line_placements.get(&id) {
            return Ok(Some(Arc::clone(placement)));
        }

        let columns = "perpendicularoffset, repeat, initialgap, gap, isaligned, generalizeline";
        let row = match self.select(conn, columns, "lineplacements", id)? {
            Some(row) => row,
            None => return missing("lineplacements", id),
        };

        let mut res = LinePlacement::default();
        if let Some(v) = row.get_f64("perpendicularoffset") {
            res.perpendicular_offset = v;
        }
        if let Some(v) = row.get_bool("repeat") {
            res.repeat = v;
        }
        if let Some(v) = row.get_f64("initialgap") {
            res.initial_gap = v;
        }
        if let Some(v) = row.get_f64("gap") {
            res.gap = v;
        }
        if let Some(v) = row.get_bool("isaligned") {
            res.is_aligned = v;
        }
        if let Some(v) = row.get_bool("generalizeline") {
            res.generalize_line = v;
        }

        let res = Arc::new(res);
        self.line_placements.insert(id, Arc::clone(&res));
        Ok(Some(res))
    }

    fn halo(&mut self, conn: &mut dyn Connection, id: i32) -> Result<Option<Arc<Halo>>, DbError> {
        if let Some(halo) = self.halos.get(&id) {
            return Ok(Some(Arc::clone(halo)));
        }

        let row = match self.select(conn, "fill_id, radius", "halos", id)? {
            Some(row) => row,
            None => return missing("halos", id),
        };

        let mut res = Halo::default();
        if let Some(fid) = row.get_i32("fill_id") {
            res.fill = self.fill(conn, fid)?;
        }
        if let Some(v) = row.get_f64("radius") {
            res.radius = v;
        }

        let res = Arc::new(res);
        self.halos.insert(id, Arc::clone(&res));
        Ok(Some(res))
    }

    fn point_styling(&mut self, conn: &mut dyn Connection, id: i32) -> Result<PointStyling, DbError> {
        let row = self.select(conn, "uom, graphic_id", "points", id)?.ok_or(DbError::NoRows)?;

        let mut res = PointStyling::default();
        if let Some(uom) = row.get_str("uom") {
            res.uom = Uom::from_attribute(Some(uom));
        }
        if let Some(gid) = row.get_i32("graphic_id") {
            res.graphic = self.graphic(conn, gid)?;
        }

        Ok(res)
    }

    fn line_styling(&mut self, conn: &mut dyn Connection, id: i32) -> Result<LineStyling, DbError> {
        let row = self.select(conn, "uom, stroke_id, perpendicularoffset", "lines", id)?
            .ok_or(DbError::NoRows)?;

        let mut res = LineStyling::default();
        if let Some(uom) = row.get_str("uom") {
            res.uom = Uom::from_attribute(Some(uom));
        }
        if let Some(sid) = row.get_i32("stroke_id") {
            res.stroke = self.stroke(conn, sid)?;
        }
        if let Some(v) = row.get_f64("perpendicularoffset") {
            res.perpendicular_offset = v;
        }

        Ok(res)
    }

    fn polygon_styling(&mut self, conn: &mut dyn Connection, id: i32) -> Result<PolygonStyling, DbError> {
        let columns = "uom, fill_id, stroke_id, displacementx, displacementy, perpendicularoffset";
        let row = self.select(conn, columns, "polygons", id)?.ok_or(DbError::NoRows)?;

        let mut res = PolygonStyling::default();
        if let Some(uom) = row.get_str("uom") {
            res.uom = Uom::from_attribute(Some(uom));
        }
        if let Some(fid) = row.get_i32("fill_id") {
            res.fill = self.fill(conn, fid)?;
        }
        if let Some(sid) = row.get_i32("stroke_id") {
            res.stroke = self.stroke(conn, sid)?;
        }
        if let Some(v) = row.get_f64("displacementx") {
            res.displacement_x = v;
        }
        if let Some(v) = row.get_f64("displacementy") {
            res.displacement_y = v;
        }
        if let Some(v) = row.get_f64("perpendicularoffset") {
            res.perpendicular_offset = v;
        }

        Ok(res)
    }

    fn text_styling(&mut self, conn: &mut dyn Connection, id: i32)
        -> Result<(TextStyling, Option<Label>), DbError>
    {
        let columns = "labelexpr, uom, font_id, fill_id, rotation, displacementx, displacementy, \
                       anchorx, anchory, lineplacement_id, halo_id";
        let row = self.select(conn, columns, "texts", id)?.ok_or(DbError::NoRows)?;

        let mut res = TextStyling::default();
        if let Some(uom) = row.get_str("uom") {
            res.uom = Uom::from_attribute(Some(uom));
        }
        if let Some(fid) = row.get_i32("font_id") {
            res.font = self.font(conn, fid)?;
        }
        if let Some(fid) = row.get_i32("fill_id") {
            res.fill = self.fill(conn, fid)?;
        }
        if let Some(v) = row.get_f64("rotation") {
            res.rotation = v;
        }
        if let Some(v) = row.get_f64("displacementx") {
            res.displacement_x = v;
        }
        if let Some(v) = row.get_f64("displacementy") {
            res.displacement_y = v;
        }
        if let Some(v) = row.get_f64("anchorx") {
            res.anchor_point_x = v;
        }
        if let Some(v) = row.get_f64("anchory") {
            res.anchor_point_y = v;
        }
        if let Some(lid) = row.get_i32("lineplacement_id") {
            res.line_placement = self.line_placement(conn, lid)?;
        }
        if let Some(hid) = row.get_i32("halo_id") {
            res.halo = self.halo(conn, hid)?;
        }

        let label = row.get_str("labelexpr").and_then(|expr| self.parse_label(expr, id));

        Ok((res, label))
    }

    /// Parses a stored label the same way a `Label` element is parsed.
    fn parse_label(&self, expr: &str, id: i32) -> Option<Label> {
        let text = format!("<Label {}>{}</Label>", LABEL_NAMESPACES, expr);
        let doc = match roxmltree::Document::parse(&text) {
            Ok(doc) => doc,
            Err(e) => {
                warn!("The label expression of the text styling with id {} is invalid: {}.", id, e);
                return None;
            }
        };

        let mut label = String::new();
        let mut contn: Continuation<String> = Continuation::new();
        self.parser.update_or_continue(doc.root_element(), &mut label, |s, v| s.push_str(v), &mut contn);

        Some(Label {
            text: label,
            continuation: contn.into_option(),
            xml: Some(expr.to_string()),
        })
    }
}

fn missing<T>(table: &str, id: i32) -> Result<Option<T>, DbError> {
    warn!("The {} row with id {} does not exist.", table, id);
    Ok(None)
}

fn color(text: &str, id: i32) -> Option<Color> {
    match text.parse() {
        Ok(c) => Some(c),
        Err(_) => {
            debug!("Found invalid color '{}' for the component with id {}.", text, id);
            None
        }
    }
}
