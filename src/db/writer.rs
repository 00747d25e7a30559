// Copyright 2026 The symbology Developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use std::io::{self, BufRead, BufReader, Read};
use std::sync::Arc;

use base64::Engine;
use log::{info, warn};

use super::{table, Connection, ConnectionProvider, SqlType, SqlValue};
use crate::error::{DbError, Error};
use crate::parser::{escape_text, ParseOptions, SymbologyParser};
use crate::style::{ScaleRange, Style};
use crate::styling::{
    Fill,
    Font,
    Graphic,
    Halo,
    LinePlacement,
    LineStyling,
    PointStyling,
    PolygonStyling,
    Stroke,
    Styling,
    TextStyling,
};
use crate::symbolizer::Label;
use crate::traits::Keyword;

/// Writes styles to the relational tables.
///
/// Simple styles are flattened into component rows, children first.
/// Other styles are stored as XML documents.
///
/// Each styling is written in its own transaction. A failed write is
/// logged and not rolled back, so it may leave orphaned component rows.
pub struct StyleWriter {
    provider: Arc<dyn ConnectionProvider>,
    conn_id: String,
    schema: Option<String>,
    parser: SymbologyParser,
}

impl StyleWriter {
    /// Constructs a writer that uses the `conn_id` connection of `provider`.
    pub fn new(provider: Arc<dyn ConnectionProvider>, conn_id: &str) -> Self {
        let opt = ParseOptions {
            collect_xml_snippets: true,
            ..ParseOptions::default()
        };

        StyleWriter {
            provider,
            conn_id: conn_id.to_string(),
            schema: None,
            parser: SymbologyParser::with_options(opt),
        }
    }

    /// Sets a schema that qualifies all table names.
    pub fn with_schema(mut self, schema: &str) -> Self {
        self.schema = Some(schema.to_string());
        self
    }

    /// Replaces the parser used by `write_document`.
    ///
    /// The parser should collect XML snippets, otherwise feature dependent
    /// labels can't be stored.
    pub fn with_parser(mut self, parser: SymbologyParser) -> Self {
        self.parser = parser;
        self
    }

    fn table(&self, name: &str) -> String {
        table(self.schema.as_ref().map(String::as_str), name)
    }

    /// Writes a style.
    ///
    /// `name` overrides the style name. Errors are logged.
    pub fn write(&self, style: &Style, name: Option<&str>) {
        let name = name.or_else(|| style.name());

        if !style.is_simple() {
            if let Some(source) = style.source() {
                self.write_blob(source, name);
                return;
            }

            warn!("The style '{}' depends on feature properties and has no source document. \
                   Only its static parts will be stored.", name.unwrap_or(""));
        }

        for (bases, scale) in style.bases_with_scales() {
            for (styling, label) in bases {
                if let Err(e) = self.write_styling(&styling, scale, name, label) {
                    info!("Unable to write style to DB: '{}'.", e);
                }
            }
        }
    }

    /// Writes an XML document as is.
    ///
    /// Read errors are returned, database errors are logged.
    pub fn write_raw<R: Read>(&self, reader: R, name: Option<&str>) -> io::Result<()> {
        let mut text = String::new();
        for line in BufReader::new(reader).lines() {
            text.push_str(&line?);
            text.push('\n');
        }

        self.write_blob(&text, name);
        Ok(())
    }

    /// Parses and writes a document.
    ///
    /// Simple styles are stored relationally, everything else as is.
    pub fn write_document(&self, text: &str, name: Option<&str>) -> Result<(), Error> {
        let style = match self.parser.parse_str(text)? {
            Some(style) => style,
            None => {
                warn!("The document does not contain a style, nothing was written.");
                return Ok(());
            }
        };

        if style.is_simple() {
            self.write(&style, name);
        } else {
            self.write_blob(text, name.or_else(|| style.name()));
        }

        Ok(())
    }

    fn write_blob(&self, text: &str, name: Option<&str>) {
        let res = (|| -> Result<(), DbError> {
            let mut conn = self.provider.connection(&self.conn_id)?;
            conn.begin()?;
            let sql = format!("insert into {} (sld, name) values ($1, $2)", self.table("styles"));
            conn.execute(&sql, &[SqlValue::Text(text.to_string()), SqlValue::opt_text(name)])?;
            conn.commit()
        })();

        if let Err(e) = res {
            info!("Unable to write style to DB: '{}'.", e);
        }
    }

    fn write_styling(
        &self,
        styling: &Styling,
        scale: ScaleRange,
        name: Option<&str>,
        label: Option<&Label>,
    ) -> Result<(), DbError> {
        let mut conn = self.provider.connection(&self.conn_id)?;
        let conn = &mut *conn;
        conn.begin()?;

        let (kind, fk) = match *styling {
            Styling::Point(ref s) => ("POINT", self.write_point(conn, s)?),
            Styling::Line(ref s) => ("LINE", self.write_line(conn, s)?),
            Styling::Polygon(ref s) => ("POLYGON", self.write_polygon(conn, s)?),
            Styling::Text(ref s) => ("TEXT", self.write_text(conn, s, label)?),
            Styling::Raster(_) => {
                warn!("Raster stylings can't be stored in the component tables, skipping.");
                return Ok(());
            }
        };

        let sql = format!("insert into {} (type, fk, minscale, maxscale, name) \
                           values ($1, $2, $3, $4, $5)", self.table("styles"));
        conn.execute(&sql, &[
            SqlValue::Text(kind.to_string()),
            SqlValue::Int(fk),
            SqlValue::opt_double(Some(scale.min).filter(|v| v.is_finite())),
            SqlValue::opt_double(Some(scale.max).filter(|v| v.is_finite())),
            SqlValue::opt_text(name),
        ])?;

        conn.commit()
    }

    fn insert(&self, conn: &mut dyn Connection, name: &str, columns: &[&str], values: &[SqlValue])
        -> Result<i32, DbError>
    {
        let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("${}", i)).collect();
        let sql = format!("insert into {} ({}) values ({}) returning id",
                          self.table(name), columns.join(", "), placeholders.join(", "));
        conn.insert_returning_id(&sql, values)
    }

    fn write_graphic(&self, conn: &mut dyn Connection, graphic: &Graphic) -> Result<i32, DbError> {
        let mut wkn = None;
        let mut svg = None;
        let mut raster = None;
        let mut fill_id = None;
        let mut stroke_id = None;

        if let Some(ref image) = graphic.image {
            raster = Some(base64::engine::general_purpose::STANDARD.encode(image.data.as_slice()));
        } else if let Some(ref mark) = graphic.mark {
            match mark.source {
                Some(ref source) if source.format.eq_ignore_ascii_case("svg") => {
                    svg = Some(String::from_utf8_lossy(&source.data).into_owned());
                }
                Some(ref source) => {
                    warn!("Marks in the '{}' format can't be stored, using '{}' instead.",
                          source.format, mark.well_known);
                    wkn = Some(mark.well_known.to_keyword());
                }
                None => wkn = Some(mark.well_known.to_keyword()),
            }

            if let Some(ref fill) = mark.fill {
                fill_id = Some(self.write_fill(conn, fill)?);
            }
            if let Some(ref stroke) = mark.stroke {
                stroke_id = Some(self.write_stroke(conn, stroke)?);
            }
        }

        self.insert(conn, "graphics", &[
            "size", "rotation", "anchorx", "anchory", "displacementx", "displacementy",
            "wellknownname", "svg", "base64raster", "fill_id", "stroke_id",
        ], &[
            SqlValue::Double(graphic.size),
            SqlValue::Double(graphic.rotation),
            SqlValue::Double(graphic.anchor_point_x),
            SqlValue::Double(graphic.anchor_point_y),
            SqlValue::Double(graphic.displacement_x),
            SqlValue::Double(graphic.displacement_y),
            SqlValue::opt_text(wkn),
            SqlValue::opt_text(svg),
            SqlValue::opt_text(raster),
            SqlValue::opt_int(fill_id),
            SqlValue::opt_int(stroke_id),
        ])
    }

    fn write_fill(&self, conn: &mut dyn Connection, fill: &Fill) -> Result<i32, DbError> {
        let graphic_id = match fill.graphic {
            Some(ref g) => Some(self.write_graphic(conn, g)?),
            None => None,
        };

        self.insert(conn, "fills", &["color", "graphic_id"], &[
            SqlValue::Text(fill.color.to_hex()),
            SqlValue::opt_int(graphic_id),
        ])
    }

    fn write_stroke(&self, conn: &mut dyn Connection, stroke: &Stroke) -> Result<i32, DbError> {
        let stroke_graphic_id = match stroke.stroke {
            Some(ref g) => Some(self.write_graphic(conn, g)?),
            None => None,
        };
        let fill_graphic_id = match stroke.fill {
            Some(ref g) => Some(self.write_graphic(conn, g)?),
            None => None,
        };
        let dash_array = stroke.dash_array.as_ref().map(|list| {
            list.iter().map(|n| n.to_string()).collect::<Vec<_>>().join(" ")
        });
        let position = Some(stroke.position_percentage).filter(|v| *v >= 0.0);

        self.insert(conn, "strokes", &[
            "color", "width", "linejoin", "linecap", "dasharray", "dashoffset",
            "stroke_graphic_id", "fill_graphic_id", "strokegap", "strokeinitialgap",
            "positionpercentage",
        ], &[
            SqlValue::Text(stroke.color.to_hex()),
            SqlValue::Double(stroke.width),
            SqlValue::Text(stroke.line_join.to_keyword().to_string()),
            SqlValue::Text(stroke.line_cap.to_keyword().to_string()),
            SqlValue::opt_text(dash_array),
            SqlValue::Double(stroke.dash_offset),
            SqlValue::opt_int(stroke_graphic_id),
            SqlValue::opt_int(fill_graphic_id),
            SqlValue::Double(stroke.stroke_gap),
            SqlValue::Double(stroke.stroke_initial_gap),
            SqlValue::opt_double(position),
        ])
    }

    fn write_font(&self, conn: &mut dyn Connection, font: &Font) -> Result<i32, DbError> {
        let family = if font.font_family.is_empty() {
            None
        } else {
            Some(font.font_family.join(","))
        };

        self.insert(conn, "fonts", &["family", "style", "bold", "size"], &[
            SqlValue::opt_text(family),
            SqlValue::Text(font.font_style.to_keyword().to_string()),
            SqlValue::Bool(font.bold),
            SqlValue::Int(font.font_size),
        ])
    }

    fn write_line_placement(&self, conn: &mut dyn Connection, lp: &LinePlacement) -> Result<i32, DbError> {
        self.insert(conn, "lineplacements", &[
            "perpendicularoffset", "repeat", "initialgap", "gap", "isaligned", "generalizeline",
        ], &[
            SqlValue::Double(lp.perpendicular_offset),
            SqlValue::Bool(lp.repeat),
            SqlValue::Double(lp.initial_gap),
            SqlValue::Double(lp.gap),
            SqlValue::Bool(lp.is_aligned),
            SqlValue::Bool(lp.generalize_line),
        ])
    }

    fn write_halo(&self, conn: &mut dyn Connection, halo: &Halo) -> Result<i32, DbError> {
        let fill_id = match halo.fill {
            Some(ref f) => Some(self.write_fill(conn, f)?),
            None => None,
        };

        self.insert(conn, "halos", &["fill_id", "radius"], &[
            SqlValue::opt_int(fill_id),
            SqlValue::Double(halo.radius),
        ])
    }

    fn write_point(&self, conn: &mut dyn Connection, styling: &PointStyling) -> Result<i32, DbError> {
        let graphic_id = match styling.graphic {
            Some(ref g) => Some(self.write_graphic(conn, g)?),
            None => None,
        };

        self.insert(conn, "points", &["uom", "graphic_id"], &[
            SqlValue::Text(styling.uom.to_string()),
            SqlValue::opt_int(graphic_id),
        ])
    }

    fn write_line(&self, conn: &mut dyn Connection, styling: &LineStyling) -> Result<i32, DbError> {
        let stroke_id = match styling.stroke {
            Some(ref s) => Some(self.write_stroke(conn, s)?),
            None => None,
        };

        self.insert(conn, "lines", &["uom", "stroke_id", "perpendicularoffset"], &[
            SqlValue::Text(styling.uom.to_string()),
            SqlValue::opt_int(stroke_id),
            SqlValue::Double(styling.perpendicular_offset),
        ])
    }

    fn write_polygon(&self, conn: &mut dyn Connection, styling: &PolygonStyling) -> Result<i32, DbError> {
        let fill_id = match styling.fill {
            Some(ref f) => Some(self.write_fill(conn, f)?),
            None => None,
        };
        let stroke_id = match styling.stroke {
            Some(ref s) => Some(self.write_stroke(conn, s)?),
            None => None,
        };

        self.insert(conn, "polygons", &[
            "uom", "fill_id", "stroke_id", "displacementx", "displacementy", "perpendicularoffset",
        ], &[
            SqlValue::Text(styling.uom.to_string()),
            SqlValue::opt_int(fill_id),
            SqlValue::opt_int(stroke_id),
            SqlValue::Double(styling.displacement_x),
            SqlValue::Double(styling.displacement_y),
            SqlValue::Double(styling.perpendicular_offset),
        ])
    }

    fn write_text(&self, conn: &mut dyn Connection, styling: &TextStyling, label: Option<&Label>)
        -> Result<i32, DbError>
    {
        let font_id = match styling.font {
            Some(ref f) => Some(self.write_font(conn, f)?),
            None => None,
        };
        let fill_id = match styling.fill {
            Some(ref f) => Some(self.write_fill(conn, f)?),
            None => None,
        };
        let placement_id = match styling.line_placement {
            Some(ref lp) => Some(self.write_line_placement(conn, lp)?),
            None => None,
        };
        let halo_id = match styling.halo {
            Some(ref h) => Some(self.write_halo(conn, h)?),
            None => None,
        };

        self.insert(conn, "texts", &[
            "labelexpr", "uom", "font_id", "fill_id", "rotation", "displacementx", "displacementy",
            "anchorx", "anchory", "lineplacement_id", "halo_id",
        ], &[
            label.and_then(label_expression).map(SqlValue::Text).unwrap_or(SqlValue::Null(SqlType::Text)),
            SqlValue::Text(styling.uom.to_string()),
            SqlValue::opt_int(font_id),
            SqlValue::opt_int(fill_id),
            SqlValue::Double(styling.rotation),
            SqlValue::Double(styling.displacement_x),
            SqlValue::Double(styling.displacement_y),
            SqlValue::Double(styling.anchor_point_x),
            SqlValue::Double(styling.anchor_point_y),
            SqlValue::opt_int(placement_id),
            SqlValue::opt_int(halo_id),
        ])
    }
}

/// Returns the stored form of a label.
///
/// A label that depends on feature properties needs its XML snippet.
fn label_expression(label: &Label) -> Option<String> {
    if let Some(ref xml) = label.xml {
        return Some(xml.clone());
    }

    if label.continuation.is_some() {
        warn!("The label '{}' depends on feature properties, but its XML was not collected. \
               Only the literal part will be stored.", label.text);
    }

    Some(escape_text(&label.text))
}
