// Copyright 2026 The symbology Developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use pretty_assertions::assert_eq;

use symbology::db::{SqliteProvider, StyleReader, StyleWriter};
use symbology::filter::{PropertyEvaluator, SimpleFeature};
use symbology::{
    AnySymbolizer,
    Color,
    ParseOptions,
    Style,
    Styling,
    SymbologyParser,
};

const SE: &str = r#"xmlns:se="http://www.opengis.net/se" xmlns:ogc="http://www.opengis.net/ogc""#;

const SCHEMA: &str = "
    create table graphics (
        id integer primary key autoincrement,
        size real, rotation real, anchorx real, anchory real,
        displacementx real, displacementy real,
        wellknownname text, svg text, base64raster text,
        fill_id integer, stroke_id integer
    );
    create table fills (
        id integer primary key autoincrement,
        color text, graphic_id integer
    );
    create table strokes (
        id integer primary key autoincrement,
        color text, width real, linejoin text, linecap text,
        dasharray text, dashoffset real,
        stroke_graphic_id integer, fill_graphic_id integer,
        strokegap real, strokeinitialgap real, positionpercentage real
    );
    create table fonts (
        id integer primary key autoincrement,
        family text, style text, bold boolean, size integer
    );
    create table lineplacements (
        id integer primary key autoincrement,
        perpendicularoffset real, repeat boolean, initialgap real, gap real,
        isaligned boolean, generalizeline boolean
    );
    create table halos (
        id integer primary key autoincrement,
        fill_id integer, radius real
    );
    create table points (
        id integer primary key autoincrement,
        uom text, graphic_id integer
    );
    create table lines (
        id integer primary key autoincrement,
        uom text, stroke_id integer, perpendicularoffset real
    );
    create table polygons (
        id integer primary key autoincrement,
        uom text, fill_id integer, stroke_id integer,
        displacementx real, displacementy real, perpendicularoffset real
    );
    create table texts (
        id integer primary key autoincrement,
        labelexpr text, uom text, font_id integer, fill_id integer,
        rotation real, displacementx real, displacementy real,
        anchorx real, anchory real, lineplacement_id integer, halo_id integer
    );
    create table styles (
        id integer primary key autoincrement,
        type text, fk integer, minscale real, maxscale real, sld text, name text
    );
";

struct Db {
    // Removes the database on drop.
    _dir: tempfile::TempDir,
    path: PathBuf,
    provider: Arc<SqliteProvider>,
}

impl Db {
    fn new() -> Db {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("styles.sqlite");

        let conn = rusqlite::Connection::open(&path).unwrap();
        conn.execute_batch(SCHEMA).unwrap();

        let mut provider = SqliteProvider::new();
        provider.add_connection("styles", &path);

        Db { _dir: dir, path, provider: Arc::new(provider) }
    }

    fn reader(&self) -> StyleReader {
        StyleReader::new(self.provider.clone(), "styles")
    }

    fn writer(&self) -> StyleWriter {
        StyleWriter::new(self.provider.clone(), "styles")
    }

    fn execute(&self, sql: &str) {
        connect(&self.path).execute_batch(sql).unwrap();
    }

    fn style_ids(&self) -> Vec<i32> {
        let conn = connect(&self.path);
        let mut stmt = conn.prepare("select id from styles order by id").unwrap();
        let ids = stmt.query_map([], |row| row.get::<_, i32>(0)).unwrap();
        ids.map(|id| id.unwrap()).collect()
    }

    fn single_style(&self) -> i32 {
        let ids = self.style_ids();
        assert_eq!(ids.len(), 1);
        ids[0]
    }

    fn column(&self, sql: &str) -> Option<String> {
        connect(&self.path).query_row(sql, [], |row| row.get::<_, Option<String>>(0)).unwrap()
    }
}

fn connect(path: &Path) -> rusqlite::Connection {
    rusqlite::Connection::open(path).unwrap()
}

fn parse(text: &str) -> Style {
    SymbologyParser::new().parse_str(text).unwrap().unwrap()
}

fn only_symbolizer(style: &Style) -> &AnySymbolizer {
    assert_eq!(style.rules().len(), 1);
    assert_eq!(style.rules()[0].symbolizers.len(), 1);
    &style.rules()[0].symbolizers[0]
}

fn assert_same_base(a: &Style, b: &Style) {
    match (only_symbolizer(a).base(), only_symbolizer(b).base()) {
        (Styling::Point(a), Styling::Point(b)) => assert_eq!(a, b),
        (Styling::Line(a), Styling::Line(b)) => assert_eq!(a, b),
        (Styling::Polygon(a), Styling::Polygon(b)) => assert_eq!(a, b),
        (Styling::Text(a), Styling::Text(b)) => assert_eq!(a, b),
        (a, b) => panic!("stylings differ: {:?} and {:?}", a, b),
    }
}

#[test]
fn round_trip_point_1() {
    let db = Db::new();
    let style = parse(&format!("
        <se:PointSymbolizer {} uom='http://www.opengeospatial.org/se/units/metre'>
            <se:Name>cities</se:Name>
            <se:Graphic>
                <se:Mark>
                    <se:WellKnownName>circle</se:WellKnownName>
                    <se:Fill>
                        <se:SvgParameter name='fill'>#ff0000</se:SvgParameter>
                    </se:Fill>
                    <se:Stroke>
                        <se:SvgParameter name='stroke-width'>2</se:SvgParameter>
                    </se:Stroke>
                </se:Mark>
                <se:Size>12</se:Size>
                <se:Rotation>30</se:Rotation>
            </se:Graphic>
        </se:PointSymbolizer>", SE));

    db.writer().write(&style, None);
    let id = db.single_style();
    assert_eq!(db.column("select type from styles").as_ref().map(String::as_str), Some("POINT"));
    assert_eq!(db.column("select sld from styles"), None);

    let read = db.reader().get_style(id).unwrap();
    assert_eq!(read.name(), Some("cities"));
    assert_same_base(&style, &read);
}

#[test]
fn round_trip_line_1() {
    let db = Db::new();
    let style = parse(&format!("
        <se:LineSymbolizer {}>
            <se:Stroke>
                <se:SvgParameter name='stroke'>#336699</se:SvgParameter>
                <se:SvgParameter name='stroke-width'>3</se:SvgParameter>
                <se:SvgParameter name='stroke-linejoin'>bevel</se:SvgParameter>
                <se:SvgParameter name='stroke-linecap'>round</se:SvgParameter>
                <se:SvgParameter name='stroke-dasharray'>5 2.5</se:SvgParameter>
                <se:GraphicStroke>
                    <se:Graphic>
                        <se:Mark><se:WellKnownName>x</se:WellKnownName></se:Mark>
                    </se:Graphic>
                    <se:Gap>10</se:Gap>
                    <se:PositionPercentage>50</se:PositionPercentage>
                </se:GraphicStroke>
            </se:Stroke>
            <se:PerpendicularOffset>-1.5</se:PerpendicularOffset>
        </se:LineSymbolizer>", SE));

    db.writer().write(&style, Some("roads"));
    let id = db.single_style();

    let read = db.reader().get_style(id).unwrap();
    assert_eq!(read.name(), Some("roads"));
    assert_same_base(&style, &read);
}

#[test]
fn round_trip_polygon_1() {
    let db = Db::new();
    let style = parse(&format!("
        <se:PolygonSymbolizer {} uom='mm'>
            <se:Fill>
                <se:SvgParameter name='fill'>#00ff00</se:SvgParameter>
                <se:GraphicFill>
                    <se:Graphic>
                        <se:ExternalGraphic>
                            <se:InlineContent encoding='base64'>AQID</se:InlineContent>
                        </se:ExternalGraphic>
                    </se:Graphic>
                </se:GraphicFill>
            </se:Fill>
            <se:Displacement>
                <se:DisplacementX>4</se:DisplacementX>
                <se:DisplacementY>5</se:DisplacementY>
            </se:Displacement>
        </se:PolygonSymbolizer>", SE));

    db.writer().write(&style, Some("parks"));
    let read = db.reader().get_style(db.single_style()).unwrap();

    let polygon = match only_symbolizer(&read).base() {
        Styling::Polygon(p) => p,
        s => panic!("expected a polygon styling, got {:?}", s),
    };

    let fill = polygon.fill.clone().unwrap();
    assert_eq!(fill.color, Color::new(0, 255, 0));
    let image = fill.graphic.as_ref().unwrap().image.clone().unwrap();
    assert_eq!(image.data.as_slice(), &[1, 2, 3]);
    assert_eq!(polygon.displacement_x, 4.0);
    assert_eq!(polygon.displacement_y, 5.0);
    assert_eq!(polygon.uom, symbology::Uom::Mm);
}

#[test]
fn round_trip_text_1() {
    let db = Db::new();
    let text = format!("
        <se:TextSymbolizer {}>
            <se:Label>(<ogc:PropertyName>ref</ogc:PropertyName>)</se:Label>
            <se:Font>
                <se:SvgParameter name='font-family'>DejaVu Sans</se:SvgParameter>
                <se:SvgParameter name='font-family'>Arial</se:SvgParameter>
                <se:SvgParameter name='font-weight'>bold</se:SvgParameter>
                <se:SvgParameter name='font-size'>14</se:SvgParameter>
            </se:Font>
            <se:LabelPlacement>
                <se:LinePlacement>
                    <se:PerpendicularOffset>3</se:PerpendicularOffset>
                    <se:IsRepeated>true</se:IsRepeated>
                    <se:Gap>20</se:Gap>
                </se:LinePlacement>
            </se:LabelPlacement>
            <se:Halo>
                <se:Radius>1.5</se:Radius>
                <se:Fill>
                    <se:SvgParameter name='fill'>#ffff00</se:SvgParameter>
                </se:Fill>
            </se:Halo>
        </se:TextSymbolizer>", SE);

    db.writer().write_document(&text, Some("labels")).unwrap();
    let read = db.reader().get_style(db.single_style()).unwrap();
    assert_same_base(&parse(&text), &read);

    let f = SimpleFeature::new(None).with("ref", "A1");
    let list = read.evaluate(Some(&f), 1.0, &PropertyEvaluator);
    assert_eq!(list[0].label.as_ref().map(String::as_str), Some("(A1)"));
}

#[test]
fn round_trip_text_2() {
    // Literal labels are escaped.
    let db = Db::new();
    let style = parse(&format!("
        <se:TextSymbolizer {}>
            <se:Label>Fish &amp; Chips</se:Label>
        </se:TextSymbolizer>", SE));

    db.writer().write(&style, None);
    let id = db.single_style();
    assert_eq!(db.column("select labelexpr from texts").as_ref().map(String::as_str),
               Some("Fish &amp; Chips"));

    let read = db.reader().get_style(id).unwrap();
    assert_eq!(read.name(), Some(id.to_string().as_str()));
    assert_eq!(only_symbolizer(&read).label().unwrap().text, "Fish & Chips");
}

#[test]
fn shared_components_1() {
    let db = Db::new();
    db.execute("
        insert into fills (id, color) values (1, '#ff0000');
        insert into polygons (id, uom, fill_id) values (1, 'Pixel', 1), (2, 'Pixel', 1);
        insert into styles (id, type, fk) values (1, 'POLYGON', 1), (2, 'polygon', 2);
    ");

    let fill = |style: &Style| match *only_symbolizer(style) {
        AnySymbolizer::Polygon(ref s) => s.base().fill.clone().unwrap(),
        ref s => panic!("expected a polygon symbolizer, got {:?}", s),
    };

    let mut reader = db.reader();
    let a = reader.get_style(1).unwrap();
    let b = reader.get_style(2).unwrap();
    assert!(Arc::ptr_eq(&fill(&a), &fill(&b)));
    assert_eq!(fill(&a).color, Color::new(255, 0, 0));

    // Pools are not shared between readers.
    let c = db.reader().get_style(2).unwrap();
    assert!(!Arc::ptr_eq(&fill(&a), &fill(&c)));
    assert_eq!(fill(&a), fill(&c));
}

#[test]
fn scale_1() {
    let db = Db::new();
    db.execute("
        insert into lines (id, uom) values (1, 'Pixel');
        insert into styles (id, type, fk, minscale, maxscale) values (1, 'LINE', 1, 1000, 25000.5);
    ");

    let style = db.reader().get_style(1).unwrap();
    let scale = style.rules()[0].scale;
    assert_eq!(scale.min, 1000.0);
    assert_eq!(scale.max, 25000.5);
}

#[test]
fn missing_rows_1() {
    let db = Db::new();
    db.execute("
        insert into points (id, uom, graphic_id) values (1, 'Pixel', 77);
        insert into styles (id, type, fk) values (1, 'POINT', 1), (2, 'POINT', 99);
    ");

    let mut reader = db.reader();
    assert!(reader.get_style(42).is_none());
    // A missing styling row drops the whole style.
    assert!(reader.get_style(2).is_none());

    // A missing component is left unset.
    let style = reader.get_style(1).unwrap();
    match *only_symbolizer(&style) {
        AnySymbolizer::Point(ref s) => assert!(s.base().graphic.is_none()),
        ref s => panic!("expected a point symbolizer, got {:?}", s),
    }
}

#[test]
fn unknown_type_1() {
    let db = Db::new();
    db.execute("
        insert into styles (id, type, fk) values (1, 'CIRCLE', 1);
        insert into styles (id, name) values (2, 'empty');
    ");

    let mut reader = db.reader();
    assert!(reader.get_style(1).is_none());
    assert!(reader.get_style(2).is_none());
}

#[test]
fn unknown_connection_1() {
    let db = Db::new();
    let provider = db.provider.clone();
    assert!(StyleReader::new(provider.clone(), "other").get_style(1).is_none());

    StyleWriter::new(provider, "other").write(&parse(&format!("<se:LineSymbolizer {}/>", SE)), None);
    assert!(db.style_ids().is_empty());
}

#[test]
fn complex_style_1() {
    let db = Db::new();
    let style = parse(&format!("
        <se:FeatureTypeStyle {}>
            <se:Name>rivers</se:Name>
            <se:Rule>
                <se:MaxScaleDenominator>50000</se:MaxScaleDenominator>
                <se:LineSymbolizer/>
            </se:Rule>
            <se:Rule>
                <se:PolygonSymbolizer/>
            </se:Rule>
        </se:FeatureTypeStyle>", SE));
    assert!(!style.is_simple());

    db.writer().write(&style, None);
    let id = db.single_style();
    assert_eq!(db.column("select type from styles"), None);

    let read = db.reader().get_style(id).unwrap();
    assert_eq!(read.name(), Some("rivers"));
    assert_eq!(read.rules().len(), 2);
    assert_eq!(read.rules()[0].scale.max, 50000.0);
}

#[test]
fn complex_style_2() {
    // Without a source only the templates are stored.
    let db = Db::new();
    let opt = ParseOptions {
        keep_source: false,
        ..ParseOptions::default()
    };
    let style = SymbologyParser::with_options(opt).parse_str(&format!("
        <se:FeatureTypeStyle {}>
            <se:Rule>
                <se:LineSymbolizer>
                    <se:Stroke>
                        <se:SvgParameter name='stroke-width'><ogc:PropertyName>w</ogc:PropertyName></se:SvgParameter>
                    </se:Stroke>
                </se:LineSymbolizer>
                <se:RasterSymbolizer/>
            </se:Rule>
        </se:FeatureTypeStyle>", SE)).unwrap().unwrap();

    db.writer().write(&style, Some("partial"));
    assert_eq!(db.style_ids().len(), 1);
    assert_eq!(db.column("select type from styles").as_ref().map(String::as_str), Some("LINE"));
}

#[test]
fn write_document_1() {
    let db = Db::new();
    let text = format!("
        <se:FeatureTypeStyle {}>
            <se:Rule>
                <ogc:Filter>
                    <ogc:PropertyIsEqualTo>
                        <ogc:PropertyName>kind</ogc:PropertyName>
                        <ogc:Literal>river</ogc:Literal>
                    </ogc:PropertyIsEqualTo>
                </ogc:Filter>
                <se:LineSymbolizer/>
            </se:Rule>
        </se:FeatureTypeStyle>", SE);

    db.writer().write_document(&text, Some("filtered")).unwrap();
    assert_eq!(db.column("select sld from styles"), Some(text));

    let read = db.reader().get_style(db.single_style()).unwrap();
    assert_eq!(read.name(), Some("filtered"));

    let f = SimpleFeature::new(None).with("kind", "lake");
    assert!(read.evaluate(Some(&f), 1.0, &PropertyEvaluator).is_empty());
}

#[test]
fn write_document_2() {
    let db = Db::new();
    assert!(db.writer().write_document("<se:Rule", None).is_err());
    db.writer().write_document("<Foo/>", None).unwrap();
    assert!(db.style_ids().is_empty());
}

#[test]
fn write_raw_1() {
    let db = Db::new();
    let text = format!("<se:LineSymbolizer {}>\n<se:Name>raw</se:Name>\n</se:LineSymbolizer>", SE);

    db.writer().write_raw(text.as_bytes(), Some("stored")).unwrap();
    assert_eq!(db.column("select sld from styles"), Some(format!("{}\n", text)));

    let read = db.reader().get_style(db.single_style()).unwrap();
    assert_eq!(read.name(), Some("stored"));
}

#[test]
fn schema_1() {
    let db = Db::new();
    let style = parse(&format!("<se:LineSymbolizer {}/>", SE));

    db.writer().with_schema("main").write(&style, Some("qualified"));
    let read = db.reader().with_schema("main").get_style(db.single_style()).unwrap();
    assert_eq!(read.name(), Some("qualified"));
}
