// Copyright 2026 The symbology Developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use std::fs;

use pretty_assertions::assert_eq;

use symbology::{
    AnySymbolizer,
    Color,
    FontStyle,
    LineCap,
    LineJoin,
    LineStyling,
    Overlap,
    ParseOptions,
    PointStyling,
    PolygonStyling,
    ScaleRange,
    SimpleMark,
    Style,
    Symbolizer,
    SymbologyParser,
    Uom,
};

const SE: &str = r#"xmlns:se="http://www.opengis.net/se" xmlns:ogc="http://www.opengis.net/ogc" xmlns:xlink="http://www.w3.org/1999/xlink""#;

fn parse(text: &str) -> Style {
    SymbologyParser::new().parse_str(text).unwrap().unwrap()
}

fn symbolizer(style: &Style) -> &AnySymbolizer {
    assert_eq!(style.rules().len(), 1);
    assert_eq!(style.rules()[0].symbolizers.len(), 1);
    &style.rules()[0].symbolizers[0]
}

fn point(style: &Style) -> &Symbolizer<PointStyling> {
    match *symbolizer(style) {
        AnySymbolizer::Point(ref s) => s,
        ref s => panic!("expected a point symbolizer, got {:?}", s),
    }
}

fn line(style: &Style) -> &Symbolizer<LineStyling> {
    match *symbolizer(style) {
        AnySymbolizer::Line(ref s) => s,
        ref s => panic!("expected a line symbolizer, got {:?}", s),
    }
}

fn polygon(style: &Style) -> &Symbolizer<PolygonStyling> {
    match *symbolizer(style) {
        AnySymbolizer::Polygon(ref s) => s,
        ref s => panic!("expected a polygon symbolizer, got {:?}", s),
    }
}

macro_rules! test_mark {
    ($name:ident, $wkn:expr, $mark:expr) => (
        #[test]
        fn $name() {
            let text = format!("
                <se:PointSymbolizer {}>
                    <se:Graphic>
                        <se:Mark>
                            <se:WellKnownName>{}</se:WellKnownName>
                        </se:Mark>
                    </se:Graphic>
                </se:PointSymbolizer>", SE, $wkn);

            let style = parse(&text);
            let graphic = point(&style).base().graphic.clone().unwrap();
            assert_eq!(graphic.mark.as_ref().unwrap().well_known, $mark);
        }
    )
}

test_mark!(well_known_name_1, "circle", SimpleMark::Circle);
test_mark!(well_known_name_2, "TRIANGLE", SimpleMark::Triangle);
test_mark!(well_known_name_3, "pentagon", SimpleMark::Square);
test_mark!(well_known_name_4, "", SimpleMark::Square);

#[test]
fn parse_empty_1() {
    assert!(SymbologyParser::new().parse_str("<Foo/>").unwrap().is_none());
}

#[test]
fn parse_empty_2() {
    assert!(SymbologyParser::new().parse_str("<se:PointSymbolizer").is_err());
}

#[test]
fn point_symbolizer_1() {
    let text = format!("
        <se:PointSymbolizer {}>
            <se:Name>cities</se:Name>
            <se:Graphic>
                <se:Mark>
                    <se:WellKnownName>CIRCLE</se:WellKnownName>
                    <se:Fill>
                        <se:SvgParameter name='fill'>#FF0000</se:SvgParameter>
                    </se:Fill>
                </se:Mark>
                <se:Size>12</se:Size>
                <se:Rotation>45</se:Rotation>
            </se:Graphic>
        </se:PointSymbolizer>", SE);

    let style = parse(&text);
    assert_eq!(style.name(), Some("cities"));
    assert!(style.is_simple());

    let sym = point(&style);
    assert!(sym.continuation().is_none());
    assert_eq!(sym.base().uom, Uom::Pixel);

    let graphic = sym.base().graphic.clone().unwrap();
    assert_eq!(graphic.size, 12.0);
    assert_eq!(graphic.rotation, 45.0);
    assert_eq!(graphic.opacity, 1.0);

    let mark = graphic.mark.clone().unwrap();
    assert_eq!(mark.well_known, SimpleMark::Circle);
    assert_eq!(mark.fill.as_ref().unwrap().color, Color::new(255, 0, 0));
}

#[test]
fn point_symbolizer_2() {
    let text = format!("
        <se:PointSymbolizer {}>
            <se:Graphic>
                <se:Size><ogc:PropertyName>size</ogc:PropertyName></se:Size>
            </se:Graphic>
        </se:PointSymbolizer>", SE);

    let style = parse(&text);
    assert!(!style.is_simple());

    let sym = point(&style);
    assert!(sym.continuation().is_some());
    // The template keeps the default.
    assert_eq!(sym.base().graphic.as_ref().unwrap().size, 6.0);
}

#[test]
fn line_symbolizer_1() {
    let text = format!("
        <se:LineSymbolizer {} uom='http://www.opengeospatial.org/se/units/metre'>
            <se:Stroke>
                <se:SvgParameter name='stroke'>#0000ff</se:SvgParameter>
                <se:SvgParameter name='stroke-width'>2.5</se:SvgParameter>
                <se:SvgParameter name='stroke-linejoin'>bevel</se:SvgParameter>
                <se:SvgParameter name='stroke-linecap'>square</se:SvgParameter>
                <se:SvgParameter name='stroke-dasharray'>5 2</se:SvgParameter>
                <se:SvgParameter name='stroke-dashoffset'>1</se:SvgParameter>
            </se:Stroke>
            <se:PerpendicularOffset>3</se:PerpendicularOffset>
        </se:LineSymbolizer>", SE);

    let style = parse(&text);
    let sym = line(&style);
    assert_eq!(sym.base().uom, Uom::Metre);
    assert_eq!(sym.base().perpendicular_offset, 3.0);

    let stroke = sym.base().stroke.clone().unwrap();
    assert_eq!(stroke.color, Color::new(0, 0, 255));
    assert_eq!(stroke.width, 2.5);
    assert_eq!(stroke.line_join, LineJoin::Bevel);
    assert_eq!(stroke.line_cap, LineCap::Square);
    assert_eq!(stroke.dash_array, Some(vec![5.0, 2.0]));
    assert_eq!(stroke.dash_offset, 1.0);
}

#[test]
fn line_symbolizer_2() {
    let text = format!("
        <se:LineSymbolizer {}>
            <se:Stroke>
                <se:SvgParameter name='stroke-linejoin'>wavy</se:SvgParameter>
                <se:SvgParameter name='stroke-linecap'>flat</se:SvgParameter>
                <se:SvgParameter name='stroke-width'>wide</se:SvgParameter>
                <se:SvgParameter name='stroke-dasharray'>5 a</se:SvgParameter>
            </se:Stroke>
        </se:LineSymbolizer>", SE);

    let style = parse(&text);
    let stroke = line(&style).base().stroke.clone().unwrap();
    assert_eq!(stroke.line_join, LineJoin::Round);
    assert_eq!(stroke.line_cap, LineCap::Butt);
    assert_eq!(stroke.width, 1.0);
    assert_eq!(stroke.dash_array, None);
}

#[test]
fn unknown_element_1() {
    let text = format!("
        <se:LineSymbolizer {}>
            <se:Sparkles>yes</se:Sparkles>
            <se:Stroke>
                <se:SvgParameter name='stroke-width'>4</se:SvgParameter>
            </se:Stroke>
        </se:LineSymbolizer>", SE);

    let style = parse(&text);
    assert_eq!(line(&style).base().stroke.as_ref().unwrap().width, 4.0);
}

#[test]
fn unknown_symbolizer_1() {
    let text = format!("
        <se:FeatureTypeStyle {}>
            <se:Rule>
                <se:SparkleSymbolizer/>
                <se:PointSymbolizer/>
            </se:Rule>
        </se:FeatureTypeStyle>", SE);

    let style = parse(&text);
    assert_eq!(style.rules()[0].symbolizers.len(), 1);
}

#[test]
fn polygon_symbolizer_1() {
    // SLD 1.0
    let text = "
        <StyledLayerDescriptor xmlns='http://www.opengis.net/sld'>
            <NamedLayer>
                <UserStyle>
                    <FeatureTypeStyle>
                        <Name>parks</Name>
                        <Rule>
                            <PolygonSymbolizer>
                                <Fill>
                                    <CssParameter name='fill'>#00ff00</CssParameter>
                                    <CssParameter name='fill-opacity'>0.5</CssParameter>
                                </Fill>
                            </PolygonSymbolizer>
                        </Rule>
                    </FeatureTypeStyle>
                </UserStyle>
            </NamedLayer>
        </StyledLayerDescriptor>";

    let style = parse(text);
    assert_eq!(style.name(), Some("parks"));

    let sym = polygon(&style);
    assert_eq!(sym.base().fill.as_ref().unwrap().color, Color::new_rgba(0, 255, 0, 128));
    assert!(sym.base().stroke.is_none());
}

#[test]
fn polygon_symbolizer_2() {
    // The opacity is kept when the color comes later.
    let text = format!("
        <se:PolygonSymbolizer {}>
            <se:Fill>
                <se:SvgParameter name='fill-opacity'>0</se:SvgParameter>
                <se:SvgParameter name='fill'>#ffffff</se:SvgParameter>
            </se:Fill>
            <se:Displacement>
                <se:DisplacementX>1</se:DisplacementX>
                <se:DisplacementY>-2</se:DisplacementY>
            </se:Displacement>
        </se:PolygonSymbolizer>", SE);

    let style = parse(&text);
    let sym = polygon(&style);
    assert_eq!(sym.base().fill.as_ref().unwrap().color, Color::new_rgba(255, 255, 255, 0));
    assert_eq!(sym.base().displacement_x, 1.0);
    assert_eq!(sym.base().displacement_y, -2.0);
}

#[test]
fn text_symbolizer_1() {
    let text = format!("
        <se:TextSymbolizer {}>
            <se:Label>Main St</se:Label>
            <se:Font>
                <se:SvgParameter name='font-family'>DejaVu Sans</se:SvgParameter>
                <se:SvgParameter name='font-family'>Arial</se:SvgParameter>
                <se:SvgParameter name='font-style'>italic</se:SvgParameter>
                <se:SvgParameter name='font-weight'>bold</se:SvgParameter>
                <se:SvgParameter name='font-size'>12.6</se:SvgParameter>
            </se:Font>
            <se:LabelPlacement>
                <se:LinePlacement>
                    <se:PerpendicularOffset type='round'>4</se:PerpendicularOffset>
                    <se:IsRepeated>true</se:IsRepeated>
                </se:LinePlacement>
            </se:LabelPlacement>
            <se:Halo>
                <se:Radius>2</se:Radius>
            </se:Halo>
        </se:TextSymbolizer>", SE);

    let style = parse(&text);
    let (sym, label) = match *symbolizer(&style) {
        AnySymbolizer::Text(ref sym, ref label) => (sym, label.as_ref().unwrap()),
        ref s => panic!("expected a text symbolizer, got {:?}", s),
    };

    assert_eq!(label.text, "Main St");
    assert!(label.continuation.is_none());
    assert!(label.xml.is_none());

    let font = sym.base().font.clone().unwrap();
    assert_eq!(font.font_family, vec!["DejaVu Sans".to_string(), "Arial".to_string()]);
    assert_eq!(font.font_style, FontStyle::Italic);
    assert!(font.bold);
    assert_eq!(font.font_size, 13);

    let placement = sym.base().line_placement.clone().unwrap();
    assert_eq!(placement.perpendicular_offset, 4.0);
    assert!(placement.repeat);

    assert_eq!(sym.base().halo.as_ref().unwrap().radius, 2.0);
    assert!(style.is_simple());
}

#[test]
fn text_symbolizer_2() {
    let text = format!("
        <se:TextSymbolizer {}>
            <se:Label>(<ogc:PropertyName>ref</ogc:PropertyName>)</se:Label>
        </se:TextSymbolizer>", SE);

    let opt = ParseOptions {
        collect_xml_snippets: true,
        ..ParseOptions::default()
    };
    let style = SymbologyParser::with_options(opt).parse_str(&text).unwrap().unwrap();

    let label = symbolizer(&style).label().unwrap();
    assert_eq!(label.text, "");
    assert!(label.continuation.is_some());

    let xml = label.xml.as_ref().unwrap();
    assert!(xml.contains("PropertyName"));
    assert_eq!(style.label_snippets().count(), 1);

    // A feature dependent label doesn't make a style complex.
    assert!(style.is_simple());
}

#[test]
fn raster_symbolizer_1() {
    let text = format!("
        <se:RasterSymbolizer {}>
            <se:Opacity>0.5</se:Opacity>
            <se:ChannelSelection>
                <se:RedChannel>
                    <se:SourceChannelName>1</se:SourceChannelName>
                    <se:ContrastEnhancement>
                        <se:GammaValue>1.5</se:GammaValue>
                    </se:ContrastEnhancement>
                </se:RedChannel>
            </se:ChannelSelection>
            <se:OverlapBehavior>AVERAGE</se:OverlapBehavior>
            <se:ContrastEnhancement>
                <se:Normalize/>
            </se:ContrastEnhancement>
        </se:RasterSymbolizer>", SE);

    let style = parse(&text);
    assert!(!style.is_simple());

    let sym = match *symbolizer(&style) {
        AnySymbolizer::Raster(ref s) => s,
        ref s => panic!("expected a raster symbolizer, got {:?}", s),
    };

    let base = sym.base();
    assert_eq!(base.opacity, 0.5);
    assert_eq!(base.overlap, Overlap::Average);
    assert!(base.contrast_enhancement.as_ref().unwrap().normalize);

    let selection = base.channel_selection.as_ref().unwrap();
    assert_eq!(selection.red.as_ref().map(String::as_str), Some("1"));
    assert_eq!(selection.green, None);
    assert_eq!(selection.enhancements["red"].gamma, 1.5);
}

#[test]
fn rules_1() {
    let text = format!("
        <se:FeatureTypeStyle {}>
            <se:FeatureTypeName>app:Road</se:FeatureTypeName>
            <se:Rule>
                <ogc:Filter>
                    <ogc:PropertyIsEqualTo>
                        <ogc:PropertyName>kind</ogc:PropertyName>
                        <ogc:Literal>highway</ogc:Literal>
                    </ogc:PropertyIsEqualTo>
                </ogc:Filter>
                <se:MinScaleDenominator>1000</se:MinScaleDenominator>
                <se:MaxScaleDenominator>50000</se:MaxScaleDenominator>
                <se:LineSymbolizer/>
            </se:Rule>
            <se:Rule>
                <se:ElseFilter/>
                <se:LineSymbolizer/>
            </se:Rule>
        </se:FeatureTypeStyle>", SE);

    let style = parse(&text);
    assert_eq!(style.rules().len(), 2);
    assert!(!style.is_simple());
    assert_eq!(style.feature_type_name().unwrap().local, "Road");

    assert_eq!(style.rules()[0].scale, ScaleRange { min: 1000.0, max: 50000.0 });
    assert_eq!(style.rules()[1].scale, ScaleRange::default());
    assert_eq!(style.rules_for_scale(100.0).count(), 1);
}

#[test]
fn keep_source_1() {
    let text = format!("<se:LineSymbolizer {}/>", SE);
    let style = parse(&text);
    assert!(style.source().unwrap().contains("LineSymbolizer"));

    let opt = ParseOptions {
        keep_source: false,
        ..ParseOptions::default()
    };
    let style = SymbologyParser::with_options(opt).parse_str(&text).unwrap().unwrap();
    assert!(style.source().is_none());
}

#[test]
fn inline_content_1() {
    let text = format!("
        <se:PointSymbolizer {}>
            <se:Graphic>
                <se:ExternalGraphic>
                    <se:InlineContent encoding='base64'>
                        AQID
                    </se:InlineContent>
                    <se:Format>image/png</se:Format>
                </se:ExternalGraphic>
            </se:Graphic>
        </se:PointSymbolizer>", SE);

    let style = parse(&text);
    let graphic = point(&style).base().graphic.clone().unwrap();
    let image = graphic.image.as_ref().unwrap();
    assert_eq!(image.data.as_slice(), &[1, 2, 3]);
    assert_eq!(image.format.as_ref().map(String::as_str), Some("image/png"));
    assert!(graphic.image_url.is_none());
}

#[test]
fn inline_content_2() {
    let text = format!("
        <se:PointSymbolizer {}>
            <se:Graphic>
                <se:Mark>
                    <se:InlineContent encoding='xml'><svg xmlns='http://www.w3.org/2000/svg'/></se:InlineContent>
                    <se:Format>svg</se:Format>
                </se:Mark>
            </se:Graphic>
        </se:PointSymbolizer>", SE);

    let style = parse(&text);
    let graphic = point(&style).base().graphic.clone().unwrap();
    let source = graphic.mark.as_ref().unwrap().source.clone().unwrap();
    assert_eq!(source.format, "svg");
    assert!(String::from_utf8(source.data).unwrap().starts_with("<svg"));
}

#[test]
fn online_resource_1() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("icon.png"), &[7, 8, 9]).unwrap();
    fs::write(dir.path().join("rule.xml"), format!("
        <se:Rule {}>
            <se:PointSymbolizer>
                <se:Graphic>
                    <se:ExternalGraphic>
                        <se:OnlineResource xlink:href='icon.png'/>
                        <se:Format>image/png</se:Format>
                    </se:ExternalGraphic>
                </se:Graphic>
            </se:PointSymbolizer>
        </se:Rule>", SE)).unwrap();

    let path = dir.path().join("style.xml");
    fs::write(&path, format!("
        <se:FeatureTypeStyle {}>
            <se:OnlineResource xlink:href='rule.xml'/>
        </se:FeatureTypeStyle>", SE)).unwrap();

    let style = SymbologyParser::new().parse_file(&path).unwrap().unwrap();
    let graphic = point(&style).base().graphic.clone().unwrap();
    assert_eq!(graphic.image.as_ref().unwrap().data.as_slice(), &[7, 8, 9]);
    assert!(graphic.image_url.as_ref().unwrap().ends_with("/icon.png"));
}

#[test]
fn online_resource_2() {
    // A missing file is logged and skipped.
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("style.xml");
    fs::write(&path, format!("
        <se:PointSymbolizer {}>
            <se:Graphic>
                <se:ExternalGraphic>
                    <se:OnlineResource xlink:href='missing.png'/>
                </se:ExternalGraphic>
            </se:Graphic>
        </se:PointSymbolizer>", SE)).unwrap();

    let style = SymbologyParser::new().parse_file(&path).unwrap().unwrap();
    assert!(point(&style).base().graphic.as_ref().unwrap().image.is_none());
}
