#[macro_use]
extern crate bencher;

use bencher::Bencher;

use symbology::filter::{PropertyEvaluator, SimpleFeature};
use symbology::SymbologyParser;

const SE: &str = r#"xmlns:se="http://www.opengis.net/se" xmlns:ogc="http://www.opengis.net/ogc""#;

const RULE: &str = "
    <se:Rule>
        <ogc:Filter>
            <ogc:PropertyIsEqualTo>
                <ogc:PropertyName>class</ogc:PropertyName>
                <ogc:Literal>{}</ogc:Literal>
            </ogc:PropertyIsEqualTo>
        </ogc:Filter>
        <se:LineSymbolizer>
            <se:Stroke>
                <se:SvgParameter name='stroke'>#336699</se:SvgParameter>
                <se:SvgParameter name='stroke-width'><ogc:PropertyName>width</ogc:PropertyName></se:SvgParameter>
                <se:SvgParameter name='stroke-dasharray'>5 2</se:SvgParameter>
            </se:Stroke>
        </se:LineSymbolizer>
        <se:TextSymbolizer>
            <se:Label><ogc:PropertyName>name</ogc:PropertyName></se:Label>
            <se:Font>
                <se:SvgParameter name='font-family'>Arial</se:SvgParameter>
                <se:SvgParameter name='font-size'>10</se:SvgParameter>
            </se:Font>
        </se:TextSymbolizer>
    </se:Rule>";

fn gen_style(rules: usize) -> String {
    let mut text = format!("<se:FeatureTypeStyle {}>", SE);
    for i in 0..rules {
        text.push_str(&RULE.replace("{}", &i.to_string()));
    }
    text.push_str("</se:FeatureTypeStyle>");
    text
}

macro_rules! do_parse {
    ($name:ident, $rules:expr) => (
        fn $name(bencher: &mut Bencher) {
            let text = gen_style($rules);
            let parser = SymbologyParser::new();
            bencher.iter(|| {
                let _ = parser.parse_str(&text).unwrap();
            })
        }
    )
}

do_parse!(parse_small, 1);
do_parse!(parse_medium, 20);
do_parse!(parse_large, 200);

macro_rules! do_evaluate {
    ($name:ident, $rules:expr) => (
        fn $name(bencher: &mut Bencher) {
            let style = SymbologyParser::new().parse_str(&gen_style($rules)).unwrap().unwrap();
            let feature = SimpleFeature::new(Some("r1"))
                .with("class", ($rules / 2).to_string())
                .with("width", 3.0)
                .with("name", "Main St");
            bencher.iter(|| {
                let _ = style.evaluate(Some(&feature), 10000.0, &PropertyEvaluator);
            })
        }
    )
}

do_evaluate!(evaluate_small, 1);
do_evaluate!(evaluate_large, 200);

benchmark_group!(benches1, parse_small, parse_medium, parse_large);
benchmark_group!(benches2, evaluate_small, evaluate_large);
benchmark_main!(benches1, benches2);
