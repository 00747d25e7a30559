// Copyright 2026 The symbology Developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use std::sync::Arc;

use log::warn;

use crate::types::{Color, NumberList};

/// A unit of measure.
#[derive(Clone, Copy, PartialEq, Debug)]
#[allow(missing_docs)]
pub enum Uom {
    Metre,
    Mm,
    Foot,
    Pixel,
}

impl_keyword!(Uom, "unit of measure",
    "Metre" => Metre,
    "mm" => Mm,
    "Foot" => Foot,
    "Pixel" => Pixel
);

impl Uom {
    /// Resolves a `uom` attribute value.
    ///
    /// Only the suffix of the value matters, so both plain names and
    /// OGC unit URIs are accepted. Unknown units fall back to pixels.
    pub fn from_attribute(value: Option<&str>) -> Uom {
        let value = match value {
            Some(v) => v,
            None => return Uom::Pixel,
        };

        let s = value.trim().to_lowercase();
        if s.ends_with("metre") || s.ends_with("meter") {
            Uom::Metre
        } else if s.ends_with("mm") {
            Uom::Mm
        } else if s.ends_with("foot") {
            Uom::Foot
        } else {
            if !s.ends_with("pixel") {
                warn!("Unknown unit of measure '{}', using pixel instead.", value);
            }
            Uom::Pixel
        }
    }
}

impl Default for Uom {
    fn default() -> Uom {
        Uom::Pixel
    }
}


/// A predefined mark shape.
#[derive(Clone, Copy, PartialEq, Debug)]
#[allow(missing_docs)]
pub enum SimpleMark {
    Square,
    Circle,
    Triangle,
    Star,
    Cross,
    X,
}

impl_keyword!(SimpleMark, "well known name",
    "SQUARE" => Square,
    "CIRCLE" => Circle,
    "TRIANGLE" => Triangle,
    "STAR" => Star,
    "CROSS" => Cross,
    "X" => X
);

#[derive(Clone, Copy, PartialEq, Debug)]
#[allow(missing_docs)]
pub enum LineJoin {
    Round,
    Mitre,
    Bevel,
}

impl_keyword!(LineJoin, "line join",
    "ROUND" => Round,
    "MITRE" => Mitre,
    "BEVEL" => Bevel
);

#[derive(Clone, Copy, PartialEq, Debug)]
#[allow(missing_docs)]
pub enum LineCap {
    Butt,
    Round,
    Square,
}

impl_keyword!(LineCap, "line cap",
    "BUTT" => Butt,
    "ROUND" => Round,
    "SQUARE" => Square
);

#[derive(Clone, Copy, PartialEq, Debug)]
#[allow(missing_docs)]
pub enum FontStyle {
    Normal,
    Italic,
    Oblique,
}

impl_keyword!(FontStyle, "font style",
    "NORMAL" => Normal,
    "ITALIC" => Italic,
    "OBLIQUE" => Oblique
);

/// A perpendicular offset construction method.
#[derive(Clone, Copy, PartialEq, Debug)]
#[allow(missing_docs)]
pub enum OffsetKind {
    Standard,
    Round,
    Edged,
}

impl_keyword!(OffsetKind, "perpendicular offset type",
    "Standard" => Standard,
    "Round" => Round,
    "Edged" => Edged
);

/// A perpendicular offset post processing.
#[derive(Clone, Copy, PartialEq, Debug)]
#[allow(missing_docs)]
pub enum Substraction {
    None,
    NegativeOffset,
}

impl_keyword!(Substraction, "perpendicular offset substraction",
    "None" => None,
    "NegativeOffset" => NegativeOffset
);


/// A fill.
#[derive(Clone, PartialEq, Debug)]
pub struct Fill {
    /// Default: gray.
    pub color: Color,
    /// A graphic to tile the area with.
    pub graphic: Option<Arc<Graphic>>,
}

impl Default for Fill {
    fn default() -> Fill {
        Fill {
            color: Color::gray(),
            graphic: None,
        }
    }
}


/// A stroke.
#[derive(Clone, PartialEq, Debug)]
pub struct Stroke {
    /// Default: black.
    pub color: Color,
    /// Default: 1.
    pub width: f64,
    /// Default: `Round`.
    pub line_join: LineJoin,
    /// Default: `Butt`.
    pub line_cap: LineCap,
    /// Dash lengths. `None` for a solid line.
    pub dash_array: Option<NumberList>,
    #[allow(missing_docs)]
    pub dash_offset: f64,
    /// A graphic repeated along the line (`GraphicStroke`).
    pub stroke: Option<Arc<Graphic>>,
    /// A gap between the repeated graphics.
    pub stroke_gap: f64,
    /// A gap before the first repeated graphic.
    pub stroke_initial_gap: f64,
    /// Places a single graphic at a percentage of the line length.
    ///
    /// Negative values mean "not set".
    pub position_percentage: f64,
    /// A graphic to tile the stroke area with (`GraphicFill`).
    pub fill: Option<Arc<Graphic>>,
}

impl Default for Stroke {
    fn default() -> Stroke {
        Stroke {
            color: Color::black(),
            width: 1.0,
            line_join: LineJoin::Round,
            line_cap: LineCap::Butt,
            dash_array: None,
            dash_offset: 0.0,
            stroke: None,
            stroke_gap: 0.0,
            stroke_initial_gap: 0.0,
            position_percentage: -1.0,
            fill: None,
        }
    }
}


/// An external mark shape source.
///
/// The data is kept undecoded.
#[derive(Clone, PartialEq, Debug)]
pub struct MarkSource {
    /// A format name, like `ttf`, `type1` or `svg`.
    pub format: String,
    #[allow(missing_docs)]
    pub data: Vec<u8>,
    /// The URL the data was loaded from, if any.
    pub url: Option<String>,
}

/// A mark.
#[derive(Clone, PartialEq, Debug)]
pub struct Mark {
    /// Default: `Square`.
    pub well_known: SimpleMark,
    /// An external shape. Takes precedence over `well_known`.
    pub source: Option<MarkSource>,
    /// A glyph index inside a font source.
    pub mark_index: i32,
    #[allow(missing_docs)]
    pub fill: Option<Arc<Fill>>,
    #[allow(missing_docs)]
    pub stroke: Option<Arc<Stroke>>,
}

impl Default for Mark {
    fn default() -> Mark {
        Mark {
            well_known: SimpleMark::Square,
            source: None,
            mark_index: 0,
            fill: Some(Arc::new(Fill::default())),
            stroke: Some(Arc::new(Stroke::default())),
        }
    }
}


/// An external raster image.
///
/// The data is kept undecoded.
#[derive(Clone, PartialEq, Debug)]
pub struct GraphicImage {
    /// A MIME type, if known.
    pub format: Option<String>,
    #[allow(missing_docs)]
    pub data: Arc<Vec<u8>>,
}

/// A graphic.
#[derive(Clone, PartialEq, Debug)]
pub struct Graphic {
    /// Default: 1.
    pub opacity: f64,
    /// Default: 6.
    pub size: f64,
    /// Default: 0.
    pub rotation: f64,
    /// Default: 0.5.
    pub anchor_point_x: f64,
    /// Default: 0.5.
    pub anchor_point_y: f64,
    #[allow(missing_docs)]
    pub displacement_x: f64,
    #[allow(missing_docs)]
    pub displacement_y: f64,
    /// An external image. Takes precedence over `mark`.
    pub image: Option<GraphicImage>,
    /// The URL of the external image.
    pub image_url: Option<String>,
    /// Default: a square mark.
    pub mark: Option<Arc<Mark>>,
}

impl Default for Graphic {
    fn default() -> Graphic {
        Graphic {
            opacity: 1.0,
            size: 6.0,
            rotation: 0.0,
            anchor_point_x: 0.5,
            anchor_point_y: 0.5,
            displacement_x: 0.0,
            displacement_y: 0.0,
            image: None,
            image_url: None,
            mark: Some(Arc::new(Mark::default())),
        }
    }
}


/// A font.
#[derive(Clone, PartialEq, Debug)]
pub struct Font {
    /// Font families in order of preference.
    pub font_family: Vec<String>,
    /// Default: `Normal`.
    pub font_style: FontStyle,
    #[allow(missing_docs)]
    pub bold: bool,
    /// Default: 10.
    pub font_size: i32,
}

impl Default for Font {
    fn default() -> Font {
        Font {
            font_family: Vec::new(),
            font_style: FontStyle::Normal,
            bold: false,
            font_size: 10,
        }
    }
}


/// A halo around a label.
#[derive(Clone, PartialEq, Debug)]
pub struct Halo {
    /// Default: white.
    pub fill: Option<Arc<Fill>>,
    /// Default: 1.
    pub radius: f64,
}

impl Default for Halo {
    fn default() -> Halo {
        Halo {
            fill: Some(Arc::new(Fill { color: Color::white(), graphic: None })),
            radius: 1.0,
        }
    }
}


/// How a perpendicular offset is constructed.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct PerpendicularOffsetType {
    #[allow(missing_docs)]
    pub kind: OffsetKind,
    #[allow(missing_docs)]
    pub substraction: Substraction,
}

impl Default for PerpendicularOffsetType {
    fn default() -> PerpendicularOffsetType {
        PerpendicularOffsetType {
            kind: OffsetKind::Standard,
            substraction: Substraction::None,
        }
    }
}


/// Label placement along a line.
#[derive(Clone, PartialEq, Debug)]
#[allow(missing_docs)]
pub struct LinePlacement {
    pub perpendicular_offset: f64,
    pub perpendicular_offset_type: PerpendicularOffsetType,
    pub repeat: bool,
    pub initial_gap: f64,
    pub gap: f64,
    /// Default: `true`.
    pub is_aligned: bool,
    pub generalize_line: bool,
}

impl Default for LinePlacement {
    fn default() -> LinePlacement {
        LinePlacement {
            perpendicular_offset: 0.0,
            perpendicular_offset_type: PerpendicularOffsetType::default(),
            repeat: false,
            initial_gap: 0.0,
            gap: 0.0,
            is_aligned: true,
            generalize_line: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::Keyword;

    macro_rules! test_uom {
        ($name:ident, $value:expr, $result:expr) => (
            #[test]
            fn $name() {
                assert_eq!(Uom::from_attribute($value), $result);
            }
        )
    }

    test_uom!(uom_1, None, Uom::Pixel);
    test_uom!(uom_2, Some("http://www.opengeospatial.org/se/units/metre"), Uom::Metre);
    test_uom!(uom_3, Some("meter"), Uom::Metre);
    test_uom!(uom_4, Some("mm"), Uom::Mm);
    test_uom!(uom_5, Some("http://www.opengeospatial.org/se/units/foot"), Uom::Foot);
    test_uom!(uom_6, Some("http://www.opengeospatial.org/se/units/pixel"), Uom::Pixel);
    test_uom!(uom_7, Some("furlong"), Uom::Pixel);

    #[test]
    fn uom_keywords_round_trip() {
        for &(_, uom) in Uom::keywords() {
            assert_eq!(Uom::from_attribute(Some(&uom.to_string())), uom);
        }
    }

    #[test]
    fn mark_defaults() {
        let m = Mark::default();
        assert_eq!(m.well_known, SimpleMark::Square);
        assert!(m.fill.is_some());
        assert!(m.stroke.is_some());
    }
}
