// Copyright 2026 The symbology Developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The styling value model.
//!
//! Stylings are plain values. Nested components are shared through `Arc`
//! and modified only through `Arc::make_mut`, so a styling evaluated for a
//! feature never changes the template it was cloned from.

use std::collections::HashMap;
use std::sync::Arc;

pub use self::components::*;

mod components;

use crate::filter::Expression;
use crate::symbolizer::AnySymbolizer;
use crate::types::Color;

/// A point styling.
#[derive(Clone, PartialEq, Debug)]
pub struct PointStyling {
    #[allow(missing_docs)]
    pub uom: Uom,
    /// Default: a square mark.
    pub graphic: Option<Arc<Graphic>>,
}

impl Default for PointStyling {
    fn default() -> PointStyling {
        PointStyling {
            uom: Uom::Pixel,
            graphic: Some(Arc::new(Graphic::default())),
        }
    }
}


/// A line styling.
#[derive(Clone, PartialEq, Debug)]
pub struct LineStyling {
    #[allow(missing_docs)]
    pub uom: Uom,
    /// Default: a black stroke.
    pub stroke: Option<Arc<Stroke>>,
    #[allow(missing_docs)]
    pub perpendicular_offset: f64,
    #[allow(missing_docs)]
    pub perpendicular_offset_type: PerpendicularOffsetType,
}

impl Default for LineStyling {
    fn default() -> LineStyling {
        LineStyling {
            uom: Uom::Pixel,
            stroke: Some(Arc::new(Stroke::default())),
            perpendicular_offset: 0.0,
            perpendicular_offset_type: PerpendicularOffsetType::default(),
        }
    }
}


/// A polygon styling.
///
/// A polygon is neither filled nor stroked unless requested.
#[derive(Clone, PartialEq, Debug, Default)]
#[allow(missing_docs)]
pub struct PolygonStyling {
    pub uom: Uom,
    pub fill: Option<Arc<Fill>>,
    pub stroke: Option<Arc<Stroke>>,
    pub displacement_x: f64,
    pub displacement_y: f64,
    pub perpendicular_offset: f64,
    pub perpendicular_offset_type: PerpendicularOffsetType,
}


/// A text styling.
#[derive(Clone, PartialEq, Debug)]
#[allow(missing_docs)]
pub struct TextStyling {
    pub uom: Uom,
    pub font: Option<Arc<Font>>,
    /// Default: black.
    pub fill: Option<Arc<Fill>>,
    pub halo: Option<Arc<Halo>>,
    /// Labels are placed at points unless set.
    pub line_placement: Option<Arc<LinePlacement>>,
    pub rotation: f64,
    pub displacement_x: f64,
    pub displacement_y: f64,
    /// Default: 0.
    pub anchor_point_x: f64,
    /// Default: 0.5.
    pub anchor_point_y: f64,
}

impl Default for TextStyling {
    fn default() -> TextStyling {
        TextStyling {
            uom: Uom::Pixel,
            font: Some(Arc::new(Font::default())),
            fill: Some(Arc::new(Fill { color: Color::black(), graphic: None })),
            halo: None,
            line_placement: None,
            rotation: 0.0,
            displacement_x: 0.0,
            displacement_y: 0.0,
            anchor_point_x: 0.0,
            anchor_point_y: 0.5,
        }
    }
}


/// Raster overlap behavior.
#[derive(Clone, Copy, PartialEq, Debug)]
#[allow(missing_docs)]
pub enum Overlap {
    LatestOnTop,
    EarliestOnTop,
    Average,
    Random,
}

impl_keyword!(Overlap, "overlap behavior",
    "LATEST_ON_TOP" => LatestOnTop,
    "EARLIEST_ON_TOP" => EarliestOnTop,
    "AVERAGE" => Average,
    "RANDOM" => Random
);

/// A contrast enhancement.
#[derive(Clone, PartialEq, Debug)]
#[allow(missing_docs)]
pub struct ContrastEnhancement {
    pub normalize: bool,
    pub histogram: bool,
    /// Default: 1.
    pub gamma: f64,
}

impl Default for ContrastEnhancement {
    fn default() -> ContrastEnhancement {
        ContrastEnhancement {
            normalize: false,
            histogram: false,
            gamma: 1.0,
        }
    }
}

/// A raster band selection.
#[derive(Clone, PartialEq, Debug, Default)]
pub struct ChannelSelection {
    /// Source channel names of the red, green and blue channels.
    pub red: Option<String>,
    #[allow(missing_docs)]
    pub green: Option<String>,
    #[allow(missing_docs)]
    pub blue: Option<String>,
    /// Source channel name of a gray scale image.
    pub gray: Option<String>,
    /// Per channel contrast enhancements, keyed by `red`, `green`, `blue` or `gray`.
    pub enhancements: HashMap<String, ContrastEnhancement>,
}

/// A hill shading.
#[derive(Clone, PartialEq, Debug)]
#[allow(missing_docs)]
pub struct ShadedRelief {
    pub brightness_only: bool,
    /// Default: 55.
    pub relief_factor: f64,
    pub azimuth_angle: f64,
    pub illumination_angle: f64,
}

impl Default for ShadedRelief {
    fn default() -> ShadedRelief {
        ShadedRelief {
            brightness_only: false,
            relief_factor: 55.0,
            azimuth_angle: 0.0,
            illumination_angle: 0.0,
        }
    }
}

/// An entry of an old style color map.
#[derive(Clone, PartialEq, Debug)]
#[allow(missing_docs)]
pub struct ColorMapEntry {
    pub color: Color,
    pub quantity: f64,
    pub label: Option<String>,
}

/// A raster color map.
#[derive(Clone, Debug)]
pub enum ColorMap {
    /// A `Categorize` or `Interpolate` function.
    Function(Arc<dyn Expression>),
    /// A list of `ColorMapEntry` elements.
    Entries(Vec<ColorMapEntry>),
}

/// A raster styling.
#[derive(Clone, Debug)]
#[allow(missing_docs)]
pub struct RasterStyling {
    pub uom: Uom,
    /// Default: 1.
    pub opacity: f64,
    pub channel_selection: Option<ChannelSelection>,
    /// Default: `LatestOnTop`.
    pub overlap: Overlap,
    pub contrast_enhancement: Option<ContrastEnhancement>,
    pub shaded: Option<ShadedRelief>,
    /// A line or polygon symbolizer applied to the raster outline.
    pub image_outline: Option<Arc<AnySymbolizer>>,
    pub color_map: Option<ColorMap>,
}

impl Default for RasterStyling {
    fn default() -> RasterStyling {
        RasterStyling {
            uom: Uom::Pixel,
            opacity: 1.0,
            channel_selection: None,
            overlap: Overlap::LatestOnTop,
            contrast_enhancement: None,
            shaded: None,
            image_outline: None,
            color_map: None,
        }
    }
}


/// An evaluated styling of any kind.
#[derive(Clone, Debug)]
#[allow(missing_docs)]
pub enum Styling {
    Point(PointStyling),
    Line(LineStyling),
    Polygon(PolygonStyling),
    Text(TextStyling),
    Raster(RasterStyling),
}

impl Styling {
    /// Returns the styling unit of measure.
    pub fn uom(&self) -> Uom {
        match *self {
            Styling::Point(ref s) => s.uom,
            Styling::Line(ref s) => s.uom,
            Styling::Polygon(ref s) => s.uom,
            Styling::Text(ref s) => s.uom,
            Styling::Raster(ref s) => s.uom,
        }
    }
}
