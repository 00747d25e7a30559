// Copyright 2026 The symbology Developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use std::fmt;
use std::str::FromStr;

/// Representation of a styling color.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Color {
    #[allow(missing_docs)]
    pub red: u8,
    #[allow(missing_docs)]
    pub green: u8,
    #[allow(missing_docs)]
    pub blue: u8,
    #[allow(missing_docs)]
    pub alpha: u8,
}

impl Color {
    /// Constructs a new opaque color.
    #[inline]
    pub fn new(red: u8, green: u8, blue: u8) -> Color {
        Color { red, green, blue, alpha: 255 }
    }

    /// Constructs a new color with an alpha channel.
    #[inline]
    pub fn new_rgba(red: u8, green: u8, blue: u8, alpha: u8) -> Color {
        Color { red, green, blue, alpha }
    }

    #[allow(missing_docs)]
    #[inline]
    pub fn black() -> Color {
        Color::new(0, 0, 0)
    }

    #[allow(missing_docs)]
    #[inline]
    pub fn white() -> Color {
        Color::new(255, 255, 255)
    }

    #[allow(missing_docs)]
    #[inline]
    pub fn gray() -> Color {
        Color::new(128, 128, 128)
    }

    /// Returns a copy of the color with a different alpha.
    #[inline]
    pub fn with_alpha(self, alpha: u8) -> Color {
        Color { alpha, ..self }
    }

    /// Returns the alpha channel as an opacity in the 0..1 range.
    pub fn opacity(&self) -> f64 {
        f64::from(self.alpha) / 255.0
    }

    /// Sets the alpha channel from an opacity.
    ///
    /// The opacity is clamped to the 0..1 range.
    pub fn set_opacity(&mut self, opacity: f64) {
        let opacity = if opacity.is_nan() { 1.0 } else { opacity.max(0.0).min(1.0) };
        self.alpha = (opacity * 255.0).round() as u8;
    }

    /// Writes the color as `#rrggbb`.
    ///
    /// The alpha channel is dropped.
    pub fn to_hex(&self) -> String {
        let mut buf = String::with_capacity(7);
        buf.push('#');
        for c in &[self.red, self.green, self.blue] {
            let (c1, c2) = int2hex(*c);
            buf.push(c1 as char);
            buf.push(c2 as char);
        }
        buf
    }
}

impl FromStr for Color {
    type Err = svgtypes::Error;

    /// Parses a color.
    ///
    /// `#AARRGGBB` keeps the alpha channel in front, like the styling
    /// documents do. Everything else is parsed as a CSS color.
    fn from_str(text: &str) -> Result<Color, Self::Err> {
        let text = text.trim();

        if text.len() == 9 && text.starts_with('#') {
            let n = u32::from_str_radix(&text[1..], 16)
                .map_err(|_| svgtypes::Error::InvalidValue)?;
            return Ok(Color::new_rgba(
                (n >> 16) as u8,
                (n >> 8) as u8,
                n as u8,
                (n >> 24) as u8,
            ));
        }

        let c = svgtypes::Color::from_str(text)?;
        Ok(Color::new_rgba(c.red, c.green, c.blue, c.alpha))
    }
}

static CHARS: &[u8] = b"0123456789abcdef";

#[inline]
fn int2hex(n: u8) -> (u8, u8) {
    (CHARS[(n >> 4) as usize], CHARS[(n & 0xf) as usize])
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    macro_rules! test_color {
        ($name:ident, $text:expr, $result:expr) => (
            #[test]
            fn $name() {
                assert_eq!(Color::from_str($text).unwrap(), $result);
            }
        )
    }

    test_color!(parse_color_1, "#FF0000", Color::new(255, 0, 0));
    test_color!(parse_color_2, "#ff7f05", Color::new(255, 127, 5));
    test_color!(parse_color_3, "#80FF0000", Color::new_rgba(255, 0, 0, 128));
    test_color!(parse_color_4, " red ", Color::new(255, 0, 0));
    test_color!(parse_color_5, "#f00", Color::new(255, 0, 0));

    #[test]
    fn parse_color_invalid() {
        assert!(Color::from_str("#zz0000").is_err());
        assert!(Color::from_str("#zz000000").is_err());
    }

    macro_rules! gen_color {
        ($name:ident, $c:expr, $result:expr) => (
            #[test]
            fn $name() {
                assert_eq!($c.to_hex(), $result);
            }
        )
    }

    gen_color!(gen_color_1, Color::new(255, 0, 0), "#ff0000");
    gen_color!(gen_color_2, Color::new(255, 127, 5), "#ff7f05");
    gen_color!(gen_color_3, Color::new_rgba(1, 2, 3, 0), "#010203");

    #[test]
    fn set_opacity_clamps() {
        let mut c = Color::black();
        c.set_opacity(2.0);
        assert_eq!(c.alpha, 255);
        c.set_opacity(-1.0);
        assert_eq!(c.alpha, 0);
        c.set_opacity(0.5);
        assert_eq!(c.alpha, 128);
    }
}
