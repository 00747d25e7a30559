// Copyright 2026 The symbology Developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use log::warn;

/// A trait for enums represented by a fixed set of keywords.
pub trait Keyword: Sized + Copy + 'static {
    /// A human readable name of the value kind. Used in diagnostics.
    const KIND: &'static str;

    /// All values with their keywords.
    fn keywords() -> &'static [(&'static str, Self)];

    /// Parses a keyword, ignoring case and surrounding whitespace.
    fn from_keyword(text: &str) -> Option<Self> {
        let text = text.trim();
        Self::keywords()
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(text))
            .map(|&(_, v)| v)
    }

    /// Returns the keyword of the value.
    fn to_keyword(&self) -> &'static str;
}

/// Parses a keyword or falls back to `default`.
///
/// A fallback is logged with the list of valid keywords.
pub fn parse_or<T: Keyword>(text: &str, default: T) -> T {
    match T::from_keyword(text) {
        Some(v) => v,
        None => {
            let valid: Vec<&str> = T::keywords().iter().map(|&(name, _)| name).collect();
            warn!("Used invalid value '{}' for {}. Valid values are: {}.",
                  text, T::KIND, valid.join(", "));
            default
        }
    }
}

macro_rules! impl_keyword {
    ($t:ident, $kind:expr, $($name:expr => $v:ident),+) => (
        impl $crate::traits::Keyword for $t {
            const KIND: &'static str = $kind;

            fn keywords() -> &'static [(&'static str, Self)] {
                &[$(($name, $t::$v)),+]
            }

            fn to_keyword(&self) -> &'static str {
                match *self {
                    $($t::$v => $name),+
                }
            }
        }

        impl ::std::fmt::Display for $t {
            fn fmt(&self, f: &mut ::std::fmt::Formatter) -> ::std::fmt::Result {
                use $crate::traits::Keyword;
                write!(f, "{}", self.to_keyword())
            }
        }
    )
}
