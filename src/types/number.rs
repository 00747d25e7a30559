// Copyright 2026 The symbology Developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use svgtypes::NumberListParser;

use super::NumberList;

/// Parses a floating point number, ignoring surrounding whitespace.
pub fn parse_number(text: &str) -> Option<f64> {
    text.trim().parse().ok()
}

/// Parses an integer, ignoring surrounding whitespace.
pub fn parse_integer(text: &str) -> Option<i32> {
    text.trim().parse().ok()
}

/// Parses a boolean.
///
/// Only `true` (in any case) is `true`, everything else is `false`.
pub fn parse_bool(text: &str) -> bool {
    text.trim().eq_ignore_ascii_case("true")
}

/// Parses a list of numbers separated by commas and/or whitespace.
///
/// Returns `None` if any of the list items is not a number.
pub fn parse_number_list(text: &str) -> Option<NumberList> {
    let mut list = Vec::new();
    for n in NumberListParser::from(text.trim()) {
        list.push(n.ok()?);
    }

    Some(list)
}

#[cfg(test)]
mod tests {
    use super::*;

    macro_rules! test_list {
        ($name:ident, $text:expr, $result:expr) => (
            #[test]
            fn $name() {
                assert_eq!(parse_number_list($text), $result);
            }
        )
    }

    test_list!(parse_list_1, "5 2", Some(vec![5.0, 2.0]));
    test_list!(parse_list_2, "5,2,1.5", Some(vec![5.0, 2.0, 1.5]));
    test_list!(parse_list_3, " 10  4 ", Some(vec![10.0, 4.0]));
    test_list!(parse_list_4, "", Some(vec![]));
    test_list!(parse_list_5, "5 abc", None);

    #[test]
    fn parse_bool_1() {
        assert_eq!(parse_bool("TRUE"), true);
        assert_eq!(parse_bool(" true "), true);
        assert_eq!(parse_bool("1"), false);
        assert_eq!(parse_bool("no"), false);
    }

    #[test]
    fn parse_number_1() {
        assert_eq!(parse_number(" 2.5 "), Some(2.5));
        assert_eq!(parse_number("2px"), None);
        assert_eq!(parse_integer("12"), Some(12));
        assert_eq!(parse_integer("12.5"), None);
    }
}
