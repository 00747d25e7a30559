// Copyright 2026 The symbology Developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! This module contains value types shared by the styling model.

pub use self::color::Color;
pub use self::number::{
    parse_bool,
    parse_integer,
    parse_number,
    parse_number_list,
};

/// Representation of a dash array.
pub type NumberList = Vec<f64>;

mod color;
mod number;
