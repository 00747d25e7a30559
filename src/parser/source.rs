// Copyright 2026 The symbology Developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use roxmltree::Node;

const XML_NS_PREFIX: &str = "xml";

/// Returns the XML text of an element.
///
/// Namespaces declared on ancestors are copied to the element,
/// so the text can be parsed on its own.
pub fn subtree_source(node: Node) -> String {
    let text = &node.document().input_text()[node.range()];

    let start_tag = &text[..start_tag_len(text)];
    let mut decls = String::new();
    for ns in node.namespaces() {
        let declared = match ns.name() {
            Some(XML_NS_PREFIX) => continue,
            Some(prefix) => start_tag.contains(&format!("xmlns:{}=", prefix)),
            None => start_tag.contains("xmlns="),
        };

        if declared {
            continue;
        }

        match ns.name() {
            Some(prefix) => decls.push_str(&format!(" xmlns:{}=\"", prefix)),
            None => decls.push_str(" xmlns=\""),
        }
        escape_into(ns.uri(), true, &mut decls);
        decls.push('"');
    }

    if decls.is_empty() {
        return text.to_string();
    }

    let name_end = text[1..]
        .find(|c: char| c.is_whitespace() || c == '/' || c == '>')
        .map(|idx| idx + 1)
        .unwrap_or_else(|| text.len());

    let mut out = String::with_capacity(text.len() + decls.len());
    out.push_str(&text[..name_end]);
    out.push_str(&decls);
    out.push_str(&text[name_end..]);
    out
}

/// Escapes a text node content.
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    escape_into(text, false, &mut out);
    out
}

fn escape_into(text: &str, is_attribute: bool, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if is_attribute => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
}

// Returns the length of the start tag, ignoring '>' inside attribute values.
fn start_tag_len(text: &str) -> usize {
    let mut quote = None;
    for (idx, c) in text.char_indices() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if c == '"' || c == '\'' => quote = Some(c),
            None if c == '>' => return idx + 1,
            None => {}
        }
    }

    text.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subtree_source_1() {
        let text = "<a xmlns:ogc='http://www.opengis.net/ogc'>\
                    <b><ogc:PropertyName>name</ogc:PropertyName></b></a>";
        let doc = roxmltree::Document::parse(text).unwrap();
        let prop = doc.descendants().find(|n| n.has_tag_name("PropertyName")).unwrap();
        assert_eq!(subtree_source(prop),
                   "<ogc:PropertyName xmlns:ogc=\"http://www.opengis.net/ogc\">name</ogc:PropertyName>");
    }

    #[test]
    fn subtree_source_2() {
        let text = "<a xmlns='http://www.opengis.net/se'><Label attr='>'>x</Label></a>";
        let doc = roxmltree::Document::parse(text).unwrap();
        let label = doc.descendants().find(|n| n.has_tag_name("Label")).unwrap();
        assert_eq!(subtree_source(label),
                   "<Label xmlns=\"http://www.opengis.net/se\" attr='>'>x</Label>");
    }

    #[test]
    fn subtree_source_3() {
        let text = "<ogc:Literal xmlns:ogc='http://www.opengis.net/ogc'>1</ogc:Literal>";
        let doc = roxmltree::Document::parse(text).unwrap();
        assert_eq!(subtree_source(doc.root_element()), text);
    }

    #[test]
    fn escape_text_1() {
        assert_eq!(escape_text("a < b & c"), "a &lt; b &amp; c");
    }
}
