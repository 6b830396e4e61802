//! HTML entity to Unicode conversion.
//!
//! The XML reader only knows the five predefined entities, so named HTML
//! entities are replaced with their characters before parsing.

use std::sync::LazyLock;

use regex::Regex;

static ENTITY_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&([a-zA-Z][a-zA-Z0-9]*);").expect("invalid entity regex"));

/// Convert named HTML entities to Unicode characters.
///
/// The XML entities (amp, lt, gt, quot, apos) and unknown names are left
/// unchanged.
pub(crate) fn convert_html_entities(html: &str) -> String {
    if !html.contains('&') {
        return html.to_owned();
    }
    ENTITY_PATTERN
        .replace_all(html, |caps: &regex::Captures| {
            entity_to_unicode(&caps[1]).map_or_else(|| caps[0].to_owned(), str::to_owned)
        })
        .into_owned()
}

fn entity_to_unicode(name: &str) -> Option<&'static str> {
    Some(match name {
        "nbsp" => "\u{00a0}",
        "mdash" => "\u{2014}",
        "ndash" => "\u{2013}",
        "ldquo" => "\u{201c}",
        "rdquo" => "\u{201d}",
        "lsquo" => "\u{2018}",
        "rsquo" => "\u{2019}",
        "bull" => "\u{2022}",
        "hellip" => "\u{2026}",
        "middot" => "\u{00b7}",
        "laquo" => "\u{00ab}",
        "raquo" => "\u{00bb}",
        "copy" => "\u{00a9}",
        "reg" => "\u{00ae}",
        "trade" => "\u{2122}",
        "deg" => "\u{00b0}",
        "times" => "\u{00d7}",

        // Arrows
        "rarr" => "\u{2192}",
        "larr" => "\u{2190}",
        "uarr" => "\u{2191}",
        "darr" => "\u{2193}",
        "harr" => "\u{2194}",
        "rArr" => "\u{21d2}",

        // Math
        "le" => "\u{2264}",
        "ge" => "\u{2265}",
        "ne" => "\u{2260}",
        "forall" => "\u{2200}",
        "exist" => "\u{2203}",
        "isin" => "\u{2208}",

        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_nbsp() {
        assert_eq!(
            convert_html_entities("Hello&nbsp;World"),
            "Hello\u{00a0}World"
        );
    }

    #[test]
    fn test_preserve_xml_entities() {
        assert_eq!(convert_html_entities("&amp;&lt;&gt;"), "&amp;&lt;&gt;");
    }

    #[test]
    fn test_preserve_unknown_entities() {
        assert_eq!(convert_html_entities("&unknown;"), "&unknown;");
    }

    #[test]
    fn test_numeric_references_untouched() {
        assert_eq!(convert_html_entities("&#9661;"), "&#9661;");
    }
}
